use acc_common::workloads::WorkReport;
use acc_pvm_types::{invoke_results::ProvidedPreimage, partial_state::AccumulatePartialState};
use acc_state::types::{
    AccumulateHistory, AccumulateQueue, AuthQueue, PrivilegedServices, ServiceAccounts,
    StagingSet, Timeslot,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// State components read or written by the accumulation transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulationState {
    /// `τ`
    pub timeslot: Timeslot,
    /// `δ`
    pub accounts: ServiceAccounts,
    /// `ι`
    pub staging_set: StagingSet,
    /// `φ`
    pub auth_queue: AuthQueue,
    /// `χ`
    pub privileges: PrivilegedServices,
    /// `ω`
    pub accumulate_queue: AccumulateQueue,
    /// `ξ`
    pub accumulate_history: AccumulateHistory,
}

impl AccumulationState {
    /// Copies the components an accumulation may alter into a partial state.
    pub fn partial_state(&self) -> AccumulatePartialState {
        AccumulatePartialState {
            accounts: self.accounts.clone(),
            staging_set: self.staging_set.clone(),
            auth_queue: self.auth_queue.clone(),
            privileges: self.privileges.clone(),
        }
    }

    /// Writes back the components of a posterior partial state, except accounts, which are
    /// written after deferred transfers are settled.
    pub fn apply_partial_state_pools(&mut self, partial_state: &AccumulatePartialState) {
        self.staging_set = partial_state.staging_set.clone();
        self.auth_queue = partial_state.auth_queue.clone();
        self.privileges = partial_state.privileges.clone();
    }
}

/// Inputs of a block relevant to accumulation.
#[derive(Debug, Clone, Default)]
pub struct BlockInputs {
    /// `τ′`: The timeslot of the block.
    pub timeslot: Timeslot,
    /// **`R`**: Work reports that became available in this block, in order.
    pub available_reports: Vec<WorkReport>,
    /// **`E_P`**: Preimages extrinsic of the block, ordered by service and blob.
    pub preimages: Vec<ProvidedPreimage>,
}

/// Owns everything a single block's accumulation works on: the prior state snapshot,
/// the block inputs and the posterior state under construction.
#[derive(Debug, Clone)]
pub struct BlockContext {
    prior: Arc<AccumulationState>,
    inputs: BlockInputs,
    posterior: AccumulationState,
}

impl BlockContext {
    /// The posterior starts out as a copy of the prior state.
    pub fn new(prior: AccumulationState, inputs: BlockInputs) -> Self {
        let posterior = prior.clone();
        Self {
            prior: Arc::new(prior),
            inputs,
            posterior,
        }
    }

    pub fn prior(&self) -> &AccumulationState {
        &self.prior
    }

    pub fn prior_snapshot(&self) -> Arc<AccumulationState> {
        self.prior.clone()
    }

    pub fn inputs(&self) -> &BlockInputs {
        &self.inputs
    }

    pub fn posterior(&self) -> &AccumulationState {
        &self.posterior
    }

    pub fn posterior_mut(&mut self) -> &mut AccumulationState {
        &mut self.posterior
    }

    pub fn into_posterior(self) -> AccumulationState {
        self.posterior
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acc_test_utils::fixtures::{create_hash, service_accounts};
    use std::collections::BTreeSet;

    #[test]
    fn test_posterior_starts_from_prior() {
        let prior = AccumulationState {
            timeslot: Timeslot::new(3),
            accounts: service_accounts(&[(1, 10)]),
            ..Default::default()
        };
        let mut ctx = BlockContext::new(prior.clone(), BlockInputs::default());
        assert_eq!(ctx.posterior(), &prior);

        ctx.posterior_mut().timeslot = Timeslot::new(4);
        assert_eq!(ctx.prior().timeslot, Timeslot::new(3));
        assert_eq!(ctx.into_posterior().timeslot, Timeslot::new(4));
    }

    #[test]
    fn test_state_round_trips_through_serde() -> Result<(), serde_json::Error> {
        let mut state = AccumulationState {
            accounts: service_accounts(&[(1, 10), (2, 20)]),
            ..Default::default()
        };
        state
            .accumulate_history
            .add(BTreeSet::from([create_hash(7)]));

        let json = serde_json::to_string(&state)?;
        let decoded: AccumulationState = serde_json::from_str(&json)?;
        assert_eq!(decoded, state);
        Ok(())
    }
}
