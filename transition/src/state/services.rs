use crate::error::TransitionError;
use acc_common::{
    workloads::WorkReport, UnsignedGas, ACCUMULATION_GAS_ALL_CORES, ACCUMULATION_GAS_PER_CORE,
    CORE_COUNT,
};
use acc_pvm_interface::PVMInvoker;
use acc_pvm_invocation::{
    accumulate::pipeline::{accumulate_outer, OuterAccumulationResult},
    on_transfer::{settle_deferred_transfers, DeferredTransferSettlement},
    InvocationContext,
};
use acc_pvm_types::{invoke_args::DeferredTransfer, partial_state::AccumulatePartialState};
use acc_state::types::{AccumulateStats, PrivilegedServices, ServiceAccounts, Timeslot};

/// The total gas available for accumulation within a block.
///
/// Represents `g` of the GP; `max(G_T, G_A · C + Σ always-accumulate gas)`.
pub fn accumulation_gas_limit(privileges: &PrivilegedServices) -> UnsignedGas {
    ACCUMULATION_GAS_ALL_CORES.max(
        (ACCUMULATION_GAS_PER_CORE * CORE_COUNT as UnsignedGas)
            .saturating_add(privileges.always_accumulate_gas()),
    )
}

/// Processes state transitions by `accumulate` PVM invocation.
///
/// # Transitions
///
/// The following state components are copied into `AccumulatePartialState` and altered by
/// the invoked services. The caller writes the merged result back into the posterior state.
///
/// ### Service Accounts
/// Host accounts, created accounts, ejected accounts and provided preimages.
///
/// ### Privileged Services
/// By the manager service.
///
/// ### Staging Set
/// By the designate service.
///
/// ### Auth Queue
/// By the assign service of each core.
pub async fn transition_accumulate_contexts<I: PVMInvoker>(
    ctx: &InvocationContext<I>,
    partial_state: AccumulatePartialState,
    reports: &[WorkReport],
) -> Result<OuterAccumulationResult, TransitionError> {
    let always_accumulate_services = partial_state.privileges.always_accumulate_services.clone();
    let gas_limit = accumulation_gas_limit(&partial_state.privileges);
    tracing::debug!("Accumulation gas limit: {gas_limit}");

    Ok(accumulate_outer(
        ctx,
        gas_limit,
        reports,
        partial_state,
        &always_accumulate_services,
    )
    .await?)
}

/// Processes deferred transfers for service accounts.
///
/// Every account receives an `on_transfer` invocation with the transfers destined to it,
/// ordered by sender. Runs once all accumulations of the block are merged.
pub async fn transition_on_transfer<I: PVMInvoker>(
    ctx: &InvocationContext<I>,
    accounts: ServiceAccounts,
    transfers: &[DeferredTransfer],
) -> Result<DeferredTransferSettlement, TransitionError> {
    Ok(settle_deferred_transfers(ctx, accounts, transfers).await?)
}

/// Sets the last accumulation timeslot of every service that accumulated work digests.
pub fn transition_last_accumulate_at(
    accounts: &mut ServiceAccounts,
    accumulate_stats: &AccumulateStats,
    curr_timeslot: Timeslot,
) {
    for service_id in accumulate_stats.keys() {
        if let Some(account) = accounts.get_mut(service_id) {
            account.metadata.last_accumulate_at = curr_timeslot.slot();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acc_state::types::AccumulateStatsEntry;
    use acc_test_utils::fixtures::service_accounts;
    use std::collections::BTreeMap;

    #[test]
    fn test_gas_limit_floor_and_always_accumulate_share() {
        let mut privileges = PrivilegedServices::default();
        let floor = ACCUMULATION_GAS_ALL_CORES
            .max(ACCUMULATION_GAS_PER_CORE * CORE_COUNT as UnsignedGas);
        assert_eq!(accumulation_gas_limit(&privileges), floor);

        privileges.always_accumulate_services = BTreeMap::from([(1, UnsignedGas::MAX), (2, 1)]);
        assert_eq!(accumulation_gas_limit(&privileges), UnsignedGas::MAX);
    }

    #[test]
    fn test_last_accumulate_at_set_for_accumulated_services() {
        let mut accounts = service_accounts(&[(1, 0), (2, 0)]);
        let stats = AccumulateStats::from([(
            2,
            AccumulateStatsEntry {
                accumulate_count: 1,
                accumulate_gas_used: 5,
            },
        ), (
            9,
            AccumulateStatsEntry {
                accumulate_count: 1,
                accumulate_gas_used: 5,
            },
        )]);

        transition_last_accumulate_at(&mut accounts, &stats, Timeslot::new(42));

        assert_eq!(accounts[&1].metadata.last_accumulate_at, 0);
        assert_eq!(accounts[&2].metadata.last_accumulate_at, 42);
        assert!(!accounts.contains_key(&9));
    }
}
