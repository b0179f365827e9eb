use crate::{invoke_args::DeferredTransfer, partial_state::PartialStateFragment};
use acc_common::{AccumulateOutputHash, Octets, ServiceId, UnsignedGas};
use acc_state::types::ServiceAccount;
use std::collections::BTreeMap;

pub type AccumulationGasPairs = Vec<AccumulationGasPair>;

/// Accumulation output hashes keyed by the yielding service.
pub type AccumulationOutputPairs = BTreeMap<ServiceId, AccumulateOutputHash>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccumulationGasPair {
    pub service: ServiceId,
    pub gas: UnsignedGas,
}

/// A preimage blob provided to a service during accumulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvidedPreimage {
    pub service_id: ServiceId,
    pub blob: Octets,
}

/// Outcome of a single-service accumulate invocation.
#[derive(Debug, Clone, Default)]
pub struct AccumulateResult {
    /// Changes the invocation made, scoped to the host and the shared pools it may write.
    pub state_changes: PartialStateFragment,
    /// **`t`**: Deferred transfers emitted, in emission order.
    pub deferred_transfers: Vec<DeferredTransfer>,
    /// `y`: Optional accumulation output hash.
    pub yielded_accumulate_hash: Option<AccumulateOutputHash>,
    /// `u`: Gas used.
    pub gas_used: UnsignedGas,
    /// **`p`**: Preimages provided.
    pub provided_preimages: Vec<ProvidedPreimage>,
}

impl AccumulateResult {
    /// Result of an invocation that had no effect.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Outcome of a single-service on-transfer invocation.
#[derive(Debug, Clone, Default)]
pub struct OnTransferResult {
    /// `u`: Gas used.
    pub gas_used: UnsignedGas,
    /// The receiver account after running its code, before the inbound amounts are credited.
    /// `None` if the code made no change.
    pub recipient_account: Option<ServiceAccount>,
}
