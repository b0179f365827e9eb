use acc_common::{ServiceId, UnsignedGas};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-service accumulation activity within a single block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulateStatsEntry {
    /// The number of work digests accumulated for the service.
    pub accumulate_count: u32,
    /// The total gas used by the service's accumulations.
    pub accumulate_gas_used: UnsignedGas,
}

/// Per-service deferred-transfer activity within a single block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnTransferStatsEntry {
    /// The number of deferred transfers received by the service.
    pub on_transfers_count: u32,
    /// The gas used by the service's `on_transfer` invocation.
    pub on_transfers_gas_used: UnsignedGas,
}

/// Represents `I` of the GP. Only services with at least one accumulated digest are present.
pub type AccumulateStats = BTreeMap<ServiceId, AccumulateStatsEntry>;

/// Represents `X` of the GP. Only services with at least one received transfer are present.
pub type OnTransferStats = BTreeMap<ServiceId, OnTransferStatsEntry>;
