use acc_common::{
    workloads::{WorkExecutionResult, WorkReport},
    AuthHash, Balance, Hash32, Octets, SegmentRoot, ServiceId, TimeslotIndex, TransferMemo,
    UnsignedGas, WorkPackageHash,
};
use serde::{Deserialize, Serialize};

/// A wrangled work digest handed to a service's accumulate entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccumulateOperand {
    /// `p`: Work package hash (`work_package_hash` of `AvailSpecs`)
    pub work_package_hash: WorkPackageHash,
    /// `e`: Work report segment root (`segment_root` of `AvailSpecs`)
    pub segment_root: SegmentRoot,
    /// `a`: Work report authorizer hash (`authorizer_hash` of `WorkReport`)
    pub authorizer_hash: AuthHash,
    /// `y`: Work item payload hash (`payload_hash` of `WorkDigest`)
    pub work_item_payload_hash: Hash32,
    /// `g`: Gas limit for accumulate (`accumulate_gas_limit` of `WorkDigest`)
    pub accumulate_gas_limit: UnsignedGas,
    /// **`l`**: Work item refine result (`refine_result` of `WorkDigest`)
    pub refine_result: WorkExecutionResult,
    /// **`t`**: Authorization trace (`auth_trace` of `WorkReport`)
    pub auth_trace: Octets,
}

impl AccumulateOperand {
    /// Operands of `service_id`, one per matching digest of the reports, in report order.
    pub fn collect_for_service(reports: &[WorkReport], service_id: ServiceId) -> Vec<Self> {
        reports
            .iter()
            .flat_map(|report| {
                report.digests_for(service_id).map(move |digest| Self {
                    work_package_hash: report.specs.work_package_hash.clone(),
                    segment_root: report.specs.segment_root.clone(),
                    authorizer_hash: report.authorizer_hash.clone(),
                    work_item_payload_hash: digest.payload_hash.clone(),
                    accumulate_gas_limit: digest.accumulate_gas_limit,
                    refine_result: digest.refine_result.clone(),
                    auth_trace: report.auth_trace.clone(),
                })
            })
            .collect()
    }
}

/// An inter-service message emitted during accumulation, settled after all accumulations
/// of the block are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredTransfer {
    /// `s`: Sender service id
    pub from: ServiceId,
    /// `d`: Receiver service id
    pub to: ServiceId,
    /// `a`: Token transfer amount
    pub amount: Balance,
    /// `m`: A simple memo transferred alongside the balance
    pub memo: TransferMemo,
    /// `g`: Gas limit for the transfer
    pub gas_limit: UnsignedGas,
}

/// Accumulate entry-point function arguments
///
/// The partial state (**`u`**) is handed to the invoker separately as a shared snapshot.
#[derive(Debug, Clone, Default)]
pub struct AccumulateInvokeArgs {
    /// `t`: Current timeslot index.
    pub curr_timeslot_index: TimeslotIndex,
    /// `s`: The id of the service account to run the accumulation process.
    pub accumulate_host: ServiceId,
    /// `g`: The maximum amount of gas allowed for the accumulation process.
    pub gas_limit: UnsignedGas,
    /// **`o`**: Operands wrangled from the work digests destined to the host.
    pub operands: Vec<AccumulateOperand>,
}

/// On-transfer entry-point function arguments
#[derive(Debug, Clone, Default)]
pub struct OnTransferInvokeArgs {
    /// `t`: Current timeslot index.
    pub curr_timeslot_index: TimeslotIndex,
    /// `s`: The id of the service account receiving the transfers.
    pub destination: ServiceId,
    /// **`t`**: Selected deferred transfers, ordered by sender.
    pub transfers: Vec<DeferredTransfer>,
}

impl OnTransferInvokeArgs {
    pub fn total_amount(&self) -> Balance {
        self.transfers
            .iter()
            .fold(0, |acc, t| acc.saturating_add(t.amount))
    }

    pub fn total_gas_limit(&self) -> UnsignedGas {
        self.transfers
            .iter()
            .fold(0, |acc, t| acc.saturating_add(t.gas_limit))
    }
}
