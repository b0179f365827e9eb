use crate::error::PVMError;
use acc_pvm_types::{
    invoke_args::{AccumulateInvokeArgs, OnTransferInvokeArgs},
    invoke_results::{AccumulateResult, OnTransferResult},
    partial_state::AccumulatePartialState,
};
use acc_state::types::ServiceAccounts;
use async_trait::async_trait;
use std::sync::Arc;

/// Entry points of service code executed by the VM.
///
/// Implementations must be deterministic for a given snapshot and arguments. Snapshots are
/// shared read-only between concurrent invocations of the same block.
#[async_trait]
pub trait PVMInvoker: Send + Sync + 'static {
    /// Runs the accumulate entry point of `args.accumulate_host`.
    ///
    /// Represents `Ψ_A` of the GP.
    async fn accumulate(
        &self,
        partial_state: Arc<AccumulatePartialState>,
        args: AccumulateInvokeArgs,
    ) -> Result<AccumulateResult, PVMError>;

    /// Runs the on-transfer entry point of `args.destination`.
    ///
    /// Represents `Ψ_T` of the GP.
    async fn on_transfer(
        &self,
        accounts: Arc<ServiceAccounts>,
        args: OnTransferInvokeArgs,
    ) -> Result<OnTransferResult, PVMError>;
}
