use acc_common::ServiceId;
use acc_config::ConfigError;
use acc_crypto::CryptoError;
use acc_pvm_invocation::error::PVMInvokeError;
use acc_state::error::StateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Timeslot value {curr} must be greater than the parent block {prior}")]
    InvalidTimeslot { prior: u32, curr: u32 },
    #[error("Accumulated reports count {count} exceeds the {len} accumulatable reports")]
    AccumulateCountOutOfRange { count: usize, len: usize },
    #[error("Preimage extrinsics must be sorted by service and blob without duplicates")]
    PreimagesNotSortedUnique,
    #[error("Preimage extrinsic for service {0} was not solicited")]
    PreimageNotSolicited(ServiceId),
    // External errors
    #[error("ConfigError: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("CryptoError: {0}")]
    CryptoError(#[from] CryptoError),
    #[error("PVMInvokeError: {0}")]
    PVMInvokeError(#[from] PVMInvokeError),
    #[error("StateError: {0}")]
    StateError(#[from] StateError),
}
