use acc_common::ServiceId;
use acc_crypto::error::CryptoError;
use acc_pvm_interface::error::PVMError;
use acc_state::error::StateError;
use thiserror::Error;

/// PVM Invocation Errors
#[derive(Debug, Error)]
pub enum PVMInvokeError {
    #[error("Spawned invocation task for service {0} panicked")]
    InvocationTaskPanicked(ServiceId),
    #[error("CryptoError: {0}")]
    CryptoError(#[from] CryptoError),
    #[error("StateError: {0}")]
    StateError(#[from] StateError),
    #[error("PVMError: {0}")]
    PVMError(#[from] PVMError),
}
