use acc_common::{CodeHash, ServiceId};
use thiserror::Error;

// PVM Error Codes
#[derive(Debug, Error)]
pub enum PVMError {
    #[error("Account not found: {0}")]
    AccountNotFound(ServiceId),
    #[error("Account code not found: {0}")]
    AccountCodeNotFound(CodeHash),
    #[error("Invocation trapped: {0}")]
    InvocationTrapped(String),
}
