use acc_common::ServiceId;
use acc_limited_vec::LimitedVecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Service account not found: {0}")]
    AccountNotFound(ServiceId),
    #[error("Balance overflow on service account {0}")]
    BalanceOverflow(ServiceId),
    #[error("LimitedVecError: {0}")]
    LimitedVecError(#[from] LimitedVecError),
}
