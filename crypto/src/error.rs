use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Blake2b Hashing Error")]
    Blake2bHashError,
}
