use crate::error::CryptoError;
use acc_common::Hash32;
use blake2::{digest::consts::U32, Blake2b, Digest};

pub type Blake2b256 = Blake2b<U32>;

/// Trait for different types of hasher
pub trait Hasher {
    fn hash(value: &[u8]) -> Result<Hash32, CryptoError>;
}

impl Hasher for Blake2b256 {
    fn hash(value: &[u8]) -> Result<Hash32, CryptoError> {
        let digest = Self::digest(value);
        Hash32::from_slice(digest.as_slice()).map_err(|_| CryptoError::Blake2bHashError)
    }
}

/// Generic hash function
pub fn hash<H: Hasher>(value: &[u8]) -> Result<Hash32, CryptoError> {
    H::hash(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blake2b_256_empty_input() {
        // Well-known Blake2b-256 digest of the empty string.
        let expected =
            Hash32::from_hex("0x0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8")
                .unwrap();
        assert_eq!(hash::<Blake2b256>(&[]).unwrap(), expected);
    }

    #[test]
    fn test_blake2b_256_distinct_inputs() {
        let a = hash::<Blake2b256>(b"accumulate").unwrap();
        let b = hash::<Blake2b256>(b"on_transfer").unwrap();
        assert_ne!(a, b);
    }
}
