use crate::{
    utils::serde::{
        deserialize_hex_array, deserialize_hex_vec, serialize_hex_array, serialize_hex_vec,
    },
    HASH_SIZE, TRANSFER_MEMO_SIZE,
};
use serde::{Deserialize, Serialize};
use std::{
    array::from_fn,
    fmt::{Display, Formatter},
    ops::{Deref, DerefMut},
};
use thiserror::Error;

pub mod workloads;

/// 32-byte Hash type.
pub type Hash32 = ByteArray<HASH_SIZE>;

// Hash type aliases.
pub type CodeHash = Hash32;
pub type AuthHash = Hash32;
pub type WorkPackageHash = Hash32;
pub type SegmentRoot = Hash32;
pub type AccumulateOutputHash = Hash32;

/// Octets type; wrapper of `Vec<u8>`.
pub type Octets = ByteSequence;

/// Deferred transfer memo.
pub type TransferMemo = ByteArray<TRANSFER_MEMO_SIZE>;

/// The timeslot index.
pub type TimeslotIndex = u32;

/// The service id.
pub type ServiceId = u32;

/// The core index.
pub type CoreIndex = u16;

/// Token balance type.
pub type Balance = u64;

/// Unsigned integer gas type.
pub type UnsignedGas = u64;

/// Service account storage key.
pub type StorageKey = Octets;

/// Service account preimage entry key (hash).
pub type PreimagesKey = Hash32;

/// Service account preimage lookup metadata map key.
/// A tuple of the hash and its preimage length in octets.
pub type LookupsKey = (Hash32, u32);

#[derive(Debug, Error)]
pub enum CommonTypeError {
    #[error("Failed to convert hexstring into ByteArray<{0}> type")]
    HexToByteArrayConversionError(usize),
    #[error("Failed to convert slice into ByteArray<{0}> type")]
    SliceToByteArrayConversionError(usize),
}

/// Bytes sequence type with no length limit.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteSequence(
    #[serde(
        serialize_with = "serialize_hex_vec",
        deserialize_with = "deserialize_hex_vec"
    )]
    pub Vec<u8>,
);

impl Deref for ByteSequence {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for ByteSequence {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Display for ByteSequence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl From<Vec<u8>> for ByteSequence {
    fn from(data: Vec<u8>) -> Self {
        Self(data)
    }
}

impl ByteSequence {
    pub fn new(data: &[u8]) -> Self {
        Self(data.to_vec())
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

/// A bytes array type of size `N`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteArray<const N: usize>(
    #[serde(
        serialize_with = "serialize_hex_array",
        deserialize_with = "deserialize_hex_array"
    )]
    pub [u8; N],
);

impl<const N: usize> Deref for ByteArray<N> {
    type Target = [u8; N];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const N: usize> DerefMut for ByteArray<N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<const N: usize> Display for ByteArray<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl<const N: usize> Default for ByteArray<N> {
    fn default() -> Self {
        Self(from_fn(|_| 0u8))
    }
}

impl<const N: usize> AsRef<[u8]> for ByteArray<N> {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const N: usize> ByteArray<N> {
    pub fn new(data: [u8; N]) -> Self {
        Self(data)
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, CommonTypeError> {
        let arr = slice
            .try_into()
            .map_err(|_| CommonTypeError::SliceToByteArrayConversionError(N))?;
        Ok(Self(arr))
    }

    /// Parses a hex string, left-padding short inputs with zeros.
    pub fn from_hex(hex_str: &str) -> Result<Self, CommonTypeError> {
        let hex_stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        if hex_stripped.len() > N * 2 {
            return Err(CommonTypeError::HexToByteArrayConversionError(N));
        }
        let padded_hex = format!("{:0>width$}", hex_stripped, width = N * 2);
        let octets = hex::decode(padded_hex)
            .map_err(|_| CommonTypeError::HexToByteArrayConversionError(N))?;
        Self::from_slice(&octets)
    }

    pub fn encode_hex(&self) -> String {
        hex::encode(self.0)
    }
}
