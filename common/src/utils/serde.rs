//! Hex serde helpers for byte types. Encoded form is a `0x`-prefixed hex string.

use serde::{
    de::{Error, Visitor},
    Deserializer, Serializer,
};
use std::{fmt, fmt::Formatter, marker::PhantomData};

fn decode_hex_str<E: Error>(v: &str) -> Result<Vec<u8>, E> {
    let stripped = v.strip_prefix("0x").unwrap_or(v);
    hex::decode(stripped).map_err(E::custom)
}

struct HexVisitor<T>(PhantomData<T>);

impl<const N: usize> Visitor<'_> for HexVisitor<[u8; N]> {
    type Value = [u8; N];

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "a 0x-prefixed hex string with {N} bytes")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: Error,
    {
        decode_hex_str::<E>(v)?
            .try_into()
            .map_err(|bytes: Vec<u8>| E::invalid_length(bytes.len(), &self))
    }
}

impl Visitor<'_> for HexVisitor<Vec<u8>> {
    type Value = Vec<u8>;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "a 0x-prefixed hex string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: Error,
    {
        decode_hex_str(v)
    }
}

/// Helper deserializer for bytes array to manage `0x` prefix
pub fn deserialize_hex_array<'de, D, const N: usize>(der: D) -> Result<[u8; N], D::Error>
where
    D: Deserializer<'de>,
{
    der.deserialize_str(HexVisitor::<[u8; N]>(PhantomData))
}

/// Helper deserializer for bytes sequence to manage `0x` prefix
pub fn deserialize_hex_vec<'de, D>(der: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    der.deserialize_str(HexVisitor::<Vec<u8>>(PhantomData))
}

/// Helper serializer for bytes array to manage `0x` prefix
pub fn serialize_hex_array<S, const N: usize>(bytes: &[u8; N], ser: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    ser.serialize_str(&format!("0x{}", hex::encode(bytes)))
}

/// Helper serializer for bytes sequence to manage `0x` prefix
pub fn serialize_hex_vec<S>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    ser.serialize_str(&format!("0x{}", hex::encode(bytes)))
}

#[cfg(test)]
mod tests {
    use crate::{ByteSequence, Hash32};

    #[test]
    fn test_hash_accepts_unprefixed_hex() {
        let hex_str = format!("\"{}\"", "ab".repeat(32));
        let hash: Hash32 = serde_json::from_str(&hex_str).unwrap();
        assert_eq!(hash.0, [0xab; 32]);
    }

    #[test]
    fn test_hash_rejects_wrong_length() {
        let hex_str = format!("\"0x{}\"", "ab".repeat(31));
        assert!(serde_json::from_str::<Hash32>(&hex_str).is_err());
    }

    #[test]
    fn test_octets_serialized_with_prefix() {
        let octets = ByteSequence::new(&[0xde, 0xad]);
        assert_eq!(serde_json::to_string(&octets).unwrap(), "\"0xdead\"");
    }
}
