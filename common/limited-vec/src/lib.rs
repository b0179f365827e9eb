use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};
use std::ops::{Deref, DerefMut};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LimitedVecError {
    #[error("Invalid Vec size: expected {expected}, got {actual}")]
    InvalidVecSize { expected: usize, actual: usize },
}

/// A `Vec` whose length is always exactly `SIZE`.
///
/// Used for state components indexed by core or by epoch slot, where the
/// number of entries is a protocol constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixedVec<T, const SIZE: usize> {
    inner: Vec<T>,
}

impl<T: Default + Clone, const SIZE: usize> Default for FixedVec<T, SIZE> {
    fn default() -> Self {
        Self {
            inner: vec![T::default(); SIZE],
        }
    }
}

impl<T, const SIZE: usize> Deref for FixedVec<T, SIZE> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

// Slice access only; the length can't change through `DerefMut`.
impl<T, const SIZE: usize> DerefMut for FixedVec<T, SIZE> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<T, const SIZE: usize> TryFrom<Vec<T>> for FixedVec<T, SIZE> {
    type Error = LimitedVecError;

    fn try_from(vec: Vec<T>) -> Result<Self, Self::Error> {
        Self::try_from_vec(vec)
    }
}

impl<'a, T, const SIZE: usize> IntoIterator for &'a FixedVec<T, SIZE> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl<T, const SIZE: usize> FixedVec<T, SIZE> {
    pub const SIZE: usize = SIZE;

    pub fn as_slice(&self) -> &[T] {
        self.inner.as_slice()
    }

    pub fn try_from_vec(vec: Vec<T>) -> Result<Self, LimitedVecError> {
        if vec.len() != SIZE {
            return Err(LimitedVecError::InvalidVecSize {
                expected: SIZE,
                actual: vec.len(),
            });
        }
        Ok(Self { inner: vec })
    }

    pub fn into_vec(self) -> Vec<T> {
        self.inner
    }
}

impl<T: Serialize, const SIZE: usize> Serialize for FixedVec<T, SIZE> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>, const SIZE: usize> Deserialize<'de> for FixedVec<T, SIZE> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let inner = Vec::<T>::deserialize(deserializer)?;
        Self::try_from_vec(inner).map_err(DeError::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_full_length() {
        let v = FixedVec::<u8, 4>::default();
        assert_eq!(v.len(), 4);
        assert!(v.iter().all(|x| *x == 0));
    }

    #[test]
    fn test_try_from_vec_length_mismatch() {
        let res = FixedVec::<u8, 3>::try_from_vec(vec![1, 2]);
        assert!(matches!(
            res,
            Err(LimitedVecError::InvalidVecSize {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_rotate_keeps_length() {
        let mut v = FixedVec::<u8, 3>::try_from_vec(vec![1, 2, 3]).unwrap();
        v.rotate_left(1);
        assert_eq!(v.as_slice(), &[2, 3, 1]);
    }

    #[test]
    fn test_deserialize_rejects_wrong_length() {
        assert!(serde_json::from_str::<FixedVec<u8, 3>>("[1,2,3]").is_ok());
        assert!(serde_json::from_str::<FixedVec<u8, 3>>("[1,2]").is_err());
    }
}
