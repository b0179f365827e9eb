use acc_common::{ByteArray, PUBLIC_KEY_SIZE, VALIDATOR_COUNT};
use acc_limited_vec::FixedVec;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// Concatenated Bandersnatch, Ed25519, BLS keys and metadata of a validator.
pub type ValidatorKey = ByteArray<PUBLIC_KEY_SIZE>;

pub type ValidatorKeySet = FixedVec<ValidatorKey, VALIDATOR_COUNT>;

/// The validator keys for the next epoch, set by the designate service.
///
/// Represents `ι` of the GP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StagingSet(pub ValidatorKeySet);

impl Deref for StagingSet {
    type Target = ValidatorKeySet;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for StagingSet {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
