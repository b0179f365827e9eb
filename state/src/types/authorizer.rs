use acc_common::{AuthHash, AUTH_QUEUE_SIZE, CORE_COUNT};
use acc_limited_vec::FixedVec;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

pub type CoreAuthQueue = FixedVec<AuthHash, AUTH_QUEUE_SIZE>;

/// Per-core queues of authorizer hashes feeding the authorizer pools.
///
/// Represents `φ` of the GP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthQueue(pub FixedVec<CoreAuthQueue, CORE_COUNT>);

impl Deref for AuthQueue {
    type Target = FixedVec<CoreAuthQueue, CORE_COUNT>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for AuthQueue {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
