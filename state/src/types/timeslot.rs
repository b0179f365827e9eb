use acc_common::{TimeslotIndex, EPOCH_LENGTH};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Time timeslot index.
///
/// Represents `τ` of the GP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeslot(pub TimeslotIndex);

impl Display for Timeslot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Timeslot {
    pub fn new(slot: TimeslotIndex) -> Self {
        Self(slot)
    }

    pub fn slot(&self) -> TimeslotIndex {
        self.0
    }

    pub fn epoch(&self) -> u32 {
        self.0 / EPOCH_LENGTH as u32
    }

    /// `m`: The slot index within the epoch.
    pub fn slot_phase(&self) -> u32 {
        self.0 % EPOCH_LENGTH as u32
    }

    pub fn is_epoch_start(&self) -> bool {
        self.slot_phase() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_phase_wraps_at_epoch_boundary() {
        let last = Timeslot::new(EPOCH_LENGTH as u32 - 1);
        let next = Timeslot::new(EPOCH_LENGTH as u32);
        assert_eq!(last.slot_phase(), EPOCH_LENGTH as u32 - 1);
        assert_eq!(next.slot_phase(), 0);
        assert!(next.is_epoch_start());
        assert_eq!(next.epoch(), last.epoch() + 1);
    }
}
