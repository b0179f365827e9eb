use crate::types::Timeslot;
use acc_common::{workloads::WorkReport, WorkPackageHash, EPOCH_LENGTH};
use acc_limited_vec::FixedVec;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter},
};

/// A work report waiting for accumulation, paired with its unaccumulated dependencies.
///
/// The dependency set never contains the report's own work package hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyRecord {
    pub report: WorkReport,
    pub dependencies: BTreeSet<WorkPackageHash>,
}

impl Display for ReadyRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReadyRecord {{ wp_hash: {}, deps: [", self.work_package_hash())?;
        for (i, dep) in self.dependencies.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{dep}")?;
        }
        write!(f, "] }}")
    }
}

impl ReadyRecord {
    pub fn new(report: WorkReport, dependencies: BTreeSet<WorkPackageHash>) -> Self {
        Self {
            report,
            dependencies,
        }
    }

    pub fn work_package_hash(&self) -> &WorkPackageHash {
        self.report.work_package_hash()
    }

    pub fn is_ready(&self) -> bool {
        self.dependencies.is_empty()
    }
}

pub type AccumulateQueueEntries = FixedVec<Vec<ReadyRecord>, EPOCH_LENGTH>;
pub type AccumulateHistoryEntries = FixedVec<BTreeSet<WorkPackageHash>, EPOCH_LENGTH>;

/// A queue of work reports pending accumulation due to unresolved dependencies.
///
/// The queue entries have fixed indices, by the slot phase `m` within an epoch of length `E`.
///
/// Represents `ω` of the GP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccumulateQueue {
    pub items: AccumulateQueueEntries,
}

impl Display for AccumulateQueue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.items.iter().all(|entry| entry.is_empty()) {
            return write!(f, "AccumulateQueue {{}}");
        }
        writeln!(f, "AccumulateQueue {{")?;
        for (slot, entry) in self.items.iter().enumerate() {
            for record in entry.iter() {
                writeln!(f, "  [{slot}] {record},")?;
            }
        }
        write!(f, "}}")
    }
}

impl AccumulateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the accumulate queue entry at the given signed index,
    /// wrapping around the `EPOCH_LENGTH` slots.
    pub fn get_circular(&self, index: isize) -> &Vec<ReadyRecord> {
        &self.items[index.rem_euclid(EPOCH_LENGTH as isize) as usize]
    }

    /// Mutable variant of [`Self::get_circular`].
    pub fn get_circular_mut(&mut self, index: isize) -> &mut Vec<ReadyRecord> {
        &mut self.items[index.rem_euclid(EPOCH_LENGTH as isize) as usize]
    }

    /// Total number of records across all slots.
    pub fn records_count(&self) -> usize {
        self.items.iter().map(Vec::len).sum()
    }

    /// Flattens the queue into a single sequence ordered from the oldest slot to the newest.
    ///
    /// Since the entries have **fixed** indices, entries from index `m` to the end hold the
    /// oldest `E - m` slots, followed by the most recent `m` slots at indices `0..m`.
    pub fn partition_by_slot_phase_and_flatten(&self, timeslot: Timeslot) -> Vec<ReadyRecord> {
        let slot_phase = timeslot.slot_phase() as usize; // m
        let (recent, oldest) = self.items.split_at(slot_phase);
        oldest.iter().chain(recent).flatten().cloned().collect()
    }
}

/// A history of accumulated work packages over `EPOCH_LENGTH` timeslots.
///
/// Represents `ξ` of the GP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccumulateHistory {
    pub items: AccumulateHistoryEntries,
}

impl Display for AccumulateHistory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "AccumulateHistory {{")?;
        for entry in self.items.iter() {
            if entry.is_empty() {
                writeln!(f, "  {{}},")?;
                continue;
            }
            writeln!(f, "  {{")?;
            for hash in entry.iter() {
                writeln!(f, "    {hash}")?;
            }
            writeln!(f, "  }},")?;
        }
        write!(f, "}}")
    }
}

impl AccumulateHistory {
    /// Returns a union of all package hash sets in the one-epoch worth of history.
    pub fn union(&self) -> BTreeSet<WorkPackageHash> {
        self.items.iter().flatten().cloned().collect()
    }

    /// Shifts every entry one slot towards the front, dropping the oldest,
    /// and writes `entry` to the last slot.
    pub fn add(&mut self, entry: BTreeSet<WorkPackageHash>) {
        self.items.rotate_left(1);
        self.items[EPOCH_LENGTH - 1] = entry;
    }

    pub fn last_history(&self) -> Option<&BTreeSet<WorkPackageHash>> {
        self.items.last()
    }

    pub fn contains(&self, wp_hash: &WorkPackageHash) -> bool {
        self.items.iter().any(|entry| entry.contains(wp_hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acc_common::Hash32;

    fn create_hash(i: u32) -> Hash32 {
        let mut hash = Hash32::default();
        hash[..4].copy_from_slice(&i.to_le_bytes());
        hash
    }

    fn record(i: u32) -> ReadyRecord {
        let mut report = WorkReport::default();
        report.specs.work_package_hash = create_hash(i);
        ReadyRecord::new(report, BTreeSet::from([create_hash(u32::MAX)]))
    }

    #[test]
    fn test_history_add_shifts_left() {
        let mut history = AccumulateHistory::default();
        let epoch_len = EPOCH_LENGTH as u32;
        for i in 1..=epoch_len {
            history.add(BTreeSet::from([create_hash(i)]));
        }
        assert_eq!(history.items[0], BTreeSet::from([create_hash(1)]));

        history.add(BTreeSet::from([create_hash(epoch_len + 1)]));
        assert_eq!(history.items.len(), EPOCH_LENGTH);
        assert_eq!(history.items[0], BTreeSet::from([create_hash(2)]));
        assert_eq!(
            history.last_history(),
            Some(&BTreeSet::from([create_hash(epoch_len + 1)]))
        );
        assert!(!history.contains(&create_hash(1)));
        assert_eq!(history.union().len(), EPOCH_LENGTH);
    }

    #[test]
    fn test_queue_circular_indexing() {
        let mut queue = AccumulateQueue::new();
        queue.get_circular_mut(-1).push(record(1));
        assert_eq!(queue.items[EPOCH_LENGTH - 1].len(), 1);
        assert_eq!(queue.get_circular(EPOCH_LENGTH as isize * 2 - 1).len(), 1);
        assert_eq!(queue.records_count(), 1);
    }

    #[test]
    fn test_queue_flatten_oldest_first() {
        let mut queue = AccumulateQueue::new();
        queue.items[0].push(record(0));
        queue.items[2].push(record(2));
        queue.items[EPOCH_LENGTH - 1].push(record(9));

        // Slot phase 2: slots 2..E are older than slots 0..2.
        let flattened = queue.partition_by_slot_phase_and_flatten(Timeslot::new(2));
        let order: Vec<Hash32> = flattened
            .iter()
            .map(|r| r.work_package_hash().clone())
            .collect();
        assert_eq!(order, vec![create_hash(2), create_hash(9), create_hash(0)]);
    }

    #[test]
    fn test_queue_serde_round_trip() {
        let mut queue = AccumulateQueue::new();
        queue.items[3].push(record(3));
        let json = serde_json::to_string(&queue).unwrap();
        let decoded: AccumulateQueue = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, queue);
    }

    #[test]
    fn test_history_rejects_wrong_length() {
        let json = serde_json::to_string(&vec![Vec::<Hash32>::new(); EPOCH_LENGTH - 1]).unwrap();
        assert!(serde_json::from_str::<AccumulateHistory>(&json).is_err());
    }
}
