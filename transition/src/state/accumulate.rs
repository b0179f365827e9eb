use crate::error::TransitionError;
use acc_common::{workloads::WorkReport, WorkPackageHash, EPOCH_LENGTH};
use acc_pvm_invocation::accumulate::utils::{edit_queue, reports_to_package_hashes};
use acc_state::types::{AccumulateHistory, AccumulateQueue, ReadyRecord, Timeslot};
use std::collections::BTreeSet;

/// State transition function of `AccumulateQueue`.
///
/// Entries are visited backwards from the current slot phase `m`. The current slot takes the
/// newly queued reports, slots skipped since the prior block are cleared, and the older slots
/// are edited by the newest accumulated packages.
pub fn transition_accumulate_queue(
    queue: &mut AccumulateQueue,
    queued_reports: &[ReadyRecord],               // R^Q
    last_accumulated: &BTreeSet<WorkPackageHash>, // ξ'_{E-1}
    prior_timeslot: Timeslot,                     // τ
    curr_timeslot: Timeslot,                      // τ'
) -> Result<(), TransitionError> {
    if curr_timeslot <= prior_timeslot {
        return Err(TransitionError::InvalidTimeslot {
            prior: prior_timeslot.slot(),
            curr: curr_timeslot.slot(),
        });
    }

    // Represents the current slot phase `m`.
    let slot_phase = curr_timeslot.slot_phase() as isize;
    let skipped_slots =
        ((curr_timeslot.slot() - prior_timeslot.slot()) as usize).min(EPOCH_LENGTH);

    // Update accumulate queue for the current timeslot (i = 0).
    *queue.get_circular_mut(slot_phase) = edit_queue(queued_reports, last_accumulated);

    // Clear entries of the skipped timeslots (1 <= i < (τ' - τ)).
    for i in 1..skipped_slots {
        queue.get_circular_mut(slot_phase - i as isize).clear();
    }

    // Edit entries of the older timeslots, within an epoch range (i >= (τ' - τ)).
    for i in skipped_slots..EPOCH_LENGTH {
        let old_entry = queue.get_circular_mut(slot_phase - i as isize);
        *old_entry = edit_queue(old_entry, last_accumulated);
    }

    Ok(())
}

/// State transition function of `AccumulateHistory`.
///
/// Shifts the history by one entry and records the packages of the first
/// `accumulate_count` accumulatable reports as the newest entry.
pub fn transition_accumulate_history(
    history: &mut AccumulateHistory,
    accumulatable_reports: &[WorkReport], // R^*
    accumulate_count: usize,              // n
) -> Result<(), TransitionError> {
    let Some(accumulated) = accumulatable_reports.get(..accumulate_count) else {
        return Err(TransitionError::AccumulateCountOutOfRange {
            count: accumulate_count,
            len: accumulatable_reports.len(),
        });
    };

    // Represents `P(R^*_{...n})`.
    history.add(reports_to_package_hashes(accumulated));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use acc_test_utils::fixtures::{create_hash, work_report, work_report_with_deps};

    fn record(package: u32, deps: &[u32]) -> ReadyRecord {
        ReadyRecord::new(
            work_report_with_deps(package, deps),
            deps.iter().map(|d| create_hash(*d)).collect(),
        )
    }

    fn filled_queue() -> AccumulateQueue {
        let mut queue = AccumulateQueue::new();
        for (slot, entry) in queue.items.iter_mut().enumerate() {
            let package = slot as u32 + 100;
            entry.push(record(package, &[package + 1_000]));
        }
        queue
    }

    #[test]
    fn test_history_shift_appends_newest() -> Result<(), TransitionError> {
        let mut history = AccumulateHistory::default();
        for i in 0..EPOCH_LENGTH as u32 {
            history.add(BTreeSet::from([create_hash(i)]));
        }
        let oldest_kept = history.items[1].clone();

        let reports = vec![work_report(13), work_report(14)];
        transition_accumulate_history(&mut history, &reports, 1)?;

        assert_eq!(history.items.len(), EPOCH_LENGTH);
        assert_eq!(history.items[0], oldest_kept);
        assert_eq!(history.last_history(), Some(&BTreeSet::from([create_hash(13)])));
        assert!(!history.contains(&create_hash(0)));
        Ok(())
    }

    #[test]
    fn test_history_rejects_count_out_of_range() {
        let mut history = AccumulateHistory::default();
        let result = transition_accumulate_history(&mut history, &[work_report(1)], 2);
        assert!(matches!(
            result,
            Err(TransitionError::AccumulateCountOutOfRange { count: 2, len: 1 })
        ));
        assert_eq!(history, AccumulateHistory::default());
    }

    #[test]
    fn test_queue_next_slot_clears_nothing() -> Result<(), TransitionError> {
        let mut queue = filled_queue();
        let before = queue.records_count();

        transition_accumulate_queue(
            &mut queue,
            &[],
            &BTreeSet::new(),
            Timeslot::new(4),
            Timeslot::new(5),
        )?;

        // Only slot `m` is replaced by the (empty) newly queued reports.
        assert_eq!(queue.records_count(), before - 1);
        assert!(queue.get_circular(5).is_empty());
        assert_eq!(queue.get_circular(4).len(), 1);
        Ok(())
    }

    #[test]
    fn test_queue_skipped_slots_cleared() -> Result<(), TransitionError> {
        let mut queue = filled_queue();
        let new_records = vec![record(7, &[8])];

        transition_accumulate_queue(
            &mut queue,
            &new_records,
            &BTreeSet::new(),
            Timeslot::new(2),
            Timeslot::new(5),
        )?;

        assert_eq!(queue.get_circular(5), &new_records);
        assert!(queue.get_circular(4).is_empty());
        assert!(queue.get_circular(3).is_empty());
        assert_eq!(queue.get_circular(2).len(), 1);
        assert_eq!(queue.records_count(), EPOCH_LENGTH - 2);
        Ok(())
    }

    #[test]
    fn test_queue_gap_of_epoch_or_more_keeps_only_current_slot() -> Result<(), TransitionError> {
        let mut queue = filled_queue();
        let new_records = vec![record(7, &[8])];
        let curr = Timeslot::new(3 * EPOCH_LENGTH as u32 + 1);

        transition_accumulate_queue(
            &mut queue,
            &new_records,
            &BTreeSet::new(),
            Timeslot::new(1),
            curr,
        )?;

        assert_eq!(queue.records_count(), 1);
        assert_eq!(queue.get_circular(curr.slot_phase() as isize), &new_records);
        Ok(())
    }

    #[test]
    fn test_queue_older_slots_edited_by_newest_packages() -> Result<(), TransitionError> {
        let mut queue = filled_queue();
        // Resolves the dependency of the record at slot 1 and accumulates the one at slot 2.
        let accumulated = BTreeSet::from([create_hash(1_101), create_hash(102)]);
        let new_records = vec![record(7, &[102, 9])];

        transition_accumulate_queue(
            &mut queue,
            &new_records,
            &accumulated,
            Timeslot::new(5),
            Timeslot::new(6),
        )?;

        assert!(queue.get_circular(1)[0].is_ready());
        assert!(queue.get_circular(2).is_empty());
        assert_eq!(
            queue.get_circular(6)[0].dependencies,
            BTreeSet::from([create_hash(9)])
        );
        Ok(())
    }

    #[test]
    fn test_queue_rejects_non_increasing_timeslot() {
        let mut queue = filled_queue();
        let before = queue.clone();
        let result = transition_accumulate_queue(
            &mut queue,
            &[],
            &BTreeSet::new(),
            Timeslot::new(5),
            Timeslot::new(5),
        );
        assert!(matches!(
            result,
            Err(TransitionError::InvalidTimeslot { prior: 5, curr: 5 })
        ));
        assert_eq!(queue, before);
    }
}
