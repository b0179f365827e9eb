use acc_common::{workloads::WorkReport, ServiceId, WorkPackageHash};
use acc_pvm_types::invoke_args::DeferredTransfer;
use acc_state::types::{AccumulateHistory, AccumulateQueue, ReadyRecord, Timeslot};
use std::collections::BTreeSet;

/// Accumulatable work reports in this block.
/// Represents **`R^*`** of the GP.
pub type AccumulatableReports = Vec<WorkReport>;
/// Newly queued work reports paired with their dependencies.
/// Represents **`R^Q`** of the GP.
pub type QueuedReports = Vec<ReadyRecord>;

/// Output of the greedy release; reports released in topological order and
/// the records still blocked on unaccumulated dependencies.
#[derive(Debug, Default)]
pub struct ReleasedReports {
    pub released: Vec<WorkReport>,
    pub blocked: Vec<ReadyRecord>,
}

/// Pairs the given work report with its dependencies; prerequisite package hashes
/// and segment lookup dictionary keys included in the report.
///
/// A report's own package hash is never kept as a dependency of itself.
///
/// Represents function *`D`* of the GP.
pub fn work_report_deps(report: &WorkReport) -> ReadyRecord {
    let mut deps = report.prerequisites().clone();
    deps.extend(report.segment_roots_lookup.keys().cloned());
    deps.remove(report.work_package_hash());

    ReadyRecord::new(report.clone(), deps)
}

/// Edits the accumulation queue based on the newly accumulated work package hashes.
///
/// Records whose own package got accumulated are dropped, and the accumulated hashes are
/// removed from the dependencies of the remaining ones. Relative order is preserved.
///
/// Represents function *`E`* of the GP.
pub fn edit_queue(
    queue: &[ReadyRecord],
    new_accumulated_packages: &BTreeSet<WorkPackageHash>,
) -> Vec<ReadyRecord> {
    queue
        .iter()
        .filter(|record| !new_accumulated_packages.contains(record.work_package_hash()))
        .map(|record| ReadyRecord {
            report: record.report.clone(),
            dependencies: record
                .dependencies
                .difference(new_accumulated_packages)
                .cloned()
                .collect(),
        })
        .collect()
}

/// Releases queued reports layer by layer: every record without dependencies is released in
/// queue order, its package hash is removed from the rest of the queue, and the process repeats
/// until no record is free. Records left in a dependency cycle stay blocked.
pub fn release_ready_reports(queue: &[ReadyRecord]) -> ReleasedReports {
    let mut released = Vec::new();
    let mut pending = queue.to_vec();

    loop {
        let (ready, blocked): (Vec<_>, Vec<_>) =
            pending.into_iter().partition(ReadyRecord::is_ready);
        if ready.is_empty() {
            return ReleasedReports { released, blocked };
        }

        let ready_reports: Vec<WorkReport> = ready.into_iter().map(|r| r.report).collect();
        pending = edit_queue(&blocked, &reports_to_package_hashes(&ready_reports));
        released.extend(ready_reports);
    }
}

/// Extracts work reports ready for accumulation from the given not-yet-accumulated
/// work reports, resolving dependencies among them.
///
/// Represents function *`Q`* of the GP.
pub fn extract_accumulatables(queue: &[ReadyRecord]) -> Vec<WorkReport> {
    release_ready_reports(queue).released
}

/// Extracts the corresponding work package hashes from the given work reports.
///
/// Represents function *`P`* of the GP.
pub fn reports_to_package_hashes(reports: &[WorkReport]) -> BTreeSet<WorkPackageHash> {
    reports
        .iter()
        .map(|wr| wr.work_package_hash().clone())
        .collect()
}

/// Partitions available work reports into two groups based on the presence of dependencies.
///
/// This function is used for partitioning available reports **`R`** into
/// **`R^!`** and the reports to be queued.
pub fn partition_reports_by_deps(
    available_reports: Vec<WorkReport>,
) -> (Vec<WorkReport>, Vec<WorkReport>) {
    available_reports
        .into_iter()
        .partition(|wr| wr.prerequisites().is_empty() && wr.segment_roots_lookup.is_empty())
}

/// Builds the newly queued records from reports with dependencies, dropping dependencies
/// already accumulated within the last epoch.
///
/// The output represents **`R^Q`** of the GP.
fn extract_queued_reports(
    reports_with_deps: &[WorkReport],
    accumulate_history_union: &BTreeSet<WorkPackageHash>,
) -> QueuedReports {
    let records: Vec<ReadyRecord> = reports_with_deps.iter().map(work_report_deps).collect();
    edit_queue(&records, accumulate_history_union)
}

/// Returns accumulatable work reports in this block, including reports with no dependency and
/// queued reports that became accumulatable after their dependencies got resolved.
///
/// The output represents a pair of (**`R^*`**, **`R^Q`**).
pub fn collect_accumulatable_reports(
    available_reports: Vec<WorkReport>,
    accumulate_queue: &AccumulateQueue,
    accumulate_history: &AccumulateHistory,
    curr_timeslot: Timeslot,
) -> (AccumulatableReports, QueuedReports) {
    let (mut accumulatables, reports_with_deps) = partition_reports_by_deps(available_reports);
    let mut queue = accumulate_queue.partition_by_slot_phase_and_flatten(curr_timeslot);

    let new_reports_queued =
        extract_queued_reports(&reports_with_deps, &accumulate_history.union());
    queue.extend(new_reports_queued.iter().cloned());

    let queue_resolved = extract_accumulatables(&edit_queue(
        &queue,
        &reports_to_package_hashes(&accumulatables),
    ));

    accumulatables.extend(queue_resolved);
    (accumulatables, new_reports_queued)
}

/// Selects and sorts deferred transfers for a specific `destination`.
///
/// Transfers are filtered by the destination, then ordered by sender and,
/// for the same sender, by their position in `transfers`.
///
/// Represents function *`R`* of the GP.
pub fn select_deferred_transfers(
    transfers: &[DeferredTransfer],
    destination: ServiceId,
) -> Vec<DeferredTransfer> {
    let mut selected = transfers
        .iter()
        .enumerate()
        .filter(|(_, t)| t.to == destination)
        .collect::<Vec<_>>();
    selected.sort_by_key(|(emission_idx, t)| (t.from, *emission_idx));

    selected.into_iter().map(|(_, t)| t.clone()).collect()
}
