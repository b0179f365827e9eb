use acc_common::workloads::WorkReport;
use acc_pvm_types::invoke_results::AccumulationGasPairs;
use acc_state::types::AccumulateStats;

/// Builds per-service accumulation statistics of a block.
///
/// Gas usages are summed over all rounds. Digest counts are taken from the accumulated reports
/// (`R^*_{...n}`); services without any accumulated digest are left out.
pub fn transition_accumulate_stats(
    accumulated_reports: &[WorkReport],
    service_gas_pairs: &AccumulationGasPairs,
) -> AccumulateStats {
    let mut stats = AccumulateStats::new();

    for digest in accumulated_reports.iter().flat_map(|wr| wr.digests.iter()) {
        stats.entry(digest.service_id).or_default().accumulate_count += 1;
    }

    for pair in service_gas_pairs {
        if let Some(entry) = stats.get_mut(&pair.service) {
            entry.accumulate_gas_used = entry.accumulate_gas_used.saturating_add(pair.gas);
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use acc_pvm_types::invoke_results::AccumulationGasPair;
    use acc_state::types::AccumulateStatsEntry;
    use acc_test_utils::fixtures::work_report_with_digests;

    #[test]
    fn test_accumulate_stats() {
        let reports = vec![
            work_report_with_digests(1, &[(1, 10), (2, 10)]),
            work_report_with_digests(2, &[(1, 10)]),
        ];
        let gas_pairs = vec![
            AccumulationGasPair { service: 1, gas: 7 },
            AccumulationGasPair { service: 2, gas: 3 },
            // Always-accumulate service without digests.
            AccumulationGasPair { service: 5, gas: 4 },
            // Second round.
            AccumulationGasPair { service: 1, gas: 2 },
        ];

        let stats = transition_accumulate_stats(&reports, &gas_pairs);

        assert_eq!(
            stats,
            AccumulateStats::from([
                (
                    1,
                    AccumulateStatsEntry {
                        accumulate_count: 2,
                        accumulate_gas_used: 9,
                    }
                ),
                (
                    2,
                    AccumulateStatsEntry {
                        accumulate_count: 1,
                        accumulate_gas_used: 3,
                    }
                ),
            ])
        );
    }

    #[test]
    fn test_accumulate_stats_empty() {
        assert!(transition_accumulate_stats(&[], &vec![]).is_empty());
    }
}
