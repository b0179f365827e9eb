use acc_common::{
    workloads::{AvailSpecs, RefinementContext, SegmentRootLookupTable, WorkDigest, WorkReport},
    Balance, Hash32, ServiceId, UnsignedGas,
};
use acc_pvm_types::{invoke_args::DeferredTransfer, partial_state::AccumulatePartialState};
use acc_state::types::{AccountMetadata, ServiceAccount, ServiceAccounts};
use std::collections::BTreeMap;

/// Balance of accounts created by `partial_state_with_accounts`.
pub const DEFAULT_TEST_BALANCE: Balance = 1_000;

/// A hash whose first four bytes hold `seed` in little-endian order.
pub fn create_hash(seed: u32) -> Hash32 {
    let mut bytes = [0u8; 32];
    bytes[..4].copy_from_slice(&seed.to_le_bytes());
    Hash32::new(bytes)
}

/// A work report for the package hash `create_hash(package)`, with no dependencies or digests.
pub fn work_report(package: u32) -> WorkReport {
    WorkReport {
        specs: AvailSpecs {
            work_package_hash: create_hash(package),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn work_report_with_deps(package: u32, prerequisites: &[u32]) -> WorkReport {
    let mut report = work_report(package);
    report.refinement_context = RefinementContext {
        prerequisite_work_packages: prerequisites.iter().map(|p| create_hash(*p)).collect(),
        ..Default::default()
    };
    report
}

/// Adds segment-root lookup entries keyed by `create_hash(package)` for each of `packages`.
pub fn work_report_with_segment_lookups(mut report: WorkReport, packages: &[u32]) -> WorkReport {
    let lookups: BTreeMap<_, _> = packages
        .iter()
        .map(|p| (create_hash(*p), create_hash(p.wrapping_add(1_000))))
        .collect();
    report.segment_roots_lookup = SegmentRootLookupTable::new(lookups);
    report
}

/// A work report carrying one digest per `(service, gas_limit)` pair, in the given order.
pub fn work_report_with_digests(package: u32, digests: &[(ServiceId, UnsignedGas)]) -> WorkReport {
    let mut report = work_report(package);
    report.digests = digests
        .iter()
        .map(|(service_id, gas)| WorkDigest {
            service_id: *service_id,
            payload_hash: create_hash(package),
            accumulate_gas_limit: *gas,
            ..Default::default()
        })
        .collect();
    report
}

pub fn deferred_transfer(
    from: ServiceId,
    to: ServiceId,
    amount: Balance,
    gas_limit: UnsignedGas,
) -> DeferredTransfer {
    DeferredTransfer {
        from,
        to,
        amount,
        gas_limit,
        ..Default::default()
    }
}

pub fn service_account(balance: Balance) -> ServiceAccount {
    ServiceAccount::new(AccountMetadata {
        balance,
        ..Default::default()
    })
}

pub fn service_accounts(entries: &[(ServiceId, Balance)]) -> ServiceAccounts {
    entries
        .iter()
        .map(|(id, balance)| (*id, service_account(*balance)))
        .collect()
}

/// A partial state holding an account with `DEFAULT_TEST_BALANCE` for each of `service_ids`.
pub fn partial_state_with_accounts(service_ids: &[ServiceId]) -> AccumulatePartialState {
    AccumulatePartialState {
        accounts: service_ids
            .iter()
            .map(|id| (*id, service_account(DEFAULT_TEST_BALANCE)))
            .collect(),
        ..Default::default()
    }
}
