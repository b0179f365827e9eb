use crate::{context::InvocationContext, error::PVMInvokeError};
use acc_common::{workloads::WorkReport, ServiceId, TimeslotIndex, UnsignedGas};
use acc_crypto::{hash, Blake2b256};
use acc_pvm_interface::{error::PVMError, PVMInvoker};
use acc_pvm_types::{
    invoke_args::{AccumulateInvokeArgs, AccumulateOperand, DeferredTransfer},
    invoke_results::{
        AccumulateResult, AccumulationGasPair, AccumulationGasPairs, AccumulationOutputPairs,
        ProvidedPreimage,
    },
    partial_state::{AccumulatePartialState, PartialStateFragment},
};
use acc_state::types::AlwaysAccumulateServices;
use std::{collections::BTreeSet, sync::Arc};
use tracing::instrument;

#[derive(Debug, Default)]
pub struct OuterAccumulationResult {
    /// `n`: The total number of work reports accumulated.
    pub accumulated_reports_count: usize,
    /// **`o′`**: The union of posterior partial state of all service accounts.
    pub partial_state_union: AccumulatePartialState,
    /// **`t`**: Deferred transfers of all rounds, grouped by source service within each round.
    pub deferred_transfers: Vec<DeferredTransfer>,
    /// **`b`**: The posterior accumulation output log; service ids and accumulation output hashes.
    pub service_output_pairs: AccumulationOutputPairs,
    /// **`u`**: Pairs of service ids and gas usages.
    pub service_gas_pairs: AccumulationGasPairs,
}

impl OuterAccumulationResult {
    pub fn total_gas_used(&self) -> UnsignedGas {
        self.service_gas_pairs.iter().map(|pair| pair.gas).sum()
    }
}

#[inline]
fn max_processable_reports(reports: &[WorkReport], gas_limit: UnsignedGas) -> usize {
    let mut max_processable = 0;
    let mut gas_counter: UnsignedGas = 0;

    for report in reports {
        let report_gas_usage = report.total_accumulation_gas_allotted();
        match gas_counter.checked_add(report_gas_usage) {
            Some(total) if total <= gas_limit => gas_counter = total,
            _ => break,
        }
        max_processable += 1;
    }

    max_processable
}

/// Accumulates the longest prefix of `reports` that fits the gas limit, in rounds.
///
/// Each round runs `Δ*` over the reports that fit the remaining gas; the gas used is then
/// deducted and the next round picks up the following reports. Always-accumulate services
/// are only invoked in the first round, and their gas is reserved before sizing its prefix.
///
/// Represents `Δ+` of the GP.
#[instrument(level = "debug", skip_all, name = "acc_seq")]
pub async fn accumulate_outer<I: PVMInvoker>(
    ctx: &InvocationContext<I>,
    gas_limit: UnsignedGas,
    reports: &[WorkReport],
    partial_state: AccumulatePartialState,
    always_accumulate_services: &AlwaysAccumulateServices,
) -> Result<OuterAccumulationResult, PVMInvokeError> {
    let mut always_accumulate_services = Some(always_accumulate_services.clone());
    let mut report_idx = 0usize; // i
    let mut remaining_gas_limit = gas_limit;

    let mut partial_state_union = partial_state;
    let mut service_gas_pairs_flattened = Vec::new();
    let mut service_output_pairs_flattened = AccumulationOutputPairs::new();
    let mut deferred_transfers = Vec::new();

    loop {
        // All always-accumulate services must be processed in the initial round.
        let always_accumulate_services = always_accumulate_services.take().unwrap_or_default();
        let reserved_gas = always_accumulate_services
            .values()
            .fold(0 as UnsignedGas, |acc, gas| acc.saturating_add(*gas));

        let processable_reports = max_processable_reports(
            &reports[report_idx..],
            remaining_gas_limit.saturating_sub(reserved_gas),
        );
        if processable_reports == 0 && always_accumulate_services.is_empty() {
            break;
        }

        let reports_to_process = reports[report_idx..report_idx + processable_reports].to_vec();

        let ParallelAccumulationResult {
            service_gas_pairs,
            new_deferred_transfers,
            service_output_pairs,
        } = accumulate_parallel(
            ctx,
            Arc::new(reports_to_process),
            Arc::new(always_accumulate_services),
            &mut partial_state_union,
        )
        .await?;

        let gas_used: UnsignedGas = service_gas_pairs.iter().map(|pair| pair.gas).sum();
        tracing::info!(
            "Δ* Executed: reports={processable_reports} gas_used={gas_used} transfers={} outputs={}",
            new_deferred_transfers.len(),
            service_output_pairs.len(),
        );

        report_idx += processable_reports;
        remaining_gas_limit = remaining_gas_limit.saturating_sub(gas_used);
        deferred_transfers.extend(new_deferred_transfers);
        service_gas_pairs_flattened.extend(service_gas_pairs);
        service_output_pairs_flattened.extend(service_output_pairs);
    }

    Ok(OuterAccumulationResult {
        accumulated_reports_count: report_idx,
        partial_state_union,
        deferred_transfers,
        service_output_pairs: service_output_pairs_flattened,
        service_gas_pairs: service_gas_pairs_flattened,
    })
}

struct ParallelAccumulationResult {
    /// **`u*`**: Amount of gas used for each service while executing `Δ*`.
    service_gas_pairs: AccumulationGasPairs,
    /// **`t*`**: All deferred transfers created while executing `Δ*`.
    new_deferred_transfers: Vec<DeferredTransfer>,
    /// **`b*`**: All accumulation outputs created while executing `Δ*`.
    service_output_pairs: AccumulationOutputPairs,
}

/// Merges changes produced by a single-service accumulation into the `partial_state_union`.
///
/// Shared pools are written only by the service holding the matching role in the round's
/// base snapshot: the staging set by the designate service, each core's auth queue by that
/// core's assigner, the privileges by the manager. Each pool has a single eligible writer,
/// so the merged result doesn't depend on the order fragments are merged in.
fn merge_partial_state_change(
    base: &AccumulatePartialState,
    accumulate_host: ServiceId,
    partial_state_union: &mut AccumulatePartialState,
    ejected_accounts: &mut BTreeSet<ServiceId>,
    changes: PartialStateFragment,
) {
    let base_privileges = &base.privileges;

    if let Some(new_staging_set) = changes.new_staging_set {
        if accumulate_host == base_privileges.designate_service {
            partial_state_union.staging_set = new_staging_set;
        } else {
            tracing::debug!("Ignored staging set change by non-designate service {accumulate_host}");
        }
    }

    if let Some(new_auth_queue) = changes.new_auth_queue {
        for (core_idx, assigner) in base_privileges.assign_services.iter().enumerate() {
            if *assigner == accumulate_host {
                partial_state_union.auth_queue[core_idx] = new_auth_queue[core_idx].clone();
            }
        }
    }

    if let Some(new_privileges) = changes.new_privileges {
        if accumulate_host == base_privileges.manager_service {
            partial_state_union.privileges = new_privileges;
        } else {
            tracing::debug!("Ignored privileges change by non-manager service {accumulate_host}");
        }
    }

    if let Some(host_account) = changes.host_account {
        partial_state_union
            .accounts
            .insert(accumulate_host, host_account);
    }

    // First creator wins when two hosts allocate the same id in one round.
    for (service_id, account) in changes.new_accounts {
        if base.accounts.contains_key(&service_id) {
            tracing::warn!("Service {accumulate_host} tried to create existing account {service_id}");
            continue;
        }
        partial_state_union
            .accounts
            .entry(service_id)
            .or_insert(account);
    }

    ejected_accounts.extend(changes.ejected_accounts);
}

/// Integrates preimages provided during accumulation into the partial state accounts.
fn add_provided_preimages(
    partial_state_union: &mut AccumulatePartialState,
    provided_preimages: Vec<ProvidedPreimage>,
    curr_timeslot_index: TimeslotIndex,
) -> Result<(), PVMInvokeError> {
    for ProvidedPreimage { service_id, blob } in provided_preimages {
        let Some(account) = partial_state_union.accounts.get_mut(&service_id) else {
            tracing::debug!("Provided preimage target {service_id} not found");
            continue;
        };
        let preimage_hash = hash::<Blake2b256>(&blob)?;
        if !account.provide_preimage(preimage_hash, blob, curr_timeslot_index) {
            tracing::debug!("Provided preimage for {service_id} is already available");
        }
    }
    Ok(())
}

/// Runs one `Δ1` per service with digests in `reports` or an always-accumulate entitlement.
///
/// Every invocation observes the same snapshot of `partial_state_union`. Fragments are merged
/// in ascending service id order once all invocations are complete.
///
/// Represents `Δ*` of the GP.
#[instrument(level = "debug", skip_all, name = "acc_par")]
async fn accumulate_parallel<I: PVMInvoker>(
    ctx: &InvocationContext<I>,
    reports: Arc<Vec<WorkReport>>,
    always_accumulate_services: Arc<AlwaysAccumulateServices>,
    partial_state_union: &mut AccumulatePartialState,
) -> Result<ParallelAccumulationResult, PVMInvokeError> {
    let services_with_digests: BTreeSet<ServiceId> = reports
        .iter()
        .flat_map(|wr| wr.digests.iter())
        .map(|wd| wd.service_id)
        .collect();
    let mut service_ids = services_with_digests;
    service_ids.extend(always_accumulate_services.keys().cloned());
    tracing::debug!("Δ* Services: {service_ids:?}");

    let base = Arc::new(partial_state_union.clone());
    let outcomes = ctx
        .run_per_service(service_ids.into_iter().collect(), |service_id| {
            accumulate_single_service(
                ctx.invoker.clone(),
                base.clone(),
                reports.clone(),
                always_accumulate_services.clone(),
                service_id,
                ctx.curr_timeslot_index,
            )
        })
        .await;

    let mut service_gas_pairs = Vec::with_capacity(outcomes.len());
    let mut service_output_pairs = AccumulationOutputPairs::new();
    let mut new_deferred_transfers = Vec::new();
    let mut provided_preimages = Vec::new();
    let mut ejected_accounts = BTreeSet::new();

    for (service_id, outcome) in outcomes {
        let accumulate_result = outcome.unwrap_or_else(|e| {
            tracing::warn!("Accumulation of service {service_id} failed: {e}");
            AccumulateResult::empty()
        });

        merge_partial_state_change(
            &base,
            service_id,
            partial_state_union,
            &mut ejected_accounts,
            accumulate_result.state_changes,
        );

        service_gas_pairs.push(AccumulationGasPair {
            service: service_id,
            gas: accumulate_result.gas_used,
        });
        if let Some(output_hash) = accumulate_result.yielded_accumulate_hash {
            service_output_pairs.insert(service_id, output_hash);
        }
        new_deferred_transfers.extend(accumulate_result.deferred_transfers);
        provided_preimages.extend(accumulate_result.provided_preimages);
    }

    partial_state_union
        .accounts
        .retain(|service_id, _| !ejected_accounts.contains(service_id));
    add_provided_preimages(
        partial_state_union,
        provided_preimages,
        ctx.curr_timeslot_index,
    )?;

    Ok(ParallelAccumulationResult {
        service_gas_pairs,
        new_deferred_transfers,
        service_output_pairs,
    })
}

/// Invokes the `accumulate` PVM entrypoint for a single service.
///
/// The gas limit is the service's always-accumulate gas plus the gas limits of its digests.
/// Reported gas usage is capped at that limit.
///
/// Represents `Δ1` of the GP.
#[instrument(level = "debug", skip_all, name = "acc_one", fields(service_id = service_id))]
async fn accumulate_single_service<I: PVMInvoker>(
    invoker: Arc<I>,
    partial_state: Arc<AccumulatePartialState>,
    reports: Arc<Vec<WorkReport>>,
    always_accumulate_services: Arc<AlwaysAccumulateServices>,
    service_id: ServiceId,
    curr_timeslot_index: TimeslotIndex,
) -> Result<AccumulateResult, PVMError> {
    let operands = AccumulateOperand::collect_for_service(&reports, service_id);
    let gas_limit = operands.iter().fold(
        always_accumulate_services
            .get(&service_id)
            .cloned()
            .unwrap_or(0),
        |acc, operand| acc.saturating_add(operand.accumulate_gas_limit),
    );

    let mut result = invoker
        .accumulate(
            partial_state,
            AccumulateInvokeArgs {
                curr_timeslot_index,
                accumulate_host: service_id,
                gas_limit,
                operands,
            },
        )
        .await?;
    result.gas_used = result.gas_used.min(gas_limit);

    Ok(result)
}
