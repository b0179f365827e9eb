use crate::{
    block_context::BlockContext,
    error::TransitionError,
    state::{
        accumulate::{transition_accumulate_history, transition_accumulate_queue},
        preimages::transition_preimage_extrinsics,
        services::{
            transition_accumulate_contexts, transition_last_accumulate_at, transition_on_transfer,
        },
        statistics::transition_accumulate_stats,
    },
};
use acc_common::{ServiceId, UnsignedGas};
use acc_config::AccumulateConfig;
use acc_pvm_interface::PVMInvoker;
use acc_pvm_invocation::{
    accumulate::utils::collect_accumulatable_reports, on_transfer::DeferredTransferSettlement,
    InvocationContext,
};
use acc_pvm_types::invoke_results::{AccumulationGasPairs, AccumulationOutputPairs};
use acc_state::types::{AccumulateStats, OnTransferStats};
use std::{collections::BTreeMap, sync::Arc};
use tracing::instrument;

/// Outputs of the accumulation transition that are consumed outside of the accumulation state.
#[derive(Debug, Default)]
pub struct AccumulationSummary {
    /// `n`: The number of accumulated work reports.
    pub accumulated_reports_count: usize,
    /// **`θ′`**: Accumulation outputs, to be committed into the block's accumulate root.
    pub service_output_pairs: AccumulationOutputPairs,
    /// **`u`**: Gas used by each accumulation invocation, in invocation order. A service
    /// accumulated in several rounds appears once per round.
    pub service_gas_pairs: AccumulationGasPairs,
    /// Gas used by each invoked service, summed over all rounds. Includes always-accumulate
    /// services without accumulated digests.
    pub service_gas_used: BTreeMap<ServiceId, UnsignedGas>,
    /// **`I`**
    pub accumulate_stats: AccumulateStats,
    /// **`X`**
    pub on_transfer_stats: OnTransferStats,
}

/// Runs the accumulation of a block over `ctx`, writing the posterior service accounts,
/// privileged pools, accumulate queue, accumulate history and timeslot.
///
/// The preimages extrinsic of the block is integrated into the settled accounts (`δ‡`).
///
/// The posterior is left untouched when an error is returned.
#[instrument(level = "debug", skip_all, name = "acc_stf")]
pub async fn transition_accumulation<I: PVMInvoker>(
    ctx: &mut BlockContext,
    invoker: Arc<I>,
    config: AccumulateConfig,
) -> Result<AccumulationSummary, TransitionError> {
    config.validate()?;

    let prior = ctx.prior_snapshot();
    let prior_timeslot = prior.timeslot;
    let curr_timeslot = ctx.inputs().timeslot;
    if curr_timeslot <= prior_timeslot {
        return Err(TransitionError::InvalidTimeslot {
            prior: prior_timeslot.slot(),
            curr: curr_timeslot.slot(),
        });
    }

    // R^* and R^Q
    let (accumulatable_reports, queued_reports) = collect_accumulatable_reports(
        ctx.inputs().available_reports.clone(),
        &prior.accumulate_queue,
        &prior.accumulate_history,
        curr_timeslot,
    );
    tracing::debug!(
        "Accumulatable reports: {} queued: {}",
        accumulatable_reports.len(),
        queued_reports.len()
    );

    let invocation_ctx = InvocationContext::new(invoker, config, curr_timeslot.slot());

    let outer_result = transition_accumulate_contexts(
        &invocation_ctx,
        prior.partial_state(),
        &accumulatable_reports,
    )
    .await?;
    let accumulated_reports_count = outer_result.accumulated_reports_count;

    let DeferredTransferSettlement {
        mut accounts,
        on_transfer_stats,
    } = transition_on_transfer(
        &invocation_ctx,
        outer_result.partial_state_union.accounts.clone(),
        &outer_result.deferred_transfers,
    )
    .await?;

    transition_preimage_extrinsics(&mut accounts, &ctx.inputs().preimages, curr_timeslot)?;

    let accumulated_reports = accumulatable_reports
        .get(..accumulated_reports_count)
        .ok_or(TransitionError::AccumulateCountOutOfRange {
            count: accumulated_reports_count,
            len: accumulatable_reports.len(),
        })?;
    let accumulate_stats =
        transition_accumulate_stats(accumulated_reports, &outer_result.service_gas_pairs);
    transition_last_accumulate_at(&mut accounts, &accumulate_stats, curr_timeslot);

    // Ring buffers are rotated on copies so that a failure leaves the posterior unchanged.
    let mut accumulate_history = ctx.posterior().accumulate_history.clone();
    transition_accumulate_history(
        &mut accumulate_history,
        &accumulatable_reports,
        accumulated_reports_count,
    )?;
    let last_accumulated = accumulate_history
        .last_history()
        .cloned()
        .unwrap_or_default();

    let mut accumulate_queue = ctx.posterior().accumulate_queue.clone();
    transition_accumulate_queue(
        &mut accumulate_queue,
        &queued_reports,
        &last_accumulated,
        prior_timeslot,
        curr_timeslot,
    )?;

    let posterior = ctx.posterior_mut();
    posterior.apply_partial_state_pools(&outer_result.partial_state_union);
    posterior.accounts = accounts;
    posterior.accumulate_history = accumulate_history;
    posterior.accumulate_queue = accumulate_queue;
    posterior.timeslot = curr_timeslot;

    tracing::info!(
        "Accumulated {accumulated_reports_count}/{} reports at slot {curr_timeslot}",
        accumulatable_reports.len()
    );

    let mut service_gas_used = BTreeMap::new();
    for pair in &outer_result.service_gas_pairs {
        let gas: &mut UnsignedGas = service_gas_used.entry(pair.service).or_default();
        *gas = gas.saturating_add(pair.gas);
    }

    Ok(AccumulationSummary {
        accumulated_reports_count,
        service_output_pairs: outer_result.service_output_pairs,
        service_gas_pairs: outer_result.service_gas_pairs,
        service_gas_used,
        accumulate_stats,
        on_transfer_stats,
    })
}
