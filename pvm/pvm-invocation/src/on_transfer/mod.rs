use crate::{
    accumulate::utils::select_deferred_transfers, context::InvocationContext,
    error::PVMInvokeError,
};
use acc_common::{ServiceId, UnsignedGas};
use acc_pvm_interface::PVMInvoker;
use acc_pvm_types::{invoke_args::{DeferredTransfer, OnTransferInvokeArgs}, invoke_results::OnTransferResult};
use acc_state::types::{OnTransferStats, OnTransferStatsEntry, ServiceAccounts};
use std::{collections::BTreeMap, sync::Arc};
use tracing::instrument;

/// Service accounts after all deferred transfers of a block are settled.
#[derive(Debug, Default)]
pub struct DeferredTransferSettlement {
    /// **`δ‡`**: Service accounts with inbound transfers credited.
    pub accounts: ServiceAccounts,
    /// **`X`**: On-transfer statistics of services that received at least one transfer.
    pub on_transfer_stats: OnTransferStats,
}

/// Runs `Ψ_T` once for each account against a shared snapshot of `accounts`, then credits
/// each receiver with the sum of its inbound amounts.
///
/// Amounts are credited whether or not the receiver's code succeeds. A failed invocation keeps
/// the receiver's snapshot state and reports zero gas. A credit that would overflow the
/// receiver's balance also leaves it at its snapshot state. Transfers to services that don't
/// exist are dropped.
#[instrument(level = "debug", skip_all, name = "on_transfer")]
pub async fn settle_deferred_transfers<I: PVMInvoker>(
    ctx: &InvocationContext<I>,
    accounts: ServiceAccounts,
    transfers: &[DeferredTransfer],
) -> Result<DeferredTransferSettlement, PVMInvokeError> {
    let mut inbound: BTreeMap<ServiceId, OnTransferInvokeArgs> = accounts
        .keys()
        .map(|&destination| {
            let args = OnTransferInvokeArgs {
                curr_timeslot_index: ctx.curr_timeslot_index,
                destination,
                transfers: select_deferred_transfers(transfers, destination),
            };
            (destination, args)
        })
        .collect();

    let dropped = transfers
        .iter()
        .filter(|t| !accounts.contains_key(&t.to))
        .count();
    if dropped > 0 {
        tracing::debug!("Dropped {dropped} transfers to unknown services");
    }

    let snapshot = Arc::new(accounts);
    let outcomes = ctx
        .run_per_service(snapshot.keys().cloned().collect(), |service_id| {
            let invoker = ctx.invoker.clone();
            let snapshot = snapshot.clone();
            let args = inbound.get(&service_id).cloned().unwrap_or_default();
            async move {
                tracing::info!("Ψ_T (on_transfer) invoked.");
                invoker.on_transfer(snapshot, args).await
            }
        })
        .await;

    let mut settled = ServiceAccounts::new();
    let mut on_transfer_stats = OnTransferStats::new();

    for (service_id, outcome) in outcomes {
        let Some(args) = inbound.remove(&service_id) else {
            continue;
        };
        let Some(base_account) = snapshot.get(&service_id) else {
            continue;
        };
        let gas_limit: UnsignedGas = args.total_gas_limit();

        let (mut account, gas_used) = match outcome {
            Ok(OnTransferResult {
                gas_used,
                recipient_account,
            }) => (
                recipient_account.unwrap_or_else(|| base_account.clone()),
                gas_used.min(gas_limit),
            ),
            Err(e) => {
                tracing::warn!("On-transfer of service {service_id} failed: {e}");
                (base_account.clone(), 0)
            }
        };

        if let Err(e) = account.credit(service_id, args.total_amount()) {
            tracing::warn!("Settlement of service {service_id} failed: {e}");
            account = base_account.clone();
        }
        settled.insert(service_id, account);

        if !args.transfers.is_empty() {
            on_transfer_stats.insert(
                service_id,
                OnTransferStatsEntry {
                    on_transfers_count: args.transfers.len() as u32,
                    on_transfers_gas_used: gas_used,
                },
            );
        }
    }

    Ok(DeferredTransferSettlement {
        accounts: settled,
        on_transfer_stats,
    })
}
