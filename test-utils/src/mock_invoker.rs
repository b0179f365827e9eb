use acc_common::{AccumulateOutputHash, Balance, Octets, ServiceId, UnsignedGas};
use acc_pvm_interface::{error::PVMError, PVMInvoker};
use acc_pvm_types::{
    invoke_args::{AccumulateInvokeArgs, DeferredTransfer, OnTransferInvokeArgs},
    invoke_results::{AccumulateResult, OnTransferResult, ProvidedPreimage},
    partial_state::{AccumulatePartialState, PartialStateFragment},
};
use acc_state::types::ServiceAccounts;
use async_trait::async_trait;
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

/// Scripted outcome of a service's accumulate invocation.
#[derive(Clone, Debug, Default)]
pub struct AccumulateScript {
    /// Transfers to emit, as `(to, amount, gas_limit)`, in emission order.
    pub transfers: Vec<(ServiceId, Balance, UnsignedGas)>,
    pub output_hash: Option<AccumulateOutputHash>,
    /// Replaces the default host update when set.
    pub fragment: Option<PartialStateFragment>,
    pub provided_preimages: Vec<ProvidedPreimage>,
    /// Reported gas usage. When unset, an invocation with operands uses its full gas limit and
    /// one without operands uses none.
    pub gas_used: Option<UnsignedGas>,
}

#[derive(Clone, Debug)]
pub struct AccumulateCall {
    pub service_id: ServiceId,
    pub gas_limit: UnsignedGas,
    pub operands_count: usize,
    /// Address of the shared snapshot the invocation observed.
    pub snapshot_id: usize,
    pub observed_balances: Vec<(ServiceId, Balance)>,
}

#[derive(Clone, Debug)]
pub struct OnTransferCall {
    pub destination: ServiceId,
    pub transfers: Vec<DeferredTransfer>,
}

/// A deterministic stand-in for the VM.
///
/// By default an accumulation with operands writes the operand count into the host's storage,
/// emits nothing and uses its whole gas limit. One without operands has no effect and uses no
/// gas. An on-transfer invocation uses 10 gas per
/// transfer and leaves the receiver unchanged.
#[derive(Default)]
pub struct MockInvoker {
    accumulate_scripts: BTreeMap<ServiceId, AccumulateScript>,
    on_transfer_results: BTreeMap<ServiceId, OnTransferResult>,
    failing_services: BTreeSet<ServiceId>,
    panicking_services: BTreeSet<ServiceId>,
    completion_delays_ms: BTreeMap<ServiceId, u64>,
    accumulate_calls: Mutex<Vec<AccumulateCall>>,
    on_transfer_calls: Mutex<Vec<OnTransferCall>>,
}

pub const ON_TRANSFER_GAS_PER_TRANSFER: UnsignedGas = 10;

/// Storage key under which the default accumulation records its operand count.
pub const OPERANDS_COUNT_KEY: &[u8] = b"operands_count";

impl MockInvoker {
    pub fn with_accumulate_script(mut self, service_id: ServiceId, script: AccumulateScript) -> Self {
        self.accumulate_scripts.insert(service_id, script);
        self
    }

    pub fn with_on_transfer_result(mut self, service_id: ServiceId, result: OnTransferResult) -> Self {
        self.on_transfer_results.insert(service_id, result);
        self
    }

    /// Makes both entry points of the service return an error.
    pub fn with_failing_service(mut self, service_id: ServiceId) -> Self {
        self.failing_services.insert(service_id);
        self
    }

    pub fn with_panicking_service(mut self, service_id: ServiceId) -> Self {
        self.panicking_services.insert(service_id);
        self
    }

    /// Delays completion of the service's invocations.
    pub fn with_completion_delay(mut self, service_id: ServiceId, delay_ms: u64) -> Self {
        self.completion_delays_ms.insert(service_id, delay_ms);
        self
    }

    pub fn accumulate_calls(&self) -> Vec<AccumulateCall> {
        self.accumulate_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn on_transfer_calls(&self) -> Vec<OnTransferCall> {
        self.on_transfer_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn delay(&self, service_id: ServiceId) {
        if let Some(delay_ms) = self.completion_delays_ms.get(&service_id) {
            tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
        }
    }

    fn check_failure(&self, service_id: ServiceId) -> Result<(), PVMError> {
        if self.panicking_services.contains(&service_id) {
            panic!("scripted panic of service {service_id}");
        }
        if self.failing_services.contains(&service_id) {
            return Err(PVMError::InvocationTrapped(format!(
                "scripted failure of service {service_id}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PVMInvoker for MockInvoker {
    async fn accumulate(
        &self,
        partial_state: Arc<AccumulatePartialState>,
        args: AccumulateInvokeArgs,
    ) -> Result<AccumulateResult, PVMError> {
        let host = args.accumulate_host;
        self.accumulate_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(AccumulateCall {
                service_id: host,
                gas_limit: args.gas_limit,
                operands_count: args.operands.len(),
                snapshot_id: Arc::as_ptr(&partial_state) as usize,
                observed_balances: partial_state
                    .accounts
                    .iter()
                    .map(|(id, a)| (*id, a.metadata.balance))
                    .collect(),
            });

        self.delay(host).await;
        self.check_failure(host)?;

        let Some(host_account) = partial_state.account(host) else {
            return Err(PVMError::AccountNotFound(host));
        };

        let script = self.accumulate_scripts.get(&host).cloned().unwrap_or_default();
        let default_gas_used = if args.operands.is_empty() {
            0
        } else {
            args.gas_limit
        };
        let state_changes = match script.fragment {
            Some(fragment) => fragment,
            None if args.operands.is_empty() => PartialStateFragment::default(),
            None => {
                let mut account = host_account.clone();
                account.storage.insert(
                    Octets::new(OPERANDS_COUNT_KEY),
                    Octets::new(&(args.operands.len() as u32).to_le_bytes()),
                );
                PartialStateFragment {
                    host_account: Some(account),
                    ..Default::default()
                }
            }
        };

        Ok(AccumulateResult {
            state_changes,
            deferred_transfers: script
                .transfers
                .iter()
                .map(|(to, amount, gas_limit)| DeferredTransfer {
                    from: host,
                    to: *to,
                    amount: *amount,
                    gas_limit: *gas_limit,
                    ..Default::default()
                })
                .collect(),
            yielded_accumulate_hash: script.output_hash,
            gas_used: script.gas_used.unwrap_or(default_gas_used),
            provided_preimages: script.provided_preimages,
        })
    }

    async fn on_transfer(
        &self,
        _accounts: Arc<ServiceAccounts>,
        args: OnTransferInvokeArgs,
    ) -> Result<OnTransferResult, PVMError> {
        let destination = args.destination;
        self.on_transfer_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(OnTransferCall {
                destination,
                transfers: args.transfers.clone(),
            });

        self.delay(destination).await;
        self.check_failure(destination)?;

        if let Some(result) = self.on_transfer_results.get(&destination) {
            return Ok(result.clone());
        }
        Ok(OnTransferResult {
            gas_used: ON_TRANSFER_GAS_PER_TRANSFER * args.transfers.len() as UnsignedGas,
            recipient_account: None,
        })
    }
}
