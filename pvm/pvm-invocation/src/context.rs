use crate::error::PVMInvokeError;
use acc_common::{ServiceId, TimeslotIndex};
use acc_config::{AccumulateConfig, ExecutionMode};
use acc_pvm_interface::{error::PVMError, PVMInvoker};
use futures::future::join_all;
use std::{future::Future, sync::Arc};
use tokio::sync::Semaphore;

/// Per-block environment shared by every invocation of the accumulation pipeline.
pub struct InvocationContext<I: PVMInvoker> {
    pub invoker: Arc<I>,
    pub config: AccumulateConfig,
    /// `τ′`: The posterior timeslot index of the block.
    pub curr_timeslot_index: TimeslotIndex,
    permits: Arc<Semaphore>,
}

impl<I: PVMInvoker> Clone for InvocationContext<I> {
    fn clone(&self) -> Self {
        Self {
            invoker: self.invoker.clone(),
            config: self.config.clone(),
            curr_timeslot_index: self.curr_timeslot_index,
            permits: self.permits.clone(),
        }
    }
}

impl<I: PVMInvoker> InvocationContext<I> {
    pub fn new(invoker: Arc<I>, config: AccumulateConfig, curr_timeslot_index: TimeslotIndex) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_invocations.max(1)));
        Self {
            invoker,
            config,
            curr_timeslot_index,
            permits,
        }
    }

    /// Runs one task per service and returns the outcomes in the order of `service_ids`.
    ///
    /// In `Concurrent` mode the tasks are spawned and joined as a batch; the output order
    /// does not depend on completion order. A panicked task yields
    /// `PVMInvokeError::InvocationTaskPanicked` for its service.
    pub(crate) async fn run_per_service<T, F, Fut>(
        &self,
        service_ids: Vec<ServiceId>,
        make_task: F,
    ) -> Vec<(ServiceId, Result<T, PVMInvokeError>)>
    where
        T: Send + 'static,
        F: Fn(ServiceId) -> Fut,
        Fut: Future<Output = Result<T, PVMError>> + Send + 'static,
    {
        match self.config.execution_mode {
            ExecutionMode::Sequential => {
                let mut outcomes = Vec::with_capacity(service_ids.len());
                for service_id in service_ids {
                    let outcome = make_task(service_id).await.map_err(PVMInvokeError::from);
                    outcomes.push((service_id, outcome));
                }
                outcomes
            }
            ExecutionMode::Concurrent => {
                let handles = service_ids
                    .iter()
                    .map(|&service_id| {
                        let task = make_task(service_id);
                        let permits = self.permits.clone();
                        tokio::spawn(async move {
                            let _permit = permits.acquire_owned().await;
                            task.await
                        })
                    })
                    .collect::<Vec<_>>();

                service_ids
                    .into_iter()
                    .zip(join_all(handles).await)
                    .map(|(service_id, joined)| {
                        let outcome = match joined {
                            Ok(res) => res.map_err(PVMInvokeError::from),
                            Err(_) => Err(PVMInvokeError::InvocationTaskPanicked(service_id)),
                        };
                        (service_id, outcome)
                    })
                    .collect()
            }
        }
    }
}
