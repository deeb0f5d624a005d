//! Runs a commissioning engine on tokio timers.

use tokio::{
    sync::mpsc::{self, error::TrySendError},
    time::{self, Duration, Instant},
};
use tracing::debug;

use crate::{
    binding::BindingTable,
    cluster::ClusterId,
    commissioning::{CommissioningEngine, Responder},
    config::CommissioningConfig,
    data_model::EndpointId,
    error::Result,
    network::{Network, NetworkResponse},
    scheduler::Scheduler,
};

/// Keeps the deadline of the next tick
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TokioEventControl {
    deadline: Option<Instant>,
}

impl TokioEventControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl Scheduler for TokioEventControl {
    fn schedule_now(&mut self) {
        self.deadline = Some(Instant::now());
    }

    fn schedule_after(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
    }

    fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// Posts responses to a [`TokioDriver`] and wakes it up
#[derive(Debug, Clone)]
pub struct DriverResponder {
    responder: Responder,
    wake: mpsc::Sender<()>,
}

impl DriverResponder {
    pub fn post(&self, response: impl Into<NetworkResponse>) -> Result<()> {
        self.responder.post(response)?;
        match self.wake.try_send(()) {
            // A wakeup is already pending
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Closed(())) => debug!("driver is gone"),
        }
        Ok(())
    }
}

pub struct TokioDriver<N, B> {
    engine: CommissioningEngine<N, B, TokioEventControl>,
    wake_sender: mpsc::Sender<()>,
    wake: mpsc::Receiver<()>,
}

impl<N, B> TokioDriver<N, B>
where
    N: Network,
    B: BindingTable,
{
    pub fn new(network: N, bindings: B) -> Self {
        Self::with_config(network, bindings, CommissioningConfig::default())
    }

    pub fn with_config(network: N, bindings: B, config: CommissioningConfig) -> Self {
        let (wake_sender, wake) = mpsc::channel(1);
        Self {
            engine: CommissioningEngine::with_config(
                network,
                bindings,
                TokioEventControl::new(),
                config,
            ),
            wake_sender,
            wake,
        }
    }

    pub fn engine(&self) -> &CommissioningEngine<N, B, TokioEventControl> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut CommissioningEngine<N, B, TokioEventControl> {
        &mut self.engine
    }

    pub fn start(
        &mut self,
        local_endpoint: EndpointId,
        is_server: bool,
        clusters: &[ClusterId],
    ) -> Result<()> {
        self.engine.start(local_endpoint, is_server, clusters)
    }

    pub fn responder(&self) -> DriverResponder {
        DriverResponder {
            responder: self.engine.responder(),
            wake: self.wake_sender.clone(),
        }
    }

    /// Tick the engine whenever its deadline passes and hand it posted
    /// responses, until the session has stopped.
    pub async fn run_until_idle(&mut self) {
        loop {
            self.engine.process_responses();
            match self.engine.scheduler().deadline() {
                Some(deadline) => {
                    tokio::select! {
                        _ = time::sleep_until(deadline) => {
                            self.engine.scheduler_mut().cancel();
                            self.engine.tick();
                        }
                        _ = self.wake.recv() => {}
                    }
                }
                // A request is in flight
                None if self.engine.is_active() => {
                    self.wake.recv().await;
                }
                None => {
                    debug!("commissioning idle");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        binding::MemoryBindingTable,
        cluster::{ClusterList, CLUSTER_ID_ON_OFF},
        constants::IDENTIFY_RESPONSE_WAIT,
        network::{ClusterDiscoveryResult, IdentifyQueryResponse, IeeeAddressResult},
        test_utils::{MockNetwork, REMOTE, REMOTE_EUI64},
        CommissioningState,
    };

    #[tokio::test(start_paused = true)]
    async fn test_driver_stops_when_nobody_answers() {
        let mut driver = TokioDriver::new(MockNetwork::joined(), MemoryBindingTable::<4>::new());
        driver.start(1, false, &[CLUSTER_ID_ON_OFF]).unwrap();

        let started = Instant::now();
        driver.run_until_idle().await;
        assert!(started.elapsed() >= IDENTIFY_RESPONSE_WAIT);
        assert_eq!(driver.engine().status(), CommissioningState::Stop);
        assert!(driver.engine().bindings().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_commissions_a_device() {
        let mut driver = TokioDriver::new(MockNetwork::joined(), MemoryBindingTable::<4>::new());
        driver.start(1, false, &[CLUSTER_ID_ON_OFF]).unwrap();

        let responder = driver.responder();
        tokio::spawn(async move {
            let step = Duration::from_millis(100);
            time::sleep(step).await;
            responder
                .post(IdentifyQueryResponse {
                    source: REMOTE,
                    endpoint: 2,
                    timeout: 60,
                })
                .unwrap();
            time::sleep(step).await;
            responder
                .post(ClusterDiscoveryResult::found(
                    REMOTE,
                    2,
                    ClusterList::new(&[CLUSTER_ID_ON_OFF], &[]),
                ))
                .unwrap();
            time::sleep(step).await;
            responder
                .post(IeeeAddressResult::found(REMOTE, REMOTE_EUI64))
                .unwrap();
        });

        driver.run_until_idle().await;
        assert_eq!(driver.engine().status(), CommissioningState::Stop);
        assert_eq!(driver.engine().bindings().len(), 1);
        assert_eq!(driver.engine().bindings().remote_node_id(0), Some(REMOTE));
    }
}
