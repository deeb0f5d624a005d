//! The commissioning engine.
//!
//! A session moves through the states of [`CommissioningState`]. Every tick
//! looks the `(state, event)` register up in the [transition table](transition),
//! runs the bound handler, and stores the state it returns. Handlers set the
//! next event themselves and arm the scheduler. While a network request is in
//! flight the event is left at [`CommissioningEvent::Unknown`] and nothing is
//! armed until the matching response comes back.

use tracing::{debug, error, info, warn};

use crate::{
    binding::BindingTable,
    cluster::ClusterId,
    config::CommissioningConfig,
    constants::REMOTE_QUEUE_LEN,
    data_model::EndpointId,
    error::{Error, Result},
    network::{Network, NetworkResponse},
    scheduler::{EventControl, Scheduler},
    util::state::{CommissioningEvent, CommissioningState},
};

mod handlers;
mod inbox;
mod queue;
mod session;
mod skip_mask;
pub mod transition;

pub use inbox::{EmptySlot, Responder};
pub use queue::{CandidateQueue, RemoteCandidate};
pub use session::CommissioningSession;
pub use skip_mask::SkipMask;


/// The `(state, event)` pair the next tick dispatches on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NextTransition {
    pub state: CommissioningState,
    pub event: CommissioningEvent,
}

impl NextTransition {
    pub const IDLE: Self = Self {
        state: CommissioningState::Stop,
        event: CommissioningEvent::Idle,
    };

    pub const fn new(state: CommissioningState, event: CommissioningEvent) -> Self {
        Self { state, event }
    }
}

pub struct CommissioningEngine<N, B, S = EventControl> {
    network: N,
    bindings: B,
    scheduler: S,
    config: CommissioningConfig,
    session: Option<CommissioningSession>,
    queue: CandidateQueue<REMOTE_QUEUE_LEN>,
    skip_mask: SkipMask,
    next: NextTransition,
    network_attempts: u8,
    inbox: Responder,
}

impl<N, B, S> CommissioningEngine<N, B, S>
where
    N: Network,
    B: BindingTable,
    S: Scheduler,
{
    pub fn new(network: N, bindings: B, scheduler: S) -> Self {
        Self::with_config(network, bindings, scheduler, CommissioningConfig::default())
    }

    pub fn with_config(
        network: N,
        bindings: B,
        mut scheduler: S,
        config: CommissioningConfig,
    ) -> Self {
        let inbox = Responder::with_capacity(config.inbox_capacity);
        scheduler.watch(inbox.wakeup());
        Self {
            network,
            bindings,
            scheduler,
            config,
            session: None,
            queue: CandidateQueue::new(),
            skip_mask: SkipMask::default(),
            next: NextTransition::IDLE,
            network_attempts: 0,
            inbox,
        }
    }

    /// Start commissioning `clusters` of `local_endpoint`.
    ///
    /// A server endpoint binds to the client clusters of remote devices, a
    /// client endpoint to their server clusters. Fails with
    /// [`Error::BadArgument`] when `clusters` is empty and with
    /// [`Error::Busy`] while another session runs, leaving the engine as it
    /// was.
    pub fn start(
        &mut self,
        local_endpoint: EndpointId,
        is_server: bool,
        clusters: &[ClusterId],
    ) -> Result<()> {
        if clusters.is_empty() {
            return Err(Error::BadArgument);
        }
        if self.is_active() {
            return Err(Error::Busy);
        }
        if clusters.len() > self.bindings.size() {
            warn!(
                requested = clusters.len(),
                capacity = self.bindings.size(),
                "more clusters requested than the binding table holds"
            );
        }

        let network_index = self.network.network_index_for_endpoint(local_endpoint);
        info!(
            local_endpoint,
            is_server,
            ?clusters,
            network_index,
            "starting commissioning"
        );
        self.session = Some(CommissioningSession::new(
            local_endpoint,
            is_server,
            clusters,
            network_index,
        ));
        self.next = NextTransition::IDLE;
        self.network_attempts = 0;
        self.scheduler.schedule_now();
        Ok(())
    }

    /// The state the next tick dispatches on
    pub fn status(&self) -> CommissioningState {
        self.next.state
    }

    pub fn pending_event(&self) -> CommissioningEvent {
        self.next.event
    }

    pub fn next_transition(&self) -> NextTransition {
        self.next
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&CommissioningSession> {
        self.session.as_ref()
    }

    pub fn queue(&self) -> &CandidateQueue<REMOTE_QUEUE_LEN> {
        &self.queue
    }

    pub fn skip_mask(&self) -> &SkipMask {
        &self.skip_mask
    }

    /// Form or join attempts made by the current session
    pub fn network_attempts(&self) -> u8 {
        self.network_attempts
    }

    pub fn config(&self) -> &CommissioningConfig {
        &self.config
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut N {
        &mut self.network
    }

    pub fn bindings(&self) -> &B {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut B {
        &mut self.bindings
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// A handle for posting network responses from outside the engine
    pub fn responder(&self) -> Responder {
        self.inbox.clone()
    }

    /// Run the state machine once. Call this when the scheduler's arming is
    /// due, which includes responses having been posted.
    ///
    /// Posted responses are handled first. If one of them re-routed the state
    /// machine, the tick it armed takes over and this one returns. A tick the
    /// scheduler reports as not due only handles the responses.
    pub fn tick(&mut self) {
        let due = self.scheduler.is_due();
        self.on_session_network(|engine| {
            let before = engine.next;
            engine.drain_inbox();
            if engine.next != before {
                debug!(next = ?engine.next, "response re-routed the state machine");
            } else if !engine.is_active() {
                debug!("no commissioning session");
            } else if due {
                engine.dispatch();
            }
        });
    }

    /// Handle every response posted through a [`Responder`]
    pub fn process_responses(&mut self) {
        self.on_session_network(Self::drain_inbox);
    }

    fn drain_inbox(&mut self) {
        self.inbox.wakeup().clear();
        while let Some(response) = self.inbox.take() {
            self.handle_response(response);
        }
    }

    /// Run `f` on the session's network and restore the previous one after.
    /// Without a session `f` runs on the current network.
    fn on_session_network(&mut self, f: impl FnOnce(&mut Self)) {
        let Some(network_index) = self.session.as_ref().map(|session| session.network_index)
        else {
            return f(self);
        };

        // The stack may have switched networks since the last tick
        let pushed = match self.network.push_network_index(network_index) {
            Ok(()) => true,
            Err(err) => {
                warn!(%err, network_index, "cannot switch to the commissioning network");
                false
            }
        };

        f(self);

        if pushed {
            if let Err(err) = self.network.pop_network_index() {
                error!(%err, "cannot restore the previous network");
            }
        }
    }

    pub fn handle_response(&mut self, response: NetworkResponse) {
        match response {
            NetworkResponse::IdentifyQuery(response) => self.on_identify_query_response(response),
            NetworkResponse::ClusterDiscovery(result) => self.on_cluster_discovery(result),
            NetworkResponse::IeeeAddress(result) => self.on_ieee_address(result),
        }
    }

    fn dispatch(&mut self) {
        use transition::Action;

        let NextTransition { state, event } = self.next;
        let action = transition::lookup(state, event);
        debug!(?state, ?event, ?action, "dispatching");

        let next_state = match action {
            Action::StartCommissioning => self.start_commissioning(),
            Action::CheckNetwork => self.check_network(),
            Action::FormJoinNetwork => self.form_join_network(),
            Action::BroadcastIdentifyQuery => self.broadcast_identify_query(),
            Action::StopCommissioning => self.stop_commissioning(),
            Action::CheckClusters => self.check_clusters(),
            Action::MatchingCheck => self.matching_check(),
            Action::SetBinding => self.set_binding(),
            Action::BindingDone => self.binding_done(),
            Action::CheckQueue => self.check_queue(),
            Action::UnknownState => self.unknown_state(),
        };
        self.next.state = next_state;
    }
}

impl<N, B, S> core::fmt::Debug for CommissioningEngine<N, B, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommissioningEngine")
            .field("next", &self.next)
            .field("session", &self.session)
            .field("queue", &self.queue.len())
            .field("network_attempts", &self.network_attempts)
            .finish_non_exhaustive()
    }
}
