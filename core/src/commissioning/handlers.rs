use tracing::{debug, info, warn};

use crate::{
    binding::{policy, BindingTable},
    constants::MAX_SKIP_MASK_WIDTH,
    network::{
        ClusterDiscoveryResult, IdentifyQueryResponse, IeeeAddressResult, Network, NetworkState,
        NodeType,
    },
    scheduler::Scheduler,
    util::state::{CommissioningEvent as Event, CommissioningState as State},
};

use super::{CommissioningEngine, CommissioningSession, NextTransition, RemoteCandidate};

// Table dispatched handlers. Each one sets the next event, arms the scheduler
// unless a response is awaited, and returns the next state.
impl<N, B, S> CommissioningEngine<N, B, S>
where
    N: Network,
    B: BindingTable,
    S: Scheduler,
{
    pub(super) fn start_commissioning(&mut self) -> State {
        debug!("commissioning start");
        self.queue.clear();
        self.next.event = Event::CheckNetwork;
        self.scheduler.schedule_now();
        State::Start
    }

    pub(super) fn check_network(&mut self) -> State {
        let network_state = self.network.network_state();
        debug!(?network_state, "checking the network");

        if network_state.is_transient() {
            self.scheduler.schedule_after(self.config.network_busy_retry_delay);
            return State::Start;
        }

        self.next.event = match network_state {
            NetworkState::JoinedNetwork => {
                // End devices ignore it
                if let Err(err) = self.network.permit_join(self.config.permit_join_duration) {
                    warn!(%err, "permit join was not sent");
                }
                Event::BroadcastIdentifyQuery
            }
            NetworkState::NoNetwork
                if self.network_attempts < self.config.network_access_attempts =>
            {
                Event::FormJoinNetwork
            }
            _ => Event::NetworkFailed,
        };
        self.scheduler.schedule_now();
        State::Start
    }

    pub(super) fn form_join_network(&mut self) -> State {
        let node_type = self.network.node_type();
        let status = match node_type {
            NodeType::Coordinator => self.network.form_network(),
            _ => self.network.search_joinable_network(),
        };
        self.next.event = match status {
            Ok(()) => Event::CheckNetwork,
            Err(err) => {
                warn!(%err, ?node_type, "cannot form or join a network");
                Event::Unknown
            }
        };
        self.network_attempts = self.network_attempts.saturating_add(1);
        debug!(attempt = self.network_attempts, ?node_type, "form/join requested");
        self.scheduler.schedule_after(self.config.network_form_retry_delay);
        State::Start
    }

    pub(super) fn broadcast_identify_query(&mut self) -> State {
        let local_endpoint = self.current_session().local_endpoint;
        match self.network.broadcast_identify_query(local_endpoint) {
            Ok(()) => {
                debug!(local_endpoint, "identify query broadcast");
                self.next.event = Event::Timeout;
                self.scheduler.schedule_after(self.config.identify_response_wait);
            }
            Err(err) => {
                warn!(%err, "identify query broadcast failed");
                self.next.event = Event::Unknown;
                self.scheduler.schedule_now();
            }
        }
        State::WaitIdentifyResponse
    }

    pub(super) fn stop_commissioning(&mut self) -> State {
        info!(state = ?self.next.state, event = ?self.next.event, "commissioning stopped");
        self.reset();
        State::Stop
    }

    pub(super) fn unknown_state(&mut self) -> State {
        warn!(
            state = ?self.next.state,
            event = ?self.next.event,
            "unexpected transition, stopping commissioning"
        );
        self.reset();
        State::Stop
    }

    pub(super) fn check_clusters(&mut self) -> State {
        let candidate = self.queue.current();
        let (target, endpoint) = (candidate.short_address, candidate.endpoint);
        debug!(%target, endpoint, "discovering remote clusters");

        // Resolved by the cluster discovery result
        self.next.event = Event::Unknown;
        match self.network.find_clusters(target, endpoint) {
            Ok(()) => State::Discover,
            Err(err) => {
                warn!(%err, %target, "cluster discovery could not be sent");
                self.scheduler.schedule_now();
                State::Unknown
            }
        }
    }

    pub(super) fn matching_check(&mut self) -> State {
        let target = self.queue.current().short_address;
        match self.network.find_ieee_address(target) {
            Ok(()) => {
                debug!(%target, "resolving the extended address");
                self.next.event = Event::AwaitIdentity;
                self.scheduler.schedule_after(self.config.ieee_response_wait);
            }
            Err(err) => {
                warn!(%err, %target, "extended address request could not be sent, skipping");
                self.queue.pop_front();
                self.next.event = Event::CheckQueue;
                self.scheduler.schedule_now();
            }
        }
        State::Bind
    }

    pub(super) fn set_binding(&mut self) -> State {
        let (local_endpoint, network_index) = {
            let session = self.current_session();
            (session.local_endpoint, session.network_index)
        };
        let candidate = self.queue.current();

        self.next.event = match candidate.extended_address {
            Some(identifier) => {
                self.skip_mask.reset(candidate.supported_cluster_count());
                policy::mark_duplicate_matches(
                    &self.bindings,
                    local_endpoint,
                    &identifier,
                    candidate,
                    &mut self.skip_mask,
                );
                debug!(mask = self.skip_mask.mask(), "clusters left to bind");

                if self.skip_mask.mask() == 0 {
                    debug!(remote = %candidate.short_address, "every cluster is already bound");
                    Event::CheckQueue
                } else {
                    match policy::create_bindings(
                        &mut self.bindings,
                        local_endpoint,
                        network_index,
                        identifier,
                        candidate,
                        &self.skip_mask,
                    ) {
                        Ok(written) => {
                            info!(
                                remote = %candidate.short_address,
                                %identifier,
                                written,
                                "bindings created"
                            );
                            Event::BindingDone
                        }
                        Err(err) => {
                            warn!(%err, remote = %candidate.short_address, "bindings incomplete");
                            Event::CheckQueue
                        }
                    }
                }
            }
            None => {
                warn!(remote = %candidate.short_address, "extended address unknown, skipping");
                Event::CheckQueue
            }
        };

        self.queue.pop_front();
        self.scheduler.schedule_now();
        State::Bind
    }

    pub(super) fn binding_done(&mut self) -> State {
        self.next.event = Event::CheckQueue;
        self.scheduler.schedule_now();
        State::Bind
    }

    pub(super) fn check_queue(&mut self) -> State {
        debug!(queued = self.queue.len(), "checking the queue");
        let state = if self.queue.is_empty() {
            self.next.event = Event::QueueEmpty;
            State::Bind
        } else {
            self.next.event = Event::CheckClusters;
            State::Discover
        };
        self.scheduler.schedule_now();
        state
    }
}

// Network responses
impl<N, B, S> CommissioningEngine<N, B, S>
where
    N: Network,
    B: BindingTable,
    S: Scheduler,
{
    /// A device answered the identify query.
    ///
    /// Only responses that arrive after the query went out are considered.
    /// The first device queued diverts the state machine to cluster discovery
    /// without waiting for the response window to close.
    pub fn on_identify_query_response(&mut self, response: IdentifyQueryResponse) {
        let IdentifyQueryResponse {
            source,
            endpoint,
            timeout,
        } = response;

        if !self.is_active()
            || matches!(self.next.state, State::Stop | State::Start | State::Unknown)
        {
            debug!(%source, state = ?self.next.state, "identify query response out of session");
            return;
        }
        // The broadcast failed and the session is on its way to stop
        if self.next == NextTransition::new(State::WaitIdentifyResponse, Event::Unknown) {
            debug!(%source, "identify query was not sent");
            return;
        }
        if source == self.network.node_id() || timeout == 0 {
            return;
        }
        if self.queue.contains(source, endpoint) {
            debug!(%source, endpoint, "device already queued");
            return;
        }

        debug!(%source, endpoint, timeout, "identify query response");
        if self.queue.is_empty() {
            self.next = NextTransition::new(State::Discover, Event::CheckClusters);
            self.scheduler.schedule_now();
        }
        if !self.queue.enqueue(RemoteCandidate::new(source, endpoint)) {
            warn!(%source, endpoint, "candidate queue full, dropping device");
        }

        if let Err(err) = self.network.send_default_response(source, endpoint) {
            debug!(%err, %source, "default response not sent");
        }
    }

    /// Result of the cluster discovery of the front candidate
    pub fn on_cluster_discovery(&mut self, result: ClusterDiscoveryResult) {
        let is_current = self.is_active()
            && self.next.state == State::Discover
            && self
                .queue
                .front()
                .map_or(false, |candidate| candidate.is(result.source, result.endpoint));
        if !is_current {
            debug!(
                source = %result.source,
                endpoint = result.endpoint,
                "stale cluster discovery result"
            );
            return;
        }

        if !result.status.has_response() {
            debug!(
                source = %result.source,
                status = ?result.status,
                "no cluster discovery response"
            );
            self.discard_candidate();
            return;
        }

        let role = self.current_session().role;
        let mut remote = result.clusters.counterpart(role);
        if remote.len() > MAX_SKIP_MASK_WIDTH {
            debug!(
                advertised = remote.len(),
                kept = MAX_SKIP_MASK_WIDTH,
                "remote cluster list truncated"
            );
            remote = &remote[..MAX_SKIP_MASK_WIDTH];
        }

        self.skip_mask.reset(remote.len());
        let supported = match self.session.as_ref() {
            Some(session) => session.check_supported_clusters(remote, &mut self.skip_mask),
            None => 0,
        };
        debug!(source = %result.source, supported, "supported clusters");

        if supported == 0 {
            self.discard_candidate();
            return;
        }

        if let Some(candidate) = self.queue.front_mut() {
            candidate.set_supported_clusters(remote, &self.skip_mask);
        }
        self.next = NextTransition::new(State::Match, Event::CheckClusters);
        self.scheduler.schedule_now();
    }

    /// Result of the extended address lookup of the front candidate.
    ///
    /// A failed lookup leaves the identity unresolved, which stops the
    /// session on the next tick.
    pub fn on_ieee_address(&mut self, result: IeeeAddressResult) {
        let is_current = self.is_active()
            && self.next == NextTransition::new(State::Bind, Event::AwaitIdentity)
            && self
                .queue
                .front()
                .map_or(false, |candidate| candidate.short_address == result.source);
        if !is_current {
            debug!(source = %result.source, "stale extended address result");
            return;
        }

        if result.status.has_response() {
            debug!(
                source = %result.source,
                eui64 = %result.extended_address,
                "extended address resolved"
            );
            if let Some(candidate) = self.queue.front_mut() {
                candidate.extended_address = Some(result.extended_address);
            }
            self.next.event = Event::Bind;
        } else {
            debug!(
                source = %result.source,
                status = ?result.status,
                "extended address lookup failed"
            );
        }
        self.scheduler.schedule_now();
    }
}

impl<N, B, S> CommissioningEngine<N, B, S>
where
    N: Network,
    B: BindingTable,
    S: Scheduler,
{
    /// Drop the front candidate after discovery gave nothing to bind, moving
    /// on to the next one or back to collecting identify responses
    fn discard_candidate(&mut self) {
        self.queue.pop_front();
        if self.queue.is_empty() {
            self.next = NextTransition::new(State::WaitIdentifyResponse, Event::Timeout);
            self.scheduler.schedule_after(self.config.identify_response_wait);
        } else {
            self.next = NextTransition::new(State::Discover, Event::CheckClusters);
            self.scheduler.schedule_now();
        }
    }

    fn reset(&mut self) {
        self.next.event = Event::Idle;
        self.network_attempts = 0;
        self.session = None;
        self.queue.clear();
        self.scheduler.cancel();
    }

    fn current_session(&self) -> &CommissioningSession {
        self.session
            .as_ref()
            .expect("handlers only run during a session")
    }
}
