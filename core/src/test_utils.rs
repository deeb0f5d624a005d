use core::time::Duration;

use hex_literal::hex;

use crate::{
    binding::{BindingEntry, BindingError, BindingTable, MemoryBindingTable},
    data_model::{EndpointId, Eui64, NetworkIndex, ShortAddress},
    network::{Network, NetworkError, NetworkState, NodeType},
    scheduler::{Arming, EventControl},
    CommissioningEngine,
};

pub const LOCAL_NODE: ShortAddress = ShortAddress(0x0000);
pub const REMOTE: ShortAddress = ShortAddress(0x1234);
pub const REMOTE_EUI64: Eui64 = Eui64(hex!("0d0c0b0a09080706"));
pub const OTHER_REMOTE: ShortAddress = ShortAddress(0x5678);
pub const OTHER_REMOTE_EUI64: Eui64 = Eui64(hex!("a1a2a3a4a5a6a7a8"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkCall {
    PushNetworkIndex(NetworkIndex),
    PopNetworkIndex,
    FormNetwork,
    SearchJoinableNetwork,
    PermitJoin(Duration),
    BroadcastIdentifyQuery(EndpointId),
    SendDefaultResponse(ShortAddress, EndpointId),
    FindClusters(ShortAddress, EndpointId),
    FindIeeeAddress(ShortAddress),
}

/// A network that records every request and answers from its fields
#[derive(Debug)]
pub struct MockNetwork {
    pub node_id: ShortAddress,
    pub node_type: NodeType,
    pub state: NetworkState,
    /// Becomes the network state once a form or join was requested
    pub state_after_form_join: Option<NetworkState>,
    pub endpoint_network: NetworkIndex,
    pub fail_push: bool,
    pub fail_form_join: bool,
    pub fail_broadcast: bool,
    pub fail_find_clusters: bool,
    pub fail_find_ieee: bool,
    pub calls: Vec<NetworkCall>,
    pub index_stack: Vec<NetworkIndex>,
}

impl MockNetwork {
    pub fn joined() -> Self {
        Self::with_state(NetworkState::JoinedNetwork)
    }

    pub fn with_state(state: NetworkState) -> Self {
        Self {
            node_id: LOCAL_NODE,
            node_type: NodeType::Router,
            state,
            state_after_form_join: None,
            endpoint_network: 0,
            fail_push: false,
            fail_form_join: false,
            fail_broadcast: false,
            fail_find_clusters: false,
            fail_find_ieee: false,
            calls: Vec::new(),
            index_stack: Vec::new(),
        }
    }

    pub fn count(&self, predicate: impl Fn(&NetworkCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    /// The last request, ignoring network context switches
    pub fn last_request(&self) -> Option<&NetworkCall> {
        self.calls.iter().rev().find(|call| {
            !matches!(
                call,
                NetworkCall::PushNetworkIndex(_) | NetworkCall::PopNetworkIndex
            )
        })
    }

    fn form_join(&mut self, call: NetworkCall) -> Result<(), NetworkError> {
        self.calls.push(call);
        if self.fail_form_join {
            return Err(NetworkError::Busy);
        }
        if let Some(state) = self.state_after_form_join {
            self.state = state;
        }
        Ok(())
    }

    fn request(&mut self, call: NetworkCall, fail: bool) -> Result<(), NetworkError> {
        self.calls.push(call);
        if fail {
            Err(NetworkError::DeliveryFailed)
        } else {
            Ok(())
        }
    }
}

impl Network for MockNetwork {
    fn node_id(&self) -> ShortAddress {
        self.node_id
    }

    fn node_type(&self) -> NodeType {
        self.node_type
    }

    fn network_state(&self) -> NetworkState {
        self.state
    }

    fn network_index_for_endpoint(&self, _endpoint: EndpointId) -> NetworkIndex {
        self.endpoint_network
    }

    fn push_network_index(&mut self, index: NetworkIndex) -> Result<(), NetworkError> {
        self.calls.push(NetworkCall::PushNetworkIndex(index));
        if self.fail_push {
            return Err(NetworkError::InvalidNetworkIndex(index));
        }
        self.index_stack.push(index);
        Ok(())
    }

    fn pop_network_index(&mut self) -> Result<(), NetworkError> {
        self.calls.push(NetworkCall::PopNetworkIndex);
        self.index_stack
            .pop()
            .map(|_| ())
            .ok_or(NetworkError::NoNetworkContext)
    }

    fn form_network(&mut self) -> Result<(), NetworkError> {
        self.form_join(NetworkCall::FormNetwork)
    }

    fn search_joinable_network(&mut self) -> Result<(), NetworkError> {
        self.form_join(NetworkCall::SearchJoinableNetwork)
    }

    fn permit_join(&mut self, duration: Duration) -> Result<(), NetworkError> {
        self.request(NetworkCall::PermitJoin(duration), false)
    }

    fn broadcast_identify_query(
        &mut self,
        source_endpoint: EndpointId,
    ) -> Result<(), NetworkError> {
        let fail = self.fail_broadcast;
        self.request(NetworkCall::BroadcastIdentifyQuery(source_endpoint), fail)
    }

    fn send_default_response(
        &mut self,
        destination: ShortAddress,
        endpoint: EndpointId,
    ) -> Result<(), NetworkError> {
        self.request(NetworkCall::SendDefaultResponse(destination, endpoint), false)
    }

    fn find_clusters(
        &mut self,
        target: ShortAddress,
        endpoint: EndpointId,
    ) -> Result<(), NetworkError> {
        let fail = self.fail_find_clusters;
        self.request(NetworkCall::FindClusters(target, endpoint), fail)
    }

    fn find_ieee_address(&mut self, target: ShortAddress) -> Result<(), NetworkError> {
        let fail = self.fail_find_ieee;
        self.request(NetworkCall::FindIeeeAddress(target), fail)
    }
}

/// A binding table whose reads fail from some index on
#[derive(Debug, Default)]
pub struct FaultyBindingTable<const N: usize> {
    pub inner: MemoryBindingTable<N>,
    pub fail_reads_from: Option<usize>,
}

impl<const N: usize> FaultyBindingTable<N> {
    pub fn failing_reads_from(index: usize) -> Self {
        Self {
            inner: MemoryBindingTable::new(),
            fail_reads_from: Some(index),
        }
    }
}

impl<const N: usize> BindingTable for FaultyBindingTable<N> {
    fn size(&self) -> usize {
        self.inner.size()
    }

    fn get(&self, index: usize) -> Result<BindingEntry, BindingError> {
        match self.fail_reads_from {
            Some(from) if index >= from => Err(BindingError::Read { index }),
            _ => self.inner.get(index),
        }
    }

    fn set(&mut self, index: usize, entry: BindingEntry) -> Result<(), BindingError> {
        self.inner.set(index, entry)
    }

    fn set_remote_node_id(&mut self, index: usize, node_id: ShortAddress) {
        self.inner.set_remote_node_id(index, node_id)
    }

    fn remote_node_id(&self, index: usize) -> Option<ShortAddress> {
        self.inner.remote_node_id(index)
    }
}

pub type TestEngine = CommissioningEngine<MockNetwork, MemoryBindingTable<8>, EventControl>;

pub fn engine(network: MockNetwork) -> TestEngine {
    CommissioningEngine::new(network, MemoryBindingTable::new(), EventControl::new())
}

/// Run every tick armed to run now, returning the arming left once the engine
/// waits on a delay or on nothing
pub fn settle<N, B>(engine: &mut CommissioningEngine<N, B, EventControl>) -> Option<Arming>
where
    N: Network,
    B: BindingTable,
{
    for _ in 0..64 {
        match engine.scheduler().armed() {
            Some(Arming::Now) => {
                engine.scheduler_mut().take();
                engine.tick();
            }
            other => return other,
        }
    }
    panic!("state machine keeps re-arming itself");
}

/// Let the pending delay elapse, then settle
pub fn fire<N, B>(engine: &mut CommissioningEngine<N, B, EventControl>) -> Option<Arming>
where
    N: Network,
    B: BindingTable,
{
    let armed = engine.scheduler_mut().take();
    assert!(
        matches!(armed, Some(Arming::After(_))),
        "expected a delayed arming, got {armed:?}"
    );
    engine.tick();
    settle(engine)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
