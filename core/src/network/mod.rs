//! The mesh stack as seen by the commissioning initiator.
//!
//! Requests that complete asynchronously (cluster discovery, extended address
//! lookup) only report whether they could be dispatched. Their results come
//! back to the engine as a [`NetworkResponse`], either through the engine's
//! callback methods or posted to its [`Responder`](crate::commissioning::Responder).

use core::time::Duration;

use thiserror::Error;

use crate::data_model::{EndpointId, NetworkIndex, ShortAddress};

pub mod discovery;

pub use discovery::*;

/// Membership of the current network (matches the stack's status codes)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum NetworkState {
    NoNetwork = 0,
    JoiningNetwork = 1,
    JoinedNetwork = 2,
    JoinedNetworkNoParent = 3,
    LeavingNetwork = 4,
}

impl NetworkState {
    pub fn from_code(code: u8) -> Option<Self> {
        num_traits::FromPrimitive::from_u8(code)
    }

    /// Joining or leaving, the state will change on its own
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::JoiningNetwork | Self::LeavingNetwork)
    }
}

/// The role the local node plays in the network
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Coordinator = 1,
    Router = 2,
    EndDevice = 3,
    SleepyEndDevice = 4,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    #[error("network stack is busy")]
    Busy,
    #[error("request could not be delivered")]
    DeliveryFailed,
    #[error("network index {0} is not configured")]
    InvalidNetworkIndex(NetworkIndex),
    #[error("network context stack is empty")]
    NoNetworkContext,
    #[error("operation is not supported by this node")]
    Unsupported,
}

pub trait Network {
    /// The local node's short address
    fn node_id(&self) -> ShortAddress;

    fn node_type(&self) -> NodeType;

    fn network_state(&self) -> NetworkState;

    /// The network an endpoint is attached to
    fn network_index_for_endpoint(&self, endpoint: EndpointId) -> NetworkIndex;

    /// Make `index` the current network until the matching pop
    fn push_network_index(&mut self, index: NetworkIndex) -> Result<(), NetworkError>;

    /// Restore the network that was current before the last push
    fn pop_network_index(&mut self) -> Result<(), NetworkError>;

    /// Form a new network on an unused PAN (coordinators)
    fn form_network(&mut self) -> Result<(), NetworkError>;

    /// Start searching for a joinable network (every other node type)
    fn search_joinable_network(&mut self) -> Result<(), NetworkError>;

    /// Broadcast a permit-join so other devices can join for `duration`
    fn permit_join(&mut self, duration: Duration) -> Result<(), NetworkError>;

    /// Broadcast an identify query from `source_endpoint` to every endpoint
    fn broadcast_identify_query(&mut self, source_endpoint: EndpointId)
        -> Result<(), NetworkError>;

    /// Acknowledge a command with a success default response
    fn send_default_response(
        &mut self,
        destination: ShortAddress,
        endpoint: EndpointId,
    ) -> Result<(), NetworkError>;

    /// Request the clusters of a remote endpoint. Completes with
    /// [`NetworkResponse::ClusterDiscovery`].
    fn find_clusters(
        &mut self,
        target: ShortAddress,
        endpoint: EndpointId,
    ) -> Result<(), NetworkError>;

    /// Request the extended address of a remote node. Completes with
    /// [`NetworkResponse::IeeeAddress`].
    fn find_ieee_address(&mut self, target: ShortAddress) -> Result<(), NetworkError>;
}

impl<T> Network for &mut T
where
    T: Network,
{
    fn node_id(&self) -> ShortAddress {
        (**self).node_id()
    }

    fn node_type(&self) -> NodeType {
        (**self).node_type()
    }

    fn network_state(&self) -> NetworkState {
        (**self).network_state()
    }

    fn network_index_for_endpoint(&self, endpoint: EndpointId) -> NetworkIndex {
        (**self).network_index_for_endpoint(endpoint)
    }

    fn push_network_index(&mut self, index: NetworkIndex) -> Result<(), NetworkError> {
        (**self).push_network_index(index)
    }

    fn pop_network_index(&mut self) -> Result<(), NetworkError> {
        (**self).pop_network_index()
    }

    fn form_network(&mut self) -> Result<(), NetworkError> {
        (**self).form_network()
    }

    fn search_joinable_network(&mut self) -> Result<(), NetworkError> {
        (**self).search_joinable_network()
    }

    fn permit_join(&mut self, duration: Duration) -> Result<(), NetworkError> {
        (**self).permit_join(duration)
    }

    fn broadcast_identify_query(
        &mut self,
        source_endpoint: EndpointId,
    ) -> Result<(), NetworkError> {
        (**self).broadcast_identify_query(source_endpoint)
    }

    fn send_default_response(
        &mut self,
        destination: ShortAddress,
        endpoint: EndpointId,
    ) -> Result<(), NetworkError> {
        (**self).send_default_response(destination, endpoint)
    }

    fn find_clusters(
        &mut self,
        target: ShortAddress,
        endpoint: EndpointId,
    ) -> Result<(), NetworkError> {
        (**self).find_clusters(target, endpoint)
    }

    fn find_ieee_address(&mut self, target: ShortAddress) -> Result<(), NetworkError> {
        (**self).find_ieee_address(target)
    }
}
