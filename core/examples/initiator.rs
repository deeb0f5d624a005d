//! Commissions a light switch endpoint against a simulated mesh with two
//! identifying devices.
//!
//! Run with `RUST_LOG=simple_commissioning=debug` for a trace of every
//! transition.

use std::time::Duration;

use simple_commissioning::{
    binding::MemoryBindingTable,
    cluster::{
        ClusterId, ClusterList, CLUSTER_ID_COLOR_CONTROL, CLUSTER_ID_LEVEL_CONTROL,
        CLUSTER_ID_OCCUPANCY_SENSING, CLUSTER_ID_ON_OFF, CLUSTER_ID_TEMPERATURE_MEASUREMENT,
    },
    data_model::{EndpointId, Eui64, NetworkIndex, ShortAddress},
    driver::{DriverResponder, TokioDriver},
    network::{
        ClusterDiscoveryResult, IdentifyQueryResponse, IeeeAddressResult, Network, NetworkError,
        NetworkState, NodeType,
    },
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing_subscriber::EnvFilter;

const SWITCH_ENDPOINT: EndpointId = 1;

struct SimulatedDevice {
    short_address: ShortAddress,
    endpoint: EndpointId,
    eui64: Eui64,
    servers: &'static [ClusterId],
    clients: &'static [ClusterId],
}

const DEVICES: [SimulatedDevice; 2] = [
    SimulatedDevice {
        short_address: ShortAddress(0x1234),
        endpoint: 1,
        eui64: Eui64([0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]),
        servers: &[
            CLUSTER_ID_ON_OFF,
            CLUSTER_ID_LEVEL_CONTROL,
            CLUSTER_ID_COLOR_CONTROL,
        ],
        clients: &[],
    },
    SimulatedDevice {
        short_address: ShortAddress(0x5678),
        endpoint: 3,
        eui64: Eui64([0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88]),
        servers: &[
            CLUSTER_ID_TEMPERATURE_MEASUREMENT,
            CLUSTER_ID_OCCUPANCY_SENSING,
        ],
        clients: &[CLUSTER_ID_ON_OFF],
    },
];

#[derive(Debug)]
enum Request {
    IdentifyQuery,
    Clusters(ShortAddress, EndpointId),
    IeeeAddress(ShortAddress),
}

/// A joined router that forwards requests to the radio task
struct SimulatedMesh {
    requests: UnboundedSender<Request>,
    network_indices: Vec<NetworkIndex>,
}

impl SimulatedMesh {
    fn send(&self, request: Request) -> Result<(), NetworkError> {
        self.requests
            .send(request)
            .map_err(|_| NetworkError::DeliveryFailed)
    }
}

impl Network for SimulatedMesh {
    fn node_id(&self) -> ShortAddress {
        ShortAddress::COORDINATOR
    }

    fn node_type(&self) -> NodeType {
        NodeType::Router
    }

    fn network_state(&self) -> NetworkState {
        NetworkState::JoinedNetwork
    }

    fn network_index_for_endpoint(&self, _endpoint: EndpointId) -> NetworkIndex {
        0
    }

    fn push_network_index(&mut self, index: NetworkIndex) -> Result<(), NetworkError> {
        self.network_indices.push(index);
        Ok(())
    }

    fn pop_network_index(&mut self) -> Result<(), NetworkError> {
        self.network_indices
            .pop()
            .map(|_| ())
            .ok_or(NetworkError::NoNetworkContext)
    }

    fn form_network(&mut self) -> Result<(), NetworkError> {
        Err(NetworkError::Unsupported)
    }

    fn search_joinable_network(&mut self) -> Result<(), NetworkError> {
        Ok(())
    }

    fn permit_join(&mut self, duration: Duration) -> Result<(), NetworkError> {
        tracing::info!(?duration, "permit join");
        Ok(())
    }

    fn broadcast_identify_query(
        &mut self,
        _source_endpoint: EndpointId,
    ) -> Result<(), NetworkError> {
        self.send(Request::IdentifyQuery)
    }

    fn send_default_response(
        &mut self,
        _destination: ShortAddress,
        _endpoint: EndpointId,
    ) -> Result<(), NetworkError> {
        Ok(())
    }

    fn find_clusters(
        &mut self,
        target: ShortAddress,
        endpoint: EndpointId,
    ) -> Result<(), NetworkError> {
        self.send(Request::Clusters(target, endpoint))
    }

    fn find_ieee_address(&mut self, target: ShortAddress) -> Result<(), NetworkError> {
        self.send(Request::IeeeAddress(target))
    }
}

/// Answers requests on behalf of the simulated devices
async fn radio(mut requests: UnboundedReceiver<Request>, responder: DriverResponder) {
    while let Some(request) = requests.recv().await {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let posted = match request {
            Request::IdentifyQuery => DEVICES.iter().try_for_each(|device| {
                responder.post(IdentifyQueryResponse {
                    source: device.short_address,
                    endpoint: device.endpoint,
                    timeout: 60,
                })
            }),
            Request::Clusters(target, endpoint) => {
                let result = match DEVICES
                    .iter()
                    .find(|device| device.short_address == target && device.endpoint == endpoint)
                {
                    Some(device) => ClusterDiscoveryResult::found(
                        target,
                        endpoint,
                        ClusterList::new(device.servers, device.clients),
                    ),
                    None => ClusterDiscoveryResult::timed_out(target, endpoint),
                };
                responder.post(result)
            }
            Request::IeeeAddress(target) => {
                let result = match DEVICES.iter().find(|device| device.short_address == target) {
                    Some(device) => IeeeAddressResult::found(target, device.eui64),
                    None => IeeeAddressResult::timed_out(target),
                };
                responder.post(result)
            }
        };
        if let Err(err) = posted {
            tracing::warn!(%err, "response dropped");
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("simple_commissioning=info")),
        )
        .init();

    let (sender, receiver) = mpsc::unbounded_channel();
    let mesh = SimulatedMesh {
        requests: sender,
        network_indices: Vec::new(),
    };
    let mut driver = TokioDriver::new(mesh, MemoryBindingTable::<8>::new());
    tokio::spawn(radio(receiver, driver.responder()));

    driver
        .start(
            SWITCH_ENDPOINT,
            false,
            &[CLUSTER_ID_ON_OFF, CLUSTER_ID_LEVEL_CONTROL],
        )
        .expect("no session is running yet");
    driver.run_until_idle().await;

    for (index, entry) in driver.engine().bindings().used() {
        println!(
            "binding {index}: endpoint {} -> {}/{} cluster 0x{:04X}",
            entry.local, entry.identifier, entry.remote, entry.cluster_id
        );
    }
}
