use crate::{
    cluster::ClusterList,
    data_model::{EndpointId, Eui64, ShortAddress},
    error::{Error, Result},
};

/// Outcome of a service discovery request (status byte reported by the stack)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum DiscoveryStatus {
    BroadcastComplete = 0x00,
    BroadcastResponseReceived = 0x01,
    UnicastTimeout = 0x02,
    UnicastCompleteWithResponse = 0x03,
    BroadcastCompleteWithResponse = 0x04,
    UnicastCompleteWithEmptyResponse = 0x05,
    BroadcastCompleteWithEmptyResponse = 0x06,
}

impl DiscoveryStatus {
    pub fn from_code(code: u8) -> Result<Self> {
        num_traits::FromPrimitive::from_u8(code).ok_or(Error::UnknownDiscoveryStatus(code))
    }

    /// Whether the result carries response data
    pub const fn has_response(&self) -> bool {
        matches!(
            self,
            Self::BroadcastResponseReceived
                | Self::UnicastCompleteWithResponse
                | Self::BroadcastCompleteWithResponse
        )
    }
}

/// An identify query response, sent by devices that are identifying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifyQueryResponse {
    pub source: ShortAddress,
    pub endpoint: EndpointId,
    /// Seconds the device keeps identifying, zero when it is not
    pub timeout: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterDiscoveryResult {
    pub status: DiscoveryStatus,
    pub source: ShortAddress,
    pub endpoint: EndpointId,
    pub clusters: ClusterList,
}

impl ClusterDiscoveryResult {
    pub fn found(source: ShortAddress, endpoint: EndpointId, clusters: ClusterList) -> Self {
        Self {
            status: DiscoveryStatus::UnicastCompleteWithResponse,
            source,
            endpoint,
            clusters,
        }
    }

    pub fn timed_out(source: ShortAddress, endpoint: EndpointId) -> Self {
        Self {
            status: DiscoveryStatus::UnicastTimeout,
            source,
            endpoint,
            clusters: ClusterList::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IeeeAddressResult {
    pub status: DiscoveryStatus,
    pub source: ShortAddress,
    pub extended_address: Eui64,
}

impl IeeeAddressResult {
    pub fn found(source: ShortAddress, extended_address: Eui64) -> Self {
        Self {
            status: DiscoveryStatus::UnicastCompleteWithResponse,
            source,
            extended_address,
        }
    }

    pub fn timed_out(source: ShortAddress) -> Self {
        Self {
            status: DiscoveryStatus::UnicastTimeout,
            source,
            extended_address: Eui64::default(),
        }
    }
}

/// Everything the network layer reports back to the initiator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkResponse {
    IdentifyQuery(IdentifyQueryResponse),
    ClusterDiscovery(ClusterDiscoveryResult),
    IeeeAddress(IeeeAddressResult),
}

impl From<IdentifyQueryResponse> for NetworkResponse {
    fn from(value: IdentifyQueryResponse) -> Self {
        Self::IdentifyQuery(value)
    }
}

impl From<ClusterDiscoveryResult> for NetworkResponse {
    fn from(value: ClusterDiscoveryResult) -> Self {
        Self::ClusterDiscovery(value)
    }
}

impl From<IeeeAddressResult> for NetworkResponse {
    fn from(value: IeeeAddressResult) -> Self {
        Self::IeeeAddress(value)
    }
}
