pub type ClusterId = u16;

pub const CLUSTER_ID_BASIC: ClusterId = 0x0000;
pub const CLUSTER_ID_IDENTIFY: ClusterId = 0x0003;
pub const CLUSTER_ID_GROUPS: ClusterId = 0x0004;
pub const CLUSTER_ID_SCENES: ClusterId = 0x0005;
pub const CLUSTER_ID_ON_OFF: ClusterId = 0x0006;
pub const CLUSTER_ID_LEVEL_CONTROL: ClusterId = 0x0008;
pub const CLUSTER_ID_COLOR_CONTROL: ClusterId = 0x0300;
pub const CLUSTER_ID_TEMPERATURE_MEASUREMENT: ClusterId = 0x0402;
pub const CLUSTER_ID_OCCUPANCY_SENSING: ClusterId = 0x0406;

/// The side of a cluster an endpoint implements.
///
/// Bindings pair opposite sides: a client endpoint binds to the server
/// clusters of a remote and the other way around.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterRole {
    Server = 0,
    Client = 1,
}

impl ClusterRole {
    pub const fn from_is_server(is_server: bool) -> Self {
        if is_server {
            Self::Server
        } else {
            Self::Client
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Self::Server => Self::Client,
            Self::Client => Self::Server,
        }
    }
}

/// The clusters hosted on a remote endpoint, as returned by cluster discovery
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterList {
    /// Input (server) clusters
    pub server: Vec<ClusterId>,
    /// Output (client) clusters
    pub client: Vec<ClusterId>,
}

impl ClusterList {
    pub fn new(server: &[ClusterId], client: &[ClusterId]) -> Self {
        Self {
            server: server.to_vec(),
            client: client.to_vec(),
        }
    }

    pub fn side(&self, role: ClusterRole) -> &[ClusterId] {
        match role {
            ClusterRole::Server => &self.server,
            ClusterRole::Client => &self.client,
        }
    }

    /// The remote clusters a local endpoint in `local_role` can bind to
    pub fn counterpart(&self, local_role: ClusterRole) -> &[ClusterId] {
        self.side(local_role.opposite())
    }
}
