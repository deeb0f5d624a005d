use crate::{
    cluster::{ClusterId, ClusterRole},
    data_model::{EndpointId, NetworkIndex},
};

use super::SkipMask;

/// What a commissioning run was started with. Fixed until the run stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommissioningSession {
    pub local_endpoint: EndpointId,
    /// Side of the clusters the local endpoint implements
    pub role: ClusterRole,
    /// Clusters the local endpoint wants bound
    pub clusters: Vec<ClusterId>,
    pub network_index: NetworkIndex,
}

impl CommissioningSession {
    pub fn new(
        local_endpoint: EndpointId,
        is_server: bool,
        clusters: &[ClusterId],
        network_index: NetworkIndex,
    ) -> Self {
        Self {
            local_endpoint,
            role: ClusterRole::from_is_server(is_server),
            clusters: clusters.to_vec(),
            network_index,
        }
    }

    pub fn is_interested_in(&self, cluster_id: ClusterId) -> bool {
        self.clusters.contains(&cluster_id)
    }

    /// Skip every position of `remote` that is not of interest, returning how
    /// many positions are supported.
    ///
    /// `mask` must have been reset to the length of `remote`.
    pub fn check_supported_clusters(&self, remote: &[ClusterId], mask: &mut SkipMask) -> usize {
        let mut supported = 0;
        for (position, cluster_id) in remote.iter().enumerate() {
            if self.is_interested_in(*cluster_id) {
                supported += 1;
            } else {
                mask.skip(position);
            }
        }
        supported
    }
}
