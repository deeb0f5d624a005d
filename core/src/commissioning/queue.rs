use heapless::{Deque, Vec};
use tracing::debug;

use crate::{
    cluster::ClusterId,
    constants::CANDIDATE_CLUSTER_LIST_LEN,
    data_model::{EndpointId, Eui64, ShortAddress},
};

use super::SkipMask;

/// A device that answered the identify query, filled in as it moves through
/// discovery and matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCandidate {
    pub short_address: ShortAddress,
    pub endpoint: EndpointId,
    /// Resolved during matching
    pub extended_address: Option<Eui64>,
    clusters: Vec<ClusterId, CANDIDATE_CLUSTER_LIST_LEN>,
}

impl RemoteCandidate {
    pub const fn new(short_address: ShortAddress, endpoint: EndpointId) -> Self {
        Self {
            short_address,
            endpoint,
            extended_address: None,
            clusters: Vec::new(),
        }
    }

    pub fn is(&self, short_address: ShortAddress, endpoint: EndpointId) -> bool {
        self.short_address == short_address && self.endpoint == endpoint
    }

    /// Retain the clusters of `remote` that `mask` keeps, in order.
    ///
    /// Anything past the retained capacity is dropped.
    pub fn set_supported_clusters(&mut self, remote: &[ClusterId], mask: &SkipMask) {
        self.clusters.clear();
        let kept = remote
            .iter()
            .enumerate()
            .filter(|(position, _)| !mask.is_skipped(*position))
            .map(|(_, cluster_id)| *cluster_id);
        for cluster_id in kept {
            if self.clusters.push(cluster_id).is_err() {
                debug!(cluster_id, "supported cluster list full, truncating");
                break;
            }
        }
    }

    pub fn supported_clusters(&self) -> &[ClusterId] {
        &self.clusters
    }

    pub fn supported_cluster_count(&self) -> usize {
        self.clusters.len()
    }
}

/// Bounded FIFO of remote candidates. Only the front is ever worked on.
#[derive(Debug, Default)]
pub struct CandidateQueue<const N: usize> {
    candidates: Deque<RemoteCandidate, N>,
}

impl<const N: usize> CandidateQueue<N> {
    pub const fn new() -> Self {
        Self {
            candidates: Deque::new(),
        }
    }

    /// Returns false, leaving the queue untouched, when it is full
    pub fn enqueue(&mut self, candidate: RemoteCandidate) -> bool {
        self.candidates.push_back(candidate).is_ok()
    }

    pub fn front(&self) -> Option<&RemoteCandidate> {
        self.candidates.front()
    }

    /// The candidate being worked on.
    ///
    /// Panics if the queue is empty.
    pub fn current(&self) -> &RemoteCandidate {
        self.front()
            .expect("candidate queue is empty in a per-candidate state")
    }

    pub fn front_mut(&mut self) -> Option<&mut RemoteCandidate> {
        self.candidates.front_mut()
    }

    pub fn pop_front(&mut self) -> Option<RemoteCandidate> {
        self.candidates.pop_front()
    }

    pub fn contains(&self, short_address: ShortAddress, endpoint: EndpointId) -> bool {
        self.candidates
            .iter()
            .any(|candidate| candidate.is(short_address, endpoint))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RemoteCandidate> {
        self.candidates.iter()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.candidates.is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
    }
}
