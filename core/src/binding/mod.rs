use thiserror::Error;

use crate::{
    cluster::ClusterId,
    data_model::{EndpointId, Eui64, NetworkIndex, ShortAddress},
};

pub mod policy;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingType {
    #[default]
    Unused = 0,
    Unicast = 1,
    ManyToOne = 2,
    Multicast = 3,
}

/// An entry of the binding table (a route from a local endpoint and cluster
/// to a remote node)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BindingEntry {
    pub kind: BindingType,
    pub local: EndpointId,
    pub cluster_id: ClusterId,
    pub remote: EndpointId,
    /// The remote node for unicast bindings
    pub identifier: Eui64,
    pub network_index: NetworkIndex,
}

impl BindingEntry {
    pub const UNUSED: Self = Self {
        kind: BindingType::Unused,
        local: 0,
        cluster_id: 0,
        remote: 0,
        identifier: Eui64([0; 8]),
        network_index: 0,
    };

    pub const fn unicast(
        local: EndpointId,
        remote: EndpointId,
        cluster_id: ClusterId,
        identifier: Eui64,
        network_index: NetworkIndex,
    ) -> Self {
        Self {
            kind: BindingType::Unicast,
            local,
            cluster_id,
            remote,
            identifier,
            network_index,
        }
    }

    pub fn is_unused(&self) -> bool {
        self.kind == BindingType::Unused
    }

    /// Whether this entry already routes `cluster_id` from `local` to the
    /// remote endpoint of the node identified by `identifier`
    pub fn routes(
        &self,
        local: EndpointId,
        cluster_id: ClusterId,
        remote: EndpointId,
        identifier: &Eui64,
    ) -> bool {
        !self.is_unused()
            && self.local == local
            && self.cluster_id == cluster_id
            && self.remote == remote
            && &self.identifier == identifier
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BindingError {
    #[error("binding table entry {index} could not be read")]
    Read { index: usize },
    #[error("binding table entry {index} could not be written")]
    Write { index: usize },
    #[error("binding table is full")]
    Full,
}

/// Fixed capacity binding table owned by the stack
pub trait BindingTable {
    /// Number of entries, used or not
    fn size(&self) -> usize;

    fn get(&self, index: usize) -> Result<BindingEntry, BindingError>;

    fn set(&mut self, index: usize, entry: BindingEntry) -> Result<(), BindingError>;

    /// Cache the remote short address of an entry so that sending over it
    /// doesn't need an address discovery broadcast
    fn set_remote_node_id(&mut self, index: usize, node_id: ShortAddress);

    fn remote_node_id(&self, index: usize) -> Option<ShortAddress>;
}

impl<T> BindingTable for &mut T
where
    T: BindingTable,
{
    fn size(&self) -> usize {
        (**self).size()
    }

    fn get(&self, index: usize) -> Result<BindingEntry, BindingError> {
        (**self).get(index)
    }

    fn set(&mut self, index: usize, entry: BindingEntry) -> Result<(), BindingError> {
        (**self).set(index, entry)
    }

    fn set_remote_node_id(&mut self, index: usize, node_id: ShortAddress) {
        (**self).set_remote_node_id(index, node_id)
    }

    fn remote_node_id(&self, index: usize) -> Option<ShortAddress> {
        (**self).remote_node_id(index)
    }
}

/// A binding table kept in RAM
#[derive(Debug, Clone)]
pub struct MemoryBindingTable<const N: usize> {
    entries: [BindingEntry; N],
    remote_node_ids: [Option<ShortAddress>; N],
}

impl<const N: usize> MemoryBindingTable<N> {
    pub const fn new() -> Self {
        Self {
            entries: [BindingEntry::UNUSED; N],
            remote_node_ids: [None; N],
        }
    }

    /// Entries in use together with their index
    pub fn used(&self) -> impl Iterator<Item = (usize, &BindingEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.is_unused())
    }

    pub fn len(&self) -> usize {
        self.used().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn delete(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            *entry = BindingEntry::UNUSED;
            self.remote_node_ids[index] = None;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl<const N: usize> Default for MemoryBindingTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> BindingTable for MemoryBindingTable<N> {
    fn size(&self) -> usize {
        N
    }

    fn get(&self, index: usize) -> Result<BindingEntry, BindingError> {
        self.entries
            .get(index)
            .copied()
            .ok_or(BindingError::Read { index })
    }

    fn set(&mut self, index: usize, entry: BindingEntry) -> Result<(), BindingError> {
        let slot = self
            .entries
            .get_mut(index)
            .ok_or(BindingError::Write { index })?;
        *slot = entry;
        // A new route invalidates the cached address of the previous one
        self.remote_node_ids[index] = None;
        Ok(())
    }

    fn set_remote_node_id(&mut self, index: usize, node_id: ShortAddress) {
        if let Some(slot) = self.remote_node_ids.get_mut(index) {
            *slot = Some(node_id);
        }
    }

    fn remote_node_id(&self, index: usize) -> Option<ShortAddress> {
        self.remote_node_ids.get(index).copied().flatten()
    }
}
