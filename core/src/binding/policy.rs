//! Binding table policy: slot allocation, duplicate detection and writing the
//! bindings of a commissioned remote.

use tracing::{debug, error, warn};

use crate::{
    commissioning::{RemoteCandidate, SkipMask},
    data_model::{EndpointId, Eui64, NetworkIndex},
};

use super::{BindingEntry, BindingError, BindingTable};

/// Find the first unused entry.
///
/// A failed read is reported as [`BindingError::Read`], which is distinct from
/// a table without free entries ([`BindingError::Full`]).
pub fn find_unused_index<B>(table: &B) -> Result<usize, BindingError>
where
    B: BindingTable + ?Sized,
{
    for index in 0..table.size() {
        let entry = table.get(index).map_err(|err| {
            error!(index, "cannot get the binding entry");
            err
        })?;
        if entry.is_unused() {
            return Ok(index);
        }
    }
    Err(BindingError::Full)
}

/// Skip every supported cluster of `candidate` that is already bound from
/// `local_endpoint`, so that commissioning the same remote twice is a no-op.
pub fn mark_duplicate_matches<B>(
    table: &B,
    local_endpoint: EndpointId,
    identifier: &Eui64,
    candidate: &RemoteCandidate,
    mask: &mut SkipMask,
) where
    B: BindingTable + ?Sized,
{
    for (position, cluster_id) in candidate.supported_clusters().iter().enumerate() {
        for index in 0..table.size() {
            let Ok(entry) = table.get(index) else {
                break;
            };
            if entry.routes(local_endpoint, *cluster_id, candidate.endpoint, identifier) {
                debug!(cluster_id, index, "cluster already bound");
                mask.skip(position);
                break;
            }
        }
    }
}

/// Write a unicast binding for every supported cluster of `candidate` that
/// `mask` keeps, returning how many entries were written.
///
/// Allocation failures stop at the first cluster that cannot be placed.
/// Entries written before that stay in the table.
pub fn create_bindings<B>(
    table: &mut B,
    local_endpoint: EndpointId,
    network_index: NetworkIndex,
    identifier: Eui64,
    candidate: &RemoteCandidate,
    mask: &SkipMask,
) -> Result<usize, BindingError>
where
    B: BindingTable + ?Sized,
{
    let mut written = 0;
    for (position, cluster_id) in candidate.supported_clusters().iter().enumerate() {
        if mask.is_skipped(position) {
            continue;
        }
        let index = find_unused_index(table)?;
        let entry = BindingEntry::unicast(
            local_endpoint,
            candidate.endpoint,
            *cluster_id,
            identifier,
            network_index,
        );
        match table.set(index, entry) {
            Ok(()) => {
                table.set_remote_node_id(index, candidate.short_address);
                debug!(
                    index,
                    cluster_id,
                    remote_endpoint = candidate.endpoint,
                    "binding written"
                );
                written += 1;
            }
            Err(err) => warn!(%err, cluster_id, "binding not written"),
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;
    use crate::{
        binding::{BindingTable, MemoryBindingTable},
        data_model::ShortAddress,
        test_utils::FaultyBindingTable,
    };

    const REMOTE_EUI64: Eui64 = Eui64(hex!("1122334455667788"));

    fn candidate(clusters: &[u16]) -> RemoteCandidate {
        let mut candidate = RemoteCandidate::new(ShortAddress(0x1234), 2);
        let mut mask = SkipMask::default();
        mask.reset(clusters.len());
        candidate.set_supported_clusters(clusters, &mask);
        candidate
    }

    #[test]
    fn test_find_unused_index() {
        let mut table = MemoryBindingTable::<2>::new();
        assert_eq!(find_unused_index(&table), Ok(0));
        table
            .set(0, BindingEntry::unicast(1, 2, 6, REMOTE_EUI64, 0))
            .unwrap();
        assert_eq!(find_unused_index(&table), Ok(1));
        table
            .set(1, BindingEntry::unicast(1, 2, 8, REMOTE_EUI64, 0))
            .unwrap();
        assert_eq!(find_unused_index(&table), Err(BindingError::Full));
    }

    #[test]
    fn test_find_unused_index_read_failure() {
        let mut table = FaultyBindingTable::<4>::failing_reads_from(1);
        table
            .inner
            .set(0, BindingEntry::unicast(1, 2, 6, REMOTE_EUI64, 0))
            .unwrap();
        assert_eq!(
            find_unused_index(&table),
            Err(BindingError::Read { index: 1 })
        );
    }

    #[test]
    fn test_mark_duplicate_matches() {
        let mut table = MemoryBindingTable::<4>::new();
        table
            .set(3, BindingEntry::unicast(1, 2, 0x0008, REMOTE_EUI64, 0))
            .unwrap();
        // Same cluster, different local endpoint
        table
            .set(1, BindingEntry::unicast(5, 2, 0x0006, REMOTE_EUI64, 0))
            .unwrap();

        let candidate = candidate(&[0x0006, 0x0008]);
        let mut mask = SkipMask::default();
        mask.reset(candidate.supported_cluster_count());
        mark_duplicate_matches(&table, 1, &REMOTE_EUI64, &candidate, &mut mask);
        assert!(!mask.is_skipped(0));
        assert!(mask.is_skipped(1));
        assert_eq!(mask.mask(), 0b01);
    }

    #[test]
    fn test_create_bindings() {
        let mut table = MemoryBindingTable::<4>::new();
        let candidate = candidate(&[0x0006, 0x0008, 0x0300]);
        let mut mask = SkipMask::default();
        mask.reset(3);
        mask.skip(1);

        let written = create_bindings(&mut table, 1, 0, REMOTE_EUI64, &candidate, &mask);
        assert_eq!(written, Ok(2));
        assert_eq!(
            table.get(0),
            Ok(BindingEntry::unicast(1, 2, 0x0006, REMOTE_EUI64, 0))
        );
        assert_eq!(
            table.get(1),
            Ok(BindingEntry::unicast(1, 2, 0x0300, REMOTE_EUI64, 0))
        );
        assert_eq!(table.remote_node_id(0), Some(ShortAddress(0x1234)));
        assert_eq!(table.remote_node_id(1), Some(ShortAddress(0x1234)));
    }

    #[test]
    fn test_create_bindings_keeps_partial_writes() {
        let mut table = MemoryBindingTable::<1>::new();
        let candidate = candidate(&[0x0006, 0x0008]);
        let mut mask = SkipMask::default();
        mask.reset(2);

        let written = create_bindings(&mut table, 1, 0, REMOTE_EUI64, &candidate, &mask);
        assert_eq!(written, Err(BindingError::Full));
        assert_eq!(
            table.get(0),
            Ok(BindingEntry::unicast(1, 2, 0x0006, REMOTE_EUI64, 0))
        );
    }
}
