//! Graph building algorithm.
//!
//! Two passes over a complete device snapshot: the first registers every
//! resolvable undirected link and assigns sequential network identifiers, the
//! second assigns per-device interface indices and attaches resolved
//! interfaces to their networks. Reverse-interface resolution needs all
//! devices visible at once, so the snapshot must be fully materialized before
//! this runs.

use std::collections::HashMap;

use log::{debug, warn};

use super::types::{
    DeviceNeighbors, Endpoint, InterfaceAssignment, Link, LinkKey, NodeInterfaces,
    ResolutionTier, TopologyGraph, TopologyWarning,
};

/// Resolve the interface on `remote` that points back at `local_host`.
///
/// Tier 1 scans the remote device's observations for an entry whose remote
/// hostname starts with `local_host`. Tier 2 falls back to the remote
/// device's first-listed interface, a documented best-effort heuristic.
/// Returns `None` only when the remote device has no observations at all.
fn resolve_reverse<'a>(
    remote: Option<&'a DeviceNeighbors>,
    local_host: &str,
) -> Option<(&'a str, ResolutionTier)> {
    let remote = remote?;
    if let Some(obs) = remote
        .observations
        .iter()
        .find(|o| o.remote_host.starts_with(local_host))
    {
        return Some((obs.local_interface.as_str(), ResolutionTier::HostnameMatch));
    }
    remote
        .observations
        .first()
        .map(|o| (o.local_interface.as_str(), ResolutionTier::FirstInterfaceFallback))
}

/// Build the deduplicated link graph from a complete snapshot of per-device
/// neighbor observations.
///
/// # Arguments
/// * `devices` - All devices in snapshot order, observations already
///   canonicalized and suffix-stripped
///
/// # Returns
/// The link registry, per-device interface tables and the warning list.
/// Unresolvable reverses are non-fatal: the candidate link is dropped and a
/// warning recorded.
pub fn build_topology(devices: &[DeviceNeighbors]) -> TopologyGraph {
    let by_host: HashMap<&str, &DeviceNeighbors> = devices
        .iter()
        .map(|d| (d.hostname.as_str(), d))
        .collect();

    // Pass 1: register every resolvable link under its sorted endpoint key.
    let mut registry: HashMap<LinkKey, u32> = HashMap::new();
    let mut links: Vec<Link> = Vec::new();
    let mut warnings: Vec<TopologyWarning> = Vec::new();

    for device in devices {
        for obs in &device.observations {
            let remote = by_host.get(obs.remote_host.as_str()).copied();
            match resolve_reverse(remote, &device.hostname) {
                Some((remote_interface, tier)) => {
                    if tier == ResolutionTier::FirstInterfaceFallback {
                        debug!(
                            "No observation on {} names {}; using first-listed interface {}",
                            obs.remote_host, device.hostname, remote_interface
                        );
                    }
                    let key = LinkKey::new(
                        Endpoint::new(&device.hostname, &obs.local_interface),
                        Endpoint::new(&obs.remote_host, remote_interface),
                    );
                    if !registry.contains_key(&key) {
                        let id = links.len() as u32 + 1;
                        registry.insert(key.clone(), id);
                        links.push(Link { id, key, tier });
                    }
                }
                None => {
                    warn!(
                        "Could not find reverse interface from {} to {}",
                        obs.remote_host, device.hostname
                    );
                    warnings.push(TopologyWarning::MissingReverseInterface {
                        local: device.hostname.clone(),
                        local_interface: obs.local_interface.clone(),
                        remote: obs.remote_host.clone(),
                    });
                }
            }
        }
    }

    // Pass 2: assign interface indices lazily in first-seen order and attach
    // interfaces whose link key is registered. Indices are consumed even when
    // the reverse cannot be resolved, so the declared slot accounting stays
    // consistent with what was observed.
    let mut nodes: Vec<NodeInterfaces> = Vec::with_capacity(devices.len());

    for device in devices {
        let mut interfaces: Vec<InterfaceAssignment> = Vec::new();
        let mut index_table: HashMap<&str, u32> = HashMap::new();
        let mut next_index = 0u32;

        if device.has_rename_table {
            for obs in &device.observations {
                let index = *index_table
                    .entry(obs.local_interface.as_str())
                    .or_insert_with(|| {
                        let index = next_index;
                        next_index += 1;
                        index
                    });
                if interfaces.iter().any(|i| i.index == index) {
                    continue;
                }

                let remote = by_host.get(obs.remote_host.as_str()).copied();
                let Some((remote_interface, _)) = resolve_reverse(remote, &device.hostname)
                else {
                    continue;
                };
                let key = LinkKey::new(
                    Endpoint::new(&device.hostname, &obs.local_interface),
                    Endpoint::new(&obs.remote_host, remote_interface),
                );
                if let Some(&network_id) = registry.get(&key) {
                    interfaces.push(InterfaceAssignment {
                        index,
                        name: obs.local_interface.clone(),
                        network_id,
                    });
                }
            }
        }

        let observed_interfaces = {
            let mut distinct: Vec<&str> = device
                .observations
                .iter()
                .map(|o| o.local_interface.as_str())
                .collect();
            distinct.sort_unstable();
            distinct.dedup();
            distinct.len()
        };

        nodes.push(NodeInterfaces {
            hostname: device.hostname.clone(),
            interfaces,
            observed_interfaces,
            max_index: next_index.checked_sub(1),
        });
    }

    TopologyGraph {
        links,
        nodes,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::types::NeighborObservation;

    fn device(hostname: &str, observations: &[(&str, &str)]) -> DeviceNeighbors {
        DeviceNeighbors {
            hostname: hostname.to_string(),
            observations: observations
                .iter()
                .map(|(local, remote)| NeighborObservation {
                    local_interface: local.to_string(),
                    remote_host: remote.to_string(),
                })
                .collect(),
            has_rename_table: true,
        }
    }

    #[test]
    fn test_symmetric_pair_builds_one_network() {
        let devices = vec![
            device("R1", &[("Gig0/0", "R2")]),
            device("R2", &[("Gig0/1", "R1")]),
        ];
        let graph = build_topology(&devices);

        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].id, 1);
        assert_eq!(graph.links[0].tier, ResolutionTier::HostnameMatch);
        assert!(graph.warnings.is_empty());

        assert_eq!(graph.nodes[0].interfaces.len(), 1);
        assert_eq!(graph.nodes[0].interfaces[0].index, 0);
        assert_eq!(graph.nodes[0].interfaces[0].network_id, 1);
        assert_eq!(graph.nodes[1].interfaces.len(), 1);
        assert_eq!(graph.nodes[1].interfaces[0].index, 0);
        assert_eq!(graph.nodes[1].interfaces[0].network_id, 1);
    }

    #[test]
    fn test_link_identity_symmetric_under_device_order() {
        let forward = vec![
            device("R1", &[("Gig0/0", "R2"), ("Gig0/1", "R3")]),
            device("R2", &[("Gig0/1", "R1")]),
            device("R3", &[("Gig0/2", "R1")]),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let keys = |graph: &TopologyGraph| {
            let mut keys: Vec<LinkKey> = graph.links.iter().map(|l| l.key.clone()).collect();
            keys.sort();
            keys
        };

        let a = build_topology(&forward);
        let b = build_topology(&reversed);
        // Ids may renumber; the endpoint-key membership must not differ.
        assert_eq!(keys(&a), keys(&b));
        assert_eq!(a.links.len(), b.links.len());
    }

    #[test]
    fn test_network_ids_contiguous_from_one() {
        let devices = vec![
            device("R1", &[("Gig0/0", "R2"), ("Gig0/1", "R3")]),
            device("R2", &[("Gig0/0", "R1"), ("Gig0/1", "R3")]),
            device("R3", &[("Gig0/0", "R1"), ("Gig0/1", "R2")]),
        ];
        let graph = build_topology(&devices);

        let ids: Vec<u32> = graph.links.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_neighbor_without_data_drops_link_with_warning() {
        let devices = vec![
            device("R1", &[("Gig0/0", "R2"), ("Gig0/1", "R3")]),
            device("R2", &[("Gig0/0", "R1")]),
            device("R3", &[]),
        ];
        let graph = build_topology(&devices);

        // R1-R2 survives, R1-R3 is dropped.
        assert_eq!(graph.links.len(), 1);
        assert_eq!(
            graph.warnings,
            vec![TopologyWarning::MissingReverseInterface {
                local: "R1".to_string(),
                local_interface: "Gig0/1".to_string(),
                remote: "R3".to_string(),
            }]
        );

        // The dropped link appears in no interface list, but its index slot
        // was still consumed.
        let r1 = &graph.nodes[0];
        assert_eq!(r1.interfaces.len(), 1);
        assert_eq!(r1.interfaces[0].index, 0);
        assert_eq!(r1.max_index, Some(1));

        let r3 = &graph.nodes[2];
        assert!(r3.interfaces.is_empty());
        assert_eq!(r3.max_index, None);
    }

    #[test]
    fn test_unlisted_remote_treated_as_missing() {
        let devices = vec![device("R1", &[("Gig0/0", "R9")])];
        let graph = build_topology(&devices);

        assert!(graph.links.is_empty());
        assert_eq!(graph.warnings.len(), 1);
    }

    #[test]
    fn test_fallback_tier_recorded() {
        // R2 has observations but none pointing at R1, so the first-listed
        // interface is used and the tier recorded.
        let devices = vec![
            device("R1", &[("Gig0/0", "R2")]),
            device("R2", &[("Gig0/5", "R7")]),
        ];
        let graph = build_topology(&devices);

        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.links[0].tier, ResolutionTier::FirstInterfaceFallback);
        let (a, b) = graph.links[0].key.endpoints();
        assert_eq!((a.hostname.as_str(), a.interface.as_str()), ("R1", "Gig0/0"));
        assert_eq!((b.hostname.as_str(), b.interface.as_str()), ("R2", "Gig0/5"));
    }

    #[test]
    fn test_hostname_match_preferred_over_first_listed() {
        let devices = vec![
            device("R1", &[("Gig0/0", "R2")]),
            device("R2", &[("Gig0/9", "R7"), ("Gig0/3", "R1")]),
        ];
        let graph = build_topology(&devices);

        assert_eq!(graph.links[0].tier, ResolutionTier::HostnameMatch);
        let (_, b) = graph.links[0].key.endpoints();
        assert_eq!(b.interface, "Gig0/3");
    }

    #[test]
    fn test_device_without_rename_table_gets_no_interfaces() {
        let mut devices = vec![
            device("R1", &[("Gig0/0", "R2")]),
            device("R2", &[("Gig0/1", "R1")]),
        ];
        devices[1].has_rename_table = false;
        let graph = build_topology(&devices);

        // The link itself still exists; only the interface attachment is
        // gated on a rename table.
        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.nodes[0].interfaces.len(), 1);
        assert!(graph.nodes[1].interfaces.is_empty());
        assert_eq!(graph.nodes[1].observed_interfaces, 1);
    }

    #[test]
    fn test_duplicate_observation_registers_one_link() {
        let devices = vec![
            device("R1", &[("Gig0/0", "R2")]),
            device("R2", &[("Gig0/1", "R1"), ("Gig0/1", "R1")]),
        ];
        let graph = build_topology(&devices);

        assert_eq!(graph.links.len(), 1);
    }
}
