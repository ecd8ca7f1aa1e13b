//! Generation orchestrator.
//!
//! Coordinates one end-to-end run: canonicalize each device configuration,
//! reinterpret neighbor observations through the rename tables, build the
//! link graph, resolve appliance profiles and write the lab document. All
//! per-run state (rename tables, link registry, index counters) lives inside
//! the call and is discarded on return.

use std::collections::HashMap;
use std::path::Path;

use color_eyre::Result;
use log::{info, warn};

use crate::canonicalizer::{canonicalize_config, RenameTable};
use crate::lab::{generate_lab_document, GeneratorOptions, LabNodeSpec};
use crate::model::ModelResolver;
use crate::snapshot::Snapshot;
use crate::topology::{build_topology, DeviceNeighbors, NeighborObservation, TopologyWarning};

/// Everything one run produces besides the written lab file. Warnings are
/// included so a caller can audit how much of the physical network made it
/// into the generated topology.
#[derive(Debug, Clone)]
pub struct LabBuildReport {
    /// Hostname to lab node id, for collaborators writing node-keyed
    /// artifacts.
    pub node_ids: HashMap<String, u32>,
    /// Rewritten configuration text per hostname, for per-hostname or
    /// per-node-id persistence.
    pub rewritten_configs: HashMap<String, String>,
    /// Raw-to-canonical rename table per hostname with configuration.
    pub rename_tables: HashMap<String, RenameTable>,
    /// Non-fatal conditions encountered while building the graph.
    pub warnings: Vec<TopologyWarning>,
    pub node_count: usize,
    pub network_count: usize,
}

/// Run the full pipeline over one snapshot and write the lab document to
/// `output_path`.
///
/// # Arguments
/// * `snapshot` - Complete, validated device snapshot for this run
/// * `resolver` - Profile resolution strategy (model map or offline mode)
/// * `options` - Lab name and slot-count mode
/// * `output_path` - Destination for the serialized lab document
pub fn generate_lab(
    snapshot: &Snapshot,
    resolver: &ModelResolver,
    options: &GeneratorOptions,
    output_path: &Path,
) -> Result<LabBuildReport> {
    // Canonicalize configurations first; the rename tables govern how the
    // graph builder interprets neighbor entries.
    let mut rewritten_configs: HashMap<String, String> = HashMap::new();
    let mut rename_tables: HashMap<String, RenameTable> = HashMap::new();

    for device in &snapshot.devices {
        if let Some(config) = &device.config {
            let canonicalized = canonicalize_config(config)?;
            info!(
                "{}: canonicalized {} interfaces",
                device.hostname,
                canonicalized.renames.len()
            );
            rewritten_configs.insert(device.hostname.clone(), canonicalized.text);
            rename_tables.insert(device.hostname.clone(), canonicalized.renames);
        }
    }

    // Reinterpret each device's raw neighbor interface names through its
    // rename table; names without an entry pass through unchanged.
    let devices: Vec<DeviceNeighbors> = snapshot
        .devices
        .iter()
        .map(|device| {
            let table = rename_tables.get(&device.hostname);
            let observations = device
                .normalized_neighbors()
                .into_iter()
                .map(|(local, remote)| {
                    let canonical = table
                        .map(|t| t.canonical_or(&local).to_string())
                        .unwrap_or(local);
                    NeighborObservation {
                        local_interface: canonical,
                        remote_host: remote,
                    }
                })
                .collect();
            DeviceNeighbors {
                hostname: device.hostname.clone(),
                observations,
                has_rename_table: table.is_some(),
            }
        })
        .collect();

    let graph = build_topology(&devices);
    for warning in &graph.warnings {
        warn!("{}", warning);
    }

    let nodes: Vec<LabNodeSpec> = snapshot
        .devices
        .iter()
        .zip(&graph.nodes)
        .map(|(device, node)| LabNodeSpec {
            hostname: device.hostname.clone(),
            profile: resolver.resolve(&device.hostname, &device.model),
            interfaces: node.interfaces.clone(),
            observed_interfaces: node.observed_interfaces,
            max_index: node.max_index,
        })
        .collect();

    let document = generate_lab_document(&nodes, graph.network_count() as u32, options);
    document.write(output_path)?;

    info!(
        "Lab build complete: {} nodes, {} networks, {} warnings",
        nodes.len(),
        graph.network_count(),
        graph.warnings.len()
    );

    let network_count = graph.network_count();
    Ok(LabBuildReport {
        node_ids: document.node_ids().clone(),
        rewritten_configs,
        rename_tables,
        warnings: graph.warnings,
        node_count: nodes.len(),
        network_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lab::SlotCountMode;

    fn two_device_snapshot() -> Snapshot {
        Snapshot::from_yaml(
            r#"
devices:
  - hostname: R1
    config: |
      interface GigabitEthernet0/0
       ip address 10.0.0.1 255.255.255.252
    neighbors:
      - local_interface: GigabitEthernet0/0
        remote_host: R2.lab.local
  - hostname: R2
    config: |
      interface GigabitEthernet0/1
       ip address 10.0.0.2 255.255.255.252
    neighbors:
      - local_interface: GigabitEthernet0/1
        remote_host: R1.lab.local
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_end_to_end_two_device_lab() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("AutoLab.unl");
        let snapshot = two_device_snapshot();

        let report = generate_lab(
            &snapshot,
            &ModelResolver::HostnamePrefix,
            &GeneratorOptions::default(),
            &output,
        )
        .unwrap();

        assert_eq!(report.node_count, 2);
        assert_eq!(report.network_count, 1);
        assert!(report.warnings.is_empty());
        assert_eq!(report.node_ids["R1"], 1);
        assert_eq!(report.node_ids["R2"], 2);

        // Raw CDP names were mapped through the rename tables.
        let xml = std::fs::read_to_string(&output).unwrap();
        assert!(xml.contains(
            "<interface id=\"0\" name=\"Ethernet0/0\" type=\"ethernet\" network_id=\"1\"/>"
        ));
        assert!(report.rewritten_configs["R1"].contains("interface Ethernet0/0"));
    }

    #[test]
    fn test_determinism_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = two_device_snapshot();
        let options = GeneratorOptions::default();

        let first = generate_lab(
            &snapshot,
            &ModelResolver::HostnamePrefix,
            &options,
            &dir.path().join("a.unl"),
        )
        .unwrap();
        let second = generate_lab(
            &snapshot,
            &ModelResolver::HostnamePrefix,
            &options,
            &dir.path().join("b.unl"),
        )
        .unwrap();

        assert_eq!(first.node_ids, second.node_ids);
        assert_eq!(first.node_count, second.node_count);
        assert_eq!(first.network_count, second.network_count);
    }

    #[test]
    fn test_device_without_config_still_becomes_node() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("AutoLab.unl");
        let snapshot = Snapshot::from_yaml(
            r#"
devices:
  - hostname: R1
    neighbors:
      - local_interface: Gig0/0
        remote_host: R2
  - hostname: R2
    neighbors:
      - local_interface: Gig0/1
        remote_host: R1
"#,
        )
        .unwrap();

        let report = generate_lab(
            &snapshot,
            &ModelResolver::HostnamePrefix,
            &GeneratorOptions::default(),
            &output,
        )
        .unwrap();

        // Without rename tables there are nodes and a network, but no
        // interface elements.
        assert_eq!(report.node_count, 2);
        assert_eq!(report.network_count, 1);
        let xml = std::fs::read_to_string(&output).unwrap();
        assert!(!xml.contains("<interface "));
    }

    #[test]
    fn test_unwritable_destination_is_fatal() {
        let snapshot = two_device_snapshot();
        let result = generate_lab(
            &snapshot,
            &ModelResolver::HostnamePrefix,
            &GeneratorOptions {
                slot_count: SlotCountMode::LegacyBuffer,
                ..GeneratorOptions::default()
            },
            Path::new("/proc/autolab/denied/AutoLab.unl"),
        );

        assert!(result.is_err());
    }
}
