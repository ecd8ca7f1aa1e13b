//! Lab document generation.
//!
//! Composes resolved devices and the network set into the serialized lab
//! artifact the emulation platform loads: one node element per device with
//! nested interface elements, and one network element per deduplicated link.

use std::collections::HashMap;
use std::path::Path;

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use uuid::Uuid;

use crate::lab::xml::XmlElement;
use crate::model::ApplianceProfile;
use crate::topology::InterfaceAssignment;

/// How the declared ethernet slot count of a node is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotCountMode {
    /// `max(assigned interface index) + 1`, minimum 1. Matches what was
    /// actually assigned.
    #[default]
    Assigned,
    /// Distinct observed local interfaces + 1, the legacy buffer formula.
    /// Can under- or over-provision; kept for compatibility with labs built
    /// by the original tooling.
    LegacyBuffer,
}

/// Generator options for one document.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub lab_name: String,
    pub slot_count: SlotCountMode,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            lab_name: "AutoLab".to_string(),
            slot_count: SlotCountMode::default(),
        }
    }
}

/// Everything the generator needs for one node, in snapshot order.
#[derive(Debug, Clone)]
pub struct LabNodeSpec {
    pub hostname: String,
    pub profile: ApplianceProfile,
    /// Interfaces that resolved to a registered network.
    pub interfaces: Vec<InterfaceAssignment>,
    /// Distinct observed local interfaces, resolved or not.
    pub observed_interfaces: usize,
    /// Highest assigned interface index, if any index was assigned.
    pub max_index: Option<u32>,
}

impl LabNodeSpec {
    fn declared_slots(&self, mode: SlotCountMode) -> u32 {
        match mode {
            SlotCountMode::Assigned => self.max_index.map(|m| m + 1).unwrap_or(1),
            SlotCountMode::LegacyBuffer => self.observed_interfaces as u32 + 1,
        }
    }
}

/// A generated lab document together with the hostname-to-node-id map that
/// collaborators need for node-keyed artifacts.
#[derive(Debug, Clone)]
pub struct LabDocument {
    root: XmlElement,
    node_ids: HashMap<String, u32>,
}

impl LabDocument {
    pub fn node_ids(&self) -> &HashMap<String, u32> {
        &self.node_ids
    }

    /// Serialize the document to XML text.
    pub fn to_xml(&self) -> String {
        self.root.to_document_string()
    }

    /// Write the document to `path`, creating parent directories. Write
    /// failures propagate to the caller; there is nothing to retry.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).wrap_err_with(|| {
                    format!("Failed to create output directory '{}'", parent.display())
                })?;
            }
        }
        std::fs::write(path, self.to_xml())
            .wrap_err_with(|| format!("Failed to write lab document '{}'", path.display()))?;
        info!("Generated lab document at {:?}", path);
        Ok(())
    }
}

/// Generate the lab document: node ids sequential from 1 in input order,
/// network ids 1..=network_count as registered by the graph builder.
pub fn generate_lab_document(
    nodes: &[LabNodeSpec],
    network_count: u32,
    options: &GeneratorOptions,
) -> LabDocument {
    let mut root = XmlElement::new("lab")
        .attr("name", options.lab_name.as_str())
        .attr("version", "1")
        .attr("scripttimeout", "300")
        .attr("lock", "0");

    let mut nodes_elem = XmlElement::new("nodes");
    let mut node_ids: HashMap<String, u32> = HashMap::new();

    for (i, spec) in nodes.iter().enumerate() {
        let node_id = i as u32 + 1;
        let mut node_elem = XmlElement::new("node")
            .attr("id", node_id.to_string())
            .attr("name", spec.hostname.as_str())
            .attr("type", "qemu")
            .attr("template", spec.profile.template.as_str())
            .attr("image", spec.profile.image.as_str())
            .attr("console", "telnet")
            .attr("cpu", "1")
            .attr("cpulimit", "0")
            .attr("ram", spec.profile.ram.to_string())
            .attr("ethernet", spec.declared_slots(options.slot_count).to_string())
            .attr("uuid", Uuid::new_v4().to_string())
            .attr("left", (200 * node_id).to_string())
            .attr("top", "200")
            .attr("icon", spec.profile.icon.as_str())
            .attr("config", "0");

        for interface in &spec.interfaces {
            node_elem.push_child(
                XmlElement::new("interface")
                    .attr("id", interface.index.to_string())
                    .attr("name", interface.name.as_str())
                    .attr("type", "ethernet")
                    .attr("network_id", interface.network_id.to_string()),
            );
        }

        node_ids.insert(spec.hostname.clone(), node_id);
        nodes_elem.push_child(node_elem);
    }

    let mut networks_elem = XmlElement::new("networks");
    for id in 1..=network_count {
        networks_elem.push_child(
            XmlElement::new("network")
                .attr("id", id.to_string())
                .attr("type", "bridge")
                .attr("name", format!("Net-Switchiface_{}", id - 1))
                .attr("left", "462")
                .attr("top", "175")
                .attr("visibility", "0"),
        );
    }

    let mut topology_elem = XmlElement::new("topology");
    topology_elem.push_child(nodes_elem);
    topology_elem.push_child(networks_elem);
    root.push_child(topology_elem);

    LabDocument { root, node_ids }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(hostname: &str, interfaces: Vec<InterfaceAssignment>) -> LabNodeSpec {
        let observed = interfaces.len();
        let max_index = interfaces.iter().map(|i| i.index).max();
        LabNodeSpec {
            hostname: hostname.to_string(),
            profile: ApplianceProfile::default(),
            interfaces,
            observed_interfaces: observed,
            max_index,
        }
    }

    fn iface(index: u32, name: &str, network_id: u32) -> InterfaceAssignment {
        InterfaceAssignment {
            index,
            name: name.to_string(),
            network_id,
        }
    }

    #[test]
    fn test_node_ids_sequential_in_input_order() {
        let nodes = vec![
            spec("R2", vec![]),
            spec("R1", vec![]),
            spec("SW1", vec![]),
        ];
        let doc = generate_lab_document(&nodes, 0, &GeneratorOptions::default());

        assert_eq!(doc.node_ids()["R2"], 1);
        assert_eq!(doc.node_ids()["R1"], 2);
        assert_eq!(doc.node_ids()["SW1"], 3);
    }

    #[test]
    fn test_document_structure_and_attributes() {
        let nodes = vec![spec("R1", vec![iface(0, "Ethernet0/0", 1)])];
        let doc = generate_lab_document(&nodes, 1, &GeneratorOptions::default());
        let xml = doc.to_xml();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<lab name=\"AutoLab\" version=\"1\" scripttimeout=\"300\" lock=\"0\">"));
        assert!(xml.contains("id=\"1\" name=\"R1\" type=\"qemu\" template=\"viosl2\""));
        assert!(xml.contains("console=\"telnet\" cpu=\"1\" cpulimit=\"0\" ram=\"2048\""));
        assert!(xml.contains("left=\"200\" top=\"200\""));
        assert!(xml.contains(
            "<interface id=\"0\" name=\"Ethernet0/0\" type=\"ethernet\" network_id=\"1\"/>"
        ));
        assert!(xml.contains(
            "<network id=\"1\" type=\"bridge\" name=\"Net-Switchiface_0\" left=\"462\" top=\"175\" visibility=\"0\"/>"
        ));
    }

    #[test]
    fn test_assigned_slot_count() {
        let mut node = spec("R1", vec![iface(0, "Ethernet0/0", 1)]);
        // Two indices were consumed but only one interface resolved.
        node.max_index = Some(1);
        let doc = generate_lab_document(&[node], 1, &GeneratorOptions::default());

        assert!(doc.to_xml().contains("ethernet=\"2\""));
    }

    #[test]
    fn test_assigned_slot_count_minimum_one() {
        let node = spec("R1", vec![]);
        let doc = generate_lab_document(&[node], 0, &GeneratorOptions::default());

        assert!(doc.to_xml().contains("ethernet=\"1\""));
    }

    #[test]
    fn test_legacy_slot_count_adds_buffer() {
        let mut node = spec("R1", vec![iface(0, "Ethernet0/0", 1)]);
        node.observed_interfaces = 3;
        let options = GeneratorOptions {
            slot_count: SlotCountMode::LegacyBuffer,
            ..GeneratorOptions::default()
        };
        let doc = generate_lab_document(&[node], 1, &options);

        assert!(doc.to_xml().contains("ethernet=\"4\""));
    }

    #[test]
    fn test_network_ids_contiguous() {
        let doc = generate_lab_document(&[], 3, &GeneratorOptions::default());
        let xml = doc.to_xml();

        for id in 1..=3 {
            assert!(xml.contains(&format!("<network id=\"{}\"", id)));
        }
        assert!(!xml.contains("<network id=\"4\""));
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labs/AutoLab.unl");
        let doc = generate_lab_document(&[spec("R1", vec![])], 0, &GeneratorOptions::default());

        doc.write(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("name=\"R1\""));
    }
}
