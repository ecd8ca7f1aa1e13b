//! Topology type definitions.
//!
//! Types for neighbor observations, undirected links and the per-device
//! interface bookkeeping produced by the graph builder.

/// One directed neighbor observation: a canonical local interface claiming a
/// link to a bare (domain-stripped) remote hostname. Observations are per
/// device and may be asymmetric or missing on the far side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborObservation {
    pub local_interface: String,
    pub remote_host: String,
}

/// A device as the graph builder sees it: hostname, ordered observations and
/// whether a rename table exists for it. Devices without a rename table still
/// become lab nodes but get no interface elements.
#[derive(Debug, Clone)]
pub struct DeviceNeighbors {
    pub hostname: String,
    pub observations: Vec<NeighborObservation>,
    pub has_rename_table: bool,
}

/// One endpoint of an undirected link.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Endpoint {
    pub hostname: String,
    pub interface: String,
}

impl Endpoint {
    pub fn new(hostname: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            interface: interface.into(),
        }
    }
}

/// Identity of an undirected link: the sorted pair of its endpoints, so that
/// the same physical connection observed from either side produces the same
/// key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkKey {
    a: Endpoint,
    b: Endpoint,
}

impl LinkKey {
    pub fn new(x: Endpoint, y: Endpoint) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    /// The two endpoints in sorted order.
    pub fn endpoints(&self) -> (&Endpoint, &Endpoint) {
        (&self.a, &self.b)
    }
}

/// Which tier of the reverse-interface resolver produced a link's far
/// endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    /// The remote device has an observation whose remote hostname matches
    /// the local device.
    HostnameMatch,
    /// No hostname match existed; the remote device's first-listed interface
    /// was used. Best-effort only.
    FirstInterfaceFallback,
}

/// A deduplicated undirected link with its sequential network identifier.
#[derive(Debug, Clone)]
pub struct Link {
    /// Network identifier, 1..N in discovery order.
    pub id: u32,
    pub key: LinkKey,
    /// Resolver tier that produced the reverse endpoint when this link was
    /// first registered.
    pub tier: ResolutionTier,
}

/// A resolved lab interface: index within its node, canonical name and the
/// network it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAssignment {
    pub index: u32,
    pub name: String,
    pub network_id: u32,
}

/// Per-device interface bookkeeping, in snapshot order.
#[derive(Debug, Clone)]
pub struct NodeInterfaces {
    pub hostname: String,
    /// Interfaces whose link resolved to a registered network.
    pub interfaces: Vec<InterfaceAssignment>,
    /// Count of distinct canonical local interfaces observed, resolved or
    /// not. Drives the legacy slot-count formula.
    pub observed_interfaces: usize,
    /// Highest interface index assigned, including indices consumed by
    /// interfaces whose reverse could not be resolved.
    pub max_index: Option<u32>,
}

/// Non-fatal conditions surfaced while building the graph. Dropped links are
/// reported so a caller can audit generated-topology coverage against the
/// expected physical network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyWarning {
    #[error(
        "could not find reverse interface from {remote} to {local}: \
         dropped link via {local_interface}"
    )]
    MissingReverseInterface {
        local: String,
        local_interface: String,
        remote: String,
    },
}

/// Output of one graph build: registered links in id order, per-device
/// interface tables in input order, and every warning emitted.
#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    pub links: Vec<Link>,
    pub nodes: Vec<NodeInterfaces>,
    pub warnings: Vec<TopologyWarning>,
}

impl TopologyGraph {
    pub fn network_count(&self) -> usize {
        self.links.len()
    }
}
