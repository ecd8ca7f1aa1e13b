//! # AutoLab - Network topology reconstruction and lab generation
//!
//! This library rebuilds a network's connectivity from per-device,
//! peer-reported discovery data and materializes it as a virtual-lab
//! document loadable by the EVE-NG emulation platform.
//!
//! ## Overview
//!
//! Given, per device, a set of locally observed neighbor links and a
//! reported hardware model, AutoLab canonicalizes interface naming so
//! configuration text and discovery data agree, merges the per-device
//! directed observations into one deduplicated undirected link graph,
//! resolves each model to a virtual-appliance profile and emits a
//! deterministic, structurally valid lab document.
//!
//! Collection of the raw data (management sessions, command parsing,
//! inventory handling) is a collaborator concern and stays outside this
//! crate's core: one run consumes a fully materialized snapshot and
//! produces one document.
//!
//! ## Architecture
//!
//! - `canonicalizer`: interface-name rewriting and per-device rename tables
//! - `snapshot`: snapshot parsing, neighbor normalization and validation
//! - `topology`: deduplicated link graph with sequential network ids
//! - `model`: hardware model to appliance-profile resolution
//! - `lab`: lab document composition and XML serialization
//! - `orchestrator`: end-to-end pipeline for one generation run
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use autolab::lab::GeneratorOptions;
//! use autolab::model::{ModelMap, ModelResolver};
//! use autolab::orchestrator::generate_lab;
//! use autolab::snapshot::Snapshot;
//! use std::path::Path;
//!
//! let snapshot = Snapshot::load(Path::new("snapshot.yaml"))?;
//! let resolver = ModelResolver::Table(ModelMap::load(Path::new("model_map.json"))?);
//! let report = generate_lab(
//!     &snapshot,
//!     &resolver,
//!     &GeneratorOptions::default(),
//!     Path::new("output/AutoLab.unl"),
//! )?;
//! println!("{} nodes, {} networks", report.node_count, report.network_count);
//! # Ok::<(), color_eyre::eyre::Report>(())
//! ```
//!
//! ## Error Handling
//!
//! Fallible public functions return `color_eyre::Result`. Topology-level
//! problems (an unresolvable reverse interface, an unknown model) are
//! non-fatal: the affected link or profile falls back and the condition is
//! reported in the build report, never silently swallowed.

pub mod canonicalizer;
pub mod lab;
pub mod model;
pub mod orchestrator;
pub mod snapshot;
pub mod topology;
