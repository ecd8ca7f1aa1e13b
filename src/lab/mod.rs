//! Lab document module.
//!
//! Serialization of the reconstructed topology into the lab artifact the
//! emulation platform consumes.

pub mod document;
pub mod xml;

// Re-export key types and functions for easier access
pub use document::{
    generate_lab_document, GeneratorOptions, LabDocument, LabNodeSpec, SlotCountMode,
};
pub use xml::XmlElement;
