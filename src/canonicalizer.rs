//! Interface name canonicalization.
//!
//! Rewrites vendor-specific interface names in device configuration text to
//! the position-derived `Ethernet{module}/{port}` scheme the lab platform
//! expects, and records the raw-to-canonical rename table so neighbor
//! discovery data can be interpreted with the same names.

use color_eyre::Result;
use regex::Regex;

/// A single raw-to-canonical rename with its precompiled whole-word matcher.
#[derive(Debug, Clone)]
struct RenameEntry {
    original: String,
    canonical: String,
    pattern: Regex,
}

/// Per-device rename table, keyed by the exact trimmed original interface
/// name. Entries are kept in first-seen order so substitution is
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct RenameTable {
    entries: Vec<RenameEntry>,
}

impl RenameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the canonical name for a raw interface name.
    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.original == original)
            .map(|e| e.canonical.as_str())
    }

    /// Canonical name for `original`, or `original` itself when the table
    /// has no entry for it.
    pub fn canonical_or<'a>(&'a self, original: &'a str) -> &'a str {
        self.get(original).unwrap_or(original)
    }

    /// Iterate (original, canonical) pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.original.as_str(), e.canonical.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, original: &str, canonical: String) -> Result<()> {
        let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(original)))?;
        self.entries.push(RenameEntry {
            original: original.to_string(),
            canonical,
            pattern,
        });
        Ok(())
    }

    /// Substitute every known original name in `line`, whole-word only.
    fn apply(&self, line: &str) -> String {
        let mut out = line.to_string();
        for entry in &self.entries {
            out = entry
                .pattern
                .replace_all(&out, entry.canonical.as_str())
                .into_owned();
        }
        out
    }
}

/// Result of canonicalizing one device configuration.
#[derive(Debug, Clone)]
pub struct CanonicalizedConfig {
    /// Configuration text with every interface header and every whole-word
    /// reference to a seen interface rewritten.
    pub text: String,
    /// Raw-to-canonical rename table for this device.
    pub renames: RenameTable,
}

/// Canonical name for the `counter`-th interface header of a device.
fn canonical_name(counter: usize) -> String {
    format!("Ethernet{}/{}", counter / 4, counter % 4)
}

/// Rewrite every interface-block header in `config` to a canonical
/// `Ethernet{module}/{port}` name, assigned in appearance order with a
/// per-device counter. Lines after a header have any already-seen original
/// name substituted whole-word, keeping self-references such as tunnel
/// sources consistent with the renamed headers.
pub fn canonicalize_config(config: &str) -> Result<CanonicalizedConfig> {
    let mut renames = RenameTable::new();
    let mut counter = 0usize;
    let mut updated_lines: Vec<String> = Vec::new();

    for line in config.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("interface ") {
            let original = rest.trim();
            if !original.is_empty() {
                // A repeated header keeps its first assignment.
                let canonical = match renames.get(original) {
                    Some(existing) => existing.to_string(),
                    None => {
                        let name = canonical_name(counter);
                        renames.insert(original, name.clone())?;
                        counter += 1;
                        name
                    }
                };
                updated_lines.push(format!("interface {}", canonical));
                continue;
            }
        }

        if renames.is_empty() {
            updated_lines.push(line.to_string());
        } else {
            updated_lines.push(renames.apply(line));
        }
    }

    Ok(CanonicalizedConfig {
        text: updated_lines.join("\n"),
        renames,
    })
}
