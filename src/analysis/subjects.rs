//! Subject identifier lookup.

use std::collections::BTreeMap;
use tracing::warn;

/// Name used for identifiers missing from the table.
pub const UNKNOWN_SUBJECT: &str = "Unknown";

/// Immutable mapping from platform subject identifiers to display names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectTable {
    names: BTreeMap<String, String>,
}

impl SubjectTable {
    pub fn new(names: BTreeMap<String, String>) -> Self {
        Self { names }
    }

    /// Resolve an identifier, falling back to [`UNKNOWN_SUBJECT`].
    pub fn resolve(&self, id: &str) -> &str {
        match self.names.get(id) {
            Some(name) => name,
            None => {
                warn!("Unrecognized subject identifier {}; reporting it as {}", id, UNKNOWN_SUBJECT);
                UNKNOWN_SUBJECT
            }
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.names.len()
    }
}

impl Default for SubjectTable {
    fn default() -> Self {
        Self::new(default_subject_names())
    }
}

/// The identifiers used by the exam platform for its three subjects.
pub fn default_subject_names() -> BTreeMap<String, String> {
    [
        ("607018ee404ae53194e73d92", "Physics"),
        ("607018ee404ae53194e73d90", "Chemistry"),
        ("607018ee404ae53194e73d91", "Mathematics"),
    ]
    .into_iter()
    .map(|(id, name)| (id.to_string(), name.to_string()))
    .collect()
}
