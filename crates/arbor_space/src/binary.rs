//! I define metadata of binary (non-rdf source) payloads.
//!

use std::collections::BTreeMap;

use rdf_model::Iri;

/// Immutable metadata of a stored binary payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMetadata {
    /// Internal identifier of the payload in the binary store.
    pub identifier: Iri,

    /// Mime type of the payload, if declared.
    pub mime_type: Option<String>,

    /// Size of the payload in bytes, if known.
    pub size: Option<u64>,

    /// Backend specific storage hints.
    pub hints: BTreeMap<String, Vec<String>>,
}

impl BinaryMetadata {
    /// Create metadata for the payload at given identifier.
    pub fn new(identifier: Iri) -> Self {
        Self {
            identifier,
            mime_type: None,
            size: None,
            hints: BTreeMap::new(),
        }
    }

    /// Set the mime type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Set the size in bytes.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Append a storage hint.
    pub fn with_hint(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.hints.entry(key.into()).or_default().push(value.into());
        self
    }
}
