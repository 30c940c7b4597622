//! I define the error taxonomy of the repository services.
//!

use rdf_dynio::{update::UpdateParseError, RdfParseError};
use rdf_model::Iri;

use crate::service::constraint::ConstraintViolation;

/// Alias for boxed error trait objects.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error taxonomy of repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// No resource at the target identifier.
    #[error("No resource at {0}")]
    NotFound(Iri),

    /// The candidate payload failed constraint validation.
    /// Carries the violations.
    #[error("Payload rejected with {} constraint violation(s)", .0.len())]
    ConstraintViolation(Vec<ConstraintViolation>),

    /// A concurrent write or revision mismatch on the target.
    /// The caller may retry.
    #[error("Storage conflict on {0}")]
    StorageConflict(Iri),

    /// An i/o or network hiccup in the persistence layer.
    /// Reads are retried once; writes surface.
    #[error("Transient storage error")]
    TransientStorage(#[source] BoxError),

    /// Malformed rdf input.
    #[error("Rdf parse error")]
    RdfParse(#[from] RdfParseError),

    /// Malformed sparql update input.
    #[error("Sparql update parse error")]
    SparqlParse(#[from] UpdateParseError),

    /// The authorization engine granted insufficient modes.
    #[error("Insufficient access modes for {0}")]
    AuthDenied(Iri),

    /// Unusable configuration, detected at initialization.
    #[error("Fatal configuration error: {0}")]
    FatalConfiguration(String),
}

impl RepoError {
    /// Resolve whether this error is transient and worth a
    /// retry for idempotent operations.
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, RepoError::TransientStorage(_))
    }
}
