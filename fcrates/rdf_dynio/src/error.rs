//! I define error types for rdf parsing and serialization.
//!

use crate::syntax::RdfSyntax;

/// An error in parsing an rdf document.
#[derive(Debug, thiserror::Error)]
pub enum RdfParseError {
    /// Document is malformed for the chosen syntax. Carries the
    /// underlying parser message, with position information when
    /// the parser provides it.
    #[error("Malformed {syntax} document: {message}")]
    Malformed {
        /// Syntax the document was parsed as.
        syntax: RdfSyntax,
        /// Underlying parser message.
        message: String,
    },

    /// Base iri supplied for relative resolution is invalid.
    #[error("Invalid base iri: {0}")]
    InvalidBaseIri(String),

    /// Document uses a construct the parser does not support.
    #[error("Unsupported construct in {syntax} document: {construct}")]
    UnsupportedConstruct {
        /// Syntax the document was parsed as.
        syntax: RdfSyntax,
        /// Offending construct.
        construct: String,
    },

    /// Io error in reading the document.
    #[error("Io error in reading document")]
    Io(#[from] std::io::Error),
}

/// An error in serializing rdf statements.
#[derive(Debug, thiserror::Error)]
pub enum RdfWriteError {
    /// Io error in writing the document.
    #[error("Io error in writing document")]
    Io(#[from] std::io::Error),

    /// Statements are not expressible in the chosen syntax.
    #[error("Statements not expressible in {syntax}: {message}")]
    Inexpressible {
        /// Chosen syntax.
        syntax: RdfSyntax,
        /// Reason.
        message: String,
    },
}
