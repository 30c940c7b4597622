//! This crate provides rdf parsers and serializers that can be
//! instantiated against any of the supported concrete syntaxes
//! dynamically at run time, reading into and writing from the
//! owned [`rdf_model`] statement model.
//!
//! It also provides an engine for the sparql-update subset used
//! for patching resource graphs, and a caching loader for
//! json-ld profile documents.
//!

#![warn(missing_docs)]
#![deny(unused_qualifications)]

pub mod error;
pub mod jsonld;
pub mod parser;
pub mod profile;
pub mod serializer;
pub mod syntax;
pub mod update;

pub use error::{RdfParseError, RdfWriteError};
pub use syntax::RdfSyntax;
