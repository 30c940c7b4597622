//! This crate provides a concrete, owned model for rdf terms,
//! triples, quads, graphs, and datasets.
//!
//! Terms are backed by cheaply clonable `Arc<str>` buffers, and
//! graphs/datasets keep their statements in deterministic order.
//!

#![warn(missing_docs)]
#![deny(unused_qualifications)]

pub mod dataset;
pub mod graph;
pub mod quad;
pub mod term;
pub mod triple;

pub use dataset::Dataset;
pub use graph::Graph;
pub use quad::Quad;
pub use term::{BlankNode, InvalidIriError, Iri, Literal, Term};
pub use triple::Triple;
