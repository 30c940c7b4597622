//! This crate provides abstractions for modeling arbor linked
//! data platform spaces: the iri partitioning scheme, shared
//! vocabularies, interaction models, resource views, sessions,
//! and binary metadata.
//!

#![warn(missing_docs)]
#![deny(unused_qualifications)]

pub mod binary;
pub mod interaction_model;
pub mod iri;
pub mod resource;
pub mod revision;
pub mod session;
pub mod vocab;

pub use binary::BinaryMetadata;
pub use interaction_model::InteractionModel;
pub use resource::{Lookup, MemberRelation, MembershipSpec, Resource, ResourceMetadata};
pub use revision::Revision;
pub use session::Session;
