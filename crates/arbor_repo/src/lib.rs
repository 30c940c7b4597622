//! This crate provides the resource lifecycle engine of arbor:
//! a resource service composing a mutable head-state store with
//! an append-only audit store, container membership semantics,
//! memento versioning, streaming binaries with digest
//! verification, and activitystreams eventing.
//!

#![warn(missing_docs)]
#![deny(unused_qualifications)]

pub mod error;
pub mod resource;
pub mod service;
pub mod store;

pub use error::{BoxError, RepoError};
pub use resource::{JoinedResource, StoredResource};
pub use service::resource::{ResourceService, ResourceServiceConfig, ServiceBundle};
