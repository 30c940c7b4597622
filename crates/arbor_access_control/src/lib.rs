//! This crate provides the web access control authorization
//! engine of arbor: resolution of the effective acl over the
//! container ancestry, and evaluation of its authorizations
//! against the session agent.
//!

#![warn(missing_docs)]
#![deny(unused_qualifications)]

pub mod engine;
pub mod mode;

pub use engine::{WebAcConfig, WebAcEngine};
pub use mode::AccessMode;
