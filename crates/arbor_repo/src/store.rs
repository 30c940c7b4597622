//! I define the persistence contracts the resource lifecycle
//! engine consumes. Implementations live in backend crates.
//!

use std::collections::{BTreeMap, BTreeSet};

use arbor_space::{Lookup, Session};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use rdf_model::{Dataset, Iri};

use crate::{
    error::{BoxError, RepoError},
    resource::{ImmutableRecord, StoredResource},
    service::event::EventEnvelope,
};

/// A stream of payload bytes. Consumers pull; producers must
/// honor backpressure and never buffer the full payload.
pub type ByteStream = BoxStream<'static, Result<Bytes, std::io::Error>>;

/// The mutable head-state store. Holds the current state of
/// every resource, and tombstones of deleted ones.
///
/// Operations on the same identifier are serialized by the
/// caller holding a per-identifier write token; the store only
/// needs each single call to be atomic with respect to reads.
#[async_trait]
pub trait MutableDataService: Send + Sync + 'static {
    /// Get the head state at given identifier.
    async fn get(&self, id: &Iri) -> Result<Lookup<StoredResource>, RepoError>;

    /// Replace the head state at the resource's identifier,
    /// atomically with respect to concurrent reads of the same
    /// identifier. Re-creates over a tombstone.
    async fn replace(&self, state: StoredResource) -> Result<(), RepoError>;

    /// Remove the head state at given identifier, leaving a
    /// tombstone.
    async fn delete(&self, id: &Iri) -> Result<(), RepoError>;

    /// Advance the modification instant of given identifier
    /// without changing content.
    async fn touch(&self, id: &Iri, at: DateTime<Utc>) -> Result<(), RepoError>;

    /// Enumerate the identifiers of all live resources, for
    /// export.
    async fn scan(&self) -> Result<Vec<Iri>, RepoError>;
}

/// The append-only immutable store holding audit trails.
///
/// Writes cannot be rolled back; reads return the accumulated
/// quads in a stable order. Deleting a resource does not purge
/// its trail.
#[async_trait]
pub trait ImmutableDataService: Send + Sync + 'static {
    /// Get the accumulated record at given identifier.
    async fn get(&self, id: &Iri) -> Result<Option<ImmutableRecord>, RepoError>;

    /// Append given quads under given identifier.
    async fn add(&self, id: &Iri, session: &Session, dataset: Dataset) -> Result<(), RepoError>;
}

/// The time-indexed memento store. Snapshots are immutable once
/// written.
#[async_trait]
pub trait MementoService: Send + Sync + 'static {
    /// Snapshot given state under its modification instant.
    ///
    /// The store may reject a snapshot it cannot durably hold;
    /// the originating mutation still succeeds.
    async fn put(&self, state: &StoredResource) -> Result<(), RepoError>;

    /// Get the memento whose timestamp is the latest at or
    /// before given instant; `Missing` when none is.
    async fn get(&self, id: &Iri, time: DateTime<Utc>)
        -> Result<Lookup<StoredResource>, RepoError>;

    /// List the versioned instants of given identifier, sorted.
    async fn mementos(&self, id: &Iri) -> Result<BTreeSet<DateTime<Utc>>, RepoError>;

    /// Drop the memento at exactly given instant. Returns
    /// whether one was present. Optional; the default refuses
    /// nothing and removes nothing.
    async fn delete(&self, _id: &Iri, _time: DateTime<Utc>) -> Result<bool, RepoError> {
        Ok(false)
    }
}

/// The opaque payload store backing non-rdf sources.
#[async_trait]
pub trait BinaryStore: Send + Sync + 'static {
    /// Stream the payload at given identifier. `range` bounds
    /// are inclusive; a `to` past the last byte is clipped; an
    /// empty range yields zero bytes.
    async fn get(&self, id: &Iri, range: Option<(u64, u64)>) -> Result<ByteStream, RepoError>;

    /// Get the size in bytes of the payload at given
    /// identifier.
    async fn size(&self, id: &Iri) -> Result<u64, RepoError>;

    /// Store given payload under given identifier, replacing
    /// any previous content. Returns the stored size.
    async fn put(&self, id: &Iri, content: ByteStream) -> Result<u64, RepoError>;

    /// Remove the payload at given identifier. May complete
    /// asynchronously with respect to the mutable store's
    /// deletion of the description.
    async fn purge(&self, id: &Iri) -> Result<(), RepoError>;
}

/// The namespace prefix registry.
#[async_trait]
pub trait NamespaceService: Send + Sync + 'static {
    /// Get the registered prefix mappings.
    async fn namespaces(&self) -> Result<BTreeMap<String, String>, RepoError>;

    /// Register a prefix mapping. Returns whether the registry
    /// changed.
    async fn set_prefix(&self, prefix: String, namespace: String) -> Result<bool, RepoError>;
}

/// The downstream message bus consuming event envelopes.
///
/// Publication is best effort: failures are logged by the event
/// service and never redelivered.
#[async_trait]
pub trait EventSink: Send + Sync + 'static {
    /// Publish given envelope.
    async fn publish(&self, envelope: &EventEnvelope) -> Result<(), BoxError>;
}
