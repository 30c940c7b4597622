//! I define the inmemory memento store.
//!

use std::collections::{BTreeMap, BTreeSet};

use arbor_repo::{error::RepoError, resource::StoredResource, store::MementoService};
use arbor_space::{Lookup, Resource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rdf_model::Iri;
use tracing::debug;

/// An inmemory memento store: per identifier, a time-indexed
/// map of immutable snapshots.
#[derive(Debug, Default)]
pub struct MemMementoStore {
    snapshots: DashMap<Iri, BTreeMap<DateTime<Utc>, StoredResource>>,
}

impl MemMementoStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MementoService for MemMementoStore {
    async fn put(&self, state: &StoredResource) -> Result<(), RepoError> {
        let mut entry = self
            .snapshots
            .entry(state.identifier().clone())
            .or_default();
        // Mementos are immutable once written.
        if entry.contains_key(&state.modified()) {
            debug!(
                "Memento of {} at {} already held; ignoring",
                state.identifier(),
                state.modified()
            );
            return Ok(());
        }
        entry.insert(state.modified(), state.clone());
        Ok(())
    }

    async fn get(
        &self,
        id: &Iri,
        time: DateTime<Utc>,
    ) -> Result<Lookup<StoredResource>, RepoError> {
        Ok(self
            .snapshots
            .get(id)
            .and_then(|snapshots| {
                snapshots
                    .range(..=time)
                    .next_back()
                    .map(|(_, state)| state.clone())
            })
            .map(Lookup::Present)
            .unwrap_or(Lookup::Missing))
    }

    async fn mementos(&self, id: &Iri) -> Result<BTreeSet<DateTime<Utc>>, RepoError> {
        Ok(self
            .snapshots
            .get(id)
            .map(|snapshots| snapshots.keys().copied().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, id: &Iri, time: DateTime<Utc>) -> Result<bool, RepoError> {
        Ok(self
            .snapshots
            .get_mut(id)
            .is_some_and(|mut snapshots| snapshots.remove(&time).is_some()))
    }
}
