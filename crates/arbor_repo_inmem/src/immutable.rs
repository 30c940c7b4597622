//! I define the inmemory append-only audit store.
//!

use arbor_repo::{error::RepoError, resource::ImmutableRecord, store::ImmutableDataService};
use arbor_space::Session;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use rdf_model::{Dataset, Iri};

/// An inmemory append-only store. Appends accumulate; nothing
/// is ever removed, and the accumulated quads read back in a
/// stable order. Deleting a resource elsewhere does not purge
/// its trail here.
#[derive(Debug, Default)]
pub struct MemImmutableStore {
    records: DashMap<Iri, ImmutableRecord>,
}

impl MemImmutableStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImmutableDataService for MemImmutableStore {
    async fn get(&self, id: &Iri) -> Result<Option<ImmutableRecord>, RepoError> {
        Ok(self.records.get(id).map(|r| r.clone()))
    }

    async fn add(&self, id: &Iri, session: &Session, dataset: Dataset) -> Result<(), RepoError> {
        let mut entry = self
            .records
            .entry(id.clone())
            .or_insert_with(|| ImmutableRecord {
                identifier: id.clone(),
                modified: session.created(),
                dataset: Dataset::new(),
            });
        entry.dataset.merge(dataset);
        entry.modified = Utc::now();
        Ok(())
    }
}
