//! I define the inmemory mutable head-state store.
//!

use arbor_repo::{error::RepoError, resource::StoredResource, store::MutableDataService};
use arbor_space::Lookup;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rdf_model::Iri;

/// One slot of the store: a live state, or the tombstone of a
/// deleted resource.
#[derive(Debug, Clone)]
enum Slot {
    Live(StoredResource),
    Tombstone,
}

/// An inmemory mutable store. Deleted resources leave
/// tombstones, which are retained rather than garbage
/// collected; a replace over a tombstone re-creates.
#[derive(Debug, Default)]
pub struct MemMutableStore {
    slots: DashMap<Iri, Slot>,
}

impl MemMutableStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MutableDataService for MemMutableStore {
    async fn get(&self, id: &Iri) -> Result<Lookup<StoredResource>, RepoError> {
        Ok(match self.slots.get(id).map(|s| s.clone()) {
            Some(Slot::Live(state)) => Lookup::Present(state),
            Some(Slot::Tombstone) => Lookup::Deleted,
            None => Lookup::Missing,
        })
    }

    async fn replace(&self, state: StoredResource) -> Result<(), RepoError> {
        use arbor_space::Resource;
        self.slots
            .insert(state.identifier().clone(), Slot::Live(state));
        Ok(())
    }

    async fn delete(&self, id: &Iri) -> Result<(), RepoError> {
        self.slots.insert(id.clone(), Slot::Tombstone);
        Ok(())
    }

    async fn touch(&self, id: &Iri, at: DateTime<Utc>) -> Result<(), RepoError> {
        let mut slot = self
            .slots
            .get_mut(id)
            .ok_or_else(|| RepoError::NotFound(id.clone()))?;
        match slot.value_mut() {
            Slot::Live(state) => {
                state.advance(at);
                Ok(())
            }
            Slot::Tombstone => Err(RepoError::NotFound(id.clone())),
        }
    }

    async fn scan(&self) -> Result<Vec<Iri>, RepoError> {
        let mut live: Vec<Iri> = self
            .slots
            .iter()
            .filter(|entry| matches!(entry.value(), Slot::Live(_)))
            .map(|entry| entry.key().clone())
            .collect();
        live.sort();
        Ok(live)
    }
}

#[cfg(test)]
mod tests {
    use arbor_space::{InteractionModel, Resource, ResourceMetadata};
    use rdf_model::Dataset;

    use super::*;

    fn state(id: &str) -> StoredResource {
        StoredResource::from_parts(
            &ResourceMetadata::new(Iri::new_unchecked(id), InteractionModel::RdfSource),
            Utc::now(),
            Dataset::new(),
        )
    }

    #[tokio::test]
    async fn lifecycle_transitions() {
        let store = MemMutableStore::new();
        let id = Iri::new_unchecked("trellis:data/x");

        assert!(store.get(&id).await.unwrap().is_missing());

        store.replace(state("trellis:data/x")).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_present());

        store.delete(&id).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_deleted());

        // A replace over the tombstone re-creates.
        store.replace(state("trellis:data/x")).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_present());
    }

    #[tokio::test]
    async fn touch_advances_revision_only() {
        let store = MemMutableStore::new();
        let id = Iri::new_unchecked("trellis:data/x");
        store.replace(state("trellis:data/x")).await.unwrap();

        let before = store.get(&id).await.unwrap().present().unwrap();
        store.touch(&id, Utc::now()).await.unwrap();
        let after = store.get(&id).await.unwrap().present().unwrap();

        assert!(after.modified() >= before.modified());
        assert_ne!(after.revision(), before.revision());
        assert_eq!(after.dataset(), before.dataset());
    }

    #[tokio::test]
    async fn scan_lists_live_resources_only() {
        let store = MemMutableStore::new();
        store.replace(state("trellis:data/a")).await.unwrap();
        store.replace(state("trellis:data/b")).await.unwrap();
        store.delete(&Iri::new_unchecked("trellis:data/b")).await.unwrap();

        assert_eq!(
            store.scan().await.unwrap(),
            vec![Iri::new_unchecked("trellis:data/a")]
        );
    }
}
