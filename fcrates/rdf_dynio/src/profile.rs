//! I define the loader abstraction for json-ld profile
//! documents, and a caching wrapper over it.
//!

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

/// An error in loading a profile document.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Error in loading profile document {url}: {message}")]
pub struct ProfileLoadError {
    /// Url of the profile document.
    pub url: String,
    /// Underlying message.
    pub message: String,
}

/// A loader of json-ld profile documents.
#[async_trait]
pub trait ProfileLoader: Send + Sync + 'static {
    /// Load the pre-parsed profile document at given url.
    async fn load(&self, url: &str) -> Result<Arc<Value>, ProfileLoadError>;
}

/// A loader over a static set of profile documents, for
/// embedders that configure their profiles out-of-band.
#[derive(Debug, Default)]
pub struct StaticProfileLoader {
    documents: BTreeMap<String, Arc<Value>>,
}

impl StaticProfileLoader {
    /// Create a loader over given documents.
    pub fn new(documents: BTreeMap<String, Arc<Value>>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl ProfileLoader for StaticProfileLoader {
    async fn load(&self, url: &str) -> Result<Arc<Value>, ProfileLoadError> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| ProfileLoadError {
                url: url.to_owned(),
                message: "unknown profile".into(),
            })
    }
}

/// A caching wrapper over a [`ProfileLoader`].
///
/// Lookup is wait-free on hit; a miss fills the cache with
/// at-most-one concurrent build per url. The default policy of
/// the crate is pass-through: this wrapper is opt-in.
pub struct CachingProfileLoader<L> {
    inner: Arc<L>,
    cache: DashMap<String, Arc<OnceCell<Arc<Value>>>>,
}

impl<L: std::fmt::Debug> std::fmt::Debug for CachingProfileLoader<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingProfileLoader")
            .field("inner", &self.inner)
            .field("cached_count", &self.cache.len())
            .finish()
    }
}

impl<L: ProfileLoader> CachingProfileLoader<L> {
    /// Create a caching wrapper over given loader.
    pub fn new(inner: L) -> Self {
        Self {
            inner: Arc::new(inner),
            cache: DashMap::new(),
        }
    }

    /// Get the count of cached profiles.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl<L: ProfileLoader> ProfileLoader for CachingProfileLoader<L> {
    async fn load(&self, url: &str) -> Result<Arc<Value>, ProfileLoadError> {
        let cell = self
            .cache
            .entry(url.to_owned())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let inner = self.inner.clone();
        cell.get_or_try_init(|| async {
            debug!("Filling profile cache for {}", url);
            inner.load(url).await
        })
        .await
        .cloned()
    }
}
