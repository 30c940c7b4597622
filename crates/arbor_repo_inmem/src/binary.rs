//! I define the inmemory binary payload store.
//!

use arbor_repo::{
    error::RepoError,
    store::{BinaryStore, ByteStream},
};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use futures::StreamExt;
use rdf_model::Iri;

/// Chunk size of streamed reads.
const CHUNK: usize = 8 * 1024;

/// An inmemory binary store.
#[derive(Debug, Default)]
pub struct MemBinaryStore {
    payloads: DashMap<Iri, Bytes>,
}

impl MemBinaryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BinaryStore for MemBinaryStore {
    async fn get(&self, id: &Iri, range: Option<(u64, u64)>) -> Result<ByteStream, RepoError> {
        let payload = self
            .payloads
            .get(id)
            .map(|p| p.clone())
            .ok_or_else(|| RepoError::NotFound(id.clone()))?;

        let sliced = match range {
            None => payload,
            Some((from, to)) => {
                let len = payload.len() as u64;
                if from >= len || to < from {
                    Bytes::new()
                } else {
                    // Inclusive bounds, clipped at the last byte.
                    let end = to.min(len - 1) + 1;
                    payload.slice(from as usize..end as usize)
                }
            }
        };

        let chunks: Vec<Result<Bytes, std::io::Error>> = sliced
            .chunks(CHUNK)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Ok(futures::stream::iter(chunks).boxed())
    }

    async fn size(&self, id: &Iri) -> Result<u64, RepoError> {
        self.payloads
            .get(id)
            .map(|p| p.len() as u64)
            .ok_or_else(|| RepoError::NotFound(id.clone()))
    }

    async fn put(&self, id: &Iri, mut content: ByteStream) -> Result<u64, RepoError> {
        let mut buffer = Vec::new();
        while let Some(chunk) = content.next().await {
            let bytes = chunk.map_err(|e| RepoError::TransientStorage(Box::new(e)))?;
            buffer.extend_from_slice(&bytes);
        }
        let size = buffer.len() as u64;
        self.payloads.insert(id.clone(), Bytes::from(buffer));
        Ok(size)
    }

    async fn purge(&self, id: &Iri) -> Result<(), RepoError> {
        self.payloads.remove(id);
        Ok(())
    }
}
