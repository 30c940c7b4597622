//! I define the binary service: streaming reads over stored
//! payloads, digest computation while writing, and post-hoc
//! digest verification.
//!

use std::sync::{Arc, Mutex};

use arbor_space::BinaryMetadata;
use digest::DynDigest;
use futures::StreamExt;
use md5::Md5;
use rdf_model::Iri;
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use uuid::Uuid;

use crate::{
    error::RepoError,
    store::{BinaryStore, ByteStream},
};

/// A message digest algorithm supported for payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// MD5.
    Md5,

    /// SHA-1.
    Sha1,

    /// SHA-256.
    Sha256,

    /// SHA-512.
    Sha512,
}

impl DigestAlgorithm {
    /// The canonical names of all supported algorithms.
    pub const NAMES: [&'static str; 4] = ["MD5", "SHA-1", "SHA-256", "SHA-512"];

    /// Resolve an algorithm from its name. `SHA` is accepted as
    /// an alias of `SHA-1`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "MD5" => Some(DigestAlgorithm::Md5),
            "SHA" | "SHA-1" | "SHA1" => Some(DigestAlgorithm::Sha1),
            "SHA-256" | "SHA256" => Some(DigestAlgorithm::Sha256),
            "SHA-512" | "SHA512" => Some(DigestAlgorithm::Sha512),
            _ => None,
        }
    }

    /// Get the canonical name of this algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Sha1 => "SHA-1",
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Instantiate a hasher for this algorithm.
    fn hasher(&self) -> Box<dyn DynDigest + Send> {
        match self {
            DigestAlgorithm::Md5 => Box::new(Md5::default()),
            DigestAlgorithm::Sha1 => Box::new(Sha1::default()),
            DigestAlgorithm::Sha256 => Box::new(Sha256::default()),
            DigestAlgorithm::Sha512 => Box::new(Sha512::default()),
        }
    }
}

/// The outcome of a payload write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryWriteOutcome {
    /// Stored size in bytes.
    pub size: u64,

    /// The digest computed while writing, when one was
    /// requested.
    pub digest: Option<Vec<u8>>,
}

/// A streaming handle over one stored payload.
#[derive(Clone)]
pub struct Binary {
    identifier: Iri,
    store: Arc<dyn BinaryStore>,
}

impl std::fmt::Debug for Binary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binary")
            .field("identifier", &self.identifier)
            .finish()
    }
}

impl Binary {
    /// Get the payload identifier.
    #[inline]
    pub fn identifier(&self) -> &Iri {
        &self.identifier
    }

    /// Get the payload size in bytes.
    pub async fn size(&self) -> Result<u64, RepoError> {
        self.store.size(&self.identifier).await
    }

    /// Stream the full payload.
    pub async fn content(&self) -> Result<ByteStream, RepoError> {
        self.store.get(&self.identifier, None).await
    }

    /// Stream the inclusive byte range `from..=to`. A `to` past
    /// the last byte is clipped; an empty range yields zero
    /// bytes.
    pub async fn content_range(&self, from: u64, to: u64) -> Result<ByteStream, RepoError> {
        self.store.get(&self.identifier, Some((from, to))).await
    }
}

/// The binary service over a payload store.
#[derive(Clone)]
pub struct BinaryService {
    store: Arc<dyn BinaryStore>,
}

impl std::fmt::Debug for BinaryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryService").finish()
    }
}

impl BinaryService {
    /// Create a binary service over given store.
    pub fn new(store: Arc<dyn BinaryStore>) -> Self {
        Self { store }
    }

    /// Get a streaming handle over the payload at given
    /// identifier.
    pub async fn get(&self, id: &Iri) -> Result<Binary, RepoError> {
        // Surface absence eagerly rather than on first read.
        self.store.size(id).await?;
        Ok(Binary {
            identifier: id.clone(),
            store: self.store.clone(),
        })
    }

    /// Store given payload under the metadata's identifier,
    /// computing a digest while the stream passes through when
    /// one is requested.
    pub async fn set_content(
        &self,
        metadata: &BinaryMetadata,
        content: ByteStream,
        algorithm: Option<DigestAlgorithm>,
    ) -> Result<BinaryWriteOutcome, RepoError> {
        let hasher = algorithm.map(|a| Arc::new(Mutex::new(Some(a.hasher()))));

        let content = match &hasher {
            Some(state) => {
                let state = state.clone();
                content
                    .map(move |chunk| {
                        if let Ok(bytes) = &chunk {
                            let mut guard =
                                state.lock().expect("Digest state lock poisoned.");
                            if let Some(digest) = guard.as_mut() {
                                digest.update(bytes);
                            }
                        }
                        chunk
                    })
                    .boxed()
            }
            None => content,
        };

        let size = self.store.put(&metadata.identifier, content).await?;
        let digest = hasher
            .and_then(|state| state.lock().expect("Digest state lock poisoned.").take())
            .map(|digest| digest.finalize().into_vec());

        Ok(BinaryWriteOutcome { size, digest })
    }

    /// Remove the payload at given identifier.
    pub async fn purge_content(&self, id: &Iri) -> Result<(), RepoError> {
        self.store.purge(id).await
    }

    /// Compute the digest of the payload at given identifier by
    /// streaming it through given algorithm.
    pub async fn calculate_digest(
        &self,
        id: &Iri,
        algorithm: DigestAlgorithm,
    ) -> Result<Vec<u8>, RepoError> {
        let mut content = self.store.get(id, None).await?;
        let mut hasher = algorithm.hasher();
        while let Some(chunk) = content.next().await {
            let bytes = chunk.map_err(|e| RepoError::TransientStorage(Box::new(e)))?;
            hasher.update(&bytes);
        }
        Ok(hasher.finalize().into_vec())
    }

    /// The names of the supported digest algorithms.
    pub fn supported_algorithms(&self) -> &'static [&'static str] {
        &DigestAlgorithm::NAMES
    }

    /// Mint a new store-local payload reference.
    pub fn generate_identifier(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
