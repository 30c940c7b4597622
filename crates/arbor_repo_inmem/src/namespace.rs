//! I define the inmemory namespace prefix registry.
//!

use std::collections::BTreeMap;

use arbor_repo::{error::RepoError, store::NamespaceService};
use arbor_space::vocab;
use async_trait::async_trait;
use dashmap::DashMap;

/// An inmemory namespace registry, seeded with the prefixes the
/// core vocabularies use.
#[derive(Debug)]
pub struct MemNamespaceService {
    mappings: DashMap<String, String>,
}

impl Default for MemNamespaceService {
    fn default() -> Self {
        let mappings = DashMap::new();
        for (prefix, namespace) in [
            ("ldp", vocab::ldp::NS),
            ("acl", vocab::acl::NS),
            ("prov", vocab::prov::NS),
            ("as", vocab::activitystreams::NS),
            ("trellis", vocab::trellis::NS),
            ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
            ("xsd", "http://www.w3.org/2001/XMLSchema#"),
            ("dc", "http://purl.org/dc/terms/"),
            ("foaf", "http://xmlns.com/foaf/0.1/"),
            ("vcard", "http://www.w3.org/2006/vcard/ns#"),
        ] {
            mappings.insert(prefix.to_owned(), namespace.to_owned());
        }
        Self { mappings }
    }
}

impl MemNamespaceService {
    /// Create a registry seeded with the core prefixes.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NamespaceService for MemNamespaceService {
    async fn namespaces(&self) -> Result<BTreeMap<String, String>, RepoError> {
        Ok(self
            .mappings
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect())
    }

    async fn set_prefix(&self, prefix: String, namespace: String) -> Result<bool, RepoError> {
        let changed = self
            .mappings
            .get(&prefix)
            .map_or(true, |existing| *existing != namespace);
        self.mappings.insert(prefix, namespace);
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_and_extendable() {
        let service = MemNamespaceService::new();
        let namespaces = service.namespaces().await.unwrap();
        assert_eq!(
            namespaces.get("ldp").map(String::as_str),
            Some("http://www.w3.org/ns/ldp#")
        );

        assert!(service
            .set_prefix("ex".into(), "http://example.org/ns#".into())
            .await
            .unwrap());
        assert!(!service
            .set_prefix("ex".into(), "http://example.org/ns#".into())
            .await
            .unwrap());
    }
}
