//! I define the concrete resource state types of the
//! repository: the stored head state, the audit-side record,
//! and the joined read view over both.
//!

use std::collections::BTreeSet;

use arbor_space::{
    vocab::trellis, BinaryMetadata, InteractionModel, MembershipSpec, Resource,
    ResourceMetadata, Revision,
};
use chrono::{DateTime, Utc};
use rdf_model::{Dataset, Graph, Iri, Quad};

/// The head state of a resource as persisted by the mutable
/// store: its header attributes plus the full named-graph
/// dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResource {
    identifier: Iri,
    interaction_model: InteractionModel,
    container: Option<Iri>,
    membership: Option<MembershipSpec>,
    binary: Option<BinaryMetadata>,
    modified: DateTime<Utc>,
    revision: Revision,
    dataset: Dataset,
}

impl StoredResource {
    /// Assemble a head state from write-side metadata, a
    /// modification instant, and the dataset. The revision is
    /// derived from the instant and identifier.
    pub fn from_parts(
        metadata: &ResourceMetadata,
        modified: DateTime<Utc>,
        dataset: Dataset,
    ) -> Self {
        let revision = Revision::derive(modified, &metadata.identifier);
        Self {
            identifier: metadata.identifier.clone(),
            interaction_model: metadata.interaction_model,
            container: metadata.container.clone(),
            membership: metadata.membership.clone(),
            binary: metadata.binary.clone(),
            modified,
            revision,
            dataset,
        }
    }

    /// Get the dataset of this state.
    #[inline]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Get a mutable handle to the dataset of this state.
    ///
    /// Edits do not advance `modified`; use
    /// [`StoredResource::advance`] when the edit is a mutation
    /// in its own right.
    #[inline]
    pub fn dataset_mut(&mut self) -> &mut Dataset {
        &mut self.dataset
    }

    /// Get the user managed graph of this state, if present.
    #[inline]
    pub fn user_graph(&self) -> Option<&Graph> {
        self.dataset.graph(Some(&trellis::PREFER_USER_MANAGED))
    }

    /// Advance the modification instant (and thus the revision)
    /// to given instant, keeping `modified` monotonic.
    pub fn advance(&mut self, at: DateTime<Utc>) {
        if at > self.modified {
            self.modified = at;
        } else {
            self.modified = self.modified + chrono::Duration::milliseconds(1);
        }
        self.revision = Revision::derive(self.modified, &self.identifier);
    }
}

impl Resource for StoredResource {
    #[inline]
    fn identifier(&self) -> &Iri {
        &self.identifier
    }

    #[inline]
    fn interaction_model(&self) -> InteractionModel {
        self.interaction_model
    }

    #[inline]
    fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    #[inline]
    fn revision(&self) -> &Revision {
        &self.revision
    }

    #[inline]
    fn container(&self) -> Option<&Iri> {
        self.container.as_ref()
    }

    #[inline]
    fn membership(&self) -> Option<&MembershipSpec> {
        self.membership.as_ref()
    }

    #[inline]
    fn binary_metadata(&self) -> Option<&BinaryMetadata> {
        self.binary.as_ref()
    }

    fn metadata_graph_names(&self) -> BTreeSet<Iri> {
        self.dataset
            .graph_names()
            .filter(|n| **n != *trellis::PREFER_USER_MANAGED)
            .cloned()
            .collect()
    }

    fn quads(&self) -> Box<dyn Iterator<Item = Quad> + '_> {
        Box::new(self.dataset.quads())
    }
}

/// The audit-side record of a resource: the accumulated
/// immutable quads, and the instant of the latest append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmutableRecord {
    /// Identifier of the resource.
    pub identifier: Iri,

    /// Instant of the latest append.
    pub modified: DateTime<Utc>,

    /// The accumulated quads, in stable order.
    pub dataset: Dataset,
}

/// The user visible read view of a resource: the mutable head
/// state joined with the audit record. Quads stream mutable
/// side first, then the audit side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedResource {
    state: StoredResource,
    audit: Option<Dataset>,
}

impl JoinedResource {
    /// Join given head state with given audit quads.
    pub fn new(state: StoredResource, audit: Option<Dataset>) -> Self {
        Self { state, audit }
    }

    /// Compose a view of an audit-only resource, where the
    /// mutable side holds no state.
    pub fn audit_only(record: ImmutableRecord) -> Self {
        let metadata =
            ResourceMetadata::new(record.identifier, InteractionModel::RdfSource);
        Self {
            state: StoredResource::from_parts(&metadata, record.modified, Dataset::new()),
            audit: Some(record.dataset),
        }
    }

    /// Get the mutable head state of this view.
    #[inline]
    pub fn state(&self) -> &StoredResource {
        &self.state
    }

    /// Get the audit quads of this view, if any.
    #[inline]
    pub fn audit(&self) -> Option<&Dataset> {
        self.audit.as_ref()
    }
}

impl Resource for JoinedResource {
    #[inline]
    fn identifier(&self) -> &Iri {
        self.state.identifier()
    }

    #[inline]
    fn interaction_model(&self) -> InteractionModel {
        self.state.interaction_model()
    }

    #[inline]
    fn modified(&self) -> DateTime<Utc> {
        self.state.modified()
    }

    #[inline]
    fn revision(&self) -> &Revision {
        self.state.revision()
    }

    #[inline]
    fn container(&self) -> Option<&Iri> {
        self.state.container()
    }

    #[inline]
    fn membership(&self) -> Option<&MembershipSpec> {
        self.state.membership()
    }

    #[inline]
    fn binary_metadata(&self) -> Option<&BinaryMetadata> {
        self.state.binary_metadata()
    }

    fn metadata_graph_names(&self) -> BTreeSet<Iri> {
        let mut names = self.state.metadata_graph_names();
        if self.audit.is_some() {
            names.insert(trellis::PREFER_AUDIT.clone());
        }
        names
    }

    fn quads(&self) -> Box<dyn Iterator<Item = Quad> + '_> {
        Box::new(
            self.state
                .quads()
                .chain(self.audit.iter().flat_map(|d| d.quads())),
        )
    }
}

#[cfg(test)]
mod tests {
    use arbor_space::vocab::{ldp, rdf};
    use rdf_model::Term;

    use super::*;

    fn container_state() -> StoredResource {
        let id = Iri::new_unchecked("trellis:data/c");
        let mut dataset = Dataset::new();
        dataset.insert(Quad::new(
            Some(trellis::PREFER_SERVER_MANAGED.clone()),
            id.clone(),
            rdf::TYPE.clone(),
            ldp::BASIC_CONTAINER.clone(),
        ));
        StoredResource::from_parts(
            &ResourceMetadata::new(id, InteractionModel::BasicContainer),
            Utc::now(),
            dataset,
        )
    }

    #[test]
    fn advance_is_monotonic() {
        let mut state = container_state();
        let before = state.modified();
        let old_revision = state.revision().clone();

        // An instant in the past still advances the state.
        state.advance(before - chrono::Duration::seconds(5));
        assert!(state.modified() > before);
        assert_ne!(state.revision(), &old_revision);
    }

    #[test]
    fn joined_view_streams_mutable_then_audit() {
        let state = container_state();
        let mut audit = Dataset::new();
        audit.insert(Quad::new(
            Some(trellis::PREFER_AUDIT.clone()),
            Iri::new_unchecked("trellis:data/c"),
            arbor_space::vocab::prov::WAS_GENERATED_BY.clone(),
            Term::BlankNode(rdf_model::BlankNode::new("a0")),
        ));

        let joined = JoinedResource::new(state, Some(audit));
        let quads: Vec<Quad> = joined.quads().collect();
        assert_eq!(quads.len(), 2);
        assert_eq!(
            quads[0].graph_name.as_ref(),
            Some(&*trellis::PREFER_SERVER_MANAGED)
        );
        assert_eq!(quads[1].graph_name.as_ref(), Some(&*trellis::PREFER_AUDIT));
        assert!(joined
            .metadata_graph_names()
            .contains(&*trellis::PREFER_AUDIT));
    }
}
