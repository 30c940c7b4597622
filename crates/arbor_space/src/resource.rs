//! I define the resource view abstractions of arbor spaces.
//!

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rdf_model::{Iri, Quad};

use crate::{
    binary::BinaryMetadata, interaction_model::InteractionModel, revision::Revision,
    vocab::trellis,
};

/// The membership configuration of a direct or indirect
/// container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipSpec {
    /// The resource about which membership statements are
    /// maintained.
    pub membership_resource: Iri,

    /// The membership relation, in either direction.
    pub relation: MemberRelation,

    /// The inserted-content relation of an indirect container.
    /// `None` implies `ldp:MemberSubject` (direct semantics).
    pub inserted_content_relation: Option<Iri>,
}

/// The direction and predicate of a membership relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRelation {
    /// `ldp:hasMemberRelation`: statements point from the
    /// membership resource to the member.
    HasMember(Iri),

    /// `ldp:isMemberOfRelation`: statements point from the
    /// member to the membership resource.
    IsMemberOf(Iri),
}

/// The write-side header of a resource: what a caller supplies
/// to create, replace, or delete it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMetadata {
    /// Internal identifier of the resource.
    pub identifier: Iri,

    /// Interaction model. Immutable after create.
    pub interaction_model: InteractionModel,

    /// Internal identifier of the parent container, if any.
    pub container: Option<Iri>,

    /// Membership configuration of direct/indirect containers.
    pub membership: Option<MembershipSpec>,

    /// Binary payload metadata of non-rdf sources.
    pub binary: Option<BinaryMetadata>,

    /// Expected revision of the current state, for optimistic
    /// concurrency. `None` skips the check.
    pub revision: Option<Revision>,
}

impl ResourceMetadata {
    /// Create metadata for given identifier and interaction
    /// model.
    pub fn new(identifier: Iri, interaction_model: InteractionModel) -> Self {
        Self {
            identifier,
            interaction_model,
            container: None,
            membership: None,
            binary: None,
            revision: None,
        }
    }

    /// Set the parent container.
    pub fn with_container(mut self, container: Iri) -> Self {
        self.container = Some(container);
        self
    }

    /// Set the membership configuration.
    pub fn with_membership(mut self, membership: MembershipSpec) -> Self {
        self.membership = Some(membership);
        self
    }

    /// Set the binary payload metadata.
    pub fn with_binary(mut self, binary: BinaryMetadata) -> Self {
        self.binary = Some(binary);
        self
    }

    /// Set the expected revision.
    pub fn with_revision(mut self, revision: Revision) -> Self {
        self.revision = Some(revision);
        self
    }
}

/// A read view over a resource state.
pub trait Resource {
    /// Get the internal identifier.
    fn identifier(&self) -> &Iri;

    /// Get the interaction model.
    fn interaction_model(&self) -> InteractionModel;

    /// Get the last modification instant.
    fn modified(&self) -> DateTime<Utc>;

    /// Get the revision of this state.
    fn revision(&self) -> &Revision;

    /// Get the internal identifier of the parent container, if
    /// any.
    fn container(&self) -> Option<&Iri>;

    /// Get the membership configuration, if this resource is a
    /// direct or indirect container.
    fn membership(&self) -> Option<&MembershipSpec> {
        None
    }

    /// Get the binary payload metadata, if this resource is a
    /// non-rdf source.
    fn binary_metadata(&self) -> Option<&BinaryMetadata> {
        None
    }

    /// Get the names of the metadata graphs present on this
    /// resource.
    fn metadata_graph_names(&self) -> BTreeSet<Iri> {
        BTreeSet::new()
    }

    /// Stream the full named-graph representation of this
    /// resource.
    fn quads(&self) -> Box<dyn Iterator<Item = Quad> + '_>;

    /// Resolve whether this resource carries its own access
    /// control graph.
    fn has_acl(&self) -> bool {
        self.metadata_graph_names()
            .contains(&*trellis::PREFER_ACCESS_CONTROL)
    }
}

/// The result of looking up a resource: present, never existed,
/// or deleted. The non-present variants never produce quads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<R> {
    /// The resource exists with given state.
    Present(R),

    /// No resource has ever existed at the identifier.
    Missing,

    /// A resource existed at the identifier and was deleted.
    Deleted,
}

impl<R> Lookup<R> {
    /// Resolve whether the resource is present.
    #[inline]
    pub fn is_present(&self) -> bool {
        matches!(self, Lookup::Present(_))
    }

    /// Resolve whether the resource never existed.
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Lookup::Missing)
    }

    /// Resolve whether the resource was deleted.
    #[inline]
    pub fn is_deleted(&self) -> bool {
        matches!(self, Lookup::Deleted)
    }

    /// Get the present resource, discarding the sentinel
    /// variants.
    #[inline]
    pub fn present(self) -> Option<R> {
        match self {
            Lookup::Present(r) => Some(r),
            _ => None,
        }
    }

    /// Get a reference view of the lookup.
    #[inline]
    pub fn as_ref(&self) -> Lookup<&R> {
        match self {
            Lookup::Present(r) => Lookup::Present(r),
            Lookup::Missing => Lookup::Missing,
            Lookup::Deleted => Lookup::Deleted,
        }
    }

    /// Map the present variant through given function.
    #[inline]
    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> Lookup<U> {
        match self {
            Lookup::Present(r) => Lookup::Present(f(r)),
            Lookup::Missing => Lookup::Missing,
            Lookup::Deleted => Lookup::Deleted,
        }
    }
}
