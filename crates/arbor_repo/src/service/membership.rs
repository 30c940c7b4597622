//! I define the container membership engine: the server side
//! statements a mutation of a contained resource fans out into
//! its parent container, the membership resource, or the child
//! itself.
//!

use std::collections::BTreeSet;

use arbor_space::{vocab::ldp, InteractionModel, MemberRelation, Resource};
use rdf_model::{Graph, Iri, Term, Triple};

use crate::resource::StoredResource;

/// One server side statement edit: a triple to assert into (or
/// retract from) a named graph of a target resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipEdit {
    /// Identifier of the resource whose dataset is edited.
    pub target: Iri,

    /// Name of the edited graph.
    pub graph: Iri,

    /// The asserted or retracted triple.
    pub triple: Triple,
}

/// The full fan-out of one child mutation: the edits, and the
/// resources whose `modified` must advance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipUpdate {
    /// The statement edits.
    pub edits: Vec<MembershipEdit>,

    /// Identifiers to touch, beyond those edited.
    pub touch: BTreeSet<Iri>,
}

impl MembershipUpdate {
    /// Resolve whether this update is a no-op.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty() && self.touch.is_empty()
    }
}

/// Compute the containment edit of a child under given parent:
/// `⟨parent, ldp:contains, child⟩` in the parent's containment
/// graph. Applies to every container model.
pub fn containment_edit(parent: &StoredResource, child_id: &Iri) -> Option<MembershipEdit> {
    if !parent.interaction_model().is_container() {
        return None;
    }
    Some(MembershipEdit {
        target: parent.identifier().clone(),
        graph: ldp::PREFER_CONTAINMENT.clone(),
        triple: Triple::new(
            parent.identifier().clone(),
            ldp::CONTAINS.clone(),
            child_id.clone(),
        ),
    })
}

/// Compute the membership edits a child derives under given
/// parent: direct containers relate the configured membership
/// resource and the child; indirect containers relate it with
/// the object of the child's inserted-content relation
/// statement. A missing inserted-content statement is a no-op.
pub fn membership_edits(
    parent: &StoredResource,
    child_id: &Iri,
    child_user_graph: &Graph,
) -> MembershipUpdate {
    let mut update = MembershipUpdate::default();

    let Some(spec) = parent.membership() else {
        return update;
    };

    // The member referent: the child itself for direct
    // containers, the inserted-content object for indirect.
    let member: Term = match parent.interaction_model() {
        InteractionModel::DirectContainer => Term::Iri(child_id.clone()),
        InteractionModel::IndirectContainer => {
            let icr = spec
                .inserted_content_relation
                .clone()
                .unwrap_or_else(|| ldp::MEMBER_SUBJECT.clone());
            if icr == *ldp::MEMBER_SUBJECT {
                Term::Iri(child_id.clone())
            } else {
                match child_user_graph
                    .first_object(&Term::Iri(child_id.clone()), &icr)
                {
                    Some(object) => object.clone(),
                    // No derivable referent: emit nothing.
                    None => return update,
                }
            }
        }
        _ => return update,
    };

    let membership_resource = &spec.membership_resource;
    match &spec.relation {
        MemberRelation::HasMember(relation) => {
            // ⟨M, P, member⟩ in M's server managed graph. M
            // observes the change even when the statement is
            // already present.
            update.edits.push(MembershipEdit {
                target: membership_resource.clone(),
                graph: arbor_space::vocab::trellis::PREFER_SERVER_MANAGED.clone(),
                triple: Triple::new(
                    membership_resource.clone(),
                    relation.clone(),
                    member,
                ),
            });
            update.touch.insert(membership_resource.clone());
        }
        MemberRelation::IsMemberOf(relation) => {
            // ⟨member, P, M⟩ in the child's server managed
            // graph; only subject-capable referents qualify.
            if !member.is_literal() {
                update.edits.push(MembershipEdit {
                    target: child_id.clone(),
                    graph: arbor_space::vocab::trellis::PREFER_SERVER_MANAGED.clone(),
                    triple: Triple::new(
                        member,
                        relation.clone(),
                        membership_resource.clone(),
                    ),
                });
            }
            // The membership resource still observes the change.
            update.touch.insert(membership_resource.clone());
        }
    }

    update
}

#[cfg(test)]
mod tests {
    use arbor_space::{vocab::trellis, MembershipSpec, ResourceMetadata};
    use chrono::Utc;
    use rdf_model::{Dataset, Literal};

    use super::*;

    fn parent(model: InteractionModel, spec: Option<MembershipSpec>) -> StoredResource {
        let mut metadata =
            ResourceMetadata::new(Iri::new_unchecked("trellis:data/c"), model);
        if let Some(spec) = spec {
            metadata = metadata.with_membership(spec);
        }
        StoredResource::from_parts(&metadata, Utc::now(), Dataset::new())
    }

    fn child_id() -> Iri {
        Iri::new_unchecked("trellis:data/c/r")
    }

    #[test]
    fn basic_container_yields_containment_only() {
        let c = parent(InteractionModel::BasicContainer, None);
        let edit = containment_edit(&c, &child_id()).unwrap();
        assert_eq!(edit.graph, *ldp::PREFER_CONTAINMENT);
        assert_eq!(
            edit.triple,
            Triple::new(
                Iri::new_unchecked("trellis:data/c"),
                ldp::CONTAINS.clone(),
                child_id()
            )
        );
        assert!(membership_edits(&c, &child_id(), &Graph::new()).is_empty());
    }

    #[test]
    fn non_container_parent_yields_nothing() {
        let c = parent(InteractionModel::RdfSource, None);
        assert!(containment_edit(&c, &child_id()).is_none());
    }

    #[test]
    fn direct_has_member_targets_membership_resource() {
        let m = Iri::new_unchecked("trellis:data/m");
        let c = parent(
            InteractionModel::DirectContainer,
            Some(MembershipSpec {
                membership_resource: m.clone(),
                relation: MemberRelation::HasMember(ldp::MEMBER.clone()),
                inserted_content_relation: None,
            }),
        );
        let update = membership_edits(&c, &child_id(), &Graph::new());
        assert_eq!(update.edits.len(), 1);
        let edit = &update.edits[0];
        assert_eq!(edit.target, m);
        assert_eq!(edit.graph, *trellis::PREFER_SERVER_MANAGED);
        assert_eq!(
            edit.triple,
            Triple::new(m.clone(), ldp::MEMBER.clone(), child_id())
        );
        assert!(update.touch.contains(&m));
    }

    #[test]
    fn direct_is_member_of_targets_child() {
        let m = Iri::new_unchecked("trellis:data/m");
        let relation = Iri::new_unchecked("http://ex/partOf");
        let c = parent(
            InteractionModel::DirectContainer,
            Some(MembershipSpec {
                membership_resource: m.clone(),
                relation: MemberRelation::IsMemberOf(relation.clone()),
                inserted_content_relation: None,
            }),
        );
        let update = membership_edits(&c, &child_id(), &Graph::new());
        assert_eq!(update.edits.len(), 1);
        let edit = &update.edits[0];
        assert_eq!(edit.target, child_id());
        assert_eq!(edit.triple, Triple::new(child_id(), relation, m.clone()));
        assert!(update.touch.contains(&m));
    }

    #[test]
    fn indirect_derives_member_from_inserted_content() {
        let m = Iri::new_unchecked("trellis:data/m");
        let icr = Iri::new_unchecked("http://xmlns.com/foaf/0.1/primaryTopic");
        let c = parent(
            InteractionModel::IndirectContainer,
            Some(MembershipSpec {
                membership_resource: m.clone(),
                relation: MemberRelation::HasMember(ldp::MEMBER.clone()),
                inserted_content_relation: Some(icr.clone()),
            }),
        );

        let mut user_graph = Graph::new();
        user_graph.insert(Triple::new(
            child_id(),
            icr,
            Iri::new_unchecked("http://ex/topic"),
        ));

        let update = membership_edits(&c, &child_id(), &user_graph);
        assert_eq!(update.edits.len(), 1);
        assert_eq!(
            update.edits[0].triple,
            Triple::new(
                m,
                ldp::MEMBER.clone(),
                Iri::new_unchecked("http://ex/topic")
            )
        );
    }

    #[test]
    fn indirect_without_referent_is_noop() {
        let c = parent(
            InteractionModel::IndirectContainer,
            Some(MembershipSpec {
                membership_resource: Iri::new_unchecked("trellis:data/m"),
                relation: MemberRelation::HasMember(ldp::MEMBER.clone()),
                inserted_content_relation: Some(Iri::new_unchecked("http://ex/icr")),
            }),
        );
        assert!(membership_edits(&c, &child_id(), &Graph::new()).is_empty());
    }

    #[test]
    fn indirect_literal_referent_never_becomes_subject() {
        let relation = Iri::new_unchecked("http://ex/partOf");
        let icr = Iri::new_unchecked("http://ex/icr");
        let c = parent(
            InteractionModel::IndirectContainer,
            Some(MembershipSpec {
                membership_resource: Iri::new_unchecked("trellis:data/m"),
                relation: MemberRelation::IsMemberOf(relation),
                inserted_content_relation: Some(icr.clone()),
            }),
        );
        let mut user_graph = Graph::new();
        user_graph.insert(Triple::new(child_id(), icr, Literal::simple("x")));

        let update = membership_edits(&c, &child_id(), &user_graph);
        assert!(update.edits.is_empty());
        // The membership resource is still touched.
        assert_eq!(update.touch.len(), 1);
    }
}
