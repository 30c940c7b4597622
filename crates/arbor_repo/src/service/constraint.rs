//! I define the constraint validator applied to candidate
//! resource graphs before they are accepted.
//!

use arbor_space::{
    iri,
    vocab::{acl, ldp, prov, rdf, trellis},
    InteractionModel,
};
use rdf_model::{Graph, Iri, Term, Triple};

/// An explanation of which triples violated which constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    /// Identifier of the violated constraint.
    pub constraint: Iri,

    /// The offending triples.
    pub triples: Vec<Triple>,
}

impl ConstraintViolation {
    fn new(constraint: &Iri, triples: Vec<Triple>) -> Self {
        Self {
            constraint: constraint.clone(),
            triples,
        }
    }
}

/// Which graph of the resource a candidate graph is destined
/// for; access control graphs legitimately carry `acl:` terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphContext {
    /// The user managed graph.
    UserManaged,

    /// The access control graph.
    AccessControl,
}

/// A validator of candidate graphs against the interaction
/// model they are submitted under.
#[derive(Debug, Clone)]
pub struct ConstraintValidator {
    domain_prefix: String,
}

impl Default for ConstraintValidator {
    fn default() -> Self {
        Self::new(iri::DATA_PREFIX)
    }
}

impl ConstraintValidator {
    /// Create a validator treating iris under given prefix as
    /// in-domain.
    pub fn new(domain_prefix: impl Into<String>) -> Self {
        Self {
            domain_prefix: domain_prefix.into(),
        }
    }

    /// Validate given candidate graph. The returned sequence is
    /// finite; empty means accept.
    pub fn violations(
        &self,
        id: &Iri,
        model: InteractionModel,
        graph: &Graph,
        context: GraphContext,
    ) -> Vec<ConstraintViolation> {
        let mut violations = Vec::new();

        self.check_properties(graph, context, &mut violations);
        self.check_types(model, graph, &mut violations);
        self.check_membership_config(id, model, graph, &mut violations);

        violations
    }

    /// Server managed and restricted predicates.
    fn check_properties(
        &self,
        graph: &Graph,
        context: GraphContext,
        violations: &mut Vec<ConstraintViolation>,
    ) {
        let mut server_managed = Vec::new();
        let mut bad_ranges = Vec::new();

        for triple in graph.triples() {
            let predicate = triple.predicate.as_str();
            if triple.predicate == *ldp::CONTAINS {
                server_managed.push(triple.clone());
            } else if predicate.starts_with(prov::NS) {
                server_managed.push(triple.clone());
            } else if predicate.starts_with(acl::NS) && context != GraphContext::AccessControl {
                server_managed.push(triple.clone());
            } else if triple.predicate == *ldp::INBOX && !triple.object.is_iri() {
                bad_ranges.push(triple.clone());
            }
        }

        if !server_managed.is_empty() {
            violations.push(ConstraintViolation::new(
                &trellis::INVALID_PROPERTY,
                server_managed,
            ));
        }
        if !bad_ranges.is_empty() {
            violations.push(ConstraintViolation::new(&trellis::INVALID_RANGE, bad_ranges));
        }
    }

    /// User supplied ldp types must agree with the interaction
    /// model.
    fn check_types(
        &self,
        model: InteractionModel,
        graph: &Graph,
        violations: &mut Vec<ConstraintViolation>,
    ) {
        let offending: Vec<Triple> = graph
            .matching(None, Some(&rdf::TYPE), None)
            .filter(|t| {
                t.object
                    .as_iri()
                    .is_some_and(|o| o.has_prefix(ldp::NS) && *o != model.iri())
            })
            .cloned()
            .collect();
        if !offending.is_empty() {
            violations.push(ConstraintViolation::new(&trellis::INVALID_TYPE, offending));
        }
    }

    /// Direct and indirect containers need a coherent
    /// membership configuration on the resource itself.
    fn check_membership_config(
        &self,
        id: &Iri,
        model: InteractionModel,
        graph: &Graph,
        violations: &mut Vec<ConstraintViolation>,
    ) {
        let config_predicates = [
            &*ldp::MEMBERSHIP_RESOURCE,
            &*ldp::HAS_MEMBER_RELATION,
            &*ldp::IS_MEMBER_OF_RELATION,
            &*ldp::INSERTED_CONTENT_RELATION,
        ];

        // Membership configuration may only describe the
        // resource itself; foreign subjects would let a child
        // rewire another resource's semantics.
        let subject = Term::Iri(id.clone());
        let foreign: Vec<Triple> = graph
            .triples()
            .filter(|t| {
                config_predicates.contains(&&t.predicate)
                    && match &t.subject {
                        // Blank nodes are in-domain by construction.
                        Term::Iri(s) => {
                            !(s.has_prefix(&self.domain_prefix) || iri::is_skolem(s))
                        }
                        _ => false,
                    }
            })
            .cloned()
            .collect();
        if !foreign.is_empty() {
            violations.push(ConstraintViolation::new(&trellis::INVALID_PROPERTY, foreign));
        }

        if !model.has_membership() {
            return;
        }

        let count = |p: &Iri| graph.matching(Some(&subject), Some(p), None).count();

        let membership_resources = count(&ldp::MEMBERSHIP_RESOURCE);
        if membership_resources != 1 {
            violations.push(ConstraintViolation::new(
                &trellis::INVALID_CARDINALITY,
                graph
                    .matching(Some(&subject), Some(&ldp::MEMBERSHIP_RESOURCE), None)
                    .cloned()
                    .collect(),
            ));
        }

        let has_member = count(&ldp::HAS_MEMBER_RELATION);
        let is_member_of = count(&ldp::IS_MEMBER_OF_RELATION);
        if has_member + is_member_of != 1 {
            let mut offending: Vec<Triple> = graph
                .matching(Some(&subject), Some(&ldp::HAS_MEMBER_RELATION), None)
                .cloned()
                .collect();
            offending.extend(
                graph
                    .matching(Some(&subject), Some(&ldp::IS_MEMBER_OF_RELATION), None)
                    .cloned(),
            );
            violations.push(ConstraintViolation::new(
                &trellis::INVALID_CARDINALITY,
                offending,
            ));
        }

        if model == InteractionModel::IndirectContainer
            && count(&ldp::INSERTED_CONTENT_RELATION) != 1
        {
            violations.push(ConstraintViolation::new(
                &trellis::INVALID_CARDINALITY,
                graph
                    .matching(Some(&subject), Some(&ldp::INSERTED_CONTENT_RELATION), None)
                    .cloned()
                    .collect(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use rdf_model::Literal;

    use super::*;

    fn id() -> Iri {
        Iri::new_unchecked("trellis:data/c")
    }

    fn validator() -> ConstraintValidator {
        ConstraintValidator::default()
    }

    #[test]
    fn user_contains_is_refused() {
        let mut g = Graph::new();
        g.insert(Triple::new(
            id(),
            ldp::CONTAINS.clone(),
            Iri::new_unchecked("trellis:data/c/x"),
        ));
        let violations = validator().violations(
            &id(),
            InteractionModel::BasicContainer,
            &g,
            GraphContext::UserManaged,
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].constraint, *trellis::INVALID_PROPERTY);
    }

    #[test]
    fn acl_terms_refused_outside_acl_graph() {
        let mut g = Graph::new();
        g.insert(Triple::new(
            id(),
            acl::MODE.clone(),
            acl::READ.clone(),
        ));
        assert!(!validator()
            .violations(&id(), InteractionModel::RdfSource, &g, GraphContext::UserManaged)
            .is_empty());
        assert!(validator()
            .violations(&id(), InteractionModel::RdfSource, &g, GraphContext::AccessControl)
            .is_empty());
    }

    #[test]
    fn audit_predicates_are_server_managed() {
        let mut g = Graph::new();
        g.insert(Triple::new(
            id(),
            prov::WAS_GENERATED_BY.clone(),
            Iri::new_unchecked("trellis:bnode/a"),
        ));
        assert!(!validator()
            .violations(&id(), InteractionModel::RdfSource, &g, GraphContext::UserManaged)
            .is_empty());
    }

    #[test]
    fn conflicting_ldp_type_is_refused() {
        let mut g = Graph::new();
        g.insert(Triple::new(id(), rdf::TYPE.clone(), ldp::DIRECT_CONTAINER.clone()));
        let violations = validator().violations(
            &id(),
            InteractionModel::BasicContainer,
            &g,
            GraphContext::UserManaged,
        );
        assert_eq!(violations[0].constraint, *trellis::INVALID_TYPE);
    }

    #[test]
    fn direct_container_needs_exactly_one_relation() {
        // No membership configuration at all.
        let g = Graph::new();
        let violations = validator().violations(
            &id(),
            InteractionModel::DirectContainer,
            &g,
            GraphContext::UserManaged,
        );
        assert_eq!(violations.len(), 2);
        assert!(violations
            .iter()
            .all(|v| v.constraint == *trellis::INVALID_CARDINALITY));

        // Both relation directions at once.
        let mut g = Graph::new();
        g.insert(Triple::new(
            id(),
            ldp::MEMBERSHIP_RESOURCE.clone(),
            Iri::new_unchecked("trellis:data/m"),
        ));
        g.insert(Triple::new(
            id(),
            ldp::HAS_MEMBER_RELATION.clone(),
            ldp::MEMBER.clone(),
        ));
        g.insert(Triple::new(
            id(),
            ldp::IS_MEMBER_OF_RELATION.clone(),
            ldp::MEMBER.clone(),
        ));
        assert!(!validator()
            .violations(&id(), InteractionModel::DirectContainer, &g, GraphContext::UserManaged)
            .is_empty());
    }

    #[test]
    fn indirect_container_needs_inserted_content_relation() {
        let mut g = Graph::new();
        g.insert(Triple::new(
            id(),
            ldp::MEMBERSHIP_RESOURCE.clone(),
            Iri::new_unchecked("trellis:data/m"),
        ));
        g.insert(Triple::new(
            id(),
            ldp::HAS_MEMBER_RELATION.clone(),
            ldp::MEMBER.clone(),
        ));
        let violations = validator().violations(
            &id(),
            InteractionModel::IndirectContainer,
            &g,
            GraphContext::UserManaged,
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].constraint, *trellis::INVALID_CARDINALITY);
    }

    #[test]
    fn well_formed_direct_container_passes() {
        let mut g = Graph::new();
        g.insert(Triple::new(
            id(),
            ldp::MEMBERSHIP_RESOURCE.clone(),
            Iri::new_unchecked("trellis:data/m"),
        ));
        g.insert(Triple::new(
            id(),
            ldp::IS_MEMBER_OF_RELATION.clone(),
            Iri::new_unchecked("http://ex/fragmentOf"),
        ));
        g.insert(Triple::new(
            id(),
            Iri::new_unchecked("http://purl.org/dc/terms/title"),
            Literal::simple("holdings"),
        ));
        assert!(validator()
            .violations(&id(), InteractionModel::DirectContainer, &g, GraphContext::UserManaged)
            .is_empty());
    }
}
