//! I define the ldp interaction models of resources.
//!

use rdf_model::Iri;

use crate::vocab::ldp;

/// The ldp interaction model of a resource. Immutable once the
/// resource is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InteractionModel {
    /// An rdf source.
    RdfSource,

    /// A binary, with an rdf description side-car.
    NonRdfSource,

    /// A container with server managed `ldp:contains` statements
    /// only.
    BasicContainer,

    /// A container that maintains membership statements about a
    /// configured membership resource.
    DirectContainer,

    /// As direct, with member referents derived through an
    /// inserted-content relation.
    IndirectContainer,
}

impl InteractionModel {
    /// All interaction models arbor supports.
    pub const ALL: [InteractionModel; 5] = [
        InteractionModel::RdfSource,
        InteractionModel::NonRdfSource,
        InteractionModel::BasicContainer,
        InteractionModel::DirectContainer,
        InteractionModel::IndirectContainer,
    ];

    /// Get the ldp class iri of this interaction model.
    pub fn iri(&self) -> Iri {
        match self {
            InteractionModel::RdfSource => ldp::RDF_SOURCE.clone(),
            InteractionModel::NonRdfSource => ldp::NON_RDF_SOURCE.clone(),
            InteractionModel::BasicContainer => ldp::BASIC_CONTAINER.clone(),
            InteractionModel::DirectContainer => ldp::DIRECT_CONTAINER.clone(),
            InteractionModel::IndirectContainer => ldp::INDIRECT_CONTAINER.clone(),
        }
    }

    /// Resolve the interaction model from given ldp class iri.
    pub fn from_iri(iri: &Iri) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.iri() == *iri)
    }

    /// Resolve whether this model is a container model.
    #[inline]
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            InteractionModel::BasicContainer
                | InteractionModel::DirectContainer
                | InteractionModel::IndirectContainer
        )
    }

    /// Resolve whether this model carries membership
    /// configuration.
    #[inline]
    pub fn has_membership(&self) -> bool {
        matches!(
            self,
            InteractionModel::DirectContainer | InteractionModel::IndirectContainer
        )
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(InteractionModel::RdfSource)]
    #[case(InteractionModel::NonRdfSource)]
    #[case(InteractionModel::BasicContainer)]
    #[case(InteractionModel::DirectContainer)]
    #[case(InteractionModel::IndirectContainer)]
    fn iri_roundtrip(#[case] model: InteractionModel) {
        assert_eq!(InteractionModel::from_iri(&model.iri()), Some(model));
    }

    #[test]
    fn container_predicates() {
        assert!(!InteractionModel::RdfSource.is_container());
        assert!(InteractionModel::BasicContainer.is_container());
        assert!(!InteractionModel::BasicContainer.has_membership());
        assert!(InteractionModel::IndirectContainer.has_membership());
    }
}
