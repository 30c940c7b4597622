//! I define the model for rdf quads.
//!

use std::fmt::Display;

use crate::{
    term::{Iri, Term},
    triple::Triple,
};

/// An rdf quad: a [`Triple`] asserted in a named graph, or in
/// the default graph when `graph_name` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quad {
    /// Name of the graph this quad belongs to. `None` denotes
    /// the default graph.
    pub graph_name: Option<Iri>,

    /// Subject of the quad.
    pub subject: Term,

    /// Predicate of the quad.
    pub predicate: Iri,

    /// Object of the quad.
    pub object: Term,
}

impl Quad {
    /// Create a new quad with given terms.
    #[inline]
    pub fn new(
        graph_name: Option<Iri>,
        subject: impl Into<Term>,
        predicate: Iri,
        object: impl Into<Term>,
    ) -> Self {
        Self {
            graph_name,
            subject: subject.into(),
            predicate,
            object: object.into(),
        }
    }

    /// Create a new quad from given triple, asserted in graph
    /// with given name.
    #[inline]
    pub fn from_triple(graph_name: Option<Iri>, triple: Triple) -> Self {
        Self {
            graph_name,
            subject: triple.subject,
            predicate: triple.predicate,
            object: triple.object,
        }
    }

    /// Get the triple part of this quad.
    #[inline]
    pub fn to_triple(&self) -> Triple {
        Triple {
            subject: self.subject.clone(),
            predicate: self.predicate.clone(),
            object: self.object.clone(),
        }
    }
}

impl Display for Quad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.graph_name {
            Some(g) => write!(
                f,
                "{} <{}> {} <{}> .",
                self.subject, self.predicate, self.object, g
            ),
            None => write!(f, "{} <{}> {} .", self.subject, self.predicate, self.object),
        }
    }
}
