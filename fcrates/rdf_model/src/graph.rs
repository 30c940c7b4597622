//! I define the model for rdf graphs.
//!

use std::collections::BTreeSet;

use crate::{
    term::{Iri, Term},
    triple::Triple,
};

/// An rdf graph: a deduplicated set of [`Triple`]s, iterated in
/// deterministic (term) order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    triples: BTreeSet<Triple>,
}

impl Graph {
    /// Create a new empty graph.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of triples in this graph.
    #[inline]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Resolve whether this graph is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Insert given triple into this graph. Returns whether the
    /// triple was not already present.
    #[inline]
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    /// Remove given triple from this graph. Returns whether the
    /// triple was present.
    #[inline]
    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.triples.remove(triple)
    }

    /// Resolve whether this graph contains given triple.
    #[inline]
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Iterate over the triples of this graph.
    #[inline]
    pub fn triples(&self) -> impl Iterator<Item = &Triple> + '_ {
        self.triples.iter()
    }

    /// Iterate over triples matching given pattern. A `None`
    /// component matches any term.
    pub fn matching<'g>(
        &'g self,
        subject: Option<&'g Term>,
        predicate: Option<&'g Iri>,
        object: Option<&'g Term>,
    ) -> impl Iterator<Item = &'g Triple> + 'g {
        self.triples.iter().filter(move |t| {
            subject.map_or(true, |s| &t.subject == s)
                && predicate.map_or(true, |p| &t.predicate == p)
                && object.map_or(true, |o| &t.object == o)
        })
    }

    /// Iterate over objects of triples with given subject and
    /// predicate.
    #[inline]
    pub fn objects<'g>(
        &'g self,
        subject: &'g Term,
        predicate: &'g Iri,
    ) -> impl Iterator<Item = &'g Term> + 'g {
        self.matching(Some(subject), Some(predicate), None)
            .map(|t| &t.object)
    }

    /// Get the first object of triples with given subject and
    /// predicate, if any.
    #[inline]
    pub fn first_object<'g>(&'g self, subject: &'g Term, predicate: &'g Iri) -> Option<&'g Term> {
        self.objects(subject, predicate).next()
    }

    /// Remove all triples matching given pattern, and return
    /// the count of removed triples.
    pub fn remove_matching(
        &mut self,
        subject: Option<&Term>,
        predicate: Option<&Iri>,
        object: Option<&Term>,
    ) -> usize {
        let doomed: Vec<Triple> = self.matching(subject, predicate, object).cloned().collect();
        for t in &doomed {
            self.triples.remove(t);
        }
        doomed.len()
    }
}

impl Extend<Triple> for Graph {
    fn extend<T: IntoIterator<Item = Triple>>(&mut self, iter: T) {
        self.triples.extend(iter)
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<T: IntoIterator<Item = Triple>>(iter: T) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::collections::btree_set::IntoIter<Triple>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::term::Literal;

    use super::*;

    fn iri(s: &str) -> Iri {
        Iri::new_unchecked(s)
    }

    #[test]
    fn dedup_and_matching() {
        let mut g = Graph::new();
        let s = Term::Iri(iri("http://ex/s"));
        let p = iri("http://ex/p");
        assert!(g.insert(Triple::new(s.clone(), p.clone(), Literal::simple("a"))));
        assert!(!g.insert(Triple::new(s.clone(), p.clone(), Literal::simple("a"))));
        g.insert(Triple::new(s.clone(), p.clone(), Literal::simple("b")));
        g.insert(Triple::new(
            s.clone(),
            iri("http://ex/q"),
            Literal::simple("c"),
        ));

        assert_eq!(g.len(), 3);
        assert_eq!(g.matching(Some(&s), Some(&p), None).count(), 2);
        assert_eq!(g.matching(None, None, None).count(), 3);
    }

    #[test]
    fn remove_matching_scrubs_pattern() {
        let mut g = Graph::new();
        let s = Term::Iri(iri("http://ex/s"));
        let p = iri("http://ex/p");
        g.insert(Triple::new(s.clone(), p.clone(), Literal::simple("a")));
        g.insert(Triple::new(s.clone(), p.clone(), Literal::simple("b")));

        assert_eq!(g.remove_matching(None, Some(&p), None), 2);
        assert!(g.is_empty());
    }
}
