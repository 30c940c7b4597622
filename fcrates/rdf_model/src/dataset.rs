//! I define the model for rdf datasets.
//!

use std::collections::BTreeMap;

use crate::{
    graph::Graph,
    quad::Quad,
    term::{Iri, Term},
    triple::Triple,
};

/// An rdf dataset: a collection of [`Graph`]s keyed by graph
/// name, with the default graph keyed by `None`.
///
/// Quad iteration is deterministic: graphs in name order, the
/// default graph first, triples in term order within each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    graphs: BTreeMap<Option<Iri>, Graph>,
}

impl Dataset {
    /// Create a new empty dataset.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of quads in this dataset.
    #[inline]
    pub fn len(&self) -> usize {
        self.graphs.values().map(Graph::len).sum()
    }

    /// Resolve whether this dataset holds no quads.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.graphs.values().all(Graph::is_empty)
    }

    /// Insert given quad. Returns whether the quad was not
    /// already present.
    pub fn insert(&mut self, quad: Quad) -> bool {
        self.graphs
            .entry(quad.graph_name.clone())
            .or_default()
            .insert(quad.to_triple())
    }

    /// Remove given quad. Returns whether the quad was present.
    pub fn remove(&mut self, quad: &Quad) -> bool {
        match self.graphs.get_mut(&quad.graph_name) {
            Some(g) => g.remove(&quad.to_triple()),
            None => false,
        }
    }

    /// Resolve whether this dataset contains given quad.
    pub fn contains(&self, quad: &Quad) -> bool {
        self.graphs
            .get(&quad.graph_name)
            .is_some_and(|g| g.contains(&quad.to_triple()))
    }

    /// Get the graph with given name, if present.
    #[inline]
    pub fn graph(&self, name: Option<&Iri>) -> Option<&Graph> {
        self.graphs.get(&name.cloned())
    }

    /// Get a mutable handle to the graph with given name,
    /// creating it empty if absent.
    #[inline]
    pub fn graph_mut(&mut self, name: Option<Iri>) -> &mut Graph {
        self.graphs.entry(name).or_default()
    }

    /// Replace the graph with given name wholesale.
    #[inline]
    pub fn set_graph(&mut self, name: Option<Iri>, graph: Graph) {
        self.graphs.insert(name, graph);
    }

    /// Remove the graph with given name, returning it if it was
    /// present.
    #[inline]
    pub fn remove_graph(&mut self, name: Option<&Iri>) -> Option<Graph> {
        self.graphs.remove(&name.cloned())
    }

    /// Iterate over `(name, graph)` entries of this dataset.
    #[inline]
    pub fn graphs(&self) -> impl Iterator<Item = (Option<&Iri>, &Graph)> + '_ {
        self.graphs.iter().map(|(n, g)| (n.as_ref(), g))
    }

    /// Iterate over the names of the named graphs in this
    /// dataset.
    #[inline]
    pub fn graph_names(&self) -> impl Iterator<Item = &Iri> + '_ {
        self.graphs.keys().filter_map(|n| n.as_ref())
    }

    /// Iterate over all quads of this dataset.
    pub fn quads(&self) -> impl Iterator<Item = Quad> + '_ {
        self.graphs.iter().flat_map(|(name, graph)| {
            graph
                .triples()
                .map(move |t| Quad::from_triple(name.clone(), t.clone()))
        })
    }

    /// Iterate over quads matching given pattern. A `None`
    /// `graph_name` component matches any graph; to match only
    /// the default graph, filter on the result.
    pub fn quads_matching<'d>(
        &'d self,
        graph_name: Option<&'d Iri>,
        subject: Option<&'d Term>,
        predicate: Option<&'d Iri>,
        object: Option<&'d Term>,
    ) -> Box<dyn Iterator<Item = Quad> + 'd> {
        match graph_name {
            Some(name) => match self.graphs.get(&Some(name.clone())) {
                Some(g) => Box::new(
                    g.matching(subject, predicate, object)
                        .map(move |t| Quad::from_triple(Some(name.clone()), t.clone())),
                ),
                None => Box::new(std::iter::empty()),
            },
            None => Box::new(self.graphs.iter().flat_map(move |(name, g)| {
                g.matching(subject, predicate, object)
                    .map(move |t| Quad::from_triple(name.clone(), t.clone()))
            })),
        }
    }

    /// Merge all quads of `other` into this dataset.
    pub fn merge(&mut self, other: Dataset) {
        for (name, graph) in other.graphs {
            self.graphs.entry(name).or_default().extend(graph);
        }
    }
}

impl Extend<Quad> for Dataset {
    fn extend<T: IntoIterator<Item = Quad>>(&mut self, iter: T) {
        for quad in iter {
            self.insert(quad);
        }
    }
}

impl FromIterator<Quad> for Dataset {
    fn from_iter<T: IntoIterator<Item = Quad>>(iter: T) -> Self {
        let mut dataset = Self::new();
        dataset.extend(iter);
        dataset
    }
}

impl FromIterator<Triple> for Dataset {
    /// Collect triples into the default graph of a new dataset.
    fn from_iter<T: IntoIterator<Item = Triple>>(iter: T) -> Self {
        let mut dataset = Self::new();
        dataset.set_graph(None, iter.into_iter().collect());
        dataset
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
    fn quads_partition_by_graph() {
        let mut d = Dataset::new();
        let g1 = iri("http://ex/g1");
        let s = Term::Iri(iri("http://ex/s"));
        let p = iri("http://ex/p");

        d.insert(Quad::new(None, s.clone(), p.clone(), Literal::simple("a")));
        d.insert(Quad::new(
            Some(g1.clone()),
            s.clone(),
            p.clone(),
            Literal::simple("b"),
        ));

        assert_eq!(d.len(), 2);
        assert_eq!(d.graph(None).unwrap().len(), 1);
        assert_eq!(d.graph(Some(&g1)).unwrap().len(), 1);
        assert_eq!(d.quads_matching(Some(&g1), None, None, None).count(), 1);
        assert_eq!(d.quads_matching(None, Some(&s), None, None).count(), 2);
    }

    #[test]
    fn default_graph_iterates_first() {
        let mut d = Dataset::new();
        let s = Term::Iri(iri("http://ex/s"));
        let p = iri("http://ex/p");
        d.insert(Quad::new(
            Some(iri("http://ex/g")),
            s.clone(),
            p.clone(),
            Literal::simple("named"),
        ));
        d.insert(Quad::new(None, s, p, Literal::simple("default")));

        let first = d.quads().next().unwrap();
        assert_eq!(first.graph_name, None);
    }
}
