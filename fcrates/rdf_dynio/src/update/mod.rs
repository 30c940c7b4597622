//! I define the sparql-update subset engine used for patching
//! resource graphs.
//!
//! The supported shapes are `INSERT DATA`, `DELETE DATA`,
//! `DELETE WHERE`, and `DELETE … INSERT … WHERE`, with a shared
//! `PREFIX`/`BASE` prologue. A parsed update applies to an
//! in-memory graph atomically: the full delta is computed before
//! any statement is touched.
//!

use std::collections::BTreeMap;

use rdf_model::{BlankNode, Graph, Iri, Term, Triple};

mod parser;

pub use parser::UpdateParseError;

/// Media type of sparql update documents, the only patch syntax
/// supported.
pub const SPARQL_UPDATE_MEDIA_TYPE: &str = "application/sparql-update";

/// A term position in a triple pattern: either a concrete term
/// or a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermPattern {
    /// A concrete term.
    Term(Term),

    /// A named variable.
    Variable(String),
}

impl TermPattern {
    /// Resolve this pattern under given binding; bnodes in
    /// insert templates are relabeled per solution.
    fn resolve(&self, binding: &Binding, solution: usize) -> Option<Term> {
        match self {
            TermPattern::Term(Term::BlankNode(b)) => Some(Term::BlankNode(BlankNode::new(
                format!("{}_s{}", b.label(), solution),
            ))),
            TermPattern::Term(t) => Some(t.clone()),
            TermPattern::Variable(v) => binding.get(v).cloned(),
        }
    }
}

/// A triple pattern over [`TermPattern`] positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriplePattern {
    /// Subject position.
    pub subject: TermPattern,

    /// Predicate position.
    pub predicate: TermPattern,

    /// Object position.
    pub object: TermPattern,
}

/// One operation of a sparql update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOperation {
    /// `INSERT DATA { … }`.
    InsertData(Vec<Triple>),

    /// `DELETE DATA { … }`.
    DeleteData(Vec<Triple>),

    /// `DELETE WHERE { … }`.
    DeleteWhere(Vec<TriplePattern>),

    /// `DELETE { … } INSERT { … } WHERE { … }`, with either
    /// template possibly absent.
    Modify {
        /// Deletion template.
        delete: Vec<TriplePattern>,
        /// Insertion template.
        insert: Vec<TriplePattern>,
        /// Match pattern.
        pattern: Vec<TriplePattern>,
    },
}

/// A parsed sparql update: a sequence of operations applied in
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparqlUpdate {
    operations: Vec<UpdateOperation>,
}

/// A solution binding: variable name to term.
type Binding = BTreeMap<String, Term>;

impl SparqlUpdate {
    /// Parse given update string, resolving relative iris
    /// against given base.
    #[inline]
    pub fn parse(input: &str, base: Option<&Iri>) -> Result<Self, UpdateParseError> {
        parser::parse_update(input, base).map(|operations| Self { operations })
    }

    /// Get the operations of this update.
    #[inline]
    pub fn operations(&self) -> &[UpdateOperation] {
        &self.operations
    }

    /// Apply this update to given graph in place.
    ///
    /// Each operation observes the effects of those before it.
    /// Within an operation, the delta is computed over the
    /// pre-state and applied as a unit: removals first, then
    /// insertions.
    pub fn apply(&self, graph: &mut Graph) {
        for operation in &self.operations {
            match operation {
                UpdateOperation::InsertData(triples) => {
                    for t in triples {
                        graph.insert(t.clone());
                    }
                }
                UpdateOperation::DeleteData(triples) => {
                    for t in triples {
                        graph.remove(t);
                    }
                }
                UpdateOperation::DeleteWhere(patterns) => {
                    let solutions = solve(graph, patterns);
                    let removals = instantiate_all(patterns, &solutions);
                    for t in &removals {
                        graph.remove(t);
                    }
                }
                UpdateOperation::Modify {
                    delete,
                    insert,
                    pattern,
                } => {
                    let solutions = solve(graph, pattern);
                    let removals = instantiate_all(delete, &solutions);
                    let insertions = instantiate_all(insert, &solutions);
                    for t in &removals {
                        graph.remove(t);
                    }
                    for t in insertions {
                        graph.insert(t);
                    }
                }
            }
        }
    }
}

/// Solve given patterns over the graph by exhaustive join,
/// seeding with the empty binding.
fn solve(graph: &Graph, patterns: &[TriplePattern]) -> Vec<Binding> {
    let mut bindings: Vec<Binding> = vec![Binding::new()];
    for pattern in patterns {
        let mut next = Vec::new();
        for binding in &bindings {
            for triple in graph.triples() {
                if let Some(extended) = match_triple(triple, pattern, binding) {
                    next.push(extended);
                }
            }
        }
        bindings = next;
        if bindings.is_empty() {
            break;
        }
    }
    bindings
}

/// Match given triple against the pattern under an existing
/// binding, returning the extended binding on success.
fn match_triple(triple: &Triple, pattern: &TriplePattern, binding: &Binding) -> Option<Binding> {
    let mut extended = binding.clone();
    match_position(&triple.subject, &pattern.subject, &mut extended)?;
    match_position(
        &Term::Iri(triple.predicate.clone()),
        &pattern.predicate,
        &mut extended,
    )?;
    match_position(&triple.object, &pattern.object, &mut extended)?;
    Some(extended)
}

fn match_position(term: &Term, pattern: &TermPattern, binding: &mut Binding) -> Option<()> {
    match pattern {
        TermPattern::Term(expected) => (term == expected).then_some(()),
        TermPattern::Variable(name) => match binding.get(name) {
            Some(bound) => (term == bound).then_some(()),
            None => {
                binding.insert(name.clone(), term.clone());
                Some(())
            }
        },
    }
}

/// Instantiate every template against every solution, skipping
/// instantiations left incomplete by unbound variables.
fn instantiate_all(templates: &[TriplePattern], solutions: &[Binding]) -> Vec<Triple> {
    let mut triples = Vec::new();
    for (index, solution) in solutions.iter().enumerate() {
        for template in templates {
            if let Some(t) = instantiate(template, solution, index) {
                triples.push(t);
            }
        }
    }
    triples
}

fn instantiate(template: &TriplePattern, binding: &Binding, solution: usize) -> Option<Triple> {
    let subject = template.subject.resolve(binding, solution)?;
    let predicate = match template.predicate.resolve(binding, solution)? {
        Term::Iri(iri) => iri,
        _ => return None,
    };
    let object = template.object.resolve(binding, solution)?;
    Some(Triple {
        subject,
        predicate,
        object,
    })
}

#[cfg(test)]
mod tests {
    use rdf_model::Literal;

    use super::*;

    fn iri(s: &str) -> Iri {
        Iri::new_unchecked(s)
    }

    fn graph_with_title() -> Graph {
        let mut g = Graph::new();
        g.insert(Triple::new(
            iri("http://h/res"),
            iri("http://purl.org/dc/terms/title"),
            Literal::simple("T"),
        ));
        g
    }

    #[test]
    fn insert_data_adds_triples() {
        let mut g = graph_with_title();
        let update = SparqlUpdate::parse(
            r#"PREFIX dc: <http://purl.org/dc/terms/>
               INSERT DATA { <http://h/res> dc:description "D" . }"#,
            None,
        )
        .unwrap();
        update.apply(&mut g);

        assert_eq!(g.len(), 2);
        assert_eq!(
            g.first_object(
                &Term::Iri(iri("http://h/res")),
                &iri("http://purl.org/dc/terms/description")
            ),
            Some(&Term::Literal(Literal::simple("D")))
        );
    }

    #[test]
    fn delete_data_removes_exact_triples() {
        let mut g = graph_with_title();
        let update = SparqlUpdate::parse(
            r#"DELETE DATA { <http://h/res> <http://purl.org/dc/terms/title> "T" . }"#,
            None,
        )
        .unwrap();
        update.apply(&mut g);
        assert!(g.is_empty());
    }

    #[test]
    fn delete_where_matches_variables() {
        let mut g = graph_with_title();
        g.insert(Triple::new(
            iri("http://h/other"),
            iri("http://purl.org/dc/terms/title"),
            Literal::simple("U"),
        ));
        let update = SparqlUpdate::parse(
            r#"DELETE WHERE { ?s <http://purl.org/dc/terms/title> ?o . }"#,
            None,
        )
        .unwrap();
        update.apply(&mut g);
        assert!(g.is_empty());
    }

    #[test]
    fn modify_rewrites_matched_solutions() {
        let mut g = graph_with_title();
        let update = SparqlUpdate::parse(
            r#"PREFIX dc: <http://purl.org/dc/terms/>
               DELETE { ?s dc:title ?o }
               INSERT { ?s dc:alternative ?o }
               WHERE { ?s dc:title ?o }"#,
            None,
        )
        .unwrap();
        update.apply(&mut g);

        assert_eq!(g.len(), 1);
        let t = g.triples().next().unwrap();
        assert_eq!(t.predicate.as_str(), "http://purl.org/dc/terms/alternative");
        assert_eq!(t.object, Term::Literal(Literal::simple("T")));
    }

    #[test]
    fn insert_where_with_empty_pattern_runs_once() {
        let mut g = graph_with_title();
        let update = SparqlUpdate::parse(
            r#"INSERT { <http://h/res> <http://purl.org/dc/terms/description> "D" } WHERE {}"#,
            None,
        )
        .unwrap();
        update.apply(&mut g);
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn relative_iris_resolve_against_base() {
        let mut g = Graph::new();
        let base = iri("http://h/res");
        let update = SparqlUpdate::parse(
            r#"INSERT DATA { <> <http://purl.org/dc/terms/title> "T" }"#,
            Some(&base),
        )
        .unwrap();
        update.apply(&mut g);
        let t = g.triples().next().unwrap();
        assert_eq!(t.subject, Term::Iri(base));
    }

    #[test]
    fn operations_apply_in_sequence() {
        let mut g = Graph::new();
        let update = SparqlUpdate::parse(
            r#"PREFIX dc: <http://purl.org/dc/terms/>
               INSERT DATA { <http://h/r> dc:title "A" } ;
               DELETE WHERE { <http://h/r> dc:title ?o }"#,
            None,
        )
        .unwrap();
        update.apply(&mut g);
        assert!(g.is_empty());
    }
}
