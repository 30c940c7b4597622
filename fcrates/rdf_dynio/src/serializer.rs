//! I define dynamic-syntax serializers, writing the owned
//! statement model out as rdf documents.
//!

use std::io::Write;

use rdf_model::{term::XSD_STRING, Dataset, Graph, Iri, Literal, Quad, Term, Triple};
use rio_api::{
    formatter::{QuadsFormatter, TriplesFormatter},
    model as rio,
};
use rio_turtle::{NQuadsFormatter, NTriplesFormatter, TriGFormatter, TurtleFormatter};

use crate::{error::RdfWriteError, jsonld, syntax::RdfSyntax};

/// Serialize given graph into given sink, in given syntax.
///
/// Dataset-encoding syntaxes express the graph as the default
/// graph of a dataset.
pub fn write_graph(
    graph: &Graph,
    sink: impl Write,
    syntax: RdfSyntax,
) -> Result<(), RdfWriteError> {
    match syntax {
        RdfSyntax::Turtle => {
            let mut formatter = TurtleFormatter::new(sink);
            for triple in graph.triples() {
                format_triple(&mut formatter, triple, syntax)?;
            }
            formatter.finish()?;
            Ok(())
        }
        RdfSyntax::NTriples => {
            let mut formatter = NTriplesFormatter::new(sink);
            for triple in graph.triples() {
                format_triple(&mut formatter, triple, syntax)?;
            }
            formatter.finish()?;
            Ok(())
        }
        _ => {
            let mut dataset = Dataset::new();
            dataset.set_graph(None, graph.clone());
            write_dataset(&dataset, sink, syntax)
        }
    }
}

/// Serialize given dataset into given sink, in given syntax.
///
/// Graph-encoding syntaxes reject datasets holding named
/// graphs.
pub fn write_dataset(
    dataset: &Dataset,
    sink: impl Write,
    syntax: RdfSyntax,
) -> Result<(), RdfWriteError> {
    match syntax {
        RdfSyntax::Turtle | RdfSyntax::NTriples => {
            if dataset.graph_names().next().is_some() {
                return Err(RdfWriteError::Inexpressible {
                    syntax,
                    message: "dataset holds named graphs".into(),
                });
            }
            match dataset.graph(None) {
                Some(g) => write_graph(g, sink, syntax),
                None => write_graph(&Graph::new(), sink, syntax),
            }
        }
        RdfSyntax::NQuads => {
            let mut formatter = NQuadsFormatter::new(sink);
            for quad in dataset.quads() {
                format_quad(&mut formatter, &quad, syntax)?;
            }
            formatter.finish()?;
            Ok(())
        }
        RdfSyntax::TriG => {
            let mut formatter = TriGFormatter::new(sink);
            for quad in dataset.quads() {
                format_quad(&mut formatter, &quad, syntax)?;
            }
            formatter.finish()?;
            Ok(())
        }
        RdfSyntax::JsonLd => jsonld::write_dataset(dataset, sink, None),
    }
}

fn format_triple<F: TriplesFormatter>(
    formatter: &mut F,
    triple: &Triple,
    syntax: RdfSyntax,
) -> Result<(), RdfWriteError>
where
    RdfWriteError: From<F::Error>,
{
    formatter.format(&rio::Triple {
        subject: rio_subject(&triple.subject, syntax)?,
        predicate: rio_named(&triple.predicate),
        object: rio_term(&triple.object),
    })?;
    Ok(())
}

fn format_quad<F: QuadsFormatter>(
    formatter: &mut F,
    quad: &Quad,
    syntax: RdfSyntax,
) -> Result<(), RdfWriteError>
where
    RdfWriteError: From<F::Error>,
{
    formatter.format(&rio::Quad {
        subject: rio_subject(&quad.subject, syntax)?,
        predicate: rio_named(&quad.predicate),
        object: rio_term(&quad.object),
        graph_name: quad
            .graph_name
            .as_ref()
            .map(|g| rio::GraphName::NamedNode(rio_named(g))),
    })?;
    Ok(())
}

fn rio_named(iri: &Iri) -> rio::NamedNode<'_> {
    rio::NamedNode { iri: iri.as_str() }
}

fn rio_subject<'t>(term: &'t Term, syntax: RdfSyntax) -> Result<rio::Subject<'t>, RdfWriteError> {
    match term {
        Term::Iri(iri) => Ok(rio::Subject::NamedNode(rio_named(iri))),
        Term::BlankNode(b) => Ok(rio::Subject::BlankNode(rio::BlankNode { id: b.label() })),
        Term::Literal(_) => Err(RdfWriteError::Inexpressible {
            syntax,
            message: "literal in subject position".into(),
        }),
    }
}

fn rio_term(term: &Term) -> rio::Term<'_> {
    match term {
        Term::Iri(iri) => rio::Term::NamedNode(rio_named(iri)),
        Term::BlankNode(b) => rio::Term::BlankNode(rio::BlankNode { id: b.label() }),
        Term::Literal(l) => rio::Term::Literal(rio_literal(l)),
    }
}

fn rio_literal(literal: &Literal) -> rio::Literal<'_> {
    if let Some(language) = literal.language() {
        rio::Literal::LanguageTaggedString {
            value: literal.lexical_form(),
            language,
        }
    } else if *literal.datatype() == *XSD_STRING {
        rio::Literal::Simple {
            value: literal.lexical_form(),
        }
    } else {
        rio::Literal::Typed {
            value: literal.lexical_form(),
            datatype: rio_named(literal.datatype()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rdf_model::BlankNode;

    use crate::parser::{parse_dataset, parse_graph};

    use super::*;

    fn sample_graph() -> Graph {
        let mut g = Graph::new();
        let s = Term::Iri(Iri::new_unchecked("http://ex/s"));
        g.insert(Triple::new(
            s.clone(),
            Iri::new_unchecked("http://ex/p"),
            Literal::language_tagged("hallo", "de"),
        ));
        g.insert(Triple::new(
            s,
            Iri::new_unchecked("http://ex/q"),
            BlankNode::new("b0"),
        ));
        g
    }

    #[test]
    fn graph_roundtrips_through_turtle() {
        let graph = sample_graph();
        let mut out = Vec::new();
        write_graph(&graph, &mut out, RdfSyntax::Turtle).unwrap();
        let back = parse_graph(&out, RdfSyntax::Turtle, None).unwrap();
        assert_eq!(back, graph);
    }

    #[test]
    fn dataset_roundtrips_through_nquads() {
        let mut dataset = Dataset::new();
        dataset.insert(Quad::new(
            Some(Iri::new_unchecked("http://ex/g")),
            Iri::new_unchecked("http://ex/s"),
            Iri::new_unchecked("http://ex/p"),
            Literal::simple("x"),
        ));
        let mut out = Vec::new();
        write_dataset(&dataset, &mut out, RdfSyntax::NQuads).unwrap();
        let back = parse_dataset(&out, RdfSyntax::NQuads, None).unwrap();
        assert_eq!(back, dataset);
    }

    #[test]
    fn named_graphs_inexpressible_in_turtle() {
        let mut dataset = Dataset::new();
        dataset.insert(Quad::new(
            Some(Iri::new_unchecked("http://ex/g")),
            Iri::new_unchecked("http://ex/s"),
            Iri::new_unchecked("http://ex/p"),
            Literal::simple("x"),
        ));
        let result = write_dataset(&dataset, Vec::new(), RdfSyntax::Turtle);
        claims::assert_err!(result);
    }
}
