//! I define dynamic-syntax parsers, reading rdf documents into
//! the owned statement model.
//!

use oxiri::Iri as OxIri;
use rdf_model::{BlankNode, Dataset, Graph, Iri, Literal, Quad, Term, Triple};
use rio_api::{
    model as rio,
    parser::{QuadsParser, TriplesParser},
};
use rio_turtle::{NQuadsParser, NTriplesParser, TriGParser, TurtleError, TurtleParser};

use crate::{error::RdfParseError, jsonld, syntax::RdfSyntax};

/// Internal error for a single parse step.
enum StepError {
    Rio(TurtleError),
    Model(RdfParseError),
}

impl From<TurtleError> for StepError {
    fn from(e: TurtleError) -> Self {
        StepError::Rio(e)
    }
}

impl StepError {
    fn into_parse_error(self, syntax: RdfSyntax) -> RdfParseError {
        match self {
            StepError::Rio(e) => RdfParseError::Malformed {
                syntax,
                message: e.to_string(),
            },
            StepError::Model(e) => e,
        }
    }
}

/// Parse given document as a graph in given syntax, resolving
/// relative iris against given base.
///
/// Documents in dataset-encoding syntaxes are flattened: triples
/// of every graph are collected into the result.
pub fn parse_graph(
    document: &[u8],
    syntax: RdfSyntax,
    base: Option<&Iri>,
) -> Result<Graph, RdfParseError> {
    match syntax {
        RdfSyntax::Turtle | RdfSyntax::NTriples => {
            let mut graph = Graph::new();
            parse_triples(document, syntax, base, &mut |t| {
                graph.insert(t);
            })?;
            Ok(graph)
        }
        _ => Ok(parse_dataset(document, syntax, base)?
            .quads()
            .map(|q| q.to_triple())
            .collect()),
    }
}

/// Parse given document as a dataset in given syntax, resolving
/// relative iris against given base.
///
/// Documents in graph-encoding syntaxes populate the default
/// graph only.
pub fn parse_dataset(
    document: &[u8],
    syntax: RdfSyntax,
    base: Option<&Iri>,
) -> Result<Dataset, RdfParseError> {
    match syntax {
        RdfSyntax::Turtle | RdfSyntax::NTriples => {
            let mut dataset = Dataset::new();
            parse_triples(document, syntax, base, &mut |t| {
                dataset.insert(Quad::from_triple(None, t));
            })?;
            Ok(dataset)
        }
        RdfSyntax::NQuads | RdfSyntax::TriG => {
            let mut dataset = Dataset::new();
            parse_quads(document, syntax, base, &mut |q| {
                dataset.insert(q);
            })?;
            Ok(dataset)
        }
        RdfSyntax::JsonLd => jsonld::parse_dataset(document, base),
    }
}

fn parse_triples(
    document: &[u8],
    syntax: RdfSyntax,
    base: Option<&Iri>,
    sink: &mut impl FnMut(Triple),
) -> Result<(), RdfParseError> {
    let mut on_triple = |t: rio::Triple<'_>| -> Result<(), StepError> {
        sink(convert_triple(&t, syntax)?);
        Ok(())
    };

    let result = match syntax {
        RdfSyntax::Turtle => TurtleParser::new(document, resolve_base(base)?)
            .parse_all(&mut on_triple),
        RdfSyntax::NTriples => NTriplesParser::new(document).parse_all(&mut on_triple),
        _ => unreachable!("Caller dispatches only graph-encoding syntaxes."),
    };
    result.map_err(|e| e.into_parse_error(syntax))
}

fn parse_quads(
    document: &[u8],
    syntax: RdfSyntax,
    base: Option<&Iri>,
    sink: &mut impl FnMut(Quad),
) -> Result<(), RdfParseError> {
    let mut on_quad = |q: rio::Quad<'_>| -> Result<(), StepError> {
        sink(convert_quad(&q, syntax)?);
        Ok(())
    };

    let result = match syntax {
        RdfSyntax::NQuads => NQuadsParser::new(document).parse_all(&mut on_quad),
        RdfSyntax::TriG => TriGParser::new(document, resolve_base(base)?).parse_all(&mut on_quad),
        _ => unreachable!("Caller dispatches only dataset-encoding syntaxes."),
    };
    result.map_err(|e| e.into_parse_error(syntax))
}

fn resolve_base(base: Option<&Iri>) -> Result<Option<OxIri<String>>, RdfParseError> {
    base.map(|b| {
        OxIri::parse(b.as_str().to_owned())
            .map_err(|_| RdfParseError::InvalidBaseIri(b.as_str().to_owned()))
    })
    .transpose()
}

fn convert_triple(t: &rio::Triple<'_>, syntax: RdfSyntax) -> Result<Triple, StepError> {
    Ok(Triple {
        subject: convert_subject(&t.subject, syntax)?,
        predicate: convert_named(&t.predicate),
        object: convert_term(&t.object, syntax)?,
    })
}

fn convert_quad(q: &rio::Quad<'_>, syntax: RdfSyntax) -> Result<Quad, StepError> {
    Ok(Quad {
        graph_name: q
            .graph_name
            .as_ref()
            .map(|g| convert_graph_name(g, syntax))
            .transpose()?,
        subject: convert_subject(&q.subject, syntax)?,
        predicate: convert_named(&q.predicate),
        object: convert_term(&q.object, syntax)?,
    })
}

fn convert_named(n: &rio::NamedNode<'_>) -> Iri {
    // Rio emits only resolved, validated iris.
    Iri::new_unchecked(n.iri)
}

fn convert_subject(s: &rio::Subject<'_>, syntax: RdfSyntax) -> Result<Term, StepError> {
    match s {
        rio::Subject::NamedNode(n) => Ok(Term::Iri(convert_named(n))),
        rio::Subject::BlankNode(b) => Ok(Term::BlankNode(BlankNode::new(b.id))),
        _ => Err(StepError::Model(RdfParseError::UnsupportedConstruct {
            syntax,
            construct: "quoted triple subject".into(),
        })),
    }
}

fn convert_term(t: &rio::Term<'_>, syntax: RdfSyntax) -> Result<Term, StepError> {
    match t {
        rio::Term::NamedNode(n) => Ok(Term::Iri(convert_named(n))),
        rio::Term::BlankNode(b) => Ok(Term::BlankNode(BlankNode::new(b.id))),
        rio::Term::Literal(l) => Ok(Term::Literal(convert_literal(l))),
        _ => Err(StepError::Model(RdfParseError::UnsupportedConstruct {
            syntax,
            construct: "quoted triple object".into(),
        })),
    }
}

fn convert_literal(l: &rio::Literal<'_>) -> Literal {
    match l {
        rio::Literal::Simple { value } => Literal::simple(value),
        rio::Literal::LanguageTaggedString { value, language } => {
            Literal::language_tagged(value, language)
        }
        rio::Literal::Typed { value, datatype } => {
            Literal::typed(value, convert_named(datatype))
        }
    }
}

fn convert_graph_name(g: &rio::GraphName<'_>, syntax: RdfSyntax) -> Result<Iri, StepError> {
    match g {
        rio::GraphName::NamedNode(n) => Ok(convert_named(n)),
        rio::GraphName::BlankNode(_) => {
            Err(StepError::Model(RdfParseError::UnsupportedConstruct {
                syntax,
                construct: "blank node graph name".into(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use claims::{assert_err, assert_ok};
    use rdf_model::Term;

    use super::*;

    #[test]
    fn turtle_with_relative_iris() {
        let doc = br#"
            @prefix dc: <http://purl.org/dc/terms/> .
            <> dc:title "T" .
        "#;
        let base = Iri::new_unchecked("http://example.org/res");
        let graph = parse_graph(doc, RdfSyntax::Turtle, Some(&base)).unwrap();

        assert_eq!(graph.len(), 1);
        let t = graph.triples().next().unwrap();
        assert_eq!(t.subject, Term::Iri(base));
        assert_eq!(t.predicate.as_str(), "http://purl.org/dc/terms/title");
    }

    #[test]
    fn ntriples_rejects_malformed() {
        let doc = b"<http://ex/s> <http://ex/p> ;";
        assert_err!(parse_graph(doc, RdfSyntax::NTriples, None));
    }

    #[test]
    fn trig_partitions_graphs() {
        let doc = br#"
            @prefix ex: <http://ex/> .
            ex:s ex:p "default" .
            ex:g { ex:s ex:p "named" . }
        "#;
        let dataset = parse_dataset(doc, RdfSyntax::TriG, None).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.graph(None).unwrap().len(), 1);
        assert_eq!(
            dataset
                .graph(Some(&Iri::new_unchecked("http://ex/g")))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn nquads_roundtrip_source() {
        let doc = b"<http://ex/s> <http://ex/p> \"o\" <http://ex/g> .\n";
        assert_ok!(parse_dataset(doc, RdfSyntax::NQuads, None));
    }
}
