//! I define the registry of concrete rdf syntaxes supported at
//! run time.
//!

use std::fmt::Display;

use mime::Mime;
use once_cell::sync::Lazy;

/// Media type of turtle documents.
pub static TEXT_TURTLE: Lazy<Mime> = Lazy::new(|| "text/turtle".parse().expect("Claimed valid."));

/// Media type of n-triples documents.
pub static APPLICATION_N_TRIPLES: Lazy<Mime> =
    Lazy::new(|| "application/n-triples".parse().expect("Claimed valid."));

/// Media type of n-quads documents.
pub static APPLICATION_N_QUADS: Lazy<Mime> =
    Lazy::new(|| "application/n-quads".parse().expect("Claimed valid."));

/// Media type of trig documents.
pub static APPLICATION_TRIG: Lazy<Mime> =
    Lazy::new(|| "application/trig".parse().expect("Claimed valid."));

/// Media type of json-ld documents.
pub static APPLICATION_LD_JSON: Lazy<Mime> =
    Lazy::new(|| "application/ld+json".parse().expect("Claimed valid."));

/// A concrete rdf syntax in which graphs or datasets can be
/// serialized unambiguously.
///
/// See <https://www.w3.org/TR/rdf11-concepts/#rdf-documents>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RdfSyntax {
    /// RDF 1.1 Turtle.
    ///
    /// Spec: <http://www.w3.org/TR/turtle/>
    Turtle,

    /// RDF 1.1 N-Triples.
    ///
    /// Spec: <https://www.w3.org/TR/n-triples/>
    NTriples,

    /// RDF 1.1 N-Quads.
    ///
    /// Spec: <https://www.w3.org/TR/n-quads/>
    NQuads,

    /// RDF 1.1 TriG.
    ///
    /// Spec: <https://www.w3.org/TR/trig/>
    TriG,

    /// JSON-LD 1.1.
    ///
    /// Spec: <https://www.w3.org/TR/json-ld/>
    JsonLd,
}

impl RdfSyntax {
    /// All syntaxes this crate can parse.
    pub const PARSABLE: [RdfSyntax; 5] = [
        RdfSyntax::Turtle,
        RdfSyntax::NTriples,
        RdfSyntax::NQuads,
        RdfSyntax::TriG,
        RdfSyntax::JsonLd,
    ];

    /// All syntaxes this crate can serialize.
    pub const SERIALIZABLE: [RdfSyntax; 5] = Self::PARSABLE;

    /// Get the preferred media type of this syntax.
    pub fn media_type(&self) -> &'static Mime {
        match self {
            RdfSyntax::Turtle => &TEXT_TURTLE,
            RdfSyntax::NTriples => &APPLICATION_N_TRIPLES,
            RdfSyntax::NQuads => &APPLICATION_N_QUADS,
            RdfSyntax::TriG => &APPLICATION_TRIG,
            RdfSyntax::JsonLd => &APPLICATION_LD_JSON,
        }
    }

    /// Resolve the syntax corresponding to given media type, if
    /// it is known.
    pub fn from_media_type(mime: &Mime) -> Option<Self> {
        let essence = mime.essence_str();
        Self::PARSABLE
            .into_iter()
            .find(|s| s.media_type().essence_str() == essence)
    }

    /// Resolve whether documents in this syntax encode datasets
    /// (as opposed to plain graphs).
    pub fn is_dataset_encoding(&self) -> bool {
        matches!(self, RdfSyntax::NQuads | RdfSyntax::TriG | RdfSyntax::JsonLd)
    }
}

impl Display for RdfSyntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.media_type())
    }
}

/// An error indicating given syntax is not supported in given
/// context.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unsupported rdf syntax: {0}")]
pub struct UnsupportedSyntaxError(pub RdfSyntax);

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("text/turtle", Some(RdfSyntax::Turtle))]
    #[case("text/turtle; charset=utf-8", Some(RdfSyntax::Turtle))]
    #[case("application/n-triples", Some(RdfSyntax::NTriples))]
    #[case("application/ld+json", Some(RdfSyntax::JsonLd))]
    #[case("text/html", None)]
    fn media_type_correspondence(#[case] mt: &str, #[case] expected: Option<RdfSyntax>) {
        let mime: Mime = mt.parse().unwrap();
        assert_eq!(RdfSyntax::from_media_type(&mime), expected);
    }

    #[test]
    fn dataset_encodings() {
        assert!(!RdfSyntax::Turtle.is_dataset_encoding());
        assert!(RdfSyntax::TriG.is_dataset_encoding());
        assert!(RdfSyntax::NQuads.is_dataset_encoding());
    }
}
