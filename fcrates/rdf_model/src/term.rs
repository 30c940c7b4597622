//! I define models for rdf terms.
//!

use std::{fmt::Display, sync::Arc};

use iri_string::types::IriStr;
use once_cell::sync::Lazy;

/// Iri of the `xsd:string` datatype, the implied datatype of
/// simple literals.
pub static XSD_STRING: Lazy<Iri> =
    Lazy::new(|| Iri::new_unchecked("http://www.w3.org/2001/XMLSchema#string"));

/// Iri of the `rdf:langString` datatype, the implied datatype of
/// language tagged literals.
pub static RDF_LANG_STRING: Lazy<Iri> = Lazy::new(|| {
    Iri::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#langString")
});

/// An error in asserting a string as an absolute iri.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Invalid absolute iri: {0}")]
pub struct InvalidIriError(pub String);

/// A validated absolute [rdf iri](https://www.w3.org/TR/rdf11-concepts/#section-IRIs).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Iri(Arc<str>);

impl Iri {
    /// Try to create a new iri from given string, validating it
    /// to be an absolute iri.
    pub fn new(value: impl AsRef<str>) -> Result<Self, InvalidIriError> {
        let value = value.as_ref();
        // `IriStr` admits absolute iris only; references are
        // rejected here and resolved by callers beforehand.
        IriStr::new(value).map_err(|_| InvalidIriError(value.to_owned()))?;
        Ok(Self(Arc::from(value)))
    }

    /// Create a new iri from given string without validation.
    ///
    /// Caller must ensure the string is a valid absolute iri.
    #[inline]
    pub fn new_unchecked(value: impl AsRef<str>) -> Self {
        Self(Arc::from(value.as_ref()))
    }

    /// Get the iri as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve whether this iri starts with given prefix.
    #[inline]
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Get the suffix of this iri after given prefix, if the
    /// prefix matches.
    #[inline]
    pub fn suffix_after(&self, prefix: &str) -> Option<&str> {
        self.0.strip_prefix(prefix)
    }

    /// Get this iri with any fragment part stripped.
    pub fn without_fragment(&self) -> Iri {
        match self.0.split_once('#') {
            Some((base, _)) => Iri(Arc::from(base)),
            None => self.clone(),
        }
    }
}

impl Display for Iri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Iri {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Iri {
    type Error = InvalidIriError;

    #[inline]
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// An rdf [blank node](https://www.w3.org/TR/rdf11-concepts/#section-blank-nodes),
/// identified by a document scoped label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlankNode(Arc<str>);

impl BlankNode {
    /// Create a new blank node with given label.
    #[inline]
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(Arc::from(label.as_ref()))
    }

    /// Get the label of this blank node.
    #[inline]
    pub fn label(&self) -> &str {
        &self.0
    }
}

impl Display for BlankNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// An rdf [literal](https://www.w3.org/TR/rdf11-concepts/#section-Graph-Literal),
/// with a lexical form, a datatype, and an optional language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    lexical: Arc<str>,
    datatype: Iri,
    language: Option<Arc<str>>,
}

impl Literal {
    /// Create a new simple literal, with implied `xsd:string`
    /// datatype.
    #[inline]
    pub fn simple(lexical: impl AsRef<str>) -> Self {
        Self {
            lexical: Arc::from(lexical.as_ref()),
            datatype: XSD_STRING.clone(),
            language: None,
        }
    }

    /// Create a new typed literal with given datatype.
    #[inline]
    pub fn typed(lexical: impl AsRef<str>, datatype: Iri) -> Self {
        Self {
            lexical: Arc::from(lexical.as_ref()),
            datatype,
            language: None,
        }
    }

    /// Create a new language tagged literal. Datatype is implied
    /// to be `rdf:langString`.
    #[inline]
    pub fn language_tagged(lexical: impl AsRef<str>, language: impl AsRef<str>) -> Self {
        Self {
            lexical: Arc::from(lexical.as_ref()),
            datatype: RDF_LANG_STRING.clone(),
            language: Some(Arc::from(language.as_ref())),
        }
    }

    /// Get the lexical form of this literal.
    #[inline]
    pub fn lexical_form(&self) -> &str {
        &self.lexical
    }

    /// Get the datatype of this literal.
    #[inline]
    pub fn datatype(&self) -> &Iri {
        &self.datatype
    }

    /// Get the language tag of this literal, if any.
    #[inline]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", escape_literal(&self.lexical))?;
        if let Some(lang) = &self.language {
            write!(f, "@{}", lang)
        } else if *self.datatype() != *XSD_STRING {
            write!(f, "^^<{}>", self.datatype)
        } else {
            Ok(())
        }
    }
}

/// An rdf term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// An iri term.
    Iri(Iri),

    /// A blank node term.
    BlankNode(BlankNode),

    /// A literal term.
    Literal(Literal),
}

impl Term {
    /// Get the term as an iri, if it is one.
    #[inline]
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Get the term as a blank node, if it is one.
    #[inline]
    pub fn as_blank_node(&self) -> Option<&BlankNode> {
        match self {
            Term::BlankNode(b) => Some(b),
            _ => None,
        }
    }

    /// Get the term as a literal, if it is one.
    #[inline]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(l) => Some(l),
            _ => None,
        }
    }

    /// Resolve whether this term is an iri.
    #[inline]
    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    /// Resolve whether this term is a blank node.
    #[inline]
    pub fn is_blank_node(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }

    /// Resolve whether this term is a literal.
    #[inline]
    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(b) => write!(f, "{}", b),
            Term::Literal(l) => write!(f, "{}", l),
        }
    }
}

impl From<Iri> for Term {
    #[inline]
    fn from(value: Iri) -> Self {
        Term::Iri(value)
    }
}

impl From<BlankNode> for Term {
    #[inline]
    fn from(value: BlankNode) -> Self {
        Term::BlankNode(value)
    }
}

impl From<Literal> for Term {
    #[inline]
    fn from(value: Literal) -> Self {
        Term::Literal(value)
    }
}

/// Escape a literal lexical form per n-triples rules.
fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use claims::{assert_err, assert_ok};

    use super::*;

    #[test]
    fn iri_validation_rejects_relative_refs() {
        assert_err!(Iri::new("/relative/path"));
        assert_err!(Iri::new("not an iri"));
        assert_ok!(Iri::new("http://example.org/a"));
        assert_ok!(Iri::new("trellis:data/x"));
    }

    #[test]
    fn fragment_stripping() {
        let iri = Iri::new_unchecked("http://example.org/g#work");
        assert_eq!(iri.without_fragment().as_str(), "http://example.org/g");
        let plain = Iri::new_unchecked("http://example.org/g");
        assert_eq!(plain.without_fragment(), plain);
    }

    #[test]
    fn literal_display_forms() {
        assert_eq!(Literal::simple("T").to_string(), "\"T\"");
        assert_eq!(Literal::language_tagged("T", "en").to_string(), "\"T\"@en");
        assert_eq!(
            Literal::typed("5", Iri::new_unchecked("http://www.w3.org/2001/XMLSchema#integer"))
                .to_string(),
            "\"5\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
        assert_eq!(Literal::simple("a\"b\nc").to_string(), "\"a\\\"b\\nc\"");
    }
}
