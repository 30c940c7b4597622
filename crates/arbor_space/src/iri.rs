//! I define the iri partitioning scheme of arbor spaces, along
//! with the rewriting and skolemization helpers over it.
//!
//! Persisted identifiers live under `trellis:data/`; blank node
//! skolems under `trellis:bnode/`; session identifiers under
//! `trellis:session/`. The public base url is an out-of-band
//! configuration value, and `to_internal`/`to_external` form a
//! bijection between the two forms that preserves the path
//! suffix.
//!

use rdf_model::{BlankNode, Iri, Term};

/// Prefix of internal data identifiers.
pub const DATA_PREFIX: &str = "trellis:data/";

/// Prefix of blank node skolem iris.
pub const BNODE_PREFIX: &str = "trellis:bnode/";

/// Prefix of session identifiers.
pub const SESSION_PREFIX: &str = "trellis:session/";

/// Resolve whether given iri is an internal data identifier.
#[inline]
pub fn is_internal_data(iri: &Iri) -> bool {
    iri.has_prefix(DATA_PREFIX)
}

/// Resolve whether given iri is a blank node skolem.
#[inline]
pub fn is_skolem(iri: &Iri) -> bool {
    iri.has_prefix(BNODE_PREFIX)
}

/// Normalize a base url to end with exactly one slash.
fn normalized_base(base_url: &str) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}

/// Rewrite given term from external (public base url) form into
/// internal form. Terms outside the base url, and non-iri
/// terms, pass through untouched.
pub fn to_internal(term: Term, base_url: &str) -> Term {
    match term {
        Term::Iri(iri) => {
            let base = normalized_base(base_url);
            match iri.suffix_after(&base) {
                Some(suffix) => Term::Iri(Iri::new_unchecked(format!("{}{}", DATA_PREFIX, suffix))),
                None => Term::Iri(iri),
            }
        }
        other => other,
    }
}

/// Rewrite given term from internal form into external (public
/// base url) form. Terms outside the internal data partition,
/// and non-iri terms, pass through untouched.
pub fn to_external(term: Term, base_url: &str) -> Term {
    match term {
        Term::Iri(iri) => match iri.suffix_after(DATA_PREFIX) {
            Some(suffix) => Term::Iri(Iri::new_unchecked(format!(
                "{}{}",
                normalized_base(base_url),
                suffix
            ))),
            None => Term::Iri(iri),
        },
        other => other,
    }
}

/// Replace a blank node with its stable skolem iri. Other terms
/// pass through untouched.
pub fn skolemize(term: Term) -> Term {
    match term {
        Term::BlankNode(b) => {
            Term::Iri(Iri::new_unchecked(format!("{}{}", BNODE_PREFIX, b.label())))
        }
        other => other,
    }
}

/// Replace a skolem iri with its blank node. Other terms pass
/// through untouched.
pub fn unskolemize(term: Term) -> Term {
    match term {
        Term::Iri(iri) => match iri.suffix_after(BNODE_PREFIX) {
            Some(label) => Term::BlankNode(BlankNode::new(label)),
            None => Term::Iri(iri),
        },
        other => other,
    }
}

/// Walk one step up the logical container hierarchy of given
/// internal identifier: strip the last `/`-delimited segment.
/// Returns `None` at the partition root.
pub fn parent_of(iri: &Iri) -> Option<Iri> {
    let suffix = iri.suffix_after(DATA_PREFIX)?;
    let trimmed = suffix.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rsplit_once('/') {
        Some((parent, _)) => Some(Iri::new_unchecked(format!("{}{}", DATA_PREFIX, parent))),
        None => Some(Iri::new_unchecked(DATA_PREFIX)),
    }
}
