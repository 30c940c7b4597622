//! I define the revision token of resource states.
//!

use std::fmt::Display;

use chrono::{DateTime, SecondsFormat, Utc};
use rdf_model::Iri;

/// An opaque token unique to a `(identifier, state)` pair; the
/// source of etags. Changes on every accepted mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision(String);

impl Revision {
    /// Derive the default revision of given identifier at given
    /// modification instant.
    pub fn derive(modified: DateTime<Utc>, identifier: &Iri) -> Self {
        Self(format!(
            "{}::{}",
            modified.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            identifier
        ))
    }

    /// Create a revision from an already-derived token.
    #[inline]
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the token as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn distinct_instants_yield_distinct_revisions() {
        let id = Iri::new_unchecked("trellis:data/x");
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let t1 = t0 + chrono::Duration::milliseconds(1);

        assert_ne!(Revision::derive(t0, &id), Revision::derive(t1, &id));
        assert_eq!(Revision::derive(t0, &id), Revision::derive(t0, &id));
    }

    #[test]
    fn distinct_identifiers_yield_distinct_revisions() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_ne!(
            Revision::derive(t, &Iri::new_unchecked("trellis:data/x")),
            Revision::derive(t, &Iri::new_unchecked("trellis:data/y"))
        );
    }
}
