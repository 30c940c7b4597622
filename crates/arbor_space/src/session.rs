//! I define the session context of acting agents.
//!

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rdf_model::Iri;
use uuid::Uuid;

use crate::{iri::SESSION_PREFIX, vocab::trellis};

/// Property key under which the public base url of the request
/// is carried.
pub const BASE_URL_PROPERTY: &str = "baseURL";

/// An immutable record of the acting agent of an operation: the
/// agent, an optional delegator, the creation instant, and a
/// small property bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    identifier: Iri,
    agent: Iri,
    delegated_by: Option<Iri>,
    created: DateTime<Utc>,
    properties: BTreeMap<String, String>,
}

impl Session {
    /// Create a new session for given agent.
    pub fn new(agent: Iri) -> Self {
        Self {
            identifier: Iri::new_unchecked(format!("{}{}", SESSION_PREFIX, Uuid::new_v4())),
            agent,
            delegated_by: None,
            created: Utc::now(),
            properties: BTreeMap::new(),
        }
    }

    /// Create a new session for the anonymous agent.
    pub fn anonymous() -> Self {
        Self::new(trellis::ANONYMOUS_AGENT.clone())
    }

    /// Set the delegating agent: the session's agent acts on
    /// behalf of the delegator.
    pub fn with_delegated_by(mut self, delegator: Iri) -> Self {
        self.delegated_by = Some(delegator);
        self
    }

    /// Set a session property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Get the session identifier.
    #[inline]
    pub fn identifier(&self) -> &Iri {
        &self.identifier
    }

    /// Get the acting agent.
    #[inline]
    pub fn agent(&self) -> &Iri {
        &self.agent
    }

    /// Get the delegating agent, if any.
    #[inline]
    pub fn delegated_by(&self) -> Option<&Iri> {
        self.delegated_by.as_ref()
    }

    /// Get the creation instant.
    #[inline]
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Get a session property.
    #[inline]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Resolve whether this session acts as the anonymous agent.
    #[inline]
    pub fn is_anonymous(&self) -> bool {
        self.agent == *trellis::ANONYMOUS_AGENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_live_under_session_partition() {
        let session = Session::anonymous();
        assert!(session.identifier().has_prefix(SESSION_PREFIX));
        assert!(session.is_anonymous());
    }

    #[test]
    fn sessions_are_distinct() {
        let a = Session::anonymous();
        let b = Session::anonymous();
        assert_ne!(a.identifier(), b.identifier());
    }

    #[test]
    fn properties_and_delegation() {
        let session = Session::new(Iri::new_unchecked("http://h/webid"))
            .with_delegated_by(Iri::new_unchecked("http://h/boss"))
            .with_property(BASE_URL_PROPERTY, "http://h/");

        assert_eq!(session.property(BASE_URL_PROPERTY), Some("http://h/"));
        assert_eq!(
            session.delegated_by().map(Iri::as_str),
            Some("http://h/boss")
        );
        assert!(!session.is_anonymous());
    }
}
