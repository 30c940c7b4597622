//! I define the web access control engine.
//!

use std::collections::BTreeSet;
use std::sync::Arc;

use arbor_repo::{error::RepoError, store::MutableDataService};
use arbor_space::{
    iri,
    vocab::{acl, foaf, rdf, trellis, vcard},
    Lookup, Resource, Session,
};
use rdf_model::{Graph, Iri, Term};
use tracing::{debug, instrument};

use crate::mode::AccessMode;

/// Configuration of the engine.
#[derive(Debug, Clone, Default)]
pub struct WebAcConfig {
    /// Agents granted every mode unconditionally.
    pub administrators: BTreeSet<Iri>,
}

/// The resolved effective acl of a target: the acl graph, and
/// the resource it was found on.
#[derive(Debug, Clone)]
struct EffectiveAcl {
    subject: Iri,
    graph: Graph,
}

/// The web access control engine.
///
/// Resolves the effective acl of a target by walking the
/// container ancestry, then unions the modes of every
/// authorization matching the session agent.
pub struct WebAcEngine {
    store: Arc<dyn MutableDataService>,
    administrators: BTreeSet<Iri>,
}

impl std::fmt::Debug for WebAcEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebAcEngine")
            .field("administrators", &self.administrators)
            .finish()
    }
}

impl WebAcEngine {
    /// Create an engine over given head-state store.
    ///
    /// Fails with [`RepoError::FatalConfiguration`] when no
    /// administrator identifier is set.
    pub fn new(
        store: Arc<dyn MutableDataService>,
        config: WebAcConfig,
    ) -> Result<Self, RepoError> {
        if config.administrators.is_empty() {
            return Err(RepoError::FatalConfiguration(
                "no administrator identifier set".into(),
            ));
        }
        Ok(Self {
            store,
            administrators: config.administrators,
        })
    }

    /// Resolve the set of access modes granted to the session's
    /// agent over given target.
    #[instrument(skip(self, session), fields(agent = %session.agent()))]
    pub async fn access_modes(
        &self,
        target: &Iri,
        session: &Session,
    ) -> Result<BTreeSet<AccessMode>, RepoError> {
        if self.is_administrator(session) {
            return Ok(AccessMode::ALL.into_iter().collect());
        }

        let Some(effective) = self.resolve_effective_acl(target).await? else {
            debug!("No effective acl for {}; granting no modes", target);
            return Ok(BTreeSet::new());
        };

        // Own acl applies through accessTo; an ancestor's
        // through default, inherited by descendants.
        let access_predicate = if effective.subject == *target {
            &*acl::ACCESS_TO
        } else {
            &*acl::DEFAULT
        };

        let mut modes = BTreeSet::new();
        let subject_term = Term::Iri(effective.subject.clone());
        for auth in authorization_nodes(&effective.graph) {
            if effective
                .graph
                .matching(Some(&auth), Some(access_predicate), Some(&subject_term))
                .next()
                .is_none()
            {
                continue;
            }
            if !self.matches_session(&effective.graph, &auth, session).await? {
                continue;
            }
            modes.extend(
                effective
                    .graph
                    .objects(&auth, &acl::MODE)
                    .filter_map(|m| m.as_iri())
                    .filter_map(AccessMode::from_iri),
            );
        }

        // Write subsumes append in the response lattice.
        if modes.contains(&AccessMode::Write) {
            modes.insert(AccessMode::Append);
        }
        Ok(modes)
    }

    /// An administrator session is granted everything. A
    /// delegated session qualifies only when delegator and
    /// agent both do.
    fn is_administrator(&self, session: &Session) -> bool {
        if session.agent() == &*trellis::ADMINISTRATOR_AGENT
            || self.administrators.contains(session.agent())
        {
            return match session.delegated_by() {
                Some(delegator) => self.administrators.contains(delegator),
                None => true,
            };
        }
        false
    }

    /// Walk the ancestor chain from the target until a resource
    /// carrying an acl graph is found.
    async fn resolve_effective_acl(
        &self,
        target: &Iri,
    ) -> Result<Option<EffectiveAcl>, RepoError> {
        let mut candidate = Some(target.clone());
        while let Some(subject) = candidate {
            if let Lookup::Present(state) = self.store.get(&subject).await? {
                if state.has_acl() {
                    if let Some(graph) = state
                        .dataset()
                        .graph(Some(&trellis::PREFER_ACCESS_CONTROL))
                    {
                        return Ok(Some(EffectiveAcl {
                            subject,
                            graph: graph.clone(),
                        }));
                    }
                }
            }
            candidate = iri::parent_of(&subject);
        }
        Ok(None)
    }

    /// Resolve whether given authorization matches the session:
    /// the agent must match, and under delegation the delegator
    /// must too.
    async fn matches_session(
        &self,
        acl_graph: &Graph,
        auth: &Term,
        session: &Session,
    ) -> Result<bool, RepoError> {
        if !self.matches_agent(acl_graph, auth, session.agent()).await? {
            return Ok(false);
        }
        if let Some(delegator) = session.delegated_by() {
            return self.matches_agent(acl_graph, auth, delegator).await;
        }
        Ok(true)
    }

    /// Resolve whether given authorization matches given agent
    /// through any of its subject attributes. An authorization
    /// defining none is inert.
    async fn matches_agent(
        &self,
        acl_graph: &Graph,
        auth: &Term,
        agent: &Iri,
    ) -> Result<bool, RepoError> {
        let agent_term = Term::Iri(agent.clone());
        let is_anonymous = *agent == *trellis::ANONYMOUS_AGENT;

        if acl_graph
            .matching(Some(auth), Some(&acl::AGENT), Some(&agent_term))
            .next()
            .is_some()
        {
            return Ok(true);
        }

        for class in acl_graph.objects(auth, &acl::AGENT_CLASS) {
            let Some(class) = class.as_iri() else { continue };
            if *class == *foaf::AGENT {
                return Ok(true);
            }
            if *class == *acl::AUTHENTICATED_AGENT && !is_anonymous {
                return Ok(true);
            }
        }

        for group in acl_graph.objects(auth, &acl::AGENT_GROUP) {
            let Some(group) = group.as_iri() else { continue };
            if self.group_has_member(group, &agent_term).await? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Resolve whether the agent group listing at given iri
    /// names the agent through `vcard:hasMember`. The listing
    /// document is fetched from the head-state store.
    async fn group_has_member(&self, group: &Iri, agent: &Term) -> Result<bool, RepoError> {
        let document = group.without_fragment();
        let Lookup::Present(state) = self.store.get(&document).await? else {
            debug!("Agent group listing {} absent", document);
            return Ok(false);
        };
        let group_term = Term::Iri(group.clone());
        let found = state
            .dataset()
            .graph(Some(&trellis::PREFER_USER_MANAGED))
            .is_some_and(|g| {
                g.matching(Some(&group_term), Some(&vcard::HAS_MEMBER), Some(agent))
                    .next()
                    .is_some()
            });
        Ok(found)
    }
}

/// Collect the authorization nodes of an acl graph: subjects
/// typed `acl:Authorization`, blank or named.
fn authorization_nodes(acl_graph: &Graph) -> Vec<Term> {
    let authorization = Term::Iri(acl::AUTHORIZATION.clone());
    acl_graph
        .matching(None, Some(&rdf::TYPE), Some(&authorization))
        .map(|t| t.subject.clone())
        .collect()
}
