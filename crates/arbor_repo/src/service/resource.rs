//! I define the resource service: the single read/write choke
//! point of the repository, composing the mutable and immutable
//! stores and fanning mutations out into container membership,
//! audit, memento, and event side effects.
//!

use std::{collections::BTreeSet, future::Future, sync::Arc, time::Duration};

use arbor_space::{
    iri, vocab::ldp, vocab::trellis, InteractionModel, Lookup, Resource, ResourceMetadata,
    Session,
};
use chrono::{DateTime, Utc};
use keyed_locker::KeyedLocker;
use rdf_model::{Dataset, Graph, Iri, Quad, Term};
use tracing::{debug, instrument, warn};

use crate::{
    error::RepoError,
    resource::{JoinedResource, StoredResource},
    service::{
        audit,
        constraint::{ConstraintValidator, GraphContext},
        event::{ActivityType, Event, EventService},
        identifier::IdentifierGenerator,
        membership::{containment_edit, membership_edits, MembershipEdit, MembershipUpdate},
    },
    store::{EventSink, ImmutableDataService, MementoService, MutableDataService},
};

/// The typed bundle of persistence collaborators the resource
/// service is constructed over.
#[derive(Clone)]
pub struct ServiceBundle {
    /// The mutable head-state store.
    pub mutable: Arc<dyn MutableDataService>,

    /// The append-only audit store.
    pub immutable: Arc<dyn ImmutableDataService>,

    /// The memento store.
    pub mementos: Arc<dyn MementoService>,

    /// The downstream event bus.
    pub events: Arc<dyn EventSink>,
}

/// Configuration of the resource service.
#[derive(Debug, Clone)]
pub struct ResourceServiceConfig {
    /// The interaction models this deployment admits.
    pub supported_models: BTreeSet<InteractionModel>,

    /// Prefix of minted identifier fragments.
    pub id_prefix: String,

    /// Hierarchy level count of minted identifiers.
    pub id_hierarchy: usize,

    /// Hierarchy segment length of minted identifiers.
    pub id_length: usize,
}

impl Default for ResourceServiceConfig {
    fn default() -> Self {
        Self {
            supported_models: InteractionModel::ALL.into_iter().collect(),
            id_prefix: String::new(),
            id_hierarchy: 0,
            id_length: 0,
        }
    }
}

/// The resource service.
///
/// All mutations of one identifier serialize on a per-identifier
/// write token; mutations of distinct identifiers proceed
/// independently. Container-side edits apply eagerly after the
/// head write and strictly before event emission.
///
/// Deleting a container orphans its children: they remain
/// addressable, and nothing is removed transitively.
pub struct ResourceService {
    mutable: Arc<dyn MutableDataService>,
    immutable: Arc<dyn ImmutableDataService>,
    mementos: Arc<dyn MementoService>,
    events: EventService,
    validator: ConstraintValidator,
    identifiers: IdentifierGenerator,
    locker: KeyedLocker<Iri>,
    supported_models: BTreeSet<InteractionModel>,
}

impl std::fmt::Debug for ResourceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceService")
            .field("supported_models", &self.supported_models)
            .finish()
    }
}

impl ResourceService {
    /// Create a resource service over given collaborators.
    ///
    /// Fails with [`RepoError::FatalConfiguration`] when the
    /// configuration is unusable.
    pub fn new(
        bundle: ServiceBundle,
        config: ResourceServiceConfig,
    ) -> Result<Self, RepoError> {
        if config.supported_models.is_empty() {
            return Err(RepoError::FatalConfiguration(
                "no supported interaction models".into(),
            ));
        }
        let identifiers =
            IdentifierGenerator::new(config.id_prefix, config.id_hierarchy, config.id_length);
        if !identifiers.is_satisfiable() {
            return Err(RepoError::FatalConfiguration(
                "identifier hierarchy exceeds token length".into(),
            ));
        }
        Ok(Self {
            mutable: bundle.mutable,
            immutable: bundle.immutable,
            mementos: bundle.mementos,
            events: EventService::new(bundle.events),
            validator: ConstraintValidator::default(),
            identifiers,
            locker: KeyedLocker::new(),
            supported_models: config.supported_models,
        })
    }

    /// Get the resource at given identifier: the mutable head
    /// state joined with its audit trail.
    ///
    /// Both stores are read concurrently; transient failures
    /// are retried once with jitter.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &Iri) -> Result<Lookup<JoinedResource>, RepoError> {
        let (head, audit) = futures::future::try_join(
            retry_read(|| self.mutable.get(id)),
            retry_read(|| self.immutable.get(id)),
        )
        .await?;

        Ok(match head {
            Lookup::Present(state) => {
                Lookup::Present(JoinedResource::new(state, audit.map(|r| r.dataset)))
            }
            Lookup::Missing => match audit {
                Some(record) => Lookup::Present(JoinedResource::audit_only(record)),
                None => Lookup::Missing,
            },
            Lookup::Deleted => Lookup::Deleted,
        })
    }

    /// Create the resource described by given metadata.
    ///
    /// Fails with [`RepoError::StorageConflict`] when a head
    /// state already exists at the identifier; re-creates over
    /// a tombstone.
    #[instrument(skip(self, dataset, session), fields(id = %metadata.identifier))]
    pub async fn create(
        &self,
        metadata: &ResourceMetadata,
        dataset: Dataset,
        session: &Session,
    ) -> Result<(), RepoError> {
        let _guard = self.locker.write(metadata.identifier.clone()).await;
        let prior = self.mutable.get(&metadata.identifier).await?;
        if prior.is_present() {
            return Err(RepoError::StorageConflict(metadata.identifier.clone()));
        }
        self.write_locked(metadata, dataset, session, prior).await
    }

    /// Replace the head state of the resource described by
    /// given metadata, creating it if absent.
    #[instrument(skip(self, dataset, session), fields(id = %metadata.identifier))]
    pub async fn replace(
        &self,
        metadata: &ResourceMetadata,
        dataset: Dataset,
        session: &Session,
    ) -> Result<(), RepoError> {
        let _guard = self.locker.write(metadata.identifier.clone()).await;
        let prior = self.mutable.get(&metadata.identifier).await?;
        self.write_locked(metadata, dataset, session, prior).await
    }

    /// Delete the resource described by given metadata, leaving
    /// a tombstone. Children of a deleted container are
    /// orphaned, never removed.
    #[instrument(skip(self, session), fields(id = %metadata.identifier))]
    pub async fn delete(
        &self,
        metadata: &ResourceMetadata,
        session: &Session,
    ) -> Result<(), RepoError> {
        let id = &metadata.identifier;
        let _guard = self.locker.write(id.clone()).await;

        let Lookup::Present(prior) = self.mutable.get(id).await? else {
            return Err(RepoError::NotFound(id.clone()));
        };

        self.mutable.delete(id).await?;
        self.immutable
            .add(id, session, audit::deletion(id, session))
            .await?;

        if let Some(container) = prior.container() {
            let retraction = self
                .parent_fan_out(container, id, prior.user_graph(), None, false)
                .await;
            if let Err(e) = retraction {
                warn!("Error in retracting membership for {}: {}", id, e);
            }
        }

        let event = self.shape_event(ActivityType::Delete, &prior, session);
        self.events.emit(event).await;
        Ok(())
    }

    /// Append immutable quads under given identifier, outside
    /// the head state. This is the audit path; no event is
    /// emitted.
    #[instrument(skip(self, session, dataset))]
    pub async fn add(
        &self,
        id: &Iri,
        session: &Session,
        dataset: Dataset,
    ) -> Result<(), RepoError> {
        self.immutable.add(id, session, dataset).await
    }

    /// Advance the modification instant of given identifier
    /// without changing content.
    #[instrument(skip(self))]
    pub async fn touch(&self, id: &Iri) -> Result<(), RepoError> {
        let _guard = self.locker.write(id.clone()).await;
        self.mutable.touch(id, Utc::now()).await
    }

    /// Get the memento of given identifier at given instant.
    pub async fn memento(
        &self,
        id: &Iri,
        time: DateTime<Utc>,
    ) -> Result<Lookup<StoredResource>, RepoError> {
        self.mementos.get(id, time).await
    }

    /// List the versioned instants of given identifier.
    pub async fn mementos(&self, id: &Iri) -> Result<BTreeSet<DateTime<Utc>>, RepoError> {
        self.mementos.mementos(id).await
    }

    /// Replace a blank node with its stable skolem iri.
    #[inline]
    pub fn skolemize(&self, term: Term) -> Term {
        iri::skolemize(term)
    }

    /// Replace a skolem iri with its blank node.
    #[inline]
    pub fn unskolemize(&self, term: Term) -> Term {
        iri::unskolemize(term)
    }

    /// Rewrite a term from public into internal form.
    #[inline]
    pub fn to_internal(&self, term: Term, base_url: &str) -> Term {
        iri::to_internal(term, base_url)
    }

    /// Rewrite a term from internal into public form.
    #[inline]
    pub fn to_external(&self, term: Term, base_url: &str) -> Term {
        iri::to_external(term, base_url)
    }

    /// The interaction models this deployment admits.
    #[inline]
    pub fn supported_interaction_models(&self) -> &BTreeSet<InteractionModel> {
        &self.supported_models
    }

    /// Mint a new internal path fragment.
    #[inline]
    pub fn generate_identifier(&self) -> String {
        self.identifiers.generate()
    }

    /// The locked tail of the write path. `prior` is the head
    /// state read under the caller-held write token.
    async fn write_locked(
        &self,
        metadata: &ResourceMetadata,
        dataset: Dataset,
        session: &Session,
        prior: Lookup<StoredResource>,
    ) -> Result<(), RepoError> {
        if !self.supported_models.contains(&metadata.interaction_model) {
            return Err(RepoError::FatalConfiguration(format!(
                "unsupported interaction model for {}",
                metadata.identifier
            )));
        }

        // The interaction model is immutable after create.
        if let Lookup::Present(p) = &prior {
            if p.interaction_model() != metadata.interaction_model {
                return Err(RepoError::StorageConflict(metadata.identifier.clone()));
            }
        }

        // Optimistic concurrency, when the caller supplied an
        // expected revision.
        if let Some(expected) = &metadata.revision {
            match &prior {
                Lookup::Present(p) if p.revision() == expected => {}
                _ => return Err(RepoError::StorageConflict(metadata.identifier.clone())),
            }
        }

        let state = self.assemble_state(metadata, dataset, &prior)?;
        let was_present = prior.is_present();

        // Fan the parent-side edits out around the head write:
        // child-targeted edits land inside the head state
        // itself, container-side edits follow it.
        let prior_user_graph = prior.as_ref().present().and_then(|p| p.user_graph());
        let mut state = state;
        if let Some(container) = metadata.container.clone() {
            let user_graph = state.user_graph().cloned().unwrap_or_default();
            self.parent_fan_out_into(
                &container,
                &mut state,
                prior_user_graph,
                Some(&user_graph),
                !was_present,
            )
            .await?;
        }

        self.mutable.replace(state.clone()).await?;

        let audit_quads = if was_present {
            audit::update(&metadata.identifier, session)
        } else {
            audit::creation(&metadata.identifier, session)
        };
        self.immutable
            .add(&metadata.identifier, session, audit_quads)
            .await?;

        // Mementos are advisory: a rejected snapshot does not
        // fail the mutation.
        if let Err(e) = self.mementos.put(&state).await {
            warn!(
                "Error in snapshotting {} at {}: {}",
                metadata.identifier,
                state.modified(),
                e
            );
        }

        let activity = if was_present {
            ActivityType::Update
        } else {
            ActivityType::Create
        };
        let event = self.shape_event(activity, &state, session);
        self.events.emit(event).await;
        Ok(())
    }

    /// Assemble the new head state: user and access control
    /// graphs from the caller, server managed graphs carried
    /// from the prior state, and a monotonic modification
    /// instant.
    fn assemble_state(
        &self,
        metadata: &ResourceMetadata,
        dataset: Dataset,
        prior: &Lookup<StoredResource>,
    ) -> Result<StoredResource, RepoError> {
        let id = &metadata.identifier;

        // Caller-supplied statements: the default graph counts
        // as user managed; server managed graphs are stripped.
        let mut user_graph = Graph::new();
        let mut acl_graph: Option<Graph> = None;
        for (name, graph) in dataset.graphs() {
            match name {
                None => user_graph.extend(graph.triples().cloned()),
                Some(n) if *n == *trellis::PREFER_USER_MANAGED => {
                    user_graph.extend(graph.triples().cloned())
                }
                Some(n) if *n == *trellis::PREFER_ACCESS_CONTROL => {
                    acl_graph = Some(graph.clone())
                }
                Some(n) => {
                    debug!("Stripping caller-supplied server managed graph {}", n);
                }
            }
        }

        let mut violations = self.validator.violations(
            id,
            metadata.interaction_model,
            &user_graph,
            GraphContext::UserManaged,
        );
        if let Some(acl) = &acl_graph {
            violations.extend(self.validator.violations(
                id,
                metadata.interaction_model,
                acl,
                GraphContext::AccessControl,
            ));
        }
        if !violations.is_empty() {
            return Err(RepoError::ConstraintViolation(violations));
        }

        let mut assembled = Dataset::new();
        if !user_graph.is_empty() {
            assembled.set_graph(Some(trellis::PREFER_USER_MANAGED.clone()), user_graph);
        }
        if let Some(acl) = acl_graph {
            assembled.set_graph(Some(trellis::PREFER_ACCESS_CONTROL.clone()), acl);
        }

        // Server managed graphs survive a replace.
        if let Lookup::Present(p) = prior {
            for name in [&*ldp::PREFER_CONTAINMENT, &*trellis::PREFER_SERVER_MANAGED] {
                if let Some(carried) = p.dataset().graph(Some(name)) {
                    assembled.set_graph(Some(name.clone()), carried.clone());
                }
            }
        }

        // The interaction model statement is server authored.
        assembled.insert(Quad::new(
            Some(trellis::PREFER_SERVER_MANAGED.clone()),
            id.clone(),
            arbor_space::vocab::rdf::TYPE.clone(),
            metadata.interaction_model.iri(),
        ));

        let mut modified = Utc::now();
        if let Lookup::Present(p) = prior {
            if modified <= p.modified() {
                modified = p.modified() + chrono::Duration::milliseconds(1);
            }
        }

        Ok(StoredResource::from_parts(metadata, modified, assembled))
    }

    /// Apply the container fan-out of a child write, folding
    /// child-targeted edits into the pending head state.
    async fn parent_fan_out_into(
        &self,
        container: &Iri,
        state: &mut StoredResource,
        graph_before: Option<&Graph>,
        graph_after: Option<&Graph>,
        created: bool,
    ) -> Result<(), RepoError> {
        let child_id = state.identifier().clone();
        let (asserts, retracts) = self
            .apply_parent_edits(container, &child_id, graph_before, graph_after, created, false)
            .await?;
        // Stale child-side statements were carried over from the
        // prior server managed graph; retract before asserting.
        for edit in retracts {
            state
                .dataset_mut()
                .remove(&Quad::from_triple(Some(edit.graph), edit.triple));
        }
        for edit in asserts {
            state
                .dataset_mut()
                .insert(Quad::from_triple(Some(edit.graph), edit.triple));
        }
        Ok(())
    }

    /// Apply the container fan-out of a child delete.
    async fn parent_fan_out(
        &self,
        container: &Iri,
        child_id: &Iri,
        graph_before: Option<&Graph>,
        graph_after: Option<&Graph>,
        created: bool,
    ) -> Result<(), RepoError> {
        self.apply_parent_edits(container, child_id, graph_before, graph_after, created, true)
            .await?;
        Ok(())
    }

    /// Compute and apply membership and containment edits for a
    /// child mutation. Returns the `(assertions, retractions)`
    /// targeting the child itself, which the caller folds into
    /// the child's pending state (or discards on delete).
    ///
    /// The parent is edited under its own write token; edits of
    /// a distinct membership resource apply eagerly without one
    /// (§ the stores only promise per-call atomicity), and may
    /// be observed out of order but always before the event.
    async fn apply_parent_edits(
        &self,
        container: &Iri,
        child_id: &Iri,
        graph_before: Option<&Graph>,
        graph_after: Option<&Graph>,
        created: bool,
        deleted: bool,
    ) -> Result<(Vec<MembershipEdit>, Vec<MembershipEdit>), RepoError> {
        let _parent_guard = self.locker.write(container.clone()).await;
        let Lookup::Present(parent) = self.mutable.get(container).await? else {
            // Orphaned child: no container to maintain.
            debug!("No parent container at {}; skipping fan-out", container);
            return Ok((Vec::new(), Vec::new()));
        };

        let now = Utc::now();
        let empty = Graph::new();
        let retractions: MembershipUpdate = if created {
            MembershipUpdate::default()
        } else {
            membership_edits(&parent, child_id, graph_before.unwrap_or(&empty))
        };
        let assertions: MembershipUpdate = if deleted {
            MembershipUpdate::default()
        } else {
            membership_edits(&parent, child_id, graph_after.unwrap_or(&empty))
        };

        let mut parent_state = parent;
        let mut parent_dirty = false;
        let mut child_asserts = Vec::new();
        let mut child_retracts = Vec::new();
        let mut touched: BTreeSet<Iri> = BTreeSet::new();

        // Containment tracks existence transitions only.
        if created || deleted {
            if let Some(edit) = containment_edit(&parent_state, child_id) {
                let quad = Quad::from_triple(Some(edit.graph), edit.triple);
                if deleted {
                    parent_state.dataset_mut().remove(&quad);
                } else {
                    parent_state.dataset_mut().insert(quad);
                }
                parent_dirty = true;
            }
        }

        for (edits, retracting) in [(&retractions.edits, true), (&assertions.edits, false)] {
            for edit in edits {
                if edit.target == *child_id {
                    if retracting {
                        child_retracts.push(edit.clone());
                    } else {
                        child_asserts.push(edit.clone());
                    }
                } else if edit.target == *parent_state.identifier() {
                    let quad = Quad::from_triple(Some(edit.graph.clone()), edit.triple.clone());
                    if retracting {
                        parent_state.dataset_mut().remove(&quad);
                    } else {
                        parent_state.dataset_mut().insert(quad);
                    }
                    parent_dirty = true;
                } else {
                    // A no-op edit leaves the target's modified
                    // untouched; the touch loop below covers it.
                    if self.edit_foreign_target(edit, retracting, now).await? {
                        touched.insert(edit.target.clone());
                    }
                }
            }
        }

        if parent_dirty {
            parent_state.advance(now);
            self.mutable.replace(parent_state).await?;
        }

        for target in retractions
            .touch
            .iter()
            .chain(assertions.touch.iter())
            .filter(|t| !touched.contains(*t) && *t != container && *t != child_id)
        {
            if let Err(e) = self.mutable.touch(target, now).await {
                if matches!(e, RepoError::NotFound(_)) {
                    debug!("Membership resource {} absent; skipping touch", target);
                } else {
                    return Err(e);
                }
            }
        }
        Ok((child_asserts, child_retracts))
    }

    /// Read-modify-write an edit against a resource that is
    /// neither the child nor the parent container. Returns
    /// whether the target's state actually changed (and thus
    /// its `modified` already advanced).
    async fn edit_foreign_target(
        &self,
        edit: &MembershipEdit,
        retracting: bool,
        now: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let Lookup::Present(mut target) = self.mutable.get(&edit.target).await? else {
            debug!(
                "Membership resource {} absent; dropping edit",
                edit.target
            );
            return Ok(false);
        };
        let quad = Quad::from_triple(Some(edit.graph.clone()), edit.triple.clone());
        let changed = if retracting {
            target.dataset_mut().remove(&quad)
        } else {
            target.dataset_mut().insert(quad)
        };
        if changed {
            target.advance(now);
            self.mutable.replace(target).await?;
        }
        Ok(changed)
    }

    /// Shape the event of a committed mutation.
    fn shape_event(
        &self,
        activity: ActivityType,
        state: &StoredResource,
        session: &Session,
    ) -> Event {
        let object = match session.property(arbor_space::session::BASE_URL_PROPERTY) {
            Some(base) => match iri::to_external(Term::Iri(state.identifier().clone()), base) {
                Term::Iri(external) => external,
                _ => state.identifier().clone(),
            },
            None => state.identifier().clone(),
        };

        let mut object_types = vec![state.interaction_model().iri()];
        if state.interaction_model().is_container() {
            object_types.push(ldp::CONTAINER.clone());
        }
        object_types.push(ldp::RESOURCE.clone());

        let mut event = Event::new(activity, vec![session.agent().clone()], object, object_types);
        if let Some(Term::Iri(inbox)) = state.user_graph().and_then(|g| {
            g.first_object(&Term::Iri(state.identifier().clone()), &ldp::INBOX)
                .cloned()
        }) {
            event = event.with_inbox(inbox);
        }
        event
    }
}

/// Retry an idempotent read once with jitter on a transient
/// failure.
async fn retry_read<T, F, Fut>(op: F) -> Result<T, RepoError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, RepoError>>,
{
    match op().await {
        Err(e) if e.is_transient() => {
            let jitter = {
                use rand::Rng;
                rand::thread_rng().gen_range(5..50)
            };
            warn!("Transient storage error on read; retrying once: {}", e);
            tokio::time::sleep(Duration::from_millis(jitter)).await;
            op().await
        }
        other => other,
    }
}
