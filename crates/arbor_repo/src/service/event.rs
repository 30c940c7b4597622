//! I define the event service shaping mutations into
//! activitystreams envelopes and handing them to the downstream
//! bus.
//!

use std::sync::Arc;

use arbor_space::vocab::activitystreams;
use chrono::{DateTime, SecondsFormat, Utc};
use rdf_model::Iri;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::store::EventSink;

/// The json-ld context of activitystreams 2.0.
pub const ACTIVITYSTREAMS_CONTEXT: &str = "https://www.w3.org/ns/activitystreams";

/// The kind of activity a mutation performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityType {
    /// A resource was created.
    Create,

    /// A resource was updated.
    Update,

    /// A resource was deleted.
    Delete,
}

impl ActivityType {
    /// Get the activitystreams iri of this activity type.
    pub fn iri(&self) -> Iri {
        match self {
            ActivityType::Create => activitystreams::CREATE.clone(),
            ActivityType::Update => activitystreams::UPDATE.clone(),
            ActivityType::Delete => activitystreams::DELETE.clone(),
        }
    }
}

/// A mutation event, before envelope shaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Fresh identifier of the event itself.
    pub identifier: Iri,

    /// Instant of the mutation.
    pub created: DateTime<Utc>,

    /// What happened.
    pub activity: ActivityType,

    /// The acting agents.
    pub actors: Vec<Iri>,

    /// The mutated resource, in external form.
    pub object: Iri,

    /// The ldp types of the mutated resource.
    pub object_types: Vec<Iri>,

    /// The advertised inbox of the resource, if any.
    pub inbox: Option<Iri>,
}

impl Event {
    /// Create an event with a fresh `urn:uuid:` identifier.
    pub fn new(
        activity: ActivityType,
        actors: Vec<Iri>,
        object: Iri,
        object_types: Vec<Iri>,
    ) -> Self {
        Self {
            identifier: Iri::new_unchecked(format!("urn:uuid:{}", Uuid::new_v4())),
            created: Utc::now(),
            activity,
            actors,
            object,
            object_types,
            inbox: None,
        }
    }

    /// Set the advertised inbox.
    pub fn with_inbox(mut self, inbox: Iri) -> Self {
        self.inbox = Some(inbox);
        self
    }
}

/// Serialize an iri as a bare term when it falls under the
/// activitystreams namespace, as a full iri otherwise.
fn as_term(iri: &Iri) -> String {
    match iri.suffix_after(activitystreams::NS) {
        Some(local) => local.to_owned(),
        None => iri.as_str().to_owned(),
    }
}

/// The object member of an envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventObject {
    /// Identifier of the mutated resource.
    pub id: String,

    /// Its types, as bare terms or full iris.
    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
}

/// The activitystreams 2.0 wire envelope of an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventEnvelope {
    /// The json-ld context.
    #[serde(rename = "@context")]
    pub context: String,

    /// Identifier of the event.
    pub id: String,

    /// The activity types.
    #[serde(rename = "type")]
    pub types: Vec<String>,

    /// The acting agents.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actor: Vec<String>,

    /// The mutated resource.
    pub object: EventObject,

    /// Publication instant, rfc 3339.
    pub published: String,

    /// The advertised inbox, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbox: Option<String>,
}

impl From<&Event> for EventEnvelope {
    fn from(event: &Event) -> Self {
        Self {
            context: ACTIVITYSTREAMS_CONTEXT.to_owned(),
            id: event.identifier.as_str().to_owned(),
            types: vec![as_term(&event.activity.iri())],
            actor: event.actors.iter().map(|a| a.as_str().to_owned()).collect(),
            object: EventObject {
                id: event.object.as_str().to_owned(),
                types: event.object_types.iter().map(as_term).collect(),
            },
            published: event.created.to_rfc3339_opts(SecondsFormat::Millis, true),
            inbox: event.inbox.as_ref().map(|i| i.as_str().to_owned()),
        }
    }
}

/// The event service: shapes events and publishes them, best
/// effort.
#[derive(Clone)]
pub struct EventService {
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for EventService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventService").finish()
    }
}

impl EventService {
    /// Create an event service over given sink.
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Shape and publish given event. Downstream failures are
    /// logged and swallowed; the mutation has already committed.
    pub async fn emit(&self, event: Event) {
        let envelope = EventEnvelope::from(&event);
        if let Err(e) = self.sink.publish(&envelope).await {
            warn!(
                "Error in publishing event {} for {}: {}",
                envelope.id, envelope.object.id, e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use arbor_space::vocab::ldp;

    use super::*;

    #[test]
    fn envelope_shape() {
        let event = Event::new(
            ActivityType::Create,
            vec![Iri::new_unchecked("http://h/webid")],
            Iri::new_unchecked("http://h/a/b"),
            vec![ldp::BASIC_CONTAINER.clone(), activitystreams::CREATE.clone()],
        );
        let envelope = EventEnvelope::from(&event);

        assert_eq!(envelope.context, ACTIVITYSTREAMS_CONTEXT);
        assert_eq!(envelope.types, vec!["Create".to_owned()]);
        assert!(envelope.id.starts_with("urn:uuid:"));
        assert_eq!(envelope.object.id, "http://h/a/b");
        // Non-as types serialize as full iris; as types as bare terms.
        assert_eq!(
            envelope.object.types,
            vec![
                "http://www.w3.org/ns/ldp#BasicContainer".to_owned(),
                "Create".to_owned()
            ]
        );

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["@context"], ACTIVITYSTREAMS_CONTEXT);
        assert_eq!(json["type"][0], "Create");
        assert_eq!(json["object"]["id"], "http://h/a/b");
        assert!(json.get("inbox").is_none());
    }

    #[test]
    fn event_identifiers_are_fresh() {
        let mk = || {
            Event::new(
                ActivityType::Update,
                Vec::new(),
                Iri::new_unchecked("http://h/x"),
                Vec::new(),
            )
        };
        assert_ne!(mk().identifier, mk().identifier);
    }
}
