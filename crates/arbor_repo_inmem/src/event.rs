//! I define a recording event sink, for embedders that drain
//! events in process and for tests.
//!

use std::sync::Mutex;

use arbor_repo::{error::BoxError, service::event::EventEnvelope, store::EventSink};
use async_trait::async_trait;

/// An event sink that records every published envelope in
/// order.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    published: Mutex<Vec<EventEnvelope>>,
}

impl RecordingEventSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the recorded envelopes, oldest first.
    pub fn drain(&self) -> Vec<EventEnvelope> {
        std::mem::take(
            &mut *self
                .published
                .lock()
                .expect("Event record lock poisoned."),
        )
    }

    /// Get a copy of the recorded envelopes, oldest first.
    pub fn recorded(&self) -> Vec<EventEnvelope> {
        self.published
            .lock()
            .expect("Event record lock poisoned.")
            .clone()
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn publish(&self, envelope: &EventEnvelope) -> Result<(), BoxError> {
        self.published
            .lock()
            .expect("Event record lock poisoned.")
            .push(envelope.clone());
        Ok(())
    }
}
