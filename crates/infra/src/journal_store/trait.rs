use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use carworks_core::{AggregateId, ExpectedVersion};
use carworks_events::{Event, EventEnvelope};
use std::sync::Arc;

/// Serialized form of a recorded envelope.
///
/// ## Positions
///
/// `position` is the 0-based index of the event in its aggregate stream. It
/// is assigned by the journal before the append and checked by the store:
/// - **Contiguous**: each event takes the next position (no gaps, no duplicates)
/// - **Stream-scoped**: positions are per aggregate
/// - **Immutable**: once stored, an event never moves
///
/// ## Payload
///
/// The payload is the event's serde JSON form (externally tagged for enums),
/// so `to_envelope` restores exactly the event that was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub event_id: Uuid,
    pub aggregate_id: AggregateId,
    pub aggregate_type: String,

    /// 0-based position in the aggregate stream.
    pub position: u64,

    pub event_type: String,
    pub event_version: u32,
    pub recorded_at: DateTime<Utc>,

    pub payload: JsonValue,
}

impl StoredEvent {
    /// Serialize a prepared envelope for storage.
    pub fn from_envelope<E>(
        aggregate_type: impl Into<String>,
        envelope: &EventEnvelope<E>,
    ) -> Result<Self, JournalStoreError>
    where
        E: Event + Serialize,
    {
        let payload = serde_json::to_value(envelope.payload()).map_err(|e| {
            JournalStoreError::Serialization(format!("payload serialization failed: {e}"))
        })?;

        Ok(Self {
            event_id: envelope.event_id(),
            aggregate_id: envelope.aggregate_id(),
            aggregate_type: aggregate_type.into(),
            position: envelope.position(),
            event_type: envelope.payload().event_type().to_string(),
            event_version: envelope.payload().version(),
            recorded_at: envelope.recorded_at(),
            payload,
        })
    }

    /// Decode back into a typed envelope.
    pub fn to_envelope<E>(&self) -> Result<EventEnvelope<E>, JournalStoreError>
    where
        E: DeserializeOwned,
    {
        let payload: E = serde_json::from_value(self.payload.clone()).map_err(|e| {
            JournalStoreError::Serialization(format!(
                "cannot decode '{}' at position {}: {e}",
                self.event_type, self.position
            ))
        })?;

        Ok(EventEnvelope::new(
            self.event_id,
            self.aggregate_id,
            self.position,
            self.recorded_at,
            payload,
        ))
    }
}

/// Journal store operation error.
///
/// These are infrastructure failures, as opposed to business rejections.
#[derive(Debug, Error)]
pub enum JournalStoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("invalid append: {0}")]
    InvalidAppend(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("journal io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("journal store lock poisoned")]
    LockPoisoned,
}

/// Append-only store of aggregate streams.
///
/// ## Append Semantics
///
/// `append()` takes every event one command decided, as one batch:
/// - Checks optimistic concurrency: `expected_version` is the number of
///   events already stored for the aggregate
/// - Requires one aggregate and one `aggregate_type` for the whole batch,
///   matching the stream it extends
/// - Requires positions to continue the stream without gaps
/// - Persists all of the batch or none of it before returning
///
/// An empty batch is a no-op.
///
/// ## Load Semantics
///
/// `load()` returns every event of the aggregate in position order, or an
/// empty vector for an aggregate with nothing stored.
pub trait JournalStore: Send + Sync {
    fn append(
        &self,
        events: Vec<StoredEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<(), JournalStoreError>;

    fn load(&self, aggregate_id: AggregateId) -> Result<Vec<StoredEvent>, JournalStoreError>;
}

impl<S> JournalStore for Arc<S>
where
    S: JournalStore + ?Sized,
{
    fn append(
        &self,
        events: Vec<StoredEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<(), JournalStoreError> {
        (**self).append(events, expected_version)
    }

    fn load(&self, aggregate_id: AggregateId) -> Result<Vec<StoredEvent>, JournalStoreError> {
        (**self).load(aggregate_id)
    }
}

/// Shared batch check against the stream it extends.
///
/// `stream_type` is the `aggregate_type` already on record for the stream,
/// `None` for a stream with nothing stored.
pub(crate) fn check_append(
    stored_count: u64,
    stream_type: Option<&str>,
    events: &[StoredEvent],
    expected_version: ExpectedVersion,
) -> Result<(), JournalStoreError> {
    if !expected_version.matches(stored_count) {
        return Err(JournalStoreError::Concurrency(format!(
            "expected {expected_version:?}, found {stored_count}"
        )));
    }

    let Some(first) = events.first() else {
        return Ok(());
    };
    let aggregate_type = stream_type.unwrap_or(first.aggregate_type.as_str());

    for ((idx, event), position) in events.iter().enumerate().zip(stored_count..) {
        if event.aggregate_id != first.aggregate_id {
            return Err(JournalStoreError::InvalidAppend(format!(
                "batch contains multiple aggregate_ids (index {idx})"
            )));
        }
        if event.aggregate_type != aggregate_type {
            return Err(JournalStoreError::InvalidAppend(format!(
                "stream aggregate_type is '{aggregate_type}', attempted append with '{}'",
                event.aggregate_type
            )));
        }
        if event.position != position {
            return Err(JournalStoreError::InvalidAppend(format!(
                "event position {} does not follow stream length {position}",
                event.position
            )));
        }
    }
    Ok(())
}
