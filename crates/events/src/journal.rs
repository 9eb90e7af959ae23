//! Append-only journal of recorded events (the source of truth).
//!
//! The journal only grows. Entries are never reordered, replaced or
//! removed; insertion order is the causal order of the aggregate.

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use carworks_core::AggregateId;

use crate::EventEnvelope;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JournalError {
    #[error("envelope position {found} does not follow journal length {expected}")]
    NonContiguous { expected: u64, found: u64 },

    #[error("envelope belongs to aggregate {found}, journal records aggregate {expected}")]
    AggregateMismatch {
        expected: AggregateId,
        found: AggregateId,
    },
}

/// Ordered, append-only sequence of event envelopes for one aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journal<E> {
    aggregate_id: AggregateId,
    entries: Vec<EventEnvelope<E>>,
}

impl<E> Journal<E> {
    pub fn new(aggregate_id: AggregateId) -> Self {
        Self {
            aggregate_id,
            entries: Vec::new(),
        }
    }

    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position the next recorded event will receive.
    pub fn next_position(&self) -> u64 {
        self.entries.len() as u64
    }

    /// Build the envelope for `event` at the next position without recording it.
    ///
    /// Used when the envelope must first be handed to a durable sink; record
    /// it with [`Journal::push`] once the sink accepted it.
    pub fn next_envelope(&self, event: E) -> EventEnvelope<E> {
        EventEnvelope::new(
            Uuid::now_v7(),
            self.aggregate_id,
            self.next_position(),
            Utc::now(),
            event,
        )
    }

    /// Build envelopes for a whole batch at consecutive positions after the
    /// last recorded one, without recording any of them.
    ///
    /// The batch is handed to a durable sink in one piece and then recorded
    /// with [`Journal::push`] in order.
    pub fn prepare(&self, events: impl IntoIterator<Item = E>) -> Vec<EventEnvelope<E>> {
        let start = self.next_position();
        let recorded_at = Utc::now();
        events
            .into_iter()
            .zip(start..)
            .map(|(event, position)| {
                EventEnvelope::new(Uuid::now_v7(), self.aggregate_id, position, recorded_at, event)
            })
            .collect()
    }

    /// Record a prepared envelope. Its position must equal the current length.
    pub fn push(&mut self, envelope: EventEnvelope<E>) -> Result<u64, JournalError> {
        if envelope.aggregate_id() != self.aggregate_id {
            return Err(JournalError::AggregateMismatch {
                expected: self.aggregate_id,
                found: envelope.aggregate_id(),
            });
        }
        let expected = self.next_position();
        if envelope.position() != expected {
            return Err(JournalError::NonContiguous {
                expected,
                found: envelope.position(),
            });
        }
        self.entries.push(envelope);
        Ok(expected)
    }

    /// Record `event` and return its position.
    pub fn append(&mut self, event: E) -> u64 {
        let envelope = self.next_envelope(event);
        let position = envelope.position();
        self.entries.push(envelope);
        position
    }

    pub fn get(&self, position: u64) -> Option<&EventEnvelope<E>> {
        usize::try_from(position)
            .ok()
            .and_then(|idx| self.entries.get(idx))
    }

    pub fn last(&self) -> Option<&EventEnvelope<E>> {
        self.entries.last()
    }

    /// Envelopes in insertion order, starting at position 0.
    pub fn iter(&self) -> JournalIter<'_, E> {
        self.iter_from(0)
    }

    /// Envelopes in insertion order, starting at `position`.
    ///
    /// A position past the end yields an empty iterator.
    pub fn iter_from(&self, position: u64) -> JournalIter<'_, E> {
        let start = usize::try_from(position)
            .unwrap_or(usize::MAX)
            .min(self.entries.len());
        JournalIter {
            inner: self.entries[start..].iter(),
        }
    }

    /// Recorded payloads in insertion order.
    pub fn events(&self) -> impl Iterator<Item = &E> + '_ {
        self.entries.iter().map(EventEnvelope::payload)
    }
}

/// Lazy, finite iterator over a journal's envelopes.
#[derive(Debug, Clone)]
pub struct JournalIter<'a, E> {
    inner: core::slice::Iter<'a, EventEnvelope<E>>,
}

impl<'a, E> Iterator for JournalIter<'a, E> {
    type Item = &'a EventEnvelope<E>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<E> ExactSizeIterator for JournalIter<'_, E> {}

impl<'a, E> IntoIterator for &'a Journal<E> {
    type Item = &'a EventEnvelope<E>;
    type IntoIter = JournalIter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
