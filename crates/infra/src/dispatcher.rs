//! Command execution pipeline (application-level orchestration).
//!
//! The `CommandDispatcher` owns one aggregate, its in-memory journal and the
//! durable store behind it:
//!
//! ```text
//! Command
//!   ↓
//! 1. Decide: aggregate.handle(command) (pure, guards run here)
//!   ↓  rejected → CommandOutcome::Rejected, nothing stored
//! 2. Prepare envelopes for the whole batch at the next positions
//!   ↓
//! 3. Append the batch to the store in one call
//!    (ExpectedVersion::Exact(journal length))
//!   ↓  failed → Err, nothing journaled or folded
//! 4. For each envelope, in order: record it in the journal, fold it
//! ```
//!
//! A command's events are stored together or not at all, so the journal
//! never holds part of a command.
//!
//! This module contains no IO itself; it composes the `JournalStore` trait.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, info};

use carworks_core::{Aggregate, AggregateId, DomainError, ExpectedVersion};
use carworks_events::{Command, Event, EventEnvelope, Journal, JournalError};
use carworks_factory::{Factory, FactoryState, rebuild_state};

use crate::journal_store::{JournalStore, JournalStoreError, StoredEvent};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Persisting to or loading from the journal store failed.
    #[error("journal store: {0}")]
    Store(#[from] JournalStoreError),

    /// A loaded stream does not form a valid journal.
    #[error("corrupted journal: {0}")]
    Corrupted(String),

    /// The single-writer lock was poisoned by a panicking writer.
    #[error("dispatcher lock poisoned")]
    LockPoisoned,
}

impl From<JournalError> for DispatchError {
    fn from(value: JournalError) -> Self {
        DispatchError::Corrupted(value.to_string())
    }
}

/// What happened to a submitted command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome<E> {
    /// Guards passed; these envelopes were stored, journaled and folded.
    Accepted { events: Vec<EventEnvelope<E>> },
    /// A guard or input check refused the command. Nothing was recorded.
    Rejected { reason: DomainError },
}

impl<E> CommandOutcome<E> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CommandOutcome::Accepted { .. })
    }

    /// Stable rejection code, if rejected.
    pub fn rejection_code(&self) -> Option<&'static str> {
        match self {
            CommandOutcome::Accepted { .. } => None,
            CommandOutcome::Rejected { reason } => Some(reason.code()),
        }
    }
}

/// Single-writer command engine for one event-sourced aggregate.
///
/// ## Execution Guarantees
///
/// - **No event without a guard**: events only come from `handle`
/// - **Append before apply**: state never reflects an event the store and
///   journal do not hold
/// - **Rejection is free**: a rejected command touches neither store,
///   journal nor state
/// - **Whole commands**: a command's events reach the store in one append
/// - **Optimistic concurrency**: each append expects the store to hold
///   exactly `journal.len()` events
///
/// ## Generic Parameters
///
/// - `A`: the aggregate (its `handle` decides, its `apply` folds)
/// - `S`: the journal store (`InMemoryJournalStore`, `JsonLinesJournalStore`, ...)
#[derive(Debug)]
pub struct CommandDispatcher<A, S>
where
    A: Aggregate,
{
    aggregate_type: String,
    aggregate: A,
    journal: Journal<A::Event>,
    store: S,
}

impl<A, S> CommandDispatcher<A, S>
where
    A: Aggregate<Id = AggregateId, Error = DomainError>,
    A::Command: Command,
    A::Event: Event + Serialize + DeserializeOwned,
    S: JournalStore,
{
    /// Start from a fresh aggregate. Nothing is read from `store`.
    pub fn new(aggregate_type: impl Into<String>, aggregate: A, store: S) -> Self {
        let journal = Journal::new(*aggregate.id());
        Self {
            aggregate_type: aggregate_type.into(),
            aggregate,
            journal,
            store,
        }
    }

    /// Rebuild the journal and the aggregate from everything `store` holds
    /// for `aggregate.id()`.
    ///
    /// `aggregate` must be empty; every stored event is folded into it in
    /// position order.
    pub fn recover(
        aggregate_type: impl Into<String>,
        mut aggregate: A,
        store: S,
    ) -> Result<Self, DispatchError> {
        let aggregate_type = aggregate_type.into();
        let aggregate_id = *aggregate.id();
        let stored = store.load(aggregate_id)?;

        let mut journal = Journal::new(aggregate_id);
        for record in &stored {
            if record.aggregate_type != aggregate_type {
                return Err(DispatchError::Corrupted(format!(
                    "event at position {} belongs to '{}', expected '{aggregate_type}'",
                    record.position, record.aggregate_type
                )));
            }
            let envelope: EventEnvelope<A::Event> = record.to_envelope()?;
            journal.push(envelope.clone())?;
            aggregate.apply(envelope.payload());
        }

        info!(
            aggregate_type = %aggregate_type,
            aggregate_id = %aggregate_id,
            replayed = journal.len(),
            "journal recovered"
        );

        Ok(Self {
            aggregate_type,
            aggregate,
            journal,
            store,
        })
    }

    /// Run one command through the pipeline.
    ///
    /// `Ok(Rejected)` is an expected business outcome. `Err` means the
    /// pipeline itself failed (store unavailable, version conflict); nothing
    /// of the command was recorded then.
    pub fn submit(
        &mut self,
        command: &A::Command,
    ) -> Result<CommandOutcome<A::Event>, DispatchError> {
        let command_name = command.command_name();

        let decided = match self.aggregate.handle(command) {
            Ok(events) => events,
            Err(reason) => {
                info!(
                    command = command_name,
                    code = reason.code(),
                    reason = %reason,
                    "command rejected"
                );
                return Ok(CommandOutcome::Rejected { reason });
            }
        };

        let recorded = self.journal.prepare(decided);
        let stored = recorded
            .iter()
            .map(|envelope| StoredEvent::from_envelope(self.aggregate_type.as_str(), envelope))
            .collect::<Result<Vec<_>, _>>()?;
        let expected = ExpectedVersion::Exact(self.journal.next_position());

        if let Err(err) = self.store.append(stored, expected) {
            error!(
                command = command_name,
                events = recorded.len(),
                error = %err,
                "journal append failed; command aborted"
            );
            return Err(err.into());
        }

        for envelope in &recorded {
            debug!(
                event_type = envelope.payload().event_type(),
                position = envelope.position(),
                "event recorded"
            );
            self.journal.push(envelope.clone())?;
            self.aggregate.apply(envelope.payload());
        }

        info!(
            command = command_name,
            events = recorded.len(),
            journal_len = self.journal.len(),
            "command accepted"
        );
        Ok(CommandOutcome::Accepted { events: recorded })
    }

    pub fn aggregate(&self) -> &A {
        &self.aggregate
    }

    pub fn journal(&self) -> &Journal<A::Event> {
        &self.journal
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> CommandDispatcher<Factory, S>
where
    S: JournalStore,
{
    /// The live derived state (a snapshot).
    pub fn current_state(&self) -> FactoryState {
        self.aggregate.current_state()
    }

    /// Fold the journal again from empty state, ignoring the live state.
    pub fn rebuild_state(&self) -> FactoryState {
        rebuild_state(&self.journal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carworks_factory::{CarPart, FactoryCommand, FactoryRules, AGGREGATE_TYPE};

    use crate::journal_store::InMemoryJournalStore;

    fn dispatcher() -> CommandDispatcher<Factory, InMemoryJournalStore> {
        CommandDispatcher::new(
            AGGREGATE_TYPE,
            Factory::empty(AggregateId::new(), FactoryRules::default()),
            InMemoryJournalStore::new(),
        )
    }

    #[test]
    fn accepted_command_is_stored_journaled_and_folded() {
        let mut d = dispatcher();

        let outcome = d.submit(&FactoryCommand::assign_employee("yoda")).unwrap();

        assert!(outcome.is_accepted());
        assert_eq!(d.journal().len(), 1);
        assert_eq!(d.store().load(d.journal().aggregate_id()).unwrap().len(), 1);
        assert_eq!(d.current_state().employees(), ["yoda"]);
    }

    #[test]
    fn rejected_command_touches_nothing() {
        let mut d = dispatcher();
        d.submit(&FactoryCommand::assign_employee("yoda")).unwrap();
        let before = d.current_state();

        let outcome = d.submit(&FactoryCommand::assign_employee("yoda")).unwrap();

        assert_eq!(outcome.rejection_code(), Some("employee-name-already-taken"));
        assert_eq!(d.journal().len(), 1);
        assert_eq!(d.store().load(d.journal().aggregate_id()).unwrap().len(), 1);
        assert_eq!(d.current_state(), before);
    }

    #[test]
    fn accepted_envelopes_carry_contiguous_positions() {
        let mut d = dispatcher();
        d.submit(&FactoryCommand::assign_employee("yoda")).unwrap();

        let outcome = d
            .submit(&FactoryCommand::transfer_shipment(
                "spares",
                vec![CarPart::new("wheels", 30)],
            ))
            .unwrap();

        let CommandOutcome::Accepted { events } = outcome else {
            panic!("expected acceptance");
        };
        let positions: Vec<_> = events.iter().map(EventEnvelope::position).collect();
        assert_eq!(positions, vec![1, 2]);
        assert_eq!(d.rebuild_state(), d.current_state());
    }

    #[test]
    fn recover_replays_the_stored_stream() {
        let store = std::sync::Arc::new(InMemoryJournalStore::new());
        let id = AggregateId::new();
        let mut d = CommandDispatcher::new(
            AGGREGATE_TYPE,
            Factory::empty(id, FactoryRules::default()),
            store.clone(),
        );
        d.submit(&FactoryCommand::assign_employee("yoda")).unwrap();
        d.submit(&FactoryCommand::assign_employee("luke")).unwrap();

        let recovered = CommandDispatcher::recover(
            AGGREGATE_TYPE,
            Factory::empty(id, FactoryRules::default()),
            store,
        )
        .unwrap();

        assert_eq!(recovered.journal(), d.journal());
        assert_eq!(recovered.current_state(), d.current_state());
        assert_eq!(recovered.aggregate(), d.aggregate());
    }

    #[test]
    fn recover_refuses_foreign_aggregate_type() {
        let store = std::sync::Arc::new(InMemoryJournalStore::new());
        let id = AggregateId::new();
        let mut d = CommandDispatcher::new(
            "warehouse",
            Factory::empty(id, FactoryRules::default()),
            store.clone(),
        );
        d.submit(&FactoryCommand::assign_employee("yoda")).unwrap();

        let err = CommandDispatcher::recover(
            AGGREGATE_TYPE,
            Factory::empty(id, FactoryRules::default()),
            store,
        )
        .unwrap_err();
        assert!(matches!(err, DispatchError::Corrupted(_)));
    }
}
