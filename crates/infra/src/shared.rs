//! Serialized access to one dispatcher from many callers.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use serde::de::DeserializeOwned;

use carworks_core::{Aggregate, AggregateId, DomainError};
use carworks_events::{Command, Event};
use carworks_factory::{Factory, FactoryState};

use crate::dispatcher::{CommandDispatcher, CommandOutcome, DispatchError};
use crate::journal_store::JournalStore;

/// Cloneable handle over a [`CommandDispatcher`] behind a single lock.
///
/// Concurrent `submit` calls are processed one at a time. Each command sees
/// the state left by the previous one, so guards are never evaluated against
/// stale state.
#[derive(Debug)]
pub struct SharedDispatcher<A, S>
where
    A: Aggregate,
{
    inner: Arc<Mutex<CommandDispatcher<A, S>>>,
}

impl<A, S> Clone for SharedDispatcher<A, S>
where
    A: Aggregate,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, S> SharedDispatcher<A, S>
where
    A: Aggregate<Id = AggregateId, Error = DomainError>,
    A::Command: Command,
    A::Event: Event + Serialize + DeserializeOwned,
    S: JournalStore,
{
    pub fn new(dispatcher: CommandDispatcher<A, S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(dispatcher)),
        }
    }

    pub fn submit(&self, command: &A::Command) -> Result<CommandOutcome<A::Event>, DispatchError> {
        self.lock()?.submit(command)
    }

    /// Run `f` against the dispatcher while holding the writer lock.
    pub fn read<R>(&self, f: impl FnOnce(&CommandDispatcher<A, S>) -> R) -> Result<R, DispatchError> {
        let guard = self.lock()?;
        Ok(f(&*guard))
    }

    fn lock(&self) -> Result<MutexGuard<'_, CommandDispatcher<A, S>>, DispatchError> {
        self.inner.lock().map_err(|_| DispatchError::LockPoisoned)
    }
}

impl<S> SharedDispatcher<Factory, S>
where
    S: JournalStore,
{
    pub fn current_state(&self) -> Result<FactoryState, DispatchError> {
        self.read(CommandDispatcher::current_state)
    }

    pub fn rebuild_state(&self) -> Result<FactoryState, DispatchError> {
        self.read(CommandDispatcher::rebuild_state)
    }
}
