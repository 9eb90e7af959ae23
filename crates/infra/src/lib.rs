//! Infrastructure layer: journal persistence, command dispatch, config.

pub mod config;
pub mod dispatcher;
pub mod journal_store;
pub mod shared;


pub use config::{AppConfig, ConfigError};
pub use dispatcher::{CommandDispatcher, CommandOutcome, DispatchError};
pub use journal_store::{
    InMemoryJournalStore, JournalStore, JournalStoreError, JsonLinesJournalStore, StoredEvent,
};
pub use shared::SharedDispatcher;
