//! Durable journal boundary.
//!
//! A `JournalStore` persists serialized envelopes, one aggregate stream at a
//! time, without making storage assumptions. The dispatcher appends to it
//! before an event is recorded in the in-memory journal.

pub mod file;
pub mod in_memory;
pub mod r#trait;

pub use file::JsonLinesJournalStore;
pub use in_memory::InMemoryJournalStore;
pub use r#trait::{JournalStore, JournalStoreError, StoredEvent};
