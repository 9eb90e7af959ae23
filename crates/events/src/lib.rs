//! Events, commands, and the append-only journal.
//!
//! Storage-agnostic: nothing in this crate performs IO.

pub mod command;
pub mod envelope;
pub mod event;
pub mod handler;
pub mod journal;
pub mod projection;
pub mod runner;

pub use command::Command;
pub use envelope::EventEnvelope;
pub use event::Event;
pub use handler::execute;
pub use journal::{Journal, JournalError, JournalIter};
pub use projection::Projection;
pub use runner::{ProjectionCursor, ProjectionError, ProjectionRunner};
