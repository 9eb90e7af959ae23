use crate::{Event, EventEnvelope};

/// A projection builds a read model from an append-only journal.
///
/// Read models are **disposable**: events are the source of truth, so any
/// projection can be thrown away and rebuilt by replaying the journal from
/// position 0.
///
/// ## Projection Lifecycle
///
/// 1. **Apply**: for each recorded envelope, `apply()` updates the read model
/// 2. **Query**: read models are queried directly (no replay needed)
/// 3. **Rebuild**: replay the whole journal into a fresh instance
///
/// Projections must be deterministic: the same envelopes in the same order
/// always produce the same read model. `ProjectionRunner` enforces ordering
/// and skips nothing, so a projection never sees an envelope twice.
///
/// ## Error Handling
///
/// `apply` doesn't return errors. Events a projection does not care about
/// are ignored. Ordering violations are reported by `ProjectionRunner::apply`
/// as `ProjectionError`.
pub trait Projection {
    type Ev: Event;

    /// Apply a single recorded envelope, updating the read model.
    fn apply(&mut self, envelope: &EventEnvelope<Self::Ev>);
}
