use crate::Journal;

/// Execute an aggregate command against an in-memory journal (no IO, no async).
///
/// This is the live path without a durable sink:
///
/// 1. **Decide**: `aggregate.handle(command)` runs the guards and returns the
///    events (pure, no mutation). A rejection returns `Err` and nothing is
///    recorded.
/// 2. **Record, then evolve**: each event is appended to the journal and
///    immediately folded into the aggregate via `apply`, one at a time, in
///    the order they were decided.
///
/// Returns the journal positions of the recorded events.
///
/// For a journal backed by a store, use `CommandDispatcher::submit` from
/// `carworks-infra`, which adds the durable append between decide and record.
pub fn execute<A>(
    aggregate: &mut A,
    journal: &mut Journal<A::Event>,
    command: &A::Command,
) -> Result<Vec<u64>, A::Error>
where
    A: carworks_core::Aggregate,
{
    let events = aggregate.handle(command)?;
    let mut positions = Vec::with_capacity(events.len());
    for ev in events {
        positions.push(journal.append(ev.clone()));
        aggregate.apply(&ev);
    }
    Ok(positions)
}
