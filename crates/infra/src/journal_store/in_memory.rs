use std::collections::HashMap;
use std::sync::RwLock;

use carworks_core::{AggregateId, ExpectedVersion};

use super::r#trait::{JournalStore, JournalStoreError, StoredEvent, check_append};

/// In-memory append-only journal store.
///
/// Intended for tests/dev. Nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryJournalStore {
    streams: RwLock<HashMap<AggregateId, Vec<StoredEvent>>>,
}

impl InMemoryJournalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JournalStore for InMemoryJournalStore {
    fn append(
        &self,
        events: Vec<StoredEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<(), JournalStoreError> {
        let Some(aggregate_id) = events.first().map(|e| e.aggregate_id) else {
            return Ok(());
        };

        let mut streams = self
            .streams
            .write()
            .map_err(|_| JournalStoreError::LockPoisoned)?;

        let stream = streams.entry(aggregate_id).or_default();
        let stream_type = stream.first().map(|e| e.aggregate_type.as_str());
        check_append(stream.len() as u64, stream_type, &events, expected_version)?;

        stream.extend(events);
        Ok(())
    }

    fn load(&self, aggregate_id: AggregateId) -> Result<Vec<StoredEvent>, JournalStoreError> {
        let streams = self
            .streams
            .read()
            .map_err(|_| JournalStoreError::LockPoisoned)?;

        Ok(streams.get(&aggregate_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carworks_events::Journal;
    use carworks_factory::{EmployeeAssigned, FactoryEvent};

    fn assigned(journal: &Journal<FactoryEvent>, names: &[&str]) -> Vec<StoredEvent> {
        let events = names.iter().map(|name| {
            FactoryEvent::EmployeeAssigned(EmployeeAssigned {
                employee_name: (*name).into(),
            })
        });
        journal
            .prepare(events)
            .iter()
            .map(|envelope| StoredEvent::from_envelope("factory", envelope).unwrap())
            .collect()
    }

    fn record(journal: &mut Journal<FactoryEvent>, names: &[&str]) -> Vec<StoredEvent> {
        let batch = assigned(journal, names);
        for stored in &batch {
            journal.push(stored.to_envelope().unwrap()).unwrap();
        }
        batch
    }

    #[test]
    fn appends_and_loads_in_order() {
        let store = InMemoryJournalStore::new();
        let mut journal = Journal::new(AggregateId::new());

        let first = record(&mut journal, &["yoda"]);
        store.append(first, ExpectedVersion::Exact(0)).unwrap();
        let second = record(&mut journal, &["luke", "leia"]);
        store.append(second, ExpectedVersion::Exact(1)).unwrap();

        let loaded = store.load(journal.aggregate_id()).unwrap();
        let positions: Vec<_> = loaded.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert!(store.load(AggregateId::new()).unwrap().is_empty());
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let store = InMemoryJournalStore::new();
        store.append(Vec::new(), ExpectedVersion::Exact(0)).unwrap();
    }

    #[test]
    fn stale_expected_version_is_a_conflict() {
        let store = InMemoryJournalStore::new();
        let mut journal = Journal::new(AggregateId::new());
        let first = record(&mut journal, &["yoda"]);
        store.append(first, ExpectedVersion::Exact(0)).unwrap();

        let second = record(&mut journal, &["luke"]);
        let err = store.append(second, ExpectedVersion::Exact(0)).unwrap_err();
        assert!(matches!(err, JournalStoreError::Concurrency(_)));
        assert_eq!(store.load(journal.aggregate_id()).unwrap().len(), 1);
    }

    #[test]
    fn gap_in_positions_is_refused() {
        let store = InMemoryJournalStore::new();
        let mut journal = Journal::new(AggregateId::new());
        let _skipped = record(&mut journal, &["yoda"]);
        let second = record(&mut journal, &["luke"]);

        let err = store.append(second, ExpectedVersion::Any).unwrap_err();
        assert!(matches!(err, JournalStoreError::InvalidAppend(_)));
    }

    #[test]
    fn invalid_event_refuses_the_whole_batch() {
        let store = InMemoryJournalStore::new();
        let journal = Journal::new(AggregateId::new());
        let mut batch = assigned(&journal, &["yoda", "luke"]);
        batch[1].position = 5;

        let err = store.append(batch, ExpectedVersion::Exact(0)).unwrap_err();
        assert!(matches!(err, JournalStoreError::InvalidAppend(_)));
        assert!(store.load(journal.aggregate_id()).unwrap().is_empty());
    }

    #[test]
    fn stream_keeps_its_aggregate_type() {
        let store = InMemoryJournalStore::new();
        let mut journal = Journal::new(AggregateId::new());
        store
            .append(record(&mut journal, &["yoda"]), ExpectedVersion::Exact(0))
            .unwrap();

        let mut foreign = record(&mut journal, &["luke"]);
        foreign[0].aggregate_type = "warehouse".into();
        let err = store.append(foreign, ExpectedVersion::Exact(1)).unwrap_err();
        assert!(matches!(err, JournalStoreError::InvalidAppend(_)));
    }
}
