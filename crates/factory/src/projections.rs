//! Read models over the factory journal.
//!
//! Both are disposable: `ProjectionRunner::rebuild_from_scratch` recreates
//! them from any journal.

use std::collections::BTreeMap;

use carworks_events::{EventEnvelope, Projection};

use crate::events::FactoryEvent;

/// Who works at the factory, and the journal position at which they joined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerRegistry {
    joined_at: BTreeMap<String, u64>,
}

impl WorkerRegistry {
    pub fn joined_at(&self, employee_name: &str) -> Option<u64> {
        self.joined_at.get(employee_name).copied()
    }

    pub fn len(&self) -> usize {
        self.joined_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joined_at.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.joined_at.keys().map(String::as_str)
    }
}

impl Projection for WorkerRegistry {
    type Ev = FactoryEvent;

    fn apply(&mut self, envelope: &EventEnvelope<FactoryEvent>) {
        if let FactoryEvent::EmployeeAssigned(e) = envelope.payload() {
            self.joined_at
                .entry(e.employee_name.clone())
                .or_insert(envelope.position());
        }
    }
}

/// Every part on the premises, whether still packed or not.
///
/// Received shipments add to the count, produced cars take from it.
/// Unpacking moves parts within the factory and changes nothing here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CargoBayInventory {
    parts: BTreeMap<String, i64>,
    cars_produced: u64,
}

impl CargoBayInventory {
    pub fn quantity(&self, part_name: &str) -> i64 {
        self.parts.get(part_name).copied().unwrap_or(0)
    }

    pub fn parts(&self) -> &BTreeMap<String, i64> {
        &self.parts
    }

    pub fn cars_produced(&self) -> u64 {
        self.cars_produced
    }
}

impl Projection for CargoBayInventory {
    type Ev = FactoryEvent;

    fn apply(&mut self, envelope: &EventEnvelope<FactoryEvent>) {
        match envelope.payload() {
            FactoryEvent::ShipmentReceived(e) => {
                for part in &e.parts {
                    let qty = self.parts.entry(part.name.clone()).or_insert(0);
                    *qty = qty.saturating_add(part.quantity);
                }
            }
            FactoryEvent::CarProduced(e) => {
                for part in &e.parts {
                    if let Some(qty) = self.parts.get_mut(&part.name) {
                        *qty = qty.saturating_sub(part.quantity);
                    }
                }
                self.parts.retain(|_, qty| *qty > 0);
                self.cars_produced += 1;
            }
            _ => {}
        }
    }
}
