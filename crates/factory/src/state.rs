//! Derived factory state and the fold that produces it.
//!
//! `FactoryState` is never authoritative: it is whatever folding the journal
//! from the empty state yields. The only way to change it is `apply`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use carworks_events::Journal;

use crate::events::FactoryEvent;
use crate::part::Shipment;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryState {
    /// Assigned employees, in assignment order.
    employees: Vec<String>,
    /// Shipments waiting in the cargo bay, in arrival order.
    pending_shipments: Vec<Shipment>,
    /// Unpacked parts available for production.
    available_parts: BTreeMap<String, i64>,
    unpacked_by: BTreeSet<String>,
    produced_by: BTreeSet<String>,
    cars_produced: Vec<String>,
}

impl FactoryState {
    /// The empty state every journal is folded from.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold every event in order, starting from the empty state.
    pub fn replay<'a>(events: impl IntoIterator<Item = &'a FactoryEvent>) -> Self {
        events.into_iter().fold(Self::new(), Self::folded)
    }

    /// Pure form of [`FactoryState::apply`]: `(state, event) -> state'`.
    pub fn folded(mut self, event: &FactoryEvent) -> Self {
        self.apply(event);
        self
    }

    /// Fold one recorded event into the state.
    ///
    /// Total over `FactoryEvent`. No rule is checked here; guards ran before
    /// the event was recorded.
    pub fn apply(&mut self, event: &FactoryEvent) {
        match event {
            FactoryEvent::EmployeeAssigned(e) => {
                self.employees.push(e.employee_name.clone());
            }
            FactoryEvent::ShipmentReceived(e) => {
                self.pending_shipments.push(e.shipment());
            }
            FactoryEvent::RemarkUttered(_) => {}
            FactoryEvent::ShipmentsUnpacked(e) => {
                self.pending_shipments
                    .retain(|pending| !e.shipments.contains(pending));
                for part in e.shipments.iter().flat_map(|s| &s.parts) {
                    let stock = self.available_parts.entry(part.name.clone()).or_insert(0);
                    *stock = stock.saturating_add(part.quantity);
                }
                self.unpacked_by.insert(e.employee_name.clone());
            }
            FactoryEvent::CarProduced(e) => {
                for part in &e.parts {
                    if let Some(stock) = self.available_parts.get_mut(&part.name) {
                        *stock = stock.saturating_sub(part.quantity).max(0);
                    }
                }
                self.available_parts.retain(|_, stock| *stock > 0);
                self.cars_produced.push(e.car_model.clone());
                self.produced_by.insert(e.employee_name.clone());
            }
        }
    }

    pub fn employees(&self) -> &[String] {
        &self.employees
    }

    /// Exact, case-sensitive membership.
    pub fn has_employee(&self, employee_name: &str) -> bool {
        self.employees.iter().any(|name| name == employee_name)
    }

    pub fn pending_shipments(&self) -> &[Shipment] {
        &self.pending_shipments
    }

    pub fn pending_count(&self) -> usize {
        self.pending_shipments.len()
    }

    /// Unpacked quantity of `part_name` (0 when none).
    pub fn available(&self, part_name: &str) -> i64 {
        self.available_parts.get(part_name).copied().unwrap_or(0)
    }

    pub fn available_parts(&self) -> &BTreeMap<String, i64> {
        &self.available_parts
    }

    pub fn has_unpacked(&self, employee_name: &str) -> bool {
        self.unpacked_by.contains(employee_name)
    }

    pub fn has_produced(&self, employee_name: &str) -> bool {
        self.produced_by.contains(employee_name)
    }

    pub fn cars_produced(&self) -> &[String] {
        &self.cars_produced
    }
}

/// Reconstruct the state from a journal, independent of any live instance.
pub fn rebuild_state(journal: &Journal<FactoryEvent>) -> FactoryState {
    FactoryState::replay(journal.events())
}
