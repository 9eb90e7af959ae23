//! Factory domain module (event-sourced).
//!
//! The factory's state is derived solely from its journal of recorded
//! events. This crate holds the business rules as deterministic domain
//! logic: no IO, no clocks, no storage.

pub mod aggregate;
pub mod blueprint;
pub mod commands;
pub mod events;
pub mod guards;
pub mod part;
pub mod projections;
pub mod rules;
pub mod state;

pub use aggregate::Factory;
pub use blueprint::BlueprintLibrary;
pub use commands::{AssignEmployee, FactoryCommand, ProduceCar, TransferShipment, UnpackShipments};
pub use events::{
    CarProduced, EmployeeAssigned, FactoryEvent, RemarkUttered, ShipmentReceived,
    ShipmentsUnpacked,
};
pub use part::{CarPart, Shipment};
pub use projections::{CargoBayInventory, WorkerRegistry};
pub use rules::{FactoryRules, Remark};
pub use state::{FactoryState, rebuild_state};

/// Aggregate type name used in logs and stored events.
pub const AGGREGATE_TYPE: &str = "factory";
