use serde::{Deserialize, Serialize};

use carworks_events::Event;

use crate::part::{CarPart, Shipment};

/// Event: EmployeeAssigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeAssigned {
    pub employee_name: String,
}

/// Event: ShipmentReceived (a shipment now waits in the cargo bay).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentReceived {
    pub shipment_name: String,
    pub parts: Vec<CarPart>,
}

impl ShipmentReceived {
    pub fn shipment(&self) -> Shipment {
        Shipment::new(self.shipment_name.clone(), self.parts.clone())
    }
}

/// Event: RemarkUttered. Recorded for audit only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemarkUttered {
    pub text: String,
    pub meaning: String,
}

/// Event: ShipmentsUnpacked (every pending shipment moved into inventory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentsUnpacked {
    pub employee_name: String,
    pub shipments: Vec<Shipment>,
}

/// Event: CarProduced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarProduced {
    pub employee_name: String,
    pub car_model: String,
    /// Parts taken from inventory to build the car.
    pub parts: Vec<CarPart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactoryEvent {
    EmployeeAssigned(EmployeeAssigned),
    ShipmentReceived(ShipmentReceived),
    RemarkUttered(RemarkUttered),
    ShipmentsUnpacked(ShipmentsUnpacked),
    CarProduced(CarProduced),
}

impl Event for FactoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FactoryEvent::EmployeeAssigned(_) => "factory.employee_assigned",
            FactoryEvent::ShipmentReceived(_) => "factory.shipment_received",
            FactoryEvent::RemarkUttered(_) => "factory.remark_uttered",
            FactoryEvent::ShipmentsUnpacked(_) => "factory.shipments_unpacked",
            FactoryEvent::CarProduced(_) => "factory.car_produced",
        }
    }

    fn version(&self) -> u32 {
        1
    }
}

impl core::fmt::Display for FactoryEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FactoryEvent::EmployeeAssigned(e) => {
                write!(f, "new worker joins our forces: '{}'", e.employee_name)
            }
            FactoryEvent::ShipmentReceived(e) => {
                write!(f, "shipment '{}' transferred to cargo bay:", e.shipment_name)?;
                for part in &e.parts {
                    write!(f, " [{part}]")?;
                }
                Ok(())
            }
            FactoryEvent::RemarkUttered(e) => {
                write!(f, "'{}' was heard within the walls. It meant: '{}'", e.text, e.meaning)
            }
            FactoryEvent::ShipmentsUnpacked(e) => write!(
                f,
                "'{}' unpacked {} shipment(s) in the cargo bay",
                e.employee_name,
                e.shipments.len()
            ),
            FactoryEvent::CarProduced(e) => {
                write!(f, "'{}' produced a '{}'", e.employee_name, e.car_model)
            }
        }
    }
}
