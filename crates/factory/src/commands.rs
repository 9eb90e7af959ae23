use serde::{Deserialize, Serialize};

use carworks_events::Command;

use crate::part::CarPart;

/// Command: AssignEmployee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignEmployee {
    pub employee_name: String,
}

/// Command: TransferShipment (into the cargo bay).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferShipment {
    pub shipment_name: String,
    pub parts: Vec<CarPart>,
}

/// Command: UnpackShipments (everything waiting in the cargo bay).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpackShipments {
    pub employee_name: String,
}

/// Command: ProduceCar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProduceCar {
    pub employee_name: String,
    pub car_model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactoryCommand {
    AssignEmployee(AssignEmployee),
    TransferShipment(TransferShipment),
    UnpackShipments(UnpackShipments),
    ProduceCar(ProduceCar),
}

impl FactoryCommand {
    pub fn assign_employee(employee_name: impl Into<String>) -> Self {
        Self::AssignEmployee(AssignEmployee {
            employee_name: employee_name.into(),
        })
    }

    pub fn transfer_shipment(shipment_name: impl Into<String>, parts: Vec<CarPart>) -> Self {
        Self::TransferShipment(TransferShipment {
            shipment_name: shipment_name.into(),
            parts,
        })
    }

    pub fn unpack_shipments(employee_name: impl Into<String>) -> Self {
        Self::UnpackShipments(UnpackShipments {
            employee_name: employee_name.into(),
        })
    }

    pub fn produce_car(employee_name: impl Into<String>, car_model: impl Into<String>) -> Self {
        Self::ProduceCar(ProduceCar {
            employee_name: employee_name.into(),
            car_model: car_model.into(),
        })
    }
}

impl Command for FactoryCommand {
    fn command_name(&self) -> &'static str {
        match self {
            FactoryCommand::AssignEmployee(_) => "assign_employee",
            FactoryCommand::TransferShipment(_) => "transfer_shipment",
            FactoryCommand::UnpackShipments(_) => "unpack_shipments",
            FactoryCommand::ProduceCar(_) => "produce_car",
        }
    }
}
