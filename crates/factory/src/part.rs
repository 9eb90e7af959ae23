use serde::{Deserialize, Serialize};

use carworks_core::ValueObject;

/// A quantity of one kind of car part.
///
/// Quantities are signed so that malformed input (negative counts) can be
/// represented and rejected by validation instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarPart {
    pub name: String,
    pub quantity: i64,
}

impl CarPart {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

impl ValueObject for CarPart {}

impl core::fmt::Display for CarPart {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {} pcs", self.name, self.quantity)
    }
}

/// Sum of all part quantities (saturating).
pub fn total_quantity(parts: &[CarPart]) -> i64 {
    parts
        .iter()
        .fold(0i64, |acc, part| acc.saturating_add(part.quantity))
}

/// A named delivery of parts waiting in (or unpacked from) the cargo bay.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shipment {
    pub name: String,
    pub parts: Vec<CarPart>,
}

impl Shipment {
    pub fn new(name: impl Into<String>, parts: Vec<CarPart>) -> Self {
        Self {
            name: name.into(),
            parts,
        }
    }

    pub fn total_quantity(&self) -> i64 {
        total_quantity(&self.parts)
    }
}

impl ValueObject for Shipment {}
