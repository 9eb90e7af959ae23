//! Pure predicates deciding whether a command may proceed.
//!
//! Guards only read the derived state and the rules. They run before any
//! event exists, so a refusal leaves nothing behind. Each `check_*` returns
//! the reason for a refusal; the `can_*` forms answer yes/no.
//!
//! Input validation (`validate_*`) runs first and reports malformed commands
//! as `DomainError::Validation`.

use carworks_core::{DomainError, DomainResult};

use crate::part::CarPart;
use crate::rules::FactoryRules;
use crate::state::FactoryState;

pub fn validate_employee_name(employee_name: &str) -> DomainResult<()> {
    if employee_name.trim().is_empty() {
        return Err(DomainError::validation("employee name cannot be empty"));
    }
    Ok(())
}

pub fn validate_shipment(shipment_name: &str, parts: &[CarPart]) -> DomainResult<()> {
    if shipment_name.trim().is_empty() {
        return Err(DomainError::validation("shipment name cannot be empty"));
    }
    for part in parts {
        if part.name.trim().is_empty() {
            return Err(DomainError::validation("part name cannot be empty"));
        }
        if part.quantity <= 0 {
            return Err(DomainError::validation(format!(
                "quantity of '{}' must be positive (got {})",
                part.name, part.quantity
            )));
        }
    }
    Ok(())
}

pub fn check_assign_employee(
    state: &FactoryState,
    rules: &FactoryRules,
    employee_name: &str,
) -> DomainResult<()> {
    if state.has_employee(employee_name) {
        return Err(DomainError::rejected(
            "employee-name-already-taken",
            format!("the name of '{employee_name}' only one employee can have"),
        ));
    }
    if rules.is_blacklisted(employee_name) {
        return Err(DomainError::rejected(
            "bender-employee",
            format!("guys with the name '{employee_name}' are trouble"),
        ));
    }
    Ok(())
}

pub fn can_assign_employee(state: &FactoryState, rules: &FactoryRules, employee_name: &str) -> bool {
    check_assign_employee(state, rules, employee_name).is_ok()
}

pub fn check_receive_shipment(
    state: &FactoryState,
    rules: &FactoryRules,
    parts: &[CarPart],
) -> DomainResult<()> {
    if state.employees().is_empty() {
        return Err(DomainError::rejected(
            "no-employee",
            "there has to be somebody at the factory in order to accept a shipment",
        ));
    }
    if parts.is_empty() {
        return Err(DomainError::rejected(
            "empty-shipment",
            "empty shipments are not accepted",
        ));
    }
    if state.pending_count() >= rules.cargo_bay_capacity {
        return Err(DomainError::rejected(
            "cargo-bay-full",
            format!(
                "more than {} shipments can't fit into this cargo bay",
                rules.cargo_bay_capacity
            ),
        ));
    }
    Ok(())
}

pub fn can_receive_shipment(state: &FactoryState, rules: &FactoryRules, parts: &[CarPart]) -> bool {
    check_receive_shipment(state, rules, parts).is_ok()
}

pub fn check_unpack_shipments(state: &FactoryState, employee_name: &str) -> DomainResult<()> {
    if !state.has_employee(employee_name) {
        return Err(DomainError::rejected(
            "unknown-employee",
            format!("'{employee_name}' is not assigned to the factory"),
        ));
    }
    if state.has_unpacked(employee_name) {
        return Err(DomainError::rejected(
            "employee-already-unpacked",
            format!("'{employee_name}' has already unpacked the cargo bay"),
        ));
    }
    if state.pending_count() == 0 {
        return Err(DomainError::rejected(
            "nothing-to-unpack",
            "there are no shipments waiting in the cargo bay",
        ));
    }
    Ok(())
}

/// On success, returns the parts the car will consume.
pub fn check_produce_car<'r>(
    state: &FactoryState,
    rules: &'r FactoryRules,
    employee_name: &str,
    car_model: &str,
) -> DomainResult<&'r [CarPart]> {
    if !state.has_employee(employee_name) {
        return Err(DomainError::rejected(
            "unknown-employee",
            format!("'{employee_name}' is not assigned to the factory"),
        ));
    }
    if state.has_produced(employee_name) {
        return Err(DomainError::rejected(
            "employee-already-produced-car",
            format!("'{employee_name}' has already produced a car"),
        ));
    }
    let required = rules.blueprints.required_parts(car_model).ok_or_else(|| {
        DomainError::rejected(
            "car-model-not-found",
            format!("model '{car_model}' is not a car we can make"),
        )
    })?;
    if let Some(missing) = required
        .iter()
        .find(|part| state.available(&part.name) < part.quantity)
    {
        return Err(DomainError::rejected(
            "required-part-not-found",
            format!(
                "not enough '{}' to build a '{car_model}' (need {}, have {})",
                missing.name,
                missing.quantity,
                state.available(&missing.name)
            ),
        ));
    }
    Ok(required)
}
