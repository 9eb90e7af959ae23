use carworks_core::{Aggregate, AggregateId, AggregateRoot, DomainError};
use carworks_events::Journal;

use crate::commands::{AssignEmployee, FactoryCommand, ProduceCar, TransferShipment, UnpackShipments};
use crate::events::{
    CarProduced, EmployeeAssigned, FactoryEvent, RemarkUttered, ShipmentReceived,
    ShipmentsUnpacked,
};
use crate::guards;
use crate::part::total_quantity;
use crate::rules::FactoryRules;
use crate::state::FactoryState;

/// The factory aggregate: decides events from commands and folds them into
/// its derived [`FactoryState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factory {
    id: AggregateId,
    rules: FactoryRules,
    state: FactoryState,
    version: u64,
}

impl Factory {
    /// A factory with an empty journal.
    pub fn empty(id: AggregateId, rules: FactoryRules) -> Self {
        Self {
            id,
            rules,
            state: FactoryState::new(),
            version: 0,
        }
    }

    /// Rehydrate by folding every recorded event of `journal`.
    pub fn from_journal(rules: FactoryRules, journal: &Journal<FactoryEvent>) -> Self {
        let mut factory = Self::empty(journal.aggregate_id(), rules);
        for event in journal.events() {
            factory.apply(event);
        }
        factory
    }

    pub fn state(&self) -> &FactoryState {
        &self.state
    }

    /// Snapshot of the derived state.
    pub fn current_state(&self) -> FactoryState {
        self.state.clone()
    }

    pub fn rules(&self) -> &FactoryRules {
        &self.rules
    }
}

impl AggregateRoot for Factory {
    type Id = AggregateId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Factory {
    type Command = FactoryCommand;
    type Event = FactoryEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        self.state.apply(event);
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            FactoryCommand::AssignEmployee(cmd) => self.handle_assign(cmd),
            FactoryCommand::TransferShipment(cmd) => self.handle_transfer(cmd),
            FactoryCommand::UnpackShipments(cmd) => self.handle_unpack(cmd),
            FactoryCommand::ProduceCar(cmd) => self.handle_produce(cmd),
        }
    }
}

impl Factory {
    fn handle_assign(&self, cmd: &AssignEmployee) -> Result<Vec<FactoryEvent>, DomainError> {
        guards::validate_employee_name(&cmd.employee_name)?;
        guards::check_assign_employee(&self.state, &self.rules, &cmd.employee_name)?;

        Ok(vec![FactoryEvent::EmployeeAssigned(EmployeeAssigned {
            employee_name: cmd.employee_name.clone(),
        })])
    }

    fn handle_transfer(&self, cmd: &TransferShipment) -> Result<Vec<FactoryEvent>, DomainError> {
        guards::validate_shipment(&cmd.shipment_name, &cmd.parts)?;
        guards::check_receive_shipment(&self.state, &self.rules, &cmd.parts)?;

        let mut events = vec![FactoryEvent::ShipmentReceived(ShipmentReceived {
            shipment_name: cmd.shipment_name.clone(),
            parts: cmd.parts.clone(),
        })];

        if total_quantity(&cmd.parts) > self.rules.remark_threshold {
            events.push(FactoryEvent::RemarkUttered(RemarkUttered {
                text: self.rules.remark.text.clone(),
                meaning: self.rules.remark.meaning.clone(),
            }));
        }

        Ok(events)
    }

    fn handle_unpack(&self, cmd: &UnpackShipments) -> Result<Vec<FactoryEvent>, DomainError> {
        guards::validate_employee_name(&cmd.employee_name)?;
        guards::check_unpack_shipments(&self.state, &cmd.employee_name)?;

        Ok(vec![FactoryEvent::ShipmentsUnpacked(ShipmentsUnpacked {
            employee_name: cmd.employee_name.clone(),
            shipments: self.state.pending_shipments().to_vec(),
        })])
    }

    fn handle_produce(&self, cmd: &ProduceCar) -> Result<Vec<FactoryEvent>, DomainError> {
        guards::validate_employee_name(&cmd.employee_name)?;
        if cmd.car_model.trim().is_empty() {
            return Err(DomainError::validation("car model cannot be empty"));
        }
        let parts = guards::check_produce_car(
            &self.state,
            &self.rules,
            &cmd.employee_name,
            &cmd.car_model,
        )?;

        Ok(vec![FactoryEvent::CarProduced(CarProduced {
            employee_name: cmd.employee_name.clone(),
            car_model: cmd.car_model.clone(),
            parts: parts.to_vec(),
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::CarPart;
    use crate::state::rebuild_state;
    use carworks_events::execute;

    fn new_factory() -> (Factory, Journal<FactoryEvent>) {
        let id = AggregateId::new();
        (Factory::empty(id, FactoryRules::default()), Journal::new(id))
    }

    fn big_shipment() -> Vec<CarPart> {
        vec![
            CarPart::new("wheels", 20),
            CarPart::new("engine", 7),
            CarPart::new("bits and pieces", 6),
        ]
    }

    fn rejection_code(
        factory: &mut Factory,
        journal: &mut Journal<FactoryEvent>,
        command: FactoryCommand,
    ) -> &'static str {
        execute(factory, journal, &command).unwrap_err().code()
    }

    #[test]
    fn assigning_a_new_employee_records_one_event() {
        let (mut factory, mut journal) = new_factory();

        let positions =
            execute(&mut factory, &mut journal, &FactoryCommand::assign_employee("yoda")).unwrap();

        assert_eq!(positions, vec![0]);
        assert_eq!(journal.len(), 1);
        assert_eq!(factory.version(), 1);
        assert_eq!(factory.state().employees(), ["yoda"]);
        assert_eq!(
            journal.last().unwrap().payload(),
            &FactoryEvent::EmployeeAssigned(EmployeeAssigned {
                employee_name: "yoda".into()
            })
        );
    }

    #[test]
    fn duplicate_assignment_changes_nothing() {
        let (mut factory, mut journal) = new_factory();
        execute(&mut factory, &mut journal, &FactoryCommand::assign_employee("yoda")).unwrap();
        let before = factory.current_state();

        let code = rejection_code(
            &mut factory,
            &mut journal,
            FactoryCommand::assign_employee("yoda"),
        );

        assert_eq!(code, "employee-name-already-taken");
        assert_eq!(journal.len(), 1);
        assert_eq!(factory.current_state(), before);
    }

    #[test]
    fn bender_is_never_hired() {
        let (mut factory, mut journal) = new_factory();
        for name in ["bender", "Bender", "bEnDeR"] {
            let code =
                rejection_code(&mut factory, &mut journal, FactoryCommand::assign_employee(name));
            assert_eq!(code, "bender-employee");
        }
        assert!(journal.is_empty());
        assert_eq!(factory.current_state(), FactoryState::new());
    }

    #[test]
    fn shipment_before_anyone_is_assigned_is_rejected() {
        let (mut factory, mut journal) = new_factory();
        let code = rejection_code(
            &mut factory,
            &mut journal,
            FactoryCommand::transfer_shipment("chassis", vec![CarPart::new("chassis", 4)]),
        );
        assert_eq!(code, "no-employee");
        assert!(journal.is_empty());
    }

    #[test]
    fn third_pending_shipment_is_rejected() {
        let (mut factory, mut journal) = new_factory();
        execute(&mut factory, &mut journal, &FactoryCommand::assign_employee("yoda")).unwrap();

        for name in ["first", "second"] {
            execute(
                &mut factory,
                &mut journal,
                &FactoryCommand::transfer_shipment(name, vec![CarPart::new("wheels", 1)]),
            )
            .unwrap();
        }
        let len = journal.len();

        let code = rejection_code(
            &mut factory,
            &mut journal,
            FactoryCommand::transfer_shipment("third", vec![CarPart::new("wheels", 1)]),
        );
        assert_eq!(code, "cargo-bay-full");
        assert_eq!(journal.len(), len);
        assert_eq!(factory.state().pending_count(), 2);
    }

    #[test]
    fn large_shipment_also_records_a_remark() {
        let (mut factory, mut journal) = new_factory();
        execute(&mut factory, &mut journal, &FactoryCommand::assign_employee("yoda")).unwrap();

        let positions = execute(
            &mut factory,
            &mut journal,
            &FactoryCommand::transfer_shipment("spares", big_shipment()),
        )
        .unwrap();

        assert_eq!(positions, vec![1, 2]);
        assert!(matches!(
            journal.get(1).unwrap().payload(),
            FactoryEvent::ShipmentReceived(_)
        ));
        assert!(matches!(
            journal.get(2).unwrap().payload(),
            FactoryEvent::RemarkUttered(_)
        ));
    }

    #[test]
    fn shipment_at_threshold_gets_no_remark() {
        let (mut factory, mut journal) = new_factory();
        execute(&mut factory, &mut journal, &FactoryCommand::assign_employee("yoda")).unwrap();

        let positions = execute(
            &mut factory,
            &mut journal,
            &FactoryCommand::transfer_shipment("exact", vec![CarPart::new("wheels", 10)]),
        )
        .unwrap();
        assert_eq!(positions.len(), 1);
    }

    #[test]
    fn malformed_shipment_is_a_validation_error() {
        let (mut factory, mut journal) = new_factory();
        execute(&mut factory, &mut journal, &FactoryCommand::assign_employee("yoda")).unwrap();

        let err = execute(
            &mut factory,
            &mut journal,
            &FactoryCommand::transfer_shipment("broken", vec![CarPart::new("wheels", -3)]),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn a_day_at_the_factory() {
        let (mut factory, mut journal) = new_factory();
        let commands = [
            FactoryCommand::assign_employee("yoda"),
            FactoryCommand::assign_employee("luke"),
            FactoryCommand::transfer_shipment("spares", big_shipment()),
            FactoryCommand::unpack_shipments("yoda"),
            FactoryCommand::produce_car("luke", "Model T"),
        ];
        for command in &commands {
            execute(&mut factory, &mut journal, command).unwrap();
        }

        let state = factory.state();
        assert_eq!(state.cars_produced(), ["Model T"]);
        assert_eq!(state.pending_count(), 0);
        assert_eq!(state.available("wheels"), 14);
        assert_eq!(state.available("engine"), 6);
        assert_eq!(state.available("bits and pieces"), 4);

        assert_eq!(
            rejection_code(
                &mut factory,
                &mut journal,
                FactoryCommand::produce_car("luke", "Model T")
            ),
            "employee-already-produced-car"
        );
        assert_eq!(
            rejection_code(
                &mut factory,
                &mut journal,
                FactoryCommand::unpack_shipments("yoda")
            ),
            "employee-already-unpacked"
        );

        assert_eq!(rebuild_state(&journal), factory.current_state());
        assert_eq!(Factory::from_journal(FactoryRules::default(), &journal), factory);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let (mut factory, mut journal) = new_factory();
        execute(&mut factory, &mut journal, &FactoryCommand::assign_employee("yoda")).unwrap();
        let before = factory.clone();

        let _ = factory.handle(&FactoryCommand::transfer_shipment("spares", big_shipment()));
        let _ = factory.handle(&FactoryCommand::assign_employee("yoda"));

        assert_eq!(factory, before);
    }

    #[test]
    fn rules_are_configurable() {
        let rules = FactoryRules {
            remark_threshold: 100,
            blacklisted_names: vec!["zapp".into()],
            ..FactoryRules::default()
        };
        let id = AggregateId::new();
        let mut factory = Factory::empty(id, rules);
        let mut journal = Journal::new(id);

        execute(&mut factory, &mut journal, &FactoryCommand::assign_employee("bender")).unwrap();
        assert_eq!(
            rejection_code(&mut factory, &mut journal, FactoryCommand::assign_employee("Zapp")),
            "bender-employee"
        );
        let positions = execute(
            &mut factory,
            &mut journal,
            &FactoryCommand::transfer_shipment("spares", big_shipment()),
        )
        .unwrap();
        assert_eq!(positions.len(), 1);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn employee_name() -> impl Strategy<Value = String> {
            prop::sample::select(vec!["yoda", "luke", "bender", "Bender", "han", ""])
                .prop_map(str::to_string)
        }

        fn car_part() -> impl Strategy<Value = CarPart> {
            (
                prop::sample::select(vec!["wheels", "engine", "bits and pieces", "chassis"]),
                -1i64..15,
            )
                .prop_map(|(name, quantity)| CarPart::new(name, quantity))
        }

        fn command() -> impl Strategy<Value = FactoryCommand> {
            prop_oneof![
                3 => employee_name().prop_map(FactoryCommand::assign_employee),
                3 => ("[a-z]{0,6}", prop::collection::vec(car_part(), 0..4))
                    .prop_map(|(name, parts)| FactoryCommand::transfer_shipment(name, parts)),
                1 => employee_name().prop_map(FactoryCommand::unpack_shipments),
                1 => (employee_name(), prop::sample::select(vec!["Model T", "Model S"]))
                    .prop_map(|(name, model)| FactoryCommand::produce_car(name, model)),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: folding the journal from empty equals the live state.
            #[test]
            fn rebuild_matches_live_state(commands in prop::collection::vec(command(), 0..40)) {
                let (mut factory, mut journal) = new_factory();
                for command in &commands {
                    let _ = execute(&mut factory, &mut journal, command);
                }

                prop_assert_eq!(rebuild_state(&journal), factory.current_state());
                prop_assert_eq!(factory.version(), journal.len() as u64);
            }

            /// Property: replaying the same journal twice yields the same state.
            #[test]
            fn replay_is_deterministic(commands in prop::collection::vec(command(), 0..40)) {
                let (mut factory, mut journal) = new_factory();
                for command in &commands {
                    let _ = execute(&mut factory, &mut journal, command);
                }

                let first = Factory::from_journal(FactoryRules::default(), &journal);
                let second = Factory::from_journal(FactoryRules::default(), &journal);
                prop_assert_eq!(first, second);
            }

            /// Property: a rejected command leaves journal and state untouched.
            #[test]
            fn rejection_changes_nothing(
                commands in prop::collection::vec(command(), 0..30),
                probe in command()
            ) {
                let (mut factory, mut journal) = new_factory();
                for command in &commands {
                    let _ = execute(&mut factory, &mut journal, command);
                }
                let state_before = factory.current_state();
                let len_before = journal.len();

                if execute(&mut factory, &mut journal, &probe).is_err() {
                    prop_assert_eq!(factory.current_state(), state_before);
                    prop_assert_eq!(journal.len(), len_before);
                } else {
                    prop_assert!(journal.len() > len_before);
                }
            }

            /// Property: handle is side-effect free and deterministic.
            #[test]
            fn handle_is_pure(
                commands in prop::collection::vec(command(), 0..30),
                probe in command()
            ) {
                let (mut factory, mut journal) = new_factory();
                for command in &commands {
                    let _ = execute(&mut factory, &mut journal, command);
                }
                let before = factory.clone();

                let first = factory.handle(&probe);
                let second = factory.handle(&probe);

                prop_assert_eq!(&factory, &before);
                prop_assert_eq!(first, second);
            }

            /// Property: the cargo bay never holds more than its capacity.
            #[test]
            fn pending_never_exceeds_capacity(commands in prop::collection::vec(command(), 0..40)) {
                let (mut factory, mut journal) = new_factory();
                for command in &commands {
                    let _ = execute(&mut factory, &mut journal, command);
                    prop_assert!(
                        factory.state().pending_count() <= factory.rules().cargo_bay_capacity
                    );
                }
            }
        }
    }
}
