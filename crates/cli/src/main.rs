use anyhow::{Context, bail};

use carworks_core::AggregateRoot;
use carworks_events::ProjectionRunner;
use carworks_factory::{
    AGGREGATE_TYPE, CarPart, CargoBayInventory, Factory, FactoryCommand, FactoryEvent,
    WorkerRegistry,
};
use carworks_infra::{AppConfig, CommandDispatcher, CommandOutcome, SharedDispatcher};

/// A day at the factory, in the order things happen.
fn workday() -> Vec<FactoryCommand> {
    vec![
        FactoryCommand::transfer_shipment("chassis", vec![CarPart::new("chassis", 4)]),
        FactoryCommand::assign_employee("yoda"),
        FactoryCommand::assign_employee("luke"),
        FactoryCommand::assign_employee("yoda"),
        FactoryCommand::assign_employee("bender"),
        FactoryCommand::transfer_shipment(
            "spares",
            vec![
                CarPart::new("wheels", 20),
                CarPart::new("engine", 7),
                CarPart::new("bits and pieces", 6),
            ],
        ),
        FactoryCommand::unpack_shipments("yoda"),
        FactoryCommand::produce_car("luke", "Model T"),
    ]
}

/// Narrate an outcome. A rejection is an ordinary result, not a warning.
fn log_outcome(outcome: &CommandOutcome<FactoryEvent>) {
    match outcome {
        CommandOutcome::Accepted { events } => {
            for envelope in events {
                tracing::info!(position = envelope.position(), "{}", envelope.payload());
            }
        }
        CommandOutcome::Rejected { reason } => {
            tracing::info!(code = reason.code(), "{reason}");
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("loading configuration")?;
    carworks_observability::init_with(config.log_format);

    let store = config.open_store().context("opening journal store")?;
    let dispatcher = CommandDispatcher::recover(
        AGGREGATE_TYPE,
        Factory::empty(config.factory_id, config.rules.clone()),
        store,
    )
    .context("recovering factory journal")?;
    let factory = SharedDispatcher::new(dispatcher);

    for command in workday() {
        log_outcome(&factory.submit(&command)?);
    }

    let current = factory.current_state()?;
    let rebuilt = factory.rebuild_state()?;
    let version = factory.read(|d| d.aggregate().version())?;

    if rebuilt != current {
        bail!("state rebuilt from the journal differs from the live state at version {version}");
    }

    tracing::info!(
        version,
        employees = current.employees().len(),
        pending_shipments = current.pending_count(),
        cars_produced = current.cars_produced().len(),
        "journal replay matches live state"
    );

    let (workers, inventory) = factory.read(|d| {
        let (workers, _) =
            ProjectionRunner::rebuild_from_scratch(WorkerRegistry::default, d.journal())?;
        let (inventory, _) =
            ProjectionRunner::rebuild_from_scratch(CargoBayInventory::default, d.journal())?;
        Ok::<_, carworks_events::ProjectionError>((workers, inventory))
    })??;

    for name in workers.names() {
        tracing::info!(employee = name, joined_at = workers.joined_at(name), "worker");
    }
    for (part, quantity) in inventory.parts() {
        tracing::info!(part = %part, quantity, "part on the premises");
    }
    tracing::info!(
        workers = workers.len(),
        cars_produced = inventory.cars_produced(),
        "read models rebuilt"
    );
    Ok(())
}
