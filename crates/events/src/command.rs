/// A request to change state (command abstraction).
///
/// Commands represent **intent**. They are transient (never recorded) and are
/// either rejected, producing nothing, or accepted, producing events.
///
/// - **Command**: "Assign employee yoda to the factory"
/// - **Event**: "EmployeeAssigned { employee_name: yoda }"
///
/// Commands must be cloneable and own their data so they can be logged,
/// queued, or handed across threads to a single writer.
pub trait Command: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable command name used in logs (e.g. "assign_employee").
    fn command_name(&self) -> &'static str;
}
