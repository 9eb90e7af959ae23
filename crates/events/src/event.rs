/// A fact recorded in a journal.
///
/// Once recorded, an event is never edited or removed. Folding events in
/// journal order is the only way derived state comes about, so `apply` on
/// the consuming side must accept every value of the implementing type.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Name stored alongside the payload (e.g. "factory.employee_assigned").
    fn event_type(&self) -> &'static str;

    /// Payload schema version, bumped when the serialized shape changes.
    fn version(&self) -> u32;
}
