//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two values with the same attributes
/// are the same value. They are immutable once built; to "modify" one,
/// construct a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct CarPart {
///     name: String,
///     quantity: i64,
/// }
///
/// impl ValueObject for CarPart {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
