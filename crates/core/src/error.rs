//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures. A command
/// that ends in any of these produced no events and changed no state.
/// Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A business rule refused the command.
    #[error("{code}: {reason}")]
    Rejected { code: &'static str, reason: String },

    /// The command input was malformed (e.g. negative quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn rejected(code: &'static str, reason: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            reason: reason.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Stable, machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Rejected { code, .. } => *code,
            DomainError::Validation(_) => "malformed-command",
            DomainError::InvalidId(_) => "invalid-id",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_displays_code_and_reason() {
        let err = DomainError::rejected("bender-employee", "guys with name 'bender' are trouble");
        assert_eq!(err.code(), "bender-employee");
        assert_eq!(
            err.to_string(),
            "bender-employee: guys with name 'bender' are trouble"
        );
    }

    #[test]
    fn validation_uses_malformed_code() {
        let err = DomainError::validation("quantity must be positive");
        assert_eq!(err.code(), "malformed-command");
    }
}
