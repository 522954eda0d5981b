//! Engine error taxonomy.
//!
//! Four kinds cross the module boundary, and nothing else does:
//!
//! - [`ValidationError`] — malformed or missing required fields; never
//!   retried, fails the segment/chain immediately.
//! - [`ConfigError`] — missing or invalid scheduling/cache configuration;
//!   fatal for the affected worker tick.
//! - [`EngineError::Transient`] — I/O failure against persistence, Dub, or
//!   Ship; retried up to a bounded count.
//! - [`EngineError::NotFound`] — a referenced entity no longer resolves;
//!   treated as a craft-stage-local skip unless it names the macro/main
//!   program itself.

use thiserror::Error;

/// A validation failure naming the violated field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed on {field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the violated field (e.g. `segment.state`).
    pub field: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error for a field.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Invalid or missing engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A numeric parameter is outside its valid range.
    #[error("config {name} out of range: {message}")]
    OutOfRange {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with the value.
        message: String,
    },
    /// The configuration document could not be parsed.
    #[error("config unreadable: {0}")]
    Unreadable(String),
}

/// The top-level error type of the fabrication core.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Never retried; fails the subject immediately.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Fatal for the current worker tick.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Retryable I/O failure against a collaborator.
    #[error("transient failure in {operation}: {message}")]
    Transient {
        /// The operation that failed (e.g. `save_segment`, `dub`).
        operation: String,
        /// Collaborator-reported cause.
        message: String,
    },

    /// A referenced entity id no longer resolves.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entity kind (e.g. `program`, `instrument`).
        kind: &'static str,
        /// The unresolved id, rendered.
        id: String,
    },
}

impl EngineError {
    /// Creates a transient error for an operation.
    pub fn transient(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transient {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a not-found error for an entity.
    pub fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether a Follower may retry the operation that produced this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Transient { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_errors_are_retryable() {
        assert!(EngineError::transient("dub", "timeout").is_retryable());
        assert!(!EngineError::not_found("program", 5).is_retryable());
        assert!(!EngineError::from(ValidationError::new("segment.key", "missing")).is_retryable());
    }

    #[test]
    fn errors_render_their_context() {
        let err = ValidationError::new("segment.tempo", "must be positive");
        assert_eq!(
            err.to_string(),
            "validation failed on segment.tempo: must be positive"
        );
        let err = EngineError::not_found("instrument", 12);
        assert_eq!(err.to_string(), "instrument 12 not found");
    }
}
