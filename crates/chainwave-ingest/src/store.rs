//! The persistence boundary for library content.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use chainwave_model::{ChainBinding, EngineError, LibraryContent};

/// Opaque identification of which accounts/roles/libraries are visible.
///
/// The core passes this through into cache keys and entity filtering but
/// never interprets it; authorization policy lives outside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessScope(String);

impl AccessScope {
    /// Wraps an externally-issued scope token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Canonical string form, stable for cache keying.
    pub fn canonical(&self) -> &str {
        &self.0
    }
}

/// Failure talking to a persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("store operation {operation} failed: {message}")]
pub struct StoreError {
    /// The store operation that failed.
    pub operation: &'static str,
    /// Collaborator-reported cause.
    pub message: String,
}

impl StoreError {
    /// Creates a store error for an operation.
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        EngineError::transient(err.operation, err.message)
    }
}

/// Loads library entities reachable from chain bindings.
///
/// The engine is agnostic to what backs this: relational, document, or
/// in-memory. Implementations filter by the caller's access scope before
/// returning content.
pub trait LibraryStore: Send + Sync {
    /// Collects all entities reachable from the bindings: libraries, their
    /// programs and instruments, and directly-bound entities.
    fn load_library_entities(
        &self,
        scope: &AccessScope,
        bindings: &[ChainBinding],
    ) -> Result<LibraryContent, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_become_transient_engine_errors() {
        let err: EngineError = StoreError::new("load_library_entities", "connection reset").into();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("load_library_entities"));
    }
}
