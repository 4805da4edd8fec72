use thiserror::Error;

/// Errors surfaced by the usage tracker, the ranker inputs and the session controller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A caller supplied an out-of-domain value. State is left unchanged.
    #[error("invalid argument: {field} must be {expected}, got {value}")]
    InvalidArgument {
        field: &'static str,
        expected: &'static str,
        value: String,
    },

    /// A string did not name a known enum variant
    #[error("unknown {kind}: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    /// The key-value store rejected a write. Logged, never returned by mutators.
    #[error("failed to persist '{key}': {reason}")]
    PersistenceFailure { key: String, reason: String },
}

impl CoreError {
    pub(crate) fn invalid(
        field: &'static str,
        expected: &'static str,
        value: impl ToString,
    ) -> Self {
        Self::InvalidArgument {
            field,
            expected,
            value: value.to_string(),
        }
    }

    /// Whether this error is an argument validation failure
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}
