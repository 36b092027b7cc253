use thiserror::Error;

use crate::value::AttributeKind;

/// Which record an attribute lookup was made against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSide {
    Desired,
    Observed,
}

impl std::fmt::Display for RecordSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Desired => write!(f, "desired"),
            Self::Observed => write!(f, "observed"),
        }
    }
}

/// Fatal errors raised by the reconciliation engine.
///
/// None of these are retryable: they signal either a schema/record mismatch
/// in the calling resource module or a broken contract with the transport.
/// Caller-facing validation problems are reported separately as
/// [`ValidationError`](crate::policy::ValidationError) lists.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Schema mismatch: attribute '{attribute}' is missing from the {side} record")]
    SchemaMismatch {
        attribute: String,
        side: RecordSide,
    },

    #[error("Kind mismatch for attribute '{attribute}': declared {expected}, found {found}")]
    KindMismatch {
        attribute: String,
        expected: AttributeKind,
        found: AttributeKind,
    },

    #[error("Invalid variant policy: {0}")]
    InvalidPolicy(String),

    #[error("Response has no populated variant (expected one of: {})", .variants.join(", "))]
    UnpopulatedResponse { variants: Vec<String> },

    #[error("Invalid response value for '{attribute}': {message}")]
    InvalidResponseValue { attribute: String, message: String },
}

impl EngineError {
    /// Create a new SchemaMismatch error
    pub fn schema_mismatch(attribute: impl Into<String>, side: RecordSide) -> Self {
        Self::SchemaMismatch {
            attribute: attribute.into(),
            side,
        }
    }

    /// Create a new KindMismatch error
    pub fn kind_mismatch(
        attribute: impl Into<String>,
        expected: AttributeKind,
        found: AttributeKind,
    ) -> Self {
        Self::KindMismatch {
            attribute: attribute.into(),
            expected,
            found,
        }
    }

    /// Create a new InvalidPolicy error
    pub fn invalid_policy(message: impl Into<String>) -> Self {
        Self::InvalidPolicy(message.into())
    }

    /// Create a new InvalidResponseValue error
    pub fn invalid_response_value(
        attribute: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidResponseValue {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SchemaMismatch { .. } | Self::KindMismatch { .. } => ErrorCategory::Schema,
            Self::InvalidPolicy(_) => ErrorCategory::Policy,
            Self::UnpopulatedResponse { .. } | Self::InvalidResponseValue { .. } => {
                ErrorCategory::TransportContract
            }
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A field list and a record disagree
    Schema,
    /// A variant table is internally inconsistent
    Policy,
    /// The transport handed back something the remote contract forbids
    TransportContract,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema => write!(f, "schema"),
            Self::Policy => write!(f, "policy"),
            Self::TransportContract => write!(f, "transport_contract"),
        }
    }
}

/// Convenience result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_message() {
        let err = EngineError::schema_mismatch("enabled", RecordSide::Observed);
        assert_eq!(
            err.to_string(),
            "Schema mismatch: attribute 'enabled' is missing from the observed record"
        );
        assert_eq!(err.category(), ErrorCategory::Schema);
    }

    #[test]
    fn test_kind_mismatch_message() {
        let err = EngineError::kind_mismatch("enabled", AttributeKind::Bool, AttributeKind::String);
        assert_eq!(
            err.to_string(),
            "Kind mismatch for attribute 'enabled': declared bool, found string"
        );
    }

    #[test]
    fn test_unpopulated_response_lists_variants() {
        let err = EngineError::UnpopulatedResponse {
            variants: vec!["numeric".to_string(), "indicator".to_string()],
        };
        assert!(err.to_string().contains("numeric, indicator"));
        assert_eq!(err.category(), ErrorCategory::TransportContract);
    }

    #[test]
    fn test_error_categories_display() {
        assert_eq!(ErrorCategory::Schema.to_string(), "schema");
        assert_eq!(ErrorCategory::Policy.to_string(), "policy");
        assert_eq!(
            ErrorCategory::TransportContract.to_string(),
            "transport_contract"
        );
    }
}
