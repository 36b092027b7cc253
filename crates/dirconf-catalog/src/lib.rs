//! Resource catalog and reconcile driver for directory server configuration.
//!
//! This crate turns the generic engine in `dirconf-core` into something a
//! provider can drive:
//! - Declares resource kinds as data tables (fields plus variant policy)
//! - Loads extra kinds and engine options from TOML and environment
//! - Decodes the configuration API's JSON into tagged response payloads
//! - Runs plan, submit, and map against an abstract [`ConfigApi`]
//!
//! # Architecture
//!
//! ```text
//!  Settings ──► Catalog ──► ResourceKind ──┐
//!  (toml/env)   (builtins     (fields +    │ plan()
//!                + declared)   policy)     ▼
//!                                   ┌────────────┐   create/update/read
//!                                   │ Reconciler ├──────────────────────► ConfigApi
//!                                   └─────┬──────┘◄──────────────────────  (JSON)
//!                                         │ decode_response() + read()
//!                                         ▼
//!                                  ReconcileOutcome
//! ```

use dirconf_core::{EngineError, ValidationError};

pub mod builtin;
pub mod catalog;
pub mod kind;
pub mod reconcile;
pub mod response;
pub mod settings;

// Re-export main types
pub use catalog::Catalog;
pub use kind::{Plan, ResourceKind};
pub use reconcile::{
    ConfigApi, DynConfigApi, ReconcileAction, ReconcileError, ReconcileOutcome, Reconciler,
    TransportError,
};
pub use settings::{EngineSettings, ResourceDecl, Settings, VariantDecl};

/// Error types for catalog operations
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Unknown resource kind: {0}")]
    UnknownKind(String),

    #[error("Resource kind '{0}' is already registered")]
    DuplicateKind(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

impl CatalogError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }

    /// Validation problems are the caller's to fix; everything else means
    /// the catalog or the transport is broken
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Validation(_))
    }

    /// Validation errors carried by this error, if any
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message_lists_all() {
        let err = CatalogError::Validation(vec![
            ValidationError::attribute("critical_value", "attribute not supported for variant indicator"),
            ValidationError::attribute("gauge_data_source", "attribute is required for variant indicator"),
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("Validation failed: critical_value:"));
        assert!(msg.contains("; gauge_data_source:"));
        assert!(!err.is_fatal());
        assert_eq!(err.validation_errors().len(), 2);
    }

    #[test]
    fn test_engine_errors_are_fatal() {
        let err: CatalogError = EngineError::invalid_policy("empty").into();
        assert!(err.is_fatal());
        assert!(err.validation_errors().is_empty());
        assert_eq!(CatalogError::UnknownKind("x".into()).to_string(), "Unknown resource kind: x");
    }
}
