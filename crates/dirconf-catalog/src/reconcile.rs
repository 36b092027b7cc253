//! Reconcile driver: plan, submit, and map one configuration object.
//!
//! The driver owns no retry or scheduling logic. A failed submission is
//! reported and the caller simply reconciles again with a fresh observed
//! record.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dirconf_core::{ConfigurationRecord, MappedRecord, MappingWarning, Operation, ValidationError};
use serde_json::Value;
use tracing::{info, warn};

use crate::CatalogError;
use crate::catalog::Catalog;

/// Error returned by a [`ConfigApi`] implementation
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Remote configuration API, as seen by the driver.
///
/// Bodies are the API's JSON objects. Implementations own authentication,
/// timeouts and HTTP status handling.
#[async_trait]
pub trait ConfigApi: Send + Sync {
    /// Reads an object. Returns `None` if it does not exist.
    async fn read(&self, kind: &str, id: &str) -> Result<Option<Value>, TransportError>;

    /// Creates an object from a full body and returns the stored object.
    async fn create(&self, kind: &str, id: &str, body: &Value) -> Result<Value, TransportError>;

    /// Applies a patch body (`{"operations": [...]}`) and returns the
    /// stored object.
    async fn update(&self, kind: &str, id: &str, patch: &Value) -> Result<Value, TransportError>;
}

pub type DynConfigApi = Arc<dyn ConfigApi>;

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Validation failed for {kind} '{id}': {}", join(.errors))]
    Validation {
        kind: String,
        id: String,
        errors: Vec<ValidationError>,
    },

    #[error(transparent)]
    Catalog(CatalogError),

    #[error("Transport error during {action} of {kind} '{id}': {source}")]
    Transport {
        action: ReconcileAction,
        kind: String,
        id: String,
        #[source]
        source: TransportError,
    },

    #[error("{kind} '{id}' does not exist")]
    NotFound { kind: String, id: String },
}

impl ReconcileError {
    fn from_catalog(err: CatalogError, kind: &str, id: &str) -> Self {
        match err {
            CatalogError::Validation(errors) => Self::Validation {
                kind: kind.to_string(),
                id: id.to_string(),
                errors,
            },
            other => Self::Catalog(other),
        }
    }

    /// Validation problems are for the end user to fix; everything else
    /// aborts the resource operation
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Validation { .. })
    }

    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Validation { errors, .. } => errors,
            _ => &[],
        }
    }
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// What the driver did to the remote object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    Created,
    Updated,
    /// Nothing to patch; the object was re-read
    Unchanged,
}

impl fmt::Display for ReconcileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "create"),
            Self::Updated => write!(f, "update"),
            Self::Unchanged => write!(f, "read"),
        }
    }
}

/// Result of reconciling one object
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    pub action: ReconcileAction,
    /// New local view of the object
    pub record: ConfigurationRecord,
    /// Operations that were submitted (all planned ones for a create)
    pub operations: Vec<Operation>,
    pub warnings: Vec<MappingWarning>,
}

pub struct Reconciler {
    catalog: Arc<Catalog>,
    api: DynConfigApi,
}

impl Reconciler {
    pub fn new(catalog: Arc<Catalog>, api: DynConfigApi) -> Self {
        Self { catalog, api }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Bring the remote object `id` of `kind` in line with `desired`.
    ///
    /// `observed` is the last known remote state; `None` means the object
    /// does not exist yet and is created. Validation errors stop the call
    /// before anything is sent.
    pub async fn apply(
        &self,
        kind: &str,
        id: &str,
        desired: &ConfigurationRecord,
        observed: Option<&ConfigurationRecord>,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let resource = self
            .catalog
            .get(kind)
            .map_err(|e| ReconcileError::from_catalog(e, kind, id))?;

        let baseline = observed.cloned().unwrap_or_else(|| resource.empty_record());
        let plan = resource
            .plan(desired, &baseline)
            .map_err(|e| ReconcileError::from_catalog(e, kind, id))?;

        let (action, response) = match observed {
            None => {
                let body = resource.encode_record(&plan.prepared);
                let response = self.api.create(kind, id, &body).await;
                (ReconcileAction::Created, response.map(Some))
            }
            Some(_) if plan.is_noop() => (ReconcileAction::Unchanged, self.api.read(kind, id).await),
            Some(_) => {
                let patch = resource.encode_patch(&plan.operations);
                let response = self.api.update(kind, id, &patch).await;
                (ReconcileAction::Updated, response.map(Some))
            }
        };
        let response = response
            .map_err(|source| transport_error(action, kind, id, source))?
            .ok_or_else(|| ReconcileError::NotFound {
                kind: kind.to_string(),
                id: id.to_string(),
            })?;

        let mapped = resource
            .decode_response(&response)
            .and_then(|payload| resource.read(&payload, &plan.prepared))
            .map_err(|e| ReconcileError::from_catalog(e, kind, id))?;

        info!(
            kind = %kind,
            id = %id,
            action = %action,
            operations = plan.operations.len(),
            warnings = mapped.warnings.len(),
            "configuration object reconciled"
        );

        Ok(ReconcileOutcome {
            action,
            record: mapped.record,
            operations: plan.operations,
            warnings: mapped.warnings,
        })
    }

    /// Re-read `id` and map it against `expected`. Returns `None` when the
    /// object no longer exists.
    pub async fn refresh(
        &self,
        kind: &str,
        id: &str,
        expected: &ConfigurationRecord,
    ) -> Result<Option<MappedRecord>, ReconcileError> {
        let resource = self
            .catalog
            .get(kind)
            .map_err(|e| ReconcileError::from_catalog(e, kind, id))?;

        let Some(response) = self
            .api
            .read(kind, id)
            .await
            .map_err(|source| transport_error(ReconcileAction::Unchanged, kind, id, source))?
        else {
            info!(kind = %kind, id = %id, "configuration object is gone");
            return Ok(None);
        };

        let mapped = resource
            .decode_response(&response)
            .and_then(|payload| resource.read(&payload, expected))
            .map_err(|e| ReconcileError::from_catalog(e, kind, id))?;
        Ok(Some(mapped))
    }
}

fn transport_error(
    action: ReconcileAction,
    kind: &str,
    id: &str,
    source: TransportError,
) -> ReconcileError {
    warn!(kind = %kind, id = %id, action = %action, error = %source, "transport call failed");
    ReconcileError::Transport {
        action,
        kind: kind.to_string(),
        id: id.to_string(),
        source,
    }
}
