//! Resource kinds: one field table and optional variant policy per remote
//! object type.

use dirconf_core::{
    ConfigurationRecord, DiscriminatorPolicy, FieldSpec, MappedRecord, Operation,
    ResponseMapper, ResponsePayload, ValidationError, VariantPolicy, build_operations,
    mark_obscured_fields,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::response;
use crate::{CatalogError, Result};

/// Root of the configuration API's schema URNs
pub const SCHEMA_URN_ROOT: &str = "urn:pingidentity:schemas:configuration:2.0";

/// Outcome of planning one update
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Desired record after variant preparation; this is what the response
    /// is later mapped against
    pub prepared: ConfigurationRecord,
    pub operations: Vec<Operation>,
}

impl Plan {
    pub fn is_noop(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Declarative description of one remote configuration object type
#[derive(Debug, Clone)]
pub struct ResourceKind {
    name: String,
    fields: Vec<FieldSpec>,
    policy: Option<DiscriminatorPolicy>,
    schema_urn_prefix: String,
    warn_on_reformat: bool,
}

impl ResourceKind {
    /// Create a kind without variants. The schema URN prefix defaults to
    /// the root plus the kind name in kebab case.
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        let name = name.into();
        let schema_urn_prefix = format!("{SCHEMA_URN_ROOT}:{}", name.replace('_', "-"));
        Self {
            name,
            fields,
            policy: None,
            schema_urn_prefix,
            warn_on_reformat: true,
        }
    }

    /// Attach a variant table, making the kind polymorphic
    pub fn with_variants(mut self, variants: Vec<VariantPolicy>) -> Result<Self> {
        self.policy = Some(DiscriminatorPolicy::new(&self.fields, variants)?);
        Ok(self)
    }

    pub fn with_schema_urn_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.schema_urn_prefix = prefix.into();
        self
    }

    pub fn warn_on_reformat(mut self, enabled: bool) -> Self {
        self.warn_on_reformat = enabled;
        self
    }

    /// Treat sensitive-looking fields, plus `extra`, as obscured
    pub fn mark_obscured(mut self, extra: &[String]) -> Self {
        mark_obscured_fields(&mut self.fields, extra);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn policy(&self) -> Option<&DiscriminatorPolicy> {
        self.policy.as_ref()
    }

    pub fn is_polymorphic(&self) -> bool {
        self.policy.is_some()
    }

    pub fn schema_urn_prefix(&self) -> &str {
        &self.schema_urn_prefix
    }

    /// Schema URN for `variant`, or the bare prefix for untagged kinds
    pub fn schema_urn(&self, variant: Option<&str>) -> String {
        match variant {
            Some(tag) => format!("{}:{tag}", self.schema_urn_prefix),
            None => self.schema_urn_prefix.clone(),
        }
    }

    /// Record with every field declared and absent
    pub fn empty_record(&self) -> ConfigurationRecord {
        ConfigurationRecord::for_fields(&self.fields)
    }

    pub fn validate(&self, record: &ConfigurationRecord) -> Vec<ValidationError> {
        match &self.policy {
            Some(policy) => policy.validate(record),
            None => Vec::new(),
        }
    }

    /// Prepare `desired` for its variant and compute the operations that
    /// bring `observed` in line with it.
    pub fn plan(
        &self,
        desired: &ConfigurationRecord,
        observed: &ConfigurationRecord,
    ) -> Result<Plan> {
        let prepared = match &self.policy {
            Some(policy) => policy.prepare(desired).map_err(CatalogError::Validation)?,
            None => desired.clone(),
        };
        let operations = build_operations(&prepared, observed, &self.fields)?;
        debug!(kind = %self.name, operations = operations.len(), "planned update");
        Ok(Plan {
            prepared,
            operations,
        })
    }

    /// Decode a raw API object into a tagged response payload
    pub fn decode_response(&self, body: &Value) -> Result<ResponsePayload> {
        response::decode_payload(self, body)
    }

    /// Map a response back into a local record using `expected` to fill in
    /// what the server does not echo
    pub fn read(
        &self,
        payload: &ResponsePayload,
        expected: &ConfigurationRecord,
    ) -> Result<MappedRecord> {
        let mapped = ResponseMapper::new(&self.fields)
            .warn_on_reformat(self.warn_on_reformat)
            .map(payload, expected)?;
        for warning in &mapped.warnings {
            warn!(kind = %self.name, "{warning}");
        }
        Ok(mapped)
    }

    /// Encode a full record as a create request body
    pub fn encode_record(&self, record: &ConfigurationRecord) -> Value {
        response::encode_record(self, record)
    }

    /// Encode operations as a patch request body
    pub fn encode_patch(&self, operations: &[Operation]) -> Value {
        response::encode_patch(self, operations)
    }
}
