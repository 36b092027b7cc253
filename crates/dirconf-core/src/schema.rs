//! Per-resource field declarations.
//!
//! A resource kind hands the engine one ordered list of [`FieldSpec`]s. The
//! order is the schema's declaration order and is what makes emitted
//! operation lists reproducible.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, RecordSide};
use crate::format::Format;
use crate::value::{AttributeKind, AttributeValue};

/// How an attribute flows between the caller and the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Access {
    /// Configured by the caller and echoed back by the server
    #[default]
    ReadWrite,
    /// Computed by the server; never patched
    ReadOnly,
    /// Obscured value: patched, but never echoed back
    WriteOnly,
}

/// Declaration of one attribute of a resource kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: AttributeKind,
    #[serde(default)]
    pub access: Access,
    #[serde(default)]
    pub format: Format,
    /// Member name on the wire when it is not the camelCase form of `name`,
    /// e.g. `includeJVMTrustManager`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wire_name: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            access: Access::ReadWrite,
            format: Format::Plain,
            wire_name: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::String)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Bool)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Float)
    }

    pub fn set(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::Set)
    }

    /// String attribute holding a duration such as `5 s`
    pub fn duration(name: impl Into<String>) -> Self {
        Self::string(name).with_format(Format::Duration)
    }

    pub fn read_only(mut self) -> Self {
        self.access = Access::ReadOnly;
        self
    }

    pub fn write_only(mut self) -> Self {
        self.access = Access::WriteOnly;
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_wire_name(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = Some(wire_name.into());
        self
    }

    pub fn is_obscured(&self) -> bool {
        self.access == Access::WriteOnly
    }

    /// Value that marks this attribute as inapplicable to a variant
    pub fn inapplicable_value(&self) -> AttributeValue {
        match self.kind {
            AttributeKind::Set => AttributeValue::Set(Vec::new()),
            _ => AttributeValue::Null,
        }
    }

    /// Ensure a concrete value agrees with the declared kind. Integers are
    /// accepted for float fields.
    pub fn check_kind(&self, value: &AttributeValue, side: RecordSide) -> Result<(), EngineError> {
        let Some(found) = value.kind() else {
            return Ok(());
        };
        let compatible = found == self.kind
            || (self.kind == AttributeKind::Float && found == AttributeKind::Integer);
        if compatible {
            Ok(())
        } else {
            tracing::debug!(attribute = %self.name, %side, "kind mismatch");
            Err(EngineError::kind_mismatch(&self.name, self.kind, found))
        }
    }
}
