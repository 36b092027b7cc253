//! Variant response mapper: turns the transport's tagged-union response into
//! one local record.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

use crate::error::{EngineError, Result};
use crate::record::ConfigurationRecord;
use crate::schema::FieldSpec;
use crate::value::AttributeValue;

/// Attribute map of one populated response branch, keyed by field name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseBody {
    attributes: IndexMap<String, Value>,
}

impl ResponseBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl FromIterator<(String, Value)> for ResponseBody {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}

/// One branch of the response union
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSlot {
    /// Variant tag; `None` for resources that are not polymorphic
    pub tag: Option<String>,
    pub body: Option<ResponseBody>,
}

/// Transport-shaped tagged union: one slot per variant, in priority order.
/// The server populates at most one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponsePayload {
    slots: Vec<ResponseSlot>,
}

impl ResponsePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload of a resource without variants
    pub fn untagged(body: ResponseBody) -> Self {
        Self {
            slots: vec![ResponseSlot {
                tag: None,
                body: Some(body),
            }],
        }
    }

    pub fn with_slot(mut self, tag: impl Into<String>, body: Option<ResponseBody>) -> Self {
        self.slots.push(ResponseSlot {
            tag: Some(tag.into()),
            body,
        });
        self
    }

    pub fn slots(&self) -> &[ResponseSlot] {
        &self.slots
    }

    /// Pick the populated branch.
    ///
    /// No populated branch is a transport contract violation. More than one
    /// should never happen; the first in priority order wins and a warning is
    /// logged.
    pub fn select(&self) -> Result<SelectedVariant<'_>> {
        let mut populated = self
            .slots
            .iter()
            .filter_map(|slot| slot.body.as_ref().map(|body| (slot, body)));

        let Some((slot, body)) = populated.next() else {
            return Err(EngineError::UnpopulatedResponse {
                variants: self
                    .slots
                    .iter()
                    .map(|s| s.tag.clone().unwrap_or_else(|| "<untagged>".to_string()))
                    .collect(),
            });
        };

        let extra: Vec<&str> = populated
            .map(|(s, _)| s.tag.as_deref().unwrap_or("<untagged>"))
            .collect();
        if !extra.is_empty() {
            warn!(
                selected = slot.tag.as_deref().unwrap_or("<untagged>"),
                ignored = ?extra,
                "response populated more than one variant"
            );
        }

        Ok(SelectedVariant {
            tag: slot.tag.as_deref(),
            body,
        })
    }
}

/// The branch chosen by [`ResponsePayload::select`]
#[derive(Debug, Clone, Copy)]
pub struct SelectedVariant<'a> {
    pub tag: Option<&'a str>,
    pub body: &'a ResponseBody,
}

/// Non-fatal findings while mapping a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingWarning {
    /// The server rewrote a value into an equivalent spelling
    Reformatted {
        attribute: String,
        expected: String,
        returned: String,
    },
    /// The server reports a different variant than the caller expected
    VariantChanged { expected: String, returned: String },
}

impl fmt::Display for MappingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reformatted {
                attribute,
                expected,
                returned,
            } => write!(
                f,
                "attribute '{attribute}' was set to \"{expected}\" but the server returned \
                 the equivalent \"{returned}\""
            ),
            Self::VariantChanged { expected, returned } => write!(
                f,
                "expected variant '{expected}' but the server reports '{returned}'"
            ),
        }
    }
}

/// Mapped record plus the warnings raised while building it
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRecord {
    pub record: ConfigurationRecord,
    pub warnings: Vec<MappingWarning>,
}

/// Maps responses for one resource kind
#[derive(Debug, Clone, Copy)]
pub struct ResponseMapper<'a> {
    fields: &'a [FieldSpec],
    warn_on_reformat: bool,
}

impl<'a> ResponseMapper<'a> {
    pub fn new(fields: &'a [FieldSpec]) -> Self {
        Self {
            fields,
            warn_on_reformat: true,
        }
    }

    pub fn warn_on_reformat(mut self, enabled: bool) -> Self {
        self.warn_on_reformat = enabled;
        self
    }

    /// Build the local record from `payload`, using `expected` (what the
    /// caller last configured) to keep values the server cannot or does not
    /// faithfully echo.
    pub fn map(
        &self,
        payload: &ResponsePayload,
        expected: &ConfigurationRecord,
    ) -> Result<MappedRecord> {
        let selected = payload.select()?;
        let mut warnings = Vec::new();

        if let (Some(want), Some(got)) = (expected.variant_tag(), selected.tag) {
            if want != got {
                warnings.push(MappingWarning::VariantChanged {
                    expected: want.to_string(),
                    returned: got.to_string(),
                });
            }
        }

        let mut record = ConfigurationRecord::new();
        record.set_variant(selected.tag.map(str::to_string));

        for field in self.fields {
            let expected_value = expected.value_or_absent(&field.name);
            let value = if field.is_obscured() {
                // never echoed back; the remote copy is always missing
                expected_value.clone()
            } else {
                self.map_field(field, selected.body.get(&field.name), expected_value, &mut warnings)?
            };
            record.set(field.name.clone(), value);
        }

        Ok(MappedRecord { record, warnings })
    }

    fn map_field(
        &self,
        field: &FieldSpec,
        remote: Option<&Value>,
        expected: &AttributeValue,
        warnings: &mut Vec<MappingWarning>,
    ) -> Result<AttributeValue> {
        let returned = match remote {
            None => AttributeValue::Null,
            Some(raw) => AttributeValue::from_json(field.kind, raw)
                .map_err(|message| EngineError::invalid_response_value(&field.name, message))?,
        };

        // Same value (including null vs empty string): keep the caller's spelling
        if returned.same_value(expected) {
            return Ok(expected.clone());
        }

        if let (AttributeValue::String(got), AttributeValue::String(want)) = (&returned, expected) {
            if field.format.equivalent(want, got) {
                if self.warn_on_reformat {
                    warnings.push(MappingWarning::Reformatted {
                        attribute: field.name.clone(),
                        expected: want.clone(),
                        returned: got.clone(),
                    });
                }
                return Ok(expected.clone());
            }
        }

        if returned.is_inapplicable() {
            return Ok(field.inapplicable_value());
        }
        Ok(returned)
    }
}

/// Map a response with default options
pub fn map_response(
    payload: &ResponsePayload,
    expected: &ConfigurationRecord,
    fields: &[FieldSpec],
) -> Result<MappedRecord> {
    ResponseMapper::new(fields).map(payload, expected)
}
