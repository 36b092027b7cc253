//! Configuration records: the desired, observed and mapped views of one
//! remote configuration object.

use indexmap::IndexMap;
use serde_json::Value;

use crate::operation::{Operation, OperationKind};
use crate::schema::FieldSpec;
use crate::value::AttributeValue;

/// Ordered attribute map plus the variant tag of polymorphic resources.
///
/// Records are plain values: every reconciliation call builds its own and
/// nothing mutates a record another call can see.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigurationRecord {
    variant_tag: Option<String>,
    attributes: IndexMap<String, AttributeValue>,
}

impl ConfigurationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record declaring every field as absent, in declaration order
    pub fn for_fields(fields: &[FieldSpec]) -> Self {
        let attributes = fields
            .iter()
            .map(|f| (f.name.clone(), AttributeValue::Absent))
            .collect();
        Self {
            variant_tag: None,
            attributes,
        }
    }

    pub fn with_variant(mut self, tag: impl Into<String>) -> Self {
        self.variant_tag = Some(tag.into());
        self
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn set_variant(&mut self, tag: Option<String>) {
        self.variant_tag = tag;
    }

    pub fn variant_tag(&self) -> Option<&str> {
        self.variant_tag.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Value of `name`, treating an undeclared attribute as absent
    pub fn value_or_absent(&self, name: &str) -> &AttributeValue {
        static ABSENT: AttributeValue = AttributeValue::Absent;
        self.attributes.get(name).unwrap_or(&ABSENT)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Apply operations to a copy of this record, as the server would
    pub fn apply(&self, operations: &[Operation]) -> ConfigurationRecord {
        let mut out = self.clone();
        for op in operations {
            let current = out.value_or_absent(&op.attribute).clone();
            let next = match op.kind {
                OperationKind::Replace => replaced_value(&current, &op.values),
                OperationKind::Add => {
                    let mut items = current.set_items().map(<[String]>::to_vec).unwrap_or_default();
                    items.extend(op.values.iter().map(element_string));
                    AttributeValue::set(items)
                }
                OperationKind::Delete => {
                    let removed: Vec<String> = op.values.iter().map(element_string).collect();
                    let items = current
                        .set_items()
                        .map(<[String]>::to_vec)
                        .unwrap_or_default()
                        .into_iter()
                        .filter(|item| !removed.contains(item));
                    AttributeValue::set(items)
                }
            };
            out.attributes.insert(op.attribute.clone(), next);
        }
        out
    }
}

fn replaced_value(current: &AttributeValue, values: &[Value]) -> AttributeValue {
    if matches!(current, AttributeValue::Set(_)) || values.len() > 1 {
        return AttributeValue::set(values.iter().map(element_string));
    }
    match values.first() {
        None | Some(Value::Null) => AttributeValue::Null,
        Some(Value::String(s)) => AttributeValue::String(s.clone()),
        Some(Value::Bool(b)) => AttributeValue::Bool(*b),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => AttributeValue::Integer(i),
            None => AttributeValue::Float(n.as_f64().unwrap_or_default()),
        },
        Some(other) => AttributeValue::String(other.to_string()),
    }
}

fn element_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
