//! Patch operations produced by the change detectors.

use serde::Serialize;
use serde_json::Value;

/// Kind of patch instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Replace the whole attribute value
    Replace,
    /// Add elements to a set attribute
    Add,
    /// Remove elements from a set attribute
    #[serde(rename = "remove")]
    Delete,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::Add => write!(f, "add"),
            Self::Delete => write!(f, "remove"),
        }
    }
}

/// One minimal patch instruction against a single attribute.
///
/// Serializes as `{"op": ..., "path": ..., "value": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    #[serde(rename = "op")]
    pub kind: OperationKind,
    #[serde(rename = "path")]
    pub attribute: String,
    #[serde(rename = "value")]
    pub values: Vec<Value>,
}

impl Operation {
    pub fn new(kind: OperationKind, attribute: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            kind,
            attribute: attribute.into(),
            values,
        }
    }

    pub fn replace(attribute: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(OperationKind::Replace, attribute, values)
    }

    pub fn add<I, S>(attribute: impl Into<String>, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(OperationKind::Add, attribute, string_values(elements))
    }

    pub fn delete<I, S>(attribute: impl Into<String>, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(OperationKind::Delete, attribute, string_values(elements))
    }
}

fn string_values<I, S>(elements: I) -> Vec<Value>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    elements
        .into_iter()
        .map(|e| Value::String(e.into()))
        .collect()
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values: Vec<String> = self.values.iter().map(Value::to_string).collect();
        write!(f, "{} {} [{}]", self.kind, self.attribute, values.join(", "))
    }
}
