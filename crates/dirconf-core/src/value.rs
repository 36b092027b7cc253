//! Typed attribute values and the null/empty equivalence rule.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared type of a configuration attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    String,
    Bool,
    Integer,
    Float,
    Set,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Bool => write!(f, "bool"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Set => write!(f, "set"),
        }
    }
}

/// A single attribute value in one of three states: absent (never
/// configured), null (explicitly cleared), or a concrete value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttributeValue {
    #[default]
    Absent,
    Null,
    String(String),
    Bool(bool),
    Integer(i64),
    Float(f64),
    /// Set of strings; insertion order is kept but carries no meaning
    Set(Vec<String>),
}

impl AttributeValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Build a set value, dropping duplicates and keeping first-seen order
    pub fn set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for item in items {
            let item = item.into();
            if seen.insert(item.clone()) {
                out.push(item);
            }
        }
        Self::Set(out)
    }

    /// Kind of a concrete value; `None` for absent and null
    pub fn kind(&self) -> Option<AttributeKind> {
        match self {
            Self::Absent | Self::Null => None,
            Self::String(_) => Some(AttributeKind::String),
            Self::Bool(_) => Some(AttributeKind::Bool),
            Self::Integer(_) => Some(AttributeKind::Integer),
            Self::Float(_) => Some(AttributeKind::Float),
            Self::Set(_) => Some(AttributeKind::Set),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Collapse every lexical form the server treats as "no value" into
    /// `Null`. Empty strings and empty sets are the only such forms; absent
    /// stays absent so callers can still tell "no opinion" apart.
    ///
    /// All comparisons in the engine go through this function.
    pub fn normalized(&self) -> AttributeValue {
        if self.is_empty_form() {
            return Self::Null;
        }
        self.clone()
    }

    /// True when the value normalizes to absent or null
    pub fn is_inapplicable(&self) -> bool {
        matches!(self, Self::Absent | Self::Null) || self.is_empty_form()
    }

    fn is_empty_form(&self) -> bool {
        match self {
            Self::String(s) => s.is_empty(),
            Self::Set(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Value equality after normalization. Numbers compare numerically
    /// across integer and float, sets compare without regard to order.
    pub fn same_value(&self, other: &AttributeValue) -> bool {
        if self.is_inapplicable() || other.is_inapplicable() {
            return self.is_inapplicable() && other.is_inapplicable();
        }
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::Integer(a), Self::Float(b)) | (Self::Float(b), Self::Integer(a)) => {
                float_as_exact_i64(*b) == Some(*a)
            }
            (Self::Set(a), Self::Set(b)) => {
                let left: HashSet<&str> = a.iter().map(String::as_str).collect();
                let right: HashSet<&str> = b.iter().map(String::as_str).collect();
                left == right
            }
            _ => false,
        }
    }

    /// Elements of a set value; absent and null read as no elements
    pub fn set_items(&self) -> Option<&[String]> {
        match self {
            Self::Set(items) => Some(items),
            Self::Absent | Self::Null => Some(&[][..]),
            _ => None,
        }
    }

    /// Raw values as carried by an operation
    pub fn raw_values(&self) -> Vec<Value> {
        match self {
            Self::Absent | Self::Null => Vec::new(),
            Self::String(s) => vec![Value::String(s.clone())],
            Self::Bool(b) => vec![Value::Bool(*b)],
            Self::Integer(i) => vec![Value::from(*i)],
            Self::Float(f) => vec![float_to_json(*f)],
            Self::Set(items) => items.iter().cloned().map(Value::String).collect(),
        }
    }

    /// JSON form of the value; `None` when absent
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::Absent => None,
            Self::Null => Some(Value::Null),
            Self::String(s) => Some(Value::String(s.clone())),
            Self::Bool(b) => Some(Value::Bool(*b)),
            Self::Integer(i) => Some(Value::from(*i)),
            Self::Float(f) => Some(float_to_json(*f)),
            Self::Set(items) => Some(Value::Array(
                items.iter().cloned().map(Value::String).collect(),
            )),
        }
    }

    /// Decode a remote JSON value as the declared kind.
    ///
    /// The configuration API renders some scalars as strings, so numeric and
    /// boolean kinds also accept their string spellings. A lone string is
    /// accepted for a set.
    pub fn from_json(kind: AttributeKind, value: &Value) -> Result<AttributeValue, String> {
        if value.is_null() {
            return Ok(Self::Null);
        }
        match kind {
            AttributeKind::String => value
                .as_str()
                .map(Self::string)
                .ok_or_else(|| format!("expected string, got {value}")),
            AttributeKind::Bool => match value {
                Value::Bool(b) => Ok(Self::Bool(*b)),
                Value::String(s) => s
                    .parse::<bool>()
                    .map(Self::Bool)
                    .map_err(|_| format!("expected boolean, got \"{s}\"")),
                other => Err(format!("expected boolean, got {other}")),
            },
            AttributeKind::Integer => match value {
                Value::Number(n) => n
                    .as_i64()
                    .map(Self::Integer)
                    .ok_or_else(|| format!("expected integer, got {n}")),
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Self::Integer)
                    .map_err(|_| format!("expected integer, got \"{s}\"")),
                other => Err(format!("expected integer, got {other}")),
            },
            AttributeKind::Float => {
                let parsed = match value {
                    Value::Number(n) => n
                        .as_f64()
                        .ok_or_else(|| format!("expected number, got {n}"))?,
                    Value::String(s) => s
                        .trim()
                        .parse::<f64>()
                        .map_err(|_| format!("expected number, got \"{s}\""))?,
                    other => return Err(format!("expected number, got {other}")),
                };
                if parsed.is_finite() {
                    Ok(Self::Float(parsed))
                } else {
                    Err(format!("expected finite number, got {value}"))
                }
            }
            AttributeKind::Set => match value {
                Value::Array(items) => {
                    let mut out = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            Value::String(s) => out.push(s.clone()),
                            Value::Null => {}
                            Value::Bool(_) | Value::Number(_) => out.push(item.to_string()),
                            other => return Err(format!("unexpected set element {other}")),
                        }
                    }
                    Ok(Self::set(out))
                }
                Value::String(s) => Ok(Self::set([s.clone()])),
                other => Err(format!("expected array, got {other}")),
            },
        }
    }
}

/// The integer a float holds exactly, if any. Floats outside the `i64`
/// range or with a fractional part have none.
fn float_as_exact_i64(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; i64::MAX is not
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

fn float_to_json(f: f64) -> Value {
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "<absent>"),
            Self::Null => write!(f, "null"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Set(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}
