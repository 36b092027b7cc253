//! Change detectors for scalar and set-valued attributes.

use std::collections::HashSet;

use crate::operation::Operation;
use crate::value::AttributeValue;

/// Compare one scalar attribute between desired and observed.
///
/// - absent desired means no opinion, so no operation
/// - null and empty string are the same value on the server side
/// - anything else that differs becomes a single `Replace`
pub fn detect_scalar(
    attribute: &str,
    desired: &AttributeValue,
    observed: &AttributeValue,
) -> Option<Operation> {
    if desired.is_absent() {
        return None;
    }
    if desired.same_value(observed) {
        return None;
    }
    Some(Operation::replace(attribute, desired.raw_values()))
}

/// Element-level difference between two sets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionDelta {
    /// In desired but not observed, in desired order
    pub to_add: Vec<String>,
    /// In observed but not desired, in observed order
    pub to_remove: Vec<String>,
}

impl CollectionDelta {
    pub fn between(desired: &[String], observed: &[String]) -> Self {
        let desired_set: HashSet<&str> = desired.iter().map(String::as_str).collect();
        let observed_set: HashSet<&str> = observed.iter().map(String::as_str).collect();

        Self {
            to_add: missing_from(desired, &observed_set),
            to_remove: missing_from(observed, &desired_set),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// `Add` first, then `Delete`; either is omitted when empty
    pub fn into_operations(self, attribute: &str) -> Vec<Operation> {
        let mut ops = Vec::with_capacity(2);
        if !self.to_add.is_empty() {
            ops.push(Operation::add(attribute, self.to_add));
        }
        if !self.to_remove.is_empty() {
            ops.push(Operation::delete(attribute, self.to_remove));
        }
        ops
    }
}

/// Elements of `items` not in `other`, first occurrence only, order kept
fn missing_from(items: &[String], other: &HashSet<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if !other.contains(item.as_str()) && seen.insert(item.as_str()) {
            out.push(item.clone());
        }
    }
    out
}

/// Compare one set attribute and emit the minimal `Add`/`Delete` pair.
///
/// The whole set is never replaced: other actors may add elements this tool
/// does not manage, and a wholesale replace would drop them. Null on the
/// desired side means "inapplicable" and is diffed as the empty set.
pub fn detect_collection(
    attribute: &str,
    desired: &AttributeValue,
    observed: &AttributeValue,
) -> Vec<Operation> {
    if desired.is_absent() {
        return Vec::new();
    }
    let desired_items = desired.set_items().unwrap_or_default();
    let observed_items = observed.set_items().unwrap_or_default();
    CollectionDelta::between(desired_items, observed_items).into_operations(attribute)
}
