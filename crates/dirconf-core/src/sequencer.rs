//! Operation sequencer: runs the detectors over a resource's fields in
//! declaration order.

use tracing::{debug, trace};

use crate::detect::{detect_collection, detect_scalar};
use crate::error::{EngineError, RecordSide, Result};
use crate::operation::Operation;
use crate::record::ConfigurationRecord;
use crate::schema::{Access, FieldSpec};
use crate::value::{AttributeKind, AttributeValue};

static ABSENT: AttributeValue = AttributeValue::Absent;

/// Build the ordered operation list that brings `observed` in line with
/// `desired`.
///
/// Fields are visited in the order given, so identical inputs always yield an
/// identical list. Read-only fields are skipped. A field missing from either
/// record, or a value of the wrong kind, is a programming error and fails the
/// whole call; skipping it would hide partially applied drift.
pub fn build_operations(
    desired: &ConfigurationRecord,
    observed: &ConfigurationRecord,
    fields: &[FieldSpec],
) -> Result<Vec<Operation>> {
    let mut operations = Vec::new();

    for field in fields {
        let desired_value = lookup(desired, field, RecordSide::Desired)?;
        let observed_value = lookup(observed, field, RecordSide::Observed)?;

        if field.access == Access::ReadOnly {
            trace!(attribute = %field.name, "skipping read-only attribute");
            continue;
        }

        match field.kind {
            AttributeKind::Set => {
                operations.extend(detect_collection(&field.name, desired_value, observed_value));
            }
            AttributeKind::String => {
                operations.extend(detect_scalar(&field.name, desired_value, observed_value));
            }
            _ => {
                // Only strings have a null sentinel distinct from "not configured"
                let desired_value = if desired_value.is_null() {
                    &ABSENT
                } else {
                    desired_value
                };
                operations.extend(detect_scalar(&field.name, desired_value, observed_value));
            }
        }
    }

    for op in &operations {
        debug!(attribute = %op.attribute, op = %op.kind, values = op.values.len(), "planned operation");
    }

    Ok(operations)
}

fn lookup<'a>(
    record: &'a ConfigurationRecord,
    field: &FieldSpec,
    side: RecordSide,
) -> Result<&'a AttributeValue> {
    let value = record
        .get(&field.name)
        .ok_or_else(|| EngineError::schema_mismatch(&field.name, side))?;
    field.check_kind(value, side)?;
    Ok(value)
}
