//! Wire encoding of configuration objects.
//!
//! Remote objects look like
//! `{"schemas": ["urn:...:gauge:numeric"], "id": "CPU", "gaugeDataSource": ...}`:
//! attribute names are camelCase and the active variant is the last segment
//! of the schema URN.

use std::collections::HashMap;

use dirconf_core::{
    Access, AttributeKind, ConfigurationRecord, FieldSpec, Operation, OperationKind,
    ResponseBody, ResponsePayload,
};
use serde_json::{Map, Value, json};
use tracing::trace;

use crate::kind::ResourceKind;
use crate::{CatalogError, Result};

/// Members that describe the object rather than configure it
const META_MEMBERS: &[&str] = &[
    "schemas",
    "id",
    "meta",
    "_links",
    "urn:pingidentity:schemas:configuration:messages:2.0",
];

/// `trustStorePin` -> `trust_store_pin`
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// `trust_store_pin` -> `trustStorePin`
pub fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for ch in name.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.push(ch.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Member name of a field on the wire: its declared `wire_name`, else the
/// camelCase form of its name
pub fn wire_name(field: &FieldSpec) -> String {
    field
        .wire_name
        .clone()
        .unwrap_or_else(|| snake_to_camel(&field.name))
}

fn wire_path(kind: &ResourceKind, attribute: &str) -> String {
    kind.field(attribute)
        .map(wire_name)
        .unwrap_or_else(|| snake_to_camel(attribute))
}

/// Variant tag of a remote object: the suffix of its schema URN under the
/// kind's prefix, else its `type` member
fn variant_tag(kind: &ResourceKind, object: &Map<String, Value>) -> Option<String> {
    let prefix = format!("{}:", kind.schema_urn_prefix());
    let from_schema = object
        .get("schemas")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find_map(|urn| urn.strip_prefix(prefix.as_str()))
        .map(str::to_string);
    from_schema.or_else(|| {
        object
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string)
    })
}

/// Decode a remote object into a payload with one slot per known variant.
///
/// An object whose variant is missing or unknown yields a payload with no
/// populated slot, which the mapper rejects as a contract violation.
pub fn decode_payload(kind: &ResourceKind, body: &Value) -> Result<ResponsePayload> {
    let object = body.as_object().ok_or_else(|| {
        CatalogError::decode(format!("{} response is not a JSON object", kind.name()))
    })?;

    let by_wire_name: HashMap<String, &str> = kind
        .fields()
        .iter()
        .map(|field| (wire_name(field), field.name.as_str()))
        .collect();

    let mut attributes = ResponseBody::new();
    for (key, value) in object {
        if META_MEMBERS.contains(&key.as_str()) {
            continue;
        }
        let name = match by_wire_name.get(key) {
            Some(name) => Some(name.to_string()),
            None => Some(camel_to_snake(key)).filter(|name| kind.field(name).is_some()),
        };
        if let Some(name) = name {
            attributes.insert(name, value.clone());
        } else if key != "type" {
            trace!(kind = %kind.name(), member = %key, "ignoring undeclared member");
        }
    }

    let Some(policy) = kind.policy() else {
        return Ok(ResponsePayload::untagged(attributes));
    };

    let tag = variant_tag(kind, object);
    let mut remaining = Some(attributes);
    let mut payload = ResponsePayload::new();
    for known in policy.tags() {
        let slot = if tag.as_deref() == Some(known) {
            remaining.take()
        } else {
            None
        };
        payload = payload.with_slot(known, slot);
    }
    Ok(payload)
}

/// Encode a record as a create body. Inapplicable values (absent, null,
/// empty) are left out, as are read-only attributes.
pub fn encode_record(kind: &ResourceKind, record: &ConfigurationRecord) -> Value {
    let mut object = Map::new();
    object.insert(
        "schemas".to_string(),
        json!([kind.schema_urn(record.variant_tag())]),
    );
    for field in kind.fields() {
        if field.access == Access::ReadOnly {
            continue;
        }
        let value = record.value_or_absent(&field.name);
        if value.is_inapplicable() {
            continue;
        }
        if let Some(json) = value.to_json() {
            object.insert(wire_name(field), json);
        }
    }
    Value::Object(object)
}

/// Encode operations as a patch body.
///
/// A replace with no values clears the attribute and becomes a `remove`
/// without a value. A replace of a single-valued attribute carries the bare
/// value; set operations carry arrays.
pub fn encode_patch(kind: &ResourceKind, operations: &[Operation]) -> Value {
    let encoded: Vec<Value> = operations
        .iter()
        .map(|op| {
            let path = wire_path(kind, &op.attribute);
            let is_set = kind
                .field(&op.attribute)
                .is_some_and(|f| f.kind == AttributeKind::Set);
            match (op.kind, op.values.as_slice()) {
                (OperationKind::Replace, []) => json!({"op": "remove", "path": path}),
                (OperationKind::Replace, [single]) if !is_set => {
                    json!({"op": "replace", "path": path, "value": single})
                }
                (op_kind, values) => {
                    json!({"op": op_kind.to_string(), "path": path, "value": values})
                }
            }
        })
        .collect();
    json!({ "operations": encoded })
}
