//! Detection of obscured attributes.
//!
//! The server never echoes sensitive values (PINs, passwords) back; it
//! returns them as null. Such fields must be declared write-only so the
//! response mapper keeps the caller's copy.

use tracing::debug;

use crate::schema::{Access, FieldSpec};

/// Name suffixes of attributes holding sensitive values
const OBSCURED_SUFFIXES: &[&str] = &[
    "pin",
    "password",
    "passphrase",
    "secret",
    "token",
    "credential",
    "private_key",
];

/// Check whether an attribute name looks like it holds a sensitive value.
/// Only suffixes count, so `trust_store_pin_file` is a plain attribute.
pub fn is_obscured_attribute(name: &str) -> bool {
    let lower = name.to_lowercase();
    OBSCURED_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}

/// Mark fields as write-only when their name looks sensitive or appears in
/// `extra`. Read-only fields are left alone.
pub fn mark_obscured_fields(fields: &mut [FieldSpec], extra: &[String]) {
    for field in fields.iter_mut() {
        if field.access != Access::ReadWrite {
            continue;
        }
        if is_obscured_attribute(&field.name) || extra.iter().any(|e| e == &field.name) {
            debug!(attribute = %field.name, "treating attribute as obscured");
            field.access = Access::WriteOnly;
        }
    }
}
