//! Discriminator policy for polymorphic resource families.
//!
//! Several configuration object types share one schema and are told apart by
//! a variant tag (the object's declared `type`). Each tag owns a
//! [`VariantPolicy`] naming which attributes it accepts and which it needs.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::record::ConfigurationRecord;
use crate::schema::FieldSpec;
use crate::value::AttributeValue;

/// Allowed and required attributes of one variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantPolicy {
    pub tag: String,
    pub allowed: IndexSet<String>,
    pub required: IndexSet<String>,
}

impl VariantPolicy {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            allowed: IndexSet::new(),
            required: IndexSet::new(),
        }
    }

    pub fn allow<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed.extend(attributes.into_iter().map(Into::into));
        self
    }

    /// Mark attributes as required; they are allowed as well
    pub fn require<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for attribute in attributes {
            let attribute = attribute.into();
            self.allowed.insert(attribute.clone());
            self.required.insert(attribute);
        }
        self
    }

    pub fn allows(&self, attribute: &str) -> bool {
        self.allowed.contains(attribute)
    }
}

/// One problem found while validating a record against its variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Offending attribute; `None` for problems with the tag itself
    pub attribute: Option<String>,
    pub message: String,
}

impl ValidationError {
    pub fn attribute(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            attribute: Some(attribute.into()),
            message: message.into(),
        }
    }

    pub fn variant(message: impl Into<String>) -> Self {
        Self {
            attribute: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.attribute {
            Some(attribute) => write!(f, "{attribute}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Variant table of one polymorphic resource kind
#[derive(Debug, Clone)]
pub struct DiscriminatorPolicy {
    fields: IndexMap<String, FieldSpec>,
    variants: IndexMap<String, VariantPolicy>,
}

impl DiscriminatorPolicy {
    /// Build a policy, checking that every variant only names declared
    /// fields and that its required set is a subset of its allowed set.
    pub fn new(fields: &[FieldSpec], variants: Vec<VariantPolicy>) -> Result<Self> {
        let fields: IndexMap<String, FieldSpec> = fields
            .iter()
            .map(|f| (f.name.clone(), f.clone()))
            .collect();

        if variants.is_empty() {
            return Err(EngineError::invalid_policy("at least one variant is required"));
        }

        let mut table = IndexMap::with_capacity(variants.len());
        for variant in variants {
            if let Some(undeclared) = variant.allowed.iter().find(|a| !fields.contains_key(*a)) {
                return Err(EngineError::invalid_policy(format!(
                    "variant '{}' allows undeclared attribute '{undeclared}'",
                    variant.tag
                )));
            }
            if let Some(loose) = variant.required.iter().find(|r| !variant.allowed.contains(*r)) {
                return Err(EngineError::invalid_policy(format!(
                    "variant '{}' requires '{loose}' without allowing it",
                    variant.tag
                )));
            }
            let tag = variant.tag.clone();
            if table.insert(tag.clone(), variant).is_some() {
                return Err(EngineError::invalid_policy(format!(
                    "variant '{tag}' is declared twice"
                )));
            }
        }

        Ok(Self {
            fields,
            variants: table,
        })
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    pub fn variant(&self, tag: &str) -> Option<&VariantPolicy> {
        self.variants.get(tag)
    }

    pub fn variants(&self) -> impl Iterator<Item = &VariantPolicy> {
        self.variants.values()
    }

    /// Check a record against its variant, reporting every problem at once.
    ///
    /// Only concrete values count as "set": absent, null, empty strings and
    /// empty sets are inapplicable. They pass for any variant and never
    /// satisfy a required attribute.
    pub fn validate(&self, record: &ConfigurationRecord) -> Vec<ValidationError> {
        let Some(tag) = record.variant_tag() else {
            return vec![ValidationError::variant(format!(
                "missing variant tag; expected one of: {}",
                self.tag_list()
            ))];
        };
        let Some(variant) = self.variants.get(tag) else {
            return vec![ValidationError::variant(format!(
                "unsupported variant '{tag}'; expected one of: {}",
                self.tag_list()
            ))];
        };

        let mut errors = Vec::new();
        for (name, value) in record.iter() {
            if !value.is_inapplicable() && !variant.allows(name) {
                errors.push(ValidationError::attribute(
                    name,
                    format!("attribute not supported for variant {tag}"),
                ));
            }
        }
        for name in &variant.required {
            if record.get(name).is_none_or(AttributeValue::is_inapplicable) {
                errors.push(ValidationError::attribute(
                    name,
                    format!("attribute is required for variant {tag}"),
                ));
            }
        }

        if !errors.is_empty() {
            debug!(variant = %tag, errors = errors.len(), "record failed variant validation");
        }
        errors
    }

    /// Validate, then reset attributes that belong only to other variants to
    /// their inapplicable value so nothing leaks across a tag switch.
    pub fn prepare(
        &self,
        record: &ConfigurationRecord,
    ) -> std::result::Result<ConfigurationRecord, Vec<ValidationError>> {
        let errors = self.validate(record);
        if !errors.is_empty() {
            return Err(errors);
        }
        let Some(variant) = record.variant_tag().and_then(|t| self.variants.get(t)) else {
            return Err(vec![ValidationError::variant("missing variant tag")]);
        };

        let mut prepared = record.clone();
        for (name, field) in &self.fields {
            if variant.allows(name) || !self.allowed_elsewhere(name, &variant.tag) {
                continue;
            }
            let current = record.value_or_absent(name);
            let sentinel = field.inapplicable_value();
            if *current != sentinel {
                prepared.set(name.clone(), sentinel);
            }
        }
        Ok(prepared)
    }

    fn allowed_elsewhere(&self, attribute: &str, tag: &str) -> bool {
        self.variants
            .values()
            .any(|v| v.tag != tag && v.allows(attribute))
    }

    fn tag_list(&self) -> String {
        self.tags().collect::<Vec<_>>().join(", ")
    }
}
