//! Engine settings and declared resource kinds.
//!
//! ```toml
//! [engine]
//! warn_on_reformat = true
//! extra_obscured_attributes = ["api_passcode"]
//!
//! [[resources]]
//! name = "location"
//! fields = [
//!   { name = "description", kind = "string" },
//!   { name = "preferred_failover_location", kind = "set" },
//! ]
//! ```

use std::collections::HashSet;

use dirconf_core::{FieldSpec, VariantPolicy};
use serde::{Deserialize, Serialize};

use crate::kind::ResourceKind;
use crate::{CatalogError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineSettings,
    /// Additional resource kinds beyond the built-ins
    #[serde(default)]
    pub resources: Vec<ResourceDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Report server-side reformatting of values as mapping warnings
    #[serde(default = "default_warn_on_reformat")]
    pub warn_on_reformat: bool,
    /// Attribute names to treat as obscured in every kind
    #[serde(default)]
    pub extra_obscured_attributes: Vec<String>,
    #[serde(default = "default_include_builtins")]
    pub include_builtins: bool,
}

fn default_warn_on_reformat() -> bool {
    true
}
fn default_include_builtins() -> bool {
    true
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            warn_on_reformat: default_warn_on_reformat(),
            extra_obscured_attributes: Vec::new(),
            include_builtins: default_include_builtins(),
        }
    }
}

/// A resource kind declared in settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDecl {
    pub name: String,
    #[serde(default)]
    pub schema_urn_prefix: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    /// Empty for kinds without variants
    #[serde(default)]
    pub variants: Vec<VariantDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantDecl {
    pub tag: String,
    #[serde(default)]
    pub allowed: Vec<String>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl VariantDecl {
    pub fn to_policy(&self) -> VariantPolicy {
        VariantPolicy::new(self.tag.clone())
            .allow(self.allowed.iter().cloned())
            .require(self.required.iter().cloned())
    }
}

impl ResourceDecl {
    /// Build the declared kind. Variant tables are checked here, so a bad
    /// table surfaces as an engine error.
    pub fn to_kind(&self) -> Result<ResourceKind> {
        let mut kind = ResourceKind::new(self.name.clone(), self.fields.clone());
        if let Some(prefix) = &self.schema_urn_prefix {
            kind = kind.with_schema_urn_prefix(prefix.clone());
        }
        if !self.variants.is_empty() {
            kind = kind.with_variants(self.variants.iter().map(VariantDecl::to_policy).collect())?;
        }
        Ok(kind)
    }
}

impl Settings {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self
            .engine
            .extra_obscured_attributes
            .iter()
            .any(|a| a.trim().is_empty())
        {
            return Err("engine.extra_obscured_attributes must not contain empty names".into());
        }

        let mut names = HashSet::new();
        for resource in &self.resources {
            if resource.name.trim().is_empty() {
                return Err("resources.name must not be empty".into());
            }
            if !names.insert(resource.name.as_str()) {
                return Err(format!("resource '{}' is declared twice", resource.name));
            }
            if resource.fields.is_empty() {
                return Err(format!("resource '{}' must declare at least one field", resource.name));
            }
            let mut fields = HashSet::new();
            for field in &resource.fields {
                if !fields.insert(field.name.as_str()) {
                    return Err(format!(
                        "resource '{}' declares field '{}' twice",
                        resource.name, field.name
                    ));
                }
            }
            if resource.variants.iter().any(|v| v.tag.trim().is_empty()) {
                return Err(format!("resource '{}' has a variant with an empty tag", resource.name));
            }
        }
        Ok(())
    }

    /// Parse and validate settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(toml_str)
            .map_err(|e| CatalogError::settings(format!("TOML parse error: {e}")))?;
        settings.validate().map_err(CatalogError::Settings)?;
        Ok(settings)
    }
}

pub mod loader {
    use super::Settings;
    use config::{Config, Environment, File};
    use std::path::Path;
    use tracing::debug;

    pub const DEFAULT_PATH: &str = "dirconf.toml";

    /// Load settings from `path` (or [`DEFAULT_PATH`]), then apply
    /// `DIRCONF__*` environment overrides. A missing file leaves the
    /// defaults in place.
    pub fn load_settings(path: Option<&Path>) -> Result<Settings, String> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_PATH));
        let mut builder = Config::builder();
        if path.exists() {
            builder = builder.add_source(File::from(path));
        } else {
            debug!(path = %path.display(), "settings file not found, using defaults");
        }
        // e.g. DIRCONF__ENGINE__WARN_ON_REFORMAT=false
        builder = builder.add_source(
            Environment::with_prefix("DIRCONF")
                .try_parsing(true)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("engine.extra_obscured_attributes"),
        );
        let merged: Settings = builder
            .build()
            .map_err(|e| format!("settings build error: {e}"))?
            .try_deserialize()
            .map_err(|e| format!("settings deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
