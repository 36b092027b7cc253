//! Registry of resource kinds by name.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::builtin;
use crate::kind::ResourceKind;
use crate::settings::{EngineSettings, Settings};
use crate::{CatalogError, Result};

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    kinds: IndexMap<String, ResourceKind>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding only the built-in kinds
    pub fn builtin() -> Result<Self> {
        let mut catalog = Self::new();
        for kind in builtin::all()? {
            catalog.register(kind)?;
        }
        Ok(catalog)
    }

    /// Build a catalog from settings: the built-ins (unless disabled) plus
    /// every declared kind, all configured with the engine options
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut kinds = if settings.engine.include_builtins {
            builtin::all()?
        } else {
            Vec::new()
        };
        for decl in &settings.resources {
            kinds.push(decl.to_kind()?);
        }

        let mut catalog = Self::new();
        for kind in kinds {
            catalog.register(configure(kind, &settings.engine))?;
        }

        info!(
            kinds = catalog.len(),
            declared = settings.resources.len(),
            builtins = settings.engine.include_builtins,
            "resource catalog loaded"
        );
        Ok(catalog)
    }

    pub fn register(&mut self, kind: ResourceKind) -> Result<()> {
        if self.kinds.contains_key(kind.name()) {
            return Err(CatalogError::DuplicateKind(kind.name().to_string()));
        }
        debug!(kind = %kind.name(), polymorphic = kind.is_polymorphic(), "registered resource kind");
        self.kinds.insert(kind.name().to_string(), kind);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&ResourceKind> {
        self.kinds
            .get(name)
            .ok_or_else(|| CatalogError::UnknownKind(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

fn configure(kind: ResourceKind, engine: &EngineSettings) -> ResourceKind {
    kind.warn_on_reformat(engine.warn_on_reformat)
        .mark_obscured(&engine.extra_obscured_attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ResourceDecl;
    use dirconf_core::FieldSpec;

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.contains("gauge"));
        assert!(catalog.get("trust_manager_provider").unwrap().is_polymorphic());
    }

    #[test]
    fn test_unknown_kind() {
        let catalog = Catalog::builtin().unwrap();
        assert!(matches!(
            catalog.get("histogram"),
            Err(CatalogError::UnknownKind(name)) if name == "histogram"
        ));
    }

    #[test]
    fn test_register_rejects_duplicate() {
        let mut catalog = Catalog::builtin().unwrap();
        let err = catalog
            .register(ResourceKind::new("gauge", vec![FieldSpec::string("description")]))
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateKind(_)));
    }

    #[test]
    fn test_from_settings_adds_declared_and_obscures() {
        let mut settings = Settings::default();
        settings.engine.extra_obscured_attributes = vec!["api_passcode".to_string()];
        settings.resources.push(ResourceDecl {
            name: "http_servlet_extension".to_string(),
            schema_urn_prefix: None,
            fields: vec![
                FieldSpec::string("description"),
                FieldSpec::string("api_passcode"),
            ],
            variants: Vec::new(),
        });

        let catalog = Catalog::from_settings(&settings).unwrap();
        assert_eq!(catalog.len(), 4);
        let kind = catalog.get("http_servlet_extension").unwrap();
        assert!(kind.field("api_passcode").unwrap().is_obscured());
        assert!(!kind.field("description").unwrap().is_obscured());
        assert_eq!(catalog.names().last(), Some("http_servlet_extension"));
    }

    #[test]
    fn test_from_settings_without_builtins() {
        let mut settings = Settings::default();
        settings.engine.include_builtins = false;
        assert!(Catalog::from_settings(&settings).unwrap().is_empty());
    }
}
