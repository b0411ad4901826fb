#![deny(missing_docs)]

//! # API Manifest
//!
//! A YAML or JSON file bundling configuration, type descriptors and
//! controllers: everything one generation run needs.

use crate::config::{ConfigOverlay, GeneratorConfig};
use crate::error::{AppError, AppResult};
use crate::oas::document::{Document, DocumentGenerator};
use crate::oas::endpoint::EndpointRecord;
use crate::oas::models::{ControllerDescriptor, TypeDescriptor};
use crate::oas::registry::SchemaRegistry;
use crate::oas::routes::assemble_controllers;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parses YAML in which enum variants with data are written as one-key maps
/// (`type: { scalar: i64 }`) instead of YAML tags.
pub fn parse_yaml<T: DeserializeOwned>(content: &str) -> AppResult<T> {
    let deserializer = serde_yaml::Deserializer::from_str(content);
    Ok(serde_yaml::with::singleton_map_recursive::deserialize(
        deserializer,
    )?)
}

/// Input of one generation run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiManifest {
    /// Configuration layer applied over the defaults.
    #[serde(default)]
    pub config: ConfigOverlay,
    /// Type descriptors.
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
    /// Controllers.
    #[serde(default)]
    pub controllers: Vec<ControllerDescriptor>,
}

impl ApiManifest {
    /// Loads a manifest; `.json` files are read as JSON, `.yaml`/`.yml` as YAML.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Self::from_json(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Err(AppError::InvalidConfig(format!(
                "Unsupported manifest extension for '{}', expected .yaml, .yml or .json",
                path.display()
            ))),
        }
    }

    /// Parses a YAML manifest.
    pub fn from_yaml(content: &str) -> AppResult<Self> {
        parse_yaml(content)
    }

    /// Parses a JSON manifest.
    pub fn from_json(content: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Defaults with the manifest's own `config` section applied.
    pub fn base_config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::default();
        config.apply(self.config.clone());
        config
    }

    /// A registry holding every declared type, filtered per `config`.
    pub fn registry(&self, config: &GeneratorConfig) -> SchemaRegistry {
        let mut registry = SchemaRegistry::with_excluded(config.excluded_types.iter().cloned());
        registry.declare_all(self.types.iter().cloned());
        registry
    }

    /// Assembles endpoint records without building a document.
    pub fn records(&self, config: &GeneratorConfig) -> AppResult<(Vec<EndpointRecord>, SchemaRegistry)> {
        config.validate()?;
        let mut registry = self.registry(config);
        let records = assemble_controllers(&self.controllers, &mut registry, config)?;
        Ok((records, registry))
    }

    /// Runs a full generation pass.
    pub fn generate(&self, config: &GeneratorConfig) -> AppResult<Document> {
        let (records, registry) = self.records(config)?;
        DocumentGenerator::new(config)
            .with_controllers(&self.controllers)
            .generate(&records, &registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::models::{HttpMethod, TypeKind};
    use std::io::Write;

    const MANIFEST: &str = r#"
config:
  info:
    title: Pets
    version: "2.0.0"
types:
  - name: Pet
    kind: object
    fields:
      - name: id
        type: { scalar: i64 }
controllers:
  - name: PetController
    prefix: /pets
    tags: [pets]
    operations:
      - handler: PetController::show
        methods: [GET]
        path: "/{id}"
        signature:
          - name: id
            type: { scalar: i64 }
        responses:
          - status: 200
            entity: Pet
"#;

    #[test]
    fn test_parse_yaml_manifest() {
        let manifest = ApiManifest::from_yaml(MANIFEST).unwrap();
        assert_eq!(manifest.types[0].kind, TypeKind::Object);
        assert_eq!(manifest.controllers[0].operations[0].methods, vec![HttpMethod::Get]);
        assert_eq!(manifest.base_config().info.title, "Pets");
    }

    #[test]
    fn test_generate_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        file.write_all(MANIFEST.as_bytes()).unwrap();

        let manifest = ApiManifest::from_file(file.path()).unwrap();
        let doc = manifest.generate(&manifest.base_config()).unwrap();
        assert_eq!(doc.info.title, "Pets");
        assert!(doc.operation("/pets/{id}", HttpMethod::Get).is_some());
        assert_eq!(doc.components.schemas.keys().collect::<Vec<_>>(), vec!["Pet"]);
    }

    #[test]
    fn test_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let err = ApiManifest::from_file(file.path()).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));
    }
}
