#![deny(missing_docs)]

//! # Generate Command
//!
//! Loads a manifest, layers configuration and writes the OpenAPI document.

use std::fs;
use std::path::{Path, PathBuf};

use apidoc_core::oas::Document;
use apidoc_core::{ApiManifest, AppResult, ConfigOverlay, GeneratorConfig};

/// Serialization format of the generated document.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// YAML.
    Yaml,
}

impl OutputFormat {
    /// Picks the format from an output path's extension, falling back to JSON.
    pub fn from_path(path: Option<&Path>) -> Self {
        let extension = path
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("yaml") | Some("yml") => OutputFormat::Yaml,
            _ => OutputFormat::Json,
        }
    }
}

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Path to the manifest (`.yaml`, `.yml` or `.json`).
    #[clap(short, long)]
    pub input: PathBuf,

    /// Extra configuration file layered over the manifest's own `config`.
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Output file; the document is printed to stdout when omitted.
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Output format; inferred from the output extension when omitted.
    #[clap(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Overrides `info.title`.
    #[clap(long, env = "APIDOC_TITLE")]
    pub title: Option<String>,

    /// Overrides `info.version`.
    #[clap(long, env = "APIDOC_API_VERSION")]
    pub api_version: Option<String>,
}

/// Builds the effective configuration: defaults, manifest, config file, flags.
pub fn layered_config(args: &GenerateArgs, manifest: &ApiManifest) -> AppResult<GeneratorConfig> {
    let mut config = manifest.base_config();
    if let Some(path) = &args.config {
        tracing::debug!(path = %path.display(), "Applying configuration file");
        config.apply(ConfigOverlay::from_file(path)?);
    }
    if let Some(title) = &args.title {
        config.info.title = title.clone();
    }
    if let Some(version) = &args.api_version {
        config.info.version = version.clone();
    }
    Ok(config)
}

/// Serializes `document` in `format`.
pub fn render(document: &Document, format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Json => document.to_json_pretty(),
        OutputFormat::Yaml => document.to_yaml(),
    }
}

/// Executes the generation.
///
/// # Arguments
///
/// * `args` - Command arguments.
pub fn execute(args: &GenerateArgs) -> AppResult<()> {
    let manifest = ApiManifest::from_file(&args.input)?;
    let config = layered_config(args, &manifest)?;
    let document = manifest.generate(&config)?;

    let format = args
        .format
        .unwrap_or_else(|| OutputFormat::from_path(args.output.as_deref()));
    let rendered = render(&document, format)?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, rendered)?;
            tracing::info!(path = %path.display(), "Wrote OpenAPI document");
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MANIFEST: &str = r#"
config:
  info:
    title: Shop
types:
  - name: Item
    kind: object
    fields:
      - name: sku
        type: { scalar: String }
controllers:
  - name: ItemController
    prefix: /items
    operations:
      - handler: ItemController::list
        methods: [GET]
        path: ""
        responses:
          - status: 200
            entity: Item
            list: true
"#;

    fn args(input: PathBuf, output: Option<PathBuf>) -> GenerateArgs {
        GenerateArgs {
            input,
            config: None,
            output,
            format: None,
            title: None,
            api_version: None,
        }
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            OutputFormat::from_path(Some(Path::new("out/api.yml"))),
            OutputFormat::Yaml
        );
        assert_eq!(
            OutputFormat::from_path(Some(Path::new("api.json"))),
            OutputFormat::Json
        );
        assert_eq!(OutputFormat::from_path(None), OutputFormat::Json);
    }

    #[test]
    fn test_execute_writes_yaml() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("api.yaml");
        fs::write(&input, MANIFEST).unwrap();
        let output = dir.path().join("docs/openapi.yaml");

        execute(&args(input, Some(output.clone()))).unwrap();

        let written = fs::read_to_string(&output).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&written).unwrap();
        assert_eq!(value["openapi"].as_str(), Some("3.0.3"));
        assert_eq!(value["info"]["title"].as_str(), Some("Shop"));
        assert!(value["paths"]["/items"]["get"].is_mapping());
        assert!(value["components"]["schemas"]["Item"].is_mapping());
    }

    #[test]
    fn test_config_layers() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("api.yaml");
        fs::write(&input, MANIFEST).unwrap();
        let overlay = dir.path().join("config.json");
        fs::write(
            &overlay,
            r#"{"info": {"title": "From file", "version": "3.1.0"}}"#,
        )
        .unwrap();

        let manifest = ApiManifest::from_file(&input).unwrap();
        let mut generate = args(input, None);
        generate.config = Some(overlay);
        let config = layered_config(&generate, &manifest).unwrap();
        assert_eq!(config.info.title, "From file");
        assert_eq!(config.info.version, "3.1.0");

        generate.title = Some("From flag".to_string());
        let config = layered_config(&generate, &manifest).unwrap();
        assert_eq!(config.info.title, "From flag");
    }

    #[test]
    fn test_execute_json_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("api.yaml");
        fs::write(&input, MANIFEST).unwrap();
        let output = dir.path().join("openapi.json");

        execute(&args(input, Some(output.clone()))).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        let schema = &value["paths"]["/items"]["get"]["responses"]["200"]["content"]
            ["application/json"]["schema"];
        assert_eq!(schema["type"], "array");
        assert_eq!(schema["items"]["$ref"], "#/components/schemas/Item");
    }
}
