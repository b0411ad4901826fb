#![deny(missing_docs)]

//! # Generator Configuration
//!
//! Document-level settings and resolver defaults.
//!
//! Configuration is layered: built-in defaults, then the manifest's `config`
//! section, then a standalone config file, then command-line overrides. Every
//! layer except the defaults is a `ConfigOverlay` whose set fields replace the
//! current value.

use crate::error::{AppError, AppResult};
use crate::manifest::parse_yaml;
use crate::oas::models::{ListWrapper, SecurityRequirement};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;
use utoipa::openapi::security::SecurityScheme;

/// Context types recognised by default.
pub const DEFAULT_CONTEXT_TYPES: &[&str] = &[
    "Request",
    "Response",
    "HttpRequest",
    "HttpResponse",
    "ServerRequest",
    "ServerRequestInterface",
    "ResponseInterface",
];

/// The document `info` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InfoConfig {
    /// API title.
    #[serde(default = "default_title")]
    pub title: String,
    /// API version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
}

impl Default for InfoConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            version: default_version(),
            description: None,
        }
    }
}

fn default_title() -> String {
    "API".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

/// One server entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Absolute URL or root-relative path.
    pub url: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Info block.
    pub info: InfoConfig,
    /// Servers.
    pub servers: Vec<ServerConfig>,
    /// Security schemes by name.
    pub security_schemes: IndexMap<String, SecurityScheme>,
    /// Document-level security, used by operations that inherit.
    pub security: Vec<SecurityRequirement>,
    /// Wrapper for list responses that name none.
    pub default_list_wrapper: ListWrapper,
    /// Type names kept out of the schema set, on top of the built-in value types.
    pub excluded_types: Vec<String>,
    /// Framework-injected context type names.
    pub context_types: Vec<String>,
    /// Emit operations flagged hidden.
    pub include_hidden: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            info: InfoConfig::default(),
            servers: Vec::new(),
            security_schemes: IndexMap::new(),
            security: Vec::new(),
            default_list_wrapper: ListWrapper::None,
            excluded_types: Vec::new(),
            context_types: DEFAULT_CONTEXT_TYPES.iter().map(|s| s.to_string()).collect(),
            include_hidden: false,
        }
    }
}

/// A partial configuration layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverlay {
    /// Info block.
    #[serde(default)]
    pub info: Option<InfoConfig>,
    /// Servers.
    #[serde(default)]
    pub servers: Option<Vec<ServerConfig>>,
    /// Security schemes; merged by name into the current set.
    #[serde(default)]
    pub security_schemes: Option<IndexMap<String, SecurityScheme>>,
    /// Document-level security.
    #[serde(default)]
    pub security: Option<Vec<SecurityRequirement>>,
    /// Default list wrapper.
    #[serde(default)]
    pub default_list_wrapper: Option<ListWrapper>,
    /// Extra excluded types; appended.
    #[serde(default)]
    pub excluded_types: Option<Vec<String>>,
    /// Context types; replace the current list.
    #[serde(default)]
    pub context_types: Option<Vec<String>>,
    /// Emit hidden operations.
    #[serde(default)]
    pub include_hidden: Option<bool>,
}

impl ConfigOverlay {
    /// Loads an overlay from a YAML or JSON file, chosen by extension.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            parse_yaml(&content)
        }
    }
}

impl GeneratorConfig {
    /// Applies one layer on top of the current settings.
    pub fn apply(&mut self, overlay: ConfigOverlay) {
        if let Some(info) = overlay.info {
            self.info = info;
        }
        if let Some(servers) = overlay.servers {
            self.servers = servers;
        }
        if let Some(schemes) = overlay.security_schemes {
            self.security_schemes.extend(schemes);
        }
        if let Some(security) = overlay.security {
            self.security = security;
        }
        if let Some(wrapper) = overlay.default_list_wrapper {
            self.default_list_wrapper = wrapper;
        }
        if let Some(excluded) = overlay.excluded_types {
            for name in excluded {
                if !self.excluded_types.contains(&name) {
                    self.excluded_types.push(name);
                }
            }
        }
        if let Some(context) = overlay.context_types {
            self.context_types = context;
        }
        if let Some(include_hidden) = overlay.include_hidden {
            self.include_hidden = include_hidden;
        }
    }

    /// Checks the settings for values that would produce an invalid document.
    pub fn validate(&self) -> AppResult<()> {
        if self.info.title.trim().is_empty() {
            return Err(AppError::InvalidConfig("info.title must not be empty".into()));
        }
        if self.info.version.trim().is_empty() {
            return Err(AppError::InvalidConfig("info.version must not be empty".into()));
        }
        for server in &self.servers {
            if !server.url.starts_with('/') && Url::parse(&server.url).is_err() {
                return Err(AppError::InvalidConfig(format!(
                    "Server url '{}' is neither an absolute URL nor a root-relative path",
                    server.url
                )));
            }
        }
        self.check_security_requirements(&self.security, "document")
    }

    /// Fails when a requirement names a scheme that is not defined.
    pub fn check_security_requirements(
        &self,
        requirements: &[SecurityRequirement],
        owner: &str,
    ) -> AppResult<()> {
        for requirement in requirements {
            for scheme in requirement.keys() {
                if !self.security_schemes.contains_key(scheme) {
                    return Err(AppError::InvalidConfig(format!(
                        "Security requirement of '{}' names undefined scheme '{}'",
                        owner, scheme
                    )));
                }
            }
        }
        Ok(())
    }
}
