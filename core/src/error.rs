//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Configuration errors are fatal: generation aborts and no partial document
//! is returned. They always name the endpoint or type that caused them.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Wrapper for JSON (de)serialization errors.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),

    /// Wrapper for YAML (de)serialization errors.
    #[display("YAML Error: {_0}")]
    Yaml(serde_yaml::Error),

    /// A path mask contains the same placeholder twice.
    #[from(ignore)]
    #[display("Path mask '{mask}' contains duplicate placeholder '{name}'")]
    DuplicatePathParameter {
        /// The offending mask.
        mask: String,
        /// The repeated placeholder name.
        name: String,
    },

    /// A declared path parameter does not appear in the mask.
    #[from(ignore)]
    #[display("Endpoint '{endpoint}': path parameter '{name}' is not present in mask '{mask}'")]
    UnknownPathParameter {
        /// Handler / operation identifier.
        endpoint: String,
        /// The mask that was checked.
        mask: String,
        /// The declared parameter name.
        name: String,
    },

    /// A mask placeholder has no corresponding path parameter.
    #[from(ignore)]
    #[display("Endpoint '{endpoint}': mask '{mask}' is missing a path parameter for '{name}'")]
    MissingPathParameter {
        /// Handler / operation identifier.
        endpoint: String,
        /// The mask that was checked.
        mask: String,
        /// The placeholder without a parameter.
        name: String,
    },

    /// Two explicit parameters of one operation share a name.
    #[from(ignore)]
    #[display("Endpoint '{endpoint}' declares parameter '{name}' more than once")]
    DuplicateParameter {
        /// Handler / operation identifier.
        endpoint: String,
        /// The duplicated name.
        name: String,
    },

    /// Explicit multipart fields compete with an entity that has upload fields.
    #[from(ignore)]
    #[display(
        "Endpoint '{endpoint}' declares multipart fields while body entity '{entity}' also has upload fields"
    )]
    AmbiguousMultipart {
        /// Handler / operation identifier.
        endpoint: String,
        /// The body entity type with upload fields.
        entity: String,
    },

    /// A type reference could not be resolved.
    #[from(ignore)]
    #[display("Unresolved type '{name}' referenced by '{referenced_by}'")]
    UnresolvedType {
        /// The unknown type name.
        name: String,
        /// The type or endpoint that referenced it.
        referenced_by: String,
    },

    /// A file response and an entity/inline response claim the same status.
    #[from(ignore)]
    #[display("Endpoint '{endpoint}': status {status} declares both a file response and a content response")]
    ResponseConflict {
        /// Handler / operation identifier.
        endpoint: String,
        /// The conflicting status code.
        status: u16,
    },

    /// Two emitted endpoints share method and mask.
    #[from(ignore)]
    #[display("Route {method} {mask} is declared by both '{first}' and '{second}'")]
    DuplicateRoute {
        /// HTTP method.
        method: String,
        /// Path mask.
        mask: String,
        /// First handler.
        first: String,
        /// Second handler.
        second: String,
    },

    /// Invalid generator configuration.
    #[from(ignore)]
    #[display("Invalid configuration: {_0}")]
    InvalidConfig(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

impl AppError {
    /// Returns true for errors caused by the input metadata rather than the environment.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(
            self,
            AppError::Io(_) | AppError::Json(_) | AppError::Yaml(_) | AppError::General(_)
        )
    }
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
