#![deny(missing_docs)]

//! # Resolver Module
//!
//! Per-operation resolution of the pieces an endpoint is made of.
//!
//! Handles:
//! - Scalar type mapping (`types`).
//! - Parameter inference and explicit overrides (`params`).
//! - Request body selection, multipart forms and encoding conflicts (`body`).
//! - Response specs, list wrappers and file downloads (`responses`).

pub mod body;
pub mod params;
pub mod responses;
pub mod types;

pub use body::RequestBodyResolver;
pub use params::ParameterResolver;
pub use responses::{default_description, ResponseResolver};
pub use types::scalar_schema;
