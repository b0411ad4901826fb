#![deny(missing_docs)]

//! # API Doc Core
//!
//! Core library for deriving OpenAPI documents from handler and type descriptors.

/// Shared error types.
pub mod error;

/// Generator configuration.
pub mod config;

/// Manifest loading and the generation entry point.
pub mod manifest;

/// OpenAPI (OAS) schema and endpoint resolution.
pub mod oas;

pub use config::{ConfigOverlay, GeneratorConfig};
pub use error::{AppError, AppResult};
pub use manifest::ApiManifest;
pub use oas::{
    assemble_controllers, find_endpoint, ControllerDescriptor, Document, DocumentGenerator,
    EndpointRecord, HttpMethod, OperationDescriptor, SchemaNode, SchemaRegistry, TypeDescriptor,
    TypeRef,
};
