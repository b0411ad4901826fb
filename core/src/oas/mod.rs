#![deny(missing_docs)]

//! # OpenAPI Module
//!
//! - **models**: descriptor structures supplied by the introspection front-end.
//! - **schema**: the normalized schema node.
//! - **registry**: type-to-schema registry with cycle handling.
//! - **resolver**: parameters, request bodies and responses.
//! - **routes**: endpoint assembly, naming and path patterns.
//! - **document**: the final document and its generator.

pub mod document;
pub mod endpoint;
pub mod models;
pub(crate) mod normalization;
pub mod ref_utils;
pub mod registry;
pub mod resolver;
pub mod routes;
pub mod schema;

pub use document::{Document, DocumentGenerator, EndpointFilter};
pub use endpoint::{
    BodyContent, EndpointRecord, MediaSpec, RequestBodySpec, ResponseContent, ResponseSpec,
    SecuritySetting,
};
pub use models::{
    ControllerDescriptor, FieldDescriptor, HandlerSignature, HttpMethod, ListWrapper,
    OperationDescriptor, ParamLocation, ParamStyle, ParameterDescriptor, SchemaSource,
    SignatureParam, TypeDescriptor, TypeKind, TypeRef,
};
pub use registry::SchemaRegistry;
pub use routes::{assemble_controllers, find_endpoint, EndpointAssembler, PathPattern};
pub use schema::{CompositionKind, PrimitiveType, SchemaKind, SchemaNode};
