#![deny(missing_docs)]

//! # Routes Module
//!
//! Entry point for turning controller descriptors into endpoint records.
//! Orchestrates Descriptors -> Resolvers -> Assembler -> `EndpointRecord`s.

pub mod assembler;
pub mod naming;
pub mod pattern;

use crate::config::GeneratorConfig;
use crate::error::AppResult;
use crate::oas::endpoint::EndpointRecord;
use crate::oas::models::ControllerDescriptor;
use crate::oas::registry::SchemaRegistry;

pub use assembler::{validate_path_parameters, EndpointAssembler};
pub use pattern::{find_endpoint, PathPattern};

/// Assembles the records of every controller, in declaration order.
pub fn assemble_controllers(
    controllers: &[ControllerDescriptor],
    registry: &mut SchemaRegistry,
    config: &GeneratorConfig,
) -> AppResult<Vec<EndpointRecord>> {
    let mut assembler = EndpointAssembler::new(registry, config);
    let mut records = Vec::new();
    for controller in controllers {
        records.extend(assembler.assemble(controller)?);
    }
    Ok(records)
}
