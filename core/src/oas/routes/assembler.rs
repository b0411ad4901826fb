#![deny(missing_docs)]

//! # Endpoint Assembler
//!
//! Turns controller and operation descriptors into `EndpointRecord`s.
//!
//! Tags and security follow override semantics: a value declared on the
//! operation replaces the controller's value entirely. Each alias path yields
//! a full clone of the record with its own mask and pattern.

use crate::config::GeneratorConfig;
use crate::error::{AppError, AppResult};
use crate::oas::endpoint::{
    EndpointRecord, ResponseContent, ResponseSpec, SecuritySetting,
};
use crate::oas::models::{ControllerDescriptor, OperationDescriptor, ParamLocation, ParameterDescriptor};
use crate::oas::registry::SchemaRegistry;
use crate::oas::resolver::{
    default_description, ParameterResolver, RequestBodyResolver, ResponseResolver,
};
use crate::oas::routes::naming::derive_operation_id;
use crate::oas::routes::pattern::{join_mask, placeholders, PathPattern};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Builds endpoint records, registering referenced types on the way.
pub struct EndpointAssembler<'r> {
    registry: &'r mut SchemaRegistry,
    config: &'r GeneratorConfig,
}

impl<'r> EndpointAssembler<'r> {
    /// Creates an assembler.
    pub fn new(registry: &'r mut SchemaRegistry, config: &'r GeneratorConfig) -> Self {
        Self { registry, config }
    }

    /// Assembles every operation of `controller`, aliases included.
    pub fn assemble(&mut self, controller: &ControllerDescriptor) -> AppResult<Vec<EndpointRecord>> {
        let mut records = Vec::new();
        for operation in &controller.operations {
            records.extend(self.assemble_operation(controller, operation)?);
        }
        Ok(records)
    }

    /// Assembles one operation into its primary record plus one clone per alias.
    pub fn assemble_operation(
        &mut self,
        controller: &ControllerDescriptor,
        op: &OperationDescriptor,
    ) -> AppResult<Vec<EndpointRecord>> {
        let endpoint = op.handler.as_str();
        let mask = join_mask(&controller.prefix, &op.path);
        check_unique_placeholders(&mask)?;

        let mut methods = op.methods.clone();
        methods.sort();
        methods.dedup();
        let Some(first_method) = methods.first().copied() else {
            return Err(AppError::InvalidConfig(format!(
                "Endpoint '{}' declares no HTTP method",
                endpoint
            )));
        };

        let parameters = ParameterResolver::new(self.registry, &self.config.context_types)
            .infer(&op.signature, &mask, &op.parameters, &methods, endpoint)?;
        validate_path_parameters(endpoint, &mask, &parameters)?;

        let request_body = RequestBodyResolver::new(self.registry, &self.config.context_types)
            .resolve(
                &op.signature,
                op.request_body.as_ref(),
                &op.multipart,
                &methods,
                &mask,
                endpoint,
            )?;

        let mut responses =
            ResponseResolver::new(self.registry, self.config.default_list_wrapper).resolve(
                &op.responses,
                &op.file_responses,
                endpoint,
            )?;
        if responses.is_empty() {
            responses.insert(
                200,
                ResponseSpec {
                    status: 200,
                    description: default_description(200).to_string(),
                    content: ResponseContent::Empty,
                },
            );
        }

        let security = resolve_security(controller, op);
        if let SecuritySetting::Explicit(requirements) = &security {
            self.config.check_security_requirements(requirements, endpoint)?;
        }

        let record = EndpointRecord {
            handler: op.handler.clone(),
            controller: controller.name.clone(),
            operation_id: op
                .operation_id
                .clone()
                .unwrap_or_else(|| derive_operation_id(first_method.as_str(), &mask)),
            pattern: PathPattern::compile(&mask)?,
            mask,
            methods,
            parameters,
            request_body,
            responses,
            tags: op.tags.clone().unwrap_or_else(|| controller.tags.clone()),
            security,
            summary: op.summary.clone(),
            description: op.description.clone(),
            deprecated: op.deprecated,
            hidden: op.hidden || controller.hidden,
            alias_of: None,
        };
        tracing::debug!(endpoint = %endpoint, mask = %record.mask, "Assembled endpoint");

        let mut records = Vec::with_capacity(1 + op.aliases.len());
        for alias in &op.aliases {
            let alias_mask = join_mask(&controller.prefix, alias);
            check_unique_placeholders(&alias_mask)?;
            validate_path_parameters(endpoint, &alias_mask, &record.parameters)?;
            let pattern = PathPattern::compile(&alias_mask)?;
            tracing::debug!(endpoint = %endpoint, alias = %alias_mask, "Cloned endpoint for alias");
            records.push(record.clone_for_alias(alias_mask, pattern));
        }
        records.insert(0, record);
        Ok(records)
    }
}

/// Method-level security wins, then inline operation security, then the
/// controller's; otherwise the document default applies.
fn resolve_security(controller: &ControllerDescriptor, op: &OperationDescriptor) -> SecuritySetting {
    op.security
        .clone()
        .or_else(|| op.operation_security.clone())
        .or_else(|| controller.security.clone())
        .map(SecuritySetting::Explicit)
        .unwrap_or_default()
}

fn check_unique_placeholders(mask: &str) -> AppResult<()> {
    let mut seen = HashSet::new();
    for name in placeholders(mask) {
        if !seen.insert(name.clone()) {
            return Err(AppError::DuplicatePathParameter {
                mask: mask.to_string(),
                name,
            });
        }
    }
    Ok(())
}

/// Checks that path parameters and mask placeholders correspond one to one.
pub fn validate_path_parameters(
    endpoint: &str,
    mask: &str,
    params: &IndexMap<String, ParameterDescriptor>,
) -> AppResult<()> {
    let path_vars = placeholders(mask);

    for param in params.values().filter(|p| p.location == ParamLocation::Path) {
        if !path_vars.contains(&param.name) {
            return Err(AppError::UnknownPathParameter {
                endpoint: endpoint.to_string(),
                mask: mask.to_string(),
                name: param.name.clone(),
            });
        }
    }

    for name in path_vars {
        let declared = params
            .get(&name)
            .is_some_and(|p| p.location == ParamLocation::Path);
        if !declared {
            return Err(AppError::MissingPathParameter {
                endpoint: endpoint.to_string(),
                mask: mask.to_string(),
                name,
            });
        }
    }
    Ok(())
}
