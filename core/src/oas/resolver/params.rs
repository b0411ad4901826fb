#![deny(missing_docs)]

//! # Parameter Resolution
//!
//! Merges explicit parameter descriptors with parameters inferred from the
//! handler signature. For each signature parameter the first matching rule wins:
//!
//! 1. A parameter of the same name was declared explicitly: left untouched.
//! 2. Its type is a framework context type: skipped.
//! 3. Its name matches a `{name}` placeholder: required path parameter.
//! 4. It carries the request body: skipped.
//! 5. Otherwise a query parameter, required unless nullable or defaulted.
//!    A described object type is expanded into one query parameter per field.

use crate::error::{AppError, AppResult};
use crate::oas::models::{
    HandlerSignature, HttpMethod, ParamLocation, ParamStyle, ParameterDescriptor, TypeDescriptor,
    TypeRef,
};
use crate::oas::registry::SchemaRegistry;
use crate::oas::resolver::body::{body_carrier, is_context_type};
use crate::oas::routes::pattern::placeholders;
use crate::oas::schema::{PrimitiveType, SchemaNode};
use indexmap::IndexMap;

/// Resolves operation parameters against a schema registry.
pub struct ParameterResolver<'r> {
    registry: &'r mut SchemaRegistry,
    context_types: &'r [String],
}

impl<'r> ParameterResolver<'r> {
    /// Creates a resolver.
    pub fn new(registry: &'r mut SchemaRegistry, context_types: &'r [String]) -> Self {
        Self {
            registry,
            context_types,
        }
    }

    /// Infers the full parameter map of one operation.
    ///
    /// Explicit parameters come first, in declaration order, followed by
    /// inferred ones in signature order. Every returned descriptor carries
    /// its effective `schema`.
    pub fn infer(
        &mut self,
        signature: &HandlerSignature,
        mask: &str,
        explicit: &[ParameterDescriptor],
        methods: &[HttpMethod],
        endpoint: &str,
    ) -> AppResult<IndexMap<String, ParameterDescriptor>> {
        let mut resolved: IndexMap<String, ParameterDescriptor> = IndexMap::new();
        for param in explicit {
            if resolved.contains_key(&param.name) {
                return Err(AppError::DuplicateParameter {
                    endpoint: endpoint.to_string(),
                    name: param.name.clone(),
                });
            }
            let finished = self.finish_explicit(param, endpoint)?;
            resolved.insert(param.name.clone(), finished);
        }

        let path_names = placeholders(mask);
        let carrier = body_carrier(signature, mask, methods, self.registry, self.context_types)
            .map(|p| p.name.clone());

        for param in &signature.params {
            if resolved.contains_key(&param.name) {
                continue;
            }
            if is_context_type(&param.ty, self.context_types) {
                continue;
            }
            if path_names.contains(&param.name) {
                let schema = self.registry.schema_for(&param.ty, endpoint)?;
                let mut path = ParameterDescriptor::path(param.name.clone()).with_type(param.ty.clone());
                path.schema = Some(schema);
                resolved.insert(param.name.clone(), path);
                continue;
            }
            if carrier.as_deref() == Some(param.name.as_str()) {
                continue;
            }

            if let Some(dto) = self.registry.object_descriptor(&param.ty).cloned() {
                for field in self.extract_query_fields(&dto)? {
                    if !resolved.contains_key(&field.name) {
                        resolved.insert(field.name.clone(), field);
                    }
                }
                continue;
            }

            let mut schema = self.registry.schema_for(&param.ty, endpoint)?;
            if let Some(default) = &param.default {
                schema.default = Some(default.clone());
            }
            if param.nullable {
                schema = schema.into_nullable();
            }
            let mut query = ParameterDescriptor::query(
                param.name.clone(),
                !param.nullable && !param.defaulted(),
            )
            .with_type(param.ty.clone());
            query.schema = Some(schema);
            resolved.insert(param.name.clone(), query);
        }

        Ok(resolved)
    }

    /// Expands a DTO into one query parameter per non-upload field.
    ///
    /// Object-valued fields use `style: deepObject` with `explode: true`.
    pub fn extract_query_fields(
        &mut self,
        dto: &TypeDescriptor,
    ) -> AppResult<Vec<ParameterDescriptor>> {
        let mut params = Vec::new();
        for field in dto.fields.iter().filter(|f| f.upload.is_none()) {
            let schema = self.registry.field_schema(field, &dto.name)?;
            let mut param = ParameterDescriptor::query(field.name.clone(), field.is_required())
                .with_type(field.ty.clone());
            param.description = field.description.clone();
            param.example = field.example.clone();
            param.deprecated = field.deprecated;
            if self.is_object_valued(&field.ty) {
                param.style = Some(ParamStyle::DeepObject);
                param.explode = Some(true);
            }
            param.schema = Some(schema);
            params.push(param);
        }
        Ok(params)
    }

    fn is_object_valued(&self, ty: &TypeRef) -> bool {
        match ty {
            TypeRef::Map(_) => true,
            TypeRef::Inline(node) => node.schema_type == Some(PrimitiveType::Object),
            _ => self.registry.object_descriptor(ty).is_some(),
        }
    }

    fn finish_explicit(
        &mut self,
        param: &ParameterDescriptor,
        endpoint: &str,
    ) -> AppResult<ParameterDescriptor> {
        validate_style_for_location(&param.name, param.location, param.style)?;

        let mut schema = match (&param.schema, &param.ty) {
            (Some(node), _) => self.registry.adopt(node.clone(), endpoint)?,
            (None, Some(ty)) => self.registry.schema_for(ty, endpoint)?,
            (None, None) => SchemaNode::primitive(PrimitiveType::String),
        };
        if let Some(format) = &param.format {
            if schema.reference.is_none() {
                schema.format = Some(format.clone());
            }
        }

        let mut finished = param.clone();
        if finished.location == ParamLocation::Path {
            finished.required = true;
        }
        finished.schema = Some(schema);
        Ok(finished)
    }
}

fn validate_style_for_location(
    name: &str,
    location: ParamLocation,
    style: Option<ParamStyle>,
) -> AppResult<()> {
    let Some(style) = style else {
        return Ok(());
    };

    let is_allowed = match location {
        ParamLocation::Path => matches!(
            style,
            ParamStyle::Matrix | ParamStyle::Label | ParamStyle::Simple
        ),
        ParamLocation::Query => matches!(
            style,
            ParamStyle::Form
                | ParamStyle::SpaceDelimited
                | ParamStyle::PipeDelimited
                | ParamStyle::DeepObject
        ),
        ParamLocation::Header => matches!(style, ParamStyle::Simple),
        ParamLocation::Cookie => matches!(style, ParamStyle::Form),
    };

    if !is_allowed {
        return Err(AppError::InvalidConfig(format!(
            "Parameter '{}' uses style {:?} which is not allowed for {:?}",
            name, style, location
        )));
    }
    Ok(())
}
