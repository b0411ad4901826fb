#![deny(missing_docs)]

//! # Response Resolution
//!
//! Builds per-status `ResponseSpec`s from explicit and file-download
//! declarations.
//!
//! - Entity responses reference their type; several entity types form a `oneOf`.
//! - List responses wrap the item schema according to the wrapper policy.
//! - An entity always wins over an inline content map on the same declaration.
//! - A file response never shares a status with an entity or inline response.

use crate::error::{AppError, AppResult};
use crate::oas::endpoint::{ResponseContent, ResponseSpec, JSON_MEDIA_TYPE};
use crate::oas::models::{FileResponseDescriptor, ListWrapper, ResponseDescriptor};
use crate::oas::registry::SchemaRegistry;
use crate::oas::resolver::body::inline_media;
use crate::oas::schema::{CompositionKind, PrimitiveType, SchemaNode};
use std::collections::BTreeMap;

/// Standard description for a status code.
pub fn default_description(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        410 => "Gone",
        415 => "Unsupported Media Type",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Response",
    }
}

/// Shapes a bare array schema according to `wrapper`.
pub fn wrap_list(array: SchemaNode, wrapper: ListWrapper) -> SchemaNode {
    match wrapper {
        ListWrapper::None => array,
        ListWrapper::DataOnly => SchemaNode::object().with_property("data", array, true),
        ListWrapper::DataMeta => {
            let int = || SchemaNode::primitive(PrimitiveType::Integer);
            let meta = SchemaNode::object()
                .with_property("total", int(), true)
                .with_property("limit", int(), true)
                .with_property("offset", int(), true);
            SchemaNode::object()
                .with_property("data", array, true)
                .with_property("meta", meta, true)
        }
    }
}

/// Resolves responses against a schema registry.
pub struct ResponseResolver<'r> {
    registry: &'r mut SchemaRegistry,
    default_wrapper: ListWrapper,
}

impl<'r> ResponseResolver<'r> {
    /// Creates a resolver; `default_wrapper` applies to lists that name none.
    pub fn new(registry: &'r mut SchemaRegistry, default_wrapper: ListWrapper) -> Self {
        Self {
            registry,
            default_wrapper,
        }
    }

    /// Resolves all responses of one operation, keyed by status.
    pub fn resolve(
        &mut self,
        explicit: &[ResponseDescriptor],
        files: &[FileResponseDescriptor],
        endpoint: &str,
    ) -> AppResult<BTreeMap<u16, ResponseSpec>> {
        let mut responses = BTreeMap::new();
        for descriptor in explicit {
            let spec = self.resolve_one(descriptor, endpoint)?;
            if responses.contains_key(&spec.status) {
                tracing::warn!(
                    endpoint = %endpoint,
                    status = spec.status,
                    "Response declared more than once, keeping the first"
                );
                continue;
            }
            responses.insert(spec.status, spec);
        }

        for file in files {
            let description = match responses.get(&file.status) {
                Some(existing) if existing.has_content() => {
                    return Err(AppError::ResponseConflict {
                        endpoint: endpoint.to_string(),
                        status: file.status,
                    });
                }
                Some(existing) => file
                    .description
                    .clone()
                    .unwrap_or_else(|| existing.description.clone()),
                None => file
                    .description
                    .clone()
                    .unwrap_or_else(|| default_description(file.status).to_string()),
            };
            responses.insert(
                file.status,
                ResponseSpec {
                    status: file.status,
                    description,
                    content: ResponseContent::File {
                        content_type: file.content_type.clone(),
                    },
                },
            );
        }

        Ok(responses)
    }

    fn resolve_one(
        &mut self,
        descriptor: &ResponseDescriptor,
        endpoint: &str,
    ) -> AppResult<ResponseSpec> {
        let description = descriptor
            .description
            .clone()
            .unwrap_or_else(|| default_description(descriptor.status).to_string());
        let media_type = descriptor
            .media_type
            .clone()
            .unwrap_or_else(|| JSON_MEDIA_TYPE.to_string());

        let content = if !descriptor.entity.is_empty() {
            let mut refs = Vec::with_capacity(descriptor.entity.len());
            for entity in &descriptor.entity {
                refs.push(self.registry.reference(entity, endpoint)?);
            }
            let item = SchemaRegistry::compose_nodes(CompositionKind::OneOf, refs);
            if descriptor.list {
                let wrapper = descriptor.wrapper.unwrap_or(self.default_wrapper);
                ResponseContent::List {
                    media_type,
                    wrapper,
                    schema: wrap_list(SchemaNode::array_of(item), wrapper),
                }
            } else {
                ResponseContent::Entity {
                    media_type,
                    schema: item,
                }
            }
        } else if !descriptor.content.is_empty() {
            ResponseContent::Inline(inline_media(self.registry, &descriptor.content, endpoint)?)
        } else {
            ResponseContent::Empty
        };

        Ok(ResponseSpec {
            status: descriptor.status,
            description,
            content,
        })
    }
}
