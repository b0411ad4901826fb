#![deny(missing_docs)]

//! # Endpoint Records
//!
//! Fully resolved per-operation data produced by the assembler and consumed by
//! the document generator.

use crate::oas::models::{HttpMethod, ListWrapper, ParameterDescriptor, SecurityRequirement};
use crate::oas::routes::pattern::PathPattern;
use crate::oas::schema::SchemaNode;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::BTreeMap;

/// Media type used for entity payloads unless overridden.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Media type of form uploads.
pub const MULTIPART_MEDIA_TYPE: &str = "multipart/form-data";

/// One media-type entry of a body or response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaSpec {
    /// Payload schema.
    pub schema: Option<SchemaNode>,
    /// Example payload.
    pub example: Option<Value>,
}

impl MediaSpec {
    /// An entry with only a schema.
    pub fn schema(schema: SchemaNode) -> Self {
        Self {
            schema: Some(schema),
            example: None,
        }
    }
}

/// The single content mode of a request body.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyContent {
    /// A reference to an entity schema.
    Entity {
        /// Media type, usually `application/json`.
        media_type: String,
        /// Entity schema.
        schema: SchemaNode,
    },
    /// A `multipart/form-data` object with one property per form field.
    Multipart {
        /// Object schema of the form.
        schema: SchemaNode,
    },
    /// Hand-written content map.
    Inline(IndexMap<String, MediaSpec>),
}

/// Resolved request body.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBodySpec {
    /// Required flag.
    pub required: bool,
    /// Description.
    pub description: Option<String>,
    /// Content.
    pub content: BodyContent,
}

impl RequestBodySpec {
    /// The content as a media-type map.
    pub fn media(&self) -> IndexMap<String, MediaSpec> {
        match &self.content {
            BodyContent::Entity { media_type, schema } => {
                IndexMap::from([(media_type.clone(), MediaSpec::schema(schema.clone()))])
            }
            BodyContent::Multipart { schema } => IndexMap::from([(
                MULTIPART_MEDIA_TYPE.to_string(),
                MediaSpec::schema(schema.clone()),
            )]),
            BodyContent::Inline(map) => map.clone(),
        }
    }
}

/// The single content mode of a response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseContent {
    /// No body.
    Empty,
    /// One entity, or a `oneOf` of several.
    Entity {
        /// Media type.
        media_type: String,
        /// Entity schema.
        schema: SchemaNode,
    },
    /// A list of entities shaped by a wrapper policy.
    List {
        /// Media type.
        media_type: String,
        /// Wrapper policy applied.
        wrapper: ListWrapper,
        /// Wrapped schema.
        schema: SchemaNode,
    },
    /// Hand-written content map.
    Inline(IndexMap<String, MediaSpec>),
    /// A file download.
    File {
        /// Content type of the file.
        content_type: String,
    },
}

/// Resolved response for one status code.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSpec {
    /// Status code.
    pub status: u16,
    /// Description.
    pub description: String,
    /// Content.
    pub content: ResponseContent,
}

impl ResponseSpec {
    /// The content as a media-type map.
    pub fn media(&self) -> IndexMap<String, MediaSpec> {
        match &self.content {
            ResponseContent::Empty => IndexMap::new(),
            ResponseContent::Entity { media_type, schema }
            | ResponseContent::List {
                media_type, schema, ..
            } => IndexMap::from([(media_type.clone(), MediaSpec::schema(schema.clone()))]),
            ResponseContent::Inline(map) => map.clone(),
            ResponseContent::File { content_type } => IndexMap::from([(
                content_type.clone(),
                MediaSpec::schema(SchemaNode::binary()),
            )]),
        }
    }

    /// True when the response carries any content.
    pub fn has_content(&self) -> bool {
        !matches!(self.content, ResponseContent::Empty)
    }
}

/// Security of an operation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SecuritySetting {
    /// Falls back to the document-level default.
    #[default]
    Inherit,
    /// Replaces the default. An empty list means public.
    Explicit(Vec<SecurityRequirement>),
}

/// A fully resolved operation bound to one path mask.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointRecord {
    /// Handler identity.
    pub handler: String,
    /// Owning controller.
    pub controller: String,
    /// Methods, sorted and distinct.
    pub methods: Vec<HttpMethod>,
    /// Path mask.
    pub mask: String,
    /// Matcher compiled from the mask.
    pub pattern: PathPattern,
    /// Parameters keyed by name, explicit ones first.
    pub parameters: IndexMap<String, ParameterDescriptor>,
    /// Request body.
    pub request_body: Option<RequestBodySpec>,
    /// Responses by status code.
    pub responses: BTreeMap<u16, ResponseSpec>,
    /// Tags.
    pub tags: Vec<String>,
    /// Security.
    pub security: SecuritySetting,
    /// Operation id.
    pub operation_id: String,
    /// Summary.
    pub summary: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Deprecated.
    pub deprecated: bool,
    /// Hidden from the document.
    pub hidden: bool,
    /// The primary mask when this record is an alias clone.
    pub alias_of: Option<String>,
}

impl EndpointRecord {
    /// Clones the record onto another mask.
    pub fn clone_for_alias(&self, mask: String, pattern: PathPattern) -> Self {
        Self {
            mask,
            pattern,
            alias_of: Some(self.mask.clone()),
            ..self.clone()
        }
    }

    /// Whether the record answers `method`.
    pub fn handles(&self, method: HttpMethod) -> bool {
        self.methods.contains(&method)
    }
}
