#![deny(missing_docs)]

//! # Request Body Resolution
//!
//! Decides the request body of an operation. Precedence:
//!
//! 1. An explicit body descriptor.
//! 2. Multipart fields declared on the operation.
//! 3. The handler's body carrier: the first described object parameter that
//!    is neither a context type nor bound to a path placeholder, provided no
//!    method of the operation forbids a body.
//!
//! An entity with upload fields turns into a `multipart/form-data` form.

use crate::error::{AppError, AppResult};
use crate::oas::endpoint::{BodyContent, MediaSpec, RequestBodySpec, JSON_MEDIA_TYPE};
use crate::oas::models::{
    HandlerSignature, HttpMethod, MediaDescriptor, MultipartFieldDescriptor,
    RequestBodyDescriptor, SchemaSource, SignatureParam, TypeDescriptor, TypeRef,
};
use crate::oas::registry::SchemaRegistry;
use crate::oas::routes::pattern::placeholders;
use crate::oas::schema::{PrimitiveType, SchemaNode};
use indexmap::IndexMap;

/// Whether `ty` names one of the framework-injected context types.
pub fn is_context_type(ty: &TypeRef, context_types: &[String]) -> bool {
    match ty {
        TypeRef::Named(name) | TypeRef::Scalar(name) => context_types.iter().any(|c| c == name),
        _ => false,
    }
}

/// The signature parameter that carries the request body, if any.
pub fn body_carrier<'s>(
    signature: &'s HandlerSignature,
    mask: &str,
    methods: &[HttpMethod],
    registry: &SchemaRegistry,
    context_types: &[String],
) -> Option<&'s SignatureParam> {
    if methods.iter().any(|m| !m.permits_body()) {
        return None;
    }
    let path_names = placeholders(mask);
    signature.params.iter().find(|p| {
        !is_context_type(&p.ty, context_types)
            && !path_names.contains(&p.name)
            && registry.object_descriptor(&p.ty).is_some()
    })
}

/// Resolves request bodies against a schema registry.
pub struct RequestBodyResolver<'r> {
    registry: &'r mut SchemaRegistry,
    context_types: &'r [String],
}

impl<'r> RequestBodyResolver<'r> {
    /// Creates a resolver.
    pub fn new(registry: &'r mut SchemaRegistry, context_types: &'r [String]) -> Self {
        Self {
            registry,
            context_types,
        }
    }

    /// Resolves the body of one operation.
    ///
    /// `endpoint` names the operation in errors.
    pub fn resolve(
        &mut self,
        signature: &HandlerSignature,
        explicit: Option<&RequestBodyDescriptor>,
        multipart: &[MultipartFieldDescriptor],
        methods: &[HttpMethod],
        mask: &str,
        endpoint: &str,
    ) -> AppResult<Option<RequestBodySpec>> {
        let carrier = body_carrier(signature, mask, methods, self.registry, self.context_types);

        if !multipart.is_empty() {
            let entity = explicit
                .and_then(|b| b.entity.clone())
                .or_else(|| carrier.and_then(|p| p.ty.type_name().map(str::to_string)));
            if let Some(entity) = entity {
                if self
                    .registry
                    .descriptor(&entity)
                    .is_some_and(TypeDescriptor::has_upload_fields)
                {
                    return Err(AppError::AmbiguousMultipart {
                        endpoint: endpoint.to_string(),
                        entity,
                    });
                }
            }
        }

        if let Some(body) = explicit {
            return self.from_explicit(body, endpoint).map(Some);
        }
        if !multipart.is_empty() {
            let schema = self.multipart_form(multipart, endpoint)?;
            return Ok(Some(RequestBodySpec {
                required: true,
                description: None,
                content: BodyContent::Multipart { schema },
            }));
        }
        match carrier {
            Some(param) => {
                let name = param.ty.type_name().unwrap_or_default().to_string();
                let content = self.entity_content(&name, None, endpoint)?;
                Ok(Some(RequestBodySpec {
                    required: !param.nullable && !param.defaulted(),
                    description: None,
                    content,
                }))
            }
            None => Ok(None),
        }
    }

    fn from_explicit(
        &mut self,
        body: &RequestBodyDescriptor,
        endpoint: &str,
    ) -> AppResult<RequestBodySpec> {
        let content = match &body.entity {
            Some(entity) => self.entity_content(entity, body.media_type.as_deref(), endpoint)?,
            None => BodyContent::Inline(self.inline_content(&body.content, endpoint)?),
        };
        Ok(RequestBodySpec {
            required: body.required.unwrap_or(true),
            description: body.description.clone(),
            content,
        })
    }

    fn entity_content(
        &mut self,
        entity: &str,
        media_type: Option<&str>,
        endpoint: &str,
    ) -> AppResult<BodyContent> {
        let descriptor = self.registry.descriptor(entity).cloned();
        match descriptor {
            Some(desc) if desc.has_upload_fields() => {
                let mut form = SchemaNode::object();
                for field in &desc.fields {
                    let node = self.registry.field_schema(field, &desc.name)?;
                    form = form.with_property(field.name.clone(), node, field.is_required_in_form());
                }
                Ok(BodyContent::Multipart { schema: form })
            }
            _ => Ok(BodyContent::Entity {
                media_type: media_type.unwrap_or(JSON_MEDIA_TYPE).to_string(),
                schema: self.registry.reference(entity, endpoint)?,
            }),
        }
    }

    fn multipart_form(
        &mut self,
        fields: &[MultipartFieldDescriptor],
        endpoint: &str,
    ) -> AppResult<SchemaNode> {
        let mut form = SchemaNode::object();
        for field in fields {
            let mut node = if field.upload {
                if field.multiple {
                    SchemaNode::array_of(SchemaNode::binary())
                } else {
                    SchemaNode::binary()
                }
            } else {
                match &field.ty {
                    Some(ty) => self.registry.schema_for(ty, endpoint)?,
                    None => SchemaNode::primitive(PrimitiveType::String),
                }
            };
            if let Some(description) = &field.description {
                node = node.with_description(description.clone());
            }
            form = form.with_property(field.name.clone(), node, field.required);
        }
        Ok(form)
    }

    fn inline_content(
        &mut self,
        content: &IndexMap<String, MediaDescriptor>,
        endpoint: &str,
    ) -> AppResult<IndexMap<String, MediaSpec>> {
        inline_media(self.registry, content, endpoint)
    }
}

/// Resolves a hand-written content map.
pub(crate) fn inline_media(
    registry: &mut SchemaRegistry,
    content: &IndexMap<String, MediaDescriptor>,
    endpoint: &str,
) -> AppResult<IndexMap<String, MediaSpec>> {
    let mut media = IndexMap::new();
    for (media_type, entry) in content {
        let schema = match &entry.schema {
            Some(SchemaSource::Node(node)) => Some(registry.adopt(node.clone(), endpoint)?),
            Some(SchemaSource::Type(name)) => Some(registry.reference(name, endpoint)?),
            Some(SchemaSource::Inline(raw)) => Some(registry.inline_source(raw, endpoint)?),
            None => None,
        };
        media.insert(
            media_type.clone(),
            MediaSpec {
                schema,
                example: entry.example.clone(),
            },
        );
    }
    Ok(media)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::models::FieldDescriptor;
    use serde_json::json;

    fn context() -> Vec<String> {
        vec!["Request".to_string()]
    }

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry.declare(TypeDescriptor::object(
            "CreateUser",
            vec![FieldDescriptor::new("name", TypeRef::scalar("String"))],
        ));
        registry.declare(TypeDescriptor::object(
            "AvatarUpload",
            vec![
                FieldDescriptor::new("file", TypeRef::scalar("binary")).upload(false),
                FieldDescriptor::new("note", TypeRef::scalar("String")).nullable(),
            ],
        ));
        registry
    }

    fn signature(params: Vec<SignatureParam>) -> HandlerSignature {
        HandlerSignature::new(params)
    }

    #[test]
    fn test_inferred_json_entity() {
        let mut registry = registry();
        let ctx = context();
        let sig = signature(vec![
            SignatureParam::new("request", TypeRef::named("Request")),
            SignatureParam::new("payload", TypeRef::named("CreateUser")),
        ]);
        let body = RequestBodyResolver::new(&mut registry, &ctx)
            .resolve(&sig, None, &[], &[HttpMethod::Post], "/users", "create_user")
            .unwrap()
            .unwrap();
        assert!(body.required);
        assert_eq!(
            body.content,
            BodyContent::Entity {
                media_type: JSON_MEDIA_TYPE.to_string(),
                schema: SchemaNode::reference_to("CreateUser"),
            }
        );
    }

    #[test]
    fn test_no_body_for_get() {
        let mut registry = registry();
        let ctx = context();
        let sig = signature(vec![SignatureParam::new("payload", TypeRef::named("CreateUser"))]);
        let body = RequestBodyResolver::new(&mut registry, &ctx)
            .resolve(&sig, None, &[], &[HttpMethod::Get, HttpMethod::Post], "/users", "x")
            .unwrap();
        assert!(body.is_none());
    }

    #[test]
    fn test_upload_entity_becomes_multipart() {
        let mut registry = registry();
        let ctx = context();
        let sig = signature(vec![SignatureParam::new("form", TypeRef::named("AvatarUpload"))]);
        let body = RequestBodyResolver::new(&mut registry, &ctx)
            .resolve(&sig, None, &[], &[HttpMethod::Post], "/avatar", "upload")
            .unwrap()
            .unwrap();
        let BodyContent::Multipart { schema } = &body.content else {
            panic!("expected multipart body");
        };
        assert_eq!(
            serde_json::to_value(schema).unwrap(),
            json!({
                "type": "object",
                "properties": {
                    "file": {"type": "string", "format": "binary"},
                    "note": {"type": "string", "nullable": true}
                },
                "required": ["file"]
            })
        );
        assert!(registry.get("AvatarUpload").is_none());
    }

    #[test]
    fn test_multipart_conflict_is_reported() {
        let mut registry = registry();
        let ctx = context();
        let sig = signature(vec![SignatureParam::new("form", TypeRef::named("AvatarUpload"))]);
        let fields = vec![MultipartFieldDescriptor {
            name: "file".into(),
            ty: None,
            upload: true,
            multiple: false,
            required: true,
            description: None,
        }];
        let err = RequestBodyResolver::new(&mut registry, &ctx)
            .resolve(&sig, None, &fields, &[HttpMethod::Post], "/avatar", "upload")
            .unwrap_err();
        assert!(matches!(err, AppError::AmbiguousMultipart { ref entity, .. } if entity == "AvatarUpload"));
    }

    #[test]
    fn test_explicit_multipart_fields() {
        let mut registry = registry();
        let ctx = context();
        let fields = vec![
            MultipartFieldDescriptor {
                name: "files".into(),
                ty: None,
                upload: true,
                multiple: true,
                required: true,
                description: Some("Attachments".into()),
            },
            MultipartFieldDescriptor {
                name: "title".into(),
                ty: None,
                upload: false,
                multiple: false,
                required: false,
                description: None,
            },
        ];
        let body = RequestBodyResolver::new(&mut registry, &ctx)
            .resolve(&HandlerSignature::default(), None, &fields, &[HttpMethod::Put], "/docs", "x")
            .unwrap()
            .unwrap();
        let media = body.media();
        let schema = media["multipart/form-data"].schema.as_ref().unwrap();
        assert_eq!(
            serde_json::to_value(schema).unwrap(),
            json!({
                "type": "object",
                "properties": {
                    "files": {
                        "type": "array",
                        "description": "Attachments",
                        "items": {"type": "string", "format": "binary"}
                    },
                    "title": {"type": "string"}
                },
                "required": ["files"]
            })
        );
    }

    #[test]
    fn test_explicit_body_wins_over_carrier() {
        let mut registry = registry();
        let ctx = context();
        let sig = signature(vec![SignatureParam::new("payload", TypeRef::named("CreateUser"))]);
        let mut content = IndexMap::new();
        content.insert(
            "text/plain".to_string(),
            MediaDescriptor {
                schema: Some(SchemaSource::Type("String".into())),
                example: Some(json!("hello")),
            },
        );
        let explicit = RequestBodyDescriptor {
            content,
            required: Some(false),
            ..RequestBodyDescriptor::default()
        };
        let body = RequestBodyResolver::new(&mut registry, &ctx)
            .resolve(&sig, Some(&explicit), &[], &[HttpMethod::Post], "/echo", "echo")
            .unwrap()
            .unwrap();
        assert!(!body.required);
        let media = body.media();
        assert_eq!(media.keys().collect::<Vec<_>>(), vec!["text/plain"]);
        assert_eq!(media["text/plain"].example, Some(json!("hello")));
    }
}
