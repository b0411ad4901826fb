#![deny(missing_docs)]

//! # Type Mapping
//!
//! Maps built-in scalar type names onto primitive schema nodes.
//!
//! The table follows the usual host-language spellings:
//! - `String`, `str`, `char` -> `string`
//! - `i8`..`i32`, `u8`..`u32` -> `integer/int32`, wider ints -> `integer/int64`
//! - `f32` -> `number/float`, `f64` -> `number/double`
//! - `Uuid`, `DateTime`, `NaiveDate` -> `string` with the matching format

use crate::oas::schema::{PrimitiveType, SchemaNode};

/// Value types kept out of the component schema set by default.
pub const BUILTIN_VALUE_TYPES: &[&str] = &[
    "DateTime",
    "NaiveDateTime",
    "DateTimeInterface",
    "NaiveDate",
    "Uuid",
    "Value",
];

/// Returns the schema for a scalar type name, or `None` when the name is unknown.
pub fn scalar_schema(name: &str) -> Option<SchemaNode> {
    let node = match name {
        // Primitives
        "String" | "string" | "str" | "char" => SchemaNode::primitive(PrimitiveType::String),
        "bool" | "boolean" => SchemaNode::primitive(PrimitiveType::Boolean),
        "i8" | "i16" | "i32" | "u8" | "u16" | "u32" | "int" => {
            SchemaNode::formatted(PrimitiveType::Integer, "int32")
        }
        "i64" | "i128" | "isize" | "u64" | "u128" | "usize" => {
            SchemaNode::formatted(PrimitiveType::Integer, "int64")
        }
        "f32" | "float" => SchemaNode::formatted(PrimitiveType::Number, "float"),
        "f64" | "double" => SchemaNode::formatted(PrimitiveType::Number, "double"),

        // Complex / Formats
        "Uuid" | "uuid" => SchemaNode::formatted(PrimitiveType::String, "uuid"),
        "DateTime" | "NaiveDateTime" | "DateTimeInterface" | "date-time" => {
            SchemaNode::formatted(PrimitiveType::String, "date-time")
        }
        "NaiveDate" | "date" => SchemaNode::formatted(PrimitiveType::String, "date"),
        "binary" => SchemaNode::binary(),
        "email" => SchemaNode::formatted(PrimitiveType::String, "email"),

        // Free-form
        "Value" | "json" | "mixed" => SchemaNode::default(),

        _ => return None,
    };
    Some(node)
}

/// Inline stand-in for a type kept out of the schema set: its scalar schema,
/// or a free-form object.
pub fn excluded_type_schema(name: &str) -> SchemaNode {
    scalar_schema(name).unwrap_or_else(SchemaNode::object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn to_json(name: &str) -> serde_json::Value {
        serde_json::to_value(scalar_schema(name).unwrap()).unwrap()
    }

    #[test]
    fn test_map_primitives() {
        assert_eq!(to_json("String"), json!({"type": "string"}));
        assert_eq!(to_json("bool"), json!({"type": "boolean"}));
        assert_eq!(to_json("i32"), json!({"type": "integer", "format": "int32"}));
        assert_eq!(to_json("u64"), json!({"type": "integer", "format": "int64"}));
    }

    #[test]
    fn test_map_floats_registry() {
        assert_eq!(to_json("f32"), json!({"type": "number", "format": "float"}));
        assert_eq!(to_json("f64"), json!({"type": "number", "format": "double"}));
    }

    #[test]
    fn test_map_formats() {
        assert_eq!(to_json("Uuid"), json!({"type": "string", "format": "uuid"}));
        assert_eq!(
            to_json("DateTimeInterface"),
            json!({"type": "string", "format": "date-time"})
        );
        assert_eq!(to_json("NaiveDate"), json!({"type": "string", "format": "date"}));
        assert_eq!(to_json("binary"), json!({"type": "string", "format": "binary"}));
        assert_eq!(to_json("mixed"), json!({}));
    }

    #[test]
    fn test_unknown_scalar() {
        assert!(scalar_schema("Widget").is_none());
        assert!(BUILTIN_VALUE_TYPES.iter().all(|t| scalar_schema(t).is_some()));
    }

    #[test]
    fn test_excluded_type_schema() {
        assert_eq!(
            serde_json::to_value(excluded_type_schema("NaiveDateTime")).unwrap(),
            json!({"type": "string", "format": "date-time"})
        );
        assert_eq!(
            serde_json::to_value(excluded_type_schema("Money")).unwrap(),
            json!({"type": "object"})
        );
    }
}
