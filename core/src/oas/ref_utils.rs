#![deny(missing_docs)]

//! # Reference Utilities
//!
//! Helpers for building and reading `#/components/schemas/<name>` pointers.
//!
//! References produced by the registry are always local. Hand-written inline
//! schemas may carry JSON Pointer escapes (`~0`, `~1`) or percent-encoding,
//! both of which are decoded when reading a name back.

use percent_encoding::percent_decode_str;

/// Prefix of every component schema reference.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Builds the `$ref` string for a component schema.
pub fn component_ref(name: &str) -> String {
    format!("{}{}", SCHEMA_REF_PREFIX, encode_pointer_segment(name))
}

/// Extracts a component name from a `$ref` if it points to `#/components/{section}/{name}`.
///
/// Returns `None` for external references and other component sections.
pub fn extract_component_name(ref_str: &str, section: &str) -> Option<String> {
    let pointer = ref_str.strip_prefix("#/")?;
    let segments: Vec<&str> = pointer.split('/').collect();

    if segments.len() != 3 {
        return None;
    }
    if segments[0] != "components" || segments[1] != section {
        return None;
    }

    let name = decode_pointer_segment(segments[2]);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Shorthand for `extract_component_name(ref_str, "schemas")`.
pub fn schema_name_from_ref(ref_str: &str) -> Option<String> {
    extract_component_name(ref_str, "schemas")
}

/// Encodes a JSON Pointer segment (`~` -> `~0`, `/` -> `~1`).
pub(crate) fn encode_pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Decodes a JSON Pointer segment (handles `~1` and `~0`).
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}
