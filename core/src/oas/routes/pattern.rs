#![deny(missing_docs)]

//! # Path Patterns
//!
//! Placeholder extraction and request-path matching for path masks such as
//! `/users/{id}/posts/{post}`.

use crate::error::{AppError, AppResult};
use crate::oas::endpoint::EndpointRecord;
use crate::oas::models::HttpMethod;
use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]+)}").expect("Invalid regex constant"));

/// Placeholder names of `mask`, in order of appearance (repeats included).
pub fn placeholders(mask: &str) -> Vec<String> {
    PLACEHOLDER_RE
        .captures_iter(mask)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Joins a controller prefix and an operation path into a normalized mask.
///
/// The result starts with `/`, has no repeated or trailing slashes, and is
/// `/` for an empty path.
pub fn join_mask(prefix: &str, path: &str) -> String {
    let segments: Vec<&str> = prefix
        .split('/')
        .chain(path.split('/'))
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

/// A compiled path mask.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    names: Vec<String>,
    regex: Regex,
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl PathPattern {
    /// Compiles `mask`; each `{name}` becomes a `([^/]+)` capture.
    pub fn compile(mask: &str) -> AppResult<Self> {
        let mut source = String::from("^");
        let mut last = 0;
        for m in PLACEHOLDER_RE.find_iter(mask) {
            source.push_str(&regex::escape(&mask[last..m.start()]));
            source.push_str("([^/]+)");
            last = m.end();
        }
        source.push_str(&regex::escape(&mask[last..]));
        source.push('$');

        let regex = Regex::new(&source).map_err(|e| {
            AppError::General(format!("Failed to compile pattern for '{}': {}", mask, e))
        })?;
        Ok(Self {
            source,
            names: placeholders(mask),
            regex,
        })
    }

    /// The regular expression source.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `path` matches.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Captured placeholder values keyed by name, or `None` when `path` does not match.
    pub fn captures(&self, path: &str) -> Option<IndexMap<String, String>> {
        let caps = self.regex.captures(path)?;
        Some(
            self.names
                .iter()
                .zip(caps.iter().skip(1))
                .filter_map(|(name, m)| m.map(|m| (name.clone(), m.as_str().to_string())))
                .collect(),
        )
    }
}

/// Finds the record answering `method` whose pattern matches `path`.
///
/// When several match, the one with the fewest placeholders wins, so
/// `/users/me` takes precedence over `/users/{id}`. Ties go to the record
/// declared first.
pub fn find_endpoint<'a>(
    records: &'a [EndpointRecord],
    method: HttpMethod,
    path: &str,
) -> Option<(&'a EndpointRecord, IndexMap<String, String>)> {
    records
        .iter()
        .filter(|r| r.handles(method))
        .filter_map(|r| r.pattern.captures(path).map(|caps| (r, caps)))
        .min_by_key(|(r, _)| r.pattern.names.len())
}
