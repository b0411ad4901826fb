#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Helper functions for deriving operation ids from HTTP methods and path masks.

use std::collections::HashSet;

/// Converts a mixed-case string (CamelCase or camelCase) to snake_case.
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let mut prev_lower = false;
    for c in s.chars() {
        if c.is_uppercase() {
            if prev_lower {
                result.push('_');
            }
            for lc in c.to_lowercase() {
                result.push(lc);
            }
            prev_lower = false;
        } else if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_lower = true;
        } else {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            prev_lower = false;
        }
    }
    result.trim_matches('_').to_string()
}

/// Derives an operation id from the HTTP Method and path mask when none is declared.
///
/// e.g. `GET /users/{id}` -> `get_users_id`
pub fn derive_operation_id(method: &str, mask: &str) -> String {
    let clean_path = to_snake_case(mask);
    if clean_path.is_empty() {
        method.to_lowercase()
    } else {
        format!("{}_{}", method.to_lowercase(), clean_path)
    }
}

/// Returns `base`, or `base_2`, `base_3`, ... if already taken, and records it.
pub fn unique_operation_id(base: &str, used: &mut HashSet<String>) -> String {
    if used.insert(base.to_string()) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", base, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
