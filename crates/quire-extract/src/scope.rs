//! Scope matching.
//!
//! A document's `scope` lists where it applies (`[web, mobile]`). A request
//! naming one scope matches when the list contains it, compared
//! case-insensitively. A document with no scope applies everywhere.

use quire_content::markdown::value::split_list_text;
use quire_content::FieldValue;

/// Whether `value` is allowed by a scope constraint written as text
/// (`[web, "mobile"]` or `web, mobile`).
///
/// ```rust
/// use quire_extract::scope::matches_scope;
///
/// assert!(matches_scope("Web", "[web, mobile]"));
/// assert!(!matches_scope("desktop", "web, mobile"));
/// assert!(matches_scope("anything", "[]"));
/// ```
pub fn matches_scope(value: &str, constraint: &str) -> bool {
    matches_scope_list(value, &split_list_text(constraint))
}

/// Like [`matches_scope`], for a parsed frontmatter value. An absent value
/// matches.
pub fn scope_field_matches(value: &str, scope: Option<&FieldValue>) -> bool {
    match scope {
        Some(field) => matches_scope_list(value, &field.to_list()),
        None => true,
    }
}

fn matches_scope_list(value: &str, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    let wanted = value.trim().to_lowercase();
    allowed.iter().any(|s| s.to_lowercase() == wanted)
}
