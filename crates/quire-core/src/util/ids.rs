//! Identifier and slug utilities.
//!
//! Documents are addressed by kebab-case ids and their `##` sections by
//! kebab-case keys. These helpers convert between paths, headings, and keys.

use std::path::Path;

/// Lowercase a string and collapse every run of non-alphanumeric characters
/// into a single hyphen, trimming hyphens at both ends.
///
/// # Examples
///
/// ```
/// use quire_core::util::ids::slugify;
///
/// assert_eq!(slugify("Code Style / Naming"), "code-style-naming");
/// assert_eq!(slugify("guides/React Hooks.md"), "guides-react-hooks-md");
/// assert_eq!(slugify("--x--"), "x");
/// ```
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for c in input.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.extend(c.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    out
}

/// Canonical key of a section heading.
///
/// ```
/// use quire_core::util::ids::section_key;
///
/// assert_eq!(section_key("Testing & QA"), "testing-qa");
/// ```
pub fn section_key(heading: &str) -> String {
    slugify(heading.trim())
}

/// Render a hyphenated section key as the heading text that introduces it.
///
/// The first character and every character following a hyphen are
/// upper-cased; hyphens become spaces. Other characters are kept as written.
///
/// ```
/// use quire_core::util::ids::heading_for_section_key;
///
/// assert_eq!(heading_for_section_key("conventions"), "Conventions");
/// assert_eq!(heading_for_section_key("code-style"), "Code Style");
/// ```
pub fn heading_for_section_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = true;
    for c in key.chars() {
        if c == '-' {
            out.push(' ');
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Slug id for a document from its path relative to a root.
///
/// The `.md` extension is dropped before slugging.
///
/// ```
/// use std::path::Path;
/// use quire_core::util::ids::id_from_relative_path;
///
/// assert_eq!(id_from_relative_path(Path::new("guides/React Hooks.md")), "guides-react-hooks");
/// ```
pub fn id_from_relative_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    let trimmed = s.strip_suffix(".md").unwrap_or(&s);
    slugify(trimmed)
}

/// File stem of a path, unmodified.
pub fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().and_then(|s| s.to_str()).map(String::from)
}

/// Render a path with forward slashes regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // slugify tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_slugify_simple() {
        assert_eq!(slugify("Conventions"), "conventions");
    }

    #[test]
    fn test_slugify_collapses_runs() {
        assert_eq!(slugify("State   management!!  (React)"), "state-management-react");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_slugify_unicode_letters_kept() {
        assert_eq!(slugify("Größe Übersicht"), "größe-übersicht");
    }

    // -------------------------------------------------------------------------
    // heading rendering tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_heading_for_multi_word_key() {
        assert_eq!(heading_for_section_key("error-handling-rules"), "Error Handling Rules");
    }

    #[test]
    fn test_heading_keeps_inner_case() {
        assert_eq!(heading_for_section_key("api-URLs"), "Api URLs");
    }

    #[test]
    fn test_heading_round_trips_simple_key() {
        let key = "testing-strategy";
        assert_eq!(section_key(&heading_for_section_key(key)), key);
    }

    // -------------------------------------------------------------------------
    // path helpers
    // -------------------------------------------------------------------------

    #[test]
    fn test_id_from_relative_path_nested() {
        assert_eq!(
            id_from_relative_path(Path::new("docs/frontend/react.md")),
            "docs-frontend-react"
        );
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem(Path::new("/a/b/react.md")), Some("react".to_string()));
        assert_eq!(file_stem(Path::new("/")), None);
    }

    #[test]
    fn test_to_slash() {
        let p = Path::new("docs").join("a").join("b.md");
        assert_eq!(to_slash(&p), "docs/a/b.md");
    }
}
