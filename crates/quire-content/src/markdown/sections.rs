//! `##` section helpers.
//!
//! A section is the span of a document body under a level-2 heading, ending
//! at the next line that starts with `## ` or at end of input. Deeper
//! headings belong to the section they appear in.
//!
//! # Example
//!
//! ```rust
//! use quire_content::markdown::sections::{extract_section, section_keys};
//!
//! let body = "## Conventions\ntext A\n### Detail\nmore\n## Code Style\ntext B";
//!
//! assert_eq!(extract_section(body, "conventions").as_deref(), Some("text A\n### Detail\nmore"));
//! assert_eq!(extract_section(body, "code-style").as_deref(), Some("text B"));
//! assert_eq!(section_keys(body), vec!["conventions", "code-style"]);
//! ```

use std::sync::LazyLock;

use quire_core::util::ids::{heading_for_section_key, section_key};
use regex::Regex;

/// Prefix of a line that opens a top-level section.
pub const SECTION_PREFIX: &str = "## ";

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#{2,6})\s+(.+?)\s*$").expect("Invalid section heading regex")
});

/// The exact heading line that introduces `section`.
///
/// `code-style` becomes `## Code Style`.
pub fn heading_line_for(section: &str) -> String {
    format!("{SECTION_PREFIX}{}", heading_for_section_key(section))
}

/// Return the text under the heading for `section`, trimmed.
///
/// The heading is matched by comparing each trimmed body line with
/// [`heading_line_for`]. Returns `None` when no line matches.
pub fn extract_section(body: &str, section: &str) -> Option<String> {
    extract_section_by_heading(body, &heading_line_for(section))
}

/// Like [`extract_section`], with the complete heading line given directly.
pub fn extract_section_by_heading(body: &str, heading_line: &str) -> Option<String> {
    let wanted = heading_line.trim();
    let mut lines = body.lines();

    lines.by_ref().find(|line| line.trim() == wanted)?;

    let span: Vec<&str> = lines
        .take_while(|line| !line.starts_with(SECTION_PREFIX))
        .collect();
    Some(span.join("\n").trim().to_string())
}

/// Keys of every level-2 heading, in order.
pub fn section_keys(body: &str) -> Vec<String> {
    heading_keys(body, |depth| depth == 2)
}

/// Keys of every heading at level 2 or deeper, in order.
pub fn all_section_keys(body: &str) -> Vec<String> {
    heading_keys(body, |depth| depth >= 2)
}

fn heading_keys(body: &str, accept: impl Fn(usize) -> bool) -> Vec<String> {
    body.lines()
        .filter_map(|line| {
            let caps = HEADING_RE.captures(line)?;
            let depth = caps.get(1)?.as_str().len();
            if !accept(depth) {
                return None;
            }
            let key = section_key(caps.get(2)?.as_str());
            (!key.is_empty()).then_some(key)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // extract_section tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_extract_two_sections() {
        let body = "## Conventions\ntext A\n## Other\ntext B";
        assert_eq!(extract_section(body, "conventions").as_deref(), Some("text A"));
        assert_eq!(extract_section(body, "other").as_deref(), Some("text B"));
    }

    #[test]
    fn test_deeper_headings_stay_in_section() {
        let body = "## Testing\nintro\n### Unit\nunit text\n#### Mocks\nm\n## Next\nx";
        assert_eq!(
            extract_section(body, "testing").as_deref(),
            Some("intro\n### Unit\nunit text\n#### Mocks\nm")
        );
    }

    #[test]
    fn test_heading_matched_after_trim() {
        let body = "  ## Code Style  \n\n  indented text\n\n";
        assert_eq!(extract_section(body, "code-style").as_deref(), Some("indented text"));
    }

    #[test]
    fn test_heading_match_is_exact() {
        let body = "## Conventions and more\ntext";
        assert!(extract_section(body, "conventions").is_none());

        let body = "### Conventions\ntext";
        assert!(extract_section(body, "conventions").is_none());

        let body = "## Code-Style\nhyphenated\n## Code Style\nspaced";
        assert_eq!(extract_section(body, "code-style").as_deref(), Some("spaced"));
    }

    #[test]
    fn test_section_ends_only_at_level_two() {
        let body = "## A\none\n# Top\ntwo\n## B\nthree";
        assert_eq!(extract_section(body, "a").as_deref(), Some("one\n# Top\ntwo"));
    }

    #[test]
    fn test_empty_section() {
        let body = "## Empty\n## Full\nx";
        assert_eq!(extract_section(body, "empty").as_deref(), Some(""));
    }

    #[test]
    fn test_missing_section() {
        assert!(extract_section("## A\ntext", "b").is_none());
        assert!(extract_section("", "a").is_none());
    }

    #[test]
    fn test_first_occurrence_wins() {
        let body = "## Notes\nfirst\n## Notes\nsecond";
        assert_eq!(extract_section(body, "notes").as_deref(), Some("first"));
    }

    #[test]
    fn test_crlf_body() {
        let body = "## Setup\r\nrun it\r\n## Next\r\nx";
        assert_eq!(extract_section(body, "setup").as_deref(), Some("run it"));
    }

    #[test]
    fn test_heading_line_for() {
        assert_eq!(heading_line_for("conventions"), "## Conventions");
        assert_eq!(heading_line_for("error-handling"), "## Error Handling");
    }

    #[test]
    fn test_extract_by_literal_heading() {
        let body = "## API: v2\nnotes";
        assert_eq!(
            extract_section_by_heading(body, "## API: v2").as_deref(),
            Some("notes")
        );
    }

    // ------------------------------------------------------------------------
    // section key tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_section_keys_level_two_only() {
        let body = "# Title\n## Getting Started\n### Install\n## API & Usage\n";
        assert_eq!(section_keys(body), vec!["getting-started", "api-usage"]);
    }

    #[test]
    fn test_all_section_keys_includes_deeper() {
        let body = "# Title\n## Getting Started\n### Install\n####### too deep\n";
        assert_eq!(all_section_keys(body), vec!["getting-started", "install"]);
    }

    #[test]
    fn test_section_keys_ignore_symbol_only_headings() {
        assert!(section_keys("## ???\n##NoSpace\n").is_empty());
    }
}
