//! Frontmatter extraction from markdown files.
//!
//! Frontmatter is metadata at the start of a markdown file, delimited by
//! lines consisting solely of `---`:
//!
//! ```markdown
//! ---
//! id: react-conventions
//! title: "React: Conventions"
//! topics: [react, hooks]
//! version: 18.x
//! ---
//!
//! ## Conventions
//! ```
//!
//! Only a restricted subset of YAML is understood: one `key: value` pair per
//! line, where the value is a plain scalar, a quoted scalar, or a
//! single-level `[...]` list. Anything else degrades silently: lines without
//! a colon are ignored, and a missing closing delimiter means the whole
//! input is body.
//!
//! # Usage
//!
//! ```rust
//! use quire_content::markdown::extract_frontmatter;
//!
//! let content = "---\nid: test\ntopics: [a, b]\n---\n\nBody";
//! let result = extract_frontmatter(content);
//!
//! assert!(result.has_frontmatter());
//! assert_eq!(result.get_text("id"), Some("test"));
//! assert_eq!(result.get_list("topics"), Some(vec!["a".to_string(), "b".to_string()]));
//! assert_eq!(result.body().trim(), "Body");
//! ```

use super::value::{FieldValue, Frontmatter, strip_quotes};

/// Opening and closing delimiter line.
pub const DELIMITER: &str = "---";

/// Result of frontmatter extraction.
///
/// Contains the parsed frontmatter (if a header block was present) and the
/// body content after it.
#[derive(Debug, Clone)]
pub struct FrontmatterResult<'a> {
    /// Parsed frontmatter, if a complete header block was found.
    frontmatter: Option<Frontmatter>,
    /// Body content after the closing delimiter line.
    body: &'a str,
}

impl<'a> FrontmatterResult<'a> {
    fn with_frontmatter(frontmatter: Frontmatter, body: &'a str) -> Self {
        Self {
            frontmatter: Some(frontmatter),
            body,
        }
    }

    fn without_frontmatter(body: &'a str) -> Self {
        Self {
            frontmatter: None,
            body,
        }
    }

    /// Check if a header block was found.
    pub fn has_frontmatter(&self) -> bool {
        self.frontmatter.is_some()
    }

    /// The parsed frontmatter, if present.
    pub fn frontmatter(&self) -> Option<&Frontmatter> {
        self.frontmatter.as_ref()
    }

    /// Take ownership of the frontmatter, if present.
    pub fn into_frontmatter(self) -> Option<Frontmatter> {
        self.frontmatter
    }

    /// Split into owned frontmatter and the borrowed body.
    pub fn into_parts(self) -> (Option<Frontmatter>, &'a str) {
        (self.frontmatter, self.body)
    }

    /// Get the body content (everything after the header block).
    pub fn body(&self) -> &'a str {
        self.body
    }

    /// Get a raw value.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.frontmatter.as_ref()?.get(key)
    }

    /// Get a scalar field.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.frontmatter.as_ref()?.get_text(key)
    }

    /// Get a field coerced to a list.
    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        self.frontmatter.as_ref()?.get_list(key)
    }
}

/// Extract frontmatter from markdown content.
///
/// # Behavior
///
/// - No opening delimiter line: no frontmatter, body is the whole input
/// - Opening delimiter but no closing one: same as above
/// - Both delimiters: each line between them is parsed with
///   [`parse_frontmatter_line`]; the body starts after the closing line
///
/// Extraction never fails.
pub fn extract_frontmatter(content: &str) -> FrontmatterResult<'_> {
    let mut lines = content.split_inclusive('\n');

    let first = match lines.next() {
        Some(line) if line.trim_end() == DELIMITER => line,
        _ => return FrontmatterResult::without_frontmatter(content),
    };

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if line.trim_end() == DELIMITER {
            let block = &content[block_start..offset];
            let body = &content[offset + line.len()..];
            return FrontmatterResult::with_frontmatter(parse_block(block), body);
        }
        offset += line.len();
    }

    log::debug!("Frontmatter opening delimiter found but no closing delimiter");
    FrontmatterResult::without_frontmatter(content)
}

/// Strip frontmatter from content, returning only the body.
pub fn strip_frontmatter(content: &str) -> &str {
    extract_frontmatter(content).body()
}

fn parse_block(block: &str) -> Frontmatter {
    let mut frontmatter = Frontmatter::new();
    for line in block.lines() {
        if let Some((key, value)) = parse_frontmatter_line(line) {
            frontmatter.insert(key, value);
        }
    }
    frontmatter
}

/// Parse one `key: value` line.
///
/// Returns `None` for lines without a colon or with an empty key.
pub fn parse_frontmatter_line(line: &str) -> Option<(String, FieldValue)> {
    let (key, raw) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), parse_value(raw.trim())))
}

/// Interpret a raw (already trimmed) value.
///
/// One layer of matching quotes is removed first. A value wrapped in
/// brackets then becomes a list: it is read as a JSON array after swapping
/// single quotes for double quotes, falling back to a comma split with
/// per-item quote stripping.
pub fn parse_value(raw: &str) -> FieldValue {
    let value = strip_quotes(raw);
    if value.len() >= 2 && value.starts_with('[') && value.ends_with(']') {
        return FieldValue::List(parse_list(value));
    }
    FieldValue::Text(value.to_string())
}

fn parse_list(bracketed: &str) -> Vec<String> {
    let as_json = bracketed.replace('\'', "\"");
    match serde_json::from_str::<Vec<serde_json::Value>>(&as_json) {
        Ok(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Err(_) => {
            let inner = &bracketed[1..bracketed.len() - 1];
            inner
                .split(',')
                .map(|item| strip_quotes(item.trim()).to_string())
                .filter(|item| !item.is_empty())
                .collect()
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Render frontmatter as a header block, closing delimiter included, ending
/// with a newline.
///
/// The output parses back to an equal [`Frontmatter`] for keys without
/// colons and for values that do not themselves look like bracketed lists.
pub fn render_frontmatter(frontmatter: &Frontmatter) -> String {
    let mut out = String::from(DELIMITER);
    out.push('\n');
    for (key, value) in frontmatter.iter() {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(&render_value(value));
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');
    out
}

fn render_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) => render_scalar(s),
        FieldValue::List(items) => {
            let rendered: Vec<String> = items
                .iter()
                .map(|item| format!("\"{}\"", single_line(item)))
                .collect();
            format!("[{}]", rendered.join(", "))
        }
    }
}

fn render_scalar(s: &str) -> String {
    let s = single_line(s);
    let needs_quotes = s.is_empty()
        || s.trim() != s
        || s.contains([':', '#', '[', ']', '{', '}', '"', '\'']);
    if needs_quotes {
        format!("\"{s}\"")
    } else {
        s
    }
}

fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}
