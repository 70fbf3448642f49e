//! Markdown structure parsing with `pulldown-cmark`.
//!
//! Used where a real markdown reading matters: the title of a document is
//! its first level-1 heading with inline formatting stripped, which a line
//! scan would get wrong for `# **Bold** title` or headings inside code
//! fences.
//!
//! # Example
//!
//! ```rust
//! use quire_content::markdown::parser::extract_title;
//!
//! let content = "Intro\n\n## Setup\n\n# The *Real* Title\n";
//! assert_eq!(extract_title(content), Some("The Real Title".to_string()));
//! ```

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

/// First level-1 heading, used as a document title.
pub fn extract_title(content: &str) -> Option<String> {
    headings(content)
        .find(|(level, _)| *level == HeadingLevel::H1)
        .map(|(_, text)| text)
}

/// Every non-empty heading in document order, inline formatting stripped.
fn headings(content: &str) -> impl Iterator<Item = (HeadingLevel, String)> + '_ {
    let mut parser = Parser::new(content);
    std::iter::from_fn(move || {
        let mut current: Option<(HeadingLevel, String)> = None;
        for event in parser.by_ref() {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    current = Some((level, String::new()));
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some((level, text)) = current.take() {
                        let text = text.trim();
                        if !text.is_empty() {
                            return Some((level, text.to_string()));
                        }
                    }
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some((_, buf)) = current.as_mut() {
                        buf.push_str(&text);
                    }
                }
                Event::SoftBreak | Event::HardBreak => {
                    if let Some((_, buf)) = current.as_mut() {
                        buf.push(' ');
                    }
                }
                _ => {}
            }
        }
        None
    })
}
