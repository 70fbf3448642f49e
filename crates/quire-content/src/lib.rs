//! Markdown content handling for Quire.
//!
//! Documents are markdown files with an optional header block. This crate
//! reads that block into a [`Frontmatter`] mapping, slices `##` sections out
//! of the body, and rewrites headers into canonical form.
//!
//! # Modules
//!
//! - [`markdown`]: frontmatter parsing, rendering, and section helpers
//! - [`normalize`]: canonical frontmatter, `normalize` and `ensure-frontmatter`
//!
//! # Example
//!
//! ```rust
//! use quire_content::{extract_frontmatter, extract_section};
//!
//! let content = "---\nid: react\ntitle: React\n---\n## Conventions\nUse hooks.\n## Other\n";
//! let doc = extract_frontmatter(content);
//!
//! assert_eq!(doc.get_text("id"), Some("react"));
//! assert_eq!(extract_section(doc.body(), "conventions").as_deref(), Some("Use hooks."));
//! ```

pub mod markdown;
pub mod normalize;

// Re-export commonly used types
pub use markdown::{
    extract_frontmatter, extract_section, extract_title, render_frontmatter, section_keys,
    FieldValue, Frontmatter, FrontmatterResult,
};
pub use normalize::{ensure_tree, normalize_tree, RewriteReport};
