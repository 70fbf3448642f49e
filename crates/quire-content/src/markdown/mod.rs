//! Markdown parsing and frontmatter extraction utilities.
//!
//! - [`frontmatter`]: header block extraction and rendering
//! - [`value`]: the frontmatter value model
//! - [`sections`]: `##` section extraction and heading keys
//! - [`parser`]: `pulldown-cmark` based title extraction

pub mod frontmatter;
pub mod parser;
pub mod sections;
pub mod value;

// Re-export key types and functions
pub use frontmatter::{
    extract_frontmatter, parse_value, render_frontmatter, strip_frontmatter, FrontmatterResult,
};
pub use parser::extract_title;
pub use sections::{all_section_keys, extract_section, heading_line_for, section_keys};
pub use value::{split_list_text, strip_quotes, FieldValue, Frontmatter};
