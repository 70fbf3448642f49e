//! Document index for Quire.
//!
//! The index (`docs-index.json`) is the catalog downstream tooling reads:
//! one entry per document with a header block carrying `id` and `title`,
//! ordered by path.
//!
//! # Modules
//!
//! - [`entry`]: index entries and the index file
//! - [`builder`]: walking the docs root into an index
//! - [`tooling`]: tool registry and `toolingLinks` resolution
//! - [`references`]: appending reference sections to documents

pub mod builder;
pub mod entry;
pub mod references;
pub mod tooling;

pub use builder::{index_entry, IndexBuilder, IndexStats};
pub use entry::{DocsIndex, IndexEntry};
pub use references::{enrich_documents, EnrichReport};
pub use tooling::{apply_tooling_links, canonicalize, collect_tooling_links, tool_url};
