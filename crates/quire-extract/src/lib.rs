//! Section extraction for Quire.
//!
//! Resolves a document by id or filename, filters candidates by scope and
//! version, and returns the text under one `##` heading. Documents missing
//! locally can be fetched from a remote repository first.
//!
//! # Modules
//!
//! - [`version`]: version and range matching with a lenient fallback
//! - [`scope`]: scope list membership
//! - [`extractor`]: document resolution and section extraction

pub mod extractor;
pub mod scope;
pub mod version;

pub use extractor::{
    remote_candidates, suggest, ExtractRequest, Extracted, RemoteFallback, ResolvedDocument,
    SectionExtractor,
};
pub use scope::{matches_scope, scope_field_matches};
pub use version::{match_version, satisfies_version, MatchOutcome, VersionRange};
