//! Quire Core: shared errors, configuration, and utilities.
//!
//! This crate provides the foundational types used across all Quire crates.
//! It has no internal Quire dependencies.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`config`]: Configuration loaded from `quire.toml`
//! - [`util`]: File discovery, id, and path utilities

pub mod config;
pub mod error;
pub mod util;

// Re-export key types at crate root for convenience
pub use config::{QuireConfig, RepoRef};
pub use error::{Error, FileError, Result};

// Convenience re-exports from util
pub use util::files::{find_all_files, write_atomic, FindOptions};
pub use util::ids::{heading_for_section_key, section_key, slugify};
pub use util::resolver::RootResolver;
