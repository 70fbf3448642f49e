//! Utility modules for file discovery, ids, and project root resolution.
//!
//! # Modules
//!
//! - [`files`]: Async file discovery and atomic writes
//! - [`ids`]: Slug, id, and section-key helpers
//! - [`resolver`]: Project root resolution

pub mod files;
pub mod ids;
pub mod resolver;
