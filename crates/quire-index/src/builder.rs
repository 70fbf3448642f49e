//! Index building.
//!
//! [`IndexBuilder`] walks the docs root, parses each document's header
//! block, and produces a [`DocsIndex`] ordered by relative path. Documents
//! without a header, or without a non-empty `id` and `title`, are skipped.
//!
//! # Usage
//!
//! ```rust,no_run
//! # async fn run() -> quire_core::Result<()> {
//! use std::path::Path;
//! use quire_index::IndexBuilder;
//!
//! let root = Path::new("/repo");
//! let (index, stats) = IndexBuilder::new(root.join("docs"))
//!     .with_base(root)
//!     .build()
//!     .await?;
//! index.save(&root.join("docs/docs-index.json"))?;
//! println!("Indexed {} documents", stats.documents_indexed);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use quire_content::{extract_frontmatter, FieldValue, Frontmatter};
use quire_core::util::ids::to_slash;
use quire_core::{find_all_files, FileError, FindOptions, Result};

use crate::entry::{DocsIndex, IndexEntry, FILE_KEY};

/// Statistics about an index build.
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    /// Markdown files found by the walk.
    pub files_scanned: usize,
    /// Entries written to the index.
    pub documents_indexed: usize,
    /// Files skipped for lacking a header, `id`, or `title`.
    pub files_skipped: usize,
    /// Files that could not be read.
    pub errors: Vec<FileError>,
}

/// Builds the document index for a docs root.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    docs_root: PathBuf,
    base: Option<PathBuf>,
    options: FindOptions,
}

impl IndexBuilder {
    /// Builder for the given docs root.
    pub fn new(docs_root: impl Into<PathBuf>) -> Self {
        Self {
            docs_root: docs_root.into(),
            base: None,
            options: FindOptions::markdown(),
        }
    }

    /// Directory that entry paths are made relative to.
    ///
    /// Defaults to the docs root itself.
    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Override the walker options.
    pub fn with_find_options(mut self, options: FindOptions) -> Self {
        self.options = options;
        self
    }

    /// The docs root being indexed.
    pub fn docs_root(&self) -> &Path {
        &self.docs_root
    }

    /// Build the index.
    ///
    /// # Errors
    ///
    /// Fails if the docs root does not exist or is not a directory. Files
    /// that cannot be read are recorded in [`IndexStats::errors`] and the
    /// build continues.
    pub async fn build(&self) -> Result<(DocsIndex, IndexStats)> {
        log::info!("Building index from {:?}", self.docs_root);

        let base = self.base.as_deref().unwrap_or(&self.docs_root);
        let mut files: Vec<(String, PathBuf)> = find_all_files(&self.docs_root, &self.options)
            .await?
            .into_iter()
            .map(|abs| {
                let rel = abs.strip_prefix(base).map(to_slash).unwrap_or_else(|_| to_slash(&abs));
                (rel, abs)
            })
            .collect();
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut stats = IndexStats {
            files_scanned: files.len(),
            ..Default::default()
        };
        let mut index = DocsIndex::default();

        for (rel, abs) in files {
            let content = match tokio::fs::read_to_string(&abs).await {
                Ok(c) => c,
                Err(e) => {
                    log::warn!("Failed to read {:?}: {}", abs, e);
                    stats.errors.push(FileError::new(&abs, e));
                    continue;
                }
            };

            match index_entry(&rel, &content) {
                Some(entry) => {
                    index.entries.push(entry);
                    stats.documents_indexed += 1;
                }
                None => {
                    log::debug!("Skipped {rel} (no id/title frontmatter)");
                    stats.files_skipped += 1;
                }
            }
        }

        log::info!(
            "Indexed {} documents ({} skipped, {} errors)",
            stats.documents_indexed,
            stats.files_skipped,
            stats.errors.len()
        );
        Ok((index, stats))
    }

    /// Build the index and write it to `index_path`.
    pub async fn build_and_save(&self, index_path: &Path) -> Result<IndexStats> {
        let (index, stats) = self.build().await?;
        index.save(index_path)?;
        log::debug!("Wrote {:?}", index_path);
        Ok(stats)
    }
}

/// Index entry for one document, or `None` if it does not qualify.
pub fn index_entry(relative: &str, content: &str) -> Option<IndexEntry> {
    let frontmatter = extract_frontmatter(content).into_frontmatter()?;
    let has = |key: &str| frontmatter.get(key).is_some_and(|v| !v.is_empty());
    if !has("id") || !has("title") {
        return None;
    }
    Some(IndexEntry::new(relative, normalize_entry_fields(frontmatter)))
}

/// Shape frontmatter for the index.
///
/// `sections`, `topics`, and `scope` become lists (`sections` defaults to
/// empty), `version` becomes text, and a `file` key is dropped so the
/// entry's own path is authoritative.
pub fn normalize_entry_fields(frontmatter: Frontmatter) -> Frontmatter {
    let mut out = Frontmatter::new();
    for (key, value) in frontmatter.iter() {
        let value = match key {
            FILE_KEY => continue,
            "sections" | "topics" | "scope" => FieldValue::List(value.to_list()),
            "version" => FieldValue::Text(value.to_text()),
            _ => value.clone(),
        };
        out.insert(key, value);
    }
    if !out.contains_key("sections") {
        out.insert("sections", FieldValue::List(Vec::new()));
    }
    out
}
