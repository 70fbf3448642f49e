//! Frontmatter normalization and insertion.
//!
//! [`normalize_tree`] rewrites every document under the docs root so that its
//! header block carries the canonical keys (`id`, `title`, `topics`, `scope`,
//! `version`, `sections`) in canonical shapes. [`ensure_tree`] prepends a
//! generated header to documents that have none.
//!
//! Both are batch operations: a file that cannot be read or written is
//! recorded in the report and the batch continues.

use std::path::{Path, PathBuf};

use quire_core::util::ids::{file_stem, id_from_relative_path};
use quire_core::{find_all_files, write_atomic, FileError, FindOptions, Result};

use crate::markdown::frontmatter::{extract_frontmatter, render_frontmatter, DELIMITER};
use crate::markdown::parser::extract_title;
use crate::markdown::sections::{all_section_keys, section_keys};
use crate::markdown::value::{FieldValue, Frontmatter};

/// Keys written first, in this order, by the normalizer.
pub const CANONICAL_KEYS: &[&str] = &["id", "title", "topics", "scope", "version", "sections"];

/// Alternate spellings folded into a canonical key.
const ALIASES: &[(&str, &str)] = &[("topic", "topics"), ("scopes", "scope")];

/// Version recorded when a document declares none.
pub const DEFAULT_VERSION: &str = "any";

/// Directories skipped by [`ensure_tree`] in addition to the walker defaults.
pub const ENSURE_EXCLUDED_DIRS: &[&str] = &[".github", "scripts"];

/// Outcome of a batch rewrite.
#[derive(Debug, Clone, Default)]
pub struct RewriteReport {
    /// Markdown files examined.
    pub scanned: usize,
    /// Files that were rewritten.
    pub updated: Vec<PathBuf>,
    /// Files that could not be processed.
    pub errors: Vec<FileError>,
}

// ============================================================================
// Single-document operations
// ============================================================================

/// Canonical frontmatter for a document.
///
/// `existing` is the parsed header (if any), `stem` the file stem used as a
/// fallback id, and `body` the content after the header.
pub fn canonical_frontmatter(existing: Option<&Frontmatter>, stem: &str, body: &str) -> Frontmatter {
    let empty = Frontmatter::new();
    let fm = existing.unwrap_or(&empty);

    let id = text_field(fm, "id").unwrap_or_else(|| stem.to_string());
    let title = text_field(fm, "title")
        .or_else(|| extract_title(body))
        .unwrap_or_else(|| id.clone());
    let topics = fm
        .get("topics")
        .or_else(|| fm.get("topic"))
        .map(FieldValue::to_list)
        .unwrap_or_default();
    let scope = fm
        .get("scope")
        .or_else(|| fm.get("scopes"))
        .map(FieldValue::to_list)
        .unwrap_or_default();
    let version = text_field(fm, "version").unwrap_or_else(|| DEFAULT_VERSION.to_string());
    let sections = fm
        .get("sections")
        .map(FieldValue::to_list)
        .unwrap_or_else(|| section_keys(body));

    let mut out = Frontmatter::new();
    out.insert("id", id);
    out.insert("title", title);
    out.insert("topics", topics);
    out.insert("scope", scope);
    out.insert("version", version);
    out.insert("sections", sections);

    for (key, value) in fm.iter() {
        let is_alias = ALIASES.iter().any(|(alias, _)| *alias == key);
        if !CANONICAL_KEYS.contains(&key) && !is_alias {
            out.insert(key, value.clone());
        }
    }
    out
}

fn text_field(fm: &Frontmatter, key: &str) -> Option<String> {
    fm.get(key)
        .map(FieldValue::to_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Normalize one document.
///
/// Returns the rewritten content, or `None` when the parsed frontmatter is
/// already canonical.
pub fn normalize_document(content: &str, stem: &str) -> Option<String> {
    let parsed = extract_frontmatter(content);
    let canonical = canonical_frontmatter(parsed.frontmatter(), stem, parsed.body());
    if parsed.frontmatter() == Some(&canonical) {
        return None;
    }
    Some(format!(
        "{}\n{}\n",
        render_frontmatter(&canonical),
        parsed.body().trim()
    ))
}

/// Generated header for a document without one.
///
/// Returns `None` when the content already starts with a delimiter.
/// `relative` is the document's path relative to the walk root.
pub fn ensure_frontmatter(content: &str, relative: &Path) -> Option<String> {
    if content.starts_with(DELIMITER) {
        return None;
    }

    let id = id_from_relative_path(relative);
    let title = extract_title(content)
        .or_else(|| file_stem(relative))
        .unwrap_or_else(|| id.clone());

    let mut fm = Frontmatter::new();
    fm.insert("id", id);
    fm.insert("title", title);
    fm.insert("topics", FieldValue::List(Vec::new()));
    fm.insert("scope", FieldValue::List(Vec::new()));
    fm.insert("version", DEFAULT_VERSION);
    fm.insert("sections", all_section_keys(content));

    Some(format!("{}\n{}", render_frontmatter(&fm), content))
}

// ============================================================================
// Batch operations
// ============================================================================

/// Normalize every markdown file under `docs_root`.
///
/// # Errors
///
/// Fails only if `docs_root` cannot be walked.
pub async fn normalize_tree(docs_root: &Path) -> Result<RewriteReport> {
    let mut files = find_all_files(docs_root, &FindOptions::markdown()).await?;
    files.sort();

    let mut report = RewriteReport {
        scanned: files.len(),
        ..Default::default()
    };
    for path in files {
        let stem = file_stem(&path).unwrap_or_default();
        rewrite_file(&path, &mut report, |content| normalize_document(content, &stem)).await;
    }

    log::debug!(
        "Normalized {} of {} files under {:?}",
        report.updated.len(),
        report.scanned,
        docs_root
    );
    Ok(report)
}

/// Prepend a generated header to every markdown file under `root` that
/// lacks one.
///
/// Skips `.git`, `node_modules`, `.github`, `scripts`, and `README.md`.
pub async fn ensure_tree(root: &Path) -> Result<RewriteReport> {
    let mut options = FindOptions::markdown().skip_file("README.md");
    for dir in ENSURE_EXCLUDED_DIRS {
        options = options.exclude_dir(*dir);
    }

    let mut files = find_all_files(root, &options).await?;
    files.sort();

    let mut report = RewriteReport {
        scanned: files.len(),
        ..Default::default()
    };
    for path in files {
        let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        rewrite_file(&path, &mut report, |content| ensure_frontmatter(content, &relative)).await;
    }

    log::debug!("Added frontmatter to {} files", report.updated.len());
    Ok(report)
}

async fn rewrite_file(
    path: &Path,
    report: &mut RewriteReport,
    transform: impl FnOnce(&str) -> Option<String>,
) {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Failed to read {:?}: {e}", path);
            report.errors.push(FileError::new(path, e));
            return;
        }
    };

    let Some(updated) = transform(&content) else {
        return;
    };

    match write_atomic(path, &updated) {
        Ok(()) => {
            log::debug!("Rewrote {:?}", path);
            report.updated.push(path.to_path_buf());
        }
        Err(e) => {
            log::warn!("Failed to write {:?}: {e}", path);
            report.errors.push(FileError::new(path, e));
        }
    }
}
