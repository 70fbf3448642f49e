//! Reference section injection.
//!
//! Appends a `## References / Validation` section to indexed documents that
//! do not already cite their sources. Links are chosen from the entry's
//! topics and scope, then from keywords found in its id and title.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use quire_core::{FileError, Result};
use regex::Regex;

use crate::entry::{DocsIndex, IndexEntry};

/// A named reference link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// Link text.
    pub name: &'static str,
    /// Target URL.
    pub url: &'static str,
}

const fn reference(name: &'static str, url: &'static str) -> Reference {
    Reference { name, url }
}

/// Keyword to reference table, in lookup order for id/title matching.
pub const REFERENCE_TABLE: &[(&str, Reference)] = &[
    ("next", reference("Next.js docs", "https://nextjs.org/docs")),
    ("app-router", reference("Next.js App Router docs", "https://nextjs.org/docs/app")),
    ("react", reference("React docs", "https://react.dev")),
    ("vite", reference("Vite docs", "https://vitejs.dev/guide/")),
    ("tailwind", reference("Tailwind CSS docs", "https://tailwindcss.com/docs")),
    ("prisma", reference("Prisma docs", "https://www.prisma.io/docs")),
    ("supabase", reference("Supabase docs", "https://supabase.com/docs")),
    ("playwright", reference("Playwright docs", "https://playwright.dev/docs/intro")),
    ("routing", reference("React Router docs", "https://reactrouter.com")),
    ("routinglib", reference("React Router docs", "https://reactrouter.com")),
    ("styling", reference("Tailwind CSS docs", "https://tailwindcss.com/docs")),
    (
        "architecture",
        reference("Architecture guidelines", "https://nextjs.org/docs/architecture"),
    ),
    ("zod", reference("Zod docs", "https://zod.dev")),
    (
        "reactaria",
        reference("React Aria / React Spectrum", "https://react-spectrum.adobe.com/react-aria/"),
    ),
    ("react-router", reference("React Router docs", "https://reactrouter.com")),
];

/// Used when nothing else matches.
pub const DEFAULT_REFERENCE: Reference =
    reference("General web docs", "https://developer.mozilla.org/");

/// Heading of the injected section.
pub const REFERENCES_HEADING: &str = "## References / Validation";

static EXISTING_REFERENCES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^##+\s*references?|validated with").expect("Invalid references regex")
});

fn lookup(key: &str) -> Option<Reference> {
    REFERENCE_TABLE
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, r)| *r)
}

/// Choose references for an entry, deduplicated by URL.
pub fn choose_references(entry: &IndexEntry) -> Vec<Reference> {
    let mut refs: Vec<Reference> = Vec::new();
    let mut add = |r: Reference| {
        if !refs.iter().any(|existing| existing.url == r.url) {
            refs.push(r);
        }
    };

    for tag in entry.topics().into_iter().chain(entry.scope()) {
        if let Some(r) = lookup(&tag.to_lowercase()) {
            add(r);
        }
    }

    let text = format!("{} {}", entry.id(), entry.title()).to_lowercase();
    for (key, r) in REFERENCE_TABLE {
        if text.contains(key) {
            add(*r);
        }
    }

    if refs.is_empty() {
        refs.push(DEFAULT_REFERENCE);
    }
    refs
}

/// Whether a document already carries a references section or a
/// validation note.
pub fn has_references(content: &str) -> bool {
    EXISTING_REFERENCES_RE.is_match(content)
}

/// Render the references section, starting with a blank line.
pub fn render_references(refs: &[Reference]) -> String {
    let mut out = format!(
        "\n{REFERENCES_HEADING}\n\nThe content in this document has been reviewed against authoritative sources:\n"
    );
    for r in refs {
        out.push_str(&format!("- [{}]({})\n", r.name, r.url));
    }
    out.push_str(
        "\n_If you disagree with any recommendation, open an issue or PR with a clear rationale and references._\n",
    );
    out
}

/// Outcome of an enrichment pass.
#[derive(Debug, Clone, Default)]
pub struct EnrichReport {
    /// Index `file` values of the documents that were enriched.
    pub enriched: Vec<String>,
    /// Entries whose file does not exist.
    pub missing: Vec<PathBuf>,
    /// Files that could not be read or written.
    pub errors: Vec<FileError>,
}

/// Append references to every indexed document that lacks them.
///
/// Entry paths are resolved against `base` (the directory the index paths
/// are relative to).
pub async fn enrich_documents(index: &DocsIndex, base: &Path) -> Result<EnrichReport> {
    let mut report = EnrichReport::default();

    for entry in index.iter() {
        let path = base.join(&entry.file);
        if !path.is_file() {
            log::debug!("Skipping {:?}: file not found", path);
            report.missing.push(path);
            continue;
        }

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Failed to read {:?}: {e}", path);
                report.errors.push(FileError::new(&path, e));
                continue;
            }
        };
        if has_references(&content) {
            continue;
        }

        let mut updated = content;
        updated.push_str(&render_references(&choose_references(entry)));
        if let Err(e) = quire_core::write_atomic(&path, &updated) {
            log::warn!("Failed to write {:?}: {e}", path);
            report.errors.push(FileError::new(&path, e));
            continue;
        }
        report.enriched.push(entry.file.clone());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_content::{FieldValue, Frontmatter};
    use tempfile::TempDir;

    fn entry(file: &str, id: &str, title: &str, topics: &[&str]) -> IndexEntry {
        let fm: Frontmatter = [
            ("id", FieldValue::text(id)),
            ("title", FieldValue::text(title)),
            ("topics", FieldValue::list(topics.iter().copied())),
        ]
        .into_iter()
        .collect();
        IndexEntry::new(file, fm)
    }

    // ------------------------------------------------------------------------
    // choose_references tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_topics_then_keywords_deduplicated() {
        let e = entry("a.md", "react-routing", "React Routing", &["React", "routinglib"]);
        let names: Vec<&str> = choose_references(&e).iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["React docs", "React Router docs"]);
    }

    #[test]
    fn test_keyword_substring_match() {
        let e = entry("a.md", "prisma-setup", "Database", &[]);
        let refs = choose_references(&e);
        assert_eq!(refs, vec![lookup("prisma").unwrap()]);
    }

    #[test]
    fn test_default_reference() {
        let e = entry("a.md", "misc", "Miscellany", &["ops"]);
        assert_eq!(choose_references(&e), vec![DEFAULT_REFERENCE]);
    }

    // ------------------------------------------------------------------------
    // detection and rendering
    // ------------------------------------------------------------------------

    #[test]
    fn test_has_references() {
        assert!(has_references("# T\n\n## References\n- x"));
        assert!(has_references("# T\n\n### reference"));
        assert!(has_references("Validated with the Vite docs."));
        assert!(!has_references("# T\n\nSee references below."));
    }

    #[test]
    fn test_render_references() {
        let out = render_references(&[DEFAULT_REFERENCE]);
        assert_eq!(
            out,
            "\n## References / Validation\n\nThe content in this document has been reviewed against authoritative sources:\n- [General web docs](https://developer.mozilla.org/)\n\n_If you disagree with any recommendation, open an issue or PR with a clear rationale and references._\n"
        );
        assert!(has_references(&out));
    }

    // ------------------------------------------------------------------------
    // enrich_documents tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_enrich_appends_once() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/vite.md"), "# Vite\n").unwrap();
        std::fs::write(dir.path().join("docs/done.md"), "## References\n").unwrap();

        let index = DocsIndex {
            entries: vec![
                entry("docs/vite.md", "vite", "Vite", &["vite"]),
                entry("docs/done.md", "done", "Done", &[]),
                entry("docs/gone.md", "gone", "Gone", &[]),
            ],
        };

        let report = enrich_documents(&index, dir.path()).await.unwrap();
        assert_eq!(report.enriched, vec!["docs/vite.md"]);
        assert_eq!(report.missing, vec![dir.path().join("docs/gone.md")]);

        let content = std::fs::read_to_string(dir.path().join("docs/vite.md")).unwrap();
        assert!(content.starts_with("# Vite\n\n## References / Validation"));
        assert!(content.contains("- [Vite docs](https://vitejs.dev/guide/)"));

        let again = enrich_documents(&index, dir.path()).await.unwrap();
        assert!(again.enriched.is_empty());
    }
}
