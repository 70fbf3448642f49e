//! Header maintenance through indexing and enrichment.

use quire_cli::commands::{
    cmd_enrich, cmd_ensure_frontmatter, cmd_index, cmd_normalize, cmd_tooling_links,
};
use quire_content::extract_frontmatter;
use quire_index::DocsIndex;

use crate::common::{doc, TestRepo};

fn load_index(repo: &TestRepo) -> DocsIndex {
    DocsIndex::load(&repo.path("docs/docs-index.json")).expect("index")
}

#[tokio::test]
async fn test_index_includes_only_complete_headers() {
    let repo = TestRepo::new();
    repo.write("docs/b.md", &doc("b", "B", "topics: [react]\n", "## One\n"))
        .write("docs/a/nested.md", &doc("nested", "Nested", "", "body"))
        .write("docs/no-title.md", "---\nid: orphan\n---\nbody\n")
        .write("docs/plain.md", "# Plain\n");

    cmd_index(&repo.settings(), None).await.unwrap();

    let index = load_index(&repo);
    let files: Vec<&str> = index.iter().map(|e| e.file.as_str()).collect();
    assert_eq!(files, vec!["docs/a/nested.md", "docs/b.md"]);
    assert_eq!(index.entries[1].topics(), vec!["react"]);
    assert!(repo.read("docs/docs-index.json").ends_with("]\n"));
}

#[tokio::test]
async fn test_index_missing_docs_dir_fails() {
    let repo = TestRepo::new();
    std::fs::remove_dir(repo.path("docs")).unwrap();

    let err = cmd_index(&repo.settings(), None).await.unwrap_err();
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_ensure_then_normalize_then_index() {
    let repo = TestRepo::new();
    repo.write("README.md", "# Readme\n")
        .write("docs/Web Guide.md", "# Web Guide\n\n## Setup\nsteps\n### Deep\nmore\n")
        .write(
            "docs/react.md",
            "---\nid: react\ntitle: React\ntopic: nextjs, tailwindcss\nscopes: web\n---\n\n## Hooks\nuse them\n",
        );

    let settings = repo.settings();
    cmd_ensure_frontmatter(&settings).await.unwrap();
    assert_eq!(repo.read("README.md"), "# Readme\n");

    let guide = repo.read("docs/Web Guide.md");
    let parsed = extract_frontmatter(&guide);
    let fm = parsed.frontmatter().expect("header added");
    assert_eq!(fm.get_text("id"), Some("docs-web-guide"));
    assert_eq!(fm.get_text("title"), Some("Web Guide"));
    assert_eq!(fm.get_list("sections").unwrap(), vec!["setup", "deep"]);

    cmd_normalize(&settings).await.unwrap();
    let react = repo.read("docs/react.md");
    let fm = extract_frontmatter(&react).into_frontmatter().unwrap();
    assert_eq!(fm.get_list("topics").unwrap(), vec!["nextjs", "tailwindcss"]);
    assert_eq!(fm.get_list("scope").unwrap(), vec!["web"]);
    assert_eq!(fm.get_text("version"), Some("any"));
    assert_eq!(fm.get_list("sections").unwrap(), vec!["hooks"]);
    assert!(!fm.contains_key("topic"));

    // A second pass changes nothing.
    cmd_normalize(&settings).await.unwrap();
    assert_eq!(repo.read("docs/react.md"), react);

    cmd_index(&settings, None).await.unwrap();
    assert_eq!(load_index(&repo).len(), 2);
}

#[tokio::test]
async fn test_tooling_links_and_enrich() {
    let repo = TestRepo::new();
    repo.write(
        "docs/react.md",
        &doc("react", "React", "topics: [NextJS, zod]\nscope: [tailwindcss4]\n", "# React\n"),
    )
    .write(
        "docs/done.md",
        &doc("done", "Done", "", "Validated with the upstream guide.\n"),
    );

    let settings = repo.settings();
    cmd_index(&settings, None).await.unwrap();
    cmd_tooling_links(&settings).unwrap();

    let index = load_index(&repo);
    let react = index.iter().find(|e| e.id() == "react").unwrap();
    let links = react.tooling_links.as_ref().unwrap();
    assert_eq!(links.get("next").map(String::as_str), Some("https://nextjs.org/docs"));
    assert_eq!(links.get("tailwind").map(String::as_str), Some("https://tailwindcss.com/docs"));
    assert_eq!(links.len(), 2);

    cmd_enrich(&settings).await.unwrap();
    let enriched = repo.read("docs/react.md");
    assert!(enriched.contains("## References / Validation"));
    assert!(enriched.contains("- [React docs](https://react.dev)"));
    assert!(enriched.contains("- [Zod docs](https://zod.dev)"));
    assert!(!repo.read("docs/done.md").contains("## References"));

    // Already enriched documents are left alone.
    cmd_enrich(&settings).await.unwrap();
    assert_eq!(repo.read("docs/react.md"), enriched);
}

#[tokio::test]
async fn test_tooling_links_without_index_is_error() {
    let repo = TestRepo::new();
    assert!(cmd_tooling_links(&repo.settings()).is_err());
}
