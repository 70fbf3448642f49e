//! Link checks and batch caching against mock servers.

use quire_cli::cli::CacheMissingArgs;
use quire_cli::commands::{cmd_cache_missing, cmd_check_links, cmd_index, cmd_tooling_links};
use quire_cli::Error;
use quire_index::DocsIndex;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::TestRepo;

/// Index with tooling links pointing at `base`.
async fn index_with_links(repo: &TestRepo, base: &str) {
    repo.write(
        "docs/a.md",
        "---\nid: a\ntitle: A\ntopics: [vite]\n---\nbody\n",
    );
    let settings = repo.settings();
    cmd_index(&settings, None).await.unwrap();
    cmd_tooling_links(&settings).unwrap();

    let index_path = repo.path("docs/docs-index.json");
    let mut index = DocsIndex::load(&index_path).unwrap();
    let links = index.entries[0].tooling_links.as_mut().unwrap();
    links.insert("vite".into(), format!("{base}/vite"));
    links.insert("gone".into(), format!("{base}/gone"));
    index.save(&index_path).unwrap();
}

#[tokio::test]
async fn test_check_links_reports_failures() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/vite"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let repo = TestRepo::new();
    index_with_links(&repo, &server.uri()).await;

    let err = cmd_check_links(&repo.settings()).await.unwrap_err();
    match err {
        Error::LinksFailed { failed, checked } => {
            assert_eq!(failed, 1);
            assert_eq!(checked, 2);
        }
        other => panic!("expected LinksFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_check_links_all_reachable() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let repo = TestRepo::new();
    index_with_links(&repo, &server.uri()).await;
    cmd_check_links(&repo.settings()).await.unwrap();
}

#[tokio::test]
async fn test_cache_missing_fetches_each_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/acme/standards/main/guides/a.md"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# A\n"))
        .mount(&server)
        .await;

    let repo = TestRepo::new();
    let args = CacheMissingArgs {
        paths: vec!["guides/a.md".into(), "guides/missing.md".into()],
        ..Default::default()
    };
    cmd_cache_missing(&repo.settings_with_remote(&server.uri()), &args)
        .await
        .unwrap();

    assert_eq!(repo.read("docs/guides/a.md"), "# A\n");
    assert!(!repo.path("docs/guides/missing.md").exists());
}

#[tokio::test]
async fn test_cache_missing_continues_after_write_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/acme/standards/main/blocked/a.md"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# blocked\n"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/acme/standards/main/guides/b.md"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# B\n"))
        .mount(&server)
        .await;

    let repo = TestRepo::new();
    // A file where the cache directory should go makes the first write fail.
    repo.write("docs/blocked", "not a directory");
    let args = CacheMissingArgs {
        paths: vec!["blocked/a.md".into(), "guides/b.md".into()],
        ..Default::default()
    };
    cmd_cache_missing(&repo.settings_with_remote(&server.uri()), &args)
        .await
        .unwrap();

    assert_eq!(repo.read("docs/blocked"), "not a directory");
    assert_eq!(repo.read("docs/guides/b.md"), "# B\n");
}

#[tokio::test]
async fn test_cache_missing_requires_paths_and_remote() {
    let repo = TestRepo::new();
    let err = cmd_cache_missing(&repo.settings(), &CacheMissingArgs::default())
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 1);

    let args = CacheMissingArgs {
        paths: vec!["a.md".into()],
        ..Default::default()
    };
    let err = cmd_cache_missing(&repo.settings(), &args).await.unwrap_err();
    assert!(matches!(err, Error::Usage(_)));
}
