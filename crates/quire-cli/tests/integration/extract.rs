//! Section extraction from the command layer, including remote fallback.

use quire_cli::cli::ExtractArgs;
use quire_cli::commands::cmd_extract;
use quire_cli::Error;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{doc, TestRepo};

fn args(section: &str, target: &str) -> ExtractArgs {
    ExtractArgs {
        section: section.to_string(),
        target: target.to_string(),
        scope_arg: None,
        scope: None,
        version_range: None,
    }
}

fn repo_with_react() -> TestRepo {
    let repo = TestRepo::new();
    repo.write(
        "docs/react.md",
        &doc(
            "react",
            "React",
            "scope: [web]\nversion: 18.2.0\n",
            "## Conventions\ntext A\n## Other\ntext B\n",
        ),
    );
    repo
}

#[tokio::test]
async fn test_extract_succeeds() {
    let repo = repo_with_react();
    cmd_extract(&repo.settings(), &args("other", "react")).await.unwrap();
}

#[tokio::test]
async fn test_exit_codes_distinguish_document_and_section() {
    let repo = repo_with_react();
    let settings = repo.settings();

    let err = cmd_extract(&settings, &args("conventions", "vue")).await.unwrap_err();
    assert_eq!(err.exit_code(), 2);

    let err = cmd_extract(&settings, &args("testing", "react")).await.unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_filters_from_arguments() {
    let repo = repo_with_react();
    let settings = repo.settings();

    let mut scoped = args("conventions", "react");
    scoped.scope_arg = Some("mobile".into());
    assert_eq!(cmd_extract(&settings, &scoped).await.unwrap_err().exit_code(), 2);

    scoped.scope = Some("web".into());
    scoped.version_range = Some(">=18 <19".into());
    cmd_extract(&settings, &scoped).await.unwrap();
}

#[tokio::test]
async fn test_suggestions_reach_the_caller() {
    let repo = repo_with_react();
    let err = cmd_extract(&repo.settings(), &args("conventions", "raect"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Core(_)));
    assert_eq!(err.suggestions(), ["react".to_string()]);
}

#[tokio::test]
async fn test_remote_fallback_caches_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/acme/standards/main/docs/vue.md"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("---\nid: vue\ntitle: Vue\n---\n## Conventions\nremote\n"),
        )
        .mount(&server)
        .await;

    let repo = TestRepo::new();
    let settings = repo.settings_with_remote(&server.uri());

    cmd_extract(&settings, &args("conventions", "vue")).await.unwrap();
    assert!(repo.read("docs/docs/vue.md").contains("remote"));

    // Served locally from now on.
    cmd_extract(&repo.settings(), &args("conventions", "vue"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_remote_miss_is_not_found() {
    let server = MockServer::start().await;
    let repo = TestRepo::new();

    let err = cmd_extract(&repo.settings_with_remote(&server.uri()), &args("conventions", "vue"))
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(!repo.path("docs/vue.md").exists());
}
