//! End-to-end flows against a mocked GitHub REST API
//!
//! Run with:
//! ```sh
//! cargo test -p pr-policy --test github_flow
//! ```

#![allow(clippy::needless_raw_string_hashes)] // Raw strings in test data are fine

use pr_policy::checklist::{self, CHECKLIST_MARKER};
use pr_policy::config::DEFAULT_BOT_LOGIN;
use pr_policy::remediation::REMEDIATION_MARKER;
use pr_policy::{
    ChecklistSync, Config, GitHubClient, GitHubError, LabelSet, PolicyError, PrRef, PrStore,
    PublishOutcome, RemediationPublisher, RepoSlug, SyncOutcome, Trigger, Validator,
};
use serde_json::{json, Value};
use std::io::Write as _;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMMENTS_PATH: &str = "/repos/acme/widgets/issues/7/comments";
const LABELS_PATH: &str = "/repos/acme/widgets/issues/7/labels";

fn repo() -> RepoSlug {
    RepoSlug::new("acme", "widgets")
}

fn pr() -> PrRef {
    PrRef::new(repo(), 7)
}

fn config(server: &MockServer) -> Config {
    Config::new(repo()).with_api_url(server.uri())
}

fn client(server: &MockServer) -> Arc<dyn PrStore> {
    Arc::new(GitHubClient::new(server.uri(), "test-token").unwrap())
}

fn comment(id: u64, login: &str, body: &str) -> Value {
    json!({ "id": id, "user": { "login": login }, "body": body })
}

fn labels(names: &[&str]) -> LabelSet {
    names.iter().copied().collect()
}

fn trigger(event: &str, action: &str, actor: &str, names: &[&str]) -> Trigger {
    Trigger {
        event_name: event.to_string(),
        action: Some(action.to_string()),
        actor: actor.to_string(),
        pr: pr(),
        labels: labels(names),
        body: String::new(),
        comment_id: None,
    }
}

async fn mount_comments(server: &MockServer, comments: Value) {
    Mock::given(method("GET"))
        .and(path(COMMENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(comments))
        .mount(server)
        .await;
}

async fn requests_to(server: &MockServer, verb: &str, route: &str) -> Vec<wiremock::Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == verb && r.url.path() == route)
        .collect()
}

// ============================================================================
// REST store
// ============================================================================

#[tokio::test]
async fn test_list_comments_follows_pages() {
    let server = MockServer::start().await;

    let first: Vec<Value> = (1..=100)
        .map(|id| comment(id, "alice", "looks good"))
        .collect();
    Mock::given(method("GET"))
        .and(path(COMMENTS_PATH))
        .and(query_param("page", "1"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(first))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(COMMENTS_PATH))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([comment(101, DEFAULT_BOT_LOGIN, CHECKLIST_MARKER)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let comments = client(&server).list_comments(&pr()).await.unwrap();

    assert_eq!(comments.len(), 101);
    assert_eq!(comments[100].id, 101);
    assert_eq!(comments[100].author, DEFAULT_BOT_LOGIN);
}

#[tokio::test]
async fn test_missing_label_removal_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{LABELS_PATH}/cherry-pick")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Label does not exist" })))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .remove_label(&pr(), "cherry-pick")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_api_error_carries_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMMENTS_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(
            json!({ "message": "Resource not accessible by integration" }),
        ))
        .mount(&server)
        .await;

    let err = client(&server)
        .create_comment(&pr(), "hello")
        .await
        .unwrap_err();

    match err {
        PolicyError::Store(GitHubError::Api { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "Resource not accessible by integration");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ============================================================================
// Checklist sync
// ============================================================================

#[tokio::test]
async fn test_labeled_pr_gets_checklist_comment() {
    let server = MockServer::start().await;
    mount_comments(&server, json!([comment(1, "alice", "please review")])).await;

    let expected = checklist::render(&labels(&["cherry-pick", "no-migration"]));
    Mock::given(method("POST"))
        .and(path(COMMENTS_PATH))
        .and(body_json(json!({ "body": expected })))
        .respond_with(ResponseTemplate::new(201).set_body_json(comment(2, DEFAULT_BOT_LOGIN, &expected)))
        .expect(1)
        .mount(&server)
        .await;

    let sync = ChecklistSync::new(client(&server), &config(&server));
    let outcome = sync
        .run(&trigger("pull_request", "labeled", "alice", &["cherry-pick", "no-migration"]))
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::CommentCreated);
}

#[tokio::test]
async fn test_matching_checklist_is_left_alone() {
    let server = MockServer::start().await;
    let current = checklist::render(&labels(&["not-cherry-pick"]));
    mount_comments(&server, json!([comment(3, DEFAULT_BOT_LOGIN, &current)])).await;

    let sync = ChecklistSync::new(client(&server), &config(&server));
    let outcome = sync
        .run(&trigger("pull_request", "synchronize", "alice", &["not-cherry-pick"]))
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Unchanged);
    assert!(requests_to(&server, "POST", COMMENTS_PATH).await.is_empty());
    assert!(requests_to(&server, "PATCH", "/repos/acme/widgets/issues/comments/3")
        .await
        .is_empty());
}

#[tokio::test]
async fn test_duplicate_checklists_are_replaced_by_one() {
    let server = MockServer::start().await;
    let stale = checklist::render(&LabelSet::new());
    mount_comments(
        &server,
        json!([
            comment(10, DEFAULT_BOT_LOGIN, &stale),
            comment(11, DEFAULT_BOT_LOGIN, &stale),
        ]),
    )
    .await;

    for id in [10, 11] {
        Mock::given(method("DELETE"))
            .and(path(format!("/repos/acme/widgets/issues/comments/{id}")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path(COMMENTS_PATH))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let sync = ChecklistSync::new(client(&server), &config(&server));
    let outcome = sync
        .run(&trigger("pull_request", "opened", "alice", &[]))
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::CommentCreated);
}

#[tokio::test]
async fn test_checklist_edit_from_event_file_updates_labels() {
    let server = MockServer::start().await;

    let mut ticked = labels(&["cherry-pick"]);
    ticked.insert("regression-fix");
    let body = checklist::render(&ticked);
    mount_comments(&server, json!([comment(55, DEFAULT_BOT_LOGIN, &body)])).await;

    Mock::given(method("DELETE"))
        .and(path(format!("{LABELS_PATH}/not-cherry-pick")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(LABELS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let payload = json!({
        "action": "edited",
        "sender": { "login": "alice" },
        "issue": {
            "number": 7,
            "body": "",
            "labels": [{ "name": "not-cherry-pick" }, { "name": "no-migration" }],
            "pull_request": { "url": "https://api.github.com/repos/acme/widgets/pulls/7" }
        },
        "comment": { "id": 55, "body": body }
    });
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{payload}").unwrap();

    let trigger = Trigger::from_file("issue_comment", &repo(), file.path(), None).unwrap();
    let sync = ChecklistSync::new(client(&server), &config(&server));
    let outcome = sync.run(&trigger).await.unwrap();

    assert!(matches!(outcome, SyncOutcome::LabelsUpdated { .. }));

    let added = requests_to(&server, "POST", LABELS_PATH).await;
    let payload: Value = added[0].body_json().unwrap();
    let mut names: Vec<String> = payload["labels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["cherry-pick", "regression-fix"]);
}

#[tokio::test]
async fn test_automation_events_make_no_requests() {
    let server = MockServer::start().await;

    let sync = ChecklistSync::new(client(&server), &config(&server));
    let outcome = sync
        .run(&trigger("pull_request", "labeled", DEFAULT_BOT_LOGIN, &["cherry-pick"]))
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::SelfTriggered);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_conflicting_labels_replace_old_remediations() {
    let server = MockServer::start().await;
    let old = format!("{REMEDIATION_MARKER}\n* stale");
    mount_comments(&server, json!([comment(21, DEFAULT_BOT_LOGIN, &old)])).await;

    Mock::given(method("DELETE"))
        .and(path("/repos/acme/widgets/issues/comments/21"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(COMMENTS_PATH))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let config = config(&server);
    let current = labels(&["cherry-pick", "not-cherry-pick", "not-regression-fix", "no-migration"]);
    let remediations = Validator::new(&config).unwrap().validate(&current, "");
    let outcome = RemediationPublisher::new(client(&server), &config)
        .publish(&pr(), &remediations)
        .await
        .unwrap();

    assert_eq!(outcome, PublishOutcome::Failed { remediations: 1 });

    let posted = requests_to(&server, "POST", COMMENTS_PATH).await;
    let payload: Value = posted[0].body_json().unwrap();
    let body = payload["body"].as_str().unwrap();
    assert_eq!(
        body,
        "#### Remediations needed\n* Add only ONE of these labels to your PR: cherry-pick,not-cherry-pick"
    );
}

#[tokio::test]
async fn test_compliant_pr_clears_remediations() {
    let server = MockServer::start().await;
    let old = format!("{REMEDIATION_MARKER}\n* stale");
    mount_comments(&server, json!([comment(30, DEFAULT_BOT_LOGIN, &old)])).await;

    Mock::given(method("DELETE"))
        .and(path("/repos/acme/widgets/issues/comments/30"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = config(&server);
    let body = "This is a fix for an issue found on: production, via: observability";
    let current = labels(&["cherry-pick", "not-regression-fix", "no-migration"]);
    let remediations = Validator::new(&config).unwrap().validate(&current, body);
    let outcome = RemediationPublisher::new(client(&server), &config)
        .publish(&pr(), &remediations)
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert!(requests_to(&server, "POST", COMMENTS_PATH).await.is_empty());
}
