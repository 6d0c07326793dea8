//! Route table behavior through the full router.

mod common;

use std::io::Write;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use gitlab_bridge::lifecycle::ShutdownReason;

use common::{harness, FakeGitlab, Outcome};

#[tokio::test]
async fn test_ping() {
    let h = harness(FakeGitlab::new());
    let request = Request::builder().uri("/ping").body(Body::empty()).unwrap();

    let response = h.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"pong\n");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let h = harness(FakeGitlab::new());
    let request = Request::builder()
        .uri("/users/me")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();

    let response = h.router.oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_prefix_routes_without_trailing_slash() {
    let h = harness(FakeGitlab::with_merge_request(5));

    let (status, json) = common::send(&h.router, Method::GET, "/mr/draft_notes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Draft notes fetched successfully");

    let (status, json) = common::send(&h.router, Method::POST, "/pipeline/trigger", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["details"], "Missing pipeline id in path");
}

#[tokio::test]
async fn test_unknown_path() {
    let h = harness(FakeGitlab::new());

    let (status, json) = common::send(&h.router, Method::GET, "/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);
    assert_eq!(json["message"], "Not found");
}

#[tokio::test]
async fn test_wrong_method_lists_allowed() {
    let h = harness(FakeGitlab::new());

    let (status, json) = common::send(&h.router, Method::POST, "/users/me", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json["details"], "Expected GET");

    let (status, json) = common::send(&h.router, Method::PUT, "/mr/awardable/note/1", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json["details"], "Expected one of POST, DELETE");
}

#[tokio::test]
async fn test_project_members() {
    let h = harness(FakeGitlab::new());

    let (status, json) = common::send(&h.router, Method::GET, "/project/members", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Project members retrieved");
    assert_eq!(json["data"][0]["username"], "alice");
}

#[tokio::test]
async fn test_current_user_rejected() {
    let h = harness(FakeGitlab::new());
    h.gitlab.set_outcome(Outcome::Status(401));

    let (status, json) = common::send(&h.router, Method::GET, "/users/me", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Failed to get current user");
    assert_eq!(json["details"], "An error occurred on the /users/me endpoint");
}

#[tokio::test]
async fn test_current_user() {
    let h = harness(FakeGitlab::new());

    let (status, json) = common::send(&h.router, Method::GET, "/users/me", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "User fetched successfully");
    assert_eq!(json["data"]["id"], 1);
}

#[tokio::test]
async fn test_merge_requests_list() {
    let h = harness(FakeGitlab::with_merge_request(3));

    let (status, json) = common::send(
        &h.router,
        Method::POST,
        "/merge_requests",
        Some(json!({"labels": ["bug"], "not_labels": []})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Merge requests fetched successfully");
    assert_eq!(json["data"][0]["iid"], 3);
}

#[tokio::test]
async fn test_merge_requests_list_empty() {
    let h = harness(FakeGitlab::new());

    let (status, json) = common::send(&h.router, Method::POST, "/merge_requests", Some(json!({}))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "No merge requests found");
}

#[tokio::test]
async fn test_pipeline_with_jobs() {
    let h = harness(FakeGitlab::new());

    let (status, json) = common::send(&h.router, Method::GET, "/pipeline", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Pipeline retrieved");
    assert_eq!(json["data"]["latest_pipeline"]["id"], 55);
    assert_eq!(json["data"]["latest_pipeline"]["ref"], common::BRANCH);
    assert_eq!(json["data"]["jobs"][0]["name"], "test");
}

#[tokio::test]
async fn test_pipeline_trigger() {
    let h = harness(FakeGitlab::new());

    let (status, json) = common::send(&h.router, Method::POST, "/pipeline/trigger/77", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Pipeline retriggered");
    assert_eq!(json["data"]["id"], 77);

    let (status, json) = common::send(&h.router, Method::POST, "/pipeline/trigger/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Could not retrigger pipeline");
}

#[tokio::test]
async fn test_job_trace() {
    let h = harness(FakeGitlab::new());

    let (status, json) = common::send(&h.router, Method::POST, "/job", Some(json!({"job_id": 12}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Log file read");
    assert_eq!(json["data"], "trace of job 12");

    let (status, _) = common::send(&h.router, Method::POST, "/job", Some(json!({"job_id": 0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_attachment_upload() {
    let h = harness(FakeGitlab::new());
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"hello").unwrap();

    let (status, json) = common::send(
        &h.router,
        Method::POST,
        "/attachment",
        Some(json!({"file_path": file.path(), "file_name": "hello.txt"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "File uploaded successfully");
    assert_eq!(json["data"]["url"], "/uploads/5/hello.txt");
}

#[tokio::test]
async fn test_attachment_missing_file() {
    let h = harness(FakeGitlab::new());
    let dir = tempfile::tempdir().unwrap();

    let (status, json) = common::send(
        &h.router,
        Method::POST,
        "/attachment",
        Some(json!({"file_path": dir.path().join("missing.txt"), "file_name": "missing.txt"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Could not read file");
}

#[tokio::test]
async fn test_draft_note_lifecycle() {
    let h = harness(FakeGitlab::with_merge_request(5));

    let (status, json) = common::send(
        &h.router,
        Method::POST,
        "/mr/draft_notes/",
        Some(json!({"comment": "looks good", "discussion_id": "abc"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Draft note created successfully");
    assert_eq!(json["data"]["note"], "looks good");
    assert_eq!(json["data"]["discussion_id"], "abc");

    let (status, json) = common::send(
        &h.router,
        Method::PATCH,
        "/mr/draft_notes/2",
        Some(json!({"note": "edited"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Draft note updated");
    assert_eq!(json["data"]["id"], 2);

    let (status, json) = common::send(&h.router, Method::DELETE, "/mr/draft_notes/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Draft note deleted");
}

#[tokio::test]
async fn test_draft_note_create_requires_comment() {
    let h = harness(FakeGitlab::with_merge_request(5));

    let (status, json) = common::send(&h.router, Method::POST, "/mr/draft_notes/", Some(json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["details"], "Must provide comment");
}

#[tokio::test]
async fn test_draft_note_publish() {
    let h = harness(FakeGitlab::with_merge_request(5));

    let (status, json) = common::send(
        &h.router,
        Method::POST,
        "/mr/draft_notes/publish",
        Some(json!({"note": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Draft note(s) published");

    let (status, _) = common::send(
        &h.router,
        Method::POST,
        "/mr/draft_notes/publish",
        Some(json!({"publish_all": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = common::send(&h.router, Method::POST, "/mr/draft_notes/publish", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(h.gitlab.published(), vec!["5:2".to_string(), "5:all".to_string()]);
}

#[tokio::test]
async fn test_shutdown_request() {
    let h = harness(FakeGitlab::new());

    let (status, json) = common::send(&h.router, Method::POST, "/shutdown", Some(json!({"restart": false}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Shutting down server");
    assert_eq!(h.shutdown.reason(), Some(ShutdownReason::Requested));
}

#[tokio::test]
async fn test_restart_request() {
    let h = harness(FakeGitlab::new());

    let (status, json) = common::send(&h.router, Method::POST, "/shutdown", Some(json!({"restart": true}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Restarting server");
    assert_eq!(h.shutdown.reason(), Some(ShutdownReason::Restart));
}
