//! Producer endpoint integration tests
//!
//! Without a database every producer answers 503; authentication still
//! runs first.

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{body_json, create_test_user, request, TestApp};

#[tokio::test]
async fn test_producers_require_authentication() {
    let app = TestApp::new(Duration::from_secs(60), 4);

    let response = app
        .send(request("POST", "/feed/posts", None, Some(json!({ "body": "hello" }))))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_producers_without_database_are_503() {
    let app = TestApp::new(Duration::from_secs(60), 4);
    let user = create_test_user("alice");
    let thread_id = uuid::Uuid::new_v4();
    app.membership.grant(thread_id, user.id);

    let calls = [
        ("POST", "/feed/posts".to_string(), Some(json!({ "body": "hello" }))),
        ("GET", "/feed/posts".to_string(), None),
        ("POST", "/threads".to_string(), Some(json!({ "participantIds": [] }))),
        (
            "POST",
            format!("/threads/{}/messages", thread_id),
            Some(json!({ "body": "hi" })),
        ),
    ];

    for (method, uri, body) in calls {
        let response = app.send(request(method, &uri, Some(&user.token), body)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{} {}", method, uri);
        let body = body_json(response).await;
        assert_eq!(body["status"], 503);
    }
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::new(Duration::from_secs(60), 4);

    let response = app.get("/nope", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "not found");
}
