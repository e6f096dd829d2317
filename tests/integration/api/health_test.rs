//! Health endpoint integration tests

use std::time::Duration;

use axum::http::StatusCode;

use crate::common::{body_json, create_test_user, request, TestApp};

#[tokio::test(start_paused = true)]
async fn test_health_reports_backend_and_listeners() {
    let app = TestApp::new(Duration::from_secs(60), 8);
    let user = create_test_user("alice");

    let poll = {
        let router_app = app.router.clone();
        let token = user.token.clone();
        tokio::spawn(async move {
            use tower::ServiceExt;
            router_app
                .oneshot(request("GET", "/poll/feed", Some(&token), None))
                .await
                .expect("router is infallible")
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");
    assert_eq!(body["activeListeners"], 1);
    assert_eq!(body["maxListeners"], 8);

    poll.abort();
}
