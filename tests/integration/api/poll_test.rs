//! Poll endpoint integration tests
//!
//! Drives `GET /poll/feed` and `GET /poll/thread` through the real router
//! on the memory notifier with paused time.

use std::time::Duration;

use axum::http::{header, StatusCode};
use pretty_assertions::assert_eq;
use tokio::time::Instant;

use pollcast::shared::{ChangeEvent, ChannelKey};

use crate::common::{body_json, create_test_user, TestApp};

const DEADLINE: Duration = Duration::from_secs(60);

#[tokio::test(start_paused = true)]
async fn test_feed_poll_without_token_is_401() {
    let app = TestApp::new(DEADLINE, 4);

    let response = app.get("/poll/feed", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    assert_eq!(app.active_listeners(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_feed_poll_with_bad_token_is_401() {
    let app = TestApp::new(DEADLINE, 4);

    let response = app.get("/poll/feed", Some("not.a.jwt")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["status"], 401);
}

#[tokio::test(start_paused = true)]
async fn test_feed_poll_times_out_with_204() {
    let app = TestApp::new(DEADLINE, 4);
    let user = create_test_user("alice");
    let started = Instant::now();

    let response = app.get("/poll/feed", Some(&user.token)).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    crate::assert_in_range!(started.elapsed(), DEADLINE, DEADLINE + Duration::from_millis(50));
    assert_eq!(app.active_listeners(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_feed_event_after_500ms_returns_200() {
    let app = TestApp::new(DEADLINE, 4);
    let user = create_test_user("alice");
    let post_id = uuid::Uuid::new_v4();
    let started = Instant::now();

    let poll = {
        let router_app = app.router.clone();
        let token = user.token.clone();
        tokio::spawn(async move {
            use tower::ServiceExt;
            router_app
                .oneshot(crate::common::request("GET", "/poll/feed", Some(&token), None))
                .await
                .expect("router is infallible")
        })
    };

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(app.active_listeners(), 1);
    app.publish(&ChannelKey::feed(), &ChangeEvent::post_created(post_id, user.id))
        .await;

    let response = poll.await.expect("poll task");
    crate::assert_in_range!(started.elapsed(), Duration::from_millis(500), Duration::from_millis(550));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");

    let body = body_json(response).await;
    assert_eq!(body["event"]["kind"], "post_created");
    assert_eq!(body["event"]["payload"]["postId"], post_id.to_string());
    assert!(body["timestamp"].is_string());
    assert_eq!(app.active_listeners(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_every_waiter_sees_the_same_event() {
    let app = TestApp::new(DEADLINE, 4);
    let user = create_test_user("alice");

    let polls: Vec<_> = (0..3)
        .map(|_| {
            let router_app = app.router.clone();
            let token = user.token.clone();
            tokio::spawn(async move {
                use tower::ServiceExt;
                router_app
                    .oneshot(crate::common::request("GET", "/poll/feed", Some(&token), None))
                    .await
                    .expect("router is infallible")
            })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(app.active_listeners(), 3);
    app.publish(&ChannelKey::feed(), &ChangeEvent::post_created(uuid::Uuid::new_v4(), user.id))
        .await;

    for poll in polls {
        assert_eq!(poll.await.expect("poll task").status(), StatusCode::OK);
    }
    assert_eq!(app.active_listeners(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_thread_poll_requires_thread_id() {
    let app = TestApp::new(DEADLINE, 4);
    let user = create_test_user("alice");

    let missing = app.get("/poll/thread", Some(&user.token)).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let malformed = app.get("/poll/thread?threadId=nope", Some(&user.token)).await;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
    let body = body_json(malformed).await;
    crate::assert_contains!(body["error"].as_str().unwrap(), "threadId");
    assert_eq!(app.active_listeners(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_thread_poll_by_non_participant_is_403() {
    let app = TestApp::new(DEADLINE, 4);
    let owner = create_test_user("alice");
    let outsider = create_test_user("mallory");
    let thread_id = uuid::Uuid::new_v4();
    app.membership.grant(thread_id, owner.id);

    let uri = format!("/poll/thread?threadId={}", thread_id);
    let response = app.get(&uri, Some(&outsider.token)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    assert_eq!(app.active_listeners(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_thread_poll_by_participant_waits_on_its_thread() {
    let app = TestApp::new(DEADLINE, 4);
    let user = create_test_user("alice");
    let thread_id = uuid::Uuid::new_v4();
    let other_thread = uuid::Uuid::new_v4();
    app.membership.grant(thread_id, user.id);

    let poll = {
        let router_app = app.router.clone();
        let uri = format!("/poll/thread?threadId={}", thread_id);
        let token = user.token.clone();
        tokio::spawn(async move {
            use tower::ServiceExt;
            router_app
                .oneshot(crate::common::request("GET", &uri, Some(&token), None))
                .await
                .expect("router is infallible")
        })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    let message_id = uuid::Uuid::new_v4();
    app.publish(
        &ChannelKey::thread(other_thread),
        &ChangeEvent::message_sent(other_thread, uuid::Uuid::new_v4(), user.id),
    )
    .await;
    app.publish(
        &ChannelKey::thread(thread_id),
        &ChangeEvent::message_sent(thread_id, message_id, user.id),
    )
    .await;

    let response = poll.await.expect("poll task");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["event"]["kind"], "message_sent");
    assert_eq!(body["event"]["payload"]["messageId"], message_id.to_string());
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_budget_is_503_with_retry_after() {
    let app = TestApp::new(DEADLINE, 1);
    let user = create_test_user("alice");

    let holder = {
        let router_app = app.router.clone();
        let token = user.token.clone();
        tokio::spawn(async move {
            use tower::ServiceExt;
            router_app
                .oneshot(crate::common::request("GET", "/poll/feed", Some(&token), None))
                .await
                .expect("router is infallible")
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(app.active_listeners(), 1);

    let rejected = app.get("/poll/feed", Some(&user.token)).await;
    assert_eq!(rejected.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(rejected.headers().contains_key(header::RETRY_AFTER));
    assert_eq!(app.active_listeners(), 1);

    assert_eq!(holder.await.expect("poll task").status(), StatusCode::NO_CONTENT);
    assert_eq!(app.active_listeners(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_poll_releases_its_listener() {
    let app = TestApp::new(DEADLINE, 2);
    let user = create_test_user("alice");

    let poll = {
        let router_app = app.router.clone();
        let token = user.token.clone();
        tokio::spawn(async move {
            use tower::ServiceExt;
            router_app
                .oneshot(crate::common::request("GET", "/poll/feed", Some(&token), None))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(app.active_listeners(), 1);

    poll.abort();
    let _ = poll.await;
    assert_eq!(app.active_listeners(), 0);
}
