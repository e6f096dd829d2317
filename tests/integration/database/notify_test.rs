//! Producers and waiters on a real PostgreSQL

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use pollcast::backend::realtime::{notify_in_transaction, ChannelSubscriber, ListenerRegistry, Notifier, WaitOutcome};
use pollcast::backend::routes::create_router;
use pollcast::backend::server::{build_state, load_database, ServerConfig};
use pollcast::shared::{ChangeEvent, ChannelKey};

use crate::common::{body_json, create_test_pool, create_test_user, request, test_database_url, TEST_JWT_SECRET};

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_rolled_back_write_notifies_nobody() {
    let pool = create_test_pool().await;
    let subscriber = ChannelSubscriber::new(Notifier::Postgres(pool.clone()), ListenerRegistry::new(4));
    let channel = ChannelKey::thread(uuid::Uuid::new_v4());

    let waiter = {
        let subscriber = subscriber.clone();
        let channel = channel.clone();
        tokio::spawn(async move { subscriber.wait(&channel, Duration::from_secs(2)).await })
    };
    tokio::time::sleep(Duration::from_millis(200)).await;

    let mut tx = pool.begin().await.unwrap();
    let event = ChangeEvent::message_sent(uuid::Uuid::new_v4(), uuid::Uuid::new_v4(), uuid::Uuid::new_v4());
    notify_in_transaction(&mut tx, &channel, &event).await.unwrap();
    tx.rollback().await.unwrap();

    assert_eq!(waiter.await.unwrap().unwrap(), WaitOutcome::TimedOut);
    assert_eq!(subscriber.registry().active(), 0);
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_message_send_wakes_thread_poll() {
    let pool = create_test_pool().await;
    let config = ServerConfig {
        thread_deadline_secs: 10,
        jwt_secret: Some(TEST_JWT_SECRET.to_string()),
        ..ServerConfig::default()
    };
    let router = create_router(build_state(&config, Some(pool)));
    let alice = create_test_user("alice");

    let created = router
        .clone()
        .oneshot(request("POST", "/threads", Some(&alice.token), Some(json!({ "participantIds": [] }))))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let thread_id = body_json(created).await["id"].as_str().unwrap().to_string();

    let poll = {
        let router = router.clone();
        let uri = format!("/poll/thread?threadId={}", thread_id);
        let token = alice.token.clone();
        tokio::spawn(async move { router.oneshot(request("GET", &uri, Some(&token), None)).await.unwrap() })
    };
    tokio::time::sleep(Duration::from_millis(300)).await;

    let sent = router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/threads/{}/messages", thread_id),
            Some(&alice.token),
            Some(json!({ "body": "hello" })),
        ))
        .await
        .unwrap();
    assert_eq!(sent.status(), StatusCode::CREATED);
    let message_id = body_json(sent).await["id"].as_str().unwrap().to_string();

    let response = poll.await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["event"]["kind"], "message_sent");
    assert_eq!(body["event"]["payload"]["messageId"], message_id);
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_outsider_cannot_send_or_poll() {
    let pool = create_test_pool().await;
    let config = ServerConfig {
        jwt_secret: Some(TEST_JWT_SECRET.to_string()),
        ..ServerConfig::default()
    };
    let router = create_router(build_state(&config, Some(pool)));
    let alice = create_test_user("alice");
    let mallory = create_test_user("mallory");

    let created = router
        .clone()
        .oneshot(request("POST", "/threads", Some(&alice.token), Some(json!({}))))
        .await
        .unwrap();
    let thread_id = body_json(created).await["id"].as_str().unwrap().to_string();

    let sent = router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/threads/{}/messages", thread_id),
            Some(&mallory.token),
            Some(json!({ "body": "let me in" })),
        ))
        .await
        .unwrap();
    assert_eq!(sent.status(), StatusCode::FORBIDDEN);

    let polled = router
        .oneshot(request(
            "GET",
            &format!("/poll/thread?threadId={}", thread_id),
            Some(&mallory.token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(polled.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_producer_is_not_starved_by_a_full_listener_budget() {
    let config = ServerConfig {
        database_url: Some(test_database_url()),
        feed_deadline_secs: 10,
        max_listeners: 12,
        jwt_secret: Some(TEST_JWT_SECRET.to_string()),
        ..ServerConfig::default()
    };
    let pool = load_database(&config).await.expect("test database");
    let router = create_router(build_state(&config, Some(pool)));
    let alice = create_test_user("alice");

    let polls: Vec<_> = (0..config.max_listeners)
        .map(|_| {
            let router = router.clone();
            let token = alice.token.clone();
            tokio::spawn(async move { router.oneshot(request("GET", "/poll/feed", Some(&token), None)).await.unwrap() })
        })
        .collect();
    tokio::time::sleep(Duration::from_millis(500)).await;

    let posted = tokio::time::timeout(
        Duration::from_secs(5),
        router
            .clone()
            .oneshot(request("POST", "/feed/posts", Some(&alice.token), Some(json!({ "body": "hello" })))),
    )
    .await
    .expect("producer waited on the pool")
    .unwrap();
    assert_eq!(posted.status(), StatusCode::CREATED);

    for poll in polls {
        assert_eq!(poll.await.unwrap().status(), StatusCode::OK);
    }
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_released_listener_returns_a_quiet_connection() {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .connect(&test_database_url())
        .await
        .unwrap();
    let subscriber = ChannelSubscriber::new(Notifier::Postgres(pool.clone()), ListenerRegistry::new(1));

    let lease = subscriber.open(&ChannelKey::feed()).await.unwrap();
    assert_eq!(subscriber.registry().active(), 1);
    lease.release();
    assert_eq!(subscriber.registry().active(), 0);

    // the single connection comes back once its UNLISTEN has run
    let mut conn = tokio::time::timeout(Duration::from_secs(5), pool.acquire())
        .await
        .expect("connection returned to the pool")
        .unwrap();
    let listening: i64 = sqlx::query_scalar("SELECT count(*) FROM pg_listening_channels()")
        .fetch_one(&mut *conn)
        .await
        .unwrap();
    assert_eq!(listening, 0);
}
