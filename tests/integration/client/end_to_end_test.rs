//! Poll client against a live server on the memory notifier

use std::sync::Arc;
use std::time::Duration;

use pollcast::client::{Config, HttpTransport, PollClient, PollResponse, PollTransport};
use pollcast::shared::{AppConfig, ChangeEvent, ChannelKey};

use crate::common::{create_test_user, TestApp};

async fn serve(app: &TestApp) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn transport(url: String, token: &str) -> Arc<HttpTransport> {
    let config = Config::with_builder(
        AppConfig::builder()
            .server_url(url)
            .poll_deadline(Duration::from_secs(1)),
    )
    .unwrap()
    .with_token(token);
    Arc::new(HttpTransport::new(config).unwrap())
}

#[tokio::test]
async fn test_idle_thread_answers_204() {
    let app = TestApp::new(Duration::from_secs(1), 4);
    let user = create_test_user("alice");
    let thread_id = uuid::Uuid::new_v4();
    app.membership.grant(thread_id, user.id);
    let url = serve(&app).await;

    let response = transport(url, &user.token)
        .poll(&ChannelKey::thread(thread_id))
        .await
        .unwrap();

    assert_eq!(response, PollResponse::Empty);
    assert_eq!(app.active_listeners(), 0);
}

#[tokio::test]
async fn test_client_receives_published_event_and_keeps_polling() {
    let app = TestApp::new(Duration::from_secs(1), 4);
    let user = create_test_user("alice");
    let url = serve(&app).await;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let client = PollClient::new(transport(url, &user.token), ChannelKey::feed()).on_event(move |envelope| {
        let _ = tx.send(envelope);
    });
    client.start();

    // Publish once a listener is open
    for _ in 0..100 {
        if app.active_listeners() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let post_id = uuid::Uuid::new_v4();
    app.publish(&ChannelKey::feed(), &ChangeEvent::post_created(post_id, user.id))
        .await;

    let envelope = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("event within 5s")
        .expect("sender alive");
    assert_eq!(envelope.event["payload"]["postId"], post_id.to_string());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(client.is_active());
    assert!(client.last_error().is_none());
    client.stop().await;
}

#[tokio::test]
async fn test_non_participant_client_goes_idle() {
    let app = TestApp::new(Duration::from_secs(1), 4);
    let user = create_test_user("mallory");
    let url = serve(&app).await;

    let client = PollClient::new(transport(url, &user.token), ChannelKey::thread(uuid::Uuid::new_v4()));
    client.start();

    for _ in 0..100 {
        if !client.is_active() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert!(!client.is_active());
    crate::assert_contains!(client.last_error().unwrap(), "403");
}
