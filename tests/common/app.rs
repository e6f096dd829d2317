//! In-memory application fixture
//!
//! Builds the real router on the memory notifier so endpoint tests run
//! without a database. Handles to the hub and the membership table let a
//! test publish events and grant thread access directly.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use tower::ServiceExt;

use pollcast::backend::messaging::{MembershipTable, ThreadAccess};
use pollcast::backend::realtime::{MemoryHub, Notifier};
use pollcast::backend::routes::create_router;
use pollcast::backend::server::{build_state, AppState, ServerConfig};
use pollcast::shared::{ChangeEvent, ChannelKey};

use super::auth_helpers::{auth_header, TEST_JWT_SECRET};

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub hub: MemoryHub,
    pub membership: MembershipTable,
}

impl TestApp {
    /// Memory-backed app with the given deadline on both endpoints
    pub fn new(deadline: Duration, max_listeners: usize) -> Self {
        let config = ServerConfig {
            feed_deadline_secs: deadline.as_secs(),
            thread_deadline_secs: deadline.as_secs(),
            max_listeners,
            jwt_secret: Some(TEST_JWT_SECRET.to_string()),
            ..ServerConfig::default()
        };
        let state = build_state(&config, None);

        let hub = match state.subscriber.notifier() {
            Notifier::Memory(hub) => hub.clone(),
            Notifier::Postgres(_) => panic!("expected the memory notifier"),
        };
        let membership = match &state.thread_access {
            ThreadAccess::Memory(table) => table.clone(),
            ThreadAccess::Postgres(_) => panic!("expected in-memory thread access"),
        };

        Self {
            router: create_router(state.clone()),
            state,
            hub,
            membership,
        }
    }

    pub fn active_listeners(&self) -> usize {
        self.state.subscriber.registry().active()
    }

    pub async fn publish(&self, channel: &ChannelKey, event: &ChangeEvent) {
        self.state
            .subscriber
            .notifier()
            .publish(channel, event)
            .await
            .expect("publish on the memory hub");
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.expect("router is infallible")
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send(request("GET", uri, token, None)).await
    }
}

/// Build a request with an optional bearer token and JSON body
pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", auth_header(token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("valid request")
}

/// Collect a response body as JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    serde_json::from_slice(&bytes).expect("JSON body")
}
