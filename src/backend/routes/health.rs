//! Health endpoint
//!
//! `GET /health` reports the notifier backend and how many listeners are
//! held right now. It needs no authentication.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::backend::realtime::ChannelSubscriber;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub active_listeners: usize,
    pub max_listeners: usize,
    pub backend: &'static str,
}

pub async fn health(State(subscriber): State<ChannelSubscriber>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        active_listeners: subscriber.registry().active(),
        max_listeners: subscriber.registry().capacity(),
        backend: subscriber.notifier().backend_name(),
    })
}
