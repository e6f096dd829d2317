/**
 * Router Configuration
 *
 * Assembles every route into one Axum router.
 *
 * # Routes
 *
 * ## Poll endpoints (authenticated, `Cache-Control: no-store`)
 *
 * - `GET /poll/feed` - wait for the next `feed:global` notification
 * - `GET /poll/thread?threadId=<uuid>` - wait on `thread:<uuid>`
 *
 * ## Producers (authenticated, database required)
 *
 * - `GET /feed/posts`, `POST /feed/posts`
 * - `POST /threads`
 * - `POST /threads/{thread_id}/messages`
 *
 * ## Operations
 *
 * - `GET /health`
 *
 * Authentication is a route layer, so it only runs for matched routes and
 * unknown paths still answer 404.
 */

use axum::{
    http::StatusCode,
    middleware::{from_fn_with_state, map_response},
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::feed::{create_post, list_posts};
use crate::backend::messaging::{create_thread, send_message};
use crate::backend::middleware::auth_middleware;
use crate::backend::poll::{handle_feed_poll, handle_thread_poll, no_store};
use crate::backend::routes::health::health;
use crate::backend::server::state::AppState;
use crate::shared::protocol::{FEED_POLL_PATH, THREAD_POLL_PATH};

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let poll_routes = Router::new()
        .route(FEED_POLL_PATH, get(handle_feed_poll))
        .route(THREAD_POLL_PATH, get(handle_thread_poll))
        .route_layer(from_fn_with_state(app_state.clone(), auth_middleware))
        .route_layer(map_response(no_store));

    let producer_routes = Router::new()
        .route("/feed/posts", get(list_posts).post(create_post))
        .route("/threads", post(create_thread))
        .route("/threads/{thread_id}/messages", post(send_message))
        .route_layer(from_fn_with_state(app_state.clone(), auth_middleware));

    Router::new()
        .merge(poll_routes)
        .merge(producer_routes)
        .route("/health", get(health))
        .fallback(|| async { BackendError::handler(StatusCode::NOT_FOUND, "not found") })
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
