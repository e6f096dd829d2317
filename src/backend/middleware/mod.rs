//! Middleware Module
//!
//! HTTP middleware applied in front of handlers.
//!
//! - **`auth`** - bearer JWT verification for protected routes
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{routing::get, Router};
//! use pollcast::backend::auth::SessionKeys;
//! use pollcast::backend::middleware::auth_middleware;
//!
//! let keys = SessionKeys::new("secret");
//! let router: Router = Router::new()
//!     .route("/private", get(|| async { "ok" }))
//!     .route_layer(axum::middleware::from_fn_with_state(keys.clone(), auth_middleware))
//!     .with_state(keys);
//! ```

pub mod auth;

pub use auth::{auth_middleware, authenticate, bearer_token, AuthUser, AuthenticatedUser};
