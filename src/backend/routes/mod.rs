//! Route Configuration Module
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Router assembly and layers
//! └── health.rs       - GET /health
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use pollcast::backend::routes::create_router;
//! use pollcast::backend::server::{build_state, ServerConfig};
//!
//! let state = build_state(&ServerConfig::default(), None);
//! let router = create_router(state);
//! ```

/// Main router creation
pub mod router;

/// Health endpoint
pub mod health;

pub use router::create_router;
