//! Authentication Module
//!
//! Bearer JWT sessions. The server never stores sessions; a token is valid
//! while its signature and expiry check out.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! └── sessions.rs     - Claims, SessionKeys (issue / verify)
//! ```
//!
//! Request-side extraction lives in `backend::middleware::auth`.
//!
//! # Example
//!
//! ```rust,no_run
//! use pollcast::backend::auth::{SessionKeys, DEFAULT_TOKEN_TTL};
//!
//! let keys = SessionKeys::new("secret");
//! let token = keys.issue(uuid::Uuid::new_v4(), None, DEFAULT_TOKEN_TTL).unwrap();
//! assert!(keys.verify(&token).is_ok());
//! ```

/// JWT token generation and validation
pub mod sessions;

pub use sessions::{Claims, SessionKeys, DEFAULT_TOKEN_TTL, DEV_JWT_SECRET};
