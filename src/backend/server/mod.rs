//! Server Module
//!
//! Server initialization, configuration and shared application state.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState, PollDeadlines and FromRef implementations
//! ├── config.rs       - ServerConfig (env + TOML overlay), database loading
//! └── init.rs         - Backend selection and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `ServerConfig::load()`
//! 2. **Database**: connect and migrate, or fall back to memory
//! 3. **State Creation**: notifier, listener budget, thread access, keys
//! 4. **Background Tasks**: memory-hub cleanup
//! 5. **Router Creation**: routes, auth and tracing layers
//!
//! # Example
//!
//! ```rust,no_run
//! use pollcast::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::load()?;
//! let app = create_app(&config).await;
//! let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::{load_database, ServerConfig};
pub use init::{build_state, create_app};
pub use state::{AppState, PollDeadlines};
