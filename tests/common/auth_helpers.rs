//! Authentication test helpers
//!
//! Mints session tokens with the secret the test application is built
//! with.

#[cfg(feature = "ssr")]
use pollcast::backend::auth::{SessionKeys, DEFAULT_TOKEN_TTL};
#[cfg(feature = "ssr")]
use uuid::Uuid;

/// Secret every test application signs with
pub const TEST_JWT_SECRET: &str = "pollcast-test-secret";

/// Test user identity and token
#[cfg(feature = "ssr")]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub token: String,
}

#[cfg(feature = "ssr")]
pub fn test_keys() -> SessionKeys {
    SessionKeys::new(TEST_JWT_SECRET)
}

/// Create a user with a fresh id and a valid token
#[cfg(feature = "ssr")]
pub fn create_test_user(username: &str) -> TestUser {
    let id = Uuid::new_v4();
    let token = generate_test_token(id, username);
    TestUser {
        id,
        username: username.to_string(),
        token,
    }
}

/// Generate a test JWT token
#[cfg(feature = "ssr")]
pub fn generate_test_token(user_id: Uuid, username: &str) -> String {
    test_keys()
        .issue(user_id, Some(username.to_string()), DEFAULT_TOKEN_TTL)
        .expect("Failed to generate test token")
}

/// Create authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}
