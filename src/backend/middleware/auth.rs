/**
 * Authentication Middleware
 *
 * Protects routes that require a caller identity. The middleware reads the
 * `Authorization: Bearer <token>` header, verifies the JWT and attaches an
 * `AuthenticatedUser` to the request extensions; handlers take it through
 * the `AuthUser` extractor.
 *
 * Rejection happens before the handler runs, so an unauthenticated poll
 * never opens a listener.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::backend::auth::SessionKeys;
use crate::backend::error::BackendError;

/// Authenticated user data extracted from JWT token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: Option<String>,
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Verify the bearer token and resolve the caller
pub fn authenticate(keys: &SessionKeys, headers: &HeaderMap) -> Result<AuthenticatedUser, BackendError> {
    let token = bearer_token(headers).ok_or_else(|| {
        tracing::warn!("[Auth] Missing or malformed Authorization header");
        BackendError::unauthorized("missing bearer token")
    })?;

    let claims = keys.verify(token).map_err(|e| {
        tracing::warn!("[Auth] Invalid token: {}", e);
        BackendError::unauthorized("invalid token")
    })?;

    let user_id = claims.user_id().map_err(|e| {
        tracing::warn!("[Auth] Invalid user ID in token: {}", e);
        BackendError::unauthorized("invalid token subject")
    })?;

    Ok(AuthenticatedUser {
        user_id,
        username: claims.username,
    })
}

/// Authentication middleware
///
/// Returns 401 if the token is missing or invalid.
pub async fn auth_middleware(
    State(keys): State<SessionKeys>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let user = authenticate(&keys, request.headers())?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Axum extractor for the user attached by `auth_middleware`
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("[Auth] AuthenticatedUser not found in request extensions");
                BackendError::unauthorized("not authenticated")
            })?;

        Ok(AuthUser(user))
    }
}
