//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::warn;

use crate::{AppState, error::ApiError};
use tally_shared::{AppError, Claims, JwtError, types::UserId};

fn unauthenticated(message: &str) -> Response {
    ApiError::from(AppError::Unauthenticated(message.to_string())).into_response()
}

/// Authentication middleware that validates JWT tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Stores the claims in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let Ok(TypedHeader(Authorization(bearer))) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(&mut parts, &state).await
    else {
        return unauthenticated("Authorization header with Bearer token is required");
    };

    match state.jwt_service.validate_token(bearer.token()) {
        Ok(claims) => {
            parts.extensions.insert(claims);
            next.run(Request::from_parts(parts, body)).await
        }
        Err(JwtError::Expired) => unauthenticated("Token has expired"),
        Err(e) => {
            warn!(error = %e, "Rejected bearer token");
            unauthenticated("Invalid or malformed token")
        }
    }
}

/// Extractor for the authenticated caller.
///
/// Only valid behind [`auth_middleware`]; the user id it carries is passed
/// explicitly to every repository call that scopes by owner.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the caller's user id.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.0.user_id()
    }

    /// Returns the inner claims.
    #[must_use]
    pub const fn claims(&self) -> &Claims {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthenticated("Authentication required".to_string()).into())
    }
}
