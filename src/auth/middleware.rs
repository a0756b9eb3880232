use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::auth::{dtos::ErrorResponse, jwt::JwtService};

/// The caller, as identified by a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl AuthenticatedUser {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<JwtService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());
        let jwt_service = Arc::<JwtService>::from_ref(state);

        async move {
            let auth_header = auth_header.ok_or(AuthError::MissingToken)?;

            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or(AuthError::InvalidTokenFormat)?;

            let claims = jwt_service.verify_token(token).map_err(|e| {
                debug!(error = %e, "Rejected bearer token");
                AuthError::InvalidToken
            })?;

            let user_id = claims.user_id().map_err(|_| AuthError::InvalidToken)?;

            Ok(AuthenticatedUser::new(user_id))
        }
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidTokenFormat,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "Missing authorization token",
            AuthError::InvalidTokenFormat => "Invalid token format",
            AuthError::InvalidToken => "Invalid or expired token",
        };

        (StatusCode::UNAUTHORIZED, Json(ErrorResponse::new(message))).into_response()
    }
}
