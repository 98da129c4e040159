use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use uuid::Uuid;

use crate::auth::token;
use crate::errors::AppError;
use crate::state::AppState;

/// Extractor for the authenticated user behind `Authorization: Bearer <token>`.
/// The token itself is never handed to handlers, only the user id.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let bearer = header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;

        let user_id =
            token::verify(bearer, &state.config.jwt_secret).map_err(|_| AppError::Unauthorized)?;

        Ok(AuthUser(user_id))
    }
}
