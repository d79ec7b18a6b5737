//! JWT extractors
//!
//! `CurrentUser` validates the bearer token and injects the caller identity;
//! `AdminUser` additionally requires the admin role. Handlers declare the
//! strongest identity they need as an argument.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{CurrentUser, JwtService};
use crate::state::AppState;
use crate::utils::AppError;

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Reuse an identity already extracted in this request
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(AppError::unauthorized)?;

        let token = JwtService::extract_from_header(header).ok_or_else(AppError::unauthorized)?;

        let claims = state.jwt.validate_token(token).map_err(|e| {
            tracing::debug!(error = %e, "JWT validation failed");
            AppError::unauthorized()
        })?;

        let user = CurrentUser::from(claims);
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Caller identity with the admin role enforced
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::forbidden("Admin access required"));
        }
        Ok(AdminUser(user))
    }
}
