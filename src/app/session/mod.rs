//! Identification of the acting user.
//!
//! Login and sessions live outside this service; callers forward the
//! authenticated user's ID in the `x-user-id` header.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::app::{access::Principal, error::AppError, tenant, AppState};

pub const USER_HEADER: &str = "x-user-id";

/// The user a request acts on behalf of. Rejects with 401 when the header is
/// missing, malformed, or names an unknown user.
#[derive(Debug, Clone)]
pub struct ActingUser(pub Principal);

#[axum::async_trait]
impl FromRequestParts<AppState> for ActingUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts
            .headers
            .get(USER_HEADER)
            .and_then(|value| value.to_str().ok())
        else {
            tracing::debug!("request without acting user");
            return Err(AppError::Unauthorized);
        };

        let principal = tenant::load_principal(&state.db, raw.trim())
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(ActingUser(principal))
    }
}
