//! Caller identity. Sessions are verified upstream; the proxy forwards the user id in a header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use inbox_core::User;

use crate::error::ApiError;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller. Extraction fails with 401 when the header is absent or unknown.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let user = state.users.authenticate(user_id.as_deref()).await?;
        Ok(CurrentUser(user))
    }
}
