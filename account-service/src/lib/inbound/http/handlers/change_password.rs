use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::session::models::ChangePasswordCommand;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::cookies::clear_session_cookies;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Replace the password. The live refresh token is revoked with it, so the
/// caller's cookies are cleared as well.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    jar: CookieJar,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<(CookieJar, ApiSuccess<()>), ApiError> {
    state
        .session_service
        .change_password(&auth_user.user_id, body.into())
        .await?;

    Ok((clear_session_cookies(jar), ApiSuccess::new(StatusCode::OK, ())))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(alias = "oldPassword")]
    old_password: String,
    #[serde(alias = "newPassword")]
    new_password: String,
}

impl From<ChangePasswordRequest> for ChangePasswordCommand {
    fn from(request: ChangePasswordRequest) -> Self {
        Self {
            old_password: request.old_password,
            new_password: request.new_password,
        }
    }
}
