use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::session::models::LoginCommand;
use crate::domain::session::models::Session;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::cookies::set_session_cookies;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, ApiSuccess<LoginResponseData>), ApiError> {
    let session = state.session_service.login(body.try_into_command()?).await?;

    let jar = set_session_cookies(jar, &session.tokens);
    Ok((jar, ApiSuccess::new(StatusCode::OK, session.into())))
}

/// HTTP request body for login. Either `username` or `email` identifies the
/// account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

impl LoginRequest {
    fn try_into_command(self) -> Result<LoginCommand, ApiError> {
        let identifier = self
            .username
            .into_iter()
            .chain(self.email)
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Username or email is required".to_string()))?;

        let password = self
            .password
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Password is required".to_string()))?;

        Ok(LoginCommand { identifier, password })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub user: UserData,
    pub access_token: String,
    pub refresh_token: String,
}

impl From<Session> for LoginResponseData {
    fn from(session: Session) -> Self {
        Self {
            user: UserData::from(&session.user),
            access_token: session.tokens.access_token,
            refresh_token: session.tokens.refresh_token,
        }
    }
}
