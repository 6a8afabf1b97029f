use auth::TokenKind;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::TokensData;
use crate::domain::session::ports::SessionServicePort;
use crate::inbound::http::cookies::read_incoming_token;
use crate::inbound::http::cookies::set_session_cookies;
use crate::inbound::http::router::AppState;

/// Rotate the refresh token. The presented token comes from the
/// `refreshToken` cookie or, failing that, the JSON body.
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshTokenRequest>>,
) -> Result<(CookieJar, ApiSuccess<TokensData>), ApiError> {
    let fallback = body.and_then(|Json(body)| body.refresh_token);
    let presented = read_incoming_token(&jar, fallback, TokenKind::Refresh);

    let tokens = state.session_service.refresh(presented).await?;

    let jar = set_session_cookies(jar, &tokens);
    Ok((jar, ApiSuccess::new(StatusCode::OK, tokens.into())))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RefreshTokenRequest {
    #[serde(alias = "refreshToken")]
    refresh_token: Option<String>,
}
