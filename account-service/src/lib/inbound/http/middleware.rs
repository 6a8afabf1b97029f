use auth::TokenKind;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use super::cookies::read_incoming_token;
use super::handlers::ApiError;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;
use crate::session::errors::SessionError;
use crate::session::errors::UnauthorizedReason;

/// Extension type to store the authenticated user in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Middleware that validates the access token and adds the user to request
/// extensions.
///
/// The token is read from the `accessToken` cookie, then from an
/// `Authorization: Bearer` header.
pub async fn authenticate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = bearer_token(req.headers());
    let token = read_incoming_token(&jar, bearer, TokenKind::Access)
        .ok_or(SessionError::Unauthorized(UnauthorizedReason::MissingToken))?;

    let verified = state
        .token_issuer
        .verify(&token, TokenKind::Access)
        .map_err(|e| {
            tracing::warn!(error = %e, "Access token rejected");
            SessionError::from(e)
        })?;

    let user_id = UserId::from_string(&verified.subject).map_err(|e| {
        tracing::error!(error = %e, "Access token subject is not a user id");
        SessionError::Unauthorized(UnauthorizedReason::InvalidToken)
    })?;

    req.extensions_mut().insert(AuthenticatedUser { user_id });

    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}
