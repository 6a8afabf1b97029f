//! Session token transport.
//!
//! Tokens travel in `HttpOnly; Secure` cookies so scripts cannot read them and
//! browsers only send them over TLS. Clients that cannot hold cookies may put
//! the token in the request instead; the cookie always wins when both exist.

use auth::TokenKind;
use auth::TokenPair;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::cookie::SameSite;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

pub fn cookie_name(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Access => ACCESS_TOKEN_COOKIE,
        TokenKind::Refresh => REFRESH_TOKEN_COOKIE,
    }
}

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Token of `kind` from the cookie, falling back to `fallback` (a request
/// body field or header). Blank values count as absent.
pub fn read_incoming_token(
    jar: &CookieJar,
    fallback: Option<String>,
    kind: TokenKind,
) -> Option<String> {
    jar.get(cookie_name(kind))
        .and_then(|cookie| non_blank(cookie.value().to_string()))
        .or_else(|| fallback.and_then(non_blank))
}

pub fn set_session_cookies(jar: CookieJar, tokens: &TokenPair) -> CookieJar {
    jar.add(session_cookie(ACCESS_TOKEN_COOKIE, tokens.access_token.clone()))
        .add(session_cookie(REFRESH_TOKEN_COOKIE, tokens.refresh_token.clone()))
}

/// Expire both session cookies on the client.
pub fn clear_session_cookies(jar: CookieJar) -> CookieJar {
    [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE]
        .into_iter()
        .fold(jar, |jar, name| {
            let mut cookie = session_cookie(name, String::new());
            cookie.make_removal();
            jar.add(cookie)
        })
}
