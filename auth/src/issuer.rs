use chrono::Duration;
use thiserror::Error;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;

/// The two classes of session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Why a presented token was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Token is invalid: {0}")]
    Invalid(String),

    #[error("Token is expired")]
    Expired,
}

impl From<JwtError> for VerificationError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::TokenExpired => VerificationError::Expired,
            other => VerificationError::Invalid(other.to_string()),
        }
    }
}

/// A token that passed signature and expiry checks.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedToken {
    pub subject: String,
    pub claims: Claims,
}

/// Freshly minted access/refresh pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Secret and lifetime for one token class.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret: Vec<u8>,
    pub ttl: Duration,
}

impl TokenSettings {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }
}

/// Issues and verifies access and refresh tokens.
///
/// Each class has its own secret, so an access token never verifies as a
/// refresh token and vice versa. Issuing is a pure function of the payload,
/// the secret and the clock; nothing is stored here.
pub struct TokenIssuer {
    access: JwtHandler,
    access_ttl: Duration,
    refresh: JwtHandler,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(access: TokenSettings, refresh: TokenSettings) -> Self {
        Self {
            access: JwtHandler::new(&access.secret),
            access_ttl: access.ttl,
            refresh: JwtHandler::new(&refresh.secret),
            refresh_ttl: refresh.ttl,
        }
    }

    /// Issue a short-lived access token for `user_id`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue_access_token(
        &self,
        user_id: impl ToString,
        username: &str,
    ) -> Result<String, JwtError> {
        let claims =
            Claims::for_subject(user_id, self.access_ttl).with_extra("username", username);
        self.access.encode(&claims)
    }

    /// Issue a long-lived refresh token for `user_id`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue_refresh_token(&self, user_id: impl ToString) -> Result<String, JwtError> {
        let claims = Claims::for_subject(user_id, self.refresh_ttl);
        self.refresh.encode(&claims)
    }

    /// Issue both tokens for a new session or a rotation.
    pub fn issue_pair(
        &self,
        user_id: impl ToString,
        username: &str,
    ) -> Result<TokenPair, JwtError> {
        let user_id = user_id.to_string();

        Ok(TokenPair {
            access_token: self.issue_access_token(&user_id, username)?,
            refresh_token: self.issue_refresh_token(&user_id)?,
        })
    }

    /// Check signature and expiry of `token` against the secret for `kind`.
    ///
    /// # Errors
    /// * `Invalid` - Bad signature, wrong token class or malformed token
    /// * `Expired` - Token expired
    pub fn verify(
        &self,
        token: &str,
        kind: TokenKind,
    ) -> Result<VerifiedToken, VerificationError> {
        let handler = match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        };

        let claims: Claims = handler.decode(token)?;

        Ok(VerifiedToken {
            subject: claims.sub.clone(),
            claims,
        })
    }
}
