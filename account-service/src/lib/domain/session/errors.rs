use std::fmt;

use thiserror::Error;

use crate::user::errors::UserError;

/// Diagnostic detail behind a 401.
///
/// Every reason surfaces as the same unauthorized class to clients; the
/// variant only changes the message and the log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthorizedReason {
    /// No token in cookie nor request body
    MissingToken,
    /// Bad signature, wrong token class or malformed token
    InvalidToken,
    /// Signature fine, `exp` in the past
    Expired,
    /// Token subject no longer exists
    UnknownUser,
    /// Token was superseded by a rotation or revoked by logout
    Stale,
    /// Password does not match at login
    InvalidCredentials,
}

impl fmt::Display for UnauthorizedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            UnauthorizedReason::MissingToken => "no token presented",
            UnauthorizedReason::InvalidToken => "invalid token",
            UnauthorizedReason::Expired => "token expired",
            UnauthorizedReason::UnknownUser => "token subject not found",
            UnauthorizedReason::Stale => "refresh token is expired or used",
            UnauthorizedReason::InvalidCredentials => "invalid credentials",
        };
        f.write_str(message)
    }
}

/// Top-level error for session operations
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Unauthorized: {0}")]
    Unauthorized(UnauthorizedReason),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Invalid old password")]
    IncorrectPassword,

    #[error("Invalid input: {0}")]
    Validation(String),

    // Infrastructure errors
    #[error("Token issuing failed: {0}")]
    Token(#[from] auth::JwtError),

    #[error("Password error: {0}")]
    Password(#[from] auth::PasswordError),

    #[error(transparent)]
    User(#[from] UserError),
}

impl From<auth::VerificationError> for SessionError {
    fn from(err: auth::VerificationError) -> Self {
        match err {
            auth::VerificationError::Expired => {
                SessionError::Unauthorized(UnauthorizedReason::Expired)
            }
            auth::VerificationError::Invalid(_) => {
                SessionError::Unauthorized(UnauthorizedReason::InvalidToken)
            }
        }
    }
}

impl SessionError {
    pub fn unauthorized_reason(&self) -> Option<UnauthorizedReason> {
        match self {
            SessionError::Unauthorized(reason) => Some(*reason),
            _ => None,
        }
    }
}
