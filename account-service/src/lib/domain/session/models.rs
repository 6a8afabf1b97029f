use auth::TokenPair;

use crate::domain::user::models::User;

/// Credentials presented at login.
///
/// `identifier` is matched against both username and email.
#[derive(Debug)]
pub struct LoginCommand {
    pub identifier: String,
    pub password: String,
}

#[derive(Debug)]
pub struct ChangePasswordCommand {
    pub old_password: String,
    pub new_password: String,
}

/// Result of a successful login: the user as now stored plus the tokens
/// whose refresh half is the user's live refresh token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub tokens: TokenPair,
}
