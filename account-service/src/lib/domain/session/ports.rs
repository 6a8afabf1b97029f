use async_trait::async_trait;
use auth::TokenPair;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::ChangePasswordCommand;
use crate::domain::session::models::LoginCommand;
use crate::domain::session::models::Session;
use crate::domain::user::models::UserId;

/// Port for the authenticated-session lifecycle.
///
/// Per user: `LoggedOut` --login--> `LoggedIn(t)` --refresh--> `LoggedIn(t')`
/// --logout--> `LoggedOut`. Only the most recently issued refresh token is
/// accepted.
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Verify credentials and open a new session.
    ///
    /// Overwrites any previous refresh token, which ends every other session
    /// of the same user.
    ///
    /// # Errors
    /// * `NotFound` - No user with this username or email
    /// * `Unauthorized(InvalidCredentials)` - Password does not match
    /// * `Token` / `Password` / `User` - Internal failures
    async fn login(&self, command: LoginCommand) -> Result<Session, SessionError>;

    /// Revoke the live refresh token. Succeeds when already logged out.
    ///
    /// # Errors
    /// * `User(NotFound)` - User does not exist
    /// * `User(DatabaseError)` - Database operation failed
    async fn logout(&self, user_id: &UserId) -> Result<(), SessionError>;

    /// Exchange the live refresh token for a fresh pair (rotation).
    ///
    /// # Arguments
    /// * `presented` - Token read from the transport, if any
    ///
    /// # Errors
    /// * `Unauthorized(MissingToken)` - Nothing presented
    /// * `Unauthorized(InvalidToken)` - Bad signature or malformed token
    /// * `Unauthorized(Expired)` - Token expired
    /// * `Unauthorized(UnknownUser)` - Token subject does not exist
    /// * `Unauthorized(Stale)` - Token is not the one currently stored
    async fn refresh(&self, presented: Option<String>) -> Result<TokenPair, SessionError>;

    /// Replace the password after checking the old one.
    ///
    /// Also revokes the live refresh token, so every session has to log in
    /// again with the new password.
    ///
    /// # Errors
    /// * `Validation` - New password is blank
    /// * `NotFound` - User does not exist
    /// * `IncorrectPassword` - Old password does not match
    async fn change_password(
        &self,
        user_id: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), SessionError>;
}
