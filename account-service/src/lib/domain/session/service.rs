use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordError;
use auth::PasswordHasher;
use auth::TokenIssuer;
use auth::TokenKind;
use auth::TokenPair;

use crate::domain::session::errors::SessionError;
use crate::domain::session::errors::UnauthorizedReason;
use crate::domain::session::models::ChangePasswordCommand;
use crate::domain::session::models::LoginCommand;
use crate::domain::session::models::Session;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::user::models::UserId;
use crate::user::ports::UserRepository;

/// Session manager: login, logout, refresh-token rotation and password change.
///
/// Holds no session state of its own. The live refresh token is a column on
/// the user row and every transition is one single-row write. Rotation is a
/// conditional swap on the presented token, so of two refreshes racing with
/// the same token only one succeeds, and a revoked token is never revived.
pub struct SessionService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    token_issuer: Arc<TokenIssuer>,
    password_hasher: PasswordHasher,
}

impl<UR> SessionService<UR>
where
    UR: UserRepository,
{
    /// Create a new session service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential store
    /// * `token_issuer` - Access/refresh token issuer
    /// * `password_hasher` - Hasher for password checks and password changes
    pub fn new(
        repository: Arc<UR>,
        token_issuer: Arc<TokenIssuer>,
        password_hasher: PasswordHasher,
    ) -> Self {
        Self {
            repository,
            token_issuer,
            password_hasher,
        }
    }
}

#[async_trait]
impl<UR> SessionServicePort for SessionService<UR>
where
    UR: UserRepository,
{
    async fn login(&self, command: LoginCommand) -> Result<Session, SessionError> {
        let user = self
            .repository
            .find_by_username_or_email(&command.identifier)
            .await?
            .ok_or_else(|| SessionError::NotFound(command.identifier.clone()))?;

        self.password_hasher
            .verify(&command.password, &user.password_hash)
            .map_err(|e| match e {
                PasswordError::Mismatch => {
                    tracing::warn!(user_id = %user.id, "Login rejected: password mismatch");
                    SessionError::Unauthorized(UnauthorizedReason::InvalidCredentials)
                }
                other => SessionError::Password(other),
            })?;

        let tokens = self
            .token_issuer
            .issue_pair(user.id, user.username.as_str())?;

        let user = self
            .repository
            .update_refresh_token(&user.id, Some(tokens.refresh_token.clone()))
            .await?;

        tracing::info!(user_id = %user.id, "Session opened");

        Ok(Session { user, tokens })
    }

    async fn logout(&self, user_id: &UserId) -> Result<(), SessionError> {
        self.repository.update_refresh_token(user_id, None).await?;

        tracing::info!(user_id = %user_id, "Session closed");

        Ok(())
    }

    async fn refresh(&self, presented: Option<String>) -> Result<TokenPair, SessionError> {
        let presented = presented
            .filter(|token| !token.is_empty())
            .ok_or(SessionError::Unauthorized(UnauthorizedReason::MissingToken))?;

        let verified = self
            .token_issuer
            .verify(&presented, TokenKind::Refresh)
            .map_err(|e| {
                tracing::warn!(error = %e, "Refresh rejected: token failed verification");
                SessionError::from(e)
            })?;

        let user_id = UserId::from_string(&verified.subject)
            .map_err(|_| SessionError::Unauthorized(UnauthorizedReason::InvalidToken))?;

        let user = self
            .repository
            .find_by_id(&user_id)
            .await?
            .ok_or(SessionError::Unauthorized(UnauthorizedReason::UnknownUser))?;

        if !user.holds_refresh_token(&presented) {
            tracing::warn!(user_id = %user_id, "Refresh rejected: token is not the live one");
            return Err(SessionError::Unauthorized(UnauthorizedReason::Stale));
        }

        let tokens = self
            .token_issuer
            .issue_pair(user.id, user.username.as_str())?;

        // A logout, password change or other rotation may have landed since
        // the read above; the store only swaps if `presented` is still live.
        self.repository
            .rotate_refresh_token(&user.id, &presented, tokens.refresh_token.clone())
            .await?
            .ok_or_else(|| {
                tracing::warn!(
                    user_id = %user_id,
                    "Refresh rejected: token revoked during rotation"
                );
                SessionError::Unauthorized(UnauthorizedReason::Stale)
            })?;

        tracing::info!(user_id = %user.id, "Refresh token rotated");

        Ok(tokens)
    }

    async fn change_password(
        &self,
        user_id: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), SessionError> {
        if command.new_password.trim().is_empty() {
            return Err(SessionError::Validation(
                "new password must not be empty".to_string(),
            ));
        }

        let user = self
            .repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| SessionError::NotFound(user_id.to_string()))?;

        self.password_hasher
            .verify(&command.old_password, &user.password_hash)
            .map_err(|e| match e {
                PasswordError::Mismatch => SessionError::IncorrectPassword,
                other => SessionError::Password(other),
            })?;

        let password_hash = self.password_hasher.hash(&command.new_password)?;
        self.repository
            .update_password_hash(user_id, &password_hash)
            .await?;

        tracing::info!(user_id = %user_id, "Password changed, refresh token revoked");

        Ok(())
    }
}
