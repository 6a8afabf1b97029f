use async_trait::async_trait;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::FullName;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::UpdateAccountCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user with validated profile fields.
    ///
    /// # Arguments
    /// * `command` - Validated registration command
    ///
    /// # Returns
    /// Created user entity (logged out: no refresh token)
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn register_user(&self, command: RegisterUserCommand) -> Result<User, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Update the user's display name and/or email.
    ///
    /// # Arguments
    /// * `id` - User ID to update
    /// * `command` - Command with optional full name and email fields
    ///
    /// # Returns
    /// Updated user entity
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update_account(
        &self,
        id: &UserId,
        command: UpdateAccountCommand,
    ) -> Result<User, UserError>;
}

/// Credential store: persistence operations for the user aggregate.
///
/// Every method that writes is a single-row update, so concurrent writers to
/// the same user never observe a half-applied change.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve the user whose username or email equals `identifier`.
    ///
    /// Comparison is case-insensitive. When several rows match, the oldest
    /// account wins.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username_or_email(&self, identifier: &str)
        -> Result<Option<User>, UserError>;

    /// Overwrite the profile fields of an existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update_profile(
        &self,
        id: &UserId,
        full_name: &FullName,
        email: &EmailAddress,
    ) -> Result<User, UserError>;

    /// Set (`Some`) or clear (`None`) the live refresh token.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_refresh_token(
        &self,
        id: &UserId,
        refresh_token: Option<String>,
    ) -> Result<User, UserError>;

    /// Swap the live refresh token for `next`, but only while `current` is
    /// still the stored value.
    ///
    /// The comparison and the write are one statement, so a logout or
    /// password change that lands first is never overwritten.
    ///
    /// # Returns
    /// Updated user, or `None` when `current` is no longer stored (or the
    /// user does not exist)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn rotate_refresh_token(
        &self,
        id: &UserId,
        current: &str,
        next: String,
    ) -> Result<Option<User>, UserError>;

    /// Replace the password hash and revoke the live refresh token.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<User, UserError>;
}
