use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::FullName;
use crate::domain::user::models::MediaUrl;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    full_name: String,
    avatar: String,
    cover_image: Option<String>,
    password_hash: String,
    refresh_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(r.id),
            username: Username::new(r.username)?,
            email: EmailAddress::new(r.email)?,
            full_name: FullName::new(r.full_name)?,
            avatar: MediaUrl::new(r.avatar)?,
            cover_image: r.cover_image.map(MediaUrl::new).transpose()?,
            password_hash: r.password_hash,
            refresh_token: r.refresh_token,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Translate unique-constraint violations into domain conflicts.
fn map_write_error(e: sqlx::Error, username: &str, email: &str) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if db_err.constraint() == Some("users_username_key") {
                return UserError::UsernameAlreadyExists(username.to_string());
            }
            if db_err.constraint() == Some("users_email_key") {
                return UserError::EmailAlreadyExists(email.to_string());
            }
        }
    }
    UserError::DatabaseError(e.to_string())
}

fn into_updated_user(row: Option<UserRow>, id: &UserId) -> Result<User, UserError> {
    row.ok_or_else(|| UserError::NotFound(id.to_string()))?
        .try_into()
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, full_name, avatar, cover_image,
                               password_hash, refresh_token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id.0)
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(user.full_name.as_str())
        .bind(user.avatar.as_str())
        .bind(user.cover_image.as_ref().map(MediaUrl::as_str))
        .bind(&user.password_hash)
        .bind(user.refresh_token.as_deref())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, user.username.as_str(), user.email.as_str()))?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, full_name, avatar, cover_image,
                   password_hash, refresh_token, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, full_name, avatar, cover_image,
                   password_hash, refresh_token, created_at, updated_at
            FROM users
            WHERE username = LOWER($1) OR email = LOWER($1)
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(identifier.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn update_profile(
        &self,
        id: &UserId,
        full_name: &FullName,
        email: &EmailAddress,
    ) -> Result<User, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET full_name = $2, email = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, email, full_name, avatar, cover_image,
                      password_hash, refresh_token, created_at, updated_at
            "#,
        )
        .bind(id.0)
        .bind(full_name.as_str())
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "", email.as_str()))?;

        into_updated_user(row, id)
    }

    async fn update_refresh_token(
        &self,
        id: &UserId,
        refresh_token: Option<String>,
    ) -> Result<User, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET refresh_token = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, email, full_name, avatar, cover_image,
                      password_hash, refresh_token, created_at, updated_at
            "#,
        )
        .bind(id.0)
        .bind(refresh_token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        into_updated_user(row, id)
    }

    async fn rotate_refresh_token(
        &self,
        id: &UserId,
        current: &str,
        next: String,
    ) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET refresh_token = $3, updated_at = NOW()
            WHERE id = $1 AND refresh_token = $2
            RETURNING id, username, email, full_name, avatar, cover_image,
                      password_hash, refresh_token, created_at, updated_at
            "#,
        )
        .bind(id.0)
        .bind(current)
        .bind(next)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<User, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET password_hash = $2, refresh_token = NULL, updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, email, full_name, avatar, cover_image,
                      password_hash, refresh_token, created_at, updated_at
            "#,
        )
        .bind(id.0)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        into_updated_user(row, id)
    }
}
