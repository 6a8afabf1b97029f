use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::FullName;
use crate::domain::user::models::MediaUrl;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;
use crate::user::errors::EmailError;
use crate::user::errors::FullNameError;
use crate::user::errors::MediaUrlError;
use crate::user::errors::UsernameError;

pub async fn register_user(
    State(state): State<AppState>,
    Json(body): Json<RegisterUserRequest>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    state
        .user_service
        .register_user(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for registration (raw JSON).
///
/// Fields are optional at the wire level so that a missing field is reported
/// as a 400 rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegisterUserRequest {
    #[serde(alias = "fullName")]
    full_name: Option<String>,
    email: Option<String>,
    #[serde(alias = "userName")]
    username: Option<String>,
    password: Option<String>,
    avatar: Option<String>,
    #[serde(alias = "coverImage")]
    cover_image: Option<String>,
}

#[derive(Debug, Clone, Error)]
enum ParseRegisterUserRequestError {
    #[error("All fields are required")]
    MissingField,

    #[error("Invalid username: {0}")]
    Username(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Invalid full name: {0}")]
    FullName(#[from] FullNameError),

    #[error("Invalid media reference: {0}")]
    Media(#[from] MediaUrlError),
}

fn required(field: Option<String>) -> Result<String, ParseRegisterUserRequestError> {
    field
        .filter(|value| !value.trim().is_empty())
        .ok_or(ParseRegisterUserRequestError::MissingField)
}

impl RegisterUserRequest {
    fn try_into_command(self) -> Result<RegisterUserCommand, ParseRegisterUserRequestError> {
        let full_name = required(self.full_name)?;
        let email = required(self.email)?;
        let username = required(self.username)?;
        let password = required(self.password)?;
        let avatar = required(self.avatar)?;

        Ok(RegisterUserCommand {
            username: Username::new(username)?,
            email: EmailAddress::new(email)?,
            full_name: FullName::new(full_name)?,
            avatar: MediaUrl::new(avatar)?,
            cover_image: self
                .cover_image
                .filter(|value| !value.trim().is_empty())
                .map(MediaUrl::new)
                .transpose()?,
            password,
        })
    }
}

impl From<ParseRegisterUserRequestError> for ApiError {
    fn from(err: ParseRegisterUserRequestError) -> Self {
        match err {
            ParseRegisterUserRequestError::MissingField => ApiError::BadRequest(err.to_string()),
            _ => ApiError::UnprocessableEntity(err.to_string()),
        }
    }
}
