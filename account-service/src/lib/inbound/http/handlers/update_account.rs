use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::FullName;
use crate::domain::user::models::UpdateAccountCommand;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::EmailError;
use crate::user::errors::FullNameError;

pub async fn update_account(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(body): Json<UpdateAccountRequest>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    state
        .user_service
        .update_account(&auth_user.user_id, body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

/// HTTP request body for updating the account (all fields optional)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpdateAccountRequest {
    #[serde(alias = "fullName")]
    full_name: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Clone, Error)]
enum ParseUpdateAccountRequestError {
    #[error("At least one field is required")]
    Empty,

    #[error("Invalid full name: {0}")]
    FullName(#[from] FullNameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),
}

impl UpdateAccountRequest {
    fn try_into_command(self) -> Result<UpdateAccountCommand, ParseUpdateAccountRequestError> {
        if self.full_name.is_none() && self.email.is_none() {
            return Err(ParseUpdateAccountRequestError::Empty);
        }

        Ok(UpdateAccountCommand {
            full_name: self.full_name.map(FullName::new).transpose()?,
            email: self.email.map(EmailAddress::new).transpose()?,
        })
    }
}

impl From<ParseUpdateAccountRequestError> for ApiError {
    fn from(err: ParseUpdateAccountRequestError) -> Self {
        match err {
            ParseUpdateAccountRequestError::Empty => ApiError::BadRequest(err.to_string()),
            _ => ApiError::UnprocessableEntity(err.to_string()),
        }
    }
}
