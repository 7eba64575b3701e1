use crate::{
    accounts::{Accounts, LoginOutcome},
    api::handlers::{ApiError, ErrorResponse, normalize_email, valid_email},
};
use axum::{Json, extract::Extension, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct UserLogin {
    pub email: String,
    #[serde(alias = "secret")]
    pub password: String,
}

impl fmt::Debug for UserLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserLogin")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        let message = Some(outcome.message().to_string());
        match outcome {
            LoginOutcome::Authenticated { token } => Self {
                success: true,
                token,
                message,
            },
            LoginOutcome::UnknownUser | LoginOutcome::WrongPassword => Self {
                success: false,
                token: String::new(),
                message,
            },
        }
    }
}

#[utoipa::path(
    post,
    path= "/user/login",
    request_body = UserLogin,
    responses (
        (status = 200, description = "Login attempted; `token` is set only when `success` is true", body = LoginResponse, content_type = "application/json"),
        (status = 422, description = "Invalid payload", body = ErrorResponse),
        (status = 500, description = "Unexpected failure", body = ErrorResponse),
        (status = 503, description = "Credential store timed out", body = ErrorResponse),
    ),
    tag= "accounts"
)]
// axum handler for login
#[instrument(skip(accounts, payload))]
pub async fn login(
    accounts: Extension<Arc<Accounts>>,
    payload: Result<Json<UserLogin>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(user) = payload?;

    debug!("user: {:?}", user);
    let email = normalize_email(&user.email);

    if !valid_email(&email) {
        return Err(ApiError::Validation("Invalid email".to_string()));
    }

    if user.password.is_empty() {
        return Err(ApiError::Validation("Invalid password".to_string()));
    }

    let outcome = accounts.authenticate(&email, &user.password).await?;

    Ok(Json(outcome.into()))
}
