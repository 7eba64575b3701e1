use crate::{
    accounts::{Accounts, RegisterOutcome},
    api::handlers::{ApiError, ErrorResponse, normalize_email, valid_email},
};
use axum::{Json, extract::Extension, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct UserRegister {
    pub email: String,
    #[serde(alias = "secret")]
    pub password: String,
    pub username: String,
}

impl fmt::Debug for UserRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRegister")
            .field("email", &self.email)
            .field("password", &"***")
            .field("username", &self.username)
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct RegisterResponse {
    pub success: bool,
    pub user_id: String,
    pub message: String,
}

impl From<RegisterOutcome> for RegisterResponse {
    fn from(outcome: RegisterOutcome) -> Self {
        let user_id = match &outcome {
            RegisterOutcome::Created { user_id } => user_id.to_string(),
            RegisterOutcome::EmailInUse | RegisterOutcome::Failed(_) => String::new(),
        };

        Self {
            success: outcome.is_success(),
            user_id,
            message: outcome.message(),
        }
    }
}

#[utoipa::path(
    post,
    path= "/user/register",
    request_body = UserRegister,
    responses (
        (status = 200, description = "Registration attempted; `success` tells whether the account was created", body = RegisterResponse, content_type = "application/json"),
        (status = 422, description = "Invalid payload", body = ErrorResponse),
        (status = 500, description = "Unexpected failure", body = ErrorResponse),
        (status = 503, description = "Credential store timed out", body = ErrorResponse),
    ),
    tag= "accounts"
)]
// axum handler for register
#[instrument(skip(accounts, payload))]
pub async fn register(
    accounts: Extension<Arc<Accounts>>,
    payload: Result<Json<UserRegister>, JsonRejection>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let Json(user) = payload?;

    debug!("user: {:?}", user);
    let email = normalize_email(&user.email);
    let username = user.username.trim();

    // if not valid email, password or username return 422
    if !valid_email(&email) {
        return Err(ApiError::Validation("Invalid email".to_string()));
    }

    if user.password.is_empty() {
        return Err(ApiError::Validation("Invalid password".to_string()));
    }

    if username.is_empty() {
        return Err(ApiError::Validation("Invalid username".to_string()));
    }

    let outcome = accounts.register(&email, &user.password, username).await?;

    Ok(Json(outcome.into()))
}
