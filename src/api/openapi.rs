#![allow(clippy::needless_for_each)]

use super::handlers::{
    self, ErrorResponse,
    health::Health,
    refine_prompt::{RefinePrompt, RefinePromptResponse},
    user_login::{LoginResponse, UserLogin},
    user_register::{RegisterResponse, UserRegister},
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::user_register::register,
        handlers::user_login::login,
        handlers::refine_prompt::refine
    ),
    components(schemas(
        Health,
        UserRegister,
        RegisterResponse,
        UserLogin,
        LoginResponse,
        RefinePrompt,
        RefinePromptResponse,
        ErrorResponse
    )),
    tags(
        (name = "accounts", description = "Registration and login"),
        (name = "prompts", description = "Prompt refinement"),
        (name = "health", description = "Service and credential store health")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
