use axum::{Json, extract::State};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use quiz_auth::create_api_token;
use quiz_core::AppError;
use quiz_models::{ApiLoginRequest, ApiTokenResponse, User};

use crate::middleware::autoload::Loaded;
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Exchange local credentials for an API token
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = ApiLoginRequest,
    responses(
        (status = 200, description = "Token issued", body = ApiTokenResponse),
        (status = 400, description = "Bad request - validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto), fields(user.username = %dto.username))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ApiLoginRequest>,
) -> Result<Json<ApiTokenResponse>, AppError> {
    let Some(user) = UserService::authenticate(&state.db, &dto.username, &dto.password).await?
    else {
        warn!("API login failed");
        return Err(AppError::unauthorized(anyhow::anyhow!(
            "Authentication has failed"
        )));
    };

    let token = create_api_token(user.id.into_inner(), &user.username, &state.config.jwt)?;
    info!(user.id = %user.id, "API token issued");
    Ok(Json(ApiTokenResponse { token }))
}

/// List all users
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(UserService::list_users(&state.db).await?))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/api/users/{userId}",
    params(("userId" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn show_user(loaded: Loaded) -> Result<Json<User>, AppError> {
    Ok(Json(loaded.user()?.clone()))
}

/// Get the owner of the presented token
#[utoipa::path(
    get,
    path = "/api/users/tokenOwner",
    responses(
        (status = 200, description = "The token owner", body = User),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn token_owner(loaded: Loaded) -> Result<Json<User>, AppError> {
    Ok(Json(loaded.user()?.clone()))
}
