//! Authentication API endpoints

use api_types::auth::{LoginRequest, LoginResponse};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState, users};

/// Handle login requests. The response pairs the sanitized user with a fresh
/// bearer token.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServerError> {
    let outcome = state
        .engine
        .login(&payload.identifier, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        user: users::user_view(outcome.user),
        token: outcome.token,
    }))
}
