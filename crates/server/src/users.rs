//! User management API endpoints

use api_types::Message;
use api_types::user::{UserDetail, UserNew, UserUpdate, UserView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};
use engine::{EngineError, users};

/// Strip the password hash before a user crosses the wire.
pub(crate) fn user_view(user: users::Model) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
        email: user.email,
        phone: user.phone,
        name: user.name,
        role: user.role,
        is_active: user.is_active,
        is_approved: user.is_approved,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

fn user_detail(overview: engine::UserOverview) -> UserDetail {
    UserDetail {
        user: user_view(overview.user),
        security_question: overview.security_question,
        income_count: overview.income_count,
    }
}

fn require_admin(user: &users::Model) -> Result<(), ServerError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ServerError::from(EngineError::Forbidden))
    }
}

/// Handle registration requests. Open to anonymous callers; the account stays
/// unapproved until an admin flips the gate.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let question = payload
        .security_question
        .map(|question| engine::NewSecurityQuestion {
            question: question.question,
            answer: question.answer,
        });

    let user = state
        .engine
        .register(
            engine::NewUser {
                username: payload.username,
                email: payload.email,
                phone: payload.phone,
                name: payload.name,
                password: payload.password,
                role: payload.role,
            },
            question,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user_view(user))))
}

/// Handle requests for the full user listing. Admin only.
pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<UserDetail>>, ServerError> {
    require_admin(&user)?;

    let overviews = state.engine.list_users().await?;

    Ok(Json(overviews.into_iter().map(user_detail).collect()))
}

/// Handle requests for updating a user's role or gates. Admin only.
pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserDetail>, ServerError> {
    require_admin(&user)?;

    let updated = state
        .engine
        .update_user(
            &id,
            engine::UserPatch {
                is_active: payload.is_active,
                is_approved: payload.is_approved,
                role: payload.role,
            },
        )
        .await?;

    Ok(Json(user_detail(updated)))
}

/// Handle requests for deleting a user. Admin only.
pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Message>, ServerError> {
    require_admin(&user)?;

    state.engine.delete_user(&id).await?;

    Ok(Json(Message {
        message: "user deleted".to_string(),
    }))
}
