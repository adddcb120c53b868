//! Income API endpoints

use api_types::Message;
use api_types::income::{IncomeList, IncomeNew, IncomeUpdate, IncomeView, UserRef};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{ServerError, entities, server::ServerState};

fn income_view(record: engine::IncomeRecord) -> IncomeView {
    let income = record.income;

    IncomeView {
        id: income.id,
        amount: income.amount,
        due_date: income.due_date,
        month: income.month,
        year: income.year,
        kind: income.kind,
        description: income.description,
        gp_number: income.gp_number,
        entity_id: income.entity_id,
        user_id: income.user_id,
        created_at: income.created_at,
        updated_at: income.updated_at,
        entity: entities::entity_view(record.entity),
        user: UserRef {
            id: record.user.id,
            name: record.user.name,
            username: record.user.username,
        },
    }
}

/// Handle requests for listing incomes, optionally narrowed by month, year,
/// entity or kind.
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<IncomeList>,
) -> Result<Json<Vec<IncomeView>>, ServerError> {
    let records = state
        .engine
        .list_incomes(engine::IncomeFilter {
            month: query.month,
            year: query.year,
            entity_id: query.entity_id,
            kind: query.kind,
        })
        .await?;

    Ok(Json(records.into_iter().map(income_view).collect()))
}

/// Handle requests for recording an income.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<IncomeNew>,
) -> Result<(StatusCode, Json<IncomeView>), ServerError> {
    let record = state
        .engine
        .create_income(engine::NewIncome {
            amount: payload.amount,
            due_date: payload.due_date,
            entity_id: payload.entity_id,
            month: payload.month,
            year: payload.year,
            kind: payload.kind,
            description: payload.description,
            gp_number: payload.gp_number,
            user_id: payload.user_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(income_view(record))))
}

/// Handle requests for updating an income. Absent fields keep their stored
/// values.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<IncomeUpdate>,
) -> Result<Json<IncomeView>, ServerError> {
    let record = state
        .engine
        .update_income(
            &id,
            engine::IncomePatch {
                amount: payload.amount,
                due_date: payload.due_date,
                entity_id: payload.entity_id,
                month: payload.month,
                year: payload.year,
                kind: payload.kind,
                description: payload.description,
                gp_number: payload.gp_number,
            },
        )
        .await?;

    Ok(Json(income_view(record)))
}

/// Handle requests for deleting an income.
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_income(&id).await?;

    Ok(Json(Message {
        message: "income deleted".to_string(),
    }))
}
