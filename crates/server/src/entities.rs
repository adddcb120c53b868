//! Entity API endpoints

use api_types::entity::{EntityDetail, EntityList, EntityNew, EntityRef, EntityView};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};
use engine::entities;

pub(crate) fn entity_view(entity: entities::Model) -> EntityView {
    EntityView {
        id: entity.id,
        name: entity.name,
        kind: entity.kind,
        province: entity.province,
        main_entity_id: entity.main_entity_id,
        created_at: entity.created_at,
        updated_at: entity.updated_at,
    }
}

fn entity_ref(reference: engine::EntityRef) -> EntityRef {
    EntityRef {
        id: reference.id,
        name: reference.name,
    }
}

fn entity_detail(overview: engine::EntityOverview) -> EntityDetail {
    EntityDetail {
        entity: entity_view(overview.entity),
        main_entity: overview.main_entity.map(entity_ref),
        sub_entities: overview.sub_entities.into_iter().map(entity_ref).collect(),
        income_count: overview.income_count,
    }
}

/// Handle requests for listing entities, optionally narrowed by kind or
/// province.
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<EntityList>,
) -> Result<Json<Vec<EntityDetail>>, ServerError> {
    let overviews = state
        .engine
        .list_entities(engine::EntityFilter {
            kind: query.kind,
            province: query.province,
        })
        .await?;

    Ok(Json(overviews.into_iter().map(entity_detail).collect()))
}

/// Handle requests for creating an entity.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<EntityNew>,
) -> Result<(StatusCode, Json<EntityDetail>), ServerError> {
    let overview = state
        .engine
        .create_entity(engine::NewEntity {
            name: payload.name,
            kind: payload.kind,
            province: payload.province,
            main_entity_id: payload.main_entity_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(entity_detail(overview))))
}
