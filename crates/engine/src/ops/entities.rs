use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{EntityKind, ResultEngine, entities, incomes};

use super::{Engine, finish_validation, normalize_optional_text, require_text, with_tx};

/// Payload for creating an entity.
#[derive(Clone, Debug)]
pub struct NewEntity {
    pub name: String,
    pub province: String,
    pub main_entity_id: Option<String>,
    /// Entity type; defaults to `MAIN` when absent.
    pub kind: Option<String>,
}

/// Listing filter; `None` means "any".
#[derive(Clone, Debug, Default)]
pub struct EntityFilter {
    pub province: Option<String>,
    pub kind: Option<String>,
}

/// Bare `{id, name}` reference to a related entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
}

/// An entity with its place in the hierarchy and its income count.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityOverview {
    pub entity: entities::Model,
    pub main_entity: Option<EntityRef>,
    pub sub_entities: Vec<EntityRef>,
    pub income_count: u64,
}

impl Engine {
    /// Create an entity. A supplied `main_entity_id` must resolve to an
    /// existing entity.
    pub async fn create_entity(&self, new_entity: NewEntity) -> ResultEngine<EntityOverview> {
        let mut issues = Vec::new();
        let name = require_text(&new_entity.name, "name", &mut issues);
        let province = require_text(&new_entity.province, "province", &mut issues);
        let main_entity_id = normalize_optional_text(new_entity.main_entity_id.as_deref());
        let kind = match normalize_optional_text(new_entity.kind.as_deref()) {
            None => EntityKind::Main,
            Some(raw) => EntityKind::try_from(raw.as_str())?,
        };
        finish_validation(issues)?;

        let now = Utc::now();
        with_tx!(self, |db_tx| {
            if let Some(parent_id) = &main_entity_id {
                self.require_main_entity(&db_tx, parent_id).await?;
            }

            let entity = entities::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                name: ActiveValue::Set(name.clone()),
                kind: ActiveValue::Set(kind.as_str().to_string()),
                province: ActiveValue::Set(Some(province.clone())),
                main_entity_id: ActiveValue::Set(main_entity_id.clone()),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            self.entity_overview(&db_tx, entity).await
        })
    }

    /// Entities matching `filter`, ordered by name, each with parent,
    /// immediate sub-entities and income count.
    pub async fn list_entities(&self, filter: EntityFilter) -> ResultEngine<Vec<EntityOverview>> {
        let kind = match normalize_optional_text(filter.kind.as_deref()) {
            None => None,
            Some(raw) => Some(EntityKind::try_from(raw.as_str())?),
        };
        let province = normalize_optional_text(filter.province.as_deref());

        with_tx!(self, |db_tx| {
            let mut query = entities::Entity::find().order_by_asc(entities::Column::Name);
            if let Some(province) = &province {
                query = query.filter(entities::Column::Province.eq(province.clone()));
            }
            if let Some(kind) = kind {
                query = query.filter(entities::Column::Kind.eq(kind.as_str().to_string()));
            }

            let rows = query.all(&db_tx).await?;
            let mut out = Vec::with_capacity(rows.len());
            for entity in rows {
                let overview = self.entity_overview(&db_tx, entity).await?;
                out.push(overview);
            }
            Ok(out)
        })
    }

    async fn entity_overview(
        &self,
        db_tx: &DatabaseTransaction,
        entity: entities::Model,
    ) -> ResultEngine<EntityOverview> {
        let main_entity = match entity.main_entity_id.as_deref() {
            Some(parent_id) => entities::Entity::find_by_id(parent_id.to_string())
                .one(db_tx)
                .await?
                .map(|parent| EntityRef {
                    id: parent.id,
                    name: parent.name,
                }),
            None => None,
        };
        let sub_entities = entities::Entity::find()
            .filter(entities::Column::MainEntityId.eq(entity.id.clone()))
            .order_by_asc(entities::Column::Name)
            .all(db_tx)
            .await?
            .into_iter()
            .map(|sub| EntityRef {
                id: sub.id,
                name: sub.name,
            })
            .collect();
        let income_count = incomes::Entity::find()
            .filter(incomes::Column::EntityId.eq(entity.id.clone()))
            .count(db_tx)
            .await?;

        Ok(EntityOverview {
            entity,
            main_entity,
            sub_entities,
            income_count,
        })
    }
}
