//! Entities table.
//!
//! An entity is an income-source organization. `main_entity_id` points at the
//! parent entity and is one level deep: a sub-entity never has sub-entities of
//! its own in practice, though the schema does not forbid it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{EngineError, FieldIssue};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Main,
    Sub,
    Employee,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "MAIN",
            Self::Sub => "SUB",
            Self::Employee => "EMPLOYEE",
        }
    }
}

impl TryFrom<&str> for EntityKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "MAIN" => Ok(Self::Main),
            "SUB" => Ok(Self::Sub),
            "EMPLOYEE" => Ok(Self::Employee),
            other => Err(EngineError::Validation(vec![FieldIssue::new(
                "type",
                format!("unknown entity type: {other}"),
            )])),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "entities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub kind: String,
    pub province: Option<String>,
    pub main_entity_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::MainEntityId",
        to = "Column::Id"
    )]
    MainEntity,
    #[sea_orm(has_many = "super::incomes::Entity")]
    Incomes,
}

impl Related<super::incomes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Incomes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
