//! Incomes table.
//!
//! Each income is a monthly amount owed by an entity, recorded by a user.
//! `month` and `year` are stored independently from `due_date` so entries can
//! be booked against a period regardless of when they fall due.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{EngineError, FieldIssue};

/// The five accepted income categories.
///
/// `label` is the fixed Arabic wording used by the reporting payloads; clients
/// chart it verbatim, so it must not change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncomeKind {
    Subscription,
    LegalFees,
    Penalties,
    Automation,
    Other,
}

impl IncomeKind {
    pub const ALL: [Self; 5] = [
        Self::Subscription,
        Self::LegalFees,
        Self::Penalties,
        Self::Automation,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Subscription => "SUBSCRIPTION",
            Self::LegalFees => "LEGAL_FEES",
            Self::Penalties => "PENALTIES",
            Self::Automation => "AUTOMATION",
            Self::Other => "OTHER",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Subscription => "اشتراكات",
            Self::LegalFees => "اتعاب محاماة",
            Self::Penalties => "جزاءات",
            Self::Automation => "ميكنة",
            Self::Other => "أخرى",
        }
    }
}

impl TryFrom<&str> for IncomeKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "SUBSCRIPTION" => Ok(Self::Subscription),
            "LEGAL_FEES" => Ok(Self::LegalFees),
            "PENALTIES" => Ok(Self::Penalties),
            "AUTOMATION" => Ok(Self::Automation),
            "OTHER" => Ok(Self::Other),
            other => Err(EngineError::Validation(vec![FieldIssue::new(
                "type",
                format!("unknown income type: {other}"),
            )])),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "incomes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub amount: f64,
    pub due_date: DateTimeUtc,
    pub month: i32,
    pub year: i32,
    pub kind: String,
    pub description: Option<String>,
    pub gp_number: Option<String>,
    pub entity_id: String,
    pub user_id: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::entities::Entity",
        from = "Column::EntityId",
        to = "super::entities::Column::Id"
    )]
    Entity,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::entities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entity.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
