use serde::{Deserialize, Serialize};

/// Error body returned by every failing endpoint.
///
/// `details` is only present on validation failures, itemizing the offending
/// fields.
#[derive(Debug, Serialize, Deserialize)]
pub struct Error {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        /// Username, email address or phone number; matched against all three.
        pub identifier: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub user: user::UserView,
        pub token: String,
    }
}

pub mod user {
    use super::*;
    use chrono::{DateTime, Utc};

    /// Registration payload.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserNew {
        pub username: String,
        pub email: String,
        pub phone: String,
        pub name: String,
        pub password: String,
        /// `USER` (default) or `ADMIN`.
        pub role: Option<String>,
        pub security_question: Option<SecurityQuestionNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SecurityQuestionNew {
        pub question: String,
        pub answer: String,
    }

    /// Sanitized user; the password hash never leaves the server.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserView {
        pub id: String,
        pub username: String,
        pub email: String,
        pub phone: String,
        pub name: String,
        pub role: String,
        pub is_active: bool,
        pub is_approved: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Admin listing shape: the user plus its recovery-question text and how
    /// many incomes it recorded.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserDetail {
        #[serde(flatten)]
        pub user: UserView,
        pub security_question: Option<String>,
        pub income_count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserUpdate {
        pub is_active: Option<bool>,
        pub is_approved: Option<bool>,
        pub role: Option<String>,
    }
}

pub mod entity {
    use super::*;
    use chrono::{DateTime, Utc};

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EntityNew {
        pub name: String,
        /// `MAIN` (default), `SUB` or `EMPLOYEE`.
        #[serde(rename = "type")]
        pub kind: Option<String>,
        pub province: String,
        pub main_entity_id: Option<String>,
    }

    /// Query parameters for the entity listing.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntityList {
        #[serde(rename = "type")]
        pub kind: Option<String>,
        pub province: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EntityView {
        pub id: String,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: String,
        pub province: Option<String>,
        pub main_entity_id: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntityRef {
        pub id: String,
        pub name: String,
    }

    /// Listing/creation response: the entity plus its parent, its immediate
    /// sub-entities and how many incomes reference it.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EntityDetail {
        #[serde(flatten)]
        pub entity: EntityView,
        pub main_entity: Option<EntityRef>,
        pub sub_entities: Vec<EntityRef>,
        pub income_count: u64,
    }
}

pub mod income {
    use super::*;
    use chrono::{DateTime, Utc};

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct IncomeNew {
        pub amount: f64,
        /// RFC 3339 instant or bare `YYYY-MM-DD` date.
        pub due_date: String,
        pub entity_id: String,
        pub month: i32,
        pub year: i32,
        #[serde(rename = "type")]
        pub kind: String,
        pub description: Option<String>,
        pub gp_number: Option<String>,
        pub user_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct IncomeUpdate {
        pub amount: Option<f64>,
        pub due_date: Option<String>,
        pub month: Option<i32>,
        pub year: Option<i32>,
        #[serde(rename = "type")]
        pub kind: Option<String>,
        pub description: Option<String>,
        pub gp_number: Option<String>,
        pub entity_id: Option<String>,
    }

    /// Query parameters for the income listing.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct IncomeList {
        pub month: Option<i32>,
        pub year: Option<i32>,
        pub entity_id: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<String>,
    }

    /// Creator's public fields.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserRef {
        pub id: String,
        pub name: String,
        pub username: String,
    }

    /// Income joined with its entity and creator.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct IncomeView {
        pub id: String,
        pub amount: f64,
        pub due_date: DateTime<Utc>,
        pub month: i32,
        pub year: i32,
        #[serde(rename = "type")]
        pub kind: String,
        pub description: Option<String>,
        pub gp_number: Option<String>,
        pub entity_id: String,
        pub user_id: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        pub entity: entity::EntityView,
        pub user: UserRef,
    }
}

pub mod analytics {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AnalyticsGet {
        /// Defaults to the current year.
        pub year: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ReportEntity {
        pub id: String,
        pub name: String,
        pub province: Option<String>,
        pub main_entity: Option<entity::EntityRef>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EntityStat {
        pub entity_id: String,
        pub sum: f64,
        pub count: i64,
        pub average: f64,
        /// Share of the yearly total, in percent.
        pub percentage: f64,
        pub entity: ReportEntity,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthStat {
        /// Arabic month label, not a number.
        pub month: String,
        pub amount: f64,
        pub count: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TypeStat {
        /// Arabic kind label; raw kind string when unrecognized.
        #[serde(rename = "type")]
        pub kind: String,
        pub amount: f64,
        pub count: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProvinceStat {
        pub province: String,
        pub amount: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Totals {
        pub income: f64,
        pub count: i64,
        pub entities: i64,
        pub average: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Projections {
        pub next_month: i64,
        pub quarter: i64,
        pub year: i64,
        pub confidence: u8,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AnalyticsResponse {
        pub entities: Vec<EntityStat>,
        pub monthly: Vec<MonthStat>,
        pub types: Vec<TypeStat>,
        pub provinces: Vec<ProvinceStat>,
        pub totals: Totals,
        pub projections: Projections,
    }
}
