use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{EngineError, FieldIssue, IncomeKind, ResultEngine, entities, incomes, users};

use super::{Engine, finish_validation, normalize_optional_text, require_text, with_tx};

/// Payload for recording an income.
#[derive(Clone, Debug)]
pub struct NewIncome {
    pub amount: f64,
    /// ISO-8601 date or datetime.
    pub due_date: String,
    pub entity_id: String,
    pub month: i32,
    pub year: i32,
    pub kind: String,
    pub description: Option<String>,
    pub gp_number: Option<String>,
    pub user_id: String,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Clone, Debug, Default)]
pub struct IncomePatch {
    pub amount: Option<f64>,
    pub due_date: Option<String>,
    pub entity_id: Option<String>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub kind: Option<String>,
    pub description: Option<String>,
    pub gp_number: Option<String>,
}

/// Listing filter; `None` means "any".
#[derive(Clone, Debug, Default)]
pub struct IncomeFilter {
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub entity_id: Option<String>,
    pub kind: Option<String>,
}

/// Public fields of the user who recorded an income.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRef {
    pub id: String,
    pub name: String,
    pub username: String,
}

/// An income joined with its entity and its recording user.
#[derive(Clone, Debug, PartialEq)]
pub struct IncomeRecord {
    pub income: incomes::Model,
    pub entity: entities::Model,
    pub user: UserRef,
}

/// Accepts both a bare date and a full RFC 3339 instant; bare dates land on
/// midnight UTC.
fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    raw.parse::<NaiveDate>()
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl Engine {
    /// Record an income. The referenced entity and user must both exist.
    pub async fn create_income(&self, new_income: NewIncome) -> ResultEngine<IncomeRecord> {
        let mut issues = Vec::new();
        if !(new_income.amount.is_finite() && new_income.amount > 0.0) {
            issues.push(FieldIssue::new("amount", "amount must be a positive number"));
        }
        let due_date = parse_due_date(&new_income.due_date);
        if due_date.is_none() {
            issues.push(FieldIssue::new("dueDate", "dueDate must be an ISO-8601 date"));
        }
        let entity_id = require_text(&new_income.entity_id, "entityId", &mut issues);
        if !(1..=12).contains(&new_income.month) {
            issues.push(FieldIssue::new("month", "month must be between 1 and 12"));
        }
        let kind = match IncomeKind::try_from(new_income.kind.trim()) {
            Ok(kind) => Some(kind),
            Err(EngineError::Validation(mut kind_issues)) => {
                issues.append(&mut kind_issues);
                None
            }
            Err(err) => return Err(err),
        };
        let user_id = require_text(&new_income.user_id, "userId", &mut issues);
        let description = normalize_optional_text(new_income.description.as_deref());
        let gp_number = normalize_optional_text(new_income.gp_number.as_deref());
        finish_validation(issues)?;
        let due_date = due_date.unwrap_or_default();
        let kind = kind.unwrap_or(IncomeKind::Other);

        let now = Utc::now();
        with_tx!(self, |db_tx| {
            self.require_entity_exists(&db_tx, &entity_id).await?;
            self.require_user_by_id(&db_tx, &user_id).await?;

            let income = incomes::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                amount: ActiveValue::Set(new_income.amount),
                due_date: ActiveValue::Set(due_date),
                month: ActiveValue::Set(new_income.month),
                year: ActiveValue::Set(new_income.year),
                kind: ActiveValue::Set(kind.as_str().to_string()),
                description: ActiveValue::Set(description.clone()),
                gp_number: ActiveValue::Set(gp_number.clone()),
                entity_id: ActiveValue::Set(entity_id.clone()),
                user_id: ActiveValue::Set(user_id.clone()),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            self.income_record(&db_tx, income).await
        })
    }

    /// Incomes matching `filter`, newest due date first, in the joined shape.
    pub async fn list_incomes(&self, filter: IncomeFilter) -> ResultEngine<Vec<IncomeRecord>> {
        let kind = match normalize_optional_text(filter.kind.as_deref()) {
            None => None,
            Some(raw) => Some(IncomeKind::try_from(raw.as_str())?),
        };
        let entity_id = normalize_optional_text(filter.entity_id.as_deref());

        with_tx!(self, |db_tx| {
            let mut query = incomes::Entity::find().order_by_desc(incomes::Column::DueDate);
            if let Some(month) = filter.month {
                query = query.filter(incomes::Column::Month.eq(month));
            }
            if let Some(year) = filter.year {
                query = query.filter(incomes::Column::Year.eq(year));
            }
            if let Some(entity_id) = &entity_id {
                query = query.filter(incomes::Column::EntityId.eq(entity_id.clone()));
            }
            if let Some(kind) = kind {
                query = query.filter(incomes::Column::Kind.eq(kind.as_str().to_string()));
            }

            let rows = query.all(&db_tx).await?;
            let mut out = Vec::with_capacity(rows.len());
            for income in rows {
                let record = self.income_record(&db_tx, income).await?;
                out.push(record);
            }
            Ok(out)
        })
    }

    /// Apply a partial update to an income; a supplied `entity_id` is
    /// re-checked for existence.
    pub async fn update_income(
        &self,
        income_id: &str,
        patch: IncomePatch,
    ) -> ResultEngine<IncomeRecord> {
        let mut issues = Vec::new();
        if let Some(amount) = patch.amount
            && !(amount.is_finite() && amount > 0.0)
        {
            issues.push(FieldIssue::new("amount", "amount must be a positive number"));
        }
        let due_date = match patch.due_date.as_deref() {
            None => None,
            Some(raw) => {
                let parsed = parse_due_date(raw);
                if parsed.is_none() {
                    issues.push(FieldIssue::new("dueDate", "dueDate must be an ISO-8601 date"));
                }
                parsed
            }
        };
        if let Some(month) = patch.month
            && !(1..=12).contains(&month)
        {
            issues.push(FieldIssue::new("month", "month must be between 1 and 12"));
        }
        let kind = match normalize_optional_text(patch.kind.as_deref()) {
            None => None,
            Some(raw) => match IncomeKind::try_from(raw.as_str()) {
                Ok(kind) => Some(kind),
                Err(EngineError::Validation(mut kind_issues)) => {
                    issues.append(&mut kind_issues);
                    None
                }
                Err(err) => return Err(err),
            },
        };
        let entity_id = normalize_optional_text(patch.entity_id.as_deref());
        let description = normalize_optional_text(patch.description.as_deref());
        let gp_number = normalize_optional_text(patch.gp_number.as_deref());
        finish_validation(issues)?;

        with_tx!(self, |db_tx| {
            let existing = self.require_income_by_id(&db_tx, income_id).await?;
            if let Some(entity_id) = &entity_id {
                self.require_entity_exists(&db_tx, entity_id).await?;
            }

            let mut active = incomes::ActiveModel {
                id: ActiveValue::Set(existing.id),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            if let Some(amount) = patch.amount {
                active.amount = ActiveValue::Set(amount);
            }
            if let Some(due_date) = due_date {
                active.due_date = ActiveValue::Set(due_date);
            }
            if let Some(entity_id) = entity_id.clone() {
                active.entity_id = ActiveValue::Set(entity_id);
            }
            if let Some(month) = patch.month {
                active.month = ActiveValue::Set(month);
            }
            if let Some(year) = patch.year {
                active.year = ActiveValue::Set(year);
            }
            if let Some(kind) = kind {
                active.kind = ActiveValue::Set(kind.as_str().to_string());
            }
            if let Some(description) = description.clone() {
                active.description = ActiveValue::Set(Some(description));
            }
            if let Some(gp_number) = gp_number.clone() {
                active.gp_number = ActiveValue::Set(Some(gp_number));
            }

            let income = active.update(&db_tx).await?;
            self.income_record(&db_tx, income).await
        })
    }

    /// Delete an income by id.
    pub async fn delete_income(&self, income_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_income_by_id(&db_tx, income_id).await?;
            incomes::Entity::delete_by_id(income_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn income_record(
        &self,
        db_tx: &DatabaseTransaction,
        income: incomes::Model,
    ) -> ResultEngine<IncomeRecord> {
        let entity = entities::Entity::find_by_id(income.entity_id.clone())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("entity not exists".to_string()))?;
        let user = users::Entity::find_by_id(income.user_id.clone())
            .one(db_tx)
            .await?
            .map(|user| UserRef {
                id: user.id,
                name: user.name,
                username: user.username,
            })
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;

        Ok(IncomeRecord {
            income,
            entity,
            user,
        })
    }
}
