use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, FieldIssue, ResultEngine, UserRole, credentials, incomes, security_questions,
    users,
};

use super::{Engine, finish_validation, plausible_email, require_text, with_tx};

/// Payload for self-service registration.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub name: String,
    pub password: String,
    /// Requested role; defaults to `USER` when absent.
    pub role: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NewSecurityQuestion {
    pub question: String,
    pub answer: String,
}

/// Admin patch over a user; `None` leaves the field untouched.
#[derive(Clone, Debug, Default)]
pub struct UserPatch {
    pub is_active: Option<bool>,
    pub is_approved: Option<bool>,
    pub role: Option<String>,
}

/// A user as the admin surface sees it: the row itself plus its
/// security-question text and how many incomes it recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct UserOverview {
    pub user: users::Model,
    pub security_question: Option<String>,
    pub income_count: u64,
}

impl Engine {
    /// Register a new user, optionally attaching a security question in the
    /// same transaction.
    ///
    /// `username`, `email` and `phone` are checked for uniqueness one by one
    /// so each collision surfaces as its own conflict. The password and the
    /// security answer are bcrypt-hashed before anything touches the
    /// database. A requested `ADMIN` role starts approved; everyone else
    /// waits for an admin to flip `is_approved`.
    pub async fn register(
        &self,
        new_user: NewUser,
        question: Option<NewSecurityQuestion>,
    ) -> ResultEngine<users::Model> {
        let mut issues = Vec::new();

        let username = require_text(&new_user.username, "username", &mut issues);
        if !username.is_empty() && !(3..=20).contains(&username.chars().count()) {
            issues.push(FieldIssue::new(
                "username",
                "username must be 3-20 characters",
            ));
        }
        let email = require_text(&new_user.email, "email", &mut issues);
        if !email.is_empty() && !plausible_email(&email) {
            issues.push(FieldIssue::new("email", "email is not a valid address"));
        }
        let phone = require_text(&new_user.phone, "phone", &mut issues);
        if !phone.is_empty() && phone.chars().count() < 10 {
            issues.push(FieldIssue::new(
                "phone",
                "phone must be at least 10 characters",
            ));
        }
        let name = require_text(&new_user.name, "name", &mut issues);
        if new_user.password.chars().count() < 6 {
            issues.push(FieldIssue::new(
                "password",
                "password must be at least 6 characters",
            ));
        }
        let role = match new_user.role.as_deref() {
            None => UserRole::User,
            Some(raw) => match UserRole::try_from(raw) {
                Ok(role) => role,
                Err(EngineError::Validation(mut role_issues)) => {
                    issues.append(&mut role_issues);
                    UserRole::User
                }
                Err(err) => return Err(err),
            },
        };
        let question = question.map(|sq| {
            let text = require_text(&sq.question, "securityQuestion.question", &mut issues);
            let answer = require_text(&sq.answer, "securityQuestion.answer", &mut issues);
            (text, answer)
        });
        finish_validation(issues)?;

        // Hash outside the transaction; bcrypt is deliberately slow.
        let hashed_password = credentials::hash_password(&new_user.password)?;
        let question = match question {
            Some((text, answer)) => Some((text, credentials::hash_password(&answer)?)),
            None => None,
        };

        let now = Utc::now();
        with_tx!(self, |db_tx| {
            if self.username_taken(&db_tx, &username).await? {
                return Err(EngineError::ExistingKey("username".to_string()));
            }
            if self.email_taken(&db_tx, &email).await? {
                return Err(EngineError::ExistingKey("email".to_string()));
            }
            if self.phone_taken(&db_tx, &phone).await? {
                return Err(EngineError::ExistingKey("phone".to_string()));
            }

            let user = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                username: ActiveValue::Set(username.clone()),
                email: ActiveValue::Set(email.clone()),
                phone: ActiveValue::Set(phone.clone()),
                name: ActiveValue::Set(name.clone()),
                password: ActiveValue::Set(hashed_password),
                role: ActiveValue::Set(role.as_str().to_string()),
                is_active: ActiveValue::Set(true),
                is_approved: ActiveValue::Set(role == UserRole::Admin),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            if let Some((text, answer_hash)) = question {
                security_questions::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4().to_string()),
                    user_id: ActiveValue::Set(user.id.clone()),
                    question: ActiveValue::Set(text),
                    answer: ActiveValue::Set(answer_hash),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                }
                .insert(&db_tx)
                .await?;
            }

            Ok(user)
        })
    }

    /// All users, newest first, enriched for the admin overview.
    pub async fn list_users(&self) -> ResultEngine<Vec<UserOverview>> {
        with_tx!(self, |db_tx| {
            let rows = users::Entity::find()
                .order_by_desc(users::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(rows.len());
            for user in rows {
                let overview = self.user_overview(&db_tx, user).await?;
                out.push(overview);
            }
            Ok(out)
        })
    }

    /// Apply an admin patch to a user; unsupplied fields stay as they are.
    pub async fn update_user(&self, user_id: &str, patch: UserPatch) -> ResultEngine<UserOverview> {
        let role = patch.role.as_deref().map(UserRole::try_from).transpose()?;

        with_tx!(self, |db_tx| {
            let existing = self.require_user_by_id(&db_tx, user_id).await?;

            let mut active = users::ActiveModel {
                id: ActiveValue::Set(existing.id),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            if let Some(is_active) = patch.is_active {
                active.is_active = ActiveValue::Set(is_active);
            }
            if let Some(is_approved) = patch.is_approved {
                active.is_approved = ActiveValue::Set(is_approved);
            }
            if let Some(role) = role {
                active.role = ActiveValue::Set(role.as_str().to_string());
            }

            let user = active.update(&db_tx).await?;
            self.user_overview(&db_tx, user).await
        })
    }

    /// Delete a user and its security question.
    ///
    /// The question goes first; it holds the foreign key. A user who still
    /// owns incomes is refused by the store's FK and surfaces as a database
    /// error.
    pub async fn delete_user(&self, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user_by_id(&db_tx, user_id).await?;

            security_questions::Entity::delete_many()
                .filter(security_questions::Column::UserId.eq(user_id.to_string()))
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(user_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn user_overview(
        &self,
        db_tx: &DatabaseTransaction,
        user: users::Model,
    ) -> ResultEngine<UserOverview> {
        let security_question = security_questions::Entity::find()
            .filter(security_questions::Column::UserId.eq(user.id.clone()))
            .one(db_tx)
            .await?
            .map(|sq| sq.question);
        let income_count = incomes::Entity::find()
            .filter(incomes::Column::UserId.eq(user.id.clone()))
            .count(db_tx)
            .await?;

        Ok(UserOverview {
            user,
            security_question,
            income_count,
        })
    }
}
