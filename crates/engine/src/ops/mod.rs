use sea_orm::DatabaseConnection;
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, FieldIssue, ResultEngine, TokenService};

mod access;
mod analytics;
mod auth;
mod entities;
mod incomes;
mod users;

pub use analytics::{
    EntityBreakdown, Estimator, KindTotal, MonthlyTotal, PlaceholderEstimator, Projections,
    ProvinceTotal, ReportEntity, ReportTotals, YearlyReport, month_label,
};
pub use auth::LoginOutcome;
pub use entities::{EntityFilter, EntityOverview, EntityRef, NewEntity};
pub use incomes::{IncomeFilter, IncomePatch, IncomeRecord, NewIncome, UserRef};
pub use users::{NewSecurityQuestion, NewUser, UserOverview, UserPatch};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    tokens: TokenService,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Trim and NFC-normalize a required text field; records an issue when the
/// result is empty. Arabic names arrive in mixed compositions, so equality
/// checks need a single form.
fn require_text(value: &str, field: &str, issues: &mut Vec<FieldIssue>) -> String {
    let normalized: String = value.trim().nfc().collect();
    if normalized.is_empty() {
        issues.push(FieldIssue::new(field, format!("{field} must not be empty")));
    }
    normalized
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim().nfc().collect::<String>())
        .filter(|s| !s.is_empty())
}

fn plausible_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

fn finish_validation(issues: Vec<FieldIssue>) -> ResultEngine<()> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(EngineError::Validation(issues))
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    token_secret: String,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Pass the secret bearer tokens are signed with
    pub fn token_secret(mut self, secret: impl Into<String>) -> EngineBuilder {
        self.token_secret = secret.into();
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        if self.token_secret.is_empty() {
            return Err(EngineError::Validation(vec![FieldIssue::new(
                "token_secret",
                "token secret must not be empty",
            )]));
        }
        Ok(Engine {
            database: self.database,
            tokens: TokenService::new(&self.token_secret),
        })
    }
}
