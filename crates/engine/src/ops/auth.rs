use sea_orm::{TransactionTrait, prelude::*};

use crate::{EngineError, FieldIssue, ResultEngine, credentials, users};

use super::{Engine, finish_validation, require_text, with_tx};

/// A successful login: the authenticated user plus a fresh bearer token.
#[derive(Clone, Debug, PartialEq)]
pub struct LoginOutcome {
    pub user: users::Model,
    pub token: String,
}

impl Engine {
    /// Authenticate `identifier` (username, email or phone) against `password`
    /// and issue a bearer token.
    ///
    /// Unknown identifier and wrong password both come back as
    /// [`EngineError::InvalidCredentials`], so the response cannot be used to
    /// enumerate accounts; the tracing events tell the two apart server-side.
    /// Inactive and not-yet-approved accounts are rejected before the password
    /// is even checked.
    pub async fn login(&self, identifier: &str, password: &str) -> ResultEngine<LoginOutcome> {
        let mut issues = Vec::new();
        let identifier = require_text(identifier, "identifier", &mut issues);
        if password.is_empty() {
            issues.push(FieldIssue::new("password", "password must not be empty"));
        }
        finish_validation(issues)?;

        with_tx!(self, |db_tx| {
            let Some(user) = self.find_user_by_identifier(&db_tx, &identifier).await? else {
                tracing::debug!(%identifier, "login rejected: unknown identifier");
                return Err(EngineError::InvalidCredentials);
            };

            if !user.is_active {
                tracing::debug!(username = %user.username, "login rejected: inactive account");
                return Err(EngineError::AccountInactive);
            }
            if !user.is_admin() && !user.is_approved {
                tracing::debug!(username = %user.username, "login rejected: awaiting approval");
                return Err(EngineError::AccountNotApproved);
            }

            if !credentials::verify_password(password, &user.password)? {
                tracing::debug!(username = %user.username, "login rejected: wrong password");
                return Err(EngineError::InvalidCredentials);
            }

            let token = self.tokens.issue(&user)?;
            Ok(LoginOutcome { user, token })
        })
    }

    /// Resolve a bearer token to its user.
    ///
    /// The token is checked for signature and expiry, then the user is loaded
    /// fresh so revocation (deletion, `is_active = false`) takes effect
    /// immediately rather than at token expiry.
    pub async fn authenticate_token(&self, token: &str) -> ResultEngine<users::Model> {
        let claims = self.tokens.validate(token)?;
        with_tx!(self, |db_tx| {
            let user = users::Entity::find_by_id(claims.sub.clone())
                .one(&db_tx)
                .await?
                .ok_or(EngineError::InvalidToken)?;
            if !user.is_active {
                return Err(EngineError::AccountInactive);
            }
            Ok(user)
        })
    }
}
