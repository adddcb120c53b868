use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{router, run, run_with_listener, spawn_with_listener};

mod analytics;
mod auth;
mod entities;
mod incomes;
mod server;
mod users;

pub mod types {
    pub mod auth {
        pub use api_types::auth::{LoginRequest, LoginResponse};
    }

    pub mod user {
        pub use api_types::user::{SecurityQuestionNew, UserDetail, UserNew, UserUpdate, UserView};
    }

    pub mod entity {
        pub use api_types::entity::{EntityDetail, EntityList, EntityNew, EntityRef, EntityView};
    }

    pub mod income {
        pub use api_types::income::{IncomeList, IncomeNew, IncomeUpdate, IncomeView, UserRef};
    }

    pub mod analytics {
        pub use api_types::analytics::{
            AnalyticsGet, AnalyticsResponse, EntityStat, MonthStat, Projections, ProvinceStat,
            ReportEntity, Totals, TypeStat,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(StatusCode, String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidCredentials
        | EngineError::AccountInactive
        | EngineError::AccountNotApproved
        | EngineError::InvalidToken
        | EngineError::ExpiredToken => StatusCode::UNAUTHORIZED,
        EngineError::Forbidden => StatusCode::FORBIDDEN,
        EngineError::Hash(_) | EngineError::Token(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Turn an engine error into the response body. Internal failures are logged
/// in full here; the client only ever sees a generic message for them.
fn body_for_engine_error(err: EngineError) -> api_types::Error {
    let error = match &err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Hash(hash_err) => {
            tracing::error!("hash error: {hash_err}");
            "internal server error".to_string()
        }
        EngineError::Token(token_err) => {
            tracing::error!("token error: {token_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    };

    let details = match err {
        EngineError::Validation(issues) => Some(
            issues
                .into_iter()
                .map(|issue| api_types::FieldError {
                    field: issue.field,
                    message: issue.message,
                })
                .collect(),
        ),
        _ => None,
    };

    api_types::Error { error, details }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Generic(status, error) => (
                status,
                api_types::Error {
                    error,
                    details: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use engine::FieldIssue;
    use http_body_util::BodyExt;

    use super::*;

    #[test]
    fn engine_validation_maps_to_400() {
        let res = ServerError::from(EngineError::Validation(vec![FieldIssue::new(
            "amount",
            "amount must be a positive number",
        )]))
        .into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("entity not exists".to_string()))
            .into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res =
            ServerError::from(EngineError::ExistingKey("username".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn credential_failures_map_to_401() {
        for err in [
            EngineError::InvalidCredentials,
            EngineError::AccountInactive,
            EngineError::AccountNotApproved,
            EngineError::InvalidToken,
            EngineError::ExpiredToken,
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn generic_keeps_its_status() {
        let res = ServerError::Generic(StatusCode::BAD_REQUEST, "bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn validation_body_itemizes_fields() {
        let res = ServerError::from(EngineError::Validation(vec![
            FieldIssue::new("month", "month must be between 1 and 12"),
            FieldIssue::new("amount", "amount must be a positive number"),
        ]))
        .into_response();

        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: api_types::Error = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "invalid input");
        let details = body.details.unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].field, "month");
        assert_eq!(details[1].field, "amount");
    }

    #[tokio::test]
    async fn database_error_body_stays_generic() {
        let res = ServerError::from(EngineError::Database(sea_orm::DbErr::Custom(
            "connection reset".to_string(),
        )))
        .into_response();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: api_types::Error = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "internal server error");
        assert!(body.details.is_none());
    }
}
