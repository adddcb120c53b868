use chrono::{TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Engine, EngineError, IncomeFilter, IncomePatch, NewEntity, NewIncome, NewUser,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .token_secret("test-secret")
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// Seed one admin and one entity; returns `(entity_id, user_id)`.
async fn seed(engine: &Engine) -> (String, String) {
    let user = engine
        .register(
            NewUser {
                username: "admin".to_string(),
                email: "admin@example.com".to_string(),
                phone: "0501234567".to_string(),
                name: "Administrator".to_string(),
                password: "hunter2-secret".to_string(),
                role: Some("ADMIN".to_string()),
            },
            None,
        )
        .await
        .unwrap();
    let entity = engine
        .create_entity(NewEntity {
            name: "وزارة التجارة".to_string(),
            province: "الرياض".to_string(),
            main_entity_id: None,
            kind: None,
        })
        .await
        .unwrap();
    (entity.entity.id, user.id)
}

fn income(entity_id: &str, user_id: &str, month: i32, amount: f64, kind: &str) -> NewIncome {
    NewIncome {
        amount,
        due_date: format!("2026-{month:02}-15"),
        entity_id: entity_id.to_string(),
        month,
        year: 2026,
        kind: kind.to_string(),
        description: None,
        gp_number: None,
        user_id: user_id.to_string(),
    }
}

#[tokio::test]
async fn create_income_joins_entity_and_user() {
    let (engine, _db) = engine_with_db().await;
    let (entity_id, user_id) = seed(&engine).await;

    let record = engine
        .create_income(NewIncome {
            description: Some("  اشتراك سنوي  ".to_string()),
            gp_number: Some("GP-1001".to_string()),
            ..income(&entity_id, &user_id, 1, 1500.5, "SUBSCRIPTION")
        })
        .await
        .unwrap();

    assert_eq!(record.income.amount, 1500.5);
    assert_eq!(record.income.kind, "SUBSCRIPTION");
    assert_eq!(record.income.description.as_deref(), Some("اشتراك سنوي"));
    assert_eq!(record.income.gp_number.as_deref(), Some("GP-1001"));
    assert_eq!(
        record.income.due_date,
        Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap()
    );
    assert_eq!(record.entity.name, "وزارة التجارة");
    assert_eq!(record.user.username, "admin");
}

#[tokio::test]
async fn create_income_accepts_rfc3339_instants() {
    let (engine, _db) = engine_with_db().await;
    let (entity_id, user_id) = seed(&engine).await;

    let record = engine
        .create_income(NewIncome {
            due_date: "2026-03-05T14:30:00+03:00".to_string(),
            ..income(&entity_id, &user_id, 3, 800.0, "PENALTIES")
        })
        .await
        .unwrap();

    assert_eq!(
        record.income.due_date,
        Utc.with_ymd_and_hms(2026, 3, 5, 11, 30, 0).unwrap()
    );
}

#[tokio::test]
async fn create_income_collects_all_field_issues_in_one_pass() {
    let (engine, _db) = engine_with_db().await;
    let (entity_id, user_id) = seed(&engine).await;

    let err = engine
        .create_income(NewIncome {
            amount: -5.0,
            due_date: "not-a-date".to_string(),
            month: 13,
            kind: "BRIBES".to_string(),
            ..income(&entity_id, &user_id, 1, 100.0, "OTHER")
        })
        .await
        .unwrap_err();

    let EngineError::Validation(issues) = err else {
        panic!("expected a validation error, got {err:?}");
    };
    let fields: Vec<&str> = issues.iter().map(|issue| issue.field.as_str()).collect();
    for expected in ["amount", "dueDate", "month", "type"] {
        assert!(fields.contains(&expected), "missing issue for {expected}");
    }
}

#[tokio::test]
async fn income_references_must_exist() {
    let (engine, _db) = engine_with_db().await;
    let (entity_id, user_id) = seed(&engine).await;

    let err = engine
        .create_income(income("no-such-entity", &user_id, 1, 100.0, "OTHER"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("entity not exists".to_string()));

    let err = engine
        .create_income(income(&entity_id, "no-such-user", 1, 100.0, "OTHER"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("user not exists".to_string()));
}

#[tokio::test]
async fn list_incomes_filters_compose() {
    let (engine, _db) = engine_with_db().await;
    let (entity_id, user_id) = seed(&engine).await;
    let second = engine
        .create_entity(NewEntity {
            name: "شركة الاتصالات".to_string(),
            province: "جدة".to_string(),
            main_entity_id: None,
            kind: None,
        })
        .await
        .unwrap();

    engine
        .create_income(income(&entity_id, &user_id, 1, 1000.0, "SUBSCRIPTION"))
        .await
        .unwrap();
    engine
        .create_income(income(&entity_id, &user_id, 1, 200.0, "PENALTIES"))
        .await
        .unwrap();
    engine
        .create_income(income(&second.entity.id, &user_id, 2, 300.0, "SUBSCRIPTION"))
        .await
        .unwrap();

    let january = engine
        .list_incomes(IncomeFilter {
            month: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(january.len(), 2);

    let other_year = engine
        .list_incomes(IncomeFilter {
            year: Some(2025),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(other_year.is_empty());

    let second_entity = engine
        .list_incomes(IncomeFilter {
            entity_id: Some(second.entity.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(second_entity.len(), 1);
    assert_eq!(second_entity[0].entity.name, "شركة الاتصالات");

    let january_subscriptions = engine
        .list_incomes(IncomeFilter {
            month: Some(1),
            kind: Some("SUBSCRIPTION".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(january_subscriptions.len(), 1);
    assert_eq!(january_subscriptions[0].income.amount, 1000.0);

    let err = engine
        .list_incomes(IncomeFilter {
            kind: Some("BRIBES".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn list_incomes_orders_newest_due_first() {
    let (engine, _db) = engine_with_db().await;
    let (entity_id, user_id) = seed(&engine).await;

    engine
        .create_income(income(&entity_id, &user_id, 1, 100.0, "OTHER"))
        .await
        .unwrap();
    engine
        .create_income(income(&entity_id, &user_id, 2, 200.0, "OTHER"))
        .await
        .unwrap();

    let listed = engine.list_incomes(IncomeFilter::default()).await.unwrap();

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].income.month, 2);
    assert_eq!(listed[1].income.month, 1);
}

#[tokio::test]
async fn update_income_is_partial() {
    let (engine, _db) = engine_with_db().await;
    let (entity_id, user_id) = seed(&engine).await;
    let record = engine
        .create_income(NewIncome {
            gp_number: Some("GP-1001".to_string()),
            ..income(&entity_id, &user_id, 1, 1000.0, "SUBSCRIPTION")
        })
        .await
        .unwrap();

    let updated = engine
        .update_income(
            &record.income.id,
            IncomePatch {
                amount: Some(2000.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.income.amount, 2000.0);
    assert_eq!(updated.income.month, 1);
    assert_eq!(updated.income.kind, "SUBSCRIPTION");
    assert_eq!(updated.income.gp_number.as_deref(), Some("GP-1001"));

    let second = engine
        .create_entity(NewEntity {
            name: "شركة الكهرباء".to_string(),
            province: "الرياض".to_string(),
            main_entity_id: None,
            kind: None,
        })
        .await
        .unwrap();
    let updated = engine
        .update_income(
            &record.income.id,
            IncomePatch {
                entity_id: Some(second.entity.id.clone()),
                kind: Some("LEGAL_FEES".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.entity.name, "شركة الكهرباء");
    assert_eq!(updated.income.kind, "LEGAL_FEES");
    assert_eq!(updated.income.amount, 2000.0);
}

#[tokio::test]
async fn update_income_rechecks_references_and_fields() {
    let (engine, _db) = engine_with_db().await;
    let (entity_id, user_id) = seed(&engine).await;
    let record = engine
        .create_income(income(&entity_id, &user_id, 1, 1000.0, "OTHER"))
        .await
        .unwrap();

    let err = engine
        .update_income(
            &record.income.id,
            IncomePatch {
                entity_id: Some("no-such-entity".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("entity not exists".to_string()));

    let err = engine
        .update_income(
            &record.income.id,
            IncomePatch {
                month: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .update_income("no-such-income", IncomePatch::default())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("income not exists".to_string()));
}

#[tokio::test]
async fn delete_income_removes_the_row() {
    let (engine, _db) = engine_with_db().await;
    let (entity_id, user_id) = seed(&engine).await;
    let record = engine
        .create_income(income(&entity_id, &user_id, 1, 1000.0, "OTHER"))
        .await
        .unwrap();

    engine.delete_income(&record.income.id).await.unwrap();

    assert!(engine
        .list_incomes(IncomeFilter::default())
        .await
        .unwrap()
        .is_empty());

    let err = engine.delete_income(&record.income.id).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("income not exists".to_string()));
}

#[tokio::test]
async fn recording_user_cannot_be_deleted_while_incomes_remain() {
    let (engine, _db) = engine_with_db().await;
    let (entity_id, user_id) = seed(&engine).await;
    engine
        .create_income(income(&entity_id, &user_id, 1, 1000.0, "OTHER"))
        .await
        .unwrap();

    // The incomes FK refuses the delete; the overview still counts the rows.
    let err = engine.delete_user(&user_id).await.unwrap_err();
    assert!(matches!(err, EngineError::Database(_)));

    let overviews = engine.list_users().await.unwrap();
    assert_eq!(overviews[0].income_count, 1);
}
