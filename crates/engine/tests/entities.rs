use sea_orm::{Database, DatabaseConnection};

use engine::{Engine, EngineError, EntityFilter, NewEntity};
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

fn entity(name: &str, province: &str) -> NewEntity {
    NewEntity {
        name: name.to_string(),
        province: province.to_string(),
        main_entity_id: None,
        kind: None,
    }
}

#[tokio::test]
async fn create_entity_defaults_to_main_kind() {
    let (engine, _db) = engine_with_db().await;

    let overview = engine
        .create_entity(entity("وزارة التجارة", "الرياض"))
        .await
        .unwrap();

    assert_eq!(overview.entity.kind, "MAIN");
    assert_eq!(overview.entity.province.as_deref(), Some("الرياض"));
    assert!(overview.main_entity.is_none());
    assert!(overview.sub_entities.is_empty());
    assert_eq!(overview.income_count, 0);
}

#[tokio::test]
async fn sub_entity_links_to_its_parent_and_back() {
    let (engine, _db) = engine_with_db().await;
    let parent = engine
        .create_entity(entity("وزارة التجارة", "الرياض"))
        .await
        .unwrap();

    let sub = engine
        .create_entity(NewEntity {
            name: "فرع جدة".to_string(),
            province: "جدة".to_string(),
            main_entity_id: Some(parent.entity.id.clone()),
            kind: Some("SUB".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(sub.entity.kind, "SUB");
    assert_eq!(sub.main_entity.as_ref().unwrap().name, "وزارة التجارة");

    let listed = engine.list_entities(EntityFilter::default()).await.unwrap();
    let parent_overview = listed
        .iter()
        .find(|overview| overview.entity.id == parent.entity.id)
        .unwrap();
    assert_eq!(parent_overview.sub_entities.len(), 1);
    assert_eq!(parent_overview.sub_entities[0].name, "فرع جدة");
}

#[tokio::test]
async fn create_entity_rejects_an_unknown_parent() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_entity(NewEntity {
            name: "فرع جدة".to_string(),
            province: "جدة".to_string(),
            main_entity_id: Some("no-such-entity".to_string()),
            kind: Some("SUB".to_string()),
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::KeyNotFound("main entity not exists".to_string())
    );
}

#[tokio::test]
async fn create_entity_rejects_blank_fields_and_unknown_kinds() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_entity(entity(" ", ""))
        .await
        .unwrap_err();
    let EngineError::Validation(issues) = err else {
        panic!("expected a validation error, got {err:?}");
    };
    let fields: Vec<&str> = issues.iter().map(|issue| issue.field.as_str()).collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"province"));

    let err = engine
        .create_entity(NewEntity {
            kind: Some("BRANCH".to_string()),
            ..entity("وزارة التجارة", "الرياض")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn list_entities_filters_compose() {
    let (engine, _db) = engine_with_db().await;
    engine
        .create_entity(entity("وزارة التجارة", "الرياض"))
        .await
        .unwrap();
    engine
        .create_entity(entity("شركة الاتصالات", "جدة"))
        .await
        .unwrap();
    engine
        .create_entity(NewEntity {
            kind: Some("EMPLOYEE".to_string()),
            ..entity("موظف التحصيل", "الرياض")
        })
        .await
        .unwrap();

    let riyadh = engine
        .list_entities(EntityFilter {
            province: Some("الرياض".to_string()),
            kind: None,
        })
        .await
        .unwrap();
    assert_eq!(riyadh.len(), 2);

    let employees = engine
        .list_entities(EntityFilter {
            province: None,
            kind: Some("EMPLOYEE".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0].entity.name, "موظف التحصيل");

    let both = engine
        .list_entities(EntityFilter {
            province: Some("الرياض".to_string()),
            kind: Some("MAIN".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].entity.name, "وزارة التجارة");

    let err = engine
        .list_entities(EntityFilter {
            province: None,
            kind: Some("BRANCH".to_string()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn list_entities_orders_by_name() {
    let (engine, _db) = engine_with_db().await;
    engine
        .create_entity(entity("بنك الأهلي", "الدمام"))
        .await
        .unwrap();
    engine
        .create_entity(entity("اتصالات السعودية", "جدة"))
        .await
        .unwrap();

    let listed = engine.list_entities(EntityFilter::default()).await.unwrap();

    assert_eq!(listed[0].entity.name, "اتصالات السعودية");
    assert_eq!(listed[1].entity.name, "بنك الأهلي");
}

#[tokio::test]
async fn entity_names_are_nfc_normalized() {
    let (engine, _db) = engine_with_db().await;

    // "cafe" plus a combining acute accent; NFC folds it into a single char.
    let overview = engine
        .create_entity(entity("cafe\u{301}", "الرياض"))
        .await
        .unwrap();

    assert_eq!(overview.entity.name, "café");
}
