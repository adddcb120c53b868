use sea_orm::{Condition, DatabaseTransaction, QueryFilter, prelude::*};

use crate::{EngineError, ResultEngine, entities, incomes, users};

use super::Engine;

/// Generates an `_exists` probe and a `require_` guard for a target entity
/// looked up by primary key.
macro_rules! impl_require_by_id {
    ($exists_fn:ident, $require_fn:ident, $entity:path, $err_msg:literal) => {
        pub(super) async fn $exists_fn(
            &self,
            db: &DatabaseTransaction,
            target_id: &str,
        ) -> ResultEngine<bool> {
            <$entity>::find_by_id(target_id.to_string())
                .one(db)
                .await
                .map(|model| model.is_some())
                .map_err(Into::into)
        }

        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            target_id: &str,
        ) -> ResultEngine<()> {
            if !self.$exists_fn(db, target_id).await? {
                return Err(EngineError::KeyNotFound($err_msg.to_string()));
            }
            Ok(())
        }
    };
}

/// Generates a uniqueness probe over a single `users` column.
macro_rules! impl_user_field_taken {
    ($fn_name:ident, $column:expr) => {
        pub(super) async fn $fn_name(
            &self,
            db: &DatabaseTransaction,
            value: &str,
        ) -> ResultEngine<bool> {
            users::Entity::find()
                .filter($column.eq(value.to_string()))
                .one(db)
                .await
                .map(|model| model.is_some())
                .map_err(Into::into)
        }
    };
}

impl Engine {
    impl_require_by_id!(
        entity_exists,
        require_entity_exists,
        entities::Entity,
        "entity not exists"
    );

    impl_user_field_taken!(username_taken, users::Column::Username);
    impl_user_field_taken!(email_taken, users::Column::Email);
    impl_user_field_taken!(phone_taken, users::Column::Phone);

    /// A `main_entity_id` must point at an existing entity; the message names
    /// the parent so the caller can tell it apart from a plain entity miss.
    pub(super) async fn require_main_entity(
        &self,
        db: &DatabaseTransaction,
        main_entity_id: &str,
    ) -> ResultEngine<()> {
        if !self.entity_exists(db, main_entity_id).await? {
            return Err(EngineError::KeyNotFound("main entity not exists".to_string()));
        }
        Ok(())
    }

    pub(super) async fn require_user_by_id(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    pub(super) async fn require_income_by_id(
        &self,
        db: &DatabaseTransaction,
        income_id: &str,
    ) -> ResultEngine<incomes::Model> {
        incomes::Entity::find_by_id(income_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("income not exists".to_string()))
    }

    /// Login identifier lookup: `username` OR `email` OR `phone`, first match.
    pub(super) async fn find_user_by_identifier(
        &self,
        db: &DatabaseTransaction,
        identifier: &str,
    ) -> ResultEngine<Option<users::Model>> {
        users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(identifier.to_string()))
                    .add(users::Column::Email.eq(identifier.to_string()))
                    .add(users::Column::Phone.eq(identifier.to_string())),
            )
            .one(db)
            .await
            .map_err(Into::into)
    }
}
