//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for Mawrid:
//!
//! - `users`: accounts with activity and approval gates
//! - `security_questions`: one recovery question per user, answer stored hashed
//! - `entities`: organizational entities, optionally nested under a main entity
//! - `incomes`: monthly income entries recorded against entities

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    Phone,
    Name,
    Password,
    Role,
    IsActive,
    IsApproved,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum SecurityQuestions {
    Table,
    Id,
    UserId,
    Question,
    Answer,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Entities {
    Table,
    Id,
    Name,
    Kind,
    Province,
    MainEntityId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Incomes {
    Table,
    Id,
    Amount,
    DueDate,
    Month,
    Year,
    Kind,
    Description,
    GpNumber,
    EntityId,
    UserId,
    CreatedAt,
    UpdatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Phone).string().not_null())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("USER"),
                    )
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::IsApproved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-username-unique")
                    .table(Users::Table)
                    .col(Users::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-phone-unique")
                    .table(Users::Table)
                    .col(Users::Phone)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Security Questions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(SecurityQuestions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SecurityQuestions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SecurityQuestions::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SecurityQuestions::Question)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SecurityQuestions::Answer)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SecurityQuestions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SecurityQuestions::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-security_questions-user_id")
                            .from(SecurityQuestions::Table, SecurityQuestions::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-security_questions-user_id-unique")
                    .table(SecurityQuestions::Table)
                    .col(SecurityQuestions::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Entities
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Entities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Entities::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Entities::Name).string().not_null())
                    .col(
                        ColumnDef::new(Entities::Kind)
                            .string()
                            .not_null()
                            .default("MAIN"),
                    )
                    .col(ColumnDef::new(Entities::Province).string())
                    .col(ColumnDef::new(Entities::MainEntityId).string())
                    .col(ColumnDef::new(Entities::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Entities::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-entities-main_entity_id")
                            .from(Entities::Table, Entities::MainEntityId)
                            .to(Entities::Table, Entities::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-entities-main_entity_id")
                    .table(Entities::Table)
                    .col(Entities::MainEntityId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Incomes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Incomes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Incomes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Incomes::Amount).double().not_null())
                    .col(ColumnDef::new(Incomes::DueDate).timestamp().not_null())
                    .col(ColumnDef::new(Incomes::Month).integer().not_null())
                    .col(ColumnDef::new(Incomes::Year).integer().not_null())
                    .col(ColumnDef::new(Incomes::Kind).string().not_null())
                    .col(ColumnDef::new(Incomes::Description).string())
                    .col(ColumnDef::new(Incomes::GpNumber).string())
                    .col(ColumnDef::new(Incomes::EntityId).string().not_null())
                    .col(ColumnDef::new(Incomes::UserId).string().not_null())
                    .col(ColumnDef::new(Incomes::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Incomes::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-incomes-entity_id")
                            .from(Incomes::Table, Incomes::EntityId)
                            .to(Entities::Table, Entities::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-incomes-user_id")
                            .from(Incomes::Table, Incomes::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-incomes-year-month")
                    .table(Incomes::Table)
                    .col(Incomes::Year)
                    .col(Incomes::Month)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-incomes-entity_id")
                    .table(Incomes::Table)
                    .col(Incomes::EntityId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-incomes-user_id")
                    .table(Incomes::Table)
                    .col(Incomes::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Incomes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Entities::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SecurityQuestions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
