//! Table definitions.
//!
//! Tables are created idempotently on connect. Dropping or altering existing
//! tables is out of scope.

use sea_orm::sea_query::{ColumnDef, ForeignKey, ForeignKeyAction, Index, Table, TableCreateStatement};
use sea_orm::{ConnectionTrait, DbErr, ExecResult};

use crate::entity::{claim, food_listing, provider, receiver};

async fn create_table<C>(db: &C, stmt: &TableCreateStatement) -> Result<ExecResult, DbErr>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    db.execute(builder.build(stmt)).await
}

pub fn providers_table() -> TableCreateStatement {
    Table::create()
        .table(provider::Entity)
        .if_not_exists()
        .col(
            ColumnDef::new(provider::Column::ProviderId)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(provider::Column::Name).string().not_null())
        .col(ColumnDef::new(provider::Column::Kind).string().not_null())
        .col(ColumnDef::new(provider::Column::Address).string())
        .col(ColumnDef::new(provider::Column::City).string().not_null())
        .col(ColumnDef::new(provider::Column::Contact).string())
        .to_owned()
}

pub fn receivers_table() -> TableCreateStatement {
    Table::create()
        .table(receiver::Entity)
        .if_not_exists()
        .col(
            ColumnDef::new(receiver::Column::ReceiverId)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(receiver::Column::Name).string().not_null())
        .col(ColumnDef::new(receiver::Column::Kind).string().not_null())
        .col(ColumnDef::new(receiver::Column::City).string().not_null())
        .col(ColumnDef::new(receiver::Column::Contact).string())
        .to_owned()
}

/// Providers with listings cannot be deleted, so the provider key restricts.
pub fn food_listings_table() -> TableCreateStatement {
    Table::create()
        .table(food_listing::Entity)
        .if_not_exists()
        .col(
            ColumnDef::new(food_listing::Column::FoodId)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(food_listing::Column::FoodName).string().not_null())
        .col(ColumnDef::new(food_listing::Column::Quantity).integer().not_null())
        .col(ColumnDef::new(food_listing::Column::ExpiryDate).date().not_null())
        .col(ColumnDef::new(food_listing::Column::ProviderId).integer().not_null())
        .col(ColumnDef::new(food_listing::Column::ProviderType).string().not_null())
        .col(ColumnDef::new(food_listing::Column::Location).string().not_null())
        .col(ColumnDef::new(food_listing::Column::FoodType).string().not_null())
        .col(ColumnDef::new(food_listing::Column::MealType).string().not_null())
        .foreign_key(
            ForeignKey::create()
                .name("fk_food_listings_provider")
                .from(food_listing::Entity, food_listing::Column::ProviderId)
                .to(provider::Entity, provider::Column::ProviderId)
                .on_delete(ForeignKeyAction::Restrict)
                .on_update(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

/// Claims go away together with their listing or receiver.
pub fn claims_table() -> TableCreateStatement {
    Table::create()
        .table(claim::Entity)
        .if_not_exists()
        .col(
            ColumnDef::new(claim::Column::ClaimId)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(claim::Column::FoodId).integer().not_null())
        .col(ColumnDef::new(claim::Column::ReceiverId).integer().not_null())
        .col(ColumnDef::new(claim::Column::Status).string().not_null())
        .col(ColumnDef::new(claim::Column::Timestamp).date_time())
        .foreign_key(
            ForeignKey::create()
                .name("fk_claims_food_listing")
                .from(claim::Entity, claim::Column::FoodId)
                .to(food_listing::Entity, food_listing::Column::FoodId)
                .on_delete(ForeignKeyAction::Cascade)
                .on_update(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_claims_receiver")
                .from(claim::Entity, claim::Column::ReceiverId)
                .to(receiver::Entity, receiver::Column::ReceiverId)
                .on_delete(ForeignKeyAction::Cascade)
                .on_update(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

pub async fn create_tables<C>(db: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    create_table(db, &providers_table()).await?;
    create_table(db, &receivers_table()).await?;
    create_table(db, &food_listings_table()).await?;
    create_table(db, &claims_table()).await?;

    let backend = db.get_database_backend();
    let indexes = [
        Index::create()
            .name("idx_food_listings_provider_id")
            .table(food_listing::Entity)
            .col(food_listing::Column::ProviderId)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_claims_food_id")
            .table(claim::Entity)
            .col(claim::Column::FoodId)
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_claims_receiver_id")
            .table(claim::Entity)
            .col(claim::Column::ReceiverId)
            .if_not_exists()
            .to_owned(),
    ];
    for index in &indexes {
        db.execute(backend.build(index)).await?;
    }

    tracing::debug!("schema ready");
    Ok(())
}
