//! Create, update and delete for the four entities.
//!
//! Every call takes the write gate and runs in one transaction, so
//! existence checks and the write itself cannot interleave with another
//! writer.

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::entity::sea_orm_active_enums::{ClaimStatus, FoodType, MealType, ProviderType, ReceiverType};
use crate::entity::{claim, food_listing, provider, receiver, Table};
use crate::error::{Error, Result};
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProvider {
    pub name: String,
    pub kind: ProviderType,
    pub address: Option<String>,
    pub city: String,
    pub contact: Option<String>,
}

/// Fields left `None` keep their stored value. For the optional columns
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderChanges {
    pub name: Option<String>,
    pub kind: Option<ProviderType>,
    pub address: Option<Option<String>>,
    pub city: Option<String>,
    pub contact: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReceiver {
    pub name: String,
    pub kind: ReceiverType,
    pub city: String,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverChanges {
    pub name: Option<String>,
    pub kind: Option<ReceiverType>,
    pub city: Option<String>,
    pub contact: Option<Option<String>>,
}

/// The provider type is not part of the input; it is copied from the
/// provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFoodListing {
    pub food_name: String,
    pub quantity: i32,
    pub expiry_date: NaiveDate,
    pub provider_id: i32,
    pub location: String,
    pub food_type: FoodType,
    pub meal_type: MealType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodListingChanges {
    pub food_name: Option<String>,
    pub quantity: Option<i32>,
    pub expiry_date: Option<NaiveDate>,
    /// Moving a listing to another provider also takes that provider's type
    pub provider_id: Option<i32>,
    pub location: Option<String>,
    pub food_type: Option<FoodType>,
    pub meal_type: Option<MealType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClaim {
    pub food_id: i32,
    pub receiver_id: i32,
    pub status: ClaimStatus,
}

/// The claim timestamp is fixed at creation and cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimChanges {
    pub food_id: Option<i32>,
    pub receiver_id: Option<i32>,
    pub status: Option<ClaimStatus>,
}

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        Err(Error::validation(field, "must not be empty"))
    } else {
        Ok(value.to_owned())
    }
}

/// Blank optional text is stored as null.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

pub(crate) fn positive_quantity(field: &str, quantity: i32) -> Result<i32> {
    if quantity < 1 {
        Err(Error::validation(field, format!("must be at least 1, got {quantity}")))
    } else {
        Ok(quantity)
    }
}

async fn referenced_provider<C>(db: &C, provider_id: i32) -> Result<provider::Model>
where
    C: ConnectionTrait,
{
    provider::Entity::find_by_id(provider_id)
        .one(db)
        .await?
        .ok_or(Error::ConstraintViolation {
            table: Table::FoodListings,
            column: "provider_id",
            value: provider_id,
            target: "provider",
        })
}

async fn ensure_listing<C>(db: &C, food_id: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    match food_listing::Entity::find_by_id(food_id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(Error::ConstraintViolation {
            table: Table::Claims,
            column: "food_id",
            value: food_id,
            target: "food listing",
        }),
    }
}

async fn ensure_receiver<C>(db: &C, receiver_id: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    match receiver::Entity::find_by_id(receiver_id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(Error::ConstraintViolation {
            table: Table::Claims,
            column: "receiver_id",
            value: receiver_id,
            target: "receiver",
        }),
    }
}

impl Store {
    #[instrument(level = "debug", skip_all)]
    pub async fn create_provider(&self, input: NewProvider) -> Result<i32> {
        let model = provider::ActiveModel {
            name: Set(required("name", &input.name)?),
            kind: Set(input.kind),
            address: Set(optional(input.address)),
            city: Set(required("city", &input.city)?),
            contact: Set(optional(input.contact)),
            ..Default::default()
        };
        let write = self.write().await?;
        let id = provider::Entity::insert(model)
            .exec(&write.txn)
            .await?
            .last_insert_id;
        write.commit().await?;
        tracing::debug!(provider_id = id, "provider created");
        Ok(id)
    }

    #[instrument(level = "debug", skip_all)]
    pub async fn create_receiver(&self, input: NewReceiver) -> Result<i32> {
        let model = receiver::ActiveModel {
            name: Set(required("name", &input.name)?),
            kind: Set(input.kind),
            city: Set(required("city", &input.city)?),
            contact: Set(optional(input.contact)),
            ..Default::default()
        };
        let write = self.write().await?;
        let id = receiver::Entity::insert(model)
            .exec(&write.txn)
            .await?
            .last_insert_id;
        write.commit().await?;
        tracing::debug!(receiver_id = id, "receiver created");
        Ok(id)
    }

    #[instrument(level = "debug", skip_all, fields(provider_id = input.provider_id))]
    pub async fn create_food_listing(&self, input: NewFoodListing) -> Result<i32> {
        let food_name = required("food_name", &input.food_name)?;
        let location = required("location", &input.location)?;
        let quantity = positive_quantity("quantity", input.quantity)?;

        let write = self.write().await?;
        let provider = referenced_provider(&write.txn, input.provider_id).await?;
        let model = food_listing::ActiveModel {
            food_name: Set(food_name),
            quantity: Set(quantity),
            expiry_date: Set(input.expiry_date),
            provider_id: Set(provider.provider_id),
            provider_type: Set(provider.kind),
            location: Set(location),
            food_type: Set(input.food_type),
            meal_type: Set(input.meal_type),
            ..Default::default()
        };
        let id = food_listing::Entity::insert(model)
            .exec(&write.txn)
            .await?
            .last_insert_id;
        write.commit().await?;
        tracing::debug!(food_id = id, "food listing created");
        Ok(id)
    }

    /// The timestamp is taken from the clock, in UTC.
    #[instrument(level = "debug", skip_all, fields(food_id = input.food_id, receiver_id = input.receiver_id))]
    pub async fn create_claim(&self, input: NewClaim) -> Result<i32> {
        let write = self.write().await?;
        ensure_listing(&write.txn, input.food_id).await?;
        ensure_receiver(&write.txn, input.receiver_id).await?;
        let model = claim::ActiveModel {
            food_id: Set(input.food_id),
            receiver_id: Set(input.receiver_id),
            status: Set(input.status),
            timestamp: Set(Some(Utc::now().naive_utc())),
            ..Default::default()
        };
        let id = claim::Entity::insert(model)
            .exec(&write.txn)
            .await?
            .last_insert_id;
        write.commit().await?;
        tracing::debug!(claim_id = id, "claim created");
        Ok(id)
    }

    /// Listings keep the provider type they were created with; see
    /// [`Store::resync_provider_types`].
    #[instrument(level = "debug", skip(self, changes))]
    pub async fn update_provider(&self, provider_id: i32, changes: ProviderChanges) -> Result<u64> {
        let write = self.write().await?;
        let existing = provider::Entity::find_by_id(provider_id)
            .one(&write.txn)
            .await?
            .ok_or_else(|| Error::not_found(Table::Providers, provider_id))?;

        let mut model: provider::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            model.name = Set(required("name", &name)?);
        }
        if let Some(kind) = changes.kind {
            model.kind = Set(kind);
        }
        if let Some(address) = changes.address {
            model.address = Set(optional(address));
        }
        if let Some(city) = changes.city {
            model.city = Set(required("city", &city)?);
        }
        if let Some(contact) = changes.contact {
            model.contact = Set(optional(contact));
        }
        if model.is_changed() {
            model.update(&write.txn).await?;
        }
        write.commit().await?;
        Ok(1)
    }

    #[instrument(level = "debug", skip(self, changes))]
    pub async fn update_receiver(&self, receiver_id: i32, changes: ReceiverChanges) -> Result<u64> {
        let write = self.write().await?;
        let existing = receiver::Entity::find_by_id(receiver_id)
            .one(&write.txn)
            .await?
            .ok_or_else(|| Error::not_found(Table::Receivers, receiver_id))?;

        let mut model: receiver::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            model.name = Set(required("name", &name)?);
        }
        if let Some(kind) = changes.kind {
            model.kind = Set(kind);
        }
        if let Some(city) = changes.city {
            model.city = Set(required("city", &city)?);
        }
        if let Some(contact) = changes.contact {
            model.contact = Set(optional(contact));
        }
        if model.is_changed() {
            model.update(&write.txn).await?;
        }
        write.commit().await?;
        Ok(1)
    }

    #[instrument(level = "debug", skip(self, changes))]
    pub async fn update_food_listing(&self, food_id: i32, changes: FoodListingChanges) -> Result<u64> {
        let write = self.write().await?;
        let existing = food_listing::Entity::find_by_id(food_id)
            .one(&write.txn)
            .await?
            .ok_or_else(|| Error::not_found(Table::FoodListings, food_id))?;
        let current_provider = existing.provider_id;

        let mut model: food_listing::ActiveModel = existing.into();
        if let Some(food_name) = changes.food_name {
            model.food_name = Set(required("food_name", &food_name)?);
        }
        if let Some(quantity) = changes.quantity {
            model.quantity = Set(positive_quantity("quantity", quantity)?);
        }
        if let Some(expiry_date) = changes.expiry_date {
            model.expiry_date = Set(expiry_date);
        }
        if let Some(location) = changes.location {
            model.location = Set(required("location", &location)?);
        }
        if let Some(food_type) = changes.food_type {
            model.food_type = Set(food_type);
        }
        if let Some(meal_type) = changes.meal_type {
            model.meal_type = Set(meal_type);
        }
        match changes.provider_id {
            Some(provider_id) if provider_id != current_provider => {
                let provider = referenced_provider(&write.txn, provider_id).await?;
                model.provider_id = Set(provider.provider_id);
                model.provider_type = Set(provider.kind);
            }
            _ => {}
        }
        if model.is_changed() {
            model.update(&write.txn).await?;
        }
        write.commit().await?;
        Ok(1)
    }

    #[instrument(level = "debug", skip(self, changes))]
    pub async fn update_claim(&self, claim_id: i32, changes: ClaimChanges) -> Result<u64> {
        let write = self.write().await?;
        let existing = claim::Entity::find_by_id(claim_id)
            .one(&write.txn)
            .await?
            .ok_or_else(|| Error::not_found(Table::Claims, claim_id))?;

        let mut model: claim::ActiveModel = existing.into();
        if let Some(food_id) = changes.food_id {
            ensure_listing(&write.txn, food_id).await?;
            model.food_id = Set(food_id);
        }
        if let Some(receiver_id) = changes.receiver_id {
            ensure_receiver(&write.txn, receiver_id).await?;
            model.receiver_id = Set(receiver_id);
        }
        if let Some(status) = changes.status {
            model.status = Set(status);
        }
        if model.is_changed() {
            model.update(&write.txn).await?;
        }
        write.commit().await?;
        Ok(1)
    }

    pub async fn update_claim_status(&self, claim_id: i32, status: ClaimStatus) -> Result<u64> {
        self.update_claim(
            claim_id,
            ClaimChanges {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    /// Refused with [`Error::ReferentialBlock`] while listings reference the
    /// provider.
    #[instrument(level = "debug", skip(self))]
    pub async fn delete_provider(&self, provider_id: i32) -> Result<u64> {
        let write = self.write().await?;
        let dependents = food_listing::Entity::find()
            .filter(food_listing::Column::ProviderId.eq(provider_id))
            .count(&write.txn)
            .await?;
        if dependents > 0 {
            return Err(Error::ReferentialBlock {
                table: Table::Providers,
                id: provider_id,
                dependent_table: Table::FoodListings,
                dependents,
            });
        }
        let res = provider::Entity::delete_by_id(provider_id)
            .exec(&write.txn)
            .await?;
        if res.rows_affected == 0 {
            return Err(Error::not_found(Table::Providers, provider_id));
        }
        write.commit().await?;
        Ok(res.rows_affected)
    }

    /// Also deletes the receiver's claims.
    #[instrument(level = "debug", skip(self))]
    pub async fn delete_receiver(&self, receiver_id: i32) -> Result<u64> {
        let write = self.write().await?;
        let claims = claim::Entity::delete_many()
            .filter(claim::Column::ReceiverId.eq(receiver_id))
            .exec(&write.txn)
            .await?;
        let res = receiver::Entity::delete_by_id(receiver_id)
            .exec(&write.txn)
            .await?;
        if res.rows_affected == 0 {
            return Err(Error::not_found(Table::Receivers, receiver_id));
        }
        write.commit().await?;
        tracing::debug!(claims = claims.rows_affected, "receiver deleted with its claims");
        Ok(res.rows_affected)
    }

    /// Also deletes the claims against the listing.
    #[instrument(level = "debug", skip(self))]
    pub async fn delete_food_listing(&self, food_id: i32) -> Result<u64> {
        let write = self.write().await?;
        let claims = claim::Entity::delete_many()
            .filter(claim::Column::FoodId.eq(food_id))
            .exec(&write.txn)
            .await?;
        let res = food_listing::Entity::delete_by_id(food_id)
            .exec(&write.txn)
            .await?;
        if res.rows_affected == 0 {
            return Err(Error::not_found(Table::FoodListings, food_id));
        }
        write.commit().await?;
        tracing::debug!(claims = claims.rows_affected, "food listing deleted with its claims");
        Ok(res.rows_affected)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn delete_claim(&self, claim_id: i32) -> Result<u64> {
        let write = self.write().await?;
        let res = claim::Entity::delete_by_id(claim_id).exec(&write.txn).await?;
        if res.rows_affected == 0 {
            return Err(Error::not_found(Table::Claims, claim_id));
        }
        write.commit().await?;
        Ok(res.rows_affected)
    }

    /// Delete by storage table and key column name, e.g.
    /// `delete_record("providers", "provider_id", 3)`. The column must be the
    /// table's primary key.
    pub async fn delete_record(&self, table: &str, id_column: &str, id: i32) -> Result<u64> {
        let table: Table = table.parse()?;
        if !id_column.trim().eq_ignore_ascii_case(table.id_column()) {
            return Err(Error::validation(
                "id_column",
                format!("`{id_column}` is not the key of {table}, expected `{}`", table.id_column()),
            ));
        }
        match table {
            Table::Providers => self.delete_provider(id).await,
            Table::Receivers => self.delete_receiver(id).await,
            Table::FoodListings => self.delete_food_listing(id).await,
            Table::Claims => self.delete_claim(id).await,
        }
    }

    /// Copies every provider's current type onto its listings and returns the
    /// number of listings that changed.
    #[instrument(level = "debug", skip(self))]
    pub async fn resync_provider_types(&self) -> Result<u64> {
        let write = self.write().await?;
        let providers = provider::Entity::find().all(&write.txn).await?;
        let mut changed = 0;
        for provider in providers {
            let res = food_listing::Entity::update_many()
                .col_expr(food_listing::Column::ProviderType, Expr::value(provider.kind))
                .filter(food_listing::Column::ProviderId.eq(provider.provider_id))
                .filter(food_listing::Column::ProviderType.ne(provider.kind))
                .exec(&write.txn)
                .await?;
            changed += res.rows_affected;
        }
        write.commit().await?;
        tracing::info!(changed, "provider types resynced");
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields_are_trimmed() {
        assert_eq!(required("name", "  Soup Run ").unwrap(), "Soup Run");
        let err = required("city", "   ").unwrap_err();
        assert_eq!(err.to_string(), "invalid `city`: must not be empty");
    }

    #[test]
    fn blank_optional_text_is_null() {
        assert_eq!(optional(Some(" ".into())), None);
        assert_eq!(optional(Some(" 555-0101 ".into())), Some("555-0101".into()));
        assert_eq!(optional(None), None);
    }

    #[test]
    fn quantity_must_be_positive() {
        assert!(positive_quantity("quantity", 0).is_err());
        assert!(positive_quantity("quantity", -4).is_err());
        assert_eq!(positive_quantity("quantity", 1).unwrap(), 1);
    }
}
