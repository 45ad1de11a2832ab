//! Read operations: lookups, listing search and the directory views.

use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    Paginator, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, SelectModel,
    Selector,
};
use serde::Serialize;
use tracing::instrument;

use crate::entity::sea_orm_active_enums::{ClaimStatus, FoodType, MealType, ProviderType};
use crate::entity::{claim, food_listing, provider, receiver, Table};
use crate::error::{Error, Result};
use crate::filter::{FilterColumn, ListingFilter, ProviderFilter, ReceiverFilter};
use crate::report::{Cell, TableRow};
use crate::store::Store;

/// A food listing joined with its provider.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct ListingSearchRow {
    pub food_id: i32,
    pub food_name: String,
    pub quantity: i32,
    pub expiry_date: NaiveDate,
    pub food_type: FoodType,
    pub meal_type: MealType,
    pub location: String,
    pub provider_name: String,
    /// The provider's current type
    pub provider_type: ProviderType,
    pub provider_contact: Option<String>,
}

impl TableRow for ListingSearchRow {
    const COLUMNS: &'static [&'static str] = &[
        "Food_ID",
        "Food_Name",
        "Quantity",
        "Expiry_Date",
        "Food_Type",
        "Meal_Type",
        "Location",
        "Provider_Name",
        "Provider_Type",
        "Provider_Contact",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.food_id.into(),
            self.food_name.as_str().into(),
            self.quantity.into(),
            self.expiry_date.to_string().into(),
            self.food_type.into(),
            self.meal_type.into(),
            self.location.as_str().into(),
            self.provider_name.as_str().into(),
            self.provider_type.into(),
            self.provider_contact.clone().into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct RecentListing {
    pub food_id: i32,
    pub food_name: String,
    pub quantity: i32,
    pub expiry_date: NaiveDate,
    pub location: String,
    pub provider_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct ClaimDetail {
    pub claim_id: i32,
    pub food_id: i32,
    pub food_name: String,
    pub receiver_id: i32,
    pub receiver_name: String,
    pub status: ClaimStatus,
    pub timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderActivity {
    pub provider_id: i32,
    pub name: String,
    pub listings: u64,
    pub listed_quantity: i64,
    pub claims: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiverActivity {
    pub receiver_id: i32,
    pub name: String,
    pub total_claims: i64,
    pub completed_claims: i64,
    pub pending_claims: i64,
    pub cancelled_claims: i64,
}

/// Which side of the exchange a directory view covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Party {
    Providers,
    Receivers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    pub kind: String,
    pub count: i64,
}

/// How to reach a provider or receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactCard {
    pub party: Party,
    pub id: i32,
    pub name: String,
    pub kind: String,
    pub address: Option<String>,
    pub contact: Option<String>,
}

pub(crate) async fn count<C>(db: &C, table: Table) -> Result<u64>
where
    C: ConnectionTrait,
{
    let n = match table {
        Table::Providers => provider::Entity::find().count(db).await?,
        Table::Receivers => receiver::Entity::find().count(db).await?,
        Table::FoodListings => food_listing::Entity::find().count(db).await?,
        Table::Claims => claim::Entity::find().count(db).await?,
    };
    Ok(n)
}

fn listing_search(filter: &ListingFilter) -> Selector<SelectModel<ListingSearchRow>> {
    food_listing::Entity::find()
        .select_only()
        .columns([
            food_listing::Column::FoodId,
            food_listing::Column::FoodName,
            food_listing::Column::Quantity,
            food_listing::Column::ExpiryDate,
            food_listing::Column::FoodType,
            food_listing::Column::MealType,
            food_listing::Column::Location,
        ])
        .column_as(provider::Column::Name, "provider_name")
        .column_as(provider::Column::Kind, "provider_type")
        .column_as(provider::Column::Contact, "provider_contact")
        .inner_join(provider::Entity)
        .filter(filter.condition())
        .order_by_desc(food_listing::Column::FoodId)
        .into_model::<ListingSearchRow>()
}

async fn distinct_values<E, C, Db>(db: &Db, column: C) -> Result<Vec<String>, DbErr>
where
    E: EntityTrait,
    C: ColumnTrait,
    Db: ConnectionTrait,
{
    E::find()
        .select_only()
        .column(column)
        .distinct()
        .filter(column.is_not_null())
        .order_by_asc(column)
        .into_tuple::<String>()
        .all(db)
        .await
}

impl Store {
    pub async fn get_provider(&self, provider_id: i32) -> Result<provider::Model> {
        provider::Entity::find_by_id(provider_id)
            .one(self.connection())
            .await?
            .ok_or_else(|| Error::not_found(Table::Providers, provider_id))
    }

    pub async fn get_receiver(&self, receiver_id: i32) -> Result<receiver::Model> {
        receiver::Entity::find_by_id(receiver_id)
            .one(self.connection())
            .await?
            .ok_or_else(|| Error::not_found(Table::Receivers, receiver_id))
    }

    pub async fn get_food_listing(&self, food_id: i32) -> Result<food_listing::Model> {
        food_listing::Entity::find_by_id(food_id)
            .one(self.connection())
            .await?
            .ok_or_else(|| Error::not_found(Table::FoodListings, food_id))
    }

    pub async fn get_claim(&self, claim_id: i32) -> Result<claim::Model> {
        claim::Entity::find_by_id(claim_id)
            .one(self.connection())
            .await?
            .ok_or_else(|| Error::not_found(Table::Claims, claim_id))
    }

    pub async fn list_providers(&self) -> Result<Vec<provider::Model>> {
        Ok(provider::Entity::find()
            .order_by_asc(provider::Column::ProviderId)
            .all(self.connection())
            .await?)
    }

    pub async fn list_receivers(&self) -> Result<Vec<receiver::Model>> {
        Ok(receiver::Entity::find()
            .order_by_asc(receiver::Column::ReceiverId)
            .all(self.connection())
            .await?)
    }

    pub async fn list_food_listings(&self) -> Result<Vec<food_listing::Model>> {
        Ok(food_listing::Entity::find()
            .order_by_asc(food_listing::Column::FoodId)
            .all(self.connection())
            .await?)
    }

    pub async fn list_claims(&self) -> Result<Vec<claim::Model>> {
        Ok(claim::Entity::find()
            .order_by_asc(claim::Column::ClaimId)
            .all(self.connection())
            .await?)
    }

    /// Listings matching every present filter key, newest id first.
    #[instrument(level = "debug", skip(self))]
    pub async fn search_food_listings(&self, filter: &ListingFilter) -> Result<Vec<ListingSearchRow>> {
        let rows = listing_search(filter).all(self.connection()).await?;
        tracing::debug!(rows = rows.len(), "listing search");
        Ok(rows)
    }

    /// Same rows as [`Store::search_food_listings`], fetched `page_size` at a
    /// time.
    pub fn search_food_listings_paged(
        &self,
        filter: &ListingFilter,
        page_size: u64,
    ) -> Paginator<'_, DatabaseConnection, SelectModel<ListingSearchRow>> {
        listing_search(filter).paginate(self.connection(), page_size)
    }

    /// Distinct non-null values of a filterable column, ascending.
    pub async fn unique_values(&self, column: FilterColumn) -> Result<Vec<String>> {
        let db = self.connection();
        let values = match column {
            FilterColumn::ListingLocation => {
                distinct_values::<food_listing::Entity, _, _>(db, food_listing::Column::Location).await?
            }
            FilterColumn::ListingFoodType => {
                distinct_values::<food_listing::Entity, _, _>(db, food_listing::Column::FoodType).await?
            }
            FilterColumn::ListingMealType => {
                distinct_values::<food_listing::Entity, _, _>(db, food_listing::Column::MealType).await?
            }
            FilterColumn::ProviderCity => {
                distinct_values::<provider::Entity, _, _>(db, provider::Column::City).await?
            }
            FilterColumn::ProviderType => {
                distinct_values::<provider::Entity, _, _>(db, provider::Column::Kind).await?
            }
            FilterColumn::ReceiverCity => {
                distinct_values::<receiver::Entity, _, _>(db, receiver::Column::City).await?
            }
            FilterColumn::ReceiverType => {
                distinct_values::<receiver::Entity, _, _>(db, receiver::Column::Kind).await?
            }
            FilterColumn::ClaimStatus => {
                distinct_values::<claim::Entity, _, _>(db, claim::Column::Status).await?
            }
        };
        Ok(values)
    }

    pub async fn search_providers(&self, filter: &ProviderFilter) -> Result<Vec<provider::Model>> {
        Ok(provider::Entity::find()
            .filter(filter.condition())
            .order_by_asc(provider::Column::Name)
            .order_by_asc(provider::Column::ProviderId)
            .all(self.connection())
            .await?)
    }

    pub async fn search_receivers(&self, filter: &ReceiverFilter) -> Result<Vec<receiver::Model>> {
        Ok(receiver::Entity::find()
            .filter(filter.condition())
            .order_by_asc(receiver::Column::Name)
            .order_by_asc(receiver::Column::ReceiverId)
            .all(self.connection())
            .await?)
    }

    pub async fn provider_activity(&self, provider_id: i32) -> Result<ProviderActivity> {
        let provider = self.get_provider(provider_id).await?;
        let db = self.connection();
        let listings = food_listing::Entity::find()
            .filter(food_listing::Column::ProviderId.eq(provider_id))
            .count(db)
            .await?;
        let listed_quantity = food_listing::Entity::find()
            .select_only()
            .column_as(
                Expr::col((food_listing::Entity, food_listing::Column::Quantity)).sum(),
                "listed_quantity",
            )
            .filter(food_listing::Column::ProviderId.eq(provider_id))
            .into_tuple::<Option<i64>>()
            .one(db)
            .await?
            .flatten()
            .unwrap_or(0);
        let claims = claim::Entity::find()
            .inner_join(food_listing::Entity)
            .filter(food_listing::Column::ProviderId.eq(provider_id))
            .count(db)
            .await?;
        Ok(ProviderActivity {
            provider_id,
            name: provider.name,
            listings,
            listed_quantity,
            claims,
        })
    }

    pub async fn receiver_activity(&self, receiver_id: i32) -> Result<ReceiverActivity> {
        let receiver = self.get_receiver(receiver_id).await?;
        let by_status: Vec<(ClaimStatus, i64)> = claim::Entity::find()
            .select_only()
            .column(claim::Column::Status)
            .column_as(Expr::col((claim::Entity, claim::Column::ClaimId)).count(), "claims")
            .filter(claim::Column::ReceiverId.eq(receiver_id))
            .group_by(claim::Column::Status)
            .into_tuple()
            .all(self.connection())
            .await?;
        let of = |status: ClaimStatus| {
            by_status
                .iter()
                .find(|(s, _)| *s == status)
                .map_or(0, |(_, n)| *n)
        };
        Ok(ReceiverActivity {
            receiver_id,
            name: receiver.name,
            total_claims: by_status.iter().map(|(_, n)| n).sum(),
            completed_claims: of(ClaimStatus::Completed),
            pending_claims: of(ClaimStatus::Pending),
            cancelled_claims: of(ClaimStatus::Cancelled),
        })
    }

    /// Head-count per type, optionally within one city. Ordered by type.
    pub async fn type_summary(&self, party: Party, city: Option<&str>) -> Result<Vec<TypeCount>> {
        let db = self.connection();
        let rows: Vec<(String, i64)> = match party {
            Party::Providers => {
                provider::Entity::find()
                    .select_only()
                    .column(provider::Column::Kind)
                    .column_as(
                        Expr::col((provider::Entity, provider::Column::ProviderId)).count(),
                        "count",
                    )
                    .apply_if(city, |q, city| q.filter(provider::Column::City.eq(city)))
                    .group_by(provider::Column::Kind)
                    .order_by_asc(provider::Column::Kind)
                    .into_tuple()
                    .all(db)
                    .await?
            }
            Party::Receivers => {
                receiver::Entity::find()
                    .select_only()
                    .column(receiver::Column::Kind)
                    .column_as(
                        Expr::col((receiver::Entity, receiver::Column::ReceiverId)).count(),
                        "count",
                    )
                    .apply_if(city, |q, city| q.filter(receiver::Column::City.eq(city)))
                    .group_by(receiver::Column::Kind)
                    .order_by_asc(receiver::Column::Kind)
                    .into_tuple()
                    .all(db)
                    .await?
            }
        };
        Ok(rows
            .into_iter()
            .map(|(kind, count)| TypeCount { kind, count })
            .collect())
    }

    /// Providers first, then receivers, each by name.
    pub async fn contacts_in_city(&self, city: &str) -> Result<Vec<ContactCard>> {
        let providers = self
            .search_providers(&ProviderFilter {
                city: Some(city.to_owned()),
                ..Default::default()
            })
            .await?;
        let receivers = self
            .search_receivers(&ReceiverFilter {
                city: Some(city.to_owned()),
                ..Default::default()
            })
            .await?;

        let cards = providers
            .into_iter()
            .map(|p| ContactCard {
                party: Party::Providers,
                id: p.provider_id,
                name: p.name,
                kind: p.kind.to_string(),
                address: p.address,
                contact: p.contact,
            })
            .chain(receivers.into_iter().map(|r| ContactCard {
                party: Party::Receivers,
                id: r.receiver_id,
                name: r.name,
                kind: r.kind.to_string(),
                address: None,
                contact: r.contact,
            }))
            .collect();
        Ok(cards)
    }

    /// The `limit` newest listings with their provider's name.
    pub async fn recent_listings(&self, limit: u64) -> Result<Vec<RecentListing>> {
        Ok(food_listing::Entity::find()
            .select_only()
            .columns([
                food_listing::Column::FoodId,
                food_listing::Column::FoodName,
                food_listing::Column::Quantity,
                food_listing::Column::ExpiryDate,
                food_listing::Column::Location,
            ])
            .column_as(provider::Column::Name, "provider_name")
            .inner_join(provider::Entity)
            .order_by_desc(food_listing::Column::FoodId)
            .limit(limit)
            .into_model::<RecentListing>()
            .all(self.connection())
            .await?)
    }

    /// Claims with the food and receiver names, newest first.
    pub async fn list_claim_details(&self) -> Result<Vec<ClaimDetail>> {
        Ok(claim::Entity::find()
            .select_only()
            .columns([
                claim::Column::ClaimId,
                claim::Column::FoodId,
                claim::Column::ReceiverId,
                claim::Column::Status,
                claim::Column::Timestamp,
            ])
            .column_as(food_listing::Column::FoodName, "food_name")
            .column_as(receiver::Column::Name, "receiver_name")
            .inner_join(food_listing::Entity)
            .inner_join(receiver::Entity)
            .order_by_desc(claim::Column::ClaimId)
            .into_model::<ClaimDetail>()
            .all(self.connection())
            .await?)
    }
}
