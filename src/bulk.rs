//! All-or-nothing replacement of the store contents.
//!
//! Input rows keep their ids. Everything is validated before the write
//! starts; the clear and the inserts then run in one transaction, so a
//! failure at any point leaves the previous contents in place.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use itertools::Itertools;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DbBackend, DbErr, EntityTrait, IntoActiveModel, Set,
};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use strum::IntoEnumIterator;
use tracing::instrument;

use crate::entity::sea_orm_active_enums::{ClaimStatus, FoodType, MealType, ProviderType, ReceiverType};
use crate::entity::{claim, food_listing, provider, receiver, Table};
use crate::error::{Error, Result};
use crate::mutation::{optional, positive_quantity, required};
use crate::store::Store;

pub const PROVIDERS_FILE: &str = "providers_data.csv";
pub const RECEIVERS_FILE: &str = "receivers_data.csv";
pub const FOOD_LISTINGS_FILE: &str = "food_listings_data.csv";
pub const CLAIMS_FILE: &str = "claims_data.csv";

/// Rows per multi-row insert. Keeps a listing chunk under SQLite's 999
/// bound parameters.
const INSERT_CHUNK: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRecord {
    #[serde(rename = "Provider_ID")]
    pub provider_id: i32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: ProviderType,
    #[serde(rename = "Address", default)]
    pub address: Option<String>,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Contact", default)]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverRecord {
    #[serde(rename = "Receiver_ID")]
    pub receiver_id: i32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: ReceiverType,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Contact", default)]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodListingRecord {
    #[serde(rename = "Food_ID")]
    pub food_id: i32,
    #[serde(rename = "Food_Name")]
    pub food_name: String,
    #[serde(rename = "Quantity")]
    pub quantity: i32,
    #[serde(rename = "Expiry_Date", deserialize_with = "flexible_date")]
    pub expiry_date: NaiveDate,
    #[serde(rename = "Provider_ID")]
    pub provider_id: i32,
    /// Loaded as given; it is a snapshot and may differ from the provider
    #[serde(rename = "Provider_Type")]
    pub provider_type: ProviderType,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Food_Type")]
    pub food_type: FoodType,
    #[serde(rename = "Meal_Type")]
    pub meal_type: MealType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    #[serde(rename = "Claim_ID")]
    pub claim_id: i32,
    #[serde(rename = "Food_ID")]
    pub food_id: i32,
    #[serde(rename = "Receiver_ID")]
    pub receiver_id: i32,
    #[serde(rename = "Status")]
    pub status: ClaimStatus,
    #[serde(rename = "Timestamp", default, deserialize_with = "flexible_timestamp")]
    pub timestamp: Option<NaiveDateTime>,
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// `YYYY-MM-DD` or `M/D/YYYY`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// ISO-8601 (an offset is converted to UTC), `YYYY-MM-DD HH:MM[:SS]` or
/// `M/D/YYYY H:MM`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

fn flexible_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| de::Error::custom(format!("unrecognized date `{raw}`")))
}

fn flexible_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("unrecognized timestamp `{raw}`"))),
        _ => Ok(None),
    }
}

/// Contents for a full replace, one vector per table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkData {
    pub providers: Vec<ProviderRecord>,
    pub receivers: Vec<ReceiverRecord>,
    pub food_listings: Vec<FoodListingRecord>,
    pub claims: Vec<ClaimRecord>,
}

/// Rows written per table by a successful load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub providers: u64,
    pub receivers: u64,
    pub food_listings: u64,
    pub claims: u64,
}

fn load_failed(table: Table, row: Option<usize>, source: Error) -> Error {
    Error::LoadFailed {
        table,
        row,
        source: Box::new(source),
    }
}

fn read_table<T, R>(table: Table, reader: R) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    reader
        .deserialize()
        .enumerate()
        .map(|(i, record)| record.map_err(|e| load_failed(table, Some(i + 1), e.into())))
        .collect()
}

impl BulkData {
    /// Reads the four CSV files the dataset ships as, using the source
    /// column headers.
    pub fn from_csv_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let open = |table: Table, name: &str| {
            std::fs::File::open(dir.join(name)).map_err(|e| {
                load_failed(
                    table,
                    None,
                    Error::validation("path", format!("{}: {e}", dir.join(name).display())),
                )
            })
        };
        Self::from_readers(
            open(Table::Providers, PROVIDERS_FILE)?,
            open(Table::Receivers, RECEIVERS_FILE)?,
            open(Table::FoodListings, FOOD_LISTINGS_FILE)?,
            open(Table::Claims, CLAIMS_FILE)?,
        )
    }

    pub fn from_readers(
        providers: impl Read,
        receivers: impl Read,
        food_listings: impl Read,
        claims: impl Read,
    ) -> Result<Self> {
        Ok(Self {
            providers: read_table(Table::Providers, providers)?,
            receivers: read_table(Table::Receivers, receivers)?,
            food_listings: read_table(Table::FoodListings, food_listings)?,
            claims: read_table(Table::Claims, claims)?,
        })
    }

    /// Field rules, duplicate ids and references, all within this dataset.
    fn prepare(self) -> Result<Prepared> {
        let mut providers = Vec::with_capacity(self.providers.len());
        let mut provider_ids = HashSet::new();
        for (i, r) in self.providers.into_iter().enumerate() {
            let fail = |e| load_failed(Table::Providers, Some(i + 1), e);
            if !provider_ids.insert(r.provider_id) {
                return Err(fail(duplicate("Provider_ID", r.provider_id)));
            }
            providers.push(provider::ActiveModel {
                provider_id: Set(r.provider_id),
                name: Set(required("Name", &r.name).map_err(fail)?),
                kind: Set(r.kind),
                address: Set(optional(r.address)),
                city: Set(required("City", &r.city).map_err(fail)?),
                contact: Set(optional(r.contact)),
            });
        }

        let mut receivers = Vec::with_capacity(self.receivers.len());
        let mut receiver_ids = HashSet::new();
        for (i, r) in self.receivers.into_iter().enumerate() {
            let fail = |e| load_failed(Table::Receivers, Some(i + 1), e);
            if !receiver_ids.insert(r.receiver_id) {
                return Err(fail(duplicate("Receiver_ID", r.receiver_id)));
            }
            receivers.push(receiver::ActiveModel {
                receiver_id: Set(r.receiver_id),
                name: Set(required("Name", &r.name).map_err(fail)?),
                kind: Set(r.kind),
                city: Set(required("City", &r.city).map_err(fail)?),
                contact: Set(optional(r.contact)),
            });
        }

        let mut food_listings = Vec::with_capacity(self.food_listings.len());
        let mut food_ids = HashSet::new();
        for (i, r) in self.food_listings.into_iter().enumerate() {
            let fail = |e| load_failed(Table::FoodListings, Some(i + 1), e);
            if !food_ids.insert(r.food_id) {
                return Err(fail(duplicate("Food_ID", r.food_id)));
            }
            if !provider_ids.contains(&r.provider_id) {
                return Err(fail(Error::ConstraintViolation {
                    table: Table::FoodListings,
                    column: "provider_id",
                    value: r.provider_id,
                    target: "provider",
                }));
            }
            food_listings.push(food_listing::ActiveModel {
                food_id: Set(r.food_id),
                food_name: Set(required("Food_Name", &r.food_name).map_err(fail)?),
                quantity: Set(positive_quantity("Quantity", r.quantity).map_err(fail)?),
                expiry_date: Set(r.expiry_date),
                provider_id: Set(r.provider_id),
                provider_type: Set(r.provider_type),
                location: Set(required("Location", &r.location).map_err(fail)?),
                food_type: Set(r.food_type),
                meal_type: Set(r.meal_type),
            });
        }

        let mut claims = Vec::with_capacity(self.claims.len());
        let mut claim_ids = HashSet::new();
        for (i, r) in self.claims.into_iter().enumerate() {
            let fail = |e| load_failed(Table::Claims, Some(i + 1), e);
            if !claim_ids.insert(r.claim_id) {
                return Err(fail(duplicate("Claim_ID", r.claim_id)));
            }
            if !food_ids.contains(&r.food_id) {
                return Err(fail(Error::ConstraintViolation {
                    table: Table::Claims,
                    column: "food_id",
                    value: r.food_id,
                    target: "food listing",
                }));
            }
            if !receiver_ids.contains(&r.receiver_id) {
                return Err(fail(Error::ConstraintViolation {
                    table: Table::Claims,
                    column: "receiver_id",
                    value: r.receiver_id,
                    target: "receiver",
                }));
            }
            claims.push(claim::ActiveModel {
                claim_id: Set(r.claim_id),
                food_id: Set(r.food_id),
                receiver_id: Set(r.receiver_id),
                status: Set(r.status),
                timestamp: Set(r.timestamp),
            });
        }

        Ok(Prepared {
            providers,
            receivers,
            food_listings,
            claims,
        })
    }
}

fn duplicate(field: &str, id: i32) -> Error {
    Error::validation(field, format!("id {id} appears more than once"))
}

struct Prepared {
    providers: Vec<provider::ActiveModel>,
    receivers: Vec<receiver::ActiveModel>,
    food_listings: Vec<food_listing::ActiveModel>,
    claims: Vec<claim::ActiveModel>,
}

async fn insert_chunked<A, C>(db: &C, table: Table, models: Vec<A>) -> Result<u64>
where
    A: ActiveModelTrait + Send + 'static,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    C: ConnectionTrait,
{
    let chunks: Vec<Vec<A>> = models
        .into_iter()
        .chunks(INSERT_CHUNK)
        .into_iter()
        .map(Iterator::collect)
        .collect();
    let mut inserted = 0;
    for chunk in chunks {
        inserted += A::Entity::insert_many(chunk)
            .exec_without_returning(db)
            .await
            .map_err(|e| load_failed(table, None, e.into()))?;
    }
    Ok(inserted)
}

/// Moves each identity sequence past the loaded ids. SQLite tracks this on
/// its own.
async fn reset_sequences<C>(db: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    if db.get_database_backend() != DbBackend::Postgres {
        return Ok(());
    }
    for table in Table::iter() {
        let id = table.id_column();
        db.execute_unprepared(&format!(
            "SELECT setval(pg_get_serial_sequence('{table}', '{id}'), \
             COALESCE((SELECT MAX({id}) FROM {table}), 0) + 1, false)"
        ))
        .await?;
    }
    Ok(())
}

async fn replace_all<C>(db: &C, prepared: Prepared) -> Result<LoadReport>
where
    C: ConnectionTrait,
{
    let clear = |table: Table| move |e: DbErr| load_failed(table, None, e.into());
    claim::Entity::delete_many()
        .exec(db)
        .await
        .map_err(clear(Table::Claims))?;
    food_listing::Entity::delete_many()
        .exec(db)
        .await
        .map_err(clear(Table::FoodListings))?;
    provider::Entity::delete_many()
        .exec(db)
        .await
        .map_err(clear(Table::Providers))?;
    receiver::Entity::delete_many()
        .exec(db)
        .await
        .map_err(clear(Table::Receivers))?;

    let report = LoadReport {
        providers: insert_chunked(db, Table::Providers, prepared.providers).await?,
        receivers: insert_chunked(db, Table::Receivers, prepared.receivers).await?,
        food_listings: insert_chunked(db, Table::FoodListings, prepared.food_listings).await?,
        claims: insert_chunked(db, Table::Claims, prepared.claims).await?,
    };
    reset_sequences(db)
        .await
        .map_err(clear(Table::Providers))?;
    Ok(report)
}

impl Store {
    /// Replaces all four tables with `data`.
    ///
    /// Every failure comes back as [`Error::LoadFailed`] and leaves the
    /// store unchanged.
    #[instrument(
        level = "info",
        skip_all,
        fields(
            providers = data.providers.len(),
            receivers = data.receivers.len(),
            food_listings = data.food_listings.len(),
            claims = data.claims.len(),
        )
    )]
    pub async fn bulk_load(&self, data: BulkData) -> Result<LoadReport> {
        let prepared = data.prepare()?;
        let write = self.write().await?;
        match replace_all(&write.txn, prepared).await {
            Ok(report) => {
                write
                    .commit()
                    .await
                    .map_err(|e| load_failed(Table::Claims, None, e))?;
                tracing::info!(?report, "bulk load committed");
                Ok(report)
            }
            Err(err) => {
                tracing::warn!(error = %err, "bulk load rolled back");
                write.rollback().await?;
                Err(err)
            }
        }
    }

    pub async fn load_csv_dir(&self, dir: impl AsRef<Path>) -> Result<LoadReport> {
        self.bulk_load(BulkData::from_csv_dir(dir)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    const PROVIDERS: &str = "\
Provider_ID,Name,Type,Address,City,Contact
1,Gonzales Inc,Grocery Store,74347 Christopher Extensions,New Jessica,+1-600-220-0480
2,Nielsen Group,Restaurant,,East Sheena,
";

    const RECEIVERS: &str = "\
Receiver_ID,Name,Type,City,Contact
1,Donald Gomez,Shelter,Port Carol,(955)922-5295
";

    const LISTINGS: &str = "\
Food_ID,Food_Name,Quantity,Expiry_Date,Provider_ID,Provider_Type,Location,Food_Type,Meal_Type
1,Bread,43,3/17/2025,1,Grocery Store,New Jessica,Vegetarian,Breakfast
2,Soup,22,2025-03-24,2,Restaurant,East Sheena,Non-Vegetarian,Dinner
";

    const CLAIMS: &str = "\
Claim_ID,Food_ID,Receiver_ID,Status,Timestamp
1,1,1,Pending,3/5/2025 5:26
2,2,1,Completed,
";

    fn sample() -> BulkData {
        BulkData::from_readers(
            PROVIDERS.as_bytes(),
            RECEIVERS.as_bytes(),
            LISTINGS.as_bytes(),
            CLAIMS.as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn reads_source_headers() {
        let data = sample();
        assert_eq!(data.providers.len(), 2);
        assert_eq!(data.providers[0].kind, ProviderType::GroceryStore);
        assert_eq!(data.providers[1].address, None);
        assert_eq!(data.providers[1].contact, None);
        assert_eq!(
            data.food_listings[0].expiry_date,
            NaiveDate::from_ymd_opt(2025, 3, 17).unwrap()
        );
        assert_eq!(data.food_listings[1].food_type, FoodType::NonVegetarian);
        assert_eq!(
            data.claims[0].timestamp,
            NaiveDate::from_ymd_opt(2025, 3, 5).unwrap().and_hms_opt(5, 26, 0)
        );
        assert_eq!(data.claims[1].timestamp, None);
    }

    #[test]
    fn bad_enum_names_the_row() {
        let claims = "Claim_ID,Food_ID,Receiver_ID,Status,Timestamp\n1,1,1,Lost,\n";
        let err = BulkData::from_readers(
            PROVIDERS.as_bytes(),
            RECEIVERS.as_bytes(),
            LISTINGS.as_bytes(),
            claims.as_bytes(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(matches!(
            err,
            Error::LoadFailed {
                table: Table::Claims,
                row: Some(1),
                ..
            }
        ));
    }

    #[test]
    fn dangling_reference_is_rejected_before_writing() {
        let mut data = sample();
        data.claims[1].receiver_id = 9;
        let err = data.prepare().err().unwrap();
        match err {
            Error::LoadFailed { table, row, source } => {
                assert_eq!(table, Table::Claims);
                assert_eq!(row, Some(2));
                assert_eq!(source.kind(), ErrorKind::ConstraintViolation);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut data = sample();
        data.providers[1].provider_id = 1;
        assert!(data.prepare().is_err());
    }

    #[test]
    fn timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(17, 26, 0)
            .unwrap();
        for raw in [
            "2025-03-05T17:26:00",
            "2025-03-05 17:26:00",
            "2025-03-05 17:26",
            "3/5/2025 17:26",
            "2025-03-05T17:26:00Z",
        ] {
            assert_eq!(parse_timestamp(raw), Some(expected), "{raw}");
        }
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_date("2025-02-30"), None);
    }
}
