//! Derived values shared by the report catalog and the dashboard summary.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Days, NaiveDate};
use itertools::Itertools;
use serde::Serialize;

use crate::entity::sea_orm_active_enums::{ClaimStatus, FoodType, ProviderType, ReceiverType};
use crate::report::{Cell, TableRow};
use crate::snapshot::Snapshot;

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Share of claims that were completed, in percent.
pub fn completion_rate(completed: i64, total: i64) -> f64 {
    percentage(completed, total)
}

/// Listed quantity whose listing has at least one completed claim. A listing
/// counts once with its whole quantity, however many completed claims it has.
pub fn rescued_quantity(snapshot: &Snapshot) -> i64 {
    let rescued: HashSet<i32> = snapshot
        .claims
        .iter()
        .filter(|c| c.status == ClaimStatus::Completed)
        .map(|c| c.food_id)
        .collect();
    snapshot
        .food_listings
        .iter()
        .filter(|l| rescued.contains(&l.food_id))
        .map(|l| i64::from(l.quantity))
        .sum()
}

/// Rescued quantity as a percentage of all listed quantity.
pub fn rescue_rate(snapshot: &Snapshot) -> f64 {
    percentage(rescued_quantity(snapshot), snapshot.total_quantity())
}

/// Freshness class of a listing relative to a reference day.
///
/// Declaration order is display order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, strum::Display, strum::EnumIter,
)]
pub enum ExpiryBucket {
    #[strum(serialize = "Expired")]
    #[serde(rename = "Expired")]
    Expired,
    #[strum(serialize = "Expiring Soon")]
    #[serde(rename = "Expiring Soon")]
    ExpiringSoon,
    #[strum(serialize = "Expiring This Week")]
    #[serde(rename = "Expiring This Week")]
    ExpiringThisWeek,
    #[strum(serialize = "Fresh")]
    #[serde(rename = "Fresh")]
    Fresh,
}

impl ExpiryBucket {
    /// `Expired` before today, `ExpiringSoon` up to and including today + 3,
    /// `ExpiringThisWeek` up to and including today + 7, `Fresh` after that.
    pub fn classify(expiry: NaiveDate, today: NaiveDate) -> Self {
        let soon = today.checked_add_days(Days::new(3)).unwrap_or(NaiveDate::MAX);
        let week = today.checked_add_days(Days::new(7)).unwrap_or(NaiveDate::MAX);
        if expiry < today {
            Self::Expired
        } else if expiry <= soon {
            Self::ExpiringSoon
        } else if expiry <= week {
            Self::ExpiringThisWeek
        } else {
            Self::Fresh
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpiryBreakdown {
    pub bucket: ExpiryBucket,
    pub item_count: i64,
    pub total_quantity: i64,
}

/// Item count and quantity per bucket, in display order. Buckets without
/// listings are left out.
pub fn expiry_breakdown(snapshot: &Snapshot, today: NaiveDate) -> Vec<ExpiryBreakdown> {
    let mut buckets: BTreeMap<ExpiryBucket, (i64, i64)> = BTreeMap::new();
    for listing in &snapshot.food_listings {
        let entry = buckets
            .entry(ExpiryBucket::classify(listing.expiry_date, today))
            .or_default();
        entry.0 += 1;
        entry.1 += i64::from(listing.quantity);
    }
    buckets
        .into_iter()
        .map(|(bucket, (item_count, total_quantity))| ExpiryBreakdown {
            bucket,
            item_count,
            total_quantity,
        })
        .collect()
}

/// Headline numbers of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_providers: i64,
    pub total_receivers: i64,
    pub total_food_listings: i64,
    pub total_quantity: i64,
    pub total_claims: i64,
    pub pending_claims: i64,
    pub completed_claims: i64,
    pub cancelled_claims: i64,
    pub completion_rate: f64,
    pub rescued_quantity: i64,
    pub rescue_rate: f64,
    pub expiry: Vec<ExpiryBreakdown>,
}

impl DashboardSummary {
    pub fn compute(snapshot: &Snapshot, today: NaiveDate) -> Self {
        let counts = snapshot.claims.iter().counts_by(|c| c.status);
        let count_of = |status: ClaimStatus| counts.get(&status).copied().unwrap_or(0) as i64;
        let total_claims = snapshot.claims.len() as i64;
        let completed_claims = count_of(ClaimStatus::Completed);

        Self {
            total_providers: snapshot.providers.len() as i64,
            total_receivers: snapshot.receivers.len() as i64,
            total_food_listings: snapshot.food_listings.len() as i64,
            total_quantity: snapshot.total_quantity(),
            total_claims,
            pending_claims: count_of(ClaimStatus::Pending),
            completed_claims,
            cancelled_claims: count_of(ClaimStatus::Cancelled),
            completion_rate: completion_rate(completed_claims, total_claims),
            rescued_quantity: rescued_quantity(snapshot),
            rescue_rate: rescue_rate(snapshot),
            expiry: expiry_breakdown(snapshot, today),
        }
    }
}

/// Activity of one city across all four relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityActivity {
    pub city: String,
    pub providers: i64,
    pub receivers: i64,
    pub food_listings: i64,
    pub total_food_quantity: i64,
    /// Claims against listings located in the city
    pub total_claims: i64,
}

/// Per-city activity, largest listed quantity first, at most `limit` rows.
pub fn city_activity(snapshot: &Snapshot, limit: usize) -> Vec<CityActivity> {
    let mut cities: BTreeMap<&str, CityActivity> = BTreeMap::new();
    fn entry<'m, 'a>(
        cities: &'m mut BTreeMap<&'a str, CityActivity>,
        city: &'a str,
    ) -> &'m mut CityActivity {
        cities.entry(city).or_insert_with(|| CityActivity {
            city: city.to_owned(),
            providers: 0,
            receivers: 0,
            food_listings: 0,
            total_food_quantity: 0,
            total_claims: 0,
        })
    }

    for provider in &snapshot.providers {
        entry(&mut cities, &provider.city).providers += 1;
    }
    for receiver in &snapshot.receivers {
        entry(&mut cities, &receiver.city).receivers += 1;
    }
    for listing in &snapshot.food_listings {
        let city = entry(&mut cities, &listing.location);
        city.food_listings += 1;
        city.total_food_quantity += i64::from(listing.quantity);
    }
    let listings = snapshot.listings_by_id();
    for claim in &snapshot.claims {
        if let Some(listing) = listings.get(&claim.food_id) {
            entry(&mut cities, &listing.location).total_claims += 1;
        }
    }

    cities
        .into_values()
        .sorted_by(|a, b| {
            b.total_food_quantity
                .cmp(&a.total_food_quantity)
                .then_with(|| a.city.cmp(&b.city))
        })
        .take(limit)
        .collect()
}

impl TableRow for CityActivity {
    const COLUMNS: &'static [&'static str] = &[
        "City",
        "Providers",
        "Receivers",
        "Food_Listings",
        "Total_Food_Quantity",
        "Total_Claims",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.city.as_str().into(),
            self.providers.into(),
            self.receivers.into(),
            self.food_listings.into(),
            self.total_food_quantity.into(),
            self.total_claims.into(),
        ]
    }
}

/// Claims of one status on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyClaims {
    pub date: NaiveDate,
    pub status: ClaimStatus,
    pub claim_count: i64,
}

/// Claims per (day, status), oldest day first. Claims without a timestamp
/// are skipped and statuses sort by their text within a day.
pub fn claim_timeline(snapshot: &Snapshot) -> Vec<DailyClaims> {
    let mut days: BTreeMap<(NaiveDate, String), (ClaimStatus, i64)> = BTreeMap::new();
    for claim in &snapshot.claims {
        let Some(timestamp) = claim.timestamp else {
            continue;
        };
        let key = (timestamp.date(), claim.status.to_string());
        days.entry(key).or_insert((claim.status, 0)).1 += 1;
    }
    days.into_iter()
        .map(|((date, _), (status, claim_count))| DailyClaims {
            date,
            status,
            claim_count,
        })
        .collect()
}

impl TableRow for DailyClaims {
    const COLUMNS: &'static [&'static str] = &["Date", "Status", "Count"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.date.format("%Y-%m-%d").to_string().into(),
            self.status.into(),
            self.claim_count.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiverTypeClaims {
    pub receiver_type: ReceiverType,
    pub claim_count: i64,
}

/// Claims per receiver type, busiest first. Types without claims and claims
/// whose receiver is missing are left out.
pub fn claims_by_receiver_type(snapshot: &Snapshot) -> Vec<ReceiverTypeClaims> {
    let receivers: HashMap<i32, ReceiverType> = snapshot
        .receivers
        .iter()
        .map(|r| (r.receiver_id, r.kind))
        .collect();
    snapshot
        .claims
        .iter()
        .filter_map(|claim| receivers.get(&claim.receiver_id).copied())
        .counts()
        .into_iter()
        .map(|(receiver_type, count)| ReceiverTypeClaims {
            receiver_type,
            claim_count: count as i64,
        })
        .sorted_by(|a, b| {
            b.claim_count
                .cmp(&a.claim_count)
                .then_with(|| a.receiver_type.cmp(&b.receiver_type))
        })
        .collect()
}

impl TableRow for ReceiverTypeClaims {
    const COLUMNS: &'static [&'static str] = &["Receiver_Type", "Claim_Count"];

    fn cells(&self) -> Vec<Cell> {
        vec![self.receiver_type.into(), self.claim_count.into()]
    }
}

/// Listings sharing a name and food type, taken together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopularFood {
    pub food_name: String,
    pub food_type: FoodType,
    pub claim_count: i64,
    /// Each listing counts once, however many claims it has
    pub total_quantity_available: i64,
}

/// Food items by claim count, most claimed first, at most `limit` rows.
pub fn popular_food_items(snapshot: &Snapshot, limit: usize) -> Vec<PopularFood> {
    let claims = snapshot.claims_by_listing();
    let mut items: BTreeMap<(&str, FoodType), (i64, i64)> = BTreeMap::new();
    for listing in &snapshot.food_listings {
        let item = items
            .entry((listing.food_name.as_str(), listing.food_type))
            .or_default();
        item.0 += claims.get(&listing.food_id).map_or(0, |c| c.len() as i64);
        item.1 += i64::from(listing.quantity);
    }
    items
        .into_iter()
        .map(|((food_name, food_type), (claim_count, total_quantity_available))| PopularFood {
            food_name: food_name.to_owned(),
            food_type,
            claim_count,
            total_quantity_available,
        })
        .sorted_by(|a, b| b.claim_count.cmp(&a.claim_count))
        .take(limit)
        .collect()
}

impl TableRow for PopularFood {
    const COLUMNS: &'static [&'static str] =
        &["Food_Name", "Food_Type", "Claim_Count", "Total_Quantity_Available"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.food_name.as_str().into(),
            self.food_type.into(),
            self.claim_count.into(),
            self.total_quantity_available.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderPerformance {
    pub provider_id: i32,
    pub name: String,
    pub kind: ProviderType,
    pub total_listings: i64,
    pub total_quantity: i64,
    pub total_claims: i64,
    pub completed_claims: i64,
    /// Completed share of the provider's claims, 0 without claims
    pub success_rate: f64,
}

/// Providers with at least one listing, most completed claims first, at most
/// `limit` rows. Ties keep provider id order.
pub fn provider_performance(snapshot: &Snapshot, limit: usize) -> Vec<ProviderPerformance> {
    let claims = snapshot.claims_by_listing();
    let mut totals: HashMap<i32, (i64, i64, i64, i64)> = HashMap::new();
    for listing in &snapshot.food_listings {
        let total = totals.entry(listing.provider_id).or_default();
        let listing_claims = claims.get(&listing.food_id).map(Vec::as_slice).unwrap_or_default();
        total.0 += 1;
        total.1 += i64::from(listing.quantity);
        total.2 += listing_claims.len() as i64;
        total.3 += listing_claims
            .iter()
            .filter(|c| c.status == ClaimStatus::Completed)
            .count() as i64;
    }

    snapshot
        .providers
        .iter()
        .filter_map(|provider| {
            let &(total_listings, total_quantity, total_claims, completed_claims) =
                totals.get(&provider.provider_id)?;
            Some(ProviderPerformance {
                provider_id: provider.provider_id,
                name: provider.name.clone(),
                kind: provider.kind,
                total_listings,
                total_quantity,
                total_claims,
                completed_claims,
                success_rate: round2(percentage(completed_claims, total_claims)),
            })
        })
        .sorted_by(|a, b| b.completed_claims.cmp(&a.completed_claims))
        .take(limit)
        .collect()
}

impl TableRow for ProviderPerformance {
    const COLUMNS: &'static [&'static str] = &[
        "Provider",
        "Type",
        "Total_Listings",
        "Total_Quantity",
        "Total_Claims",
        "Completed_Claims",
        "Success_Rate",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.name.as_str().into(),
            self.kind.into(),
            self.total_listings.into(),
            self.total_quantity.into(),
            self.total_claims.into(),
            self.completed_claims.into(),
            self.success_rate.into(),
        ]
    }
}
