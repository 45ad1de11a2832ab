//! The aggregations behind the report catalog.
//!
//! Each function is pure over a [`Snapshot`]. Join semantics follow the
//! dashboard queries: "left join" rows keep parents without children, "inner
//! join" rows drop children whose parent is missing. Ties in the requested
//! ordering fall back to the natural key ascending.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use itertools::Itertools;
use serde::Serialize;

use super::table::{Cell, TableRow};
use crate::entity::sea_orm_active_enums::{ClaimStatus, FoodType, MealType, ProviderType, ReceiverType};
use crate::metrics::{expiry_breakdown, percentage, round2, ExpiryBucket};
use crate::snapshot::Snapshot;

/// Upper bound of the top receivers report.
pub const TOP_RECEIVERS_LIMIT: usize = 20;

macro_rules! text_cell {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Cell {
                fn from(v: $ty) -> Self {
                    Cell::Text(v.to_string())
                }
            }
        )+
    };
}

text_cell!(ProviderType, ReceiverType, FoodType, MealType, ClaimStatus, ExpiryBucket);

macro_rules! table_row {
    ($ty:ty { $($col:literal => $field:ident),+ $(,)? }) => {
        impl TableRow for $ty {
            const COLUMNS: &'static [&'static str] = &[$($col),+];

            fn cells(&self) -> Vec<Cell> {
                vec![$(Cell::from(self.$field.clone())),+]
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityPresence {
    pub city: String,
    pub provider_count: i64,
    pub receiver_count: i64,
}

table_row!(CityPresence {
    "City" => city,
    "Provider_Count" => provider_count,
    "Receiver_Count" => receiver_count,
});

/// Report 1. Cities known to only one of the two tables still appear.
pub fn providers_and_receivers_by_city(snapshot: &Snapshot) -> Vec<CityPresence> {
    let mut cities: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for provider in &snapshot.providers {
        cities.entry(&provider.city).or_default().0 += 1;
    }
    for receiver in &snapshot.receivers {
        cities.entry(&receiver.city).or_default().1 += 1;
    }
    cities
        .into_iter()
        .map(|(city, (provider_count, receiver_count))| CityPresence {
            city: city.to_owned(),
            provider_count,
            receiver_count,
        })
        .sorted_by(|a, b| {
            b.provider_count
                .cmp(&a.provider_count)
                .then(b.receiver_count.cmp(&a.receiver_count))
                .then_with(|| a.city.cmp(&b.city))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderTypeContribution {
    pub provider_type: ProviderType,
    pub total_listings: i64,
    pub total_quantity: i64,
}

table_row!(ProviderTypeContribution {
    "Provider_Type" => provider_type,
    "Total_Listings" => total_listings,
    "Total_Quantity" => total_quantity,
});

/// Report 2. Grouped by the provider's current type, not the listing snapshot.
pub fn provider_type_contributions(snapshot: &Snapshot) -> Vec<ProviderTypeContribution> {
    let mut totals: BTreeMap<ProviderType, (i64, i64)> = BTreeMap::new();
    let mut kinds = HashMap::new();
    for provider in &snapshot.providers {
        totals.entry(provider.kind).or_default();
        kinds.insert(provider.provider_id, provider.kind);
    }
    for listing in &snapshot.food_listings {
        if let Some(kind) = kinds.get(&listing.provider_id) {
            let entry = totals.entry(*kind).or_default();
            entry.0 += 1;
            entry.1 += i64::from(listing.quantity);
        }
    }
    totals
        .into_iter()
        .map(|(provider_type, (total_listings, total_quantity))| ProviderTypeContribution {
            provider_type,
            total_listings,
            total_quantity,
        })
        .sorted_by(|a, b| {
            b.total_quantity
                .cmp(&a.total_quantity)
                .then(a.provider_type.cmp(&b.provider_type))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderContact {
    pub city: String,
    pub name: String,
    pub provider_type: ProviderType,
    pub contact: Option<String>,
}

table_row!(ProviderContact {
    "City" => city,
    "Name" => name,
    "Type" => provider_type,
    "Contact" => contact,
});

/// Report 3.
pub fn provider_contacts_by_city(snapshot: &Snapshot) -> Vec<ProviderContact> {
    snapshot
        .providers
        .iter()
        .sorted_by(|a, b| {
            a.city
                .cmp(&b.city)
                .then_with(|| a.name.cmp(&b.name))
                .then(a.provider_id.cmp(&b.provider_id))
        })
        .map(|p| ProviderContact {
            city: p.city.clone(),
            name: p.name.clone(),
            provider_type: p.kind,
            contact: p.contact.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiverClaims {
    pub receiver_name: String,
    pub receiver_type: ReceiverType,
    pub total_claims: i64,
    pub completed_claims: i64,
}

table_row!(ReceiverClaims {
    "Receiver_Name" => receiver_name,
    "Receiver_Type" => receiver_type,
    "Total_Claims" => total_claims,
    "Completed_Claims" => completed_claims,
});

/// Report 4. Receivers without claims are included with zero counts.
pub fn top_claiming_receivers(snapshot: &Snapshot) -> Vec<ReceiverClaims> {
    let mut counts: HashMap<i32, (i64, i64)> = HashMap::new();
    for claim in &snapshot.claims {
        let entry = counts.entry(claim.receiver_id).or_default();
        entry.0 += 1;
        if claim.status == ClaimStatus::Completed {
            entry.1 += 1;
        }
    }
    snapshot
        .receivers
        .iter()
        .map(|r| {
            let (total, completed) = counts.get(&r.receiver_id).copied().unwrap_or_default();
            (r.receiver_id, total, completed, r)
        })
        .sorted_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)))
        .take(TOP_RECEIVERS_LIMIT)
        .map(|(_, total_claims, completed_claims, r)| ReceiverClaims {
            receiver_name: r.name.clone(),
            receiver_type: r.kind,
            total_claims,
            completed_claims,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodQuantityTotals {
    pub total_food_quantity: i64,
    pub total_food_items: i64,
    /// `None` when there are no listings
    pub average_quantity_per_item: Option<f64>,
}

table_row!(FoodQuantityTotals {
    "Total_Food_Quantity" => total_food_quantity,
    "Total_Food_Items" => total_food_items,
    "Average_Quantity_Per_Item" => average_quantity_per_item,
});

/// Report 5. Always exactly one row.
pub fn total_food_quantity(snapshot: &Snapshot) -> FoodQuantityTotals {
    let total_food_quantity = snapshot.total_quantity();
    let total_food_items = snapshot.food_listings.len() as i64;
    FoodQuantityTotals {
        total_food_quantity,
        total_food_items,
        average_quantity_per_item: (total_food_items > 0)
            .then(|| total_food_quantity as f64 / total_food_items as f64),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityListings {
    pub city: String,
    pub total_listings: i64,
    pub total_quantity: i64,
}

table_row!(CityListings {
    "City" => city,
    "Total_Listings" => total_listings,
    "Total_Quantity" => total_quantity,
});

/// Report 6. Grouped by listing location.
pub fn cities_with_most_listings(snapshot: &Snapshot) -> Vec<CityListings> {
    let mut cities: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for listing in &snapshot.food_listings {
        let entry = cities.entry(&listing.location).or_default();
        entry.0 += 1;
        entry.1 += i64::from(listing.quantity);
    }
    cities
        .into_iter()
        .map(|(city, (total_listings, total_quantity))| CityListings {
            city: city.to_owned(),
            total_listings,
            total_quantity,
        })
        .sorted_by(|a, b| {
            b.total_listings
                .cmp(&a.total_listings)
                .then_with(|| a.city.cmp(&b.city))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodTypeShare {
    pub food_type: FoodType,
    pub listing_count: i64,
    pub total_quantity: i64,
    pub percentage: f64,
}

table_row!(FoodTypeShare {
    "Food_Type" => food_type,
    "Listing_Count" => listing_count,
    "Total_Quantity" => total_quantity,
    "Percentage" => percentage,
});

/// Report 7.
pub fn most_common_food_types(snapshot: &Snapshot) -> Vec<FoodTypeShare> {
    let total = snapshot.food_listings.len() as i64;
    let mut types: BTreeMap<FoodType, (i64, i64)> = BTreeMap::new();
    for listing in &snapshot.food_listings {
        let entry = types.entry(listing.food_type).or_default();
        entry.0 += 1;
        entry.1 += i64::from(listing.quantity);
    }
    types
        .into_iter()
        .map(|(food_type, (listing_count, total_quantity))| FoodTypeShare {
            food_type,
            listing_count,
            total_quantity,
            percentage: round2(percentage(listing_count, total)),
        })
        .sorted_by(|a, b| {
            b.listing_count
                .cmp(&a.listing_count)
                .then(a.food_type.cmp(&b.food_type))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingClaims {
    pub food_name: String,
    pub food_type: FoodType,
    pub available_quantity: i64,
    pub total_claims: i64,
    pub provider_name: String,
}

table_row!(ListingClaims {
    "Food_Name" => food_name,
    "Food_Type" => food_type,
    "Available_Quantity" => available_quantity,
    "Total_Claims" => total_claims,
    "Provider_Name" => provider_name,
});

/// Report 8. Listings whose provider is missing are skipped.
pub fn claims_per_food_item(snapshot: &Snapshot) -> Vec<ListingClaims> {
    let providers = snapshot.providers_by_id();
    let claims = snapshot.claims_by_listing();
    snapshot
        .food_listings
        .iter()
        .filter_map(|l| {
            let provider = providers.get(&l.provider_id)?;
            let total_claims = claims.get(&l.food_id).map_or(0, |c| c.len() as i64);
            Some((l.food_id, total_claims, l, *provider))
        })
        .sorted_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)))
        .map(|(_, total_claims, l, provider)| ListingClaims {
            food_name: l.food_name.clone(),
            food_type: l.food_type,
            available_quantity: l.quantity.into(),
            total_claims,
            provider_name: provider.name.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSuccess {
    pub provider_name: String,
    pub provider_type: ProviderType,
    pub city: String,
    pub total_claims: i64,
    pub successful_claims: i64,
    pub success_rate: f64,
}

table_row!(ProviderSuccess {
    "Provider_Name" => provider_name,
    "Provider_Type" => provider_type,
    "City" => city,
    "Total_Claims" => total_claims,
    "Successful_Claims" => successful_claims,
    "Success_Rate" => success_rate,
});

/// Report 9. Providers whose listings drew no claims are left out.
pub fn providers_with_most_successful_claims(snapshot: &Snapshot) -> Vec<ProviderSuccess> {
    let listings = snapshot.listings_by_id();
    let mut counts: HashMap<i32, (i64, i64)> = HashMap::new();
    for claim in &snapshot.claims {
        if let Some(listing) = listings.get(&claim.food_id) {
            let entry = counts.entry(listing.provider_id).or_default();
            entry.0 += 1;
            if claim.status == ClaimStatus::Completed {
                entry.1 += 1;
            }
        }
    }
    snapshot
        .providers
        .iter()
        .filter_map(|p| {
            let (total, completed) = counts.get(&p.provider_id).copied()?;
            (total > 0).then_some((p, total, completed))
        })
        .sorted_by(|a, b| b.2.cmp(&a.2).then(a.0.provider_id.cmp(&b.0.provider_id)))
        .map(|(p, total_claims, successful_claims)| ProviderSuccess {
            provider_name: p.name.clone(),
            provider_type: p.kind,
            city: p.city.clone(),
            total_claims,
            successful_claims,
            success_rate: round2(percentage(successful_claims, total_claims)),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusShare {
    pub status: ClaimStatus,
    pub count: i64,
    pub percentage: f64,
}

table_row!(StatusShare {
    "Status" => status,
    "Count" => count,
    "Percentage" => percentage,
});

/// Report 10. Empty when there are no claims.
pub fn claim_status_distribution(snapshot: &Snapshot) -> Vec<StatusShare> {
    let total = snapshot.claims.len() as i64;
    snapshot
        .claims
        .iter()
        .counts_by(|c| c.status)
        .into_iter()
        .map(|(status, count)| StatusShare {
            status,
            count: count as i64,
            percentage: round2(percentage(count as i64, total)),
        })
        .sorted_by(|a, b| b.count.cmp(&a.count).then(a.status.cmp(&b.status)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiverCompletedQuantity {
    pub receiver_name: String,
    pub receiver_type: ReceiverType,
    pub total_claims: i64,
    pub average_quantity_claimed: f64,
    pub total_quantity_claimed: i64,
}

table_row!(ReceiverCompletedQuantity {
    "Receiver_Name" => receiver_name,
    "Receiver_Type" => receiver_type,
    "Total_Claims" => total_claims,
    "Average_Quantity_Claimed" => average_quantity_claimed,
    "Total_Quantity_Claimed" => total_quantity_claimed,
});

/// Report 11. Completed claims only; each claim counts its listing's full
/// quantity.
pub fn average_food_claimed_per_receiver(snapshot: &Snapshot) -> Vec<ReceiverCompletedQuantity> {
    let listings = snapshot.listings_by_id();
    let mut totals: HashMap<i32, (i64, i64)> = HashMap::new();
    for claim in snapshot
        .claims
        .iter()
        .filter(|c| c.status == ClaimStatus::Completed)
    {
        if let Some(listing) = listings.get(&claim.food_id) {
            let entry = totals.entry(claim.receiver_id).or_default();
            entry.0 += 1;
            entry.1 += i64::from(listing.quantity);
        }
    }
    snapshot
        .receivers
        .iter()
        .filter_map(|r| totals.get(&r.receiver_id).map(|&(n, q)| (r, n, q)))
        .sorted_by(|a, b| b.2.cmp(&a.2).then(a.0.receiver_id.cmp(&b.0.receiver_id)))
        .map(|(r, total_claims, total_quantity_claimed)| ReceiverCompletedQuantity {
            receiver_name: r.name.clone(),
            receiver_type: r.kind,
            total_claims,
            average_quantity_claimed: total_quantity_claimed as f64 / total_claims as f64,
            total_quantity_claimed,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealTypeClaims {
    pub meal_type: MealType,
    pub total_claims: i64,
    pub completed_claims: i64,
    pub total_quantity_claimed: i64,
}

table_row!(MealTypeClaims {
    "Meal_Type" => meal_type,
    "Total_Claims" => total_claims,
    "Completed_Claims" => completed_claims,
    "Total_Quantity_Claimed" => total_quantity_claimed,
});

/// Report 12. Quantity is summed over listing x claim rows: a listing with
/// three claims adds its quantity three times, one with none adds it once.
pub fn most_claimed_meal_types(snapshot: &Snapshot) -> Vec<MealTypeClaims> {
    let claims = snapshot.claims_by_listing();
    let mut meals: BTreeMap<MealType, (i64, i64, i64)> = BTreeMap::new();
    for listing in &snapshot.food_listings {
        let entry = meals.entry(listing.meal_type).or_default();
        let quantity = i64::from(listing.quantity);
        match claims.get(&listing.food_id) {
            Some(claims) => {
                for claim in claims {
                    entry.0 += 1;
                    if claim.status == ClaimStatus::Completed {
                        entry.1 += 1;
                    }
                    entry.2 += quantity;
                }
            }
            None => entry.2 += quantity,
        }
    }
    meals
        .into_iter()
        .map(|(meal_type, (total_claims, completed_claims, total_quantity_claimed))| MealTypeClaims {
            meal_type,
            total_claims,
            completed_claims,
            total_quantity_claimed,
        })
        .sorted_by(|a, b| b.total_claims.cmp(&a.total_claims).then(a.meal_type.cmp(&b.meal_type)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderDonations {
    pub provider_name: String,
    pub provider_type: ProviderType,
    pub city: String,
    pub total_food_items: i64,
    pub total_quantity_donated: i64,
    /// `None` for providers without listings
    pub average_quantity_per_item: Option<f64>,
}

table_row!(ProviderDonations {
    "Provider_Name" => provider_name,
    "Provider_Type" => provider_type,
    "City" => city,
    "Total_Food_Items" => total_food_items,
    "Total_Quantity_Donated" => total_quantity_donated,
    "Average_Quantity_Per_Item" => average_quantity_per_item,
});

/// Report 13. Every provider appears, with zero items if it listed nothing.
pub fn total_food_donated_by_provider(snapshot: &Snapshot) -> Vec<ProviderDonations> {
    let mut totals: HashMap<i32, (i64, i64)> = HashMap::new();
    for listing in &snapshot.food_listings {
        let entry = totals.entry(listing.provider_id).or_default();
        entry.0 += 1;
        entry.1 += i64::from(listing.quantity);
    }
    snapshot
        .providers
        .iter()
        .map(|p| {
            let (items, quantity) = totals.get(&p.provider_id).copied().unwrap_or_default();
            (p, items, quantity)
        })
        .sorted_by(|a, b| b.2.cmp(&a.2).then(a.0.provider_id.cmp(&b.0.provider_id)))
        .map(|(p, total_food_items, total_quantity_donated)| ProviderDonations {
            provider_name: p.name.clone(),
            provider_type: p.kind,
            city: p.city.clone(),
            total_food_items,
            total_quantity_donated,
            average_quantity_per_item: (total_food_items > 0)
                .then(|| total_quantity_donated as f64 / total_food_items as f64),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpiryStatus {
    pub expiry_status: ExpiryBucket,
    pub item_count: i64,
    pub total_quantity: i64,
}

table_row!(ExpiryStatus {
    "Expiry_Status" => expiry_status,
    "Item_Count" => item_count,
    "Total_Quantity" => total_quantity,
});

/// Report 14. Fixed bucket order; empty buckets are omitted.
pub fn food_expiry_analysis(snapshot: &Snapshot, today: NaiveDate) -> Vec<ExpiryStatus> {
    expiry_breakdown(snapshot, today)
        .into_iter()
        .map(|b| ExpiryStatus {
            expiry_status: b.bucket,
            item_count: b.item_count,
            total_quantity: b.total_quantity,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyClaims {
    /// `YYYY-MM`
    pub month: String,
    pub status: ClaimStatus,
    pub claim_count: i64,
}

table_row!(MonthlyClaims {
    "Month" => month,
    "Status" => status,
    "Claim_Count" => claim_count,
});

/// Report 15. Claims without a timestamp are skipped. Statuses sort by their
/// text.
pub fn monthly_claim_trends(snapshot: &Snapshot) -> Vec<MonthlyClaims> {
    let mut months: BTreeMap<(String, String), (ClaimStatus, i64)> = BTreeMap::new();
    for claim in &snapshot.claims {
        let Some(timestamp) = claim.timestamp else {
            continue;
        };
        let key = (timestamp.format("%Y-%m").to_string(), claim.status.to_string());
        months.entry(key).or_insert((claim.status, 0)).1 += 1;
    }
    months
        .into_iter()
        .map(|((month, _), (status, claim_count))| MonthlyClaims {
            month,
            status,
            claim_count,
        })
        .collect()
}
