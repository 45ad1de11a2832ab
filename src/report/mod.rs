//! The numbered report catalog.

pub mod aggregate;
mod table;

pub use table::{Cell, ReportTable, TableRow};

use chrono::NaiveDate;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::error::{Error, Result};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, strum::EnumIter)]
pub enum ReportId {
    ProvidersAndReceiversByCity,
    ProviderTypeContributions,
    ProviderContactsByCity,
    TopClaimingReceivers,
    TotalFoodQuantity,
    CitiesWithMostListings,
    MostCommonFoodTypes,
    ClaimsPerFoodItem,
    ProvidersWithMostSuccessfulClaims,
    ClaimStatusDistribution,
    AverageFoodClaimedPerReceiver,
    MostClaimedMealTypes,
    TotalFoodDonatedByProvider,
    FoodExpiryAnalysis,
    MonthlyClaimTrends,
}

impl ReportId {
    /// Stable catalog number, 1 to 15.
    pub fn number(self) -> u8 {
        match self {
            Self::ProvidersAndReceiversByCity => 1,
            Self::ProviderTypeContributions => 2,
            Self::ProviderContactsByCity => 3,
            Self::TopClaimingReceivers => 4,
            Self::TotalFoodQuantity => 5,
            Self::CitiesWithMostListings => 6,
            Self::MostCommonFoodTypes => 7,
            Self::ClaimsPerFoodItem => 8,
            Self::ProvidersWithMostSuccessfulClaims => 9,
            Self::ClaimStatusDistribution => 10,
            Self::AverageFoodClaimedPerReceiver => 11,
            Self::MostClaimedMealTypes => 12,
            Self::TotalFoodDonatedByProvider => 13,
            Self::FoodExpiryAnalysis => 14,
            Self::MonthlyClaimTrends => 15,
        }
    }

    pub fn from_number(number: u8) -> Result<Self> {
        Self::iter()
            .find(|id| id.number() == number)
            .ok_or(Error::NotFound {
                what: "report",
                id: number.into(),
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ProvidersAndReceiversByCity => "Providers and Receivers by City",
            Self::ProviderTypeContributions => "Provider Type Contributions",
            Self::ProviderContactsByCity => "Provider Contacts by City",
            Self::TopClaimingReceivers => "Top Claiming Receivers",
            Self::TotalFoodQuantity => "Total Food Quantity Available",
            Self::CitiesWithMostListings => "Cities with Most Food Listings",
            Self::MostCommonFoodTypes => "Most Common Food Types",
            Self::ClaimsPerFoodItem => "Claims per Food Item",
            Self::ProvidersWithMostSuccessfulClaims => "Providers with Most Successful Claims",
            Self::ClaimStatusDistribution => "Claim Status Distribution",
            Self::AverageFoodClaimedPerReceiver => "Average Food Claimed per Receiver",
            Self::MostClaimedMealTypes => "Most Claimed Meal Types",
            Self::TotalFoodDonatedByProvider => "Total Food Donated by Provider",
            Self::FoodExpiryAnalysis => "Food Expiry Analysis",
            Self::MonthlyClaimTrends => "Monthly Claim Trends",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::ProvidersAndReceiversByCity => {
                "How many food providers and receivers are there in each city?"
            }
            Self::ProviderTypeContributions => "Which type of food provider contributes the most food?",
            Self::ProviderContactsByCity => "Contact information of food providers in each city",
            Self::TopClaimingReceivers => "Which receivers have claimed the most food?",
            Self::TotalFoodQuantity => "Total quantity of food available from all providers",
            Self::CitiesWithMostListings => "Which city has the highest number of food listings?",
            Self::MostCommonFoodTypes => "Most commonly available food types",
            Self::ClaimsPerFoodItem => "How many food claims have been made for each food item?",
            Self::ProvidersWithMostSuccessfulClaims => {
                "Which provider has had the highest number of successful food claims?"
            }
            Self::ClaimStatusDistribution => {
                "Percentage of food claims completed vs pending vs cancelled"
            }
            Self::AverageFoodClaimedPerReceiver => "Average quantity of food claimed per receiver",
            Self::MostClaimedMealTypes => "Which meal type is claimed the most?",
            Self::TotalFoodDonatedByProvider => "Total quantity of food donated by each provider",
            Self::FoodExpiryAnalysis => "Analysis of food items by expiry dates",
            Self::MonthlyClaimTrends => "Food claims trends by month and status",
        }
    }

    pub fn columns(self) -> &'static [&'static str] {
        use aggregate::*;

        match self {
            Self::ProvidersAndReceiversByCity => CityPresence::COLUMNS,
            Self::ProviderTypeContributions => ProviderTypeContribution::COLUMNS,
            Self::ProviderContactsByCity => ProviderContact::COLUMNS,
            Self::TopClaimingReceivers => ReceiverClaims::COLUMNS,
            Self::TotalFoodQuantity => FoodQuantityTotals::COLUMNS,
            Self::CitiesWithMostListings => CityListings::COLUMNS,
            Self::MostCommonFoodTypes => FoodTypeShare::COLUMNS,
            Self::ClaimsPerFoodItem => ListingClaims::COLUMNS,
            Self::ProvidersWithMostSuccessfulClaims => ProviderSuccess::COLUMNS,
            Self::ClaimStatusDistribution => StatusShare::COLUMNS,
            Self::AverageFoodClaimedPerReceiver => ReceiverCompletedQuantity::COLUMNS,
            Self::MostClaimedMealTypes => MealTypeClaims::COLUMNS,
            Self::TotalFoodDonatedByProvider => ProviderDonations::COLUMNS,
            Self::FoodExpiryAnalysis => ExpiryStatus::COLUMNS,
            Self::MonthlyClaimTrends => MonthlyClaims::COLUMNS,
        }
    }

    pub fn info(self) -> ReportInfo {
        ReportInfo {
            id: self.number(),
            name: self.name(),
            description: self.description(),
        }
    }

    /// Evaluates the report. `today` is only consulted by the expiry analysis.
    pub fn run(self, snapshot: &Snapshot, today: NaiveDate) -> ReportTable {
        use aggregate::*;

        match self {
            Self::ProvidersAndReceiversByCity => {
                ReportTable::from_rows(providers_and_receivers_by_city(snapshot))
            }
            Self::ProviderTypeContributions => {
                ReportTable::from_rows(provider_type_contributions(snapshot))
            }
            Self::ProviderContactsByCity => ReportTable::from_rows(provider_contacts_by_city(snapshot)),
            Self::TopClaimingReceivers => ReportTable::from_rows(top_claiming_receivers(snapshot)),
            Self::TotalFoodQuantity => ReportTable::from_rows([total_food_quantity(snapshot)]),
            Self::CitiesWithMostListings => ReportTable::from_rows(cities_with_most_listings(snapshot)),
            Self::MostCommonFoodTypes => ReportTable::from_rows(most_common_food_types(snapshot)),
            Self::ClaimsPerFoodItem => ReportTable::from_rows(claims_per_food_item(snapshot)),
            Self::ProvidersWithMostSuccessfulClaims => {
                ReportTable::from_rows(providers_with_most_successful_claims(snapshot))
            }
            Self::ClaimStatusDistribution => ReportTable::from_rows(claim_status_distribution(snapshot)),
            Self::AverageFoodClaimedPerReceiver => {
                ReportTable::from_rows(average_food_claimed_per_receiver(snapshot))
            }
            Self::MostClaimedMealTypes => ReportTable::from_rows(most_claimed_meal_types(snapshot)),
            Self::TotalFoodDonatedByProvider => {
                ReportTable::from_rows(total_food_donated_by_provider(snapshot))
            }
            Self::FoodExpiryAnalysis => ReportTable::from_rows(food_expiry_analysis(snapshot, today)),
            Self::MonthlyClaimTrends => ReportTable::from_rows(monthly_claim_trends(snapshot)),
        }
    }
}

impl TryFrom<u8> for ReportId {
    type Error = Error;

    fn try_from(number: u8) -> Result<Self> {
        Self::from_number(number)
    }
}

/// Catalog entry as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportInfo {
    pub id: u8,
    pub name: &'static str,
    pub description: &'static str,
}

/// All reports in catalog order.
pub fn list_reports() -> Vec<ReportInfo> {
    ReportId::iter().map(ReportId::info).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn catalog_is_numbered_one_to_fifteen() {
        let ids: Vec<u8> = list_reports().iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=15).collect::<Vec<u8>>());
        for id in ReportId::iter() {
            assert_eq!(ReportId::from_number(id.number()).unwrap(), id);
        }
    }

    #[test]
    fn unknown_number_is_not_found() {
        for number in [0, 16, 255] {
            let err = ReportId::from_number(number).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound);
        }
    }

    #[test]
    fn empty_snapshot_keeps_schema() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 18).unwrap();
        for id in ReportId::iter() {
            let table = id.run(&Snapshot::default(), today);
            assert_eq!(table.columns, id.columns());
            if id == ReportId::TotalFoodQuantity {
                assert_eq!(
                    table.rows,
                    vec![vec![Cell::Int(0), Cell::Int(0), Cell::Null]]
                );
            } else {
                assert!(table.is_empty(), "{} should be empty", id.name());
            }
        }
    }
}
