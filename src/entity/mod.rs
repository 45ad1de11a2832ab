//! Entities of the donation ledger.

pub mod claim;
pub mod food_listing;
pub mod prelude;
pub mod provider;
pub mod receiver;
pub mod sea_orm_active_enums;

use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;

/// The four relations owned by the store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumIter,
)]
pub enum Table {
    #[strum(serialize = "providers")]
    #[serde(rename = "providers")]
    Providers,
    #[strum(serialize = "receivers")]
    #[serde(rename = "receivers")]
    Receivers,
    #[strum(serialize = "food_listings")]
    #[serde(rename = "food_listings")]
    FoodListings,
    #[strum(serialize = "claims")]
    #[serde(rename = "claims")]
    Claims,
}

impl Table {
    pub fn id_column(&self) -> &'static str {
        match self {
            Self::Providers => "provider_id",
            Self::Receivers => "receiver_id",
            Self::FoodListings => "food_id",
            Self::Claims => "claim_id",
        }
    }

    /// Singular noun used in error messages.
    pub fn entity_name(&self) -> &'static str {
        match self {
            Self::Providers => "provider",
            Self::Receivers => "receiver",
            Self::FoodListings => "food listing",
            Self::Claims => "claim",
        }
    }
}

impl FromStr for Table {
    type Err = Error;

    /// Accepts the storage table name in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "providers" => Ok(Self::Providers),
            "receivers" => Ok(Self::Receivers),
            "food_listings" => Ok(Self::FoodListings),
            "claims" => Ok(Self::Claims),
            other => Err(Error::validation("table", format!("unknown table `{other}`"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_parse_case_insensitively() {
        assert_eq!("Food_Listings".parse::<Table>().unwrap(), Table::FoodListings);
        assert_eq!(Table::Claims.to_string(), "claims");
        assert_eq!(Table::Providers.id_column(), "provider_id");
        assert!("cakes".parse::<Table>().is_err());
    }
}
