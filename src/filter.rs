//! Search predicates built as SeaQuery conditions.

use std::str::FromStr;

use sea_orm::sea_query::{Expr, Func, IntoIden, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, Condition};
use serde::{Deserialize, Serialize};

use crate::entity::sea_orm_active_enums::{FoodType, MealType, ProviderType, ReceiverType};
use crate::entity::{food_listing, provider, receiver, Table};
use crate::error::Error;

/// Narrowing options for the food listing search. Every present field adds an
/// AND-ed predicate; the default filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingFilter {
    /// Listing location
    pub city: Option<String>,
    /// Current type of the listing's provider
    pub provider_type: Option<ProviderType>,
    pub food_type: Option<FoodType>,
    pub meal_type: Option<MealType>,
    pub min_quantity: Option<i32>,
    /// Case-insensitive substring of the food name
    pub name_contains: Option<String>,
}

impl ListingFilter {
    /// Assumes the query joins `providers`.
    pub fn condition(&self) -> Condition {
        Condition::all()
            .add_option(
                self.city
                    .as_deref()
                    .map(|city| food_listing::Column::Location.eq(city)),
            )
            .add_option(self.provider_type.map(|kind| provider::Column::Kind.eq(kind)))
            .add_option(self.food_type.map(|t| food_listing::Column::FoodType.eq(t)))
            .add_option(self.meal_type.map(|t| food_listing::Column::MealType.eq(t)))
            .add_option(self.min_quantity.map(|q| food_listing::Column::Quantity.gte(q)))
            .add_option(non_blank(&self.name_contains).map(|needle| {
                contains_ignore_case(food_listing::Entity, food_listing::Column::FoodName, needle)
            }))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFilter {
    pub city: Option<String>,
    pub kind: Option<ProviderType>,
    pub name_contains: Option<String>,
}

impl ProviderFilter {
    pub fn condition(&self) -> Condition {
        Condition::all()
            .add_option(self.city.as_deref().map(|city| provider::Column::City.eq(city)))
            .add_option(self.kind.map(|kind| provider::Column::Kind.eq(kind)))
            .add_option(non_blank(&self.name_contains).map(|needle| {
                contains_ignore_case(provider::Entity, provider::Column::Name, needle)
            }))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverFilter {
    pub city: Option<String>,
    pub kind: Option<ReceiverType>,
    pub name_contains: Option<String>,
}

impl ReceiverFilter {
    pub fn condition(&self) -> Condition {
        Condition::all()
            .add_option(self.city.as_deref().map(|city| receiver::Column::City.eq(city)))
            .add_option(self.kind.map(|kind| receiver::Column::Kind.eq(kind)))
            .add_option(non_blank(&self.name_contains).map(|needle| {
                contains_ignore_case(receiver::Entity, receiver::Column::Name, needle)
            }))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `LOWER(table.column) LIKE '%needle%'` with `%`, `_` and `\` in the needle
/// matched literally.
fn contains_ignore_case<T, C>(table: T, column: C, needle: &str) -> SimpleExpr
where
    T: IntoIden + 'static,
    C: IntoIden + 'static,
{
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    Expr::expr(Func::lower(Expr::col((table, column)))).like(LikeExpr::new(pattern).escape('\\'))
}

/// Columns whose distinct values feed filter choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::EnumIter)]
pub enum FilterColumn {
    ListingLocation,
    ListingFoodType,
    ListingMealType,
    ProviderCity,
    ProviderType,
    ReceiverCity,
    ReceiverType,
    ClaimStatus,
}

impl FilterColumn {
    pub fn table(self) -> Table {
        match self {
            Self::ListingLocation | Self::ListingFoodType | Self::ListingMealType => {
                Table::FoodListings
            }
            Self::ProviderCity | Self::ProviderType => Table::Providers,
            Self::ReceiverCity | Self::ReceiverType => Table::Receivers,
            Self::ClaimStatus => Table::Claims,
        }
    }

    /// Storage column name.
    pub fn column(self) -> &'static str {
        match self {
            Self::ListingLocation => "location",
            Self::ListingFoodType => "food_type",
            Self::ListingMealType => "meal_type",
            Self::ProviderCity | Self::ReceiverCity => "city",
            Self::ProviderType | Self::ReceiverType => "type",
            Self::ClaimStatus => "status",
        }
    }
}

impl FromStr for FilterColumn {
    type Err = Error;

    /// Parses `table.column`, e.g. `food_listings.location` or `providers.type`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "food_listings.location" => Ok(Self::ListingLocation),
            "food_listings.food_type" => Ok(Self::ListingFoodType),
            "food_listings.meal_type" => Ok(Self::ListingMealType),
            "providers.city" => Ok(Self::ProviderCity),
            "providers.type" => Ok(Self::ProviderType),
            "receivers.city" => Ok(Self::ReceiverCity),
            "receivers.type" => Ok(Self::ReceiverType),
            "claims.status" => Ok(Self::ClaimStatus),
            _ => Err(Error::validation(
                "column",
                format!("`{s}` is not a filterable column"),
            )),
        }
    }
}
