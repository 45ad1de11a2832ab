//! Closed value sets stored as text columns.
//!
//! The string values are the ones used by the CSV exports and shown on the
//! dashboard, so `Display`, `FromStr`, serde and the database all agree.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of organisation offering surplus food.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ProviderType {
    #[sea_orm(string_value = "Restaurant")]
    #[serde(rename = "Restaurant")]
    #[strum(serialize = "Restaurant")]
    Restaurant,
    #[sea_orm(string_value = "Grocery Store")]
    #[serde(rename = "Grocery Store")]
    #[strum(serialize = "Grocery Store")]
    GroceryStore,
    #[sea_orm(string_value = "Supermarket")]
    #[serde(rename = "Supermarket")]
    #[strum(serialize = "Supermarket")]
    Supermarket,
    #[sea_orm(string_value = "Catering Service")]
    #[serde(rename = "Catering Service")]
    #[strum(serialize = "Catering Service")]
    CateringService,
}

/// Kind of organisation or person seeking food.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ReceiverType {
    #[sea_orm(string_value = "NGO")]
    #[serde(rename = "NGO")]
    #[strum(serialize = "NGO")]
    Ngo,
    #[sea_orm(string_value = "Shelter")]
    #[serde(rename = "Shelter")]
    #[strum(serialize = "Shelter")]
    Shelter,
    #[sea_orm(string_value = "Charity")]
    #[serde(rename = "Charity")]
    #[strum(serialize = "Charity")]
    Charity,
    #[sea_orm(string_value = "Individual")]
    #[serde(rename = "Individual")]
    #[strum(serialize = "Individual")]
    Individual,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum FoodType {
    #[sea_orm(string_value = "Vegetarian")]
    #[serde(rename = "Vegetarian")]
    #[strum(serialize = "Vegetarian")]
    Vegetarian,
    #[sea_orm(string_value = "Non-Vegetarian")]
    #[serde(rename = "Non-Vegetarian")]
    #[strum(serialize = "Non-Vegetarian")]
    NonVegetarian,
    #[sea_orm(string_value = "Vegan")]
    #[serde(rename = "Vegan")]
    #[strum(serialize = "Vegan")]
    Vegan,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum MealType {
    #[sea_orm(string_value = "Breakfast")]
    #[serde(rename = "Breakfast")]
    #[strum(serialize = "Breakfast")]
    Breakfast,
    #[sea_orm(string_value = "Lunch")]
    #[serde(rename = "Lunch")]
    #[strum(serialize = "Lunch")]
    Lunch,
    #[sea_orm(string_value = "Dinner")]
    #[serde(rename = "Dinner")]
    #[strum(serialize = "Dinner")]
    Dinner,
    #[sea_orm(string_value = "Snacks")]
    #[serde(rename = "Snacks")]
    #[strum(serialize = "Snacks")]
    Snacks,
}

/// Lifecycle of a claim. Any status may follow any other.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ClaimStatus {
    #[sea_orm(string_value = "Pending")]
    #[serde(rename = "Pending")]
    #[strum(serialize = "Pending")]
    Pending,
    #[sea_orm(string_value = "Completed")]
    #[serde(rename = "Completed")]
    #[strum(serialize = "Completed")]
    Completed,
    #[sea_orm(string_value = "Cancelled")]
    #[serde(rename = "Cancelled")]
    #[strum(serialize = "Cancelled")]
    Cancelled,
}
