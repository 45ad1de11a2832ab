use super::sea_orm_active_enums::{FoodType, MealType, ProviderType};
use sea_orm::entity::prelude::*;
use serde::Serialize;

/// A batch of food offered by a provider.
///
/// `provider_type` is copied from the provider when the listing is written
/// and is not touched when the provider changes afterwards. See
/// [`Store::resync_provider_types`](crate::Store::resync_provider_types).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "food_listings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub food_id: i32,
    pub food_name: String,
    pub quantity: i32,
    pub expiry_date: Date,
    pub provider_id: i32,
    pub provider_type: ProviderType,
    pub location: String,
    pub food_type: FoodType,
    pub meal_type: MealType,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::provider::Entity",
        from = "Column::ProviderId",
        to = "super::provider::Column::ProviderId"
    )]
    Provider,
    #[sea_orm(has_many = "super::claim::Entity")]
    Claim,
}

impl Related<super::provider::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Provider.def()
    }
}

impl Related<super::claim::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Claim.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
