use super::sea_orm_active_enums::ProviderType;
use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "providers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub provider_id: i32,
    pub name: String,
    #[sea_orm(column_name = "type")]
    pub kind: ProviderType,
    pub address: Option<String>,
    pub city: String,
    pub contact: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::food_listing::Entity")]
    FoodListing,
}

impl Related<super::food_listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FoodListing.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
