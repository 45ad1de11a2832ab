use super::sea_orm_active_enums::ClaimStatus;
use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "claims")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub claim_id: i32,
    pub food_id: i32,
    pub receiver_id: i32,
    pub status: ClaimStatus,
    /// Set once when the claim is created. Rows imported without a timestamp
    /// keep `None`.
    pub timestamp: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::food_listing::Entity",
        from = "Column::FoodId",
        to = "super::food_listing::Column::FoodId"
    )]
    FoodListing,
    #[sea_orm(
        belongs_to = "super::receiver::Entity",
        from = "Column::ReceiverId",
        to = "super::receiver::Column::ReceiverId"
    )]
    Receiver,
}

impl Related<super::food_listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FoodListing.def()
    }
}

impl Related<super::receiver::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receiver.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
