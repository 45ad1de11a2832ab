pub use super::claim::Entity as Claim;
pub use super::food_listing::Entity as FoodListing;
pub use super::provider::Entity as Provider;
pub use super::receiver::Entity as Receiver;
pub use super::sea_orm_active_enums::{ClaimStatus, FoodType, MealType, ProviderType, ReceiverType};
