#![allow(dead_code)]

use chrono::NaiveDate;
use food_rescue::entity::sea_orm_active_enums::*;
use food_rescue::{Config, NewClaim, NewFoodListing, NewProvider, NewReceiver, Store};

pub struct TestContext {
    pub store: Store,
}

impl TestContext {
    pub async fn new() -> Self {
        let store = Store::connect(&Config::in_memory()).await.unwrap();
        Self { store }
    }
}

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn new_provider(name: &str, kind: ProviderType, city: &str) -> NewProvider {
    NewProvider {
        name: name.to_owned(),
        kind,
        address: Some(format!("1 {name} Street")),
        city: city.to_owned(),
        contact: Some("+33-1-0000".to_owned()),
    }
}

pub fn new_receiver(name: &str, kind: ReceiverType, city: &str) -> NewReceiver {
    NewReceiver {
        name: name.to_owned(),
        kind,
        city: city.to_owned(),
        contact: None,
    }
}

pub fn new_listing(
    food_name: &str,
    provider_id: i32,
    quantity: i32,
    food_type: FoodType,
    expiry: &str,
) -> NewFoodListing {
    NewFoodListing {
        food_name: food_name.to_owned(),
        quantity,
        expiry_date: day(expiry),
        provider_id,
        location: "Lyon".to_owned(),
        food_type,
        meal_type: MealType::Lunch,
    }
}

pub fn new_claim(food_id: i32, receiver_id: i32, status: ClaimStatus) -> NewClaim {
    NewClaim {
        food_id,
        receiver_id,
        status,
    }
}

/// Ids of the rows created by [`seed`].
pub struct Seeded {
    pub bakery: i32,
    pub market: i32,
    pub shelter: i32,
    pub charity: i32,
    pub bread: i32,
    pub salad: i32,
    pub stew: i32,
}

/// Two providers, two receivers, three listings and four claims.
pub async fn seed(store: &Store) -> Seeded {
    let bakery = store
        .create_provider(new_provider("Bakery Blue", ProviderType::Restaurant, "Lyon"))
        .await
        .unwrap();
    let market = store
        .create_provider(new_provider("Green Market", ProviderType::Supermarket, "Paris"))
        .await
        .unwrap();
    let shelter = store
        .create_receiver(new_receiver("North Shelter", ReceiverType::Shelter, "Lyon"))
        .await
        .unwrap();
    let charity = store
        .create_receiver(new_receiver("Hands Together", ReceiverType::Charity, "Nice"))
        .await
        .unwrap();

    let bread = store
        .create_food_listing(new_listing("Bread", bakery, 10, FoodType::Vegetarian, "2025-03-10"))
        .await
        .unwrap();
    let salad = store
        .create_food_listing(new_listing("Salad", market, 6, FoodType::Vegan, "2025-03-12"))
        .await
        .unwrap();
    let stew = store
        .create_food_listing(NewFoodListing {
            location: "Paris".to_owned(),
            meal_type: MealType::Dinner,
            ..new_listing("Chicken Stew", market, 4, FoodType::NonVegetarian, "2025-03-20")
        })
        .await
        .unwrap();

    for (food, receiver, status) in [
        (bread, shelter, ClaimStatus::Completed),
        (bread, charity, ClaimStatus::Pending),
        (salad, shelter, ClaimStatus::Completed),
        (stew, charity, ClaimStatus::Cancelled),
    ] {
        store
            .create_claim(new_claim(food, receiver, status))
            .await
            .unwrap();
    }

    Seeded {
        bakery,
        market,
        shelter,
        charity,
        bread,
        salad,
        stew,
    }
}
