pub mod common;

use common::*;
use food_rescue::entity::sea_orm_active_enums::*;
use food_rescue::entity::Table;
use food_rescue::{
    ClaimChanges, Error, ErrorKind, FoodListingChanges, ProviderChanges, ReceiverChanges,
};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn insert_then_get_returns_same_fields() {
    let ctx = TestContext::new().await;
    let store = &ctx.store;

    let input = new_provider("Chez Anna", ProviderType::CateringService, "Lyon");
    let id = store.create_provider(input.clone()).await.unwrap();
    let provider = store.get_provider(id).await.unwrap();
    assert_eq!(provider.provider_id, id);
    assert_eq!(provider.name, input.name);
    assert_eq!(provider.kind, ProviderType::CateringService);
    assert_eq!(provider.address, input.address);
    assert_eq!(provider.city, "Lyon");
    assert_eq!(provider.contact, input.contact);

    let other = store
        .create_provider(new_provider("Chez Paul", ProviderType::Restaurant, "Lyon"))
        .await
        .unwrap();
    assert_ne!(id, other);

    let listing_id = store
        .create_food_listing(new_listing("Rice", id, 12, FoodType::Vegan, "2025-04-01"))
        .await
        .unwrap();
    let listing = store.get_food_listing(listing_id).await.unwrap();
    assert_eq!(listing.food_name, "Rice");
    assert_eq!(listing.quantity, 12);
    assert_eq!(listing.expiry_date, day("2025-04-01"));
    assert_eq!(listing.provider_type, ProviderType::CateringService);
    assert_eq!(listing.meal_type, MealType::Lunch);
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
    let ctx = TestContext::new().await;
    let store = &ctx.store;

    let first = store
        .create_receiver(new_receiver("A", ReceiverType::Ngo, "Lyon"))
        .await
        .unwrap();
    store.delete_receiver(first).await.unwrap();
    let second = store
        .create_receiver(new_receiver("B", ReceiverType::Ngo, "Lyon"))
        .await
        .unwrap();
    assert!(second > first);
}

#[tokio::test]
async fn insert_with_missing_reference_is_a_constraint_violation() {
    let ctx = TestContext::new().await;
    let store = &ctx.store;
    let seeded = seed(store).await;

    let err = store
        .create_food_listing(new_listing("Soup", 999, 3, FoodType::Vegan, "2025-03-01"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConstraintViolation);

    let err = store
        .create_claim(new_claim(seeded.bread, 999, ClaimStatus::Pending))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::ConstraintViolation {
            column: "receiver_id",
            value: 999,
            ..
        }
    ));

    let err = store
        .create_claim(new_claim(999, seeded.shelter, ClaimStatus::Pending))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
    assert_eq!(store.count(Table::Claims).await.unwrap(), 4);
}

#[tokio::test]
async fn validation_rejects_blank_fields_and_zero_quantity() {
    let ctx = TestContext::new().await;
    let store = &ctx.store;

    let err = store
        .create_provider(new_provider("  ", ProviderType::Restaurant, "Lyon"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = store
        .create_receiver(new_receiver("Shelter", ReceiverType::Shelter, ""))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let provider = store
        .create_provider(new_provider("Deli", ProviderType::Restaurant, "Lyon"))
        .await
        .unwrap();
    let err = store
        .create_food_listing(new_listing("Ham", provider, 0, FoodType::NonVegetarian, "2025-03-01"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(store.count(Table::FoodListings).await.unwrap(), 0);
}

#[tokio::test]
async fn provider_delete_is_blocked_by_listings() {
    let ctx = TestContext::new().await;
    let store = &ctx.store;
    let seeded = seed(store).await;

    let err = store.delete_provider(seeded.market).await.unwrap_err();
    match err {
        Error::ReferentialBlock {
            table,
            dependent_table,
            dependents,
            ..
        } => {
            assert_eq!(table, Table::Providers);
            assert_eq!(dependent_table, Table::FoodListings);
            assert_eq!(dependents, 2);
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(store.get_provider(seeded.market).await.is_ok());

    let lonely = store
        .create_provider(new_provider("Lonely", ProviderType::Supermarket, "Nice"))
        .await
        .unwrap();
    assert_eq!(store.delete_provider(lonely).await.unwrap(), 1);
    assert_eq!(
        store.get_provider(lonely).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn receiver_and_listing_deletes_cascade_to_claims() {
    let ctx = TestContext::new().await;
    let store = &ctx.store;
    let seeded = seed(store).await;

    assert_eq!(store.delete_receiver(seeded.shelter).await.unwrap(), 1);
    let claims = store.list_claims().await.unwrap();
    assert_eq!(claims.len(), 2);
    assert!(claims.iter().all(|c| c.receiver_id != seeded.shelter));

    assert_eq!(store.delete_food_listing(seeded.bread).await.unwrap(), 1);
    let claims = store.list_claims().await.unwrap();
    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0].food_id, seeded.stew);
}

#[tokio::test]
async fn missing_ids_are_not_found() {
    let ctx = TestContext::new().await;
    let store = &ctx.store;

    assert_eq!(
        store.delete_claim(42).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        store
            .update_receiver(42, ReceiverChanges::default())
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        store
            .update_claim_status(42, ClaimStatus::Completed)
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn generic_delete_checks_table_and_key_names() {
    let ctx = TestContext::new().await;
    let store = &ctx.store;
    let seeded = seed(store).await;

    let err = store
        .delete_record("providers", "food_id", seeded.bakery)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = store.delete_record("pantry", "id", 1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = store
        .delete_record("providers", "provider_id", seeded.bakery)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReferentialBlock);

    assert_eq!(
        store
            .delete_record("food_listings", "food_id", seeded.salad)
            .await
            .unwrap(),
        1
    );
    assert_eq!(store.count(Table::FoodListings).await.unwrap(), 2);
}

#[tokio::test]
async fn provider_update_leaves_listing_snapshot_until_resync() {
    let ctx = TestContext::new().await;
    let store = &ctx.store;
    let seeded = seed(store).await;

    let changed = store
        .update_provider(
            seeded.market,
            ProviderChanges {
                kind: Some(ProviderType::GroceryStore),
                contact: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(changed, 1);

    let provider = store.get_provider(seeded.market).await.unwrap();
    assert_eq!(provider.kind, ProviderType::GroceryStore);
    assert_eq!(provider.contact, None);
    assert_eq!(provider.name, "Green Market");

    let salad = store.get_food_listing(seeded.salad).await.unwrap();
    assert_eq!(salad.provider_type, ProviderType::Supermarket);

    assert_eq!(store.resync_provider_types().await.unwrap(), 2);
    let salad = store.get_food_listing(seeded.salad).await.unwrap();
    assert_eq!(salad.provider_type, ProviderType::GroceryStore);
    assert_eq!(store.resync_provider_types().await.unwrap(), 0);
}

#[tokio::test]
async fn moving_a_listing_copies_the_new_provider_type() {
    let ctx = TestContext::new().await;
    let store = &ctx.store;
    let seeded = seed(store).await;

    store
        .update_food_listing(
            seeded.salad,
            FoodListingChanges {
                provider_id: Some(seeded.bakery),
                quantity: Some(8),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let salad = store.get_food_listing(seeded.salad).await.unwrap();
    assert_eq!(salad.provider_id, seeded.bakery);
    assert_eq!(salad.provider_type, ProviderType::Restaurant);
    assert_eq!(salad.quantity, 8);

    let err = store
        .update_food_listing(
            seeded.salad,
            FoodListingChanges {
                provider_id: Some(999),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConstraintViolation);

    let err = store
        .update_food_listing(
            seeded.salad,
            FoodListingChanges {
                quantity: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(store.get_food_listing(seeded.salad).await.unwrap().quantity, 8);
}

#[tokio::test]
async fn claims_get_a_timestamp_that_status_updates_keep() {
    let ctx = TestContext::new().await;
    let store = &ctx.store;
    let seeded = seed(store).await;

    let id = store
        .create_claim(new_claim(seeded.stew, seeded.shelter, ClaimStatus::Pending))
        .await
        .unwrap();
    let created = store.get_claim(id).await.unwrap();
    let stamp = created.timestamp.expect("claim timestamp");

    store
        .update_claim_status(id, ClaimStatus::Completed)
        .await
        .unwrap();
    store
        .update_claim(
            id,
            ClaimChanges {
                receiver_id: Some(seeded.charity),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let updated = store.get_claim(id).await.unwrap();
    assert_eq!(updated.status, ClaimStatus::Completed);
    assert_eq!(updated.receiver_id, seeded.charity);
    assert_eq!(updated.timestamp, Some(stamp));
}

#[tokio::test]
async fn receiver_update_changes_only_given_fields() {
    let ctx = TestContext::new().await;
    let store = &ctx.store;
    let seeded = seed(store).await;

    store
        .update_receiver(
            seeded.charity,
            ReceiverChanges {
                city: Some("Marseille".into()),
                contact: Some(Some("555-0199".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let receiver = store.get_receiver(seeded.charity).await.unwrap();
    assert_eq!(receiver.name, "Hands Together");
    assert_eq!(receiver.kind, ReceiverType::Charity);
    assert_eq!(receiver.city, "Marseille");
    assert_eq!(receiver.contact.as_deref(), Some("555-0199"));

    let err = store
        .update_receiver(
            seeded.charity,
            ReceiverChanges {
                name: Some(" ".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
