pub mod common;

use std::sync::Arc;

use common::*;
use food_rescue::entity::sea_orm_active_enums::*;
use food_rescue::entity::Table;
use food_rescue::{FoodListingChanges, ReportId};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn joined_writes_apply_one_after_the_other() {
    let ctx = TestContext::new().await;
    let store = &ctx.store;
    let seeded = seed(store).await;

    let (a, b) = tokio::join!(
        store.create_claim(new_claim(seeded.salad, seeded.charity, ClaimStatus::Pending)),
        store.update_food_listing(
            seeded.salad,
            FoodListingChanges {
                quantity: Some(9),
                ..Default::default()
            },
        ),
    );
    a.unwrap();
    assert_eq!(b.unwrap(), 1);

    assert_eq!(store.count(Table::Claims).await.unwrap(), 5);
    assert_eq!(store.get_food_listing(seeded.salad).await.unwrap().quantity, 9);
}

#[tokio::test]
async fn delete_racing_a_claim_never_leaves_a_dangling_claim() {
    let ctx = TestContext::new().await;
    let store = &ctx.store;
    let seeded = seed(store).await;

    let (claim, deleted) = tokio::join!(
        store.create_claim(new_claim(seeded.stew, seeded.shelter, ClaimStatus::Pending)),
        store.delete_food_listing(seeded.stew),
    );
    assert_eq!(deleted.unwrap(), 1);
    if let Ok(id) = claim {
        assert!(store.get_claim(id).await.is_err());
    }

    let claims = store.list_claims().await.unwrap();
    assert!(claims.iter().all(|c| c.food_id != seeded.stew));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reports_read_consistent_snapshots_during_writes() {
    let ctx = TestContext::new().await;
    let store = Arc::new(ctx.store);
    let seeded = seed(&store).await;

    let writer = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            for _ in 0..10 {
                store
                    .create_claim(new_claim(seeded.bread, seeded.shelter, ClaimStatus::Completed))
                    .await
                    .unwrap();
            }
        })
    };

    let mut readers = Vec::new();
    for _ in 0..4 {
        let store = Arc::clone(&store);
        readers.push(tokio::spawn(async move {
            let summary = store.summary().await.unwrap();
            assert_eq!(
                summary.total_claims,
                summary.pending_claims + summary.completed_claims + summary.cancelled_claims
            );
            let table = store
                .run_report(ReportId::ClaimStatusDistribution)
                .await
                .unwrap();
            assert_eq!(table.len(), 3);
        }));
    }

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
    assert_eq!(store.count(Table::Claims).await.unwrap(), 14);
}
