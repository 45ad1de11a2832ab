pub mod common;

use common::*;
use food_rescue::entity::sea_orm_active_enums::ReceiverType;
use food_rescue::{list_reports, Cell, ErrorKind, ReportId};
use pretty_assertions::assert_eq;

fn text(s: &str) -> Cell {
    Cell::Text(s.to_owned())
}

#[tokio::test]
async fn catalog_lists_fifteen_reports() {
    let ctx = TestContext::new().await;
    let reports = ctx.store.list_reports();
    assert_eq!(reports, list_reports());
    let ids: Vec<u8> = reports.iter().map(|r| r.id).collect();
    assert_eq!(ids, (1..=15).collect::<Vec<u8>>());
    assert_eq!(reports[9].name, "Claim Status Distribution");
}

#[tokio::test]
async fn unknown_report_number_is_not_found() {
    let ctx = TestContext::new().await;
    for number in [0, 16] {
        let err = ctx.store.run_report_number(number).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

#[tokio::test]
async fn every_report_runs_on_an_empty_store() {
    let ctx = TestContext::new().await;
    for info in list_reports() {
        let id = ReportId::from_number(info.id).unwrap();
        let table = ctx.store.run_report(id).await.unwrap();
        assert_eq!(table.columns, id.columns());
        if id == ReportId::TotalFoodQuantity {
            assert_eq!(table.rows, [vec![Cell::Int(0), Cell::Int(0), Cell::Null]]);
        } else {
            assert!(table.is_empty(), "report {} should be empty", info.id);
        }
    }
}

#[tokio::test]
async fn cities_from_either_table_are_reported() {
    let ctx = TestContext::new().await;
    seed(&ctx.store).await;

    let table = ctx
        .store
        .run_report(ReportId::ProvidersAndReceiversByCity)
        .await
        .unwrap();
    assert_eq!(table.columns, ["City", "Provider_Count", "Receiver_Count"]);
    assert_eq!(
        table.rows,
        [
            vec![text("Lyon"), Cell::Int(1), Cell::Int(1)],
            vec![text("Paris"), Cell::Int(1), Cell::Int(0)],
            vec![text("Nice"), Cell::Int(0), Cell::Int(1)],
        ]
    );
}

#[tokio::test]
async fn total_quantity_has_one_row() {
    let ctx = TestContext::new().await;
    seed(&ctx.store).await;

    let table = ctx
        .store
        .run_report(ReportId::TotalFoodQuantity)
        .await
        .unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.rows[0][0], Cell::Int(20));
    assert_eq!(table.rows[0][1], Cell::Int(3));
    let average = table.rows[0][2].as_f64().unwrap();
    assert!((average - 20.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn status_distribution_sums_to_one_hundred() {
    let ctx = TestContext::new().await;
    seed(&ctx.store).await;

    let table = ctx
        .store
        .run_report(ReportId::ClaimStatusDistribution)
        .await
        .unwrap();
    assert_eq!(
        table.rows,
        [
            vec![text("Completed"), Cell::Int(2), Cell::Float(50.0)],
            vec![text("Pending"), Cell::Int(1), Cell::Float(25.0)],
            vec![text("Cancelled"), Cell::Int(1), Cell::Float(25.0)],
        ]
    );
    let total: f64 = table
        .column("Percentage")
        .unwrap()
        .into_iter()
        .filter_map(Cell::as_f64)
        .sum();
    assert!((total - 100.0).abs() < 0.05);
}

#[tokio::test]
async fn expiry_analysis_uses_the_reference_day() {
    let ctx = TestContext::new().await;
    seed(&ctx.store).await;

    let table = ctx
        .store
        .run_report_on(ReportId::FoodExpiryAnalysis, day("2025-03-10"))
        .await
        .unwrap();
    assert_eq!(
        table.rows,
        [
            vec![text("Expiring Soon"), Cell::Int(2), Cell::Int(16)],
            vec![text("Fresh"), Cell::Int(1), Cell::Int(4)],
        ]
    );

    let table = ctx
        .store
        .run_report_on(ReportId::FoodExpiryAnalysis, day("2025-03-15"))
        .await
        .unwrap();
    assert_eq!(
        table.rows,
        [
            vec![text("Expired"), Cell::Int(2), Cell::Int(16)],
            vec![text("Expiring This Week"), Cell::Int(1), Cell::Int(4)],
        ]
    );
}

#[tokio::test]
async fn provider_reports_break_ties_by_id() {
    let ctx = TestContext::new().await;
    seed(&ctx.store).await;

    let success = ctx
        .store
        .run_report(ReportId::ProvidersWithMostSuccessfulClaims)
        .await
        .unwrap();
    assert_eq!(
        success.rows,
        [
            vec![
                text("Bakery Blue"),
                text("Restaurant"),
                text("Lyon"),
                Cell::Int(2),
                Cell::Int(1),
                Cell::Float(50.0)
            ],
            vec![
                text("Green Market"),
                text("Supermarket"),
                text("Paris"),
                Cell::Int(2),
                Cell::Int(1),
                Cell::Float(50.0)
            ],
        ]
    );

    let donated = ctx
        .store
        .run_report(ReportId::TotalFoodDonatedByProvider)
        .await
        .unwrap();
    let averages: Vec<_> = donated
        .column("Average_Quantity_Per_Item")
        .unwrap()
        .into_iter()
        .cloned()
        .collect();
    assert_eq!(averages, [Cell::Float(10.0), Cell::Float(5.0)]);
}

#[tokio::test]
async fn monthly_trends_count_every_timestamped_claim() {
    let ctx = TestContext::new().await;
    seed(&ctx.store).await;

    let table = ctx
        .store
        .run_report(ReportId::MonthlyClaimTrends)
        .await
        .unwrap();
    let statuses: Vec<_> = table
        .column("Status")
        .unwrap()
        .into_iter()
        .filter_map(Cell::as_str)
        .collect();
    assert!(statuses.contains(&"Completed"));
    let total: i64 = table
        .column("Claim_Count")
        .unwrap()
        .into_iter()
        .filter_map(Cell::as_i64)
        .sum();
    assert_eq!(total, 4);
}

#[tokio::test]
async fn reports_see_committed_writes() {
    let ctx = TestContext::new().await;
    let store = &ctx.store;
    let seeded = seed(store).await;

    store.delete_food_listing(seeded.stew).await.unwrap();
    let table = store
        .run_report(ReportId::ClaimStatusDistribution)
        .await
        .unwrap();
    let statuses: Vec<_> = table
        .column("Status")
        .unwrap()
        .into_iter()
        .filter_map(Cell::as_str)
        .collect();
    assert_eq!(statuses, ["Completed", "Pending"]);
}

#[tokio::test]
async fn dashboard_summary_matches_the_seed() {
    let ctx = TestContext::new().await;
    seed(&ctx.store).await;

    let summary = ctx.store.summary_on(day("2025-03-10")).await.unwrap();
    assert_eq!(summary.total_providers, 2);
    assert_eq!(summary.total_receivers, 2);
    assert_eq!(summary.total_food_listings, 3);
    assert_eq!(summary.total_quantity, 20);
    assert_eq!(summary.total_claims, 4);
    assert_eq!(summary.pending_claims, 1);
    assert_eq!(summary.completed_claims, 2);
    assert_eq!(summary.cancelled_claims, 1);
    assert_eq!(summary.completion_rate, 50.0);
    assert_eq!(summary.rescued_quantity, 16);
    assert_eq!(summary.rescue_rate, 80.0);
    assert_eq!(summary.expiry.len(), 2);

    let cities = ctx.store.city_activity().await.unwrap();
    assert_eq!(cities[0].city, "Lyon");
    assert_eq!(cities[0].food_listings, 2);
    assert_eq!(cities[0].total_food_quantity, 16);
    assert_eq!(cities[0].total_claims, 3);
}

#[tokio::test]
async fn analytics_views_match_the_seed() {
    let ctx = TestContext::new().await;
    let store = &ctx.store;
    seed(store).await;

    let providers = store.provider_performance().await.unwrap();
    let rows: Vec<_> = providers
        .iter()
        .map(|p| (p.name.as_str(), p.total_listings, p.total_quantity, p.completed_claims))
        .collect();
    assert_eq!(rows, [("Bakery Blue", 1, 10, 1), ("Green Market", 2, 10, 1)]);
    assert_eq!(providers[1].success_rate, 50.0);

    let receiver_types: Vec<_> = store
        .claims_by_receiver_type()
        .await
        .unwrap()
        .into_iter()
        .map(|r| (r.receiver_type, r.claim_count))
        .collect();
    assert_eq!(
        receiver_types,
        [(ReceiverType::Shelter, 2), (ReceiverType::Charity, 2)]
    );

    let foods: Vec<_> = store
        .popular_food_items()
        .await
        .unwrap()
        .into_iter()
        .map(|f| (f.food_name, f.claim_count))
        .collect();
    assert_eq!(
        foods,
        [
            ("Bread".to_owned(), 2),
            ("Chicken Stew".to_owned(), 1),
            ("Salad".to_owned(), 1)
        ]
    );

    let timeline = store.claim_timeline().await.unwrap();
    assert_eq!(timeline.iter().map(|d| d.claim_count).sum::<i64>(), 4);
    assert!(timeline.windows(2).all(|w| w[0].date <= w[1].date));
}
