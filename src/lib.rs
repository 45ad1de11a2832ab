//! <div align="center">
//!
//!   <h1>food-rescue</h1>
//!
//!   <p>
//!     <strong>Reporting engine for a surplus food donation ledger</strong>
//!   </p>
//!
//! </div>
//!
//! Providers list food, receivers claim it, and a fixed catalog of fifteen
//! reports summarizes the activity. The ledger lives in a relational
//! database reached through SeaORM (SQLite by default).
//!
//! ```no_run
//! use food_rescue::{Config, ListingFilter, ReportId, Store};
//! use food_rescue::entity::sea_orm_active_enums::FoodType;
//!
//! # async fn run() -> food_rescue::Result<()> {
//! let store = Store::connect(&Config::from_env()?).await?;
//!
//! let vegan = store
//!     .search_food_listings(&ListingFilter {
//!         food_type: Some(FoodType::Vegan),
//!         min_quantity: Some(5),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{} vegan listings", vegan.len());
//!
//! let table = store.run_report(ReportId::ClaimStatusDistribution).await?;
//! println!("{table}");
//! # Ok(())
//! # }
//! ```

pub mod bulk;
pub mod config;
pub mod entity;
pub mod error;
pub mod filter;
pub mod metrics;
mod mutation;
pub mod query;
pub mod report;
pub mod schema;
pub mod snapshot;
mod store;

pub use bulk::{BulkData, LoadReport};
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use filter::{FilterColumn, ListingFilter, ProviderFilter, ReceiverFilter};
pub use metrics::{
    CityActivity, DailyClaims, DashboardSummary, ExpiryBucket, PopularFood, ProviderPerformance,
    ReceiverTypeClaims,
};
pub use mutation::{
    ClaimChanges, FoodListingChanges, NewClaim, NewFoodListing, NewProvider, NewReceiver,
    ProviderChanges, ReceiverChanges,
};
pub use query::{ListingSearchRow, Party};
pub use report::{list_reports, Cell, ReportId, ReportInfo, ReportTable};
pub use snapshot::Snapshot;
pub use store::Store;
