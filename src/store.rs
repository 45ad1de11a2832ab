use chrono::{NaiveDate, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tokio::sync::{Mutex, MutexGuard};
use tracing::instrument;

use crate::config::Config;
use crate::entity::Table;
use crate::error::Result;
use crate::metrics::{
    self, CityActivity, DailyClaims, DashboardSummary, PopularFood, ProviderPerformance,
    ReceiverTypeClaims,
};
use crate::report::{list_reports, ReportId, ReportInfo, ReportTable};
use crate::schema;
use crate::snapshot::Snapshot;

/// Rows returned by the city activity view.
pub const CITY_ACTIVITY_LIMIT: usize = 20;
/// Rows returned by the popular food items view.
pub const POPULAR_FOOD_LIMIT: usize = 15;
/// Rows returned by the provider performance view.
pub const PROVIDER_PERFORMANCE_LIMIT: usize = 15;

/// Handle to the donation ledger.
///
/// Writes are serialized through an async gate and each one runs in its own
/// transaction. Reads take a [`Snapshot`] inside a transaction, so they see
/// either all of a write or none of it.
#[derive(Debug)]
pub struct Store {
    conn: DatabaseConnection,
    writer: Mutex<()>,
}

/// An open write: the gate is held until the transaction is dropped or
/// committed.
pub(crate) struct WriteTxn<'a> {
    pub(crate) txn: DatabaseTransaction,
    _gate: MutexGuard<'a, ()>,
}

impl WriteTxn<'_> {
    pub(crate) async fn commit(self) -> Result<()> {
        self.txn.commit().await?;
        Ok(())
    }

    pub(crate) async fn rollback(self) -> Result<()> {
        self.txn.rollback().await?;
        Ok(())
    }
}

impl Store {
    /// Opens the database named by `config` and creates missing tables.
    #[instrument(level = "debug", skip_all, fields(memory = config.is_memory()))]
    pub async fn connect(config: &Config) -> Result<Self> {
        config.validate()?;
        let conn = Database::connect(config.connect_options()).await?;
        Self::from_connection(conn).await
    }

    /// Wraps an existing connection, creating missing tables.
    pub async fn from_connection(conn: DatabaseConnection) -> Result<Self> {
        schema::create_tables(&conn).await?;
        tracing::info!(backend = ?conn.get_database_backend(), "store opened");
        Ok(Self {
            conn,
            writer: Mutex::new(()),
        })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }

    /// The current UTC calendar day, the default reference date of the
    /// expiry analysis. Matches SQLite `date('now')`.
    pub fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    pub(crate) async fn write(&self) -> Result<WriteTxn<'_>> {
        let gate = self.writer.lock().await;
        let txn = self.conn.begin().await?;
        Ok(WriteTxn { txn, _gate: gate })
    }

    /// A consistent copy of all four tables.
    #[instrument(level = "trace", skip(self))]
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let txn = self.conn.begin().await?;
        let snapshot = Snapshot::read(&txn).await?;
        txn.commit().await?;
        Ok(snapshot)
    }

    pub fn list_reports(&self) -> Vec<ReportInfo> {
        list_reports()
    }

    pub async fn run_report(&self, id: ReportId) -> Result<ReportTable> {
        self.run_report_on(id, Self::today()).await
    }

    /// Runs a report with a fixed reference date for the expiry analysis.
    #[instrument(level = "debug", skip(self), fields(report = id.number()))]
    pub async fn run_report_on(&self, id: ReportId, today: NaiveDate) -> Result<ReportTable> {
        let snapshot = self.snapshot().await?;
        let table = id.run(&snapshot, today);
        tracing::debug!(rows = table.len(), "report finished");
        Ok(table)
    }

    /// Looks the report up by catalog number first.
    pub async fn run_report_number(&self, number: u8) -> Result<ReportTable> {
        self.run_report(ReportId::from_number(number)?).await
    }

    pub async fn summary(&self) -> Result<DashboardSummary> {
        self.summary_on(Self::today()).await
    }

    pub async fn summary_on(&self, today: NaiveDate) -> Result<DashboardSummary> {
        let snapshot = self.snapshot().await?;
        Ok(DashboardSummary::compute(&snapshot, today))
    }

    /// Busiest cities by listed quantity.
    pub async fn city_activity(&self) -> Result<Vec<CityActivity>> {
        let snapshot = self.snapshot().await?;
        Ok(metrics::city_activity(&snapshot, CITY_ACTIVITY_LIMIT))
    }

    /// Claims per day and status.
    pub async fn claim_timeline(&self) -> Result<Vec<DailyClaims>> {
        let snapshot = self.snapshot().await?;
        Ok(metrics::claim_timeline(&snapshot))
    }

    pub async fn claims_by_receiver_type(&self) -> Result<Vec<ReceiverTypeClaims>> {
        let snapshot = self.snapshot().await?;
        Ok(metrics::claims_by_receiver_type(&snapshot))
    }

    /// Most claimed food items.
    pub async fn popular_food_items(&self) -> Result<Vec<PopularFood>> {
        let snapshot = self.snapshot().await?;
        Ok(metrics::popular_food_items(&snapshot, POPULAR_FOOD_LIMIT))
    }

    /// Providers ranked by completed claims.
    pub async fn provider_performance(&self) -> Result<Vec<ProviderPerformance>> {
        let snapshot = self.snapshot().await?;
        Ok(metrics::provider_performance(&snapshot, PROVIDER_PERFORMANCE_LIMIT))
    }

    /// Rows currently stored in `table`.
    pub async fn count(&self, table: Table) -> Result<u64> {
        crate::query::count(&self.conn, table).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn today_is_the_utc_calendar_day() {
        let before = Utc::now().date_naive();
        let today = Store::today();
        let after = Utc::now().date_naive();
        assert!(today == before || today == after);
    }
}
