pub mod config;
pub mod error;
pub mod models;
pub mod settlement;
pub mod store;
pub mod teams;

pub use config::Config;
pub use error::{ConfigError, RegistryError, StoreError};
pub use models::*;
pub use settlement::{DailyStats, SettlementReport};
pub use store::Ledger;
pub use teams::TeamRegistry;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use std::path::Path;
use tracing::info;

/// Output of one nightly run
#[derive(Debug, Clone)]
pub struct SettlementRun {
    pub report: SettlementReport,
    pub stats: DailyStats,
    /// Picks of the date still open after the run
    pub pending: Vec<PickId>,
}

/// Load the snapshot, settle every pick for `date`, save the snapshot back
pub async fn settle_snapshot(config: &Config, date: NaiveDate) -> Result<SettlementRun> {
    let mut ledger = if Path::new(&config.snapshot_path).exists() {
        Ledger::load(&config.snapshot_path)?
    } else {
        info!(
            "No ledger at {}; starting empty",
            config.snapshot_path.display()
        );
        Ledger::new()
    };

    let now = Utc::now();
    let report = if config.parallel {
        settlement::settle_date_parallel(&mut ledger, date, now).await?
    } else {
        settlement::settle_date(&mut ledger, date, now)
    };
    let stats = settlement::daily_stats(&ledger, date, config.unit_value);
    let pending = settlement::pending_picks(&ledger, date);

    ledger.save(&config.snapshot_path)?;
    info!("Saved ledger to {}", config.snapshot_path.display());

    Ok(SettlementRun {
        report,
        stats,
        pending,
    })
}
