pub mod engine;
pub mod grading;
pub mod home_away;
pub mod payout;
pub mod report;
pub mod stats;

pub use engine::{pending_picks, record_result, settle_date, settle_date_parallel};
pub use home_away::{resolve_home_away, resolve_scores, HomeAway};
pub use report::{SettlementReport, SkipCategory, SkipDiagnostic, SkipReason};
pub use stats::{daily_stats, DailyStats};
