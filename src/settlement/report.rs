use crate::models::{BetType, GameId, PickId, TeamId};
use crate::settlement::home_away::UnknownReason;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Why a pick could not be graded, grouped for operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipCategory {
    Unresolved,
    MissingMarketData,
    DataIntegrity,
}

impl fmt::Display for SkipCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipCategory::Unresolved => "unresolved",
            SkipCategory::MissingMarketData => "missing market data",
            SkipCategory::DataIntegrity => "data integrity",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    HomeAwayUnknown { reason: UnknownReason },
    /// Spread or moneyline pick with no team id and no usable signal to infer one
    TeamUnresolved { bet_type: BetType },
    /// Total pick whose free text names neither over nor under
    TotalDirectionUnknown,
    NoTotalLine { book: String, direction: String },
    TeamNotInGame { team_id: TeamId },
    NonCanonicalTeam { team_id: TeamId, name: String },
    MissingTeam { team_id: TeamId },
    MissingGame,
    InvalidOdds { odds: i32 },
}

impl SkipReason {
    pub fn category(&self) -> SkipCategory {
        match self {
            SkipReason::HomeAwayUnknown { .. }
            | SkipReason::TeamUnresolved { .. }
            | SkipReason::TotalDirectionUnknown => SkipCategory::Unresolved,
            SkipReason::NoTotalLine { .. } => SkipCategory::MissingMarketData,
            SkipReason::TeamNotInGame { .. }
            | SkipReason::NonCanonicalTeam { .. }
            | SkipReason::MissingTeam { .. }
            | SkipReason::MissingGame
            | SkipReason::InvalidOdds { .. } => SkipCategory::DataIntegrity,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::HomeAwayUnknown { reason } => write!(f, "home/away unknown: {}", reason),
            SkipReason::TeamUnresolved { bet_type } => {
                write!(f, "{} pick has no team and none could be inferred", bet_type)
            }
            SkipReason::TotalDirectionUnknown => f.write_str("total pick names neither over nor under"),
            SkipReason::NoTotalLine { book, direction } => {
                write!(f, "no {} total line from {}", direction, book)
            }
            SkipReason::TeamNotInGame { team_id } => {
                write!(f, "team {} is not in this game", team_id)
            }
            SkipReason::NonCanonicalTeam { team_id, name } => {
                write!(f, "team {} has non-canonical name '{}'", team_id, name)
            }
            SkipReason::MissingTeam { team_id } => write!(f, "team {} not found", team_id),
            SkipReason::MissingGame => f.write_str("game not found"),
            SkipReason::InvalidOdds { odds } => write!(f, "invalid American odds {}", odds),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkipDiagnostic {
    pub pick_id: PickId,
    pub game_id: GameId,
    pub reason: SkipReason,
}

impl SkipDiagnostic {
    pub fn category(&self) -> SkipCategory {
        self.reason.category()
    }
}

/// Summary of one settlement run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementReport {
    pub date: NaiveDate,
    pub picks_considered: usize,
    pub newly_settled: usize,
    pub re_settled: usize,
    /// Re-settlements whose result differs from the previous run
    pub changed: usize,
    /// Game has no final result yet
    pub pending_no_result: usize,
    pub skipped: Vec<SkipDiagnostic>,
}

impl SettlementReport {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            picks_considered: 0,
            newly_settled: 0,
            re_settled: 0,
            changed: 0,
            pending_no_result: 0,
            skipped: Vec::new(),
        }
    }

    pub fn settled(&self) -> usize {
        self.newly_settled + self.re_settled
    }

    pub fn counts_by_category(&self) -> BTreeMap<SkipCategory, usize> {
        let mut counts = BTreeMap::new();
        for diagnostic in &self.skipped {
            *counts.entry(diagnostic.category()).or_insert(0) += 1;
        }
        counts
    }

    /// Format for display
    pub fn format(&self) -> String {
        let counts = self.counts_by_category();
        let count = |c: SkipCategory| counts.get(&c).copied().unwrap_or(0);
        let mut out = format!(
            "Settlement {} | picks: {} | settled: {} (new {}, re-settled {}, changed {}) | pending: {} | unresolved: {} | missing market data: {} | integrity errors: {}",
            self.date,
            self.picks_considered,
            self.settled(),
            self.newly_settled,
            self.re_settled,
            self.changed,
            self.pending_no_result,
            count(SkipCategory::Unresolved),
            count(SkipCategory::MissingMarketData),
            count(SkipCategory::DataIntegrity),
        );
        for d in &self.skipped {
            out.push_str(&format!(
                "\n  pick {} (game {}) [{}]: {}",
                d.pick_id,
                d.game_id,
                d.category(),
                d.reason
            ));
        }
        out
    }
}
