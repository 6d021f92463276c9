//! Batch settlement of every pick for a date.
//!
//! Each game is an independent unit of work: its row, its two teams, its lines
//! and its picks are copied out of the ledger, graded without touching shared
//! state, and the outcomes are applied back in pick order.

use crate::error::StoreError;
use crate::models::{BetResult, BettingLine, Game, GameId, GameStatus, Pick, PickId, ResultPayload, Team};
use crate::settlement::grading::{grade_pick, GameSides, Graded};
use crate::settlement::home_away::{
    resolve_home_away, resolve_scores, HomeAway, ScoreError, UnknownReason,
};
use crate::settlement::payout::{settle_amounts, Payout};
use crate::settlement::report::{SettlementReport, SkipCategory, SkipDiagnostic, SkipReason};
use crate::store::Ledger;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Everything needed to settle one game's picks
#[derive(Debug, Clone)]
pub struct GameUnit {
    pub game: Game,
    pub team_a: Option<Team>,
    pub team_b: Option<Team>,
    pub team_a_canonical: bool,
    pub team_b_canonical: bool,
    pub lines: Vec<BettingLine>,
    pub picks: Vec<Pick>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    Graded {
        pick_id: PickId,
        game_id: GameId,
        graded: Graded,
        payout: Payout,
    },
    /// Game has no final result yet
    Pending { pick_id: PickId },
    Skipped(SkipDiagnostic),
}

impl PickOutcome {
    pub fn pick_id(&self) -> PickId {
        match self {
            PickOutcome::Graded { pick_id, .. } | PickOutcome::Pending { pick_id } => *pick_id,
            PickOutcome::Skipped(d) => d.pick_id,
        }
    }
}

fn skip_all(picks: &[Pick], reason: SkipReason) -> Vec<PickOutcome> {
    picks
        .iter()
        .map(|p| {
            PickOutcome::Skipped(SkipDiagnostic {
                pick_id: p.id,
                game_id: p.game_id,
                reason: reason.clone(),
            })
        })
        .collect()
}

/// Grade every pick of one game. Never touches the ledger.
pub fn settle_unit(unit: &GameUnit) -> Vec<PickOutcome> {
    let game = &unit.game;
    let (team_a, team_b) = match (&unit.team_a, &unit.team_b) {
        (Some(a), Some(b)) => (a, b),
        (None, _) => {
            return skip_all(&unit.picks, SkipReason::MissingTeam { team_id: game.team_a_id })
        }
        (_, None) => {
            return skip_all(&unit.picks, SkipReason::MissingTeam { team_id: game.team_b_id })
        }
    };
    for (team, canonical) in [(team_a, unit.team_a_canonical), (team_b, unit.team_b_canonical)] {
        if !canonical {
            return skip_all(
                &unit.picks,
                SkipReason::NonCanonicalTeam {
                    team_id: team.id,
                    name: team.canonical_name.clone(),
                },
            );
        }
    }

    let payload = match (&game.result, game.status) {
        (Some(payload), GameStatus::Final) => payload,
        _ => {
            return unit
                .picks
                .iter()
                .map(|p| PickOutcome::Pending { pick_id: p.id })
                .collect()
        }
    };

    let scores = match resolve_scores(team_a, team_b, payload) {
        Ok(scores) => scores,
        Err(ScoreError::MissingScores) => {
            warn!(game_id = %game.id, "Final game has no usable scores; leaving picks pending");
            return unit
                .picks
                .iter()
                .map(|p| PickOutcome::Pending { pick_id: p.id })
                .collect();
        }
        Err(ScoreError::HomeAway(reason)) => {
            return skip_all(&unit.picks, SkipReason::HomeAwayUnknown { reason })
        }
    };

    let sides = GameSides {
        team_a,
        team_b,
        scores,
    };
    unit.picks
        .iter()
        .map(|pick| match grade_pick(pick, &sides, &unit.lines) {
            Ok(graded) => PickOutcome::Graded {
                pick_id: pick.id,
                game_id: pick.game_id,
                graded,
                payout: settle_amounts(graded.result, pick.stake_amount, pick.odds),
            },
            Err(reason) => PickOutcome::Skipped(SkipDiagnostic {
                pick_id: pick.id,
                game_id: pick.game_id,
                reason,
            }),
        })
        .collect()
}

/// Copy the units of work for a date out of the ledger. Picks whose game is
/// missing come back as ready-made skips.
pub fn plan_date(ledger: &Ledger, date: NaiveDate) -> (Vec<GameUnit>, Vec<PickOutcome>) {
    let mut by_game: BTreeMap<GameId, Vec<Pick>> = BTreeMap::new();
    for pick in ledger.picks_for_date(date) {
        by_game.entry(pick.game_id).or_default().push(pick.clone());
    }

    let mut units = Vec::new();
    let mut orphans = Vec::new();
    for (game_id, picks) in by_game {
        let Some(game) = ledger.game(game_id) else {
            orphans.extend(skip_all(&picks, SkipReason::MissingGame));
            continue;
        };
        let registry = ledger.registry();
        units.push(GameUnit {
            game: game.clone(),
            team_a: registry.get(game.team_a_id),
            team_b: registry.get(game.team_b_id),
            team_a_canonical: registry.is_canonical(game.team_a_id),
            team_b_canonical: registry.is_canonical(game.team_b_id),
            lines: ledger.lines_for(game_id),
            picks,
        });
    }
    (units, orphans)
}

/// Write outcomes to the ledger and count them
pub fn apply_outcomes(
    ledger: &mut Ledger,
    date: NaiveDate,
    now: DateTime<Utc>,
    mut outcomes: Vec<PickOutcome>,
) -> SettlementReport {
    outcomes.sort_by_key(PickOutcome::pick_id);
    let mut report = SettlementReport::new(date);
    report.picks_considered = outcomes.len();

    for outcome in outcomes {
        match outcome {
            PickOutcome::Graded {
                pick_id,
                game_id,
                graded,
                payout,
            } => {
                if graded.inferred.is_some() {
                    if let Some(pick) = ledger.pick_mut(pick_id) {
                        if pick.team_id.is_none() {
                            pick.team_id = graded.team_id;
                            info!(pick_id = %pick_id, "Stored inferred team {:?} on pick", graded.team_id);
                        }
                    }
                }

                let Some(bet) = ledger.bet_entry(pick_id) else {
                    continue;
                };
                let previous = bet.result;
                if previous.is_terminal() {
                    report.re_settled += 1;
                    if previous != graded.result {
                        report.changed += 1;
                        warn!(
                            pick_id = %pick_id,
                            game_id = %game_id,
                            "Re-settlement changed result {} -> {} (profit {:.2} -> {:.2})",
                            previous,
                            graded.result,
                            bet.profit_loss,
                            payout.profit_loss
                        );
                    }
                } else {
                    report.newly_settled += 1;
                }

                bet.result = graded.result;
                bet.payout = payout.payout;
                bet.profit_loss = payout.profit_loss;
                bet.settled_at = Some(now);
                info!(
                    pick_id = %pick_id,
                    game_id = %game_id,
                    "Settled {}: payout ${:.2}, profit ${:.2}",
                    graded.result,
                    payout.payout,
                    payout.profit_loss
                );
            }
            PickOutcome::Pending { pick_id } => {
                ledger.bet_entry(pick_id);
                report.pending_no_result += 1;
            }
            PickOutcome::Skipped(diagnostic) => {
                if diagnostic.category() == SkipCategory::DataIntegrity {
                    error!(
                        pick_id = %diagnostic.pick_id,
                        game_id = %diagnostic.game_id,
                        "Skipping pick: {}",
                        diagnostic.reason
                    );
                } else {
                    warn!(
                        pick_id = %diagnostic.pick_id,
                        game_id = %diagnostic.game_id,
                        "Skipping pick ({}): {}",
                        diagnostic.category(),
                        diagnostic.reason
                    );
                }
                ledger.bet_entry(diagnostic.pick_id);
                report.skipped.push(diagnostic);
            }
        }
    }

    info!("{}", report.format().lines().next().unwrap_or_default());
    report
}

/// Settle every pick for `date`, one game after another
pub fn settle_date(ledger: &mut Ledger, date: NaiveDate, now: DateTime<Utc>) -> SettlementReport {
    let (units, mut outcomes) = plan_date(ledger, date);
    for unit in &units {
        outcomes.extend(settle_unit(unit));
    }
    apply_outcomes(ledger, date, now, outcomes)
}

/// Settle every pick for `date` with one blocking task per game
pub async fn settle_date_parallel(
    ledger: &mut Ledger,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> Result<SettlementReport> {
    let (units, mut outcomes) = plan_date(ledger, date);

    let mut tasks = JoinSet::new();
    for unit in units {
        tasks.spawn_blocking(move || settle_unit(&unit));
    }
    while let Some(joined) = tasks.join_next().await {
        outcomes.extend(joined.context("Settlement task failed")?);
    }

    Ok(apply_outcomes(ledger, date, now, outcomes))
}

/// Attach a result payload to a game and mark it final.
///
/// A game whose stored result already resolves to a home/away orientation keeps
/// it: a payload that resolves the other way is rejected, and an unlabeled score
/// correction inherits the stored labels.
pub fn record_result(
    ledger: &mut Ledger,
    game_id: GameId,
    mut payload: ResultPayload,
) -> Result<HomeAway, StoreError> {
    let game = ledger.game(game_id).ok_or(StoreError::UnknownGame(game_id))?;
    let team_a = ledger
        .team(game.team_a_id)
        .ok_or(StoreError::UnknownTeam(game.team_a_id))?;
    let team_b = ledger
        .team(game.team_b_id)
        .ok_or(StoreError::UnknownTeam(game.team_b_id))?;

    let mut incoming = resolve_home_away(&team_a, &team_b, &payload);
    if let Some(previous) = game.result.as_ref() {
        let recorded = resolve_home_away(&team_a, &team_b, previous);
        match (recorded, incoming) {
            (HomeAway::Resolved { a_is_home: was }, HomeAway::Resolved { a_is_home: now })
                if was != now =>
            {
                error!(
                    game_id = %game_id,
                    "Refusing result that flips home/away for '{}' vs '{}'",
                    team_a.canonical_name, team_b.canonical_name
                );
                return Err(StoreError::OrientationChanged(game_id));
            }
            (HomeAway::Resolved { .. }, HomeAway::Unknown(UnknownReason::NoLabels)) => {
                info!(game_id = %game_id, "Unlabeled result; keeping recorded home/away");
                payload.home_team = previous.home_team.clone();
                payload.away_team = previous.away_team.clone();
                payload.home_team_id = previous.home_team_id;
                payload.away_team_id = previous.away_team_id;
                incoming = recorded;
            }
            _ => {}
        }
    }

    if let HomeAway::Unknown(reason) = incoming {
        warn!(game_id = %game_id, "Recorded result with unresolved home/away: {}", reason);
    }
    if let Some(game) = ledger.game_mut(game_id) {
        game.result = Some(payload);
        game.status = GameStatus::Final;
    }
    Ok(incoming)
}

/// Bets of a date that are still open
pub fn pending_picks(ledger: &Ledger, date: NaiveDate) -> Vec<PickId> {
    ledger
        .picks_for_date(date)
        .into_iter()
        .filter(|p| {
            ledger
                .bet(p.id)
                .map_or(true, |b| b.result == BetResult::Pending)
        })
        .map(|p| p.id)
        .collect()
}
