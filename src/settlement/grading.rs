//! Grading of a single pick against a resolved final score.

use crate::models::{BetResult, BetType, BettingLine, LineSide, Pick, Team, TeamId, TotalDirection};
use crate::settlement::home_away::ResolvedScores;
use crate::settlement::payout::is_valid_american_odds;
use crate::settlement::report::SkipReason;
use crate::teams::matching::are_equivalent;
use tracing::{debug, warn};

/// Scores closer than this count as landing on the line
pub const PUSH_EPSILON: f64 = 0.01;

/// Words and symbols in selection text that never name a team
const SELECTION_NOISE: &[&str] = &[
    "pk", "pick", "pickem", "ml", "moneyline", "spread", "ats", "+", "-", "to", "win", "cover",
];

/// The two stored teams of a game with their final scores
#[derive(Debug, Clone, Copy)]
pub struct GameSides<'a> {
    pub team_a: &'a Team,
    pub team_b: &'a Team,
    pub scores: ResolvedScores,
}

impl GameSides<'_> {
    /// `(picked_score, opponent_score)` for a team in this game
    pub fn scores_for(&self, team_id: TeamId) -> Option<(i32, i32)> {
        if team_id == self.team_a.id {
            Some((self.scores.a_score, self.scores.b_score))
        } else if team_id == self.team_b.id {
            Some((self.scores.b_score, self.scores.a_score))
        } else {
            None
        }
    }

    pub fn home_team_id(&self) -> TeamId {
        if self.scores.a_is_home {
            self.team_a.id
        } else {
            self.team_b.id
        }
    }

    pub fn away_team_id(&self) -> TeamId {
        if self.scores.a_is_home {
            self.team_b.id
        } else {
            self.team_a.id
        }
    }
}

/// How a missing pick team was filled in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamInference {
    SelectionText,
    LineSign,
    OddsSign,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Graded {
    pub result: BetResult,
    /// Team the pick was graded for; `None` for totals
    pub team_id: Option<TeamId>,
    /// Set when `team_id` was not on the pick and had to be inferred
    pub inferred: Option<TeamInference>,
}

/// Spread: the picked side covers when its margin beats the negated line.
/// A positive line is the underdog getting points, a negative one the favorite laying them.
pub fn grade_spread(picked_score: i32, opponent_score: i32, line: f64) -> BetResult {
    let margin = (picked_score - opponent_score) as f64;
    let threshold = -line;
    if (margin - threshold).abs() < PUSH_EPSILON {
        BetResult::Push
    } else if margin > threshold {
        BetResult::Win
    } else {
        BetResult::Loss
    }
}

pub fn grade_total(total: i32, line: f64, direction: TotalDirection) -> BetResult {
    let total = total as f64;
    if (total - line).abs() < PUSH_EPSILON {
        return BetResult::Push;
    }
    let over_hit = total > line;
    match (direction, over_hit) {
        (TotalDirection::Over, true) | (TotalDirection::Under, false) => BetResult::Win,
        _ => BetResult::Loss,
    }
}

pub fn grade_moneyline(picked_score: i32, opponent_score: i32) -> BetResult {
    match picked_score.cmp(&opponent_score) {
        std::cmp::Ordering::Greater => BetResult::Win,
        std::cmp::Ordering::Equal => BetResult::Push,
        std::cmp::Ordering::Less => BetResult::Loss,
    }
}

/// Market labels that name both directions and pick neither
const BOTH_DIRECTIONS: &[&str] = &["over/under", "over-under", "o/u"];

/// Over/under side stated in free text ("Over 145.5", "u152", "take the under").
///
/// Only the words `over`/`under` and `o`/`u` glued to a number count. Text that
/// leans both ways yields `None`.
pub fn parse_total_direction(text: &str) -> Option<TotalDirection> {
    let mut lowered = text.to_lowercase();
    for label in BOTH_DIRECTIONS {
        lowered = lowered.replace(label, " ");
    }

    let mut found = None;
    for token in lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '.'))
        .map(|token| token.trim_matches('.'))
    {
        let Some(direction) = direction_token(token) else {
            continue;
        };
        match found {
            None => found = Some(direction),
            Some(seen) if seen != direction => return None,
            Some(_) => {}
        }
    }
    found
}

fn direction_token(token: &str) -> Option<TotalDirection> {
    match token {
        "over" => return Some(TotalDirection::Over),
        "under" => return Some(TotalDirection::Under),
        _ => {}
    }
    let mut chars = token.chars();
    let direction = match chars.next()? {
        'o' => TotalDirection::Over,
        'u' => TotalDirection::Under,
        _ => return None,
    };
    let number = chars.as_str();
    let numeric = number.starts_with(|c: char| c.is_ascii_digit()) && number.parse::<f64>().is_ok();
    numeric.then_some(direction)
}

pub fn direction_label(direction: TotalDirection) -> &'static str {
    match direction {
        TotalDirection::Over => "over",
        TotalDirection::Under => "under",
    }
}

/// Team named by a selection like "Duke -3.5 (-110)", when it names exactly one side
pub fn team_from_text(text: &str, team_a: &Team, team_b: &Team) -> Option<TeamId> {
    let cleaned = strip_selection_noise(text);
    if cleaned.is_empty() {
        return None;
    }
    let is_a = are_equivalent(&cleaned, &team_a.canonical_name);
    let is_b = are_equivalent(&cleaned, &team_b.canonical_name);
    match (is_a, is_b) {
        (true, false) => Some(team_a.id),
        (false, true) => Some(team_b.id),
        _ => None,
    }
}

fn strip_selection_noise(text: &str) -> String {
    text.split_whitespace()
        .map(|t| t.trim_matches(|c: char| "()[],:;".contains(c)))
        .filter(|t| !t.is_empty())
        .filter(|t| t.parse::<f64>().is_err())
        .filter(|t| !SELECTION_NOISE.contains(&t.to_lowercase().as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Last-resort team for a spread or moneyline pick stored without one.
///
/// Selection text is tried first. Failing that, a negative line (or negative
/// moneyline odds on a zero line) is taken as the home side. The rationale is
/// never consulted.
pub fn infer_team(pick: &Pick, sides: &GameSides<'_>) -> Option<(TeamId, TeamInference)> {
    let from_text = pick
        .selection_text
        .as_deref()
        .and_then(|text| team_from_text(text, sides.team_a, sides.team_b));
    if let Some(team_id) = from_text {
        return Some((team_id, TeamInference::SelectionText));
    }

    if pick.line < 0.0 {
        return Some((sides.home_team_id(), TeamInference::LineSign));
    }
    if pick.line > 0.0 {
        return Some((sides.away_team_id(), TeamInference::LineSign));
    }
    if pick.bet_type == BetType::Moneyline {
        if pick.odds < 0 {
            return Some((sides.home_team_id(), TeamInference::OddsSign));
        }
        if pick.odds > 0 {
            return Some((sides.away_team_id(), TeamInference::OddsSign));
        }
    }
    None
}

/// The stored total line for the pick's book and direction, latest quote first
pub fn find_total_line<'l>(
    lines: &'l [BettingLine],
    pick: &Pick,
    direction: TotalDirection,
) -> Option<&'l BettingLine> {
    let side = LineSide::from(direction);
    lines
        .iter()
        .filter(|l| {
            l.game_id == pick.game_id
                && l.bet_type == BetType::Total
                && l.side == side
                && l.book.eq_ignore_ascii_case(&pick.book)
        })
        .max_by_key(|l| l.timestamp)
}

/// Grade one pick. Every failure is a skip reason, never a default.
pub fn grade_pick(
    pick: &Pick,
    sides: &GameSides<'_>,
    lines: &[BettingLine],
) -> Result<Graded, SkipReason> {
    if !is_valid_american_odds(pick.odds) {
        return Err(SkipReason::InvalidOdds { odds: pick.odds });
    }

    match pick.bet_type {
        BetType::Total => {
            let direction = pick
                .selection_text
                .as_deref()
                .and_then(parse_total_direction)
                .or_else(|| parse_total_direction(&pick.rationale))
                .ok_or(SkipReason::TotalDirectionUnknown)?;
            let line = find_total_line(lines, pick, direction).ok_or_else(|| {
                SkipReason::NoTotalLine {
                    book: pick.book.clone(),
                    direction: direction_label(direction).to_string(),
                }
            })?;
            let total = sides.scores.total();
            let result = grade_total(total, line.line, direction);
            debug!(
                pick_id = %pick.id,
                "Total {}: total={}, line={} -> {}",
                direction_label(direction),
                total,
                line.line,
                result
            );
            Ok(Graded {
                result,
                team_id: None,
                inferred: None,
            })
        }
        BetType::Spread | BetType::Moneyline => {
            let (team_id, inferred) = match pick.team_id {
                Some(team_id) => (team_id, None),
                None => {
                    let (team_id, how) = infer_team(pick, sides).ok_or(SkipReason::TeamUnresolved {
                        bet_type: pick.bet_type,
                    })?;
                    warn!(
                        pick_id = %pick.id,
                        game_id = %pick.game_id,
                        "Pick has no team; inferred team {} from {:?}",
                        team_id,
                        how
                    );
                    (team_id, Some(how))
                }
            };

            let (picked, opponent) = sides
                .scores_for(team_id)
                .ok_or(SkipReason::TeamNotInGame { team_id })?;

            let result = if pick.bet_type == BetType::Spread {
                grade_spread(picked, opponent, pick.line)
            } else {
                grade_moneyline(picked, opponent)
            };
            debug!(
                pick_id = %pick.id,
                "{} team {}: picked={}, opponent={}, line={} -> {}",
                pick.bet_type,
                team_id,
                picked,
                opponent,
                pick.line,
                result
            );
            Ok(Graded {
                result,
                team_id: Some(team_id),
                inferred,
            })
        }
    }
}
