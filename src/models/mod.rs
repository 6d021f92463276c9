use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Stable identity of a canonical athletic program
    TeamId
);
id_type!(GameId);
id_type!(PickId);

/// Context recorded the first time an ambiguous canonical key was registered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisambiguationContext {
    pub opponent: String,
    /// Opponent normalizes to one of the branch campuses sharing this key's family
    pub opponent_in_family: bool,
    /// Qualifier words present in the raw name that normalization discarded
    pub variant_indicators: Vec<String>,
}

/// A canonical athletic program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub canonical_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disambiguation: Option<DisambiguationContext>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Scheduled,
    Live,
    Final,
    Postponed,
    Cancelled,
}

/// Result payload as delivered by a scoreboard source. Every field is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultPayload {
    #[serde(default, alias = "homeScore", deserialize_with = "lenient_score")]
    pub home_score: Option<i32>,
    #[serde(default, alias = "awayScore", deserialize_with = "lenient_score")]
    pub away_score: Option<i32>,
    #[serde(default, alias = "homeTeam", skip_serializing_if = "Option::is_none")]
    pub home_team: Option<String>,
    #[serde(default, alias = "awayTeam", skip_serializing_if = "Option::is_none")]
    pub away_team: Option<String>,
    #[serde(default, alias = "homeTeamId", skip_serializing_if = "Option::is_none")]
    pub home_team_id: Option<TeamId>,
    #[serde(default, alias = "awayTeamId", skip_serializing_if = "Option::is_none")]
    pub away_team_id: Option<TeamId>,
}

impl ResultPayload {
    pub fn scores(&self) -> Option<(i32, i32)> {
        Some((self.home_score?, self.away_score?))
    }
}

/// Accepts integers, whole-number floats and numeric strings. Anything else,
/// negative or out of `i32` range, is no score.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(score_from_value))
}

fn score_from_value(value: &serde_json::Value) -> Option<i32> {
    match value {
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(v) => whole_score(v),
            None => n.as_f64().and_then(float_score),
        },
        serde_json::Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(v) => whole_score(v),
                Err(_) => s.parse::<f64>().ok().and_then(float_score),
            }
        }
        _ => None,
    }
}

fn whole_score(v: i64) -> Option<i32> {
    i32::try_from(v).ok().filter(|score| *score >= 0)
}

fn float_score(v: f64) -> Option<i32> {
    if v.fract() == 0.0 {
        whole_score(v as i64)
    } else {
        None
    }
}

/// A single contest. `team_a_id`/`team_b_id` order says nothing about home/away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub team_a_id: TeamId,
    pub team_b_id: TeamId,
    pub date: NaiveDate,
    #[serde(default)]
    pub venue: Option<String>,
    pub status: GameStatus,
    #[serde(default)]
    pub result: Option<ResultPayload>,
}

impl Game {
    pub fn involves(&self, team_id: TeamId) -> bool {
        self.team_a_id == team_id || self.team_b_id == team_id
    }

    pub fn opponent_of(&self, team_id: TeamId) -> Option<TeamId> {
        if team_id == self.team_a_id {
            Some(self.team_b_id)
        } else if team_id == self.team_b_id {
            Some(self.team_a_id)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetType {
    Spread,
    Total,
    Moneyline,
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BetType::Spread => "spread",
            BetType::Total => "total",
            BetType::Moneyline => "moneyline",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalDirection {
    Over,
    Under,
}

/// Which side of a market a line quotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSide {
    Team(TeamId),
    Over,
    Under,
}

impl From<TotalDirection> for LineSide {
    fn from(direction: TotalDirection) -> Self {
        match direction {
            TotalDirection::Over => LineSide::Over,
            TotalDirection::Under => LineSide::Under,
        }
    }
}

/// One quoted line from a sportsbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingLine {
    pub game_id: GameId,
    pub book: String,
    pub bet_type: BetType,
    pub line: f64,
    pub odds: i32, // American odds format (e.g., -110, +150)
    pub side: LineSide,
    pub timestamp: DateTime<Utc>,
}

/// A wager decision handed over by the picking agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    pub id: PickId,
    pub game_id: GameId,
    pub bet_type: BetType,
    pub line: f64,
    pub odds: i32,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    pub book: String,
    #[serde(default)]
    pub stake_units: f64,
    #[serde(default)]
    pub stake_amount: f64,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub selection_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetResult {
    Pending,
    Win,
    Loss,
    Push,
}

impl BetResult {
    pub fn is_terminal(self) -> bool {
        !matches!(self, BetResult::Pending)
    }
}

impl fmt::Display for BetResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BetResult::Pending => "PENDING",
            BetResult::Win => "WIN",
            BetResult::Loss => "LOSS",
            BetResult::Push => "PUSH",
        };
        f.write_str(s)
    }
}

/// Settlement record, exactly one per Pick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    pub pick_id: PickId,
    pub result: BetResult,
    pub payout: f64,
    pub profit_loss: f64,
    pub placed_at: DateTime<Utc>,
    #[serde(default)]
    pub settled_at: Option<DateTime<Utc>>,
}

impl Bet {
    pub fn pending(pick_id: PickId, placed_at: DateTime<Utc>) -> Self {
        Self {
            pick_id,
            result: BetResult::Pending,
            payout: 0.0,
            profit_loss: 0.0,
            placed_at,
            settled_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_scores() {
        let payload: ResultPayload =
            serde_json::from_str(r#"{"homeScore": "72", "away_score": 80.0, "home_team": "Duke"}"#)
                .unwrap();
        assert_eq!(payload.scores(), Some((72, 80)));
        assert_eq!(payload.home_team.as_deref(), Some("Duke"));

        let payload: ResultPayload =
            serde_json::from_str(r#"{"home_score": "TBD", "away_score": 3}"#).unwrap();
        assert_eq!(payload.scores(), None);

        // Out-of-range or fractional values are not scores
        let payload: ResultPayload =
            serde_json::from_str(r#"{"home_score": 4294967368, "away_score": 80}"#).unwrap();
        assert_eq!(payload.home_score, None);
        let payload: ResultPayload =
            serde_json::from_str(r#"{"home_score": 71.6, "away_score": "1e12"}"#).unwrap();
        assert_eq!((payload.home_score, payload.away_score), (None, None));
        let payload: ResultPayload =
            serde_json::from_str(r#"{"home_score": -3, "away_score": "80"}"#).unwrap();
        assert_eq!((payload.home_score, payload.away_score), (None, Some(80)));

        let payload: ResultPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload, ResultPayload::default());
    }

    #[test]
    fn test_line_side_serialization() {
        assert_eq!(serde_json::to_string(&LineSide::Over).unwrap(), r#""over""#);
        assert_eq!(
            serde_json::to_string(&LineSide::Team(TeamId(4))).unwrap(),
            r#"{"team":4}"#
        );
    }

    #[test]
    fn test_game_opponent() {
        let game = Game {
            id: GameId(1),
            team_a_id: TeamId(10),
            team_b_id: TeamId(20),
            date: NaiveDate::from_ymd_opt(2025, 11, 22).unwrap(),
            venue: None,
            status: GameStatus::Final,
            result: None,
        };
        assert_eq!(game.opponent_of(TeamId(10)), Some(TeamId(20)));
        assert_eq!(game.opponent_of(TeamId(20)), Some(TeamId(10)));
        assert_eq!(game.opponent_of(TeamId(30)), None);
        assert!(!game.involves(TeamId(30)));
    }
}
