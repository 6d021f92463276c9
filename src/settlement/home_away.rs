//! Works out which stored team was home from a result payload whose orientation
//! may not match storage order.

use crate::models::{ResultPayload, Team, TeamId};
use crate::teams::matching::are_equivalent;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownReason {
    /// Payload carries neither team ids nor team names
    NoLabels,
    /// Ids put one team on both sides, or both teams on one side
    ConflictingIds,
    /// Names matched, but point at opposite orientations
    ConflictingNames,
    /// No label matched exactly one stored team
    NamesUnmatched,
}

impl fmt::Display for UnknownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnknownReason::NoLabels => "payload has no home/away labels",
            UnknownReason::ConflictingIds => "home/away ids conflict",
            UnknownReason::ConflictingNames => "home/away names conflict",
            UnknownReason::NamesUnmatched => "home/away names match neither team",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeAway {
    Resolved { a_is_home: bool },
    Unknown(UnknownReason),
}

impl HomeAway {
    /// `(a_is_home, b_is_home)` or `None` when unknown
    pub fn sides(&self) -> Option<(bool, bool)> {
        match self {
            HomeAway::Resolved { a_is_home } => Some((*a_is_home, !a_is_home)),
            HomeAway::Unknown(_) => None,
        }
    }
}

/// Final scores attached to the stored teams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedScores {
    pub a_is_home: bool,
    pub home_score: i32,
    pub away_score: i32,
    pub a_score: i32,
    pub b_score: i32,
}

impl ResolvedScores {
    pub fn total(&self) -> i32 {
        self.home_score + self.away_score
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreError {
    MissingScores,
    HomeAway(UnknownReason),
}

/// Tally of orientation votes. `Some(true)` means team A is home.
#[derive(Default)]
struct Votes {
    a_home: bool,
    b_home: bool,
}

impl Votes {
    fn cast(&mut self, a_is_home: bool) {
        if a_is_home {
            self.a_home = true;
        } else {
            self.b_home = true;
        }
    }

    fn outcome(&self) -> Option<Result<bool, ()>> {
        match (self.a_home, self.b_home) {
            (true, true) => Some(Err(())),
            (true, false) => Some(Ok(true)),
            (false, true) => Some(Ok(false)),
            (false, false) => None,
        }
    }
}

/// Decide which of the two stored teams was home.
///
/// Explicit ids win over names. Names are compared with the equivalence checker
/// against both canonical names and a label only counts when it matches exactly
/// one team. Storage order is never used as a fallback.
pub fn resolve_home_away(team_a: &Team, team_b: &Team, payload: &ResultPayload) -> HomeAway {
    let has_ids = payload.home_team_id.is_some() || payload.away_team_id.is_some();
    if has_ids {
        match vote_by_ids(team_a.id, team_b.id, payload).outcome() {
            Some(Ok(a_is_home)) => return HomeAway::Resolved { a_is_home },
            Some(Err(())) => {
                warn!(
                    "Home/away ids {:?}/{:?} conflict for teams {} and {}",
                    payload.home_team_id, payload.away_team_id, team_a.id, team_b.id
                );
                return HomeAway::Unknown(UnknownReason::ConflictingIds);
            }
            None => {
                warn!(
                    "Home/away ids {:?}/{:?} match neither team {} nor {}; trying names",
                    payload.home_team_id, payload.away_team_id, team_a.id, team_b.id
                );
            }
        }
    }

    let home_name = payload.home_team.as_deref().filter(|s| !s.trim().is_empty());
    let away_name = payload.away_team.as_deref().filter(|s| !s.trim().is_empty());
    if home_name.is_none() && away_name.is_none() {
        return HomeAway::Unknown(if has_ids {
            UnknownReason::NamesUnmatched
        } else {
            UnknownReason::NoLabels
        });
    }

    let mut votes = Votes::default();
    if let Some(name) = home_name {
        if let Some(is_a) = match_label(name, team_a, team_b) {
            votes.cast(is_a);
        }
    }
    if let Some(name) = away_name {
        if let Some(is_a) = match_label(name, team_a, team_b) {
            votes.cast(!is_a);
        }
    }

    match votes.outcome() {
        Some(Ok(a_is_home)) => {
            debug!(
                "Resolved home/away by name: '{}' home",
                if a_is_home {
                    &team_a.canonical_name
                } else {
                    &team_b.canonical_name
                }
            );
            HomeAway::Resolved { a_is_home }
        }
        Some(Err(())) => {
            warn!(
                "Home/away names {:?}/{:?} give opposite orientations for '{}' vs '{}'",
                home_name, away_name, team_a.canonical_name, team_b.canonical_name
            );
            HomeAway::Unknown(UnknownReason::ConflictingNames)
        }
        None => HomeAway::Unknown(UnknownReason::NamesUnmatched),
    }
}

fn vote_by_ids(a: TeamId, b: TeamId, payload: &ResultPayload) -> Votes {
    let mut votes = Votes::default();
    let home = payload.home_team_id;
    let away = payload.away_team_id;

    if home.is_some() && home == away {
        votes.cast(true);
        votes.cast(false);
        return votes;
    }
    if home == Some(a) || away == Some(b) {
        votes.cast(true);
    }
    if home == Some(b) || away == Some(a) {
        votes.cast(false);
    }
    votes
}

/// `Some(true)` when `label` names team A only, `Some(false)` for team B only
fn match_label(label: &str, team_a: &Team, team_b: &Team) -> Option<bool> {
    let is_a = are_equivalent(label, &team_a.canonical_name);
    let is_b = are_equivalent(label, &team_b.canonical_name);
    match (is_a, is_b) {
        (true, false) => Some(true),
        (false, true) => Some(false),
        (true, true) => {
            warn!(
                "Label '{}' matches both '{}' and '{}'",
                label, team_a.canonical_name, team_b.canonical_name
            );
            None
        }
        (false, false) => None,
    }
}

/// Scores attributed to the stored teams using the resolved orientation.
///
/// The payload's `home_score` belongs to whichever team the labels say was home,
/// so when team A is away its score is the payload's `away_score`.
pub fn resolve_scores(
    team_a: &Team,
    team_b: &Team,
    payload: &ResultPayload,
) -> Result<ResolvedScores, ScoreError> {
    let (home_score, away_score) = payload.scores().ok_or(ScoreError::MissingScores)?;
    let a_is_home = match resolve_home_away(team_a, team_b, payload) {
        HomeAway::Resolved { a_is_home } => a_is_home,
        HomeAway::Unknown(reason) => return Err(ScoreError::HomeAway(reason)),
    };

    let (a_score, b_score) = if a_is_home {
        (home_score, away_score)
    } else {
        (away_score, home_score)
    };
    Ok(ResolvedScores {
        a_is_home,
        home_score,
        away_score,
        a_score,
        b_score,
    })
}
