//! In-memory ledger of teams, games, lines, picks and bets, with a JSON snapshot on disk.

use crate::error::StoreError;
use crate::models::{Bet, BettingLine, Game, GameId, Pick, PickId, Team, TeamId};
use crate::teams::registry::TeamRegistry;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct Ledger {
    registry: TeamRegistry,
    games: BTreeMap<GameId, Game>,
    lines: Vec<BettingLine>,
    picks: BTreeMap<PickId, Pick>,
    bets: BTreeMap<PickId, Bet>,
}

/// On-disk form of the ledger
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub games: Vec<Game>,
    #[serde(default)]
    pub lines: Vec<BettingLine>,
    #[serde(default)]
    pub picks: Vec<Pick>,
    #[serde(default)]
    pub bets: Vec<Bet>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            registry: TeamRegistry::new(),
            ..Default::default()
        }
    }

    pub fn registry(&self) -> &TeamRegistry {
        &self.registry
    }

    /// Resolve both raw names of a game and store it
    pub fn add_game_by_names(
        &mut self,
        id: GameId,
        team_a_raw: &str,
        team_b_raw: &str,
        date: NaiveDate,
    ) -> Result<&Game, StoreError> {
        let team_a_id = self.registry.resolve(team_a_raw, team_b_raw)?;
        let team_b_id = self.registry.resolve(team_b_raw, team_a_raw)?;
        self.insert_game(Game {
            id,
            team_a_id,
            team_b_id,
            date,
            venue: None,
            status: crate::models::GameStatus::Scheduled,
            result: None,
        })
    }

    pub fn insert_game(&mut self, game: Game) -> Result<&Game, StoreError> {
        if game.team_a_id == game.team_b_id {
            return Err(StoreError::SameTeamTwice(game.id));
        }
        for team_id in [game.team_a_id, game.team_b_id] {
            if !self.registry.contains(team_id) {
                return Err(StoreError::UnknownTeam(team_id));
            }
        }
        if self.games.contains_key(&game.id) {
            return Err(StoreError::DuplicateGame(game.id));
        }
        let id = game.id;
        Ok(self.games.entry(id).or_insert(game))
    }

    pub fn game(&self, id: GameId) -> Option<&Game> {
        self.games.get(&id)
    }

    pub fn game_mut(&mut self, id: GameId) -> Option<&mut Game> {
        self.games.get_mut(&id)
    }

    /// Insert or replace the quote for (game, book, bet type, side)
    pub fn upsert_line(&mut self, line: BettingLine) -> Result<(), StoreError> {
        if !self.games.contains_key(&line.game_id) {
            return Err(StoreError::UnknownGame(line.game_id));
        }
        let existing = self.lines.iter_mut().find(|l| {
            l.game_id == line.game_id
                && l.bet_type == line.bet_type
                && l.side == line.side
                && l.book.eq_ignore_ascii_case(&line.book)
        });
        match existing {
            Some(existing) => {
                debug!(
                    game_id = %line.game_id,
                    "Re-quote {} {} from {}: {} -> {}",
                    line.bet_type, line.odds, line.book, existing.line, line.line
                );
                *existing = line;
            }
            None => self.lines.push(line),
        }
        Ok(())
    }

    pub fn lines_for(&self, game_id: GameId) -> Vec<BettingLine> {
        self.lines
            .iter()
            .filter(|l| l.game_id == game_id)
            .cloned()
            .collect()
    }

    /// Accept a pick and open its PENDING bet
    pub fn insert_pick(&mut self, pick: Pick) -> Result<(), StoreError> {
        if self.picks.contains_key(&pick.id) {
            return Err(StoreError::DuplicatePickId(pick.id));
        }
        let game = self
            .games
            .get(&pick.game_id)
            .ok_or(StoreError::UnknownGame(pick.game_id))?;
        if let Some(team_id) = pick.team_id {
            if !self.registry.contains(team_id) {
                return Err(StoreError::UnknownTeam(team_id));
            }
        }

        let day = pick.created_at.date_naive();
        let duplicate = self
            .picks
            .values()
            .any(|p| p.game_id == pick.game_id && p.created_at.date_naive() == day);
        if duplicate {
            return Err(StoreError::DuplicatePick {
                game_id: game.id,
                date: day,
            });
        }

        self.bets
            .entry(pick.id)
            .or_insert_with(|| Bet::pending(pick.id, pick.created_at));
        self.picks.insert(pick.id, pick);
        Ok(())
    }

    pub fn pick(&self, id: PickId) -> Option<&Pick> {
        self.picks.get(&id)
    }

    pub fn pick_mut(&mut self, id: PickId) -> Option<&mut Pick> {
        self.picks.get_mut(&id)
    }

    /// Picks on games dated `date`, plus picks made that day whose game is gone
    pub fn picks_for_date(&self, date: NaiveDate) -> Vec<&Pick> {
        self.picks
            .values()
            .filter(|p| match self.games.get(&p.game_id) {
                Some(game) => game.date == date,
                None => p.created_at.date_naive() == date,
            })
            .collect()
    }

    pub fn bet(&self, pick_id: PickId) -> Option<&Bet> {
        self.bets.get(&pick_id)
    }

    /// The one bet for a pick, created PENDING if missing
    pub fn bet_entry(&mut self, pick_id: PickId) -> Option<&mut Bet> {
        let placed_at = self.picks.get(&pick_id)?.created_at;
        Some(
            self.bets
                .entry(pick_id)
                .or_insert_with(|| Bet::pending(pick_id, placed_at)),
        )
    }

    pub fn bets(&self) -> impl Iterator<Item = &Bet> {
        self.bets.values()
    }

    pub fn team(&self, id: TeamId) -> Option<Team> {
        self.registry.get(id)
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, StoreError> {
        let registry = TeamRegistry::from_teams(snapshot.teams)?;
        let mut ledger = Self {
            registry,
            ..Default::default()
        };
        for game in snapshot.games {
            ledger.insert_game(game)?;
        }
        for line in snapshot.lines {
            ledger.upsert_line(line)?;
        }
        // Bets first so existing settlements survive pick insertion
        for bet in snapshot.bets {
            ledger.bets.insert(bet.pick_id, bet);
        }
        for pick in snapshot.picks {
            ledger.insert_pick(pick)?;
        }
        Ok(ledger)
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            teams: self.registry.teams(),
            games: self.games.values().cloned().collect(),
            lines: self.lines.clone(),
            picks: self.picks.values().cloned().collect(),
            bets: self.bets.values().cloned().collect(),
        }
    }

    /// Load the ledger from a JSON snapshot file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read ledger snapshot {}", path.display()))?;
        let snapshot: Snapshot =
            serde_json::from_str(&json).context("Failed to deserialize ledger snapshot")?;
        let ledger = Self::from_snapshot(snapshot).context("Ledger snapshot is inconsistent")?;
        info!(
            "Loaded ledger from {}: {} teams, {} games, {} picks",
            path.display(),
            ledger.registry.len(),
            ledger.games.len(),
            ledger.picks.len()
        );
        Ok(ledger)
    }

    /// Save the ledger as pretty JSON, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("Failed to create snapshot directory")?;
        }
        let json = serde_json::to_string_pretty(&self.to_snapshot())
            .context("Failed to serialize ledger snapshot")?;
        std::fs::write(path, json).context("Failed to write ledger snapshot")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BetResult, BetType, LineSide};
    use chrono::{TimeZone, Utc};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn pick(id: i64, game_id: GameId) -> Pick {
        Pick {
            id: PickId(id),
            game_id,
            bet_type: BetType::Total,
            line: 150.5,
            odds: -110,
            team_id: None,
            book: "fanduel".to_string(),
            stake_units: 1.0,
            stake_amount: 10.0,
            rationale: "over".to_string(),
            selection_text: None,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 15, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_game_requires_two_distinct_teams() {
        let mut ledger = Ledger::new();
        assert_eq!(
            ledger
                .add_game_by_names(GameId(1), "Duke", "Duke Blue Devils", day())
                .unwrap_err(),
            StoreError::SameTeamTwice(GameId(1))
        );
        ledger
            .add_game_by_names(GameId(1), "Duke", "UNC", day())
            .unwrap();
        assert_eq!(
            ledger
                .add_game_by_names(GameId(1), "Duke", "UNC", day())
                .unwrap_err(),
            StoreError::DuplicateGame(GameId(1))
        );
    }

    #[test]
    fn test_pick_opens_pending_bet_and_is_unique_per_day() {
        let mut ledger = Ledger::new();
        ledger
            .add_game_by_names(GameId(1), "Duke", "UNC", day())
            .unwrap();
        ledger.insert_pick(pick(1, GameId(1))).unwrap();
        assert_eq!(ledger.bet(PickId(1)).unwrap().result, BetResult::Pending);

        assert_eq!(
            ledger.insert_pick(pick(2, GameId(1))),
            Err(StoreError::DuplicatePick {
                game_id: GameId(1),
                date: day()
            })
        );
        assert_eq!(
            ledger.insert_pick(pick(1, GameId(1))),
            Err(StoreError::DuplicatePickId(PickId(1)))
        );
        assert_eq!(
            ledger.insert_pick(pick(3, GameId(9))),
            Err(StoreError::UnknownGame(GameId(9)))
        );
    }

    #[test]
    fn test_line_upsert_replaces_requote() {
        let mut ledger = Ledger::new();
        ledger
            .add_game_by_names(GameId(1), "Duke", "UNC", day())
            .unwrap();
        let mut line = BettingLine {
            game_id: GameId(1),
            book: "fanduel".to_string(),
            bet_type: BetType::Total,
            line: 150.5,
            odds: -110,
            side: LineSide::Over,
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
        };
        ledger.upsert_line(line.clone()).unwrap();
        line.line = 152.0;
        line.book = "FanDuel".to_string();
        ledger.upsert_line(line.clone()).unwrap();
        line.side = LineSide::Under;
        ledger.upsert_line(line).unwrap();

        let lines = ledger.lines_for(GameId(1));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line, 152.0);
    }

    #[test]
    fn test_snapshot_round_trip_keeps_settlement() {
        let mut ledger = Ledger::new();
        ledger
            .add_game_by_names(GameId(1), "Duke", "UNC", day())
            .unwrap();
        ledger.insert_pick(pick(1, GameId(1))).unwrap();
        if let Some(bet) = ledger.bet_entry(PickId(1)) {
            bet.result = BetResult::Win;
            bet.payout = 19.09;
        }

        let dir = std::env::temp_dir().join(format!("ledger-test-{}", std::process::id()));
        let path = dir.join("ledger.json");
        ledger.save(&path).unwrap();
        let loaded = Ledger::load(&path).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(loaded.registry().len(), 2);
        assert_eq!(loaded.bet(PickId(1)).unwrap().result, BetResult::Win);
        assert_eq!(loaded.picks_for_date(day()).len(), 1);
    }
}
