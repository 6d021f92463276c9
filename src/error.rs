use crate::models::{GameId, PickId, TeamId};
use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the team registry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Team name {raw:?} is empty after normalization")]
    EmptyName { raw: String },

    /// A canonical key still carries a nickname; the normalizer is wrong, not the data
    #[error("Canonical team name is not mascot-free: {name}")]
    NonCanonicalName { name: String },

    #[error("Team not found: {0}")]
    UnknownTeam(TeamId),

    #[error("Canonical name {name} already belongs to team {existing}")]
    NameTaken { name: String, existing: TeamId },
}

/// Errors raised when writing to the ledger
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Game {0} already exists")]
    DuplicateGame(GameId),

    #[error("Game {0} lists the same team on both sides")]
    SameTeamTwice(GameId),

    #[error("Game not found: {0}")]
    UnknownGame(GameId),

    #[error("Team not found: {0}")]
    UnknownTeam(TeamId),

    #[error("New result for game {0} flips its recorded home/away orientation")]
    OrientationChanged(GameId),

    #[error("Pick {0} already exists")]
    DuplicatePickId(PickId),

    #[error("A pick already exists for game {game_id} on {date}")]
    DuplicatePick { game_id: GameId, date: NaiveDate },

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Invalid environment configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}")]
    Invalid { key: String, value: String },
}
