//! Durable mapping from canonical lookup keys to stable team ids.
//!
//! Lookups and first sightings go through a single `DashMap` entry so two games
//! discovering the same new program at once still produce one row.

use crate::error::RegistryError;
use crate::models::{DisambiguationContext, Team, TeamId};
use crate::teams::normalizer::{is_mascot_free, normalize_for_lookup};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::{debug, error, info, warn};

/// Keys that a flagship shares with differently-qualified sibling campuses
const AMBIGUOUS_FAMILIES: &[(&str, &[&str])] = &[
    (
        "north carolina",
        &[
            "north carolina a&t",
            "north carolina central",
            "unc greensboro",
            "unc asheville",
            "unc wilmington",
            "charlotte",
        ],
    ),
    ("south carolina", &["south carolina st", "usc upstate"]),
    ("miami", &["miami oh"]),
    (
        "texas a&m",
        &["texas a&m corpus christi", "texas a&m commerce"],
    ),
    ("st francis", &["st francis pa", "st francis brooklyn"]),
    (
        "loyola",
        &["loyola chicago", "loyola maryland", "loyola marymount"],
    ),
];

/// Raw words that point at a sibling campus even when normalization drops them
const VARIANT_INDICATORS: &[&str] = &[
    "a&t",
    "central",
    "state",
    "st",
    "greensboro",
    "asheville",
    "wilmington",
    "charlotte",
    "upstate",
    "oh",
    "ohio",
    "pa",
    "ny",
    "brooklyn",
    "chicago",
    "maryland",
    "marymount",
    "corpus",
    "commerce",
];

#[derive(Debug)]
pub struct TeamRegistry {
    by_name: DashMap<String, TeamId>,
    teams: DashMap<TeamId, Team>,
    next_id: AtomicI64,
}

impl Default for TeamRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TeamRegistry {
    pub fn new() -> Self {
        Self {
            by_name: DashMap::new(),
            teams: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Rebuild a registry from persisted rows. Rows whose names are not canonical
    /// are kept so integrity checks can report them.
    pub fn from_teams(teams: impl IntoIterator<Item = Team>) -> Result<Self, RegistryError> {
        let registry = Self::new();
        let mut max_id = 0;
        for team in teams {
            if let Some(existing) = registry.by_name.get(&team.canonical_name) {
                return Err(RegistryError::NameTaken {
                    name: team.canonical_name.clone(),
                    existing: *existing,
                });
            }
            if !is_canonical_name(&team.canonical_name) {
                warn!(
                    team_id = %team.id,
                    "Loaded team '{}' is not in canonical form",
                    team.canonical_name
                );
            }
            max_id = max_id.max(team.id.0);
            registry.by_name.insert(team.canonical_name.clone(), team.id);
            registry.teams.insert(team.id, team);
        }
        registry.next_id.store(max_id + 1, Ordering::SeqCst);
        Ok(registry)
    }

    /// Resolve a raw name to its team id, creating the team on first sighting.
    ///
    /// For keys shared by a flagship and its sibling campuses the opponent and any
    /// qualifier words in `raw_name` are compared with the context recorded when
    /// the team was created. A mismatch is logged, never re-routed.
    pub fn resolve(&self, raw_name: &str, opponent_raw_name: &str) -> Result<TeamId, RegistryError> {
        let key = normalize_for_lookup(raw_name);
        if key.is_empty() {
            return Err(RegistryError::EmptyName {
                raw: raw_name.to_string(),
            });
        }

        let family = ambiguous_family(&key);
        let context = family.map(|variants| sighting_context(raw_name, opponent_raw_name, &key, variants));
        // Read before taking the entry: a shard lock is held until it is dropped
        let existing_variants: Vec<String> = family
            .map(|variants| {
                variants
                    .iter()
                    .filter(|v| self.by_name.contains_key(**v))
                    .map(|v| v.to_string())
                    .collect()
            })
            .unwrap_or_default();

        let entry = self.by_name.entry(key.clone());
        match entry {
            Entry::Occupied(occupied) => {
                let id = *occupied.get();
                drop(occupied);
                if let Some(context) = context {
                    self.check_sighting(id, &key, raw_name, &context);
                }
                Ok(id)
            }
            Entry::Vacant(vacant) => {
                if !is_mascot_free(&key) {
                    error!(
                        "Refusing to create team '{}' from '{}': canonical name carries a mascot",
                        key, raw_name
                    );
                    return Err(RegistryError::NonCanonicalName { name: key });
                }
                if !existing_variants.is_empty() {
                    warn!(
                        "Creating team '{}' from '{}' while sibling teams exist: {:?}. Opponent: '{}'",
                        key, raw_name, existing_variants, opponent_raw_name
                    );
                }

                let id = TeamId(self.next_id.fetch_add(1, Ordering::SeqCst));
                self.teams.insert(
                    id,
                    Team {
                        id,
                        canonical_name: key.clone(),
                        disambiguation: context,
                    },
                );
                vacant.insert(id);
                info!(team_id = %id, "Created new team: '{}' -> '{}'", raw_name, key);
                Ok(id)
            }
        }
    }

    fn check_sighting(
        &self,
        id: TeamId,
        key: &str,
        raw_name: &str,
        current: &DisambiguationContext,
    ) {
        let recorded = self.teams.get(&id).and_then(|t| t.disambiguation.clone());
        let differs = match &recorded {
            Some(recorded) => {
                recorded.opponent_in_family != current.opponent_in_family
                    || !current.variant_indicators.is_empty()
            }
            None => !current.variant_indicators.is_empty(),
        };

        if differs {
            warn!(
                team_id = %id,
                "Ambiguous team '{}' (from '{}') sighted against '{}' with indicators {:?}; registered context {:?}. Using existing team",
                key, raw_name, current.opponent, current.variant_indicators, recorded
            );
        } else {
            debug!(team_id = %id, "Using existing team '{}' (from '{}') vs '{}'", key, raw_name, current.opponent);
        }
    }

    /// Look up without creating
    pub fn find(&self, raw_name: &str) -> Option<TeamId> {
        let key = normalize_for_lookup(raw_name);
        self.by_name.get(&key).map(|id| *id)
    }

    pub fn get(&self, id: TeamId) -> Option<Team> {
        self.teams.get(&id).map(|t| t.clone())
    }

    pub fn canonical_name(&self, id: TeamId) -> Option<String> {
        self.teams.get(&id).map(|t| t.canonical_name.clone())
    }

    pub fn contains(&self, id: TeamId) -> bool {
        self.teams.contains_key(&id)
    }

    /// Correct a prior normalization mistake in place. The id never changes.
    pub fn rename(&self, id: TeamId, new_name: &str, rationale: &str) -> Result<(), RegistryError> {
        if !self.teams.contains_key(&id) {
            return Err(RegistryError::UnknownTeam(id));
        }
        let new_key = normalize_for_lookup(new_name);
        if new_key.is_empty() {
            return Err(RegistryError::EmptyName {
                raw: new_name.to_string(),
            });
        }
        if !is_mascot_free(&new_key) {
            return Err(RegistryError::NonCanonicalName { name: new_key });
        }

        match self.by_name.entry(new_key.clone()) {
            Entry::Occupied(occupied) if *occupied.get() != id => {
                return Err(RegistryError::NameTaken {
                    name: new_key,
                    existing: *occupied.get(),
                });
            }
            Entry::Occupied(_) => return Ok(()),
            Entry::Vacant(vacant) => {
                vacant.insert(id);
            }
        }

        let old_name = match self.teams.get_mut(&id) {
            Some(mut team) => std::mem::replace(&mut team.canonical_name, new_key.clone()),
            None => return Err(RegistryError::UnknownTeam(id)),
        };
        self.by_name.remove_if(&old_name, |_, owner| *owner == id);

        info!(
            team_id = %id,
            "Renamed team '{}' -> '{}': {}",
            old_name, new_key, rationale
        );
        Ok(())
    }

    /// True when the stored name is exactly what lookup normalization would produce
    pub fn is_canonical(&self, id: TeamId) -> bool {
        self.teams
            .get(&id)
            .is_some_and(|t| is_canonical_name(&t.canonical_name))
    }

    /// Teams whose stored names are not canonical
    pub fn audit(&self) -> Vec<Team> {
        let mut bad: Vec<Team> = self
            .teams
            .iter()
            .filter(|t| !is_canonical_name(&t.canonical_name))
            .map(|t| t.clone())
            .collect();
        bad.sort_by_key(|t| t.id);
        bad
    }

    /// All teams ordered by id
    pub fn teams(&self) -> Vec<Team> {
        let mut teams: Vec<Team> = self.teams.iter().map(|t| t.clone()).collect();
        teams.sort_by_key(|t| t.id);
        teams
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

fn is_canonical_name(name: &str) -> bool {
    !name.is_empty() && is_mascot_free(name) && normalize_for_lookup(name) == name
}

fn ambiguous_family(key: &str) -> Option<&'static [&'static str]> {
    AMBIGUOUS_FAMILIES
        .iter()
        .find(|(base, _)| *base == key)
        .map(|(_, variants)| *variants)
}

fn sighting_context(
    raw_name: &str,
    opponent_raw_name: &str,
    key: &str,
    variants: &[&str],
) -> DisambiguationContext {
    let opponent = normalize_for_lookup(opponent_raw_name);
    let opponent_in_family = variants.iter().any(|v| *v == opponent);

    let key_words: Vec<&str> = key.split_whitespace().collect();
    let lowered = raw_name.to_lowercase();
    let mut variant_indicators: Vec<String> = lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '&'))
        .filter(|w| VARIANT_INDICATORS.contains(w) && !key_words.contains(w))
        .map(str::to_string)
        .collect();
    variant_indicators.dedup();

    DisambiguationContext {
        opponent,
        opponent_in_family,
        variant_indicators,
    }
}
