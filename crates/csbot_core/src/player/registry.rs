use std::collections::{BTreeMap, HashSet};

use super::types::Player;
use crate::error::{CoreError, Result};
use crate::save::PlayerRepository;

/// Whether members can sign up themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeasonStatus {
    #[default]
    Ready,
    Open,
}

/// Season member list backed by a repository.
///
/// Every mutation writes the whole registry through to the repository and
/// reports a failed write to the caller.
pub struct PlayerRegistry {
    players: BTreeMap<u64, Player>,
    repository: Box<dyn PlayerRepository>,
    season: SeasonStatus,
}

impl PlayerRegistry {
    /// Read the registry from `repository`. A repository that was never written is empty.
    pub fn open(repository: Box<dyn PlayerRepository>) -> Result<Self> {
        let mut registry = Self { players: BTreeMap::new(), repository, season: SeasonStatus::Ready };
        registry.reload()?;
        Ok(registry)
    }

    pub fn reload(&mut self) -> Result<()> {
        let players = self.repository.load()?;
        self.players = players.into_iter().map(|p| (p.id, p)).collect();
        log::debug!("Registry loaded with {} players", self.players.len());
        Ok(())
    }

    pub fn persist(&self) -> Result<()> {
        let players: Vec<Player> = self.players.values().cloned().collect();
        self.repository.store(&players)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.players.contains_key(&id)
    }

    pub fn get(&self, id: u64) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn season(&self) -> SeasonStatus {
        self.season
    }

    /// Players ordered by id.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Register or re-register a member. Re-registering keeps rank, maps and counters.
    pub fn register(&mut self, id: u64, name: &str, display_name: &str, pool: &[String]) -> Result<()> {
        match self.players.get_mut(&id) {
            Some(player) => {
                player.name = name.to_string();
                player.display_name = display_name.to_string();
                player.maps.reconcile(pool);
            }
            None => {
                self.players.insert(id, Player::new(id, name, display_name, pool));
                log::info!("Registered player {} ({})", name, id);
            }
        }
        self.persist()
    }

    /// Absent ids are a no-op.
    pub fn unregister(&mut self, id: u64) -> Result<()> {
        if self.players.remove(&id).is_some() {
            log::info!("Unregistered player {}", id);
        }
        self.persist()
    }

    pub fn set_rank(&mut self, id: u64, rank: i64) -> Result<()> {
        self.player_mut(id)?.set_rank(rank);
        self.persist()
    }

    pub fn set_igl(&mut self, id: u64, igl: bool) -> Result<()> {
        self.player_mut(id)?.set_igl(igl);
        self.persist()
    }

    pub fn link_steam(&mut self, id: u64, steam_id: &str) -> Result<()> {
        if steam_id.trim().is_empty() {
            return Err(CoreError::InvalidInput("steam id is empty".to_string()));
        }
        self.player_mut(id)?.set_steam_id(steam_id.trim());
        self.persist()
    }

    /// Replace a member's ranking. `maps` is ordered least to most wanted and
    /// must name every map of the active pool exactly once.
    pub fn set_maps(&mut self, id: u64, maps: &[String], pool: &[String]) -> Result<()> {
        validate_map_order(maps, pool)?;
        let player = self.player_mut(id)?;
        player.maps.reconcile(pool);
        player.update_maps(maps);
        self.persist()
    }

    /// Copy the `matches` counters of rolled players back into the registry.
    pub fn sync_matches(&mut self, rolled: &[Player]) -> Result<()> {
        self.apply_matches(rolled);
        self.persist()
    }

    /// In-memory half of `sync_matches`.
    pub fn apply_matches(&mut self, rolled: &[Player]) {
        for player in rolled {
            if let Some(registered) = self.players.get_mut(&player.id) {
                registered.matches = player.matches;
            }
        }
    }

    /// Start a new season: every member has to register again.
    pub fn reset_season(&mut self) -> Result<()> {
        log::info!("Season reset, dropping {} players", self.players.len());
        self.players.clear();
        self.persist()
    }

    // ========== Season sign-up ==========

    /// Clear the roster and open self sign-up.
    pub fn start_season(&mut self) -> Result<()> {
        if self.season == SeasonStatus::Open {
            return Err(CoreError::StateConflict("season registration is already open".to_string()));
        }
        self.reset_season()?;
        self.season = SeasonStatus::Open;
        log::info!("Season registration open");
        Ok(())
    }

    /// Close self sign-up, keeping everyone who registered.
    pub fn end_season_registration(&mut self) -> Result<()> {
        self.require_season_open()?;
        self.season = SeasonStatus::Ready;
        log::info!("Season registration closed with {} players", self.players.len());
        Ok(())
    }

    /// Abort the sign-up and drop everyone who registered.
    pub fn cancel_season(&mut self) -> Result<()> {
        self.require_season_open()?;
        self.reset_season()?;
        self.season = SeasonStatus::Ready;
        log::info!("Season registration cancelled");
        Ok(())
    }

    /// Self registration, only while the season sign-up is open.
    pub fn sign_up(&mut self, id: u64, name: &str, display_name: &str, pool: &[String]) -> Result<()> {
        self.require_season_open()?;
        self.register(id, name, display_name, pool)
    }

    /// Self removal, only while the season sign-up is open.
    pub fn withdraw(&mut self, id: u64) -> Result<()> {
        self.require_season_open()?;
        self.unregister(id)
    }

    fn require_season_open(&self) -> Result<()> {
        if self.season != SeasonStatus::Open {
            return Err(CoreError::StateConflict("no open season registration".to_string()));
        }
        Ok(())
    }

    fn player_mut(&mut self, id: u64) -> Result<&mut Player> {
        self.players
            .get_mut(&id)
            .ok_or_else(|| CoreError::NotFound(format!("player {} is not registered", id)))
    }
}

fn validate_map_order(maps: &[String], pool: &[String]) -> Result<()> {
    let uniques: HashSet<&str> = maps.iter().map(|m| m.as_str()).collect();
    if uniques.len() != maps.len() || maps.len() != pool.len() {
        return Err(CoreError::InvalidInput(format!("select {} different maps", pool.len())));
    }
    if let Some(unknown) = maps.iter().find(|m| !pool.contains(m)) {
        return Err(CoreError::InvalidInput(format!(
            "{} is not in the active duty pool",
            unknown
        )));
    }
    Ok(())
}
