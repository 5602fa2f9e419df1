//! Match day orchestration.
//!
//! `MatchDayManager` is the single entry point for the chat layer: every
//! command or reaction arrives as an [`Event`], goes through the
//! `before_mutation` hook (reload the registry when the event reads players),
//! is dispatched to the registry or the session, and ends in `after_mutation`
//! (write back match counters of the last roll).
//!
//! Counters that could not be written stay pending on the manager and are
//! retried after every later event until a write succeeds.

use chrono::NaiveDate;

use crate::config::BotConfig;
use crate::error::{CoreError, Result};
use crate::maps::MapPoolSource;
use crate::player::{Player, PlayerRegistry};
use crate::save::PlayerRepository;
use crate::session::{MatchSession, SessionContext, SessionEvent, SessionOutcome};
use crate::team::TeamBalancer;
use crate::veto::BanorderInfo;

#[derive(Debug, Clone, PartialEq)]
pub enum MemberEvent {
    /// Clear the roster and open self sign-up
    StartSeason,
    EndSeason,
    CancelSeason,
    /// Self sign-up, only while the season is open
    SignUp { id: u64, name: String, display_name: String },
    Withdraw(u64),
    /// Admin add, always allowed
    Register { id: u64, name: String, display_name: String },
    Unregister(u64),
    SetRank { id: u64, rank: i64 },
    SetIgl { id: u64, igl: bool },
    /// Least to most wanted
    SetMaps { id: u64, maps: Vec<String> },
    LinkSteam { id: u64, steam_id: String },
    ResetSeason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Member(MemberEvent),
    Session(SessionEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    PlayerUpdated(Player),
    PlayerRemoved(u64),
    SeasonOpened,
    SeasonClosed { players: usize },
    SeasonCancelled,
    SeasonReset,
    Session(SessionOutcome),
}

pub struct MatchDayManager {
    registry: PlayerRegistry,
    session: MatchSession,
    balancer: TeamBalancer,
    maps: Box<dyn MapPoolSource>,
    /// Rolled players whose counters are not stored yet
    pending_counters: Option<Vec<Player>>,
}

impl MatchDayManager {
    pub fn new(
        registry: PlayerRegistry,
        session: MatchSession,
        balancer: TeamBalancer,
        maps: Box<dyn MapPoolSource>,
    ) -> Self {
        Self { registry, session, balancer, maps, pending_counters: None }
    }

    /// Wire everything from the configuration.
    pub fn from_config(
        config: &BotConfig,
        repository: Box<dyn PlayerRepository>,
        maps: Box<dyn MapPoolSource>,
        today: NaiveDate,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            PlayerRegistry::open(repository)?,
            MatchSession::from_config(config, today)?,
            TeamBalancer::from_config(config),
            maps,
        ))
    }

    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    pub fn session(&self) -> &MatchSession {
        &self.session
    }

    pub fn balancer_mut(&mut self) -> &mut TeamBalancer {
        &mut self.balancer
    }

    /// Whether the counters of the last roll still wait for a successful write.
    pub fn has_pending_counters(&self) -> bool {
        self.pending_counters.is_some()
    }

    pub fn active_pool(&self) -> Result<Vec<String>> {
        self.maps.fetch()
    }

    pub fn banorder(&self) -> Result<BanorderInfo> {
        self.session.banorder()
    }

    pub fn teamlist(&self) -> Result<String> {
        self.session.get_teamlist()
    }

    pub fn apply(&mut self, event: Event, today: NaiveDate) -> Result<Outcome> {
        self.before_mutation(&event)?;
        let result = match event {
            Event::Member(member) => self.apply_member(member),
            Event::Session(session) => self.apply_session(session, today),
        };
        self.after_mutation(result.as_ref().ok());
        result
    }

    fn before_mutation(&mut self, event: &Event) -> Result<()> {
        let reads_players = match event {
            Event::Member(_) => true,
            Event::Session(session) => session.touches_players(),
        };
        if !reads_players {
            return Ok(());
        }

        self.registry.reload()?;
        if let Some(rolled) = &self.pending_counters {
            // stored copy predates the last roll
            self.registry.apply_matches(rolled);
        }
        Ok(())
    }

    /// Store the counters of a fresh roll, or retry earlier ones.
    ///
    /// The roll itself already happened, so a failed write is kept pending
    /// rather than reported as a failed event.
    fn after_mutation(&mut self, outcome: Option<&Outcome>) {
        if let Some(Outcome::Session(SessionOutcome::TeamsRolled { rolled })) = outcome {
            self.pending_counters = Some(rolled.clone());
        }

        let Some(rolled) = self.pending_counters.take() else {
            return;
        };
        match self.store_counters(&rolled) {
            Ok(()) => log::info!("Stored match counters for {} players", rolled.len()),
            Err(err) => {
                log::warn!("Match counters for {} players not stored yet: {}", rolled.len(), err);
                self.registry.apply_matches(&rolled);
                self.pending_counters = Some(rolled);
            }
        }
    }

    /// Merge counters into the current stored registry, not a stale copy.
    fn store_counters(&mut self, rolled: &[Player]) -> Result<()> {
        self.registry.reload()?;
        self.registry.sync_matches(rolled)
    }

    fn apply_member(&mut self, event: MemberEvent) -> Result<Outcome> {
        match event {
            MemberEvent::StartSeason => {
                self.registry.start_season()?;
                // counters of the old season are gone with its roster
                self.pending_counters = None;
                Ok(Outcome::SeasonOpened)
            }
            MemberEvent::EndSeason => {
                self.registry.end_season_registration()?;
                Ok(Outcome::SeasonClosed { players: self.registry.len() })
            }
            MemberEvent::CancelSeason => {
                self.registry.cancel_season()?;
                self.pending_counters = None;
                Ok(Outcome::SeasonCancelled)
            }
            MemberEvent::SignUp { id, name, display_name } => {
                let pool = self.maps.fetch()?;
                self.registry.sign_up(id, &name, &display_name, &pool)?;
                self.updated(id)
            }
            MemberEvent::Withdraw(id) => {
                self.registry.withdraw(id)?;
                Ok(Outcome::PlayerRemoved(id))
            }
            MemberEvent::Register { id, name, display_name } => {
                let pool = self.maps.fetch()?;
                self.registry.register(id, &name, &display_name, &pool)?;
                self.updated(id)
            }
            MemberEvent::Unregister(id) => {
                self.registry.unregister(id)?;
                Ok(Outcome::PlayerRemoved(id))
            }
            MemberEvent::SetRank { id, rank } => {
                self.registry.set_rank(id, rank)?;
                self.updated(id)
            }
            MemberEvent::SetIgl { id, igl } => {
                self.registry.set_igl(id, igl)?;
                self.updated(id)
            }
            MemberEvent::SetMaps { id, maps } => {
                let pool = self.maps.fetch()?;
                self.registry.set_maps(id, &maps, &pool)?;
                self.updated(id)
            }
            MemberEvent::LinkSteam { id, steam_id } => {
                self.registry.link_steam(id, &steam_id)?;
                self.updated(id)
            }
            MemberEvent::ResetSeason => {
                self.registry.reset_season()?;
                self.pending_counters = None;
                Ok(Outcome::SeasonReset)
            }
        }
    }

    fn apply_session(&mut self, event: SessionEvent, today: NaiveDate) -> Result<Outcome> {
        let pool = match event {
            SessionEvent::StartRegistration { .. } => self.maps.fetch()?,
            _ => self.session.active_pool().to_vec(),
        };
        let roster: Vec<Player> =
            if event.touches_players() { self.registry.players().cloned().collect() } else { Vec::new() };

        let ctx = SessionContext { roster: &roster, balancer: &mut self.balancer, pool: &pool, today };
        Ok(Outcome::Session(self.session.apply(event, ctx)?))
    }

    fn updated(&self, id: u64) -> Result<Outcome> {
        self.registry
            .get(id)
            .cloned()
            .map(Outcome::PlayerUpdated)
            .ok_or_else(|| CoreError::NotFound(format!("player {} is not registered", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maps::{default_active_duty, StaticMapPool};
    use crate::save::MemoryRepository;
    use crate::session::SessionStatus;
    use std::sync::Arc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    fn manager(repo: Arc<MemoryRepository>) -> MatchDayManager {
        let mut config = BotConfig::default();
        config.team_roll_limit = 10;
        let mut manager =
            MatchDayManager::from_config(&config, Box::new(repo), Box::new(StaticMapPool::default()), today())
                .unwrap();
        *manager.balancer_mut() = TeamBalancer::with_seed(5, 10, 42);
        manager
    }

    fn register(manager: &mut MatchDayManager, id: u64) {
        let event = MemberEvent::Register {
            id,
            name: format!("player{}", id),
            display_name: format!("Player {}", id),
        };
        manager.apply(Event::Member(event), today()).unwrap();
    }

    fn session(manager: &mut MatchDayManager, event: SessionEvent) -> Result<Outcome> {
        manager.apply(Event::Session(event), today())
    }

    #[test]
    fn test_member_events_write_through() {
        let repo = Arc::new(MemoryRepository::new());
        let mut manager = manager(repo.clone());

        register(&mut manager, 7);
        let outcome = manager
            .apply(Event::Member(MemberEvent::SetRank { id: 7, rank: 9500 }), today())
            .unwrap();
        match outcome {
            Outcome::PlayerUpdated(player) => assert_eq!(player.title, "Master Guardian I"),
            other => panic!("unexpected {:?}", other),
        }

        let stored = repo.load().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].rank, 9500);
    }

    #[test]
    fn test_set_maps_validates_against_pool() {
        let repo = Arc::new(MemoryRepository::new());
        let mut manager = manager(repo);
        register(&mut manager, 1);

        let mut maps = default_active_duty();
        maps.reverse();
        manager.apply(Event::Member(MemberEvent::SetMaps { id: 1, maps: maps.clone() }), today()).unwrap();
        assert_eq!(manager.registry().get(1).unwrap().maps.to_list(), maps);

        let bad = vec!["Mirage".to_string(), "Mirage".to_string()];
        let result = manager.apply(Event::Member(MemberEvent::SetMaps { id: 1, maps: bad }), today());
        assert!(matches!(result, Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn test_before_mutation_reloads_registry() {
        let repo = Arc::new(MemoryRepository::new());
        let mut manager = manager(repo.clone());
        register(&mut manager, 1);

        // another process wrote the repository meanwhile
        let pool = default_active_duty();
        repo.store(&[Player::new(1, "player1", "Player 1", &pool), Player::new(2, "b", "B", &pool)])
            .unwrap();

        manager.apply(Event::Member(MemberEvent::SetIgl { id: 2, igl: true }), today()).unwrap();
        assert_eq!(manager.registry().len(), 2);
        assert!(manager.registry().get(2).unwrap().igl);
    }

    #[test]
    fn test_repository_failure_surfaces() {
        let repo = Arc::new(MemoryRepository::new());
        let mut manager = manager(repo.clone());
        repo.set_failing(true);

        let result = manager.apply(Event::Member(MemberEvent::Unregister(1)), today());
        assert!(matches!(result, Err(CoreError::Persistence(_))));
    }

    #[test]
    fn test_match_day_flow_persists_counters() {
        let repo = Arc::new(MemoryRepository::new());
        let mut manager = manager(repo.clone());
        for id in 1..=6 {
            register(&mut manager, id);
        }

        session(&mut manager, SessionEvent::StartRegistration { matches: 2 }).unwrap();
        for id in 1..=6 {
            session(&mut manager, SessionEvent::Join(id)).unwrap();
        }
        session(&mut manager, SessionEvent::CloseRegistration).unwrap();
        assert_eq!(manager.session().status(), SessionStatus::Closed);

        // two slots of five
        let total: u32 = repo.load().unwrap().iter().map(|p| p.matches).sum();
        assert_eq!(total, 10);

        session(&mut manager, SessionEvent::Ban("Vertigo".into())).unwrap();
        session(&mut manager, SessionEvent::Pick("Mirage".into())).unwrap();
        let info = manager.banorder().unwrap();
        assert!(!info.shared_banorder.contains(&"Vertigo".to_string()));
        assert!(!info.shared_banorder.contains(&"Mirage".to_string()));
        assert_eq!(info.shared_banorder.len(), 5);
        assert!(manager.teamlist().unwrap().contains("Team 1:"));
    }

    #[test]
    fn test_session_conflicts_are_reported() {
        let repo = Arc::new(MemoryRepository::new());
        let mut manager = manager(repo);
        let result = session(&mut manager, SessionEvent::CloseRegistration);
        assert!(matches!(result, Err(CoreError::StateConflict(_))));
        assert!(matches!(manager.banorder(), Err(CoreError::StateConflict(_))));
    }

    fn open_with_five(manager: &mut MatchDayManager) {
        session(manager, SessionEvent::StartRegistration { matches: 1 }).unwrap();
        for id in 1..=5 {
            session(manager, SessionEvent::Join(id)).unwrap();
        }
    }

    fn stored_matches(repo: &MemoryRepository) -> Vec<u32> {
        repo.load().unwrap().iter().map(|p| p.matches).collect()
    }

    #[test]
    fn test_unstored_counters_survive_until_write_succeeds() {
        let repo = Arc::new(MemoryRepository::new());
        let mut manager = manager(repo.clone());
        for id in 1..=5 {
            register(&mut manager, id);
        }
        open_with_five(&mut manager);

        repo.set_read_only(true);
        let outcome = session(&mut manager, SessionEvent::CloseRegistration).unwrap();
        assert!(matches!(outcome, Outcome::Session(SessionOutcome::TeamsRolled { .. })));
        assert_eq!(manager.session().status(), SessionStatus::Closed);
        assert!(manager.has_pending_counters());
        assert_eq!(stored_matches(&repo), vec![0; 5]);
        assert!(manager.registry().players().all(|p| p.matches == 1));

        // a member event reloads the stale copy and still fails to write
        let result = manager.apply(Event::Member(MemberEvent::SetIgl { id: 1, igl: true }), today());
        assert!(matches!(result, Err(CoreError::Persistence(_))));
        assert!(manager.registry().players().all(|p| p.matches == 1));

        session(&mut manager, SessionEvent::Ban("Nuke".into())).unwrap();
        assert!(manager.has_pending_counters());

        repo.set_read_only(false);
        session(&mut manager, SessionEvent::Pick("Mirage".into())).unwrap();
        assert!(!manager.has_pending_counters());
        assert_eq!(stored_matches(&repo), vec![1; 5]);
    }

    #[test]
    fn test_veto_continues_with_repository_offline() {
        let repo = Arc::new(MemoryRepository::new());
        let mut manager = manager(repo.clone());
        for id in 1..=5 {
            register(&mut manager, id);
        }
        open_with_five(&mut manager);
        session(&mut manager, SessionEvent::CloseRegistration).unwrap();

        repo.set_failing(true);
        session(&mut manager, SessionEvent::Ban("Nuke".into())).unwrap();
        session(&mut manager, SessionEvent::Pick("Mirage".into())).unwrap();
        session(&mut manager, SessionEvent::Unban("Nuke".into())).unwrap();
        assert_eq!(manager.session().picked_maps(), &["Mirage".to_string()]);
        assert!(manager.banorder().is_ok());

        // reading members still needs the repository
        let result = manager.apply(Event::Member(MemberEvent::Unregister(1)), today());
        assert!(matches!(result, Err(CoreError::Persistence(_))));
    }

    #[test]
    fn test_sign_up_gated_on_season() {
        let repo = Arc::new(MemoryRepository::new());
        let mut manager = manager(repo.clone());
        register(&mut manager, 99);

        let sign_up = |id: u64| {
            Event::Member(MemberEvent::SignUp { id, name: format!("p{}", id), display_name: format!("P{}", id) })
        };
        assert!(matches!(manager.apply(sign_up(1), today()), Err(CoreError::StateConflict(_))));

        assert_eq!(manager.apply(Event::Member(MemberEvent::StartSeason), today()).unwrap(), Outcome::SeasonOpened);
        assert!(repo.load().unwrap().is_empty());
        manager.apply(sign_up(1), today()).unwrap();
        manager.apply(sign_up(2), today()).unwrap();
        manager.apply(Event::Member(MemberEvent::Withdraw(2)), today()).unwrap();

        assert_eq!(
            manager.apply(Event::Member(MemberEvent::EndSeason), today()).unwrap(),
            Outcome::SeasonClosed { players: 1 }
        );
        assert!(matches!(manager.apply(sign_up(3), today()), Err(CoreError::StateConflict(_))));

        // admin add still works after the sign-up closed
        register(&mut manager, 3);
        assert_eq!(manager.registry().len(), 2);
    }

    #[test]
    fn test_cancel_season() {
        let repo = Arc::new(MemoryRepository::new());
        let mut manager = manager(repo.clone());
        let cancel = Event::Member(MemberEvent::CancelSeason);
        assert!(matches!(manager.apply(cancel.clone(), today()), Err(CoreError::StateConflict(_))));

        manager.apply(Event::Member(MemberEvent::StartSeason), today()).unwrap();
        let sign_up = MemberEvent::SignUp { id: 1, name: "a".into(), display_name: "A".into() };
        manager.apply(Event::Member(sign_up), today()).unwrap();
        assert_eq!(manager.apply(cancel, today()).unwrap(), Outcome::SeasonCancelled);
        assert!(manager.registry().is_empty());
        assert!(repo.load().unwrap().is_empty());
    }
}
