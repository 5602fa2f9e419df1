//! Match day state machine: registration, team roll and live veto.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use std::collections::BTreeMap;

use super::events::{SessionContext, SessionEvent, SessionOutcome};
use super::schedule::{next_playtime, roll_time};
use super::state::{Match, SessionStatus, VetoStatus};
use crate::config::BotConfig;
use crate::error::{CoreError, Result};
use crate::player::Player;
use crate::team::{Team, TeamBalancer};
use crate::veto::BanorderInfo;

#[derive(Debug, Clone)]
pub struct MatchSession {
    playday: Weekday,
    play_time: NaiveTime,
    date: NaiveDateTime,
    number_of_matches: usize,
    status: SessionStatus,
    veto: VetoStatus,
    /// Join order, no duplicates
    participants: Vec<u64>,
    teams: Option<BTreeMap<usize, Team>>,
    matches: Vec<Match>,
    active_pool: Vec<String>,
    banned_maps: Vec<String>,
    picked_maps: Vec<String>,
    available_maps: Vec<String>,
}

impl MatchSession {
    pub fn new(playday: Weekday, play_time: NaiveTime, today: NaiveDate) -> Self {
        Self {
            playday,
            play_time,
            date: next_playtime(today, playday, play_time),
            number_of_matches: 0,
            status: SessionStatus::Ready,
            veto: VetoStatus::Inactive,
            participants: Vec::new(),
            teams: None,
            matches: Vec::new(),
            active_pool: Vec::new(),
            banned_maps: Vec::new(),
            picked_maps: Vec::new(),
            available_maps: Vec::new(),
        }
    }

    pub fn from_config(config: &BotConfig, today: NaiveDate) -> Result<Self> {
        Ok(Self::new(config.weekday()?, config.play_time()?, today))
    }

    // ========== Accessors ==========

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn veto(&self) -> VetoStatus {
        self.veto
    }

    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    pub fn playday(&self) -> Weekday {
        self.playday
    }

    pub fn play_time(&self) -> NaiveTime {
        self.play_time
    }

    pub fn roll_time(&self) -> NaiveDateTime {
        roll_time(self.date)
    }

    pub fn number_of_matches(&self) -> usize {
        self.number_of_matches
    }

    pub fn participants(&self) -> &[u64] {
        &self.participants
    }

    pub fn teams(&self) -> Option<&BTreeMap<usize, Team>> {
        self.teams.as_ref()
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn active_pool(&self) -> &[String] {
        &self.active_pool
    }

    pub fn banned_maps(&self) -> &[String] {
        &self.banned_maps
    }

    pub fn picked_maps(&self) -> &[String] {
        &self.picked_maps
    }

    pub fn available_maps(&self) -> &[String] {
        &self.available_maps
    }

    // ========== Schedule ==========

    pub fn set_playday(&mut self, playday: Weekday, today: NaiveDate) -> NaiveDateTime {
        self.playday = playday;
        self.date = next_playtime(today, self.playday, self.play_time);
        log::info!("Playday set to {}, next match day {}", playday, self.date);
        self.date
    }

    pub fn set_playtime(&mut self, hour: u32, minute: u32, today: NaiveDate) -> Result<NaiveDateTime> {
        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| CoreError::InvalidInput(format!("invalid playtime {}:{}", hour, minute)))?;
        self.play_time = time;
        self.date = next_playtime(today, self.playday, self.play_time);
        log::info!("Playtime set to {}, next match day {}", time, self.date);
        Ok(self.date)
    }

    // ========== Registration ==========

    /// Open registration for the next match day. Restarts a running one.
    pub fn start_registration(&mut self, num_matches: usize, pool: &[String], today: NaiveDate) -> Result<()> {
        if num_matches == 0 {
            return Err(CoreError::InvalidInput("number of matches must be at least 1".to_string()));
        }
        if pool.is_empty() {
            return Err(CoreError::InvalidInput("active map pool is empty".to_string()));
        }
        if self.status == SessionStatus::Open {
            log::warn!("Registration restarted, dropping {} participants", self.participants.len());
        }

        self.clear();
        self.number_of_matches = num_matches;
        self.active_pool = pool.to_vec();
        self.available_maps = pool.to_vec();
        self.date = next_playtime(today, self.playday, self.play_time);
        self.status = SessionStatus::Open;

        log::info!("Registration open for {} matches on {}", num_matches, self.date);
        Ok(())
    }

    pub fn add_participant(&mut self, id: u64) -> Result<()> {
        self.require_open()?;
        if !self.participants.contains(&id) {
            self.participants.push(id);
            log::debug!("Player {} joined ({} total)", id, self.participants.len());
        }
        Ok(())
    }

    pub fn remove_participant(&mut self, id: u64) -> Result<()> {
        self.require_open()?;
        if let Some(index) = self.participants.iter().position(|&p| p == id) {
            self.participants.remove(index);
            log::debug!("Player {} left ({} total)", id, self.participants.len());
        }
        Ok(())
    }

    /// Close registration and roll teams from the participants found in
    /// `roster`. Returns the rolled players with their bumped `matches`
    /// counters so the caller can write them back.
    pub fn close_registration(&mut self, roster: &[Player], balancer: &mut TeamBalancer) -> Result<Vec<Player>> {
        if self.status != SessionStatus::Open {
            return Err(CoreError::StateConflict("no open registration".to_string()));
        }

        let mut pool: Vec<Player> = Vec::with_capacity(self.participants.len());
        for id in &self.participants {
            match roster.iter().find(|p| p.id == *id) {
                Some(player) => pool.push(player.clone()),
                None => log::warn!("Participant {} is no longer registered, skipping", id),
            }
        }
        if pool.is_empty() {
            return Err(CoreError::InvalidInput("no registered participants".to_string()));
        }

        let teams = balancer.roll_teams(&mut pool, self.number_of_matches, &self.active_pool)?;

        self.matches = teams.keys().map(|&team_id| Match::new(self.date, team_id)).collect();
        self.teams = Some(teams);
        self.status = SessionStatus::Closed;
        self.veto = VetoStatus::Active;

        log::info!("Registration closed with {} participants, veto open", pool.len());
        Ok(pool)
    }

    /// Discard an open registration. Does nothing in any other state.
    pub fn cancel_registration(&mut self) -> bool {
        if self.status != SessionStatus::Open {
            log::debug!("Cancel ignored, session is {}", self.status);
            return false;
        }
        self.clear();
        log::info!("Registration cancelled");
        true
    }

    // ========== Veto ==========

    pub fn ban(&mut self, map: &str) -> Result<()> {
        self.require_veto()?;
        move_map(&mut self.available_maps, &mut self.banned_maps, map)?;
        log::info!("Banned {}", map);
        Ok(())
    }

    pub fn unban(&mut self, map: &str) -> Result<()> {
        self.require_veto()?;
        move_map(&mut self.banned_maps, &mut self.available_maps, map)?;
        log::info!("Unbanned {}", map);
        Ok(())
    }

    pub fn pick(&mut self, map: &str) -> Result<()> {
        self.require_veto()?;
        move_map(&mut self.available_maps, &mut self.picked_maps, map)?;
        log::info!("Picked {}", map);
        Ok(())
    }

    pub fn unpick(&mut self, map: &str) -> Result<()> {
        self.require_veto()?;
        move_map(&mut self.picked_maps, &mut self.available_maps, map)?;
        log::info!("Unpicked {}", map);
        Ok(())
    }

    /// Current private and shared banorders plus the team-to-map fit.
    pub fn banorder(&self) -> Result<BanorderInfo> {
        let teams = match (self.status, &self.teams) {
            (SessionStatus::Closed, Some(teams)) => teams,
            (SessionStatus::Closed, None) => {
                return Err(CoreError::StateConflict("teams have not been rolled".to_string()))
            }
            (status, _) => {
                return Err(CoreError::StateConflict(format!("no teams while session is {}", status)))
            }
        };

        Ok(BanorderInfo::build(
            teams,
            &self.active_pool,
            &self.banned_maps,
            &self.picked_maps,
            &self.available_maps,
        ))
    }

    pub fn finish_veto(&mut self) -> Result<()> {
        self.require_veto()?;
        self.veto = VetoStatus::Inactive;
        for m in &mut self.matches {
            m.set_passive();
        }
        log::info!("Veto finished, picked {:?}", self.picked_maps);
        Ok(())
    }

    /// Back to Ready, dropping teams and veto state.
    pub fn reset(&mut self) {
        self.clear();
        log::info!("Session reset");
    }

    pub fn get_teamlist(&self) -> Result<String> {
        let teams = self
            .teams
            .as_ref()
            .ok_or_else(|| CoreError::StateConflict("teams have not been rolled".to_string()))?;
        Ok(teams.values().map(Team::get_info).collect())
    }

    // ========== Events ==========

    pub fn apply(&mut self, event: SessionEvent, ctx: SessionContext<'_>) -> Result<SessionOutcome> {
        log::debug!("Session event {:?} while {}", event, self.status);
        match event {
            SessionEvent::StartRegistration { matches } => {
                self.start_registration(matches, ctx.pool, ctx.today)?;
                Ok(SessionOutcome::RegistrationOpened { date: self.date, roll_at: self.roll_time() })
            }
            SessionEvent::Join(id) => {
                self.add_participant(id)?;
                Ok(SessionOutcome::ParticipantsChanged { count: self.participants.len() })
            }
            SessionEvent::Leave(id) => {
                self.remove_participant(id)?;
                Ok(SessionOutcome::ParticipantsChanged { count: self.participants.len() })
            }
            SessionEvent::CloseRegistration => {
                let rolled = self.close_registration(ctx.roster, ctx.balancer)?;
                Ok(SessionOutcome::TeamsRolled { rolled })
            }
            SessionEvent::CancelRegistration => {
                self.cancel_registration();
                Ok(SessionOutcome::RegistrationCancelled)
            }
            SessionEvent::Pick(map) => self.pick(&map).map(|_| SessionOutcome::VetoUpdated),
            SessionEvent::Unpick(map) => self.unpick(&map).map(|_| SessionOutcome::VetoUpdated),
            SessionEvent::Ban(map) => self.ban(&map).map(|_| SessionOutcome::VetoUpdated),
            SessionEvent::Unban(map) => self.unban(&map).map(|_| SessionOutcome::VetoUpdated),
            SessionEvent::FinishVeto => self.finish_veto().map(|_| SessionOutcome::VetoFinished),
            SessionEvent::Reset => {
                self.reset();
                Ok(SessionOutcome::Reset)
            }
            SessionEvent::SetPlayday(day) => {
                let date = self.set_playday(day, ctx.today);
                Ok(SessionOutcome::ScheduleChanged { date })
            }
            SessionEvent::SetPlaytime { hour, minute } => {
                let date = self.set_playtime(hour, minute, ctx.today)?;
                Ok(SessionOutcome::ScheduleChanged { date })
            }
        }
    }

    // ========== Internals ==========

    fn require_open(&self) -> Result<()> {
        if self.status != SessionStatus::Open {
            return Err(CoreError::StateConflict(format!("registration is not open (session is {})", self.status)));
        }
        Ok(())
    }

    fn require_veto(&self) -> Result<()> {
        if self.status != SessionStatus::Closed || self.veto != VetoStatus::Active {
            return Err(CoreError::StateConflict("no active veto".to_string()));
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.status = SessionStatus::Ready;
        self.veto = VetoStatus::Inactive;
        self.number_of_matches = 0;
        self.participants.clear();
        self.teams = None;
        self.matches.clear();
        self.active_pool.clear();
        self.banned_maps.clear();
        self.picked_maps.clear();
        self.available_maps.clear();
    }
}

fn move_map(from: &mut Vec<String>, to: &mut Vec<String>, map: &str) -> Result<()> {
    let index = from
        .iter()
        .position(|m| m == map)
        .ok_or_else(|| CoreError::NotFound(format!("map {} is not in the list", map)))?;
    to.push(from.remove(index));
    Ok(())
}
