//! Discrete inputs to the match-day state machine.
//!
//! The chat layer turns reactions and slash commands into these values; the
//! session never sees the delivery mechanism.

use chrono::{NaiveDate, NaiveDateTime, Weekday};

use crate::player::Player;
use crate::team::TeamBalancer;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StartRegistration { matches: usize },
    Join(u64),
    Leave(u64),
    CloseRegistration,
    CancelRegistration,
    Pick(String),
    Unpick(String),
    Ban(String),
    Unban(String),
    FinishVeto,
    Reset,
    SetPlayday(Weekday),
    SetPlaytime { hour: u32, minute: u32 },
}

impl SessionEvent {
    /// Whether handling this event can change player records.
    pub fn touches_players(&self) -> bool {
        matches!(self, SessionEvent::CloseRegistration)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    RegistrationOpened { date: NaiveDateTime, roll_at: NaiveDateTime },
    ParticipantsChanged { count: usize },
    /// Rolled pool with updated `matches` counters
    TeamsRolled { rolled: Vec<Player> },
    RegistrationCancelled,
    VetoUpdated,
    VetoFinished,
    ScheduleChanged { date: NaiveDateTime },
    Reset,
}

/// Collaborators an event may need.
pub struct SessionContext<'a> {
    /// Every registered player; the session picks its participants from it
    pub roster: &'a [Player],
    pub balancer: &'a mut TeamBalancer,
    pub pool: &'a [String],
    pub today: NaiveDate,
}
