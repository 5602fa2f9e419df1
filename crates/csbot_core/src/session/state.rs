use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionStatus {
    /// No registration open
    #[default]
    Ready,
    /// Accepting participants
    Open,
    /// Teams rolled, veto running or done
    Closed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionStatus::Ready => write!(f, "ready"),
            SessionStatus::Open => write!(f, "open"),
            SessionStatus::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VetoStatus {
    #[default]
    Inactive,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Active,
    Inactive,
}

/// One scheduled match for a rolled team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub date: NaiveDateTime,
    pub team_id: usize,
    pub status: MatchStatus,
}

impl Match {
    pub fn new(date: NaiveDateTime, team_id: usize) -> Self {
        Self { date, team_id, status: MatchStatus::Active }
    }

    pub fn set_active(&mut self) {
        self.status = MatchStatus::Active;
    }

    pub fn set_passive(&mut self) {
        self.status = MatchStatus::Inactive;
    }
}
