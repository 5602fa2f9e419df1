//! # csbot_core - Match day engine for a Counter-Strike community bot
//!
//! Turns a weekly sign-up into balanced teams and runs the map veto.
//!
//! ## Features
//! - Randomized team balancing on rank and map-preference compatibility,
//!   with fairness rotation across match days
//! - Private and shared banorders with live ban/pick tracking
//! - Registration / veto state machine driven by discrete events
//! - Versioned, checksummed player registry persistence

pub mod config;
pub mod error;
pub mod manager;
pub mod maps;
pub mod player;
pub mod save;
pub mod session;
pub mod team;
pub mod veto;

pub use config::BotConfig;
pub use error::{CoreError, Result};
pub use manager::{Event, MatchDayManager, MemberEvent, Outcome};
pub use maps::{CachedMapPool, MapPoolSource, MapPreference, StaticMapPool};
pub use player::{Player, PlayerRegistry, SeasonStatus};
pub use save::{FileRepository, MemoryRepository, PlayerRepository, SaveError};
pub use session::{MatchSession, SessionEvent, SessionOutcome, SessionStatus, VetoStatus};
pub use team::{Team, TeamBalancer};
pub use veto::BanorderInfo;
