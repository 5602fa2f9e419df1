//! Match day session: registration, team roll and veto.

pub mod events;
pub mod match_session;
pub mod schedule;
pub mod state;

pub use events::{SessionContext, SessionEvent, SessionOutcome};
pub use match_session::MatchSession;
pub use schedule::{next_playdate, next_playtime, roll_time, ROLL_LEAD_MINUTES};
pub use state::{Match, MatchStatus, SessionStatus, VetoStatus};
