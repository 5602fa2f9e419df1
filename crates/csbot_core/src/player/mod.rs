//! Registered members: identity, rank tier, IGL flag, rotation counter and
//! map ranking, plus the repository-backed season registry.

pub mod rank;
pub mod registry;
pub mod types;

pub use rank::{title_for_rank, RANK_TIERS};
pub use registry::{PlayerRegistry, SeasonStatus};
pub use types::Player;
