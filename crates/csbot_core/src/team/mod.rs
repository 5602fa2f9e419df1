pub mod balancer;
pub mod types;

pub use balancer::{TeamBalancer, DEFAULT_ROLL_LIMIT, DEFAULT_TEAM_SIZE};
pub use types::Team;
