pub mod pool;
pub mod preference;

pub use pool::{default_active_duty, CachedMapPool, MapPoolSource, StaticMapPool, DEFAULT_ACTIVE_DUTY};
pub use preference::MapPreference;
