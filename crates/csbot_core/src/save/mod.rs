// Player registry persistence
// MessagePack + LZ4 compression with versioning and integrity checks

pub mod error;
pub mod format;
pub mod migration;
pub mod repository;

pub use error::SaveError;
pub use format::{decompress_and_deserialize, serialize_and_compress, RosterSave};
pub use migration::migrate_save;
pub use repository::{FileRepository, MemoryRepository, PlayerRepository};

pub const SAVE_VERSION: u32 = 2;
