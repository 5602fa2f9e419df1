use super::error::SaveError;
use super::SAVE_VERSION;
use crate::player::Player;
use serde::{Deserialize, Serialize};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use sha2::{Digest, Sha256};

/// Maximum registry size accepted on save or load
const MAX_PLAYERS: usize = 10_000;

/// Persistent member registry
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RosterSave {
    /// Save format version for migration
    pub version: u32,

    /// Save timestamp (unix milliseconds)
    pub timestamp: i64,

    /// Every registered player, keyed by `Player::id`
    pub players: Vec<Player>,
}

impl Default for RosterSave {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl RosterSave {
    pub fn new(players: Vec<Player>) -> Self {
        Self { version: SAVE_VERSION, timestamp: current_timestamp(), players }
    }

    pub fn update_timestamp(&mut self) {
        self.timestamp = current_timestamp();
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        if self.players.len() > MAX_PLAYERS {
            return Err(SaveError::Corrupted);
        }

        let mut player_ids = std::collections::HashSet::new();
        for player in &self.players {
            if !player_ids.insert(player.id) {
                return Err(SaveError::DuplicatePlayer { id: player.id });
            }
        }

        Ok(())
    }
}

/// Serialize and compress the roster
pub fn serialize_and_compress(save: &RosterSave) -> Result<Vec<u8>, SaveError> {
    save.validate()?;

    // 1. MessagePack with field names
    let msgpack = to_vec_named(save)?;

    // 2. LZ4 (size prepended for easy decompression)
    let compressed = compress_prepend_size(&msgpack);

    // 3. SHA256 trailer
    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut result = compressed;
    result.extend_from_slice(&checksum);

    Ok(result)
}

/// Verify, decompress and deserialize a roster
pub fn decompress_and_deserialize(bytes: &[u8]) -> Result<RosterSave, SaveError> {
    // header + checksum
    if bytes.len() < 4 + 32 {
        return Err(SaveError::Corrupted);
    }

    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - 32);

    let mut hasher = Sha256::new();
    hasher.update(payload);
    let calculated_checksum = hasher.finalize();

    if &calculated_checksum[..] != checksum_bytes {
        return Err(SaveError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| SaveError::Decompression)?;

    let save: RosterSave = from_slice(&msgpack)?;

    if save.version > SAVE_VERSION {
        return Err(SaveError::VersionMismatch { found: save.version, expected: SAVE_VERSION });
    }

    save.validate()?;
    Ok(save)
}

pub fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maps::default_active_duty;

    fn roster(n: u64) -> RosterSave {
        let pool = default_active_duty();
        RosterSave::new((0..n).map(|i| Player::new(i, &format!("p{}", i), "P", &pool)).collect())
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let mut save = roster(10);
        save.players[3].set_rank(9400);
        save.players[3].matches = 4;

        let serialized = serialize_and_compress(&save).unwrap();
        let deserialized = decompress_and_deserialize(&serialized).unwrap();

        assert_eq!(save.version, deserialized.version);
        assert_eq!(save.players, deserialized.players);
    }

    #[test]
    fn test_checksum_validation() {
        let mut serialized = serialize_and_compress(&roster(2)).unwrap();

        if let Some(last) = serialized.last_mut() {
            *last = last.wrapping_add(1);
        }

        let result = decompress_and_deserialize(&serialized);
        assert!(matches!(result, Err(SaveError::ChecksumMismatch)));
    }

    #[test]
    fn test_truncated_input() {
        assert!(matches!(decompress_and_deserialize(&[0u8; 10]), Err(SaveError::Corrupted)));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut save = roster(2);
        save.players[1].id = 0;
        assert!(matches!(serialize_and_compress(&save), Err(SaveError::DuplicatePlayer { id: 0 })));
    }

    #[test]
    fn test_future_version_rejected() {
        let mut save = roster(1);
        save.version = SAVE_VERSION + 1;
        let bytes = serialize_and_compress(&save).unwrap();
        assert!(matches!(
            decompress_and_deserialize(&bytes),
            Err(SaveError::VersionMismatch { .. })
        ));
    }
}
