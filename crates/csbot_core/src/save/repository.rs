use super::error::SaveError;
use super::format::{decompress_and_deserialize, serialize_and_compress, RosterSave};
use super::migration::migrate_save;
use crate::player::Player;

use std::fs::{rename, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Load/store of the full player registry.
///
/// `load` on a repository that was never written returns an empty roster.
pub trait PlayerRepository: Send {
    fn load(&self) -> Result<Vec<Player>, SaveError>;
    fn store(&self, players: &[Player]) -> Result<(), SaveError>;
}

/// Registry stored in a single checksummed file.
#[derive(Debug, Clone)]
pub struct FileRepository {
    path: PathBuf,
}

impl FileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save_to_path(path: &Path, save: &RosterSave) -> Result<(), SaveError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let data = serialize_and_compress(save)?;

        // Atomic save: write to temp file, then rename
        let temp_path = path.with_extension("tmp");

        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&data)?;
            file.flush()?;
            file.sync_all()?;
        }

        rename(&temp_path, path)?;

        log::debug!("Saved {} bytes to {:?}", data.len(), path);
        Ok(())
    }

    fn load_from_path(path: &Path) -> Result<Option<RosterSave>, SaveError> {
        if !path.exists() {
            return Ok(None);
        }

        let mut file = File::open(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        let save = migrate_save(decompress_and_deserialize(&data)?)?;

        log::debug!("Loaded {} bytes from {:?}", data.len(), path);
        Ok(Some(save))
    }
}

impl PlayerRepository for FileRepository {
    fn load(&self) -> Result<Vec<Player>, SaveError> {
        match Self::load_from_path(&self.path)? {
            Some(save) => Ok(save.players),
            None => {
                log::info!("No registry at {:?}, starting empty", self.path);
                Ok(Vec::new())
            }
        }
    }

    fn store(&self, players: &[Player]) -> Result<(), SaveError> {
        Self::save_to_path(&self.path, &RosterSave::new(players.to_vec()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Availability {
    #[default]
    Online,
    /// Loads succeed, stores fail
    ReadOnly,
    Offline,
}

/// In-process registry for tests and simulations.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    players: Mutex<Vec<Player>>,
    availability: Mutex<Availability>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_players(players: Vec<Player>) -> Self {
        Self { players: Mutex::new(players), availability: Mutex::new(Availability::Online) }
    }

    /// While set, every load and store fails with `SaveError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.set_availability(if failing { Availability::Offline } else { Availability::Online });
    }

    /// While set, loads succeed and every store fails with `SaveError::Unavailable`.
    pub fn set_read_only(&self, read_only: bool) {
        self.set_availability(if read_only { Availability::ReadOnly } else { Availability::Online });
    }

    fn set_availability(&self, availability: Availability) {
        if let Ok(mut current) = self.availability.lock() {
            *current = availability;
        }
    }

    fn availability(&self) -> Result<Availability, SaveError> {
        self.availability
            .lock()
            .map(|a| *a)
            .map_err(|_| SaveError::Unavailable("lock poisoned".to_string()))
    }
}

impl PlayerRepository for MemoryRepository {
    fn load(&self) -> Result<Vec<Player>, SaveError> {
        if self.availability()? == Availability::Offline {
            return Err(SaveError::Unavailable("memory repository offline".to_string()));
        }
        let players =
            self.players.lock().map_err(|_| SaveError::Unavailable("lock poisoned".to_string()))?;
        Ok(players.clone())
    }

    fn store(&self, players: &[Player]) -> Result<(), SaveError> {
        match self.availability()? {
            Availability::Online => {}
            Availability::ReadOnly => {
                return Err(SaveError::Unavailable("memory repository is read-only".to_string()))
            }
            Availability::Offline => {
                return Err(SaveError::Unavailable("memory repository offline".to_string()))
            }
        }
        RosterSave::new(players.to_vec()).validate()?;
        let mut stored =
            self.players.lock().map_err(|_| SaveError::Unavailable("lock poisoned".to_string()))?;
        *stored = players.to_vec();
        Ok(())
    }
}

impl<R: PlayerRepository + Sync> PlayerRepository for std::sync::Arc<R> {
    fn load(&self) -> Result<Vec<Player>, SaveError> {
        (**self).load()
    }

    fn store(&self, players: &[Player]) -> Result<(), SaveError> {
        (**self).store(players)
    }
}
