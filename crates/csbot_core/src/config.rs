//! Bot configuration.
//!
//! JSON file, optionally located through `CSBOT_CONFIG_PATH`. Every field has a
//! default so a partial file is enough.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::error::{CoreError, Result};
use crate::maps::default_active_duty;
use crate::team::{DEFAULT_ROLL_LIMIT, DEFAULT_TEAM_SIZE};

pub const CONFIG_PATH_ENV: &str = "CSBOT_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Players per team
    pub team_size: usize,
    /// Random lineups tried per match slot
    pub team_roll_limit: usize,
    /// Matches per match day when the caller does not say
    pub default_matches: usize,
    /// Weekday name, e.g. "Wednesday"
    pub playday: String,
    pub play_hour: u32,
    pub play_minute: u32,
    /// Active duty pool used when no external source is wired in
    pub map_pool: Vec<String>,
    pub map_pool_ttl_hours: i64,
    /// Player registry file
    pub state_path: PathBuf,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            team_size: DEFAULT_TEAM_SIZE,
            team_roll_limit: DEFAULT_ROLL_LIMIT,
            default_matches: 2,
            playday: "Wednesday".to_string(),
            play_hour: 20,
            play_minute: 0,
            map_pool: default_active_duty(),
            map_pool_ttl_hours: 24,
            state_path: PathBuf::from(".csbot/state"),
        }
    }
}

impl BotConfig {
    pub fn from_json(content: &str) -> Result<Self> {
        let config: BotConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Config from the file named by `CSBOT_CONFIG_PATH`, defaults when unset.
    pub fn from_env() -> Result<Self> {
        let Ok(path) = env::var(CONFIG_PATH_ENV) else {
            return Ok(Self::default());
        };

        let path = path.trim();
        if path.is_empty() {
            return Ok(Self::default());
        }

        log::debug!("Loading config from {}='{}'", CONFIG_PATH_ENV, path);
        Self::load(Path::new(path))
    }

    pub fn validate(&self) -> Result<()> {
        if self.team_size == 0 {
            return Err(CoreError::Config("team_size must be at least 1".to_string()));
        }
        if self.team_roll_limit == 0 {
            return Err(CoreError::Config("team_roll_limit must be at least 1".to_string()));
        }
        if self.default_matches == 0 {
            return Err(CoreError::Config("default_matches must be at least 1".to_string()));
        }
        self.weekday()?;
        self.play_time()?;
        if self.map_pool.is_empty() {
            return Err(CoreError::Config("map_pool is empty".to_string()));
        }
        let unique: HashSet<&String> = self.map_pool.iter().collect();
        if unique.len() != self.map_pool.len() {
            return Err(CoreError::Config("map_pool contains duplicates".to_string()));
        }
        if self.map_pool_ttl_hours <= 0 {
            return Err(CoreError::Config("map_pool_ttl_hours must be positive".to_string()));
        }
        Ok(())
    }

    pub fn weekday(&self) -> Result<Weekday> {
        self.playday
            .parse::<Weekday>()
            .map_err(|_| CoreError::Config(format!("unknown playday '{}'", self.playday)))
    }

    pub fn play_time(&self) -> Result<NaiveTime> {
        NaiveTime::from_hms_opt(self.play_hour, self.play_minute, 0).ok_or_else(|| {
            CoreError::Config(format!("invalid playtime {}:{}", self.play_hour, self.play_minute))
        })
    }
}
