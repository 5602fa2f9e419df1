//! csbot operator CLI
//!
//! Member registry maintenance against the state file, and an offline match
//! day simulation (roll, bans, picks, banorder report).

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use csbot_core::{
    BotConfig, CachedMapPool, Event, FileRepository, MatchDayManager, MemberEvent, MemoryRepository,
    Outcome, PlayerRepository, SessionEvent, StaticMapPool, TeamBalancer,
};

#[derive(Parser, Debug)]
#[command(name = "csbot")]
#[command(about = "Member registry and match day tools for the csbot core", long_about = None)]
pub struct Cli {
    /// JSON config file, `CSBOT_CONFIG_PATH` when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Registry state file (overrides the config)
    #[arg(long, env = "CSBOT_STATE_PATH")]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a member for the season
    Register {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        name: String,
        /// Defaults to the name
        #[arg(long)]
        display_name: Option<String>,
    },

    /// Remove a member
    Unregister {
        #[arg(long)]
        id: u64,
    },

    /// Set a member's rank (premier rating)
    SetRank {
        #[arg(long)]
        id: u64,
        #[arg(long, allow_hyphen_values = true)]
        rank: i64,
    },

    /// Mark a member as in-game leader
    SetIgl {
        #[arg(long)]
        id: u64,
        /// Clear the flag instead
        #[arg(long)]
        off: bool,
    },

    /// Replace a member's map ranking, least wanted first
    SetMaps {
        #[arg(long)]
        id: u64,
        #[arg(required = true)]
        maps: Vec<String>,
    },

    /// Link a Steam account
    LinkSteam {
        #[arg(long)]
        id: u64,
        #[arg(long)]
        steam_id: String,
    },

    /// List registered members
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Drop every member for a new season
    ResetSeason,

    /// Roll teams and run a veto for a match day
    Simulate {
        /// Participant ids, defaults to every registered member
        #[arg(long, value_delimiter = ',')]
        players: Vec<u64>,
        /// Number of matches, defaults to the config
        #[arg(long)]
        matches: Option<usize>,
        /// Seed for a reproducible roll
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_delimiter = ',')]
        ban: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        pick: Vec<String>,
        /// Write the match counters back to the state file
        #[arg(long)]
        persist: bool,
    },
}

impl Cli {
    pub fn load_config(&self) -> Result<BotConfig> {
        let mut config = match &self.config {
            Some(path) => BotConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => BotConfig::from_env().context("Failed to load config from CSBOT_CONFIG_PATH")?,
        };
        if let Some(state) = &self.state {
            config.state_path = state.clone();
        }
        Ok(config)
    }
}

pub fn run(cli: Cli, today: NaiveDate, out: &mut impl Write) -> Result<()> {
    let config = cli.load_config()?;
    log::debug!("Using state file {}", config.state_path.display());
    let file_repository = FileRepository::new(config.state_path.clone());

    match cli.command {
        Commands::Simulate { players, matches, seed, ban, pick, persist } => {
            let repository: Box<dyn PlayerRepository> = if persist {
                Box::new(file_repository)
            } else {
                let loaded = file_repository.load().context("Failed to read registry")?;
                Box::new(MemoryRepository::with_players(loaded))
            };
            let mut manager = open_manager(&config, repository, today)?;
            if let Some(seed) = seed {
                *manager.balancer_mut() = TeamBalancer::with_seed(config.team_size, config.team_roll_limit, seed);
            }
            simulate(&mut manager, players, matches.unwrap_or(config.default_matches), &ban, &pick, today, out)
        }
        Commands::List { json } => {
            let manager = open_manager(&config, Box::new(file_repository), today)?;
            let players: Vec<_> = manager.registry().players().collect();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&players)?)?;
            } else {
                writeln!(out, "{} registered players", players.len())?;
                for player in players {
                    writeln!(out, "[{}] {} ({}) igl={}", player.id, player.get_info(), player.title, player.igl)?;
                }
            }
            Ok(())
        }
        command => {
            let mut manager = open_manager(&config, Box::new(file_repository), today)?;
            let event = member_event(command).context("not a registry command")?;
            let outcome = manager.apply(Event::Member(event), today)?;
            report_member(&outcome, out)
        }
    }
}

fn open_manager(config: &BotConfig, repository: Box<dyn PlayerRepository>, today: NaiveDate) -> Result<MatchDayManager> {
    let maps = CachedMapPool::new(
        StaticMapPool::new(config.map_pool.clone()),
        chrono::Duration::hours(config.map_pool_ttl_hours),
    );
    MatchDayManager::from_config(config, repository, Box::new(maps), today).context("Failed to open registry")
}

fn member_event(command: Commands) -> Option<MemberEvent> {
    let event = match command {
        Commands::Register { id, name, display_name } => {
            let display_name = display_name.unwrap_or_else(|| name.clone());
            MemberEvent::Register { id, name, display_name }
        }
        Commands::Unregister { id } => MemberEvent::Unregister(id),
        Commands::SetRank { id, rank } => MemberEvent::SetRank { id, rank },
        Commands::SetIgl { id, off } => MemberEvent::SetIgl { id, igl: !off },
        Commands::SetMaps { id, maps } => MemberEvent::SetMaps { id, maps },
        Commands::LinkSteam { id, steam_id } => MemberEvent::LinkSteam { id, steam_id },
        Commands::ResetSeason => MemberEvent::ResetSeason,
        Commands::List { .. } | Commands::Simulate { .. } => return None,
    };
    Some(event)
}

fn report_member(outcome: &Outcome, out: &mut impl Write) -> Result<()> {
    match outcome {
        Outcome::PlayerUpdated(player) => {
            writeln!(out, "✅ {}", player.get_info())?;
            writeln!(out, "   Title: {}", player.title)?;
            writeln!(out, "   IGL:   {}", player.igl)?;
            if let Some(steam_id) = &player.steam_id {
                writeln!(out, "   Steam: {}", steam_id)?;
            }
        }
        Outcome::PlayerRemoved(id) => writeln!(out, "✅ Player {} removed", id)?,
        Outcome::SeasonReset => writeln!(out, "✅ Season reset, everyone has to register again")?,
        Outcome::SeasonOpened => writeln!(out, "✅ Season registration open")?,
        Outcome::SeasonClosed { players } => writeln!(out, "✅ Season registration closed with {} players", players)?,
        Outcome::SeasonCancelled => writeln!(out, "✅ Season registration cancelled")?,
        Outcome::Session(_) => {}
    }
    Ok(())
}

fn simulate(
    manager: &mut MatchDayManager,
    players: Vec<u64>,
    matches: usize,
    bans: &[String],
    picks: &[String],
    today: NaiveDate,
    out: &mut impl Write,
) -> Result<()> {
    let participants = if players.is_empty() {
        manager.registry().players().map(|p| p.id).collect()
    } else {
        players
    };

    manager.apply(Event::Session(SessionEvent::StartRegistration { matches }), today)?;
    for id in &participants {
        manager.apply(Event::Session(SessionEvent::Join(*id)), today)?;
    }
    manager
        .apply(Event::Session(SessionEvent::CloseRegistration), today)
        .context("Failed to roll teams")?;

    for map in bans {
        manager
            .apply(Event::Session(SessionEvent::Ban(map.clone())), today)
            .with_context(|| format!("Failed to ban {}", map))?;
    }
    for map in picks {
        manager
            .apply(Event::Session(SessionEvent::Pick(map.clone())), today)
            .with_context(|| format!("Failed to pick {}", map))?;
    }

    writeln!(out, "Match day {} ({} participants)", manager.session().date(), participants.len())?;
    write!(out, "{}", manager.teamlist()?)?;
    writeln!(out)?;
    write!(out, "{}", manager.banorder()?)?;
    Ok(())
}
