use serde::{Deserialize, Serialize};

use crate::maps::MapPreference;
use crate::player::Player;

/// One rolled lineup for a match slot.
///
/// All compatibility scores are incompatibilities: lower is better.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: usize,
    players: Vec<Player>,
    rank_compatibility: f64,
    map_compatibility: f64,
    overall_compatibility: f64,
    map_preference: MapPreference,
}

impl Team {
    /// Score `players` against the whole `pool` over the active map list.
    pub fn new(id: usize, players: Vec<Player>, pool: &[Player], active_maps: &[String]) -> Self {
        let map_preference = team_map_preference(&players, active_maps);
        let rank_compatibility = rank_score(&players, pool);
        let map_compatibility = map_score(&players, active_maps);
        Self {
            id,
            players,
            rank_compatibility,
            map_compatibility,
            // Deliberately unweighted: the two terms live on different scales.
            overall_compatibility: rank_compatibility + map_compatibility,
            map_preference,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn rank_compatibility(&self) -> f64 {
        self.rank_compatibility
    }

    pub fn map_compatibility(&self) -> f64 {
        self.map_compatibility
    }

    pub fn overall_compatibility(&self) -> f64 {
        self.overall_compatibility
    }

    pub fn map_preference(&self) -> &MapPreference {
        &self.map_preference
    }

    /// The team's private banorder, least wanted first.
    pub fn get_banorder(&self) -> Vec<String> {
        self.map_preference.to_list_sorted(false)
    }

    pub fn display_names(&self) -> Vec<String> {
        self.players.iter().map(|p| p.display_name.clone()).collect()
    }

    pub fn get_info(&self) -> String {
        let igls: Vec<&str> =
            self.players.iter().filter(|p| p.igl).map(|p| p.display_name.as_str()).collect();
        let members: Vec<&str> =
            self.players.iter().filter(|p| !p.igl).map(|p| p.display_name.as_str()).collect();
        format!(
            "Team {}:\n\t IGLs: {:?}\n\t Players: {:?} [r:{}][m:{}][{}]\n",
            self.id,
            igls,
            members,
            self.rank_compatibility,
            self.map_compatibility,
            self.overall_compatibility
        )
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn mean_rank(players: &[Player]) -> Option<f64> {
    if players.is_empty() {
        return None;
    }
    Some(players.iter().map(|p| p.rank as f64).sum::<f64>() / players.len() as f64)
}

/// Deviation of the team's mean rank from the pool's mean rank.
fn rank_score(team: &[Player], pool: &[Player]) -> f64 {
    let (avg_team, avg_pool) = match (mean_rank(team), mean_rank(pool)) {
        (Some(team), Some(pool)) => (team, pool),
        _ => (0.0, 0.0),
    };
    round3((avg_team - avg_pool).abs())
}

/// Pairwise map distance over ordered member pairs, normalised by map count and team size.
fn map_score(team: &[Player], active_maps: &[String]) -> f64 {
    let mut total_distance = 0.0;
    for (i, player) in team.iter().enumerate() {
        for (j, other) in team.iter().enumerate() {
            if i == j {
                continue;
            }
            total_distance += player.map_compatibility(other, active_maps);
        }
    }

    let divisor = (active_maps.len() * team.len()) as f64;
    if divisor == 0.0 {
        return total_distance;
    }
    round3(total_distance / divisor)
}

fn team_map_preference(players: &[Player], active_maps: &[String]) -> MapPreference {
    MapPreference::sum(players.iter().map(|p| &p.maps), active_maps)
}
