use serde::{Deserialize, Serialize};

use super::rank::{clamp_rank, title_for_rank};
use crate::maps::MapPreference;

/// Registered community member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Externally assigned stable id (the chat platform's user id)
    pub id: u64,
    pub name: String,
    pub display_name: String,
    pub rank: u32,
    pub title: String,
    /// Matches played this season, drives rotation fairness
    pub matches: u32,
    pub maps: MapPreference,
    pub igl: bool,
    #[serde(default)]
    pub steam_id: Option<String>,
}

impl Player {
    /// New member at rank 0 whose map ranking follows the pool order.
    pub fn new<S: AsRef<str>>(id: u64, name: &str, display_name: &str, pool: &[S]) -> Self {
        Self {
            id,
            name: name.to_string(),
            display_name: display_name.to_string(),
            rank: 0,
            title: title_for_rank(0).to_string(),
            matches: 0,
            maps: MapPreference::from_list(pool),
            igl: false,
            steam_id: None,
        }
    }

    pub fn set_igl(&mut self, igl: bool) {
        self.igl = igl;
    }

    pub fn set_rank(&mut self, rank: i64) {
        self.rank = clamp_rank(rank);
        self.title = title_for_rank(self.rank).to_string();
    }

    pub fn set_steam_id(&mut self, steam_id: &str) {
        self.steam_id = Some(steam_id.to_string());
    }

    /// Rank a single map, clamped to `[0, maps - 1]`.
    pub fn rank_map(&mut self, map: &str, rank: i64) {
        let max = self.maps.len().saturating_sub(1) as i64;
        self.maps.set(map, rank.clamp(0, max));
    }

    /// Replace the ranking with `maps`, ordered least to most wanted.
    pub fn update_maps<S: AsRef<str>>(&mut self, maps: &[S]) {
        self.maps.update_from_list(maps);
    }

    /// One `map: score` line per map, in insertion order.
    pub fn get_map_ranking(&self) -> String {
        self.maps.iter().map(|(map, score)| format!("{}: {}\n", map, score)).collect()
    }

    /// Maps least to most wanted, separated by bars.
    pub fn map_order(&self) -> String {
        let mut order = String::from("| ");
        for map in self.maps.to_list_sorted(false) {
            order.push_str(&map);
            order.push_str(" | ");
        }
        order
    }

    pub fn get_info(&self) -> String {
        format!("{} is rank {} and has map order: {}", self.name, self.rank, self.map_order())
    }

    pub fn rank_compatibility(&self, other: &Player) -> f64 {
        (self.rank as f64 - other.rank as f64).abs()
    }

    /// Sum of per-map distances over `pool`. A map missing from either side counts as 0.
    pub fn map_compatibility<S: AsRef<str>>(&self, other: &Player, pool: &[S]) -> f64 {
        pool.iter()
            .map(|map| {
                let map = map.as_ref();
                (self.maps.score(map) - other.maps.score(map)).abs() as f64
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maps::default_active_duty;

    fn player() -> Player {
        Player::new(0, "test", "test_display_name", &default_active_duty())
    }

    #[test]
    fn test_player_init() {
        let player = Player::new(42, "test", "Test", &default_active_duty());
        assert_eq!(player.id, 42);
        assert_eq!(player.rank, 0);
        assert_eq!(player.title, "Silver I");
        assert_eq!(player.matches, 0);
        assert!(!player.igl);
        assert_eq!(player.maps, MapPreference::from_list(&default_active_duty()));
        assert!(player.steam_id.is_none());
    }

    #[test]
    fn test_set_rank() {
        let mut player = player();
        player.set_rank(2800);
        assert_eq!(player.title, "Silver II");
        player.set_rank(18001);
        assert_eq!(player.rank, 18001);
        assert_eq!(player.title, "Global Elite");
        player.set_rank(-1);
        assert_eq!(player.rank, 0);
        assert_eq!(player.title, "Silver I");
    }

    #[test]
    fn test_rank_map_clamps() {
        let mut player = player();
        player.rank_map("Mirage", 6);
        assert_eq!(player.maps.get("Mirage"), Some(6));
        player.rank_map("Mirage", -1);
        assert_eq!(player.maps.get("Mirage"), Some(0));
        player.rank_map("Mirage", 100);
        assert_eq!(player.maps.get("Mirage"), Some(6));
    }

    #[test]
    fn test_map_ranking_and_order() {
        let player = player();
        let expected: String = default_active_duty()
            .iter()
            .enumerate()
            .map(|(i, map)| format!("{}: {}\n", map, i))
            .collect();
        assert_eq!(player.get_map_ranking(), expected);
        assert_eq!(player.map_order(), "| Mirage | Inferno | Anubis | Overpass | Ancient | Nuke | Vertigo | ");
        assert!(player.get_info().starts_with("test is rank 0 and has map order: | Mirage"));
    }

    #[test]
    fn test_update_maps_most_wanted_first() {
        let mut player = player();
        let maps = ["Vertigo", "Nuke", "Ancient", "Overpass", "Anubis", "Inferno", "Mirage"];
        player.update_maps(&maps);
        let mut expected: Vec<String> = maps.iter().map(|m| m.to_string()).collect();
        expected.reverse();
        assert_eq!(player.maps.to_list_sorted(true), expected);
    }

    #[test]
    fn test_compatibility() {
        let mut a = player();
        let b = player();
        a.set_rank(1000);
        assert_eq!(a.rank_compatibility(&b), 1000.0);
        assert_eq!(a.map_compatibility(&b, &default_active_duty()), 0.0);

        a.update_maps(&["Vertigo", "Nuke", "Ancient", "Overpass", "Anubis", "Inferno", "Mirage"]);
        // |6-0| + |5-1| + |4-2| + 0 + |2-4| + |1-5| + |0-6|
        assert_eq!(a.map_compatibility(&b, &default_active_duty()), 24.0);
    }
}
