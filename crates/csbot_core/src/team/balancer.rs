//! Randomized multi-restart team formation.
//!
//! Each match slot gets `roll_limit` independent random lineups biased toward
//! players with fewer matches (and one IGL seed), and keeps the lineup with the
//! lowest overall incompatibility. Slots run in order and bump `matches` on the
//! winners before the next slot, so later slots see earlier allocations.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

use super::types::Team;
use crate::config::BotConfig;
use crate::error::{CoreError, Result};
use crate::player::Player;

/// Competitive CS2 is 5v5
pub const DEFAULT_TEAM_SIZE: usize = 5;
/// Attempts per slot
pub const DEFAULT_ROLL_LIMIT: usize = 100;

pub struct TeamBalancer {
    team_size: usize,
    roll_limit: usize,
    rng: ChaCha8Rng,
}

impl Default for TeamBalancer {
    fn default() -> Self {
        Self::new(DEFAULT_TEAM_SIZE, DEFAULT_ROLL_LIMIT)
    }
}

impl TeamBalancer {
    pub fn new(team_size: usize, roll_limit: usize) -> Self {
        Self { team_size, roll_limit, rng: ChaCha8Rng::from_entropy() }
    }

    /// Deterministic balancer: same seed and pool, same teams.
    pub fn with_seed(team_size: usize, roll_limit: usize, seed: u64) -> Self {
        Self { team_size, roll_limit, rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(config.team_size, config.team_roll_limit)
    }

    pub fn team_size(&self) -> usize {
        self.team_size
    }

    /// Partition `players` into one team per match slot.
    ///
    /// Players are drawn from the full pool again for every slot, so the same
    /// player may appear in several slots. `matches` is incremented on `players`
    /// for every slot a player lands in.
    pub fn roll_teams(
        &mut self,
        players: &mut [Player],
        num_matches: usize,
        active_maps: &[String],
    ) -> Result<BTreeMap<usize, Team>> {
        if players.is_empty() {
            return Err(CoreError::InvalidInput("cannot roll teams from an empty pool".to_string()));
        }
        if num_matches == 0 {
            return Err(CoreError::InvalidInput("number of matches must be at least 1".to_string()));
        }

        let team_size = self.team_size.min(players.len());
        let mut best_teams = BTreeMap::new();

        for slot in 0..num_matches {
            let mut best: Option<(Team, Vec<usize>)> = None;

            for _ in 0..self.roll_limit.max(1) {
                let chosen = self.choose_players(players, team_size);
                let lineup: Vec<Player> = chosen.iter().map(|&i| players[i].clone()).collect();
                let team = Team::new(slot, lineup, players, active_maps);

                let better = match &best {
                    Some((current, _)) => team.overall_compatibility() < current.overall_compatibility(),
                    None => true,
                };
                if better {
                    best = Some((team, chosen));
                }
            }

            // roll_limit.max(1) guarantees at least one attempt
            if let Some((team, chosen)) = best {
                for &i in &chosen {
                    players[i].matches += 1;
                }
                log::debug!(
                    "Slot {} rolled with overall compatibility {}",
                    slot,
                    team.overall_compatibility()
                );
                best_teams.insert(slot, team);
            }
        }

        log::info!("Rolled {} teams of {} from {} players", best_teams.len(), team_size, players.len());
        Ok(best_teams)
    }

    /// One random lineup as indices into `players`.
    fn choose_players(&mut self, players: &[Player], team_size: usize) -> Vec<usize> {
        let mut chosen: Vec<usize> = Vec::with_capacity(team_size);

        while chosen.len() < team_size {
            let remaining: Vec<usize> = (0..players.len()).filter(|i| !chosen.contains(i)).collect();

            if chosen.is_empty() {
                let igls: Vec<usize> = remaining.iter().copied().filter(|&i| players[i].igl).collect();
                if let Some(fewest) = igls.iter().map(|&i| players[i].matches).min() {
                    let applicable: Vec<usize> =
                        igls.into_iter().filter(|&i| players[i].matches == fewest).collect();
                    if let Some(&igl) = applicable.choose(&mut self.rng) {
                        chosen.push(igl);
                        continue;
                    }
                }
            }

            let fewest = remaining.iter().map(|&i| players[i].matches).min();
            let mut applicable: Vec<usize> =
                remaining.iter().copied().filter(|&i| Some(players[i].matches) == fewest).collect();
            if applicable.is_empty() {
                applicable = remaining;
            }

            match applicable.choose(&mut self.rng) {
                Some(&pick) => chosen.push(pick),
                None => break,
            }
        }

        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maps::default_active_duty;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn pool(n: u64) -> Vec<Player> {
        let maps = default_active_duty();
        (0..n)
            .map(|i| {
                let mut player = Player::new(i, &format!("p{}", i), &format!("P{}", i), &maps);
                player.set_rank((i as i64 * 1733) % 18000);
                let mut order = maps.clone();
                order.rotate_left((i as usize) % maps.len());
                player.update_maps(&order);
                player
            })
            .collect()
    }

    #[test]
    fn test_five_players_one_igl_all_selected() {
        for seed in 0..20 {
            let mut players = pool(5);
            players[2].set_igl(true);
            let mut balancer = TeamBalancer::with_seed(5, 100, seed);

            let teams = balancer.roll_teams(&mut players, 1, &default_active_duty()).unwrap();

            let ids: HashSet<u64> = teams[&0].players().iter().map(|p| p.id).collect();
            assert_eq!(ids.len(), 5);
            assert!(teams[&0].players().iter().any(|p| p.igl));
        }
    }

    #[test]
    fn test_igl_seeds_the_team() {
        let mut players = pool(10);
        players[7].set_igl(true);
        let mut balancer = TeamBalancer::with_seed(5, 1, 3);

        let teams = balancer.roll_teams(&mut players, 1, &default_active_duty()).unwrap();
        assert_eq!(teams[&0].players()[0].id, 7);
    }

    #[test]
    fn test_fairness_prefers_fewer_matches() {
        let mut players = pool(10);
        for player in players.iter_mut().take(5) {
            player.matches = 3;
        }
        let mut balancer = TeamBalancer::with_seed(5, 100, 11);

        let teams = balancer.roll_teams(&mut players, 1, &default_active_duty()).unwrap();
        assert!(teams[&0].players().iter().all(|p| p.id >= 5));
    }

    #[test]
    fn test_later_slots_rotate() {
        let mut players = pool(10);
        let mut balancer = TeamBalancer::with_seed(5, 100, 5);

        let teams = balancer.roll_teams(&mut players, 2, &default_active_duty()).unwrap();
        let first: HashSet<u64> = teams[&0].players().iter().map(|p| p.id).collect();
        let second: HashSet<u64> = teams[&1].players().iter().map(|p| p.id).collect();
        assert!(first.is_disjoint(&second));
        assert!(players.iter().all(|p| p.matches == 1));
    }

    #[test]
    fn test_same_seed_same_teams() {
        let roll = |seed| {
            let mut players = pool(12);
            let mut balancer = TeamBalancer::with_seed(5, 50, seed);
            let teams = balancer.roll_teams(&mut players, 2, &default_active_duty()).unwrap();
            teams
                .values()
                .map(|t| t.players().iter().map(|p| p.id).collect::<Vec<_>>())
                .collect::<Vec<_>>()
        };
        assert_eq!(roll(42), roll(42));
    }

    #[test]
    fn test_degenerate_input() {
        let mut balancer = TeamBalancer::with_seed(5, 10, 0);
        assert!(matches!(
            balancer.roll_teams(&mut [], 1, &default_active_duty()),
            Err(CoreError::InvalidInput(_))
        ));
        let mut players = pool(3);
        assert!(matches!(
            balancer.roll_teams(&mut players, 0, &default_active_duty()),
            Err(CoreError::InvalidInput(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_roll_shape_and_counters(
            n in 1u64..16,
            num_matches in 1usize..5,
            igl_mask in 0u16..u16::MAX,
            seed in 0u64..1000,
        ) {
            let mut players = pool(n);
            for (i, player) in players.iter_mut().enumerate() {
                player.set_igl(igl_mask & (1 << i) != 0);
            }
            let mut balancer = TeamBalancer::with_seed(5, 10, seed);

            let teams = balancer.roll_teams(&mut players, num_matches, &default_active_duty()).unwrap();

            prop_assert_eq!(teams.len(), num_matches);
            let expected_size = 5.min(n as usize);
            let mut placements = vec![0u32; n as usize];
            for team in teams.values() {
                prop_assert_eq!(team.players().len(), expected_size);
                let ids: HashSet<u64> = team.players().iter().map(|p| p.id).collect();
                prop_assert_eq!(ids.len(), expected_size);
                for id in ids {
                    placements[id as usize] += 1;
                }
            }
            for player in &players {
                prop_assert_eq!(player.matches, placements[player.id as usize]);
            }
        }
    }
}
