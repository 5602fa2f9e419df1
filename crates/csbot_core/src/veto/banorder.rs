//! Shared banorder aggregation.
//!
//! Everything here is a pure function of the rolled teams and the session's
//! banned/picked lists. Teams are never mutated; the pipeline works on copies.

use std::collections::BTreeMap;

use crate::maps::MapPreference;
use crate::team::Team;

/// Boost factors for the three most wanted maps, multiplied by the map count.
const AMPLIFY_WEIGHTS: [i64; 3] = [16, 8, 4];

/// Per-map average member preference of every team.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFit {
    pub map: String,
    /// team id -> mean raw member score
    pub scores: BTreeMap<usize, f64>,
}

/// Deep copy of every team's preference keyed by team id.
pub fn aggregate_private(teams: &BTreeMap<usize, Team>) -> BTreeMap<usize, MapPreference> {
    teams.iter().map(|(id, team)| (*id, team.map_preference().clone())).collect()
}

/// Multiply the top three maps by 16k, 8k and 4k where k is the current map count.
///
/// k shrinks as maps get banned or picked, so the boost follows the candidate set.
pub fn amplify_most_wanted(preference: &mut MapPreference) {
    let factor = preference.len() as i64;
    let top = preference.top_n_maps(AMPLIFY_WEIGHTS.len());
    for (map, weight) in top.iter().zip(AMPLIFY_WEIGHTS) {
        preference.scale(map, weight * factor);
    }
}

pub fn remove_banned_maps(preference: &mut MapPreference, banned: &[String]) {
    for map in banned {
        if preference.remove(map).is_none() {
            log::debug!("Tried banning {} not found in available maps", map);
        }
    }
}

pub fn remove_picked_maps(preference: &mut MapPreference, picked: &[String]) {
    for map in picked {
        if preference.remove(map).is_none() {
            log::debug!("Tried picking {} not found in available maps", map);
        }
    }
}

/// Sum every map of `maps` across the private preferences. A map deleted from
/// a private preference contributes 0, the same as a natural zero.
pub fn shared_weighted_preference(
    private_preferences: &BTreeMap<usize, MapPreference>,
    maps: &[String],
) -> MapPreference {
    MapPreference::sum(private_preferences.values(), maps)
}

/// Still-available maps, least wanted first.
pub fn get_shared_banorder(
    teams: &BTreeMap<usize, Team>,
    pool: &[String],
    banned: &[String],
    picked: &[String],
) -> Vec<String> {
    let mut private_preferences = aggregate_private(teams);
    for preference in private_preferences.values_mut() {
        remove_banned_maps(preference, banned);
        remove_picked_maps(preference, picked);
        amplify_most_wanted(preference);
    }

    let remaining: Vec<String> =
        pool.iter().filter(|m| !banned.contains(m) && !picked.contains(m)).cloned().collect();

    shared_weighted_preference(&private_preferences, &remaining).to_list_sorted(false)
}

/// Mean raw member preference per team for every picked map, then every available map.
pub fn team_to_map_fit(
    teams: &BTreeMap<usize, Team>,
    picked: &[String],
    available: &[String],
) -> Vec<MapFit> {
    picked
        .iter()
        .chain(available.iter())
        .map(|map| {
            let scores = teams
                .iter()
                .map(|(id, team)| {
                    let members = team.players();
                    let total: i64 = members.iter().map(|p| p.maps.score(map)).sum();
                    let score = if members.is_empty() { 0.0 } else { total as f64 / members.len() as f64 };
                    (*id, score)
                })
                .collect();
            MapFit { map: map.clone(), scores }
        })
        .collect()
}
