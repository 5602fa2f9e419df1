//! Ordinal map ranking held by one player or one team.
//!
//! Scores are integers, lower means less wanted. Entries keep insertion order
//! and every sort is stable, so equal scores are broken first-seen-first.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapPreference {
    entries: Vec<(String, i64)>,
}

impl MapPreference {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Build a preference from a list ordered least to most wanted.
    pub fn from_list<S: AsRef<str>>(maps: &[S]) -> Self {
        let mut preference = Self::new();
        preference.update_from_list(maps);
        preference
    }

    /// Re-rank every listed map by its position; unlisted maps keep their score.
    pub fn update_from_list<S: AsRef<str>>(&mut self, maps: &[S]) {
        for (i, map) in maps.iter().enumerate() {
            self.set(map.as_ref(), i as i64);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, map: &str) -> bool {
        self.position(map).is_some()
    }

    pub fn get(&self, map: &str) -> Option<i64> {
        self.position(map).map(|i| self.entries[i].1)
    }

    /// Score of `map`, or 0 when absent. Absence and a natural zero are
    /// indistinguishable to callers of this method.
    pub fn score(&self, map: &str) -> i64 {
        self.get(map).unwrap_or(0)
    }

    pub fn set(&mut self, map: &str, score: i64) {
        match self.position(map) {
            Some(i) => self.entries[i].1 = score,
            None => self.entries.push((map.to_string(), score)),
        }
    }

    /// Add `delta` to the score of `map`, inserting it at zero first if absent.
    pub fn add(&mut self, map: &str, delta: i64) {
        match self.position(map) {
            Some(i) => self.entries[i].1 += delta,
            None => self.entries.push((map.to_string(), delta)),
        }
    }

    /// Multiply the score of `map` by `factor`. Returns false if the map is absent.
    pub fn scale(&mut self, map: &str, factor: i64) -> bool {
        match self.position(map) {
            Some(i) => {
                self.entries[i].1 *= factor;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, map: &str) -> Option<i64> {
        self.position(map).map(|i| self.entries.remove(i).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(map, score)| (map.as_str(), *score))
    }

    /// Maps in insertion order.
    pub fn to_list(&self) -> Vec<String> {
        self.entries.iter().map(|(map, _)| map.clone()).collect()
    }

    /// Maps sorted by score, ascending unless `reverse` is set.
    pub fn to_list_sorted(&self, reverse: bool) -> Vec<String> {
        let mut sorted: Vec<&(String, i64)> = self.entries.iter().collect();
        if reverse {
            sorted.sort_by(|a, b| b.1.cmp(&a.1));
        } else {
            sorted.sort_by(|a, b| a.1.cmp(&b.1));
        }
        sorted.into_iter().map(|(map, _)| map.clone()).collect()
    }

    /// The `n` highest ranked maps, most wanted first.
    pub fn top_n_maps(&self, n: usize) -> Vec<String> {
        let mut top = self.to_list_sorted(true);
        top.truncate(n);
        top
    }

    /// Drop every key that is not part of `pool`. New pool maps are never added
    /// here; callers that need them submit a fresh ranking.
    ///
    /// Returns the number of pruned entries.
    pub fn reconcile<S: AsRef<str>>(&mut self, pool: &[S]) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(map, _)| pool.iter().any(|p| p.as_ref() == map));
        before - self.entries.len()
    }

    /// Per-map sum over `preferences`, restricted to `maps` and in their order.
    pub fn sum<'a, I, S>(preferences: I, maps: &[S]) -> Self
    where
        I: IntoIterator<Item = &'a MapPreference>,
        S: AsRef<str>,
    {
        let preferences: Vec<&MapPreference> = preferences.into_iter().collect();
        let mut total = Self::new();
        for map in maps {
            let map = map.as_ref();
            total.set(map, 0);
            for preference in &preferences {
                total.add(map, preference.score(map));
            }
        }
        total
    }

    fn position(&self, map: &str) -> Option<usize> {
        self.entries.iter().position(|(m, _)| m == map)
    }
}
