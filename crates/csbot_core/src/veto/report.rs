use std::collections::BTreeMap;
use std::fmt;

use super::banorder::{get_shared_banorder, team_to_map_fit, MapFit};
use crate::team::Team;

/// One team's private view of the veto.
#[derive(Debug, Clone, PartialEq)]
pub struct PrivateBanorder {
    pub members: Vec<String>,
    pub banorder: Vec<String>,
}

/// Everything the presentation layer needs to render the current veto state.
///
/// Plain data plus a plain-text `Display`; markup is left to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct BanorderInfo {
    pub private_banorders: BTreeMap<usize, PrivateBanorder>,
    pub shared_banorder: Vec<String>,
    pub banned_maps: Vec<String>,
    pub picked_maps: Vec<String>,
    pub team_fit: Vec<MapFit>,
}

impl BanorderInfo {
    pub fn build(
        teams: &BTreeMap<usize, Team>,
        pool: &[String],
        banned: &[String],
        picked: &[String],
        available: &[String],
    ) -> Self {
        let private_banorders = teams
            .iter()
            .map(|(id, team)| {
                (*id, PrivateBanorder { members: team.display_names(), banorder: team.get_banorder() })
            })
            .collect();

        Self {
            private_banorders,
            shared_banorder: get_shared_banorder(teams, pool, banned, picked),
            banned_maps: banned.to_vec(),
            picked_maps: picked.to_vec(),
            team_fit: team_to_map_fit(teams, picked, available),
        }
    }

    /// `Nuke: Team0[3.4] Team1[2.2]` lines
    pub fn team_fit_text(&self) -> String {
        let mut text = String::new();
        for fit in &self.team_fit {
            text.push_str(&format!("{}: ", fit.map));
            for (team, score) in &fit.scores {
                text.push_str(&format!("Team{}[{}] ", team, score));
            }
            text.push('\n');
        }
        text
    }
}

impl fmt::Display for BanorderInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (id, private) in &self.private_banorders {
            writeln!(f, "Team {}: {:?}", id, private.members)?;
            writeln!(f, "banorder -> {:?}", private.banorder)?;
        }
        writeln!(f, "Shared banorder: {:?}", self.shared_banorder)?;
        writeln!(f, "Banned maps -> {:?}", self.banned_maps)?;
        writeln!(f, "Picked maps -> {:?}", self.picked_maps)?;
        write!(f, "{}", self.team_fit_text())
    }
}
