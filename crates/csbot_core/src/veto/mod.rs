//! Map veto: private and shared banorders, live ban/pick aggregation and
//! team-to-map fit.

pub mod banorder;
pub mod report;

pub use banorder::{
    aggregate_private, amplify_most_wanted, get_shared_banorder, remove_banned_maps,
    remove_picked_maps, shared_weighted_preference, team_to_map_fit, MapFit,
};
pub use report::{BanorderInfo, PrivateBanorder};
