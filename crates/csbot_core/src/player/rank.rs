//! CS2 ranks are plain integers >= 0. Titles are a rough mapping onto the old
//! CS:GO tiers and only serve display.

pub const RANK_TIERS: [(u32, &str); 18] = [
    (0, "Silver I"),
    (2800, "Silver II"),
    (3800, "Silver III"),
    (4200, "Silver IV"),
    (4700, "Silver Elite"),
    (4999, "Silver Elite Master"),
    (5600, "Gold Nova I"),
    (6500, "Gold Nova II"),
    (7400, "Gold Nova III"),
    (8400, "Gold Nova Master"),
    (9400, "Master Guardian I"),
    (10000, "Master Guardian II"),
    (10900, "Master Guardian Elite"),
    (12000, "DMG"),
    (13100, "Legendary Eagle"),
    (14200, "Legendary Eagle Master"),
    (15500, "Supreme Master First Class"),
    (18000, "Global Elite"),
];

/// Title of the highest tier whose threshold is <= `rank`.
pub fn title_for_rank(rank: u32) -> &'static str {
    RANK_TIERS
        .iter()
        .take_while(|(threshold, _)| *threshold <= rank)
        .last()
        .map(|(_, title)| *title)
        .unwrap_or(RANK_TIERS[0].1)
}

/// Negative input clamps to zero.
pub fn clamp_rank(rank: i64) -> u32 {
    rank.clamp(0, u32::MAX as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_thresholds() {
        assert_eq!(title_for_rank(0), "Silver I");
        assert_eq!(title_for_rank(2799), "Silver I");
        assert_eq!(title_for_rank(2800), "Silver II");
        assert_eq!(title_for_rank(14200), "Legendary Eagle Master");
        assert_eq!(title_for_rank(18001), "Global Elite");
    }

    #[test]
    fn test_clamp_rank() {
        assert_eq!(clamp_rank(-1), 0);
        assert_eq!(clamp_rank(9400), 9400);
    }
}
