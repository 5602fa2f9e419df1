use super::error::SaveError;
use super::format::RosterSave;
use super::SAVE_VERSION;
use crate::player::rank::title_for_rank;

/// Migrate roster data from older versions to the current version
pub fn migrate_save(mut save: RosterSave) -> Result<RosterSave, SaveError> {
    let original_version = save.version;

    save = match save.version {
        0 | 1 => migrate_v1_to_v2(save),
        SAVE_VERSION => save,
        _ => {
            return Err(SaveError::VersionMismatch { found: save.version, expected: SAVE_VERSION });
        }
    };

    save.version = SAVE_VERSION;

    if original_version != SAVE_VERSION {
        save.update_timestamp();
        log::info!("Migrated roster from version {} to {}", original_version, SAVE_VERSION);
    }

    Ok(save)
}

/// Version 1 stored CS:GO skill groups as titles; v2 derives them from the CS2 rating.
fn migrate_v1_to_v2(mut save: RosterSave) -> RosterSave {
    log::info!("Migrating roster from version 1 to 2");

    for player in &mut save.players {
        let title = title_for_rank(player.rank);
        if player.title != title {
            log::debug!("Player {}: title {} -> {}", player.id, player.title, title);
            player.title = title.to_string();
        }
    }

    save
}

/// Check if a roster needs migration
pub fn needs_migration(save: &RosterSave) -> bool {
    save.version < SAVE_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maps::default_active_duty;
    use crate::player::Player;

    #[test]
    fn test_migrate_v1_to_v2() {
        let mut player = Player::new(1, "a", "A", &default_active_duty());
        player.rank = 13100;
        player.title = "Silver I".to_string();
        let mut save = RosterSave::new(vec![player]);
        save.version = 1;
        assert!(needs_migration(&save));

        let migrated = migrate_save(save).unwrap();

        assert_eq!(migrated.version, SAVE_VERSION);
        assert_eq!(migrated.players[0].title, "Legendary Eagle");
    }

    #[test]
    fn test_no_migration_needed() {
        let save = RosterSave::default();
        let result = migrate_save(save.clone()).unwrap();
        assert_eq!(result.version, save.version);
        assert_eq!(result.timestamp, save.timestamp);
    }

    #[test]
    fn test_future_version_rejected() {
        let mut save = RosterSave::default();
        save.version = 999;
        assert!(migrate_save(save).is_err());
    }
}
