//! Level-indexed gameplay tables.
//!
//! Every lookup is total: levels past the end of a table reuse its final entry.

use crate::{
    ticks_from_secs, AdversaryId, AdversaryStatus, ItemKind, Level, LevelBand, Locomotion,
    SpeedBoost, ThreatMode, Vitality, TICKS_PER_SECOND,
};

/// Ticks between successive toggles of the frightened warning flash.
pub const FLASH_TOGGLE_TICKS: u32 = TICKS_PER_SECOND / 4;

/// Remaining-item counts at which the bonus item appears.
pub const BONUS_TRIGGER_REMAINING: [u32; 2] = [174, 74];

/// Minimum number of ticks the bonus item stays on the maze.
pub const BONUS_MIN_TICKS: u32 = ticks_from_secs(9);

/// Upper bound (exclusive) of the random extra lifetime of the bonus item.
pub const BONUS_JITTER_TICKS: u32 = ticks_from_secs(1);

/// Shared-counter values that release the second, third and fourth adversary.
pub const GLOBAL_RELEASE_THRESHOLDS: [(u32, AdversaryId); 3] = [
    (7, AdversaryId::Ambusher),
    (17, AdversaryId::Flanker),
    (32, AdversaryId::Opportunist),
];

const VULNERABILITY_SECS: [u32; 18] = [6, 5, 4, 3, 2, 5, 2, 2, 1, 5, 2, 1, 1, 3, 1, 1, 0, 1];
const FLASH_COUNTS: [u32; 18] = [5, 5, 5, 5, 5, 5, 5, 5, 3, 5, 5, 3, 3, 5, 3, 3, 0, 3];

const ENTERING_SPEED: f64 = 2.0;
const EXITING_SPEED: f64 = 0.5;

fn banded(level: Level, first: f64, early: f64, late: f64) -> f64 {
    match level.band() {
        LevelBand::First => first,
        LevelBand::Early => early,
        LevelBand::Late => late,
    }
}

fn level_entry(table: &[u32], level: Level) -> u32 {
    let index = usize::try_from(level.get().saturating_sub(1)).unwrap_or(usize::MAX);
    table
        .get(index)
        .or_else(|| table.last())
        .copied()
        .unwrap_or(0)
}

/// Speed of an adversary in position units per tick.
///
/// The highest-priority applicable condition wins: holding-area travel, then
/// death, then fright, then the elroy tiers, then the tunnel, then the base
/// speed for the level band.
#[must_use]
pub fn adversary_speed(status: &AdversaryStatus, level: Level, in_tunnel: bool) -> f64 {
    match status.locomotion {
        Locomotion::Entering => return ENTERING_SPEED,
        Locomotion::Exiting => return EXITING_SPEED,
        Locomotion::Inside | Locomotion::Free => {}
    }
    if status.vitality == Vitality::Dead {
        return ENTERING_SPEED;
    }
    if status.threat == ThreatMode::Frightened {
        return banded(level, 0.5, 0.55, 0.6);
    }
    match status.boost {
        SpeedBoost::Tier2 => return banded(level, 0.85, 0.95, 1.05),
        SpeedBoost::Tier1 => return banded(level, 0.8, 0.9, 1.0),
        SpeedBoost::None => {}
    }
    if in_tunnel {
        return banded(level, 0.4, 0.45, 0.5);
    }
    banded(level, 0.75, 0.85, 0.95)
}

/// Speed of the player in position units per tick.
#[must_use]
pub fn player_speed(level: Level, adversaries_frightened: bool) -> f64 {
    if adversaries_frightened {
        return banded(level, 0.9, 0.95, 1.0);
    }
    if level.get() > 20 {
        return 0.9;
    }
    banded(level, 0.8, 0.9, 1.0)
}

/// Length of the vulnerability window in ticks. Zero means the energiser only
/// reverses the adversaries.
#[must_use]
pub fn vulnerability_ticks(level: Level) -> u32 {
    ticks_from_secs(level_entry(&VULNERABILITY_SECS, level))
}

/// Number of on/off warning flashes shown before the vulnerability window ends.
#[must_use]
pub fn flash_count(level: Level) -> u32 {
    level_entry(&FLASH_COUNTS, level)
}

/// Ticks into the vulnerability window at which the warning schedule starts.
///
/// The schedule spends one dark period, then alternates for the final
/// `2 * flash_count` periods. Returns `None` when the level shows no flashes.
#[must_use]
pub fn flash_start(level: Level) -> Option<u32> {
    let flashes = flash_count(level);
    if flashes == 0 {
        return None;
    }
    let lead = (2 * flashes + 1) * FLASH_TOGGLE_TICKS;
    Some(vulnerability_ticks(level).saturating_sub(lead).max(1))
}

/// Durations of the seven scatter/chase phases, in ticks.
///
/// Even indices are scatter phases, odd indices chase phases. Once the final
/// phase elapses the mode stays chase for the rest of the level.
#[must_use]
pub fn mode_phase_ticks(level: Level) -> [u32; 7] {
    match level.band() {
        LevelBand::First => [
            ticks_from_secs(7),
            ticks_from_secs(20),
            ticks_from_secs(7),
            ticks_from_secs(20),
            ticks_from_secs(5),
            ticks_from_secs(20),
            ticks_from_secs(5),
        ],
        LevelBand::Early => [
            ticks_from_secs(7),
            ticks_from_secs(20),
            ticks_from_secs(7),
            ticks_from_secs(20),
            ticks_from_secs(5),
            ticks_from_secs(1033),
            1,
        ],
        LevelBand::Late => [
            ticks_from_secs(5),
            ticks_from_secs(20),
            ticks_from_secs(5),
            ticks_from_secs(20),
            ticks_from_secs(5),
            ticks_from_secs(1037),
            1,
        ],
    }
}

/// Initial personal dot counter of an adversary.
#[must_use]
pub fn personal_dot_seed(adversary: AdversaryId, level: Level) -> u32 {
    match (adversary, level.get()) {
        (AdversaryId::Flanker, 1) => 30,
        (AdversaryId::Opportunist, 1) => 60,
        (AdversaryId::Opportunist, 2) => 50,
        _ => 0,
    }
}

/// Ticks without item consumption after which a waiting adversary is forced out.
#[must_use]
pub fn release_failsafe_ticks(level: Level) -> u32 {
    if level.get() < 5 {
        ticks_from_secs(4)
    } else {
        ticks_from_secs(3)
    }
}

/// Remaining-item count at or below which the lead adversary reaches the
/// second elroy tier. Twice this value triggers the first tier.
#[must_use]
pub fn elroy_threshold(level: Level) -> u32 {
    match level.get() {
        0 | 1 => 10,
        2 => 15,
        3..=5 => 20,
        6..=8 => 25,
        9..=11 => 30,
        12..=14 => 40,
        15..=18 => 50,
        _ => 60,
    }
}

/// Elroy tier warranted by the remaining-item count.
#[must_use]
pub fn elroy_tier(level: Level, remaining: u32) -> SpeedBoost {
    let threshold = elroy_threshold(level);
    if remaining <= threshold {
        SpeedBoost::Tier2
    } else if remaining <= threshold * 2 {
        SpeedBoost::Tier1
    } else {
        SpeedBoost::None
    }
}

/// Points for a counted item. Bonus values come from [`crate::BonusSymbol`].
#[must_use]
pub const fn item_points(kind: ItemKind) -> u32 {
    match kind {
        ItemKind::Dot => 10,
        ItemKind::Energiser => 50,
        ItemKind::Bonus => 0,
    }
}

/// Points for catching an adversary while `frightened` adversaries remain
/// frightened, counting the one being caught.
#[must_use]
pub fn capture_points(frightened: u32) -> u32 {
    let doublings = 4u32.saturating_sub(frightened.clamp(1, 4));
    200 << doublings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(locomotion: Locomotion, threat: ThreatMode, vitality: Vitality) -> AdversaryStatus {
        AdversaryStatus {
            locomotion,
            threat,
            vitality,
            boost: SpeedBoost::Tier2,
        }
    }

    #[test]
    fn speed_priority_favours_house_then_death_then_fright() {
        let level = Level::FIRST;
        let entering = status(Locomotion::Entering, ThreatMode::Frightened, Vitality::Dead);
        assert_eq!(adversary_speed(&entering, level, true), ENTERING_SPEED);

        let dead = status(Locomotion::Free, ThreatMode::Frightened, Vitality::Dead);
        assert_eq!(adversary_speed(&dead, level, true), ENTERING_SPEED);

        let frightened = status(Locomotion::Free, ThreatMode::Frightened, Vitality::Alive);
        assert_eq!(adversary_speed(&frightened, level, true), 0.5);

        let boosted = status(Locomotion::Free, ThreatMode::Chasing, Vitality::Alive);
        assert_eq!(adversary_speed(&boosted, level, true), 0.85);

        let plain = AdversaryStatus::initial(Locomotion::Free);
        assert_eq!(adversary_speed(&plain, level, true), 0.4);
        assert_eq!(adversary_speed(&plain, Level::new(3), false), 0.85);
        assert_eq!(adversary_speed(&plain, Level::new(9), false), 0.95);
    }

    #[test]
    fn player_speed_bands() {
        assert_eq!(player_speed(Level::FIRST, false), 0.8);
        assert_eq!(player_speed(Level::new(4), false), 0.9);
        assert_eq!(player_speed(Level::new(5), false), 1.0);
        assert_eq!(player_speed(Level::new(21), false), 0.9);
        assert_eq!(player_speed(Level::FIRST, true), 0.9);
    }

    #[test]
    fn vulnerability_tables_clamp_past_last_level() {
        assert_eq!(vulnerability_ticks(Level::FIRST), 360);
        assert_eq!(vulnerability_ticks(Level::new(17)), 0);
        assert_eq!(vulnerability_ticks(Level::new(40)), 60);
        assert_eq!(flash_count(Level::new(40)), 3);
    }

    #[test]
    fn flash_start_leaves_room_for_all_toggles() {
        assert_eq!(flash_start(Level::FIRST), Some(360 - 11 * FLASH_TOGGLE_TICKS));
        assert_eq!(flash_start(Level::new(9)), Some(1));
        assert_eq!(flash_start(Level::new(17)), None);
    }

    #[test]
    fn mode_table_depends_on_band() {
        assert_eq!(mode_phase_ticks(Level::FIRST)[0], 420);
        assert_eq!(mode_phase_ticks(Level::new(2))[6], 1);
        assert_eq!(mode_phase_ticks(Level::new(5))[5], 1037 * 60);
    }

    #[test]
    fn elroy_tiers_escalate_with_fewer_items() {
        let level = Level::FIRST;
        assert_eq!(elroy_tier(level, 21), SpeedBoost::None);
        assert_eq!(elroy_tier(level, 20), SpeedBoost::Tier1);
        assert_eq!(elroy_tier(level, 10), SpeedBoost::Tier2);
        assert_eq!(elroy_threshold(Level::new(19)), 60);
    }

    #[test]
    fn capture_points_double_per_capture() {
        assert_eq!(capture_points(4), 200);
        assert_eq!(capture_points(3), 400);
        assert_eq!(capture_points(2), 800);
        assert_eq!(capture_points(1), 1600);
    }

    #[test]
    fn dot_seeds_vanish_after_level_two() {
        assert_eq!(personal_dot_seed(AdversaryId::Flanker, Level::FIRST), 30);
        assert_eq!(personal_dot_seed(AdversaryId::Opportunist, Level::new(2)), 50);
        assert_eq!(personal_dot_seed(AdversaryId::Opportunist, Level::new(3)), 0);
        assert_eq!(personal_dot_seed(AdversaryId::Ambusher, Level::FIRST), 0);
    }
}
