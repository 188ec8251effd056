//! Per-adversary target tiles.

use maze_chase_core::{AdversaryId, Direction, Tile, COLUMNS};

const AMBUSH_LEAD: i32 = 4;
const FLANK_LEAD: i32 = 2;
const SHY_DISTANCE_SQUARED: i64 = 8 * 8;

/// Positions read by the chase-target functions on every lookahead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pursuit {
    /// Tile occupied by the player.
    pub player: Tile,
    /// Direction the player is facing.
    pub facing: Direction,
    /// Tile occupied by the lead adversary.
    pub lead: Tile,
}

/// Fixed corner tile an adversary heads for while scattering.
#[must_use]
pub const fn scatter_corner(adversary: AdversaryId) -> Tile {
    match adversary {
        AdversaryId::Pursuer => Tile::new(COLUMNS - 3, 0),
        AdversaryId::Ambusher => Tile::new(2, 0),
        AdversaryId::Flanker => Tile::new(COLUMNS - 1, 34),
        AdversaryId::Opportunist => Tile::new(0, 34),
    }
}

/// Tile an adversary heads for while chasing from `own` tile.
#[must_use]
pub fn chase_target(adversary: AdversaryId, own: Tile, pursuit: &Pursuit) -> Tile {
    match adversary {
        AdversaryId::Pursuer => pursuit.player,
        AdversaryId::Ambusher => pursuit.player.offset(pursuit.facing, AMBUSH_LEAD),
        AdversaryId::Flanker => {
            let pivot = pursuit.player.offset(pursuit.facing, FLANK_LEAD);
            Tile::new(
                2 * pivot.column() - pursuit.lead.column(),
                2 * pivot.row() - pursuit.lead.row(),
            )
        }
        AdversaryId::Opportunist => {
            if own.distance_squared(pursuit.player) > SHY_DISTANCE_SQUARED {
                pursuit.player
            } else {
                scatter_corner(adversary)
            }
        }
    }
}
