use maze_chase_core::{Direction, PlayerSnapshot, Position, Tile, TILE_SIZE};

use crate::{body::Body, maze::BONUS_TILE};

/// Start point of the player, straddling the bonus tile and its west neighbour.
pub(crate) const START: Position =
    Position::new(BONUS_TILE.column() * TILE_SIZE, BONUS_TILE.centre().y());

#[derive(Clone, Debug)]
pub(crate) struct Player {
    body: Body,
    direction: Direction,
    requested: Option<Direction>,
    stalled: bool,
}

impl Player {
    pub(crate) fn new() -> Self {
        Self {
            body: Body::at(START),
            direction: Direction::West,
            requested: None,
            stalled: false,
        }
    }

    pub(crate) fn tile(&self) -> Tile {
        self.body.tile()
    }

    pub(crate) fn direction(&self) -> Direction {
        self.direction
    }

    pub(crate) fn request(&mut self, direction: Direction) {
        self.requested = Some(direction);
    }

    pub(crate) fn is_stalled(&self) -> bool {
        self.stalled
    }

    pub(crate) fn set_stalled(&mut self, stalled: bool) {
        self.stalled = stalled;
    }

    /// Tries the requested direction first, falling back to the current one.
    ///
    /// A request stays queued until it can be taken.
    pub(crate) fn update(&mut self, speed: f64) {
        if let Some(requested) = self.requested {
            if self.body.advance(requested, speed) {
                self.direction = requested;
                self.requested = None;
                return;
            }
        }
        let _ = self.body.advance(self.direction, speed);
    }

    pub(crate) fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.body.position(),
            tile: self.body.tile(),
            direction: self.direction,
            requested: self.requested,
            stalled: self.stalled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_requests_stay_queued() {
        let mut player = Player::new();
        // Row 27 is wall beneath the start tile.
        player.request(Direction::South);
        player.update(1.0);

        assert_eq!(player.direction(), Direction::West);
        assert_eq!(player.snapshot().requested, Some(Direction::South));
        assert_eq!(player.snapshot().position.x(), START.x() - 1);
    }

    #[test]
    fn legal_requests_turn_immediately() {
        let mut player = Player::new();
        player.request(Direction::East);
        player.update(1.0);

        assert_eq!(player.direction(), Direction::East);
        assert_eq!(player.snapshot().requested, None);
        assert_eq!(player.snapshot().position.x(), START.x() + 1);
    }
}
