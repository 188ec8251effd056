//! Sub-unit kinematics layered over the tile grid.

use maze_chase_core::{Direction, Position, Tile, TILE_CENTRE, TILE_SIZE};

use crate::maze::{self, TUNNEL_EAST_EXIT, TUNNEL_WEST_EXIT};

const WRAP_MIN_X: i32 = TUNNEL_WEST_EXIT * TILE_SIZE;
const WRAP_MAX_X: i32 = TUNNEL_EAST_EXIT * TILE_SIZE;
const WRAP_SPAN: i32 = WRAP_MAX_X - WRAP_MIN_X;

/// Reports whether an actor at local offset `(lx, ly)` has reached or passed
/// the tile centre heading in `direction`.
pub(crate) fn exiting_tile(direction: Direction, lx: f64, ly: f64) -> bool {
    let centre = f64::from(TILE_CENTRE);
    match direction {
        Direction::West => lx <= centre,
        Direction::East => lx >= centre,
        Direction::North => ly <= centre,
        Direction::South => ly >= centre,
    }
}

/// Integer position plus the fractional remainder owed on each axis.
#[derive(Clone, Debug)]
pub(crate) struct Body {
    position: Position,
    previous_tile: Tile,
    remainder_x: f64,
    remainder_y: f64,
}

impl Body {
    pub(crate) fn at(position: Position) -> Self {
        Self {
            position,
            previous_tile: position.tile(),
            remainder_x: 0.0,
            remainder_y: 0.0,
        }
    }

    pub(crate) fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn tile(&self) -> Tile {
        self.position.tile()
    }

    /// Whether the last move carried the body into a different tile.
    pub(crate) fn entered_tile(&self) -> bool {
        self.previous_tile != self.tile()
    }

    /// Places the body, wrapping horizontally through the tunnel.
    pub(crate) fn move_to(&mut self, position: Position) {
        let mut x = position.x();
        if x < WRAP_MIN_X {
            x += WRAP_SPAN;
        } else if x > WRAP_MAX_X {
            x -= WRAP_SPAN;
        }
        self.previous_tile = self.tile();
        self.position = Position::new(x, position.y());
    }

    /// Moves by a fractional displacement, carrying the remainder between calls.
    ///
    /// The carried remainder is dropped on an axis whenever that axis stops
    /// moving or reverses.
    pub(crate) fn move_by(&mut self, dx: f64, dy: f64) {
        let (step_x, remainder_x) = accumulate(dx, self.remainder_x);
        let (step_y, remainder_y) = accumulate(dy, self.remainder_y);
        self.remainder_x = remainder_x;
        self.remainder_y = remainder_y;
        self.move_to(Position::new(
            self.position.x() + step_x,
            self.position.y() + step_y,
        ));
    }

    /// Attempts to move `speed` units in `direction`.
    ///
    /// Passing the tile centre toward a blocked exit is refused and leaves the
    /// body untouched. Legal moves also pull the body toward the centreline of
    /// the perpendicular axis by at most `speed`.
    pub(crate) fn advance(&mut self, direction: Direction, speed: f64) -> bool {
        let (lx, ly) = self.position.local();
        let dx = f64::from(direction.dx()) * speed;
        let dy = f64::from(direction.dy()) * speed;
        if passes_centre(direction, f64::from(lx) + dx, f64::from(ly) + dy)
            && !maze::exits(self.tile()).allows(direction)
        {
            return false;
        }

        if direction.is_horizontal() {
            self.move_by(dx, toward_centre(ly, speed));
        } else {
            self.move_by(toward_centre(lx, speed), dy);
        }
        true
    }

    #[cfg(test)]
    pub(crate) fn remainder(&self) -> (f64, f64) {
        (self.remainder_x, self.remainder_y)
    }
}

fn passes_centre(direction: Direction, lx: f64, ly: f64) -> bool {
    let centre = f64::from(TILE_CENTRE);
    match direction {
        Direction::West => lx < centre,
        Direction::East => lx > centre,
        Direction::North => ly < centre,
        Direction::South => ly > centre,
    }
}

fn accumulate(delta: f64, remainder: f64) -> (i32, f64) {
    let carried = if delta * remainder > 0.0 { remainder } else { 0.0 };
    let real = delta + carried;
    let whole = real.trunc();
    (whole as i32, real - whole)
}

fn toward_centre(local: i32, speed: f64) -> f64 {
    let offset = TILE_CENTRE - local;
    f64::from(offset.signum()) * speed.min(f64::from(offset.abs()))
}
