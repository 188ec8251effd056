//! Static maze topology and tile queries.
//!
//! Every query is total over the tunnel-extended coordinate range: columns
//! beyond the grid on the tunnel row are open corridor, anything else outside
//! the grid is wall.

use maze_chase_core::{
    Direction, Exits, ItemKind, Position, Tile, COLUMNS, ROWS, TILE_CENTRE, TILE_SIZE,
};

/// Fixed maze layout. `#` is wall, `.` a dot, `o` an energiser, space is open.
pub const LAYOUT: [&str; 36] = [
    "############################",
    "############################",
    "############################",
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.##### ## #####.######",
    "######.##### ## #####.######",
    "######.##          ##.######",
    "######.## ######## ##.######",
    "######.## ######## ##.######",
    "      .   ########   .      ",
    "######.## ######## ##.######",
    "######.## ######## ##.######",
    "######.##          ##.######",
    "######.## ######## ##.######",
    "######.## ######## ##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......  .......##..o#",
    "###.##.##.########.##.##.###",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
    "############################",
    "############################",
];

/// Tile dead adversaries head for before entering the holding area.
pub const HOME_TILE: Tile = Tile::new(14, 14);

/// Point above the holding-area door where exit paths end.
pub const HOUSE_DOOR: Position = Position::new(
    HOME_TILE.column() * TILE_SIZE,
    HOME_TILE.row() * TILE_SIZE + TILE_CENTRE,
);

/// Centre of the holding area.
pub const HOUSE_CENTRE: Position =
    Position::new(HOUSE_DOOR.x(), HOUSE_DOOR.y() + 3 * TILE_SIZE);

/// Tile on which the bonus item appears.
pub const BONUS_TILE: Tile = Tile::new(14, 26);

/// Row containing the wrap-around tunnel.
pub const TUNNEL_ROW: i32 = 17;

/// Off-grid column past which an actor re-enters from the east.
pub const TUNNEL_WEST_EXIT: i32 = -2;

/// Off-grid column past which an actor re-enters from the west.
pub const TUNNEL_EAST_EXIT: i32 = COLUMNS + 1;

const TUNNEL_WEST_END: i32 = 4;
const TUNNEL_EAST_START: i32 = 23;
const NO_NORTH_COLUMNS: (i32, i32) = (12, 15);
const NO_NORTH_ROWS: [i32; 2] = [14, 26];

fn cell(tile: Tile) -> Option<u8> {
    let row = usize::try_from(tile.row()).ok()?;
    let column = usize::try_from(tile.column()).ok()?;
    LAYOUT.get(row)?.as_bytes().get(column).copied()
}

/// Reports whether an actor may occupy the tile.
#[must_use]
pub fn enterable(tile: Tile) -> bool {
    if tile.row() < 0 || tile.row() >= ROWS {
        return false;
    }
    if tile.column() < 0 || tile.column() >= COLUMNS {
        return tile.row() == TUNNEL_ROW;
    }
    cell(tile).is_some_and(|byte| byte != b'#')
}

/// Reports whether the tile belongs to the slow tunnel stretch, including the
/// off-grid corridor.
#[must_use]
pub fn in_tunnel(tile: Tile) -> bool {
    tile.row() == TUNNEL_ROW
        && (tile.column() <= TUNNEL_WEST_END || tile.column() >= TUNNEL_EAST_START)
}

/// Reports whether adversaries are barred from turning north on the tile.
#[must_use]
pub fn north_forbidden(tile: Tile) -> bool {
    let (first, last) = NO_NORTH_COLUMNS;
    NO_NORTH_ROWS.contains(&tile.row()) && (first..=last).contains(&tile.column())
}

/// Directions through which the tile can be left.
#[must_use]
pub fn exits(tile: Tile) -> Exits {
    if in_tunnel(tile) {
        return Exits::EAST | Exits::WEST;
    }
    Direction::CLOCKWISE
        .into_iter()
        .filter(|direction| enterable(tile.offset(*direction, 1)))
        .fold(Exits::empty(), |exits, direction| exits | direction.exit())
}

/// Item placed on the tile when a level starts.
#[must_use]
pub fn item_at(tile: Tile) -> Option<ItemKind> {
    match cell(tile)? {
        b'.' => Some(ItemKind::Dot),
        b'o' => Some(ItemKind::Energiser),
        _ => None,
    }
}

/// Iterator over every in-grid tile in row-major order.
pub fn tiles() -> impl Iterator<Item = Tile> {
    (0..ROWS).flat_map(|row| (0..COLUMNS).map(move |column| Tile::new(column, row)))
}
