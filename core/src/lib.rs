#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the maze chase engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Callers submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots such as [`AdversaryView`], and respond exclusively with new
//! command batches.

pub mod tables;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Side length of a square tile measured in position units.
pub const TILE_SIZE: i32 = 8;

/// Local coordinate of a tile's centreline along either axis.
pub const TILE_CENTRE: i32 = TILE_SIZE / 2;

/// Number of tile columns in the maze grid.
pub const COLUMNS: i32 = 28;

/// Number of tile rows in the maze grid.
pub const ROWS: i32 = 36;

/// Number of simulation ticks executed per simulated second.
pub const TICKS_PER_SECOND: u32 = 60;

/// Converts whole seconds into simulation ticks.
#[must_use]
pub const fn ticks_from_secs(secs: u32) -> u32 {
    secs * TICKS_PER_SECOND
}

/// Cardinal direction of travel within the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Directions in clockwise order starting from north.
    pub const CLOCKWISE: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Preference order used to break distance ties during target seeking.
    pub const TIE_BREAK: [Direction; 4] = [
        Direction::North,
        Direction::West,
        Direction::South,
        Direction::East,
    ];

    /// Returns the opposite direction.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Column delta applied when travelling one step in this direction.
    #[must_use]
    pub const fn dx(self) -> i32 {
        match self {
            Self::East => 1,
            Self::West => -1,
            Self::North | Self::South => 0,
        }
    }

    /// Row delta applied when travelling one step in this direction.
    #[must_use]
    pub const fn dy(self) -> i32 {
        match self {
            Self::South => 1,
            Self::North => -1,
            Self::East | Self::West => 0,
        }
    }

    /// Reports whether the direction moves along the horizontal axis.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::East | Self::West)
    }

    /// Converts the direction into its single-bit exit flag.
    #[must_use]
    pub const fn exit(self) -> Exits {
        match self {
            Self::North => Exits::NORTH,
            Self::East => Exits::EAST,
            Self::South => Exits::SOUTH,
            Self::West => Exits::WEST,
        }
    }
}

bitflags! {
    /// Set of directions through which a tile may be left.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Exits: u8 {
        /// Tile can be left toward the north.
        const NORTH = 1 << 0;
        /// Tile can be left toward the east.
        const EAST = 1 << 1;
        /// Tile can be left toward the south.
        const SOUTH = 1 << 2;
        /// Tile can be left toward the west.
        const WEST = 1 << 3;
    }
}

impl Exits {
    /// Reports whether the set permits leaving in the provided direction.
    #[must_use]
    pub fn allows(self, direction: Direction) -> bool {
        self.contains(direction.exit())
    }

    /// Returns the only direction in the set, if exactly one is present.
    #[must_use]
    pub fn single(self) -> Option<Direction> {
        if self.bits().count_ones() != 1 {
            return None;
        }
        Direction::CLOCKWISE
            .into_iter()
            .find(|direction| self.allows(*direction))
    }
}

/// Integer tile coordinate. Columns may leave `[0, COLUMNS)` inside the tunnel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tile {
    column: i32,
    row: i32,
}

impl Tile {
    /// Creates a tile coordinate from the provided column and row.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column of the tile.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row of the tile.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Tile reached by travelling `steps` tiles in `direction`.
    #[must_use]
    pub const fn offset(self, direction: Direction, steps: i32) -> Self {
        Self {
            column: self.column + direction.dx() * steps,
            row: self.row + direction.dy() * steps,
        }
    }

    /// Squared Euclidean distance to another tile.
    #[must_use]
    pub const fn distance_squared(self, other: Tile) -> i64 {
        let dx = (self.column - other.column) as i64;
        let dy = (self.row - other.row) as i64;
        dx * dx + dy * dy
    }

    /// Euclidean distance to another tile.
    #[must_use]
    pub fn distance(self, other: Tile) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }

    /// Position of the tile's centre point.
    #[must_use]
    pub const fn centre(self) -> Position {
        Position::new(
            self.column * TILE_SIZE + TILE_CENTRE,
            self.row * TILE_SIZE + TILE_CENTRE,
        )
    }
}

/// Integer position of an actor's centre, measured in position units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new position from its coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Tile containing the position.
    #[must_use]
    pub const fn tile(&self) -> Tile {
        Tile::new(self.x.div_euclid(TILE_SIZE), self.y.div_euclid(TILE_SIZE))
    }

    /// Offset of the position inside its tile along both axes.
    #[must_use]
    pub const fn local(&self) -> (i32, i32) {
        (self.x.rem_euclid(TILE_SIZE), self.y.rem_euclid(TILE_SIZE))
    }
}

/// Level number driving every level-banded table lookup. Always at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Level(u32);

impl Level {
    /// First level of a session.
    pub const FIRST: Level = Level(1);

    /// Creates a level, treating zero as the first level.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value == 0 {
            Self(1)
        } else {
            Self(value)
        }
    }

    /// Retrieves the numeric level.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Level following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Speed band the level belongs to.
    #[must_use]
    pub const fn band(&self) -> LevelBand {
        match self.0 {
            1 => LevelBand::First,
            2..=4 => LevelBand::Early,
            _ => LevelBand::Late,
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::FIRST
    }
}

/// Coarse grouping of levels used by speed and timing tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LevelBand {
    /// Level one.
    First,
    /// Levels two through four.
    Early,
    /// Level five onward.
    Late,
}

/// Identifies one of the four adversaries, in introduction order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AdversaryId {
    /// Lead adversary that targets the player's tile directly.
    Pursuer,
    /// Targets a point four tiles ahead of the player.
    Ambusher,
    /// Targets the reflection of the pursuer through a point ahead of the player.
    Flanker,
    /// Chases from afar and retreats to its corner when close.
    Opportunist,
}

impl AdversaryId {
    /// All adversaries in introduction order.
    pub const ALL: [AdversaryId; 4] = [
        AdversaryId::Pursuer,
        AdversaryId::Ambusher,
        AdversaryId::Flanker,
        AdversaryId::Opportunist,
    ];

    /// Adversaries that wait on dot counters, in crediting preference order.
    pub const COUNTED: [AdversaryId; 3] = [
        AdversaryId::Ambusher,
        AdversaryId::Flanker,
        AdversaryId::Opportunist,
    ];

    /// Dense index of the adversary in introduction order.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Pursuer => 0,
            Self::Ambusher => 1,
            Self::Flanker => 2,
            Self::Opportunist => 3,
        }
    }

    /// Reports whether this is the lead adversary.
    #[must_use]
    pub const fn is_lead(self) -> bool {
        matches!(self, Self::Pursuer)
    }
}

/// Where an adversary is relative to its holding area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locomotion {
    /// Waiting inside the holding area.
    Inside,
    /// Following the exit path out of the holding area.
    Exiting,
    /// Following the return path into the holding area.
    Entering,
    /// Roaming the maze under lookahead control.
    Free,
}

/// Strategy an adversary follows while roaming.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreatMode {
    /// Heading for its scatter corner.
    Scattering,
    /// Heading for its chase target.
    Chasing,
    /// Fleeing at random after an energiser was consumed.
    Frightened,
}

/// Global pursuit strategy selected by the mode scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PursuitMode {
    /// Adversaries seek their scatter corners.
    Scatter,
    /// Adversaries seek their chase targets.
    Chase,
}

impl From<PursuitMode> for ThreatMode {
    fn from(mode: PursuitMode) -> Self {
        match mode {
            PursuitMode::Scatter => ThreatMode::Scattering,
            PursuitMode::Chase => ThreatMode::Chasing,
        }
    }
}

/// Whether an adversary is alive or travelling home after being caught.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vitality {
    /// Active in the maze.
    Alive,
    /// Caught by the player and returning home.
    Dead,
}

/// Speed boost granted to the lead adversary as the maze empties.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum SpeedBoost {
    /// No boost.
    #[default]
    None,
    /// First elroy tier.
    Tier1,
    /// Second elroy tier.
    Tier2,
}

/// Independent status axes of a single adversary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdversaryStatus {
    /// Position relative to the holding area.
    pub locomotion: Locomotion,
    /// Current roaming strategy.
    pub threat: ThreatMode,
    /// Alive or dead.
    pub vitality: Vitality,
    /// Elroy boost, only ever set on the lead adversary.
    pub boost: SpeedBoost,
}

impl AdversaryStatus {
    /// Status of an adversary at the start of a level.
    #[must_use]
    pub const fn initial(locomotion: Locomotion) -> Self {
        Self {
            locomotion,
            threat: ThreatMode::Scattering,
            vitality: Vitality::Alive,
            boost: SpeedBoost::None,
        }
    }

    /// Reports whether the adversary is dead.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        matches!(self.vitality, Vitality::Dead)
    }

    /// Reports whether the adversary is frightened.
    #[must_use]
    pub const fn is_frightened(&self) -> bool {
        matches!(self.threat, ThreatMode::Frightened)
    }

    /// Reports whether the adversary occupies or travels through the holding area.
    #[must_use]
    pub const fn in_house(&self) -> bool {
        !matches!(self.locomotion, Locomotion::Free)
    }
}

/// Kind of consumable item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Ordinary dot.
    Dot,
    /// Energiser that triggers a vulnerability window.
    Energiser,
    /// Short-lived bonus item.
    Bonus,
}

impl ItemKind {
    /// Ticks the player stalls after consuming the item.
    #[must_use]
    pub const fn stall_ticks(self) -> u32 {
        match self {
            Self::Dot => 1,
            Self::Energiser => 3,
            Self::Bonus => 0,
        }
    }

    /// Reports whether consuming the item reduces the remaining-item count.
    #[must_use]
    pub const fn is_counted(self) -> bool {
        matches!(self, Self::Dot | Self::Energiser)
    }
}

/// Symbol displayed for the level's bonus item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusSymbol {
    /// Level one.
    Cherry,
    /// Level two.
    Strawberry,
    /// Levels three and four.
    Peach,
    /// Levels five and six.
    Apple,
    /// Levels seven and eight.
    Grape,
    /// Levels nine and ten.
    Galaxian,
    /// Levels eleven and twelve.
    Bell,
    /// Level thirteen onward.
    Key,
}

impl BonusSymbol {
    /// Symbol awarded on the provided level.
    #[must_use]
    pub const fn for_level(level: Level) -> Self {
        match level.get() {
            0 | 1 => Self::Cherry,
            2 => Self::Strawberry,
            3 | 4 => Self::Peach,
            5 | 6 => Self::Apple,
            7 | 8 => Self::Grape,
            9 | 10 => Self::Galaxian,
            11 | 12 => Self::Bell,
            _ => Self::Key,
        }
    }

    /// Points awarded for consuming the symbol.
    #[must_use]
    pub const fn points(self) -> u32 {
        match self {
            Self::Cherry => 100,
            Self::Strawberry => 300,
            Self::Peach => 500,
            Self::Apple | Self::Grape => 700,
            Self::Galaxian => 2000,
            Self::Bell => 3000,
            Self::Key => 5000,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Restores every item and actor and configures the level tables.
    StartLevel {
        /// Level whose tables apply until the next level start.
        level: Level,
    },
    /// Re-places every actor after the player was caught, keeping items.
    ResetActors,
    /// Records the direction the player wants to take next.
    RequestDirection {
        /// Requested direction of travel.
        direction: Direction,
    },
    /// Advances the simulation by a single tick.
    Tick,
    /// Requests that a waiting adversary leave the holding area.
    ReleaseAdversary {
        /// Adversary to release.
        adversary: AdversaryId,
    },
    /// Switches the global pursuit mode and reverses every live adversary.
    SwitchThreatMode {
        /// Mode to activate.
        mode: PursuitMode,
    },
    /// Updates the lead adversary's speed boost.
    SetSpeedBoost {
        /// Boost to apply.
        boost: SpeedBoost,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// Announces that a level started with a full maze.
    LevelStarted {
        /// Level now in effect.
        level: Level,
        /// Number of counted items on the maze.
        remaining: u32,
    },
    /// Announces that actors were re-placed after the player was caught.
    ActorsReset {
        /// Level in effect.
        level: Level,
        /// Number of counted items still on the maze.
        remaining: u32,
    },
    /// Indicates that the simulation clock advanced by one tick.
    TimeAdvanced {
        /// Index of the tick that just executed, starting at one.
        tick: u64,
    },
    /// Reports that the player consumed an item.
    ItemConsumed {
        /// Kind of item consumed.
        kind: ItemKind,
        /// Points awarded for the item.
        value: u32,
        /// Tile the item occupied.
        tile: Tile,
        /// Counted items left on the maze after consumption.
        remaining: u32,
    },
    /// Reports that an energiser made the adversaries vulnerable.
    VulnerabilityTriggered {
        /// Length of the vulnerability window in ticks; zero means no effect.
        ticks: u32,
    },
    /// Reports that the vulnerability window ran out.
    VulnerabilityEnded,
    /// Confirms that an adversary started leaving the holding area.
    AdversaryReleased {
        /// Adversary that was released.
        adversary: AdversaryId,
    },
    /// Confirms that a dead adversary finished returning home.
    AdversaryReturned {
        /// Adversary that returned.
        adversary: AdversaryId,
    },
    /// Confirms that the global pursuit mode changed.
    ThreatModeSwitched {
        /// Mode now in effect.
        mode: PursuitMode,
    },
    /// Confirms that the lead adversary's boost changed.
    SpeedBoostChanged {
        /// Boost now in effect.
        boost: SpeedBoost,
    },
    /// Reports that the player caught a frightened adversary.
    PlayerCaughtAdversary {
        /// Adversary that was caught.
        adversary: AdversaryId,
        /// Points awarded for the capture.
        points: u32,
    },
    /// Reports that an adversary caught the player.
    AdversaryCaughtPlayer {
        /// Adversary responsible.
        adversary: AdversaryId,
    },
    /// Announces that the bonus item appeared.
    BonusSpawned {
        /// Symbol of the bonus.
        symbol: BonusSymbol,
        /// Tile the bonus occupies.
        tile: Tile,
    },
    /// Announces that the bonus item vanished unconsumed.
    BonusExpired,
    /// Reports that every counted item was consumed.
    LevelCleared,
}

/// Immutable representation of a single adversary used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdversarySnapshot {
    /// Identifier of the adversary.
    pub id: AdversaryId,
    /// Centre position.
    pub position: Position,
    /// Tile containing the centre position.
    pub tile: Tile,
    /// Direction of travel.
    pub direction: Direction,
    /// Composite status.
    pub status: AdversaryStatus,
    /// Whether the frightened warning flash is currently lit.
    pub flashing: bool,
}

/// Read-only snapshot describing all adversaries.
#[derive(Clone, Debug, Default)]
pub struct AdversaryView {
    snapshots: Vec<AdversarySnapshot>,
}

impl AdversaryView {
    /// Creates a new adversary view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AdversarySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in introduction order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &AdversarySnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of a specific adversary.
    #[must_use]
    pub fn get(&self, id: AdversaryId) -> Option<&AdversarySnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == id)
    }

    /// Reports whether the adversary is waiting inside the holding area.
    #[must_use]
    pub fn is_inside(&self, id: AdversaryId) -> bool {
        self.get(id)
            .is_some_and(|snapshot| snapshot.status.locomotion == Locomotion::Inside)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AdversarySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of the player actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Centre position.
    pub position: Position,
    /// Tile containing the centre position.
    pub tile: Tile,
    /// Direction of travel.
    pub direction: Direction,
    /// Direction requested but not yet taken.
    pub requested: Option<Direction>,
    /// Whether the player is paused after consuming an item.
    pub stalled: bool,
}
