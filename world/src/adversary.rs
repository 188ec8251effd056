//! Adversary state machine and one-tile lookahead steering.

use std::collections::VecDeque;

use maze_chase_core::{
    tables, AdversaryId, AdversarySnapshot, AdversaryStatus, Direction, Exits, Level, Locomotion,
    Position, PursuitMode, SpeedBoost, ThreatMode, Tile, Vitality, TILE_CENTRE,
};
use rand::Rng;

use crate::{
    body::{exiting_tile, Body},
    maze::{self, HOME_TILE, HOUSE_CENTRE, HOUSE_DOOR},
    targeting::{self, Pursuit},
};

/// How the lookahead picks among several legal exits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Steering {
    /// Closest exit to the target tile, ties broken north, west, south, east.
    Seek(Tile),
    /// Random start index, then clockwise until an exit is legal.
    Wander,
}

/// Chooses the exit to take from `tile` after entering it heading `entry`.
///
/// Reversing is never allowed and north is barred on restricted tiles. Returns
/// `None` when no exit remains, which a well-formed maze never produces.
pub(crate) fn lookahead<R>(
    tile: Tile,
    entry: Direction,
    steering: Steering,
    rng: &mut R,
) -> Option<Direction>
where
    R: Rng,
{
    let mut exits = maze::exits(tile) - entry.reverse().exit();
    if maze::north_forbidden(tile) {
        exits.remove(Exits::NORTH);
    }
    if let Some(only) = exits.single() {
        return Some(only);
    }

    match steering {
        Steering::Wander => {
            let start = rng.gen_range(0..Direction::CLOCKWISE.len());
            (0..Direction::CLOCKWISE.len())
                .map(|step| Direction::CLOCKWISE[(start + step) % Direction::CLOCKWISE.len()])
                .find(|direction| exits.allows(*direction))
        }
        Steering::Seek(target) => Direction::TIE_BREAK
            .into_iter()
            .filter(|direction| exits.allows(*direction))
            .min_by_key(|direction| tile.offset(*direction, 1).distance_squared(target)),
    }
}

/// Where an adversary appears when a level starts or actors reset.
pub(crate) const fn start_position(id: AdversaryId) -> Position {
    match id {
        AdversaryId::Pursuer => HOUSE_DOOR,
        AdversaryId::Ambusher => HOUSE_CENTRE,
        AdversaryId::Flanker => Position::new(HOUSE_CENTRE.x() - 16, HOUSE_CENTRE.y()),
        AdversaryId::Opportunist => Position::new(HOUSE_CENTRE.x() + 16, HOUSE_CENTRE.y()),
    }
}

/// Transition the world reports after updating an adversary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Transition {
    LeftHouse,
    StartedReturn,
    Returned,
}

/// Lookahead found no way out of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NoExit {
    pub(crate) tile: Tile,
    pub(crate) entry: Direction,
}

#[derive(Clone, Debug)]
pub(crate) struct Adversary {
    id: AdversaryId,
    body: Body,
    status: AdversaryStatus,
    mode: PursuitMode,
    direction: Direction,
    current_exit: Direction,
    next_exit: Direction,
    evaluated: Option<Tile>,
    path: VecDeque<Position>,
}

impl Adversary {
    pub(crate) fn new(id: AdversaryId, mode: PursuitMode) -> Self {
        let locomotion = if id.is_lead() {
            Locomotion::Free
        } else {
            Locomotion::Inside
        };
        let mut status = AdversaryStatus::initial(locomotion);
        status.threat = mode.into();
        Self {
            id,
            body: Body::at(start_position(id)),
            status,
            mode,
            direction: Direction::West,
            current_exit: Direction::West,
            next_exit: Direction::West,
            evaluated: None,
            path: VecDeque::new(),
        }
    }

    pub(crate) fn id(&self) -> AdversaryId {
        self.id
    }

    pub(crate) fn status(&self) -> AdversaryStatus {
        self.status
    }

    pub(crate) fn tile(&self) -> Tile {
        self.body.tile()
    }

    pub(crate) fn speed(&self, level: Level) -> f64 {
        tables::adversary_speed(&self.status, level, maze::in_tunnel(self.tile()))
    }

    pub(crate) fn snapshot(&self, flash_lit: bool) -> AdversarySnapshot {
        AdversarySnapshot {
            id: self.id,
            position: self.body.position(),
            tile: self.body.tile(),
            direction: self.direction,
            status: self.status,
            flashing: flash_lit && self.status.is_frightened(),
        }
    }

    #[cfg(test)]
    pub(crate) fn teleport(&mut self, position: Position) {
        self.body = Body::at(position);
        self.evaluated = None;
    }

    #[cfg(test)]
    pub(crate) fn current_exit(&self) -> Direction {
        self.current_exit
    }

    /// Starts the exit path if the adversary is waiting inside.
    pub(crate) fn release(&mut self) -> bool {
        if self.status.locomotion != Locomotion::Inside {
            return false;
        }
        self.status.locomotion = Locomotion::Exiting;
        self.path = VecDeque::from([HOUSE_CENTRE, HOUSE_DOOR]);
        true
    }

    pub(crate) fn set_boost(&mut self, boost: SpeedBoost) -> bool {
        if self.status.boost == boost {
            return false;
        }
        self.status.boost = boost;
        true
    }

    /// Adopts a new pursuit mode and turns around, dead or alive.
    pub(crate) fn switch_mode(&mut self, mode: PursuitMode) {
        self.mode = mode;
        if !self.status.is_dead() && !self.status.is_frightened() {
            self.status.threat = mode.into();
        }
        self.reverse();
    }

    /// Becomes frightened. The pursuit mode is kept for when the window ends.
    pub(crate) fn frighten(&mut self) {
        if self.status.is_dead() {
            return;
        }
        self.status.threat = ThreatMode::Frightened;
    }

    pub(crate) fn calm(&mut self) {
        if self.status.is_frightened() {
            self.status.threat = self.mode.into();
        }
    }

    pub(crate) fn kill(&mut self) {
        self.status.vitality = Vitality::Dead;
        self.status.threat = self.mode.into();
    }

    /// Queues a reversal of the current direction.
    ///
    /// Inside the holding area the turn is immediate. In the maze it applies at
    /// this tile's centre, unless the centre has already been reached, in which
    /// case it waits for the next tile.
    pub(crate) fn reverse(&mut self) {
        let reversed = self.direction.reverse();
        if self.status.in_house() {
            self.direction = reversed;
            self.current_exit = reversed;
            self.next_exit = reversed;
            return;
        }

        let (lx, ly) = self.body.position().local();
        if exiting_tile(self.direction, f64::from(lx), f64::from(ly)) {
            // Too late to turn within this tile.
            self.next_exit = reversed;
            return;
        }
        self.current_exit = reversed;
    }

    /// Advances the adversary by one tick.
    pub(crate) fn update<R>(
        &mut self,
        level: Level,
        global: PursuitMode,
        pursuit: &Pursuit,
        rng: &mut R,
    ) -> Result<Option<Transition>, NoExit>
    where
        R: Rng,
    {
        let speed = self.speed(level);
        match self.status.locomotion {
            Locomotion::Inside => Ok(None),
            Locomotion::Exiting => {
                if !self.follow_path(speed) {
                    return Ok(None);
                }
                self.status.locomotion = Locomotion::Free;
                self.direction = self.current_exit;
                self.evaluated = None;
                let ahead = self.tile().offset(self.direction, 1);
                self.next_exit = self.decide(ahead, self.direction, pursuit, rng)?;
                Ok(Some(Transition::LeftHouse))
            }
            Locomotion::Entering => {
                if !self.follow_path(speed) {
                    return Ok(None);
                }
                self.status.locomotion = Locomotion::Inside;
                self.status.vitality = Vitality::Alive;
                self.mode = global;
                self.status.threat = global.into();
                Ok(Some(Transition::Returned))
            }
            Locomotion::Free => self.roam(speed, pursuit, rng),
        }
    }

    fn roam<R>(
        &mut self,
        speed: f64,
        pursuit: &Pursuit,
        rng: &mut R,
    ) -> Result<Option<Transition>, NoExit>
    where
        R: Rng,
    {
        let position = self.body.position();
        if self.status.is_dead()
            && self.tile().row() == HOME_TILE.row()
            && f64::from((position.x() - HOUSE_DOOR.x()).abs()) < speed
        {
            self.status.locomotion = Locomotion::Entering;
            self.path = VecDeque::from([HOUSE_DOOR, HOUSE_CENTRE]);
            let start = start_position(self.id);
            if start.y() != HOUSE_DOOR.y() {
                self.path.push_back(start);
            }
            return Ok(Some(Transition::StartedReturn));
        }

        self.body.move_by(
            f64::from(self.direction.dx()) * speed,
            f64::from(self.direction.dy()) * speed,
        );
        if self.body.entered_tile() {
            self.current_exit = self.next_exit;
            self.evaluated = None;
        }

        let tile = self.tile();
        if self.evaluated == Some(tile) {
            return Ok(None);
        }
        let (lx, ly) = self.body.position().local();
        let near_centre = |local: i32| f64::from((TILE_CENTRE - local).abs()) < speed;
        if !(near_centre(lx) && near_centre(ly)) {
            return Ok(None);
        }

        self.body.move_to(tile.centre());
        self.direction = self.current_exit;
        self.evaluated = Some(tile);
        let ahead = tile.offset(self.direction, 1);
        self.next_exit = self.decide(ahead, self.direction, pursuit, rng)?;
        Ok(None)
    }

    fn decide<R>(
        &self,
        tile: Tile,
        entry: Direction,
        pursuit: &Pursuit,
        rng: &mut R,
    ) -> Result<Direction, NoExit>
    where
        R: Rng,
    {
        lookahead(tile, entry, self.steering(pursuit), rng).ok_or(NoExit { tile, entry })
    }

    fn steering(&self, pursuit: &Pursuit) -> Steering {
        if self.status.is_dead() {
            return Steering::Seek(HOME_TILE);
        }
        match self.status.threat {
            ThreatMode::Frightened => Steering::Wander,
            ThreatMode::Scattering => Steering::Seek(targeting::scatter_corner(self.id)),
            ThreatMode::Chasing => {
                Steering::Seek(targeting::chase_target(self.id, self.tile(), pursuit))
            }
        }
    }

    /// Moves along the holding-area path. Returns `true` once it is exhausted.
    fn follow_path(&mut self, speed: f64) -> bool {
        let Some(&waypoint) = self.path.front() else {
            return true;
        };
        let position = self.body.position();
        let dx = waypoint.x() - position.x();
        let dy = waypoint.y() - position.y();
        if f64::from(dx.abs()) <= speed && f64::from(dy.abs()) <= speed {
            self.body.move_to(waypoint);
            let _ = self.path.pop_front();
            return self.path.is_empty();
        }
        self.body.move_by(
            f64::from(dx.signum()) * speed,
            f64::from(dy.signum()) * speed,
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pursuit() -> Pursuit {
        Pursuit {
            player: Tile::new(14, 26),
            facing: Direction::West,
            lead: Tile::new(14, 14),
        }
    }

    #[test]
    fn seeking_is_pure_for_identical_inputs() {
        let mut first = ChaCha8Rng::seed_from_u64(1);
        let mut second = ChaCha8Rng::seed_from_u64(99);
        for tile in maze::tiles().filter(|tile| maze::enterable(*tile)) {
            for entry in Direction::CLOCKWISE {
                let steering = Steering::Seek(Tile::new(3, 30));
                assert_eq!(
                    lookahead(tile, entry, steering, &mut first),
                    lookahead(tile, entry, steering, &mut second),
                );
            }
        }
    }

    #[test]
    fn seeking_prefers_the_closest_exit() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        // (6, 8) is a four-way junction; entering eastward rules out west.
        let chosen = lookahead(
            Tile::new(6, 8),
            Direction::East,
            Steering::Seek(Tile::new(6, 30)),
            &mut rng,
        );
        assert_eq!(chosen, Some(Direction::South));
    }

    #[test]
    fn ties_break_north_before_west() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        // Target equidistant from the north and west neighbours.
        let chosen = lookahead(
            Tile::new(6, 8),
            Direction::North,
            Steering::Seek(Tile::new(5, 7)),
            &mut rng,
        );
        assert_eq!(chosen, Some(Direction::North));
    }

    #[test]
    fn restricted_tiles_never_turn_north() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let chosen = lookahead(
            Tile::new(12, 14),
            Direction::East,
            Steering::Seek(Tile::new(12, 0)),
            &mut rng,
        );
        assert_eq!(chosen, Some(Direction::East));
    }

    #[test]
    fn wandering_only_picks_legal_exits() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for tile in maze::tiles().filter(|tile| maze::enterable(*tile)) {
            for entry in Direction::CLOCKWISE {
                if !maze::enterable(tile.offset(entry.reverse(), 1)) {
                    continue;
                }
                for _ in 0..4 {
                    let Some(chosen) = lookahead(tile, entry, Steering::Wander, &mut rng) else {
                        panic!("no exit from {tile:?} heading {entry:?}");
                    };
                    assert!(maze::exits(tile).allows(chosen));
                    assert_ne!(chosen, entry.reverse());
                    assert!(!(maze::north_forbidden(tile) && chosen == Direction::North));
                }
            }
        }
    }

    #[test]
    fn release_walks_the_exit_path_then_roams() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut adversary = Adversary::new(AdversaryId::Flanker, PursuitMode::Scatter);
        assert!(adversary.release());
        assert!(!adversary.release());

        let mut left = false;
        for _ in 0..400 {
            let outcome = adversary
                .update(Level::FIRST, PursuitMode::Scatter, &pursuit(), &mut rng)
                .expect("lookahead");
            if outcome == Some(Transition::LeftHouse) {
                left = true;
                break;
            }
        }
        assert!(left);
        assert_eq!(adversary.body.position(), HOUSE_DOOR);
        assert_eq!(adversary.status.locomotion, Locomotion::Free);
        assert_eq!(adversary.direction, Direction::West);
    }

    #[test]
    fn reversal_past_the_centre_waits_for_the_next_tile() {
        let mut adversary = Adversary::new(AdversaryId::Pursuer, PursuitMode::Scatter);
        let centre = Tile::new(6, 8).centre();
        adversary.body = Body::at(Position::new(centre.x() - 1, centre.y()));
        adversary.direction = Direction::West;
        adversary.current_exit = Direction::West;
        adversary.next_exit = Direction::South;

        adversary.reverse();

        assert_eq!(adversary.direction, Direction::West);
        assert_eq!(adversary.current_exit, Direction::West);
        assert_eq!(adversary.next_exit, Direction::East);
    }

    #[test]
    fn reversal_before_the_centre_turns_at_this_tile() {
        let mut adversary = Adversary::new(AdversaryId::Pursuer, PursuitMode::Scatter);
        let centre = Tile::new(6, 8).centre();
        adversary.body = Body::at(Position::new(centre.x() + 2, centre.y()));
        adversary.direction = Direction::West;
        adversary.current_exit = Direction::North;
        adversary.next_exit = Direction::North;

        adversary.reverse();

        assert_eq!(adversary.current_exit, Direction::East);
        assert_eq!(adversary.next_exit, Direction::North);
    }

    #[test]
    fn mode_switch_turns_dead_adversaries_too() {
        let mut adversary = Adversary::new(AdversaryId::Pursuer, PursuitMode::Scatter);
        let centre = Tile::new(6, 8).centre();
        adversary.body = Body::at(Position::new(centre.x() + 2, centre.y()));
        adversary.kill();

        adversary.switch_mode(PursuitMode::Chase);

        assert_eq!(adversary.current_exit, Direction::East);
        assert_eq!(adversary.mode, PursuitMode::Chase);
        assert_eq!(adversary.status.threat, ThreatMode::Scattering);
        assert!(adversary.status.is_dead());
    }

    #[test]
    fn walled_tiles_have_no_exit() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let walled = Tile::new(0, 0);
        assert_eq!(lookahead(walled, Direction::East, Steering::Wander, &mut rng), None);
        assert_eq!(
            lookahead(walled, Direction::East, Steering::Seek(HOME_TILE), &mut rng),
            None
        );

        let adversary = Adversary::new(AdversaryId::Pursuer, PursuitMode::Scatter);
        assert_eq!(
            adversary.decide(walled, Direction::East, &pursuit(), &mut rng),
            Err(NoExit {
                tile: walled,
                entry: Direction::East,
            })
        );
    }

    #[test]
    fn dead_adversary_returns_home_and_revives() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut adversary = Adversary::new(AdversaryId::Pursuer, PursuitMode::Chase);
        adversary.frighten();
        adversary.kill();
        assert_eq!(adversary.status.threat, ThreatMode::Chasing);

        let mut transitions = Vec::new();
        for _ in 0..2000 {
            if let Some(transition) = adversary
                .update(Level::FIRST, PursuitMode::Scatter, &pursuit(), &mut rng)
                .expect("lookahead")
            {
                transitions.push(transition);
                if transition == Transition::Returned {
                    break;
                }
            }
        }

        assert_eq!(
            transitions,
            vec![Transition::StartedReturn, Transition::Returned]
        );
        assert_eq!(adversary.status.locomotion, Locomotion::Inside);
        assert_eq!(adversary.status.vitality, Vitality::Alive);
        assert_eq!(adversary.status.threat, ThreatMode::Scattering);
        assert_eq!(adversary.body.position(), HOUSE_CENTRE);
    }
}
