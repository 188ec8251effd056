#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the maze chase engine.
//!
//! The world owns the maze, the player, the four adversaries and every timer
//! that belongs to them. It mutates only through [`apply`] and exposes its
//! state only through the read-only functions in [`query`].

mod adversary;
mod body;
mod items;
pub mod maze;
mod player;
pub mod targeting;

use maze_chase_core::{
    tables::{
        self, BONUS_JITTER_TICKS, BONUS_MIN_TICKS, BONUS_TRIGGER_REMAINING, FLASH_TOGGLE_TICKS,
    },
    AdversaryId, BonusSymbol, Command, Direction, Event, ItemKind, Level, PursuitMode, Tile,
};
use maze_chase_timers::{Fired, Repeat, Scheduler, TimerError, TimerHandle};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    adversary::{Adversary, NoExit, Transition},
    items::Items,
    maze::BONUS_TILE,
    player::Player,
    targeting::Pursuit,
};

const DEFAULT_SEED: u64 = 0x5eed_c4a5_e000_0001;

/// Failures surfaced while applying a command.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    /// An adversary entered a tile with no way out other than reversing.
    #[error("{adversary:?} has no legal exit from {tile:?} after heading {entry:?}")]
    NoLegalExit {
        /// Adversary whose lookahead failed.
        adversary: AdversaryId,
        /// Tile that was evaluated.
        tile: Tile,
        /// Direction the tile was entered with.
        entry: Direction,
    },
    /// A world timer was scheduled with impossible parameters.
    #[error(transparent)]
    Timer(#[from] TimerError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerOwner {
    Player,
    Vulnerability,
    Bonus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerAction {
    EndStall,
    EndVulnerability,
    StartFlashing,
    ToggleFlash,
    ExpireBonus,
}

/// Represents the authoritative simulation state.
#[derive(Debug)]
pub struct World {
    level: Level,
    tick_index: u64,
    player: Player,
    adversaries: [Adversary; 4],
    items: Items,
    timers: Scheduler<TimerOwner, TimerAction>,
    pursuit: PursuitMode,
    vulnerability: Option<TimerHandle>,
    flash_lit: bool,
    halted: bool,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a level-one world seeded with the default random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Creates a level-one world whose random draws derive from `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            level: Level::FIRST,
            tick_index: 0,
            player: Player::new(),
            adversaries: AdversaryId::ALL.map(|id| Adversary::new(id, PursuitMode::Scatter)),
            items: Items::full(),
            timers: Scheduler::new(),
            pursuit: PursuitMode::Scatter,
            vulnerability: None,
            flash_lit: false,
            halted: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn adversary_mut(&mut self, id: AdversaryId) -> &mut Adversary {
        &mut self.adversaries[id.index()]
    }

    fn reset_actors(&mut self) {
        self.player = Player::new();
        self.adversaries = AdversaryId::ALL.map(|id| Adversary::new(id, PursuitMode::Scatter));
        self.pursuit = PursuitMode::Scatter;
        self.timers.clear();
        self.vulnerability = None;
        self.flash_lit = false;
        self.halted = false;
        let _ = self.items.clear_bonus();
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) -> Result<(), SimulationError> {
        if self.halted {
            return Ok(());
        }
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        self.run_timers(out_events)?;
        if !self.player.is_stalled() {
            let frightened = self
                .adversaries
                .iter()
                .any(|adversary| adversary.status().is_frightened());
            self.player.update(tables::player_speed(self.level, frightened));
        }
        self.consume(out_events)?;
        if self.halted {
            return Ok(());
        }

        let failure = self.move_adversaries(out_events);
        self.resolve_collisions(out_events);
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn run_timers(&mut self, out_events: &mut Vec<Event>) -> Result<(), SimulationError> {
        let mut fired: Vec<Fired<TimerOwner, TimerAction>> = Vec::new();
        self.timers.advance(&mut fired);
        for record in fired {
            match record.action {
                TimerAction::EndStall => self.player.set_stalled(false),
                TimerAction::EndVulnerability => self.end_vulnerability(out_events),
                TimerAction::StartFlashing => {
                    if self.vulnerability.is_none() {
                        continue;
                    }
                    // Dark for one period, then alternate until expiry.
                    self.flash_lit = false;
                    let toggles = 2 * tables::flash_count(self.level);
                    if toggles > 0 {
                        let _ = self.timers.repeat(
                            TimerOwner::Vulnerability,
                            FLASH_TOGGLE_TICKS,
                            TimerAction::ToggleFlash,
                            Repeat::Times(toggles),
                        )?;
                    }
                }
                TimerAction::ToggleFlash => {
                    if self.vulnerability.is_some() {
                        self.flash_lit = !self.flash_lit;
                    }
                }
                TimerAction::ExpireBonus => {
                    if self.items.clear_bonus() {
                        debug!("bonus expired");
                        out_events.push(Event::BonusExpired);
                    }
                }
            }
        }
        Ok(())
    }

    fn consume(&mut self, out_events: &mut Vec<Event>) -> Result<(), SimulationError> {
        let tile = self.player.tile();
        if let Some(kind) = self.items.take(tile) {
            let remaining = self.items.remaining();
            out_events.push(Event::ItemConsumed {
                kind,
                value: tables::item_points(kind),
                tile,
                remaining,
            });

            let stall = kind.stall_ticks();
            if stall > 0 {
                // The stall covers the ticks after this one.
                self.player.set_stalled(true);
                let _ = self.timers.cancel_owner(TimerOwner::Player);
                let _ = self
                    .timers
                    .schedule(TimerOwner::Player, stall + 1, TimerAction::EndStall)?;
            }
            if kind == ItemKind::Energiser {
                self.trigger_vulnerability(out_events)?;
            }
            if BONUS_TRIGGER_REMAINING.contains(&remaining) {
                self.spawn_bonus(out_events)?;
            }
            if remaining == 0 {
                debug!(level = self.level.get(), "level cleared");
                out_events.push(Event::LevelCleared);
                self.halted = true;
            }
        }

        if let Some(symbol) = self.items.take_bonus(tile) {
            let _ = self.timers.cancel_owner(TimerOwner::Bonus);
            out_events.push(Event::ItemConsumed {
                kind: ItemKind::Bonus,
                value: symbol.points(),
                tile,
                remaining: self.items.remaining(),
            });
        }
        Ok(())
    }

    fn spawn_bonus(&mut self, out_events: &mut Vec<Event>) -> Result<(), SimulationError> {
        let symbol = BonusSymbol::for_level(self.level);
        let lifetime = BONUS_MIN_TICKS + self.rng.gen_range(0..BONUS_JITTER_TICKS);
        let _ = self.timers.cancel_owner(TimerOwner::Bonus);
        let _ = self
            .timers
            .schedule(TimerOwner::Bonus, lifetime, TimerAction::ExpireBonus)?;
        self.items.spawn_bonus(symbol);
        debug!(?symbol, lifetime, "bonus spawned");
        out_events.push(Event::BonusSpawned {
            symbol,
            tile: BONUS_TILE,
        });
        Ok(())
    }

    fn trigger_vulnerability(
        &mut self,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SimulationError> {
        for adversary in &mut self.adversaries {
            if !adversary.status().is_dead() {
                adversary.reverse();
            }
        }
        let ticks = tables::vulnerability_ticks(self.level);
        out_events.push(Event::VulnerabilityTriggered { ticks });
        if ticks == 0 {
            return Ok(());
        }

        let _ = self.timers.cancel_owner(TimerOwner::Vulnerability);
        for adversary in &mut self.adversaries {
            adversary.frighten();
        }
        self.flash_lit = false;
        self.vulnerability = Some(self.timers.schedule(
            TimerOwner::Vulnerability,
            ticks,
            TimerAction::EndVulnerability,
        )?);
        if let Some(start) = tables::flash_start(self.level).filter(|start| *start < ticks) {
            let _ = self.timers.schedule(
                TimerOwner::Vulnerability,
                start,
                TimerAction::StartFlashing,
            )?;
        }
        debug!(ticks, "vulnerability started");
        Ok(())
    }

    fn end_vulnerability(&mut self, out_events: &mut Vec<Event>) {
        self.vulnerability = None;
        self.flash_lit = false;
        let _ = self.timers.cancel_owner(TimerOwner::Vulnerability);
        for adversary in &mut self.adversaries {
            adversary.calm();
        }
        debug!("vulnerability ended");
        out_events.push(Event::VulnerabilityEnded);
    }

    fn move_adversaries(&mut self, out_events: &mut Vec<Event>) -> Option<SimulationError> {
        let mut failure = None;
        for index in 0..self.adversaries.len() {
            let pursuit = Pursuit {
                player: self.player.tile(),
                facing: self.player.direction(),
                lead: self.adversaries[AdversaryId::Pursuer.index()].tile(),
            };
            let adversary = &mut self.adversaries[index];
            let id = adversary.id();
            match adversary.update(self.level, self.pursuit, &pursuit, &mut self.rng) {
                Ok(None) => {}
                Ok(Some(Transition::LeftHouse)) => debug!(?id, "left the holding area"),
                Ok(Some(Transition::StartedReturn)) => debug!(?id, "entering the holding area"),
                Ok(Some(Transition::Returned)) => {
                    debug!(?id, "returned home");
                    out_events.push(Event::AdversaryReturned { adversary: id });
                }
                Err(NoExit { tile, entry }) => {
                    warn!(?id, ?tile, ?entry, "lookahead found no legal exit");
                    if failure.is_none() {
                        failure = Some(SimulationError::NoLegalExit {
                            adversary: id,
                            tile,
                            entry,
                        });
                    }
                }
            }
        }
        failure
    }

    fn resolve_collisions(&mut self, out_events: &mut Vec<Event>) {
        let tile = self.player.tile();
        let colliding: Vec<AdversaryId> = self
            .adversaries
            .iter()
            .filter(|adversary| !adversary.status().is_dead() && adversary.tile() == tile)
            .map(Adversary::id)
            .collect();
        if colliding.is_empty() {
            return;
        }

        if let Some(&hunter) = colliding
            .iter()
            .find(|id| !self.adversaries[id.index()].status().is_frightened())
        {
            debug!(?hunter, ?tile, "player caught");
            out_events.push(Event::AdversaryCaughtPlayer { adversary: hunter });
            self.halted = true;
            return;
        }

        let mut frightened = self
            .adversaries
            .iter()
            .filter(|adversary| adversary.status().is_frightened())
            .count();
        for id in colliding {
            let points = tables::capture_points(u32::try_from(frightened).unwrap_or(u32::MAX));
            frightened = frightened.saturating_sub(1);
            self.adversary_mut(id).kill();
            debug!(?id, points, "adversary caught");
            out_events.push(Event::PlayerCaughtAdversary {
                adversary: id,
                points,
            });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), SimulationError> {
    match command {
        Command::StartLevel { level } => {
            world.level = level;
            world.items = Items::full();
            world.reset_actors();
            debug!(level = level.get(), "level started");
            out_events.push(Event::LevelStarted {
                level,
                remaining: world.items.remaining(),
            });
        }
        Command::ResetActors => {
            world.reset_actors();
            out_events.push(Event::ActorsReset {
                level: world.level,
                remaining: world.items.remaining(),
            });
        }
        Command::RequestDirection { direction } => world.player.request(direction),
        Command::Tick => world.tick(out_events)?,
        Command::ReleaseAdversary { adversary } => {
            if world.adversary_mut(adversary).release() {
                debug!(?adversary, "released");
                out_events.push(Event::AdversaryReleased { adversary });
            }
        }
        Command::SwitchThreatMode { mode } => {
            world.pursuit = mode;
            for adversary in &mut world.adversaries {
                adversary.switch_mode(mode);
            }
            debug!(?mode, "pursuit mode switched");
            out_events.push(Event::ThreatModeSwitched { mode });
        }
        Command::SetSpeedBoost { boost } => {
            if world.adversary_mut(AdversaryId::Pursuer).set_boost(boost) {
                debug!(?boost, "lead boost changed");
                out_events.push(Event::SpeedBoostChanged { boost });
            }
        }
    }
    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use maze_chase_core::{
        AdversaryId, AdversarySnapshot, AdversaryView, BonusSymbol, ItemKind, Level,
        PlayerSnapshot, PursuitMode, ThreatMode, Tile,
    };

    use super::World;

    /// Level whose tables are in effect.
    #[must_use]
    pub fn level(world: &World) -> Level {
        world.level
    }

    /// Number of ticks executed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Reports whether ticks are ignored until actors reset or a level starts.
    #[must_use]
    pub fn is_halted(world: &World) -> bool {
        world.halted
    }

    /// Captures the player's state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Captures a read-only view of every adversary.
    #[must_use]
    pub fn adversary_view(world: &World) -> AdversaryView {
        AdversaryView::from_snapshots(
            world
                .adversaries
                .iter()
                .map(|adversary| adversary.snapshot(world.flash_lit))
                .collect(),
        )
    }

    /// Captures a single adversary's state.
    #[must_use]
    pub fn adversary(world: &World, id: AdversaryId) -> AdversarySnapshot {
        world.adversaries[id.index()].snapshot(world.flash_lit)
    }

    /// Current speed of an adversary in position units per tick.
    #[must_use]
    pub fn adversary_speed(world: &World, id: AdversaryId) -> f64 {
        world.adversaries[id.index()].speed(world.level)
    }

    /// Counted items left on the maze.
    #[must_use]
    pub fn remaining_items(world: &World) -> u32 {
        world.items.remaining()
    }

    /// Item occupying the tile, the bonus included.
    #[must_use]
    pub fn item_at(world: &World, tile: Tile) -> Option<ItemKind> {
        world.items.at(tile)
    }

    /// Bonus currently on the maze.
    #[must_use]
    pub fn bonus(world: &World) -> Option<BonusSymbol> {
        world.items.bonus()
    }

    /// Pursuit mode last selected by the mode scheduler.
    #[must_use]
    pub fn pursuit_mode(world: &World) -> PursuitMode {
        world.pursuit
    }

    /// Global threat mode: frightened while a vulnerability window runs.
    #[must_use]
    pub fn threat_mode(world: &World) -> ThreatMode {
        if world.vulnerability.is_some() {
            ThreatMode::Frightened
        } else {
            world.pursuit.into()
        }
    }

    /// Ticks left in the running vulnerability window.
    #[must_use]
    pub fn vulnerability_remaining(world: &World) -> Option<u32> {
        world
            .vulnerability
            .and_then(|handle| world.timers.remaining(handle))
    }
}
