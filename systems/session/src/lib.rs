#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Orchestrates the world and the pure systems behind a single `tick()` call.
//!
//! Every external input is turned into a [`Command`] and applied to the world.
//! The resulting events are then pumped through the mode scheduler, the
//! release controller and the elroy monitor until none of them has anything
//! left to say.

use maze_chase_core::{Command, Direction, Event, Level};
use maze_chase_system_elroy::ElroyMonitor;
use maze_chase_system_mode_scheduler::ModeScheduler;
use maze_chase_system_release::{self as release, ReleaseController};
use maze_chase_world::{self as world, query, SimulationError, World};
use tracing::trace;

/// Configuration parameters required to construct a session.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    level: Level,
    rng_seed: u64,
    global_dot_counter: bool,
}

impl Config {
    /// Creates a configuration starting at `level` with the provided seed.
    #[must_use]
    pub const fn new(level: Level, rng_seed: u64) -> Self {
        Self {
            level,
            rng_seed,
            global_dot_counter: false,
        }
    }

    /// Enables the shared dot counter that governs releases after the player
    /// is caught.
    #[must_use]
    pub const fn with_global_dot_counter(mut self, enabled: bool) -> Self {
        self.global_dot_counter = enabled;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Level::FIRST, 0)
    }
}

/// A running game: the world plus every system that reacts to it.
#[derive(Debug)]
pub struct Session {
    world: World,
    modes: ModeScheduler,
    release: ReleaseController,
    elroy: ElroyMonitor,
    score: u64,
}

impl Session {
    /// Creates a session and starts the configured level.
    pub fn new(config: Config) -> Result<Self, SimulationError> {
        let mut session = Self {
            world: World::with_seed(config.rng_seed),
            modes: ModeScheduler::new(),
            release: ReleaseController::new(release::Config::new(config.global_dot_counter)),
            elroy: ElroyMonitor::new(),
            score: 0,
        };
        let _ = session.execute(Command::StartLevel {
            level: config.level,
        })?;
        Ok(session)
    }

    /// Advances the game by one tick, returning every event it produced.
    pub fn tick(&mut self) -> Result<Vec<Event>, SimulationError> {
        self.execute(Command::Tick)
    }

    /// Queues the direction the player should take next.
    pub fn request_direction(&mut self, direction: Direction) -> Result<(), SimulationError> {
        let _ = self.execute(Command::RequestDirection { direction })?;
        Ok(())
    }

    /// Restarts the maze at `level` with every item restored.
    pub fn start_level(&mut self, level: Level) -> Result<Vec<Event>, SimulationError> {
        self.execute(Command::StartLevel { level })
    }

    /// Re-places every actor after the player was caught.
    pub fn reset_actors(&mut self) -> Result<Vec<Event>, SimulationError> {
        self.execute(Command::ResetActors)
    }

    /// Read-only access to the world, for use with [`maze_chase_world::query`].
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mode scheduler driving scatter and chase phases.
    #[must_use]
    pub fn mode_scheduler(&self) -> &ModeScheduler {
        &self.modes
    }

    /// Release controller deciding who leaves the holding area.
    #[must_use]
    pub fn release_controller(&self) -> &ReleaseController {
        &self.release
    }

    /// Elroy monitor boosting the lead adversary.
    #[must_use]
    pub fn elroy_monitor(&self) -> &ElroyMonitor {
        &self.elroy
    }

    /// Points collected since the session was created.
    #[must_use]
    pub fn score(&self) -> u64 {
        self.score
    }

    fn execute(&mut self, command: Command) -> Result<Vec<Event>, SimulationError> {
        let mut log = Vec::new();
        world::apply(&mut self.world, command, &mut log)?;
        let mut events = log.clone();

        loop {
            if events.is_empty() {
                break;
            }

            let adversaries = query::adversary_view(&self.world);
            let mut commands = Vec::new();
            self.modes.handle(&events, &mut commands);
            self.release.handle(&events, &adversaries, &mut commands);
            self.elroy.handle(&events, &mut commands);

            if commands.is_empty() {
                break;
            }

            events.clear();
            for command in commands {
                trace!(?command, "system command");
                world::apply(&mut self.world, command, &mut events)?;
            }
            log.extend(events.iter().copied());
        }

        for event in &log {
            match event {
                Event::ItemConsumed { value, .. } => self.score += u64::from(*value),
                Event::PlayerCaughtAdversary { points, .. } => self.score += u64::from(*points),
                _ => {}
            }
        }
        Ok(log)
    }
}
