#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that alternates the global pursuit mode between scatter and
//! chase phases.
//!
//! The phase countdown only runs while no vulnerability window is active: a
//! window pauses it and its expiry resumes it with the remaining ticks intact.

use maze_chase_core::{tables, Command, Event, Level, PursuitMode};
use maze_chase_timers::{Scheduler, TimerHandle};
use tracing::debug;

const PHASE_COUNT: usize = 7;

/// Pure system that emits [`Command::SwitchThreatMode`] as phases elapse.
#[derive(Debug)]
pub struct ModeScheduler {
    durations: [u32; PHASE_COUNT],
    timers: Scheduler<(), ()>,
    countdown: Option<TimerHandle>,
    phase: usize,
    mode: PursuitMode,
}

impl Default for ModeScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeScheduler {
    /// Creates an idle scheduler. The countdown starts with the first level.
    #[must_use]
    pub fn new() -> Self {
        Self {
            durations: tables::mode_phase_ticks(Level::FIRST),
            timers: Scheduler::new(),
            countdown: None,
            phase: 0,
            mode: PursuitMode::Scatter,
        }
    }

    /// Consumes world events and emits mode switches.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::LevelStarted { level, .. } | Event::ActorsReset { level, .. } => {
                    self.restart(*level);
                }
                Event::TimeAdvanced { .. } => self.advance(out),
                Event::VulnerabilityTriggered { ticks } if *ticks > 0 => {
                    if let Some(handle) = self.countdown {
                        let _ = self.timers.pause(handle);
                    }
                }
                Event::VulnerabilityEnded => {
                    if let Some(handle) = self.countdown {
                        let _ = self.timers.resume(handle);
                    }
                }
                _ => {}
            }
        }
    }

    /// Ticks left in the current phase, or `None` once the final chase began.
    #[must_use]
    pub fn remaining(&self) -> Option<u32> {
        self.countdown.and_then(|handle| self.timers.remaining(handle))
    }

    /// Mode selected by the current phase.
    #[must_use]
    pub fn mode(&self) -> PursuitMode {
        self.mode
    }

    /// Zero-based index of the current phase. Equals seven after the last one.
    #[must_use]
    pub fn phase(&self) -> usize {
        self.phase
    }

    /// Reports whether the countdown is frozen by a vulnerability window.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.countdown.is_some_and(|handle| !self.timers.is_running(handle))
    }

    fn restart(&mut self, level: Level) {
        self.durations = tables::mode_phase_ticks(level);
        self.timers.clear();
        self.phase = 0;
        self.mode = PursuitMode::Scatter;
        self.countdown = self.schedule_phase();
    }

    fn schedule_phase(&mut self) -> Option<TimerHandle> {
        let ticks = *self.durations.get(self.phase)?;
        self.timers.schedule((), ticks, ()).ok()
    }

    fn advance(&mut self, out: &mut Vec<Command>) {
        let mut fired = Vec::new();
        self.timers.advance(&mut fired);
        if fired.is_empty() {
            return;
        }

        self.phase += 1;
        self.mode = if self.phase % 2 == 0 {
            PursuitMode::Scatter
        } else {
            PursuitMode::Chase
        };
        self.countdown = self.schedule_phase();
        debug!(phase = self.phase, mode = ?self.mode, "mode phase elapsed");
        out.push(Command::SwitchThreatMode { mode: self.mode });
    }
}
