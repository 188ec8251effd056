#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that boosts the lead adversary as the maze empties.

use maze_chase_core::{tables, Command, Event, Level, SpeedBoost};
use tracing::debug;

/// Watches the remaining-item count and escalates the lead's speed boost.
///
/// Tiers only ever rise within a level. A new level drops the boost, while a
/// life-loss reset keeps it and re-applies it to the freshly placed lead.
#[derive(Debug, Default)]
pub struct ElroyMonitor {
    level: Level,
    tier: SpeedBoost,
}

impl ElroyMonitor {
    /// Creates a monitor with no boost.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and emits boost changes.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::LevelStarted { level, remaining } => {
                    self.level = *level;
                    self.tier = SpeedBoost::None;
                    self.escalate(*remaining, out);
                }
                Event::ActorsReset { remaining, .. } => {
                    if self.tier != SpeedBoost::None {
                        out.push(Command::SetSpeedBoost { boost: self.tier });
                    }
                    self.escalate(*remaining, out);
                }
                Event::ItemConsumed {
                    kind, remaining, ..
                } if kind.is_counted() => self.escalate(*remaining, out),
                _ => {}
            }
        }
    }

    /// Boost currently applied to the lead adversary.
    #[must_use]
    pub fn tier(&self) -> SpeedBoost {
        self.tier
    }

    fn escalate(&mut self, remaining: u32, out: &mut Vec<Command>) {
        let tier = tables::elroy_tier(self.level, remaining);
        if tier <= self.tier {
            return;
        }
        debug!(?tier, remaining, "lead adversary boosted");
        self.tier = tier;
        out.push(Command::SetSpeedBoost { boost: tier });
    }
}
