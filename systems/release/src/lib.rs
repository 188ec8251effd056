#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system deciding when adversaries leave the holding area.
//!
//! Each waiting adversary owns a personal dot counter; consumed items credit
//! the first one still waiting, and it is released once its counter is spent.
//! After the player is caught an optional shared counter takes over, and a
//! repeating failsafe forces someone out when the player stops eating.

use maze_chase_core::{tables, AdversaryId, AdversaryView, Command, Event, Level};
use maze_chase_timers::{Repeat, Scheduler, TimerHandle};
use tracing::debug;

/// Configuration parameters required to construct the release controller.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    global_counter: bool,
}

impl Config {
    /// Creates a configuration. `global_counter` enables the shared dot counter
    /// used after the player is caught.
    #[must_use]
    pub const fn new(global_counter: bool) -> Self {
        Self { global_counter }
    }
}

/// Pure system that emits [`Command::ReleaseAdversary`].
#[derive(Debug)]
pub struct ReleaseController {
    global_counter_enabled: bool,
    personal: [u32; 4],
    global: Option<u32>,
    failsafe: Scheduler<(), ()>,
    failsafe_handle: Option<TimerHandle>,
}

impl ReleaseController {
    /// Creates a controller using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            global_counter_enabled: config.global_counter,
            personal: [0; 4],
            global: None,
            failsafe: Scheduler::new(),
            failsafe_handle: None,
        }
    }

    /// Consumes world events and the adversary view to emit release commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        adversaries: &AdversaryView,
        out: &mut Vec<Command>,
    ) {
        let mut released: Vec<AdversaryId> = Vec::new();
        let waiting = |id: AdversaryId, released: &[AdversaryId]| {
            adversaries.is_inside(id) && !released.contains(&id)
        };

        for event in events {
            match event {
                Event::LevelStarted { level, .. } => {
                    for id in AdversaryId::ALL {
                        self.personal[id.index()] = tables::personal_dot_seed(id, *level);
                    }
                    self.global = None;
                    self.restart_failsafe(*level);
                }
                Event::ActorsReset { level, .. } => {
                    if self.global_counter_enabled {
                        self.global = Some(0);
                    }
                    self.restart_failsafe(*level);
                }
                Event::ItemConsumed { kind, .. } if kind.is_counted() => {
                    if let Some(handle) = self.failsafe_handle {
                        let _ = self.failsafe.reset(handle);
                    }

                    if let Some(count) = self.global.as_mut() {
                        *count += 1;
                        let count = *count;
                        for (threshold, id) in tables::GLOBAL_RELEASE_THRESHOLDS {
                            if count == threshold && waiting(id, &released) {
                                release(id, &mut released, out);
                                if id == AdversaryId::Opportunist {
                                    debug!("shared dot counter retired");
                                    self.global = None;
                                }
                            }
                        }
                    } else if let Some(id) = AdversaryId::COUNTED
                        .into_iter()
                        .find(|id| waiting(*id, &released))
                    {
                        let counter = &mut self.personal[id.index()];
                        *counter = counter.saturating_sub(1);
                    }
                }
                Event::TimeAdvanced { .. } => {
                    let mut fired = Vec::new();
                    self.failsafe.advance(&mut fired);
                    if fired.is_empty() {
                        continue;
                    }
                    if let Some(id) = AdversaryId::ALL
                        .into_iter()
                        .find(|id| waiting(*id, &released))
                    {
                        debug!(?id, "release failsafe fired");
                        release(id, &mut released, out);
                    }
                }
                _ => {}
            }
        }

        if waiting(AdversaryId::Pursuer, &released) {
            release(AdversaryId::Pursuer, &mut released, out);
            return;
        }
        if self.global.is_some() {
            return;
        }
        if let Some(id) = AdversaryId::COUNTED
            .into_iter()
            .find(|id| waiting(*id, &released))
        {
            if self.personal[id.index()] == 0 {
                release(id, &mut released, out);
            }
        }
    }

    /// Personal dot counter of an adversary.
    #[must_use]
    pub fn personal_counter(&self, id: AdversaryId) -> u32 {
        self.personal[id.index()]
    }

    /// Shared dot counter, present only while it governs releases.
    #[must_use]
    pub fn global_counter(&self) -> Option<u32> {
        self.global
    }

    /// Ticks left before the failsafe forces the next release.
    #[must_use]
    pub fn failsafe_remaining(&self) -> Option<u32> {
        self.failsafe_handle.and_then(|handle| self.failsafe.remaining(handle))
    }

    fn restart_failsafe(&mut self, level: Level) {
        self.failsafe.clear();
        let ticks = tables::release_failsafe_ticks(level);
        self.failsafe_handle = self.failsafe.repeat((), ticks, (), Repeat::Forever).ok();
    }
}

fn release(id: AdversaryId, released: &mut Vec<AdversaryId>, out: &mut Vec<Command>) {
    released.push(id);
    out.push(Command::ReleaseAdversary { adversary: id });
}

#[cfg(test)]
mod tests {
    use super::*;

    use maze_chase_core::{
        AdversarySnapshot, AdversaryStatus, Direction, ItemKind, Locomotion, Position, Tile,
    };

    fn view(inside: &[AdversaryId]) -> AdversaryView {
        AdversaryView::from_snapshots(
            AdversaryId::ALL
                .into_iter()
                .map(|id| AdversarySnapshot {
                    id,
                    position: Position::new(112, 140),
                    tile: Tile::new(14, 17),
                    direction: Direction::West,
                    status: AdversaryStatus::initial(if inside.contains(&id) {
                        Locomotion::Inside
                    } else {
                        Locomotion::Free
                    }),
                    flashing: false,
                })
                .collect(),
        )
    }

    fn dot() -> Event {
        Event::ItemConsumed {
            kind: ItemKind::Dot,
            value: 10,
            tile: Tile::new(1, 4),
            remaining: 100,
        }
    }

    #[test]
    fn returning_lead_is_released_at_once() {
        let mut controller = ReleaseController::new(Config::default());
        let mut commands = Vec::new();
        let waiting = view(&[AdversaryId::Pursuer, AdversaryId::Flanker]);
        controller.handle(&[], &waiting, &mut commands);

        assert_eq!(
            commands,
            vec![Command::ReleaseAdversary {
                adversary: AdversaryId::Pursuer,
            }]
        );
    }

    #[test]
    fn bonus_items_do_not_credit_counters() {
        let mut controller = ReleaseController::new(Config::default());
        let mut commands = Vec::new();
        let waiting = view(&[AdversaryId::Flanker]);
        controller.handle(
            &[Event::LevelStarted {
                level: Level::FIRST,
                remaining: 244,
            }],
            &waiting,
            &mut commands,
        );
        controller.handle(
            &[Event::ItemConsumed {
                kind: ItemKind::Bonus,
                value: 100,
                tile: Tile::new(14, 26),
                remaining: 100,
            }],
            &waiting,
            &mut commands,
        );
        assert_eq!(controller.personal_counter(AdversaryId::Flanker), 30);

        controller.handle(&[dot()], &waiting, &mut commands);
        assert_eq!(controller.personal_counter(AdversaryId::Flanker), 29);
        assert!(commands.is_empty());
    }
}
