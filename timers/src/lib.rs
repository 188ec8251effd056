#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick-counted timers polled once per simulation step.
//!
//! A [`Scheduler`] owns every timer record. Each record carries an owner tag,
//! used for bulk cancellation, and a typed action that is handed back to the
//! caller when the timer fires. Nothing runs implicitly: the caller advances
//! the scheduler and dispatches the returned [`Fired`] records itself.

use std::collections::BTreeMap;

use thiserror::Error;

/// Errors raised when a timer is scheduled with impossible parameters.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    /// The timer would never count down.
    #[error("a timer must run for at least one tick")]
    ZeroTicks,
    /// The timer would never fire.
    #[error("a repeating timer must fire at least once")]
    ZeroRepeats,
}

/// Opaque handle identifying a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// How many times a timer fires before it is discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    /// Fires the given number of times in total.
    Times(u32),
    /// Re-arms after every firing until cancelled.
    Forever,
}

/// Record describing a timer that fired during [`Scheduler::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fired<O, A> {
    /// Handle of the timer that fired.
    pub handle: TimerHandle,
    /// Owner the timer was scheduled for.
    pub owner: O,
    /// Action attached when the timer was scheduled.
    pub action: A,
    /// Whether this was the final firing, after which the handle is invalid.
    pub last: bool,
}

#[derive(Clone, Debug)]
struct Timer<O, A> {
    remaining: u32,
    total: u32,
    repeats: Repeat,
    owner: O,
    action: A,
    running: bool,
}

/// Collection of timers advanced synchronously by the owning simulation.
#[derive(Clone, Debug)]
pub struct Scheduler<O, A> {
    timers: BTreeMap<TimerHandle, Timer<O, A>>,
    next_handle: u64,
}

impl<O, A> Default for Scheduler<O, A> {
    fn default() -> Self {
        Self {
            timers: BTreeMap::new(),
            next_handle: 0,
        }
    }
}

impl<O, A> Scheduler<O, A>
where
    O: Copy + PartialEq,
    A: Copy,
{
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `action` to fire once after `ticks` calls to [`Self::advance`].
    pub fn schedule(&mut self, owner: O, ticks: u32, action: A) -> Result<TimerHandle, TimerError> {
        self.repeat(owner, ticks, action, Repeat::Times(1))
    }

    /// Schedules `action` to fire every `ticks` calls to [`Self::advance`].
    pub fn repeat(
        &mut self,
        owner: O,
        ticks: u32,
        action: A,
        repeats: Repeat,
    ) -> Result<TimerHandle, TimerError> {
        if ticks == 0 {
            return Err(TimerError::ZeroTicks);
        }
        if repeats == Repeat::Times(0) {
            return Err(TimerError::ZeroRepeats);
        }

        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        let _ = self.timers.insert(
            handle,
            Timer {
                remaining: ticks,
                total: ticks,
                repeats,
                owner,
                action,
                running: true,
            },
        );
        Ok(handle)
    }

    /// Cancels a timer. Returns `false` when the handle is no longer scheduled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.timers.remove(&handle).is_some()
    }

    /// Cancels every timer belonging to `owner`, returning how many were removed.
    pub fn cancel_owner(&mut self, owner: O) -> usize {
        let before = self.timers.len();
        self.timers.retain(|_, timer| timer.owner != owner);
        before - self.timers.len()
    }

    /// Cancels every timer.
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Freezes a timer's countdown. Pausing a paused timer has no effect.
    pub fn pause(&mut self, handle: TimerHandle) -> bool {
        self.set_running(handle, false)
    }

    /// Resumes a paused timer with its remaining ticks untouched.
    pub fn resume(&mut self, handle: TimerHandle) -> bool {
        self.set_running(handle, true)
    }

    /// Restarts a timer's countdown from its full duration.
    pub fn reset(&mut self, handle: TimerHandle) -> bool {
        match self.timers.get_mut(&handle) {
            Some(timer) => {
                timer.remaining = timer.total;
                true
            }
            None => false,
        }
    }

    /// Ticks left before the timer next fires.
    #[must_use]
    pub fn remaining(&self, handle: TimerHandle) -> Option<u32> {
        self.timers.get(&handle).map(|timer| timer.remaining)
    }

    /// Reports whether the timer is scheduled and counting down.
    #[must_use]
    pub fn is_running(&self, handle: TimerHandle) -> bool {
        self.timers.get(&handle).is_some_and(|timer| timer.running)
    }

    /// Reports whether the timer is still scheduled, paused or not.
    #[must_use]
    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.timers.contains_key(&handle)
    }

    /// Number of scheduled timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Reports whether no timers are scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Counts down every running timer by one tick, appending those that fire
    /// to `out` in scheduling order.
    pub fn advance(&mut self, out: &mut Vec<Fired<O, A>>) {
        let mut expired = Vec::new();
        for (handle, timer) in &mut self.timers {
            if !timer.running {
                continue;
            }
            timer.remaining -= 1;
            if timer.remaining > 0 {
                continue;
            }

            let last = match timer.repeats {
                Repeat::Forever => false,
                Repeat::Times(count) => {
                    timer.repeats = Repeat::Times(count - 1);
                    count == 1
                }
            };
            out.push(Fired {
                handle: *handle,
                owner: timer.owner,
                action: timer.action,
                last,
            });

            if last {
                expired.push(*handle);
            } else {
                timer.remaining = timer.total;
            }
        }

        for handle in expired {
            let _ = self.timers.remove(&handle);
        }
    }

    fn set_running(&mut self, handle: TimerHandle, running: bool) -> bool {
        match self.timers.get_mut(&handle) {
            Some(timer) => {
                timer.running = running;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Owner {
        First,
        Second,
    }

    fn advance(scheduler: &mut Scheduler<Owner, u8>, ticks: u32) -> Vec<Fired<Owner, u8>> {
        let mut fired = Vec::new();
        for _ in 0..ticks {
            scheduler.advance(&mut fired);
        }
        fired
    }

    #[test]
    fn one_shot_fires_on_its_final_tick() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(Owner::First, 3, 7).expect("schedule");

        assert!(advance(&mut scheduler, 2).is_empty());
        assert_eq!(scheduler.remaining(handle), Some(1));

        let fired = advance(&mut scheduler, 1);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].action, 7);
        assert!(fired[0].last);
        assert!(!scheduler.is_scheduled(handle));
    }

    #[test]
    fn counted_repeats_rearm_then_expire() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler
            .repeat(Owner::First, 2, 1, Repeat::Times(3))
            .expect("repeat");

        let fired = advance(&mut scheduler, 6);
        assert_eq!(fired.len(), 3);
        assert_eq!(
            fired.iter().map(|record| record.last).collect::<Vec<_>>(),
            vec![false, false, true]
        );
        assert!(!scheduler.is_scheduled(handle));
    }

    #[test]
    fn forever_timers_keep_firing() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler
            .repeat(Owner::First, 4, 0, Repeat::Forever)
            .expect("repeat");

        assert_eq!(advance(&mut scheduler, 40).len(), 10);
        assert!(scheduler.is_scheduled(handle));
    }

    #[test]
    fn paused_timers_keep_their_remaining_ticks() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.schedule(Owner::First, 10, 0).expect("schedule");

        let _ = advance(&mut scheduler, 4);
        assert!(scheduler.pause(handle));
        assert!(advance(&mut scheduler, 100).is_empty());
        assert_eq!(scheduler.remaining(handle), Some(6));
        assert!(!scheduler.is_running(handle));

        assert!(scheduler.resume(handle));
        assert_eq!(advance(&mut scheduler, 6).len(), 1);
    }

    #[test]
    fn reset_restarts_the_countdown() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler
            .repeat(Owner::First, 5, 0, Repeat::Forever)
            .expect("repeat");

        let _ = advance(&mut scheduler, 4);
        assert!(scheduler.reset(handle));
        assert_eq!(scheduler.remaining(handle), Some(5));
        assert!(advance(&mut scheduler, 4).is_empty());
    }

    #[test]
    fn owner_cancellation_only_touches_that_owner() {
        let mut scheduler = Scheduler::new();
        let first = scheduler.schedule(Owner::First, 5, 0).expect("schedule");
        let _ = scheduler.schedule(Owner::First, 6, 1).expect("schedule");
        let second = scheduler.schedule(Owner::Second, 5, 2).expect("schedule");

        assert_eq!(scheduler.cancel_owner(Owner::First), 2);
        assert!(!scheduler.is_scheduled(first));
        assert!(scheduler.is_scheduled(second));
        assert!(!scheduler.cancel(first));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn impossible_timers_are_rejected() {
        let mut scheduler: Scheduler<Owner, u8> = Scheduler::new();
        assert_eq!(
            scheduler.schedule(Owner::First, 0, 0),
            Err(TimerError::ZeroTicks)
        );
        assert_eq!(
            scheduler.repeat(Owner::First, 3, 0, Repeat::Times(0)),
            Err(TimerError::ZeroRepeats)
        );
        assert!(scheduler.is_empty());
    }

    #[test]
    fn simultaneous_timers_fire_in_scheduling_order() {
        let mut scheduler = Scheduler::new();
        let _ = scheduler.schedule(Owner::Second, 2, 9).expect("schedule");
        let _ = scheduler.schedule(Owner::First, 2, 3).expect("schedule");

        let fired = advance(&mut scheduler, 2);
        let actions: Vec<_> = fired.iter().map(|record| record.action).collect();
        assert_eq!(actions, vec![9, 3]);
    }
}
