//! One-shot timers running on a clock separate from the frame loop.
//!
//! A timer never touches scene state itself. Firing only flips a shared flag
//! that the owning entity reads on its next frame tick, and dropping the
//! [`TimerHandle`] cancels it so nothing fires into an unmounted entity.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

const PENDING: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// Shared fire/cancel flag. A timer settles exactly once, either way.
#[derive(Debug, Default)]
struct TimerFlag(AtomicU8);

impl TimerFlag {
    fn settle(&self, to: u8) -> bool {
        self.0
            .compare_exchange(PENDING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn get(&self) -> u8 {
        self.0.load(Ordering::Acquire)
    }
}

/// Owner side of a scheduled timer.
pub struct TimerHandle {
    flag: Arc<TimerFlag>,
}

impl TimerHandle {
    fn new() -> (Self, Arc<TimerFlag>) {
        let flag = Arc::new(TimerFlag::default());
        (Self { flag: flag.clone() }, flag)
    }

    /// Whether the timer's delay has elapsed.
    pub fn has_fired(&self) -> bool {
        self.flag.get() == FIRED
    }

    /// Whether the timer was cancelled before firing.
    pub fn is_cancelled(&self) -> bool {
        self.flag.get() == CANCELLED
    }

    /// Whether the timer is still waiting.
    pub fn is_pending(&self) -> bool {
        self.flag.get() == PENDING
    }

    /// Cancel the timer. Has no effect once it has fired.
    pub fn cancel(&self) {
        self.flag.settle(CANCELLED);
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.flag.get() {
            PENDING => "pending",
            FIRED => "fired",
            _ => "cancelled",
        };
        f.debug_struct("TimerHandle").field("state", &state).finish()
    }
}

/// Source of delayed activations.
pub trait Scheduler {
    /// Schedule a timer that fires once after `delay`.
    fn schedule(&self, delay: Duration) -> TimerHandle;
}

/// Real-time scheduler backed by one sleeper thread per timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn schedule(&self, delay: Duration) -> TimerHandle {
        let (handle, flag) = TimerHandle::new();
        if delay.is_zero() {
            flag.settle(FIRED);
            return handle;
        }

        let sleeper = flag.clone();
        let spawned = thread::Builder::new()
            .name("galaxy-timer".into())
            .spawn(move || {
                thread::sleep(delay);
                sleeper.settle(FIRED);
            });

        if let Err(err) = spawned {
            // Without a sleeper the entity would stay pending forever
            log::warn!("failed to spawn timer thread, firing immediately: {err}");
            flag.settle(FIRED);
        }
        handle
    }
}

/// Deterministic scheduler advanced explicitly by the caller.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    timers: RefCell<Vec<(Duration, Weak<TimerFlag>)>>,
}

impl ManualScheduler {
    /// Create a scheduler at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward and fire every due timer. Returns how many fired.
    pub fn advance(&self, by: Duration) -> usize {
        let now = self.now.get() + by;
        self.now.set(now);

        let mut fired = 0;
        self.timers.borrow_mut().retain(|(due, flag)| {
            let Some(flag) = flag.upgrade() else {
                return false;
            };
            if *due > now {
                return flag.get() == PENDING;
            }
            if flag.settle(FIRED) {
                fired += 1;
            }
            false
        });
        fired
    }

    /// Number of timers still waiting to fire.
    pub fn pending(&self) -> usize {
        self.timers
            .borrow()
            .iter()
            .filter_map(|(_, flag)| flag.upgrade())
            .filter(|flag| flag.get() == PENDING)
            .count()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration) -> TimerHandle {
        let (handle, flag) = TimerHandle::new();
        if delay.is_zero() {
            flag.settle(FIRED);
        } else {
            self.timers
                .borrow_mut()
                .push((self.now.get() + delay, Arc::downgrade(&flag)));
        }
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_timer_fires_after_delay() {
        let scheduler = ManualScheduler::new();
        let handle = scheduler.schedule(Duration::from_secs(2));

        assert_eq!(scheduler.advance(Duration::from_secs(1)), 0);
        assert!(handle.is_pending());

        assert_eq!(scheduler.advance(Duration::from_secs(1)), 1);
        assert!(handle.has_fired());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let scheduler = ManualScheduler::new();
        let handle = scheduler.schedule(Duration::from_millis(500));
        handle.cancel();

        assert_eq!(scheduler.advance(Duration::from_secs(5)), 0);
        assert!(handle.is_cancelled());
        assert!(!handle.has_fired());
    }

    #[test]
    fn test_dropped_handle_cancels() {
        let scheduler = ManualScheduler::new();
        let handle = scheduler.schedule(Duration::from_secs(1));
        assert_eq!(scheduler.pending(), 1);

        drop(handle);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.advance(Duration::from_secs(2)), 0);
    }

    #[test]
    fn test_cancel_after_fire_keeps_fired() {
        let scheduler = ManualScheduler::new();
        let handle = scheduler.schedule(Duration::from_millis(10));
        scheduler.advance(Duration::from_millis(10));
        handle.cancel();
        assert!(handle.has_fired());
    }

    #[test]
    fn test_zero_delay_fires_immediately() {
        let handle = ManualScheduler::new().schedule(Duration::ZERO);
        assert!(handle.has_fired());
        assert!(ThreadScheduler.schedule(Duration::ZERO).has_fired());
    }

    #[test]
    fn test_thread_timer_fires_and_cancels() {
        let fired = ThreadScheduler.schedule(Duration::from_millis(10));
        let cancelled = ThreadScheduler.schedule(Duration::from_millis(10));
        cancelled.cancel();

        thread::sleep(Duration::from_millis(200));
        assert!(fired.has_fired());
        assert!(cancelled.is_cancelled());
    }
}
