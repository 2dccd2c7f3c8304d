//! Shared cycle counter and the lazy catch-up contract peripherals follow.
//!
//! The CPU is the only writer of the clock: every bus access it performs
//! advances the timestamp by one machine cycle. Peripherals never poll the
//! clock on their own. Instead each one remembers the timestamp it last
//! caught up to and, when asked to `synchronize`, applies the elapsed
//! cycles in one go. Reads and writes of peripheral registers always
//! synchronize first, so software can never observe stale state.

use std::cell::Cell;
use std::rc::Rc;

/// T-states per machine cycle.
pub const TSTATES_PER_MCYCLE: u64 = 4;

/// Monotonic T-state counter shared by reference between components.
///
/// Cloning yields another handle onto the same counter.
#[derive(Clone, Debug, Default)]
pub struct SystemClock {
    timestamp: Rc<Cell<u64>>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time in T-states.
    #[inline]
    pub fn timestamp(&self) -> u64 {
        self.timestamp.get()
    }

    /// Advance by `machine_cycles` machine cycles (4 T-states each).
    #[inline]
    pub fn advance(&self, machine_cycles: u64) {
        let next = self.timestamp.get() + machine_cycles * TSTATES_PER_MCYCLE;
        self.timestamp.set(next);
    }
}

/// Bookkeeping for one component's position relative to the shared clock.
#[derive(Clone, Debug)]
pub struct SyncPoint {
    clock: SystemClock,
    last_update: u64,
}

impl SyncPoint {
    pub fn new(clock: SystemClock) -> Self {
        let last_update = clock.timestamp();
        Self { clock, last_update }
    }

    /// Move the sync point to "now" and return the T-states that elapsed
    /// since the previous call, or `None` when nothing happened.
    #[inline]
    pub fn catch_up(&mut self) -> Option<u64> {
        let now = self.clock.timestamp();
        if now == self.last_update {
            return None;
        }
        let delta = now - self.last_update;
        self.last_update = now;
        Some(delta)
    }

    #[inline]
    pub fn last_update(&self) -> u64 {
        self.last_update
    }
}

/// A peripheral whose state is a function of elapsed hardware time.
pub trait Clocked {
    fn sync_point(&mut self) -> &mut SyncPoint;

    /// Apply `cycles` T-states of component-specific behaviour.
    fn advance(&mut self, cycles: u64);

    /// Catch up to the current clock value. A no-op when already current.
    fn synchronize(&mut self) {
        if let Some(delta) = self.sync_point().catch_up() {
            self.advance(delta);
        }
    }
}
