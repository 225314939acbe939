//! Monotonic wrapping tick counter.
//!
//! The scheduler's clock is a free-running unsigned counter rather than a
//! wall-clock timestamp: on the embedded targets it is driven directly off a
//! hardware timer/counter register that wraps, and the emulator host build
//! derives it from [`std::time::Instant`] truncated to 32 bits. All
//! comparisons therefore go through [`Ticks::is_reached`] rather than `<`/`>`,
//! which stays correct across a wraparound as long as the values being
//! compared are within half the counter's range of each other.

use core::ops::Add;

/// A point in time on the wrapping tick counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ticks(pub u32);

impl Ticks {
    pub const ZERO: Ticks = Ticks(0);

    /// `true` once the wrapping counter has advanced from `now` to (or past)
    /// `self`, i.e. `self` is a deadline that has arrived.
    ///
    /// Implemented as a signed comparison of the wrapping difference, which
    /// is correct as long as no two timers are ever more than `2^31` ticks
    /// apart -- the window guaranteed by the task runtime contract.
    pub fn is_reached(self, now: Ticks) -> bool {
        let diff = now.0.wrapping_sub(self.0);
        (diff as i32) >= 0
    }

    pub fn wrapping_add(self, dur: Duration) -> Ticks {
        Ticks(self.0.wrapping_add(dur.0))
    }
}

impl Add<Duration> for Ticks {
    type Output = Ticks;
    fn add(self, rhs: Duration) -> Ticks {
        self.wrapping_add(rhs)
    }
}

/// A span of ticks, used to request a [`crate::timer::sleep`] duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Duration(pub u32);

impl Duration {
    pub const fn from_ticks(ticks: u32) -> Self {
        Duration(ticks)
    }
}

/// Source of the current tick count.
///
/// Implemented once per platform: a hardware timer ISR counter on device
/// firmware, [`std::time::Instant`]-backed on the emulator.
pub trait Clock {
    fn now(&self) -> Ticks;
}

/// A [`Clock`] backed by [`std::time::Instant`], for the emulator host build
/// and for tests. One tick is one millisecond.
#[derive(Debug, Clone)]
pub struct WallClock {
    epoch: std::time::Instant,
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock {
    pub fn new() -> Self {
        Self { epoch: std::time::Instant::now() }
    }
}

impl Clock for WallClock {
    fn now(&self) -> Ticks {
        Ticks(self.epoch.elapsed().as_millis() as u32)
    }
}
