//! Timer list: the producer side of [`sleep`].

use crate::time::{Clock, Duration, Ticks};
use crate::waitlist::{Awaitable, Waitlist};

/// Holds every task currently parked in [`TimerQueue::sleep`]. The executor's
/// driving loop calls [`TimerQueue::fire_elapsed`] once per pass with the
/// current tick count; it resumes every timer whose deadline has been
/// reached without disturbing the others, same as `resume_all_if` elsewhere.
#[derive(Clone, Default)]
pub struct TimerQueue(Waitlist<Ticks>);

impl TimerQueue {
    pub fn new() -> Self {
        TimerQueue(Waitlist::new())
    }

    /// Resumes after `dur` has elapsed on `clock`. A zero or already-passed
    /// deadline is not resolved immediately: it resumes on the next call to
    /// [`TimerQueue::fire_elapsed`], matching the "next scheduler turn, not
    /// immediately" contract.
    #[must_use]
    pub fn sleep(&self, clock: &dyn Clock, dur: Duration) -> Awaitable<Ticks> {
        let deadline = clock.now().wrapping_add(dur);
        self.0.push(deadline)
    }

    pub fn fire_elapsed(&self, clock: &dyn Clock) {
        let now = clock.now();
        self.0.resume_all_if(|deadline| deadline.is_reached(now));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Executor;
    use crate::time::WallClock;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::thread;
    use std::time::Duration as StdDuration;

    #[test]
    fn sleep_resumes_after_elapsed_and_not_before() {
        let exec = Executor::new();
        let clock = WallClock::new();
        let timers = TimerQueue::new();
        let woke = Rc::new(RefCell::new(false));
        let w2 = woke.clone();
        let a = timers.sleep(&clock, Duration::from_ticks(20));
        let h = exec.spawn(async move {
            a.await;
            *w2.borrow_mut() = true;
        });
        exec.run_until_idle();
        timers.fire_elapsed(&clock);
        exec.run_until_idle();
        assert!(!*woke.borrow(), "must not fire before the deadline");

        thread::sleep(StdDuration::from_millis(25));
        timers.fire_elapsed(&clock);
        exec.run_until_idle();
        assert!(*woke.borrow());
        drop(h);
    }

    #[test]
    fn dropping_awaitable_removes_timer_node() {
        let clock = WallClock::new();
        let timers = TimerQueue::new();
        let a = timers.sleep(&clock, Duration::from_ticks(1_000_000));
        assert!(!timers.is_empty());
        drop(a);
        assert!(timers.is_empty());
    }
}
