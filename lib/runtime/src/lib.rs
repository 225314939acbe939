//! Single-threaded cooperative task runtime.
//!
//! Everything else in this workspace -- the link-layer drivers, the durable
//! stores, the publish/subscribe plane -- is built as async coroutines
//! scheduled by the [`executor::Executor`] here. There is no preemption: a
//! task only yields at an explicit `.await`, and between those points it has
//! exclusive access to whatever state it touches. See the module docs on
//! [`waitlist`] for how the intrusive waitlists from the source firmware are
//! expressed without raw pointers.

pub mod barrier;
pub mod executor;
pub mod select;
pub mod time;
pub mod timer;
pub mod waitlist;

pub use barrier::{Barrier, Synchronizer};
pub use executor::{Executor, JoinHandle};
pub use select::{select2, select_slice, Either};
pub use time::{Clock, Duration, Ticks, WallClock};
pub use timer::TimerQueue;
pub use waitlist::{Awaitable, Waitlist};
