// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ring buffer for debugging node tasks and link-layer drivers.
//!
//! Every component in this workspace records timestamped trace entries into
//! a statically-sized ring buffer instead of reaching for a formatting
//! logger: formatting strings costs flash that embedded targets don't have,
//! and a ring buffer can be pulled off a crashed or running device with a
//! debug probe. The emulator host build dumps the same buffers to stderr.
//!
//! # Example
//!
//! ```
//! use ringbuf::{ringbuf, ringbuf_entry};
//!
//! #[derive(Copy, Clone, PartialEq, Default, Debug)]
//! enum Trace {
//!     #[default]
//!     None,
//!     FrameAccepted(u8),
//! }
//!
//! ringbuf!(Trace, 16, Trace::None);
//!
//! ringbuf_entry!(Trace::FrameAccepted(5));
//! ```

use std::sync::Mutex;

/// A fixed-capacity ring buffer of `N` entries of type `T`.
///
/// `T` must be `Copy` so that entries may be recorded without allocation.
/// Internally the buffer is a plain array plus a monotonic write cursor;
/// wrapping the cursor (rather than shifting entries) keeps `entry` O(1).
pub struct Ringbuf<T: Copy, const N: usize> {
    inner: Mutex<RingbufInner<T, N>>,
}

struct RingbufInner<T: Copy, const N: usize> {
    buf: [T; N],
    /// Total number of entries ever recorded (not wrapped).
    count: u64,
}

impl<T: Copy, const N: usize> Ringbuf<T, N> {
    pub const fn new(initial: T) -> Self {
        Self {
            inner: Mutex::new(RingbufInner {
                buf: [initial; N],
                count: 0,
            }),
        }
    }

    /// Record an entry, overwriting the oldest one once the buffer fills.
    #[cfg_attr(feature = "disabled", allow(unused))]
    pub fn entry(&self, payload: T) {
        #[cfg(feature = "disabled")]
        {
            let _ = payload;
            return;
        }
        #[cfg(not(feature = "disabled"))]
        {
            let mut inner = self.inner.lock().unwrap();
            let index = (inner.count % N as u64) as usize;
            inner.buf[index] = payload;
            inner.count += 1;
        }
    }

    /// Total number of entries recorded since startup (including ones that
    /// have since been overwritten).
    pub fn total_count(&self) -> u64 {
        self.inner.lock().unwrap().count
    }

    /// Copy out the entries currently live in the buffer, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        let inner = self.inner.lock().unwrap();
        let live = inner.count.min(N as u64) as usize;
        let start = (inner.count.saturating_sub(live as u64) % N as u64) as usize;
        (0..live)
            .map(|i| inner.buf[(start + i) % N])
            .collect()
    }
}

impl<T: Copy + std::fmt::Debug, const N: usize> Ringbuf<T, N> {
    /// Dump the buffer to stderr; used by the emulator's terminal writer and
    /// by tests that want a human-readable trace on failure.
    pub fn dump(&self, name: &str) {
        eprintln!("ringbuf {name}: {} total entries", self.total_count());
        for (i, e) in self.snapshot().iter().enumerate() {
            eprintln!("  [{i}] {e:?}");
        }
    }
}

/// Declare a static ring buffer. Mirrors the teacher crate's macro shape:
/// `ringbuf!(TYPE, DEPTH, INITIAL)` declares an implicit `__RINGBUF` static
/// usable from `ringbuf_entry!` in the same module; `ringbuf!(NAME, TYPE,
/// DEPTH, INITIAL)` gives it an explicit name so a module can host more than
/// one.
#[macro_export]
macro_rules! ringbuf {
    ($name:ident, $ty:ty, $depth:expr, $initial:expr) => {
        static $name: $crate::Ringbuf<$ty, $depth> = $crate::Ringbuf::new($initial);
    };
    ($ty:ty, $depth:expr, $initial:expr) => {
        $crate::ringbuf!(__RINGBUF, $ty, $depth, $initial);
    };
}

/// Record an entry into a named (or implicit) ring buffer declared with
/// [`ringbuf!`].
#[macro_export]
macro_rules! ringbuf_entry {
    ($name:ident, $val:expr) => {
        $name.entry($val)
    };
    ($val:expr) => {
        __RINGBUF.entry($val)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Copy, Clone, PartialEq, Default, Debug)]
    enum Trace {
        #[default]
        None,
        Value(u32),
    }

    ringbuf!(Trace, 4, Trace::None);

    #[test]
    fn wraps_and_keeps_most_recent() {
        for i in 0..10u32 {
            ringbuf_entry!(Trace::Value(i));
        }
        let snap = __RINGBUF.snapshot();
        assert_eq!(snap, vec![Trace::Value(6), Trace::Value(7), Trace::Value(8), Trace::Value(9)]);
        assert_eq!(__RINGBUF.total_count(), 10);
    }
}
