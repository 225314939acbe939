// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use ringbuf::ringbuf;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Event {
    #[default]
    None,
    Wrote { index: u16, gen: u8 },
    Cleared { index: u16 },
    RecoveredFromOtherHalf { index: u16 },
    ChecksumMismatch { index: u16 },
}

ringbuf!(FERAM_EVENTS, Event, 64, Event::None);
