// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use ringbuf::ringbuf;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Event {
    #[default]
    None,
    FrameAccepted { short_address: u8 },
    FrameDropped { reason: u8 },
    Enumerated { device_id: u32 },
    Commissioned { device_id: u32, short_address: u8 },
    CollisionBackoff { attempt: u8 },
}

ringbuf!(BUS_EVENTS, Event, 64, Event::None);
