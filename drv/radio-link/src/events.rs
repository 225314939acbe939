// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use ringbuf::ringbuf;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Event {
    #[default]
    None,
    FrameAccepted { context: u8 },
    FrameDropped { reason: u8 },
    ImmediateAckSent { seq: u8 },
    Associated { short_address: u16 },
    GreenPowerCommissioned { device_id: u32 },
    DefaultResponseSent { cluster: u16, command: u8 },
}

ringbuf!(RADIO_EVENTS, Event, 64, Event::None);
