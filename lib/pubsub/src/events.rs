// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use ringbuf::ringbuf;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Event {
    #[default]
    None,
    Published { plug: u8 },
    Dropped { reason: u8 },
    Bound { publisher_plug: u8, subscriber_plug: u8 },
    MqttSnStateChanged { from: u8, to: u8 },
}

ringbuf!(PUBSUB_EVENTS, Event, 64, Event::None);
