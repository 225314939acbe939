// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use ringbuf::ringbuf;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Event {
    #[default]
    None,
    Appended { array_index: u8, index: u8 },
    Erased { array_index: u8, index: u8 },
    Moved { array_index: u8, index: u8, new_index: u8 },
    Compacted { region: u8 },
    RecoveredCorruptLog,
    OutOfMemory,
}

ringbuf!(FLASH_EVENTS, Event, 64, Event::None);
