// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seam between the driver's frame logic and the physical half-duplex bus.
//! A real board backs this with a UART + break-detect peripheral; the
//! emulator backs it with an in-memory loopback or a shared virtual bus.

/// One half-duplex bus exchange: `write` is driven onto the bus (empty for
/// a pure read poll), and whatever survives arbitration/any device's reply
/// is returned.
pub trait BusTransport {
    fn transfer(&mut self, write: &[u8]) -> Vec<u8>;
}

/// In-memory transport for tests: an operator queues up the next reply and
/// records what was written.
#[derive(Default)]
pub struct LoopbackTransport {
    pub last_write: Vec<u8>,
    pub next_reply: Vec<u8>,
}

impl BusTransport for LoopbackTransport {
    fn transfer(&mut self, write: &[u8]) -> Vec<u8> {
        self.last_write = write.to_vec();
        std::mem::take(&mut self.next_reply)
    }
}
