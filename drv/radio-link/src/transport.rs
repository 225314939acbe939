// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seam between the driver's frame logic and the physical radio. A real
//! board backs this with an 802.15.4 transceiver; the emulator backs it
//! with an in-memory queue of frames.

/// One radio exchange: `send` hands a frame to the transceiver for
/// transmission, `receive` polls for the next frame that cleared CCA
/// and the hardware's own address filter.
pub trait RadioTransport {
    fn send(&mut self, frame: &[u8]);
    fn receive(&mut self) -> Option<Vec<u8>>;
}

/// In-memory transport for tests: an operator queues up incoming
/// frames and records what was sent.
#[derive(Default)]
pub struct LoopbackTransport {
    pub sent: Vec<Vec<u8>>,
    pub incoming: Vec<Vec<u8>>,
}

impl RadioTransport for LoopbackTransport {
    fn send(&mut self, frame: &[u8]) {
        self.sent.push(frame.to_vec());
    }

    fn receive(&mut self) -> Option<Vec<u8>> {
        if self.incoming.is_empty() {
            None
        } else {
            Some(self.incoming.remove(0))
        }
    }
}
