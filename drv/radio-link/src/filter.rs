// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Receive filter contexts. The radio typically runs two: one bound to
//! the commissioned ZigBee PAN, one scanning for Green Power frames.

use bitflags::bitflags;

use crate::mac::{Address, Frame, FrameType};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags: u8 {
        const PASS_ALL = 1 << 0;
        const TYPE_BEACON = 1 << 1;
        const DEST_SHORT = 1 << 2;
        /// Green Power frames: data frames addressed to our short address
        /// that the coordinator must still hand to the GP sink.
        const TYPE_DATA_DEST_SHORT = 1 << 3;
        const DEST_LONG = 1 << 4;
        /// Delegates immediate ACK generation to the driver so the
        /// turnaround deadline is met without round-tripping to a task.
        const HANDLE_ACK = 1 << 5;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterContext {
    pub flags: Flags,
    pub pan_id: u16,
    pub short_address: u16,
}

impl FilterContext {
    pub fn new(flags: Flags, pan_id: u16, short_address: u16) -> Self {
        FilterContext { flags, pan_id, short_address }
    }

    pub fn accepts(&self, frame: &Frame) -> bool {
        if self.flags.contains(Flags::PASS_ALL) {
            return true;
        }
        if self.flags.contains(Flags::TYPE_BEACON) && frame.frame_type == FrameType::Beacon {
            return true;
        }
        if frame.dest_pan != self.pan_id && frame.dest_addr != Address::None {
            return false;
        }
        if self.flags.contains(Flags::DEST_SHORT)
            && frame.dest_addr == Address::Short(self.short_address)
        {
            return true;
        }
        if self.flags.contains(Flags::TYPE_DATA_DEST_SHORT)
            && frame.frame_type == FrameType::Data
            && frame.dest_addr == Address::Short(self.short_address)
        {
            return true;
        }
        if self.flags.contains(Flags::DEST_LONG) {
            if let Address::Extended(_) = frame.dest_addr {
                return true;
            }
        }
        false
    }

    pub fn wants_immediate_ack(&self, frame: &Frame) -> bool {
        self.flags.contains(Flags::HANDLE_ACK) && frame.ack_request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_frame(dest: Address, pan: u16) -> Frame {
        Frame {
            frame_type: FrameType::Data,
            security_enabled: false,
            ack_request: true,
            dest_pan: pan,
            dest_addr: dest,
            src_pan: pan,
            src_addr: Address::Short(1),
            seq: 1,
            payload: vec![],
        }
    }

    #[test]
    fn pass_all_accepts_everything() {
        let ctx = FilterContext::new(Flags::PASS_ALL, 0, 0);
        assert!(ctx.accepts(&data_frame(Address::Short(99), 99)));
    }

    #[test]
    fn dest_short_requires_matching_pan_and_address() {
        let ctx = FilterContext::new(Flags::DEST_SHORT, 0x1234, 0x0002);
        assert!(ctx.accepts(&data_frame(Address::Short(0x0002), 0x1234)));
        assert!(!ctx.accepts(&data_frame(Address::Short(0x0002), 0x9999)));
        assert!(!ctx.accepts(&data_frame(Address::Short(0x0003), 0x1234)));
    }

    #[test]
    fn beacons_pass_type_beacon_filter_regardless_of_address() {
        let ctx = FilterContext::new(Flags::TYPE_BEACON, 0x1234, 0);
        let mut beacon = data_frame(Address::None, 0x1234);
        beacon.frame_type = FrameType::Beacon;
        assert!(ctx.accepts(&beacon));
    }

    #[test]
    fn handle_ack_only_applies_when_frame_requests_one() {
        let ctx = FilterContext::new(Flags::HANDLE_ACK, 0x1234, 0x0002);
        let frame = data_frame(Address::Short(0x0002), 0x1234);
        assert!(ctx.wants_immediate_ack(&frame));
        let mut unacked = frame;
        unacked.ack_request = false;
        assert!(!ctx.wants_immediate_ack(&unacked));
    }
}
