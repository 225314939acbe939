// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ZigBee network layer frame control and commands.
//! Grounded in `network/src/zb.hpp`'s `NwkFrameControl`/`NwkCommand`.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FrameControl: u16 {
        const DISCOVER_ROUTE_ENABLE = 1 << 6;
        const MULTICAST = 1 << 8;
        const SECURITY = 1 << 9;
        const SOURCE_ROUTE = 1 << 10;
        const DESTINATION = 1 << 11;
        const EXTENDED_SOURCE = 1 << 12;
        const END_DEVICE_INITIATOR = 1 << 13;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Data,
    Command,
}

impl FrameType {
    pub fn from_bits(bits: u16) -> Self {
        if bits & 0x3 == 1 {
            FrameType::Command
        } else {
            FrameType::Data
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    V1,
    V2,
    V3GreenPower,
    Unknown,
}

impl Version {
    pub fn from_bits(bits: u16) -> Self {
        match (bits >> 2) & 0xf {
            1 => Version::V1,
            2 => Version::V2,
            3 => Version::V3GreenPower,
            _ => Version::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    RouteRequest = 1,
    RouteReply = 2,
    NetworkStatus = 3,
    Leave = 4,
    RouteRecord = 5,
    RejoinRequest = 6,
    RejoinResponse = 7,
    LinkStatus = 8,
    NetworkReport = 9,
    NetworkUpdate = 10,
}

impl Command {
    pub fn from_byte(b: u8) -> Option<Command> {
        Some(match b {
            1 => Command::RouteRequest,
            2 => Command::RouteReply,
            3 => Command::NetworkStatus,
            4 => Command::Leave,
            5 => Command::RouteRecord,
            6 => Command::RejoinRequest,
            7 => Command::RejoinResponse,
            8 => Command::LinkStatus,
            9 => Command::NetworkReport,
            10 => Command::NetworkUpdate,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_type_reads_low_two_bits() {
        assert_eq!(FrameType::from_bits(0), FrameType::Data);
        assert_eq!(FrameType::from_bits(1), FrameType::Command);
    }

    #[test]
    fn version_reads_green_power() {
        assert_eq!(Version::from_bits(3 << 2), Version::V3GreenPower);
        assert_eq!(Version::from_bits(2 << 2), Version::V2);
    }

    #[test]
    fn command_round_trips_known_values() {
        assert_eq!(Command::from_byte(8), Some(Command::LinkStatus));
        assert_eq!(Command::from_byte(0), None);
    }
}
