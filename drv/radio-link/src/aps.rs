// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Application support sub-layer: frame control, ZDP, and the handful
//! of APS commands (transport key, update device) a coordinator needs.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FrameControl: u8 {
        const SECURITY = 1 << 5;
        const ACKNOWLEDGEMENT_REQUEST = 1 << 6;
        const EXTENDED = 1 << 7;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Data,
    Command,
    Ack,
}

impl FrameType {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            1 => FrameType::Command,
            2 => FrameType::Ack,
            _ => FrameType::Data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TransportKey = 5,
    UpdateDevice = 6,
}

impl Command {
    pub fn from_byte(b: u8) -> Option<Command> {
        match b {
            5 => Some(Command::TransportKey),
            6 => Some(Command::UpdateDevice),
            _ => None,
        }
    }
}

/// Device-profile commands: address discovery, descriptors, matching,
/// announcements, and binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZdpCommand {
    NetworkAddressRequest = 0x0000,
    ExtendedAddressRequest = 0x0001,
    ExtendedAddressResponse = 0x8001,
    NodeDescriptorRequest = 0x0002,
    NodeDescriptorResponse = 0x8002,
    SimpleDescriptorRequest = 0x0004,
    SimpleDescriptorResponse = 0x8004,
    ActiveEndpointRequest = 0x0005,
    ActiveEndpointResponse = 0x8005,
    MatchDescriptorRequest = 0x0006,
    MatchDescriptorResponse = 0x8006,
    DeviceAnnouncement = 0x0013,
    BindRequest = 0x0021,
    BindResponse = 0x8021,
    PermitJoinRequest = 0x0036,
}

impl ZdpCommand {
    pub fn from_u16(v: u16) -> Option<ZdpCommand> {
        Some(match v {
            0x0000 => ZdpCommand::NetworkAddressRequest,
            0x0001 => ZdpCommand::ExtendedAddressRequest,
            0x8001 => ZdpCommand::ExtendedAddressResponse,
            0x0002 => ZdpCommand::NodeDescriptorRequest,
            0x8002 => ZdpCommand::NodeDescriptorResponse,
            0x0004 => ZdpCommand::SimpleDescriptorRequest,
            0x8004 => ZdpCommand::SimpleDescriptorResponse,
            0x0005 => ZdpCommand::ActiveEndpointRequest,
            0x8005 => ZdpCommand::ActiveEndpointResponse,
            0x0006 => ZdpCommand::MatchDescriptorRequest,
            0x8006 => ZdpCommand::MatchDescriptorResponse,
            0x0013 => ZdpCommand::DeviceAnnouncement,
            0x0021 => ZdpCommand::BindRequest,
            0x8021 => ZdpCommand::BindResponse,
            0x0036 => ZdpCommand::PermitJoinRequest,
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
        assert_eq!(FrameType::from_bits(2), FrameType::Ack);
    }

    #[test]
    fn zdp_command_round_trips_known_values() {
        assert_eq!(ZdpCommand::from_u16(0x0013), Some(ZdpCommand::DeviceAnnouncement));
        assert_eq!(ZdpCommand::from_u16(0xffff), None);
    }
}
