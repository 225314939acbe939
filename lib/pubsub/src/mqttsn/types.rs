// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT-SN 1.2 message types and flags, the subset named in spec.md §6
//! ("message types and flags per OASIS MQTT-SN 1.2"), grounded in
//! `protocol/src/mqttsn.hpp`.

use bitflags::bitflags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Advertise = 0x00,
    Searchgw = 0x01,
    Gwinfo = 0x02,
    Connect = 0x04,
    Connack = 0x05,
    Register = 0x0a,
    Regack = 0x0b,
    Publish = 0x0c,
    Puback = 0x0d,
    Pingreq = 0x16,
    Pingresp = 0x17,
    Disconnect = 0x18,
}

impl MessageType {
    pub fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            0x00 => Self::Advertise,
            0x01 => Self::Searchgw,
            0x02 => Self::Gwinfo,
            0x04 => Self::Connect,
            0x05 => Self::Connack,
            0x0a => Self::Register,
            0x0b => Self::Regack,
            0x0c => Self::Publish,
            0x0d => Self::Puback,
            0x16 => Self::Pingreq,
            0x17 => Self::Pingresp,
            0x18 => Self::Disconnect,
            _ => return None,
        })
    }
}

bitflags! {
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct Flags: u8 {
        const TOPIC_TYPE_NORMAL = 0x00;
        const TOPIC_TYPE_PREDEFINED = 0x01;
        const TOPIC_TYPE_SHORT = 0x02;
        const CLEAN_SESSION = 0x04;
        const WILL = 0x08;
        const RETAIN = 0x10;
        const QOS_0 = 0x00;
        const QOS_1 = 0x20;
        const QOS_2 = 0x40;
        const QOS_MINUS_1 = 0x60;
        const DUP = 0x80;
    }
}

const QOS_MASK: u8 = 0x60;

pub fn get_qos(flags: Flags) -> i8 {
    let qos = ((flags.bits() & QOS_MASK) >> 5) as i8;
    ((qos + 1) & 3) - 1
}

pub fn make_qos(qos: i8) -> Flags {
    Flags::from_bits_truncate(((qos & 3) as u8) << 5)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReturnCode {
    Accepted = 0,
    RejectedCongested = 1,
    RejectedInvalidTopicId = 2,
    NotSupported = 3,
}

impl ReturnCode {
    pub fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            0 => Self::Accepted,
            1 => Self::RejectedCongested,
            2 => Self::RejectedInvalidTopicId,
            3 => Self::NotSupported,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qos_round_trips_through_flags() {
        for qos in [0i8, 1, 2, -1] {
            assert_eq!(get_qos(make_qos(qos)), qos);
        }
    }

    #[test]
    fn message_type_round_trips() {
        for &b in &[0x00, 0x04, 0x05, 0x0a, 0x0b, 0x0c, 0x0d, 0x16, 0x17, 0x18] {
            let t = MessageType::from_byte(b).unwrap();
            assert_eq!(t as u8, b);
        }
    }
}
