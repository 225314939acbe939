// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Green Power commissioning for unattended battery switches.
//! Grounded in `protocol/src/gp.hpp`.

use bitflags::bitflags;
use ccm_star::{AesKey, Nonce};

use crate::error::{RadioError, RadioResult};

/// The well-known key Green Power devices wrap their individual key
/// with before commissioning, per the Green Power specification.
pub const DEFAULT_GP_KEY: [u8; 16] = *b"ZigBeeAlliance09";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    OnOffSwitch = 0x02,
    GenericSwitch = 0x07,
}

impl DeviceType {
    pub fn from_byte(b: u8) -> Option<DeviceType> {
        match b {
            0x02 => Some(DeviceType::OnOffSwitch),
            0x07 => Some(DeviceType::GenericSwitch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Scene0 = 0x10,
    Scene1 = 0x11,
    Scene2 = 0x12,
    Scene3 = 0x13,
    Scene4 = 0x14,
    Scene5 = 0x15,
    Commissioning = 0xe0,
}

impl Command {
    pub fn from_byte(b: u8) -> Option<Command> {
        Some(match b {
            0x10 => Command::Scene0,
            0x11 => Command::Scene1,
            0x12 => Command::Scene2,
            0x13 => Command::Scene3,
            0x14 => Command::Scene4,
            0x15 => Command::Scene5,
            0xe0 => Command::Commissioning,
            _ => return None,
        })
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExtendedOptions: u8 {
        const KEY_TYPE_INDIVIDUAL = 1 << 3;
        const KEY_PRESENT = 1 << 4;
        const KEY_ENCRYPTED = 1 << 5;
        const COUNTER_PRESENT = 1 << 6;
    }
}

impl ExtendedOptions {
    pub fn security_level(self) -> u8 {
        self.bits() & 0x7
    }
}

/// A parsed `COMMISSIONING` command frame, before key unwrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommissioningFrame {
    pub device_id: u32,
    pub device_type: Option<DeviceType>,
    pub extended_options: ExtendedOptions,
    pub wrapped_key: Option<[u8; 16]>,
    pub counter: Option<u32>,
}

/// Parses a `COMMISSIONING` payload: `device_type, ext_options, [key],
/// [counter]`. The extended options bitfield governs which optional
/// fields are present and whether the key arrives wrapped.
pub fn parse_commissioning(device_id: u32, payload: &[u8]) -> RadioResult<CommissioningFrame> {
    if payload.len() < 2 {
        return Err(RadioError::MalformedCommissioning);
    }
    let device_type = DeviceType::from_byte(payload[0]);
    let extended_options = ExtendedOptions::from_bits_truncate(payload[1]);
    let mut cursor = 2;

    let wrapped_key = if extended_options.contains(ExtendedOptions::KEY_PRESENT) {
        if payload.len() < cursor + 16 {
            return Err(RadioError::MalformedCommissioning);
        }
        let mut key = [0u8; 16];
        key.copy_from_slice(&payload[cursor..cursor + 16]);
        cursor += 16;
        Some(key)
    } else {
        None
    };

    let counter = if extended_options.contains(ExtendedOptions::COUNTER_PRESENT) {
        if payload.len() < cursor + 4 {
            return Err(RadioError::MalformedCommissioning);
        }
        let c = u32::from_le_bytes(payload[cursor..cursor + 4].try_into().unwrap());
        cursor += 4;
        Some(c)
    } else {
        None
    };
    let _ = cursor;

    Ok(CommissioningFrame { device_id, device_type, extended_options, wrapped_key, counter })
}

/// Registration recorded for a commissioned device: the unwrapped
/// individual key and the counter its future scene commands must
/// exceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub device_id: u32,
    pub key: [u8; 16],
    pub counter: u32,
}

/// Unwraps a commissioning frame's key (if wrapped, decrypting it under
/// the default Green Power key) and builds the registration the
/// coordinator persists.
pub fn register(frame: &CommissioningFrame) -> RadioResult<Registration> {
    let wrapped = frame.wrapped_key.ok_or(RadioError::MalformedCommissioning)?;
    let key = if frame.extended_options.contains(ExtendedOptions::KEY_ENCRYPTED) {
        let default_key = AesKey::new(&DEFAULT_GP_KEY);
        let header = frame.device_id.to_le_bytes();
        let nonce = Nonce::green_power(frame.device_id, frame.counter.unwrap_or(0));
        let mut plain = [0u8; 16];
        if !ccm_star::decrypt(&mut plain, &nonce, &header, &wrapped, 16, 0, &default_key) {
            return Err(RadioError::AuthenticationFailed);
        }
        plain
    } else {
        wrapped
    };
    Ok(Registration { device_id: frame.device_id, key, counter: frame.counter.unwrap_or(0) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_frame_with_plain_key_and_counter() {
        let mut payload = vec![DeviceType::GenericSwitch as u8];
        payload.push((ExtendedOptions::KEY_PRESENT | ExtendedOptions::COUNTER_PRESENT).bits());
        payload.extend_from_slice(&[0x42; 16]);
        payload.extend_from_slice(&7u32.to_le_bytes());

        let frame = parse_commissioning(0x1000, &payload).unwrap();
        assert_eq!(frame.device_type, Some(DeviceType::GenericSwitch));
        assert_eq!(frame.wrapped_key, Some([0x42; 16]));
        assert_eq!(frame.counter, Some(7));
    }

    #[test]
    fn register_passes_through_an_unencrypted_key() {
        let frame = CommissioningFrame {
            device_id: 1,
            device_type: Some(DeviceType::OnOffSwitch),
            extended_options: ExtendedOptions::KEY_PRESENT,
            wrapped_key: Some([0x55; 16]),
            counter: Some(3),
        };
        let reg = register(&frame).unwrap();
        assert_eq!(reg.key, [0x55; 16]);
        assert_eq!(reg.counter, 3);
    }

    #[test]
    fn register_unwraps_an_encrypted_key() {
        let default_key = AesKey::new(&DEFAULT_GP_KEY);
        let header = 9u32.to_le_bytes();
        let nonce = Nonce::green_power(9, 0);
        let mut wrapped = [0u8; 16];
        ccm_star::encrypt(&mut wrapped, &nonce, &header, &[0x77; 16], 0, &default_key);

        let frame = CommissioningFrame {
            device_id: 9,
            device_type: None,
            extended_options: ExtendedOptions::KEY_PRESENT | ExtendedOptions::KEY_ENCRYPTED,
            wrapped_key: Some(wrapped),
            counter: None,
        };
        let reg = register(&frame).unwrap();
        assert_eq!(reg.key, [0x77; 16]);
    }

    #[test]
    fn missing_key_is_rejected() {
        let payload = vec![DeviceType::OnOffSwitch as u8, 0];
        let frame = parse_commissioning(1, &payload).unwrap();
        assert!(register(&frame).is_err());
    }

    #[test]
    fn truncated_payload_is_rejected() {
        assert!(parse_commissioning(1, &[0x02]).is_err());
    }
}
