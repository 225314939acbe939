// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bus device roster: the record persisted via [`flash_store::TypedArray`]
//! and the master's in-memory commissioning state machine.

use zerocopy::{FromBytes, Immutable, IntoBytes};

/// Persisted per-device record (C5's `Array<BusDevice>`), grounded in
/// `system/src/emu/BusMaster.cpp`'s `Device::Flash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable)]
#[repr(C)]
pub struct BusDeviceRecord {
    pub device_id: u32,
    pub commissioned: u8,
    pub short_address: u8,
    pub _pad: [u8; 2],
    pub aes_key: [u8; 16],
}

impl BusDeviceRecord {
    pub fn uncommissioned(device_id: u32) -> Self {
        BusDeviceRecord { device_id, commissioned: 0, short_address: 0, _pad: [0; 2], aes_key: [0; 16] }
    }

    pub fn is_commissioned(&self) -> bool {
        self.commissioned != 0
    }
}

/// The master's view of a device's progress through commissioning, per
/// spec.md §4.3's state machine. Any failure drops the device back to
/// `Uncommissioned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Uncommissioned,
    Enumerated,
    Commissioned,
    Ready,
}

impl DeviceState {
    pub fn on_enumeration_answered(self) -> Self {
        match self {
            DeviceState::Uncommissioned => DeviceState::Enumerated,
            other => other,
        }
    }

    pub fn on_commission_ack(self) -> Self {
        match self {
            DeviceState::Enumerated => DeviceState::Commissioned,
            other => other,
        }
    }

    pub fn on_persisted(self) -> Self {
        match self {
            DeviceState::Commissioned => DeviceState::Ready,
            other => other,
        }
    }

    pub fn on_failure(self) -> Self {
        DeviceState::Uncommissioned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_walks_every_state() {
        let mut state = DeviceState::Uncommissioned;
        state = state.on_enumeration_answered();
        assert_eq!(state, DeviceState::Enumerated);
        state = state.on_commission_ack();
        assert_eq!(state, DeviceState::Commissioned);
        state = state.on_persisted();
        assert_eq!(state, DeviceState::Ready);
    }

    #[test]
    fn failure_always_drops_to_uncommissioned() {
        assert_eq!(DeviceState::Ready.on_failure(), DeviceState::Uncommissioned);
        assert_eq!(DeviceState::Enumerated.on_failure(), DeviceState::Uncommissioned);
    }
}
