// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Persisted record for a Green Power registration (C5's `Array<RadioDevice>`
//! named in SPEC_FULL.md §3), the radio-side counterpart of `bus_link::
//! BusDeviceRecord`. `drv/radio-link` itself stays free of a `flash-store`
//! dependency, same as `drv/bus-link`'s roster; persistence is entirely this
//! crate's job.

use zerocopy::{FromBytes, Immutable, IntoBytes};

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable)]
#[repr(C)]
pub struct RadioDeviceRecord {
    pub device_id: u32,
    pub key: [u8; 16],
    pub counter: u32,
}

impl From<&radio_link::GreenPowerRegistration> for RadioDeviceRecord {
    fn from(reg: &radio_link::GreenPowerRegistration) -> Self {
        RadioDeviceRecord { device_id: reg.device_id, key: reg.key, counter: reg.counter }
    }
}

impl From<RadioDeviceRecord> for radio_link::GreenPowerRegistration {
    fn from(record: RadioDeviceRecord) -> Self {
        radio_link::GreenPowerRegistration {
            device_id: record.device_id,
            key: record.key,
            counter: record.counter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_the_registration_type() {
        let reg = radio_link::GreenPowerRegistration { device_id: 9, key: [0x42; 16], counter: 3 };
        let record: RadioDeviceRecord = (&reg).into();
        let back: radio_link::GreenPowerRegistration = record.into();
        assert_eq!(back, reg);
    }
}
