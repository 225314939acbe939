// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bus endpoint types and the values their frames carry, grounded in
//! `system/src/emu/BusMaster.cpp`'s `EndpointType` switch.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EndpointType {
    OnOffIn = 0,
    OnOffOut = 1,
    TriggerIn = 2,
    TriggerOut = 3,
    UpDownIn = 4,
    UpDownOut = 5,
    TemperatureIn = 6,
    TemperatureOut = 7,
}

impl EndpointType {
    pub fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            0 => Self::OnOffIn,
            1 => Self::OnOffOut,
            2 => Self::TriggerIn,
            3 => Self::TriggerOut,
            4 => Self::UpDownIn,
            5 => Self::UpDownOut,
            6 => Self::TemperatureIn,
            7 => Self::TemperatureOut,
            _ => return None,
        })
    }

    /// Width of the value this endpoint type carries on the wire.
    pub fn value_len(self) -> usize {
        match self {
            EndpointType::TemperatureIn | EndpointType::TemperatureOut => 2,
            _ => 1,
        }
    }
}

/// A decoded endpoint value. Temperature is carried as 1/20 Kelvin, per
/// spec.md §4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointValue {
    U8(u8),
    Temperature(u16),
}

impl EndpointValue {
    pub fn encode(self, out: &mut Vec<u8>) {
        match self {
            EndpointValue::U8(v) => out.push(v),
            EndpointValue::Temperature(v) => out.extend_from_slice(&v.to_le_bytes()),
        }
    }

    pub fn decode(endpoint_type: EndpointType, bytes: &[u8]) -> Option<Self> {
        match endpoint_type {
            EndpointType::TemperatureIn | EndpointType::TemperatureOut => {
                let v = *bytes.first()? as u16 | ((*bytes.get(1)? as u16) << 8);
                Some(EndpointValue::Temperature(v))
            }
            _ => Some(EndpointValue::U8(*bytes.first()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_round_trips_little_endian() {
        let mut buf = Vec::new();
        EndpointValue::Temperature(5865).encode(&mut buf);
        assert_eq!(
            EndpointValue::decode(EndpointType::TemperatureIn, &buf),
            Some(EndpointValue::Temperature(5865))
        );
    }

    #[test]
    fn on_off_is_one_byte() {
        assert_eq!(EndpointType::OnOffIn.value_len(), 1);
        assert_eq!(EndpointType::TemperatureOut.value_len(), 2);
    }
}
