// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wired-bus link layer: arbitration line coding, commissioning, and
//! CCM*-secured data frames over a half-duplex multi-drop serial bus.

mod arbiter;
mod device;
mod endpoint;
mod error;
mod events;
mod frame;
mod master;
mod transport;

pub use arbiter::{decode_arbiter, decode_short_address, encode_arbiter, encode_short_address};
pub use device::{BusDeviceRecord, DeviceState};
pub use endpoint::{EndpointType, EndpointValue};
pub use error::{BusError, BusResult};
pub use events::{Event, BUS_EVENTS};
pub use frame::{decode_data_frame, encode_data_frame, DecodedFrame, MIC_LEN};
pub use master::{BusMaster, RosterEntry, DEFAULT_KEY};
pub use transport::{BusTransport, LoopbackTransport};
