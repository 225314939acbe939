// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Radio link layer: a subset of 802.15.4 MAC plus ZigBee NWK/APS/ZCL
//! and Green Power sufficient to coordinate battery switches and
//! lights over channels 11-26.

mod aps;
mod association;
mod coordinator;
mod error;
mod events;
mod filter;
mod green_power;
mod mac;
mod nwk;
mod security;
mod transport;
mod zcl;

pub use association::{
    association_request, association_response, beacon, beacon_request, data_request,
    parse_association_response, State as AssociationState,
};
pub use aps::{Command as ApsCommand, FrameControl as ApsFrameControl, FrameType as ApsFrameType, ZdpCommand};
pub use coordinator::Coordinator;
pub use error::{RadioError, RadioResult};
pub use events::{Event, RADIO_EVENTS};
pub use filter::{Flags as FilterFlags, FilterContext};
pub use green_power::{
    parse_commissioning, register, CommissioningFrame, Command as GreenPowerCommand, DeviceType,
    ExtendedOptions as GreenPowerExtendedOptions, Registration as GreenPowerRegistration, DEFAULT_GP_KEY,
};
pub use mac::{Address, Frame as MacFrame, FrameType as MacFrameType};
pub use nwk::{Command as NwkCommand, FrameControl as NwkFrameControl, FrameType as NwkFrameType, Version as NwkVersion};
pub use security::{
    Header as SecurityHeader, KeyIdentifier, SecurityControl, SecurityLevel, open as open_secured,
    secure,
};
pub use transport::{LoopbackTransport, RadioTransport};
pub use zcl::{
    default_response as zcl_default_response, recognize as zcl_recognize, Cluster as ZclCluster,
    ColorControlCommand, Command as ZclCommand, FrameControl as ZclFrameControl, LevelControlCommand,
    OnOffCommand, Recognized as ZclRecognized, Status as ZclStatus, ThermostatAttribute,
};
