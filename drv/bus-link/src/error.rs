// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    #[error("frame MIC did not verify")]
    AuthenticationFailed,
    #[error("security counter was not greater than the last accepted value")]
    ReplayRejected,
    #[error("no device answered the enumeration command")]
    NoUncommissionedDevice,
    #[error("device roster has no free slot")]
    RosterFull,
    #[error("short address does not match a known device")]
    UnknownDevice,
}

pub type BusResult<T> = Result<T, BusError>;
