// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    #[error("frame MIC did not verify")]
    AuthenticationFailed,
    #[error("NWK protocol version is not supported")]
    UnsupportedVersion,
    #[error("no filter context accepted the frame")]
    FilterRejected,
    #[error("frame was too short to contain its declared fields")]
    Truncated,
    #[error("security counter was not greater than the last accepted value")]
    ReplayRejected,
    #[error("green power commissioning frame was malformed")]
    MalformedCommissioning,
    #[error("device roster has no free slot")]
    RosterFull,
    #[error("short address does not match a known device")]
    UnknownDevice,
}

pub type RadioResult<T> = Result<T, RadioError>;
