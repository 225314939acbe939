// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PubsubError {
    #[error("gateway is congested")]
    RejectedCongested,
    #[error("topic id is not registered")]
    RejectedInvalidTopicId,
    #[error("requested QoS or feature is not supported")]
    NotSupported,
    #[error("client is not connected")]
    NotConnected,
}

pub type PubsubResult<T> = Result<T, PubsubError>;
