// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FeramError {
    #[error("index exceeds the configured element count")]
    ElementCountExceeded,
    #[error("payload exceeds 4 bytes")]
    ElementSizeExceeded,
    #[error("neither half of the record validated")]
    ChecksumError,
}

pub type FeramResult<T> = Result<T, FeramError>;
