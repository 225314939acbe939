// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FlashStoreError {
    #[error("write would exceed the store's flash budget")]
    OutOfMemory,
    #[error("log in the active region is corrupt")]
    CorruptLog,
    #[error("array index out of range")]
    UnknownArray,
    #[error("element index out of range")]
    IndexOutOfRange,
    #[error("total element count across all arrays exceeds the configured maximum")]
    ElementCountExceeded,
}
