// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Durable counter storage over FeRAM: small, frequently-rewritten values
//! (radio frame counters, replay windows) that need to survive a reset
//! without wearing out flash.

mod error;
mod events;
mod medium;
mod record;
mod store;

pub use error::{FeramError, FeramResult};
pub use events::{Event, FERAM_EVENTS};
pub use medium::{FeramMedium, MemoryFeram};
pub use record::{MAX_PAYLOAD_LEN, RECORD_LEN};
pub use store::FeramStore;
