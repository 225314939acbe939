// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod bridge;
mod types;

pub use bridge::{Bridge, Frame, State};
pub use types::{get_qos, make_qos, Flags, MessageType, ReturnCode};
