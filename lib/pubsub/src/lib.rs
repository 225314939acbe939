// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed publish/subscribe plane: plug categories, message conversion,
//! non-buffering subscriber dispatch, and an MQTT-SN bridge to the outside
//! world.

mod broker;
mod convert;
mod error;
mod events;
mod mqttsn;
mod plug;

pub use broker::{Delivery, DropReason, Source, Subscriber, SubscriberList};
pub use convert::{convert, match_rule, MatchRule};
pub use error::{PubsubError, PubsubResult};
pub use events::{Event, PUBSUB_EVENTS};
pub use mqttsn::{
    get_qos as mqttsn_get_qos, make_qos as mqttsn_make_qos, Bridge as MqttSnBridge,
    Flags as MqttSnFlags, Frame as MqttSnFrame, MessageType as MqttSnMessageType,
    ReturnCode as MqttSnReturnCode, State as MqttSnState,
};
pub use plug::{Category, ConvertOptions, Direction, Message, MessageKind};
