// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT-SN broker/client bridge state machine.
//!
//! Pure state machine: callers feed it incoming frames and timer ticks and
//! collect outgoing frames from [`Bridge::poll_outgoing`]; the UDP socket
//! itself lives in the boundary glue, same separation as the bus/radio link
//! drivers keep from their transports.

use crate::error::{PubsubError, PubsubResult};
use crate::events::{Event, PUBSUB_EVENTS};
use crate::mqttsn::types::{get_qos, make_qos, Flags, MessageType, ReturnCode};
use ringbuf::ringbuf_entry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Disconnected,
    Connecting,
    Connected,
    KeepAlive,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Connect { duration_s: u16, client_id: [u8; 16], client_id_len: u8 },
    Connack { code: ReturnCode },
    Register { topic_id: u16, topic_name: [u8; 16], topic_name_len: u8 },
    Regack { topic_id: u16, code: ReturnCode },
    Publish { topic_id: u16, qos: i8, data: [u8; 32], data_len: u8 },
    Puback { topic_id: u16, code: ReturnCode },
    Pingreq,
    Pingresp,
    Disconnect,
}

const MAX_TOPICS: usize = 16;
/// Ticks of silence from the gateway before we consider the connection lost
/// and start a re-connect back-off.
const KEEP_ALIVE_TIMEOUT_TICKS: u32 = 3;

pub struct Bridge {
    state: State,
    topics: [(u16, [u8; 16], u8); MAX_TOPICS],
    topic_count: usize,
    ticks_since_activity: u32,
    backoff_ticks: u32,
    outgoing: Vec<Frame>,
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Bridge {
    pub fn new() -> Self {
        Bridge {
            state: State::Disconnected,
            topics: [(0, [0; 16], 0); MAX_TOPICS],
            topic_count: 0,
            ticks_since_activity: 0,
            backoff_ticks: 1,
            outgoing: Vec::new(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    fn set_state(&mut self, new: State) {
        if new != self.state {
            ringbuf_entry!(
                PUBSUB_EVENTS,
                Event::MqttSnStateChanged { from: self.state as u8, to: new as u8 }
            );
            self.state = new;
        }
    }

    /// Begin connecting: emits a CONNECT frame and moves to `Connecting`.
    pub fn connect(&mut self, client_id: &[u8], keep_alive_s: u16) {
        let mut id = [0u8; 16];
        let len = client_id.len().min(16);
        id[..len].copy_from_slice(&client_id[..len]);
        self.outgoing.push(Frame::Connect {
            duration_s: keep_alive_s,
            client_id: id,
            client_id_len: len as u8,
        });
        self.set_state(State::Connecting);
        self.ticks_since_activity = 0;
    }

    /// Register a topic name, returning the broker-assigned topic id once
    /// the REGACK arrives (tracked internally; callers look it up via
    /// [`Bridge::topic_id`]).
    pub fn register(&mut self, topic_name: &[u8]) -> PubsubResult<()> {
        if !matches!(self.state, State::Connected | State::KeepAlive) {
            return Err(PubsubError::NotConnected);
        }
        if self.topic_count >= MAX_TOPICS {
            return Err(PubsubError::RejectedCongested);
        }
        let mut name = [0u8; 16];
        let len = topic_name.len().min(16);
        name[..len].copy_from_slice(&topic_name[..len]);
        self.topics[self.topic_count] = (0, name, len as u8);
        self.topic_count += 1;
        self.outgoing.push(Frame::Register {
            topic_id: 0,
            topic_name: name,
            topic_name_len: len as u8,
        });
        Ok(())
    }

    pub fn topic_id(&self, topic_name: &[u8]) -> Option<u16> {
        self.topics[..self.topic_count]
            .iter()
            .find(|(_, name, len)| &name[..*len as usize] == topic_name)
            .map(|(id, _, _)| *id)
    }

    pub fn publish(&mut self, topic_id: u16, qos: i8, data: &[u8]) -> PubsubResult<()> {
        if !matches!(self.state, State::Connected | State::KeepAlive) {
            return Err(PubsubError::NotConnected);
        }
        if qos != 0 && qos != 1 {
            return Err(PubsubError::NotSupported);
        }
        let mut buf = [0u8; 32];
        let len = data.len().min(32);
        buf[..len].copy_from_slice(&data[..len]);
        self.outgoing.push(Frame::Publish { topic_id, qos, data: buf, data_len: len as u8 });
        Ok(())
    }

    /// Advance time by one tick; emits PINGREQ / triggers a reconnect
    /// back-off if the gateway has gone quiet.
    pub fn tick(&mut self) {
        if self.state == State::Disconnected {
            return;
        }
        self.ticks_since_activity += 1;
        if self.ticks_since_activity == KEEP_ALIVE_TIMEOUT_TICKS / 2 && self.state == State::Connected
        {
            self.set_state(State::KeepAlive);
            self.outgoing.push(Frame::Pingreq);
        } else if self.ticks_since_activity >= KEEP_ALIVE_TIMEOUT_TICKS {
            self.set_state(State::Disconnected);
            self.backoff_ticks = (self.backoff_ticks * 2).min(64);
        }
    }

    pub fn handle_incoming(&mut self, frame: Frame) {
        self.ticks_since_activity = 0;
        match frame {
            Frame::Connack { code } => {
                if code == ReturnCode::Accepted {
                    self.set_state(State::Connected);
                } else {
                    self.set_state(State::Disconnected);
                }
            }
            Frame::Regack { topic_id, code } => {
                if code == ReturnCode::Accepted {
                    // Bind to the oldest still-unacknowledged name slot
                    // (id 0 placeholder written by `register`); REGISTER/
                    // REGACK round trips are assumed not to interleave.
                    if let Some(slot) =
                        self.topics[..self.topic_count].iter_mut().find(|(id, _, _)| *id == 0)
                    {
                        slot.0 = topic_id;
                    }
                }
            }
            Frame::Pingresp => {}
            Frame::Disconnect => self.set_state(State::Disconnected),
            Frame::Publish { .. } | Frame::Register { .. } | Frame::Puback { .. } => {
                // Inbound PUBLISH/REGISTER/PUBACK are translated to plug
                // publications by the boundary glue, which owns the
                // subscriber list; the bridge only tracks connection state.
            }
            Frame::Connect { .. } | Frame::Pingreq => {
                // Broker-role frames; this bridge only implements the
                // client role named in spec.md §4.7.
            }
        }
    }

    /// Qos/flag helper retained for callers that need to build a raw
    /// [`Flags`] value for a frame they assemble themselves.
    pub fn publish_flags(qos: i8) -> Flags {
        make_qos(qos)
    }

    pub fn qos_of(flags: Flags) -> i8 {
        get_qos(flags)
    }

    pub fn poll_outgoing(&mut self) -> Option<Frame> {
        if self.outgoing.is_empty() {
            None
        } else {
            Some(self.outgoing.remove(0))
        }
    }

    pub fn message_type_of(frame: &Frame) -> MessageType {
        match frame {
            Frame::Connect { .. } => MessageType::Connect,
            Frame::Connack { .. } => MessageType::Connack,
            Frame::Register { .. } => MessageType::Register,
            Frame::Regack { .. } => MessageType::Regack,
            Frame::Publish { .. } => MessageType::Publish,
            Frame::Puback { .. } => MessageType::Puback,
            Frame::Pingreq => MessageType::Pingreq,
            Frame::Pingresp => MessageType::Pingresp,
            Frame::Disconnect => MessageType::Disconnect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_then_connack_reaches_connected() {
        let mut bridge = Bridge::new();
        bridge.connect(b"node1", 30);
        assert_eq!(bridge.state(), State::Connecting);
        assert_eq!(
            bridge.poll_outgoing(),
            Some(Frame::Connect {
                duration_s: 30,
                client_id: {
                    let mut b = [0u8; 16];
                    b[..5].copy_from_slice(b"node1");
                    b
                },
                client_id_len: 5,
            })
        );

        bridge.handle_incoming(Frame::Connack { code: ReturnCode::Accepted });
        assert_eq!(bridge.state(), State::Connected);
    }

    #[test]
    fn rejected_connack_falls_back_to_disconnected() {
        let mut bridge = Bridge::new();
        bridge.connect(b"node1", 30);
        bridge.handle_incoming(Frame::Connack { code: ReturnCode::RejectedCongested });
        assert_eq!(bridge.state(), State::Disconnected);
    }

    #[test]
    fn silence_past_keep_alive_drops_to_disconnected_and_backs_off() {
        let mut bridge = Bridge::new();
        bridge.connect(b"node1", 30);
        bridge.handle_incoming(Frame::Connack { code: ReturnCode::Accepted });
        for _ in 0..KEEP_ALIVE_TIMEOUT_TICKS {
            bridge.tick();
        }
        assert_eq!(bridge.state(), State::Disconnected);
        assert_eq!(bridge.backoff_ticks, 2);
    }

    #[test]
    fn publish_requires_connected_state() {
        let mut bridge = Bridge::new();
        assert_eq!(bridge.publish(1, 0, b"x"), Err(PubsubError::NotConnected));
    }

    #[test]
    fn register_then_regack_binds_topic_id() {
        let mut bridge = Bridge::new();
        bridge.connect(b"n", 30);
        bridge.handle_incoming(Frame::Connack { code: ReturnCode::Accepted });
        bridge.register(b"room/switch").unwrap();
        bridge.poll_outgoing();
        bridge.handle_incoming(Frame::Regack { topic_id: 7, code: ReturnCode::Accepted });
        assert_eq!(bridge.topic_id(b"room/switch"), Some(7));
    }
}
