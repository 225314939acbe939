// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT-SN 1.2 wire codec: encodes/decodes `pubsub::MqttSnFrame` to the
//! length-prefixed `[length][msg_type][payload]` framing the OASIS MQTT-SN
//! 1.2 spec defines (spec.md §6). `pubsub::mqttsn::Bridge` is deliberately a
//! pure state machine with no byte-level codec of its own (its own doc
//! comment assigns that job to boundary glue), so this module is where that
//! byte layer actually lives, the same separation the bus/radio link drivers
//! keep between frame logic and their `*Transport` traits.

use pubsub::{
    MqttSnBridge as Bridge, MqttSnFrame as Frame, MqttSnMessageType as MessageType,
    MqttSnReturnCode as ReturnCode,
};

/// Every payload fits comfortably under a one-byte MQTT-SN length field
/// (topic names and publish payloads are capped at 32 bytes by the bridge),
/// so the 3-byte extended-length encoding is never needed here.
pub fn encode(frame: &Frame) -> Vec<u8> {
    let msg_type = Bridge::message_type_of(frame);
    let mut body = Vec::new();
    match frame {
        Frame::Connect { duration_s, client_id, client_id_len } => {
            body.push(0x04); // flags: CLEAN_SESSION unset, no WILL
            body.push(0x01); // protocol id, fixed by the spec
            body.extend_from_slice(&duration_s.to_be_bytes());
            body.extend_from_slice(&client_id[..*client_id_len as usize]);
        }
        Frame::Connack { code } => body.push(*code as u8),
        Frame::Register { topic_id, topic_name, topic_name_len } => {
            body.extend_from_slice(&topic_id.to_be_bytes());
            body.extend_from_slice(&0u16.to_be_bytes());
            body.extend_from_slice(&topic_name[..*topic_name_len as usize]);
        }
        Frame::Regack { topic_id, code } => {
            body.extend_from_slice(&topic_id.to_be_bytes());
            body.extend_from_slice(&0u16.to_be_bytes());
            body.push(*code as u8);
        }
        Frame::Publish { topic_id, qos, data, data_len } => {
            body.push(pubsub::mqttsn_make_qos(*qos).bits());
            body.extend_from_slice(&topic_id.to_be_bytes());
            body.extend_from_slice(&0u16.to_be_bytes());
            body.extend_from_slice(&data[..*data_len as usize]);
        }
        Frame::Puback { topic_id, code } => {
            body.extend_from_slice(&topic_id.to_be_bytes());
            body.push(*code as u8);
        }
        Frame::Pingreq | Frame::Pingresp | Frame::Disconnect => {}
    }
    let total_len = 2 + body.len();
    let mut out = Vec::with_capacity(total_len);
    out.push(total_len as u8);
    out.push(msg_type as u8);
    out.extend_from_slice(&body);
    out
}

pub fn decode(bytes: &[u8]) -> Option<Frame> {
    if bytes.len() < 2 {
        return None;
    }
    let length = bytes[0] as usize;
    if bytes.len() < length || length < 2 {
        return None;
    }
    let msg_type = MessageType::from_byte(bytes[1])?;
    let body = &bytes[2..length];
    Some(match msg_type {
        MessageType::Connect => {
            if body.len() < 4 {
                return None;
            }
            let duration_s = u16::from_be_bytes([body[2], body[3]]);
            let mut client_id = [0u8; 16];
            let len = (body.len() - 4).min(16);
            client_id[..len].copy_from_slice(&body[4..4 + len]);
            Frame::Connect { duration_s, client_id, client_id_len: len as u8 }
        }
        MessageType::Connack => Frame::Connack { code: ReturnCode::from_byte(*body.first()?)? },
        MessageType::Register => {
            if body.len() < 4 {
                return None;
            }
            let topic_id = u16::from_be_bytes([body[0], body[1]]);
            let mut topic_name = [0u8; 16];
            let len = (body.len() - 4).min(16);
            topic_name[..len].copy_from_slice(&body[4..4 + len]);
            Frame::Register { topic_id, topic_name, topic_name_len: len as u8 }
        }
        MessageType::Regack => {
            if body.len() < 5 {
                return None;
            }
            let topic_id = u16::from_be_bytes([body[0], body[1]]);
            Frame::Regack { topic_id, code: ReturnCode::from_byte(body[4])? }
        }
        MessageType::Publish => {
            if body.len() < 5 {
                return None;
            }
            let qos = pubsub::mqttsn_get_qos(pubsub::MqttSnFlags::from_bits_truncate(body[0]));
            let topic_id = u16::from_be_bytes([body[1], body[2]]);
            let mut data = [0u8; 32];
            let len = (body.len() - 5).min(32);
            data[..len].copy_from_slice(&body[5..5 + len]);
            Frame::Publish { topic_id, qos, data, data_len: len as u8 }
        }
        MessageType::Puback => {
            if body.len() < 3 {
                return None;
            }
            let topic_id = u16::from_be_bytes([body[0], body[1]]);
            Frame::Puback { topic_id, code: ReturnCode::from_byte(body[2])? }
        }
        MessageType::Pingreq => Frame::Pingreq,
        MessageType::Pingresp => Frame::Pingresp,
        MessageType::Disconnect => Frame::Disconnect,
        MessageType::Advertise | MessageType::Searchgw | MessageType::Gwinfo => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_round_trips() {
        let mut client_id = [0u8; 16];
        client_id[..4].copy_from_slice(b"node");
        let frame = Frame::Connect { duration_s: 30, client_id, client_id_len: 4 };
        let wire = encode(&frame);
        assert_eq!(decode(&wire), Some(frame));
    }

    #[test]
    fn publish_round_trips_with_qos() {
        let mut data = [0u8; 32];
        data[..3].copy_from_slice(&[1, 2, 3]);
        let frame = Frame::Publish { topic_id: 7, qos: 1, data, data_len: 3 };
        let wire = encode(&frame);
        assert_eq!(decode(&wire), Some(frame));
    }

    #[test]
    fn disconnect_round_trips_with_no_body() {
        let wire = encode(&Frame::Disconnect);
        assert_eq!(wire.len(), 2);
        assert_eq!(decode(&wire), Some(Frame::Disconnect));
    }

    #[test]
    fn truncated_input_is_rejected() {
        assert_eq!(decode(&[5, 0x0c, 0, 0]), None);
    }
}
