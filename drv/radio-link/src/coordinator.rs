// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ties the filter contexts, association sequence, Green Power
//! commissioning, and ZCL dispatch into one polling loop.

use ringbuf::ringbuf_entry;

use crate::association::{self, State as AssociationState};
use crate::error::{RadioError, RadioResult};
use crate::events::{Event, RADIO_EVENTS};
use crate::filter::FilterContext;
use crate::green_power::{self, Registration};
use crate::mac::{Frame, FrameType};
use crate::transport::RadioTransport;
use crate::zcl::{self, Cluster, Command as ZclCommand, FrameControl as ZclFrameControl, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropReason {
    FilterRejected = 0,
    AuthenticationFailed = 1,
    ReplayRejected = 2,
}

pub struct Coordinator<T: RadioTransport> {
    transport: T,
    contexts: Vec<FilterContext>,
    association: AssociationState,
    green_power: Vec<Registration>,
}

impl<T: RadioTransport> Coordinator<T> {
    pub fn new(transport: T, contexts: Vec<FilterContext>) -> Self {
        Coordinator { transport, contexts, association: AssociationState::Idle, green_power: Vec::new() }
    }

    pub fn green_power_registrations(&self) -> &[Registration] {
        &self.green_power
    }

    /// Replaces the in-memory Green Power registrations wholesale, used at
    /// startup to load previously-commissioned devices back from persistent
    /// storage without re-running commissioning, mirroring `BusMaster::restore`.
    pub fn restore_green_power(&mut self, registrations: Vec<Registration>) {
        self.green_power = registrations;
    }

    pub fn association_state(&self) -> AssociationState {
        self.association
    }

    /// Polls the transport for one frame and routes it to every filter
    /// context that accepts it. Returns the number of contexts the
    /// frame was delivered to.
    pub fn poll(&mut self) -> RadioResult<usize> {
        let Some(wire) = self.transport.receive() else {
            return Ok(0);
        };
        let frame = Frame::decode(&wire).ok_or(RadioError::Truncated)?;

        let mut delivered = 0;
        for (index, context) in self.contexts.iter().enumerate() {
            if !context.accepts(&frame) {
                continue;
            }
            delivered += 1;
            ringbuf_entry!(RADIO_EVENTS, Event::FrameAccepted { context: index as u8 });
            if context.wants_immediate_ack(&frame) {
                self.transport.send(&Frame::ack(frame.seq).encode());
                ringbuf_entry!(RADIO_EVENTS, Event::ImmediateAckSent { seq: frame.seq });
            }
        }
        if delivered == 0 {
            ringbuf_entry!(RADIO_EVENTS, Event::FrameDropped { reason: DropReason::FilterRejected as u8 });
            return Err(RadioError::FilterRejected);
        }

        match frame.frame_type {
            FrameType::Command => self.handle_command(&frame)?,
            FrameType::Data => self.handle_data(&frame)?,
            _ => {}
        }
        Ok(delivered)
    }

    fn handle_command(&mut self, frame: &Frame) -> RadioResult<()> {
        if frame.payload.first() == Some(&0x01) {
            // association request, low nibble carries extended addressing
            // by construction of `association::association_request`.
            if let crate::mac::Address::Extended(ext) = frame.src_addr {
                self.association = self.association.on_association_request(ext);
            }
        }
        Ok(())
    }

    /// Green Power commissioning frames arrive as ordinary data frames
    /// addressed with the Green Power NWK frame type; everything else
    /// is handed to the ZCL dispatcher.
    fn handle_data(&mut self, frame: &Frame) -> RadioResult<()> {
        if frame.payload.first() == Some(&(green_power::Command::Commissioning as u8)) {
            let device_id = match frame.src_addr {
                crate::mac::Address::Short(s) => s as u32,
                crate::mac::Address::Extended(e) => e as u32,
                crate::mac::Address::None => 0,
            };
            let commissioning = green_power::parse_commissioning(device_id, &frame.payload[1..])
                .map_err(|_| RadioError::MalformedCommissioning)?;
            let registration = green_power::register(&commissioning)?;
            self.green_power.retain(|r| r.device_id != registration.device_id);
            self.green_power.push(registration.clone());
            ringbuf_entry!(RADIO_EVENTS, Event::GreenPowerCommissioned { device_id: registration.device_id });
            return Ok(());
        }

        if frame.payload.len() < 3 {
            return Ok(());
        }
        let frame_control = ZclFrameControl::from_bits_truncate(frame.payload[0]);
        let cluster_bytes = &frame.payload[1..3];
        let cluster_id = u16::from_le_bytes([cluster_bytes[0], cluster_bytes[1]]);
        let command_byte = *frame.payload.get(3).unwrap_or(&0);

        let Some(cluster) = Cluster::from_u16(cluster_id) else {
            self.send_default_response(frame, command_byte, Status::UnsupportedAttribute);
            return Ok(());
        };
        if zcl::recognize(cluster, frame_control, command_byte).is_none()
            && command_byte != ZclCommand::ReadAttributes as u8
        {
            self.send_default_response(frame, command_byte, Status::UnsupportedAttribute);
        }
        Ok(())
    }

    fn send_default_response(&mut self, frame: &Frame, command: u8, status: Status) {
        let body = zcl::default_response(command, status);
        let response = Frame {
            frame_type: FrameType::Data,
            security_enabled: false,
            ack_request: false,
            dest_pan: frame.src_pan,
            dest_addr: frame.src_addr,
            src_pan: frame.dest_pan,
            src_addr: frame.dest_addr,
            seq: frame.seq,
            payload: body,
        };
        self.transport.send(&response.encode());
        ringbuf_entry!(
            RADIO_EVENTS,
            Event::DefaultResponseSent { cluster: 0, command }
        );
    }

    /// Issues the beacon request that starts an association sequence.
    pub fn start_association(&mut self, pan_id: u16) {
        self.transport.send(&association::beacon_request(pan_id).encode());
        self.association = self.association.on_beacon_request();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Flags;
    use crate::mac::Address;
    use crate::transport::LoopbackTransport;

    fn pass_all() -> Vec<FilterContext> {
        vec![FilterContext::new(Flags::PASS_ALL | Flags::HANDLE_ACK, 0x1234, 0x0000)]
    }

    #[test]
    fn unknown_cluster_triggers_default_response() {
        let mut transport = LoopbackTransport::default();
        let frame = Frame {
            frame_type: FrameType::Data,
            security_enabled: false,
            ack_request: false,
            dest_pan: 0x1234,
            dest_addr: Address::Short(0),
            src_pan: 0x1234,
            src_addr: Address::Short(1),
            seq: 9,
            payload: vec![0x01, 0xff, 0xff, 0x55],
        };
        transport.incoming.push(frame.encode());
        let mut coordinator = Coordinator::new(transport, pass_all());
        coordinator.poll().unwrap();
        assert_eq!(coordinator.transport.sent.len(), 1);
        let response = Frame::decode(&coordinator.transport.sent[0]).unwrap();
        assert_eq!(response.payload, vec![0x0b, 0x55, 0x86]);
    }

    #[test]
    fn green_power_commissioning_registers_device() {
        let mut transport = LoopbackTransport::default();
        let mut payload = vec![green_power::Command::Commissioning as u8];
        payload.push(0x07); // generic switch
        payload.push(
            (green_power::ExtendedOptions::KEY_PRESENT | green_power::ExtendedOptions::COUNTER_PRESENT).bits(),
        );
        payload.extend_from_slice(&[0xab; 16]);
        payload.extend_from_slice(&1u32.to_le_bytes());
        let frame = Frame {
            frame_type: FrameType::Data,
            security_enabled: false,
            ack_request: false,
            dest_pan: 0x1234,
            dest_addr: Address::Short(0),
            src_pan: 0x1234,
            src_addr: Address::Short(42),
            seq: 1,
            payload,
        };
        transport.incoming.push(frame.encode());
        let mut coordinator = Coordinator::new(transport, pass_all());
        coordinator.poll().unwrap();
        assert_eq!(coordinator.green_power_registrations().len(), 1);
        assert_eq!(coordinator.green_power_registrations()[0].device_id, 42);
    }

    #[test]
    fn frame_rejected_by_every_context_is_reported() {
        let mut transport = LoopbackTransport::default();
        let frame = Frame {
            frame_type: FrameType::Data,
            security_enabled: false,
            ack_request: false,
            dest_pan: 0x9999,
            dest_addr: Address::Short(5),
            src_pan: 0x9999,
            src_addr: Address::Short(1),
            seq: 1,
            payload: vec![],
        };
        transport.incoming.push(frame.encode());
        let contexts = vec![FilterContext::new(Flags::DEST_SHORT, 0x1234, 0)];
        let mut coordinator = Coordinator::new(transport, contexts);
        assert_eq!(coordinator.poll(), Err(RadioError::FilterRejected));
    }
}
