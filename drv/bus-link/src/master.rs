// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bus master: commissioning, polling, and writing to the device roster.
//! Grounded in `system/src/emu/BusMaster.cpp`'s `handle()` dispatch.

use ccm_star::{AesKey, Nonce};

use crate::arbiter::{decode_arbiter, encode_arbiter};
use crate::device::{BusDeviceRecord, DeviceState};
use crate::endpoint::EndpointValue;
use ringbuf::ringbuf_entry;

use crate::error::{BusError, BusResult};
use crate::events::{Event, BUS_EVENTS};
use crate::frame::{decode_data_frame, encode_data_frame, MIC_LEN};
use crate::transport::BusTransport;

/// The well-known key new devices ship with before commissioning assigns
/// them an individual one. Arbitrary 16 bytes, documented rather than
/// derived from the source firmware's expanded AES-128 round-key table
/// (which isn't a raw key we can feed back into a fresh key schedule).
pub const DEFAULT_KEY: [u8; 16] = *b"default-bus-key\0";

/// Number of leading 2-bit chunks of a 32-bit device id carried over the
/// bus during enumeration. Mirrors the source's `w.arbiter((id & 3) + 1)`
/// loop exactly, including its every-third-bit right shift -- one bit of
/// id is dropped per chunk, so only device ids whose dropped bits are zero
/// round-trip losslessly. This is inherited behavior, not a new defect.
const DEVICE_ID_CHUNKS: usize = 11;

/// The inverse of this encoding only runs on the node side, out of scope
/// for this master-only crate; kept here for tests that stand in for a
/// peer device.
#[cfg(test)]
fn encode_device_id(id: u32) -> [u8; DEVICE_ID_CHUNKS] {
    let mut id = id;
    let mut out = [0u8; DEVICE_ID_CHUNKS];
    for slot in out.iter_mut() {
        *slot = encode_arbiter(((id & 3) + 1) as u8);
        id >>= 3;
    }
    out
}

fn decode_device_id(bytes: &[u8; DEVICE_ID_CHUNKS]) -> u32 {
    let mut id: u32 = 0;
    for &b in bytes.iter().rev() {
        let chunk = decode_arbiter(b).wrapping_sub(1) as u32 & 3;
        id = (id << 3) | chunk;
    }
    id
}

#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub record: BusDeviceRecord,
    pub state: DeviceState,
    pub rx_counter: u32,
    pub tx_counter: u32,
}

pub struct BusMaster<T: BusTransport> {
    transport: T,
    roster: Vec<RosterEntry>,
}

impl<T: BusTransport> BusMaster<T> {
    pub fn new(transport: T) -> Self {
        BusMaster { transport, roster: Vec::new() }
    }

    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    /// Replaces the in-memory roster wholesale, used at startup to load
    /// previously-commissioned devices back from persistent storage
    /// without re-running the commissioning handshake.
    pub fn restore(&mut self, entries: Vec<RosterEntry>) {
        self.roster = entries;
    }

    /// Sends the 1-byte enumeration command and, if an uncommissioned
    /// device answers, adds it to the roster in `Enumerated` state.
    pub fn enumerate(&mut self) -> BusResult<u32> {
        let reply = self.transport.transfer(&[0x00]);
        // marker byte, 11 arbiter chunks, ciphertext body, MIC.
        if reply.len() < 1 + DEVICE_ID_CHUNKS + MIC_LEN {
            return Err(BusError::NoUncommissionedDevice);
        }
        let header = &reply[0..1 + DEVICE_ID_CHUNKS];
        let mut chunks = [0u8; DEVICE_ID_CHUNKS];
        chunks.copy_from_slice(&reply[1..1 + DEVICE_ID_CHUNKS]);
        let device_id = decode_device_id(&chunks);

        let key = AesKey::new(&DEFAULT_KEY);
        let nonce = Nonce::wire(0, 0, 0);
        let cipher_with_mic = &reply[1 + DEVICE_ID_CHUNKS..];
        let payload_len = cipher_with_mic.len() - MIC_LEN;
        let mut body = vec![0u8; payload_len];
        if !ccm_star::decrypt(&mut body, &nonce, header, cipher_with_mic, payload_len, MIC_LEN, &key) {
            return Err(BusError::AuthenticationFailed);
        }

        self.roster.push(RosterEntry {
            record: BusDeviceRecord::uncommissioned(device_id),
            state: DeviceState::Uncommissioned.on_enumeration_answered(),
            rx_counter: 0,
            tx_counter: 0,
        });
        ringbuf_entry!(BUS_EVENTS, Event::Enumerated { device_id });
        Ok(device_id)
    }

    /// Assigns `short_address`/`key` to `device_id`, which must currently be
    /// `Enumerated`.
    pub fn commission(&mut self, device_id: u32, short_address: u8, key: [u8; 16]) -> BusResult<()> {
        let entry = self
            .roster
            .iter_mut()
            .find(|e| e.record.device_id == device_id)
            .ok_or(BusError::UnknownDevice)?;

        let mut plain = Vec::with_capacity(1 + 16);
        plain.push(short_address);
        plain.extend_from_slice(&key);

        let default_key = AesKey::new(&DEFAULT_KEY);
        let header = {
            let mut h = Vec::with_capacity(1 + 4);
            h.push(0x00);
            h.extend_from_slice(&device_id.to_le_bytes());
            h
        };
        let nonce = Nonce::wire(0, 0, 0);
        let mut cipher = vec![0u8; plain.len() + MIC_LEN];
        ccm_star::encrypt(&mut cipher, &nonce, &header, &plain, MIC_LEN, &default_key);

        let mut wire = vec![0x00, 0x00];
        wire.extend_from_slice(&device_id.to_le_bytes());
        wire.extend_from_slice(&cipher);
        self.transport.transfer(&wire);

        entry.state = entry.state.on_commission_ack();
        entry.record.short_address = short_address;
        entry.record.aes_key = key;
        entry.record.commissioned = 1;
        entry.state = entry.state.on_persisted();
        ringbuf_entry!(BUS_EVENTS, Event::Commissioned { device_id, short_address });
        Ok(())
    }

    /// Polls for a ready device's pending read by sending an empty frame
    /// and decrypting whatever comes back with the matching device's key.
    pub fn poll_read(&mut self) -> BusResult<Option<(u8, u8, EndpointValue)>> {
        let reply = self.transport.transfer(&[]);
        if reply.is_empty() {
            return Ok(None);
        }
        for entry in &mut self.roster {
            if !entry.record.is_commissioned() {
                continue;
            }
            let key = AesKey::new(&entry.record.aes_key);
            if let Some(decoded) = decode_data_frame(&reply, &key) {
                if decoded.short_address != entry.record.short_address {
                    continue;
                }
                if decoded.counter <= entry.rx_counter {
                    ringbuf_entry!(
                        BUS_EVENTS,
                        Event::FrameDropped { reason: DropReason::Replay as u8 }
                    );
                    return Err(BusError::ReplayRejected);
                }
                entry.rx_counter = decoded.counter;
                let endpoint_index = *decoded.body.first().ok_or(BusError::AuthenticationFailed)?;
                let value = EndpointValue::U8(*decoded.body.get(1).unwrap_or(&0));
                ringbuf_entry!(
                    BUS_EVENTS,
                    Event::FrameAccepted { short_address: decoded.short_address }
                );
                return Ok(Some((decoded.short_address, endpoint_index, value)));
            }
        }
        ringbuf_entry!(BUS_EVENTS, Event::FrameDropped { reason: DropReason::Unauthenticated as u8 });
        Err(BusError::AuthenticationFailed)
    }

    /// Writes `value` to `endpoint_index` on `short_address`.
    pub fn write(&mut self, short_address: u8, endpoint_index: u8, value: EndpointValue) -> BusResult<()> {
        let entry = self
            .roster
            .iter_mut()
            .find(|e| e.record.short_address == short_address && e.record.is_commissioned())
            .ok_or(BusError::UnknownDevice)?;

        let mut plain = vec![endpoint_index];
        value.encode(&mut plain);

        entry.tx_counter = entry.tx_counter.wrapping_add(1);
        let key = AesKey::new(&entry.record.aes_key);
        let wire = encode_data_frame(short_address, entry.tx_counter, &plain, &key);
        self.transport.transfer(&wire);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropReason {
    Replay = 0,
    Unauthenticated = 1,
}
