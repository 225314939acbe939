// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dual-half durable counter storage over FeRAM.
//!
//! Each record occupies [`record::RECORD_LEN`] bytes, split into two halves
//! that alternate on every write. On open, both halves of every record are
//! read back; the half with the more recent generation (mod-4 rollover)
//! wins. If only one half validates, that half wins outright -- this is how
//! the store survives a reset that happened mid-write. If neither half
//! validates the record reads back as all-zero with a checksum error, since
//! there is no way to distinguish "never written" from "both halves
//! corrupt".

use ringbuf::ringbuf_entry;

use crate::error::{FeramError, FeramResult};
use crate::events::{Event, FERAM_EVENTS};
use crate::medium::FeramMedium;
use crate::record::{self, DecodedHalf, HALF_LEN, MAX_PAYLOAD_LEN, RECORD_LEN};

pub struct FeramStore<M: FeramMedium> {
    medium: M,
    element_count: usize,
    /// Next generation to write, per record index (0..=3, wrapping).
    next_gen: Vec<u8>,
}

impl<M: FeramMedium> FeramStore<M> {
    pub fn open(medium: M, element_count: usize) -> FeramResult<Self> {
        if element_count * RECORD_LEN > medium.len() {
            return Err(FeramError::ElementCountExceeded);
        }
        let mut store = Self { medium, element_count, next_gen: vec![0; element_count] };
        for index in 0..element_count {
            if let Ok(Some((gen, _))) = store.winning_half(index) {
                store.next_gen[index] = gen.wrapping_add(1) & 0x3;
            }
        }
        Ok(store)
    }

    fn offset(&self, index: usize) -> usize {
        index * RECORD_LEN
    }

    fn read_half(&self, index: usize, half: usize) -> [u8; HALF_LEN] {
        let mut buf = [0u8; HALF_LEN];
        self.medium.read(self.offset(index) + half * HALF_LEN, &mut buf);
        buf
    }

    /// The half that should win a read, paired with its fully reconstructed
    /// write generation (the stored sequence bit plus the physical half
    /// index, see `record`'s module doc). Whichever decodes with the more
    /// recent generation wins; if only one half decodes, that half wins
    /// outright; `None` means both halves are genuinely erased (never
    /// written). Returns [`FeramError::ChecksumError`] if at least one half
    /// has been written but neither decodes.
    fn winning_half(&self, index: usize) -> FeramResult<Option<(u8, DecodedHalf)>> {
        let raw = [self.read_half(index, 0), self.read_half(index, 1)];
        let erased = [record::is_erased(&raw[0]), record::is_erased(&raw[1])];
        if erased[0] && erased[1] {
            return Ok(None);
        }
        let a = if erased[0] { None } else { record::decode_half(&raw[0]) };
        let b = if erased[1] { None } else { record::decode_half(&raw[1]) };
        match (a, b) {
            (None, None) => {
                ringbuf_entry!(FERAM_EVENTS, Event::ChecksumMismatch { index: index as u16 });
                Err(FeramError::ChecksumError)
            }
            (Some(h), None) => Ok(Some((h.seq << 1, h))),
            (None, Some(h)) => Ok(Some(((h.seq << 1) | 1, h))),
            (Some(x), Some(y)) => {
                let gen_x = x.seq << 1;
                let gen_y = (y.seq << 1) | 1u8;
                if record::generation_is_newer(gen_y, gen_x) {
                    Ok(Some((gen_y, y)))
                } else {
                    Ok(Some((gen_x, x)))
                }
            }
        }
    }

    pub fn read(&self, index: usize) -> FeramResult<(u8, [u8; MAX_PAYLOAD_LEN])> {
        if index >= self.element_count {
            return Err(FeramError::ElementCountExceeded);
        }
        match self.winning_half(index)? {
            Some((_, h)) => Ok((h.size, h.payload)),
            None => Ok((0, [0; MAX_PAYLOAD_LEN])),
        }
    }

    pub fn write(&mut self, index: usize, payload: &[u8]) -> FeramResult<()> {
        if index >= self.element_count {
            return Err(FeramError::ElementCountExceeded);
        }
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(FeramError::ElementSizeExceeded);
        }
        let gen = self.next_gen[index];
        let target_half = (gen & 1) as usize;
        let mut buf = [0u8; HALF_LEN];
        record::encode_half(&mut buf, payload, gen);
        self.medium.write(self.offset(index) + target_half * HALF_LEN, &buf);
        self.next_gen[index] = gen.wrapping_add(1) & 0x3;
        ringbuf_entry!(FERAM_EVENTS, Event::Wrote { index: index as u16, gen });
        Ok(())
    }

    /// Releases the backing medium, e.g. to reopen a fresh `FeramStore` over
    /// it and confirm state survives a restart.
    pub fn into_medium(self) -> M {
        self.medium
    }

    pub fn clear(&mut self, index: usize) -> FeramResult<()> {
        if index >= self.element_count {
            return Err(FeramError::ElementCountExceeded);
        }
        let erased = [0xFFu8; RECORD_LEN];
        self.medium.write(self.offset(index), &erased);
        self.next_gen[index] = 0;
        ringbuf_entry!(FERAM_EVENTS, Event::Cleared { index: index as u16 });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medium::MemoryFeram;

    #[test]
    fn reads_back_zero_before_any_write() {
        let store = FeramStore::open(MemoryFeram::new(RECORD_LEN * 4), 4).unwrap();
        assert_eq!(store.read(0).unwrap(), (0, [0; 4]));
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut store = FeramStore::open(MemoryFeram::new(RECORD_LEN * 4), 4).unwrap();
        store.write(1, &[10, 20, 30, 40]).unwrap();
        assert_eq!(store.read(1).unwrap(), (4, [10, 20, 30, 40]));
    }

    #[test]
    fn successive_writes_alternate_halves_and_stay_readable() {
        let mut store = FeramStore::open(MemoryFeram::new(RECORD_LEN * 4), 4).unwrap();
        for n in 0..10u8 {
            store.write(0, &[n]).unwrap();
            assert_eq!(store.read(0).unwrap(), (1, [n, 0, 0, 0]));
        }
    }

    #[test]
    fn recovers_generation_across_reopen() {
        let mut store = FeramStore::open(MemoryFeram::new(RECORD_LEN * 4), 4).unwrap();
        for n in 0..5u8 {
            store.write(2, &[n, n, n, n]).unwrap();
        }
        let medium = store.into_medium();
        let store2 = FeramStore::open(medium, 4).unwrap();
        assert_eq!(store2.read(2).unwrap(), (4, [4, 4, 4, 4]));
    }

    #[test]
    fn corrupting_one_half_falls_back_to_the_other() {
        let mut store = FeramStore::open(MemoryFeram::new(RECORD_LEN * 4), 4).unwrap();
        store.write(0, &[1, 2, 3, 4]).unwrap();
        store.write(0, &[5, 6, 7, 8]).unwrap();
        // Corrupt the most recently written half (index 1, since two writes
        // landed on half 0 then half 1).
        let mut buf = [0u8; HALF_LEN];
        store.medium.read(HALF_LEN, &mut buf);
        buf[0] ^= 0xFF;
        store.medium.write(HALF_LEN, &buf);
        assert_eq!(store.read(0).unwrap(), (4, [1, 2, 3, 4]));
    }

    #[test]
    fn clear_resets_to_empty() {
        let mut store = FeramStore::open(MemoryFeram::new(RECORD_LEN * 4), 4).unwrap();
        store.write(3, &[9, 9, 9, 9]).unwrap();
        store.clear(3).unwrap();
        assert_eq!(store.read(3).unwrap(), (0, [0; 4]));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut store = FeramStore::open(MemoryFeram::new(RECORD_LEN * 4), 4).unwrap();
        assert_eq!(store.write(4, &[1]), Err(FeramError::ElementCountExceeded));
        assert_eq!(store.read(4), Err(FeramError::ElementCountExceeded));
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let mut store = FeramStore::open(MemoryFeram::new(RECORD_LEN * 4), 4).unwrap();
        assert_eq!(store.write(0, &[1, 2, 3, 4, 5]), Err(FeramError::ElementSizeExceeded));
    }
}
