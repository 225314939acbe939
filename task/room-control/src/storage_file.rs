// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The emulator's "Storage file" format named in spec.md §6: a flat
//! concatenation of `{u16 id, u16 length, u8 data[length]}` records, little-
//! endian. This predates the two-region flash array store C5 implements
//! (see the "Storage v1/v2" note in spec.md §9) and survives here as the
//! human-inspectable export/import format the `inspect` subcommands use to
//! look at what is currently stored, rather than as a second live backing
//! store.

use std::io::{self, Read, Write};

pub struct Record {
    pub id: u16,
    pub data: Vec<u8>,
}

pub fn write_records<W: Write>(mut out: W, records: &[Record]) -> io::Result<()> {
    for record in records {
        out.write_all(&record.id.to_le_bytes())?;
        out.write_all(&(record.data.len() as u16).to_le_bytes())?;
        out.write_all(&record.data)?;
    }
    Ok(())
}

pub fn read_records<R: Read>(mut input: R) -> io::Result<Vec<Record>> {
    let mut records = Vec::new();
    loop {
        let mut id_buf = [0u8; 2];
        match input.read_exact(&mut id_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e),
        }
        let mut len_buf = [0u8; 2];
        input.read_exact(&mut len_buf)?;
        let len = u16::from_le_bytes(len_buf) as usize;
        let mut data = vec![0u8; len];
        input.read_exact(&mut data)?;
        records.push(Record { id: u16::from_le_bytes(id_buf), data });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_several_records() {
        let records = vec![
            Record { id: 1, data: vec![0xAA, 0xBB] },
            Record { id: 2, data: vec![] },
            Record { id: 3, data: vec![0x01; 20] },
        ];
        let mut buf = Vec::new();
        write_records(&mut buf, &records).unwrap();
        let decoded = read_records(&buf[..]).unwrap();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0].id, 1);
        assert_eq!(decoded[0].data, vec![0xAA, 0xBB]);
        assert_eq!(decoded[2].data.len(), 20);
    }

    #[test]
    fn empty_input_yields_no_records() {
        assert!(read_records(&[][..]).unwrap().is_empty());
    }
}
