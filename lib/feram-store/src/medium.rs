// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Byte-addressable FeRAM backing store. Unlike NOR flash, FeRAM writes do
//! not need a separate erase cycle and bits can both set and clear freely,
//! so the trait is a plain `read`/`write` pair.

pub trait FeramMedium {
    fn len(&self) -> usize;
    fn read(&self, offset: usize, out: &mut [u8]);
    fn write(&mut self, offset: usize, data: &[u8]);
}

pub struct MemoryFeram {
    bytes: Vec<u8>,
}

impl MemoryFeram {
    pub fn new(len: usize) -> Self {
        Self { bytes: vec![0xFF; len] }
    }
}

impl FeramMedium for MemoryFeram {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn read(&self, offset: usize, out: &mut [u8]) {
        out.copy_from_slice(&self.bytes[offset..offset + out.len()]);
    }

    fn write(&mut self, offset: usize, data: &[u8]) {
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
    }
}
