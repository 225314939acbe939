// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The physical-flash seam: board flash drivers and the emulator's flat
//! file both implement this trait, so the store logic never depends on how
//! bytes actually get erased or programmed.

/// A byte-addressable flash range of `page_count * page_size()` bytes.
///
/// Implementations must uphold real flash semantics: `erase_page` sets every
/// byte in the page to `0xFF`, and `program` may only ever clear bits (never
/// set a `0` byte back to `1`) -- the store relies on both properties for
/// its power-loss recovery argument.
pub trait FlashMedium {
    fn page_size(&self) -> usize;
    fn page_count(&self) -> usize;
    fn read(&self, offset: usize, out: &mut [u8]);
    fn program(&mut self, offset: usize, data: &[u8]);
    fn erase_page(&mut self, page: usize);
}

/// An in-memory flash medium for tests and the emulator, backed by a single
/// `Vec<u8>` of `page_count * page_size` bytes.
pub struct MemoryFlash {
    page_size: usize,
    bytes: Vec<u8>,
}

impl MemoryFlash {
    pub fn new(page_size: usize, page_count: usize) -> Self {
        Self { page_size, bytes: vec![0xFFu8; page_size * page_count] }
    }
}

impl FlashMedium for MemoryFlash {
    fn page_size(&self) -> usize {
        self.page_size
    }

    fn page_count(&self) -> usize {
        self.bytes.len() / self.page_size
    }

    fn read(&self, offset: usize, out: &mut [u8]) {
        out.copy_from_slice(&self.bytes[offset..offset + out.len()]);
    }

    fn program(&mut self, offset: usize, data: &[u8]) {
        for (i, &b) in data.iter().enumerate() {
            // A real NOR flash can only clear bits; model that constraint so
            // a test that tries to "resurrect" a cleared bit fails loudly
            // instead of silently succeeding.
            self.bytes[offset + i] &= b;
        }
    }

    fn erase_page(&mut self, page: usize) {
        let start = page * self.page_size;
        self.bytes[start..start + self.page_size].fill(0xFF);
    }
}
