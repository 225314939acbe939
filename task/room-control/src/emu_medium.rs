// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flat-file `FlashMedium`/`FeramMedium` implementations for the emulator,
//! per spec.md §6's flash/FeRAM file formats: a flash file is a binary image
//! of `page_count * page_size` bytes with erase setting bytes to `0xFF`; a
//! FeRAM file is a plain byte-addressable image with no alignment
//! constraint. Both are backed by a single in-process buffer that is
//! flushed to disk on every mutation, the same seam
//! `flash_store::MemoryFlash`/`feram_store::MemoryFeram` provide for tests.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use feram_store::FeramMedium;
use flash_store::FlashMedium;

fn open_or_create(path: &Path, len: usize, fill: u8) -> std::io::Result<(File, Vec<u8>)> {
    let existed = path.exists();
    let mut file = OpenOptions::new().read(true).write(true).create(true).open(path)?;
    let mut bytes = vec![fill; len];
    if existed {
        let mut existing = Vec::new();
        file.read_to_end(&mut existing)?;
        let copy_len = existing.len().min(len);
        bytes[..copy_len].copy_from_slice(&existing[..copy_len]);
    }
    file.seek(SeekFrom::Start(0))?;
    file.set_len(len as u64)?;
    file.write_all(&bytes)?;
    Ok((file, bytes))
}

pub struct FileFlash {
    file: File,
    page_size: usize,
    bytes: Vec<u8>,
}

impl FileFlash {
    pub fn open(path: &Path, page_size: usize, page_count: usize) -> std::io::Result<Self> {
        let (file, bytes) = open_or_create(path, page_size * page_count, 0xFF)?;
        Ok(FileFlash { file, page_size, bytes })
    }

    fn flush(&mut self) {
        let _ = self.file.seek(SeekFrom::Start(0));
        let _ = self.file.write_all(&self.bytes);
    }
}

impl FlashMedium for FileFlash {
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
            self.bytes[offset + i] &= b;
        }
        self.flush();
    }

    fn erase_page(&mut self, page: usize) {
        let start = page * self.page_size;
        self.bytes[start..start + self.page_size].fill(0xFF);
        self.flush();
    }
}

pub struct FileFeram {
    file: File,
    bytes: Vec<u8>,
}

impl FileFeram {
    pub fn open(path: &Path, len: usize) -> std::io::Result<Self> {
        let (file, bytes) = open_or_create(path, len, 0xFF)?;
        Ok(FileFeram { file, bytes })
    }

    fn flush(&mut self) {
        let _ = self.file.seek(SeekFrom::Start(0));
        let _ = self.file.write_all(&self.bytes);
    }
}

impl FeramMedium for FileFeram {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn read(&self, offset: usize, out: &mut [u8]) {
        out.copy_from_slice(&self.bytes[offset..offset + out.len()]);
    }

    fn write(&mut self, offset: usize, data: &[u8]) {
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("room-control-test-{}-{}", std::process::id(), name))
    }

    #[test]
    fn flash_file_persists_program_across_reopen() {
        let path = temp_path("flash.bin");
        {
            let mut flash = FileFlash::open(&path, 256, 2).unwrap();
            flash.program(0, &[0x00, 0x0F]);
        }
        let flash = FileFlash::open(&path, 256, 2).unwrap();
        let mut out = [0u8; 2];
        flash.read(0, &mut out);
        assert_eq!(out, [0x00, 0x0F]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn feram_file_persists_write_across_reopen() {
        let path = temp_path("feram.bin");
        {
            let mut feram = FileFeram::open(&path, 64).unwrap();
            feram.write(4, &[1, 2, 3]);
        }
        let feram = FileFeram::open(&path, 64).unwrap();
        let mut out = [0u8; 3];
        feram.read(4, &mut out);
        assert_eq!(out, [1, 2, 3]);
        let _ = std::fs::remove_file(&path);
    }
}
