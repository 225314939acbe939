// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! C8: a thin durable counter wrapper over a C6 FeRAM slot index, used by
//! the bus/radio roster wiring below for `tx_counter`/`rx_counter` so a
//! replay counter survives a restart without rewriting (and potentially
//! compacting) the whole device record in the flash array store.

use feram_store::{FeramMedium, FeramResult, FeramStore};

pub struct PersistentCounter<'s, M: FeramMedium> {
    store: &'s mut FeramStore<M>,
    index: usize,
}

impl<'s, M: FeramMedium> PersistentCounter<'s, M> {
    pub fn new(store: &'s mut FeramStore<M>, index: usize) -> Self {
        PersistentCounter { store, index }
    }

    pub fn read(&self) -> FeramResult<u32> {
        let (size, payload) = self.store.read(self.index)?;
        if size != 4 {
            return Ok(0);
        }
        Ok(u32::from_le_bytes(payload))
    }

    pub fn write(&mut self, value: u32) -> FeramResult<()> {
        self.store.write(self.index, &value.to_le_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feram_store::MemoryFeram;

    #[test]
    fn reads_back_zero_before_any_write() {
        let mut store = FeramStore::open(MemoryFeram::new(10 * 4), 4).unwrap();
        let counter = PersistentCounter::new(&mut store, 0);
        assert_eq!(counter.read().unwrap(), 0);
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut store = FeramStore::open(MemoryFeram::new(10 * 4), 4).unwrap();
        let mut counter = PersistentCounter::new(&mut store, 2);
        counter.write(0xdead_beef).unwrap();
        assert_eq!(counter.read().unwrap(), 0xdead_beef);
    }
}
