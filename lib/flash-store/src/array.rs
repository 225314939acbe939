// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed view over a raw array in the store, for fixed-layout records such
//! as `BusDevice`/`RadioDevice`. Mirrors the firmware's `Array<F, R>`
//! template, minus the separate RAM "state" object: callers that need
//! derived RAM state build it from the decoded flash record themselves.

use crate::error::FlashStoreError;
use crate::medium::FlashMedium;
use crate::store::Store;
use zerocopy::{FromBytes, Immutable, IntoBytes};

pub struct TypedArray<'s, M: FlashMedium, T> {
    store: &'s mut Store<M>,
    array_index: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<'s, M: FlashMedium, T: IntoBytes + FromBytes + Immutable> TypedArray<'s, M, T> {
    pub fn new(store: &'s mut Store<M>, array_index: usize) -> Self {
        Self { store, array_index, _marker: std::marker::PhantomData }
    }

    pub fn count(&self) -> usize {
        self.store.count(self.array_index)
    }

    pub fn get(&self, index: usize) -> Option<T>
    where
        T: Copy,
    {
        let bytes = self.store.get(self.array_index, index)?;
        T::read_from_bytes(bytes).ok()
    }

    pub fn write(&mut self, index: usize, value: &T) -> Result<(), FlashStoreError> {
        self.store.write(self.array_index, index, value.as_bytes())
    }

    pub fn erase(&mut self, index: usize) -> Result<(), FlashStoreError> {
        self.store.erase(self.array_index, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medium::MemoryFlash;
    use zerocopy::{Immutable, IntoBytes};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, zerocopy::FromBytes, IntoBytes, Immutable)]
    #[repr(C)]
    struct Rec {
        id: u32,
        short_address: u8,
        _pad: [u8; 3],
    }

    #[test]
    fn round_trips_fixed_layout_records() {
        let mut store = Store::open(MemoryFlash::new(256, 4), 1).unwrap();
        let mut arr: TypedArray<_, Rec> = TypedArray::new(&mut store, 0);
        arr.write(0, &Rec { id: 7, short_address: 5, _pad: [0; 3] }).unwrap();
        assert_eq!(arr.count(), 1);
        assert_eq!(arr.get(0), Some(Rec { id: 7, short_address: 5, _pad: [0; 3] }));
    }
}
