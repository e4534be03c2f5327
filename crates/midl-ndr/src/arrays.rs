//! NDR conformant array encoding
//!
//! A conformant array leads with its `u32` max_count. It is followed by the
//! fixed part of every element, and then the pointees of every element in
//! element order:
//!
//! ```text
//! max_count | e[0].scalars .. e[n-1].scalars | e[0].deferred .. e[n-1].deferred
//! ```

use crate::error::{MAX_NDR_ALLOCATION_SIZE, MAX_NDR_ARRAY_ELEMENTS};
use crate::{NdrDecode, NdrEncode, NdrError, NdrReader, NdrWriter, Result};

impl NdrWriter {
    /// Write a conformant array as one unit.
    pub fn write_conformant_array<T: NdrEncode>(&mut self, elements: &[T]) -> Result<()> {
        self.write_count(elements.len())?;
        self.align(T::ndr_align());
        for element in elements {
            element.encode_scalars(self)?;
        }
        for element in elements {
            element.encode_deferred(self)?;
        }
        Ok(())
    }
}

impl NdrReader {
    /// Read a conformant array as one unit.
    pub fn read_conformant_array<T: NdrEncode + NdrDecode>(&mut self) -> Result<Vec<T>> {
        self.unit(|r| {
            let count = r.read_count()?;
            let element_size = std::mem::size_of::<T>().max(1);
            let requested = count
                .checked_mul(element_size)
                .ok_or(NdrError::IntegerOverflow)?;
            if requested > MAX_NDR_ALLOCATION_SIZE {
                return Err(NdrError::AllocationLimitExceeded {
                    requested,
                    limit: MAX_NDR_ALLOCATION_SIZE,
                });
            }
            // Every element occupies at least one byte of fixed part.
            if count > r.remaining() {
                return Err(NdrError::BufferUnderflow {
                    needed: count,
                    have: r.remaining(),
                });
            }

            r.align(T::ndr_align())?;
            let mut elements = Vec::with_capacity(count.min(MAX_NDR_ARRAY_ELEMENTS));
            for _ in 0..count {
                elements.push(T::decode_scalars(r)?);
            }
            for element in elements.iter_mut() {
                element.decode_deferred(r)?;
            }
            Ok(elements)
        })
    }
}
