//! NDR decoding trait and stub reader

use std::collections::VecDeque;

use crate::error::MAX_NDR_ARRAY_ELEMENTS;
use crate::{NdrContext, NdrError, Result};
use bytes::{Buf, Bytes};

/// Trait for types that can be decoded from NDR format
///
/// Mirrors [`NdrEncode`](crate::NdrEncode): `decode_scalars` reads the fixed
/// part and queues the referent id of every embedded pointer, and
/// `decode_deferred` consumes those referents in the same order to fill in
/// the pointees.
pub trait NdrDecode: Sized {
    /// Read the fixed part of the value.
    fn decode_scalars(r: &mut NdrReader) -> Result<Self>;

    /// Read the pointees referenced from the fixed part.
    fn decode_deferred(&mut self, _r: &mut NdrReader) -> Result<()> {
        Ok(())
    }
}

/// Cursor over an NDR stub.
///
/// Each value read as a unit gets its own queue of pending referents, so a
/// pointee's nested pointers are resolved before its siblings'.
#[derive(Debug)]
pub struct NdrReader {
    data: Bytes,
    pos: usize,
    ctx: NdrContext,
    pending: Vec<VecDeque<u32>>,
}

impl NdrReader {
    pub fn new(data: Bytes) -> Self {
        Self::with_context(data, NdrContext::new())
    }

    pub fn with_context(data: Bytes, ctx: NdrContext) -> Self {
        Self {
            data,
            pos: 0,
            ctx,
            pending: vec![VecDeque::new()],
        }
    }

    pub fn context(&self) -> NdrContext {
        self.ctx
    }

    /// Current offset from the start of the stub.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(NdrError::BufferUnderflow {
                needed,
                have: self.remaining(),
            });
        }
        Ok(())
    }

    fn slice(&mut self, len: usize) -> Result<Bytes> {
        self.ensure(len)?;
        let out = self.data.slice(self.pos..self.pos + len);
        self.pos += len;
        Ok(out)
    }

    /// Skip padding up to the given boundary.
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        let padding = NdrContext::align_padding(self.pos, alignment);
        self.ensure(padding)?;
        self.pos += padding;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.slice(1)?.get_u8())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.align(2)?;
        let mut raw = self.slice(2)?;
        Ok(self.ctx.get_u16(&mut raw))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.align(4)?;
        let mut raw = self.slice(4)?;
        Ok(self.ctx.get_u32(&mut raw))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.align(8)?;
        let mut raw = self.slice(8)?;
        Ok(self.ctx.get_u64(&mut raw))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(self.read_u64()? as i64)
    }

    pub fn read_enum(&mut self) -> Result<u16> {
        self.read_u16()
    }

    /// Read `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        self.slice(len)
    }

    /// Read a pointer's referent id and queue it for the deferred phase.
    ///
    /// Returns whether the pointer is non-null.
    pub fn read_pointer(&mut self) -> Result<bool> {
        let referent = self.read_u32()?;
        if let Some(queue) = self.pending.last_mut() {
            queue.push_back(referent);
        }
        Ok(referent != 0)
    }

    /// Take the next queued referent id of the current unit.
    pub fn take_referent(&mut self) -> Result<u32> {
        self.pending
            .last_mut()
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| NdrError::InvalidPointer("no referent queued for pointee".to_string()))
    }

    /// Read a conformance or variance count, bounded by the array limit.
    pub fn read_count(&mut self) -> Result<usize> {
        let count = self.read_u32()? as usize;
        if count > MAX_NDR_ARRAY_ELEMENTS {
            return Err(NdrError::AllocationLimitExceeded {
                requested: count,
                limit: MAX_NDR_ARRAY_ELEMENTS,
            });
        }
        Ok(count)
    }

    /// Read the discriminant of a non-encapsulated union and align for its arm.
    pub fn read_union_switch(&mut self, alignment: usize) -> Result<u16> {
        self.align(alignment)?;
        let discriminant = self.read_u16()?;
        self.align(alignment)?;
        Ok(discriminant)
    }

    /// Run `f` as one unit with its own referent queue.
    pub(crate) fn unit<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.pending.push(VecDeque::new());
        let result = f(self);
        let leftover = self.pending.pop().map(|q| q.len()).unwrap_or(0);
        let value = result?;
        if leftover != 0 {
            return Err(NdrError::UnconsumedReferents(leftover));
        }
        Ok(value)
    }

    /// Read a value as a complete unit: its fixed part, then its pointees.
    pub fn read<T: NdrDecode>(&mut self) -> Result<T> {
        self.unit(|r| {
            let mut value = T::decode_scalars(r)?;
            value.decode_deferred(r)?;
            Ok(value)
        })
    }
}

/// Decode a value from a little-endian stub.
pub fn decode_ndr<T: NdrDecode>(data: impl Into<Bytes>) -> Result<T> {
    NdrReader::new(data.into()).read()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_skips_padding() {
        let data = Bytes::from_static(&[0x01, 0xFF, 0xFF, 0xFF, 0x78, 0x56, 0x34, 0x12]);
        let mut r = NdrReader::new(data);
        assert_eq!(r.read_u8().unwrap(), 1);
        assert_eq!(r.read_u32().unwrap(), 0x12345678);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_underflow() {
        let mut r = NdrReader::new(Bytes::from_static(&[1, 2]));
        assert!(matches!(
            r.read_u32(),
            Err(NdrError::BufferUnderflow { needed: 4, have: 2 })
        ));
    }

    #[test]
    fn test_referent_queue_is_fifo() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x0002_0000u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0x0002_0004u32.to_le_bytes());
        let mut r = NdrReader::new(Bytes::from(data));
        assert!(r.read_pointer().unwrap());
        assert!(!r.read_pointer().unwrap());
        assert!(r.read_pointer().unwrap());
        assert_eq!(r.take_referent().unwrap(), 0x0002_0000);
        assert_eq!(r.take_referent().unwrap(), 0);
        assert_eq!(r.take_referent().unwrap(), 0x0002_0004);
        assert!(matches!(r.take_referent(), Err(NdrError::InvalidPointer(_))));
    }

    #[test]
    fn test_unit_rejects_unconsumed_referents() {
        let data = Bytes::from(0x0002_0000u32.to_le_bytes().to_vec());
        let mut r = NdrReader::new(data);
        let result = r.unit(|r| r.read_pointer());
        assert!(matches!(result, Err(NdrError::UnconsumedReferents(1))));
    }

    #[test]
    fn test_count_limit() {
        let data = Bytes::from(u32::MAX.to_le_bytes().to_vec());
        let mut r = NdrReader::new(data);
        assert!(matches!(
            r.read_count(),
            Err(NdrError::AllocationLimitExceeded { .. })
        ));
    }
}
