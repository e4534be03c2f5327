//! NDR encoding trait and stub writer

use crate::{NdrContext, NdrError, Result};
use bytes::{BufMut, Bytes, BytesMut};

/// First referent id handed out for an embedded pointer.
pub const FIRST_REFERENT_ID: u32 = 0x0002_0000;

/// Trait for types that can be encoded to NDR format
///
/// Encoding is split in two phases. `encode_scalars` writes the fixed part of
/// the value, including the referent id of every embedded pointer.
/// `encode_deferred` then writes the pointees of those pointers, in the same
/// order. Values without pointers only implement `encode_scalars`.
pub trait NdrEncode {
    /// Get the NDR alignment requirement for this type
    fn ndr_align() -> usize
    where
        Self: Sized,
    {
        1
    }

    /// Write the fixed part of the value.
    fn encode_scalars(&self, w: &mut NdrWriter) -> Result<()>;

    /// Write the pointees referenced from the fixed part.
    fn encode_deferred(&self, _w: &mut NdrWriter) -> Result<()> {
        Ok(())
    }
}

/// Accumulates an NDR stub.
#[derive(Debug)]
pub struct NdrWriter {
    buf: BytesMut,
    ctx: NdrContext,
    next_referent: u32,
}

impl NdrWriter {
    pub fn new() -> Self {
        Self::with_context(NdrContext::new())
    }

    pub fn with_context(ctx: NdrContext) -> Self {
        Self {
            buf: BytesMut::with_capacity(256),
            ctx,
            next_referent: FIRST_REFERENT_ID,
        }
    }

    pub fn context(&self) -> NdrContext {
        self.ctx
    }

    /// Current offset from the start of the stub.
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Write zero padding up to the given boundary.
    pub fn align(&mut self, alignment: usize) {
        let padding = NdrContext::align_padding(self.buf.len(), alignment);
        self.buf.put_bytes(0, padding);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.align(2);
        self.ctx.put_u16(&mut self.buf, value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.align(4);
        self.ctx.put_u32(&mut self.buf, value);
    }

    pub fn write_u64(&mut self, value: u64) {
        self.align(8);
        self.ctx.put_u64(&mut self.buf, value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_u32(value as u32);
    }

    pub fn write_i64(&mut self, value: i64) {
        self.write_u64(value as u64);
    }

    /// Write an NDR `enum`, which travels as a 16-bit value.
    pub fn write_enum(&mut self, value: u16) {
        self.write_u16(value);
    }

    /// Write the referent id of an embedded pointer, or zero for null.
    pub fn write_pointer(&mut self, present: bool) {
        if present {
            let id = self.next_referent;
            self.next_referent = self.next_referent.wrapping_add(4);
            self.write_u32(id);
        } else {
            self.write_u32(0);
        }
    }

    /// Write a conformance or variance count.
    pub fn write_count(&mut self, count: usize) -> Result<()> {
        let count = u32::try_from(count).map_err(|_| NdrError::IntegerOverflow)?;
        self.write_u32(count);
        Ok(())
    }

    /// Write the discriminant of a non-encapsulated union and align for its arm.
    pub fn write_union_switch(&mut self, discriminant: u16, alignment: usize) {
        self.align(alignment);
        self.write_u16(discriminant);
        self.align(alignment);
    }

    /// Write a value as a complete unit: its fixed part, then its pointees.
    pub fn write<T: NdrEncode + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.encode_scalars(self)?;
        value.encode_deferred(self)
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

impl Default for NdrWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a value into a fresh little-endian stub.
pub fn encode_ndr<T: NdrEncode + ?Sized>(value: &T) -> Result<Bytes> {
    let mut w = NdrWriter::new();
    w.write(value)?;
    Ok(w.into_bytes())
}
