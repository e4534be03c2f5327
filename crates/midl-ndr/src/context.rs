//! NDR encoding/decoding context
//!
//! The context carries the negotiated byte order. Alignment is always
//! computed relative to the first byte of the stub, never the PDU.

use bytes::{Buf, BufMut};

/// NDR encoding/decoding context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdrContext {
    /// Whether to use little-endian byte order
    pub little_endian: bool,
}

impl NdrContext {
    /// Create a new NDR context with little-endian byte order (default)
    pub fn new() -> Self {
        Self { little_endian: true }
    }

    /// Create a context with big-endian byte order
    pub fn big_endian() -> Self {
        Self { little_endian: false }
    }

    /// Calculate padding needed to align to the given boundary
    #[inline]
    pub fn align_padding(position: usize, alignment: usize) -> usize {
        if alignment <= 1 {
            return 0;
        }
        let remainder = position % alignment;
        if remainder == 0 {
            0
        } else {
            alignment - remainder
        }
    }

    #[inline]
    pub(crate) fn put_u16<B: BufMut>(&self, buf: &mut B, value: u16) {
        if self.little_endian {
            buf.put_u16_le(value)
        } else {
            buf.put_u16(value)
        }
    }

    #[inline]
    pub(crate) fn put_u32<B: BufMut>(&self, buf: &mut B, value: u32) {
        if self.little_endian {
            buf.put_u32_le(value)
        } else {
            buf.put_u32(value)
        }
    }

    #[inline]
    pub(crate) fn put_u64<B: BufMut>(&self, buf: &mut B, value: u64) {
        if self.little_endian {
            buf.put_u64_le(value)
        } else {
            buf.put_u64(value)
        }
    }

    #[inline]
    pub(crate) fn get_u16<B: Buf>(&self, buf: &mut B) -> u16 {
        if self.little_endian {
            buf.get_u16_le()
        } else {
            buf.get_u16()
        }
    }

    #[inline]
    pub(crate) fn get_u32<B: Buf>(&self, buf: &mut B) -> u32 {
        if self.little_endian {
            buf.get_u32_le()
        } else {
            buf.get_u32()
        }
    }

    #[inline]
    pub(crate) fn get_u64<B: Buf>(&self, buf: &mut B) -> u64 {
        if self.little_endian {
            buf.get_u64_le()
        } else {
            buf.get_u64()
        }
    }
}

impl Default for NdrContext {
    fn default() -> Self {
        Self::new()
    }
}
