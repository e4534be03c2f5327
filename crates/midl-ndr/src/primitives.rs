//! NDR primitive type implementations
//!
//! | MIDL Type      | Rust Type | Size | Alignment |
//! |----------------|-----------|------|-----------|
//! | byte/char      | u8        | 1    | 1         |
//! | unsigned short | u16       | 2    | 2         |
//! | long           | i32       | 4    | 4         |
//! | unsigned long  | u32       | 4    | 4         |
//! | hyper          | i64       | 8    | 8         |
//! | unsigned hyper | u64       | 8    | 8         |
//!
//! Win32 `BOOL` is a `long` on the wire; see [`Bool32`](crate::Bool32).

use crate::{NdrDecode, NdrEncode, NdrReader, NdrWriter, Result};

macro_rules! impl_ndr_primitive {
    ($ty:ty, $align:expr, $write:ident, $read:ident) => {
        impl NdrEncode for $ty {
            fn ndr_align() -> usize {
                $align
            }

            fn encode_scalars(&self, w: &mut NdrWriter) -> Result<()> {
                w.$write(*self);
                Ok(())
            }
        }

        impl NdrDecode for $ty {
            fn decode_scalars(r: &mut NdrReader) -> Result<Self> {
                r.$read()
            }
        }
    };
}

impl_ndr_primitive!(u8, 1, write_u8, read_u8);
impl_ndr_primitive!(u16, 2, write_u16, read_u16);
impl_ndr_primitive!(u32, 4, write_u32, read_u32);
impl_ndr_primitive!(u64, 8, write_u64, read_u64);
impl_ndr_primitive!(i32, 4, write_i32, read_i32);
impl_ndr_primitive!(i64, 8, write_i64, read_i64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode_ndr, encode_ndr};

    #[test]
    fn test_u32_roundtrip() {
        let bytes = encode_ndr(&0xDEADBEEFu32).unwrap();
        assert_eq!(&bytes[..], &[0xEF, 0xBE, 0xAD, 0xDE]);
        assert_eq!(decode_ndr::<u32>(bytes).unwrap(), 0xDEADBEEF);
    }

    #[test]
    fn test_hyper_alignment() {
        let mut w = NdrWriter::new();
        w.write_u32(1);
        7i64.encode_scalars(&mut w).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 16);

        let mut r = NdrReader::new(bytes);
        assert_eq!(r.read_u32().unwrap(), 1);
        assert_eq!(i64::decode_scalars(&mut r).unwrap(), 7);
    }

    #[test]
    fn test_negative_long() {
        let bytes = encode_ndr(&-42i32).unwrap();
        assert_eq!(decode_ndr::<i32>(bytes).unwrap(), -42);
    }
}
