//! Field pointer kinds
//!
//! A struct field or RPC parameter is marshalled according to its IDL
//! attributes as well as its Rust type. A `FieldKind` names that treatment;
//! [`ndr_struct!`](crate::ndr_struct) and the operation tables built on it
//! pick one per field.
//!
//! | Kind      | Rust type          | Wire form                                         |
//! |-----------|--------------------|---------------------------------------------------|
//! | `Inline`  | any `NdrEncode`    | the value itself                                  |
//! | `Unique`  | `String`           | referent (null when empty), deferred string       |
//! | `Unique`  | `Option<T>`        | referent (null when `None`), deferred pointee     |
//! | `Ref`     | `String`           | string body, never null                           |
//! | `Ref`     | `Option<T>`        | pointee, `T::default()` when `None`               |
//! | `Counted` | `Vec<T>`           | `u32` count, referent, deferred conformant array  |
//! | `ByteCounted` | `Vec<u16>`     | `u32` byte count, referent, deferred `WCHAR` array |
//! | `Pointer` | any `NdrEncode`    | referent (never null on encode), deferred pointee |
//! | `Bool32`  | `bool`             | Win32 `BOOL` (`long`)                             |

use crate::{NdrDecode, NdrEncode, NdrError, NdrReader, NdrWriter, Result};

/// Marshalling strategy for a field of type `T`.
pub trait FieldKind<T> {
    fn align() -> usize;
    fn encode_scalars(value: &T, w: &mut NdrWriter) -> Result<()>;
    fn encode_deferred(value: &T, w: &mut NdrWriter) -> Result<()>;
    fn decode_scalars(r: &mut NdrReader) -> Result<T>;
    fn decode_deferred(value: &mut T, r: &mut NdrReader) -> Result<()>;
}

/// The value is marshalled in place.
pub struct Inline;

/// A full pointer that may be null.
pub struct Unique;

/// A pointer that is never null.
pub struct Ref;

/// A `[size_is]` pointer preceded by its element count.
pub struct Counted;

/// A `WCHAR` buffer declared `[size_is(cb / 2)]`, preceded by its size in bytes.
pub struct ByteCounted;

/// Win32 `BOOL`.
pub struct Bool32;

/// A full pointer to a value that is always present, such as a union arm.
///
/// A null referent on the wire decodes as `T::default()`.
pub struct Pointer;

impl<T: NdrEncode + NdrDecode> FieldKind<T> for Inline {
    fn align() -> usize {
        T::ndr_align()
    }

    fn encode_scalars(value: &T, w: &mut NdrWriter) -> Result<()> {
        value.encode_scalars(w)
    }

    fn encode_deferred(value: &T, w: &mut NdrWriter) -> Result<()> {
        value.encode_deferred(w)
    }

    fn decode_scalars(r: &mut NdrReader) -> Result<T> {
        T::decode_scalars(r)
    }

    fn decode_deferred(value: &mut T, r: &mut NdrReader) -> Result<()> {
        value.decode_deferred(r)
    }
}

impl<T: NdrEncode + NdrDecode> FieldKind<Option<T>> for Unique {
    fn align() -> usize {
        4
    }

    fn encode_scalars(value: &Option<T>, w: &mut NdrWriter) -> Result<()> {
        value.encode_scalars(w)
    }

    fn encode_deferred(value: &Option<T>, w: &mut NdrWriter) -> Result<()> {
        value.encode_deferred(w)
    }

    fn decode_scalars(r: &mut NdrReader) -> Result<Option<T>> {
        Option::<T>::decode_scalars(r)
    }

    fn decode_deferred(value: &mut Option<T>, r: &mut NdrReader) -> Result<()> {
        value.decode_deferred(r)
    }
}

impl FieldKind<String> for Unique {
    fn align() -> usize {
        4
    }

    fn encode_scalars(value: &String, w: &mut NdrWriter) -> Result<()> {
        w.write_pointer(!value.is_empty());
        Ok(())
    }

    fn encode_deferred(value: &String, w: &mut NdrWriter) -> Result<()> {
        if value.is_empty() {
            return Ok(());
        }
        w.write_wstring(value)
    }

    fn decode_scalars(r: &mut NdrReader) -> Result<String> {
        r.read_pointer()?;
        Ok(String::new())
    }

    fn decode_deferred(value: &mut String, r: &mut NdrReader) -> Result<()> {
        if r.take_referent()? != 0 {
            *value = r.read_wstring()?;
        }
        Ok(())
    }
}

impl<T: NdrEncode + NdrDecode + Default> FieldKind<Option<T>> for Ref {
    fn align() -> usize {
        T::ndr_align()
    }

    fn encode_scalars(value: &Option<T>, w: &mut NdrWriter) -> Result<()> {
        match value {
            Some(v) => v.encode_scalars(w),
            None => T::default().encode_scalars(w),
        }
    }

    fn encode_deferred(value: &Option<T>, w: &mut NdrWriter) -> Result<()> {
        match value {
            Some(v) => v.encode_deferred(w),
            None => T::default().encode_deferred(w),
        }
    }

    fn decode_scalars(r: &mut NdrReader) -> Result<Option<T>> {
        T::decode_scalars(r).map(Some)
    }

    fn decode_deferred(value: &mut Option<T>, r: &mut NdrReader) -> Result<()> {
        match value {
            Some(v) => v.decode_deferred(r),
            None => Ok(()),
        }
    }
}

impl FieldKind<String> for Ref {
    fn align() -> usize {
        4
    }

    fn encode_scalars(value: &String, w: &mut NdrWriter) -> Result<()> {
        w.write_wstring(value)
    }

    fn encode_deferred(_value: &String, _w: &mut NdrWriter) -> Result<()> {
        Ok(())
    }

    fn decode_scalars(r: &mut NdrReader) -> Result<String> {
        r.read_wstring()
    }

    fn decode_deferred(_value: &mut String, _r: &mut NdrReader) -> Result<()> {
        Ok(())
    }
}

impl<T: NdrEncode + NdrDecode> FieldKind<Vec<T>> for Counted {
    fn align() -> usize {
        4
    }

    fn encode_scalars(value: &Vec<T>, w: &mut NdrWriter) -> Result<()> {
        w.write_count(value.len())?;
        w.write_pointer(!value.is_empty());
        Ok(())
    }

    fn encode_deferred(value: &Vec<T>, w: &mut NdrWriter) -> Result<()> {
        if value.is_empty() {
            return Ok(());
        }
        w.write_conformant_array(value)
    }

    fn decode_scalars(r: &mut NdrReader) -> Result<Vec<T>> {
        // The conformance in the deferred part is authoritative.
        r.read_u32()?;
        r.read_pointer()?;
        Ok(Vec::new())
    }

    fn decode_deferred(value: &mut Vec<T>, r: &mut NdrReader) -> Result<()> {
        if r.take_referent()? != 0 {
            *value = r.read_conformant_array()?;
        }
        Ok(())
    }
}

impl FieldKind<Vec<u16>> for ByteCounted {
    fn align() -> usize {
        4
    }

    fn encode_scalars(value: &Vec<u16>, w: &mut NdrWriter) -> Result<()> {
        let bytes = value.len().checked_mul(2).ok_or(NdrError::IntegerOverflow)?;
        w.write_count(bytes)?;
        w.write_pointer(!value.is_empty());
        Ok(())
    }

    fn encode_deferred(value: &Vec<u16>, w: &mut NdrWriter) -> Result<()> {
        if value.is_empty() {
            return Ok(());
        }
        w.write_conformant_array(value)
    }

    fn decode_scalars(r: &mut NdrReader) -> Result<Vec<u16>> {
        let bytes = r.read_count()?;
        if bytes % 2 != 0 {
            return Err(NdrError::InvalidString(format!(
                "odd byte count {bytes} for a WCHAR buffer"
            )));
        }
        r.read_pointer()?;
        if bytes > r.remaining() {
            return Err(NdrError::BufferUnderflow {
                needed: bytes,
                have: r.remaining(),
            });
        }
        // Placeholder sized from the byte count, checked against the conformance.
        Ok(vec![0; bytes / 2])
    }

    fn decode_deferred(value: &mut Vec<u16>, r: &mut NdrReader) -> Result<()> {
        if r.take_referent()? == 0 {
            value.clear();
            return Ok(());
        }
        let units: Vec<u16> = r.read_conformant_array()?;
        if units.len() != value.len() {
            return Err(NdrError::ArraySizeMismatch {
                expected: value.len(),
                got: units.len(),
            });
        }
        *value = units;
        Ok(())
    }
}

impl<T: NdrEncode + NdrDecode + Default> FieldKind<T> for Pointer {
    fn align() -> usize {
        4
    }

    fn encode_scalars(_value: &T, w: &mut NdrWriter) -> Result<()> {
        w.write_pointer(true);
        Ok(())
    }

    fn encode_deferred(value: &T, w: &mut NdrWriter) -> Result<()> {
        w.write(value)
    }

    fn decode_scalars(r: &mut NdrReader) -> Result<T> {
        r.read_pointer()?;
        Ok(T::default())
    }

    fn decode_deferred(value: &mut T, r: &mut NdrReader) -> Result<()> {
        if r.take_referent()? != 0 {
            *value = r.read()?;
        }
        Ok(())
    }
}

impl FieldKind<bool> for Bool32 {
    fn align() -> usize {
        4
    }

    fn encode_scalars(value: &bool, w: &mut NdrWriter) -> Result<()> {
        w.write_i32(i32::from(*value));
        Ok(())
    }

    fn encode_deferred(_value: &bool, _w: &mut NdrWriter) -> Result<()> {
        Ok(())
    }

    fn decode_scalars(r: &mut NdrReader) -> Result<bool> {
        Ok(r.read_i32()? != 0)
    }

    fn decode_deferred(_value: &mut bool, _r: &mut NdrReader) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode<K: FieldKind<T>, T>(value: &T) -> bytes::Bytes {
        let mut w = NdrWriter::new();
        K::encode_scalars(value, &mut w).unwrap();
        K::encode_deferred(value, &mut w).unwrap();
        w.into_bytes()
    }

    fn decode<K: FieldKind<T>, T>(bytes: bytes::Bytes) -> T {
        let mut r = NdrReader::new(bytes);
        let mut value = K::decode_scalars(&mut r).unwrap();
        K::decode_deferred(&mut value, &mut r).unwrap();
        assert_eq!(r.remaining(), 0);
        value
    }

    #[test]
    fn test_empty_unique_string_is_null() {
        let bytes = encode::<Unique, String>(&String::new());
        assert_eq!(&bytes[..], &[0, 0, 0, 0]);
        assert_eq!(decode::<Unique, String>(bytes), "");
    }

    #[test]
    fn test_unique_string() {
        let bytes = encode::<Unique, String>(&"10.0.0.1".to_string());
        assert_eq!(&bytes[0..4], &0x0002_0000u32.to_le_bytes());
        assert_eq!(decode::<Unique, String>(bytes), "10.0.0.1");
    }

    #[test]
    fn test_ref_substitutes_default() {
        let absent = encode::<Ref, Option<u32>>(&None);
        let zero = encode::<Ref, Option<u32>>(&Some(0));
        assert_eq!(absent, zero);
        assert_eq!(decode::<Ref, Option<u32>>(absent), Some(0));
    }

    #[test]
    fn test_counted_layout() {
        let bytes = encode::<Counted, Vec<u32>>(&vec![7, 8]);
        assert_eq!(&bytes[0..4], &2u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &0x0002_0000u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &2u32.to_le_bytes());
        assert_eq!(bytes.len(), 20);
        assert_eq!(decode::<Counted, Vec<u32>>(bytes), vec![7, 8]);
    }

    #[test]
    fn test_empty_counted_is_null() {
        let bytes = encode::<Counted, Vec<u8>>(&Vec::new());
        assert_eq!(&bytes[..], &[0u8; 8]);
    }

    #[test]
    fn test_byte_counted_layout() {
        let units: Vec<u16> = "abcd".encode_utf16().collect();
        let bytes = encode::<ByteCounted, Vec<u16>>(&units);
        assert_eq!(&bytes[0..4], &8u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &0x0002_0000u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &4u32.to_le_bytes());
        assert_eq!(&bytes[12..14], &[b'a', 0]);
        assert_eq!(bytes.len(), 20);
        assert_eq!(decode::<ByteCounted, Vec<u16>>(bytes), units);
    }

    #[test]
    fn test_byte_count_must_match_conformance() {
        let bytes: Vec<u8> = [
            &4u32.to_le_bytes()[..],           // two WCHARs by byte count
            &0x0002_0000u32.to_le_bytes(),
            &4u32.to_le_bytes(),               // but four on the wire
            &[0x61, 0, 0x62, 0, 0x63, 0, 0x64, 0],
        ]
        .concat();
        let mut r = NdrReader::new(bytes.into());
        let mut value = <ByteCounted as FieldKind<Vec<u16>>>::decode_scalars(&mut r).unwrap();
        let err = <ByteCounted as FieldKind<Vec<u16>>>::decode_deferred(&mut value, &mut r).unwrap_err();
        assert!(matches!(err, NdrError::ArraySizeMismatch { expected: 2, got: 4 }));
    }

    #[test]
    fn test_odd_byte_count_is_rejected() {
        let bytes = bytes::Bytes::from_static(&[3, 0, 0, 0, 0, 0, 0, 0]);
        let mut r = NdrReader::new(bytes);
        assert!(<ByteCounted as FieldKind<Vec<u16>>>::decode_scalars(&mut r).is_err());
    }

    #[test]
    fn test_pointer_is_never_null() {
        let bytes = encode::<Pointer, u32>(&0);
        assert_eq!(&bytes[0..4], &0x0002_0000u32.to_le_bytes());
        assert_eq!(bytes.len(), 8);
        assert_eq!(decode::<Pointer, u32>(bytes), 0);

        let null = bytes::Bytes::from_static(&[0, 0, 0, 0]);
        assert_eq!(decode::<Pointer, u32>(null), 0);
    }

    #[test]
    fn test_bool32() {
        let bytes = encode::<Bool32, bool>(&true);
        assert_eq!(&bytes[..], &[1, 0, 0, 0]);
        assert!(decode::<Bool32, bool>(bytes));
    }
}
