//! NDR string encoding
//!
//! `[string] wchar_t*` data is a conformant varying array of UTF-16 code
//! units:
//!
//! ```text
//! max_count: u32, offset: u32 (always 0), actual_count: u32,
//! actual_count x u16 (including the terminating NUL)
//! ```
//!
//! No padding follows the characters; the next field aligns itself.

use crate::error::MAX_NDR_ALLOCATION_SIZE;
use crate::{NdrError, NdrReader, NdrWriter, Result};

impl NdrWriter {
    /// Write a NUL-terminated UTF-16 string body.
    pub fn write_wstring(&mut self, value: &str) -> Result<()> {
        let mut units: Vec<u16> = value.encode_utf16().collect();
        units.push(0);
        self.write_count(units.len())?;
        self.write_u32(0);
        self.write_count(units.len())?;
        for unit in units {
            self.write_u16(unit);
        }
        Ok(())
    }
}

impl NdrReader {
    /// Read a UTF-16 string body, dropping the terminating NUL.
    pub fn read_wstring(&mut self) -> Result<String> {
        let max_count = self.read_u32()?;
        let offset = self.read_u32()?;
        let actual_count = self.read_u32()?;

        if offset != 0 {
            return Err(NdrError::InvalidString(format!("non-zero offset {offset}")));
        }
        if actual_count > max_count {
            return Err(NdrError::ConformanceMismatch {
                max_count,
                actual_count,
            });
        }

        let actual = actual_count as usize;
        if actual > MAX_NDR_ALLOCATION_SIZE / 2 {
            return Err(NdrError::AllocationLimitExceeded {
                requested: actual,
                limit: MAX_NDR_ALLOCATION_SIZE / 2,
            });
        }

        let mut units = Vec::with_capacity(actual);
        for _ in 0..actual {
            units.push(self.read_u16()?);
        }
        while units.last() == Some(&0) {
            units.pop();
        }

        char::decode_utf16(units)
            .collect::<std::result::Result<String, _>>()
            .map_err(NdrError::from)
    }
}
