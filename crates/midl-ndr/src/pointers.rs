//! NDR pointer encoding
//!
//! Embedded `[unique]` pointers are represented as `Option<T>`. The fixed
//! part carries a referent id (zero for `None`) and the pointee is written in
//! the deferred phase of the enclosing unit.

use crate::{NdrDecode, NdrEncode, NdrReader, NdrWriter, Result};

impl<T: NdrEncode> NdrEncode for Option<T> {
    fn ndr_align() -> usize {
        4
    }

    fn encode_scalars(&self, w: &mut NdrWriter) -> Result<()> {
        w.write_pointer(self.is_some());
        Ok(())
    }

    fn encode_deferred(&self, w: &mut NdrWriter) -> Result<()> {
        match self {
            Some(value) => w.write(value),
            None => Ok(()),
        }
    }
}

impl<T: NdrDecode> NdrDecode for Option<T> {
    fn decode_scalars(r: &mut NdrReader) -> Result<Self> {
        r.read_pointer()?;
        Ok(None)
    }

    fn decode_deferred(&mut self, r: &mut NdrReader) -> Result<()> {
        if r.take_referent()? != 0 {
            *self = Some(r.read()?);
        }
        Ok(())
    }
}
