//! NDR (Network Data Representation) runtime library
//!
//! This crate implements the NDR wire format used for DCE/RPC stub data as
//! specified in DCE RPC and MS-RPCE.
//!
//! # NDR Wire Format
//!
//! - Primitives align to their natural size (1, 2, 4, or 8 bytes)
//! - Structures align to their largest member and carry no trailing padding
//! - Enumerations travel as 16-bit values
//! - Strings are conformant varying arrays with a null terminator
//!
//! # Deferred pointers
//!
//! Every value is written as a unit. First comes its fixed part, which holds
//! a referent id for each embedded pointer (zero for null). After that come
//! the pointees, in the order their pointers appeared. A pointee is itself a
//! unit, so its own pointees follow it directly. [`NdrEncode`] and
//! [`NdrDecode`] split each type along that line, and [`NdrWriter::write`]
//! and [`NdrReader::read`] drive the two phases.

mod arrays;
mod context;
mod decode;
mod encode;
mod error;
mod fields;
mod macros;
mod pointers;
mod primitives;
mod strings;

pub use context::NdrContext;
pub use decode::{decode_ndr, NdrDecode, NdrReader};
pub use encode::{encode_ndr, NdrEncode, NdrWriter, FIRST_REFERENT_ID};
pub use error::{NdrError, Result, MAX_NDR_ALLOCATION_SIZE, MAX_NDR_ARRAY_ELEMENTS};
pub use fields::{Bool32, ByteCounted, Counted, FieldKind, Inline, Pointer, Ref, Unique};

/// Re-export bytes for convenience
pub use bytes::{Buf, BufMut, Bytes, BytesMut};
