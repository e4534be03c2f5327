//! DCE RPC PDU Fragmentation Support
//!
//! Multi-PDU fragmentation as defined in DCE 1.1 (C706) section 12.5 and
//! MS-RPCE. When stub data exceeds the negotiated `max_xmit_frag` the call
//! travels as several request or response PDUs. Every fragment carries the
//! same call_id and the total stub length in `alloc_hint`. The first has
//! FIRST_FRAG set and the last has LAST_FRAG set.
//!
//! ```text
//! max_frag size limit (e.g., 4280 bytes)
//! ├── PDU Header (16 bytes)
//! ├── Request/Response body header (8 bytes)
//! ├── Object UUID (16 bytes, optional, request only)
//! └── Stub data fragment (variable)
//! ```

use crate::dcerpc::{PacketFlags, PduHeader, RequestPdu, ResponsePdu};
use crate::error::{Result, RpcError};
use bytes::{Bytes, BytesMut};

/// Smallest fragment size an association may negotiate: the headers of a
/// request with an object UUID and eight bytes of stub data.
pub const MIN_FRAG_SIZE: u16 =
    (PduHeader::SIZE + RequestPdu::BODY_HEADER_SIZE + 16 + 8) as u16;

/// Splits outgoing stub data across as many PDUs as the fragment size needs.
pub struct FragmentGenerator;

impl FragmentGenerator {
    /// Accept a negotiated fragment size, or reject one too small to carry stub data.
    pub fn check_frag_size(size: u16) -> Result<u16> {
        if size < MIN_FRAG_SIZE {
            return Err(RpcError::InvalidPduData(format!(
                "fragment size {size} is below the minimum of {MIN_FRAG_SIZE}"
            )));
        }
        Ok(size)
    }

    /// Maximum bytes of stub data that fit in a single fragment.
    pub fn max_stub_size(max_frag: u16, has_object_uuid: bool) -> usize {
        let object_uuid_size = if has_object_uuid { 16 } else { 0 };
        let overhead = PduHeader::SIZE + RequestPdu::BODY_HEADER_SIZE + object_uuid_size;
        (max_frag as usize).saturating_sub(overhead)
    }

    /// Slice `stub` into chunks of at most `max_stub` bytes, each paired with
    /// its fragment flags. Empty stub data still yields one complete chunk.
    fn chunks(stub: &Bytes, max_stub: usize) -> Vec<(Bytes, PacketFlags)> {
        let max_stub = max_stub.max(1);
        if stub.len() <= max_stub {
            return vec![(stub.clone(), PacketFlags::complete())];
        }

        let total_len = stub.len();
        let mut chunks = Vec::with_capacity(total_len.div_ceil(max_stub));
        let mut offset = 0;
        while offset < total_len {
            let end = (offset + max_stub).min(total_len);
            let mut flags = PacketFlags::new();
            if offset == 0 {
                flags.set_first_frag();
            }
            if end == total_len {
                flags.set_last_frag();
            }
            chunks.push((stub.slice(offset..end), flags));
            offset = end;
        }
        chunks
    }

    /// Fragment a request PDU. A request that fits is returned as a single
    /// complete PDU.
    pub fn fragment_request(request: &RequestPdu, max_frag: u16) -> Vec<RequestPdu> {
        let max_stub = Self::max_stub_size(max_frag, request.object_uuid.is_some());
        let total_len = request.stub_data.len() as u32;

        Self::chunks(&request.stub_data, max_stub)
            .into_iter()
            .map(|(stub_data, flags)| {
                let mut frag = request.clone();
                frag.header.packet_flags = flags;
                frag.alloc_hint = total_len;
                frag.stub_data = stub_data;
                frag
            })
            .collect()
    }

    /// Fragment a response PDU. Responses carry no object UUID.
    pub fn fragment_response(response: &ResponsePdu, max_frag: u16) -> Vec<ResponsePdu> {
        let max_stub = Self::max_stub_size(max_frag, false);
        let total_len = response.stub_data.len() as u32;

        Self::chunks(&response.stub_data, max_stub)
            .into_iter()
            .map(|(stub_data, flags)| {
                let mut frag = response.clone();
                frag.header.packet_flags = flags;
                frag.alloc_hint = total_len;
                frag.stub_data = stub_data;
                frag
            })
            .collect()
    }
}

/// Reassembles the stub data of one fragmented call.
pub struct FragmentAssembler {
    call_id: u32,
    stub_data: BytesMut,
    context_id: u16,
    opnum: Option<u16>,
    received_first: bool,
    received_last: bool,
    max_size: usize,
}

impl FragmentAssembler {
    /// Upper bound on a reassembled stub unless overridden.
    pub const DEFAULT_MAX_SIZE: usize = 16 * 1024 * 1024;

    pub fn new(call_id: u32) -> Self {
        Self::with_max_size(call_id, Self::DEFAULT_MAX_SIZE)
    }

    pub fn with_max_size(call_id: u32, max_size: usize) -> Self {
        Self {
            call_id,
            stub_data: BytesMut::new(),
            context_id: 0,
            opnum: None,
            received_first: false,
            received_last: false,
            max_size,
        }
    }

    pub fn call_id(&self) -> u32 {
        self.call_id
    }

    pub fn context_id(&self) -> u16 {
        self.context_id
    }

    /// The opnum carried by the first request fragment.
    pub fn opnum(&self) -> Option<u16> {
        self.opnum
    }

    pub fn is_complete(&self) -> bool {
        self.received_first && self.received_last
    }

    /// Add one fragment.
    ///
    /// Returns `Ok(Some(stub))` once the last fragment has arrived and
    /// `Ok(None)` while more are expected.
    pub fn add_fragment(
        &mut self,
        header: &PduHeader,
        stub: &[u8],
        ctx_id: u16,
        opnum: Option<u16>,
        alloc_hint: u32,
    ) -> Result<Option<Bytes>> {
        if header.call_id != self.call_id {
            return Err(RpcError::CallIdMismatch {
                expected: self.call_id,
                got: header.call_id,
            });
        }
        if self.received_last {
            return Err(RpcError::FragmentAssemblyError(
                "fragment received after the last fragment".to_string(),
            ));
        }

        if header.packet_flags.is_first_frag() {
            if self.received_first {
                return Err(RpcError::FragmentAssemblyError(
                    "received duplicate first fragment".to_string(),
                ));
            }
            self.received_first = true;
            self.context_id = ctx_id;
            self.opnum = opnum;
            let hint = (alloc_hint as usize).min(self.max_size);
            self.stub_data.reserve(hint);
        } else if !self.received_first {
            return Err(RpcError::FragmentOutOfOrder);
        }

        if ctx_id != self.context_id {
            return Err(RpcError::ContextMismatch);
        }
        if self.stub_data.len() + stub.len() > self.max_size {
            return Err(RpcError::RecordTooLarge {
                size: self.stub_data.len() + stub.len(),
                max: self.max_size,
            });
        }
        self.stub_data.extend_from_slice(stub);

        if header.packet_flags.is_last_frag() {
            self.received_last = true;
            return Ok(Some(self.stub_data.split().freeze()));
        }
        Ok(None)
    }

    /// Reset the assembler for reuse with a new call.
    pub fn reset(&mut self, call_id: u32) {
        self.call_id = call_id;
        self.stub_data.clear();
        self.context_id = 0;
        self.opnum = None;
        self.received_first = false;
        self.received_last = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcerpc::PacketType;

    fn header(call_id: u32, first: bool, last: bool) -> PduHeader {
        let mut header = PduHeader::new(PacketType::Request, call_id);
        header.packet_flags = PacketFlags::new();
        if first {
            header.packet_flags.set_first_frag();
        }
        if last {
            header.packet_flags.set_last_frag();
        }
        header
    }

    #[test]
    fn test_max_stub_size_calculation() {
        // 4280 - 16 (header) - 8 (body header)
        assert_eq!(FragmentGenerator::max_stub_size(4280, false), 4256);
        // plus a 16 byte object UUID
        assert_eq!(FragmentGenerator::max_stub_size(4280, true), 4240);
        assert_eq!(FragmentGenerator::max_stub_size(10, false), 0);
    }

    #[test]
    fn test_fragment_single_pdu() {
        let stub = Bytes::from(vec![0u8; 100]);
        let request = RequestPdu::new(1, 5, stub.clone());

        let fragments = FragmentGenerator::fragment_request(&request, 4280);

        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].header.packet_flags.is_first_frag());
        assert!(fragments[0].header.packet_flags.is_last_frag());
        assert_eq!(fragments[0].stub_data, stub);
    }

    #[test]
    fn test_frag_size_below_headers_is_rejected() {
        assert_eq!(MIN_FRAG_SIZE, 48);
        assert!(FragmentGenerator::check_frag_size(24).is_err());
        assert!(FragmentGenerator::check_frag_size(MIN_FRAG_SIZE - 1).is_err());
        assert_eq!(FragmentGenerator::check_frag_size(1024).unwrap(), 1024);
    }

    #[test]
    fn test_tiny_frag_size_still_splits() {
        let request = RequestPdu::new(1, 0, Bytes::from(vec![7u8; 3]));
        let fragments = FragmentGenerator::fragment_request(&request, 16);
        assert_eq!(fragments.len(), 3);
    }

    #[test]
    fn test_fragment_multiple_pdus() {
        let total_size = 10000;
        let stub = Bytes::from((0..total_size).map(|i| i as u8).collect::<Vec<u8>>());
        let request = RequestPdu::new(1, 5, stub.clone());

        // 976 bytes of stub per fragment
        let fragments = FragmentGenerator::fragment_request(&request, 1000);
        assert_eq!(fragments.len(), 11);

        let first = &fragments[0];
        assert!(first.header.packet_flags.is_first_frag());
        assert!(!first.header.packet_flags.is_last_frag());
        assert_eq!(first.opnum, 5);

        for frag in &fragments[1..fragments.len() - 1] {
            assert!(!frag.header.packet_flags.is_first_frag());
            assert!(!frag.header.packet_flags.is_last_frag());
        }

        let last = fragments.last().unwrap();
        assert!(!last.header.packet_flags.is_first_frag());
        assert!(last.header.packet_flags.is_last_frag());

        for frag in &fragments {
            assert_eq!(frag.alloc_hint, total_size as u32);
            assert!(frag.encode().unwrap().len() <= 1000);
        }

        let rebuilt: Vec<u8> = fragments
            .iter()
            .flat_map(|f| f.stub_data.iter().copied())
            .collect();
        assert_eq!(rebuilt, stub.to_vec());
    }

    #[test]
    fn test_fragment_response_reassembles() {
        let stub = Bytes::from(vec![0xAA; 5000]);
        let response = ResponsePdu::new(42, stub.clone());
        let fragments = FragmentGenerator::fragment_response(&response, 1000);
        assert!(fragments.len() > 1);

        let mut assembler = FragmentAssembler::new(42);
        let mut complete = None;
        for frag in &fragments {
            // Round-trip through the wire form to check the flags survive.
            let decoded = ResponsePdu::decode(&frag.encode().unwrap()).unwrap();
            complete = assembler
                .add_fragment(
                    &decoded.header,
                    &decoded.stub_data,
                    decoded.context_id,
                    None,
                    decoded.alloc_hint,
                )
                .unwrap();
        }
        assert_eq!(complete.unwrap(), stub);
    }

    #[test]
    fn test_assembler_complete() {
        let mut assembler = FragmentAssembler::new(1);

        let result = assembler
            .add_fragment(&header(1, true, false), b"Hello", 0, Some(5), 13)
            .unwrap();
        assert!(result.is_none());
        assert!(!assembler.is_complete());

        let result = assembler
            .add_fragment(&header(1, false, false), b", ", 0, Some(5), 13)
            .unwrap();
        assert!(result.is_none());

        let result = assembler
            .add_fragment(&header(1, false, true), b"World!", 0, Some(5), 13)
            .unwrap();
        assert_eq!(result.unwrap().as_ref(), b"Hello, World!");
        assert!(assembler.is_complete());
        assert_eq!(assembler.opnum(), Some(5));
    }

    #[test]
    fn test_assembler_call_id_mismatch() {
        let mut assembler = FragmentAssembler::new(1);
        let result = assembler.add_fragment(&header(2, true, true), b"data", 0, Some(0), 4);
        assert!(matches!(result, Err(RpcError::CallIdMismatch { .. })));
    }

    #[test]
    fn test_assembler_out_of_order() {
        let mut assembler = FragmentAssembler::new(1);
        let result = assembler.add_fragment(&header(1, false, false), b"data", 0, Some(0), 4);
        assert!(matches!(result, Err(RpcError::FragmentOutOfOrder)));
    }

    #[test]
    fn test_assembler_context_change() {
        let mut assembler = FragmentAssembler::new(1);
        assembler
            .add_fragment(&header(1, true, false), b"a", 0, Some(0), 2)
            .unwrap();
        let result = assembler.add_fragment(&header(1, false, true), b"b", 1, Some(0), 2);
        assert!(matches!(result, Err(RpcError::ContextMismatch)));
    }

    #[test]
    fn test_assembler_size_limit() {
        let mut assembler = FragmentAssembler::with_max_size(1, 4);
        let result = assembler.add_fragment(&header(1, true, true), b"too long", 0, None, 8);
        assert!(matches!(result, Err(RpcError::RecordTooLarge { max: 4, .. })));
    }

    #[test]
    fn test_assembler_reset() {
        let mut assembler = FragmentAssembler::new(1);
        assembler
            .add_fragment(&header(1, true, true), b"data", 0, Some(5), 4)
            .unwrap();
        assert!(assembler.is_complete());

        assembler.reset(2);
        assert_eq!(assembler.call_id(), 2);
        assert!(!assembler.is_complete());
        assert_eq!(assembler.opnum(), None);
    }
}
