//! DCE RPC PDU (Protocol Data Unit) types
//!
//! This module implements the connection-oriented DCE RPC wire format as
//! defined in:
//! - DCE 1.1: Remote Procedure Call (C706)
//! - MS-RPCE: Remote Procedure Call Protocol Extensions
//!
//! DCE RPC PDU Header Format:
//! ```text
//! +--------+--------+--------+--------+
//! |  vers  |vers_min| ptype  | pflags |
//! +--------+--------+--------+--------+
//! |        data representation        |
//! +--------+--------+--------+--------+
//! |   frag_len      |   auth_len      |
//! +--------+--------+--------+--------+
//! |             call_id               |
//! +--------+--------+--------+--------+
//! ```

use crate::error::{Result, RpcError};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;
use std::io::Cursor;

/// DCE RPC protocol version
pub const DCE_RPC_VERSION: u8 = 5;
/// DCE RPC protocol minor version
pub const DCE_RPC_VERSION_MINOR: u8 = 0;
/// Default fragment size negotiated by bind (MS-RPCE minimum)
pub const DEFAULT_MAX_FRAG: u16 = 4280;

/// NDR Transfer Syntax UUID
pub const NDR_SYNTAX_UUID: &str = "8a885d04-1ceb-11c9-9fe8-08002b104860";
pub const NDR_SYNTAX_VERSION: u32 = 2;

/// DCE RPC packet types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketType {
    Request = 0,
    Ping = 1,
    Response = 2,
    Fault = 3,
    Working = 4,
    Nocall = 5,
    Reject = 6,
    Ack = 7,
    ClCancel = 8,
    Fack = 9,
    CancelAck = 10,
    Bind = 11,
    BindAck = 12,
    BindNak = 13,
    AlterContext = 14,
    AlterContextResp = 15,
    Auth3 = 16,
    Shutdown = 17,
    CoCancel = 18,
    Orphaned = 19,
}

impl PacketType {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Request,
            1 => Self::Ping,
            2 => Self::Response,
            3 => Self::Fault,
            4 => Self::Working,
            5 => Self::Nocall,
            6 => Self::Reject,
            7 => Self::Ack,
            8 => Self::ClCancel,
            9 => Self::Fack,
            10 => Self::CancelAck,
            11 => Self::Bind,
            12 => Self::BindAck,
            13 => Self::BindNak,
            14 => Self::AlterContext,
            15 => Self::AlterContextResp,
            16 => Self::Auth3,
            17 => Self::Shutdown,
            18 => Self::CoCancel,
            19 => Self::Orphaned,
            _ => return None,
        })
    }
}

/// Packet flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketFlags(u8);

impl PacketFlags {
    /// First fragment
    pub const FIRST_FRAG: u8 = 0x01;
    /// Last fragment
    pub const LAST_FRAG: u8 = 0x02;
    /// Cancel pending
    pub const PENDING_CANCEL: u8 = 0x04;
    /// Supports concurrent multiplexing
    pub const CONC_MPX: u8 = 0x10;
    /// Did not execute
    pub const DID_NOT_EXECUTE: u8 = 0x20;
    /// Maybe semantics requested
    pub const MAYBE: u8 = 0x40;
    /// Object UUID present in a request
    pub const OBJECT_UUID: u8 = 0x80;

    pub fn new() -> Self {
        Self(0)
    }

    /// Create flags for a complete (non-fragmented) PDU
    pub fn complete() -> Self {
        Self(Self::FIRST_FRAG | Self::LAST_FRAG)
    }

    pub fn set_first_frag(&mut self) -> &mut Self {
        self.0 |= Self::FIRST_FRAG;
        self
    }

    pub fn set_last_frag(&mut self) -> &mut Self {
        self.0 |= Self::LAST_FRAG;
        self
    }

    pub fn is_first_frag(&self) -> bool {
        (self.0 & Self::FIRST_FRAG) != 0
    }

    pub fn is_last_frag(&self) -> bool {
        (self.0 & Self::LAST_FRAG) != 0
    }

    pub fn contains(&self, flag: u8) -> bool {
        (self.0 & flag) == flag
    }

    pub fn as_u8(&self) -> u8 {
        self.0
    }

    pub fn from_u8(value: u8) -> Self {
        Self(value)
    }
}

/// Data Representation Format Label
///
/// Byte 0 holds the character set in its low nibble and the integer
/// representation in its high nibble. Byte 1 is the floating point format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataRepresentation {
    pub int_rep: IntRep,
    pub char_rep: CharRep,
    pub float_rep: FloatRep,
}

/// Integer representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntRep {
    BigEndian = 0,
    LittleEndian = 1,
}

/// Character representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharRep {
    Ascii = 0,
    Ebcdic = 1,
}

/// Floating point representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatRep {
    Ieee = 0,
    Vax = 1,
    Cray = 2,
    Ibm = 3,
}

impl DataRepresentation {
    /// Little-endian, ASCII, IEEE: `[0x10, 0, 0, 0]`
    pub fn ndr() -> Self {
        Self {
            int_rep: IntRep::LittleEndian,
            char_rep: CharRep::Ascii,
            float_rep: FloatRep::Ieee,
        }
    }

    pub fn big_endian() -> Self {
        Self {
            int_rep: IntRep::BigEndian,
            ..Self::ndr()
        }
    }

    pub fn encode(&self) -> [u8; 4] {
        let byte0 = (self.char_rep as u8) | ((self.int_rep as u8) << 4);
        [byte0, self.float_rep as u8, 0, 0]
    }

    pub fn decode(data: [u8; 4]) -> Self {
        let int_rep = if (data[0] & 0xF0) == 0 {
            IntRep::BigEndian
        } else {
            IntRep::LittleEndian
        };
        let char_rep = if (data[0] & 0x0F) == 0 {
            CharRep::Ascii
        } else {
            CharRep::Ebcdic
        };
        let float_rep = match data[1] {
            0 => FloatRep::Ieee,
            1 => FloatRep::Vax,
            2 => FloatRep::Cray,
            _ => FloatRep::Ibm,
        };
        Self {
            int_rep,
            char_rep,
            float_rep,
        }
    }

    pub fn is_little_endian(&self) -> bool {
        self.int_rep == IntRep::LittleEndian
    }
}

impl Default for DataRepresentation {
    fn default() -> Self {
        Self::ndr()
    }
}

// Byte-order aware helpers shared by every PDU body.

fn put_u16(buf: &mut BytesMut, value: u16, little_endian: bool) {
    if little_endian {
        buf.put_u16_le(value)
    } else {
        buf.put_u16(value)
    }
}

fn put_u32(buf: &mut BytesMut, value: u32, little_endian: bool) {
    if little_endian {
        buf.put_u32_le(value)
    } else {
        buf.put_u32(value)
    }
}

fn need(cursor: &Cursor<&[u8]>, len: usize, what: &str) -> Result<()> {
    if cursor.remaining() < len {
        return Err(RpcError::InvalidPduData(format!(
            "truncated {what}: need {len} bytes, have {}",
            cursor.remaining()
        )));
    }
    Ok(())
}

fn get_u8(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<u8> {
    need(cursor, 1, what)?;
    Ok(cursor.get_u8())
}

fn get_u16(cursor: &mut Cursor<&[u8]>, little_endian: bool, what: &str) -> Result<u16> {
    need(cursor, 2, what)?;
    Ok(if little_endian {
        cursor.get_u16_le()
    } else {
        cursor.get_u16()
    })
}

fn get_u32(cursor: &mut Cursor<&[u8]>, little_endian: bool, what: &str) -> Result<u32> {
    need(cursor, 4, what)?;
    Ok(if little_endian {
        cursor.get_u32_le()
    } else {
        cursor.get_u32()
    })
}

fn skip_to_alignment(cursor: &mut Cursor<&[u8]>, base: usize, alignment: usize) -> Result<()> {
    let offset = base + cursor.position() as usize;
    let padding = (alignment - offset % alignment) % alignment;
    need(cursor, padding, "alignment padding")?;
    cursor.advance(padding);
    Ok(())
}

/// Patch the common header of an encoded PDU with its final length.
///
/// A PDU longer than `frag_length` can express must be fragmented first.
fn finish_pdu(mut buf: BytesMut, header: &PduHeader) -> Result<Bytes> {
    let mut header = header.clone();
    header.frag_length = u16::try_from(buf.len()).map_err(|_| RpcError::RecordTooLarge {
        size: buf.len(),
        max: u16::MAX as usize,
    })?;
    header.auth_length = 0;
    let mut header_buf = BytesMut::with_capacity(PduHeader::SIZE);
    header.encode(&mut header_buf);
    buf[..PduHeader::SIZE].copy_from_slice(&header_buf);
    Ok(buf.freeze())
}

fn start_pdu(capacity: usize) -> BytesMut {
    let mut buf = BytesMut::with_capacity(PduHeader::SIZE + capacity);
    buf.put_slice(&[0u8; PduHeader::SIZE]);
    buf
}

fn body_cursor<'a>(data: &'a [u8], header: &PduHeader) -> Cursor<&'a [u8]> {
    let end = (header.frag_length as usize).clamp(PduHeader::SIZE, data.len());
    Cursor::new(&data[PduHeader::SIZE..end])
}

/// UUID structure (128 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Uuid {
    pub time_low: u32,
    pub time_mid: u16,
    pub time_hi_and_version: u16,
    pub clock_seq_hi_and_reserved: u8,
    pub clock_seq_low: u8,
    pub node: [u8; 6],
}

impl Uuid {
    /// Nil UUID (all zeros)
    pub const NIL: Self = Self {
        time_low: 0,
        time_mid: 0,
        time_hi_and_version: 0,
        clock_seq_hi_and_reserved: 0,
        clock_seq_low: 0,
        node: [0; 6],
    };

    /// Parse from string format "xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx"
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.len() != 36 {
            return None;
        }
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 5 || parts[4].len() != 12 {
            return None;
        }

        let time_low = u32::from_str_radix(parts[0], 16).ok()?;
        let time_mid = u16::from_str_radix(parts[1], 16).ok()?;
        let time_hi_and_version = u16::from_str_radix(parts[2], 16).ok()?;
        let clock = u16::from_str_radix(parts[3], 16).ok()?;

        let mut node = [0u8; 6];
        for (i, byte) in node.iter_mut().enumerate() {
            *byte = u8::from_str_radix(parts[4].get(i * 2..i * 2 + 2)?, 16).ok()?;
        }

        Some(Self {
            time_low,
            time_mid,
            time_hi_and_version,
            clock_seq_hi_and_reserved: (clock >> 8) as u8,
            clock_seq_low: clock as u8,
            node,
        })
    }

    /// Encode UUID in wire format (respecting byte order)
    pub fn encode(&self, buf: &mut BytesMut, little_endian: bool) {
        put_u32(buf, self.time_low, little_endian);
        put_u16(buf, self.time_mid, little_endian);
        put_u16(buf, self.time_hi_and_version, little_endian);
        buf.put_u8(self.clock_seq_hi_and_reserved);
        buf.put_u8(self.clock_seq_low);
        buf.put_slice(&self.node);
    }

    /// Decode UUID from wire format
    pub fn decode(cursor: &mut Cursor<&[u8]>, little_endian: bool) -> Result<Self> {
        need(cursor, 16, "UUID")?;
        let time_low = get_u32(cursor, little_endian, "UUID")?;
        let time_mid = get_u16(cursor, little_endian, "UUID")?;
        let time_hi_and_version = get_u16(cursor, little_endian, "UUID")?;
        let clock_seq_hi_and_reserved = cursor.get_u8();
        let clock_seq_low = cursor.get_u8();
        let mut node = [0u8; 6];
        cursor.copy_to_slice(&mut node);

        Ok(Self {
            time_low,
            time_mid,
            time_hi_and_version,
            clock_seq_hi_and_reserved,
            clock_seq_low,
            node,
        })
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.time_low,
            self.time_mid,
            self.time_hi_and_version,
            self.clock_seq_hi_and_reserved,
            self.clock_seq_low,
            self.node[0],
            self.node[1],
            self.node[2],
            self.node[3],
            self.node[4],
            self.node[5]
        )
    }
}

/// Syntax ID - interface UUID with version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyntaxId {
    pub uuid: Uuid,
    /// Major version in the low 16 bits, minor in the high 16 bits.
    pub version: u32,
}

impl SyntaxId {
    pub const fn new(uuid: Uuid, major: u16, minor: u16) -> Self {
        Self {
            uuid,
            version: (major as u32) | ((minor as u32) << 16),
        }
    }

    /// The NDR 2.0 transfer syntax.
    pub fn ndr() -> Self {
        Self::new(ndr_syntax_uuid(), NDR_SYNTAX_VERSION as u16, 0)
    }

    pub fn major_version(&self) -> u16 {
        self.version as u16
    }

    pub fn minor_version(&self) -> u16 {
        (self.version >> 16) as u16
    }

    pub fn encode(&self, buf: &mut BytesMut, little_endian: bool) {
        self.uuid.encode(buf, little_endian);
        put_u32(buf, self.version, little_endian);
    }

    pub fn decode(cursor: &mut Cursor<&[u8]>, little_endian: bool) -> Result<Self> {
        let uuid = Uuid::decode(cursor, little_endian)?;
        let version = get_u32(cursor, little_endian, "syntax version")?;
        Ok(Self { uuid, version })
    }
}

impl fmt::Display for SyntaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}.{}", self.uuid, self.major_version(), self.minor_version())
    }
}

fn ndr_syntax_uuid() -> Uuid {
    Uuid {
        time_low: 0x8a885d04,
        time_mid: 0x1ceb,
        time_hi_and_version: 0x11c9,
        clock_seq_hi_and_reserved: 0x9f,
        clock_seq_low: 0xe8,
        node: [0x08, 0x00, 0x2b, 0x10, 0x48, 0x60],
    }
}

/// Common PDU header (16 bytes)
#[derive(Debug, Clone)]
pub struct PduHeader {
    pub version: u8,
    pub version_minor: u8,
    pub packet_type: PacketType,
    pub packet_flags: PacketFlags,
    pub data_rep: DataRepresentation,
    /// Total length of the PDU fragment
    pub frag_length: u16,
    pub auth_length: u16,
    pub call_id: u32,
}

impl PduHeader {
    /// PDU header size in bytes
    pub const SIZE: usize = 16;

    pub fn new(packet_type: PacketType, call_id: u32) -> Self {
        Self {
            version: DCE_RPC_VERSION,
            version_minor: DCE_RPC_VERSION_MINOR,
            packet_type,
            packet_flags: PacketFlags::complete(),
            data_rep: DataRepresentation::ndr(),
            frag_length: 0,
            auth_length: 0,
            call_id,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        let little_endian = self.data_rep.is_little_endian();
        buf.put_u8(self.version);
        buf.put_u8(self.version_minor);
        buf.put_u8(self.packet_type as u8);
        buf.put_u8(self.packet_flags.as_u8());
        buf.put_slice(&self.data_rep.encode());
        put_u16(buf, self.frag_length, little_endian);
        put_u16(buf, self.auth_length, little_endian);
        put_u32(buf, self.call_id, little_endian);
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(RpcError::InvalidPduData(format!(
                "PDU header too short: {} bytes",
                data.len()
            )));
        }

        let version = data[0];
        if version != DCE_RPC_VERSION {
            return Err(RpcError::RpcVersionMismatch(version as u32));
        }

        let packet_type = PacketType::from_u8(data[2])
            .ok_or(RpcError::InvalidMessageType(data[2] as i32))?;
        let data_rep = DataRepresentation::decode([data[4], data[5], data[6], data[7]]);
        let little_endian = data_rep.is_little_endian();

        let mut cursor = Cursor::new(&data[8..Self::SIZE]);
        let frag_length = get_u16(&mut cursor, little_endian, "header")?;
        let auth_length = get_u16(&mut cursor, little_endian, "header")?;
        let call_id = get_u32(&mut cursor, little_endian, "header")?;

        Ok(Self {
            version,
            version_minor: data[1],
            packet_type,
            packet_flags: PacketFlags::from_u8(data[3]),
            data_rep,
            frag_length,
            auth_length,
            call_id,
        })
    }

    fn expect(data: &[u8], packet_type: PacketType) -> Result<Self> {
        let header = Self::decode(data)?;
        if header.packet_type != packet_type {
            return Err(RpcError::InvalidMessageType(header.packet_type as i32));
        }
        Ok(header)
    }
}

/// Presentation context element proposed by bind or alter-context
#[derive(Debug, Clone)]
pub struct ContextElement {
    pub context_id: u16,
    pub abstract_syntax: SyntaxId,
    pub transfer_syntaxes: Vec<SyntaxId>,
}

impl ContextElement {
    pub fn new(context_id: u16, abstract_syntax: SyntaxId, transfer_syntax: SyntaxId) -> Self {
        Self {
            context_id,
            abstract_syntax,
            transfer_syntaxes: vec![transfer_syntax],
        }
    }

    pub fn encode(&self, buf: &mut BytesMut, little_endian: bool) {
        put_u16(buf, self.context_id, little_endian);
        buf.put_u8(self.transfer_syntaxes.len() as u8);
        buf.put_u8(0);
        self.abstract_syntax.encode(buf, little_endian);
        for ts in &self.transfer_syntaxes {
            ts.encode(buf, little_endian);
        }
    }

    pub fn decode(cursor: &mut Cursor<&[u8]>, little_endian: bool) -> Result<Self> {
        let context_id = get_u16(cursor, little_endian, "context element")?;
        let num_transfer_syntaxes = get_u8(cursor, "context element")?;
        let _reserved = get_u8(cursor, "context element")?;

        let abstract_syntax = SyntaxId::decode(cursor, little_endian)?;
        let mut transfer_syntaxes = Vec::with_capacity(num_transfer_syntaxes as usize);
        for _ in 0..num_transfer_syntaxes {
            transfer_syntaxes.push(SyntaxId::decode(cursor, little_endian)?);
        }

        Ok(Self {
            context_id,
            abstract_syntax,
            transfer_syntaxes,
        })
    }
}

/// Result of a single presentation context negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ContextResult {
    Acceptance = 0,
    UserRejection = 1,
    ProviderRejection = 2,
}

/// Reason attached to a rejected presentation context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ProviderReason {
    NotSpecified = 0,
    AbstractSyntaxNotSupported = 1,
    ProposedTransferSyntaxesNotSupported = 2,
    LocalLimitExceeded = 3,
}

impl ProviderReason {
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => Self::AbstractSyntaxNotSupported,
            2 => Self::ProposedTransferSyntaxesNotSupported,
            3 => Self::LocalLimitExceeded,
            _ => Self::NotSpecified,
        }
    }
}

impl fmt::Display for ProviderReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotSpecified => "reason not specified",
            Self::AbstractSyntaxNotSupported => "abstract syntax is not supported",
            Self::ProposedTransferSyntaxesNotSupported => "proposed transfer syntaxes not supported",
            Self::LocalLimitExceeded => "local limit exceeded",
        })
    }
}

/// One entry of a bind-ack or alter-context-response result list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationResult {
    pub result: ContextResult,
    pub reason: ProviderReason,
    pub transfer_syntax: SyntaxId,
}

impl PresentationResult {
    pub fn accepted(transfer_syntax: SyntaxId) -> Self {
        Self {
            result: ContextResult::Acceptance,
            reason: ProviderReason::NotSpecified,
            transfer_syntax,
        }
    }

    pub fn rejected(reason: ProviderReason) -> Self {
        Self {
            result: ContextResult::ProviderRejection,
            reason,
            transfer_syntax: SyntaxId::new(Uuid::NIL, 0, 0),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.result == ContextResult::Acceptance
    }
}

/// Body shared by bind and alter-context
fn encode_context_request(
    buf: &mut BytesMut,
    little_endian: bool,
    max_xmit_frag: u16,
    max_recv_frag: u16,
    assoc_group_id: u32,
    context_list: &[ContextElement],
) {
    put_u16(buf, max_xmit_frag, little_endian);
    put_u16(buf, max_recv_frag, little_endian);
    put_u32(buf, assoc_group_id, little_endian);
    buf.put_u8(context_list.len() as u8);
    buf.put_u8(0);
    put_u16(buf, 0, little_endian);
    for ctx in context_list {
        ctx.encode(buf, little_endian);
    }
}

type ContextRequestBody = (u16, u16, u32, Vec<ContextElement>);

fn decode_context_request(
    cursor: &mut Cursor<&[u8]>,
    little_endian: bool,
) -> Result<ContextRequestBody> {
    let max_xmit_frag = get_u16(cursor, little_endian, "bind body")?;
    let max_recv_frag = get_u16(cursor, little_endian, "bind body")?;
    let assoc_group_id = get_u32(cursor, little_endian, "bind body")?;
    let num_contexts = get_u8(cursor, "bind body")?;
    let _reserved = get_u8(cursor, "bind body")?;
    let _reserved2 = get_u16(cursor, little_endian, "bind body")?;

    let mut context_list = Vec::with_capacity(num_contexts as usize);
    for _ in 0..num_contexts {
        context_list.push(ContextElement::decode(cursor, little_endian)?);
    }
    Ok((max_xmit_frag, max_recv_frag, assoc_group_id, context_list))
}

/// Body shared by bind-ack and alter-context-response
fn encode_context_response(
    buf: &mut BytesMut,
    little_endian: bool,
    max_xmit_frag: u16,
    max_recv_frag: u16,
    assoc_group_id: u32,
    secondary_addr: &str,
    results: &[PresentationResult],
) {
    put_u16(buf, max_xmit_frag, little_endian);
    put_u16(buf, max_recv_frag, little_endian);
    put_u32(buf, assoc_group_id, little_endian);

    // Port string; an alter-context response may leave it empty
    if secondary_addr.is_empty() {
        put_u16(buf, 0, little_endian);
    } else {
        put_u16(buf, secondary_addr.len() as u16 + 1, little_endian);
        buf.put_slice(secondary_addr.as_bytes());
        buf.put_u8(0);
    }
    let padding = (4 - (buf.len() % 4)) % 4;
    buf.put_bytes(0, padding);

    buf.put_u8(results.len() as u8);
    buf.put_u8(0);
    put_u16(buf, 0, little_endian);
    for entry in results {
        put_u16(buf, entry.result as u16, little_endian);
        put_u16(buf, entry.reason as u16, little_endian);
        entry.transfer_syntax.encode(buf, little_endian);
    }
}

type ContextResponseBody = (u16, u16, u32, String, Vec<PresentationResult>);

fn decode_context_response(
    cursor: &mut Cursor<&[u8]>,
    little_endian: bool,
) -> Result<ContextResponseBody> {
    let max_xmit_frag = get_u16(cursor, little_endian, "bind-ack body")?;
    let max_recv_frag = get_u16(cursor, little_endian, "bind-ack body")?;
    let assoc_group_id = get_u32(cursor, little_endian, "bind-ack body")?;

    let sec_addr_len = get_u16(cursor, little_endian, "secondary address")? as usize;
    need(cursor, sec_addr_len, "secondary address")?;
    let mut sec_addr_bytes = vec![0u8; sec_addr_len];
    cursor.copy_to_slice(&mut sec_addr_bytes);
    if sec_addr_bytes.last() == Some(&0) {
        sec_addr_bytes.pop();
    }
    let secondary_addr = String::from_utf8_lossy(&sec_addr_bytes).into_owned();
    skip_to_alignment(cursor, PduHeader::SIZE, 4)?;

    let num_results = get_u8(cursor, "result list")?;
    let _reserved = get_u8(cursor, "result list")?;
    let _reserved2 = get_u16(cursor, little_endian, "result list")?;

    let mut results = Vec::with_capacity(num_results as usize);
    for _ in 0..num_results {
        let result = match get_u16(cursor, little_endian, "result")? {
            0 => ContextResult::Acceptance,
            1 => ContextResult::UserRejection,
            _ => ContextResult::ProviderRejection,
        };
        let reason = ProviderReason::from_u16(get_u16(cursor, little_endian, "result")?);
        let transfer_syntax = SyntaxId::decode(cursor, little_endian)?;
        results.push(PresentationResult {
            result,
            reason,
            transfer_syntax,
        });
    }
    Ok((max_xmit_frag, max_recv_frag, assoc_group_id, secondary_addr, results))
}

/// Bind PDU
#[derive(Debug, Clone)]
pub struct BindPdu {
    pub header: PduHeader,
    pub max_xmit_frag: u16,
    pub max_recv_frag: u16,
    pub assoc_group_id: u32,
    pub context_list: Vec<ContextElement>,
}

impl BindPdu {
    pub fn new(call_id: u32, interface: SyntaxId) -> Self {
        Self {
            header: PduHeader::new(PacketType::Bind, call_id),
            max_xmit_frag: DEFAULT_MAX_FRAG,
            max_recv_frag: DEFAULT_MAX_FRAG,
            assoc_group_id: 0,
            context_list: vec![ContextElement::new(0, interface, SyntaxId::ndr())],
        }
    }

    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = start_pdu(64 * self.context_list.len());
        encode_context_request(
            &mut buf,
            self.header.data_rep.is_little_endian(),
            self.max_xmit_frag,
            self.max_recv_frag,
            self.assoc_group_id,
            &self.context_list,
        );
        finish_pdu(buf, &self.header)
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        let header = PduHeader::expect(data, PacketType::Bind)?;
        let mut cursor = body_cursor(data, &header);
        let (max_xmit_frag, max_recv_frag, assoc_group_id, context_list) =
            decode_context_request(&mut cursor, header.data_rep.is_little_endian())?;
        Ok(Self {
            header,
            max_xmit_frag,
            max_recv_frag,
            assoc_group_id,
            context_list,
        })
    }
}

/// Bind acknowledgment PDU
#[derive(Debug, Clone)]
pub struct BindAckPdu {
    pub header: PduHeader,
    pub max_xmit_frag: u16,
    pub max_recv_frag: u16,
    pub assoc_group_id: u32,
    pub secondary_addr: String,
    pub results: Vec<PresentationResult>,
}

impl BindAckPdu {
    pub fn new(call_id: u32, assoc_group_id: u32, results: Vec<PresentationResult>) -> Self {
        Self {
            header: PduHeader::new(PacketType::BindAck, call_id),
            max_xmit_frag: DEFAULT_MAX_FRAG,
            max_recv_frag: DEFAULT_MAX_FRAG,
            assoc_group_id,
            secondary_addr: String::new(),
            results,
        }
    }

    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = start_pdu(64 + 24 * self.results.len());
        encode_context_response(
            &mut buf,
            self.header.data_rep.is_little_endian(),
            self.max_xmit_frag,
            self.max_recv_frag,
            self.assoc_group_id,
            &self.secondary_addr,
            &self.results,
        );
        finish_pdu(buf, &self.header)
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        let header = PduHeader::expect(data, PacketType::BindAck)?;
        let mut cursor = body_cursor(data, &header);
        let (max_xmit_frag, max_recv_frag, assoc_group_id, secondary_addr, results) =
            decode_context_response(&mut cursor, header.data_rep.is_little_endian())?;
        Ok(Self {
            header,
            max_xmit_frag,
            max_recv_frag,
            assoc_group_id,
            secondary_addr,
            results,
        })
    }
}

/// Reason a server rejected an association
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum RejectReason {
    NotSpecified = 0,
    TemporaryCongestion = 1,
    LocalLimitExceeded = 2,
    CalledPaddrUnknown = 3,
    ProtocolVersionNotSupported = 4,
    DefaultContextNotSupported = 5,
    UserDataNotReadable = 6,
    NoPsapAvailable = 7,
    AuthenticationTypeNotRecognized = 8,
    InvalidChecksum = 9,
}

impl RejectReason {
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => Self::TemporaryCongestion,
            2 => Self::LocalLimitExceeded,
            3 => Self::CalledPaddrUnknown,
            4 => Self::ProtocolVersionNotSupported,
            5 => Self::DefaultContextNotSupported,
            6 => Self::UserDataNotReadable,
            7 => Self::NoPsapAvailable,
            8 => Self::AuthenticationTypeNotRecognized,
            9 => Self::InvalidChecksum,
            _ => Self::NotSpecified,
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotSpecified => "reason not specified",
            Self::TemporaryCongestion => "temporary congestion",
            Self::LocalLimitExceeded => "local limit exceeded",
            Self::CalledPaddrUnknown => "called presentation address unknown",
            Self::ProtocolVersionNotSupported => "protocol version not supported",
            Self::DefaultContextNotSupported => "default context not supported",
            Self::UserDataNotReadable => "user data not readable",
            Self::NoPsapAvailable => "no presentation service access point available",
            Self::AuthenticationTypeNotRecognized => "authentication type was not recognized",
            Self::InvalidChecksum => "invalid checksum",
        })
    }
}

/// Bind negative acknowledgment PDU
#[derive(Debug, Clone)]
pub struct BindNakPdu {
    pub header: PduHeader,
    pub reject_reason: RejectReason,
    /// Supported (major, minor) protocol versions, sent with
    /// `ProtocolVersionNotSupported`.
    pub versions: Vec<(u8, u8)>,
}

impl BindNakPdu {
    pub fn new(call_id: u32, reject_reason: RejectReason) -> Self {
        let versions = if reject_reason == RejectReason::ProtocolVersionNotSupported {
            vec![(DCE_RPC_VERSION, DCE_RPC_VERSION_MINOR)]
        } else {
            Vec::new()
        };
        Self {
            header: PduHeader::new(PacketType::BindNak, call_id),
            reject_reason,
            versions,
        }
    }

    pub fn encode(&self) -> Result<Bytes> {
        let little_endian = self.header.data_rep.is_little_endian();
        let mut buf = start_pdu(8);
        put_u16(&mut buf, self.reject_reason as u16, little_endian);
        buf.put_u8(self.versions.len() as u8);
        for (major, minor) in &self.versions {
            buf.put_u8(*major);
            buf.put_u8(*minor);
        }
        finish_pdu(buf, &self.header)
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        let header = PduHeader::expect(data, PacketType::BindNak)?;
        let little_endian = header.data_rep.is_little_endian();
        let mut cursor = body_cursor(data, &header);
        let reject_reason =
            RejectReason::from_u16(get_u16(&mut cursor, little_endian, "bind-nak body")?);
        // The version list is optional on the wire.
        let mut versions = Vec::new();
        if cursor.has_remaining() {
            let count = get_u8(&mut cursor, "bind-nak versions")?;
            for _ in 0..count {
                let major = get_u8(&mut cursor, "bind-nak versions")?;
                let minor = get_u8(&mut cursor, "bind-nak versions")?;
                versions.push((major, minor));
            }
        }
        Ok(Self {
            header,
            reject_reason,
            versions,
        })
    }
}

/// Alter-context PDU
///
/// Adds presentation contexts to an existing association.
#[derive(Debug, Clone)]
pub struct AlterContextPdu {
    pub header: PduHeader,
    pub max_xmit_frag: u16,
    pub max_recv_frag: u16,
    pub assoc_group_id: u32,
    pub context_list: Vec<ContextElement>,
}

impl AlterContextPdu {
    pub fn new(call_id: u32, context_id: u16, interface: SyntaxId) -> Self {
        Self {
            header: PduHeader::new(PacketType::AlterContext, call_id),
            max_xmit_frag: DEFAULT_MAX_FRAG,
            max_recv_frag: DEFAULT_MAX_FRAG,
            assoc_group_id: 0,
            context_list: vec![ContextElement::new(context_id, interface, SyntaxId::ndr())],
        }
    }

    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = start_pdu(64 * self.context_list.len());
        encode_context_request(
            &mut buf,
            self.header.data_rep.is_little_endian(),
            self.max_xmit_frag,
            self.max_recv_frag,
            self.assoc_group_id,
            &self.context_list,
        );
        finish_pdu(buf, &self.header)
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        let header = PduHeader::expect(data, PacketType::AlterContext)?;
        let mut cursor = body_cursor(data, &header);
        let (max_xmit_frag, max_recv_frag, assoc_group_id, context_list) =
            decode_context_request(&mut cursor, header.data_rep.is_little_endian())?;
        Ok(Self {
            header,
            max_xmit_frag,
            max_recv_frag,
            assoc_group_id,
            context_list,
        })
    }
}

/// Alter-context response PDU
#[derive(Debug, Clone)]
pub struct AlterContextRespPdu {
    pub header: PduHeader,
    pub max_xmit_frag: u16,
    pub max_recv_frag: u16,
    pub assoc_group_id: u32,
    pub secondary_addr: String,
    pub results: Vec<PresentationResult>,
}

impl AlterContextRespPdu {
    pub fn new(call_id: u32, assoc_group_id: u32, results: Vec<PresentationResult>) -> Self {
        Self {
            header: PduHeader::new(PacketType::AlterContextResp, call_id),
            max_xmit_frag: DEFAULT_MAX_FRAG,
            max_recv_frag: DEFAULT_MAX_FRAG,
            assoc_group_id,
            secondary_addr: String::new(),
            results,
        }
    }

    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = start_pdu(64 + 24 * self.results.len());
        encode_context_response(
            &mut buf,
            self.header.data_rep.is_little_endian(),
            self.max_xmit_frag,
            self.max_recv_frag,
            self.assoc_group_id,
            &self.secondary_addr,
            &self.results,
        );
        finish_pdu(buf, &self.header)
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        let header = PduHeader::expect(data, PacketType::AlterContextResp)?;
        let mut cursor = body_cursor(data, &header);
        let (max_xmit_frag, max_recv_frag, assoc_group_id, secondary_addr, results) =
            decode_context_response(&mut cursor, header.data_rep.is_little_endian())?;
        Ok(Self {
            header,
            max_xmit_frag,
            max_recv_frag,
            assoc_group_id,
            secondary_addr,
            results,
        })
    }
}

/// Request PDU
#[derive(Debug, Clone)]
pub struct RequestPdu {
    pub header: PduHeader,
    pub alloc_hint: u32,
    pub context_id: u16,
    pub opnum: u16,
    pub object_uuid: Option<Uuid>,
    pub stub_data: Bytes,
}

impl RequestPdu {
    /// alloc_hint(4) + context_id(2) + opnum(2)
    pub const BODY_HEADER_SIZE: usize = 8;

    pub fn new(call_id: u32, opnum: u16, stub_data: Bytes) -> Self {
        Self {
            header: PduHeader::new(PacketType::Request, call_id),
            alloc_hint: stub_data.len() as u32,
            context_id: 0,
            opnum,
            object_uuid: None,
            stub_data,
        }
    }

    pub fn encode(&self) -> Result<Bytes> {
        let little_endian = self.header.data_rep.is_little_endian();
        let mut buf = start_pdu(Self::BODY_HEADER_SIZE + 16 + self.stub_data.len());
        put_u32(&mut buf, self.alloc_hint, little_endian);
        put_u16(&mut buf, self.context_id, little_endian);
        put_u16(&mut buf, self.opnum, little_endian);
        if let Some(ref uuid) = self.object_uuid {
            uuid.encode(&mut buf, little_endian);
        }
        buf.put_slice(&self.stub_data);

        let mut header = self.header.clone();
        if self.object_uuid.is_some() {
            header.packet_flags =
                PacketFlags::from_u8(header.packet_flags.as_u8() | PacketFlags::OBJECT_UUID);
        }
        finish_pdu(buf, &header)
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        let header = PduHeader::expect(data, PacketType::Request)?;
        let little_endian = header.data_rep.is_little_endian();
        let mut cursor = body_cursor(data, &header);

        let alloc_hint = get_u32(&mut cursor, little_endian, "request body")?;
        let context_id = get_u16(&mut cursor, little_endian, "request body")?;
        let opnum = get_u16(&mut cursor, little_endian, "request body")?;
        let object_uuid = if header.packet_flags.contains(PacketFlags::OBJECT_UUID) {
            Some(Uuid::decode(&mut cursor, little_endian)?)
        } else {
            None
        };
        let stub_data = Bytes::copy_from_slice(cursor.chunk());

        Ok(Self {
            header,
            alloc_hint,
            context_id,
            opnum,
            object_uuid,
            stub_data,
        })
    }
}

/// Response PDU
#[derive(Debug, Clone)]
pub struct ResponsePdu {
    pub header: PduHeader,
    pub alloc_hint: u32,
    pub context_id: u16,
    pub cancel_count: u8,
    pub stub_data: Bytes,
}

impl ResponsePdu {
    /// alloc_hint(4) + context_id(2) + cancel_count(1) + reserved(1)
    pub const BODY_HEADER_SIZE: usize = 8;

    pub fn new(call_id: u32, stub_data: Bytes) -> Self {
        Self {
            header: PduHeader::new(PacketType::Response, call_id),
            alloc_hint: stub_data.len() as u32,
            context_id: 0,
            cancel_count: 0,
            stub_data,
        }
    }

    pub fn encode(&self) -> Result<Bytes> {
        let little_endian = self.header.data_rep.is_little_endian();
        let mut buf = start_pdu(Self::BODY_HEADER_SIZE + self.stub_data.len());
        put_u32(&mut buf, self.alloc_hint, little_endian);
        put_u16(&mut buf, self.context_id, little_endian);
        buf.put_u8(self.cancel_count);
        buf.put_u8(0);
        buf.put_slice(&self.stub_data);
        finish_pdu(buf, &self.header)
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        let header = PduHeader::expect(data, PacketType::Response)?;
        let little_endian = header.data_rep.is_little_endian();
        let mut cursor = body_cursor(data, &header);

        let alloc_hint = get_u32(&mut cursor, little_endian, "response body")?;
        let context_id = get_u16(&mut cursor, little_endian, "response body")?;
        let cancel_count = get_u8(&mut cursor, "response body")?;
        let _reserved = get_u8(&mut cursor, "response body")?;
        let stub_data = Bytes::copy_from_slice(cursor.chunk());

        Ok(Self {
            header,
            alloc_hint,
            context_id,
            cancel_count,
            stub_data,
        })
    }
}

/// Fault status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum FaultStatus {
    /// Operation number out of range
    OpRngError = 0x1c010002,
    /// Unknown interface
    UnkIf = 0x1c010003,
    /// Protocol version not supported
    NdrVersion = 0x1c000008,
    /// General RPC error
    RpcError = 0x1c000000,
    /// Access denied
    AccessDenied = 0x00000005,
    /// Context mismatch
    ContextMismatch = 0x1c00001a,
    /// Stub data could not be unmarshalled (RPC_X_BAD_STUB_DATA)
    BadStubData = 0x000006f7,
}

impl FaultStatus {
    /// Human readable name for a raw fault status.
    pub fn describe(status: u32) -> &'static str {
        match status {
            0x1c010002 => "nca_s_op_rng_error",
            0x1c010003 => "nca_s_unk_if",
            0x1c000008 => "nca_rpc_version_mismatch",
            0x1c000000 => "nca_s_fault_unspec",
            0x00000005 => "access denied",
            0x1c00001a => "nca_s_fault_context_mismatch",
            0x000006f7 => "bad stub data",
            _ => "unknown fault",
        }
    }
}

/// Fault PDU
#[derive(Debug, Clone)]
pub struct FaultPdu {
    pub header: PduHeader,
    pub alloc_hint: u32,
    pub context_id: u16,
    pub cancel_count: u8,
    pub status: u32,
}

impl FaultPdu {
    pub fn new(call_id: u32, status: FaultStatus) -> Self {
        let mut header = PduHeader::new(PacketType::Fault, call_id);
        header.packet_flags =
            PacketFlags::from_u8(header.packet_flags.as_u8() | PacketFlags::DID_NOT_EXECUTE);
        Self {
            header,
            alloc_hint: 0,
            context_id: 0,
            cancel_count: 0,
            status: status as u32,
        }
    }

    pub fn encode(&self) -> Result<Bytes> {
        let little_endian = self.header.data_rep.is_little_endian();
        let mut buf = start_pdu(16);
        put_u32(&mut buf, self.alloc_hint, little_endian);
        put_u16(&mut buf, self.context_id, little_endian);
        buf.put_u8(self.cancel_count);
        buf.put_u8(0);
        put_u32(&mut buf, self.status, little_endian);
        put_u32(&mut buf, 0, little_endian);
        finish_pdu(buf, &self.header)
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        let header = PduHeader::expect(data, PacketType::Fault)?;
        let little_endian = header.data_rep.is_little_endian();
        let mut cursor = body_cursor(data, &header);

        let alloc_hint = get_u32(&mut cursor, little_endian, "fault body")?;
        let context_id = get_u16(&mut cursor, little_endian, "fault body")?;
        let cancel_count = get_u8(&mut cursor, "fault body")?;
        let _reserved = get_u8(&mut cursor, "fault body")?;
        let status = get_u32(&mut cursor, little_endian, "fault body")?;

        Ok(Self {
            header,
            alloc_hint,
            context_id,
            cancel_count,
            status,
        })
    }
}

/// Represents any connection-oriented DCE RPC PDU this crate understands
#[derive(Debug, Clone)]
pub enum Pdu {
    Bind(BindPdu),
    BindAck(BindAckPdu),
    BindNak(BindNakPdu),
    AlterContext(AlterContextPdu),
    AlterContextResp(AlterContextRespPdu),
    Request(RequestPdu),
    Response(ResponsePdu),
    Fault(FaultPdu),
    Shutdown(PduHeader),
}

impl Pdu {
    /// Decode a PDU from raw bytes
    pub fn decode(data: &[u8]) -> Result<Self> {
        let header = PduHeader::decode(data)?;
        match header.packet_type {
            PacketType::Bind => Ok(Pdu::Bind(BindPdu::decode(data)?)),
            PacketType::BindAck => Ok(Pdu::BindAck(BindAckPdu::decode(data)?)),
            PacketType::BindNak => Ok(Pdu::BindNak(BindNakPdu::decode(data)?)),
            PacketType::AlterContext => Ok(Pdu::AlterContext(AlterContextPdu::decode(data)?)),
            PacketType::AlterContextResp => {
                Ok(Pdu::AlterContextResp(AlterContextRespPdu::decode(data)?))
            }
            PacketType::Request => Ok(Pdu::Request(RequestPdu::decode(data)?)),
            PacketType::Response => Ok(Pdu::Response(ResponsePdu::decode(data)?)),
            PacketType::Fault => Ok(Pdu::Fault(FaultPdu::decode(data)?)),
            PacketType::Shutdown => Ok(Pdu::Shutdown(header)),
            other => Err(RpcError::InvalidMessageType(other as i32)),
        }
    }

    /// Encode the PDU to bytes
    pub fn encode(&self) -> Result<Bytes> {
        match self {
            Pdu::Bind(pdu) => pdu.encode(),
            Pdu::BindAck(pdu) => pdu.encode(),
            Pdu::BindNak(pdu) => pdu.encode(),
            Pdu::AlterContext(pdu) => pdu.encode(),
            Pdu::AlterContextResp(pdu) => pdu.encode(),
            Pdu::Request(pdu) => pdu.encode(),
            Pdu::Response(pdu) => pdu.encode(),
            Pdu::Fault(pdu) => pdu.encode(),
            Pdu::Shutdown(header) => finish_pdu(start_pdu(0), header),
        }
    }

    /// Get the call ID from the PDU header
    pub fn call_id(&self) -> u32 {
        self.header().call_id
    }

    pub fn header(&self) -> &PduHeader {
        match self {
            Pdu::Bind(pdu) => &pdu.header,
            Pdu::BindAck(pdu) => &pdu.header,
            Pdu::BindNak(pdu) => &pdu.header,
            Pdu::AlterContext(pdu) => &pdu.header,
            Pdu::AlterContextResp(pdu) => &pdu.header,
            Pdu::Request(pdu) => &pdu.header,
            Pdu::Response(pdu) => &pdu.header,
            Pdu::Fault(pdu) => &pdu.header,
            Pdu::Shutdown(header) => header,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_interface() -> SyntaxId {
        SyntaxId::new(
            Uuid::parse("6bffd098-a112-3610-9833-46c3f874532d").unwrap(),
            1,
            0,
        )
    }

    #[test]
    fn test_uuid_parse_and_display() {
        let uuid = Uuid::parse(NDR_SYNTAX_UUID).unwrap();
        assert_eq!(uuid.time_low, 0x8a885d04);
        assert_eq!(uuid.time_mid, 0x1ceb);
        assert_eq!(uuid.time_hi_and_version, 0x11c9);
        assert_eq!(uuid, ndr_syntax_uuid());
        assert_eq!(uuid.to_string(), NDR_SYNTAX_UUID);
        assert!(Uuid::parse("not-a-uuid").is_none());
    }

    #[test]
    fn test_header_encode_decode() {
        let header = PduHeader::new(PacketType::Request, 12345);
        let mut buf = BytesMut::new();
        header.encode(&mut buf);

        assert_eq!(buf.len(), PduHeader::SIZE);
        assert_eq!(buf[0], DCE_RPC_VERSION);
        assert_eq!(buf[2], PacketType::Request as u8);
        assert_eq!(&buf[4..8], &[0x10, 0, 0, 0]);

        let decoded = PduHeader::decode(&buf).unwrap();
        assert_eq!(decoded.packet_type, PacketType::Request);
        assert_eq!(decoded.call_id, 12345);
    }

    #[test]
    fn test_request_roundtrip() {
        let mut request = RequestPdu::new(42, 28, Bytes::from_static(b"test data"));
        request.context_id = 1;
        let encoded = request.encode().unwrap();
        assert_eq!(encoded.len(), PduHeader::SIZE + 8 + 9);

        let decoded = RequestPdu::decode(&encoded).unwrap();
        assert_eq!(decoded.header.call_id, 42);
        assert_eq!(decoded.header.frag_length as usize, encoded.len());
        assert_eq!(decoded.context_id, 1);
        assert_eq!(decoded.opnum, 28);
        assert_eq!(decoded.stub_data.as_ref(), b"test data");
    }

    #[test]
    fn test_request_with_object_uuid() {
        let mut request = RequestPdu::new(1, 0, Bytes::from_static(b"x"));
        request.object_uuid = Some(test_interface().uuid);
        let decoded = RequestPdu::decode(&request.encode().unwrap()).unwrap();
        assert_eq!(decoded.object_uuid, Some(test_interface().uuid));
        assert_eq!(decoded.stub_data.as_ref(), b"x");
    }

    #[test]
    fn test_response_roundtrip() {
        let response = ResponsePdu::new(42, Bytes::from_static(b"result"));
        let decoded = ResponsePdu::decode(&response.encode().unwrap()).unwrap();
        assert_eq!(decoded.header.call_id, 42);
        assert_eq!(decoded.stub_data.as_ref(), b"result");
    }

    #[test]
    fn test_bind_roundtrip() {
        let bind = BindPdu::new(1, test_interface());
        let decoded = BindPdu::decode(&bind.encode().unwrap()).unwrap();
        assert_eq!(decoded.header.call_id, 1);
        assert_eq!(decoded.max_xmit_frag, DEFAULT_MAX_FRAG);
        assert_eq!(decoded.context_list.len(), 1);
        assert_eq!(decoded.context_list[0].abstract_syntax, test_interface());
        assert_eq!(decoded.context_list[0].transfer_syntaxes, vec![SyntaxId::ndr()]);
    }

    #[test]
    fn test_bind_ack_roundtrip() {
        let mut ack = BindAckPdu::new(
            3,
            0x1234,
            vec![
                PresentationResult::accepted(SyntaxId::ndr()),
                PresentationResult::rejected(ProviderReason::AbstractSyntaxNotSupported),
            ],
        );
        ack.secondary_addr = "49152".to_string();
        let decoded = BindAckPdu::decode(&ack.encode().unwrap()).unwrap();
        assert_eq!(decoded.assoc_group_id, 0x1234);
        assert_eq!(decoded.secondary_addr, "49152");
        assert_eq!(decoded.results.len(), 2);
        assert!(decoded.results[0].is_accepted());
        assert_eq!(
            decoded.results[1].reason,
            ProviderReason::AbstractSyntaxNotSupported
        );
    }

    #[test]
    fn test_bind_nak_roundtrip() {
        let nak = BindNakPdu::new(9, RejectReason::ProtocolVersionNotSupported);
        let decoded = match Pdu::decode(&nak.encode().unwrap()).unwrap() {
            Pdu::BindNak(pdu) => pdu,
            other => panic!("unexpected PDU {other:?}"),
        };
        assert_eq!(decoded.reject_reason, RejectReason::ProtocolVersionNotSupported);
        assert_eq!(decoded.versions, vec![(5, 0)]);
        assert_eq!(
            decoded.reject_reason.to_string(),
            "protocol version not supported"
        );
    }

    #[test]
    fn test_alter_context_roundtrip() {
        let alter = AlterContextPdu::new(4, 1, test_interface());
        let decoded = AlterContextPdu::decode(&alter.encode().unwrap()).unwrap();
        assert_eq!(decoded.context_list[0].context_id, 1);
        assert_eq!(decoded.context_list[0].abstract_syntax, test_interface());

        let resp = AlterContextRespPdu::new(4, 7, vec![PresentationResult::accepted(SyntaxId::ndr())]);
        let decoded = AlterContextRespPdu::decode(&resp.encode().unwrap()).unwrap();
        assert_eq!(decoded.secondary_addr, "");
        assert!(decoded.results[0].is_accepted());
    }

    #[test]
    fn test_fault_roundtrip() {
        let fault = FaultPdu::new(5, FaultStatus::OpRngError);
        let decoded = FaultPdu::decode(&fault.encode().unwrap()).unwrap();
        assert_eq!(decoded.status, FaultStatus::OpRngError as u32);
        assert!(decoded.header.packet_flags.contains(PacketFlags::DID_NOT_EXECUTE));
        assert_eq!(FaultStatus::describe(decoded.status), "nca_s_op_rng_error");
    }

    #[test]
    fn test_truncated_bind_ack_is_an_error() {
        let ack = BindAckPdu::new(1, 0, vec![PresentationResult::accepted(SyntaxId::ndr())]);
        let encoded = ack.encode().unwrap();
        let truncated = &encoded[..encoded.len() - 10];
        assert!(matches!(
            BindAckPdu::decode(truncated),
            Err(RpcError::InvalidPduData(_))
        ));
    }

    #[test]
    fn test_oversized_pdu_is_not_truncated() {
        let response = ResponsePdu::new(9, Bytes::from(vec![0u8; 70_000]));
        assert!(matches!(
            response.encode(),
            Err(RpcError::RecordTooLarge { max: 65535, .. })
        ));
    }

    #[test]
    fn test_data_representation() {
        let ndr = DataRepresentation::ndr();
        let encoded = ndr.encode();
        assert_eq!(encoded, [0x10, 0, 0, 0]);
        let decoded = DataRepresentation::decode(encoded);
        assert!(decoded.is_little_endian());
        assert_eq!(decoded.char_rep, CharRep::Ascii);
        assert_eq!(decoded.float_rep, FloatRep::Ieee);

        let be = DataRepresentation::big_endian().encode();
        assert_eq!(be[0], 0x00);
        assert!(!DataRepresentation::decode(be).is_little_endian());
    }
}
