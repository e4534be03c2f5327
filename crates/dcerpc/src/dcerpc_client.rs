//! DCE RPC Client
//!
//! A connection-oriented client. One association carries any number of
//! presentation contexts; calls go out on the active one and are
//! serialized over the connection.

use crate::connection::RpcConnection;
use crate::dcerpc::{
    AlterContextPdu, BindPdu, Pdu, PresentationResult, RequestPdu, SyntaxId, Uuid,
    DEFAULT_MAX_FRAG,
};
use crate::dcerpc_transport::{DceRpcTransport, DEFAULT_MAX_PDU_SIZE};
use crate::error::{Result, RpcError};
use crate::fragmentation::{FragmentAssembler, FragmentGenerator};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Both halves of the connection. Holding the lock owns the wire for one
/// complete request/response exchange.
struct Channel {
    reader: DceRpcTransport<BoxedReader>,
    writer: DceRpcTransport<BoxedWriter>,
}

impl Channel {
    /// Read the next PDU belonging to `call_id`, dropping late replies to
    /// calls that were abandoned by a timeout.
    async fn next_reply(&mut self, call_id: u32) -> Result<Pdu> {
        loop {
            let pdu = self.reader.read_pdu_decoded().await?;
            let got = pdu.call_id();
            if got == call_id {
                return Ok(pdu);
            }
            if got < call_id {
                warn!(expected = call_id, got, "discarding stale reply");
                continue;
            }
            return Err(RpcError::XidMismatch {
                expected: call_id,
                got,
            });
        }
    }

    async fn receive_response(&mut self, call_id: u32, max_stub: usize) -> Result<Bytes> {
        let mut assembler: Option<FragmentAssembler> = None;

        loop {
            match self.next_reply(call_id).await? {
                Pdu::Response(response) => {
                    let flags = response.header.packet_flags;
                    if flags.is_first_frag() && flags.is_last_frag() && assembler.is_none() {
                        trace!(call_id, len = response.stub_data.len(), "response");
                        return Ok(response.stub_data);
                    }

                    let asm = assembler
                        .get_or_insert_with(|| FragmentAssembler::with_max_size(call_id, max_stub));
                    trace!(
                        call_id,
                        len = response.stub_data.len(),
                        first = flags.is_first_frag(),
                        last = flags.is_last_frag(),
                        "response fragment"
                    );
                    if let Some(complete) = asm.add_fragment(
                        &response.header,
                        &response.stub_data,
                        response.context_id,
                        None,
                        response.alloc_hint,
                    )? {
                        debug!(call_id, len = complete.len(), "reassembled response");
                        return Ok(complete);
                    }
                }
                Pdu::Fault(fault) => return Err(RpcError::Fault(fault.status)),
                other => {
                    return Err(RpcError::InvalidMessageType(
                        other.header().packet_type as i32,
                    ))
                }
            }
        }
    }
}

/// Negotiated association state.
#[derive(Debug, Clone, Copy)]
struct Binding {
    bound: bool,
    interface: SyntaxId,
    context_id: u16,
    next_context_id: u16,
    assoc_group_id: u32,
    max_xmit_frag: u16,
    max_recv_frag: u16,
}

/// DCE RPC Client for making calls to a DCE RPC server
pub struct DceRpcClient {
    channel: Mutex<Channel>,
    binding: RwLock<Binding>,
    call_id_counter: AtomicU32,
    call_timeout: Option<Duration>,
    max_stub_size: usize,
}

impl DceRpcClient {
    /// Connect to a DCE RPC server and bind to the specified interface
    pub async fn connect(addr: SocketAddr, interface: SyntaxId) -> Result<Self> {
        DceRpcClientBuilder::from_syntax(interface).connect(addr).await
    }

    /// Create an unbound client over an existing stream
    pub fn from_stream<S>(stream: S, interface: SyntaxId) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        DceRpcClientBuilder::from_syntax(interface).build_unbound(stream)
    }

    fn next_call_id(&self) -> u32 {
        self.call_id_counter.fetch_add(1, Ordering::SeqCst)
    }

    async fn with_timeout<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match self.call_timeout {
            Some(timeout) => tokio::time::timeout(timeout, fut)
                .await
                .map_err(|_| RpcError::Timeout)?,
            None => fut.await,
        }
    }

    /// Write one PDU and wait for the PDU answering it.
    async fn round_trip(&self, request: Bytes, call_id: u32) -> Result<Pdu> {
        let mut channel = self.channel.lock().await;
        channel.writer.write_pdu(&request).await?;
        channel.next_reply(call_id).await
    }

    /// Perform the bind handshake with the server
    pub async fn bind(&self) -> Result<()> {
        let (interface, max_xmit_frag, max_recv_frag) = {
            let binding = self.binding.read();
            (binding.interface, binding.max_xmit_frag, binding.max_recv_frag)
        };

        let call_id = self.next_call_id();
        let mut bind = BindPdu::new(call_id, interface);
        bind.max_xmit_frag = max_xmit_frag;
        bind.max_recv_frag = max_recv_frag;

        debug!(call_id, %interface, "sending bind");

        match self.with_timeout(self.round_trip(bind.encode()?, call_id)).await? {
            Pdu::BindAck(ack) => {
                check_context_result(&ack.results)?;
                // The server's receive size caps what we may transmit.
                let max_xmit = FragmentGenerator::check_frag_size(max_xmit_frag.min(ack.max_recv_frag))?;

                let mut binding = self.binding.write();
                binding.bound = true;
                binding.context_id = 0;
                binding.next_context_id = 1;
                binding.assoc_group_id = ack.assoc_group_id;
                binding.max_xmit_frag = max_xmit;
                binding.max_recv_frag = ack.max_xmit_frag;

                debug!(
                    assoc_group_id = ack.assoc_group_id,
                    max_xmit = binding.max_xmit_frag,
                    max_recv = binding.max_recv_frag,
                    "bind accepted"
                );
                Ok(())
            }
            Pdu::BindNak(nak) => {
                warn!(reason = %nak.reject_reason, "bind rejected");
                Err(RpcError::BindRejected {
                    reason: nak.reject_reason,
                })
            }
            Pdu::Fault(fault) => Err(RpcError::Fault(fault.status)),
            other => Err(RpcError::InvalidMessageType(
                other.header().packet_type as i32,
            )),
        }
    }

    /// Add a presentation context for `interface` to the association and
    /// make it the one subsequent calls use.
    pub async fn alter_context(&self, interface: SyntaxId) -> Result<()> {
        let (context_id, assoc_group_id) = {
            let mut binding = self.binding.write();
            if !binding.bound {
                return Err(RpcError::NotBound);
            }
            if binding.interface == interface {
                return Ok(());
            }
            let context_id = binding.next_context_id;
            binding.next_context_id = context_id.wrapping_add(1);
            (context_id, binding.assoc_group_id)
        };

        let call_id = self.next_call_id();
        let mut alter = AlterContextPdu::new(call_id, context_id, interface);
        alter.assoc_group_id = assoc_group_id;

        debug!(call_id, context_id, %interface, "sending alter-context");

        match self.with_timeout(self.round_trip(alter.encode()?, call_id)).await? {
            Pdu::AlterContextResp(resp) => {
                check_context_result(&resp.results)?;
                let mut binding = self.binding.write();
                binding.interface = interface;
                binding.context_id = context_id;
                Ok(())
            }
            Pdu::Fault(fault) => Err(RpcError::Fault(fault.status)),
            other => Err(RpcError::InvalidMessageType(
                other.header().packet_type as i32,
            )),
        }
    }

    /// Make an RPC call on the active presentation context.
    ///
    /// Requests larger than the negotiated transmit fragment size are split
    /// into fragments and fragmented responses are reassembled.
    pub async fn call(&self, opnum: u16, stub_data: Bytes) -> Result<Bytes> {
        self.with_timeout(self.call_inner(opnum, stub_data)).await
    }

    async fn call_inner(&self, opnum: u16, stub_data: Bytes) -> Result<Bytes> {
        let (context_id, max_xmit_frag) = {
            let binding = self.binding.read();
            if !binding.bound {
                return Err(RpcError::NotBound);
            }
            (binding.context_id, binding.max_xmit_frag)
        };

        let call_id = self.next_call_id();
        let mut request = RequestPdu::new(call_id, opnum, stub_data);
        request.context_id = context_id;
        let fragments = FragmentGenerator::fragment_request(&request, max_xmit_frag);

        debug!(
            call_id,
            opnum,
            stub_len = request.stub_data.len(),
            fragments = fragments.len(),
            "sending request"
        );

        let mut channel = self.channel.lock().await;
        for frag in &fragments {
            trace!(
                call_id,
                len = frag.stub_data.len(),
                first = frag.header.packet_flags.is_first_frag(),
                last = frag.header.packet_flags.is_last_frag(),
                "request fragment"
            );
            channel.writer.write_pdu(&frag.encode()?).await?;
        }
        channel.receive_response(call_id, self.max_stub_size).await
    }

    /// Call operation 0 with no arguments
    pub async fn null_call(&self) -> Result<()> {
        self.call(0, Bytes::new()).await?;
        Ok(())
    }

    /// Abstract syntax of the active presentation context
    pub fn interface(&self) -> SyntaxId {
        self.binding.read().interface
    }

    /// Presentation context id used for calls
    pub fn context_id(&self) -> u16 {
        self.binding.read().context_id
    }

    pub fn is_bound(&self) -> bool {
        self.binding.read().bound
    }

    /// Negotiated (transmit, receive) fragment sizes
    pub fn max_frag(&self) -> (u16, u16) {
        let binding = self.binding.read();
        (binding.max_xmit_frag, binding.max_recv_frag)
    }
}

fn check_context_result(results: &[PresentationResult]) -> Result<()> {
    match results.first() {
        Some(result) if result.is_accepted() => Ok(()),
        Some(result) => Err(RpcError::CallRejected(format!(
            "presentation context rejected: {}",
            result.reason
        ))),
        None => Err(RpcError::CallRejected(
            "no presentation context result".to_string(),
        )),
    }
}

#[async_trait]
impl RpcConnection for DceRpcClient {
    fn interface(&self) -> SyntaxId {
        DceRpcClient::interface(self)
    }

    async fn call(&self, opnum: u16, stub_data: Bytes) -> Result<Bytes> {
        DceRpcClient::call(self, opnum, stub_data).await
    }

    async fn alter_context(&self, interface: SyntaxId) -> Result<()> {
        DceRpcClient::alter_context(self, interface).await
    }
}

/// Builder for DCE RPC clients
pub struct DceRpcClientBuilder {
    interface: SyntaxId,
    connect_timeout: Option<Duration>,
    call_timeout: Option<Duration>,
    max_pdu_size: usize,
    max_xmit_frag: u16,
    max_recv_frag: u16,
    max_stub_size: usize,
}

impl DceRpcClientBuilder {
    /// Create a builder for the specified interface
    pub fn new(interface_uuid: Uuid, major_version: u16, minor_version: u16) -> Self {
        Self::from_syntax(SyntaxId::new(interface_uuid, major_version, minor_version))
    }

    /// Create a builder from a SyntaxId
    pub fn from_syntax(interface: SyntaxId) -> Self {
        Self {
            interface,
            connect_timeout: None,
            call_timeout: None,
            max_pdu_size: DEFAULT_MAX_PDU_SIZE,
            max_xmit_frag: DEFAULT_MAX_FRAG,
            max_recv_frag: DEFAULT_MAX_FRAG,
            max_stub_size: FragmentAssembler::DEFAULT_MAX_SIZE,
        }
    }

    /// Set connection timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Bound each bind, alter-context and call exchange
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Set maximum PDU size accepted from the server
    pub fn max_pdu_size(mut self, size: usize) -> Self {
        self.max_pdu_size = size;
        self
    }

    pub fn max_xmit_frag(mut self, size: u16) -> Self {
        self.max_xmit_frag = size;
        self
    }

    pub fn max_recv_frag(mut self, size: u16) -> Self {
        self.max_recv_frag = size;
        self
    }

    /// Cap on a reassembled response
    pub fn max_stub_size(mut self, size: usize) -> Self {
        self.max_stub_size = size;
        self
    }

    /// Connect to the server and perform bind
    pub async fn connect(self, addr: SocketAddr) -> Result<DceRpcClient> {
        let stream = match self.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, TcpStream::connect(addr))
                .await
                .map_err(|_| RpcError::Timeout)??,
            None => TcpStream::connect(addr).await?,
        };
        stream.set_nodelay(true)?;
        debug!(%addr, "connected");
        self.connect_stream(stream).await
    }

    /// Bind over an already established stream
    pub async fn connect_stream<S>(self, stream: S) -> Result<DceRpcClient>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let client = self.build_unbound(stream);
        client.bind().await?;
        Ok(client)
    }

    fn build_unbound<S>(self, stream: S) -> DceRpcClient
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        let reader: BoxedReader = Box::new(reader);
        let writer: BoxedWriter = Box::new(writer);
        DceRpcClient {
            channel: Mutex::new(Channel {
                reader: DceRpcTransport::new(reader).with_max_pdu_size(self.max_pdu_size),
                writer: DceRpcTransport::new(writer),
            }),
            binding: RwLock::new(Binding {
                bound: false,
                interface: self.interface,
                context_id: 0,
                next_context_id: 0,
                assoc_group_id: 0,
                max_xmit_frag: self.max_xmit_frag,
                max_recv_frag: self.max_recv_frag,
            }),
            call_id_counter: AtomicU32::new(1),
            call_timeout: self.call_timeout,
            max_stub_size: self.max_stub_size,
        }
    }
}
