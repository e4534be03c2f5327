//! DCE RPC Server
//!
//! # Scalability Features
//!
//! - Each connection handled in a separate Tokio task
//! - Semaphore-based connection limiting
//! - Server statistics tracking
//! - Graceful shutdown support
//! - Operation handlers run without holding the interface registry lock

use crate::dcerpc::{
    AlterContextRespPdu, BindAckPdu, BindNakPdu, ContextElement, FaultPdu, FaultStatus, Pdu,
    PresentationResult, ProviderReason, RejectReason, RequestPdu, ResponsePdu, SyntaxId, Uuid,
    DEFAULT_MAX_FRAG,
};
use crate::dcerpc_transport::{DceRpcTransport, DEFAULT_MAX_PDU_SIZE};
use crate::error::{Result, RpcError};
use crate::fragmentation::{FragmentAssembler, FragmentGenerator};
use bytes::Bytes;
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{RwLock, Semaphore};
use tracing::{debug, error, info, trace, warn};

/// Operation handler function type
pub type OperationHandler =
    Arc<dyn Fn(Bytes) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send>> + Send + Sync>;

/// Interface definition - contains operations for a specific interface version
pub struct Interface {
    pub syntax: SyntaxId,
    operations: HashMap<u16, OperationHandler>,
}

impl Interface {
    pub fn new(uuid: Uuid, major_version: u16, minor_version: u16) -> Self {
        Self::from_syntax(SyntaxId::new(uuid, major_version, minor_version))
    }

    pub fn from_syntax(syntax: SyntaxId) -> Self {
        Self {
            syntax,
            operations: HashMap::new(),
        }
    }

    /// Register an operation handler
    pub fn register_operation<F, Fut>(&mut self, opnum: u16, handler: F)
    where
        F: Fn(Bytes) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Bytes>> + Send + 'static,
    {
        self.operations
            .insert(opnum, Arc::new(move |args| Box::pin(handler(args))));
    }

    /// Get an operation handler
    pub fn get_operation(&self, opnum: u16) -> Option<&OperationHandler> {
        self.operations.get(&opnum)
    }

    /// Number of registered operations
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }
}

/// DCE RPC Server configuration
#[derive(Debug, Clone)]
pub struct DceRpcServerConfig {
    pub max_pdu_size: usize,
    pub max_connections: usize,
    pub max_xmit_frag: u16,
    pub max_recv_frag: u16,
}

impl Default for DceRpcServerConfig {
    fn default() -> Self {
        Self {
            max_pdu_size: DEFAULT_MAX_PDU_SIZE,
            max_connections: 10000,
            max_xmit_frag: DEFAULT_MAX_FRAG,
            max_recv_frag: DEFAULT_MAX_FRAG,
        }
    }
}

/// Server statistics
#[derive(Debug, Default)]
pub struct ServerStats {
    pub connections_accepted: AtomicU64,
    pub connections_active: AtomicU64,
    pub connections_rejected: AtomicU64,
    pub requests_received: AtomicU64,
    pub requests_processed: AtomicU64,
    pub requests_failed: AtomicU64,
}

impl ServerStats {
    pub fn snapshot(&self) -> ServerStatsSnapshot {
        ServerStatsSnapshot {
            connections_accepted: self.connections_accepted.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            connections_rejected: self.connections_rejected.load(Ordering::Relaxed),
            requests_received: self.requests_received.load(Ordering::Relaxed),
            requests_processed: self.requests_processed.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of server statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStatsSnapshot {
    pub connections_accepted: u64,
    pub connections_active: u64,
    pub connections_rejected: u64,
    pub requests_received: u64,
    pub requests_processed: u64,
    pub requests_failed: u64,
}

type InterfaceRegistry = Arc<RwLock<HashMap<Uuid, Interface>>>;

/// DCE RPC Server
///
/// Each connection runs in its own Tokio task. A semaphore bounds the number
/// of concurrent connections.
pub struct DceRpcServer {
    interfaces: InterfaceRegistry,
    config: DceRpcServerConfig,
    assoc_group_counter: AtomicU32,
    stats: Arc<ServerStats>,
}

impl DceRpcServer {
    pub fn new() -> Self {
        Self::with_config(DceRpcServerConfig::default())
    }

    pub fn with_config(config: DceRpcServerConfig) -> Self {
        Self {
            interfaces: Arc::new(RwLock::new(HashMap::new())),
            config,
            assoc_group_counter: AtomicU32::new(1),
            stats: Arc::new(ServerStats::default()),
        }
    }

    pub fn config(&self) -> &DceRpcServerConfig {
        &self.config
    }

    /// Get server statistics
    pub fn stats(&self) -> &Arc<ServerStats> {
        &self.stats
    }

    /// Register an interface with the server
    pub async fn register_interface(&self, interface: Interface) {
        info!(
            interface = %interface.syntax,
            operations = interface.operation_count(),
            "registering interface"
        );
        self.interfaces
            .write()
            .await
            .insert(interface.syntax.uuid, interface);
    }

    /// Run the server on the given address
    pub async fn run(&self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Run the server on the given address until `shutdown` resolves
    pub async fn run_until<F: Future<Output = ()>>(
        &self,
        addr: SocketAddr,
        shutdown: F,
    ) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve_until(listener, shutdown).await
    }

    /// Accept connections from an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        self.serve_until(listener, std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves, then wait for open
    /// connections to finish.
    pub async fn serve_until<F: Future<Output = ()>>(
        &self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<()> {
        info!(
            addr = ?listener.local_addr().ok(),
            max_connections = self.config.max_connections,
            "DCE RPC server listening"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("server shutting down gracefully");
                    let _ = semaphore.acquire_many(self.config.max_connections as u32).await;
                    info!("all connections closed");
                    return Ok(());
                }

                accepted = listener.accept() => {
                    let (stream, peer_addr) = accepted?;
                    self.spawn_connection(stream, peer_addr, &semaphore);
                }
            }
        }
    }

    fn spawn_connection(&self, stream: TcpStream, peer_addr: SocketAddr, semaphore: &Arc<Semaphore>) {
        let permit = match Arc::clone(semaphore).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                self.stats.connections_rejected.fetch_add(1, Ordering::Relaxed);
                warn!(%peer_addr, "connection limit reached, rejecting");
                return;
            }
        };

        self.stats.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.stats.connections_active.fetch_add(1, Ordering::Relaxed);
        debug!(%peer_addr, "accepted connection");

        let _ = stream.set_nodelay(true);
        let connection = Connection {
            interfaces: Arc::clone(&self.interfaces),
            config: self.config.clone(),
            assoc_group_id: self.assoc_group_counter.fetch_add(1, Ordering::SeqCst),
            stats: Arc::clone(&self.stats),
            contexts: HashMap::new(),
            assemblers: HashMap::new(),
            max_xmit_frag: self.config.max_xmit_frag,
        };

        tokio::spawn(async move {
            let _permit = permit;
            let stats = Arc::clone(&connection.stats);
            let result = connection.run(stream).await;
            stats.connections_active.fetch_sub(1, Ordering::Relaxed);

            match result {
                Ok(()) | Err(RpcError::ConnectionClosed) => {
                    debug!(%peer_addr, "connection closed")
                }
                Err(e) => warn!(%peer_addr, error = %e, "connection error"),
            }
        });
    }
}

impl Default for DceRpcServer {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-association state
struct Connection {
    interfaces: InterfaceRegistry,
    config: DceRpcServerConfig,
    assoc_group_id: u32,
    stats: Arc<ServerStats>,
    /// Accepted presentation contexts: context id to abstract syntax
    contexts: HashMap<u16, SyntaxId>,
    /// Requests still being reassembled, by call id
    assemblers: HashMap<u32, FragmentAssembler>,
    /// Largest fragment we may send to this client
    max_xmit_frag: u16,
}

impl Connection {
    async fn run(mut self, stream: TcpStream) -> Result<()> {
        let local_port = stream
            .local_addr()
            .map(|addr| addr.port().to_string())
            .unwrap_or_default();
        let (reader, writer) = stream.into_split();
        let mut reader = DceRpcTransport::new(reader).with_max_pdu_size(self.config.max_pdu_size);
        let mut writer = DceRpcTransport::new(writer);

        loop {
            let pdu = reader.read_pdu_decoded().await?;

            match pdu {
                Pdu::Bind(bind) => {
                    debug!(
                        call_id = bind.header.call_id,
                        contexts = bind.context_list.len(),
                        "received bind"
                    );
                    if bind.header.version_minor > 1 {
                        let nak = BindNakPdu::new(
                            bind.header.call_id,
                            RejectReason::ProtocolVersionNotSupported,
                        );
                        writer.write_pdu(&nak.encode()?).await?;
                        continue;
                    }
                    let max_xmit = self.config.max_xmit_frag.min(bind.max_recv_frag);
                    if let Err(e) = FragmentGenerator::check_frag_size(max_xmit) {
                        warn!(call_id = bind.header.call_id, error = %e, "rejecting bind");
                        let nak = BindNakPdu::new(bind.header.call_id, RejectReason::LocalLimitExceeded);
                        writer.write_pdu(&nak.encode()?).await?;
                        continue;
                    }
                    self.max_xmit_frag = max_xmit;
                    let results = self.negotiate(&bind.context_list).await;
                    let mut ack = BindAckPdu::new(bind.header.call_id, self.assoc_group_id, results);
                    ack.max_xmit_frag = self.max_xmit_frag;
                    ack.max_recv_frag = self.config.max_recv_frag.min(bind.max_xmit_frag);
                    ack.secondary_addr = local_port.clone();
                    writer.write_pdu(&ack.encode()?).await?;
                }

                Pdu::AlterContext(alter) => {
                    debug!(
                        call_id = alter.header.call_id,
                        contexts = alter.context_list.len(),
                        "received alter-context"
                    );
                    let results = self.negotiate(&alter.context_list).await;
                    let mut resp =
                        AlterContextRespPdu::new(alter.header.call_id, self.assoc_group_id, results);
                    resp.max_xmit_frag = self.max_xmit_frag;
                    resp.max_recv_frag = self.config.max_recv_frag;
                    writer.write_pdu(&resp.encode()?).await?;
                }

                Pdu::Request(request) => {
                    if let Some((request, stub)) = self.collect_request(request)? {
                        self.stats.requests_received.fetch_add(1, Ordering::Relaxed);
                        for fragment in self.dispatch(&request, stub).await? {
                            writer.write_pdu(&fragment).await?;
                        }
                    }
                }

                Pdu::Shutdown(_) => {
                    debug!("received shutdown");
                    return Ok(());
                }

                other => {
                    warn!(ptype = ?other.header().packet_type, "unexpected PDU from client");
                }
            }
        }
    }

    /// Accept or reject each proposed presentation context.
    async fn negotiate(&mut self, proposals: &[ContextElement]) -> Vec<PresentationResult> {
        let ndr = SyntaxId::ndr();
        let interfaces = self.interfaces.read().await;
        let mut results = Vec::with_capacity(proposals.len());

        for context in proposals {
            let supported = interfaces
                .get(&context.abstract_syntax.uuid)
                .is_some_and(|iface| {
                    iface.syntax.major_version() == context.abstract_syntax.major_version()
                });

            let result = if !supported {
                PresentationResult::rejected(ProviderReason::AbstractSyntaxNotSupported)
            } else if !context.transfer_syntaxes.contains(&ndr) {
                PresentationResult::rejected(ProviderReason::ProposedTransferSyntaxesNotSupported)
            } else {
                self.contexts
                    .insert(context.context_id, context.abstract_syntax);
                PresentationResult::accepted(ndr)
            };
            debug!(
                context_id = context.context_id,
                interface = %context.abstract_syntax,
                accepted = result.is_accepted(),
                "presentation context"
            );
            results.push(result);
        }
        results
    }

    /// Feed a request fragment in; yields the request and its full stub
    /// once the last fragment arrives.
    fn collect_request(&mut self, request: RequestPdu) -> Result<Option<(RequestPdu, Bytes)>> {
        let call_id = request.header.call_id;
        let flags = request.header.packet_flags;

        if flags.is_first_frag() && flags.is_last_frag() && !self.assemblers.contains_key(&call_id) {
            let stub = request.stub_data.clone();
            return Ok(Some((request, stub)));
        }

        trace!(
            call_id,
            len = request.stub_data.len(),
            first = flags.is_first_frag(),
            last = flags.is_last_frag(),
            "request fragment"
        );

        let assembler = self
            .assemblers
            .entry(call_id)
            .or_insert_with(|| FragmentAssembler::new(call_id));

        let complete = assembler.add_fragment(
            &request.header,
            &request.stub_data,
            request.context_id,
            Some(request.opnum),
            request.alloc_hint,
        );
        match complete {
            Ok(Some(stub)) => {
                self.assemblers.remove(&call_id);
                Ok(Some((request, stub)))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                self.assemblers.remove(&call_id);
                Err(e)
            }
        }
    }

    /// Run the handler and return the encoded reply fragments.
    async fn dispatch(&self, request: &RequestPdu, stub: Bytes) -> Result<Vec<Bytes>> {
        let call_id = request.header.call_id;
        debug!(
            call_id,
            opnum = request.opnum,
            context_id = request.context_id,
            stub_len = stub.len(),
            "received request"
        );

        match self.invoke(request, stub).await {
            Ok(result) => {
                self.stats.requests_processed.fetch_add(1, Ordering::Relaxed);
                let mut response = ResponsePdu::new(call_id, result);
                response.context_id = request.context_id;
                FragmentGenerator::fragment_response(&response, self.max_xmit_frag)
                    .iter()
                    .map(ResponsePdu::encode)
                    .collect()
            }
            Err(e) => {
                self.stats.requests_failed.fetch_add(1, Ordering::Relaxed);
                let status = e.fault_status();
                match &e {
                    RpcError::OperationUnavailable(_) | RpcError::ContextMismatch => {
                        debug!(call_id, opnum = request.opnum, error = %e, "request faulted")
                    }
                    _ => error!(call_id, opnum = request.opnum, error = %e, "operation failed"),
                }
                let mut fault = FaultPdu::new(call_id, FaultStatus::RpcError);
                fault.context_id = request.context_id;
                fault.status = status;
                Ok(vec![fault.encode()?])
            }
        }
    }

    async fn invoke(&self, request: &RequestPdu, stub: Bytes) -> Result<Bytes> {
        let syntax = self
            .contexts
            .get(&request.context_id)
            .ok_or(RpcError::ContextMismatch)?;

        let handler = {
            let interfaces = self.interfaces.read().await;
            let interface = interfaces
                .get(&syntax.uuid)
                .ok_or_else(|| RpcError::InterfaceNotFound(syntax.to_string()))?;
            interface
                .get_operation(request.opnum)
                .cloned()
                .ok_or(RpcError::OperationUnavailable(request.opnum))?
        };

        handler(stub).await
    }
}

/// Builder for creating DCE RPC interfaces with a fluent API
pub struct InterfaceBuilder {
    interface: Interface,
}

impl InterfaceBuilder {
    pub fn new(uuid: &str, major_version: u16, minor_version: u16) -> Option<Self> {
        let uuid = Uuid::parse(uuid)?;
        Some(Self {
            interface: Interface::new(uuid, major_version, minor_version),
        })
    }

    pub fn from_syntax(syntax: SyntaxId) -> Self {
        Self {
            interface: Interface::from_syntax(syntax),
        }
    }

    pub fn operation<F, Fut>(mut self, opnum: u16, handler: F) -> Self
    where
        F: Fn(Bytes) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Bytes>> + Send + 'static,
    {
        self.interface.register_operation(opnum, handler);
        self
    }

    pub fn build(self) -> Interface {
        self.interface
    }
}
