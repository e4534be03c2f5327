//! DCE RPC (MS-RPC) client and server implementation
//!
//! This crate provides a wire-compatible implementation of connection-oriented
//! DCE RPC over TCP as specified in DCE 1.1 RPC (C706) and MS-RPCE.
//!
//! # Features
//!
//! - Bind, alter-context and multiple presentation contexts per association
//! - Request and response fragmentation
//! - NDR transfer syntax negotiation
//! - Async server and client using Tokio
//!
//! # Example
//!
//! ## TCP Server
//!
//! ```no_run
//! use dcerpc::{DceRpcServer, InterfaceBuilder};
//! use bytes::Bytes;
//!
//! #[tokio::main]
//! async fn main() {
//!     let interface = InterfaceBuilder::new(
//!         "12345678-1234-1234-1234-123456789012",
//!         1,
//!         0,
//!     )
//!     .unwrap()
//!     .operation(0, |_args| async { Ok(Bytes::new()) })
//!     .operation(1, |args: Bytes| async move { Ok(args) })
//!     .build();
//!
//!     let server = DceRpcServer::new();
//!     server.register_interface(interface).await;
//!     server.run("127.0.0.1:12345".parse().unwrap()).await.unwrap();
//! }
//! ```
//!
//! ## TCP Client
//!
//! ```no_run
//! use dcerpc::{DceRpcClient, SyntaxId, Uuid};
//! use bytes::Bytes;
//!
//! #[tokio::main]
//! async fn main() {
//!     let interface = SyntaxId::new(
//!         Uuid::parse("12345678-1234-1234-1234-123456789012").unwrap(),
//!         1,
//!         0,
//!     );
//!
//!     let client = DceRpcClient::connect(
//!         "127.0.0.1:12345".parse().unwrap(),
//!         interface,
//!     ).await.unwrap();
//!
//!     let result = client.call(1, Bytes::from("hello")).await.unwrap();
//!     assert_eq!(result.as_ref(), b"hello");
//! }
//! ```

pub mod connection;
pub mod error;
pub mod fragmentation;

pub mod dcerpc;
pub mod dcerpc_client;
pub mod dcerpc_server;
pub mod dcerpc_transport;

pub use error::{Result, RpcError};

pub use connection::RpcConnection;
pub use dcerpc::{
    // PDU structures
    AlterContextPdu,
    AlterContextRespPdu,
    BindAckPdu,
    BindNakPdu,
    BindPdu,
    CharRep,
    ContextElement,
    ContextResult,
    DataRepresentation,
    FaultPdu,
    FaultStatus,
    FloatRep,
    // Data representation
    IntRep,
    PacketFlags,
    PacketType,
    // PDU types
    Pdu,
    PduHeader,
    PresentationResult,
    ProviderReason,
    RejectReason,
    RequestPdu,
    ResponsePdu,
    SyntaxId,
    // Supporting types
    Uuid,
    // Constants
    DCE_RPC_VERSION,
    DCE_RPC_VERSION_MINOR,
    DEFAULT_MAX_FRAG,
    NDR_SYNTAX_UUID,
    NDR_SYNTAX_VERSION,
};
pub use dcerpc_client::{DceRpcClient, DceRpcClientBuilder};
pub use dcerpc_server::{
    DceRpcServer, DceRpcServerConfig, Interface, InterfaceBuilder, OperationHandler, ServerStats,
    ServerStatsSnapshot,
};
pub use dcerpc_transport::{DceRpcTransport, DEFAULT_MAX_PDU_SIZE};
pub use fragmentation::{FragmentAssembler, FragmentGenerator, MIN_FRAG_SIZE};
