//! The dhcpsrv v1 client.

use super::operations::dhcpsrv_v1_operations;
use super::protocol::*;
use super::DHCPSRV_SYNTAX_V1_0;
use crate::error::{DhcpError, Result, StatusError};
use crate::win32::{Win32Error, ERROR_SUCCESS};
use async_trait::async_trait;
use dcerpc::{DceRpcClient, RpcConnection, SyntaxId};
use midl_ndr::{decode_ndr, encode_ndr};
use std::any::Any;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, trace};

/// Interception points around every call.
///
/// `request` and `response` are the operation's `<Op>Request` and
/// `<Op>Response`; downcast them to inspect or rewrite a specific call. An
/// error from either hook aborts the call with that error.
pub trait CallHooks: Send + Sync {
    fn before_request(&self, _op: &OperationInfo, _request: &mut dyn Any) -> Result<()> {
        Ok(())
    }

    fn after_response(&self, _op: &OperationInfo, _response: &mut dyn Any) -> Result<()> {
        Ok(())
    }
}

/// Client settings, fixed at construction.
#[derive(Clone)]
pub struct ClientConfig {
    /// Abstract syntax the association must carry.
    pub syntax: SyntaxId,
    pub hooks: Option<Arc<dyn CallHooks>>,
}

impl ClientConfig {
    pub fn with_hooks(mut self, hooks: Arc<dyn CallHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn with_syntax(mut self, syntax: SyntaxId) -> Self {
        self.syntax = syntax;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            syntax: DHCPSRV_SYNTAX_V1_0,
            hooks: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("syntax", &self.syntax)
            .field("hooks", &self.hooks.is_some())
            .finish()
    }
}

macro_rules! define_client {
    ($(
        $(#[$doc:meta])*
        $opnum:literal => $op:ident($req:ident, $resp:ident) fn $method:ident = $name:literal {
            request { $( $rq:ident : $rqty:ty $(as $rqk:ident)? ),* $(,)? }
            response { $( $rs:ident : $rsty:ty $(as $rsk:ident)? ),* $(,)? }
        }
    )*) => {
        /// Client of the dhcpsrv v1 interface.
        ///
        /// Every method returns the decoded response on `ERROR_SUCCESS`. Any
        /// other return value yields [`DhcpError::Status`], which still
        /// carries the response.
        #[async_trait]
        pub trait DhcpServerClient: Send + Sync {
            /// The association calls are sent over.
            fn conn(&self) -> &dyn RpcConnection;

            /// Move the association to another presentation context.
            async fn alter_context(&self, syntax: SyntaxId) -> Result<()>;

            $(
                $(#[$doc])*
                async fn $method(&self, request: $req) -> Result<$resp>;
            )*
        }

        #[async_trait]
        impl<C: RpcConnection> DhcpServerClient for DefaultDhcpServerClient<C> {
            fn conn(&self) -> &dyn RpcConnection {
                &self.conn
            }

            async fn alter_context(&self, syntax: SyntaxId) -> Result<()> {
                self.conn.alter_context(syntax).await?;
                Ok(())
            }

            $(
                async fn $method(&self, request: $req) -> Result<$resp> {
                    self.invoke::<op::$op>(request).await
                }
            )*
        }
    };
}

dhcpsrv_v1_operations!(define_client);

/// [`DhcpServerClient`] over any [`RpcConnection`].
pub struct DefaultDhcpServerClient<C> {
    conn: C,
    config: ClientConfig,
}

impl<C: RpcConnection> DefaultDhcpServerClient<C> {
    pub async fn new(conn: C) -> Result<Self> {
        Self::with_config(conn, ClientConfig::default()).await
    }

    /// Wrap `conn`, moving it to `config.syntax` if it is bound elsewhere.
    pub async fn with_config(conn: C, config: ClientConfig) -> Result<Self> {
        if conn.interface() != config.syntax {
            debug!(from = %conn.interface(), to = %config.syntax, "altering context");
            conn.alter_context(config.syntax).await?;
        }
        Ok(Self { conn, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn into_inner(self) -> C {
        self.conn
    }

    /// Run one operation: hooks, encode, call, decode, status check.
    pub async fn invoke<O: Operation>(&self, mut request: O::Request) -> Result<O::Response> {
        let info = O::INFO;
        if let Some(hooks) = &self.config.hooks {
            hooks.before_request(&info, &mut request)?;
        }

        let stub = encode_ndr(&request)?;
        trace!(operation = O::NAME, opnum = O::OPNUM, len = stub.len(), "sending request");
        let reply = self.conn.call(O::OPNUM, stub).await?;
        let mut response: O::Response = decode_ndr(reply)?;

        if let Some(hooks) = &self.config.hooks {
            hooks.after_response(&info, &mut response)?;
        }

        let status = response.return_value();
        if status != ERROR_SUCCESS {
            debug!(operation = O::NAME, status = %Win32Error(status), "call returned error status");
            return Err(DhcpError::from(StatusError::new(
                O::NAME,
                Win32Error(status),
                response,
            )));
        }
        Ok(response)
    }
}

impl DefaultDhcpServerClient<DceRpcClient> {
    /// Dial a dhcpsrv endpoint over TCP and bind to the v1 interface.
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let conn = DceRpcClient::connect(addr, DHCPSRV_SYNTAX_V1_0).await?;
        Self::new(conn).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IpArray, SubnetInfo};
    use crate::win32::{ERROR_ACCESS_DENIED, ERROR_DHCP_SUBNET_NOT_PRESENT};
    use bytes::Bytes;
    use dcerpc::{RpcError, Uuid};
    use parking_lot::Mutex;

    /// An in-process association that answers from canned responses.
    struct StubConnection {
        interface: Mutex<SyntaxId>,
        calls: Mutex<Vec<(u16, Bytes)>>,
        reply: Box<dyn Fn(u16, &Bytes) -> dcerpc::Result<Bytes> + Send + Sync>,
    }

    impl StubConnection {
        fn new(reply: impl Fn(u16, &Bytes) -> dcerpc::Result<Bytes> + Send + Sync + 'static) -> Self {
            Self {
                interface: Mutex::new(DHCPSRV_SYNTAX_V1_0),
                calls: Mutex::new(Vec::new()),
                reply: Box::new(reply),
            }
        }
    }

    #[async_trait]
    impl RpcConnection for StubConnection {
        fn interface(&self) -> SyntaxId {
            *self.interface.lock()
        }

        async fn call(&self, opnum: u16, stub_data: Bytes) -> dcerpc::Result<Bytes> {
            let reply = (self.reply)(opnum, &stub_data);
            self.calls.lock().push((opnum, stub_data));
            reply
        }

        async fn alter_context(&self, interface: SyntaxId) -> dcerpc::Result<()> {
            *self.interface.lock() = interface;
            Ok(())
        }
    }

    fn subnet_not_present(_opnum: u16, _stub: &Bytes) -> dcerpc::Result<Bytes> {
        let response = GetSubnetInfoResponse {
            subnet_info: None,
            return_value: ERROR_DHCP_SUBNET_NOT_PRESENT,
        };
        Ok(encode_ndr(&response).unwrap())
    }

    #[tokio::test]
    async fn test_status_error_carries_response() {
        let client = DefaultDhcpServerClient::new(StubConnection::new(subnet_not_present))
            .await
            .unwrap();
        let err = client
            .get_subnet_info(GetSubnetInfoRequest {
                server_ip_address: String::new(),
                subnet_address: 0x0A00_0000,
            })
            .await
            .unwrap_err();

        assert!(err.to_string().contains("R_DhcpGetSubnetInfo"));
        assert_eq!(err.status_code(), Some(0x4E25));
        let response = err.response::<GetSubnetInfoResponse>().unwrap();
        assert_eq!(response.return_value, 0x4E25);
        assert_eq!(response.subnet_info, None);
    }

    #[tokio::test]
    async fn test_enum_subnets_returns_resume_handle() {
        let conn = StubConnection::new(|_, _| {
            let response = EnumSubnetsResponse {
                resume: 42,
                enum_info: Some(IpArray {
                    elements: vec![0x0A00_0000],
                }),
                elements_read: 1,
                elements_total: 1,
                return_value: 0,
            };
            Ok(encode_ndr(&response).unwrap())
        });
        let client = DefaultDhcpServerClient::new(conn).await.unwrap();
        let response = client
            .enum_subnets(EnumSubnetsRequest {
                server_ip_address: String::new(),
                resume: 0,
                preferred_maximum: 0xFFFF_FFFF,
            })
            .await
            .unwrap();
        assert_eq!(response.resume, 42);
        assert_eq!(response.elements_read, 1);

        let calls = client.into_inner().calls.into_inner();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, 3);
        assert_eq!(&calls[0].1[..], &[0, 0, 0, 0, 0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[tokio::test]
    async fn test_transport_error_is_not_retried() {
        let conn = StubConnection::new(|_, _| Err(RpcError::ConnectionClosed));
        let client = DefaultDhcpServerClient::new(conn).await.unwrap();
        let err = client
            .get_version(GetVersionRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DhcpError::Rpc(RpcError::ConnectionClosed)));
        assert_eq!(client.into_inner().calls.into_inner().len(), 1);
    }

    #[tokio::test]
    async fn test_garbage_reply_is_ndr_error() {
        let conn = StubConnection::new(|_, _| Ok(Bytes::from_static(&[1, 2])));
        let client = DefaultDhcpServerClient::new(conn).await.unwrap();
        let err = client
            .get_version(GetVersionRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DhcpError::Ndr(_)));
    }

    #[tokio::test]
    async fn test_alter_context_when_bound_elsewhere() {
        let other = SyntaxId::new(Uuid::NIL, 1, 0);
        let conn = StubConnection::new(subnet_not_present);
        *conn.interface.lock() = other;
        let client = DefaultDhcpServerClient::new(conn).await.unwrap();
        assert_eq!(client.conn().interface(), DHCPSRV_SYNTAX_V1_0);
    }

    struct Recorder {
        seen: Mutex<Vec<&'static str>>,
    }

    impl CallHooks for Recorder {
        fn before_request(&self, op: &OperationInfo, request: &mut dyn Any) -> Result<()> {
            self.seen.lock().push(op.method);
            if let Some(request) = request.downcast_mut::<CreateSubnetRequest>() {
                request.server_ip_address = "rewritten".into();
            }
            Ok(())
        }

        fn after_response(&self, op: &OperationInfo, _response: &mut dyn Any) -> Result<()> {
            if op.opnum == 28 {
                return Err(DhcpError::Hook {
                    operation: op.name,
                    reason: "version check disabled".into(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_hooks_see_and_rewrite_requests() {
        let conn = StubConnection::new(|opnum, stub| {
            if opnum == 0 {
                let request: CreateSubnetRequest =
                    decode_ndr(stub.clone()).map_err(|e| RpcError::Marshal(e.to_string()))?;
                let status = if request.server_ip_address == "rewritten" {
                    ERROR_SUCCESS
                } else {
                    ERROR_ACCESS_DENIED
                };
                return Ok(encode_ndr(&CreateSubnetResponse { return_value: status }).unwrap());
            }
            Ok(encode_ndr(&GetVersionResponse::default()).unwrap())
        });
        let recorder = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        let config = ClientConfig::default().with_hooks(recorder.clone());
        let client = DefaultDhcpServerClient::with_config(conn, config).await.unwrap();

        client
            .create_subnet(CreateSubnetRequest {
                subnet_address: 0x0A00_0000,
                subnet_info: Some(SubnetInfo::default()),
                ..Default::default()
            })
            .await
            .unwrap();

        let err = client
            .get_version(GetVersionRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DhcpError::Hook { operation: "/dhcpsrv/v1/R_DhcpGetVersion", .. }));
        assert_eq!(*recorder.seen.lock(), vec!["create_subnet", "get_version"]);
    }

    #[tokio::test]
    async fn test_client_is_object_safe() {
        let conn = StubConnection::new(subnet_not_present);
        let client: Box<dyn DhcpServerClient> =
            Box::new(DefaultDhcpServerClient::new(conn).await.unwrap());
        let err = client
            .get_subnet_info(GetSubnetInfoRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(ERROR_DHCP_SUBNET_NOT_PRESENT));
    }
}
