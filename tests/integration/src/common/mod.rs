//! Shared harness: an in-memory dhcpsrv server on an ephemeral loopback port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use dcerpc::{DceRpcClient, DceRpcClientBuilder, DceRpcServer, DceRpcServerConfig};
use dhcp_admin::MemoryServer;
use dhcpm::dhcpsrv::v1::{create_dhcp_server_interface, DefaultDhcpServerClient, DHCPSRV_SYNTAX_V1_0};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

pub type Client = DefaultDhcpServerClient<DceRpcClient>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<MemoryServer>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<dcerpc::Result<()>>,
}

impl TestServer {
    pub async fn start(store: Arc<MemoryServer>) -> Self {
        Self::start_with_config(store, DceRpcServerConfig::default()).await
    }

    pub async fn start_with_config(store: Arc<MemoryServer>, config: DceRpcServerConfig) -> Self {
        let server = DceRpcServer::with_config(config);
        server
            .register_interface(create_dhcp_server_interface(Arc::clone(&store)))
            .await;
        Self::spawn(server, store).await
    }

    /// Serve an already populated `server` until the harness is stopped.
    pub async fn spawn(server: DceRpcServer, store: Arc<MemoryServer>) -> Self {
        init_tracing();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            server
                .serve_until(listener, async {
                    let _ = rx.await;
                })
                .await
        });
        Self {
            addr,
            store,
            shutdown: Some(tx),
            handle,
        }
    }

    pub async fn client(&self) -> Client {
        let conn = DceRpcClientBuilder::from_syntax(DHCPSRV_SYNTAX_V1_0)
            .connect(self.addr)
            .await
            .unwrap();
        DefaultDhcpServerClient::new(conn).await.unwrap()
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}

/// `10.0.<n>.0`
pub fn subnet(n: u32) -> u32 {
    0x0A00_0000 | (n << 8)
}
