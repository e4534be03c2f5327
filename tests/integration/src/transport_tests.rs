//! Transport Tests - dhcpsrv Over the Connection-Oriented Transport
//!
//! These tests exercise the association underneath the dhcpsrv client:
//! - Moving a bound association onto dhcpsrv with alter-context
//! - Responses that span many fragments
//! - Many clients against one server
//! - Shutdown once clients have gone

mod common;

use std::sync::Arc;

use bytes::Bytes;
use futures::future::join_all;

use common::*;
use dcerpc::{DceRpcClientBuilder, DceRpcServer, DceRpcServerConfig, InterfaceBuilder};
use dhcp_admin::MemoryServer;
use dhcpm::dhcpsrv::v1::*;
use dhcpm::types::*;

const STATUS_UUID: &str = "0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0";

#[tokio::test]
async fn test_alter_context_onto_dhcpsrv() {
    let store = Arc::new(MemoryServer::new());
    store.seed_subnets(subnet(0), 2);
    let server = DceRpcServer::new();
    server
        .register_interface(create_dhcp_server_interface(Arc::clone(&store)))
        .await;
    let status = InterfaceBuilder::new(STATUS_UUID, 1, 0)
        .unwrap()
        .operation(0, |_args| async { Ok(Bytes::from_static(b"ready")) })
        .build();
    let status_syntax = status.syntax;
    server.register_interface(status).await;
    let harness = TestServer::spawn(server, store).await;

    let conn = DceRpcClientBuilder::from_syntax(status_syntax)
        .connect(harness.addr)
        .await
        .unwrap();
    assert_eq!(conn.call(0, Bytes::new()).await.unwrap().as_ref(), b"ready");

    let client = DefaultDhcpServerClient::new(conn).await.unwrap();
    let subnets = enum_all_subnets(&client, "", 0xFFFF_FFFF).await.unwrap();
    assert_eq!(subnets, vec![subnet(0), subnet(1)]);
    assert_eq!(client.into_inner().interface(), DHCPSRV_SYNTAX_V1_0);
}

#[tokio::test]
async fn test_large_enumeration_spans_fragments() {
    let store = Arc::new(MemoryServer::new());
    store.seed_subnets(subnet(0), 2000);
    let config = DceRpcServerConfig {
        max_xmit_frag: 1024,
        max_recv_frag: 1024,
        ..Default::default()
    };
    let server = TestServer::start_with_config(store, config).await;
    let client = server.client().await;

    let response = client
        .enum_subnets(EnumSubnetsRequest {
            server_ip_address: String::new(),
            resume: 0,
            preferred_maximum: 0xFFFF_FFFF,
        })
        .await
        .unwrap();
    let subnets = response.enum_info.unwrap().elements;
    assert_eq!(subnets.len(), 2000);
    assert_eq!(response.elements_total, 2000);
    assert!(subnets.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_large_leases_span_fragments() {
    let store = Arc::new(MemoryServer::new());
    store.seed_subnets(subnet(7), 1);
    let config = DceRpcServerConfig {
        max_xmit_frag: 2048,
        max_recv_frag: 2048,
        ..Default::default()
    };
    let server = TestServer::start_with_config(store, config).await;
    let client = server.client().await;

    for host in 10..=200u32 {
        client
            .create_client_info_v4(CreateClientInfoV4Request {
                server_ip_address: String::new(),
                client_info: Some(ClientInfoV4 {
                    client_ip_address: subnet(7) | host,
                    subnet_mask: 0xFFFF_FF00,
                    client_hardware_address: host.to_be_bytes().repeat(4).into(),
                    client_name: format!("workstation-{host:03}.branch-office.corp.example"),
                    client_comment: "x".repeat(host as usize),
                    ..Default::default()
                }),
            })
            .await
            .unwrap();
    }

    let leases = enum_all_subnet_clients_v4(&client, "", subnet(7), 0xFFFF_FFFF)
        .await
        .unwrap();
    assert_eq!(leases.len(), 191);
    let last = leases.last().unwrap();
    assert_eq!(last.client_ip_address, subnet(7) | 200);
    assert_eq!(last.client_comment.len(), 200);
    assert_eq!(last.client_hardware_address.data.len(), 16);
}

#[tokio::test]
async fn test_concurrent_clients() {
    let server = TestServer::start(Arc::new(MemoryServer::new())).await;

    let tasks = (0..16u32).map(|n| {
        let addr = server.addr;
        async move {
            let conn = DceRpcClientBuilder::from_syntax(DHCPSRV_SYNTAX_V1_0)
                .connect(addr)
                .await
                .unwrap();
            let client = DefaultDhcpServerClient::new(conn).await.unwrap();
            client
                .create_subnet(CreateSubnetRequest {
                    server_ip_address: String::new(),
                    subnet_address: subnet(n),
                    subnet_info: Some(SubnetInfo {
                        subnet_address: subnet(n),
                        subnet_mask: 0xFFFF_FF00,
                        subnet_name: format!("tenant-{n}"),
                        ..Default::default()
                    }),
                })
                .await
                .unwrap();
            client
                .get_subnet_info(GetSubnetInfoRequest {
                    server_ip_address: String::new(),
                    subnet_address: subnet(n),
                })
                .await
                .unwrap()
                .subnet_info
                .unwrap()
                .subnet_name
        }
    });
    let names = join_all(tasks).await;

    for (n, name) in names.iter().enumerate() {
        assert_eq!(name, &format!("tenant-{n}"));
    }
    assert_eq!(server.store.subnet_count(), 16);
}

#[tokio::test]
async fn test_shared_client_concurrent_calls() {
    let store = Arc::new(MemoryServer::new());
    store.seed_subnets(subnet(0), 8);
    let server = TestServer::start(store).await;
    let client = Arc::new(server.client().await);

    let calls = (0..8u32).map(|n| {
        let client = Arc::clone(&client);
        async move {
            client
                .get_subnet_info(GetSubnetInfoRequest {
                    server_ip_address: String::new(),
                    subnet_address: subnet(n),
                })
                .await
                .map(|r| r.subnet_info.map(|i| i.subnet_address))
        }
    });
    let results = join_all(calls).await;

    for (n, result) in results.into_iter().enumerate() {
        assert_eq!(result.unwrap(), Some(subnet(n as u32)));
    }
}

#[tokio::test]
async fn test_shutdown_after_clients_disconnect() {
    let server = TestServer::start(Arc::new(MemoryServer::new())).await;
    let client = server.client().await;
    client.get_version(GetVersionRequest::default()).await.unwrap();
    drop(client);

    server.stop().await;
}
