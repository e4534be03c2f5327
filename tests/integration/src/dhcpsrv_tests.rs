//! dhcpsrv Tests - Operations Against a Live Server
//!
//! These tests drive the generated client over loopback TCP against the
//! in-memory server:
//! - Subnet, element, lease and option management
//! - Win32 status errors that still carry the decoded response
//! - Resume-handle enumeration
//! - Faults for operations the server does not implement

mod common;

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::*;
use dcerpc::{DceRpcClientBuilder, FaultStatus, RpcError};
use dhcp_admin::{MemoryServer, SERVER_VERSION};
use dhcpm::dhcpsrv::v1::*;
use dhcpm::types::*;
use dhcpm::win32::*;
use dhcpm::DhcpError;
use parking_lot::Mutex;

fn lab_subnet(n: u32) -> SubnetInfo {
    SubnetInfo {
        subnet_address: subnet(n),
        subnet_mask: 0xFFFF_FF00,
        subnet_name: format!("lab-{n}"),
        subnet_comment: "integration".into(),
        ..Default::default()
    }
}

async fn create(client: &Client, n: u32) {
    client
        .create_subnet(CreateSubnetRequest {
            server_ip_address: String::new(),
            subnet_address: subnet(n),
            subnet_info: Some(lab_subnet(n)),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_get_version() {
    let server = TestServer::start(Arc::new(MemoryServer::new())).await;
    let client = server.client().await;

    let version = client
        .get_version(GetVersionRequest::default())
        .await
        .unwrap();
    assert_eq!((version.major_version, version.minor_version), SERVER_VERSION);
    assert_eq!(version.return_value, ERROR_SUCCESS);
}

#[tokio::test]
async fn test_subnet_lifecycle() {
    let server = TestServer::start(Arc::new(MemoryServer::new())).await;
    let client = server.client().await;
    create(&client, 1).await;

    let info = client
        .get_subnet_info(GetSubnetInfoRequest {
            server_ip_address: String::new(),
            subnet_address: subnet(1),
        })
        .await
        .unwrap()
        .subnet_info
        .unwrap();
    assert_eq!(info, lab_subnet(1));

    let mut renamed = lab_subnet(1);
    renamed.subnet_name = "renamed".into();
    renamed.subnet_state = SubnetState::Disabled;
    client
        .set_subnet_info(SetSubnetInfoRequest {
            server_ip_address: String::new(),
            subnet_address: subnet(1),
            subnet_info: Some(renamed.clone()),
        })
        .await
        .unwrap();
    let info = client
        .get_subnet_info(GetSubnetInfoRequest {
            server_ip_address: String::new(),
            subnet_address: subnet(1),
        })
        .await
        .unwrap();
    assert_eq!(info.subnet_info, Some(renamed));

    client
        .delete_subnet(DeleteSubnetRequest {
            server_ip_address: String::new(),
            subnet_address: subnet(1),
            force_flag: ForceFlag::NoForce,
        })
        .await
        .unwrap();
    assert_eq!(server.store.subnet_count(), 0);
}

#[tokio::test]
async fn test_status_error_carries_response() {
    let server = TestServer::start(Arc::new(MemoryServer::new())).await;
    let client = server.client().await;

    let err = client
        .get_subnet_info(GetSubnetInfoRequest {
            server_ip_address: String::new(),
            subnet_address: subnet(9),
        })
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(ERROR_DHCP_SUBNET_NOT_PRESENT));
    assert!(err.to_string().contains("R_DhcpGetSubnetInfo"), "{err}");
    let response = err.response::<GetSubnetInfoResponse>().unwrap();
    assert_eq!(response.return_value, ERROR_DHCP_SUBNET_NOT_PRESENT);
    assert_eq!(response.subnet_info, None);
}

#[tokio::test]
async fn test_duplicate_subnet_is_a_dhcp_error() {
    let server = TestServer::start(Arc::new(MemoryServer::new())).await;
    let client = server.client().await;
    create(&client, 2).await;

    let err = client
        .create_subnet(CreateSubnetRequest {
            server_ip_address: String::new(),
            subnet_address: subnet(2),
            subnet_info: Some(lab_subnet(2)),
        })
        .await
        .unwrap_err();
    let status = err.status().unwrap();
    assert_eq!(status.code(), ERROR_DHCP_SUBNET_EXITS);
    assert!(status.is_dhcp_error());
}

#[tokio::test]
async fn test_named_server_address_is_accepted() {
    let server = TestServer::start(Arc::new(MemoryServer::new())).await;
    let client = server.client().await;

    let version = client
        .get_version(GetVersionRequest {
            server_ip_address: "127.0.0.1".into(),
        })
        .await
        .unwrap();
    assert_eq!(version.major_version, SERVER_VERSION.0);
}

#[tokio::test]
async fn test_enum_subnets_in_one_call() {
    let store = Arc::new(MemoryServer::new());
    store.seed_subnets(subnet(0), 3);
    let server = TestServer::start(store).await;
    let client = server.client().await;

    let response = client
        .enum_subnets(EnumSubnetsRequest {
            server_ip_address: String::new(),
            resume: 0,
            preferred_maximum: 0xFFFF_FFFF,
        })
        .await
        .unwrap();
    assert_eq!(response.resume, 3);
    assert_eq!(response.elements_read, 3);
    assert_eq!(response.elements_total, 3);
    assert_eq!(
        response.enum_info.unwrap().elements,
        vec![subnet(0), subnet(1), subnet(2)]
    );
}

#[tokio::test]
async fn test_enum_subnets_by_pages() {
    let store = Arc::new(MemoryServer::new());
    store.seed_subnets(subnet(0), 25);
    let server = TestServer::start(store).await;
    let client = server.client().await;

    let first = client
        .enum_subnets(EnumSubnetsRequest {
            server_ip_address: String::new(),
            resume: 0,
            preferred_maximum: 4,
        })
        .await
        .unwrap_err();
    assert!(first.is_more_data());
    let page: EnumSubnetsResponse = first.into_response().unwrap();
    assert_eq!(page.resume, 4);
    assert_eq!(page.enum_info.unwrap().elements.len(), 4);

    let all = enum_all_subnets(&client, "", 4).await.unwrap();
    let expected: Vec<u32> = (0..25).map(subnet).collect();
    assert_eq!(all, expected);

    let past_end = client
        .enum_subnets(EnumSubnetsRequest {
            server_ip_address: String::new(),
            resume: 25,
            preferred_maximum: 4,
        })
        .await
        .unwrap_err();
    assert!(past_end.is_no_more_items());
}

#[tokio::test]
async fn test_dhcp_only_range_round_trips() {
    let server = TestServer::start(Arc::new(MemoryServer::new())).await;
    let client = server.client().await;
    create(&client, 4).await;

    let range = SubnetElementDataV4 {
        element: SubnetElementV4::IpRangesDhcpOnly(IpRange {
            start_address: subnet(4) | 20,
            end_address: subnet(4) | 60,
        }),
    };
    client
        .add_subnet_element_v4(AddSubnetElementV4Request {
            server_ip_address: String::new(),
            subnet_address: subnet(4),
            add_element_info: Some(range.clone()),
        })
        .await
        .unwrap();

    let listed = enum_all_subnet_elements_v4(
        &client,
        "",
        subnet(4),
        SubnetElementType::IpRangesDhcpOnly,
        10,
    )
    .await
    .unwrap();
    assert_eq!(listed, vec![range]);
}

#[tokio::test]
async fn test_elements_and_reservations() {
    let server = TestServer::start(Arc::new(MemoryServer::new())).await;
    let client = server.client().await;
    create(&client, 3).await;

    let add = |element| AddSubnetElementV4Request {
        server_ip_address: String::new(),
        subnet_address: subnet(3),
        add_element_info: Some(element),
    };
    client
        .add_subnet_element_v4(add(SubnetElementDataV4::ip_range(subnet(3) | 10, subnet(3) | 100)))
        .await
        .unwrap();
    client
        .add_subnet_element_v4(add(SubnetElementDataV4::excluded_range(subnet(3) | 10, subnet(3) | 19)))
        .await
        .unwrap();
    let mac = vec![0x00, 0x15, 0x5D, 0x01, 0x02, 0x03];
    client
        .add_subnet_element_v4(add(SubnetElementDataV4::reservation(subnet(3) | 50, mac.clone(), 1)))
        .await
        .unwrap();

    let reserved = enum_all_subnet_elements_v4(&client, "", subnet(3), SubnetElementType::ReservedIps, 10)
        .await
        .unwrap();
    assert_eq!(reserved.len(), 1);
    match &reserved[0].element {
        SubnetElementV4::ReservedIps(r) => {
            assert_eq!(r.reserved_ip_address, subnet(3) | 50);
            assert_eq!(r.reserved_for_client.as_ref().unwrap().data, mac);
            assert_eq!(r.allowed_client_types, 1);
        }
        other => panic!("expected a reservation, got {other:?}"),
    }

    let ranges = enum_all_subnet_elements_v4(&client, "", subnet(3), SubnetElementType::IpRanges, 10)
        .await
        .unwrap();
    assert_eq!(
        ranges,
        vec![SubnetElementDataV4::ip_range(subnet(3) | 10, subnet(3) | 100)]
    );

    let err = client
        .remove_subnet_element_v4(RemoveSubnetElementV4Request {
            server_ip_address: String::new(),
            subnet_address: subnet(3),
            remove_element_info: Some(SubnetElementDataV4::reservation(subnet(3) | 51, mac, 1)),
            force_flag: ForceFlag::NoForce,
        })
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(ERROR_DHCP_NOT_RESERVED_CLIENT));
}

#[tokio::test]
async fn test_lease_management() {
    let store = Arc::new(MemoryServer::new());
    store.seed_subnets(subnet(4), 1);
    let server = TestServer::start(store).await;
    let client = server.client().await;

    for host in 1..=5u8 {
        client
            .create_client_info_v4(CreateClientInfoV4Request {
                server_ip_address: String::new(),
                client_info: Some(ClientInfoV4 {
                    client_ip_address: subnet(4) | (20 + u32::from(host)),
                    subnet_mask: 0xFFFF_FF00,
                    client_hardware_address: vec![0x02, 0, 0, 0, 0, host].into(),
                    client_name: format!("host{host}.example"),
                    client_lease_expires: DateTime::from_filetime(0x01D9_0000_0000_0000),
                    client_type: 1,
                    ..Default::default()
                }),
            })
            .await
            .unwrap();
    }

    let by_mac = client
        .get_client_info_v4(GetClientInfoV4Request {
            server_ip_address: String::new(),
            search_info: Some(SearchInfo::ClientHardwareAddress(vec![0x02, 0, 0, 0, 0, 3].into())),
        })
        .await
        .unwrap()
        .client_info
        .unwrap();
    assert_eq!(by_mac.client_ip_address, subnet(4) | 23);
    assert_eq!(by_mac.client_lease_expires.to_filetime(), 0x01D9_0000_0000_0000);

    let by_name = client
        .get_client_info_v4(GetClientInfoV4Request {
            server_ip_address: String::new(),
            search_info: Some(SearchInfo::ClientName("HOST5.example".into())),
        })
        .await
        .unwrap()
        .client_info
        .unwrap();
    assert_eq!(by_name.client_ip_address, subnet(4) | 25);

    let leases = enum_all_subnet_clients_v4(&client, "", subnet(4), 2).await.unwrap();
    assert_eq!(leases.len(), 5);
    assert!(leases.windows(2).all(|w| w[0].client_ip_address < w[1].client_ip_address));

    client
        .delete_client_info(DeleteClientInfoRequest {
            server_ip_address: String::new(),
            client_info: Some(SearchInfo::ClientIpAddress(subnet(4) | 21)),
        })
        .await
        .unwrap();

    let mib = client
        .get_mib_info(GetMibInfoRequest::default())
        .await
        .unwrap()
        .mib_info
        .unwrap();
    assert_eq!(mib.scope_info.len(), 1);
    assert_eq!(mib.scope_info[0].num_addresses_inuse, 4);
    assert_eq!(mib.scope_info[0].num_addresses_free, 191 - 4);
    assert_ne!(mib.server_start_time.to_filetime(), 0);

    let err = client
        .delete_subnet(DeleteSubnetRequest {
            server_ip_address: String::new(),
            subnet_address: subnet(4),
            force_flag: ForceFlag::NoForce,
        })
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(ERROR_DHCP_ELEMENT_CANT_REMOVE));
}

#[tokio::test]
async fn test_option_definitions_and_values() {
    let store = Arc::new(MemoryServer::new());
    store.seed_subnets(subnet(5), 1);
    let server = TestServer::start(store).await;
    let client = server.client().await;

    for (id, name) in [(3, "Router"), (6, "DNS Servers"), (15, "DNS Domain Name")] {
        client
            .create_option(CreateOptionRequest {
                server_ip_address: String::new(),
                option_id: id,
                option_info: Some(DhcpOption {
                    option_name: name.into(),
                    option_type: if id == 6 {
                        OptionType::Array
                    } else {
                        OptionType::UnaryElement
                    },
                    ..Default::default()
                }),
            })
            .await
            .unwrap();
    }

    let definitions = client
        .enum_options(EnumOptionsRequest {
            server_ip_address: String::new(),
            resume: 0,
            preferred_maximum: 0xFFFF_FFFF,
        })
        .await
        .unwrap();
    let names: Vec<String> = definitions
        .options
        .unwrap()
        .options
        .into_iter()
        .map(|o| o.option_name)
        .collect();
    assert_eq!(names, ["Router", "DNS Servers", "DNS Domain Name"]);

    let scope = OptionScopeInfo::Subnet(subnet(5));
    client
        .set_option_values(SetOptionValuesRequest {
            server_ip_address: String::new(),
            scope_info: Some(scope.clone()),
            option_values: Some(OptionValueArray {
                values: vec![
                    OptionValue::new(3, OptionDataElement::IpAddress(subnet(5) | 1)),
                    OptionValue::new(
                        6,
                        vec![
                            OptionDataElement::IpAddress(0x0808_0808),
                            OptionDataElement::IpAddress(0x0101_0101),
                        ],
                    ),
                    OptionValue::new(15, OptionDataElement::String("lab.example".into())),
                ],
            }),
        })
        .await
        .unwrap();

    let values = enum_all_option_values(&client, "", &scope, 2).await.unwrap();
    assert_eq!(values.len(), 3);
    assert_eq!(
        values[2],
        OptionValue::new(15, OptionDataElement::String("lab.example".into()))
    );

    let global = enum_all_option_values(&client, "", &OptionScopeInfo::Global, 2)
        .await
        .unwrap();
    assert!(global.is_empty());

    client
        .remove_option_value(RemoveOptionValueRequest {
            server_ip_address: String::new(),
            option_id: 6,
            scope_info: Some(scope.clone()),
        })
        .await
        .unwrap();
    let err = client
        .get_option_value(GetOptionValueRequest {
            server_ip_address: String::new(),
            option_id: 6,
            scope_info: Some(scope),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(ERROR_DHCP_OPTION_NOT_PRESENT));
}

#[tokio::test]
async fn test_server_config_v4() {
    let server = TestServer::start(Arc::new(MemoryServer::new())).await;
    let client = server.client().await;

    let mut config = ServerConfigInfoV4 {
        database_path: r"C:\Windows\system32\dhcp".into(),
        ping_retries: 2,
        audit_log: true,
        ..Default::default()
    };
    config.set_boot_table("pxe,,boot\\x64\\wdsnbp.com");
    client
        .server_set_config_v4(ServerSetConfigV4Request {
            server_ip_address: String::new(),
            fields_to_set: fields::SET_DATABASE_PATH
                | fields::SET_PING_RETRIES
                | fields::SET_AUDIT_LOG_STATE
                | fields::SET_BOOT_FILE_TABLE,
            config_info: Some(config.clone()),
        })
        .await
        .unwrap();

    let stored = client
        .server_get_config_v4(ServerGetConfigV4Request::default())
        .await
        .unwrap()
        .config_info
        .unwrap();
    assert_eq!(stored, config);
    assert_eq!(stored.boot_table(), "pxe,,boot\\x64\\wdsnbp.com");
}

#[tokio::test]
async fn test_unimplemented_operation_faults() {
    let server = TestServer::start(Arc::new(MemoryServer::new())).await;
    let client = server.client().await;

    let err = client
        .scan_database(ScanDatabaseRequest {
            server_ip_address: String::new(),
            subnet_address: subnet(1),
            fix_flag: 0,
        })
        .await
        .unwrap_err();
    assert!(
        matches!(err, DhcpError::Rpc(RpcError::Fault(s)) if s == FaultStatus::OpRngError as u32),
        "{err:?}"
    );
    assert_eq!(err.status(), None);

    // the association survives the fault
    client.get_version(GetVersionRequest::default()).await.unwrap();
}

/// Records every call and stamps a server address on requests that lack one.
#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<&'static str>>,
    statuses: AtomicUsize,
}

impl CallHooks for Recorder {
    fn before_request(&self, op: &OperationInfo, request: &mut dyn Any) -> dhcpm::Result<()> {
        self.calls.lock().push(op.wire_name());
        if let Some(request) = request.downcast_mut::<GetSubnetInfoRequest>() {
            if request.server_ip_address.is_empty() {
                request.server_ip_address = "127.0.0.1".into();
            }
        }
        Ok(())
    }

    fn after_response(&self, _op: &OperationInfo, response: &mut dyn Any) -> dhcpm::Result<()> {
        if response.downcast_ref::<GetSubnetInfoResponse>().is_some() {
            self.statuses.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_hooks_see_every_call() {
    let server = TestServer::start(Arc::new(MemoryServer::new())).await;
    let recorder = Arc::new(Recorder::default());
    let conn = DceRpcClientBuilder::from_syntax(DHCPSRV_SYNTAX_V1_0)
        .connect(server.addr)
        .await
        .unwrap();
    let client = DefaultDhcpServerClient::with_config(
        conn,
        ClientConfig::default().with_hooks(recorder.clone()),
    )
    .await
    .unwrap();

    client.get_version(GetVersionRequest::default()).await.unwrap();
    let _ = client
        .get_subnet_info(GetSubnetInfoRequest {
            server_ip_address: String::new(),
            subnet_address: subnet(1),
        })
        .await;

    assert_eq!(
        *recorder.calls.lock(),
        vec!["R_DhcpGetVersion", "R_DhcpGetSubnetInfo"]
    );
    assert_eq!(recorder.statuses.load(Ordering::SeqCst), 1);
}
