//! Command-line administration of a DHCP server over dhcpsrv
//!
//! Run with: cargo run --bin dhcp-admin -- --host 127.0.0.1 --port 49152 subnets

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use dcerpc::DceRpcClientBuilder;
use dhcpm::dhcpsrv::v1::*;
use dhcpm::types::*;
use tracing::{debug, info};

use dhcp_admin::{format_hardware_address, init_tracing, ipv4, parse_hardware_address, parse_ipv4};

#[derive(Parser)]
#[command(name = "dhcp-admin")]
#[command(about = "Manage a DHCP server through the dhcpsrv RPC interface")]
struct Args {
    /// Server host
    #[arg(short = 'H', long, env = "DHCPM_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Server port (the dynamic endpoint dhcpsrv is registered on)
    #[arg(short, long, env = "DHCPM_PORT", default_value = "49152")]
    port: u16,

    /// Connect and per-call timeout in seconds
    #[arg(long, env = "DHCPM_TIMEOUT", default_value = "30")]
    timeout_secs: u64,

    /// Value sent as ServerIpAddress; empty sends a null pointer
    #[arg(long, default_value = "")]
    server_address: String,

    /// Entries requested per enumeration page
    #[arg(long, default_value = "4294967295")]
    page_size: u32,

    /// Log every call at debug level unless RUST_LOG says otherwise
    #[arg(short, long, env = "DHCPM_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the server's dhcpsrv version
    Version,
    /// List subnets
    Subnets,
    /// Show one subnet
    Subnet {
        #[arg(value_parser = parse_ipv4)]
        subnet: u32,
    },
    /// Create a subnet
    CreateSubnet {
        #[arg(value_parser = parse_ipv4)]
        subnet: u32,
        #[arg(value_parser = parse_ipv4)]
        mask: u32,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Delete a subnet
    DeleteSubnet {
        #[arg(value_parser = parse_ipv4)]
        subnet: u32,
        /// Delete even when leases exist
        #[arg(long)]
        force: bool,
    },
    /// Add the distribution range of a subnet
    AddRange {
        #[arg(value_parser = parse_ipv4)]
        subnet: u32,
        #[arg(value_parser = parse_ipv4)]
        start: u32,
        #[arg(value_parser = parse_ipv4)]
        end: u32,
    },
    /// Exclude addresses from distribution
    Exclude {
        #[arg(value_parser = parse_ipv4)]
        subnet: u32,
        #[arg(value_parser = parse_ipv4)]
        start: u32,
        #[arg(value_parser = parse_ipv4)]
        end: u32,
    },
    /// Reserve an address for a hardware address
    Reserve {
        #[arg(value_parser = parse_ipv4)]
        subnet: u32,
        #[arg(value_parser = parse_ipv4)]
        address: u32,
        #[arg(value_parser = parse_mac)]
        hardware_address: HardwareAddress,
    },
    /// List elements of a subnet
    Elements {
        #[arg(value_parser = parse_ipv4)]
        subnet: u32,
        #[arg(long, value_enum, default_value = "ranges")]
        kind: ElementKind,
    },
    /// List leases of a subnet
    Leases {
        #[arg(value_parser = parse_ipv4)]
        subnet: u32,
    },
    /// List option values set globally or on a subnet
    Options {
        #[arg(long, value_parser = parse_ipv4)]
        subnet: Option<u32>,
    },
    /// Show server statistics
    Mib,
}

#[derive(Clone, Copy, ValueEnum)]
enum ElementKind {
    Ranges,
    Excluded,
    Reserved,
}

impl From<ElementKind> for SubnetElementType {
    fn from(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Ranges => SubnetElementType::IpRanges,
            ElementKind::Excluded => SubnetElementType::ExcludedIpRanges,
            ElementKind::Reserved => SubnetElementType::ReservedIps,
        }
    }
}

#[derive(Clone)]
struct HardwareAddress(Vec<u8>);

fn parse_mac(text: &str) -> Result<HardwareAddress, String> {
    parse_hardware_address(text).map(HardwareAddress)
}

/// Logs each call by its IDL name.
struct TraceCalls;

impl CallHooks for TraceCalls {
    fn before_request(&self, op: &OperationInfo, _request: &mut dyn Any) -> dhcpm::Result<()> {
        debug!(opnum = op.opnum, "calling {}", op.wire_name());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.verbose)?;
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    info!("Connecting to dhcpsrv at {}", addr);
    let timeout = Duration::from_secs(args.timeout_secs);
    let conn = DceRpcClientBuilder::from_syntax(DHCPSRV_SYNTAX_V1_0)
        .timeout(timeout)
        .call_timeout(timeout)
        .connect(addr)
        .await?;
    let config = ClientConfig::default().with_hooks(Arc::new(TraceCalls));
    let client = DefaultDhcpServerClient::with_config(conn, config).await?;

    run(&client, &args).await?;
    Ok(())
}

async fn run<C: DhcpServerClient + ?Sized>(client: &C, args: &Args) -> dhcpm::Result<()> {
    let server = args.server_address.as_str();
    match &args.command {
        Command::Version => {
            let version = client
                .get_version(GetVersionRequest {
                    server_ip_address: server.to_string(),
                })
                .await?;
            println!("{}.{}", version.major_version, version.minor_version);
        }
        Command::Subnets => {
            for subnet in enum_all_subnets(client, server, args.page_size).await? {
                println!("{}", ipv4(subnet));
            }
        }
        Command::Subnet { subnet } => {
            let response = client
                .get_subnet_info(GetSubnetInfoRequest {
                    server_ip_address: server.to_string(),
                    subnet_address: *subnet,
                })
                .await?;
            if let Some(info) = response.subnet_info {
                println!("address: {}", ipv4(info.subnet_address));
                println!("mask:    {}", ipv4(info.subnet_mask));
                println!("name:    {}", info.subnet_name);
                println!("comment: {}", info.subnet_comment);
                println!("state:   {:?}", info.subnet_state);
            }
        }
        Command::CreateSubnet {
            subnet,
            mask,
            name,
            comment,
        } => {
            client
                .create_subnet(CreateSubnetRequest {
                    server_ip_address: server.to_string(),
                    subnet_address: *subnet,
                    subnet_info: Some(SubnetInfo {
                        subnet_address: *subnet,
                        subnet_mask: *mask,
                        subnet_name: name.clone(),
                        subnet_comment: comment.clone(),
                        ..Default::default()
                    }),
                })
                .await?;
            info!("created subnet {}", ipv4(*subnet));
        }
        Command::DeleteSubnet { subnet, force } => {
            client
                .delete_subnet(DeleteSubnetRequest {
                    server_ip_address: server.to_string(),
                    subnet_address: *subnet,
                    force_flag: if *force {
                        ForceFlag::FullForce
                    } else {
                        ForceFlag::NoForce
                    },
                })
                .await?;
            info!("deleted subnet {}", ipv4(*subnet));
        }
        Command::AddRange { subnet, start, end } => {
            add_element(client, server, *subnet, SubnetElementDataV4::ip_range(*start, *end)).await?;
        }
        Command::Exclude { subnet, start, end } => {
            add_element(
                client,
                server,
                *subnet,
                SubnetElementDataV4::excluded_range(*start, *end),
            )
            .await?;
        }
        Command::Reserve {
            subnet,
            address,
            hardware_address,
        } => {
            let element = SubnetElementDataV4::reservation(*address, hardware_address.0.clone(), 3);
            add_element(client, server, *subnet, element).await?;
        }
        Command::Elements { subnet, kind } => {
            let elements = enum_all_subnet_elements_v4(
                client,
                server,
                *subnet,
                (*kind).into(),
                args.page_size,
            )
            .await?;
            for element in elements {
                match element.element {
                    SubnetElementV4::IpRanges(r) | SubnetElementV4::ExcludedIpRanges(r) => {
                        println!("{} - {}", ipv4(r.start_address), ipv4(r.end_address));
                    }
                    SubnetElementV4::ReservedIps(r) => {
                        let uid = r.reserved_for_client.map(|b| b.data).unwrap_or_default();
                        println!("{} {}", ipv4(r.reserved_ip_address), format_hardware_address(&uid));
                    }
                    other => println!("{other:?}"),
                }
            }
        }
        Command::Leases { subnet } => {
            let leases = enum_all_subnet_clients_v4(client, server, *subnet, args.page_size).await?;
            for lease in leases {
                println!(
                    "{:<15} {:<17} {} expires={:#x}",
                    ipv4(lease.client_ip_address).to_string(),
                    format_hardware_address(&lease.client_hardware_address.data),
                    lease.client_name,
                    lease.client_lease_expires.to_filetime()
                );
            }
        }
        Command::Options { subnet } => {
            let scope = match subnet {
                Some(subnet) => OptionScopeInfo::Subnet(*subnet),
                None => OptionScopeInfo::Global,
            };
            for value in enum_all_option_values(client, server, &scope, args.page_size).await? {
                println!("{:>3} {:?}", value.option_id, value.value.elements);
            }
        }
        Command::Mib => {
            let response = client
                .get_mib_info(GetMibInfoRequest {
                    server_ip_address: server.to_string(),
                })
                .await?;
            if let Some(mib) = response.mib_info {
                println!(
                    "discovers={} offers={} requests={} acks={} naks={} declines={} releases={}",
                    mib.discovers, mib.offers, mib.requests, mib.acks, mib.naks, mib.declines, mib.releases
                );
                for scope in &mib.scope_info {
                    println!(
                        "{:<15} in-use={} free={} pending={}",
                        ipv4(scope.subnet).to_string(),
                        scope.num_addresses_inuse,
                        scope.num_addresses_free,
                        scope.num_pending_offers
                    );
                }
                println!("total in use: {}", mib.total_in_use());
            }
        }
    }
    Ok(())
}

async fn add_element<C: DhcpServerClient + ?Sized>(
    client: &C,
    server: &str,
    subnet: u32,
    element: SubnetElementDataV4,
) -> dhcpm::Result<()> {
    let kind = element.element_type();
    client
        .add_subnet_element_v4(AddSubnetElementV4Request {
            server_ip_address: server.to_string(),
            subnet_address: subnet,
            add_element_info: Some(element),
        })
        .await?;
    info!("added {:?} to {}", kind, ipv4(subnet));
    Ok(())
}
