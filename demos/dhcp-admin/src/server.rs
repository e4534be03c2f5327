//! In-memory dhcpsrv server for trying out `dhcp-admin`
//!
//! Run with: cargo run --bin dhcp-stub-server -- --port 49152 --seed 4

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use dcerpc::DceRpcServer;
use dhcpm::dhcpsrv::v1::{create_dhcp_server_interface, DHCPSRV_SYNTAX_V1_0};
use tracing::info;

use dhcp_admin::{init_tracing, ipv4, parse_ipv4, MemoryServer};

#[derive(Parser)]
#[command(name = "dhcp-stub-server")]
#[command(about = "In-memory DHCP server reachable over dhcpsrv")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "DHCPM_PORT", default_value = "49152")]
    port: u16,

    /// Host to bind to
    #[arg(short = 'H', long, env = "DHCPM_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Number of /24 subnets to create at startup
    #[arg(long, default_value = "0")]
    seed: u32,

    /// First seeded subnet
    #[arg(long, default_value = "10.0.0.0", value_parser = parse_ipv4)]
    seed_base: u32,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, env = "DHCPM_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.verbose)?;
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    let store = Arc::new(MemoryServer::new());
    if args.seed > 0 {
        store.seed_subnets(args.seed_base, args.seed);
        info!(count = args.seed, first = %ipv4(args.seed_base), "seeded subnets");
    }

    info!(interface = %DHCPSRV_SYNTAX_V1_0, %addr, "starting dhcpsrv stub server");

    let server = DceRpcServer::new();
    server
        .register_interface(create_dhcp_server_interface(store))
        .await;
    server
        .run_until(addr, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}
