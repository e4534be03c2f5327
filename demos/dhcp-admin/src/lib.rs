//! Support code shared by the `dhcp-admin` client and the
//! `dhcp-stub-server` binary.

mod memory;

pub use memory::{MemoryServer, SERVER_VERSION};

use std::net::{AddrParseError, Ipv4Addr};
use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Parse dotted-quad text into the host-order form used on the wire.
pub fn parse_ipv4(text: &str) -> Result<u32, AddrParseError> {
    text.parse::<Ipv4Addr>().map(u32::from)
}

/// Dotted-quad text for a host-order address.
pub fn ipv4(address: u32) -> Ipv4Addr {
    Ipv4Addr::from(address)
}

/// Parse `aa:bb:cc:dd:ee:ff` (or `-` separated) into raw bytes.
pub fn parse_hardware_address(text: &str) -> Result<Vec<u8>, String> {
    text.split(|c| c == ':' || c == '-')
        .map(|octet| {
            u8::from_str_radix(octet, 16).map_err(|e| format!("bad octet {octet:?}: {e}"))
        })
        .collect()
}

/// Colon separated hex, the inverse of [`parse_hardware_address`].
pub fn format_hardware_address(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}
