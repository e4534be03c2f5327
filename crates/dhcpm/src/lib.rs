//! Client and server bindings for the MS-DHCPM `dhcpsrv` RPC interface
//!
//! The interface manages a Windows DHCPv4 server: subnets and their ranges,
//! exclusions and reservations, option definitions and values, client
//! leases, superscopes, configuration and statistics. Version 1 has 51
//! operations, all generated from one table in [`dhcpsrv::v1`].
//!
//! Calls travel as NDR stub data over any [`dcerpc::RpcConnection`]; a
//! non-zero Win32 status comes back as [`DhcpError::Status`] with the decoded
//! response still attached.
//!
//! # Example
//!
//! ```no_run
//! use dhcpm::dhcpsrv::v1::{DefaultDhcpServerClient, DhcpServerClient, GetSubnetInfoRequest};
//! use std::net::Ipv4Addr;
//!
//! # async fn run() -> dhcpm::Result<()> {
//! let client = DefaultDhcpServerClient::connect("10.0.0.1:49152".parse().unwrap()).await?;
//! let response = client
//!     .get_subnet_info(GetSubnetInfoRequest {
//!         server_ip_address: String::new(),
//!         subnet_address: u32::from(Ipv4Addr::new(10, 0, 0, 0)),
//!     })
//!     .await?;
//! println!("{:?}", response.subnet_info);
//! # Ok(())
//! # }
//! ```

pub mod dhcpsrv;
pub mod error;
pub mod types;
pub mod win32;

pub use error::{DhcpError, Result, StatusError};
pub use win32::Win32Error;
