//! dhcpsrv interface, version 1.0.

mod operations;

mod client;
mod paging;
mod protocol;
mod server;

pub use client::{CallHooks, ClientConfig, DefaultDhcpServerClient, DhcpServerClient};
pub use paging::{
    enum_all_option_values, enum_all_subnet_clients_v4, enum_all_subnet_elements_v4,
    enum_all_subnets, paginate, EnumPage,
};
pub use protocol::*;
pub use server::{create_dhcp_server_interface, DhcpServerServer};

use dcerpc::{SyntaxId, Uuid};

/// `6bffd098-a112-3610-9833-46c3f874532d`
pub const DHCPSRV_UUID: Uuid = Uuid {
    time_low: 0x6bff_d098,
    time_mid: 0xa112,
    time_hi_and_version: 0x3610,
    clock_seq_hi_and_reserved: 0x98,
    clock_seq_low: 0x33,
    node: [0x46, 0xc3, 0xf8, 0x74, 0x53, 0x2d],
};

/// Abstract syntax of dhcpsrv v1.0.
pub const DHCPSRV_SYNTAX_V1_0: SyntaxId = SyntaxId::new(DHCPSRV_UUID, 1, 0);
