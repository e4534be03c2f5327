//! The dhcpsrv RPC interface (MS-DHCPM).

pub mod v1;
