//! Data types carried by the dhcpsrv interface.
//!
//! Every type is defined with the NDR macros from `midl_ndr`, so field order
//! is wire order. IPv4 addresses and masks are host-order `u32` values
//! (`10.0.0.1` is `0x0A00_0001`); use `u32::from(Ipv4Addr)` to build them.

mod client;
mod config;
mod mib;
mod option;
mod subnet;

pub use client::*;
pub use config::*;
pub use mib::*;
pub use option::*;
pub use subnet::*;

/// `DHCP_IP_ADDRESS`
pub type DhcpIpAddress = u32;
/// `DHCP_IP_MASK`
pub type DhcpIpMask = u32;
/// `DHCP_OPTION_ID`
pub type DhcpOptionId = u32;
/// `DHCP_RESUME_HANDLE`
pub type ResumeHandle = u32;

midl_ndr::ndr_struct! {
    /// A 64-bit FILETIME split into two halves.
    pub struct DateTime {
        pub low: u32,
        pub high: u32,
    }
}

impl DateTime {
    pub fn from_filetime(value: u64) -> Self {
        Self {
            low: value as u32,
            high: (value >> 32) as u32,
        }
    }

    pub fn to_filetime(&self) -> u64 {
        (u64::from(self.high) << 32) | u64::from(self.low)
    }
}

midl_ndr::ndr_struct! {
    /// A DHCP server or owner host.
    pub struct HostInfo {
        pub ip_address: DhcpIpAddress,
        pub netbios_name: String as Unique,
        pub host_name: String as Unique,
    }
}

midl_ndr::ndr_struct! {
    /// An opaque byte blob: hardware addresses, client UIDs, binary option data.
    pub struct BinaryData {
        pub data: Vec<u8> as Counted,
    }
}

/// `DHCP_CLIENT_UID`, a client's hardware address or unique id.
pub type ClientUid = BinaryData;

impl From<Vec<u8>> for BinaryData {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<&[u8]> for BinaryData {
    fn from(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }
}

midl_ndr::ndr_struct! {
    /// A list of IPv4 addresses, such as the subnets returned by `EnumSubnets`.
    pub struct IpArray {
        pub elements: Vec<DhcpIpAddress> as Counted,
    }
}
