//! Leases and the search keys used to look them up.

use super::{BinaryData, DateTime, DhcpIpAddress, DhcpIpMask, HostInfo};

midl_ndr::ndr_enum! {
    /// `QuarantineStatus`
    pub enum QuarantineStatus {
        NoQuarantine = 0,
        RestrictedAccess = 1,
        DropPacket = 2,
        Probation = 3,
        Exempt = 4,
        DefaultQuarSetting = 5,
        NoQuarInfo = 6,
    }
}

midl_ndr::ndr_enum! {
    /// `DHCP_SEARCH_INFO_TYPE`
    pub enum SearchInfoType {
        ClientIpAddress = 0,
        ClientHardwareAddress = 1,
        ClientName = 2,
    }
}

midl_ndr::ndr_union! {
    /// The key used to find a client lease.
    pub enum SearchInfo: SearchInfoType {
        ClientIpAddress(DhcpIpAddress),
        ClientHardwareAddress(BinaryData),
        ClientName(String as Unique),
    }
}

midl_ndr::ndr_struct! {
    pub struct ClientInfo {
        pub client_ip_address: DhcpIpAddress,
        pub subnet_mask: DhcpIpMask,
        pub client_hardware_address: BinaryData,
        pub client_name: String as Unique,
        pub client_comment: String as Unique,
        pub client_lease_expires: DateTime,
        pub owner_host: HostInfo,
    }
}

midl_ndr::ndr_struct! {
    pub struct ClientInfoV4 {
        pub client_ip_address: DhcpIpAddress,
        pub subnet_mask: DhcpIpMask,
        pub client_hardware_address: BinaryData,
        pub client_name: String as Unique,
        pub client_comment: String as Unique,
        pub client_lease_expires: DateTime,
        pub owner_host: HostInfo,
        pub client_type: u8,
    }
}

midl_ndr::ndr_struct! {
    /// A lease with its NAP quarantine state.
    pub struct ClientInfoVq {
        pub client_ip_address: DhcpIpAddress,
        pub subnet_mask: DhcpIpMask,
        pub client_hardware_address: BinaryData,
        pub client_name: String as Unique,
        pub client_comment: String as Unique,
        pub client_lease_expires: DateTime,
        pub owner_host: HostInfo,
        pub client_type: u8,
        pub address_state: u8,
        pub status: QuarantineStatus,
        pub probation_ends: DateTime,
        pub quarantine_capable: bool as Bool32,
    }
}

midl_ndr::ndr_struct! {
    /// A page of leases. Each slot is a unique pointer and may be null.
    pub struct ClientInfoArray {
        pub clients: Vec<Option<ClientInfo>> as Counted,
    }
}

midl_ndr::ndr_struct! {
    pub struct ClientInfoArrayV4 {
        pub clients: Vec<Option<ClientInfoV4>> as Counted,
    }
}

midl_ndr::ndr_struct! {
    pub struct ClientInfoArrayVq {
        pub clients: Vec<Option<ClientInfoVq>> as Counted,
    }
}
