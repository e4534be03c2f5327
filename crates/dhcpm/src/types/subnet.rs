//! Subnets, their elements and superscopes.

use super::{BinaryData, DhcpIpAddress, DhcpIpMask, HostInfo};

midl_ndr::ndr_enum! {
    /// `DHCP_SUBNET_STATE`
    pub enum SubnetState {
        Enabled = 0,
        Disabled = 1,
        EnabledSwitched = 2,
        DisabledSwitched = 3,
        InvalidState = 4,
    }
}

midl_ndr::ndr_enum! {
    /// `DHCP_SUBNET_ELEMENT_TYPE`
    pub enum SubnetElementType {
        IpRanges = 0,
        SecondaryHosts = 1,
        ReservedIps = 2,
        ExcludedIpRanges = 3,
        IpUsedClusters = 4,
        IpRangesDhcpOnly = 5,
        IpRangesDhcpBootp = 6,
        IpRangesBootpOnly = 7,
    }
}

midl_ndr::ndr_enum! {
    /// `DHCP_FORCE_FLAG`: what to do with leases inside an element being removed.
    pub enum ForceFlag {
        FullForce = 0,
        NoForce = 1,
        FailoverForce = 2,
    }
}

midl_ndr::ndr_struct! {
    pub struct SubnetInfo {
        pub subnet_address: DhcpIpAddress,
        pub subnet_mask: DhcpIpMask,
        pub subnet_name: String as Unique,
        pub subnet_comment: String as Unique,
        pub primary_host: HostInfo,
        pub subnet_state: SubnetState,
    }
}

midl_ndr::ndr_struct! {
    /// Subnet information with the NAP quarantine setting.
    pub struct SubnetInfoVq {
        pub subnet_address: DhcpIpAddress,
        pub subnet_mask: DhcpIpMask,
        pub subnet_name: String as Unique,
        pub subnet_comment: String as Unique,
        pub primary_host: HostInfo,
        pub subnet_state: SubnetState,
        pub quarantine_on: u32,
        pub reserved1: u32,
        pub reserved2: u32,
        pub reserved3: i64,
        pub reserved4: i64,
    }
}

midl_ndr::ndr_struct! {
    /// An inclusive IPv4 address range.
    pub struct IpRange {
        pub start_address: DhcpIpAddress,
        pub end_address: DhcpIpAddress,
    }
}

midl_ndr::ndr_struct! {
    pub struct IpCluster {
        pub cluster_address: DhcpIpAddress,
        pub cluster_mask: u32,
    }
}

midl_ndr::ndr_struct! {
    pub struct IpReservation {
        pub reserved_ip_address: DhcpIpAddress,
        pub reserved_for_client: Option<BinaryData> as Unique,
    }
}

midl_ndr::ndr_struct! {
    /// A reservation restricted to DHCP, BOOTP or both (`allowed_client_types`).
    pub struct IpReservationV4 {
        pub reserved_ip_address: DhcpIpAddress,
        pub reserved_for_client: Option<BinaryData> as Unique,
        pub allowed_client_types: u8,
    }
}

/// `ELEMENT_MASK`: the BOOTP/DHCP range types travel under the
/// [`SubnetElementType::IpRanges`] arm while the tag keeps the exact type.
pub fn element_mask(element_type: u16) -> u16 {
    match element_type {
        5..=7 => 0,
        other => other,
    }
}

midl_ndr::ndr_union! {
    /// One element of a subnet, selected by [`SubnetElementType`].
    pub enum SubnetElement: SubnetElementType switch_is(element_mask) {
        IpRanges(IpRange as Pointer),
        SecondaryHosts(HostInfo as Pointer),
        ReservedIps(IpReservation as Pointer),
        ExcludedIpRanges(IpRange as Pointer),
        IpUsedClusters(IpCluster as Pointer),
        IpRangesDhcpOnly(IpRange as Pointer),
        IpRangesDhcpBootp(IpRange as Pointer),
        IpRangesBootpOnly(IpRange as Pointer),
    }
}

midl_ndr::ndr_union! {
    /// [`SubnetElement`] with typed reservations.
    pub enum SubnetElementV4: SubnetElementType switch_is(element_mask) {
        IpRanges(IpRange as Pointer),
        SecondaryHosts(HostInfo as Pointer),
        ReservedIps(IpReservationV4 as Pointer),
        ExcludedIpRanges(IpRange as Pointer),
        IpUsedClusters(IpCluster as Pointer),
        IpRangesDhcpOnly(IpRange as Pointer),
        IpRangesDhcpBootp(IpRange as Pointer),
        IpRangesBootpOnly(IpRange as Pointer),
    }
}

midl_ndr::ndr_struct! {
    pub struct SubnetElementData {
        pub element: SubnetElement,
    }
}

midl_ndr::ndr_struct! {
    pub struct SubnetElementDataV4 {
        pub element: SubnetElementV4,
    }
}

impl SubnetElementData {
    pub fn element_type(&self) -> SubnetElementType {
        self.element.tag()
    }
}

impl SubnetElementDataV4 {
    /// A distribution range.
    pub fn ip_range(start_address: DhcpIpAddress, end_address: DhcpIpAddress) -> Self {
        Self {
            element: SubnetElementV4::IpRanges(IpRange {
                start_address,
                end_address,
            }),
        }
    }

    /// An exclusion range.
    pub fn excluded_range(start_address: DhcpIpAddress, end_address: DhcpIpAddress) -> Self {
        Self {
            element: SubnetElementV4::ExcludedIpRanges(IpRange {
                start_address,
                end_address,
            }),
        }
    }

    /// A reservation of `address` for the client with hardware address `uid`.
    pub fn reservation(address: DhcpIpAddress, uid: impl Into<BinaryData>, client_types: u8) -> Self {
        Self {
            element: SubnetElementV4::ReservedIps(IpReservationV4 {
                reserved_ip_address: address,
                reserved_for_client: Some(uid.into()),
                allowed_client_types: client_types,
            }),
        }
    }

    pub fn element_type(&self) -> SubnetElementType {
        self.element.tag()
    }
}

midl_ndr::ndr_struct! {
    pub struct SubnetElementInfoArray {
        pub elements: Vec<SubnetElementData> as Counted,
    }
}

midl_ndr::ndr_struct! {
    pub struct SubnetElementInfoArrayV4 {
        pub elements: Vec<SubnetElementDataV4> as Counted,
    }
}

midl_ndr::ndr_struct! {
    pub struct SuperScopeTableEntry {
        pub subnet_address: DhcpIpAddress,
        pub super_scope_number: u32,
        pub next_in_super_scope: u32,
        pub super_scope_name: String as Unique,
    }
}

midl_ndr::ndr_struct! {
    pub struct SuperScopeTable {
        pub entries: Vec<SuperScopeTableEntry> as Counted,
    }
}
