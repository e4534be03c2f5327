//! Server statistics.

use super::{DateTime, DhcpIpAddress};

midl_ndr::ndr_struct! {
    pub struct ScopeMibInfo {
        pub subnet: DhcpIpAddress,
        pub num_addresses_inuse: u32,
        pub num_addresses_free: u32,
        pub num_pending_offers: u32,
    }
}

midl_ndr::ndr_struct! {
    /// Packet counters since `server_start_time`, plus per-scope usage.
    pub struct MibInfo {
        pub discovers: u32,
        pub offers: u32,
        pub requests: u32,
        pub acks: u32,
        pub naks: u32,
        pub declines: u32,
        pub releases: u32,
        pub server_start_time: DateTime,
        pub scope_info: Vec<ScopeMibInfo> as Counted,
    }
}

midl_ndr::ndr_struct! {
    pub struct ScopeMibInfoVq {
        pub subnet: DhcpIpAddress,
        pub num_addresses_inuse: u32,
        pub num_addresses_free: u32,
        pub num_pending_offers: u32,
        pub qtn_num_leases: u32,
        pub qtn_pct_qtn_leases: u32,
        pub qtn_probation_leases: u32,
        pub qtn_non_qtn_leases: u32,
        pub qtn_exempt_leases: u32,
        pub qtn_capable_clients: u32,
    }
}

midl_ndr::ndr_struct! {
    pub struct MibInfoVq {
        pub discovers: u32,
        pub offers: u32,
        pub requests: u32,
        pub acks: u32,
        pub naks: u32,
        pub declines: u32,
        pub releases: u32,
        pub server_start_time: DateTime,
        pub qtn_num_leases: u32,
        pub qtn_pct_qtn_leases: u32,
        pub qtn_probation_leases: u32,
        pub qtn_non_qtn_leases: u32,
        pub qtn_exempt_leases: u32,
        pub qtn_capable_clients: u32,
        pub qtn_ias_errors: u32,
        pub scope_info: Vec<ScopeMibInfoVq> as Counted,
    }
}

impl MibInfo {
    /// Addresses in use across all scopes.
    pub fn total_in_use(&self) -> u64 {
        self.scope_info
            .iter()
            .map(|s| u64::from(s.num_addresses_inuse))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midl_ndr::{decode_ndr, encode_ndr};

    #[test]
    fn test_mib_info_layout() {
        let mib = MibInfo {
            discovers: 100,
            acks: 90,
            scope_info: vec![
                ScopeMibInfo {
                    subnet: 0x0A00_0000,
                    num_addresses_inuse: 20,
                    num_addresses_free: 230,
                    num_pending_offers: 1,
                },
                ScopeMibInfo {
                    subnet: 0x0A00_0100,
                    num_addresses_inuse: 5,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let bytes = encode_ndr(&mib).unwrap();
        // 7 counters, start time, count, pointer, conformance, 2 x 16 bytes.
        assert_eq!(bytes.len(), 28 + 8 + 8 + 4 + 32);
        assert_eq!(&bytes[36..40], &2u32.to_le_bytes());
        assert_eq!(mib.total_in_use(), 25);
        assert_eq!(decode_ndr::<MibInfo>(bytes).unwrap(), mib);
    }

    #[test]
    fn test_mib_info_vq_roundtrip() {
        let mib = MibInfoVq {
            offers: 3,
            qtn_ias_errors: 2,
            scope_info: vec![ScopeMibInfoVq {
                subnet: 0xC0A8_0000,
                qtn_capable_clients: 4,
                ..Default::default()
            }],
            ..Default::default()
        };
        let bytes = encode_ndr(&mib).unwrap();
        assert_eq!(decode_ndr::<MibInfoVq>(bytes).unwrap(), mib);
    }
}
