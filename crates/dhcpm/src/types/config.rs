//! Server configuration and database scan results.

use super::DhcpIpAddress;

/// Bits of `fields_to_set` in the `ServerSetConfig*` calls.
pub mod fields {
    pub const SET_API_PROTOCOL_SUPPORT: u32 = 0x0000_0001;
    pub const SET_DATABASE_NAME: u32 = 0x0000_0002;
    pub const SET_DATABASE_PATH: u32 = 0x0000_0004;
    pub const SET_BACKUP_PATH: u32 = 0x0000_0008;
    pub const SET_BACKUP_INTERVAL: u32 = 0x0000_0010;
    pub const SET_DATABASE_LOGGING_FLAG: u32 = 0x0000_0020;
    pub const SET_RESTORE_FLAG: u32 = 0x0000_0040;
    pub const SET_DATABASE_CLEANUP_INTERVAL: u32 = 0x0000_0080;
    pub const SET_DEBUG_FLAG: u32 = 0x0000_0100;
    pub const SET_PING_RETRIES: u32 = 0x0000_0200;
    pub const SET_BOOT_FILE_TABLE: u32 = 0x0000_0400;
    pub const SET_AUDIT_LOG_STATE: u32 = 0x0000_0800;
    pub const SET_QUARANTINE_ON: u32 = 0x0000_1000;
    pub const SET_QUARANTINE_DEF_FAIL: u32 = 0x0000_2000;
}

/// RPC protocol sequences the server listens on (`api_protocol_support`).
pub const DHCP_SERVER_USE_RPC_OVER_TCPIP: u32 = 0x1;
pub const DHCP_SERVER_USE_RPC_OVER_NP: u32 = 0x2;
pub const DHCP_SERVER_USE_RPC_OVER_LPC: u32 = 0x4;
pub const DHCP_SERVER_USE_RPC_OVER_ALL: u32 = 0x7;

midl_ndr::ndr_struct! {
    pub struct ServerConfigInfo {
        pub api_protocol_support: u32,
        pub database_name: String as Unique,
        pub database_path: String as Unique,
        pub backup_path: String as Unique,
        pub backup_interval: u32,
        pub database_logging_flag: u32,
        pub restore_flag: u32,
        pub database_cleanup_interval: u32,
        pub debug_flag: u32,
    }
}

midl_ndr::ndr_struct! {
    /// Server configuration with ping retries, the BOOTP file table and audit logging.
    pub struct ServerConfigInfoV4 {
        pub api_protocol_support: u32,
        pub database_name: String as Unique,
        pub database_path: String as Unique,
        pub backup_path: String as Unique,
        pub backup_interval: u32,
        pub database_logging_flag: u32,
        pub restore_flag: u32,
        pub database_cleanup_interval: u32,
        pub debug_flag: u32,
        pub ping_retries: u32,
        /// UTF-16 code units, including the separators between entries.
        /// `cbBootTableString` on the wire counts bytes.
        pub boot_table_string: Vec<u16> as ByteCounted,
        pub audit_log: bool as Bool32,
    }
}

midl_ndr::ndr_struct! {
    pub struct ServerConfigInfoVq {
        pub api_protocol_support: u32,
        pub database_name: String as Unique,
        pub database_path: String as Unique,
        pub backup_path: String as Unique,
        pub backup_interval: u32,
        pub database_logging_flag: u32,
        pub restore_flag: u32,
        pub database_cleanup_interval: u32,
        pub debug_flag: u32,
        pub ping_retries: u32,
        pub boot_table_string: Vec<u16> as ByteCounted,
        pub audit_log: bool as Bool32,
        pub quarantine_on: bool as Bool32,
        pub quar_def_fail: u32,
        pub quar_runtime_status: bool as Bool32,
    }
}

impl ServerConfigInfoV4 {
    /// The boot file table as text.
    pub fn boot_table(&self) -> String {
        String::from_utf16_lossy(&self.boot_table_string)
    }

    pub fn set_boot_table(&mut self, table: &str) {
        self.boot_table_string = table.encode_utf16().collect();
    }
}

midl_ndr::ndr_enum! {
    /// Where a database scan found the inconsistency.
    pub enum ScanFlag {
        RegistryFix = 0,
        DatabaseFix = 1,
    }
}

midl_ndr::ndr_struct! {
    pub struct ScanItem {
        pub ip_address: DhcpIpAddress,
        pub scan_flag: ScanFlag,
    }
}

midl_ndr::ndr_struct! {
    pub struct ScanList {
        pub scan_items: Vec<ScanItem> as Counted,
    }
}
