//! Win32 status codes returned by dhcpsrv methods.

use std::fmt;

macro_rules! win32_errors {
    ($( $(#[$meta:meta])* $name:ident = $code:literal => $text:literal, )*) => {
        $(
            $(#[$meta])*
            pub const $name: u32 = $code;
        )*

        fn lookup(code: u32) -> Option<(&'static str, &'static str)> {
            match code {
                $( $code => Some((stringify!($name), $text)), )*
                _ => None,
            }
        }
    };
}

win32_errors! {
    ERROR_SUCCESS = 0x0000_0000 => "The operation completed successfully.",
    ERROR_ACCESS_DENIED = 0x0000_0005 => "Access is denied.",
    ERROR_NOT_ENOUGH_MEMORY = 0x0000_0008 => "Not enough storage is available to process this command.",
    ERROR_INVALID_PARAMETER = 0x0000_0057 => "The parameter is incorrect.",
    ERROR_CALL_NOT_IMPLEMENTED = 0x0000_0078 => "This function is not supported on this system.",
    /// More elements are available; call again with the returned resume handle.
    ERROR_MORE_DATA = 0x0000_00EA => "There are more elements available to enumerate.",
    /// The enumeration is exhausted.
    ERROR_NO_MORE_ITEMS = 0x0000_0103 => "There are no more elements left to enumerate.",
    RPC_S_SERVER_UNAVAILABLE = 0x0000_06BA => "The RPC server is unavailable.",
    ERROR_DHCP_REGISTRY_INIT_FAILED = 0x0000_4E20 => "The DHCP server registry initialization parameters are incorrect.",
    ERROR_DHCP_DATABASE_INIT_FAILED = 0x0000_4E21 => "The DHCP server was unable to open the database of DHCP clients.",
    ERROR_DHCP_RPC_INIT_FAILED = 0x0000_4E22 => "The DHCP server was unable to start as an RPC server.",
    ERROR_DHCP_NETWORK_INIT_FAILED = 0x0000_4E23 => "The DHCP server was unable to establish a socket connection.",
    ERROR_DHCP_SUBNET_EXITS = 0x0000_4E24 => "The specified IPv4 subnet already exists.",
    ERROR_DHCP_SUBNET_NOT_PRESENT = 0x0000_4E25 => "The specified IPv4 subnet does not exist.",
    ERROR_DHCP_PRIMARY_NOT_FOUND = 0x0000_4E26 => "The primary host information for the specified subnet was not found.",
    ERROR_DHCP_ELEMENT_CANT_REMOVE = 0x0000_4E27 => "The specified subnet element cannot be removed because at least one address in it is leased.",
    ERROR_DHCP_OPTION_EXITS = 0x0000_4E29 => "The specified option already exists on the DHCP server database.",
    ERROR_DHCP_OPTION_NOT_PRESENT = 0x0000_4E2A => "The specified option definition does not exist on the DHCP server database.",
    ERROR_DHCP_ADDRESS_NOT_AVAILABLE = 0x0000_4E2B => "The specified IP address is not available.",
    ERROR_DHCP_RANGE_FULL = 0x0000_4E2C => "The specified IP address range has all of its member addresses leased.",
    ERROR_DHCP_JET_ERROR = 0x0000_4E2D => "An error occurred while accessing the DHCP server database.",
    ERROR_DHCP_CLIENT_EXISTS = 0x0000_4E2E => "The specified client already exists in the database.",
    ERROR_DHCP_INVALID_DHCP_MESSAGE = 0x0000_4E2F => "The DHCP server received an invalid message.",
    ERROR_DHCP_INVALID_DHCP_CLIENT = 0x0000_4E30 => "The DHCP server received an invalid message from the client.",
    ERROR_DHCP_SERVICE_PAUSED = 0x0000_4E31 => "The DHCP server is currently paused.",
    ERROR_DHCP_NOT_RESERVED_CLIENT = 0x0000_4E32 => "The specified DHCP client is not a reserved client.",
    ERROR_DHCP_RESERVED_CLIENT = 0x0000_4E33 => "The specified DHCP client is a reserved DHCP client.",
    ERROR_DHCP_RANGE_TOO_SMALL = 0x0000_4E34 => "The specified IP address range is too small.",
    ERROR_DHCP_IPRANGE_EXITS = 0x0000_4E35 => "The specified IPv4 address range already exists.",
    ERROR_DHCP_RESERVEDIP_EXITS = 0x0000_4E36 => "The specified IPv4 address or hardware address is being used by another DHCP client.",
    ERROR_DHCP_INVALID_RANGE = 0x0000_4E37 => "The specified IPv4 range either overlaps an existing range or is not valid.",
    ERROR_DHCP_CLASS_NOT_FOUND = 0x0000_4E4C => "The class name being used is unknown or incorrect.",
    ERROR_DHCP_IPRANGE_CONV_ILLEGAL = 0x0000_4E51 => "Conversion of a BOOTP scope to a DHCP-only scope is illegal, since BOOTP clients exist in the scope.",
    ERROR_DHCP_SUBNET_EXISTS = 0x0000_4E54 => "The IPv4 scope parameters are incorrect. Either the IPv4 scope already exists or its address and mask do not match.",
    ERROR_SCOPE_RANGE_POLICY_RANGE_CONFLICT = 0x0000_4E90 => "There is an IP address range configured for a policy in this scope.",
    ERROR_DHCP_FO_IPRANGE_TYPE_CONV_ILLEGAL = 0x0000_4EA1 => "Conversion of a failover scope to a scope of type BOOTP or BOTH could not be performed.",
}

/// A Win32 status code with its symbolic name and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Win32Error(pub u32);

impl Win32Error {
    pub const fn code(self) -> u32 {
        self.0
    }

    /// Symbolic name such as `ERROR_DHCP_SUBNET_NOT_PRESENT`, if known.
    pub fn name(self) -> Option<&'static str> {
        lookup(self.0).map(|(name, _)| name)
    }

    pub fn description(self) -> Option<&'static str> {
        lookup(self.0).map(|(_, text)| text)
    }

    pub fn is_success(self) -> bool {
        self.0 == ERROR_SUCCESS
    }

    pub fn is_more_data(self) -> bool {
        self.0 == ERROR_MORE_DATA
    }

    pub fn is_no_more_items(self) -> bool {
        self.0 == ERROR_NO_MORE_ITEMS
    }

    /// Whether the code lies in the DHCP server's own error range.
    pub fn is_dhcp_error(self) -> bool {
        (0x4E20..=0x4FFF).contains(&self.0)
    }
}

impl From<u32> for Win32Error {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

impl fmt::Display for Win32Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match lookup(self.0) {
            Some((name, text)) => write!(f, "{name} ({:#010x}): {text}", self.0),
            None => write!(f, "unknown error {:#010x}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_code() {
        let err = Win32Error(0x4E25);
        assert_eq!(err.name(), Some("ERROR_DHCP_SUBNET_NOT_PRESENT"));
        assert_eq!(
            err.to_string(),
            "ERROR_DHCP_SUBNET_NOT_PRESENT (0x00004e25): The specified IPv4 subnet does not exist."
        );
        assert!(err.is_dhcp_error());
    }

    #[test]
    fn test_enumeration_codes() {
        assert!(Win32Error(ERROR_MORE_DATA).is_more_data());
        assert!(Win32Error(ERROR_NO_MORE_ITEMS).is_no_more_items());
        assert!(Win32Error(ERROR_SUCCESS).is_success());
        assert!(!Win32Error(ERROR_MORE_DATA).is_dhcp_error());
    }

    #[test]
    fn test_unknown_code() {
        let err = Win32Error::from(0xDEAD);
        assert_eq!(err.name(), None);
        assert_eq!(err.to_string(), "unknown error 0x0000dead");
    }

    #[test]
    fn test_shared_code_uses_policy_name() {
        assert_eq!(
            Win32Error(0x4E90).name(),
            Some("ERROR_SCOPE_RANGE_POLICY_RANGE_CONFLICT")
        );
    }
}
