//! Request and response messages of the dhcpsrv v1 interface.
//!
//! Each operation gets a `<Op>Request` holding its `[in]` parameters, a
//! `<Op>Response` holding its `[out]` parameters plus `return_value`, and a
//! marker type in [`op`] tying both to the opnum. Messages encode as
//! top-level parameter lists, so `midl_ndr::encode_ndr` on a request yields
//! the exact stub data of the call.

use super::operations::dhcpsrv_v1_operations;
use crate::types::*;
use midl_ndr::{NdrDecode, NdrEncode};
use std::fmt::Debug;

/// Static description of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationInfo {
    pub opnum: u16,
    /// Full name, e.g. `/dhcpsrv/v1/R_DhcpGetSubnetInfo`.
    pub name: &'static str,
    /// Client method name, e.g. `get_subnet_info`.
    pub method: &'static str,
}

impl OperationInfo {
    /// The IDL method name without the interface prefix.
    pub fn wire_name(&self) -> &'static str {
        self.name.rsplit('/').next().unwrap_or(self.name)
    }
}

/// Responses expose the Win32 status the server returned.
pub trait ReturnValue {
    fn return_value(&self) -> u32;
}

/// One RPC of the interface.
pub trait Operation: Send + Sync + 'static {
    const OPNUM: u16;
    const NAME: &'static str;
    const INFO: OperationInfo;

    type Request: NdrEncode + NdrDecode + Default + Clone + Debug + PartialEq + Send + Sync + 'static;
    type Response: NdrEncode
        + NdrDecode
        + ReturnValue
        + Default
        + Clone
        + Debug
        + PartialEq
        + Send
        + Sync
        + 'static;
}

macro_rules! define_messages {
    ($(
        $(#[$doc:meta])*
        $opnum:literal => $op:ident($req:ident, $resp:ident) fn $method:ident = $name:literal {
            request { $( $rq:ident : $rqty:ty $(as $rqk:ident)? ),* $(,)? }
            response { $( $rs:ident : $rsty:ty $(as $rsk:ident)? ),* $(,)? }
        }
    )*) => {
        $(
            midl_ndr::ndr_params! {
                #[doc = concat!("Parameters sent with `", $name, "`.")]
                pub struct $req {
                    $( pub $rq: $rqty $(as $rqk)? ),*
                }
            }

            midl_ndr::ndr_params! {
                #[doc = concat!("Parameters returned by `", $name, "`.")]
                pub struct $resp {
                    $( pub $rs: $rsty $(as $rsk)?, )*
                    pub return_value: u32,
                }
            }

            impl ReturnValue for $resp {
                fn return_value(&self) -> u32 {
                    self.return_value
                }
            }

            impl Operation for op::$op {
                const OPNUM: u16 = $opnum;
                const NAME: &'static str = concat!("/dhcpsrv/v1/", $name);
                const INFO: OperationInfo = OperationInfo {
                    opnum: $opnum,
                    name: concat!("/dhcpsrv/v1/", $name),
                    method: stringify!($method),
                };
                type Request = $req;
                type Response = $resp;
            }
        )*

        /// Marker types, one per operation.
        pub mod op {
            $(
                $(#[$doc])*
                #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
                pub struct $op;
            )*
        }

        /// Every operation of the interface, indexed by opnum.
        pub const OPERATIONS: &[OperationInfo] = &[
            $( <op::$op as Operation>::INFO, )*
        ];
    };
}

dhcpsrv_v1_operations!(define_messages);

/// Look up an operation by opnum.
pub fn operation(opnum: u16) -> Option<&'static OperationInfo> {
    OPERATIONS.get(usize::from(opnum)).filter(|info| info.opnum == opnum)
}
