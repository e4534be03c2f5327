//! Server-side dispatch for the dhcpsrv v1 interface.

use super::operations::dhcpsrv_v1_operations;
use super::protocol::*;
use super::DHCPSRV_SYNTAX_V1_0;
use async_trait::async_trait;
use bytes::Bytes;
use dcerpc::{Interface, Result, RpcError};
use midl_ndr::{decode_ndr, encode_ndr};
use std::future::Future;
use std::sync::Arc;
use tracing::{trace, warn};

/// Decode a request stub, run `handler` and encode its response.
async fn dispatch<O, F, Fut>(stub: Bytes, handler: F) -> Result<Bytes>
where
    O: Operation,
    F: FnOnce(O::Request) -> Fut,
    Fut: Future<Output = Result<O::Response>>,
{
    let request: O::Request = decode_ndr(stub).map_err(|e| {
        warn!(operation = O::NAME, error = %e, "undecodable request stub");
        RpcError::Marshal(format!("{}: {e}", O::NAME))
    })?;
    let response = handler(request).await?;
    trace!(
        operation = O::NAME,
        return_value = response.return_value(),
        "request handled"
    );
    encode_ndr(&response).map_err(|e| RpcError::Marshal(format!("{}: {e}", O::NAME)))
}

macro_rules! define_server {
    ($(
        $(#[$doc:meta])*
        $opnum:literal => $op:ident($req:ident, $resp:ident) fn $method:ident = $name:literal {
            request { $( $rq:ident : $rqty:ty $(as $rqk:ident)? ),* $(,)? }
            response { $( $rs:ident : $rsty:ty $(as $rsk:ident)? ),* $(,)? }
        }
    )*) => {
        /// Implementation of the dhcpsrv v1 interface.
        ///
        /// Every method defaults to failing with
        /// [`RpcError::OperationUnavailable`], which reaches the caller as an
        /// `nca_s_op_rng_error` fault. DHCP-level failures are reported by
        /// returning a response with a non-zero `return_value`.
        #[async_trait]
        pub trait DhcpServerServer: Send + Sync + 'static {
            $(
                $(#[$doc])*
                async fn $method(&self, _request: $req) -> Result<$resp> {
                    Err(RpcError::OperationUnavailable($opnum))
                }
            )*
        }

        /// Build a [`dcerpc::Interface`] routing every opnum to `server`.
        pub fn create_dhcp_server_interface<T: DhcpServerServer>(server: Arc<T>) -> Interface {
            let mut interface = Interface::from_syntax(DHCPSRV_SYNTAX_V1_0);
            $(
                let handler = Arc::clone(&server);
                interface.register_operation($opnum, move |stub| {
                    let handler = Arc::clone(&handler);
                    async move {
                        dispatch::<op::$op, _, _>(stub, |request| async move {
                            handler.$method(request).await
                        })
                        .await
                    }
                });
            )*
            interface
        }
    };
}

dhcpsrv_v1_operations!(define_server);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SubnetInfo;
    use crate::win32::ERROR_DHCP_SUBNET_NOT_PRESENT;

    struct OneSubnet;

    #[async_trait]
    impl DhcpServerServer for OneSubnet {
        async fn get_subnet_info(&self, request: GetSubnetInfoRequest) -> Result<GetSubnetInfoResponse> {
            if request.subnet_address != 0x0A00_0000 {
                return Ok(GetSubnetInfoResponse {
                    subnet_info: None,
                    return_value: ERROR_DHCP_SUBNET_NOT_PRESENT,
                });
            }
            Ok(GetSubnetInfoResponse {
                subnet_info: Some(SubnetInfo {
                    subnet_address: 0x0A00_0000,
                    subnet_mask: 0xFFFF_FF00,
                    subnet_name: "lab".into(),
                    ..Default::default()
                }),
                return_value: 0,
            })
        }
    }

    #[test]
    fn test_interface_registers_every_opnum() {
        let interface = create_dhcp_server_interface(Arc::new(OneSubnet));
        assert_eq!(interface.syntax, DHCPSRV_SYNTAX_V1_0);
        assert_eq!(interface.operation_count(), OPERATIONS.len());
        for info in OPERATIONS {
            assert!(interface.get_operation(info.opnum).is_some(), "{}", info.name);
        }
    }

    #[tokio::test]
    async fn test_handler_roundtrip() {
        let interface = create_dhcp_server_interface(Arc::new(OneSubnet));
        let handler = interface.get_operation(2).unwrap();

        let request = GetSubnetInfoRequest {
            server_ip_address: String::new(),
            subnet_address: 0x0A00_0000,
        };
        let reply = handler(encode_ndr(&request).unwrap()).await.unwrap();
        let response: GetSubnetInfoResponse = decode_ndr(reply).unwrap();
        assert_eq!(response.return_value, 0);
        assert_eq!(response.subnet_info.unwrap().subnet_name, "lab");

        let request = GetSubnetInfoRequest {
            subnet_address: 0xC0A8_0000,
            ..request
        };
        let reply = handler(encode_ndr(&request).unwrap()).await.unwrap();
        let response: GetSubnetInfoResponse = decode_ndr(reply).unwrap();
        assert_eq!(response.return_value, ERROR_DHCP_SUBNET_NOT_PRESENT);
    }

    #[tokio::test]
    async fn test_unimplemented_operation() {
        let interface = create_dhcp_server_interface(Arc::new(OneSubnet));
        let handler = interface.get_operation(28).unwrap();
        let stub = encode_ndr(&GetVersionRequest::default()).unwrap();
        assert!(matches!(
            handler(stub).await,
            Err(RpcError::OperationUnavailable(28))
        ));
    }

    #[tokio::test]
    async fn test_bad_stub_is_marshal_error() {
        let interface = create_dhcp_server_interface(Arc::new(OneSubnet));
        let handler = interface.get_operation(2).unwrap();
        let err = handler(Bytes::from_static(&[0, 0])).await.unwrap_err();
        assert!(matches!(err, RpcError::Marshal(ref m) if m.contains("R_DhcpGetSubnetInfo")));
    }
}
