//! The seam between typed interface clients and an RPC association.
//!
//! Interface bindings are written against [`RpcConnection`] rather than a
//! concrete client, so the same generated code runs over a bound
//! [`DceRpcClient`](crate::DceRpcClient) or over an in-process stub.

use crate::dcerpc::SyntaxId;
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// A bound association able to carry calls for one presentation context.
#[async_trait]
pub trait RpcConnection: Send + Sync {
    /// Abstract syntax of the active presentation context.
    fn interface(&self) -> SyntaxId;

    /// Send NDR stub data for `opnum` and return the response stub data.
    async fn call(&self, opnum: u16, stub_data: Bytes) -> Result<Bytes>;

    /// Negotiate a presentation context for `interface` on the existing
    /// association and make it the active one.
    async fn alter_context(&self, interface: SyntaxId) -> Result<()>;
}

#[async_trait]
impl<C: RpcConnection + ?Sized> RpcConnection for Arc<C> {
    fn interface(&self) -> SyntaxId {
        (**self).interface()
    }

    async fn call(&self, opnum: u16, stub_data: Bytes) -> Result<Bytes> {
        (**self).call(opnum, stub_data).await
    }

    async fn alter_context(&self, interface: SyntaxId) -> Result<()> {
        (**self).alter_context(interface).await
    }
}
