//! Error types for DCE RPC

use crate::dcerpc::RejectReason;
use thiserror::Error;

/// RPC error types
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RPC version mismatch: {0}")]
    RpcVersionMismatch(u32),

    #[error("interface not found: {0}")]
    InterfaceNotFound(String),

    #[error("operation unavailable: {0}")]
    OperationUnavailable(u16),

    #[error("invalid PDU: {0}")]
    InvalidPduData(String),

    #[error("invalid message type: {0}")]
    InvalidMessageType(i32),

    #[error("call rejected: {0}")]
    CallRejected(String),

    #[error("bind rejected: {reason}")]
    BindRejected { reason: RejectReason },

    #[error("connection closed")]
    ConnectionClosed,

    #[error("timeout")]
    Timeout,

    #[error("not bound to an interface")]
    NotBound,

    #[error("fault: status 0x{0:08x}")]
    Fault(u32),

    #[error("context mismatch")]
    ContextMismatch,

    #[error("call ID mismatch: expected {expected}, got {got}")]
    CallIdMismatch { expected: u32, got: u32 },

    #[error("XID mismatch: expected {expected}, got {got}")]
    XidMismatch { expected: u32, got: u32 },

    #[error("record too large: {size} bytes exceeds maximum {max}")]
    RecordTooLarge { size: usize, max: usize },

    #[error("fragment received out of order")]
    FragmentOutOfOrder,

    #[error("fragment assembly failed: {0}")]
    FragmentAssemblyError(String),

    /// Stub data could not be marshalled or unmarshalled.
    #[error("marshalling error: {0}")]
    Marshal(String),
}

impl RpcError {
    /// The fault status reported to a peer when a handler fails with this error.
    pub fn fault_status(&self) -> u32 {
        use crate::dcerpc::FaultStatus;
        match self {
            RpcError::OperationUnavailable(_) => FaultStatus::OpRngError as u32,
            RpcError::InterfaceNotFound(_) => FaultStatus::UnkIf as u32,
            RpcError::Marshal(_) => FaultStatus::BadStubData as u32,
            RpcError::ContextMismatch => FaultStatus::ContextMismatch as u32,
            RpcError::Fault(status) => *status,
            _ => FaultStatus::RpcError as u32,
        }
    }
}

pub type Result<T> = std::result::Result<T, RpcError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcerpc::FaultStatus;

    #[test]
    fn test_fault_status_mapping() {
        assert_eq!(
            RpcError::OperationUnavailable(7).fault_status(),
            FaultStatus::OpRngError as u32
        );
        assert_eq!(
            RpcError::Marshal("short".into()).fault_status(),
            FaultStatus::BadStubData as u32
        );
        assert_eq!(RpcError::Fault(0x1234).fault_status(), 0x1234);
        assert_eq!(RpcError::Timeout.fault_status(), FaultStatus::RpcError as u32);
    }

    #[test]
    fn test_bind_rejected_display() {
        let err = RpcError::BindRejected {
            reason: RejectReason::TemporaryCongestion,
        };
        assert_eq!(err.to_string(), "bind rejected: temporary congestion");
    }
}
