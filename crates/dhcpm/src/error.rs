//! Errors returned by dhcpsrv clients.

use crate::win32::Win32Error;
use dcerpc::RpcError;
use midl_ndr::NdrError;
use std::any::Any;
use std::fmt;
use thiserror::Error;

/// A call that reached the server and came back with a non-zero status.
///
/// The decoded response is kept, because enumeration calls return a valid
/// page together with `ERROR_MORE_DATA`.
#[derive(Error)]
#[error("{operation}: {status}")]
pub struct StatusError {
    /// Full operation name, e.g. `/dhcpsrv/v1/R_DhcpGetSubnetInfo`.
    pub operation: &'static str,
    pub status: Win32Error,
    response: Box<dyn Any + Send + Sync>,
}

impl StatusError {
    pub fn new<T: Any + Send + Sync>(operation: &'static str, status: Win32Error, response: T) -> Self {
        Self {
            operation,
            status,
            response: Box::new(response),
        }
    }

    pub fn response<T: Any>(&self) -> Option<&T> {
        self.response.downcast_ref()
    }
}

impl fmt::Debug for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusError")
            .field("operation", &self.operation)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum DhcpError {
    /// Transport, protocol or fault error from the RPC runtime
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The request could not be encoded or the reply could not be decoded
    #[error("NDR error: {0}")]
    Ndr(#[from] NdrError),

    /// The server answered with a non-zero return value
    #[error(transparent)]
    Status(Box<StatusError>),

    /// An enumeration answered `ERROR_MORE_DATA` without moving its resume handle
    #[error("{operation}: resume handle {resume} did not advance")]
    StalledEnumeration {
        operation: &'static str,
        resume: u32,
    },

    /// A call hook refused the call
    #[error("{operation}: rejected by hook: {reason}")]
    Hook {
        operation: &'static str,
        reason: String,
    },
}

impl DhcpError {
    /// Win32 status of a completed call, if that is what failed.
    pub fn status(&self) -> Option<Win32Error> {
        match self {
            Self::Status(e) => Some(e.status),
            _ => None,
        }
    }

    /// Name of the operation the error came from, when known.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Status(e) => Some(e.operation),
            Self::StalledEnumeration { operation, .. } | Self::Hook { operation, .. } => Some(*operation),
            Self::Rpc(_) | Self::Ndr(_) => None,
        }
    }

    pub fn status_code(&self) -> Option<u32> {
        self.status().map(Win32Error::code)
    }

    pub fn is_more_data(&self) -> bool {
        self.status().is_some_and(Win32Error::is_more_data)
    }

    pub fn is_no_more_items(&self) -> bool {
        self.status().is_some_and(Win32Error::is_no_more_items)
    }

    /// The response that accompanied a non-zero status.
    pub fn response<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Status(e) => e.response(),
            _ => None,
        }
    }

    /// Take the response out of a status error, or give the error back.
    pub fn into_response<T: Any>(self) -> std::result::Result<T, Self> {
        match self {
            Self::Status(e) => {
                let StatusError {
                    operation,
                    status,
                    response,
                } = *e;
                response.downcast::<T>().map(|r| *r).map_err(|response| {
                    Self::Status(Box::new(StatusError {
                        operation,
                        status,
                        response,
                    }))
                })
            }
            other => Err(other),
        }
    }
}

impl From<StatusError> for DhcpError {
    fn from(e: StatusError) -> Self {
        Self::Status(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, DhcpError>;
