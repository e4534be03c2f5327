//! DCE RPC transport layer
//!
//! For connection-oriented (TCP) transport, PDUs are self-delimiting via the
//! frag_length field in the header.

use crate::dcerpc::{Pdu, PduHeader};
use crate::error::{Result, RpcError};
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

/// Maximum PDU size (64 KB default, typical DCE RPC limit)
pub const DEFAULT_MAX_PDU_SIZE: usize = 65536;

/// DCE RPC transport for reading/writing PDUs over a byte stream
pub struct DceRpcTransport<T> {
    inner: T,
    max_pdu_size: usize,
    read_buf: BytesMut,
}

impl<T> DceRpcTransport<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            max_pdu_size: DEFAULT_MAX_PDU_SIZE,
            read_buf: BytesMut::with_capacity(8192),
        }
    }

    pub fn with_max_pdu_size(mut self, max_size: usize) -> Self {
        self.max_pdu_size = max_size;
        self
    }

    pub fn max_pdu_size(&self) -> usize {
        self.max_pdu_size
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: AsyncRead + Unpin> DceRpcTransport<T> {
    /// Read one complete PDU fragment
    pub async fn read_pdu(&mut self) -> Result<Bytes> {
        while self.read_buf.len() < PduHeader::SIZE {
            if self.fill_buf().await? == 0 {
                return Err(if self.read_buf.is_empty() {
                    RpcError::ConnectionClosed
                } else {
                    unexpected_eof("incomplete PDU header".to_string())
                });
            }
        }

        let header = PduHeader::decode(&self.read_buf)?;
        let frag_length = header.frag_length as usize;

        if frag_length < PduHeader::SIZE {
            return Err(RpcError::InvalidPduData(format!(
                "invalid fragment length: {frag_length} < header size"
            )));
        }
        if frag_length > self.max_pdu_size {
            return Err(RpcError::RecordTooLarge {
                size: frag_length,
                max: self.max_pdu_size,
            });
        }

        while self.read_buf.len() < frag_length {
            if self.fill_buf().await? == 0 {
                return Err(unexpected_eof(format!(
                    "incomplete PDU: expected {} bytes, got {}",
                    frag_length,
                    self.read_buf.len()
                )));
            }
        }

        trace!(
            ptype = ?header.packet_type,
            call_id = header.call_id,
            frag_length,
            "read PDU"
        );
        Ok(self.read_buf.split_to(frag_length).freeze())
    }

    /// Read and decode a complete PDU
    pub async fn read_pdu_decoded(&mut self) -> Result<Pdu> {
        let data = self.read_pdu().await?;
        Pdu::decode(&data)
    }

    async fn fill_buf(&mut self) -> Result<usize> {
        if self.read_buf.capacity() - self.read_buf.len() < 4096 {
            self.read_buf.reserve(8192);
        }
        Ok(self.inner.read_buf(&mut self.read_buf).await?)
    }
}

fn unexpected_eof(message: String) -> RpcError {
    RpcError::Io(std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        message,
    ))
}

impl<T: AsyncWrite + Unpin> DceRpcTransport<T> {
    /// Write a complete DCE RPC PDU (already encoded)
    pub async fn write_pdu(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data).await?;
        self.inner.flush().await?;
        Ok(())
    }

    /// Encode and write a PDU
    pub async fn write_pdu_encoded(&mut self, pdu: &Pdu) -> Result<()> {
        self.write_pdu(&pdu.encode()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcerpc::RequestPdu;
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_pdu_roundtrip() {
        let (client, server) = duplex(1024);
        let mut client_transport = DceRpcTransport::new(client);
        let mut server_transport = DceRpcTransport::new(server);

        let write_handle = tokio::spawn(async move {
            let request = RequestPdu::new(1, 0, Bytes::from_static(b"hello"));
            client_transport.write_pdu(&request.encode().unwrap()).await.unwrap();
        });

        match server_transport.read_pdu_decoded().await.unwrap() {
            Pdu::Request(req) => {
                assert_eq!(req.header.call_id, 1);
                assert_eq!(req.opnum, 0);
                assert_eq!(req.stub_data.as_ref(), b"hello");
            }
            other => panic!("expected request PDU, got {:?}", other),
        }

        write_handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_multiple_pdus_in_one_read() {
        let (client, server) = duplex(4096);
        let mut client_transport = DceRpcTransport::new(client);
        let mut server_transport = DceRpcTransport::new(server);

        let write_handle = tokio::spawn(async move {
            for i in 0..3u32 {
                let request = RequestPdu::new(i, i as u16, Bytes::from(format!("msg{}", i)));
                client_transport.write_pdu(&request.encode().unwrap()).await.unwrap();
            }
        });

        for i in 0..3u32 {
            match server_transport.read_pdu_decoded().await.unwrap() {
                Pdu::Request(req) => {
                    assert_eq!(req.header.call_id, i);
                    assert_eq!(req.opnum, i as u16);
                }
                other => panic!("expected request PDU, got {:?}", other),
            }
        }

        write_handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_oversized_pdu_rejected() {
        let (client, server) = duplex(4096);
        let mut client_transport = DceRpcTransport::new(client);
        let mut server_transport = DceRpcTransport::new(server).with_max_pdu_size(64);

        let request = RequestPdu::new(1, 0, Bytes::from(vec![0u8; 128]));
        client_transport.write_pdu(&request.encode().unwrap()).await.unwrap();

        let err = server_transport.read_pdu().await.unwrap_err();
        assert!(matches!(err, RpcError::RecordTooLarge { max: 64, .. }));
    }

    #[tokio::test]
    async fn test_clean_close_reports_connection_closed() {
        let (client, server) = duplex(64);
        drop(client);
        let mut server_transport = DceRpcTransport::new(server);
        assert!(matches!(
            server_transport.read_pdu().await,
            Err(RpcError::ConnectionClosed)
        ));
    }
}
