//! Reads framed values from an async byte stream.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::codec::{size, unpack};
use crate::error::PackError;
use crate::types::Value;

/// Reads framed messages from an `AsyncRead` stream.
///
/// Each frame is one width byte, the payload length in that many bytes, then
/// the payload. EOF mid-frame surfaces as an I/O error.
pub struct FrameReader<R> {
    reader: R,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads one complete frame and returns its payload.
    pub async fn read_frame(&mut self) -> Result<BytesMut, PackError> {
        let mut head = [0u8; 1];
        self.reader.read_exact(&mut head).await?;
        let w = head[0] as usize;
        if !matches!(w, 1 | 2 | 4 | 8) {
            tracing::warn!(width = w, "invalid frame width byte");
            return Err(PackError::BadWidth(w));
        }

        let mut len_buf = [0u8; 8];
        self.reader.read_exact(&mut len_buf[..w]).await?;
        let len = size(&len_buf[..w])?;
        if len < 0 {
            return Err(PackError::BadLength(len));
        }

        let mut payload = BytesMut::zeroed(len as usize);
        self.reader.read_exact(&mut payload).await?;
        tracing::debug!(len, "read frame");
        Ok(payload)
    }

    /// Reads one frame and unpacks its payload.
    pub async fn read_value(&mut self) -> Result<Value, PackError> {
        let frame = self.read_frame().await?;
        unpack(&frame)
    }
}
