//! Writes framed values to an async byte stream.

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::codec;
use crate::codec::encode::{put_len, width};
use crate::error::PackError;
use crate::types::Value;

/// Writes framed messages to an `AsyncWrite` stream.
pub struct FrameWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Encodes a value and writes the complete frame.
    pub async fn write_value(&mut self, value: &Value) -> Result<(), PackError> {
        let frame = codec::encode(value)?;
        self.writer.write_all(&frame).await?;
        Ok(())
    }

    /// Frames an already-packed payload and writes it.
    pub async fn write_frame(&mut self, payload: &[u8]) -> Result<(), PackError> {
        let len = payload.len() as i64;
        let w = width(len);
        let mut head = BytesMut::with_capacity(1 + w as usize);
        head.put_u8(w);
        put_len(&mut head, len, w);
        self.writer.write_all(&head).await?;
        self.writer.write_all(payload).await?;
        Ok(())
    }

    /// Flushes the underlying writer.
    pub async fn flush(&mut self) -> Result<(), PackError> {
        self.writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_value_emits_frame() {
        let mut output = Vec::new();
        let mut writer = FrameWriter::new(&mut output);
        writer
            .write_value(&Value::Tuple(vec![Value::Int(1)]))
            .await
            .unwrap();
        assert_eq!(output, vec![0x01, 0x04, 0x61, 0x01, 0x01, 0x01]);
    }

    #[tokio::test]
    async fn write_frame_wraps_payload() {
        let mut output = Vec::new();
        let mut writer = FrameWriter::new(&mut output);
        writer.write_frame(&[0x21]).await.unwrap();
        assert_eq!(output, vec![0x01, 0x01, 0x21]);
    }

    #[tokio::test]
    async fn write_frame_widens_length() {
        let payload = vec![0u8; 128];
        let mut output = Vec::new();
        let mut writer = FrameWriter::new(&mut output);
        writer.write_frame(&payload).await.unwrap();
        assert_eq!(&output[..3], &[0x02, 0x80, 0x00]);
        assert_eq!(output.len(), 3 + 128);
    }
}
