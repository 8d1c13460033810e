//! Wire codec: tagged, length-prefixed binary encoding of `Value` trees.

pub mod decode;
pub mod depth;
pub mod encode;
mod reconstruct;
pub mod tag;

pub use decode::decode_value;
pub use depth::MAX_DEPTH;
pub use encode::encode_value;

use bytes::{BufMut, BytesMut};

use crate::error::PackError;
use crate::types::Value;

/// Encodes a value to a self-delimiting payload, without an outer frame.
pub fn pack(value: &Value) -> Result<BytesMut, PackError> {
    let mut buf = BytesMut::new();
    encode::encode_value(&mut buf, value)?;
    Ok(buf)
}

/// Encodes a value and prepends the outer frame: one width byte, the payload
/// length in that many bytes, then the payload.
pub fn encode(value: &Value) -> Result<BytesMut, PackError> {
    let payload = pack(value)?;
    let len = payload.len() as i64;
    let w = encode::width(len);
    let mut framed = BytesMut::with_capacity(1 + w as usize + payload.len());
    framed.put_u8(w);
    encode::put_len(&mut framed, len, w);
    framed.extend_from_slice(&payload);
    Ok(framed)
}

/// Decodes exactly one value; trailing bytes are ignored.
pub fn unpack(msg: &[u8]) -> Result<Value, PackError> {
    let mut cursor = msg;
    decode::decode_value(&mut cursor)
}

/// Interprets a buffer of exactly 1, 2, 4 or 8 bytes as a signed
/// little-endian integer. Used to read the length field of an outer frame.
pub fn size(msg: &[u8]) -> Result<i64, PackError> {
    match msg.len() {
        1 => Ok(i64::from(msg[0] as i8)),
        2 => Ok(i64::from(i16::from_le_bytes(msg.try_into().unwrap()))),
        4 => Ok(i64::from(i32::from_le_bytes(msg.try_into().unwrap()))),
        8 => Ok(i64::from_le_bytes(msg.try_into().unwrap())),
        len => Err(PackError::BadWidth(len)),
    }
}
