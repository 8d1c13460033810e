//! Pack decoding: bytes → `Value`.

use bytes::Buf;

use crate::error::PackError;
use crate::registry;
use crate::types::value::dict_insert;
use crate::types::Value;

use super::depth::DepthGuard;
use super::reconstruct;
use super::tag;

/// Decodes a single `Value` from the buffer.
pub fn decode_value(buf: &mut impl Buf) -> Result<Value, PackError> {
    if !buf.has_remaining() {
        return Err(PackError::Eof);
    }

    let t = buf.get_u8();
    match t {
        tag::INVALID => Err(PackError::InvalidTag(t)),

        tag::INT1 => {
            ensure_remaining(buf, 1)?;
            Ok(Value::Int(i64::from(buf.get_i8())))
        }
        tag::INT2 => {
            ensure_remaining(buf, 2)?;
            Ok(Value::Int(i64::from(buf.get_i16_le())))
        }
        tag::INT4 => {
            ensure_remaining(buf, 4)?;
            Ok(Value::Int(i64::from(buf.get_i32_le())))
        }
        tag::INT8 => {
            ensure_remaining(buf, 8)?;
            Ok(Value::Int(buf.get_i64_le()))
        }

        tag::UINT => {
            ensure_remaining(buf, 8)?;
            Ok(Value::UInt(buf.get_u64_le()))
        }
        tag::FLOAT => {
            ensure_remaining(buf, 8)?;
            Ok(Value::Float(f64::from_bits(buf.get_u64_le())))
        }
        tag::COMPLEX => {
            ensure_remaining(buf, 16)?;
            let re = f64::from_bits(buf.get_u64_le());
            let im = f64::from_bits(buf.get_u64_le());
            Ok(Value::Complex(crate::types::Complex::new(re, im)))
        }

        tag::NULL => Ok(Value::Null),
        tag::TRUE => Ok(Value::Bool(true)),
        tag::FALSE => Ok(Value::Bool(false)),

        // Sized kinds: the whole tag is validated before the length is read.
        _ => {
            let len = decode_len(buf, t)?;
            match t & 0xF0 {
                tag::STR => decode_str(buf, len),
                tag::BYTES => Ok(Value::Bytes(take(buf, len)?)),
                tag::BYTEARRAY => Ok(Value::ByteArray(take(buf, len)?)),
                tag::TUPLE => Ok(Value::Tuple(decode_seq(buf, len, "unpacking a tuple")?)),
                tag::LIST => Ok(Value::List(decode_seq(buf, len, "unpacking a list")?)),
                tag::DICT => decode_dict(buf, len),
                tag::SET => Ok(Value::Set(decode_anyset(buf, len, "unpacking a set")?)),
                tag::FROZENSET => Ok(Value::FrozenSet(decode_anyset(
                    buf,
                    len,
                    "unpacking a frozenset",
                )?)),
                tag::CLASS => decode_class(buf, len),
                tag::SINGLETON => decode_singleton(buf, len),
                tag::INSTANCE => decode_instance(buf, len),
                _ => Err(PackError::InvalidTag(t)),
            }
        }
    }
}

fn ensure_remaining(buf: &impl Buf, needed: usize) -> Result<(), PackError> {
    if buf.remaining() < needed {
        Err(PackError::Eof)
    } else {
        Ok(())
    }
}

const SIZED_KINDS: [u8; 11] = [
    tag::STR,
    tag::BYTES,
    tag::BYTEARRAY,
    tag::TUPLE,
    tag::LIST,
    tag::DICT,
    tag::SET,
    tag::FROZENSET,
    tag::CLASS,
    tag::SINGLETON,
    tag::INSTANCE,
];

/// Reads a length prefix whose width is the tag's low nibble.
fn decode_len(buf: &mut impl Buf, t: u8) -> Result<i64, PackError> {
    if !SIZED_KINDS.contains(&(t & 0xF0)) {
        return Err(PackError::InvalidTag(t));
    }
    let len = match t & 0x0F {
        1 => {
            ensure_remaining(buf, 1)?;
            i64::from(buf.get_i8())
        }
        2 => {
            ensure_remaining(buf, 2)?;
            i64::from(buf.get_i16_le())
        }
        4 => {
            ensure_remaining(buf, 4)?;
            i64::from(buf.get_i32_le())
        }
        8 => {
            ensure_remaining(buf, 8)?;
            buf.get_i64_le()
        }
        _ => return Err(PackError::InvalidTag(t)),
    };
    if len < 0 {
        return Err(PackError::BadLength(len));
    }
    Ok(len)
}

fn take(buf: &mut impl Buf, len: i64) -> Result<Vec<u8>, PackError> {
    let len = len as usize;
    ensure_remaining(buf, len)?;
    let mut data = vec![0u8; len];
    buf.copy_to_slice(&mut data);
    Ok(data)
}

fn decode_str(buf: &mut impl Buf, len: i64) -> Result<Value, PackError> {
    let data = take(buf, len)?;
    Ok(Value::Str(String::from_utf8(data)?))
}

/// Element count bounded by the remaining input; every element takes at
/// least one byte, so anything larger cannot decode.
fn element_count(buf: &impl Buf, len: i64) -> Result<usize, PackError> {
    let len = len as usize;
    if len > buf.remaining() {
        return Err(PackError::Eof);
    }
    Ok(len)
}

fn decode_seq(
    buf: &mut impl Buf,
    len: i64,
    what: &'static str,
) -> Result<Vec<Value>, PackError> {
    let _guard = DepthGuard::enter(what)?;
    let len = element_count(buf, len)?;
    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
        items.push(decode_value(buf)?);
    }
    Ok(items)
}

fn decode_dict(buf: &mut impl Buf, len: i64) -> Result<Value, PackError> {
    let _guard = DepthGuard::enter("unpacking a dict")?;
    let len = element_count(buf, len)?;
    let mut pairs = Vec::with_capacity(len);
    for _ in 0..len {
        let key = decode_value(buf)?;
        let value = decode_value(buf)?;
        dict_insert(&mut pairs, key, value);
    }
    Ok(Value::Dict(pairs))
}

fn decode_anyset(
    buf: &mut impl Buf,
    len: i64,
    what: &'static str,
) -> Result<Vec<Value>, PackError> {
    let _guard = DepthGuard::enter(what)?;
    let len = element_count(buf, len)?;
    let mut items: Vec<Value> = Vec::with_capacity(len);
    for _ in 0..len {
        let item = decode_value(buf)?;
        if !items.contains(&item) {
            items.push(item);
        }
    }
    Ok(items)
}

fn decode_class(buf: &mut impl Buf, len: i64) -> Result<Value, PackError> {
    let id = take(buf, len)?;
    match registry::lookup(&id) {
        Some(handle) => Ok(handle.into_value()),
        None => Err(class_miss(&id)),
    }
}

/// Best-effort decode of the inner (module, qualname) pair for the
/// diagnostic; a malformed identity surfaces its own decode error.
fn class_miss(id: &[u8]) -> PackError {
    let mut cursor = id;
    match (decode_value(&mut cursor), decode_value(&mut cursor)) {
        (Ok(Value::Str(module)), Ok(Value::Str(qualname))) => {
            if module == "builtins" {
                PackError::NotRegistered(format!("cannot unpack <class '{qualname}'>"))
            } else {
                PackError::NotRegistered(format!("cannot unpack <class '{module}.{qualname}'>"))
            }
        }
        (Err(e), _) | (_, Err(e)) => e,
        _ => PackError::NotRegistered("cannot unpack malformed class identity".into()),
    }
}

fn decode_singleton(buf: &mut impl Buf, len: i64) -> Result<Value, PackError> {
    let id = take(buf, len)?;
    match registry::lookup(&id) {
        Some(handle) => Ok(handle.into_value()),
        None => Err(singleton_miss(&id)),
    }
}

fn singleton_miss(id: &[u8]) -> PackError {
    let mut cursor = id;
    match decode_value(&mut cursor) {
        Ok(Value::Str(name)) => PackError::NotRegistered(format!("cannot unpack '{name}'")),
        Err(e) => e,
        Ok(_) => PackError::NotRegistered("cannot unpack malformed singleton identity".into()),
    }
}

fn decode_instance(buf: &mut impl Buf, len: i64) -> Result<Value, PackError> {
    let data = take(buf, len)?;
    let mut cursor: &[u8] = &data;
    let descriptor = decode_value(&mut cursor)?;
    reconstruct::reconstruct(descriptor)
}
