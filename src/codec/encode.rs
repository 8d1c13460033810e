//! Pack encoding: `Value` → bytes.
//!
//! Multi-byte scalars are written in the host's little-endian byte order;
//! the format does not interoperate across hosts of different endianness.

use bytes::{BufMut, BytesMut};

use crate::error::PackError;
use crate::types::{ClassDef, Handle, Reduction, SingletonDef, Value};

use super::depth::DepthGuard;
use super::tag;

const INT1_MAX: i64 = 1 << 7;
const INT1_MIN: i64 = -INT1_MAX;
const INT2_MAX: i64 = 1 << 15;
const INT2_MIN: i64 = -INT2_MAX;
const INT4_MAX: i64 = 1 << 31;
const INT4_MIN: i64 = -INT4_MAX;

/// Encodes a `Value` into the buffer.
pub fn encode_value(buf: &mut BytesMut, value: &Value) -> Result<(), PackError> {
    match value {
        Value::Null => {
            buf.put_u8(tag::NULL);
            Ok(())
        }
        Value::Bool(b) => {
            buf.put_u8(if *b { tag::TRUE } else { tag::FALSE });
            Ok(())
        }
        Value::Int(i) => {
            encode_int(buf, *i);
            Ok(())
        }
        Value::UInt(u) => {
            encode_uint(buf, *u);
            Ok(())
        }
        Value::Float(f) => {
            encode_float(buf, *f);
            Ok(())
        }
        Value::Complex(c) => {
            buf.put_u8(tag::COMPLEX);
            buf.put_u64_le(c.re.to_bits());
            buf.put_u64_le(c.im.to_bits());
            Ok(())
        }
        Value::Str(s) => {
            encode_str(buf, s);
            Ok(())
        }
        Value::Bytes(b) => {
            encode_data(buf, tag::BYTES, b);
            Ok(())
        }
        Value::ByteArray(b) => {
            encode_data(buf, tag::BYTEARRAY, b);
            Ok(())
        }
        Value::Tuple(items) => encode_seq(buf, tag::TUPLE, items, "packing a tuple"),
        Value::List(items) => encode_seq(buf, tag::LIST, items, "packing a list"),
        Value::Dict(pairs) => encode_dict(buf, pairs),
        Value::Set(items) => encode_seq(buf, tag::SET, items, "packing a set"),
        Value::FrozenSet(items) => encode_seq(buf, tag::FROZENSET, items, "packing a frozenset"),
        Value::Class(class) => {
            encode_class(buf, class);
            Ok(())
        }
        Value::Singleton(singleton) => {
            encode_singleton(buf, singleton);
            Ok(())
        }
        Value::Instance(reduction) => encode_instance(buf, reduction),
    }
}

/// Smallest width code holding a length or signed value bound: 1, 2, 4 or 8.
pub(crate) fn width(len: i64) -> u8 {
    if len < INT2_MAX {
        if len < INT1_MAX {
            1
        } else {
            2
        }
    } else if len < INT4_MAX {
        4
    } else {
        8
    }
}

/// Writes a length in exactly `w` little-endian bytes, as a signed integer.
pub(crate) fn put_len(buf: &mut BytesMut, len: i64, w: u8) {
    match w {
        1 => buf.put_i8(len as i8),
        2 => buf.put_i16_le(len as i16),
        4 => buf.put_i32_le(len as i32),
        _ => buf.put_i64_le(len),
    }
}

fn encode_len(buf: &mut BytesMut, kind: u8, len: i64) {
    let w = width(len);
    buf.put_u8(kind | w);
    put_len(buf, len, w);
}

fn encode_data(buf: &mut BytesMut, kind: u8, data: &[u8]) {
    encode_len(buf, kind, data.len() as i64);
    buf.put_slice(data);
}

/// Encodes an integer in the narrowest signed width that holds it.
pub fn encode_int(buf: &mut BytesMut, value: i64) {
    if value < 0 {
        if value < INT2_MIN {
            if value < INT4_MIN {
                buf.put_u8(tag::INT8);
                buf.put_i64_le(value);
            } else {
                buf.put_u8(tag::INT4);
                buf.put_i32_le(value as i32);
            }
        } else if value < INT1_MIN {
            buf.put_u8(tag::INT2);
            buf.put_i16_le(value as i16);
        } else {
            buf.put_u8(tag::INT1);
            buf.put_i8(value as i8);
        }
    } else if value < INT2_MAX {
        if value < INT1_MAX {
            buf.put_u8(tag::INT1);
            buf.put_i8(value as i8);
        } else {
            buf.put_u8(tag::INT2);
            buf.put_i16_le(value as i16);
        }
    } else if value < INT4_MAX {
        buf.put_u8(tag::INT4);
        buf.put_i32_le(value as i32);
    } else {
        buf.put_u8(tag::INT8);
        buf.put_i64_le(value);
    }
}

/// Encodes an unsigned integer; the width is fixed at 8 bytes.
pub fn encode_uint(buf: &mut BytesMut, value: u64) {
    buf.put_u8(tag::UINT);
    buf.put_u64_le(value);
}

/// Encodes a double as its 64-bit pattern.
pub fn encode_float(buf: &mut BytesMut, value: f64) {
    buf.put_u8(tag::FLOAT);
    buf.put_u64_le(value.to_bits());
}

/// Encodes a string (size = UTF-8 byte length, not char count).
pub fn encode_str(buf: &mut BytesMut, value: &str) {
    encode_data(buf, tag::STR, value.as_bytes());
}

fn encode_seq(
    buf: &mut BytesMut,
    kind: u8,
    items: &[Value],
    what: &'static str,
) -> Result<(), PackError> {
    let _guard = DepthGuard::enter(what)?;
    encode_len(buf, kind, items.len() as i64);
    for item in items {
        encode_value(buf, item)?;
    }
    Ok(())
}

fn encode_dict(buf: &mut BytesMut, pairs: &[(Value, Value)]) -> Result<(), PackError> {
    let _guard = DepthGuard::enter("packing a dict")?;
    encode_len(buf, tag::DICT, pairs.len() as i64);
    for (key, value) in pairs {
        encode_value(buf, key)?;
        encode_value(buf, value)?;
    }
    Ok(())
}

/// Identity bytes of a class: its module and qualname, each packed as a
/// string. These bytes are the registry key.
pub(crate) fn class_identity(class: &ClassDef) -> BytesMut {
    let mut id = BytesMut::new();
    encode_str(&mut id, class.module());
    encode_str(&mut id, class.qualname());
    id
}

/// Identity bytes of a singleton: its canonical name packed as a string.
pub(crate) fn singleton_identity(singleton: &SingletonDef) -> BytesMut {
    let mut id = BytesMut::new();
    encode_str(&mut id, singleton.name());
    id
}

pub(crate) fn identity_bytes(handle: &Handle) -> BytesMut {
    match handle {
        Handle::Class(c) => class_identity(c),
        Handle::Singleton(s) => singleton_identity(s),
    }
}

fn encode_class(buf: &mut BytesMut, class: &ClassDef) {
    let id = class_identity(class);
    encode_data(buf, tag::CLASS, &id);
}

fn encode_singleton(buf: &mut BytesMut, singleton: &SingletonDef) {
    let id = singleton_identity(singleton);
    encode_data(buf, tag::SINGLETON, &id);
}

fn encode_instance(buf: &mut BytesMut, reduction: &Reduction) -> Result<(), PackError> {
    let mut data = BytesMut::new();
    encode_reduction(&mut data, reduction)?;
    encode_data(buf, tag::INSTANCE, &data);
    Ok(())
}

/// Encodes the descriptor tuple: callable, args, then the trailing slots up
/// to the last present one, absent middles travelling as null.
fn encode_reduction(buf: &mut BytesMut, reduction: &Reduction) -> Result<(), PackError> {
    let _guard = DepthGuard::enter("packing an instance")?;
    let arity = reduction.arity();
    encode_len(buf, tag::TUPLE, arity as i64);
    encode_value(buf, reduction.callable())?;
    encode_seq(buf, tag::TUPLE, reduction.args(), "packing a tuple")?;
    let slots = [
        reduction.state(),
        reduction.extend_arg(),
        reduction.update_arg(),
    ];
    for slot in slots.into_iter().take(arity - 2) {
        match slot {
            Some(value) => encode_value(buf, value)?,
            None => buf.put_u8(tag::NULL),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn packed(value: &Value) -> BytesMut {
        let mut buf = BytesMut::new();
        encode_value(&mut buf, value).expect("encode failed");
        buf
    }

    #[test]
    fn encode_null_and_bools() {
        assert_eq!(&packed(&Value::Null)[..], &[0x21]);
        assert_eq!(&packed(&Value::Bool(true))[..], &[0x22]);
        assert_eq!(&packed(&Value::Bool(false))[..], &[0x23]);
    }

    #[test]
    fn encode_int_width_boundaries() {
        assert_eq!(&packed(&Value::Int(0))[..], &[0x01, 0x00]);
        assert_eq!(&packed(&Value::Int(127))[..], &[0x01, 0x7F]);
        assert_eq!(&packed(&Value::Int(128))[..], &[0x02, 0x80, 0x00]);
        assert_eq!(&packed(&Value::Int(-1))[..], &[0x01, 0xFF]);
        assert_eq!(&packed(&Value::Int(-128))[..], &[0x01, 0x80]);
        assert_eq!(&packed(&Value::Int(-129))[..], &[0x02, 0x7F, 0xFF]);
        assert_eq!(&packed(&Value::Int(32767))[..], &[0x02, 0xFF, 0x7F]);
        assert_eq!(
            &packed(&Value::Int(32768))[..],
            &[0x04, 0x00, 0x80, 0x00, 0x00]
        );
        assert_eq!(&packed(&Value::Int(-32768))[..], &[0x02, 0x00, 0x80]);
        assert_eq!(
            &packed(&Value::Int(-32769))[..],
            &[0x04, 0xFF, 0x7F, 0xFF, 0xFF]
        );

        let above = i64::from(i32::MAX) + 1;
        assert_eq!(packed(&Value::Int(above))[0], 0x08);
        assert_eq!(&packed(&Value::Int(above))[1..], &above.to_le_bytes());
        let below = i64::from(i32::MIN) - 1;
        assert_eq!(packed(&Value::Int(below))[0], 0x08);
        assert_eq!(packed(&Value::Int(i64::from(i32::MIN)))[0], 0x04);
        assert_eq!(packed(&Value::Int(i64::from(i32::MAX)))[0], 0x04);
    }

    #[test]
    fn encode_uint_fixed_width() {
        let buf = packed(&Value::UInt(u64::MAX));
        assert_eq!(buf[0], 0x11);
        assert_eq!(&buf[1..], &u64::MAX.to_le_bytes());
    }

    #[test]
    fn encode_float_bit_pattern() {
        let buf = packed(&Value::Float(1.5));
        assert_eq!(buf[0], 0x12);
        assert_eq!(&buf[1..], &1.5f64.to_bits().to_le_bytes());
    }

    #[test]
    fn encode_complex_two_doubles() {
        let buf = packed(&Value::Complex(crate::types::Complex::new(1.0, -2.0)));
        assert_eq!(buf[0], 0x13);
        assert_eq!(&buf[1..9], &1.0f64.to_bits().to_le_bytes());
        assert_eq!(&buf[9..], &(-2.0f64).to_bits().to_le_bytes());
    }

    #[test]
    fn encode_short_string() {
        assert_eq!(&packed(&Value::Str("hi".into()))[..], &[0x31, 0x02, b'h', b'i']);
        assert_eq!(&packed(&Value::Str(String::new()))[..], &[0x31, 0x00]);
    }

    #[test]
    fn encode_string_two_byte_length() {
        let s = "a".repeat(128);
        let buf = packed(&Value::Str(s));
        assert_eq!(&buf[..3], &[0x32, 0x80, 0x00]);
        assert_eq!(buf.len(), 3 + 128);
    }

    #[test]
    fn encode_bytes_and_bytearray() {
        assert_eq!(
            &packed(&Value::Bytes(vec![0xDE, 0xAD]))[..],
            &[0x41, 0x02, 0xDE, 0xAD]
        );
        assert_eq!(
            &packed(&Value::ByteArray(vec![0xBE, 0xEF]))[..],
            &[0x51, 0x02, 0xBE, 0xEF]
        );
    }

    #[test]
    fn encode_tuple_of_ints() {
        let value = Value::Tuple(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(&packed(&value)[..], &[0x61, 0x02, 0x01, 0x01, 0x01, 0x02]);
    }

    #[test]
    fn encode_empty_containers() {
        assert_eq!(&packed(&Value::Tuple(vec![]))[..], &[0x61, 0x00]);
        assert_eq!(&packed(&Value::List(vec![]))[..], &[0x71, 0x00]);
        assert_eq!(&packed(&Value::Dict(vec![]))[..], &[0x81, 0x00]);
        assert_eq!(&packed(&Value::Set(vec![]))[..], &[0x91, 0x00]);
        assert_eq!(&packed(&Value::FrozenSet(vec![]))[..], &[0xA1, 0x00]);
    }

    #[test]
    fn encode_class_wraps_identity() {
        let class = Arc::new(ClassDef::new("m", "Q", |_| Ok(Value::Null)));
        let buf = packed(&Value::Class(class));
        // CLASS|1, inner length, then pack_str("m") pack_str("Q").
        assert_eq!(
            &buf[..],
            &[0xD1, 0x06, 0x31, 0x01, b'm', 0x31, 0x01, b'Q']
        );
    }

    #[test]
    fn encode_singleton_wraps_name() {
        let s = Arc::new(SingletonDef::new("Mark"));
        let buf = packed(&Value::Singleton(s));
        assert_eq!(&buf[..], &[0xE1, 0x06, 0x31, 0x04, b'M', b'a', b'r', b'k']);
    }

    #[test]
    fn encode_instance_descriptor_arity() {
        let class = Arc::new(ClassDef::new("m", "Q", |_| Ok(Value::Null)));

        let bare = Reduction::new(Arc::clone(&class), vec![Value::Int(1)]);
        let buf = packed(&Value::Instance(Box::new(bare)));
        assert_eq!(buf[0], 0xF1);
        // Inner descriptor is a two-field tuple.
        assert_eq!(buf[2], 0x61);
        assert_eq!(buf[3], 0x02);

        // An update slot alone forces nulls into the two slots before it.
        let with_update =
            Reduction::new(Arc::clone(&class), vec![]).with_update(Value::Int(7));
        let buf = packed(&Value::Instance(Box::new(with_update)));
        assert_eq!(buf[3], 0x05);
        let tail = &buf[buf.len() - 4..];
        assert_eq!(tail, &[0x21, 0x21, 0x01, 0x07]);
    }
}
