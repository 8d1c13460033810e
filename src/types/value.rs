//! The dynamically typed value universe.

use std::fmt;
use std::sync::Arc;

use crate::error::PackError;

use super::reduce::{ClassDef, Reduction, SingletonDef};

/// A complex number: a pair of IEEE-754 doubles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

/// A value in the pack wire format.
///
/// Containers hold `Value` elements recursively. `Dict`, `Set` and
/// `FrozenSet` are backed by plain vectors (keys may be any value, including
/// unhashable kinds); their equality is unordered and their wire order
/// follows insertion order.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    /// Unsigned 64-bit integer; only used for magnitudes a signed 64-bit
    /// value cannot hold.
    UInt(u64),
    Float(f64),
    Complex(Complex),
    Str(String),
    Bytes(Vec<u8>),
    ByteArray(Vec<u8>),
    Tuple(Vec<Value>),
    List(Vec<Value>),
    /// Key-value pairs, insertion-ordered, keys unique.
    Dict(Vec<(Value, Value)>),
    Set(Vec<Value>),
    FrozenSet(Vec<Value>),
    /// A reference to a registered class.
    Class(Arc<ClassDef>),
    /// A reference to a registered singleton.
    Singleton(Arc<SingletonDef>),
    /// A constructor descriptor for a user-defined instance; unpacking
    /// rebuilds the instance it describes.
    Instance(Box<Reduction>),
}

impl Value {
    /// Short name of this value's kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Complex(_) => "complex",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::ByteArray(_) => "bytearray",
            Self::Tuple(_) => "tuple",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
            Self::Set(_) => "set",
            Self::FrozenSet(_) => "frozenset",
            Self::Class(_) => "class",
            Self::Singleton(_) => "singleton",
            Self::Instance(_) => "instance",
        }
    }

    /// Returns the value as a string reference, if it is a `Str` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an i64, if it is an `Int` variant.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }
}

/// Inserts a key-value pair, replacing the value of an existing equal key.
pub(crate) fn dict_insert(pairs: &mut Vec<(Value, Value)>, key: Value, value: Value) {
    if let Some(slot) = pairs.iter_mut().find(|(k, _)| *k == key) {
        slot.1 = value;
    } else {
        pairs.push((key, value));
    }
}

fn dict_eq(a: &[(Value, Value)], b: &[(Value, Value)]) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(k, v)| b.iter().any(|(bk, bv)| bk == k && bv == v))
}

fn set_eq(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().all(|item| b.contains(item))
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::UInt(a), Self::UInt(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Complex(a), Self::Complex(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::ByteArray(a), Self::ByteArray(b)) => a == b,
            (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Dict(a), Self::Dict(b)) => dict_eq(a, b),
            (Self::Set(a), Self::Set(b)) => set_eq(a, b),
            (Self::FrozenSet(a), Self::FrozenSet(b)) => set_eq(a, b),
            (Self::Class(a), Self::Class(b)) => {
                a.module() == b.module() && a.qualname() == b.qualname()
            }
            (Self::Singleton(a), Self::Singleton(b)) => a.name() == b.name(),
            (Self::Instance(a), Self::Instance(b)) => a == b,
            _ => false,
        }
    }
}

// -- Convenience conversions --

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u64> for Value {
    /// Signed when it fits; `UInt` is reserved for the upper half.
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => Self::Int(i),
            Err(_) => Self::UInt(u),
        }
    }
}

impl TryFrom<i128> for Value {
    type Error = PackError;

    fn try_from(value: i128) -> Result<Self, PackError> {
        if let Ok(i) = i64::try_from(value) {
            Ok(Self::Int(i))
        } else if let Ok(u) = u64::try_from(value) {
            Ok(Self::UInt(u))
        } else {
            Err(PackError::Overflow)
        }
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<Complex> for Value {
    fn from(c: Complex) -> Self {
        Self::Complex(c)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<Arc<ClassDef>> for Value {
    fn from(c: Arc<ClassDef>) -> Self {
        Self::Class(c)
    }
}

impl From<Arc<SingletonDef>> for Value {
    fn from(s: Arc<SingletonDef>) -> Self {
        Self::Singleton(s)
    }
}

impl From<Reduction> for Value {
    fn from(r: Reduction) -> Self {
        Self::Instance(Box::new(r))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::UInt(u) => write!(f, "{u}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Complex(c) => write!(f, "({}{:+}j)", c.re, c.im),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Bytes(b) | Self::ByteArray(b) => write!(f, "<{} bytes>", b.len()),
            Self::Tuple(items) => display_items(f, "(", items, ")"),
            Self::List(items) => display_items(f, "[", items, "]"),
            Self::Dict(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Self::Set(items) | Self::FrozenSet(items) => display_items(f, "{", items, "}"),
            Self::Class(c) => write!(f, "<class '{}.{}'>", c.module(), c.qualname()),
            Self::Singleton(s) => write!(f, "{}", s.name()),
            Self::Instance(r) => write!(f, "<instance of {}>", r.callable()),
        }
    }
}

fn display_items(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: &[Value],
    close: &str,
) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}
