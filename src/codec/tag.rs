//! Wire tag byte constants.
//!
//! The high nibble identifies the kind. For sized kinds the low nibble
//! carries the width code of the length prefix (1, 2, 4, or 8 bytes); for
//! integers it carries the payload width directly.

// Never appears in a well-formed stream.
pub const INVALID: u8 = 0x00;

// Signed integer, payload width in the low nibble.
pub const INT1: u8 = 0x01;
pub const INT2: u8 = 0x02;
pub const INT4: u8 = 0x04;
pub const INT8: u8 = 0x08;

// Fixed-width scalars.
pub const UINT: u8 = 0x11;
pub const FLOAT: u8 = 0x12;
pub const COMPLEX: u8 = 0x13;

// Payload-free singletons.
pub const NULL: u8 = 0x21;
pub const TRUE: u8 = 0x22;
pub const FALSE: u8 = 0x23;

// Sized kinds: tag is (kind | width code).
pub const STR: u8 = 0x30;
pub const BYTES: u8 = 0x40;
pub const BYTEARRAY: u8 = 0x50;
pub const TUPLE: u8 = 0x60;
pub const LIST: u8 = 0x70;
pub const DICT: u8 = 0x80;
pub const SET: u8 = 0x90;
pub const FROZENSET: u8 = 0xA0;
pub const CLASS: u8 = 0xD0;
pub const SINGLETON: u8 = 0xE0;
pub const INSTANCE: u8 = 0xF0;
