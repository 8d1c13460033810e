//! Error types for the pack codec.

/// Errors that can occur while packing, unpacking, or registering values.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// The decoder ran past the end of the input buffer.
    #[error("ran out of input")]
    Eof,

    /// The tag byte is 0x00 or an undefined tag/width combination.
    #[error("invalid type: 0x{0:02x}")]
    InvalidTag(u8),

    /// A length prefix decoded to a negative value.
    #[error("invalid length: {0}")]
    BadLength(i64),

    /// A size buffer or frame width was not 1, 2, 4, or 8 bytes.
    #[error("invalid buffer len: {0}")]
    BadWidth(usize),

    /// A string payload was not valid UTF-8.
    #[error("invalid UTF-8 string: {0}")]
    BadEncoding(#[from] std::string::FromUtf8Error),

    /// Container nesting exceeded the per-thread depth limit.
    #[error("maximum recursion depth exceeded while {0}")]
    Recursion(&'static str),

    /// A host integer does not fit in a signed or unsigned 64-bit value.
    #[error("int too big to convert")]
    Overflow,

    /// A class or singleton identity is not present in the registry.
    #[error("{0}")]
    NotRegistered(String),

    /// An identity is already registered with a different handle.
    #[error("already registered with a different handle: {0}")]
    Conflict(String),

    /// An instance descriptor has the wrong shape.
    #[error("bad reduction: {0}")]
    BadReduce(String),

    /// A reconstruction stage (state, extend, update) failed.
    #[error("{0}")]
    BadState(String),

    /// An I/O error occurred while reading or writing frames.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
