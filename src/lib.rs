//! ippack — a compact binary object-serialization codec for same-host IPC.
//!
//! The codec turns a rooted tree of dynamically typed [`Value`]s (integers,
//! floats, complex numbers, strings, byte buffers, sequences, maps, sets,
//! class references, singletons, and reconstructable instances) into a
//! self-delimiting byte stream and back.
//!
//! # Architecture
//!
//! - **`types`** — the `Value` sum type and reduction descriptors
//! - **`codec`** — wire grammar: `pack`, `encode`, `unpack`, `size`
//! - **`registry`** — process-wide identity → handle map
//! - **`frame`** — framed reads and writes over async byte streams
//!
//! Multi-byte scalars travel in the host's little-endian byte order; the
//! format targets cooperating processes on one host and does not
//! interoperate across hosts of different endianness.

pub mod codec;
pub mod error;
pub mod frame;
pub mod registry;
pub mod types;

pub use codec::{encode, pack, size, unpack, MAX_DEPTH};
pub use error::PackError;
pub use frame::{FrameReader, FrameWriter};
pub use registry::{ellipsis, not_implemented, register};
pub use types::{ClassDef, Complex, Handle, Reduction, SingletonDef, Value};
