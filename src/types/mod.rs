//! Value types for the pack codec.

pub mod reduce;
pub mod value;

pub use reduce::{ClassDef, Handle, Reduction, SingletonDef};
pub use value::{Complex, Value};
