//! Framed value transport: one `encode`d frame per message over an async
//! byte stream.

pub mod reader;
pub mod writer;

pub use reader::FrameReader;
pub use writer::FrameWriter;
