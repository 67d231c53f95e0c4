//! Codec Tests
//!
//! Wire-level behavior of the binary and JSON codecs:
//! - Scalar round trips on every codec and the node format
//! - Skip safety of mismatched reads
//! - Primitive array fidelity and byte order
//! - Staging buffer size independence
//! - JSON output shape
//! - File-backed streams

#[path = "../common/mod.rs"]
mod common;

mod buffer_size;
mod file_stream;
mod json_format;
mod primitive_arrays;
mod scalar_roundtrip;
mod skip_safety;
