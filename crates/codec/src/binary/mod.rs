//! Binary codec
//!
//! ## Entry layout
//!
//! ```text
//! [tag: u8][name: string]?[payload]
//!
//! string       = [width: u8 (0 = 1 byte/char, 1 = UTF-16)][len: i32 code units][chars]
//! ref node     = [tag][name]?[type entry][id: i32]
//! struct node  = [tag][name]?[type entry]
//! type entry   = TypeName [id: i32][name: string] | TypeID [id: i32] | UnnamedNull
//! array        = StartOfArray [len: i64] ... EndOfArray
//! prim. array  = PrimitiveArray [len: i32][bytes per element: i32][payload]
//! ```
//!
//! All multi-byte values are little-endian.

mod entry;
mod reader;
mod writer;

pub use entry::BinaryEntryType;
pub use reader::BinaryDataReader;
pub use writer::BinaryDataWriter;

/// String width flag for one byte per char (every char <= U+00FF).
pub(crate) const STRING_WIDTH_LATIN1: u8 = 0;

/// String width flag for UTF-16 code units.
pub(crate) const STRING_WIDTH_UTF16: u8 = 1;
