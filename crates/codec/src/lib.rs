//! Codecs for the graphstream node-stream protocol
//!
//! This crate defines the protocol every codec speaks and its implementations:
//! - DataWriter / DataReader: Object-safe node-stream protocol
//! - NodeStack: Begin/End bookkeeping shared by all codecs
//! - BinaryDataWriter / BinaryDataReader: Compact little-endian binary format
//! - JsonDataWriter / JsonDataReader: Packed or readable JSON text
//! - SerializationNodeDataWriter / SerializationNodeDataReader: In-memory node list
//!
//! # Architecture
//!
//! ```text
//! value layer ──> DataWriter ──> StagingWriter ──> io::Write
//! value layer <── DataReader <── StagingReader <── io::Read
//! ```
//!
//! Writers and readers borrow a session context for the duration of a
//! stream; the staging buffers they use are claimed from a global pool.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binary;
pub mod dump;
pub mod endian;
pub mod json;
pub mod node_stack;
pub mod nodes;
pub mod protocol;
pub mod staging;
mod text;

pub use binary::{BinaryDataReader, BinaryDataWriter, BinaryEntryType};
pub use dump::hex_dump;
pub use endian::HostEndian;
pub use json::{JsonDataReader, JsonDataWriter, JsonTextReader, JsonToken};
pub use node_stack::{NodeInfo, NodeStack};
pub use nodes::{SerializationNode, SerializationNodeDataReader, SerializationNodeDataWriter};
pub use protocol::{DataReader, DataReaderExt, DataWriter, DataWriterExt, NodeHeader};
pub use staging::{StagingBuffer, StagingReader, StagingWriter, STAGING_BUFFERS};
