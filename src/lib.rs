//! graphstream - Object-graph serialization over a shared node-stream protocol
//!
//! graphstream persists arbitrary object graphs, including shared and cyclic
//! references and references to objects living outside the graph, through
//! interchangeable wire formats: a compact binary encoding and packed or
//! readable JSON.
//!
//! # Quick Start
//!
//! ```ignore
//! use graphstream::{deserialize_value, serialize_value, DataFormat};
//!
//! // Serialize with pooled contexts and buffers
//! let bytes = serialize_value(&vec![1u32, 2, 3], DataFormat::Json)?;
//!
//! // Read it back
//! let back: Option<Vec<u32>> = deserialize_value(&bytes, DataFormat::Json)?;
//! ```
//!
//! # Architecture
//!
//! Values go through the [`Serializable`] value layer, which drives the
//! object-safe [`DataWriter`] / [`DataReader`] protocol. Codecs implement the
//! protocol; session contexts track types and references for one stream.
//!
//! ```text
//! serialize_value ─> Serializable ─> dyn DataWriter ─> binary / JSON / nodes
//!                         │
//!                Shared<T> / External<T> ─> SerializationContext
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod format;
pub mod registry;
pub mod serializable;
pub mod shared;
pub mod utility;

pub use format::DataFormat;
pub use registry::{
    is_serializer_registered, register_serializer, serializer_for, AnyValue, ErasedSerializer,
};
pub use serializable::{read_members, Serializable};
pub use shared::{shared, External, NodeObject, Shared};
pub use utility::{
    create_copy, deserialize_value, deserialize_value_from_nodes, deserialize_value_from_stream,
    deserialize_value_weak, deserialize_value_with_context, deserialize_value_with_reader,
    serialize_value, serialize_value_to_nodes, serialize_value_to_stream, serialize_value_weak,
    serialize_value_with_context, serialize_value_with_writer, MEMORY_BUFFERS,
};

pub use graphstream_codec::{
    hex_dump, BinaryDataReader, BinaryDataWriter, DataReader, DataReaderExt, DataWriter,
    DataWriterExt, JsonDataReader, JsonDataWriter, NodeHeader, SerializationNode,
    SerializationNodeDataReader, SerializationNodeDataWriter,
};
pub use graphstream_core::{
    BinaryOptions, Decimal, EntryType, Error, ErrorHandlingPolicy, Guid, JsonOptions,
    LoggingPolicy, ObjectHandle, PrimitiveElement, Result, SerializationConfig,
    SerializationLogger, TypeKey, DEFAULT_STAGING_BUFFER_SIZE, MIN_STAGING_BUFFER_SIZE,
};
pub use graphstream_session::{
    Cache, Cached, DefaultTypeBinder, DeserializationContext, ExternalGuidReferenceResolver,
    ExternalIndexReferenceResolver, ExternalStringReferenceResolver, IndexReferenceResolver,
    SerializationContext, TypeBinder, DESERIALIZATION_CONTEXTS, SERIALIZATION_CONTEXTS,
};
