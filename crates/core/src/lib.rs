//! Core types for graphstream
//!
//! This crate defines the foundational types shared by every layer:
//! - EntryType: Logical kind of an entry in the node stream
//! - Error: Error type hierarchy
//! - SerializationConfig: Codec options and the debug/error-handling policy
//! - DebugContext: Logging and escalation of recoverable errors
//! - TypeKey: Runtime type identity
//! - Decimal / Guid: Scalar kinds without a native Rust counterpart
//! - PrimitiveElement: Allow-list of element types for primitive arrays
//! - ObjectHandle: Identity-carrying handle to an object in a graph

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod debug;
pub mod decimal;
pub mod entry;
pub mod error;
pub mod object;
pub mod primitive;
pub mod type_key;

pub use config::{
    BinaryOptions, ErrorHandlingPolicy, JsonOptions, LoggingPolicy, SerializationConfig,
    DEFAULT_STAGING_BUFFER_SIZE, MIN_STAGING_BUFFER_SIZE,
};
pub use debug::{DebugContext, LoggerHandle, SerializationLogger, TracingLogger};
pub use decimal::{Decimal, DecimalParseError, MAX_SCALE};
pub use entry::EntryType;
pub use error::{Error, Result};
pub use object::{object_address, ObjectHandle};
pub use primitive::{
    format_float, parse_float, PrimitiveElement, PrimitiveKind, PrimitiveSlice, PrimitiveVecMut,
    SliceVisitor, VecVisitor,
};
pub use type_key::TypeKey;

/// 128-bit globally unique identifier used by GUID scalars and GUID references.
pub type Guid = uuid::Uuid;
