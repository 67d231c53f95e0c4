//! Top-level entry points
//!
//! The functions here pick a codec for a [`DataFormat`], claim the pooled
//! resources a session needs and drive the value layer through it.
//!
//! # Usage
//!
//! ```ignore
//! use graphstream::{deserialize_value, serialize_value, DataFormat};
//!
//! let bytes = serialize_value(&vec![1.5f32, 2.5], DataFormat::Binary)?;
//! let back: Option<Vec<f32>> = deserialize_value(&bytes, DataFormat::Binary)?;
//! ```
//!
//! ## Pooling
//!
//! Contexts come from [`SERIALIZATION_CONTEXTS`] / [`DESERIALIZATION_CONTEXTS`],
//! memory streams from [`MEMORY_BUFFERS`], staging buffers from the codec's
//! own pool. Every claim is a [`Cached`](graphstream_session::Cached) guard,
//! so resources go back on every exit path, errors included.
//!
//! ## Formats
//!
//! Binary and JSON go through bytes or streams. [`DataFormat::Nodes`] has no
//! byte form: the byte and stream entry points return
//! [`Error::UnsupportedFormat`] for it, and
//! [`serialize_value_to_nodes`] / [`deserialize_value_from_nodes`] are used
//! instead.

use crate::format::DataFormat;
use crate::registry::{serializer_for, AnyValue};
use crate::serializable::{read_members, Serializable};
use graphstream_codec::{
    BinaryDataReader, BinaryDataWriter, DataReader, DataWriter, JsonDataReader, JsonDataWriter,
    SerializationNode, SerializationNodeDataReader, SerializationNodeDataWriter,
};
use graphstream_core::{Error, Result, TypeKey};
use graphstream_session::{
    Cache, DeserializationContext, SerializationContext, DESERIALIZATION_CONTEXTS,
    SERIALIZATION_CONTEXTS,
};
use once_cell::sync::Lazy;
use std::any::Any;
use std::io::{Read, Write};
use tracing::debug;

/// Pool of memory streams used by the byte entry points.
pub static MEMORY_BUFFERS: Lazy<Cache<Vec<u8>>> = Lazy::new(Cache::new);

/// Member name of the value inside the envelope written by
/// [`serialize_value_weak`].
const WEAK_VALUE_MEMBER: &str = "value";

fn unsupported(format: DataFormat) -> Error {
    Error::UnsupportedFormat(format!(
        "{} streams are only available through the node list entry points",
        format
    ))
}

fn write_stream<W, F>(
    stream: W,
    format: DataFormat,
    context: &mut SerializationContext,
    body: F,
) -> Result<W>
where
    W: Write,
    F: FnOnce(&mut dyn DataWriter) -> Result<()>,
{
    match format {
        DataFormat::Binary => {
            let mut writer = BinaryDataWriter::new(stream, context)?;
            body(&mut writer)?;
            writer.into_inner()
        }
        DataFormat::Json => {
            let mut writer = JsonDataWriter::new(stream, context)?;
            body(&mut writer)?;
            writer.into_inner()
        }
        DataFormat::Nodes => Err(unsupported(format)),
    }
}

fn read_stream<R, T, F>(
    stream: R,
    format: DataFormat,
    context: &mut DeserializationContext,
    body: F,
) -> Result<T>
where
    R: Read,
    F: FnOnce(&mut dyn DataReader) -> Result<T>,
{
    match format {
        DataFormat::Binary => {
            let mut reader = BinaryDataReader::new(stream, context)?;
            body(&mut reader)
        }
        DataFormat::Json => {
            let mut reader = JsonDataReader::new(stream, context)?;
            body(&mut reader)
        }
        DataFormat::Nodes => Err(unsupported(format)),
    }
}

/// Serialize `value` to bytes with a pooled context.
pub fn serialize_value<T: Serializable>(value: &T, format: DataFormat) -> Result<Vec<u8>> {
    let mut context = SERIALIZATION_CONTEXTS.claim();
    serialize_value_with_context(value, format, &mut context)
}

/// Serialize `value` to bytes with a caller-provided context (config,
/// binder and external resolvers).
pub fn serialize_value_with_context<T: Serializable>(
    value: &T,
    format: DataFormat,
    context: &mut SerializationContext,
) -> Result<Vec<u8>> {
    let mut buffer = MEMORY_BUFFERS.claim();
    write_stream(&mut *buffer, format, context, |writer| {
        serialize_value_with_writer(value, writer)
    })?;
    debug!(target: "graphstream", %format, bytes = buffer.len(), "Serialized value");
    Ok(buffer.to_vec())
}

/// Serialize `value` into `stream` with a pooled context.
pub fn serialize_value_to_stream<T: Serializable, W: Write>(
    value: &T,
    stream: W,
    format: DataFormat,
) -> Result<()> {
    let mut context = SERIALIZATION_CONTEXTS.claim();
    write_stream(stream, format, &mut context, |writer| {
        serialize_value_with_writer(value, writer)
    })?;
    Ok(())
}

/// Serialize `value` through an existing writer as a new session.
pub fn serialize_value_with_writer<T: Serializable>(
    value: &T,
    writer: &mut dyn DataWriter,
) -> Result<()> {
    writer.prepare_new_serialization_session()?;
    value.write_value(None, writer)?;
    writer.flush()
}

/// Serialize a value whose type is only known at runtime.
///
/// The value is wrapped in a struct node carrying its type, so
/// [`deserialize_value_weak`] can find the serializer again.
///
/// # Errors
///
/// [`Error::NoSerializer`] if no serializer is registered for the runtime
/// type of `value`.
pub fn serialize_value_weak(value: &AnyValue, format: DataFormat) -> Result<Vec<u8>> {
    let type_id = Any::type_id(value);
    let serializer = serializer_for(type_id)
        .ok_or_else(|| Error::NoSerializer(format!("{:?}", type_id)))?;
    let ty = serializer.type_key();

    let mut context = SERIALIZATION_CONTEXTS.claim();
    let mut buffer = MEMORY_BUFFERS.claim();
    write_stream(&mut *buffer, format, &mut context, |writer| {
        writer.prepare_new_serialization_session()?;
        writer.begin_struct_node(None, Some(&ty))?;
        serializer.write_erased(value, Some(WEAK_VALUE_MEMBER), writer)?;
        writer.end_node(None)?;
        writer.flush()
    })?;
    debug!(target: "graphstream", %format, ty = ty.name(), bytes = buffer.len(), "Serialized value by runtime type");
    Ok(buffer.to_vec())
}

/// Deserialize a value of type `T` with a pooled context.
pub fn deserialize_value<T: Serializable>(bytes: &[u8], format: DataFormat) -> Result<Option<T>> {
    let mut context = DESERIALIZATION_CONTEXTS.claim();
    deserialize_value_with_context(bytes, format, &mut context)
}

/// Deserialize a value of type `T` with a caller-provided context.
pub fn deserialize_value_with_context<T: Serializable>(
    bytes: &[u8],
    format: DataFormat,
    context: &mut DeserializationContext,
) -> Result<Option<T>> {
    let value = read_stream(bytes, format, context, deserialize_value_with_reader::<T>)?;
    debug!(target: "graphstream", %format, bytes = bytes.len(), found = value.is_some(), "Deserialized value");
    Ok(value)
}

/// Deserialize a value of type `T` from `stream` with a pooled context.
pub fn deserialize_value_from_stream<T: Serializable, R: Read>(
    stream: R,
    format: DataFormat,
) -> Result<Option<T>> {
    let mut context = DESERIALIZATION_CONTEXTS.claim();
    read_stream(stream, format, &mut context, deserialize_value_with_reader::<T>)
}

/// Deserialize a value of type `T` through an existing reader as a new
/// session.
pub fn deserialize_value_with_reader<T: Serializable>(
    reader: &mut dyn DataReader,
) -> Result<Option<T>> {
    reader.prepare_new_serialization_session()?;
    T::read_value(reader)
}

/// Deserialize a value written by [`serialize_value_weak`].
///
/// Returns `Ok(None)` when the recorded type name cannot be bound to a
/// type; the value is skipped.
///
/// # Errors
///
/// [`Error::NoSerializer`] if the recorded type is bound but has no
/// registered serializer.
pub fn deserialize_value_weak(bytes: &[u8], format: DataFormat) -> Result<Option<Box<AnyValue>>> {
    let mut context = DESERIALIZATION_CONTEXTS.claim();
    read_stream(bytes, format, &mut context, |reader| {
        reader.prepare_new_serialization_session()?;
        let Some(header) = reader.enter_node()? else {
            return Ok(None);
        };
        let Some(ty) = header.ty else {
            reader.exit_node()?;
            return Ok(None);
        };
        let serializer = serializer_for(ty.type_id())
            .ok_or_else(|| Error::NoSerializer(ty.name().to_string()))?;
        let mut value = None;
        read_members(reader, |name, reader| {
            if name != WEAK_VALUE_MEMBER {
                return Ok(false);
            }
            value = serializer.read_erased(reader)?;
            Ok(true)
        })?;
        reader.exit_node()?;
        Ok(value)
    })
}

/// Serialize `value` into the in-memory node format.
pub fn serialize_value_to_nodes<T: Serializable>(
    value: &T,
    context: &mut SerializationContext,
) -> Result<Vec<SerializationNode>> {
    let mut writer = SerializationNodeDataWriter::new(context);
    serialize_value_with_writer(value, &mut writer)?;
    Ok(writer.into_nodes())
}

/// Deserialize a value of type `T` from the in-memory node format.
pub fn deserialize_value_from_nodes<T: Serializable>(
    nodes: &[SerializationNode],
    context: &mut DeserializationContext,
) -> Result<Option<T>> {
    let mut reader = SerializationNodeDataReader::new(nodes, context);
    deserialize_value_with_reader(&mut reader)
}

/// Deep copy `value` through a binary round trip.
///
/// Shared objects inside `value` are copied too, with the same sharing and
/// cycles as the original; external objects keep pointing at the same
/// instances only if the pooled contexts carry resolvers, which they do not,
/// so they come back as null. Use the `_with_context` entry points for those.
pub fn create_copy<T: Serializable>(value: &T) -> Result<Option<T>> {
    let mut buffer = MEMORY_BUFFERS.claim();
    {
        let mut context = SERIALIZATION_CONTEXTS.claim();
        write_stream(&mut *buffer, DataFormat::Binary, &mut context, |writer| {
            serialize_value_with_writer(value, writer)
        })?;
    }
    let mut context = DESERIALIZATION_CONTEXTS.claim();
    let copy = read_stream(
        buffer.as_slice(),
        DataFormat::Binary,
        &mut context,
        deserialize_value_with_reader::<T>,
    )?;
    debug!(target: "graphstream", ty = TypeKey::of::<T>().name(), bytes = buffer.len(), "Copied value");
    Ok(copy)
}
