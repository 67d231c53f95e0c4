//! Node-stream protocol
//!
//! A serialized graph is a stream of entries: scalars, nulls, references,
//! primitive arrays, and the structural markers that open and close nodes
//! and arrays. [`DataWriter`] produces such a stream and [`DataReader`]
//! consumes it; both are object safe so the value layer can drive any codec
//! through `&mut dyn DataWriter` / `&mut dyn DataReader`.
//!
//! # Reading
//!
//! Every `read_*` returns `Result<Option<T>>`:
//! - `Ok(Some(v))`: the next entry had the expected kind and was consumed
//! - `Ok(None)`: recoverable failure. A mismatched entry was logged as a
//!   warning and skipped, or a value failed to convert and was logged as an
//!   error. The caller substitutes a default.
//! - `Err(_)`: the session aborts (strict policy, I/O, protocol misuse).
//!
//! A mismatch at a boundary (`EndOfNode`, `EndOfArray`, `EndOfStream`) is
//! reported but leaves the boundary in place, so one bad read never
//! desynchronizes the enclosing node.

use graphstream_core::{
    Decimal, EntryType, Guid, PrimitiveElement, PrimitiveSlice, PrimitiveVecMut, Result, TypeKey,
};
use graphstream_session::{DeserializationContext, SerializationContext};

/// Header of a node opened by [`DataReader::enter_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHeader {
    /// Internal reference id, -1 for struct nodes
    pub id: i32,
    /// Type recorded in the stream, `None` if absent or unbindable
    pub ty: Option<TypeKey>,
}

/// Producer side of the node-stream protocol.
pub trait DataWriter {
    /// Session context.
    fn context(&self) -> &SerializationContext;

    /// Session context, mutably.
    fn context_mut(&mut self) -> &mut SerializationContext;

    /// Open a node with identity `id`.
    fn begin_reference_node(&mut self, name: Option<&str>, ty: Option<&TypeKey>, id: i32)
        -> Result<()>;

    /// Open a node without identity.
    fn begin_struct_node(&mut self, name: Option<&str>, ty: Option<&TypeKey>) -> Result<()>;

    /// Close the current node; `name` must match the one it was opened with.
    fn end_node(&mut self, name: Option<&str>) -> Result<()>;

    /// Open a regular array of `length` entries.
    ///
    /// Arrays are unnamed. Inside a node they occupy the node's array slot;
    /// at the root or inside another array text codecs write them bare.
    fn begin_array_node(&mut self, length: i64) -> Result<()>;

    /// Close the current array.
    fn end_array_node(&mut self) -> Result<()>;

    /// Write a primitive array.
    fn write_primitive_array(&mut self, values: PrimitiveSlice<'_>) -> Result<()>;

    /// Write a null.
    fn write_null(&mut self, name: Option<&str>) -> Result<()>;

    /// Write a back reference to the node with identity `id`.
    fn write_internal_reference(&mut self, name: Option<&str>, id: i32) -> Result<()>;

    /// Write a reference resolved outside the graph by index.
    fn write_external_reference_by_index(&mut self, name: Option<&str>, index: i32) -> Result<()>;

    /// Write a reference resolved outside the graph by GUID.
    fn write_external_reference_by_guid(&mut self, name: Option<&str>, guid: Guid) -> Result<()>;

    /// Write a reference resolved outside the graph by string id.
    fn write_external_reference_by_string(&mut self, name: Option<&str>, id: &str) -> Result<()>;

    #[allow(missing_docs)]
    fn write_bool(&mut self, name: Option<&str>, value: bool) -> Result<()>;
    #[allow(missing_docs)]
    fn write_i8(&mut self, name: Option<&str>, value: i8) -> Result<()>;
    #[allow(missing_docs)]
    fn write_u8(&mut self, name: Option<&str>, value: u8) -> Result<()>;
    #[allow(missing_docs)]
    fn write_i16(&mut self, name: Option<&str>, value: i16) -> Result<()>;
    #[allow(missing_docs)]
    fn write_u16(&mut self, name: Option<&str>, value: u16) -> Result<()>;
    #[allow(missing_docs)]
    fn write_i32(&mut self, name: Option<&str>, value: i32) -> Result<()>;
    #[allow(missing_docs)]
    fn write_u32(&mut self, name: Option<&str>, value: u32) -> Result<()>;
    #[allow(missing_docs)]
    fn write_i64(&mut self, name: Option<&str>, value: i64) -> Result<()>;
    #[allow(missing_docs)]
    fn write_u64(&mut self, name: Option<&str>, value: u64) -> Result<()>;
    #[allow(missing_docs)]
    fn write_f32(&mut self, name: Option<&str>, value: f32) -> Result<()>;
    #[allow(missing_docs)]
    fn write_f64(&mut self, name: Option<&str>, value: f64) -> Result<()>;
    #[allow(missing_docs)]
    fn write_decimal(&mut self, name: Option<&str>, value: Decimal) -> Result<()>;
    #[allow(missing_docs)]
    fn write_char(&mut self, name: Option<&str>, value: char) -> Result<()>;
    #[allow(missing_docs)]
    fn write_string(&mut self, name: Option<&str>, value: &str) -> Result<()>;
    #[allow(missing_docs)]
    fn write_guid(&mut self, name: Option<&str>, value: Guid) -> Result<()>;

    /// Push staged output to the stream.
    fn flush(&mut self) -> Result<()>;

    /// Start a new stream: clear type ids, references and open nodes.
    fn prepare_new_serialization_session(&mut self) -> Result<()>;
}

/// Consumer side of the node-stream protocol.
pub trait DataReader {
    /// Session context.
    fn context(&self) -> &DeserializationContext;

    /// Session context, mutably.
    fn context_mut(&mut self) -> &mut DeserializationContext;

    /// Kind and name of the next entry, without consuming it.
    fn peek_entry(&mut self) -> Result<(EntryType, Option<String>)>;

    /// Open the node at the current position.
    fn enter_node(&mut self) -> Result<Option<NodeHeader>>;

    /// Skip the rest of the current node and close it.
    fn exit_node(&mut self) -> Result<()>;

    /// Open the array at the current position, returning its declared
    /// length (-1 if the format does not record one).
    fn enter_array(&mut self) -> Result<Option<i64>>;

    /// Skip the rest of the current array and close it.
    fn exit_array(&mut self) -> Result<()>;

    /// Read a primitive array into `values`, replacing its contents.
    fn read_primitive_array_into(&mut self, values: PrimitiveVecMut<'_>) -> Result<bool>;

    /// Consume a null. Returns `false` (after logging and skipping) if the
    /// next entry is not null.
    fn read_null(&mut self) -> Result<bool>;

    #[allow(missing_docs)]
    fn read_internal_reference(&mut self) -> Result<Option<i32>>;
    #[allow(missing_docs)]
    fn read_external_reference_by_index(&mut self) -> Result<Option<i32>>;
    #[allow(missing_docs)]
    fn read_external_reference_by_guid(&mut self) -> Result<Option<Guid>>;
    #[allow(missing_docs)]
    fn read_external_reference_by_string(&mut self) -> Result<Option<String>>;

    #[allow(missing_docs)]
    fn read_bool(&mut self) -> Result<Option<bool>>;
    #[allow(missing_docs)]
    fn read_i8(&mut self) -> Result<Option<i8>>;
    #[allow(missing_docs)]
    fn read_u8(&mut self) -> Result<Option<u8>>;
    #[allow(missing_docs)]
    fn read_i16(&mut self) -> Result<Option<i16>>;
    #[allow(missing_docs)]
    fn read_u16(&mut self) -> Result<Option<u16>>;
    #[allow(missing_docs)]
    fn read_i32(&mut self) -> Result<Option<i32>>;
    #[allow(missing_docs)]
    fn read_u32(&mut self) -> Result<Option<u32>>;
    #[allow(missing_docs)]
    fn read_i64(&mut self) -> Result<Option<i64>>;
    #[allow(missing_docs)]
    fn read_u64(&mut self) -> Result<Option<u64>>;
    #[allow(missing_docs)]
    fn read_f32(&mut self) -> Result<Option<f32>>;
    #[allow(missing_docs)]
    fn read_f64(&mut self) -> Result<Option<f64>>;
    #[allow(missing_docs)]
    fn read_decimal(&mut self) -> Result<Option<Decimal>>;
    #[allow(missing_docs)]
    fn read_char(&mut self) -> Result<Option<char>>;
    #[allow(missing_docs)]
    fn read_string(&mut self) -> Result<Option<String>>;
    #[allow(missing_docs)]
    fn read_guid(&mut self) -> Result<Option<Guid>>;

    /// Skip the next entry, including everything a node or array contains.
    ///
    /// At `EndOfNode`/`EndOfArray` nothing is consumed and an error is
    /// logged; at `EndOfStream` this does nothing.
    fn skip_entry(&mut self) -> Result<()>;

    /// Name of the innermost open node.
    fn current_node_name(&self) -> Option<&str>;

    /// Id of the innermost open node, -1 if none or a struct node.
    fn current_node_id(&self) -> i32;

    /// Number of open nodes and arrays.
    fn current_node_depth(&self) -> usize;

    /// Start a new stream: clear type ids, references and open nodes.
    fn prepare_new_serialization_session(&mut self) -> Result<()>;
}

/// Typed helpers over [`DataWriter`].
pub trait DataWriterExt: DataWriter {
    /// Write `values` as a primitive array.
    fn write_primitive_array_of<T: PrimitiveElement>(&mut self, values: &[T]) -> Result<()> {
        self.write_primitive_array(T::slice(values))
    }
}

impl<W: DataWriter + ?Sized> DataWriterExt for W {}

/// Typed helpers over [`DataReader`].
pub trait DataReaderExt: DataReader {
    /// Read a primitive array of `T`.
    fn read_primitive_array<T: PrimitiveElement>(&mut self) -> Result<Option<Vec<T>>> {
        let mut values = Vec::new();
        if self.read_primitive_array_into(T::vec_mut(&mut values))? {
            Ok(Some(values))
        } else {
            Ok(None)
        }
    }

    /// Kind of the next entry, without its name.
    fn peek_entry_type(&mut self) -> Result<EntryType> {
        Ok(self.peek_entry()?.0)
    }
}

impl<R: DataReader + ?Sized> DataReaderExt for R {}

/// Human-readable description of an entry for diagnostics.
pub(crate) fn describe(entry: EntryType, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("{} '{}'", entry, name),
        None => entry.to_string(),
    }
}
