//! Value layer over the node-stream protocol
//!
//! [`Serializable`] is how a Rust value turns itself into entries and back.
//! Scalars map to one scalar entry each, `Option<T>` adds `null`, and
//! `Vec<T>` becomes a struct node wrapping either a regular array or, for
//! the primitive allow-list, a primitive array.
//!
//! Types with named members implement [`NodeObject`](crate::NodeObject)
//! instead and are written through [`Shared`](crate::Shared).
//!
//! # Reading
//!
//! `read_value` follows the protocol's convention: `Ok(None)` is a
//! recoverable failure that has already been logged and skipped, so callers
//! keep their default and move on.

use graphstream_codec::{DataReader, DataReaderExt, DataWriter, DataWriterExt};
use graphstream_core::{Decimal, EntryType, Guid, Result};

/// Cap on the capacity reserved from a declared array length.
///
/// A corrupt length must not turn into a huge allocation; the vector still
/// grows past this if the elements are really there.
const MAX_PREALLOCATED_ELEMENTS: usize = 4096;

/// A value that can be written to and read from a node stream.
pub trait Serializable: Sized + 'static {
    /// Write the value as the entry (or node) `name`.
    fn write_value(&self, name: Option<&str>, writer: &mut dyn DataWriter) -> Result<()>;

    /// Read a value from the next entry.
    fn read_value(reader: &mut dyn DataReader) -> Result<Option<Self>>;

    /// Write `values` as the content of an array.
    ///
    /// Element types from the primitive allow-list override this to write a
    /// single primitive array.
    fn write_slice(values: &[Self], writer: &mut dyn DataWriter) -> Result<()> {
        writer.begin_array_node(values.len() as i64)?;
        for value in values {
            value.write_value(None, writer)?;
        }
        writer.end_array_node()
    }

    /// Read the content written by [`write_slice`](Serializable::write_slice).
    ///
    /// Elements that fail to read are dropped.
    fn read_vec(reader: &mut dyn DataReader) -> Result<Option<Vec<Self>>> {
        let Some(length) = reader.enter_array()? else {
            return Ok(None);
        };
        let hint = usize::try_from(length).unwrap_or(0).min(MAX_PREALLOCATED_ELEMENTS);
        let mut values = Vec::with_capacity(hint);
        while !reader.peek_entry_type()?.is_boundary() {
            if let Some(value) = Self::read_value(reader)? {
                values.push(value);
            }
        }
        reader.exit_array()?;
        Ok(Some(values))
    }
}

macro_rules! primitive_serializable {
    ($($ty:ty => $write:ident, $read:ident;)*) => {
        $(
            impl Serializable for $ty {
                fn write_value(&self, name: Option<&str>, writer: &mut dyn DataWriter) -> Result<()> {
                    writer.$write(name, *self)
                }

                fn read_value(reader: &mut dyn DataReader) -> Result<Option<Self>> {
                    reader.$read()
                }

                fn write_slice(values: &[Self], writer: &mut dyn DataWriter) -> Result<()> {
                    writer.write_primitive_array_of(values)
                }

                fn read_vec(reader: &mut dyn DataReader) -> Result<Option<Vec<Self>>> {
                    reader.read_primitive_array::<$ty>()
                }
            }
        )*
    };
}

primitive_serializable! {
    bool => write_bool, read_bool;
    i8 => write_i8, read_i8;
    u8 => write_u8, read_u8;
    i16 => write_i16, read_i16;
    u16 => write_u16, read_u16;
    i32 => write_i32, read_i32;
    u32 => write_u32, read_u32;
    i64 => write_i64, read_i64;
    u64 => write_u64, read_u64;
    f32 => write_f32, read_f32;
    f64 => write_f64, read_f64;
    char => write_char, read_char;
    Guid => write_guid, read_guid;
    Decimal => write_decimal, read_decimal;
}

impl Serializable for String {
    fn write_value(&self, name: Option<&str>, writer: &mut dyn DataWriter) -> Result<()> {
        writer.write_string(name, self)
    }

    fn read_value(reader: &mut dyn DataReader) -> Result<Option<Self>> {
        reader.read_string()
    }
}

impl<T: Serializable> Serializable for Option<T> {
    fn write_value(&self, name: Option<&str>, writer: &mut dyn DataWriter) -> Result<()> {
        match self {
            Some(value) => value.write_value(name, writer),
            None => writer.write_null(name),
        }
    }

    fn read_value(reader: &mut dyn DataReader) -> Result<Option<Self>> {
        if reader.peek_entry_type()? == EntryType::Null {
            reader.read_null()?;
            return Ok(Some(None));
        }
        Ok(T::read_value(reader)?.map(Some))
    }
}

impl<T: Serializable> Serializable for Vec<T> {
    fn write_value(&self, name: Option<&str>, writer: &mut dyn DataWriter) -> Result<()> {
        writer.begin_struct_node(name, None)?;
        T::write_slice(self, writer)?;
        writer.end_node(name)
    }

    fn read_value(reader: &mut dyn DataReader) -> Result<Option<Self>> {
        if reader.enter_node()?.is_none() {
            return Ok(None);
        }
        let values = T::read_vec(reader)?;
        reader.exit_node()?;
        Ok(values)
    }
}

/// Read the members of the node the reader is inside, up to its end.
///
/// `read_member` is called with each member's name and returns whether it
/// consumed the member. Unknown members, and unnamed entries, are skipped.
/// The closing `EndOfNode` is left for the caller's `exit_node`.
pub fn read_members<F>(reader: &mut dyn DataReader, mut read_member: F) -> Result<()>
where
    F: FnMut(&str, &mut dyn DataReader) -> Result<bool>,
{
    loop {
        let (entry, name) = reader.peek_entry()?;
        if entry.is_boundary() {
            return Ok(());
        }
        let consumed = match name {
            Some(name) => read_member(&name, &mut *reader)?,
            None => false,
        };
        if !consumed {
            reader.skip_entry()?;
        }
    }
}
