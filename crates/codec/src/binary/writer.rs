//! Binary writer

use super::entry::BinaryEntryType as B;
use super::{STRING_WIDTH_LATIN1, STRING_WIDTH_UTF16};
use crate::dump::{hex_dump, read_whole_stream};
use crate::endian::{as_wire_bytes, encode_slice, HostEndian};
use crate::node_stack::NodeStack;
use crate::protocol::DataWriter;
use crate::staging::StagingWriter;
use byteorder::{ByteOrder, LittleEndian};
use graphstream_core::{
    Decimal, Error, Guid, PrimitiveElement, PrimitiveSlice, Result, SliceVisitor, TypeKey,
};
use graphstream_session::SerializationContext;
use std::io::{Read, Seek, Write};

/// Writes the node stream in the binary format.
///
/// Output is staged in a buffer of `config.binary.staging_buffer_size`
/// bytes. Call [`flush`](DataWriter::flush) or [`into_inner`] when done;
/// dropping the writer discards staged bytes.
///
/// [`into_inner`]: BinaryDataWriter::into_inner
pub struct BinaryDataWriter<'a, W: Write> {
    /// Staged output
    out: StagingWriter<W>,

    /// Session state (type ids, references, resolvers, config)
    context: &'a mut SerializationContext,

    /// Open nodes and arrays
    nodes: NodeStack,

    /// Write Latin-1 strings with one byte per char
    compress_strings: bool,

    /// Byte order assumed for primitive array copies
    host: HostEndian,
}

impl<'a, W: Write> BinaryDataWriter<'a, W> {
    /// Create a writer over `stream`.
    ///
    /// Fails with `Error::Config` if the configured staging buffer is too
    /// small.
    pub fn new(stream: W, context: &'a mut SerializationContext) -> Result<Self> {
        let options = context.config().binary.clone();
        options.validate()?;
        Ok(BinaryDataWriter {
            out: StagingWriter::new(stream, options.staging_buffer_size),
            context,
            nodes: NodeStack::new(),
            compress_strings: options.compress_strings,
            host: HostEndian::native(),
        })
    }

    /// Convert primitive arrays element by element even on little-endian
    /// hosts. Output is byte-identical; only the copy path changes.
    pub fn force_portable_byte_order(&mut self) {
        self.host = HostEndian::Big;
    }

    /// The underlying stream. Staged bytes may not have reached it yet.
    pub fn get_ref(&self) -> &W {
        self.out.get_ref()
    }

    /// Flush and return the stream.
    pub fn into_inner(self) -> Result<W> {
        self.out.into_inner()
    }

    fn write_tag(&mut self, name: Option<&str>, named: B, unnamed: B) -> Result<()> {
        self.out.put_u8(B::pick(name, named, unnamed) as u8)?;
        if let Some(name) = name {
            self.write_string_payload(name)?;
        }
        Ok(())
    }

    fn write_fixed<const N: usize>(
        &mut self,
        name: Option<&str>,
        named: B,
        unnamed: B,
        encode: impl FnOnce(&mut [u8]),
    ) -> Result<()> {
        self.write_tag(name, named, unnamed)?;
        encode(self.out.reserve(N)?);
        Ok(())
    }

    fn write_string_header(&mut self, width: u8, len: usize) -> Result<()> {
        let len = i32::try_from(len)
            .map_err(|_| Error::Protocol(format!("string of {} code units is too long", len)))?;
        let slot = self.out.reserve(5)?;
        slot[0] = width;
        LittleEndian::write_i32(&mut slot[1..5], len);
        Ok(())
    }

    fn write_string_payload(&mut self, value: &str) -> Result<()> {
        let latin1 = self.compress_strings && value.chars().all(|c| (c as u32) <= 0xFF);
        if latin1 {
            let len = value.chars().count();
            self.write_string_header(STRING_WIDTH_LATIN1, len)?;
            if len <= self.out.capacity() {
                let slot = self.out.reserve(len)?;
                for (byte, c) in slot.iter_mut().zip(value.chars()) {
                    *byte = c as u8;
                }
            } else {
                let bytes: Vec<u8> = value.chars().map(|c| c as u8).collect();
                self.out.put_direct(&bytes)?;
            }
        } else {
            let len = value.encode_utf16().count();
            self.write_string_header(STRING_WIDTH_UTF16, len)?;
            let byte_len = len * 2;
            if byte_len <= self.out.capacity() {
                let slot = self.out.reserve(byte_len)?;
                for (chunk, unit) in slot.chunks_exact_mut(2).zip(value.encode_utf16()) {
                    LittleEndian::write_u16(chunk, unit);
                }
            } else {
                let mut bytes = vec![0u8; byte_len];
                for (chunk, unit) in bytes.chunks_exact_mut(2).zip(value.encode_utf16()) {
                    LittleEndian::write_u16(chunk, unit);
                }
                self.out.put_direct(&bytes)?;
            }
        }
        Ok(())
    }

    fn write_type_entry(&mut self, ty: Option<&TypeKey>) -> Result<()> {
        let Some(ty) = ty else {
            return self.out.put_u8(B::UnnamedNull as u8);
        };
        let (is_new, id) = self.context.try_register_type(ty);
        let slot = self.out.reserve(5)?;
        LittleEndian::write_i32(&mut slot[1..5], id);
        if is_new {
            slot[0] = B::TypeName as u8;
            let name = self.context.binder().bind_to_name(ty);
            self.write_string_payload(&name)?;
        } else {
            slot[0] = B::TypeID as u8;
        }
        Ok(())
    }
}

impl<'a, W: Write + Read + Seek> BinaryDataWriter<'a, W> {
    /// Hex dump of everything written so far.
    pub fn get_data_dump(&mut self) -> Result<String> {
        self.out.flush()?;
        let bytes = read_whole_stream(self.out.get_mut())?;
        Ok(hex_dump(&bytes))
    }
}

struct PrimitiveArrayEncoder<'w, W: Write> {
    out: &'w mut StagingWriter<W>,
    host: HostEndian,
}

impl<'w, W: Write> SliceVisitor for PrimitiveArrayEncoder<'w, W> {
    type Output = Result<()>;

    fn visit<T: PrimitiveElement>(self, values: &[T]) -> Result<()> {
        if T::BYTES == 1 {
            if let Some(bytes) = as_wire_bytes(values, self.host) {
                return self.out.put_direct(bytes);
            }
        }
        let per_chunk = (self.out.capacity() / T::BYTES).max(1);
        for chunk in values.chunks(per_chunk) {
            let slot = self.out.reserve(chunk.len() * T::BYTES)?;
            encode_slice(chunk, slot, self.host);
        }
        Ok(())
    }
}

impl<'a, W: Write> DataWriter for BinaryDataWriter<'a, W> {
    fn context(&self) -> &SerializationContext {
        &*self.context
    }

    fn context_mut(&mut self) -> &mut SerializationContext {
        &mut *self.context
    }

    fn begin_reference_node(
        &mut self,
        name: Option<&str>,
        ty: Option<&TypeKey>,
        id: i32,
    ) -> Result<()> {
        self.write_tag(
            name,
            B::NamedStartOfReferenceNode,
            B::UnnamedStartOfReferenceNode,
        )?;
        self.write_type_entry(ty)?;
        LittleEndian::write_i32(self.out.reserve(4)?, id);
        self.nodes.push_node(name, id, ty.copied());
        Ok(())
    }

    fn begin_struct_node(&mut self, name: Option<&str>, ty: Option<&TypeKey>) -> Result<()> {
        self.write_tag(name, B::NamedStartOfStructNode, B::UnnamedStartOfStructNode)?;
        self.write_type_entry(ty)?;
        self.nodes.push_node(name, -1, ty.copied());
        Ok(())
    }

    fn end_node(&mut self, name: Option<&str>) -> Result<()> {
        self.nodes.pop_node_named(name)?;
        self.out.put_u8(B::EndOfNode as u8)
    }

    fn begin_array_node(&mut self, length: i64) -> Result<()> {
        let slot = self.out.reserve(9)?;
        slot[0] = B::StartOfArray as u8;
        LittleEndian::write_i64(&mut slot[1..9], length);
        self.nodes.push_array();
        Ok(())
    }

    fn end_array_node(&mut self) -> Result<()> {
        self.nodes.pop_array()?;
        self.out.put_u8(B::EndOfArray as u8)
    }

    fn write_primitive_array(&mut self, values: PrimitiveSlice<'_>) -> Result<()> {
        let len = i32::try_from(values.len()).map_err(|_| {
            Error::Protocol(format!(
                "primitive array of {} elements is too long",
                values.len()
            ))
        })?;
        let bytes_per_element = values.kind().bytes_per_element() as i32;
        let slot = self.out.reserve(9)?;
        slot[0] = B::PrimitiveArray as u8;
        LittleEndian::write_i32(&mut slot[1..5], len);
        LittleEndian::write_i32(&mut slot[5..9], bytes_per_element);
        values.visit(PrimitiveArrayEncoder {
            out: &mut self.out,
            host: self.host,
        })
    }

    fn write_null(&mut self, name: Option<&str>) -> Result<()> {
        self.write_tag(name, B::NamedNull, B::UnnamedNull)
    }

    fn write_internal_reference(&mut self, name: Option<&str>, id: i32) -> Result<()> {
        self.write_fixed::<4>(
            name,
            B::NamedInternalReference,
            B::UnnamedInternalReference,
            |b| LittleEndian::write_i32(b, id),
        )
    }

    fn write_external_reference_by_index(&mut self, name: Option<&str>, index: i32) -> Result<()> {
        self.write_fixed::<4>(
            name,
            B::NamedExternalReferenceByIndex,
            B::UnnamedExternalReferenceByIndex,
            |b| LittleEndian::write_i32(b, index),
        )
    }

    fn write_external_reference_by_guid(&mut self, name: Option<&str>, guid: Guid) -> Result<()> {
        self.write_fixed::<16>(
            name,
            B::NamedExternalReferenceByGuid,
            B::UnnamedExternalReferenceByGuid,
            |b| b.copy_from_slice(guid.as_bytes()),
        )
    }

    fn write_external_reference_by_string(&mut self, name: Option<&str>, id: &str) -> Result<()> {
        self.write_tag(
            name,
            B::NamedExternalReferenceByString,
            B::UnnamedExternalReferenceByString,
        )?;
        self.write_string_payload(id)
    }

    fn write_bool(&mut self, name: Option<&str>, value: bool) -> Result<()> {
        self.write_fixed::<1>(name, B::NamedBoolean, B::UnnamedBoolean, |b| {
            b[0] = value as u8
        })
    }

    fn write_i8(&mut self, name: Option<&str>, value: i8) -> Result<()> {
        self.write_fixed::<1>(name, B::NamedSByte, B::UnnamedSByte, |b| b[0] = value as u8)
    }

    fn write_u8(&mut self, name: Option<&str>, value: u8) -> Result<()> {
        self.write_fixed::<1>(name, B::NamedByte, B::UnnamedByte, |b| b[0] = value)
    }

    fn write_i16(&mut self, name: Option<&str>, value: i16) -> Result<()> {
        self.write_fixed::<2>(name, B::NamedShort, B::UnnamedShort, |b| {
            LittleEndian::write_i16(b, value)
        })
    }

    fn write_u16(&mut self, name: Option<&str>, value: u16) -> Result<()> {
        self.write_fixed::<2>(name, B::NamedUShort, B::UnnamedUShort, |b| {
            LittleEndian::write_u16(b, value)
        })
    }

    fn write_i32(&mut self, name: Option<&str>, value: i32) -> Result<()> {
        self.write_fixed::<4>(name, B::NamedInt, B::UnnamedInt, |b| {
            LittleEndian::write_i32(b, value)
        })
    }

    fn write_u32(&mut self, name: Option<&str>, value: u32) -> Result<()> {
        self.write_fixed::<4>(name, B::NamedUInt, B::UnnamedUInt, |b| {
            LittleEndian::write_u32(b, value)
        })
    }

    fn write_i64(&mut self, name: Option<&str>, value: i64) -> Result<()> {
        self.write_fixed::<8>(name, B::NamedLong, B::UnnamedLong, |b| {
            LittleEndian::write_i64(b, value)
        })
    }

    fn write_u64(&mut self, name: Option<&str>, value: u64) -> Result<()> {
        self.write_fixed::<8>(name, B::NamedULong, B::UnnamedULong, |b| {
            LittleEndian::write_u64(b, value)
        })
    }

    fn write_f32(&mut self, name: Option<&str>, value: f32) -> Result<()> {
        self.write_fixed::<4>(name, B::NamedFloat, B::UnnamedFloat, |b| {
            LittleEndian::write_f32(b, value)
        })
    }

    fn write_f64(&mut self, name: Option<&str>, value: f64) -> Result<()> {
        self.write_fixed::<8>(name, B::NamedDouble, B::UnnamedDouble, |b| {
            LittleEndian::write_f64(b, value)
        })
    }

    fn write_decimal(&mut self, name: Option<&str>, value: Decimal) -> Result<()> {
        self.write_fixed::<16>(name, B::NamedDecimal, B::UnnamedDecimal, |b| {
            value.write_le(b)
        })
    }

    fn write_char(&mut self, name: Option<&str>, value: char) -> Result<()> {
        self.write_fixed::<4>(name, B::NamedChar, B::UnnamedChar, |b| {
            LittleEndian::write_u32(b, value as u32)
        })
    }

    fn write_string(&mut self, name: Option<&str>, value: &str) -> Result<()> {
        self.write_tag(name, B::NamedString, B::UnnamedString)?;
        self.write_string_payload(value)
    }

    fn write_guid(&mut self, name: Option<&str>, value: Guid) -> Result<()> {
        self.write_fixed::<16>(name, B::NamedGuid, B::UnnamedGuid, |b| {
            b.copy_from_slice(value.as_bytes())
        })
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()
    }

    fn prepare_new_serialization_session(&mut self) -> Result<()> {
        self.context.reset_session();
        self.nodes.clear();
        Ok(())
    }
}
