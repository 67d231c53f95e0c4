//! Binary reader

use super::entry::BinaryEntryType as B;
use super::{STRING_WIDTH_LATIN1, STRING_WIDTH_UTF16};
use crate::dump::{hex_dump, read_whole_stream};
use crate::endian::{as_wire_bytes_mut, decode_slice, HostEndian};
use crate::node_stack::NodeStack;
use crate::protocol::{describe, DataReader, NodeHeader};
use crate::staging::StagingReader;
use byteorder::{ByteOrder, LittleEndian};
use graphstream_core::{
    Decimal, EntryType, Guid, PrimitiveElement, PrimitiveVecMut, Result, TypeKey, VecVisitor,
};
use graphstream_session::DeserializationContext;
use std::io::{Read, Seek};
use tracing::trace;

/// Bytes decoded per step when reading primitive arrays.
const DECODE_CHUNK: usize = 16 * 1024;

/// Bytes read per step for variable-length payloads, so a corrupt length
/// never allocates more than the stream actually holds.
const READ_CHUNK: usize = 64 * 1024;

struct PeekedEntry {
    tag: B,
    name: Option<String>,
}

enum Number {
    Int(i128),
    Float(f64),
    Decimal(Decimal),
}

/// Reads the node stream in the binary format.
///
/// Binary data cannot be resynchronized: after an undefined tag or a
/// truncated payload (both logged as errors) the reader reports
/// `EndOfStream` for the rest of the session.
pub struct BinaryDataReader<'a, R: Read> {
    /// Staged input
    input: StagingReader<R>,

    /// Session state (type ids, references, resolvers, config)
    context: &'a mut DeserializationContext,

    /// Open nodes and arrays
    nodes: NodeStack,

    /// Tag and name of the next entry, already consumed from the input
    peeked: Option<PeekedEntry>,

    /// Set at end of data or after corruption
    ended: bool,

    /// Byte order assumed for primitive array copies
    host: HostEndian,
}

impl<'a, R: Read> BinaryDataReader<'a, R> {
    /// Create a reader over `stream`.
    pub fn new(stream: R, context: &'a mut DeserializationContext) -> Result<Self> {
        let options = context.config().binary.clone();
        options.validate()?;
        Ok(BinaryDataReader {
            input: StagingReader::new(stream, options.staging_buffer_size),
            context,
            nodes: NodeStack::new(),
            peeked: None,
            ended: false,
            host: HostEndian::native(),
        })
    }

    /// Convert primitive arrays element by element even on little-endian
    /// hosts.
    pub fn force_portable_byte_order(&mut self) {
        self.host = HostEndian::Big;
    }

    /// Bytes consumed from the stream so far.
    pub fn position(&self) -> u64 {
        self.input.position()
    }

    /// Return the stream. Bytes read ahead into the staging buffer are lost.
    pub fn into_inner(self) -> R {
        self.input.into_inner()
    }

    fn corrupt(&mut self, message: String) -> Result<()> {
        self.ended = true;
        self.peeked = None;
        self.context.debug().log_error(message)
    }

    fn truncated(&mut self) -> Result<()> {
        let offset = self.input.position();
        self.corrupt(format!("binary stream ended unexpectedly at offset {}", offset))
    }

    fn take<const N: usize>(&mut self) -> Result<Option<[u8; N]>> {
        match self.input.take_array::<N>()? {
            Some(bytes) => Ok(Some(bytes)),
            None => {
                self.truncated()?;
                Ok(None)
            }
        }
    }

    fn take_i32(&mut self) -> Result<Option<i32>> {
        Ok(self.take::<4>()?.map(|b| LittleEndian::read_i32(&b)))
    }

    fn take_bytes(&mut self, len: usize) -> Result<Option<Vec<u8>>> {
        let mut bytes = Vec::new();
        while bytes.len() < len {
            let start = bytes.len();
            let step = (len - start).min(READ_CHUNK);
            bytes.resize(start + step, 0);
            if !self.input.read_exact_into(&mut bytes[start..])? {
                self.truncated()?;
                return Ok(None);
            }
        }
        Ok(Some(bytes))
    }

    fn read_string_header(&mut self) -> Result<Option<(u8, usize)>> {
        let Some(header) = self.take::<5>()? else {
            return Ok(None);
        };
        let width = header[0];
        let len = LittleEndian::read_i32(&header[1..5]);
        if (width != STRING_WIDTH_LATIN1 && width != STRING_WIDTH_UTF16) || len < 0 {
            self.corrupt(format!(
                "invalid string header (width flag {}, length {}) at offset {}",
                width,
                len,
                self.input.position()
            ))?;
            return Ok(None);
        }
        Ok(Some((width, len as usize)))
    }

    fn read_string_payload(&mut self) -> Result<Option<String>> {
        let Some((width, len)) = self.read_string_header()? else {
            return Ok(None);
        };
        if width == STRING_WIDTH_LATIN1 {
            Ok(self
                .take_bytes(len)?
                .map(|bytes| bytes.into_iter().map(char::from).collect()))
        } else {
            Ok(self.take_bytes(len * 2)?.map(|bytes| {
                let units: Vec<u16> = bytes.chunks_exact(2).map(LittleEndian::read_u16).collect();
                String::from_utf16_lossy(&units)
            }))
        }
    }

    fn skip_string_payload(&mut self) -> Result<()> {
        if let Some((width, len)) = self.read_string_header()? {
            let bytes = if width == STRING_WIDTH_LATIN1 { len } else { len * 2 };
            if !self.input.skip_bytes(bytes as u64)? {
                self.truncated()?;
            }
        }
        Ok(())
    }

    fn skip_payload(&mut self, tag: B) -> Result<()> {
        if let Some(size) = tag.fixed_payload_size() {
            if !self.input.skip_bytes(size as u64)? {
                self.truncated()?;
            }
            return Ok(());
        }
        match tag {
            B::NamedString
            | B::UnnamedString
            | B::NamedExternalReferenceByString
            | B::UnnamedExternalReferenceByString => self.skip_string_payload(),
            B::TypeName => {
                if self.take_i32()?.is_some() {
                    self.skip_string_payload()?;
                }
                Ok(())
            }
            B::PrimitiveArray => {
                let Some(header) = self.take::<8>()? else {
                    return Ok(());
                };
                let len = LittleEndian::read_i32(&header[0..4]);
                let bytes_per_element = LittleEndian::read_i32(&header[4..8]);
                if len < 0 || bytes_per_element <= 0 {
                    return self.corrupt(format!(
                        "invalid primitive array header ({} x {} bytes)",
                        len, bytes_per_element
                    ));
                }
                if !self
                    .input
                    .skip_bytes(len as u64 * bytes_per_element as u64)?
                {
                    self.truncated()?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn read_type_entry(&mut self) -> Result<Option<TypeKey>> {
        let Some(byte) = self.input.take_u8()? else {
            self.truncated()?;
            return Ok(None);
        };
        match B::from_u8(byte) {
            Some(B::TypeName) => {
                let Some(id) = self.take_i32()? else {
                    return Ok(None);
                };
                let Some(name) = self.read_string_payload()? else {
                    return Ok(None);
                };
                self.context.register_type(id, &name)
            }
            Some(B::TypeID) => {
                let Some(id) = self.take_i32()? else {
                    return Ok(None);
                };
                self.context.get_type(id)
            }
            Some(B::UnnamedNull) => Ok(None),
            _ => {
                self.corrupt(format!("invalid type entry tag 0x{:02x}", byte))?;
                Ok(None)
            }
        }
    }

    /// Log a mismatch and skip the offending entry unless it is a boundary.
    fn mismatch(&mut self, expected: &str) -> Result<()> {
        let (entry, name) = self.peek_entry()?;
        self.context.debug().log_warning(format!(
            "expected {} but found {} at depth {}",
            expected,
            describe(entry, name.as_deref()),
            self.nodes.depth()
        ))?;
        if !entry.is_boundary() {
            self.skip_entry()?;
        }
        Ok(())
    }

    /// Consume the peeked entry if it has kind `entry`, otherwise report a
    /// mismatch.
    fn expect(&mut self, entry: EntryType, expected: &str) -> Result<Option<B>> {
        let (found, _) = self.peek_entry()?;
        if found != entry {
            self.mismatch(expected)?;
            return Ok(None);
        }
        Ok(self.peeked.take().map(|p| p.tag))
    }

    fn read_number_payload(&mut self, tag: B) -> Result<Option<Number>> {
        let number = match tag {
            B::NamedSByte | B::UnnamedSByte => self.take::<1>()?.map(|b| Number::Int(b[0] as i8 as i128)),
            B::NamedByte | B::UnnamedByte => self.take::<1>()?.map(|b| Number::Int(b[0] as i128)),
            B::NamedShort | B::UnnamedShort => self
                .take::<2>()?
                .map(|b| Number::Int(LittleEndian::read_i16(&b) as i128)),
            B::NamedUShort | B::UnnamedUShort => self
                .take::<2>()?
                .map(|b| Number::Int(LittleEndian::read_u16(&b) as i128)),
            B::NamedInt | B::UnnamedInt => self
                .take::<4>()?
                .map(|b| Number::Int(LittleEndian::read_i32(&b) as i128)),
            B::NamedUInt | B::UnnamedUInt => self
                .take::<4>()?
                .map(|b| Number::Int(LittleEndian::read_u32(&b) as i128)),
            B::NamedLong | B::UnnamedLong => self
                .take::<8>()?
                .map(|b| Number::Int(LittleEndian::read_i64(&b) as i128)),
            B::NamedULong | B::UnnamedULong => self
                .take::<8>()?
                .map(|b| Number::Int(LittleEndian::read_u64(&b) as i128)),
            B::NamedFloat | B::UnnamedFloat => self
                .take::<4>()?
                .map(|b| Number::Float(LittleEndian::read_f32(&b) as f64)),
            B::NamedDouble | B::UnnamedDouble => self
                .take::<8>()?
                .map(|b| Number::Float(LittleEndian::read_f64(&b))),
            B::NamedDecimal | B::UnnamedDecimal => self
                .take::<16>()?
                .map(|b| Number::Decimal(Decimal::read_le(&b))),
            _ => None,
        };
        Ok(number)
    }

    fn read_integer<T: TryFrom<i128>>(&mut self, expected: &str) -> Result<Option<T>> {
        let Some(tag) = self.expect(EntryType::Integer, expected)? else {
            return Ok(None);
        };
        let Some(Number::Int(value)) = self.read_number_payload(tag)? else {
            return Ok(None);
        };
        match T::try_from(value) {
            Ok(v) => Ok(Some(v)),
            Err(_) => {
                self.context
                    .debug()
                    .log_error(format!("integer {} is out of range for {}", value, expected))?;
                Ok(None)
            }
        }
    }

    fn read_number(&mut self, expected: &str) -> Result<Option<Number>> {
        let (found, _) = self.peek_entry()?;
        if found != EntryType::Integer && found != EntryType::FloatingPoint {
            self.mismatch(expected)?;
            return Ok(None);
        }
        match self.peeked.take() {
            Some(p) => self.read_number_payload(p.tag),
            None => Ok(None),
        }
    }
}

impl<'a, R: Read + Seek> BinaryDataReader<'a, R> {
    /// Hex dump of the whole stream.
    pub fn get_data_dump(&mut self) -> Result<String> {
        let bytes = read_whole_stream(self.input.get_mut())?;
        Ok(hex_dump(&bytes))
    }
}

struct PrimitiveArrayDecoder<'r, R: Read> {
    input: &'r mut StagingReader<R>,
    len: usize,
    host: HostEndian,
}

impl<'r, R: Read> VecVisitor for PrimitiveArrayDecoder<'r, R> {
    type Output = Result<bool>;

    fn visit<T: PrimitiveElement>(self, values: &mut Vec<T>) -> Result<bool> {
        values.clear();
        let mut scratch = [0u8; DECODE_CHUNK];
        let mut remaining = self.len;
        while remaining > 0 {
            let n = remaining.min(DECODE_CHUNK / T::BYTES);
            let start = values.len();
            values.resize(start + n, T::default());
            let target = &mut values[start..];
            let complete = match as_wire_bytes_mut(target, self.host) {
                Some(raw) => self.input.read_exact_into(raw)?,
                None => {
                    let bytes = &mut scratch[..n * T::BYTES];
                    let complete = self.input.read_exact_into(bytes)?;
                    if complete {
                        decode_slice(bytes, target, self.host);
                    }
                    complete
                }
            };
            if !complete {
                values.truncate(start);
                return Ok(false);
            }
            remaining -= n;
        }
        Ok(true)
    }
}

impl<'a, R: Read> DataReader for BinaryDataReader<'a, R> {
    fn context(&self) -> &DeserializationContext {
        &*self.context
    }

    fn context_mut(&mut self) -> &mut DeserializationContext {
        &mut *self.context
    }

    fn peek_entry(&mut self) -> Result<(EntryType, Option<String>)> {
        if let Some(p) = &self.peeked {
            return Ok((p.tag.entry_type(), p.name.clone()));
        }
        if self.ended {
            return Ok((EntryType::EndOfStream, None));
        }
        let offset = self.input.position();
        let Some(byte) = self.input.take_u8()? else {
            trace!(target: "graphstream", offset, "binary stream exhausted");
            self.ended = true;
            return Ok((EntryType::EndOfStream, None));
        };
        let tag = match B::from_u8(byte) {
            Some(B::EndOfStream) => {
                self.ended = true;
                return Ok((EntryType::EndOfStream, None));
            }
            Some(tag) if tag != B::Invalid => tag,
            _ => {
                self.corrupt(format!(
                    "invalid binary entry tag 0x{:02x} at offset {}",
                    byte, offset
                ))?;
                return Ok((EntryType::EndOfStream, None));
            }
        };
        let name = if tag.is_named() {
            match self.read_string_payload()? {
                Some(name) => Some(name),
                None => return Ok((EntryType::EndOfStream, None)),
            }
        } else {
            None
        };
        self.peeked = Some(PeekedEntry {
            tag,
            name: name.clone(),
        });
        Ok((tag.entry_type(), name))
    }

    fn enter_node(&mut self) -> Result<Option<NodeHeader>> {
        let (found, _) = self.peek_entry()?;
        if found != EntryType::StartOfNode {
            self.mismatch("StartOfNode")?;
            return Ok(None);
        }
        let Some(peeked) = self.peeked.take() else {
            return Ok(None);
        };
        let ty = self.read_type_entry()?;
        let is_reference = matches!(
            peeked.tag,
            B::NamedStartOfReferenceNode | B::UnnamedStartOfReferenceNode
        );
        let id = if is_reference {
            match self.take_i32()? {
                Some(id) => id,
                None => return Ok(None),
            }
        } else {
            -1
        };
        if self.ended {
            return Ok(None);
        }
        self.nodes.push_node(peeked.name.as_deref(), id, ty);
        Ok(Some(NodeHeader { id, ty }))
    }

    fn exit_node(&mut self) -> Result<()> {
        loop {
            let (entry, _) = self.peek_entry()?;
            match entry {
                EntryType::EndOfNode => {
                    self.peeked = None;
                    break;
                }
                EntryType::EndOfStream => break,
                EntryType::EndOfArray => {
                    self.context
                        .debug()
                        .log_error("unexpected end of array while exiting a node")?;
                    self.peeked = None;
                }
                _ => self.skip_entry()?,
            }
        }
        self.nodes.pop_node().map(|_| ())
    }

    fn enter_array(&mut self) -> Result<Option<i64>> {
        if self.expect(EntryType::StartOfArray, "StartOfArray")?.is_none() {
            return Ok(None);
        }
        let Some(bytes) = self.take::<8>()? else {
            return Ok(None);
        };
        self.nodes.push_array();
        Ok(Some(LittleEndian::read_i64(&bytes)))
    }

    fn exit_array(&mut self) -> Result<()> {
        loop {
            let (entry, _) = self.peek_entry()?;
            match entry {
                EntryType::EndOfArray => {
                    self.peeked = None;
                    break;
                }
                EntryType::EndOfStream => break,
                EntryType::EndOfNode => {
                    self.context
                        .debug()
                        .log_error("unexpected end of node while exiting an array")?;
                    self.peeked = None;
                }
                _ => self.skip_entry()?,
            }
        }
        self.nodes.pop_array()
    }

    fn read_primitive_array_into(&mut self, values: PrimitiveVecMut<'_>) -> Result<bool> {
        if self
            .expect(EntryType::PrimitiveArray, "PrimitiveArray")?
            .is_none()
        {
            return Ok(false);
        }
        let Some(header) = self.take::<8>()? else {
            return Ok(false);
        };
        let len = LittleEndian::read_i32(&header[0..4]);
        let bytes_per_element = LittleEndian::read_i32(&header[4..8]);
        if len < 0 || bytes_per_element <= 0 {
            self.corrupt(format!(
                "invalid primitive array header ({} x {} bytes)",
                len, bytes_per_element
            ))?;
            return Ok(false);
        }
        let kind = values.kind();
        if bytes_per_element as usize != kind.bytes_per_element() {
            self.context.debug().log_error(format!(
                "primitive array of {}-byte elements cannot be read as {}",
                bytes_per_element,
                kind.type_name()
            ))?;
            if !self
                .input
                .skip_bytes(len as u64 * bytes_per_element as u64)?
            {
                self.truncated()?;
            }
            return Ok(false);
        }
        let complete = values.visit(PrimitiveArrayDecoder {
            input: &mut self.input,
            len: len as usize,
            host: self.host,
        })?;
        if !complete {
            self.truncated()?;
        }
        Ok(complete)
    }

    fn read_null(&mut self) -> Result<bool> {
        Ok(self.expect(EntryType::Null, "Null")?.is_some())
    }

    fn read_internal_reference(&mut self) -> Result<Option<i32>> {
        if self
            .expect(EntryType::InternalReference, "InternalReference")?
            .is_none()
        {
            return Ok(None);
        }
        self.take_i32()
    }

    fn read_external_reference_by_index(&mut self) -> Result<Option<i32>> {
        if self
            .expect(EntryType::ExternalReferenceByIndex, "ExternalReferenceByIndex")?
            .is_none()
        {
            return Ok(None);
        }
        self.take_i32()
    }

    fn read_external_reference_by_guid(&mut self) -> Result<Option<Guid>> {
        if self
            .expect(EntryType::ExternalReferenceByGuid, "ExternalReferenceByGuid")?
            .is_none()
        {
            return Ok(None);
        }
        Ok(self.take::<16>()?.map(Guid::from_bytes))
    }

    fn read_external_reference_by_string(&mut self) -> Result<Option<String>> {
        if self
            .expect(EntryType::ExternalReferenceByString, "ExternalReferenceByString")?
            .is_none()
        {
            return Ok(None);
        }
        self.read_string_payload()
    }

    fn read_bool(&mut self) -> Result<Option<bool>> {
        if self.expect(EntryType::Boolean, "Boolean")?.is_none() {
            return Ok(None);
        }
        Ok(self.take::<1>()?.map(|b| b[0] != 0))
    }

    fn read_i8(&mut self) -> Result<Option<i8>> {
        self.read_integer("i8")
    }

    fn read_u8(&mut self) -> Result<Option<u8>> {
        self.read_integer("u8")
    }

    fn read_i16(&mut self) -> Result<Option<i16>> {
        self.read_integer("i16")
    }

    fn read_u16(&mut self) -> Result<Option<u16>> {
        self.read_integer("u16")
    }

    fn read_i32(&mut self) -> Result<Option<i32>> {
        self.read_integer("i32")
    }

    fn read_u32(&mut self) -> Result<Option<u32>> {
        self.read_integer("u32")
    }

    fn read_i64(&mut self) -> Result<Option<i64>> {
        self.read_integer("i64")
    }

    fn read_u64(&mut self) -> Result<Option<u64>> {
        self.read_integer("u64")
    }

    fn read_f32(&mut self) -> Result<Option<f32>> {
        Ok(self.read_number("f32")?.map(|n| match n {
            Number::Int(i) => i as f32,
            Number::Float(f) => f as f32,
            Number::Decimal(d) => d.to_f64() as f32,
        }))
    }

    fn read_f64(&mut self) -> Result<Option<f64>> {
        Ok(self.read_number("f64")?.map(|n| match n {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
            Number::Decimal(d) => d.to_f64(),
        }))
    }

    fn read_decimal(&mut self) -> Result<Option<Decimal>> {
        let decimal = match self.read_number("Decimal")? {
            None => return Ok(None),
            Some(Number::Decimal(d)) => Some(d),
            Some(Number::Float(f)) => Decimal::from_f64(f),
            Some(Number::Int(i)) => Decimal::new(i.unsigned_abs(), i < 0, 0),
        };
        if decimal.is_none() {
            self.context
                .debug()
                .log_error("number is out of range for Decimal")?;
        }
        Ok(decimal)
    }

    fn read_char(&mut self) -> Result<Option<char>> {
        let Some(tag) = self.expect(EntryType::String, "char")? else {
            return Ok(None);
        };
        if matches!(tag, B::NamedChar | B::UnnamedChar) {
            let Some(bytes) = self.take::<4>()? else {
                return Ok(None);
            };
            let scalar = LittleEndian::read_u32(&bytes);
            let c = char::from_u32(scalar);
            if c.is_none() {
                self.context
                    .debug()
                    .log_error(format!("0x{:x} is not a valid char", scalar))?;
            }
            return Ok(c);
        }
        let Some(text) = self.read_string_payload()? else {
            return Ok(None);
        };
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Some(c)),
            _ => {
                self.context
                    .debug()
                    .log_error(format!("string '{}' cannot be read as a char", text))?;
                Ok(None)
            }
        }
    }

    fn read_string(&mut self) -> Result<Option<String>> {
        let Some(tag) = self.expect(EntryType::String, "String")? else {
            return Ok(None);
        };
        if matches!(tag, B::NamedChar | B::UnnamedChar) {
            let Some(bytes) = self.take::<4>()? else {
                return Ok(None);
            };
            return Ok(Some(
                char::from_u32(LittleEndian::read_u32(&bytes))
                    .unwrap_or(char::REPLACEMENT_CHARACTER)
                    .to_string(),
            ));
        }
        self.read_string_payload()
    }

    fn read_guid(&mut self) -> Result<Option<Guid>> {
        if self.expect(EntryType::Guid, "Guid")?.is_none() {
            return Ok(None);
        }
        Ok(self.take::<16>()?.map(Guid::from_bytes))
    }

    fn skip_entry(&mut self) -> Result<()> {
        let (entry, _) = self.peek_entry()?;
        match entry {
            EntryType::EndOfNode | EntryType::EndOfArray => self
                .context
                .debug()
                .log_error(format!("cannot skip past {} at depth {}", entry, self.nodes.depth())),
            EntryType::EndOfStream => Ok(()),
            EntryType::StartOfNode => {
                if self.enter_node()?.is_some() {
                    self.exit_node()?;
                }
                Ok(())
            }
            EntryType::StartOfArray => {
                if self.enter_array()?.is_some() {
                    self.exit_array()?;
                }
                Ok(())
            }
            _ => match self.peeked.take() {
                Some(p) => self.skip_payload(p.tag),
                None => Ok(()),
            },
        }
    }

    fn current_node_name(&self) -> Option<&str> {
        self.nodes.current_node().and_then(|n| n.name.as_deref())
    }

    fn current_node_id(&self) -> i32 {
        self.nodes.current_node().map_or(-1, |n| n.id)
    }

    fn current_node_depth(&self) -> usize {
        self.nodes.depth()
    }

    fn prepare_new_serialization_session(&mut self) -> Result<()> {
        self.context.reset_session();
        self.nodes.clear();
        self.peeked = None;
        self.ended = false;
        Ok(())
    }
}
