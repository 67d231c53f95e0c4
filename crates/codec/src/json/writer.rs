//! JSON writer

use super::{
    push_quoted, push_quoted_text, KEY_ARRAY_CONTENT, KEY_ARRAY_LENGTH, KEY_ID, KEY_PRIMITIVE_CONTENT,
    KEY_PRIMITIVE_LENGTH, KEY_TYPE, PREFIX_EXTERNAL_GUID, PREFIX_EXTERNAL_INDEX,
    PREFIX_EXTERNAL_STRING, PREFIX_INTERNAL,
};
use crate::dump::read_whole_stream;
use crate::node_stack::NodeStack;
use crate::protocol::DataWriter;
use crate::staging::StagingWriter;
use graphstream_core::{
    Decimal, Guid, PrimitiveElement, PrimitiveSlice, Result, SliceVisitor, TypeKey,
};
use graphstream_session::SerializationContext;
use std::fmt::Write as _;
use std::io::{Read, Seek, Write};

/// Writes the node stream as JSON text.
///
/// Packed by default; `config.json.format_as_readable` adds newlines and four
/// spaces of indentation per open node or array.
pub struct JsonDataWriter<'a, W: Write> {
    /// Staged output
    out: StagingWriter<W>,

    /// Session state (type ids, references, resolvers, config)
    context: &'a mut SerializationContext,

    /// Open nodes and arrays
    nodes: NodeStack,

    /// Reused line buffer
    line: String,

    /// Nothing written yet in this session
    just_started: bool,

    /// The next entry opens a container's content and takes no comma
    force_no_separator_next_line: bool,

    /// Newlines and indentation
    readable: bool,

    /// Type ids after the first occurrence of a type
    optimize_types: bool,
}

impl<'a, W: Write> JsonDataWriter<'a, W> {
    /// Create a writer over `stream`.
    pub fn new(stream: W, context: &'a mut SerializationContext) -> Result<Self> {
        let config = context.config();
        config.binary.validate()?;
        let capacity = config.binary.staging_buffer_size;
        let readable = config.json.format_as_readable;
        let optimize_types = config.json.enable_type_optimization;
        Ok(JsonDataWriter {
            out: StagingWriter::new(stream, capacity),
            context,
            nodes: NodeStack::new(),
            line: String::new(),
            just_started: true,
            force_no_separator_next_line: false,
            readable,
            optimize_types,
        })
    }

    /// The underlying stream. Staged text may not have reached it yet.
    pub fn get_ref(&self) -> &W {
        self.out.get_ref()
    }

    /// Flush and return the stream.
    pub fn into_inner(self) -> Result<W> {
        self.out.into_inner()
    }

    fn start_new_line(&mut self, line: &mut String, no_comma: bool) {
        if self.just_started {
            self.just_started = false;
            return;
        }
        if !no_comma && !self.force_no_separator_next_line {
            line.push(',');
        }
        self.force_no_separator_next_line = false;
        if self.readable {
            line.push('\n');
            for _ in 0..self.nodes.depth() {
                line.push_str("    ");
            }
        }
    }

    /// Write one `"name": contents` entry (or bare contents when unnamed).
    fn write_entry(&mut self, name: Option<&str>, contents: impl FnOnce(&mut String)) -> Result<()> {
        let mut line = std::mem::take(&mut self.line);
        line.clear();
        self.start_new_line(&mut line, false);
        if let Some(name) = name {
            push_quoted(&mut line, name);
            line.push(':');
            if self.readable {
                line.push(' ');
            }
        }
        contents(&mut line);
        let result = self.out.put_chunked(line.as_bytes());
        self.line = line;
        result
    }

    fn write_literal<T: PrimitiveElement>(&mut self, name: Option<&str>, value: T) -> Result<()> {
        self.write_entry(name, |line| value.write_text(line))
    }

    fn write_quoted(&mut self, name: Option<&str>, value: &str) -> Result<()> {
        self.write_entry(name, |line| push_quoted(line, value))
    }

    /// Whether entries currently land in an object body, where arrays are
    /// written as `$rlength`/`$plength` members. At the root and inside an
    /// array they are bare JSON arrays instead.
    fn in_node_body(&self) -> bool {
        self.nodes.depth() > 0 && !self.nodes.in_array()
    }

    fn close(&mut self, bracket: char) -> Result<()> {
        let mut line = std::mem::take(&mut self.line);
        line.clear();
        self.start_new_line(&mut line, true);
        line.push(bracket);
        let result = self.out.put_chunked(line.as_bytes());
        self.line = line;
        result
    }

    fn open_node(&mut self, name: Option<&str>, ty: Option<&TypeKey>, id: i32) -> Result<()> {
        self.write_entry(name, |line| line.push('{'))?;
        self.nodes.push_node(name, id, ty.copied());
        self.force_no_separator_next_line = true;
        if id >= 0 {
            self.write_entry(Some(KEY_ID), |line| {
                let _ = write!(line, "{}", id);
            })?;
        }
        if let Some(ty) = ty {
            let (is_new, type_id) = self.context.try_register_type(ty);
            if is_new || !self.optimize_types {
                let name = self.context.binder().bind_to_name(ty);
                self.write_quoted(Some(KEY_TYPE), &format!("{}|{}", type_id, name))?;
            } else {
                self.write_entry(Some(KEY_TYPE), |line| {
                    let _ = write!(line, "{}", type_id);
                })?;
            }
        }
        Ok(())
    }
}

impl<'a, W: Write + Read + Seek> JsonDataWriter<'a, W> {
    /// Everything written so far.
    pub fn get_data_dump(&mut self) -> Result<String> {
        self.out.flush()?;
        let bytes = read_whole_stream(self.out.get_mut())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

struct PrimitiveArrayText<'w, W: Write> {
    out: &'w mut StagingWriter<W>,
    line: &'w mut String,
    quoted: bool,
}

impl<'w, W: Write> SliceVisitor for PrimitiveArrayText<'w, W> {
    type Output = Result<()>;

    fn visit<T: PrimitiveElement>(self, values: &[T]) -> Result<()> {
        let limit = self.out.capacity();
        let mut element = String::new();
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.line.push(',');
            }
            if self.quoted {
                element.clear();
                value.write_text(&mut element);
                push_quoted(self.line, &element);
            } else {
                value.write_text(self.line);
            }
            if self.line.len() >= limit {
                self.out.put_chunked(self.line.as_bytes())?;
                self.line.clear();
            }
        }
        self.out.put_chunked(self.line.as_bytes())?;
        self.line.clear();
        Ok(())
    }
}

impl<'a, W: Write> DataWriter for JsonDataWriter<'a, W> {
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
        self.open_node(name, ty, id)
    }

    fn begin_struct_node(&mut self, name: Option<&str>, ty: Option<&TypeKey>) -> Result<()> {
        self.open_node(name, ty, -1)
    }

    fn end_node(&mut self, name: Option<&str>) -> Result<()> {
        self.nodes.pop_node_named(name)?;
        self.close('}')
    }

    fn begin_array_node(&mut self, length: i64) -> Result<()> {
        if self.in_node_body() {
            self.write_entry(Some(KEY_ARRAY_LENGTH), |line| {
                let _ = write!(line, "{}", length);
            })?;
            self.write_entry(Some(KEY_ARRAY_CONTENT), |line| line.push('['))?;
        } else {
            self.write_entry(None, |line| line.push('['))?;
        }
        self.nodes.push_array();
        self.force_no_separator_next_line = true;
        Ok(())
    }

    fn end_array_node(&mut self) -> Result<()> {
        self.nodes.pop_array()?;
        self.close(']')
    }

    fn write_primitive_array(&mut self, values: PrimitiveSlice<'_>) -> Result<()> {
        let len = values.len();
        if self.in_node_body() {
            self.write_entry(Some(KEY_PRIMITIVE_LENGTH), |line| {
                let _ = write!(line, "{}", len);
            })?;
            self.write_entry(Some(KEY_PRIMITIVE_CONTENT), |line| line.push('['))?;
        } else {
            self.write_entry(None, |line| line.push('['))?;
        }
        let mut line = std::mem::take(&mut self.line);
        line.clear();
        let result = values.visit(PrimitiveArrayText {
            out: &mut self.out,
            line: &mut line,
            quoted: values.kind().is_quoted(),
        });
        self.line = line;
        result?;
        self.out.put_u8(b']')
    }

    fn write_null(&mut self, name: Option<&str>) -> Result<()> {
        self.write_entry(name, |line| line.push_str("null"))
    }

    fn write_internal_reference(&mut self, name: Option<&str>, id: i32) -> Result<()> {
        self.write_entry(name, |line| {
            let _ = write!(line, "\"{}{}\"", PREFIX_INTERNAL, id);
        })
    }

    fn write_external_reference_by_index(&mut self, name: Option<&str>, index: i32) -> Result<()> {
        self.write_entry(name, |line| {
            let _ = write!(line, "\"{}{}\"", PREFIX_EXTERNAL_INDEX, index);
        })
    }

    fn write_external_reference_by_guid(&mut self, name: Option<&str>, guid: Guid) -> Result<()> {
        self.write_entry(name, |line| {
            let _ = write!(line, "\"{}{}\"", PREFIX_EXTERNAL_GUID, guid.hyphenated());
        })
    }

    fn write_external_reference_by_string(&mut self, name: Option<&str>, id: &str) -> Result<()> {
        self.write_quoted(name, &format!("{}{}", PREFIX_EXTERNAL_STRING, id))
    }

    fn write_bool(&mut self, name: Option<&str>, value: bool) -> Result<()> {
        self.write_literal(name, value)
    }

    fn write_i8(&mut self, name: Option<&str>, value: i8) -> Result<()> {
        self.write_literal(name, value)
    }

    fn write_u8(&mut self, name: Option<&str>, value: u8) -> Result<()> {
        self.write_literal(name, value)
    }

    fn write_i16(&mut self, name: Option<&str>, value: i16) -> Result<()> {
        self.write_literal(name, value)
    }

    fn write_u16(&mut self, name: Option<&str>, value: u16) -> Result<()> {
        self.write_literal(name, value)
    }

    fn write_i32(&mut self, name: Option<&str>, value: i32) -> Result<()> {
        self.write_literal(name, value)
    }

    fn write_u32(&mut self, name: Option<&str>, value: u32) -> Result<()> {
        self.write_literal(name, value)
    }

    fn write_i64(&mut self, name: Option<&str>, value: i64) -> Result<()> {
        self.write_literal(name, value)
    }

    fn write_u64(&mut self, name: Option<&str>, value: u64) -> Result<()> {
        self.write_literal(name, value)
    }

    fn write_f32(&mut self, name: Option<&str>, value: f32) -> Result<()> {
        self.write_literal(name, value)
    }

    fn write_f64(&mut self, name: Option<&str>, value: f64) -> Result<()> {
        self.write_literal(name, value)
    }

    fn write_decimal(&mut self, name: Option<&str>, value: Decimal) -> Result<()> {
        self.write_literal(name, value)
    }

    fn write_char(&mut self, name: Option<&str>, value: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.write_quoted(name, value.encode_utf8(&mut buf))
    }

    fn write_string(&mut self, name: Option<&str>, value: &str) -> Result<()> {
        self.write_entry(name, |line| push_quoted_text(line, value))
    }

    fn write_guid(&mut self, name: Option<&str>, value: Guid) -> Result<()> {
        self.write_entry(name, |line| {
            let _ = write!(line, "\"{}\"", value.hyphenated());
        })
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()
    }

    fn prepare_new_serialization_session(&mut self) -> Result<()> {
        self.context.reset_session();
        self.nodes.clear();
        self.just_started = true;
        self.force_no_separator_next_line = false;
        Ok(())
    }
}
