//! JSON reader

use super::text_reader::{JsonTextReader, JsonToken};
use super::{KEY_ARRAY_LENGTH, KEY_ID, KEY_PRIMITIVE_LENGTH, KEY_TYPE};
use crate::dump::read_whole_stream;
use crate::node_stack::NodeStack;
use crate::protocol::{describe, DataReader, NodeHeader};
use crate::text;
use graphstream_core::{
    DebugContext, Decimal, EntryType, Guid, PrimitiveElement, PrimitiveVecMut, Result, TypeKey,
    VecVisitor,
};
use graphstream_session::DeserializationContext;
use std::io::{Read, Seek};

/// Upper bound on the capacity reserved from a declared array length.
const MAX_RESERVE: usize = 64 * 1024;

/// Reads the node stream from JSON text.
pub struct JsonDataReader<'a, R: Read> {
    /// Tokenized input
    tokens: JsonTextReader<R>,

    /// Session state (type ids, references, resolvers, config)
    context: &'a mut DeserializationContext,

    /// Open nodes and arrays
    nodes: NodeStack,

    /// Next token, already read from the input
    peeked: Option<JsonToken>,
}

impl<'a, R: Read> JsonDataReader<'a, R> {
    /// Create a reader over `stream`.
    pub fn new(stream: R, context: &'a mut DeserializationContext) -> Result<Self> {
        let options = context.config().binary.clone();
        options.validate()?;
        Ok(JsonDataReader {
            tokens: JsonTextReader::new(stream, options.staging_buffer_size),
            context,
            nodes: NodeStack::new(),
            peeked: None,
        })
    }

    /// Return the stream. Bytes read ahead are lost.
    pub fn into_inner(self) -> R {
        self.tokens.into_inner()
    }

    fn peek_token(&mut self) -> Result<&JsonToken> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => {
                let mut token = self.tokens.read_token()?;
                match token.name.as_deref() {
                    Some(KEY_ARRAY_LENGTH) => token.entry = EntryType::StartOfArray,
                    Some(KEY_PRIMITIVE_LENGTH) => token.entry = EntryType::PrimitiveArray,
                    _ => {}
                }
                token
            }
        };
        let token: &JsonToken = self.peeked.insert(token);
        Ok(token)
    }

    fn take_token(&mut self) -> Result<JsonToken> {
        self.peek_token()?;
        Ok(self.peeked.take().unwrap_or_default())
    }

    /// Log a mismatch and skip the offending entry unless it is a boundary.
    fn mismatch(&mut self, expected: &str) -> Result<()> {
        let (entry, name) = self.peek_entry()?;
        self.context.debug().log_warning(format!(
            "expected {} but found {} at depth {} (offset {})",
            expected,
            describe(entry, name.as_deref()),
            self.nodes.depth(),
            self.tokens.position()
        ))?;
        if !entry.is_boundary() {
            self.skip_entry()?;
        }
        Ok(())
    }

    /// Consume the next token if its kind is one of `accepted`, otherwise
    /// report a mismatch.
    fn expect(&mut self, accepted: &[EntryType], expected: &str) -> Result<Option<JsonToken>> {
        let entry = self.peek_token()?.entry;
        if !accepted.contains(&entry) {
            self.mismatch(expected)?;
            return Ok(None);
        }
        self.take_token().map(Some)
    }

    fn read_integer<T: TryFrom<i128>>(&mut self, expected: &str) -> Result<Option<T>> {
        match self.expect(&[EntryType::Integer], expected)? {
            Some(token) => text::parse_integer(self.context.debug(), &token.content, expected),
            None => Ok(None),
        }
    }

    fn read_type(&mut self, token: &JsonToken) -> Result<Option<TypeKey>> {
        let content = token.content.as_str();
        match token.entry {
            EntryType::String => match content.split_once('|') {
                Some((id, name)) => match id.parse::<i32>() {
                    Ok(id) => self.context.register_type(id, name),
                    Err(_) => {
                        self.context
                            .debug()
                            .log_error(format!("invalid type id in '{}'", content))?;
                        Ok(None)
                    }
                },
                None => {
                    self.context
                        .debug()
                        .log_error(format!("invalid type entry '{}'", content))?;
                    Ok(None)
                }
            },
            EntryType::Integer => match content.parse::<i32>() {
                Ok(id) => self.context.get_type(id),
                Err(_) => {
                    self.context
                        .debug()
                        .log_error(format!("invalid type id '{}'", content))?;
                    Ok(None)
                }
            },
            _ => {
                self.context
                    .debug()
                    .log_error(format!("invalid type entry '{}'", content))?;
                Ok(None)
            }
        }
    }

    /// Consume the `[` opening array content.
    fn open_content(&mut self) -> Result<bool> {
        let token = self.peek_token()?;
        if token.entry == EntryType::StartOfArray && token.content == "[" {
            self.peeked = None;
            return Ok(true);
        }
        let found = describe(token.entry, token.name.as_deref());
        self.context
            .debug()
            .log_error(format!("expected array content but found {}", found))?;
        Ok(false)
    }

    fn skip_primitive_content(&mut self) -> Result<()> {
        loop {
            let token = self.take_token()?;
            match token.entry {
                EntryType::EndOfArray | EntryType::EndOfStream => return Ok(()),
                _ => {}
            }
        }
    }
}

impl<'a, R: Read + Seek> JsonDataReader<'a, R> {
    /// The whole text of the stream.
    pub fn get_data_dump(&mut self) -> Result<String> {
        let bytes = read_whole_stream(self.tokens.get_mut())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

struct PrimitiveArrayParser<'r, R: Read> {
    tokens: &'r mut JsonTextReader<R>,
    debug: &'r DebugContext,
    len: Option<usize>,
}

impl<'r, R: Read> VecVisitor for PrimitiveArrayParser<'r, R> {
    type Output = Result<bool>;

    fn visit<T: PrimitiveElement>(self, values: &mut Vec<T>) -> Result<bool> {
        values.clear();
        values.reserve(self.len.unwrap_or(0).min(MAX_RESERVE));
        let mut complete = true;
        loop {
            let token = self.tokens.read_token()?;
            match token.entry {
                EntryType::EndOfArray => break,
                EntryType::EndOfStream => {
                    self.debug
                        .log_error("JSON text ended inside a primitive array")?;
                    return Ok(false);
                }
                _ => match T::parse_text(&token.content) {
                    Some(value) if complete => values.push(value),
                    Some(_) => {}
                    None => {
                        if complete {
                            self.debug.log_error(format!(
                                "cannot parse '{}' as {}",
                                token.content,
                                std::any::type_name::<T>()
                            ))?;
                        }
                        complete = false;
                    }
                },
            }
        }
        match self.len {
            Some(len) if complete && values.len() != len => {
                self.debug.log_warning(format!(
                    "primitive array declared {} elements but holds {}",
                    len,
                    values.len()
                ))?;
            }
            _ => {}
        }
        Ok(complete)
    }
}

impl<'a, R: Read> DataReader for JsonDataReader<'a, R> {
    fn context(&self) -> &DeserializationContext {
        &*self.context
    }

    fn context_mut(&mut self) -> &mut DeserializationContext {
        &mut *self.context
    }

    fn peek_entry(&mut self) -> Result<(EntryType, Option<String>)> {
        let token = self.peek_token()?;
        Ok((token.entry, token.name.clone()))
    }

    fn enter_node(&mut self) -> Result<Option<NodeHeader>> {
        let Some(start) = self.expect(&[EntryType::StartOfNode], "StartOfNode")? else {
            return Ok(None);
        };
        let mut id = -1;
        if self.peek_token()?.name.as_deref() == Some(KEY_ID) {
            let token = self.take_token()?;
            match token.content.parse::<i32>() {
                Ok(value) => id = value,
                Err(_) => self
                    .context
                    .debug()
                    .log_error(format!("invalid node id '{}'", token.content))?,
            }
        }
        let mut ty = None;
        if self.peek_token()?.name.as_deref() == Some(KEY_TYPE) {
            let token = self.take_token()?;
            ty = self.read_type(&token)?;
        }
        self.nodes.push_node(start.name.as_deref(), id, ty);
        Ok(Some(NodeHeader { id, ty }))
    }

    fn exit_node(&mut self) -> Result<()> {
        loop {
            let entry = self.peek_token()?.entry;
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
        let Some(token) = self.expect(&[EntryType::StartOfArray], "StartOfArray")? else {
            return Ok(None);
        };
        let length = if token.name.as_deref() == Some(KEY_ARRAY_LENGTH) {
            let length = match token.content.parse::<i64>() {
                Ok(length) => length,
                Err(_) => {
                    self.context
                        .debug()
                        .log_error(format!("invalid array length '{}'", token.content))?;
                    -1
                }
            };
            if !self.open_content()? {
                return Ok(None);
            }
            length
        } else {
            -1
        };
        self.nodes.push_array();
        Ok(Some(length))
    }

    fn exit_array(&mut self) -> Result<()> {
        loop {
            let entry = self.peek_token()?.entry;
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
        // outside an object body the array is bare and carries no length
        let bare = {
            let token = self.peek_token()?;
            token.entry == EntryType::StartOfArray && token.name.is_none()
        };
        let len = if bare {
            self.peeked = None;
            None
        } else {
            let Some(token) = self.expect(&[EntryType::PrimitiveArray], "PrimitiveArray")? else {
                return Ok(false);
            };
            let len = match token.content.parse::<usize>() {
                Ok(len) => len,
                Err(_) => {
                    self.context
                        .debug()
                        .log_error(format!("invalid primitive array length '{}'", token.content))?;
                    0
                }
            };
            if !self.open_content()? {
                return Ok(false);
            }
            Some(len)
        };
        values.visit(PrimitiveArrayParser {
            tokens: &mut self.tokens,
            debug: self.context.debug(),
            len,
        })
    }

    fn read_null(&mut self) -> Result<bool> {
        Ok(self.expect(&[EntryType::Null], "Null")?.is_some())
    }

    fn read_internal_reference(&mut self) -> Result<Option<i32>> {
        match self.expect(&[EntryType::InternalReference], "InternalReference")? {
            Some(token) => text::parse_integer(self.context.debug(), &token.content, "reference id"),
            None => Ok(None),
        }
    }

    fn read_external_reference_by_index(&mut self) -> Result<Option<i32>> {
        match self.expect(&[EntryType::ExternalReferenceByIndex], "ExternalReferenceByIndex")? {
            Some(token) => {
                text::parse_integer(self.context.debug(), &token.content, "reference index")
            }
            None => Ok(None),
        }
    }

    fn read_external_reference_by_guid(&mut self) -> Result<Option<Guid>> {
        match self.expect(&[EntryType::ExternalReferenceByGuid], "ExternalReferenceByGuid")? {
            Some(token) => text::parse_guid(self.context.debug(), &token.content),
            None => Ok(None),
        }
    }

    fn read_external_reference_by_string(&mut self) -> Result<Option<String>> {
        Ok(self
            .expect(&[EntryType::ExternalReferenceByString], "ExternalReferenceByString")?
            .map(|token| token.content))
    }

    fn read_bool(&mut self) -> Result<Option<bool>> {
        match self.expect(&[EntryType::Boolean], "Boolean")? {
            Some(token) => text::parse_bool(self.context.debug(), &token.content),
            None => Ok(None),
        }
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
        match self.expect(&[EntryType::FloatingPoint, EntryType::Integer], "f32")? {
            Some(token) => text::parse_f32(self.context.debug(), &token.content),
            None => Ok(None),
        }
    }

    fn read_f64(&mut self) -> Result<Option<f64>> {
        match self.expect(&[EntryType::FloatingPoint, EntryType::Integer], "f64")? {
            Some(token) => text::parse_f64(self.context.debug(), &token.content),
            None => Ok(None),
        }
    }

    fn read_decimal(&mut self) -> Result<Option<Decimal>> {
        match self.expect(&[EntryType::FloatingPoint, EntryType::Integer], "Decimal")? {
            Some(token) => text::parse_decimal(self.context.debug(), &token.content),
            None => Ok(None),
        }
    }

    fn read_char(&mut self) -> Result<Option<char>> {
        match self.expect(&[EntryType::String], "char")? {
            Some(token) => text::parse_char(self.context.debug(), &token.content),
            None => Ok(None),
        }
    }

    fn read_string(&mut self) -> Result<Option<String>> {
        Ok(self
            .expect(&[EntryType::String], "String")?
            .map(|token| token.content))
    }

    fn read_guid(&mut self) -> Result<Option<Guid>> {
        match self.expect(&[EntryType::String, EntryType::Guid], "Guid")? {
            Some(token) => text::parse_guid(self.context.debug(), &token.content),
            None => Ok(None),
        }
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
            EntryType::PrimitiveArray => {
                self.peeked = None;
                if self.open_content()? {
                    self.skip_primitive_content()?;
                }
                Ok(())
            }
            _ => {
                self.peeked = None;
                Ok(())
            }
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
        Ok(())
    }
}
