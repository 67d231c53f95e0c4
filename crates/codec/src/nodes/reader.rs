//! Node list reader

use super::SerializationNode;
use crate::node_stack::NodeStack;
use crate::protocol::{describe, DataReader, NodeHeader};
use crate::text;
use graphstream_core::{
    DebugContext, Decimal, EntryType, Guid, PrimitiveElement, PrimitiveVecMut, Result, TypeKey,
    VecVisitor,
};
use graphstream_session::DeserializationContext;

/// Reads the node stream from a slice of [`SerializationNode`]s.
pub struct SerializationNodeDataReader<'a> {
    nodes: &'a [SerializationNode],
    index: usize,
    context: &'a mut DeserializationContext,
    stack: NodeStack,
}

impl<'a> SerializationNodeDataReader<'a> {
    /// Create a reader over `nodes`.
    pub fn new(nodes: &'a [SerializationNode], context: &'a mut DeserializationContext) -> Self {
        SerializationNodeDataReader {
            nodes,
            index: 0,
            context,
            stack: NodeStack::new(),
        }
    }

    /// Index of the next node.
    pub fn position(&self) -> usize {
        self.index
    }

    fn current(&self) -> Option<&'a SerializationNode> {
        self.nodes.get(self.index)
    }

    fn current_entry(&self) -> EntryType {
        self.current().map_or(EntryType::EndOfStream, |n| n.entry)
    }

    fn mismatch(&mut self, expected: &str) -> Result<()> {
        let (entry, name) = self.peek_entry()?;
        self.context.debug().log_warning(format!(
            "expected {} but found {} at node {}",
            expected,
            describe(entry, name.as_deref()),
            self.index
        ))?;
        if !entry.is_boundary() {
            self.skip_entry()?;
        }
        Ok(())
    }

    fn expect(&mut self, accepted: &[EntryType], expected: &str) -> Result<Option<&'a SerializationNode>> {
        let Some(node) = self.current() else {
            self.mismatch(expected)?;
            return Ok(None);
        };
        if !accepted.contains(&node.entry) {
            self.mismatch(expected)?;
            return Ok(None);
        }
        self.index += 1;
        Ok(Some(node))
    }

    fn read_integer<T: TryFrom<i128>>(&mut self, expected: &str) -> Result<Option<T>> {
        match self.expect(&[EntryType::Integer], expected)? {
            Some(node) => text::parse_integer(self.context.debug(), &node.data, expected),
            None => Ok(None),
        }
    }

    fn bind_type(&self, name: &str) -> Result<Option<TypeKey>> {
        if name.is_empty() {
            return Ok(None);
        }
        let ty = self.context.binder().bind_to_type(name);
        if ty.is_none() {
            self.context
                .debug()
                .log_warning(format!("could not bind type name '{}'", name))?;
        }
        Ok(ty)
    }
}

struct ElementParser<'r> {
    elements: &'r [SerializationNode],
    debug: &'r DebugContext,
}

impl<'r> VecVisitor for ElementParser<'r> {
    type Output = Result<bool>;

    fn visit<T: PrimitiveElement>(self, values: &mut Vec<T>) -> Result<bool> {
        values.clear();
        values.reserve(self.elements.len());
        for element in self.elements {
            match T::parse_text(&element.data) {
                Some(value) => values.push(value),
                None => {
                    self.debug.log_error(format!(
                        "cannot parse '{}' as {}",
                        element.data,
                        std::any::type_name::<T>()
                    ))?;
                    values.clear();
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}

impl<'a> DataReader for SerializationNodeDataReader<'a> {
    fn context(&self) -> &DeserializationContext {
        &*self.context
    }

    fn context_mut(&mut self) -> &mut DeserializationContext {
        &mut *self.context
    }

    fn peek_entry(&mut self) -> Result<(EntryType, Option<String>)> {
        Ok(match self.current() {
            Some(node) => (node.entry, node.name.clone()),
            None => (EntryType::EndOfStream, None),
        })
    }

    fn enter_node(&mut self) -> Result<Option<NodeHeader>> {
        let Some(node) = self.expect(&[EntryType::StartOfNode], "StartOfNode")? else {
            return Ok(None);
        };
        let (id, type_name) = match node.data.split_once('|') {
            Some((id, type_name)) => match id.parse::<i32>() {
                Ok(id) => (id, type_name),
                Err(_) => {
                    self.context
                        .debug()
                        .log_error(format!("invalid node header '{}'", node.data))?;
                    (-1, type_name)
                }
            },
            None => (-1, node.data.as_str()),
        };
        let ty = self.bind_type(type_name)?;
        self.stack.push_node(node.name.as_deref(), id, ty);
        Ok(Some(NodeHeader { id, ty }))
    }

    fn exit_node(&mut self) -> Result<()> {
        loop {
            match self.current_entry() {
                EntryType::EndOfNode => {
                    self.index += 1;
                    break;
                }
                EntryType::EndOfStream => break,
                EntryType::EndOfArray => {
                    self.context
                        .debug()
                        .log_error("unexpected end of array while exiting a node")?;
                    self.index += 1;
                }
                _ => self.skip_entry()?,
            }
        }
        self.stack.pop_node().map(|_| ())
    }

    fn enter_array(&mut self) -> Result<Option<i64>> {
        let Some(node) = self.expect(&[EntryType::StartOfArray], "StartOfArray")? else {
            return Ok(None);
        };
        let length = match node.data.parse::<i64>() {
            Ok(length) => length,
            Err(_) => {
                self.context
                    .debug()
                    .log_error(format!("invalid array length '{}'", node.data))?;
                -1
            }
        };
        self.stack.push_array();
        Ok(Some(length))
    }

    fn exit_array(&mut self) -> Result<()> {
        loop {
            match self.current_entry() {
                EntryType::EndOfArray => {
                    self.index += 1;
                    break;
                }
                EntryType::EndOfStream => break,
                EntryType::EndOfNode => {
                    self.context
                        .debug()
                        .log_error("unexpected end of node while exiting an array")?;
                    self.index += 1;
                }
                _ => self.skip_entry()?,
            }
        }
        self.stack.pop_array()
    }

    fn read_primitive_array_into(&mut self, values: PrimitiveVecMut<'_>) -> Result<bool> {
        let Some(header) = self.expect(&[EntryType::PrimitiveArray], "PrimitiveArray")? else {
            return Ok(false);
        };
        let nodes = self.nodes;
        let start = self.index;
        let end = nodes[start..]
            .iter()
            .position(|n| n.entry == EntryType::EndOfArray)
            .map_or(nodes.len(), |offset| start + offset);
        self.index = (end + 1).min(nodes.len());
        let elements = &nodes[start..end];
        if header.data.parse::<usize>().ok() != Some(elements.len()) {
            self.context.debug().log_warning(format!(
                "primitive array declared '{}' elements but holds {}",
                header.data,
                elements.len()
            ))?;
        }
        values.visit(ElementParser {
            elements,
            debug: self.context.debug(),
        })
    }

    fn read_null(&mut self) -> Result<bool> {
        Ok(self.expect(&[EntryType::Null], "Null")?.is_some())
    }

    fn read_internal_reference(&mut self) -> Result<Option<i32>> {
        match self.expect(&[EntryType::InternalReference], "InternalReference")? {
            Some(node) => text::parse_integer(self.context.debug(), &node.data, "reference id"),
            None => Ok(None),
        }
    }

    fn read_external_reference_by_index(&mut self) -> Result<Option<i32>> {
        match self.expect(&[EntryType::ExternalReferenceByIndex], "ExternalReferenceByIndex")? {
            Some(node) => text::parse_integer(self.context.debug(), &node.data, "reference index"),
            None => Ok(None),
        }
    }

    fn read_external_reference_by_guid(&mut self) -> Result<Option<Guid>> {
        match self.expect(&[EntryType::ExternalReferenceByGuid], "ExternalReferenceByGuid")? {
            Some(node) => text::parse_guid(self.context.debug(), &node.data),
            None => Ok(None),
        }
    }

    fn read_external_reference_by_string(&mut self) -> Result<Option<String>> {
        Ok(self
            .expect(&[EntryType::ExternalReferenceByString], "ExternalReferenceByString")?
            .map(|node| node.data.clone()))
    }

    fn read_bool(&mut self) -> Result<Option<bool>> {
        match self.expect(&[EntryType::Boolean], "Boolean")? {
            Some(node) => text::parse_bool(self.context.debug(), &node.data),
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
            Some(node) => text::parse_f32(self.context.debug(), &node.data),
            None => Ok(None),
        }
    }

    fn read_f64(&mut self) -> Result<Option<f64>> {
        match self.expect(&[EntryType::FloatingPoint, EntryType::Integer], "f64")? {
            Some(node) => text::parse_f64(self.context.debug(), &node.data),
            None => Ok(None),
        }
    }

    fn read_decimal(&mut self) -> Result<Option<Decimal>> {
        match self.expect(&[EntryType::FloatingPoint, EntryType::Integer], "Decimal")? {
            Some(node) => text::parse_decimal(self.context.debug(), &node.data),
            None => Ok(None),
        }
    }

    fn read_char(&mut self) -> Result<Option<char>> {
        match self.expect(&[EntryType::String], "char")? {
            Some(node) => text::parse_char(self.context.debug(), &node.data),
            None => Ok(None),
        }
    }

    fn read_string(&mut self) -> Result<Option<String>> {
        Ok(self
            .expect(&[EntryType::String], "String")?
            .map(|node| node.data.clone()))
    }

    fn read_guid(&mut self) -> Result<Option<Guid>> {
        match self.expect(&[EntryType::Guid, EntryType::String], "Guid")? {
            Some(node) => text::parse_guid(self.context.debug(), &node.data),
            None => Ok(None),
        }
    }

    fn skip_entry(&mut self) -> Result<()> {
        let entry = self.current_entry();
        match entry {
            EntryType::EndOfNode | EntryType::EndOfArray => self
                .context
                .debug()
                .log_error(format!("cannot skip past {} at node {}", entry, self.index)),
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
                self.index += 1;
                while self.current_entry() != EntryType::EndOfStream {
                    let closed = self.current_entry() == EntryType::EndOfArray;
                    self.index += 1;
                    if closed {
                        break;
                    }
                }
                Ok(())
            }
            _ => {
                self.index += 1;
                Ok(())
            }
        }
    }

    fn current_node_name(&self) -> Option<&str> {
        self.stack.current_node().and_then(|n| n.name.as_deref())
    }

    fn current_node_id(&self) -> i32 {
        self.stack.current_node().map_or(-1, |n| n.id)
    }

    fn current_node_depth(&self) -> usize {
        self.stack.depth()
    }

    fn prepare_new_serialization_session(&mut self) -> Result<()> {
        self.context.reset_session();
        self.stack.clear();
        Ok(())
    }
}
