//! Node list writer

use super::SerializationNode;
use crate::node_stack::NodeStack;
use crate::protocol::DataWriter;
use crate::text::element_entry_type;
use graphstream_core::{
    Decimal, EntryType, Guid, PrimitiveElement, PrimitiveSlice, Result, SliceVisitor, TypeKey,
};
use graphstream_session::SerializationContext;

/// Writes the node stream into a `Vec<SerializationNode>`.
pub struct SerializationNodeDataWriter<'a> {
    nodes: Vec<SerializationNode>,
    context: &'a mut SerializationContext,
    stack: NodeStack,
}

impl<'a> SerializationNodeDataWriter<'a> {
    /// Create an empty writer.
    pub fn new(context: &'a mut SerializationContext) -> Self {
        SerializationNodeDataWriter {
            nodes: Vec::new(),
            context,
            stack: NodeStack::new(),
        }
    }

    /// Nodes written so far.
    pub fn nodes(&self) -> &[SerializationNode] {
        &self.nodes
    }

    /// Take the written nodes.
    pub fn into_nodes(self) -> Vec<SerializationNode> {
        self.nodes
    }

    fn push(&mut self, name: Option<&str>, entry: EntryType, data: impl Into<String>) -> Result<()> {
        self.nodes.push(SerializationNode::new(name, entry, data));
        Ok(())
    }

    fn push_text<T: PrimitiveElement>(&mut self, name: Option<&str>, entry: EntryType, value: T) -> Result<()> {
        let mut data = String::new();
        value.write_text(&mut data);
        self.push(name, entry, data)
    }

    fn type_name(&self, ty: Option<&TypeKey>) -> String {
        ty.map(|ty| self.context.binder().bind_to_name(ty))
            .unwrap_or_default()
    }
}

struct ElementNodes<'w> {
    nodes: &'w mut Vec<SerializationNode>,
    entry: EntryType,
}

impl<'w> SliceVisitor for ElementNodes<'w> {
    type Output = ();

    fn visit<T: PrimitiveElement>(self, values: &[T]) {
        self.nodes.reserve(values.len());
        for value in values {
            let mut data = String::new();
            value.write_text(&mut data);
            self.nodes.push(SerializationNode::new(None, self.entry, data));
        }
    }
}

impl<'a> DataWriter for SerializationNodeDataWriter<'a> {
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
        let data = format!("{}|{}", id, self.type_name(ty));
        self.stack.push_node(name, id, ty.copied());
        self.push(name, EntryType::StartOfNode, data)
    }

    fn begin_struct_node(&mut self, name: Option<&str>, ty: Option<&TypeKey>) -> Result<()> {
        let data = self.type_name(ty);
        self.stack.push_node(name, -1, ty.copied());
        self.push(name, EntryType::StartOfNode, data)
    }

    fn end_node(&mut self, name: Option<&str>) -> Result<()> {
        self.stack.pop_node_named(name)?;
        self.push(None, EntryType::EndOfNode, "")
    }

    fn begin_array_node(&mut self, length: i64) -> Result<()> {
        self.stack.push_array();
        self.push(None, EntryType::StartOfArray, length.to_string())
    }

    fn end_array_node(&mut self) -> Result<()> {
        self.stack.pop_array()?;
        self.push(None, EntryType::EndOfArray, "")
    }

    fn write_primitive_array(&mut self, values: PrimitiveSlice<'_>) -> Result<()> {
        self.push(None, EntryType::PrimitiveArray, values.len().to_string())?;
        values.visit(ElementNodes {
            nodes: &mut self.nodes,
            entry: element_entry_type(values.kind()),
        });
        self.push(None, EntryType::EndOfArray, "")
    }

    fn write_null(&mut self, name: Option<&str>) -> Result<()> {
        self.push(name, EntryType::Null, "")
    }

    fn write_internal_reference(&mut self, name: Option<&str>, id: i32) -> Result<()> {
        self.push(name, EntryType::InternalReference, id.to_string())
    }

    fn write_external_reference_by_index(&mut self, name: Option<&str>, index: i32) -> Result<()> {
        self.push(name, EntryType::ExternalReferenceByIndex, index.to_string())
    }

    fn write_external_reference_by_guid(&mut self, name: Option<&str>, guid: Guid) -> Result<()> {
        self.push_text(name, EntryType::ExternalReferenceByGuid, guid)
    }

    fn write_external_reference_by_string(&mut self, name: Option<&str>, id: &str) -> Result<()> {
        self.push(name, EntryType::ExternalReferenceByString, id)
    }

    fn write_bool(&mut self, name: Option<&str>, value: bool) -> Result<()> {
        self.push_text(name, EntryType::Boolean, value)
    }

    fn write_i8(&mut self, name: Option<&str>, value: i8) -> Result<()> {
        self.push_text(name, EntryType::Integer, value)
    }

    fn write_u8(&mut self, name: Option<&str>, value: u8) -> Result<()> {
        self.push_text(name, EntryType::Integer, value)
    }

    fn write_i16(&mut self, name: Option<&str>, value: i16) -> Result<()> {
        self.push_text(name, EntryType::Integer, value)
    }

    fn write_u16(&mut self, name: Option<&str>, value: u16) -> Result<()> {
        self.push_text(name, EntryType::Integer, value)
    }

    fn write_i32(&mut self, name: Option<&str>, value: i32) -> Result<()> {
        self.push_text(name, EntryType::Integer, value)
    }

    fn write_u32(&mut self, name: Option<&str>, value: u32) -> Result<()> {
        self.push_text(name, EntryType::Integer, value)
    }

    fn write_i64(&mut self, name: Option<&str>, value: i64) -> Result<()> {
        self.push_text(name, EntryType::Integer, value)
    }

    fn write_u64(&mut self, name: Option<&str>, value: u64) -> Result<()> {
        self.push_text(name, EntryType::Integer, value)
    }

    fn write_f32(&mut self, name: Option<&str>, value: f32) -> Result<()> {
        self.push_text(name, EntryType::FloatingPoint, value)
    }

    fn write_f64(&mut self, name: Option<&str>, value: f64) -> Result<()> {
        self.push_text(name, EntryType::FloatingPoint, value)
    }

    fn write_decimal(&mut self, name: Option<&str>, value: Decimal) -> Result<()> {
        self.push_text(name, EntryType::FloatingPoint, value)
    }

    fn write_char(&mut self, name: Option<&str>, value: char) -> Result<()> {
        self.push_text(name, EntryType::String, value)
    }

    fn write_string(&mut self, name: Option<&str>, value: &str) -> Result<()> {
        self.push(name, EntryType::String, value)
    }

    fn write_guid(&mut self, name: Option<&str>, value: Guid) -> Result<()> {
        self.push_text(name, EntryType::Guid, value)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn prepare_new_serialization_session(&mut self) -> Result<()> {
        self.context.reset_session();
        self.stack.clear();
        Ok(())
    }
}
