//! Begin/End bookkeeping
//!
//! Every codec tracks the nodes and arrays it has opened. Writers use the
//! stack to verify that `end_node` closes the node that is actually open;
//! readers use it to answer "where am I" and to refuse exits that were never
//! entered.

use graphstream_core::{Error, Result, TypeKey};
use smallvec::SmallVec;

/// One open node or array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// Member name the node was opened under
    pub name: Option<String>,
    /// Internal reference id, -1 for struct nodes and arrays
    pub id: i32,
    /// Type metadata carried by the node
    pub ty: Option<TypeKey>,
    /// Whether this entry is an array rather than a node
    pub is_array: bool,
}

/// Stack of open nodes and arrays.
#[derive(Debug, Default)]
pub struct NodeStack {
    entries: SmallVec<[NodeInfo; 16]>,
}

impl NodeStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a node.
    pub fn push_node(&mut self, name: Option<&str>, id: i32, ty: Option<TypeKey>) {
        self.entries.push(NodeInfo {
            name: name.map(str::to_string),
            id,
            ty,
            is_array: false,
        });
    }

    /// Open an array.
    pub fn push_array(&mut self) {
        self.entries.push(NodeInfo {
            name: None,
            id: -1,
            ty: None,
            is_array: true,
        });
    }

    /// Close the current node, checking its name.
    pub fn pop_node_named(&mut self, name: Option<&str>) -> Result<NodeInfo> {
        match self.entries.last() {
            Some(top) if !top.is_array && top.name.as_deref() == name => self.pop_node(),
            Some(top) if top.is_array => Err(Error::Protocol(format!(
                "end_node({:?}) called while an array is open",
                name
            ))),
            Some(top) => Err(Error::Protocol(format!(
                "end_node({:?}) does not match open node {:?}",
                name, top.name
            ))),
            None => Err(Error::Protocol(format!(
                "end_node({:?}) called with no open node",
                name
            ))),
        }
    }

    /// Close the current node.
    pub fn pop_node(&mut self) -> Result<NodeInfo> {
        match self.entries.pop() {
            Some(top) if !top.is_array => Ok(top),
            Some(top) => {
                self.entries.push(top);
                Err(Error::Protocol(
                    "node exit called while an array is open".to_string(),
                ))
            }
            None => Err(Error::Protocol(
                "node exit called with no open node".to_string(),
            )),
        }
    }

    /// Close the current array.
    pub fn pop_array(&mut self) -> Result<()> {
        match self.entries.pop() {
            Some(top) if top.is_array => Ok(()),
            Some(top) => {
                let name = top.name.clone();
                self.entries.push(top);
                Err(Error::Protocol(format!(
                    "array exit called while node {:?} is open",
                    name
                )))
            }
            None => Err(Error::Protocol(
                "array exit called with no open array".to_string(),
            )),
        }
    }

    /// Innermost open node or array.
    pub fn current(&self) -> Option<&NodeInfo> {
        self.entries.last()
    }

    /// Innermost open node, skipping arrays.
    pub fn current_node(&self) -> Option<&NodeInfo> {
        self.entries.iter().rev().find(|e| !e.is_array)
    }

    /// Whether the innermost open entry is an array.
    pub fn in_array(&self) -> bool {
        self.entries.last().map_or(false, |e| e.is_array)
    }

    /// Number of open nodes and arrays.
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Drop every open entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
