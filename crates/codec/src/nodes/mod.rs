//! In-memory node format
//!
//! The stream as a flat list of [`SerializationNode`]s, one per entry:
//!
//! | Entry | `data` |
//! |---|---|
//! | reference node | `"<id>\|<type name>"` |
//! | struct node | type name, or empty |
//! | `StartOfArray` | declared length |
//! | `PrimitiveArray` | length, followed by one unnamed node per element and an `EndOfArray` |
//! | scalars | textual form, strings unescaped |
//! | references | id, index, GUID or string id |
//!
//! Type names are written in full every time; there is no id table.

mod reader;
mod writer;

pub use reader::SerializationNodeDataReader;
pub use writer::SerializationNodeDataWriter;

use graphstream_core::EntryType;
use serde::{Deserialize, Serialize};

/// One entry of the in-memory node format.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SerializationNode {
    /// Entry name, `None` for array elements and closing entries
    pub name: Option<String>,

    /// Logical entry kind
    pub entry: EntryType,

    /// Textual payload
    pub data: String,
}

impl SerializationNode {
    /// Create a node.
    pub fn new(name: Option<&str>, entry: EntryType, data: impl Into<String>) -> Self {
        SerializationNode {
            name: name.map(str::to_string),
            entry,
            data: data.into(),
        }
    }
}
