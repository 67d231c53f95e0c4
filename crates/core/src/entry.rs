//! Logical entry kinds of the node stream
//!
//! Both codecs describe what they find next in the stream with an
//! [`EntryType`]. The binary codec maps its wire tags onto these; the JSON
//! codec derives them from token shapes and reserved keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical kind of the next entry in a node stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EntryType {
    /// Unrecognized or corrupt data
    #[default]
    Invalid,
    /// String or char scalar
    String,
    /// GUID scalar
    Guid,
    /// Any integer scalar (8 to 64 bits, signed or unsigned)
    Integer,
    /// Float, double or decimal scalar
    FloatingPoint,
    /// Boolean scalar
    Boolean,
    /// Null value
    Null,
    /// Start of a reference or struct node
    StartOfNode,
    /// End of the current node
    EndOfNode,
    /// Back reference to a node already written in this session
    InternalReference,
    /// Reference resolved outside the graph by index
    ExternalReferenceByIndex,
    /// Reference resolved outside the graph by GUID
    ExternalReferenceByGuid,
    /// Reference resolved outside the graph by string id
    ExternalReferenceByString,
    /// Start of a regular array
    StartOfArray,
    /// End of the current array
    EndOfArray,
    /// Contiguous array of blittable elements
    PrimitiveArray,
    /// No more data
    EndOfStream,
}

impl EntryType {
    /// Whether this entry opens or closes a container.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            EntryType::StartOfNode
                | EntryType::EndOfNode
                | EntryType::StartOfArray
                | EntryType::EndOfArray
        )
    }

    /// Whether this entry closes a container (or the stream itself).
    pub fn is_boundary(self) -> bool {
        matches!(
            self,
            EntryType::EndOfNode | EntryType::EndOfArray | EntryType::EndOfStream
        )
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
