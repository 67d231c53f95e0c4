//! Wire format selection for the top-level entry points.

use std::fmt;

/// Format of a serialized stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataFormat {
    /// Compact little-endian binary
    #[default]
    Binary,

    /// JSON text, packed or readable per the context's config
    Json,

    /// In-memory node list; only reachable through
    /// [`serialize_value_to_nodes`](crate::serialize_value_to_nodes) and
    /// [`deserialize_value_from_nodes`](crate::deserialize_value_from_nodes)
    Nodes,
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataFormat::Binary => "binary",
            DataFormat::Json => "json",
            DataFormat::Nodes => "nodes",
        };
        f.write_str(name)
    }
}
