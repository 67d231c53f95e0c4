//! Identity-carrying object handles.

use std::any::Any;
use std::sync::Arc;

/// Type-erased handle to an object living in a graph.
///
/// Two handles denote the same object when they share an allocation, so
/// identity is the address of the `Arc` payload and never the value.
pub type ObjectHandle = Arc<dyn Any + Send + Sync>;

/// Identity key of the object behind `handle`.
pub fn object_address(handle: &ObjectHandle) -> usize {
    Arc::as_ptr(handle) as *const () as usize
}
