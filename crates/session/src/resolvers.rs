//! External reference resolvers
//!
//! Some objects in a graph belong to the host rather than to the data: a
//! shared texture, a scene entity, a database row. Writing them inline
//! would duplicate them; resolvers instead map them to a stable key on
//! write and back to the live object on read.
//!
//! Three key kinds exist: index, GUID and string. GUID and string resolvers
//! can be chained through `next_resolver`; the first resolver in the chain
//! that accepts an object wins.

use graphstream_core::{object_address, Guid, ObjectHandle};
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::any::{Any, TypeId};

/// Resolves objects to and from integer indices.
pub trait ExternalIndexReferenceResolver: Send + Sync {
    /// Index for `value`, `None` if this resolver does not handle it.
    fn can_reference(&self, value: &ObjectHandle) -> Option<i32>;

    /// Object for `index`, `None` if unknown.
    fn try_resolve_reference(&self, index: i32) -> Option<ObjectHandle>;
}

/// Resolves objects to and from GUIDs.
pub trait ExternalGuidReferenceResolver: Send + Sync {
    /// GUID for `value`, `None` if this resolver does not handle it.
    fn can_reference(&self, value: &ObjectHandle) -> Option<Guid>;

    /// Object for `guid`, `None` if unknown.
    fn try_resolve_reference(&self, guid: &Guid) -> Option<ObjectHandle>;

    /// Next resolver in the chain.
    fn next_resolver(&self) -> Option<&dyn ExternalGuidReferenceResolver> {
        None
    }
}

/// Resolves objects to and from string ids.
pub trait ExternalStringReferenceResolver: Send + Sync {
    /// String id for `value`, `None` if this resolver does not handle it.
    fn can_reference(&self, value: &ObjectHandle) -> Option<String>;

    /// Object for `id`, `None` if unknown.
    fn try_resolve_reference(&self, id: &str) -> Option<ObjectHandle>;

    /// Next resolver in the chain.
    fn next_resolver(&self) -> Option<&dyn ExternalStringReferenceResolver> {
        None
    }
}

#[derive(Default)]
struct IndexTable {
    objects: Vec<ObjectHandle>,
    indices: FxHashMap<usize, i32>,
}

impl IndexTable {
    fn index_of(&mut self, value: &ObjectHandle) -> i32 {
        let address = object_address(value);
        if let Some(&index) = self.indices.get(&address) {
            return index;
        }
        let index = self.objects.len() as i32;
        self.objects.push(value.clone());
        self.indices.insert(address, index);
        index
    }
}

/// Index resolver keeping an ordered list of referenced objects.
///
/// On write, every accepted object gets the next free index; the list is
/// then persisted by the host alongside the stream. On read, the host
/// installs the same list with [`set_referenced_objects`] before
/// deserializing.
///
/// [`set_referenced_objects`]: IndexReferenceResolver::set_referenced_objects
#[derive(Default)]
pub struct IndexReferenceResolver {
    table: Mutex<IndexTable>,
    accepted: Option<FxHashSet<TypeId>>,
}

impl IndexReferenceResolver {
    /// Create a resolver accepting every object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the resolver to objects of type `T` (builder pattern).
    ///
    /// Calling this repeatedly accepts the union of the types.
    pub fn accept<T: Any>(mut self) -> Self {
        self.accepted
            .get_or_insert_with(FxHashSet::default)
            .insert(TypeId::of::<T>());
        self
    }

    /// Snapshot of the referenced objects, in index order.
    pub fn referenced_objects(&self) -> Vec<ObjectHandle> {
        self.table.lock().objects.clone()
    }

    /// Replace the referenced objects; index `i` then resolves to
    /// `objects[i]`.
    pub fn set_referenced_objects(&self, objects: Vec<ObjectHandle>) {
        let mut table = self.table.lock();
        table.indices = objects
            .iter()
            .enumerate()
            .map(|(i, o)| (object_address(o), i as i32))
            .collect();
        table.objects = objects;
    }

    /// Number of referenced objects.
    pub fn len(&self) -> usize {
        self.table.lock().objects.len()
    }

    /// Whether no object is referenced.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn accepts(&self, value: &ObjectHandle) -> bool {
        match &self.accepted {
            Some(types) => types.contains(&Any::type_id(&**value)),
            None => true,
        }
    }
}

impl ExternalIndexReferenceResolver for IndexReferenceResolver {
    fn can_reference(&self, value: &ObjectHandle) -> Option<i32> {
        if !self.accepts(value) {
            return None;
        }
        Some(self.table.lock().index_of(value))
    }

    fn try_resolve_reference(&self, index: i32) -> Option<ObjectHandle> {
        let table = self.table.lock();
        usize::try_from(index)
            .ok()
            .and_then(|i| table.objects.get(i).cloned())
    }
}
