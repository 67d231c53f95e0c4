//! Type binding between runtime types and wire names
//!
//! A stream records the type of each reference node by name. The binder
//! decides which name a type is written under and which type a name is read
//! back as. [`DefaultTypeBinder`] uses a process-wide table: types must be
//! registered before data naming them can be bound on read, while writing
//! falls back to the compiler's type name for unregistered types.

use graphstream_core::TypeKey;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Maps types to wire names and back.
pub trait TypeBinder: Send + Sync {
    /// Wire name for `ty`.
    fn bind_to_name(&self, ty: &TypeKey) -> String;

    /// Type for a wire name, `None` if the name is unknown.
    fn bind_to_type(&self, name: &str) -> Option<TypeKey>;
}

#[derive(Default)]
struct TypeTable {
    by_name: FxHashMap<String, TypeKey>,
    by_type: FxHashMap<TypeKey, String>,
}

static TYPE_TABLE: Lazy<RwLock<TypeTable>> = Lazy::new(|| RwLock::new(TypeTable::default()));

/// Binder backed by the global type table.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTypeBinder;

impl DefaultTypeBinder {
    /// Register `T` under its compiler type name.
    pub fn register_type<T: ?Sized + 'static>() {
        Self::register_type_as::<T>(std::any::type_name::<T>());
    }

    /// Register `T` under `name`.
    ///
    /// A later alias replaces the name `T` is written under; earlier names
    /// keep resolving to `T` so older data stays readable.
    pub fn register_type_as<T: ?Sized + 'static>(name: impl Into<String>) {
        let key = TypeKey::of::<T>();
        let name = name.into();
        let mut table = TYPE_TABLE.write();
        table.by_name.insert(name.clone(), key);
        table.by_type.insert(key, name);
    }

    /// Whether `name` resolves to a type.
    pub fn is_registered(name: &str) -> bool {
        TYPE_TABLE.read().by_name.contains_key(name)
    }
}

impl TypeBinder for DefaultTypeBinder {
    fn bind_to_name(&self, ty: &TypeKey) -> String {
        TYPE_TABLE
            .read()
            .by_type
            .get(ty)
            .cloned()
            .unwrap_or_else(|| ty.name().to_string())
    }

    fn bind_to_type(&self, name: &str) -> Option<TypeKey> {
        TYPE_TABLE.read().by_name.get(name).copied()
    }
}
