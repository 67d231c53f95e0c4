//! Runtime serializer registry
//!
//! Maps a runtime type to the serializer for it, for callers that only hold
//! a `&dyn Any` (see [`serialize_value_weak`](crate::serialize_value_weak)).
//!
//! ## Design Philosophy
//!
//! Dispatch on a runtime type is a lookup, not code generation:
//! - One [`ErasedSerializer`] per type, keyed by `TypeId`
//! - Built-in scalar types are registered on first use
//! - Everything else is registered explicitly, once, at startup
//!
//! ## Registration
//!
//! ```ignore
//! use graphstream::register_serializer;
//!
//! // Called once at initialization
//! register_serializer::<Shared<Player>>();
//! ```
//!
//! Registering a type also registers its name with the
//! [`DefaultTypeBinder`], so a stream naming it can be read back.

use crate::Serializable;
use dashmap::DashMap;
use graphstream_codec::{DataReader, DataWriter};
use graphstream_core::{Decimal, Guid, Result, TypeKey};
use graphstream_session::DefaultTypeBinder;
use once_cell::sync::Lazy;
use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// A value whose concrete type is only known at runtime.
pub type AnyValue = dyn Any + Send + Sync;

/// Type-erased [`Serializable`] implementation.
pub trait ErasedSerializer: Send + Sync {
    /// Type handled by this serializer.
    fn type_key(&self) -> TypeKey;

    /// Write `value`, which must be of [`type_key`](ErasedSerializer::type_key).
    ///
    /// Returns `Ok(false)` without writing when the value has another type.
    fn write_erased(
        &self,
        value: &AnyValue,
        name: Option<&str>,
        writer: &mut dyn DataWriter,
    ) -> Result<bool>;

    /// Read a value of [`type_key`](ErasedSerializer::type_key).
    fn read_erased(&self, reader: &mut dyn DataReader) -> Result<Option<Box<AnyValue>>>;
}

struct TypedSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedSerializer<T> {
    fn new() -> Self {
        TypedSerializer {
            _marker: PhantomData,
        }
    }
}

impl<T: Serializable + Send + Sync> ErasedSerializer for TypedSerializer<T> {
    fn type_key(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    fn write_erased(
        &self,
        value: &AnyValue,
        name: Option<&str>,
        writer: &mut dyn DataWriter,
    ) -> Result<bool> {
        match value.downcast_ref::<T>() {
            Some(value) => {
                value.write_value(name, writer)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn read_erased(&self, reader: &mut dyn DataReader) -> Result<Option<Box<AnyValue>>> {
        Ok(T::read_value(reader)?.map(|value| Box::new(value) as Box<AnyValue>))
    }
}

/// Global registry of serializers, keyed by `TypeId`.
static SERIALIZERS: Lazy<DashMap<TypeId, Arc<dyn ErasedSerializer>>> = Lazy::new(|| {
    let registry = DashMap::new();
    macro_rules! builtin {
        ($($ty:ty),*) => {
            $(
                registry.insert(
                    TypeId::of::<$ty>(),
                    Arc::new(TypedSerializer::<$ty>::new()) as Arc<dyn ErasedSerializer>,
                );
                DefaultTypeBinder::register_type::<$ty>();
            )*
        };
    }
    builtin!(bool, i8, u8, i16, u16, i32, u32, i64, u64, f32, f64, char, Guid, Decimal, String);
    registry
});

/// Register the serializer of `T`, replacing any previous one.
///
/// # Thread Safety
///
/// This function is thread-safe and can be called from multiple threads,
/// though typically it's called once during startup.
pub fn register_serializer<T: Serializable + Send + Sync>() {
    DefaultTypeBinder::register_type::<T>();
    SERIALIZERS.insert(TypeId::of::<T>(), Arc::new(TypedSerializer::<T>::new()));
    debug!(target: "graphstream", ty = std::any::type_name::<T>(), "Registered serializer");
}

/// Serializer for the type `type_id`, if registered.
pub fn serializer_for(type_id: TypeId) -> Option<Arc<dyn ErasedSerializer>> {
    SERIALIZERS.get(&type_id).map(|entry| Arc::clone(entry.value()))
}

/// Whether a serializer for `T` is registered.
pub fn is_serializer_registered<T: 'static>() -> bool {
    SERIALIZERS.contains_key(&TypeId::of::<T>())
}
