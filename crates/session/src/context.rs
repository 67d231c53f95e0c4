//! Serialization and deserialization contexts
//!
//! A context holds the per-stream state shared by a writer or reader and
//! the values it encodes:
//! - the type registry (first occurrence writes the name, later ones the id)
//! - internal references (identity of already written nodes)
//! - external resolvers
//! - the configuration, including the debug policy
//!
//! Contexts are reused across sessions. [`reset_session`] clears the
//! per-stream state and keeps the setup; [`Recyclable::reset`] returns the
//! context to its pristine defaults before it goes back to a pool.
//!
//! [`reset_session`]: SerializationContext::reset_session

use crate::binder::{DefaultTypeBinder, TypeBinder};
use crate::cache::Recyclable;
use crate::resolvers::{
    ExternalGuidReferenceResolver, ExternalIndexReferenceResolver,
    ExternalStringReferenceResolver,
};
use graphstream_core::{
    object_address, DebugContext, Guid, ObjectHandle, Result, SerializationConfig, TypeKey,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Write-side session state.
pub struct SerializationContext {
    config: SerializationConfig,
    binder: Arc<dyn TypeBinder>,
    types: FxHashMap<TypeKey, i32>,
    object_ids: FxHashMap<usize, i32>,
    // Registered objects stay alive for the session so their addresses
    // cannot be reused by a new allocation.
    retained: Vec<ObjectHandle>,
    index_resolver: Option<Arc<dyn ExternalIndexReferenceResolver>>,
    guid_resolver: Option<Arc<dyn ExternalGuidReferenceResolver>>,
    string_resolver: Option<Arc<dyn ExternalStringReferenceResolver>>,
}

impl Default for SerializationContext {
    fn default() -> Self {
        SerializationContext {
            config: SerializationConfig::default(),
            binder: Arc::new(DefaultTypeBinder),
            types: FxHashMap::default(),
            object_ids: FxHashMap::default(),
            retained: Vec::new(),
            index_resolver: None,
            guid_resolver: None,
            string_resolver: None,
        }
    }
}

impl SerializationContext {
    /// Create a context with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with `config`.
    pub fn with_config(config: SerializationConfig) -> Self {
        SerializationContext {
            config,
            ..Self::default()
        }
    }

    /// Configuration of the session.
    pub fn config(&self) -> &SerializationConfig {
        &self.config
    }

    /// Mutable configuration of the session.
    pub fn config_mut(&mut self) -> &mut SerializationConfig {
        &mut self.config
    }

    /// Debug policy of the session.
    pub fn debug(&self) -> &DebugContext {
        &self.config.debug
    }

    /// Type binder.
    pub fn binder(&self) -> &dyn TypeBinder {
        self.binder.as_ref()
    }

    /// Replace the type binder.
    pub fn set_binder(&mut self, binder: Arc<dyn TypeBinder>) {
        self.binder = binder;
    }

    /// Install or remove the index resolver.
    pub fn set_index_resolver(&mut self, resolver: Option<Arc<dyn ExternalIndexReferenceResolver>>) {
        self.index_resolver = resolver;
    }

    /// Install or remove the head of the GUID resolver chain.
    pub fn set_guid_resolver(&mut self, resolver: Option<Arc<dyn ExternalGuidReferenceResolver>>) {
        self.guid_resolver = resolver;
    }

    /// Install or remove the head of the string resolver chain.
    pub fn set_string_resolver(
        &mut self,
        resolver: Option<Arc<dyn ExternalStringReferenceResolver>>,
    ) {
        self.string_resolver = resolver;
    }

    /// Register `ty` in the type registry.
    ///
    /// Returns `(true, id)` on first occurrence, `(false, id)` afterwards.
    /// Ids are assigned in first-seen order starting at 0.
    pub fn try_register_type(&mut self, ty: &TypeKey) -> (bool, i32) {
        if let Some(&id) = self.types.get(ty) {
            return (false, id);
        }
        let id = self.types.len() as i32;
        self.types.insert(*ty, id);
        (true, id)
    }

    /// Register `value` as an internal reference.
    ///
    /// Returns `(true, id)` the first time an object is seen in this
    /// session, `(false, id)` for every later occurrence of the same object.
    pub fn try_register_internal_reference(&mut self, value: &ObjectHandle) -> (bool, i32) {
        let address = object_address(value);
        if let Some(&id) = self.object_ids.get(&address) {
            return (false, id);
        }
        let id = self.object_ids.len() as i32;
        self.object_ids.insert(address, id);
        self.retained.push(value.clone());
        (true, id)
    }

    /// Index of `value` if the index resolver accepts it.
    pub fn try_register_external_reference_by_index(&self, value: &ObjectHandle) -> Option<i32> {
        self.index_resolver.as_ref()?.can_reference(value)
    }

    /// GUID of `value` from the first resolver in the chain that accepts it.
    pub fn try_register_external_reference_by_guid(&self, value: &ObjectHandle) -> Option<Guid> {
        let mut resolver: Option<&dyn ExternalGuidReferenceResolver> =
            self.guid_resolver.as_deref();
        while let Some(r) = resolver {
            if let Some(guid) = r.can_reference(value) {
                return Some(guid);
            }
            resolver = r.next_resolver();
        }
        None
    }

    /// String id of `value` from the first resolver in the chain that
    /// accepts it.
    pub fn try_register_external_reference_by_string(&self, value: &ObjectHandle) -> Option<String> {
        let mut resolver: Option<&dyn ExternalStringReferenceResolver> =
            self.string_resolver.as_deref();
        while let Some(r) = resolver {
            if let Some(id) = r.can_reference(value) {
                return Some(id);
            }
            resolver = r.next_resolver();
        }
        None
    }

    /// Number of types registered this session.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Number of internal references registered this session.
    pub fn reference_count(&self) -> usize {
        self.object_ids.len()
    }

    /// Clear type ids and references, keeping config, binder and resolvers.
    pub fn reset_session(&mut self) {
        self.types.clear();
        self.object_ids.clear();
        self.retained.clear();
    }
}

impl Recyclable for SerializationContext {
    fn reset(&mut self) {
        self.reset_session();
        self.config = SerializationConfig::default();
        self.binder = Arc::new(DefaultTypeBinder);
        self.index_resolver = None;
        self.guid_resolver = None;
        self.string_resolver = None;
    }
}

/// Read-side session state.
pub struct DeserializationContext {
    config: SerializationConfig,
    binder: Arc<dyn TypeBinder>,
    types: FxHashMap<i32, Option<TypeKey>>,
    objects: FxHashMap<i32, ObjectHandle>,
    index_resolver: Option<Arc<dyn ExternalIndexReferenceResolver>>,
    guid_resolver: Option<Arc<dyn ExternalGuidReferenceResolver>>,
    string_resolver: Option<Arc<dyn ExternalStringReferenceResolver>>,
}

impl Default for DeserializationContext {
    fn default() -> Self {
        DeserializationContext {
            config: SerializationConfig::default(),
            binder: Arc::new(DefaultTypeBinder),
            types: FxHashMap::default(),
            objects: FxHashMap::default(),
            index_resolver: None,
            guid_resolver: None,
            string_resolver: None,
        }
    }
}

impl DeserializationContext {
    /// Create a context with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with `config`.
    pub fn with_config(config: SerializationConfig) -> Self {
        DeserializationContext {
            config,
            ..Self::default()
        }
    }

    /// Configuration of the session.
    pub fn config(&self) -> &SerializationConfig {
        &self.config
    }

    /// Mutable configuration of the session.
    pub fn config_mut(&mut self) -> &mut SerializationConfig {
        &mut self.config
    }

    /// Debug policy of the session.
    pub fn debug(&self) -> &DebugContext {
        &self.config.debug
    }

    /// Type binder.
    pub fn binder(&self) -> &dyn TypeBinder {
        self.binder.as_ref()
    }

    /// Replace the type binder.
    pub fn set_binder(&mut self, binder: Arc<dyn TypeBinder>) {
        self.binder = binder;
    }

    /// Install or remove the index resolver.
    pub fn set_index_resolver(&mut self, resolver: Option<Arc<dyn ExternalIndexReferenceResolver>>) {
        self.index_resolver = resolver;
    }

    /// Install or remove the head of the GUID resolver chain.
    pub fn set_guid_resolver(&mut self, resolver: Option<Arc<dyn ExternalGuidReferenceResolver>>) {
        self.guid_resolver = resolver;
    }

    /// Install or remove the head of the string resolver chain.
    pub fn set_string_resolver(
        &mut self,
        resolver: Option<Arc<dyn ExternalStringReferenceResolver>>,
    ) {
        self.string_resolver = resolver;
    }

    /// Record the name carried by a type entry under `id`.
    ///
    /// A name the binder does not know is recorded as `None` (keeping later
    /// ids aligned) and reported as a warning.
    pub fn register_type(&mut self, id: i32, name: &str) -> Result<Option<TypeKey>> {
        let ty = self.binder.bind_to_type(name);
        if ty.is_none() {
            self.config
                .debug
                .log_warning(format!("could not bind type name '{}'", name))?;
        }
        self.types.insert(id, ty);
        Ok(ty)
    }

    /// Type recorded under `id`.
    ///
    /// An id that was never recorded is reported as a warning.
    pub fn get_type(&self, id: i32) -> Result<Option<TypeKey>> {
        match self.types.get(&id) {
            Some(ty) => Ok(*ty),
            None => {
                self.config
                    .debug
                    .log_warning(format!("type id {} was never registered", id))?;
                Ok(None)
            }
        }
    }

    /// Record the object created for node `id`.
    pub fn register_internal_reference(&mut self, id: i32, value: ObjectHandle) {
        self.objects.insert(id, value);
    }

    /// Object created for node `id`.
    pub fn get_internal_reference(&self, id: i32) -> Option<ObjectHandle> {
        self.objects.get(&id).cloned()
    }

    /// Resolve an external index reference.
    ///
    /// A missing resolver or a failed lookup is reported as a warning and
    /// yields `None`.
    pub fn get_external_object_by_index(&self, index: i32) -> Result<Option<ObjectHandle>> {
        let Some(resolver) = self.index_resolver.as_ref() else {
            self.config.debug.log_warning(format!(
                "no index resolver to resolve external reference {}",
                index
            ))?;
            return Ok(None);
        };
        let resolved = resolver.try_resolve_reference(index);
        if resolved.is_none() {
            self.config
                .debug
                .log_warning(format!("failed to resolve external reference {}", index))?;
        }
        Ok(resolved)
    }

    /// Resolve an external GUID reference through the resolver chain.
    pub fn get_external_object_by_guid(&self, guid: &Guid) -> Result<Option<ObjectHandle>> {
        let mut resolver: Option<&dyn ExternalGuidReferenceResolver> =
            self.guid_resolver.as_deref();
        if resolver.is_none() {
            self.config.debug.log_warning(format!(
                "no GUID resolver to resolve external reference {}",
                guid
            ))?;
            return Ok(None);
        }
        while let Some(r) = resolver {
            if let Some(value) = r.try_resolve_reference(guid) {
                return Ok(Some(value));
            }
            resolver = r.next_resolver();
        }
        self.config
            .debug
            .log_warning(format!("failed to resolve external reference {}", guid))?;
        Ok(None)
    }

    /// Resolve an external string reference through the resolver chain.
    pub fn get_external_object_by_string(&self, id: &str) -> Result<Option<ObjectHandle>> {
        let mut resolver: Option<&dyn ExternalStringReferenceResolver> =
            self.string_resolver.as_deref();
        if resolver.is_none() {
            self.config.debug.log_warning(format!(
                "no string resolver to resolve external reference '{}'",
                id
            ))?;
            return Ok(None);
        }
        while let Some(r) = resolver {
            if let Some(value) = r.try_resolve_reference(id) {
                return Ok(Some(value));
            }
            resolver = r.next_resolver();
        }
        self.config
            .debug
            .log_warning(format!("failed to resolve external reference '{}'", id))?;
        Ok(None)
    }

    /// Clear type ids and references, keeping config, binder and resolvers.
    pub fn reset_session(&mut self) {
        self.types.clear();
        self.objects.clear();
    }
}

impl Recyclable for DeserializationContext {
    fn reset(&mut self) {
        self.reset_session();
        self.config = SerializationConfig::default();
        self.binder = Arc::new(DefaultTypeBinder);
        self.index_resolver = None;
        self.guid_resolver = None;
        self.string_resolver = None;
    }
}
