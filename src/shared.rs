//! Graph handles: shared objects with identity and external objects
//!
//! ## Shared objects
//!
//! A [`Shared<T>`] is written as a reference node the first time it is
//! seen in a session and as an internal reference entry every later time,
//! so shared and cyclic graphs survive a round trip with their identity:
//!
//! ```text
//! A ──> B ──> A          {"$id":0,"$type":"0|A","b":{"$id":1,"$type":"1|B","a":"$iref:0"}}
//! ```
//!
//! On read, the object is registered under its id *before* its members are
//! read, so a back reference inside its own subtree resolves to it.
//!
//! ## External objects
//!
//! An [`External<T>`] lives outside the graph. It is written as a reference
//! through the first resolver of the context that accepts it (index, then
//! GUID, then string) and resolved back through the same resolvers on read.

use crate::serializable::read_members;
use crate::Serializable;
use graphstream_codec::{DataReader, DataReaderExt, DataWriter};
use graphstream_core::{EntryType, ObjectHandle, Result, TypeKey};
use parking_lot::RwLock;
use std::any::type_name;
use std::sync::Arc;

/// An object with identity, shared between owners and possibly cyclic.
pub type Shared<T> = Arc<RwLock<T>>;

/// Wrap `value` in a new [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(RwLock::new(value))
}

/// A type made of named members.
///
/// Instances are created with `Default` and filled member by member, which
/// lets a reader register an object before reading the members that point
/// back at it.
pub trait NodeObject: Default + Send + Sync + 'static {
    /// Write every member as a named entry.
    fn write_members(&self, writer: &mut dyn DataWriter) -> Result<()>;

    /// Read the member `name`. Returns `false` for unknown members, which
    /// are then skipped.
    fn read_member(&mut self, name: &str, reader: &mut dyn DataReader) -> Result<bool>;
}

impl<T: NodeObject> Serializable for Shared<T> {
    fn write_value(&self, name: Option<&str>, writer: &mut dyn DataWriter) -> Result<()> {
        let handle: ObjectHandle = self.clone();
        let (is_new, id) = writer.context_mut().try_register_internal_reference(&handle);
        if !is_new {
            return writer.write_internal_reference(name, id);
        }
        writer.begin_reference_node(name, Some(&TypeKey::of::<T>()), id)?;
        self.read().write_members(writer)?;
        writer.end_node(name)
    }

    fn read_value(reader: &mut dyn DataReader) -> Result<Option<Self>> {
        if reader.peek_entry_type()? == EntryType::InternalReference {
            return read_internal_reference(reader);
        }
        let Some(header) = reader.enter_node()? else {
            return Ok(None);
        };
        if let Some(ty) = header.ty {
            if !ty.is::<T>() {
                reader.context().debug().log_warning(format!(
                    "node of type {} read as {}",
                    ty.name(),
                    type_name::<T>()
                ))?;
            }
        }
        let object = shared(T::default());
        if header.id >= 0 {
            reader
                .context_mut()
                .register_internal_reference(header.id, object.clone());
        }
        {
            let mut members = object.write();
            read_members(reader, |name, reader| members.read_member(name, reader))?;
        }
        reader.exit_node()?;
        Ok(Some(object))
    }
}

fn read_internal_reference<T: NodeObject>(reader: &mut dyn DataReader) -> Result<Option<Shared<T>>> {
    let Some(id) = reader.read_internal_reference()? else {
        return Ok(None);
    };
    let Some(handle) = reader.context().get_internal_reference(id) else {
        reader
            .context()
            .debug()
            .log_warning(format!("internal reference {} was never registered", id))?;
        return Ok(None);
    };
    match handle.downcast::<RwLock<T>>() {
        Ok(object) => Ok(Some(object)),
        Err(_) => {
            reader.context().debug().log_error(format!(
                "internal reference {} does not point to a {}",
                id,
                type_name::<T>()
            ))?;
            Ok(None)
        }
    }
}

/// Handle to an object that lives outside the serialized graph.
#[derive(Debug)]
pub struct External<T: Send + Sync + 'static>(pub Arc<T>);

impl<T: Send + Sync + 'static> External<T> {
    /// Wrap `value`.
    pub fn new(value: T) -> Self {
        External(Arc::new(value))
    }
}

impl<T: Send + Sync + 'static> Clone for External<T> {
    fn clone(&self) -> Self {
        External(Arc::clone(&self.0))
    }
}

impl<T: Send + Sync + 'static> Serializable for External<T> {
    fn write_value(&self, name: Option<&str>, writer: &mut dyn DataWriter) -> Result<()> {
        let handle: ObjectHandle = self.0.clone();
        let context = writer.context();
        if let Some(index) = context.try_register_external_reference_by_index(&handle) {
            return writer.write_external_reference_by_index(name, index);
        }
        if let Some(guid) = context.try_register_external_reference_by_guid(&handle) {
            return writer.write_external_reference_by_guid(name, guid);
        }
        if let Some(id) = context.try_register_external_reference_by_string(&handle) {
            return writer.write_external_reference_by_string(name, &id);
        }
        context.debug().log_warning(format!(
            "no resolver accepts external object of type {}, writing null",
            type_name::<T>()
        ))?;
        writer.write_null(name)
    }

    fn read_value(reader: &mut dyn DataReader) -> Result<Option<Self>> {
        let handle = match reader.peek_entry_type()? {
            EntryType::ExternalReferenceByIndex => match reader.read_external_reference_by_index()? {
                Some(index) => reader.context().get_external_object_by_index(index)?,
                None => None,
            },
            EntryType::ExternalReferenceByGuid => match reader.read_external_reference_by_guid()? {
                Some(guid) => reader.context().get_external_object_by_guid(&guid)?,
                None => None,
            },
            EntryType::ExternalReferenceByString => {
                match reader.read_external_reference_by_string()? {
                    Some(id) => reader.context().get_external_object_by_string(&id)?,
                    None => None,
                }
            }
            EntryType::Null => {
                reader.read_null()?;
                None
            }
            // logs the mismatch and skips the entry
            _ => {
                reader.read_external_reference_by_index()?;
                None
            }
        };
        let Some(handle) = handle else {
            return Ok(None);
        };
        match handle.downcast::<T>() {
            Ok(object) => Ok(Some(External(object))),
            Err(_) => {
                reader.context().debug().log_error(format!(
                    "external object is not a {}",
                    type_name::<T>()
                ))?;
                Ok(None)
            }
        }
    }
}
