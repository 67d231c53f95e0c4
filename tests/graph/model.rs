//! Object model shared by the graph tests.

#![allow(dead_code)]

use graphstream::{
    DataReader, DataWriter, External, ExternalGuidReferenceResolver,
    ExternalStringReferenceResolver, Guid, NodeObject, ObjectHandle, Result, Serializable, Shared,
};
use graphstream_core::object_address;
use std::any::{Any, TypeId};

#[derive(Default, Debug)]
pub struct Person {
    pub name: String,
    pub age: u32,
    pub friend: Option<Shared<Person>>,
    pub pet: Option<Shared<Pet>>,
}

impl NodeObject for Person {
    fn write_members(&self, writer: &mut dyn DataWriter) -> Result<()> {
        self.name.write_value(Some("name"), writer)?;
        self.age.write_value(Some("age"), writer)?;
        self.friend.write_value(Some("friend"), writer)?;
        self.pet.write_value(Some("pet"), writer)
    }

    fn read_member(&mut self, name: &str, reader: &mut dyn DataReader) -> Result<bool> {
        match name {
            "name" => self.name = String::read_value(reader)?.unwrap_or_default(),
            "age" => self.age = u32::read_value(reader)?.unwrap_or_default(),
            "friend" => self.friend = Option::read_value(reader)?.flatten(),
            "pet" => self.pet = Option::read_value(reader)?.flatten(),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

#[derive(Default, Debug)]
pub struct Pet {
    pub species: String,
    pub owner: Option<Shared<Person>>,
}

impl NodeObject for Pet {
    fn write_members(&self, writer: &mut dyn DataWriter) -> Result<()> {
        self.species.write_value(Some("species"), writer)?;
        self.owner.write_value(Some("owner"), writer)
    }

    fn read_member(&mut self, name: &str, reader: &mut dyn DataReader) -> Result<bool> {
        match name {
            "species" => self.species = String::read_value(reader)?.unwrap_or_default(),
            "owner" => self.owner = Option::read_value(reader)?.flatten(),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Break `friend` and `owner` links so reference cycles are freed.
pub fn unlink(people: &[&Shared<Person>]) {
    for person in people {
        let pet = person.write().pet.take();
        if let Some(pet) = pet {
            pet.write().owner = None;
        }
        person.write().friend = None;
    }
}

/// Host-owned resource referenced from a scene.
#[derive(Debug)]
pub struct Texture {
    pub path: String,
}

/// Host-owned resource referenced by string id.
#[derive(Debug)]
pub struct Sound {
    pub clip: String,
}

#[derive(Default)]
pub struct Scene {
    pub title: String,
    pub texture: Option<External<Texture>>,
    pub sound: Option<External<Sound>>,
    pub frames: u32,
}

impl NodeObject for Scene {
    fn write_members(&self, writer: &mut dyn DataWriter) -> Result<()> {
        self.title.write_value(Some("title"), writer)?;
        self.texture.write_value(Some("texture"), writer)?;
        self.sound.write_value(Some("sound"), writer)?;
        self.frames.write_value(Some("frames"), writer)
    }

    fn read_member(&mut self, name: &str, reader: &mut dyn DataReader) -> Result<bool> {
        match name {
            "title" => self.title = String::read_value(reader)?.unwrap_or_default(),
            "texture" => self.texture = Option::read_value(reader)?.flatten(),
            "sound" => self.sound = Option::read_value(reader)?.flatten(),
            "frames" => self.frames = u32::read_value(reader)?.unwrap_or_default(),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// GUID resolver over a fixed table, accepting one type and chaining to
/// the next resolver for everything else.
pub struct GuidTable {
    pub accepts: TypeId,
    pub entries: Vec<(Guid, ObjectHandle)>,
    pub next: Option<Box<dyn ExternalGuidReferenceResolver>>,
}

impl ExternalGuidReferenceResolver for GuidTable {
    fn can_reference(&self, value: &ObjectHandle) -> Option<Guid> {
        if Any::type_id(&**value) != self.accepts {
            return None;
        }
        self.entries
            .iter()
            .find(|(_, object)| object_address(object) == object_address(value))
            .map(|(guid, _)| *guid)
    }

    fn try_resolve_reference(&self, guid: &Guid) -> Option<ObjectHandle> {
        self.entries
            .iter()
            .find(|(id, _)| id == guid)
            .map(|(_, object)| object.clone())
    }

    fn next_resolver(&self) -> Option<&dyn ExternalGuidReferenceResolver> {
        self.next.as_deref()
    }
}

/// String resolver keyed by the `clip` of a [`Sound`].
pub struct SoundBank {
    pub sounds: Vec<ObjectHandle>,
}

impl ExternalStringReferenceResolver for SoundBank {
    fn can_reference(&self, value: &ObjectHandle) -> Option<String> {
        value.downcast_ref::<Sound>().map(|sound| sound.clip.clone())
    }

    fn try_resolve_reference(&self, id: &str) -> Option<ObjectHandle> {
        self.sounds
            .iter()
            .find(|object| {
                object
                    .downcast_ref::<Sound>()
                    .map_or(false, |sound| sound.clip == id)
            })
            .cloned()
    }
}
