//! Shared Reference Tests
//!
//! An object reachable through several paths is written once and restored
//! as one object.

use crate::model::{Person, Pet};
use graphstream::{
    deserialize_value, serialize_value, serialize_value_to_nodes, shared, DataFormat, EntryType,
    SerializationContext, Shared,
};
use std::sync::Arc;

fn household() -> (Vec<Shared<Person>>, Shared<Pet>) {
    let dog = shared(Pet {
        species: "dog".to_string(),
        owner: None,
    });
    let people = ["Dee", "Eve", "Fay"]
        .iter()
        .map(|name| {
            shared(Person {
                name: name.to_string(),
                pet: Some(dog.clone()),
                ..Person::default()
            })
        })
        .collect();
    (people, dog)
}

#[test]
fn diamond_restores_one_object() {
    for format in [DataFormat::Binary, DataFormat::Json] {
        let (people, _dog) = household();
        let bytes = serialize_value(&people, format).unwrap();
        let back: Vec<Shared<Person>> = deserialize_value(&bytes, format).unwrap().unwrap();

        let pets: Vec<Shared<Pet>> = back
            .iter()
            .map(|person| person.read().pet.clone().unwrap())
            .collect();
        assert!(Arc::ptr_eq(&pets[0], &pets[1]), "{}", format);
        assert!(Arc::ptr_eq(&pets[1], &pets[2]), "{}", format);
        assert_eq!(pets[0].read().species, "dog");
    }
}

#[test]
fn shared_object_is_written_once() {
    let (people, _dog) = household();
    let bytes = serialize_value(&people, DataFormat::Json).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert_eq!(text.matches("\"species\":\"dog\"").count(), 1);
    assert_eq!(text.matches("\"pet\":\"$iref:1\"").count(), 2, "{}", text);
}

#[test]
fn node_list_marks_later_occurrences_as_references() {
    let (people, _dog) = household();
    let mut ctx = SerializationContext::new();
    let nodes = serialize_value_to_nodes(&people, &mut ctx).unwrap();
    let references: Vec<_> = nodes
        .iter()
        .filter(|node| node.entry == EntryType::InternalReference)
        .collect();
    assert_eq!(references.len(), 2);
    assert!(references.iter().all(|node| node.data == "1"));
    assert_eq!(ctx.reference_count(), 4);
}

#[test]
fn distinct_equal_objects_stay_distinct() {
    let twins: Vec<Shared<Pet>> = (0..2)
        .map(|_| {
            shared(Pet {
                species: "cat".to_string(),
                owner: None,
            })
        })
        .collect();
    let bytes = serialize_value(&twins, DataFormat::Binary).unwrap();
    let back: Vec<Shared<Pet>> = deserialize_value(&bytes, DataFormat::Binary).unwrap().unwrap();
    assert_eq!(back.len(), 2);
    assert!(!Arc::ptr_eq(&back[0], &back[1]));
}
