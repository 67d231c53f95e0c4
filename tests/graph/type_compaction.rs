//! Type Compaction Tests
//!
//! The first node of a type carries its full name, later nodes only its id.

use crate::model::{Pet, Person};
use graphstream::{
    deserialize_value, serialize_value, serialize_value_with_context, shared, BinaryDataReader,
    DataFormat, DataReader, DefaultTypeBinder, DeserializationContext, SerializationConfig,
    SerializationContext, Shared, TypeKey,
};
use std::sync::Once;

static REGISTER: Once = Once::new();

fn register_names() {
    REGISTER.call_once(|| {
        DefaultTypeBinder::register_type_as::<Person>("test.Person");
        DefaultTypeBinder::register_type_as::<Pet>("test.Pet");
    });
}

fn crowd() -> Vec<Shared<Person>> {
    ["Ann", "Ben", "Cal"]
        .iter()
        .map(|name| {
            shared(Person {
                name: name.to_string(),
                ..Person::default()
            })
        })
        .collect()
}

fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

#[test]
fn json_writes_type_name_once() {
    register_names();
    let bytes = serialize_value(&crowd(), DataFormat::Json).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert_eq!(text.matches("test.Person").count(), 1, "{}", text);
    assert!(text.contains("\"$type\":\"0|test.Person\""));
    assert_eq!(text.matches("\"$type\":0").count(), 2);
}

#[test]
fn binary_writes_type_name_once() {
    register_names();
    let config = SerializationConfig::default().with_compressed_strings(true);
    let mut ctx = SerializationContext::with_config(config);
    let bytes = serialize_value_with_context(&crowd(), DataFormat::Binary, &mut ctx).unwrap();
    assert_eq!(count(&bytes, b"test.Person"), 1);
    // TypeID tag followed by id 0, once per later node
    assert_eq!(count(&bytes, &[0x30, 0, 0, 0, 0]), 2);
}

#[test]
fn ids_resolve_to_the_same_type() {
    register_names();
    let bytes = serialize_value(&crowd(), DataFormat::Binary).unwrap();
    let mut ctx = DeserializationContext::new();
    let mut reader = BinaryDataReader::new(bytes.as_slice(), &mut ctx).unwrap();
    reader.enter_node().unwrap();
    reader.enter_array().unwrap();
    for _ in 0..3 {
        let header = reader.enter_node().unwrap().unwrap();
        assert_eq!(header.ty, Some(TypeKey::of::<Person>()));
        reader.exit_node().unwrap();
    }
    reader.exit_array().unwrap();
    reader.exit_node().unwrap();
}

#[test]
fn mixed_types_get_distinct_ids() {
    register_names();
    let people = crowd();
    people[1].write().pet = Some(shared(Pet {
        species: "owl".to_string(),
        owner: None,
    }));
    let bytes = serialize_value(&people, DataFormat::Json).unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(text.contains("\"$type\":\"1|test.Pet\""), "{}", text);

    let back: Vec<Shared<Person>> = deserialize_value(&bytes, DataFormat::Json).unwrap().unwrap();
    assert_eq!(back.len(), 3);
    let pet = back[1].read().pet.clone().unwrap();
    assert_eq!(pet.read().species, "owl");
    assert_eq!(back[2].read().name, "Cal");
}
