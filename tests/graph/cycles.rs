//! Cycle Tests
//!
//! A -> B -> A restores two distinct objects whose back reference points at
//! the outer object.

use crate::model::{unlink, Person, Pet};
use graphstream::{deserialize_value, serialize_value, shared, DataFormat, Shared};
use std::sync::Arc;

const FORMATS: [DataFormat; 2] = [DataFormat::Binary, DataFormat::Json];

fn couple() -> (Shared<Person>, Shared<Person>) {
    let a = shared(Person {
        name: "Ada".to_string(),
        age: 36,
        ..Person::default()
    });
    let b = shared(Person {
        name: "Bob".to_string(),
        age: 41,
        friend: Some(a.clone()),
        ..Person::default()
    });
    a.write().friend = Some(b.clone());
    (a, b)
}

#[test]
fn two_node_cycle_keeps_identity() {
    for format in FORMATS {
        let (a, b) = couple();
        let bytes = serialize_value(&a, format).unwrap();
        let a2: Shared<Person> = deserialize_value(&bytes, format).unwrap().unwrap();

        let b2 = a2.read().friend.clone().expect("friend");
        assert!(!Arc::ptr_eq(&a2, &b2), "{}", format);
        assert_eq!(a2.read().name, "Ada");
        assert_eq!(b2.read().name, "Bob");
        assert_eq!(b2.read().age, 41);

        let back = b2.read().friend.clone().expect("back reference");
        assert!(Arc::ptr_eq(&back, &a2), "{}", format);

        unlink(&[&a, &b, &a2, &b2]);
    }
}

#[test]
fn self_reference() {
    for format in FORMATS {
        let narcissus = shared(Person {
            name: "Narcissus".to_string(),
            ..Person::default()
        });
        narcissus.write().friend = Some(narcissus.clone());

        let bytes = serialize_value(&narcissus, format).unwrap();
        let back: Shared<Person> = deserialize_value(&bytes, format).unwrap().unwrap();
        let friend = back.read().friend.clone().unwrap();
        assert!(Arc::ptr_eq(&friend, &back));

        unlink(&[&narcissus, &back]);
    }
}

#[test]
fn cycle_through_another_type() {
    for format in FORMATS {
        let owner = shared(Person {
            name: "Cy".to_string(),
            ..Person::default()
        });
        let pet = shared(Pet {
            species: "cat".to_string(),
            owner: Some(owner.clone()),
        });
        owner.write().pet = Some(pet.clone());

        let bytes = serialize_value(&owner, format).unwrap();
        let back: Shared<Person> = deserialize_value(&bytes, format).unwrap().unwrap();
        let pet_back = back.read().pet.clone().unwrap();
        assert_eq!(pet_back.read().species, "cat");
        let owner_back = pet_back.read().owner.clone().unwrap();
        assert!(Arc::ptr_eq(&owner_back, &back), "{}", format);

        unlink(&[&owner, &back]);
    }
}

#[test]
fn sessions_do_not_share_ids() {
    let (a, b) = couple();
    let first = serialize_value(&a, DataFormat::Binary).unwrap();
    let second = serialize_value(&a, DataFormat::Binary).unwrap();
    assert_eq!(first, second);
    unlink(&[&a, &b]);
}
