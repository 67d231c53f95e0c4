//! Runtime Dispatch Tests
//!
//! Values known only as `dyn Any` go through the serializer registry.

use crate::model::{unlink, Person};
use graphstream::{
    deserialize_value_weak, is_serializer_registered, register_serializer, serialize_value_weak,
    shared, AnyValue, DataFormat, Error, Shared,
};
use std::sync::Arc;

#[test]
fn builtin_scalar_round_trip() {
    for format in [DataFormat::Binary, DataFormat::Json] {
        let value: Box<AnyValue> = Box::new(-77i64);
        let bytes = serialize_value_weak(value.as_ref(), format).unwrap();
        let back = deserialize_value_weak(&bytes, format).unwrap().unwrap();
        assert_eq!(back.downcast_ref::<i64>(), Some(&-77), "{}", format);
    }
}

#[test]
fn registered_graph_type_round_trip() {
    register_serializer::<Shared<Person>>();
    assert!(is_serializer_registered::<Shared<Person>>());

    let a = shared(Person {
        name: "Gus".to_string(),
        age: 3,
        ..Person::default()
    });
    a.write().friend = Some(a.clone());

    let objects: Vec<Box<AnyValue>> = vec![Box::new(a.clone()), Box::new("tail".to_string())];
    for format in [DataFormat::Binary, DataFormat::Json] {
        let mut restored = Vec::new();
        for object in &objects {
            let bytes = serialize_value_weak(object.as_ref(), format).unwrap();
            restored.push(deserialize_value_weak(&bytes, format).unwrap().unwrap());
        }

        let person = restored[0].downcast_ref::<Shared<Person>>().unwrap().clone();
        assert_eq!(person.read().name, "Gus");
        let friend = person.read().friend.clone().unwrap();
        assert!(Arc::ptr_eq(&friend, &person));
        assert_eq!(restored[1].downcast_ref::<String>().map(String::as_str), Some("tail"));
        unlink(&[&person]);
    }
    unlink(&[&a]);
}

#[test]
fn unregistered_type_is_rejected() {
    #[derive(Debug)]
    struct Opaque;
    let err = serialize_value_weak(&Opaque, DataFormat::Json).unwrap_err();
    assert!(matches!(err, Error::NoSerializer(_)));
}

#[test]
fn unbindable_type_name_reads_as_none() {
    let text = br#"{"$type":"0|no.such.Type","value":1}"#;
    let back = deserialize_value_weak(text, DataFormat::Json).unwrap();
    assert!(back.is_none());
}

#[test]
fn bound_type_without_serializer_is_an_error() {
    struct BoundOnly;
    graphstream::DefaultTypeBinder::register_type_as::<BoundOnly>("test.BoundOnly");
    let text = br#"{"$type":"0|test.BoundOnly","value":1}"#;
    let err = deserialize_value_weak(text, DataFormat::Json).unwrap_err();
    assert!(matches!(err, Error::NoSerializer(_)));
}
