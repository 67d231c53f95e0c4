//! External Reference Tests
//!
//! Objects outside the graph are written through resolvers and resolved
//! back; a missing or failing resolver degrades to null without disturbing
//! the entries that follow.

use crate::common::{capturing_config, CapturingLogger};
use crate::model::{GuidTable, Scene, Sound, SoundBank, Texture};
use graphstream::{
    deserialize_value_with_context, serialize_value_with_context, shared, DataFormat,
    DefaultTypeBinder, DeserializationContext, ErrorHandlingPolicy, External, Guid,
    IndexReferenceResolver, ObjectHandle, SerializationContext, Shared,
};
use std::any::TypeId;
use std::sync::Arc;

const FORMATS: [DataFormat; 2] = [DataFormat::Binary, DataFormat::Json];

fn scene(texture: &Arc<Texture>, sound: &Arc<Sound>) -> Shared<Scene> {
    shared(Scene {
        title: "intro".to_string(),
        texture: Some(External(texture.clone())),
        sound: Some(External(sound.clone())),
        frames: 240,
    })
}

fn assets() -> (Arc<Texture>, Arc<Sound>) {
    // bound names keep the logs free of unbound-type warnings
    DefaultTypeBinder::register_type::<Scene>();
    (
        Arc::new(Texture {
            path: "sky.png".to_string(),
        }),
        Arc::new(Sound {
            clip: "wind".to_string(),
        }),
    )
}

#[test]
fn index_and_string_references_round_trip() {
    let (texture, sound) = assets();
    for format in FORMATS {
        let index = Arc::new(IndexReferenceResolver::new().accept::<Texture>());
        let bank = Arc::new(SoundBank {
            sounds: vec![sound.clone() as ObjectHandle],
        });

        let mut ctx = SerializationContext::new();
        ctx.set_index_resolver(Some(index.clone()));
        ctx.set_string_resolver(Some(bank.clone()));
        let bytes =
            serialize_value_with_context(&scene(&texture, &sound), format, &mut ctx).unwrap();
        assert_eq!(index.len(), 1);
        if format == DataFormat::Json {
            let text = String::from_utf8(bytes.clone()).unwrap();
            assert!(text.contains("\"texture\":\"$eref:0\""), "{}", text);
            assert!(text.contains("\"sound\":\"$strref:wind\""), "{}", text);
        }

        let mut ctx = DeserializationContext::new();
        ctx.set_index_resolver(Some(index));
        ctx.set_string_resolver(Some(bank));
        let back: Shared<Scene> = deserialize_value_with_context(&bytes, format, &mut ctx)
            .unwrap()
            .unwrap();
        let back = back.read();
        assert!(Arc::ptr_eq(&back.texture.as_ref().unwrap().0, &texture));
        assert!(Arc::ptr_eq(&back.sound.as_ref().unwrap().0, &sound));
        assert_eq!(back.frames, 240);
    }
}

#[test]
fn guid_resolvers_are_chained() {
    let (texture, sound) = assets();
    let texture_id = Guid::from_u128(0xA);
    let sound_id = Guid::from_u128(0xB);
    let chain = Arc::new(GuidTable {
        accepts: TypeId::of::<Texture>(),
        entries: vec![(texture_id, texture.clone() as ObjectHandle)],
        next: Some(Box::new(GuidTable {
            accepts: TypeId::of::<Sound>(),
            entries: vec![(sound_id, sound.clone() as ObjectHandle)],
            next: None,
        })),
    });

    for format in FORMATS {
        let mut ctx = SerializationContext::new();
        ctx.set_guid_resolver(Some(chain.clone()));
        let bytes =
            serialize_value_with_context(&scene(&texture, &sound), format, &mut ctx).unwrap();

        let mut ctx = DeserializationContext::new();
        ctx.set_guid_resolver(Some(chain.clone()));
        let back: Shared<Scene> = deserialize_value_with_context(&bytes, format, &mut ctx)
            .unwrap()
            .unwrap();
        let back = back.read();
        assert!(Arc::ptr_eq(&back.texture.as_ref().unwrap().0, &texture), "{}", format);
        assert!(Arc::ptr_eq(&back.sound.as_ref().unwrap().0, &sound), "{}", format);
    }
}

#[test]
fn failing_resolver_yields_null_and_keeps_siblings() {
    let (texture, sound) = assets();
    for format in FORMATS {
        let index = Arc::new(IndexReferenceResolver::new());
        let mut ctx = SerializationContext::new();
        ctx.set_index_resolver(Some(index));
        let bytes =
            serialize_value_with_context(&scene(&texture, &sound), format, &mut ctx).unwrap();

        // the reading host lost its reference list
        let logger = CapturingLogger::new();
        let mut ctx = DeserializationContext::with_config(capturing_config(
            &logger,
            ErrorHandlingPolicy::Resilient,
        ));
        ctx.set_index_resolver(Some(Arc::new(IndexReferenceResolver::new())));
        let back: Shared<Scene> = deserialize_value_with_context(&bytes, format, &mut ctx)
            .unwrap()
            .unwrap();
        let back = back.read();
        assert!(back.texture.is_none());
        assert!(back.sound.is_none());
        assert_eq!(back.title, "intro");
        assert_eq!(back.frames, 240, "{}", format);
        assert_eq!(logger.warnings().len(), 2, "{:?}", logger.warnings());
    }
}

#[test]
fn missing_resolver_on_write_writes_null() {
    let (texture, sound) = assets();
    for format in FORMATS {
        let logger = CapturingLogger::new();
        let mut ctx = SerializationContext::with_config(capturing_config(
            &logger,
            ErrorHandlingPolicy::Resilient,
        ));
        let bytes =
            serialize_value_with_context(&scene(&texture, &sound), format, &mut ctx).unwrap();
        assert_eq!(logger.warnings().len(), 2);

        let back: Shared<Scene> = deserialize_value_with_context(
            &bytes,
            format,
            &mut DeserializationContext::new(),
        )
        .unwrap()
        .unwrap();
        let back = back.read();
        assert!(back.texture.is_none());
        assert_eq!(back.frames, 240);
    }
}

#[test]
fn resolver_returning_wrong_type_is_an_error() {
    let (texture, sound) = assets();
    let index = Arc::new(IndexReferenceResolver::new().accept::<Texture>());
    let mut ctx = SerializationContext::new();
    ctx.set_index_resolver(Some(index));
    let bytes =
        serialize_value_with_context(&scene(&texture, &sound), DataFormat::Binary, &mut ctx)
            .unwrap();

    // index 0 now resolves to a sound
    let swapped = Arc::new(IndexReferenceResolver::new());
    swapped.set_referenced_objects(vec![sound.clone() as ObjectHandle]);
    let logger = CapturingLogger::new();
    let mut ctx = DeserializationContext::with_config(capturing_config(
        &logger,
        ErrorHandlingPolicy::Resilient,
    ));
    ctx.set_index_resolver(Some(swapped));
    let back: Shared<Scene> = deserialize_value_with_context(&bytes, DataFormat::Binary, &mut ctx)
        .unwrap()
        .unwrap();
    assert!(back.read().texture.is_none());
    assert_eq!(logger.errors().len(), 1);
}
