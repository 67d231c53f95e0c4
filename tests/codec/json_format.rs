//! JSON Format Tests
//!
//! Packed and readable output are valid JSON with the reserved keys in
//! place, and both read back.

use crate::common::{read_with, write_with, Codec};
use graphstream::{
    DataReaderExt, DataWriter, DataWriterExt, EntryType, Result, Serializable, SerializationConfig,
    TypeKey,
};
use serde_json::Value;

struct Track;

fn write_track(w: &mut dyn DataWriter) -> Result<()> {
    let ty = TypeKey::of::<Track>();
    w.begin_reference_node(None, Some(&ty), 0)?;
    w.write_string(Some("title"), "Line \"one\"\n\ttab")?;
    w.write_u32(Some("plays"), 12)?;
    w.write_null(Some("cover"))?;
    w.begin_struct_node(Some("meta"), None)?;
    w.write_bool(Some("explicit"), false)?;
    w.end_node(Some("meta"))?;
    vec!["rock".to_string(), "live".to_string()].write_value(Some("genres"), w)?;
    w.begin_struct_node(Some("waveform"), None)?;
    w.write_primitive_array_of(&[0.25f32, -0.5, 1.0])?;
    w.end_node(Some("waveform"))?;
    w.begin_reference_node(Some("next"), Some(&ty), 1)?;
    w.write_internal_reference(Some("previous"), 0)?;
    w.end_node(Some("next"))?;
    w.end_node(None)
}

fn parse(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).expect("valid JSON")
}

#[test]
fn packed_output_is_valid_json() {
    let bytes = write_with(Codec::Json, SerializationConfig::default(), write_track);
    let text = std::str::from_utf8(&bytes).unwrap();
    assert!(!text.contains('\n'));

    let doc = parse(&bytes);
    assert_eq!(doc["$id"], 0);
    let type_entry = doc["$type"].as_str().unwrap();
    assert!(type_entry.starts_with("0|"));
    assert!(type_entry.ends_with("Track"));
    assert_eq!(doc["title"], "Line \"one\"\n\ttab");
    assert_eq!(doc["plays"], 12);
    assert!(doc["cover"].is_null());
    assert_eq!(doc["meta"]["explicit"], false);
    assert_eq!(doc["genres"]["$rlength"], 2);
    assert_eq!(doc["genres"]["$rcontent"][1], "live");
    assert_eq!(doc["waveform"]["$plength"], 3);
    assert_eq!(doc["waveform"]["$pcontent"][1], -0.5);
    // second occurrence of the type is its bare id
    assert_eq!(doc["next"]["$type"], 0);
    assert_eq!(doc["next"]["previous"], "$iref:0");
}

#[test]
fn readable_output_is_valid_json_and_indented() {
    let config = SerializationConfig::default().with_readable_json(true);
    let bytes = write_with(Codec::Json, config, write_track);
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(text.contains("\n    \"plays\": 12"));
    assert!(text.contains("\n        \"explicit\": false"));

    let packed = write_with(Codec::Json, SerializationConfig::default(), write_track);
    assert_eq!(parse(&bytes), parse(&packed));
}

#[test]
fn readable_output_reads_back() {
    let config = SerializationConfig::default().with_readable_json(true);
    let bytes = write_with(Codec::Json, config.clone(), write_track);
    read_with(Codec::Json, &bytes, config, |r| {
        let header = r.enter_node()?.unwrap();
        assert_eq!(header.id, 0);
        assert_eq!(r.read_string()?.as_deref(), Some("Line \"one\"\n\ttab"));
        assert_eq!(r.read_u32()?, Some(12));
        assert!(r.read_null()?);
        r.skip_entry()?;
        assert_eq!(
            Vec::<String>::read_value(r)?,
            Some(vec!["rock".to_string(), "live".to_string()])
        );
        r.enter_node()?;
        assert_eq!(r.read_primitive_array::<f32>()?, Some(vec![0.25, -0.5, 1.0]));
        r.exit_node()?;
        let next = r.enter_node()?.unwrap();
        assert_eq!(next.id, 1);
        assert_eq!(r.read_internal_reference()?, Some(0));
        r.exit_node()?;
        r.exit_node()?;
        assert_eq!(r.peek_entry_type()?, EntryType::EndOfStream);
        Ok(())
    })
    .unwrap();
}

#[test]
fn type_optimization_can_be_disabled() {
    let mut config = SerializationConfig::default();
    config.json.enable_type_optimization = false;
    let bytes = write_with(Codec::Json, config, write_track);
    let doc = parse(&bytes);
    let first = doc["$type"].as_str().unwrap();
    assert_eq!(doc["next"]["$type"].as_str(), Some(first));
}
