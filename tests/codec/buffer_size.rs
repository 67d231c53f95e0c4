//! Buffer Size Tests
//!
//! Output must not depend on the staging buffer capacity.

use crate::common::{read_with, write_with, Codec, CODECS};
use graphstream::{
    DataReaderExt, DataWriter, DataWriterExt, Error, Guid, Result, Serializable,
    SerializationConfig, MIN_STAGING_BUFFER_SIZE,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

struct Payload {
    title: String,
    samples: Vec<f64>,
    blob: Vec<u8>,
    tags: Vec<String>,
}

fn payload() -> Payload {
    let mut rng = StdRng::seed_from_u64(32);
    Payload {
        title: "staging ".repeat(20),
        samples: (0..500).map(|_| rng.gen_range(-1.0..1.0)).collect(),
        blob: (0..300).map(|_| rng.gen()).collect(),
        tags: (0..40).map(|i| format!("tag-{}-{}", i, "x".repeat(i))).collect(),
    }
}

fn write_payload(p: &Payload, w: &mut dyn DataWriter) -> Result<()> {
    w.begin_struct_node(None, None)?;
    p.title.write_value(Some("title"), w)?;
    w.write_guid(Some("id"), Guid::from_u128(0x1234))?;
    p.samples.write_value(Some("samples"), w)?;
    p.blob.write_value(Some("blob"), w)?;
    p.tags.write_value(Some("tags"), w)?;
    w.end_node(None)
}

#[test]
fn small_and_default_buffers_produce_identical_output() {
    let p = payload();
    for codec in CODECS {
        let small = write_with(
            codec,
            SerializationConfig::default().with_staging_buffer_size(MIN_STAGING_BUFFER_SIZE),
            |w| write_payload(&p, w),
        );
        let large = write_with(codec, SerializationConfig::default(), |w| write_payload(&p, w));
        assert_eq!(small, large, "{:?}", codec);
        assert!(small.len() > 64 * 1024 / 16);
    }
}

#[test]
fn readable_json_is_buffer_independent() {
    let p = payload();
    let small = write_with(
        Codec::Json,
        SerializationConfig::default()
            .with_readable_json(true)
            .with_staging_buffer_size(MIN_STAGING_BUFFER_SIZE),
        |w| write_payload(&p, w),
    );
    let large = write_with(
        Codec::Json,
        SerializationConfig::default().with_readable_json(true),
        |w| write_payload(&p, w),
    );
    assert_eq!(small, large);
}

#[test]
fn small_buffer_reads_back() {
    let p = payload();
    let config = SerializationConfig::default().with_staging_buffer_size(MIN_STAGING_BUFFER_SIZE);
    for codec in CODECS {
        let bytes = write_with(codec, config.clone(), |w| write_payload(&p, w));
        read_with(codec, &bytes, config.clone(), |r| {
            r.enter_node()?;
            assert_eq!(String::read_value(r)?.as_deref(), Some(p.title.as_str()));
            assert_eq!(r.read_guid()?, Some(Guid::from_u128(0x1234)));
            let samples = Vec::<f64>::read_value(r)?.unwrap();
            assert_eq!(samples, p.samples, "{:?}", codec);
            assert_eq!(Vec::<u8>::read_value(r)?, Some(p.blob.clone()));
            assert_eq!(Vec::<String>::read_value(r)?, Some(p.tags.clone()));
            r.exit_node()?;
            assert_eq!(r.peek_entry_type()?, graphstream::EntryType::EndOfStream);
            Ok(())
        })
        .unwrap();
    }
}

#[test]
fn buffer_below_minimum_is_rejected() {
    let config = SerializationConfig::default().with_staging_buffer_size(MIN_STAGING_BUFFER_SIZE - 1);
    assert!(matches!(config.validate(), Err(Error::Config(_))));
    let mut ctx = graphstream::SerializationContext::with_config(config);
    let result = graphstream::BinaryDataWriter::new(Vec::new(), &mut ctx);
    assert!(result.is_err());
}

#[test]
fn write_slice_of_primitive_uses_single_array() {
    let bytes = write_with(Codec::Binary, SerializationConfig::default(), |w| {
        w.write_primitive_array_of(&[1.0f64; 8])
    });
    assert_eq!(bytes.len(), 9 + 64);
}
