//! Primitive Array Tests
//!
//! Bit-exact fidelity of primitive arrays, native and portable byte order.

use crate::common::{read_with, write_with, Codec, CODECS};
use graphstream::{
    BinaryDataReader, BinaryDataWriter, DataReaderExt, DataWriterExt, Decimal,
    DeserializationContext, Guid, SerializationConfig, SerializationContext,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 1000 floats: the special values first, seeded random values after.
fn float_payload() -> Vec<f32> {
    let mut values = vec![
        f32::NAN,
        f32::INFINITY,
        f32::NEG_INFINITY,
        0.0,
        -0.0,
        f32::MIN_POSITIVE,
        f32::MAX,
        f32::MIN,
    ];
    let mut rng = StdRng::seed_from_u64(0x5eed);
    while values.len() < 1000 {
        values.push(rng.gen_range(-1.0e6f32..1.0e6));
    }
    values
}

fn bits(values: &[f32]) -> Vec<u32> {
    values.iter().map(|v| v.to_bits()).collect()
}

fn write_binary(values: &[f32], portable: bool) -> Vec<u8> {
    let mut ctx = SerializationContext::new();
    let mut writer = BinaryDataWriter::new(Vec::new(), &mut ctx).unwrap();
    if portable {
        writer.force_portable_byte_order();
    }
    writer.write_primitive_array_of(values).unwrap();
    writer.into_inner().unwrap()
}

fn read_binary(bytes: &[u8], portable: bool) -> Vec<f32> {
    let mut ctx = DeserializationContext::new();
    let mut reader = BinaryDataReader::new(bytes, &mut ctx).unwrap();
    if portable {
        reader.force_portable_byte_order();
    }
    reader.read_primitive_array::<f32>().unwrap().unwrap()
}

#[test]
fn f32_array_native_and_portable_are_bit_identical() {
    let values = float_payload();
    let native = write_binary(&values, false);
    let portable = write_binary(&values, true);
    assert_eq!(native, portable);
    // tag + length + element size + payload
    assert_eq!(native.len(), 1 + 4 + 4 + 4000);

    for (bytes, portable) in [(&native, false), (&portable, true), (&native, true)] {
        assert_eq!(bits(&read_binary(bytes, portable)), bits(&values));
    }
}

#[test]
fn f32_array_round_trips_through_json() {
    let values = float_payload();
    let bytes = write_with(Codec::Json, SerializationConfig::default(), |w| {
        w.begin_struct_node(None, None)?;
        w.write_primitive_array_of(&values)?;
        w.end_node(None)
    });
    let back = read_with(Codec::Json, &bytes, SerializationConfig::default(), |r| {
        r.enter_node()?;
        let values = r.read_primitive_array::<f32>()?;
        r.exit_node()?;
        Ok(values)
    })
    .unwrap()
    .unwrap();
    assert_eq!(bits(&back), bits(&values));
}

#[test]
fn every_element_kind_round_trips() {
    let guids = vec![Guid::from_u128(1), Guid::from_u128(u128::MAX)];
    let decimals = vec![Decimal::from(-3i64), Decimal::new(125, false, 2).unwrap()];
    let chars = vec!['a', 'é', '\u{1F980}', '"'];
    for codec in CODECS {
        let bytes = write_with(codec, SerializationConfig::default(), |w| {
            w.begin_struct_node(None, None)?;
            w.write_primitive_array_of(&[true, false])?;
            w.write_primitive_array_of(&[i8::MIN, i8::MAX])?;
            w.write_primitive_array_of(&[u16::MAX, 0])?;
            w.write_primitive_array_of(&[i64::MIN, 7])?;
            w.write_primitive_array_of(&[u64::MAX])?;
            w.write_primitive_array_of(&[0.1f64, -2.5e300])?;
            w.write_primitive_array_of(&chars)?;
            w.write_primitive_array_of(&guids)?;
            w.write_primitive_array_of(&decimals)?;
            w.end_node(None)
        });
        read_with(codec, &bytes, SerializationConfig::default(), |r| {
            r.enter_node()?;
            assert_eq!(r.read_primitive_array::<bool>()?, Some(vec![true, false]));
            assert_eq!(r.read_primitive_array::<i8>()?, Some(vec![i8::MIN, i8::MAX]));
            assert_eq!(r.read_primitive_array::<u16>()?, Some(vec![u16::MAX, 0]));
            assert_eq!(r.read_primitive_array::<i64>()?, Some(vec![i64::MIN, 7]));
            assert_eq!(r.read_primitive_array::<u64>()?, Some(vec![u64::MAX]));
            assert_eq!(r.read_primitive_array::<f64>()?, Some(vec![0.1, -2.5e300]));
            assert_eq!(r.read_primitive_array::<char>()?, Some(chars.clone()), "{:?}", codec);
            assert_eq!(r.read_primitive_array::<Guid>()?, Some(guids.clone()));
            assert_eq!(r.read_primitive_array::<Decimal>()?, Some(decimals.clone()));
            r.exit_node()?;
            Ok(())
        })
        .unwrap();
    }
}

#[test]
fn byte_array_larger_than_staging_buffer() {
    let mut rng = StdRng::seed_from_u64(99);
    let payload: Vec<u8> = (0..10_000).map(|_| rng.gen()).collect();
    let config = SerializationConfig::default().with_staging_buffer_size(64);
    let bytes = write_with(Codec::Binary, config.clone(), |w| w.write_primitive_array_of(&payload));
    assert_eq!(bytes.len(), 9 + payload.len());

    let back = read_with(Codec::Binary, &bytes, config, |r| r.read_primitive_array::<u8>())
        .unwrap()
        .unwrap();
    assert_eq!(back, payload);
}

#[test]
fn empty_arrays() {
    for codec in CODECS {
        let bytes = write_with(codec, SerializationConfig::default(), |w| {
            w.begin_struct_node(None, None)?;
            w.write_primitive_array_of::<i32>(&[])?;
            w.end_node(None)
        });
        let back = read_with(codec, &bytes, SerializationConfig::default(), |r| {
            r.enter_node()?;
            let values = r.read_primitive_array::<i32>()?;
            r.exit_node()?;
            Ok(values)
        })
        .unwrap();
        assert_eq!(back, Some(Vec::new()), "{:?}", codec);
    }
}
