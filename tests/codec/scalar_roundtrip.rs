//! Scalar Round Trip Tests
//!
//! Every scalar kind through binary, JSON and the in-memory node format.

use crate::common::init_tracing;
use graphstream::{
    create_copy, deserialize_value, deserialize_value_from_nodes, serialize_value,
    serialize_value_to_nodes, shared, DataFormat, DataReader, DataWriter, Decimal,
    DeserializationContext, Guid, NodeObject, Result, Serializable, SerializationContext, Shared,
};
use proptest::prelude::*;

#[derive(Debug, Clone, Default, PartialEq)]
struct Scalars {
    flag: bool,
    tiny: i8,
    byte: u8,
    short: i16,
    ushort: u16,
    int: i32,
    uint: u32,
    long: i64,
    ulong: u64,
    single: f32,
    double: f64,
    amount: Decimal,
    letter: char,
    text: String,
    id: Guid,
}

impl NodeObject for Scalars {
    fn write_members(&self, writer: &mut dyn DataWriter) -> Result<()> {
        self.flag.write_value(Some("flag"), writer)?;
        self.tiny.write_value(Some("tiny"), writer)?;
        self.byte.write_value(Some("byte"), writer)?;
        self.short.write_value(Some("short"), writer)?;
        self.ushort.write_value(Some("ushort"), writer)?;
        self.int.write_value(Some("int"), writer)?;
        self.uint.write_value(Some("uint"), writer)?;
        self.long.write_value(Some("long"), writer)?;
        self.ulong.write_value(Some("ulong"), writer)?;
        self.single.write_value(Some("single"), writer)?;
        self.double.write_value(Some("double"), writer)?;
        self.amount.write_value(Some("amount"), writer)?;
        self.letter.write_value(Some("letter"), writer)?;
        self.text.write_value(Some("text"), writer)?;
        self.id.write_value(Some("id"), writer)
    }

    fn read_member(&mut self, name: &str, reader: &mut dyn DataReader) -> Result<bool> {
        fn read<T: Serializable>(reader: &mut dyn DataReader, slot: &mut T) -> Result<bool> {
            if let Some(value) = T::read_value(reader)? {
                *slot = value;
            }
            Ok(true)
        }
        match name {
            "flag" => read(reader, &mut self.flag),
            "tiny" => read(reader, &mut self.tiny),
            "byte" => read(reader, &mut self.byte),
            "short" => read(reader, &mut self.short),
            "ushort" => read(reader, &mut self.ushort),
            "int" => read(reader, &mut self.int),
            "uint" => read(reader, &mut self.uint),
            "long" => read(reader, &mut self.long),
            "ulong" => read(reader, &mut self.ulong),
            "single" => read(reader, &mut self.single),
            "double" => read(reader, &mut self.double),
            "amount" => read(reader, &mut self.amount),
            "letter" => read(reader, &mut self.letter),
            "text" => read(reader, &mut self.text),
            "id" => read(reader, &mut self.id),
            _ => Ok(false),
        }
    }
}

fn decimal() -> impl Strategy<Value = Decimal> {
    (any::<i64>(), 0u32..=12).prop_map(|(mantissa, scale)| {
        Decimal::new(mantissa.unsigned_abs() as u128, mantissa < 0, scale).unwrap_or_default()
    })
}

fn finite_or_infinite_f32() -> impl Strategy<Value = f32> {
    prop::num::f32::NORMAL
        | prop::num::f32::SUBNORMAL
        | prop::num::f32::ZERO
        | prop::num::f32::INFINITE
}

fn finite_or_infinite_f64() -> impl Strategy<Value = f64> {
    prop::num::f64::NORMAL
        | prop::num::f64::SUBNORMAL
        | prop::num::f64::ZERO
        | prop::num::f64::INFINITE
}

/// Arbitrary text, often shaped like a JSON reference.
fn any_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "(?s).{0,40}",
        "\\$(iref|eref|guidref|strref):(?s).{0,20}",
    ]
}

prop_compose! {
    fn scalars()(
        ints in (any::<bool>(), any::<i8>(), any::<u8>(), any::<i16>(), any::<u16>(), any::<i32>(), any::<u32>()),
        longs in (any::<i64>(), any::<u64>()),
        single in finite_or_infinite_f32(),
        double in finite_or_infinite_f64(),
        amount in decimal(),
        letter in any::<char>(),
        text in any_text(),
        id in any::<u128>(),
    ) -> Scalars {
        let (flag, tiny, byte, short, ushort, int, uint) = ints;
        Scalars {
            flag, tiny, byte, short, ushort, int, uint,
            long: longs.0,
            ulong: longs.1,
            single,
            double,
            amount,
            letter,
            text,
            id: Guid::from_u128(id),
        }
    }
}

fn assert_same(back: &Scalars, original: &Scalars) {
    assert_eq!(back, original);
    assert_eq!(back.single.to_bits(), original.single.to_bits());
    assert_eq!(back.double.to_bits(), original.double.to_bits());
}

fn read_back(object: Option<Shared<Scalars>>) -> Scalars {
    object.expect("object read back").read().clone()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn scalars_round_trip_binary(original in scalars()) {
        let bytes = serialize_value(&shared(original.clone()), DataFormat::Binary).unwrap();
        let back = deserialize_value::<Shared<Scalars>>(&bytes, DataFormat::Binary).unwrap();
        assert_same(&read_back(back), &original);
    }

    #[test]
    fn scalars_round_trip_json(original in scalars()) {
        let bytes = serialize_value(&shared(original.clone()), DataFormat::Json).unwrap();
        let back = deserialize_value::<Shared<Scalars>>(&bytes, DataFormat::Json).unwrap();
        assert_same(&read_back(back), &original);
    }

    #[test]
    fn scalars_round_trip_nodes(original in scalars()) {
        let mut ctx = SerializationContext::new();
        let nodes = serialize_value_to_nodes(&shared(original.clone()), &mut ctx).unwrap();
        let mut ctx = DeserializationContext::new();
        let back = deserialize_value_from_nodes::<Shared<Scalars>>(&nodes, &mut ctx).unwrap();
        assert_same(&read_back(back), &original);
    }

    #[test]
    fn strings_round_trip_all_codecs(text in any_text()) {
        for format in [DataFormat::Binary, DataFormat::Json] {
            let bytes = serialize_value(&text, format).unwrap();
            prop_assert_eq!(deserialize_value::<String>(&bytes, format).unwrap(), Some(text.clone()));
        }
    }
}

#[test]
fn test_reference_shaped_strings() {
    init_tracing();
    for format in [DataFormat::Binary, DataFormat::Json] {
        for text in ["$iref:3", "$strref:x", "$eref:0", "$", "$$iref:1"] {
            let bytes = serialize_value(&text.to_string(), format).unwrap();
            let back = deserialize_value::<String>(&bytes, format).unwrap();
            assert_eq!(back.as_deref(), Some(text), "{}", format);
        }
    }
}

#[test]
fn test_extreme_integers() {
    init_tracing();
    let original = Scalars {
        tiny: i8::MIN,
        byte: u8::MAX,
        short: i16::MIN,
        ushort: u16::MAX,
        int: i32::MIN,
        uint: u32::MAX,
        long: i64::MIN,
        ulong: u64::MAX,
        ..Scalars::default()
    };
    for format in [DataFormat::Binary, DataFormat::Json] {
        let bytes = serialize_value(&shared(original.clone()), format).unwrap();
        let back = deserialize_value::<Shared<Scalars>>(&bytes, format).unwrap();
        assert_same(&read_back(back), &original);
    }
}

#[test]
fn test_special_floats_survive_json() {
    let original = Scalars {
        single: f32::NEG_INFINITY,
        double: -0.0,
        ..Scalars::default()
    };
    let bytes = serialize_value(&shared(original.clone()), DataFormat::Json).unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(text.contains("\"single\":-Infinity"));

    let back = read_back(deserialize_value::<Shared<Scalars>>(&bytes, DataFormat::Json).unwrap());
    assert_same(&back, &original);

    let nan = shared(Scalars {
        double: f64::NAN,
        ..Scalars::default()
    });
    let bytes = serialize_value(&nan, DataFormat::Json).unwrap();
    let back = read_back(deserialize_value::<Shared<Scalars>>(&bytes, DataFormat::Json).unwrap());
    assert!(back.double.is_nan());
}

#[test]
fn test_create_copy_is_deep() {
    let original = shared(Scalars {
        text: "copied".to_string(),
        int: 9,
        ..Scalars::default()
    });
    let copy = create_copy(&original).unwrap().unwrap();
    assert!(!std::sync::Arc::ptr_eq(&copy, &original));
    original.write().int = 10;
    assert_eq!(copy.read().int, 9);
    assert_eq!(copy.read().text, "copied");
}
