//! File Stream Tests
//!
//! Entry points and data dumps over real files.

use graphstream::{
    deserialize_value_from_stream, serialize_value_to_stream, BinaryDataReader, BinaryDataWriter,
    DataFormat, DataReader, DataWriter, DeserializationContext, SerializationContext,
};
use std::io::{Seek, SeekFrom};

#[test]
fn round_trip_through_tempfile() {
    let values: Vec<Option<String>> = vec![Some("disk".to_string()), None, Some(String::new())];
    for format in [DataFormat::Binary, DataFormat::Json] {
        let mut file = tempfile::tempfile().unwrap();
        serialize_value_to_stream(&values, &mut file, format).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        let back: Option<Vec<Option<String>>> =
            deserialize_value_from_stream(&mut file, format).unwrap();
        assert_eq!(back, Some(values.clone()), "{}", format);
    }
}

#[test]
fn data_dump_of_file_backed_writer() {
    let file = tempfile::tempfile().unwrap();
    let mut ctx = SerializationContext::new();
    let mut writer = BinaryDataWriter::new(file, &mut ctx).unwrap();
    writer.write_i32(Some("answer"), 42).unwrap();
    let dump = writer.get_data_dump().unwrap();
    // 42 little-endian
    assert!(dump.contains("2a 00 00 00"), "{}", dump);

    let mut file = writer.into_inner().unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    let mut ctx = DeserializationContext::new();
    let mut reader = BinaryDataReader::new(file, &mut ctx).unwrap();
    assert_eq!(reader.read_i32().unwrap(), Some(42));
}

#[test]
fn nodes_format_has_no_stream_form() {
    let file = tempfile::tempfile().unwrap();
    let err = serialize_value_to_stream(&1u8, file, DataFormat::Nodes).unwrap_err();
    assert!(matches!(err, graphstream::Error::UnsupportedFormat(_)));
}
