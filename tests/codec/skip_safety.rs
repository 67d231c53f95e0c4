//! Skip Safety Tests
//!
//! A mismatched read must consume exactly the offending entry and nothing
//! past the node it belongs to.

use crate::common::{capturing_config, read_with, write_with, CapturingLogger, CODECS};
use graphstream::{
    DataReaderExt, DataWriterExt, EntryType, ErrorHandlingPolicy, Serializable,
    SerializationConfig,
};

fn sample(codec: crate::common::Codec) -> Vec<u8> {
    write_with(codec, SerializationConfig::default(), |w| {
        w.begin_struct_node(None, None)?;
        w.write_string(Some("name"), "not a number")?;
        w.write_i32(Some("hp"), 40)?;
        w.begin_struct_node(Some("inner"), None)?;
        w.write_f64(Some("x"), 1.5)?;
        w.write_primitive_array_of(&[1u32, 2, 3])?;
        w.end_node(Some("inner"))?;
        w.write_bool(Some("alive"), true)?;
        w.end_node(None)
    })
}

#[test]
fn read_i32_on_string_skips_to_next_sibling() {
    for codec in CODECS {
        let bytes = sample(codec);
        let logger = CapturingLogger::new();
        let config = capturing_config(&logger, ErrorHandlingPolicy::Resilient);
        read_with(codec, &bytes, config, |r| {
            r.enter_node()?;
            assert_eq!(r.read_i32()?, None, "{:?}", codec);
            let (entry, name) = r.peek_entry()?;
            assert_eq!(entry, EntryType::Integer);
            assert_eq!(name.as_deref(), Some("hp"));
            assert_eq!(r.read_i32()?, Some(40));
            Ok(())
        })
        .unwrap();
        assert_eq!(logger.warnings().len(), 1, "{:?}", codec);
    }
}

#[test]
fn mismatch_on_nested_node_skips_whole_node() {
    for codec in CODECS {
        let bytes = sample(codec);
        read_with(codec, &bytes, SerializationConfig::default(), |r| {
            r.enter_node()?;
            r.skip_entry()?;
            r.skip_entry()?;
            // `inner` is a node; reading it as a string skips all of it
            assert_eq!(r.read_string()?, None);
            assert_eq!(r.read_bool()?, Some(true), "{:?}", codec);
            assert_eq!(r.peek_entry_type()?, EntryType::EndOfNode);
            r.exit_node()?;
            assert_eq!(r.peek_entry_type()?, EntryType::EndOfStream);
            Ok(())
        })
        .unwrap();
    }
}

#[test]
fn skip_never_crosses_end_of_node() {
    for codec in CODECS {
        let bytes = sample(codec);
        let logger = CapturingLogger::new();
        let config = capturing_config(&logger, ErrorHandlingPolicy::Resilient);
        read_with(codec, &bytes, config, |r| {
            r.enter_node()?;
            r.skip_entry()?;
            r.skip_entry()?;
            r.enter_node()?;
            r.skip_entry()?;
            r.skip_entry()?;
            assert_eq!(r.peek_entry_type()?, EntryType::EndOfNode);
            r.skip_entry()?;
            assert_eq!(r.peek_entry_type()?, EntryType::EndOfNode, "{:?}", codec);
            r.exit_node()?;
            assert_eq!(r.read_bool()?, Some(true));
            Ok(())
        })
        .unwrap();
        assert_eq!(logger.errors().len(), 1, "{:?}", codec);
    }
}

#[test]
fn mismatch_at_boundary_leaves_boundary() {
    for codec in CODECS {
        let bytes = sample(codec);
        read_with(codec, &bytes, SerializationConfig::default(), |r| {
            r.enter_node()?;
            r.skip_entry()?;
            r.skip_entry()?;
            r.skip_entry()?;
            r.skip_entry()?;
            assert_eq!(r.read_u64()?, None);
            assert_eq!(r.peek_entry_type()?, EntryType::EndOfNode);
            r.exit_node()?;
            Ok(())
        })
        .unwrap();
    }
}

#[test]
fn exit_node_skips_unread_members() {
    for codec in CODECS {
        let bytes = sample(codec);
        read_with(codec, &bytes, SerializationConfig::default(), |r| {
            assert!(r.enter_node()?.is_some());
            r.exit_node()?;
            assert_eq!(r.peek_entry_type()?, EntryType::EndOfStream, "{:?}", codec);
            Ok(())
        })
        .unwrap();
    }
}

#[test]
fn strict_policy_aborts_on_mismatch() {
    for codec in CODECS {
        let bytes = sample(codec);
        let logger = CapturingLogger::new();
        let config = capturing_config(&logger, ErrorHandlingPolicy::ThrowOnWarningsAndErrors);
        let err = read_with(codec, &bytes, config, |r| {
            r.enter_node()?;
            r.read_i32()
        })
        .unwrap_err();
        assert!(err.is_aborted(), "{:?}: {}", codec, err);
    }
}

#[test]
fn truncated_vec_reads_what_is_there() {
    let bytes = write_with(crate::common::Codec::Binary, SerializationConfig::default(), |w| {
        vec![10i16, 20, 30].write_value(None, w)
    });
    let cut = &bytes[..bytes.len() - 3];
    let back = read_with(crate::common::Codec::Binary, cut, SerializationConfig::default(), |r| {
        Vec::<i16>::read_value(r)
    })
    .unwrap();
    assert_ne!(back, Some(vec![10, 20, 30]));
}
