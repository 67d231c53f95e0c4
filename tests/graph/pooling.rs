//! Pooling Tests
//!
//! Claimed contexts and buffers come back pristine, and pools stay bounded.

use graphstream::{
    serialize_value, Cache, Cached, DataFormat, ErrorHandlingPolicy, IndexReferenceResolver,
    JsonOptions, ObjectHandle, DESERIALIZATION_CONTEXTS, MEMORY_BUFFERS, SERIALIZATION_CONTEXTS,
};
use graphstream_session::MAX_CACHE_SIZE;
use once_cell::sync::Lazy;
use std::sync::Arc;

#[test]
fn claimed_serialization_context_is_pristine() {
    {
        let mut ctx = SERIALIZATION_CONTEXTS.claim();
        ctx.config_mut().json.format_as_readable = true;
        ctx.config_mut().debug.error_handling_policy = ErrorHandlingPolicy::ThrowOnErrors;
        ctx.set_index_resolver(Some(Arc::new(IndexReferenceResolver::new())));
        let object: ObjectHandle = Arc::new(5u8);
        ctx.try_register_internal_reference(&object);
        assert_eq!(ctx.reference_count(), 1);
    }

    // whichever idle context we get, it must look brand new
    let ctx = SERIALIZATION_CONTEXTS.claim();
    assert!(ctx.is_pooled());
    assert_eq!(ctx.reference_count(), 0);
    assert_eq!(ctx.type_count(), 0);
    assert_eq!(ctx.config().json, JsonOptions::default());
    assert_eq!(
        ctx.config().debug.error_handling_policy,
        ErrorHandlingPolicy::Resilient
    );
    assert!(ctx.try_register_external_reference_by_index(&(Arc::new(1u8) as ObjectHandle)).is_none());
}

#[test]
fn claimed_deserialization_context_is_pristine() {
    {
        let mut ctx = DESERIALIZATION_CONTEXTS.claim();
        ctx.register_internal_reference(3, Arc::new(9u16));
        ctx.config_mut().binary.compress_strings = true;
    }
    let ctx = DESERIALIZATION_CONTEXTS.claim();
    assert!(ctx.get_internal_reference(3).is_none());
    assert!(!ctx.config().binary.compress_strings);
}

#[test]
fn pools_stay_bounded() {
    let claimed: Vec<_> = (0..MAX_CACHE_SIZE + 4)
        .map(|_| SERIALIZATION_CONTEXTS.claim())
        .collect();
    drop(claimed);
    assert!(SERIALIZATION_CONTEXTS.len() <= MAX_CACHE_SIZE);

    for _ in 0..MAX_CACHE_SIZE + 4 {
        serialize_value(&42u32, DataFormat::Binary).unwrap();
    }
    assert!(MEMORY_BUFFERS.len() <= MAX_CACHE_SIZE);
}

#[test]
fn released_buffer_keeps_capacity() {
    static BUFFERS: Lazy<Cache<Vec<u8>>> = Lazy::new(Cache::new);

    {
        let mut buffer = BUFFERS.claim();
        buffer.extend(std::iter::repeat(0xAB).take(4096));
    }
    let buffer = BUFFERS.claim();
    assert!(buffer.is_empty());
    assert!(buffer.capacity() >= 4096);
}

#[test]
fn detached_and_taken_values_leave_the_pool_alone() {
    static BUFFERS: Lazy<Cache<Vec<u8>>> = Lazy::new(Cache::new);

    let detached = Cached::detached(vec![1u8, 2, 3]);
    assert!(!detached.is_pooled());
    drop(detached);
    assert!(BUFFERS.is_empty());

    let mut claimed = BUFFERS.claim();
    claimed.push(7);
    assert_eq!(claimed.into_inner(), vec![7]);
    assert!(BUFFERS.is_empty());
}
