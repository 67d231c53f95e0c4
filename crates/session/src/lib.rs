//! Session state for graphstream
//!
//! This crate holds everything that lives for the duration of one
//! serialization or deserialization session:
//! - TypeBinder: Mapping between runtime types and stable wire names
//! - SerializationContext / DeserializationContext: Type ids, internal
//!   references and external resolvers of one stream
//! - External*ReferenceResolver: Hooks for objects living outside the graph
//! - Cache / Cached: Bounded pools of reusable resources

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binder;
pub mod cache;
pub mod context;
pub mod resolvers;

pub use binder::{DefaultTypeBinder, TypeBinder};
pub use cache::{Cache, Cached, Recyclable, MAX_CACHE_SIZE};
pub use context::{DeserializationContext, SerializationContext};
pub use resolvers::{
    ExternalGuidReferenceResolver, ExternalIndexReferenceResolver,
    ExternalStringReferenceResolver, IndexReferenceResolver,
};

use once_cell::sync::Lazy;

/// Pool of serialization contexts shared by the top-level entry points.
pub static SERIALIZATION_CONTEXTS: Lazy<Cache<SerializationContext>> = Lazy::new(Cache::new);

/// Pool of deserialization contexts shared by the top-level entry points.
pub static DESERIALIZATION_CONTEXTS: Lazy<Cache<DeserializationContext>> = Lazy::new(Cache::new);
