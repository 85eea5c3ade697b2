//! Contextual metadata attached to every flushed record.
//!
//! The builder never interprets the runtime-provided `event`/`context`
//! objects itself. It hands them to a [`MetadataSource`] and overlays the
//! flat string map that comes back.

pub mod lambda;

use serde_json::Value;
use std::collections::BTreeMap;

pub use lambda::LambdaMetadata;

/// Derives contextual fields (account, region, request id, ...) from the
/// opaque event and context objects of an invocation.
pub trait MetadataSource: Send + Sync {
    fn derive(&self, event: &Value, context: &Value) -> BTreeMap<String, String>;
}

impl<F> MetadataSource for F
where
    F: Fn(&Value, &Value) -> BTreeMap<String, String> + Send + Sync,
{
    fn derive(&self, event: &Value, context: &Value) -> BTreeMap<String, String> {
        self(event, context)
    }
}

/// Contributes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl MetadataSource for NoMetadata {
    fn derive(&self, _event: &Value, _context: &Value) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}
