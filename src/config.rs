use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::context::MetadataSource;

/// Consulted when `namespace` is not passed to `start`.
pub const ENV_NAMESPACE: &str = "EMFLOG_NAMESPACE";
/// Consulted when `service_name` is not passed to `start`.
pub const ENV_SERVICE_NAME: &str = "EMFLOG_SERVICE_NAME";

/// Inputs to [`crate::start`]. Every field is optional; unset fields fall
/// back to the environment (names) or to the previously started log.
#[derive(Clone, Default)]
pub struct StartOptions {
    pub namespace: Option<String>,
    pub service_name: Option<String>,
    pub event: Option<Value>,
    pub context: Option<Value>,
    pub correlation_id: Option<String>,
    pub metadata_config: Option<Map<String, Value>>,
    pub metadata_source: Option<Arc<dyn MetadataSource>>,
}

impl StartOptions {
    pub fn new(namespace: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            service_name: Some(service_name.into()),
            ..Self::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    pub fn with_event(mut self, event: Value) -> Self {
        self.event = Some(event);
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_metadata_config(mut self, config: Map<String, Value>) -> Self {
        self.metadata_config = Some(config);
        self
    }

    pub fn with_static_metadata(self, metadata: &StaticMetadata) -> Self {
        self.with_metadata_config(metadata.to_config())
    }

    pub fn with_metadata_source(mut self, source: impl MetadataSource + 'static) -> Self {
        self.metadata_source = Some(Arc::new(source));
        self
    }

    /// Namespace after the environment fallback; empty if unresolved.
    pub fn resolved_namespace(&self) -> String {
        resolve(self.namespace.as_deref(), ENV_NAMESPACE)
    }

    /// Service name after the environment fallback; empty if unresolved.
    pub fn resolved_service_name(&self) -> String {
        resolve(self.service_name.as_deref(), ENV_SERVICE_NAME)
    }
}

impl fmt::Debug for StartOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StartOptions")
            .field("namespace", &self.namespace)
            .field("service_name", &self.service_name)
            .field("event", &self.event)
            .field("context", &self.context)
            .field("correlation_id", &self.correlation_id)
            .field("metadata_config", &self.metadata_config)
            .field("metadata_source", &self.metadata_source.is_some())
            .finish()
    }
}

/// Explicit value, then environment variable, then empty. Empty strings
/// count as unset at both steps.
fn resolve(explicit: Option<&str>, var: &str) -> String {
    explicit
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var(var).ok().filter(|v| !v.is_empty()))
        .unwrap_or_default()
}

/// Producer descriptors merged into every record as static config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticMetadata {
    pub version: u32,
    pub owner: String,
    pub host_platform: String,
    pub domain: String,
    pub system: String,
    pub service: String,
    pub team: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_sensitivity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
}

impl StaticMetadata {
    pub fn to_config(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}
