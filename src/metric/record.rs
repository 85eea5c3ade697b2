use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::unit::Unit;

/// Key under which the EMF envelope lives in a log line.
pub const ENVELOPE_KEY: &str = "_aws";
pub const SERVICE_KEY: &str = "service";

/// Declares that a property holds a numeric measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricDefinition {
    pub name: String,
    pub unit: Unit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricDirective {
    pub namespace: String,
    pub dimensions: Vec<Vec<String>>,
    pub metrics: Vec<MetricDefinition>,
}

/// The `_aws` metadata block of an EMF log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope {
    pub timestamp: i64,
    pub cloud_watch_metrics: Vec<MetricDirective>,
}

/// Live accumulation target. Only ever replaced wholesale, never cleared
/// piecemeal.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    service: String,
    properties: BTreeMap<String, Value>,
    dimension_keys: Vec<String>,
    metrics: Vec<MetricDefinition>,
}

impl Record {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            properties: BTreeMap::new(),
            dimension_keys: Vec::new(),
            metrics: Vec::new(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub(crate) fn set_service(&mut self, service: &str) {
        self.service = service.to_string();
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn dimension_keys(&self) -> &[String] {
        &self.dimension_keys
    }

    pub fn metric_definitions(&self) -> &[MetricDefinition] {
        &self.metrics
    }

    pub(crate) fn insert_property(&mut self, key: &str, value: Value) {
        self.properties.insert(key.to_string(), value);
    }

    pub(crate) fn push_dimension(&mut self, key: &str) {
        self.dimension_keys.push(key.to_string());
    }

    pub(crate) fn push_metric(&mut self, name: &str, unit: Unit) {
        self.metrics.push(MetricDefinition {
            name: name.to_string(),
            unit,
        });
    }

    /// `service` is always the first dimension of the record.
    pub fn envelope(&self, namespace: &str, timestamp: i64) -> Envelope {
        let mut dimensions = Vec::with_capacity(self.dimension_keys.len() + 1);
        dimensions.push(SERVICE_KEY.to_string());
        dimensions.extend(self.dimension_keys.iter().cloned());

        Envelope {
            timestamp,
            cloud_watch_metrics: vec![MetricDirective {
                namespace: namespace.to_string(),
                dimensions: vec![dimensions],
                metrics: self.metrics.clone(),
            }],
        }
    }

    /// The record as a merge layer: service, then properties, then the
    /// envelope, which no property can displace.
    pub fn layer(&self, namespace: &str, timestamp: i64) -> BTreeMap<String, Value> {
        let mut layer = BTreeMap::new();
        layer.insert(SERVICE_KEY.to_string(), Value::String(self.service.clone()));
        layer.extend(self.properties.clone());
        let envelope = self.envelope(namespace, timestamp);
        layer.insert(ENVELOPE_KEY.to_string(), envelope_json(&envelope));
        layer
    }
}

fn envelope_json(envelope: &Envelope) -> Value {
    // Envelope holds only strings, integers and sequences; serialization cannot fail.
    serde_json::to_value(envelope).unwrap_or(Value::Null)
}

/// A finalized log line, keys in alphabetical order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricRecord(BTreeMap<String, Value>);

impl MetricRecord {
    pub(crate) fn new(fields: BTreeMap<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.0
    }

    pub fn service(&self) -> Option<&str> {
        self.get(SERVICE_KEY).and_then(Value::as_str)
    }

    pub fn envelope(&self) -> Option<Envelope> {
        let raw = self.get(ENVELOPE_KEY)?.clone();
        serde_json::from_value(raw).ok()
    }

    pub fn namespace(&self) -> Option<String> {
        self.envelope()?
            .cloud_watch_metrics
            .into_iter()
            .next()
            .map(|d| d.namespace)
    }

    pub fn timestamp(&self) -> Option<i64> {
        self.envelope().map(|e| e.timestamp)
    }

    /// Dimension keys of the first (and only) directive.
    pub fn dimensions(&self) -> Vec<String> {
        self.envelope()
            .and_then(|e| e.cloud_watch_metrics.into_iter().next())
            .and_then(|d| d.dimensions.into_iter().next())
            .unwrap_or_default()
    }

    pub fn metrics(&self) -> Vec<MetricDefinition> {
        self.envelope()
            .and_then(|e| e.cloud_watch_metrics.into_iter().next())
            .map(|d| d.metrics)
            .unwrap_or_default()
    }

    /// Single-line JSON rendering, without the trailing newline.
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MetricRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&line)
    }
}
