use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use super::merge::{drop_blank, ordered_merge};
use super::record::{MetricRecord, Record};
use super::unit::Unit;
use super::validate::{self, Rule};
use super::value::PropertyValue;
use crate::config::StartOptions;
use crate::context::{LambdaMetadata, MetadataSource};
use crate::error::MetricError;

/// Accumulates one EMF record per unit of work.
///
/// Lifecycle: [`start`] (or [`MetricLog::start`]) creates it, the `put_*` /
/// `set_*` calls mutate it, and [`MetricLog::flush`] finalizes the record,
/// writes it out and resets to an empty record under the same namespace and
/// service name.
///
/// The log is plain owned state. Code running several units of work in one
/// process must give each its own log, or `reset` between them.
pub struct MetricLog {
    namespace: String,
    service_name: String,
    correlation_id: String,
    event: Value,
    context: Value,
    metadata_config: Map<String, Value>,
    metadata_source: Arc<dyn MetadataSource>,
    record: Record,
}

/// Starts the log held in `slot`, or re-starts the one already there.
///
/// An existing log keeps its accumulated record; its names, correlation id,
/// event/context and static config are replaced by whatever `options`
/// supplies. The namespace and service name are checked on every call.
pub fn start(
    slot: &mut Option<MetricLog>,
    options: StartOptions,
) -> Result<&mut MetricLog, MetricError> {
    let (namespace, service_name) = resolve_names(&options)?;
    let log = slot.get_or_insert_with(|| MetricLog::blank(&namespace, &service_name));
    log.configure(options, namespace, service_name);
    Ok(log)
}

fn resolve_names(options: &StartOptions) -> Result<(String, String), MetricError> {
    let namespace = options.resolved_namespace();
    let service_name = options.resolved_service_name();
    if namespace.is_empty() || service_name.is_empty() {
        return Err(MetricError::MissingRequiredStartParams.logged());
    }
    Ok((namespace, service_name))
}

impl MetricLog {
    /// Starts a fresh, standalone log.
    pub fn start(options: StartOptions) -> Result<Self, MetricError> {
        let (namespace, service_name) = resolve_names(&options)?;
        let mut log = Self::blank(&namespace, &service_name);
        log.configure(options, namespace, service_name);
        Ok(log)
    }

    /// Same as the free [`start`] on an occupied slot.
    pub fn restart(&mut self, options: StartOptions) -> Result<&mut Self, MetricError> {
        let (namespace, service_name) = resolve_names(&options)?;
        self.configure(options, namespace, service_name);
        Ok(self)
    }

    fn blank(namespace: &str, service_name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            service_name: service_name.to_string(),
            correlation_id: String::new(),
            event: Value::Null,
            context: Value::Null,
            metadata_config: Map::new(),
            metadata_source: Arc::new(LambdaMetadata::new()),
            record: Record::new(service_name),
        }
    }

    fn configure(&mut self, options: StartOptions, namespace: String, service_name: String) {
        debug!(%namespace, service = %service_name, "starting metric log");

        if let Some(event) = options.event {
            self.event = event;
        }
        if let Some(context) = options.context {
            self.context = context;
        }
        if let Some(config) = options.metadata_config {
            self.metadata_config = config;
        }
        if let Some(id) = options.correlation_id.filter(|id| !id.is_empty()) {
            self.correlation_id = id;
        }
        if let Some(source) = options.metadata_source {
            self.metadata_source = source;
        }
        self.record.set_service(&service_name);
        self.namespace = namespace;
        self.service_name = service_name;
    }

    /// Replaces the record, correlation id, event/context and static config
    /// with empty ones. Namespace, service name and metadata source survive.
    pub fn reset(&mut self) {
        debug!(namespace = %self.namespace, "resetting metric log");
        self.record = Record::new(self.service_name.as_str());
        self.correlation_id.clear();
        self.event = Value::Null;
        self.context = Value::Null;
        self.metadata_config = Map::new();
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Stored verbatim; wins over any correlation id the metadata source finds.
    pub fn set_correlation_id(&mut self, correlation_id: impl Into<String>) {
        self.correlation_id = correlation_id.into();
    }

    pub fn set_namespace(&mut self, namespace: &str) -> Result<(), MetricError> {
        validate::check(&[
            Rule::Ascii(namespace),
            Rule::Length(namespace, validate::MAX_NAMESPACE_LENGTH),
        ])?;
        self.namespace = namespace.to_string();
        Ok(())
    }

    /// Sets `key` as a property and adds it to the record's dimension set.
    pub fn put_dimension(&mut self, key: &str, value: &str) -> Result<(), MetricError> {
        validate::check(&[
            Rule::Ascii(key),
            Rule::Ascii(value),
            Rule::Length(key, validate::MAX_KEY_LENGTH),
            Rule::Length(value, validate::MAX_DIMENSION_VALUE_LENGTH),
            Rule::Capacity(self.record.dimension_keys().len(), validate::MAX_DIMENSIONS),
        ])?;
        self.record.insert_property(key, Value::String(value.to_string()));
        self.record.push_dimension(key);
        Ok(())
    }

    /// Sets `key` as a property and declares it a metric. `None` for the
    /// unit means [`Unit::None`].
    pub fn put_metric(
        &mut self,
        key: &str,
        value: impl Into<PropertyValue>,
        unit: impl Into<Option<Unit>>,
    ) -> Result<(), MetricError> {
        let [ascii, length] = validate::key_rules(key);
        validate::check(&[
            ascii,
            length,
            Rule::Capacity(self.record.metric_definitions().len(), validate::MAX_METRICS),
        ])?;
        let value: PropertyValue = value.into();
        let unit: Option<Unit> = unit.into();
        self.record.insert_property(key, value.into_json());
        self.record.push_metric(key, unit.unwrap_or_default());
        Ok(())
    }

    /// Free-form field: searchable in the log, not aggregated as a metric.
    pub fn set_property(
        &mut self,
        key: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<(), MetricError> {
        validate::check(&validate::key_rules(key))?;
        let value: PropertyValue = value.into();
        self.record.insert_property(key, value.into_json());
        Ok(())
    }

    /// Finalizes the record, writes it to stdout as one line and resets.
    ///
    /// A failed write is logged; the finalized record is returned either way.
    pub fn flush(&mut self) -> MetricRecord {
        let record = self.finalize();
        let stdout = io::stdout();
        if let Err(e) = emit(&mut stdout.lock(), &record) {
            error!(error = %e, "failed to write metric log line");
        }
        self.reset();
        record
    }

    /// Like [`MetricLog::flush`] but writes to `out`. The log is reset even
    /// when the write fails.
    pub fn flush_to<W: Write>(&mut self, out: &mut W) -> Result<MetricRecord, MetricError> {
        let record = self.finalize();
        let written = emit(out, &record);
        self.reset();
        written.map_err(|e| MetricError::from(e).logged())?;
        Ok(record)
    }

    /// Merges dynamic context, static config and the live record, in that
    /// order of precedence, and drops blank fields.
    fn finalize(&self) -> MetricRecord {
        let now = Utc::now();
        let epoch_millis = now.timestamp_millis();

        let mut dynamic: BTreeMap<String, Value> = self
            .metadata_source
            .derive(&self.event, &self.context)
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        if !self.correlation_id.is_empty() {
            dynamic.insert(
                "correlationId".to_string(),
                Value::String(self.correlation_id.clone()),
            );
        }
        dynamic.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        dynamic.insert(
            "timestamp".to_string(),
            Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        dynamic.insert(
            "timestampEpoch".to_string(),
            Value::String(epoch_millis.to_string()),
        );

        let static_config: BTreeMap<String, Value> =
            self.metadata_config.clone().into_iter().collect();
        let live = self.record.layer(&self.namespace, epoch_millis);

        let merged = ordered_merge([dynamic, static_config, live]);
        debug!(fields = merged.len(), "finalized metric log record");
        MetricRecord::new(drop_blank(merged))
    }
}

fn emit<W: Write>(out: &mut W, record: &MetricRecord) -> io::Result<()> {
    writeln!(out, "{}", record)?;
    out.flush()
}

impl fmt::Debug for MetricLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricLog")
            .field("namespace", &self.namespace)
            .field("service_name", &self.service_name)
            .field("correlation_id", &self.correlation_id)
            .field("metadata_config", &self.metadata_config)
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}
