//! Command-line surface of the `emflog` binary: one invocation, one line.

use clap::Parser;
use serde_json::Value;

use crate::config::{StartOptions, ENV_NAMESPACE, ENV_SERVICE_NAME};
use crate::error::MetricError;
use crate::metric::{MetricLog, PropertyValue, Unit};

#[derive(Parser, Debug, Clone)]
#[command(name = "emflog", about = "Emit one CloudWatch embedded-metric log line")]
pub struct Cli {
    /// Metric namespace
    #[arg(long, env = ENV_NAMESPACE)]
    pub namespace: Option<String>,

    /// Service name, also the first dimension
    #[arg(long, env = ENV_SERVICE_NAME)]
    pub service_name: Option<String>,

    /// Invocation event handed to the metadata source (JSON)
    #[arg(long, env = "EMFLOG_EVENT", value_parser = parse_json)]
    pub event: Option<Value>,

    /// Invocation context handed to the metadata source (JSON)
    #[arg(long, env = "EMFLOG_CONTEXT", value_parser = parse_json)]
    pub context: Option<Value>,

    #[arg(long, env = "EMFLOG_CORRELATION_ID")]
    pub correlation_id: Option<String>,

    /// KEY=VALUE, repeatable
    #[arg(long = "dimension", value_parser = parse_pair)]
    pub dimensions: Vec<(String, String)>,

    /// KEY=NUMBER[:UNIT], repeatable
    #[arg(long = "metric", value_parser = parse_metric)]
    pub metrics: Vec<MetricArg>,

    /// KEY=VALUE, repeatable
    #[arg(long = "property", value_parser = parse_pair)]
    pub properties: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricArg {
    pub key: String,
    pub value: PropertyValue,
    pub unit: Unit,
}

impl Cli {
    pub fn start_options(&self) -> StartOptions {
        StartOptions {
            namespace: self.namespace.clone(),
            service_name: self.service_name.clone(),
            event: self.event.clone(),
            context: self.context.clone(),
            correlation_id: self.correlation_id.clone(),
            ..StartOptions::default()
        }
    }

    /// Starts a log and applies every dimension, metric and property.
    pub fn build_log(&self) -> Result<MetricLog, MetricError> {
        let mut log = MetricLog::start(self.start_options())?;
        for (key, value) in &self.dimensions {
            log.put_dimension(key, value)?;
        }
        for metric in &self.metrics {
            log.put_metric(&metric.key, metric.value.clone(), metric.unit)?;
        }
        for (key, value) in &self.properties {
            log.set_property(key, value.as_str())?;
        }
        Ok(log)
    }
}

pub fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("'{}' is not KEY=VALUE", raw))
}

pub fn parse_metric(raw: &str) -> Result<MetricArg, String> {
    let (key, rest) = parse_pair(raw)?;
    let (number, unit) = match rest.split_once(':') {
        Some((number, unit)) => {
            let unit = unit
                .parse::<Unit>()
                .map_err(|_| format!("unknown metric unit '{}'", unit))?;
            (number.to_string(), unit)
        }
        None => (rest, Unit::None),
    };
    Ok(MetricArg {
        key,
        value: parse_number(&number)?,
        unit,
    })
}

fn parse_number(raw: &str) -> Result<PropertyValue, String> {
    if let Ok(int) = raw.parse::<i64>() {
        return Ok(int.into());
    }
    raw.parse::<f64>()
        .map(PropertyValue::from)
        .map_err(|_| format!("metric value '{}' is not a number", raw))
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {}", e))
}
