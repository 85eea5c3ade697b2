pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod metric;

// Re-export the builder surface for convenient access
pub use config::{StartOptions, StaticMetadata};
pub use context::{LambdaMetadata, MetadataSource};
pub use error::MetricError;
pub use metric::{start, MetricLog, MetricRecord, PropertyValue, Unit};
