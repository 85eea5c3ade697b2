//! The metric log builder.
//!
//! # INVARIANTS
//! * A mutation validates all of its inputs before writing anything.
//! * At most 30 dimensions and 100 metric definitions per record.
//! * Flushing always leaves an empty record behind.
//! * Flushed keys are sorted; the live record wins every key collision.

pub mod logger;
pub mod merge;
pub mod record;
pub mod unit;
pub mod validate;
pub mod value;

pub use logger::{start, MetricLog};
pub use record::{Envelope, MetricDefinition, MetricDirective, MetricRecord, Record};
pub use unit::Unit;
pub use value::{PropertyValue, Scalar};
