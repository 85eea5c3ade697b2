//! Input checks shared by every record mutation.
//!
//! Each mutation describes its inputs as a list of [`Rule`]s and runs them
//! through [`check`] before touching any state, so a failing rule never
//! leaves a half-applied write behind.

use crate::error::MetricError;

pub const MAX_KEY_LENGTH: usize = 255;
pub const MAX_NAMESPACE_LENGTH: usize = 255;
pub const MAX_DIMENSION_VALUE_LENGTH: usize = 1024;
pub const MAX_DIMENSIONS: usize = 30;
pub const MAX_METRICS: usize = 100;

/// One precondition on a pending mutation.
#[derive(Debug, Clone, Copy)]
pub enum Rule<'a> {
    Ascii(&'a str),
    Length(&'a str, usize),
    Capacity(usize, usize),
}

/// Fails if any character lies outside the 7-bit ASCII range.
pub fn ascii(value: &str) -> Result<(), MetricError> {
    if value.is_ascii() {
        Ok(())
    } else {
        Err(MetricError::HasNonAsciiCharacters.logged())
    }
}

/// Fails if `value` is empty or longer than `max` characters (inclusive bound).
pub fn length_within(value: &str, max: usize) -> Result<(), MetricError> {
    let len = value.chars().count();
    if len == 0 || len > max {
        Err(MetricError::LengthNotWithinBounds(max).logged())
    } else {
        Ok(())
    }
}

/// Fails if a collection already holding `current` entries cannot take one more.
pub fn capacity(current: usize, max: usize) -> Result<(), MetricError> {
    if current >= max {
        Err(MetricError::CannotAddMoreItemsToArray(max).logged())
    } else {
        Ok(())
    }
}

/// Runs every ASCII rule, then every length rule, then every capacity rule,
/// stopping at the first failure.
pub fn check(rules: &[Rule<'_>]) -> Result<(), MetricError> {
    for rule in rules {
        if let Rule::Ascii(value) = rule {
            ascii(value)?;
        }
    }
    for rule in rules {
        if let Rule::Length(value, max) = rule {
            length_within(value, *max)?;
        }
    }
    for rule in rules {
        if let Rule::Capacity(current, max) = rule {
            capacity(*current, *max)?;
        }
    }
    Ok(())
}

/// Rules for a property key.
pub fn key_rules(key: &str) -> [Rule<'_>; 2] {
    [Rule::Ascii(key), Rule::Length(key, MAX_KEY_LENGTH)]
}
