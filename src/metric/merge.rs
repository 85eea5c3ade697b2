use serde_json::Value;
use std::collections::BTreeMap;

/// Folds `layers` into one map; a key in a later layer overwrites the same
/// key from any earlier one. Keys come out in ascending byte order.
pub fn ordered_merge<I, L>(layers: I) -> BTreeMap<String, Value>
where
    I: IntoIterator<Item = L>,
    L: IntoIterator<Item = (String, Value)>,
{
    let mut merged = BTreeMap::new();
    for layer in layers {
        merged.extend(layer);
    }
    merged
}

/// `null`, `""` and `false` carry no information in a metric log line.
/// Zero and empty containers do.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Drops top-level entries whose value is blank.
pub fn drop_blank(map: BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    map.into_iter().filter(|(_, v)| !is_blank(v)).collect()
}
