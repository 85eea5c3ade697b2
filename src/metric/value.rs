use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// A string or a number; the only shapes allowed inside a nested property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scalar(Value);

/// Value of a record property: a string, a number, or a flat mapping of
/// string keys to strings/numbers.
///
/// Non-finite floats are rendered as JSON `null` and vanish at flush.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyValue(Value);

impl PropertyValue {
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }
}

macro_rules! scalar_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Scalar {
                fn from(v: $t) -> Self {
                    Scalar(Value::from(v))
                }
            }

            impl From<$t> for PropertyValue {
                fn from(v: $t) -> Self {
                    PropertyValue(Value::from(v))
                }
            }
        )*
    };
}

scalar_from!(&str, String, i32, i64, u32, u64, usize, f32, f64);

impl From<Scalar> for PropertyValue {
    fn from(v: Scalar) -> Self {
        PropertyValue(v.0)
    }
}

impl<K: Into<String>, V: Into<Scalar>> From<BTreeMap<K, V>> for PropertyValue {
    fn from(map: BTreeMap<K, V>) -> Self {
        nested(map)
    }
}

impl<K: Into<String>, V: Into<Scalar>> From<HashMap<K, V>> for PropertyValue {
    fn from(map: HashMap<K, V>) -> Self {
        nested(map)
    }
}

fn nested<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> PropertyValue
where
    K: Into<String>,
    V: Into<Scalar>,
{
    let object: Map<String, Value> = entries
        .into_iter()
        .map(|(k, v)| (Into::<String>::into(k), Into::<Scalar>::into(v).0))
        .collect();
    PropertyValue(Value::Object(object))
}
