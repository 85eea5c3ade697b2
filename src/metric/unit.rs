use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{Display, EnumString, IntoStaticStr};

/// CloudWatch metric units. The strum spelling is the one written to and
/// read from log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, IntoStaticStr)]
pub enum Unit {
    Seconds,
    Microseconds,
    Milliseconds,
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
    Terabytes,
    Bits,
    Kilobits,
    Megabits,
    Gigabits,
    Terabits,
    Percent,
    Count,
    #[strum(serialize = "Bytes/Second")]
    BytesPerSecond,
    #[strum(serialize = "Kilobytes/Second")]
    KilobytesPerSecond,
    #[strum(serialize = "Megabytes/Second")]
    MegabytesPerSecond,
    #[strum(serialize = "Gigabytes/Second")]
    GigabytesPerSecond,
    #[strum(serialize = "Terabytes/Second")]
    TerabytesPerSecond,
    #[strum(serialize = "Bits/Second")]
    BitsPerSecond,
    #[strum(serialize = "Kilobits/Second")]
    KilobitsPerSecond,
    #[strum(serialize = "Megabits/Second")]
    MegabitsPerSecond,
    #[strum(serialize = "Gigabits/Second")]
    GigabitsPerSecond,
    #[strum(serialize = "Terabits/Second")]
    TerabitsPerSecond,
    #[strum(serialize = "Count/Second")]
    CountPerSecond,
    #[default]
    None,
}

impl Unit {
    /// The spelling CloudWatch expects in a metric definition.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<Unit>()
            .map_err(|_| de::Error::custom(format!("unknown metric unit '{}'", raw)))
    }
}
