use std::fmt;

use serde::{Deserialize, Serialize};

/// An experience value as read from the screen.
///
/// Serialized as a plain integer, with `-1` standing for an unreadable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Reading {
    Recognized(u32),
    Unrecognized,
}

impl Reading {
    pub fn value(self) -> Option<u32> {
        match self {
            Reading::Recognized(v) => Some(v),
            Reading::Unrecognized => None,
        }
    }

    pub fn is_recognized(self) -> bool {
        matches!(self, Reading::Recognized(_))
    }
}

impl From<Option<u32>> for Reading {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Reading::Unrecognized, Reading::Recognized)
    }
}

impl From<i64> for Reading {
    fn from(value: i64) -> Self {
        u32::try_from(value).map_or(Reading::Unrecognized, Reading::Recognized)
    }
}

impl From<Reading> for i64 {
    fn from(reading: Reading) -> Self {
        reading.value().map_or(-1, i64::from)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Recognized(v) => write!(f, "{:02}", v),
            Reading::Unrecognized => f.write_str("-1"),
        }
    }
}

/// Builds readings from integers; negative values are unreadable.
#[cfg(test)]
pub(crate) fn readings(values: &[i64]) -> Vec<Reading> {
    values.iter().map(|&v| Reading::from(v)).collect()
}
