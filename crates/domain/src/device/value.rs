//! Item values: the raw state carried by an underlying item.

use std::fmt;

/// The value of a single underlying item, as delivered by the host runtime.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ItemValue {
    On,
    Off,
    Open,
    Closed,
    Number(f64),
    Text(String),
    #[default]
    Undefined,
}

impl ItemValue {
    /// Whether the value represents an active state (`ON` or `OPEN`).
    #[must_use]
    pub fn is_on(&self) -> bool {
        matches!(self, Self::On | Self::Open)
    }

    /// Numeric reading, if the value is a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }
}

impl From<&str> for ItemValue {
    fn from(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.to_ascii_uppercase().as_str() {
            "ON" => Self::On,
            "OFF" => Self::Off,
            "OPEN" => Self::Open,
            "CLOSED" => Self::Closed,
            "" | "NULL" | "UNDEF" => Self::Undefined,
            _ => raw
                .parse::<f64>()
                .map_or_else(|_| Self::Text(raw.to_string()), Self::Number),
        }
    }
}

impl From<f64> for ItemValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for ItemValue {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

impl fmt::Display for ItemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("ON"),
            Self::Off => f.write_str("OFF"),
            Self::Open => f.write_str("OPEN"),
            Self::Closed => f.write_str("CLOSED"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
            Self::Undefined => f.write_str("UNDEF"),
        }
    }
}
