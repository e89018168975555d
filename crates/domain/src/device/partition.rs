//! Arm modes of an alarm partition.

use serde::{Deserialize, Serialize};

use super::ItemValue;

/// Arm state of a security partition, as stored in its arm-mode item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmMode {
    Unarmed,
    ArmStay,
    ArmAway,
}

impl ArmMode {
    /// Decode the numeric arm-mode item value (`0`, `1`, `2`).
    #[must_use]
    pub fn from_value(value: &ItemValue) -> Option<Self> {
        let code = value.as_f64()?;
        [Self::Unarmed, Self::ArmStay, Self::ArmAway]
            .into_iter()
            .find(|mode| (mode.code() - code).abs() < f64::EPSILON)
    }

    /// Encode as the numeric arm-mode item value.
    #[must_use]
    pub fn to_value(self) -> ItemValue {
        ItemValue::Number(self.code())
    }

    fn code(self) -> f64 {
        match self {
            Self::Unarmed => 0.0,
            Self::ArmStay => 1.0,
            Self::ArmAway => 2.0,
        }
    }
}

impl std::fmt::Display for ArmMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unarmed => f.write_str("unarmed"),
            Self::ArmStay => f.write_str("armed_stay"),
            Self::ArmAway => f.write_str("armed_away"),
        }
    }
}
