//! Level: the floor a zone sits on.

use serde::{Deserialize, Serialize};

/// Ordinal floor of a zone. Ordering follows the building from the ground up.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[default]
    Undefined,
    Basement,
    FirstFloor,
    SecondFloor,
    ThirdFloor,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::Basement => f.write_str("basement"),
            Self::FirstFloor => f.write_str("first_floor"),
            Self::SecondFloor => f.write_str("second_floor"),
            Self::ThirdFloor => f.write_str("third_floor"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_order_levels_from_the_ground_up() {
        assert!(Level::Basement < Level::FirstFloor);
        assert!(Level::SecondFloor < Level::ThirdFloor);
    }

    #[test]
    fn should_serialize_as_snake_case() {
        let json = serde_json::to_string(&Level::FirstFloor).unwrap();
        assert_eq!(json, "\"first_floor\"");
    }
}
