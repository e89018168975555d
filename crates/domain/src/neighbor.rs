//! Neighbor: a typed adjacency between two zones.

use serde::{Deserialize, Serialize};

/// How two adjacent zones relate spatially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborType {
    #[default]
    Undefined,
    /// Separated by a wall or a door.
    ClosedSpace,
    /// Open-plan, neither side dominates.
    OpenSpace,
    /// Open-plan, this neighbor is the main area (e.g. the living room seen from the hallway).
    OpenSpaceMaster,
    /// Open-plan, this neighbor is the secondary area.
    OpenSpaceSlave,
}

impl NeighborType {
    /// Whether the relation is one of the open-plan variants.
    #[must_use]
    pub fn is_open_space(self) -> bool {
        matches!(
            self,
            Self::OpenSpace | Self::OpenSpaceMaster | Self::OpenSpaceSlave
        )
    }
}

/// A reference to another zone by name, with the relation type.
///
/// The name is resolved lazily through the zone manager; a name that does
/// not resolve is treated as "no neighbor".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Neighbor {
    pub zone_name: String,
    pub kind: NeighborType,
}

impl Neighbor {
    #[must_use]
    pub fn new(zone_name: impl Into<String>, kind: NeighborType) -> Self {
        Self {
            zone_name: zone_name.into(),
            kind,
        }
    }

    #[must_use]
    pub fn is_open_space(&self) -> bool {
        self.kind.is_open_space()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_report_open_space_for_all_open_variants() {
        assert!(NeighborType::OpenSpace.is_open_space());
        assert!(NeighborType::OpenSpaceMaster.is_open_space());
        assert!(NeighborType::OpenSpaceSlave.is_open_space());
    }

    #[test]
    fn should_not_report_open_space_for_closed_or_undefined() {
        assert!(!NeighborType::ClosedSpace.is_open_space());
        assert!(!NeighborType::Undefined.is_open_space());
    }

    #[test]
    fn should_roundtrip_neighbor_through_serde_json() {
        let neighbor = Neighbor::new("Kitchen", NeighborType::OpenSpaceSlave);
        let json = serde_json::to_string(&neighbor).unwrap();
        let parsed: Neighbor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, neighbor);
    }
}
