use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    /// Identifies a fleet. Fleets are created and destroyed during play, so
    /// they live in a slot map rather than a dense vector.
    pub struct FleetId;
}

/// Identifies a star (and its colony). Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StarId(pub u32);

/// Identifies a player, human or AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

/// Identifies a ship design. Designs are referenced by name across the data
/// files ("scout", "colony_ship", ...), so the id wraps a string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesignId(pub String);

impl DesignId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "star#{}", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

impl fmt::Display for DesignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DesignId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_id_equality() {
        assert_eq!(StarId(3), StarId(3));
        assert_ne!(StarId(3), StarId(4));
    }

    #[test]
    fn design_id_from_str() {
        let a = DesignId::from("scout");
        let b = DesignId::new(String::from("scout"));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "scout");
        assert_eq!(a.to_string(), "scout");
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(PlayerId(0), "human");
        map.insert(PlayerId(1), "ai");
        assert_eq!(map[&PlayerId(1)], "ai");
    }

    #[test]
    fn fleet_ids_are_distinct() {
        let mut fleets = slotmap::SlotMap::<FleetId, ()>::with_key();
        let a = fleets.insert(());
        let b = fleets.insert(());
        assert_ne!(a, b);
    }
}
