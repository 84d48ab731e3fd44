//! Fleets: groups of ship stacks that move, carry cargo, and follow orders.
//!
//! - [`stats`]: aggregate movement statistics and the fuel curve.
//! - [`movement`]: one turn of order resolution per fleet, refuelling included.
//! - [`ops`]: creating fleets, adding ships, removing emptied fleets.
//! - [`cargo`]: loading and unloading at a star.
//! - [`colonize`]: settling an unowned star with a colony ship.
//! - [`transfer`]: splitting, merging, and trading between co-located fleets.

pub mod cargo;
pub mod colonize;
pub mod movement;
pub mod ops;
pub mod stats;
pub mod transfer;

use crate::id::{DesignId, FleetId, PlayerId, StarId};
use crate::minerals::Minerals;
use crate::state::Position;
use serde::{Deserialize, Serialize};

pub use cargo::{CargoAmount, CargoManifest};
pub use ops::FleetError;
pub use transfer::TransferSpec;

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Where a fleet is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FleetLocation {
    Orbit { star: StarId },
    Space { position: Position },
}

// ---------------------------------------------------------------------------
// Ships and cargo
// ---------------------------------------------------------------------------

/// `count` ships of one design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipStack {
    pub design: DesignId,
    pub count: u32,
    /// Accumulated damage across the stack.
    #[serde(default)]
    pub damage: u32,
}

impl ShipStack {
    pub fn new(design: impl Into<DesignId>, count: u32) -> Self {
        Self {
            design: design.into(),
            count,
            damage: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cargo {
    pub resources: u64,
    pub minerals: Minerals,
    pub colonists: u64,
}

impl Cargo {
    /// Hold space used, in kT. Colonists take 1 kT per thousand.
    pub fn hold_used(&self) -> u64 {
        self.resources.saturating_add(self.mass())
    }

    /// Mass the engines have to push. Resources take hold space but weigh
    /// nothing.
    pub fn mass(&self) -> u64 {
        self.minerals.total().saturating_add(self.colonists / 1000)
    }

    pub fn is_empty(&self) -> bool {
        self.resources == 0 && self.minerals.is_zero() && self.colonists == 0
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// What an Orbit order turns into once the fleet arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrbitAction {
    Load(CargoManifest),
    Unload(CargoManifest),
    Colonize,
    Decommission,
    Wait,
}

/// A standing order. The head of a fleet's order list is resolved each turn;
/// orders are removed once complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FleetOrder {
    Move {
        destination: Position,
        warp: Option<u32>,
    },
    Orbit {
        star: StarId,
        warp: Option<u32>,
        action: Option<OrbitAction>,
    },
    Colonize {
        star: StarId,
    },
    Attack {
        target: FleetId,
        warp: Option<u32>,
    },
    Load {
        star: StarId,
        manifest: CargoManifest,
    },
    Unload {
        star: StarId,
        manifest: CargoManifest,
    },
    Decommission {
        star: StarId,
    },
    /// Hold position for the rest of the turn.
    Wait,
}

impl OrbitAction {
    /// The concrete order this action becomes at `star`.
    pub fn into_order(self, star: StarId) -> FleetOrder {
        match self {
            OrbitAction::Load(manifest) => FleetOrder::Load { star, manifest },
            OrbitAction::Unload(manifest) => FleetOrder::Unload { star, manifest },
            OrbitAction::Colonize => FleetOrder::Colonize { star },
            OrbitAction::Decommission => FleetOrder::Decommission { star },
            OrbitAction::Wait => FleetOrder::Wait,
        }
    }
}

// ---------------------------------------------------------------------------
// Fleet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fleet {
    pub name: String,
    pub owner: PlayerId,
    pub location: FleetLocation,
    pub ships: Vec<ShipStack>,
    /// mg of fuel. Never negative, never above total tank capacity.
    pub fuel: f64,
    #[serde(default)]
    pub cargo: Cargo,
    #[serde(default)]
    pub orders: Vec<FleetOrder>,
}

impl Fleet {
    pub fn new(name: impl Into<String>, owner: PlayerId, location: FleetLocation) -> Self {
        Self {
            name: name.into(),
            owner,
            location,
            ships: Vec::new(),
            fuel: 0.0,
            cargo: Cargo::default(),
            orders: Vec::new(),
        }
    }

    /// Total ships across all stacks.
    pub fn ship_count(&self) -> u64 {
        self.ships.iter().map(|s| u64::from(s.count)).sum()
    }

    /// A fleet with no ships left is removed at the end of the fleet phase.
    pub fn is_empty(&self) -> bool {
        self.ship_count() == 0
    }

    pub fn orbiting(&self) -> Option<StarId> {
        match self.location {
            FleetLocation::Orbit { star } => Some(star),
            FleetLocation::Space { .. } => None,
        }
    }
}
