//! Compiled ship statistics and the design resolver seam.
//!
//! The design compiler (hull + components → stats) lives outside the engine.
//! The engine only ever asks a [`DesignResolver`] for the finished
//! [`CompiledShipStats`] of a design id.

use crate::id::{DesignId, PlayerId};
use crate::minerals::Cost;
use crate::registry::DesignRegistry;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Everything the turn engine needs to know about a ship design.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompiledShipStats {
    /// Highest warp tier the engines reach. Starbases have 0.
    pub warp_speed: u32,
    /// Warp tier above which fuel use grows superlinearly.
    pub ideal_warp: u32,
    pub fuel_capacity: u64,
    /// Fuel burned per light-year relative to baseline (100). 0 burns nothing.
    pub fuel_efficiency: u32,
    pub is_ramscoop: bool,
    pub cargo_capacity: u64,
    pub colonist_capacity: u64,
    pub scan_range: u32,
    pub mass: u64,
    pub cost: Cost,
    pub has_engine: bool,
    pub has_colony_module: bool,
    pub is_starbase: bool,
}

impl CompiledShipStats {
    /// Stats assumed for a design the resolver does not know: a slow,
    /// ten-kT hull with a baseline engine and empty tanks.
    pub const FALLBACK: CompiledShipStats = CompiledShipStats {
        warp_speed: 1,
        ideal_warp: 6,
        fuel_capacity: 0,
        fuel_efficiency: 100,
        is_ramscoop: false,
        cargo_capacity: 0,
        colonist_capacity: 0,
        scan_range: 0,
        mass: 10,
        cost: Cost::ZERO,
        has_engine: false,
        has_colony_module: false,
        is_starbase: false,
    };
}

impl Default for CompiledShipStats {
    fn default() -> Self {
        Self::FALLBACK
    }
}

// ---------------------------------------------------------------------------
// Player designs
// ---------------------------------------------------------------------------

/// A design saved into the game, with its compiled stats attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipDesign {
    pub id: DesignId,
    pub name: String,
    pub hull: String,
    #[serde(default)]
    pub owner: Option<PlayerId>,
    #[serde(default)]
    pub created_turn: u32,
    pub stats: CompiledShipStats,
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Maps a design id to its compiled stats.
pub trait DesignResolver {
    fn resolve(&self, design: &DesignId) -> Option<CompiledShipStats>;

    /// Like [`resolve`](Self::resolve), substituting [`CompiledShipStats::FALLBACK`].
    fn resolve_or_fallback(&self, design: &DesignId) -> CompiledShipStats {
        self.resolve(design).unwrap_or(CompiledShipStats::FALLBACK)
    }
}

impl DesignResolver for [ShipDesign] {
    fn resolve(&self, design: &DesignId) -> Option<CompiledShipStats> {
        self.iter().find(|d| &d.id == design).map(|d| d.stats)
    }
}

/// Player designs saved in the game first, then the shared registry.
#[derive(Debug, Clone, Copy)]
pub struct DesignCatalog<'a> {
    pub designs: &'a [ShipDesign],
    pub registry: &'a DesignRegistry,
}

impl<'a> DesignCatalog<'a> {
    pub fn new(designs: &'a [ShipDesign], registry: &'a DesignRegistry) -> Self {
        Self { designs, registry }
    }
}

impl DesignResolver for DesignCatalog<'_> {
    fn resolve(&self, design: &DesignId) -> Option<CompiledShipStats> {
        self.designs
            .resolve(design)
            .or_else(|| self.registry.resolve(design))
    }
}
