//! Serde data file structs for game content definitions.
//!
//! These structs define the on-disk format for ship designs and species.
//! They are deserialized from RON, JSON, or TOML data files and then
//! converted into engine types by the loader. Rules files deserialize
//! straight into [`RulesConfig`](starlane_core::config::RulesConfig).

use serde::Deserialize;
use starlane_core::design::CompiledShipStats;
use starlane_core::fixed::f64_to_fixed64;
use starlane_core::minerals::{Cost, Minerals};
use starlane_core::state::{Habitat, Species, SpeciesTraits};

// ===========================================================================
// Designs
// ===========================================================================

/// A build cost in a data file. Omitted minerals are zero.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct CostData {
    pub resources: u64,
    pub ironium: u64,
    pub boranium: u64,
    pub germanium: u64,
}

impl From<CostData> for Cost {
    fn from(c: CostData) -> Self {
        Cost {
            resources: c.resources,
            minerals: Minerals::new(c.ironium, c.boranium, c.germanium),
        }
    }
}

fn default_ideal_warp() -> u32 {
    1
}

fn default_efficiency() -> u32 {
    100
}

/// A ship design definition in a data file.
///
/// Only `name` and `mass` are required. A design with no `warp_speed` has no
/// engine; a design with `colonist_capacity` carries a colony module.
#[derive(Debug, Clone, Deserialize)]
pub struct DesignData {
    pub name: String,
    pub mass: u64,
    #[serde(default)]
    pub warp_speed: u32,
    #[serde(default = "default_ideal_warp")]
    pub ideal_warp: u32,
    #[serde(default)]
    pub fuel_capacity: u64,
    #[serde(default = "default_efficiency")]
    pub fuel_efficiency: u32,
    #[serde(default)]
    pub ramscoop: bool,
    #[serde(default)]
    pub cargo_capacity: u64,
    #[serde(default)]
    pub colonist_capacity: u64,
    #[serde(default)]
    pub scan_range: u32,
    #[serde(default)]
    pub starbase: bool,
    #[serde(default)]
    pub cost: CostData,
}

impl DesignData {
    pub fn to_stats(&self) -> CompiledShipStats {
        CompiledShipStats {
            warp_speed: self.warp_speed,
            ideal_warp: self.ideal_warp,
            fuel_capacity: self.fuel_capacity,
            fuel_efficiency: self.fuel_efficiency,
            is_ramscoop: self.ramscoop,
            cargo_capacity: self.cargo_capacity,
            colonist_capacity: self.colonist_capacity,
            scan_range: self.scan_range,
            mass: self.mass,
            cost: self.cost.into(),
            has_engine: self.warp_speed > 0,
            has_colony_module: self.colonist_capacity > 0,
            is_starbase: self.starbase,
        }
    }
}

/// TOML wrapper: `[[designs]]` tables.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlDesigns {
    pub designs: Vec<DesignData>,
}

// ===========================================================================
// Species
// ===========================================================================

/// Trait modifiers as plain fractions (`0.1` is +10 %).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct TraitsData {
    pub growth: f64,
    pub mining: f64,
    pub research: f64,
    pub ship_cost: f64,
}

impl From<TraitsData> for SpeciesTraits {
    fn from(t: TraitsData) -> Self {
        SpeciesTraits {
            growth: f64_to_fixed64(t.growth),
            mining: f64_to_fixed64(t.mining),
            research: f64_to_fixed64(t.research),
            ship_cost: f64_to_fixed64(t.ship_cost),
        }
    }
}

/// A species definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeciesData {
    pub id: String,
    /// Display name. Defaults to `id`.
    #[serde(default)]
    pub name: Option<String>,
    pub ideal_temperature: i32,
    pub ideal_atmosphere: i32,
    pub tolerance: i32,
    #[serde(default)]
    pub traits: TraitsData,
}

impl SpeciesData {
    pub fn to_species(&self) -> Species {
        Species {
            id: self.id.clone(),
            name: self.name.clone().unwrap_or_else(|| self.id.clone()),
            habitat: Habitat {
                ideal_temperature: self.ideal_temperature,
                ideal_atmosphere: self.ideal_atmosphere,
                tolerance_radius: self.tolerance,
            },
            traits: self.traits.into(),
        }
    }
}
