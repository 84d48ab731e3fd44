//! Tunable rule constants for turn resolution.
//!
//! Every section carries `#[serde(default)]`, so a rules file only needs to
//! mention the values it overrides. `RulesConfig::default()` is the stock
//! rule set.

use crate::build::ProjectKind;
use crate::fixed::{Fixed64, f64_to_fixed64};
use crate::id::DesignId;
use crate::minerals::Cost;
use crate::state::Governor;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Root
// ---------------------------------------------------------------------------

/// All rule constants consumed by the turn engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub movement: MovementRules,
    pub limits: FleetLimits,
    pub economy: EconomyRules,
    pub population: PopulationRules,
    pub research: ResearchRules,
    pub build: BuildRules,
    pub scanning: ScanRules,
}

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementRules {
    /// Light-years covered per turn per warp tier.
    pub ly_per_warp: f64,
    /// A Move ending this close to a star ends in orbit of it.
    pub capture_distance: f64,
    /// Distance under which a fleet counts as having arrived.
    pub arrival_epsilon: f64,
    /// Fraction of fuel capacity restored per turn in orbit of an owned star.
    pub orbit_refuel_fraction: f64,
    /// Same, when the owner also has a starbase in that orbit.
    pub starbase_refuel_fraction: f64,
    /// Fraction restored per turn in deep space by a ramscoop engine.
    pub ramscoop_refuel_fraction: f64,
}

impl Default for MovementRules {
    fn default() -> Self {
        Self {
            ly_per_warp: 20.0,
            capture_distance: 2.0,
            arrival_epsilon: 1e-6,
            orbit_refuel_fraction: 0.25,
            starbase_refuel_fraction: 1.0,
            ramscoop_refuel_fraction: 0.15,
        }
    }
}

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Hard limits. Exceeding either aborts the mutation with an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetLimits {
    pub max_fleets_per_player: usize,
    pub max_ships_per_stack: u32,
}

impl Default for FleetLimits {
    fn default() -> Self {
        Self {
            max_fleets_per_player: 512,
            max_ships_per_stack: 32_000,
        }
    }
}

// ---------------------------------------------------------------------------
// Economy and population
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyRules {
    /// Colonists needed to operate one mine or factory.
    pub population_per_facility: u64,
    /// Concentration drops by `extraction / depletion_divisor`, rounded.
    pub depletion_divisor: u64,
}

impl Default for EconomyRules {
    fn default() -> Self {
        Self {
            population_per_facility: 10,
            depletion_divisor: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationRules {
    /// Max population per habitability percent (1,000,000 at 100 %).
    pub max_population_per_percent: u64,
    /// Growth rate is `habitability / growth_divisor` (0.1 at 100 %).
    pub growth_divisor: u64,
    /// Decay per negative habitability percent, in basis points.
    pub decay_basis_points_per_percent: u64,
    /// Upper bound on the per-turn decay fraction, in basis points.
    pub max_decay_basis_points: u64,
    /// Max population of a freshly founded colony on a hostile world.
    pub hostile_colony_max_population: u64,
}

impl Default for PopulationRules {
    fn default() -> Self {
        Self {
            max_population_per_percent: 10_000,
            growth_divisor: 1_000,
            decay_basis_points_per_percent: 15,
            max_decay_basis_points: 1_500,
            hostile_colony_max_population: 1_000,
        }
    }
}

// ---------------------------------------------------------------------------
// Research
// ---------------------------------------------------------------------------

/// Level cost curve: `floor(base_cost * cost_multiplier^(level - 1))`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchRules {
    pub base_cost: u32,
    pub cost_multiplier: f64,
    pub max_level: u32,
}

impl ResearchRules {
    pub fn multiplier(&self) -> Fixed64 {
        f64_to_fixed64(self.cost_multiplier)
    }
}

impl Default for ResearchRules {
    fn default() -> Self {
        Self {
            base_cost: 50,
            cost_multiplier: 1.75,
            max_level: 26,
        }
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Default cost of each non-ship project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectCosts {
    pub mine: Cost,
    pub factory: Cost,
    pub defense: Cost,
    pub research: Cost,
    pub terraform: Cost,
    pub scanner: Cost,
}

impl ProjectCosts {
    /// Cost of a project. Ships are priced by their design, so `None`.
    pub fn for_project(&self, kind: ProjectKind) -> Option<Cost> {
        match kind {
            ProjectKind::Mine => Some(self.mine),
            ProjectKind::Factory => Some(self.factory),
            ProjectKind::Defense => Some(self.defense),
            ProjectKind::Research => Some(self.research),
            ProjectKind::Terraform => Some(self.terraform),
            ProjectKind::Scanner => Some(self.scanner),
            ProjectKind::Ship => None,
        }
    }
}

impl Default for ProjectCosts {
    fn default() -> Self {
        Self {
            mine: Cost::new(5, 0, 0, 0),
            factory: Cost::new(10, 0, 0, 4),
            defense: Cost::new(15, 2, 2, 0),
            research: Cost::new(10, 0, 0, 0),
            terraform: Cost::new(25, 0, 0, 5),
            scanner: Cost::new(50, 5, 0, 10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildRules {
    pub costs: ProjectCosts,
    /// Percent of an old starbase's mineral cost credited on upgrade.
    pub starbase_scrap_percent: u64,
    /// Design built by a ship project that names none.
    pub default_ship_design: DesignId,
    /// Governor assigned to newly founded colonies.
    pub default_governor: Governor,
}

impl Default for BuildRules {
    fn default() -> Self {
        Self {
            costs: ProjectCosts::default(),
            starbase_scrap_percent: 75,
            default_ship_design: DesignId::new("scout"),
            default_governor: Governor::Balanced,
        }
    }
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanRules {
    /// Range of the scanner circle every owned colony has regardless of
    /// installed scanners.
    pub self_scan_range: u32,
}

impl Default for ScanRules {
    fn default() -> Self {
        Self { self_scan_range: 10 }
    }
}
