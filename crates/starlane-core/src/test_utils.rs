//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::design::CompiledShipStats;
use crate::fleet::stats::MovementStats;
use crate::fleet::{Fleet, FleetLocation, ShipStack};
use crate::id::{FleetId, PlayerId, StarId};
use crate::minerals::{Cost, Minerals};
use crate::registry::{DesignRegistry, DesignRegistryBuilder};
use crate::state::{GameState, Habitat, Owner, Player, Position, Species, SpeciesTraits, Star};

pub const HUMAN: PlayerId = PlayerId(0);

// ===========================================================================
// Players
// ===========================================================================

/// Thrives at 50/50 with a wide tolerance, so a default star rates 100 %.
pub fn humanoid() -> Species {
    Species {
        id: "humanoid".to_string(),
        name: "Humanoid".to_string(),
        habitat: Habitat {
            ideal_temperature: 50,
            ideal_atmosphere: 50,
            tolerance_radius: 50,
        },
        traits: SpeciesTraits::default(),
    }
}

pub fn ai_player(id: PlayerId) -> Player {
    Player::new(id, format!("AI {}", id.0), humanoid())
}

/// Turn 1, human player only, no stars or fleets.
pub fn empty_state() -> GameState {
    GameState::new("test", Player::new(HUMAN, "Human", humanoid()))
}

// ===========================================================================
// Stars
// ===========================================================================

/// An unowned star at `position`.
pub fn add_star(state: &mut GameState, id: StarId, position: Position) -> StarId {
    state
        .stars
        .push(Star::new(id, format!("Star {}", id.0), position));
    id
}

/// A colony of `population` owned by `owner`, with a 1,000,000 cap and 50 %
/// concentrations. No facilities, no governor.
pub fn add_colony(
    state: &mut GameState,
    id: StarId,
    position: Position,
    owner: PlayerId,
    population: u64,
) -> StarId {
    let mut star = Star::new(id, format!("Colony {}", id.0), position);
    star.owner = Owner::Player(owner);
    star.population = population;
    star.max_population = 1_000_000;
    star.mineral_concentrations = Minerals::new(50, 50, 50);
    state.stars.push(star);
    id
}

// ===========================================================================
// Designs
// ===========================================================================

fn hull(warp: u32, ideal: u32, mass: u64, fuel: u64, efficiency: u32, cost: Cost) -> CompiledShipStats {
    CompiledShipStats {
        warp_speed: warp,
        ideal_warp: ideal,
        fuel_capacity: fuel,
        fuel_efficiency: efficiency,
        is_ramscoop: false,
        cargo_capacity: 0,
        colonist_capacity: 0,
        scan_range: 0,
        mass,
        cost,
        has_engine: warp > 0,
        has_colony_module: false,
        is_starbase: false,
    }
}

pub fn scout() -> CompiledShipStats {
    CompiledShipStats {
        scan_range: 100,
        ..hull(9, 6, 20, 50, 100, Cost::new(10, 4, 2, 2))
    }
}

pub fn freighter() -> CompiledShipStats {
    CompiledShipStats {
        cargo_capacity: 250,
        ..hull(6, 5, 80, 200, 120, Cost::new(25, 10, 0, 5))
    }
}

pub fn colony_ship() -> CompiledShipStats {
    CompiledShipStats {
        colonist_capacity: 25_000,
        has_colony_module: true,
        ..hull(6, 6, 50, 150, 100, Cost::new(20, 10, 5, 10))
    }
}

pub fn ramscoop() -> CompiledShipStats {
    CompiledShipStats {
        is_ramscoop: true,
        ..hull(8, 8, 30, 100, 0, Cost::new(30, 12, 4, 6))
    }
}

pub fn starbase() -> CompiledShipStats {
    CompiledShipStats {
        is_starbase: true,
        ..hull(0, 1, 500, 0, 100, Cost::new(200, 80, 40, 60))
    }
}

pub fn space_station() -> CompiledShipStats {
    CompiledShipStats {
        is_starbase: true,
        scan_range: 150,
        ..hull(0, 1, 1_000, 0, 100, Cost::new(400, 160, 80, 120))
    }
}

/// scout, freighter, colony_ship, ramscoop, starbase, space_station.
pub fn standard_registry() -> DesignRegistry {
    let mut builder = DesignRegistryBuilder::new();
    let designs = [
        ("scout", scout()),
        ("freighter", freighter()),
        ("colony_ship", colony_ship()),
        ("ramscoop", ramscoop()),
        ("starbase", starbase()),
        ("space_station", space_station()),
    ];
    for (name, stats) in designs {
        builder.register(name, stats).unwrap();
    }
    builder.build().unwrap()
}

// ===========================================================================
// Fleets
// ===========================================================================

/// Insert a fleet with full tanks, bypassing the fleet limit.
pub fn add_fleet(
    state: &mut GameState,
    owner: PlayerId,
    location: FleetLocation,
    ships: &[(&str, u32)],
    registry: &DesignRegistry,
) -> FleetId {
    let name = format!("Fleet {}", state.fleet_count(owner) + 1);
    let mut fleet = Fleet::new(name, owner, location);
    for &(design, count) in ships {
        fleet.ships.push(ShipStack::new(design, count));
    }
    fleet.fuel = MovementStats::for_fleet(&fleet, registry).fuel_capacity as f64;
    state.fleets.insert(fleet)
}
