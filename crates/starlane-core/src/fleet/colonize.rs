//! Settling a star with a colony ship.

use crate::config::RulesConfig;
use crate::design::DesignResolver;
use crate::economy::max_population_for;
use crate::fleet::Cargo;
use crate::fleet::ops::trim_fuel;
use crate::habitability::Habitability;
use crate::id::{FleetId, StarId};
use crate::state::{GameState, Owner, Star};

/// Why a colonize order could not be carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ColonizeRejection {
    #[error("fleet no longer exists")]
    UnknownFleet,
    #[error("target star does not exist")]
    UnknownStar,
    #[error("fleet is not in orbit of the target star")]
    NotInOrbit,
    #[error("star is already owned by a player")]
    AlreadyOwned,
    #[error("fleet carries no colony module")]
    NoColonyModule,
    #[error("fleet owner has no player record")]
    UnknownOwner,
}

/// A colony founded this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColonyFounded {
    pub star: StarId,
    pub population: u64,
    /// The colony ship was the fleet's last ship.
    pub fleet_removed: bool,
}

/// Spend one colony ship from `fleet` to settle `star`.
///
/// The new colony starts with the fleet's colonists (capped at its max
/// population), the default governor, and an empty queue. Cargo is unloaded
/// onto the surface and the spent ship is salvaged into the stockpiles. The
/// fleet's cargo and remaining orders are cleared.
pub fn colonize(
    state: &mut GameState,
    fleet_id: FleetId,
    star_id: StarId,
    resolver: &dyn DesignResolver,
    habitability: &dyn Habitability,
    rules: &RulesConfig,
) -> Result<ColonyFounded, ColonizeRejection> {
    let fleet = state
        .fleets
        .get(fleet_id)
        .ok_or(ColonizeRejection::UnknownFleet)?;
    let star_index = state
        .star_index(star_id)
        .ok_or(ColonizeRejection::UnknownStar)?;
    if fleet.orbiting() != Some(star_id) {
        return Err(ColonizeRejection::NotInOrbit);
    }
    if !state.stars[star_index].owner.is_colonizable() {
        return Err(ColonizeRejection::AlreadyOwned);
    }
    let stack_index = fleet
        .ships
        .iter()
        .position(|s| s.count > 0 && resolver.resolve_or_fallback(&s.design).has_colony_module)
        .ok_or(ColonizeRejection::NoColonyModule)?;
    let owner = fleet.owner;
    let species = state
        .player(owner)
        .map(|p| p.species.clone())
        .ok_or(ColonizeRejection::UnknownOwner)?;
    let ship_cost = resolver
        .resolve_or_fallback(&fleet.ships[stack_index].design)
        .cost;

    let fleet = &mut state.fleets[fleet_id];
    let cargo = std::mem::take(&mut fleet.cargo);
    fleet.ships[stack_index].count -= 1;
    fleet.orders.clear();
    trim_fuel(fleet, resolver);
    let fleet_removed = fleet.is_empty();
    if fleet_removed {
        state.fleets.remove(fleet_id);
    }

    let star = &mut state.stars[star_index];
    let hab = habitability.habitability(star, &species);
    star.owner = Owner::Player(owner);
    star.governor = Some(rules.build.default_governor);
    star.build_queue.clear();
    star.max_population = if hab > 0 {
        max_population_for(hab, &rules.population)
    } else {
        rules.population.hostile_colony_max_population
    };
    star.population = cargo.colonists.min(star.max_population);
    settle_cargo(star, &cargo);
    star.resources = star.resources.saturating_add(ship_cost.resources);
    star.surface_minerals += ship_cost.minerals;

    log::info!(
        "{owner} colonized {} ({star_id}) with {} colonists",
        star.name,
        star.population
    );
    Ok(ColonyFounded {
        star: star_id,
        population: star.population,
        fleet_removed,
    })
}

fn settle_cargo(star: &mut Star, cargo: &Cargo) {
    star.surface_minerals += cargo.minerals;
    star.resources = star.resources.saturating_add(cargo.resources);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::{FleetLocation, FleetOrder};
    use crate::habitability::EnvironmentHabitability;
    use crate::id::PlayerId;
    use crate::minerals::Minerals;
    use crate::state::{Governor, Position};
    use crate::test_utils::*;

    fn setup() -> (GameState, StarId, FleetId, crate::registry::DesignRegistry) {
        let mut state = empty_state();
        let target = add_star(&mut state, StarId(9), Position::new(5.0, 5.0));
        let registry = standard_registry();
        let fleet = add_fleet(
            &mut state,
            HUMAN,
            FleetLocation::Orbit { star: target },
            &[("colony_ship", 1)],
            &registry,
        );
        state.fleets[fleet].cargo.colonists = 25_000;
        state.fleets[fleet].cargo.minerals = Minerals::new(10, 0, 5);
        (state, target, fleet, registry)
    }

    #[test]
    fn colony_ship_founds_colony() {
        let (mut state, target, fleet, registry) = setup();
        let rules = RulesConfig::default();
        let founded =
            colonize(&mut state, fleet, target, &registry, &EnvironmentHabitability, &rules).unwrap();

        assert!(founded.fleet_removed);
        assert!(!state.fleets.contains_key(fleet));

        let star = state.star(target).unwrap();
        assert_eq!(star.owner, Owner::Player(HUMAN));
        assert_eq!(star.governor, Some(Governor::Balanced));
        assert_eq!(star.population, 25_000);
        assert_eq!(star.max_population, 1_000_000);
        // cargo plus salvaged colony ship minerals (10, 5, 10)
        assert_eq!(star.surface_minerals, Minerals::new(20, 5, 15));
        assert_eq!(star.resources, 20);
    }

    #[test]
    fn hostile_world_gets_small_cap() {
        let (mut state, target, fleet, registry) = setup();
        let rules = RulesConfig::default();
        let hostile = |_: &Star, _: &crate::state::Species| -> i32 { -20 };
        colonize(&mut state, fleet, target, &registry, &hostile, &rules).unwrap();
        let star = state.star(target).unwrap();
        assert_eq!(star.max_population, 1_000);
        assert_eq!(star.population, 1_000);
    }

    #[test]
    fn escorts_survive_colonization() {
        let (mut state, target, fleet, registry) = setup();
        state.fleets[fleet].ships.push(crate::fleet::ShipStack::new("scout", 1));
        state.fleets[fleet].orders.push(FleetOrder::Wait);
        let founded = colonize(
            &mut state,
            fleet,
            target,
            &registry,
            &EnvironmentHabitability,
            &RulesConfig::default(),
        )
        .unwrap();
        assert!(!founded.fleet_removed);
        let f = &state.fleets[fleet];
        assert_eq!(f.ship_count(), 1);
        assert!(f.orders.is_empty());
        assert!(f.cargo.is_empty());
    }

    #[test]
    fn surviving_fleet_fuel_fits_its_remaining_tanks() {
        let (mut state, target, fleet, registry) = setup();
        state.fleets[fleet].ships.push(crate::fleet::ShipStack::new("scout", 1));
        // colony ship 150 + scout 50, both full
        state.fleets[fleet].fuel = 200.0;
        colonize(
            &mut state,
            fleet,
            target,
            &registry,
            &EnvironmentHabitability,
            &RulesConfig::default(),
        )
        .unwrap();

        assert_eq!(state.fleets[fleet].fuel, 50.0);
        let violations = crate::validation::check_invariants(
            &state,
            &registry,
            &crate::config::FleetLimits::default(),
        );
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn owned_star_rejects_colony() {
        let (mut state, target, fleet, registry) = setup();
        state.star_mut(target).unwrap().owner = Owner::Player(PlayerId(1));
        let err = colonize(
            &mut state,
            fleet,
            target,
            &registry,
            &EnvironmentHabitability,
            &RulesConfig::default(),
        );
        assert_eq!(err, Err(ColonizeRejection::AlreadyOwned));
        assert!(state.fleets.contains_key(fleet));
    }

    #[test]
    fn neutral_star_can_be_resettled() {
        let (mut state, target, fleet, registry) = setup();
        state.star_mut(target).unwrap().owner = Owner::Neutral;
        assert!(
            colonize(
                &mut state,
                fleet,
                target,
                &registry,
                &EnvironmentHabitability,
                &RulesConfig::default()
            )
            .is_ok()
        );
    }

    #[test]
    fn must_be_in_orbit() {
        let (mut state, target, fleet, registry) = setup();
        state.fleets[fleet].location = FleetLocation::Space {
            position: Position::new(5.0, 5.0),
        };
        let err = colonize(
            &mut state,
            fleet,
            target,
            &registry,
            &EnvironmentHabitability,
            &RulesConfig::default(),
        );
        assert_eq!(err, Err(ColonizeRejection::NotInOrbit));
    }

    #[test]
    fn scouts_cannot_colonize() {
        let mut state = empty_state();
        let target = add_star(&mut state, StarId(1), Position::default());
        let registry = standard_registry();
        let fleet = add_fleet(
            &mut state,
            HUMAN,
            FleetLocation::Orbit { star: target },
            &[("scout", 2)],
            &registry,
        );
        let err = colonize(
            &mut state,
            fleet,
            target,
            &registry,
            &EnvironmentHabitability,
            &RulesConfig::default(),
        );
        assert_eq!(err, Err(ColonizeRejection::NoColonyModule));
    }
}
