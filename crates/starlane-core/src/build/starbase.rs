//! Starbase upgrades.
//!
//! Building a starbase where the colony's owner already has one credits part
//! of the old station's mineral cost. The old stack is scrapped only when the
//! replacement is finished.

use crate::design::DesignResolver;
use crate::fleet::ops::trim_fuel;
use crate::id::{DesignId, FleetId, StarId};
use crate::minerals::{Mineral, Minerals};
use crate::state::GameState;

/// An existing starbase stack that a pending build will replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarbaseCredit {
    pub fleet: FleetId,
    /// Index of the stack within the fleet.
    pub stack: usize,
    pub scrap: Minerals,
}

/// Scrap value of a design: `percent` of each mineral cost, floored.
pub fn scrap_value(minerals: &Minerals, percent: u64) -> Minerals {
    let mut scrap = Minerals::ZERO;
    for mineral in Mineral::ALL {
        *scrap.get_mut(mineral) = minerals.get(mineral).saturating_mul(percent) / 100;
    }
    scrap
}

/// Find the credit for building `design` at `star`, if `design` is a
/// starbase and the star's owner has one in orbit. The first starbase stack
/// across the owner's orbiting fleets, in slot order, is the one replaced.
pub fn find_credit(
    state: &GameState,
    star: StarId,
    design: &DesignId,
    resolver: &dyn DesignResolver,
    scrap_percent: u64,
) -> Option<StarbaseCredit> {
    if !resolver.resolve(design)?.is_starbase {
        return None;
    }
    let owner = state.star(star)?.owner.player()?;

    state.fleets_in_orbit(star, owner).find_map(|(id, fleet)| {
        fleet.ships.iter().enumerate().find_map(|(index, stack)| {
            let old = resolver.resolve(&stack.design)?;
            (stack.count > 0 && old.is_starbase).then(|| StarbaseCredit {
                fleet: id,
                stack: index,
                scrap: scrap_value(&old.cost.minerals, scrap_percent),
            })
        })
    })
}

/// Scrap the replaced stack, deleting its fleet if nothing else is left.
/// Returns true when the fleet was deleted.
pub fn retire(state: &mut GameState, credit: &StarbaseCredit, resolver: &dyn DesignResolver) -> bool {
    let Some(fleet) = state.fleets.get_mut(credit.fleet) else {
        return false;
    };
    if credit.stack < fleet.ships.len() {
        let old = fleet.ships.remove(credit.stack);
        log::debug!("scrapped {}x {} from {}", old.count, old.design, fleet.name);
    }
    if fleet.is_empty() {
        state.fleets.remove(credit.fleet);
        return true;
    }
    trim_fuel(fleet, resolver);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::{FleetLocation, ShipStack};
    use crate::id::PlayerId;
    use crate::state::Position;
    use crate::test_utils::*;

    fn setup() -> (GameState, StarId, crate::registry::DesignRegistry) {
        let mut state = empty_state();
        let star = add_colony(&mut state, StarId(0), Position::default(), HUMAN, 100_000);
        (state, star, standard_registry())
    }

    #[test]
    fn credit_is_three_quarters_of_old_minerals() {
        let (mut state, star, registry) = setup();
        let base = add_fleet(
            &mut state,
            HUMAN,
            FleetLocation::Orbit { star },
            &[("starbase", 1)],
            &registry,
        );
        let credit =
            find_credit(&state, star, &"space_station".into(), &registry, 75).unwrap();
        let old = registry.get(&"starbase".into()).unwrap().cost.minerals;
        assert_eq!(credit.fleet, base);
        assert_eq!(credit.stack, 0);
        assert_eq!(credit.scrap, scrap_value(&old, 75));
        assert_eq!(
            credit.scrap.ironium,
            old.ironium * 3 / 4,
        );
    }

    #[test]
    fn ordinary_ships_get_no_credit() {
        let (mut state, star, registry) = setup();
        add_fleet(
            &mut state,
            HUMAN,
            FleetLocation::Orbit { star },
            &[("starbase", 1)],
            &registry,
        );
        assert!(find_credit(&state, star, &"scout".into(), &registry, 75).is_none());
    }

    #[test]
    fn foreign_starbases_are_ignored() {
        let (mut state, star, registry) = setup();
        add_fleet(
            &mut state,
            PlayerId(1),
            FleetLocation::Orbit { star },
            &[("starbase", 1)],
            &registry,
        );
        assert!(find_credit(&state, star, &"starbase".into(), &registry, 75).is_none());
    }

    #[test]
    fn retiring_last_stack_removes_fleet() {
        let (mut state, star, registry) = setup();
        let base = add_fleet(
            &mut state,
            HUMAN,
            FleetLocation::Orbit { star },
            &[("starbase", 1)],
            &registry,
        );
        let credit = find_credit(&state, star, &"starbase".into(), &registry, 75).unwrap();
        assert!(retire(&mut state, &credit, &registry));
        assert!(!state.fleets.contains_key(base));
    }

    #[test]
    fn retiring_keeps_other_stacks() {
        let (mut state, star, registry) = setup();
        let fleet = add_fleet(
            &mut state,
            HUMAN,
            FleetLocation::Orbit { star },
            &[("scout", 2), ("starbase", 1)],
            &registry,
        );
        let credit = find_credit(&state, star, &"starbase".into(), &registry, 75).unwrap();
        assert_eq!(credit.stack, 1);
        assert!(!retire(&mut state, &credit, &registry));
        assert_eq!(state.fleets[fleet].ships, vec![ShipStack::new("scout", 2)]);
    }

    #[test]
    fn scrap_value_floors() {
        assert_eq!(
            scrap_value(&Minerals::new(10, 3, 0), 75),
            Minerals::new(7, 2, 0)
        );
    }
}
