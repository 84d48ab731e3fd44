//! Fleet creation, ship addition, and removal.
//!
//! Both hard limits (fleets per player, ships per stack) are fatal: the
//! mutation is refused with a [`FleetError`] rather than clamped.

use crate::config::FleetLimits;
use crate::design::DesignResolver;
use crate::fleet::stats::MovementStats;
use crate::fleet::{Fleet, FleetLocation, ShipStack};
use crate::id::{DesignId, FleetId, PlayerId, StarId};
use crate::state::GameState;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FleetError {
    #[error("{owner} already controls {limit} fleets")]
    FleetLimitExceeded { owner: PlayerId, limit: usize },
    #[error("a stack of '{design}' would hold {count} ships, above the limit of {limit}")]
    StackLimitExceeded {
        design: DesignId,
        count: u64,
        limit: u32,
    },
    #[error("{0} does not exist")]
    UnknownStar(StarId),
    #[error("{0} has no owner to receive ships")]
    UnownedStar(StarId),
    #[error("fleet {0:?} does not exist")]
    UnknownFleet(FleetId),
    #[error("a fleet cannot transfer to itself")]
    SameFleet,
    #[error("fleets belong to different players")]
    ForeignFleet,
    #[error("fleets are not at the same location")]
    NotColocated,
    #[error("only {available} of {requested} '{design}' ships (damage {damage}) are available")]
    InsufficientShips {
        design: DesignId,
        damage: u32,
        requested: u32,
        available: u32,
    },
    #[error("no ships selected")]
    NothingToMove,
}

/// Create an empty fleet for `owner`.
pub fn create_fleet(
    state: &mut GameState,
    owner: PlayerId,
    location: FleetLocation,
    limits: &FleetLimits,
) -> Result<FleetId, FleetError> {
    let existing = state.fleet_count(owner);
    if existing >= limits.max_fleets_per_player {
        return Err(FleetError::FleetLimitExceeded {
            owner,
            limit: limits.max_fleets_per_player,
        });
    }
    let name = format!("Fleet {}", existing + 1);
    Ok(state.fleets.insert(Fleet::new(name, owner, location)))
}

/// Merge `count` ships of `design` into the fleet's undamaged stack of that
/// design, or start a new stack.
pub fn merge_ships(
    fleet: &mut Fleet,
    design: &DesignId,
    count: u32,
    limits: &FleetLimits,
) -> Result<(), FleetError> {
    absorb_stack(fleet, &ShipStack::new(design.clone(), count), limits)
}

/// Add `incoming` to the fleet's stack of the same design and damage, or
/// start a new stack. Nothing changes when the result would break the stack
/// limit.
pub fn absorb_stack(
    fleet: &mut Fleet,
    incoming: &ShipStack,
    limits: &FleetLimits,
) -> Result<(), FleetError> {
    let stack = fleet
        .ships
        .iter_mut()
        .find(|s| s.design == incoming.design && s.damage == incoming.damage);

    let current = stack.as_ref().map_or(0, |s| u64::from(s.count));
    let total = current + u64::from(incoming.count);
    if total > u64::from(limits.max_ships_per_stack) {
        return Err(FleetError::StackLimitExceeded {
            design: incoming.design.clone(),
            count: total,
            limit: limits.max_ships_per_stack,
        });
    }

    match stack {
        Some(stack) => stack.count += incoming.count,
        None => fleet.ships.push(incoming.clone()),
    }
    Ok(())
}

/// Put `count` new ships of `design` into orbit of `star`, owned by the star's
/// owner.
///
/// Starbases join an orbiting fleet that already holds a starbase, other ships
/// join one that does not. A new fleet is created when no such fleet exists.
/// The fleet's tanks grow by the new ships' capacity, and colony ships arrive
/// carrying a full colonist load (at most the star's population) without
/// drawing it from the colony.
pub fn add_ships_at_star(
    state: &mut GameState,
    star: StarId,
    design: &DesignId,
    count: u32,
    resolver: &dyn DesignResolver,
    limits: &FleetLimits,
) -> Result<FleetId, FleetError> {
    let (owner, population) = {
        let s = state.star(star).ok_or(FleetError::UnknownStar(star))?;
        let owner = s.owner.player().ok_or(FleetError::UnownedStar(star))?;
        (owner, s.population)
    };
    let stats = resolver.resolve_or_fallback(design);

    let existing = state
        .fleets_in_orbit(star, owner)
        .find(|(_, fleet)| {
            let holds_starbase = fleet
                .ships
                .iter()
                .any(|s| resolver.resolve_or_fallback(&s.design).is_starbase);
            holds_starbase == stats.is_starbase
        })
        .map(|(id, _)| id);

    let fleet_id = match existing {
        Some(id) => id,
        None => create_fleet(state, owner, FleetLocation::Orbit { star }, limits)?,
    };

    let fleet = &mut state.fleets[fleet_id];
    merge_ships(fleet, design, count, limits)?;

    let fuel = stats.fuel_capacity.saturating_mul(u64::from(count));
    fleet.fuel += fuel as f64;

    if stats.has_colony_module {
        let load = stats
            .colonist_capacity
            .saturating_mul(u64::from(count))
            .min(population);
        fleet.cargo.colonists = fleet.cargo.colonists.saturating_add(load);
    }

    log::debug!("{owner}: {count}x {design} added at {star}");
    Ok(fleet_id)
}

/// Cap a fleet's fuel at what its remaining tanks hold. Called whenever ships
/// leave a fleet that lives on.
pub fn trim_fuel(fleet: &mut Fleet, resolver: &dyn DesignResolver) {
    let capacity = MovementStats::for_fleet(fleet, resolver).fuel_capacity as f64;
    fleet.fuel = fleet.fuel.min(capacity).max(0.0);
}

/// Remove a fleet outright. Returns it if it existed.
pub fn decommission(state: &mut GameState, fleet: FleetId) -> Option<Fleet> {
    state.fleets.remove(fleet)
}

/// Drop zero-count stacks, then remove every fleet with no ships left.
/// Returns the ids removed, in slot order.
pub fn remove_empty_fleets(state: &mut GameState) -> Vec<FleetId> {
    for fleet in state.fleets.values_mut() {
        fleet.ships.retain(|s| s.count > 0);
    }
    let empty: Vec<FleetId> = state
        .fleets
        .iter()
        .filter(|(_, f)| f.is_empty())
        .map(|(id, _)| id)
        .collect();
    for id in &empty {
        state.fleets.remove(*id);
    }
    empty
}
