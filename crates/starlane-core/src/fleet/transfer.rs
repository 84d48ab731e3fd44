//! Moving ships, fuel, and cargo between two fleets at the same place.
//!
//! Every operation here validates the whole request before touching the
//! state: a refused transfer leaves both fleets exactly as they were.

use crate::config::FleetLimits;
use crate::design::DesignResolver;
use crate::fleet::ops::{FleetError, absorb_stack, create_fleet};
use crate::fleet::stats::MovementStats;
use crate::fleet::{Cargo, Fleet, ShipStack};
use crate::id::FleetId;
use crate::minerals::Mineral;
use crate::state::GameState;
use serde::{Deserialize, Serialize};

/// What to move from one fleet to another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferSpec {
    /// Stacks are matched by design and damage.
    pub ships: Vec<ShipStack>,
    #[serde(default)]
    pub fuel: f64,
    #[serde(default)]
    pub cargo: Cargo,
}

impl TransferSpec {
    pub fn ships(ships: Vec<ShipStack>) -> Self {
        Self {
            ships,
            ..Self::default()
        }
    }

    /// Everything `fleet` has.
    pub fn everything(fleet: &Fleet) -> Self {
        Self {
            ships: fleet.ships.iter().filter(|s| s.count > 0).cloned().collect(),
            fuel: fleet.fuel,
            cargo: fleet.cargo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOutcome {
    /// The source gave away its last ship and was removed.
    pub source_removed: bool,
}

/// Move ships, fuel, and cargo from `source` to `target`.
///
/// Both fleets must belong to the same player and share a location. Ships
/// must all be available; fuel and cargo move as far as the source has them
/// and the target has room. Fuel left above the source's shrunken tanks
/// follows the ships into the target. An emptied source hands over whatever
/// it still carries and is removed.
pub fn transfer(
    state: &mut GameState,
    source_id: FleetId,
    target_id: FleetId,
    spec: &TransferSpec,
    resolver: &dyn DesignResolver,
    limits: &FleetLimits,
) -> Result<TransferOutcome, FleetError> {
    if source_id == target_id {
        return Err(FleetError::SameFleet);
    }
    let source = state
        .fleets
        .get(source_id)
        .ok_or(FleetError::UnknownFleet(source_id))?;
    let target = state
        .fleets
        .get(target_id)
        .ok_or(FleetError::UnknownFleet(target_id))?;
    if source.owner != target.owner {
        return Err(FleetError::ForeignFleet);
    }
    if source.location != target.location {
        return Err(FleetError::NotColocated);
    }

    let mut from = source.clone();
    let mut to = target.clone();
    for moving in spec.ships.iter().filter(|s| s.count > 0) {
        take_ships(&mut from, moving)?;
        absorb_stack(&mut to, moving, limits)?;
    }
    from.ships.retain(|s| s.count > 0);

    let source_removed = from.is_empty();
    if source_removed {
        let rest = TransferSpec {
            ships: Vec::new(),
            fuel: from.fuel,
            cargo: from.cargo,
        };
        move_supplies(&mut from, &mut to, &rest, resolver);
    } else {
        move_supplies(&mut from, &mut to, spec, resolver);
    }

    log::debug!(
        "{}: {} -> {} ({} stacks, {:.0} fuel)",
        to.owner,
        from.name,
        to.name,
        spec.ships.len(),
        spec.fuel
    );
    state.fleets[target_id] = to;
    if source_removed {
        state.fleets.remove(source_id);
    } else {
        state.fleets[source_id] = from;
    }
    Ok(TransferOutcome { source_removed })
}

/// Split the ships in `spec` (with its fuel and cargo) off into a new fleet
/// at the source's location. Returns the new fleet.
pub fn split_fleet(
    state: &mut GameState,
    source_id: FleetId,
    spec: &TransferSpec,
    resolver: &dyn DesignResolver,
    limits: &FleetLimits,
) -> Result<FleetId, FleetError> {
    let source = state
        .fleets
        .get(source_id)
        .ok_or(FleetError::UnknownFleet(source_id))?;
    if spec.ships.iter().all(|s| s.count == 0) {
        return Err(FleetError::NothingToMove);
    }
    let mut remaining = source.clone();
    for moving in spec.ships.iter().filter(|s| s.count > 0) {
        take_ships(&mut remaining, moving)?;
    }
    let (owner, location) = (source.owner, source.location);

    let new_id = create_fleet(state, owner, location, limits)?;
    if let Err(err) = transfer(state, source_id, new_id, spec, resolver, limits) {
        state.fleets.remove(new_id);
        return Err(err);
    }
    Ok(new_id)
}

/// Give every ship but one its own fleet. Each new fleet takes a full tank
/// while the source has fuel to spare; cargo stays behind. Returns the new
/// fleets in creation order.
pub fn separate_fleet(
    state: &mut GameState,
    source_id: FleetId,
    resolver: &dyn DesignResolver,
    limits: &FleetLimits,
) -> Result<Vec<FleetId>, FleetError> {
    let source = state
        .fleets
        .get(source_id)
        .ok_or(FleetError::UnknownFleet(source_id))?;
    let total = source.ship_count();
    if total <= 1 {
        return Err(FleetError::NothingToMove);
    }
    let owner = source.owner;
    let leaving = usize::try_from(total - 1).unwrap_or(usize::MAX);
    if state.fleet_count(owner).saturating_add(leaving) > limits.max_fleets_per_player {
        return Err(FleetError::FleetLimitExceeded {
            owner,
            limit: limits.max_fleets_per_player,
        });
    }

    let singles: Vec<ShipStack> = source
        .ships
        .iter()
        .flat_map(|s| {
            std::iter::repeat_n(
                ShipStack {
                    count: 1,
                    ..s.clone()
                },
                s.count as usize,
            )
        })
        .take(leaving)
        .collect();

    let mut created = Vec::with_capacity(singles.len());
    for ship in singles {
        let stats = resolver.resolve_or_fallback(&ship.design);
        let spec = TransferSpec {
            fuel: stats.fuel_capacity as f64,
            ..TransferSpec::ships(vec![ship])
        };
        created.push(split_fleet(state, source_id, &spec, resolver, limits)?);
    }
    Ok(created)
}

/// Fold `source` entirely into `target`.
pub fn merge_fleets(
    state: &mut GameState,
    source_id: FleetId,
    target_id: FleetId,
    resolver: &dyn DesignResolver,
    limits: &FleetLimits,
) -> Result<(), FleetError> {
    let spec = state
        .fleets
        .get(source_id)
        .map(TransferSpec::everything)
        .ok_or(FleetError::UnknownFleet(source_id))?;
    transfer(state, source_id, target_id, &spec, resolver, limits).map(|_| ())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn take_ships(fleet: &mut Fleet, moving: &ShipStack) -> Result<(), FleetError> {
    let stack = fleet
        .ships
        .iter_mut()
        .find(|s| s.design == moving.design && s.damage == moving.damage);
    let available = stack.as_ref().map_or(0, |s| s.count);
    match stack {
        Some(stack) if stack.count >= moving.count => {
            stack.count -= moving.count;
            Ok(())
        }
        _ => Err(FleetError::InsufficientShips {
            design: moving.design.clone(),
            damage: moving.damage,
            requested: moving.count,
            available,
        }),
    }
}

/// Fuel and cargo, after the ships have changed hands.
fn move_supplies(from: &mut Fleet, to: &mut Fleet, spec: &TransferSpec, resolver: &dyn DesignResolver) {
    let from_stats = MovementStats::for_fleet(from, resolver);
    let to_stats = MovementStats::for_fleet(to, resolver);
    let from_tank = from_stats.fuel_capacity as f64;
    let to_tank = to_stats.fuel_capacity as f64;

    let room = (to_tank - to.fuel).max(0.0);
    let fuel = spec.fuel.max(0.0).min(from.fuel).min(room);
    from.fuel -= fuel;
    to.fuel += fuel;

    let overflow = (from.fuel - from_tank).max(0.0);
    let spill = overflow.min((to_tank - to.fuel).max(0.0));
    to.fuel += spill;
    from.fuel = (from.fuel - spill).min(from_tank).max(0.0);

    // An emptied source has no holds left; its cargo goes along regardless.
    let unbounded = from.is_empty();
    let mut hold_room = to_stats.cargo_capacity.saturating_sub(to.cargo.hold_used());
    let mut take = |wanted: u64, available: u64| -> u64 {
        let amount = wanted.min(available);
        if unbounded {
            return amount;
        }
        let amount = amount.min(hold_room);
        hold_room -= amount;
        amount
    };

    for mineral in Mineral::ALL {
        let moved = take(spec.cargo.minerals.get(mineral), from.cargo.minerals.get(mineral));
        *from.cargo.minerals.get_mut(mineral) -= moved;
        *to.cargo.minerals.get_mut(mineral) += moved;
    }
    let resources = take(spec.cargo.resources, from.cargo.resources);
    from.cargo.resources -= resources;
    to.cargo.resources += resources;

    // Colonists ride in colony modules first, then in the hold at 1 kT per
    // thousand.
    let mut colonists = spec.cargo.colonists.min(from.cargo.colonists);
    if !unbounded {
        let modules = colonist_capacity(to, resolver).saturating_sub(to.cargo.colonists);
        colonists = colonists.min(modules.max(hold_room.saturating_mul(1000)));
    }
    from.cargo.colonists -= colonists;
    to.cargo.colonists += colonists;
}

fn colonist_capacity(fleet: &Fleet, resolver: &dyn DesignResolver) -> u64 {
    fleet
        .ships
        .iter()
        .map(|s| {
            resolver
                .resolve_or_fallback(&s.design)
                .colonist_capacity
                .saturating_mul(u64::from(s.count))
        })
        .fold(0, u64::saturating_add)
}
