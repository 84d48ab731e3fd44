//! One turn of fleet order resolution.
//!
//! Every fleet is refuelled first, then its order list is resolved head
//! first. Travel (Move, Orbit, Attack) ends the fleet's turn once it has
//! flown a leg. Orders that complete without flying (already in orbit,
//! colonize, cargo transfers) let processing continue with the next order,
//! and `Wait` ends the turn.

use crate::config::RulesConfig;
use crate::design::DesignResolver;
use crate::event::{DropReason, Event, EventBus};
use crate::fleet::cargo::{self, CargoManifest};
use crate::fleet::colonize::colonize;
use crate::fleet::ops::remove_empty_fleets;
use crate::fleet::stats::{MovementStats, plan_warp};
use crate::fleet::{FleetLocation, FleetOrder, OrbitAction};
use crate::habitability::Habitability;
use crate::id::{FleetId, PlayerId, StarId};
use crate::state::{GameState, Position};

/// Everything order resolution needs besides the state itself.
#[derive(Clone, Copy)]
pub struct FleetContext<'a> {
    pub resolver: &'a dyn DesignResolver,
    pub habitability: &'a dyn Habitability,
    pub rules: &'a RulesConfig,
    /// Turn being resolved, stamped on events.
    pub turn: u32,
}

// ---------------------------------------------------------------------------
// Phase entry point
// ---------------------------------------------------------------------------

/// Refuel and resolve orders for every fleet in slot order, then remove
/// fleets left without ships.
pub fn process_fleets(state: &mut GameState, ctx: &FleetContext<'_>, events: &mut EventBus) {
    let ids: Vec<FleetId> = state.fleets.keys().collect();
    for id in ids {
        if !state.fleets.contains_key(id) {
            continue;
        }
        refuel(state, id, ctx.resolver, ctx.rules);
        resolve_orders(state, id, ctx, events);
    }
    for fleet in remove_empty_fleets(state) {
        events.emit(Event::FleetRemoved {
            fleet,
            turn: ctx.turn,
        });
    }
}

// ---------------------------------------------------------------------------
// Refuelling
// ---------------------------------------------------------------------------

/// Top up a fleet's tanks. Returns the fuel gained.
///
/// Orbiting a star of the fleet's owner gives a fixed fraction of capacity,
/// or a full refill when one of the owner's starbases orbits there too.
/// Ramscoop fleets in deep space scoop a smaller fraction.
pub fn refuel(
    state: &mut GameState,
    fleet_id: FleetId,
    resolver: &dyn DesignResolver,
    rules: &RulesConfig,
) -> f64 {
    let Some(fleet) = state.fleets.get(fleet_id) else {
        return 0.0;
    };
    let stats = MovementStats::for_fleet(fleet, resolver);
    if stats.fuel_capacity == 0 {
        return 0.0;
    }

    let fraction = match fleet.location {
        FleetLocation::Orbit { star } => {
            let owned = state.star(star).is_some_and(|s| s.is_owned_by(fleet.owner));
            if !owned {
                0.0
            } else if starbase_in_orbit(state, star, fleet.owner, resolver) {
                rules.movement.starbase_refuel_fraction
            } else {
                rules.movement.orbit_refuel_fraction
            }
        }
        FleetLocation::Space { .. } if stats.has_ramscoop => rules.movement.ramscoop_refuel_fraction,
        FleetLocation::Space { .. } => 0.0,
    };
    if fraction <= 0.0 {
        return 0.0;
    }

    let capacity = stats.fuel_capacity as f64;
    let fleet = &mut state.fleets[fleet_id];
    let before = fleet.fuel;
    fleet.fuel = (fleet.fuel + capacity * fraction).min(capacity);
    fleet.fuel - before
}

fn starbase_in_orbit(
    state: &GameState,
    star: StarId,
    owner: PlayerId,
    resolver: &dyn DesignResolver,
) -> bool {
    state.fleets_in_orbit(star, owner).any(|(_, f)| {
        f.ships
            .iter()
            .any(|s| s.count > 0 && resolver.resolve_or_fallback(&s.design).is_starbase)
    })
}

// ---------------------------------------------------------------------------
// Travel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum Flight {
    /// At the target. `flew` is false when no leg was needed.
    Arrived { flew: bool },
    EnRoute,
}

/// Fly one leg toward `target` at the best affordable warp.
fn fly(
    state: &mut GameState,
    fleet_id: FleetId,
    target: Position,
    warp: Option<u32>,
    ctx: &FleetContext<'_>,
) -> Flight {
    let fleet = &state.fleets[fleet_id];
    let Some(start) = state.fleet_position(fleet) else {
        return Flight::EnRoute;
    };
    let epsilon = ctx.rules.movement.arrival_epsilon;
    let remaining = start.distance(&target);
    if remaining <= epsilon {
        return Flight::Arrived { flew: false };
    }

    let stats = MovementStats::for_fleet(fleet, ctx.resolver);
    let plan = plan_warp(
        &stats,
        warp,
        remaining,
        fleet.fuel,
        ctx.rules.movement.ly_per_warp,
    );
    let arrived = remaining - plan.distance <= epsilon;
    let position = if arrived {
        target
    } else {
        start.toward(&target, plan.distance)
    };

    let fleet = &mut state.fleets[fleet_id];
    fleet.fuel = (fleet.fuel - plan.fuel_used).max(0.0);
    fleet.location = FleetLocation::Space { position };

    if arrived {
        Flight::Arrived { flew: true }
    } else {
        Flight::EnRoute
    }
}

/// The nearest star within capture distance of `point`.
fn captured_by(state: &GameState, point: &Position, capture_distance: f64) -> Option<StarId> {
    let limit = capture_distance * capture_distance;
    state
        .stars
        .iter()
        .map(|s| (s.id, s.position.distance_sq(point)))
        .filter(|&(_, d)| d <= limit)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

// ---------------------------------------------------------------------------
// Order resolution
// ---------------------------------------------------------------------------

/// Whether the fleet can keep resolving orders this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    EndTurn,
}

/// Resolve a single fleet's orders for one turn. Fleets with no orders are
/// left untouched.
pub fn resolve_orders(
    state: &mut GameState,
    fleet_id: FleetId,
    ctx: &FleetContext<'_>,
    events: &mut EventBus,
) {
    loop {
        let Some(order) = state
            .fleets
            .get(fleet_id)
            .and_then(|f| f.orders.first().cloned())
        else {
            return;
        };

        let step = match order {
            FleetOrder::Move { destination, warp } => {
                resolve_move(state, fleet_id, destination, warp, ctx, events)
            }
            FleetOrder::Orbit { star, warp, action } => {
                resolve_orbit(state, fleet_id, star, warp, action, ctx, events)
            }
            FleetOrder::Attack { target, warp } => {
                resolve_attack(state, fleet_id, target, warp, ctx, events)
            }
            FleetOrder::Colonize { star } => resolve_colonize(state, fleet_id, star, ctx, events),
            FleetOrder::Load { star, manifest } => {
                resolve_transfer(state, fleet_id, star, &manifest, Direction::Load, ctx, events)
            }
            FleetOrder::Unload { star, manifest } => {
                resolve_transfer(state, fleet_id, star, &manifest, Direction::Unload, ctx, events)
            }
            FleetOrder::Decommission { star } => {
                resolve_decommission(state, fleet_id, star, ctx, events)
            }
            FleetOrder::Wait => {
                pop_order(state, fleet_id);
                Step::EndTurn
            }
        };

        if step == Step::EndTurn {
            return;
        }
    }
}

fn pop_order(state: &mut GameState, fleet_id: FleetId) {
    if let Some(fleet) = state.fleets.get_mut(fleet_id) {
        if !fleet.orders.is_empty() {
            fleet.orders.remove(0);
        }
    }
}

fn drop_order(
    state: &mut GameState,
    fleet_id: FleetId,
    reason: DropReason,
    ctx: &FleetContext<'_>,
    events: &mut EventBus,
) -> Step {
    log::warn!("fleet {fleet_id:?}: order dropped ({reason:?})");
    pop_order(state, fleet_id);
    events.emit(Event::OrderDropped {
        fleet: fleet_id,
        reason,
        turn: ctx.turn,
    });
    Step::Continue
}

fn arrived(
    state: &mut GameState,
    fleet_id: FleetId,
    location: FleetLocation,
    flew: bool,
    ctx: &FleetContext<'_>,
    events: &mut EventBus,
) -> Step {
    state.fleets[fleet_id].location = location;
    if !flew {
        return Step::Continue;
    }
    log::debug!("fleet {fleet_id:?} arrived at {location:?}");
    events.emit(Event::FleetArrived {
        fleet: fleet_id,
        location,
        turn: ctx.turn,
    });
    Step::EndTurn
}

fn resolve_move(
    state: &mut GameState,
    fleet_id: FleetId,
    destination: Position,
    warp: Option<u32>,
    ctx: &FleetContext<'_>,
    events: &mut EventBus,
) -> Step {
    match fly(state, fleet_id, destination, warp, ctx) {
        Flight::EnRoute => Step::EndTurn,
        Flight::Arrived { flew } => {
            pop_order(state, fleet_id);
            let location = match captured_by(state, &destination, ctx.rules.movement.capture_distance)
            {
                Some(star) => FleetLocation::Orbit { star },
                None => FleetLocation::Space {
                    position: destination,
                },
            };
            arrived(state, fleet_id, location, flew, ctx, events)
        }
    }
}

fn resolve_orbit(
    state: &mut GameState,
    fleet_id: FleetId,
    star: StarId,
    warp: Option<u32>,
    action: Option<OrbitAction>,
    ctx: &FleetContext<'_>,
    events: &mut EventBus,
) -> Step {
    let Some(target) = state.star(star).map(|s| s.position) else {
        return drop_order(state, fleet_id, DropReason::UnknownStar, ctx, events);
    };

    let flew = if state.fleets[fleet_id].orbiting() == Some(star) {
        false
    } else {
        match fly(state, fleet_id, target, warp, ctx) {
            Flight::EnRoute => return Step::EndTurn,
            Flight::Arrived { flew } => flew,
        }
    };

    match action {
        Some(action) => {
            if let Some(head) = state.fleets[fleet_id].orders.first_mut() {
                *head = action.into_order(star);
            }
        }
        None => pop_order(state, fleet_id),
    }
    arrived(state, fleet_id, FleetLocation::Orbit { star }, flew, ctx, events)
}

fn resolve_attack(
    state: &mut GameState,
    fleet_id: FleetId,
    target: FleetId,
    warp: Option<u32>,
    ctx: &FleetContext<'_>,
    events: &mut EventBus,
) -> Step {
    let quarry = state
        .fleets
        .get(target)
        .filter(|_| target != fleet_id)
        .and_then(|f| state.fleet_position(f).map(|p| (p, f.location)));
    let Some((position, quarry_location)) = quarry else {
        return drop_order(state, fleet_id, DropReason::TargetLost, ctx, events);
    };

    match fly(state, fleet_id, position, warp, ctx) {
        Flight::EnRoute => Step::EndTurn,
        Flight::Arrived { flew } => {
            // Intercepted. Engagement itself is resolved elsewhere.
            pop_order(state, fleet_id);
            arrived(state, fleet_id, quarry_location, flew, ctx, events)
        }
    }
}

fn resolve_colonize(
    state: &mut GameState,
    fleet_id: FleetId,
    star: StarId,
    ctx: &FleetContext<'_>,
    events: &mut EventBus,
) -> Step {
    let owner = state.fleets[fleet_id].owner;
    match colonize(state, fleet_id, star, ctx.resolver, ctx.habitability, ctx.rules) {
        Ok(founded) => {
            events.emit(Event::ColonyFounded {
                star,
                owner,
                population: founded.population,
                turn: ctx.turn,
            });
            if founded.fleet_removed {
                events.emit(Event::FleetRemoved {
                    fleet: fleet_id,
                    turn: ctx.turn,
                });
                return Step::EndTurn;
            }
            Step::Continue
        }
        Err(rejection) => drop_order(state, fleet_id, DropReason::Colonize(rejection), ctx, events),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Load,
    Unload,
}

/// The star index when the fleet orbits `star` and its owner owns it.
fn owned_orbit(state: &GameState, fleet_id: FleetId, star: StarId) -> Result<usize, DropReason> {
    let fleet = &state.fleets[fleet_id];
    let index = state.star_index(star).ok_or(DropReason::UnknownStar)?;
    if fleet.orbiting() != Some(star) {
        return Err(DropReason::NotAtStar);
    }
    if !state.stars[index].is_owned_by(fleet.owner) {
        return Err(DropReason::NotOwner);
    }
    Ok(index)
}

fn resolve_transfer(
    state: &mut GameState,
    fleet_id: FleetId,
    star: StarId,
    manifest: &CargoManifest,
    direction: Direction,
    ctx: &FleetContext<'_>,
    events: &mut EventBus,
) -> Step {
    let index = match owned_orbit(state, fleet_id, star) {
        Ok(index) => index,
        Err(reason) => return drop_order(state, fleet_id, reason, ctx, events),
    };
    let capacity = MovementStats::for_fleet(&state.fleets[fleet_id], ctx.resolver).cargo_capacity;

    let fleet = &mut state.fleets[fleet_id];
    let colony = &mut state.stars[index];
    let moved = match direction {
        Direction::Load => cargo::load(fleet, colony, capacity, manifest),
        Direction::Unload => cargo::unload(fleet, colony, manifest),
    };
    pop_order(state, fleet_id);

    if !moved.is_empty() {
        log::debug!("fleet {fleet_id:?} {direction:?} at {star}: {moved:?}");
        events.emit(Event::CargoTransferred {
            fleet: fleet_id,
            star,
            turn: ctx.turn,
        });
    }
    Step::Continue
}

fn resolve_decommission(
    state: &mut GameState,
    fleet_id: FleetId,
    star: StarId,
    ctx: &FleetContext<'_>,
    events: &mut EventBus,
) -> Step {
    if let Ok(index) = owned_orbit(state, fleet_id, star) {
        let fleet = &mut state.fleets[fleet_id];
        let colony = &mut state.stars[index];
        cargo::unload(fleet, colony, &CargoManifest::everything());
    }
    state.fleets.remove(fleet_id);
    log::debug!("fleet {fleet_id:?} decommissioned at {star}");
    events.emit(Event::FleetRemoved {
        fleet: fleet_id,
        turn: ctx.turn,
    });
    Step::EndTurn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::fleet::{CargoAmount, ShipStack};
    use crate::habitability::EnvironmentHabitability;
    use crate::minerals::Minerals;
    use crate::registry::DesignRegistry;
    use crate::state::Owner;
    use crate::test_utils::*;

    // ========================================================================
    // Helpers
    // ========================================================================

    struct World {
        state: GameState,
        registry: DesignRegistry,
        rules: RulesConfig,
        events: EventBus,
    }

    impl World {
        fn new() -> Self {
            Self {
                state: empty_state(),
                registry: standard_registry(),
                rules: RulesConfig::default(),
                events: EventBus::default(),
            }
        }

        fn fleet(&mut self, location: FleetLocation, ships: &[(&str, u32)]) -> FleetId {
            add_fleet(&mut self.state, HUMAN, location, ships, &self.registry)
        }

        fn order(&mut self, fleet: FleetId, order: FleetOrder) {
            self.state.fleets[fleet].orders.push(order);
        }

        fn turn(&mut self) {
            let ctx = FleetContext {
                resolver: &self.registry,
                habitability: &EnvironmentHabitability,
                rules: &self.rules,
                turn: self.state.turn,
            };
            process_fleets(&mut self.state, &ctx, &mut self.events);
        }

        fn resolve(&mut self, fleet: FleetId) {
            let ctx = FleetContext {
                resolver: &self.registry,
                habitability: &EnvironmentHabitability,
                rules: &self.rules,
                turn: self.state.turn,
            };
            resolve_orders(&mut self.state, fleet, &ctx, &mut self.events);
        }
    }

    fn space(x: f64, y: f64) -> FleetLocation {
        FleetLocation::Space {
            position: Position::new(x, y),
        }
    }

    fn assert_near(state: &GameState, fleet: FleetId, x: f64, y: f64) {
        let pos = state.fleet_position(&state.fleets[fleet]).unwrap();
        assert!(
            (pos.x - x).abs() < 1e-9 && (pos.y - y).abs() < 1e-9,
            "fleet at {pos:?}, expected ({x}, {y})"
        );
    }

    // ========================================================================
    // Move
    // ========================================================================

    #[test]
    fn move_with_fuel_lands_on_destination() {
        let mut w = World::new();
        let fleet = w.fleet(space(0.0, 0.0), &[("scout", 1)]);
        w.order(
            fleet,
            FleetOrder::Move {
                destination: Position::new(30.0, 40.0),
                warp: Some(5),
            },
        );
        w.resolve(fleet);

        let f = &w.state.fleets[fleet];
        assert_eq!(f.location, space(30.0, 40.0));
        assert!(f.orders.is_empty());
        // scout: mass 20, warp 5 ≤ ideal 6 → 1 mg/ly over 50 ly
        assert_eq!(f.fuel, 0.0);
        assert_eq!(w.events.buffered_count(EventKind::FleetArrived), 1);
    }

    #[test]
    fn long_move_takes_several_turns() {
        let mut w = World::new();
        let fleet = w.fleet(space(0.0, 0.0), &[("ramscoop", 1)]);
        w.order(
            fleet,
            FleetOrder::Move {
                destination: Position::new(250.0, 0.0),
                warp: None,
            },
        );
        w.resolve(fleet);
        // ramscoop: free movement at warp 8 → 160 ly per turn
        assert_near(&w.state, fleet, 160.0, 0.0);
        assert_eq!(w.state.fleets[fleet].orders.len(), 1);
        w.resolve(fleet);
        assert_eq!(w.state.fleets[fleet].location, space(250.0, 0.0));
        assert!(w.state.fleets[fleet].orders.is_empty());
    }

    #[test]
    fn move_near_star_enters_orbit() {
        let mut w = World::new();
        let star = add_star(&mut w.state, StarId(5), Position::new(40.0, 0.0));
        let fleet = w.fleet(space(0.0, 0.0), &[("scout", 1)]);
        w.order(
            fleet,
            FleetOrder::Move {
                destination: Position::new(41.5, 0.0),
                warp: None,
            },
        );
        w.resolve(fleet);
        assert_eq!(w.state.fleets[fleet].location, FleetLocation::Orbit { star });
    }

    #[test]
    fn fuel_never_goes_negative() {
        let mut w = World::new();
        let fleet = w.fleet(space(0.0, 0.0), &[("freighter", 1)]);
        w.state.fleets[fleet].fuel = 3.0;
        w.order(
            fleet,
            FleetOrder::Move {
                destination: Position::new(500.0, 0.0),
                warp: None,
            },
        );
        w.resolve(fleet);
        let f = &w.state.fleets[fleet];
        assert!(f.fuel >= 0.0);
        // 1 mg/ly at warp 1 for mass 80 and efficiency 120 → 3 ly flown
        assert_near(&w.state, fleet, 3.0, 0.0);
    }

    #[test]
    fn fleets_without_orders_are_untouched() {
        let mut w = World::new();
        let fleet = w.fleet(space(7.0, 7.0), &[("scout", 1)]);
        w.state.fleets[fleet].fuel = 10.0;
        let before = w.state.fleets[fleet].clone();
        w.turn();
        assert_eq!(w.state.fleets[fleet], before);
    }

    // ========================================================================
    // Orbit
    // ========================================================================

    #[test]
    fn orbit_order_becomes_its_action_on_arrival() {
        let mut w = World::new();
        let star = add_star(&mut w.state, StarId(1), Position::new(40.0, 0.0));
        let fleet = w.fleet(space(0.0, 0.0), &[("scout", 1)]);
        w.order(
            fleet,
            FleetOrder::Orbit {
                star,
                warp: None,
                action: Some(OrbitAction::Wait),
            },
        );
        w.resolve(fleet);
        let f = &w.state.fleets[fleet];
        assert_eq!(f.location, FleetLocation::Orbit { star });
        assert_eq!(f.orders, vec![FleetOrder::Wait]);
    }

    #[test]
    fn orbit_already_there_replaces_immediately() {
        let mut w = World::new();
        let home = add_colony(&mut w.state, StarId(0), Position::default(), HUMAN, 50_000);
        let fleet = w.fleet(FleetLocation::Orbit { star: home }, &[("freighter", 1)]);
        w.state.star_mut(home).unwrap().surface_minerals = Minerals::new(30, 0, 0);
        w.order(
            fleet,
            FleetOrder::Orbit {
                star: home,
                warp: None,
                action: Some(OrbitAction::Load(CargoManifest::minerals())),
            },
        );
        w.resolve(fleet);
        // Replacement and the load both happen this turn.
        let f = &w.state.fleets[fleet];
        assert!(f.orders.is_empty());
        assert_eq!(f.cargo.minerals.ironium, 30);
    }

    #[test]
    fn orbit_unknown_star_is_dropped() {
        let mut w = World::new();
        let fleet = w.fleet(space(0.0, 0.0), &[("scout", 1)]);
        w.order(
            fleet,
            FleetOrder::Orbit {
                star: StarId(404),
                warp: None,
                action: None,
            },
        );
        w.resolve(fleet);
        assert!(w.state.fleets[fleet].orders.is_empty());
        assert_eq!(w.state.fleets[fleet].location, space(0.0, 0.0));
        assert_eq!(w.events.buffered_count(EventKind::OrderDropped), 1);
    }

    #[test]
    fn travel_ends_the_turn() {
        let mut w = World::new();
        let a = add_star(&mut w.state, StarId(1), Position::new(20.0, 0.0));
        let b = add_star(&mut w.state, StarId(2), Position::new(40.0, 0.0));
        let fleet = w.fleet(space(0.0, 0.0), &[("scout", 1)]);
        for star in [a, b] {
            w.order(
                fleet,
                FleetOrder::Orbit {
                    star,
                    warp: None,
                    action: None,
                },
            );
        }
        w.resolve(fleet);
        assert_eq!(w.state.fleets[fleet].location, FleetLocation::Orbit { star: a });
        assert_eq!(w.state.fleets[fleet].orders.len(), 1);
    }

    // ========================================================================
    // Attack
    // ========================================================================

    #[test]
    fn attack_pursues_and_intercepts() {
        let mut w = World::new();
        let hunter = w.fleet(space(0.0, 0.0), &[("scout", 1)]);
        let prey = add_fleet(
            &mut w.state,
            crate::id::PlayerId(1),
            space(40.0, 0.0),
            &[("freighter", 1)],
            &w.registry,
        );
        w.order(
            hunter,
            FleetOrder::Attack {
                target: prey,
                warp: None,
            },
        );
        w.resolve(hunter);
        assert_eq!(w.state.fleets[hunter].location, space(40.0, 0.0));
        assert!(w.state.fleets[hunter].orders.is_empty());
    }

    #[test]
    fn attack_on_vanished_target_is_dropped() {
        let mut w = World::new();
        let hunter = w.fleet(space(0.0, 0.0), &[("scout", 1)]);
        let prey = w.fleet(space(5.0, 0.0), &[("scout", 1)]);
        w.state.fleets.remove(prey);
        w.order(
            hunter,
            FleetOrder::Attack {
                target: prey,
                warp: None,
            },
        );
        w.resolve(hunter);
        assert!(w.state.fleets[hunter].orders.is_empty());
        assert_eq!(w.state.fleets[hunter].location, space(0.0, 0.0));
    }

    // ========================================================================
    // Instantaneous orders
    // ========================================================================

    #[test]
    fn wait_consumes_the_turn() {
        let mut w = World::new();
        let fleet = w.fleet(space(0.0, 0.0), &[("scout", 1)]);
        w.order(fleet, FleetOrder::Wait);
        w.order(
            fleet,
            FleetOrder::Move {
                destination: Position::new(10.0, 0.0),
                warp: None,
            },
        );
        w.resolve(fleet);
        assert_eq!(w.state.fleets[fleet].location, space(0.0, 0.0));
        assert_eq!(w.state.fleets[fleet].orders.len(), 1);
    }

    #[test]
    fn unload_at_foreign_star_is_dropped() {
        let mut w = World::new();
        let other = add_colony(
            &mut w.state,
            StarId(3),
            Position::default(),
            crate::id::PlayerId(1),
            1_000,
        );
        let fleet = w.fleet(FleetLocation::Orbit { star: other }, &[("freighter", 1)]);
        w.state.fleets[fleet].cargo.resources = 10;
        w.order(
            fleet,
            FleetOrder::Unload {
                star: other,
                manifest: CargoManifest::everything(),
            },
        );
        w.resolve(fleet);
        assert_eq!(w.state.fleets[fleet].cargo.resources, 10);
        assert!(w.state.fleets[fleet].orders.is_empty());
    }

    #[test]
    fn load_respects_hold_capacity() {
        let mut w = World::new();
        let home = add_colony(&mut w.state, StarId(0), Position::default(), HUMAN, 50_000);
        w.state.star_mut(home).unwrap().resources = 1_000;
        let fleet = w.fleet(FleetLocation::Orbit { star: home }, &[("freighter", 1)]);
        w.order(
            fleet,
            FleetOrder::Load {
                star: home,
                manifest: CargoManifest {
                    resources: Some(CargoAmount::Fill),
                    ..CargoManifest::default()
                },
            },
        );
        w.resolve(fleet);
        assert_eq!(w.state.fleets[fleet].cargo.resources, 250);
        assert_eq!(w.state.star(home).unwrap().resources, 750);
    }

    #[test]
    fn decommission_unloads_then_removes() {
        let mut w = World::new();
        let home = add_colony(&mut w.state, StarId(0), Position::default(), HUMAN, 50_000);
        let fleet = w.fleet(FleetLocation::Orbit { star: home }, &[("freighter", 1)]);
        w.state.fleets[fleet].cargo.minerals = Minerals::new(0, 7, 0);
        w.order(fleet, FleetOrder::Decommission { star: home });
        w.turn();
        assert!(!w.state.fleets.contains_key(fleet));
        assert_eq!(w.state.star(home).unwrap().surface_minerals.boranium, 7);
    }

    #[test]
    fn orbit_then_colonize_settles_on_arrival() {
        let mut w = World::new();
        let target = add_star(&mut w.state, StarId(8), Position::new(30.0, 0.0));
        let fleet = w.fleet(space(0.0, 0.0), &[("colony_ship", 1)]);
        w.state.fleets[fleet].cargo.colonists = 5_000;
        w.order(
            fleet,
            FleetOrder::Orbit {
                star: target,
                warp: None,
                action: Some(OrbitAction::Colonize),
            },
        );
        w.turn();
        // Arrival ends the turn; the colonize order runs next turn.
        assert_eq!(
            w.state.fleets[fleet].orders,
            vec![FleetOrder::Colonize { star: target }]
        );
        w.turn();
        assert!(!w.state.fleets.contains_key(fleet));
        let star = w.state.star(target).unwrap();
        assert_eq!(star.owner, Owner::Player(HUMAN));
        assert_eq!(star.population, 5_000);
        assert_eq!(w.events.buffered_count(EventKind::ColonyFounded), 1);
    }

    // ========================================================================
    // Refuel
    // ========================================================================

    #[test]
    fn orbiting_owned_star_refuels_a_quarter() {
        let mut w = World::new();
        let home = add_colony(&mut w.state, StarId(0), Position::default(), HUMAN, 10_000);
        let fleet = w.fleet(FleetLocation::Orbit { star: home }, &[("freighter", 1)]);
        w.state.fleets[fleet].fuel = 0.0;
        let gained = refuel(&mut w.state, fleet, &w.registry, &w.rules);
        assert_eq!(gained, 50.0);
        assert_eq!(w.state.fleets[fleet].fuel, 50.0);
    }

    #[test]
    fn starbase_in_orbit_refuels_fully() {
        let mut w = World::new();
        let home = add_colony(&mut w.state, StarId(0), Position::default(), HUMAN, 10_000);
        w.fleet(FleetLocation::Orbit { star: home }, &[("starbase", 1)]);
        let fleet = w.fleet(FleetLocation::Orbit { star: home }, &[("freighter", 1)]);
        w.state.fleets[fleet].fuel = 10.0;
        refuel(&mut w.state, fleet, &w.registry, &w.rules);
        assert_eq!(w.state.fleets[fleet].fuel, 200.0);
    }

    #[test]
    fn foreign_orbit_and_open_space_give_nothing() {
        let mut w = World::new();
        let other = add_colony(
            &mut w.state,
            StarId(0),
            Position::default(),
            crate::id::PlayerId(1),
            10_000,
        );
        let docked = w.fleet(FleetLocation::Orbit { star: other }, &[("scout", 1)]);
        let drifting = w.fleet(space(9.0, 9.0), &[("scout", 1)]);
        for id in [docked, drifting] {
            w.state.fleets[id].fuel = 0.0;
            assert_eq!(refuel(&mut w.state, id, &w.registry, &w.rules), 0.0);
        }
    }

    #[test]
    fn ramscoop_scoops_in_space() {
        let mut w = World::new();
        let fleet = w.fleet(space(9.0, 9.0), &[("ramscoop", 1)]);
        let capacity = w.registry.get(&"ramscoop".into()).unwrap().fuel_capacity as f64;
        w.state.fleets[fleet].fuel = 0.0;
        refuel(&mut w.state, fleet, &w.registry, &w.rules);
        assert_eq!(w.state.fleets[fleet].fuel, capacity * 0.15);
    }

    #[test]
    fn empty_stacks_are_cleaned_up() {
        let mut w = World::new();
        let fleet = w.fleet(space(0.0, 0.0), &[("scout", 1)]);
        w.state.fleets[fleet].ships = vec![ShipStack::new("scout", 0)];
        w.turn();
        assert!(!w.state.fleets.contains_key(fleet));
        assert_eq!(w.events.buffered_count(EventKind::FleetRemoved), 1);
    }
}
