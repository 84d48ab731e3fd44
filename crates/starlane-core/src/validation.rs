//! State comparison, invariant checks, and determinism validation.
//!
//! Used to find where two clients' states diverged after the same turn
//! sequence, and to assert that a state obeys the engine's hard rules.

use crate::config::FleetLimits;
use crate::design::DesignResolver;
use crate::engine::{TurnEngine, TurnError};
use crate::fleet::FleetLocation;
use crate::fleet::stats::MovementStats;
use crate::id::{FleetId, PlayerId, StarId};
use crate::snapshot::{SnapshotError, TurnSnapshot};
use crate::state::GameState;

// ---------------------------------------------------------------------------
// State diff types
// ---------------------------------------------------------------------------

/// Difference between two states at the star level.
#[derive(Debug, Clone, PartialEq)]
pub enum StarDiff {
    OnlyInA(StarId),
    OnlyInB(StarId),
    Mismatch { star: StarId, description: String },
}

/// Difference between two states at the fleet level.
#[derive(Debug, Clone, PartialEq)]
pub enum FleetDiff {
    OnlyInA(FleetId),
    OnlyInB(FleetId),
    Mismatch { fleet: FleetId, description: String },
}

/// Per-subsystem match results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubsystemDiff {
    pub turn_matches: bool,
    pub stars_match: bool,
    pub fleets_match: bool,
    pub players_match: bool,
    pub economy_matches: bool,
}

impl SubsystemDiff {
    pub fn all_match(&self) -> bool {
        self.turn_matches
            && self.stars_match
            && self.fleets_match
            && self.players_match
            && self.economy_matches
    }
}

/// Full state diff.
#[derive(Debug, Clone)]
pub struct StateDiff {
    pub is_identical: bool,
    pub subsystem_diffs: SubsystemDiff,
    pub star_diffs: Vec<StarDiff>,
    pub fleet_diffs: Vec<FleetDiff>,
}

// ---------------------------------------------------------------------------
// Quick compare
// ---------------------------------------------------------------------------

/// Subsystem-level comparison using hashes.
pub fn quick_compare(a: &GameState, b: &GameState) -> SubsystemDiff {
    let ha = a.subsystem_hashes();
    let hb = b.subsystem_hashes();

    SubsystemDiff {
        turn_matches: ha.turn == hb.turn,
        stars_match: ha.stars == hb.stars,
        fleets_match: ha.fleets == hb.fleets,
        players_match: ha.players == hb.players,
        economy_matches: ha.economy == hb.economy,
    }
}

// ---------------------------------------------------------------------------
// Full diff
// ---------------------------------------------------------------------------

/// Detailed diff naming every star and fleet that differs.
pub fn diff_states(a: &GameState, b: &GameState) -> StateDiff {
    let subsystem_diffs = quick_compare(a, b);
    let mut star_diffs = Vec::new();
    let mut fleet_diffs = Vec::new();

    for star_a in &a.stars {
        let Some(star_b) = b.star(star_a.id) else {
            star_diffs.push(StarDiff::OnlyInA(star_a.id));
            continue;
        };
        let mut mismatches = Vec::new();
        if star_a.owner != star_b.owner {
            mismatches.push("owner");
        }
        if star_a.population != star_b.population || star_a.max_population != star_b.max_population
        {
            mismatches.push("population");
        }
        if (star_a.mines, star_a.factories, star_a.defenses, star_a.research)
            != (star_b.mines, star_b.factories, star_b.defenses, star_b.research)
        {
            mismatches.push("facilities");
        }
        if star_a.surface_minerals != star_b.surface_minerals
            || star_a.mineral_concentrations != star_b.mineral_concentrations
        {
            mismatches.push("minerals");
        }
        if star_a.build_queue != star_b.build_queue {
            mismatches.push("build_queue");
        }
        if star_a != star_b && mismatches.is_empty() {
            mismatches.push("other");
        }
        if !mismatches.is_empty() {
            star_diffs.push(StarDiff::Mismatch {
                star: star_a.id,
                description: mismatches.join(", "),
            });
        }
    }
    for star_b in &b.stars {
        if a.star(star_b.id).is_none() {
            star_diffs.push(StarDiff::OnlyInB(star_b.id));
        }
    }

    for (id, fleet_a) in &a.fleets {
        let Some(fleet_b) = b.fleets.get(id) else {
            fleet_diffs.push(FleetDiff::OnlyInA(id));
            continue;
        };
        let mut mismatches = Vec::new();
        if fleet_a.location != fleet_b.location {
            mismatches.push("location");
        }
        if fleet_a.ships != fleet_b.ships {
            mismatches.push("ships");
        }
        if fleet_a.fuel.to_bits() != fleet_b.fuel.to_bits() {
            mismatches.push("fuel");
        }
        if fleet_a.cargo != fleet_b.cargo {
            mismatches.push("cargo");
        }
        if fleet_a.orders != fleet_b.orders {
            mismatches.push("orders");
        }
        if !mismatches.is_empty() {
            fleet_diffs.push(FleetDiff::Mismatch {
                fleet: id,
                description: mismatches.join(", "),
            });
        }
    }
    for (id, _) in &b.fleets {
        if !a.fleets.contains_key(id) {
            fleet_diffs.push(FleetDiff::OnlyInB(id));
        }
    }

    StateDiff {
        is_identical: star_diffs.is_empty()
            && fleet_diffs.is_empty()
            && subsystem_diffs.all_match(),
        subsystem_diffs,
        star_diffs,
        fleet_diffs,
    }
}

// ---------------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------------

/// A hard rule a state breaks.
#[derive(Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    PopulationAboveMax { star: StarId, population: u64, max: u64 },
    ConcentrationAbove100 { star: StarId },
    FuelOutOfRange { fleet: FleetId, fuel: f64, capacity: u64 },
    StackTooLarge { fleet: FleetId, count: u32 },
    TooManyFleets { owner: PlayerId, count: usize },
    OrbitsUnknownStar { fleet: FleetId, star: StarId },
}

/// Check every state-wide invariant. An empty result means the state is sound.
pub fn check_invariants(
    state: &GameState,
    resolver: &dyn DesignResolver,
    limits: &FleetLimits,
) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for star in &state.stars {
        // unowned stars keep whatever population the map generator gave them
        if star.owner.player().is_some() && star.population > star.max_population {
            violations.push(InvariantViolation::PopulationAboveMax {
                star: star.id,
                population: star.population,
                max: star.max_population,
            });
        }
        let c = &star.mineral_concentrations;
        if c.ironium > 100 || c.boranium > 100 || c.germanium > 100 {
            violations.push(InvariantViolation::ConcentrationAbove100 { star: star.id });
        }
    }

    for (id, fleet) in &state.fleets {
        let capacity = MovementStats::for_fleet(fleet, resolver).fuel_capacity;
        if fleet.fuel < 0.0 || fleet.fuel > capacity as f64 {
            violations.push(InvariantViolation::FuelOutOfRange {
                fleet: id,
                fuel: fleet.fuel,
                capacity,
            });
        }
        for stack in &fleet.ships {
            if stack.count > limits.max_ships_per_stack {
                violations.push(InvariantViolation::StackTooLarge {
                    fleet: id,
                    count: stack.count,
                });
            }
        }
        if let FleetLocation::Orbit { star } = fleet.location {
            if state.star(star).is_none() {
                violations.push(InvariantViolation::OrbitsUnknownStar { fleet: id, star });
            }
        }
    }

    for owner in state.player_ids() {
        let count = state.fleet_count(owner);
        if count > limits.max_fleets_per_player {
            violations.push(InvariantViolation::TooManyFleets { owner, count });
        }
    }

    violations
}

// ---------------------------------------------------------------------------
// Determinism validation
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DeterminismError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Turn(#[from] TurnError),
}

/// Result of a determinism validation run.
#[derive(Debug)]
pub struct DeterminismResult {
    pub is_deterministic: bool,
    /// Turn at which the hashes first differed.
    pub divergence_turn: Option<u32>,
    /// (turn, hash_run1, hash_run2) after each resolved turn.
    pub hash_log: Vec<(u32, u64, u64)>,
}

/// Resolve `turns` turns twice from the same snapshot, each run with a fresh
/// engine from `make_engine`, and compare hashes after every turn.
pub fn validate_determinism(
    mut make_engine: impl FnMut() -> TurnEngine,
    snapshot_data: &[u8],
    turns: u32,
) -> Result<DeterminismResult, DeterminismError> {
    let mut state_a = TurnSnapshot::decode(snapshot_data)?.state;
    let mut state_b = TurnSnapshot::decode(snapshot_data)?.state;
    let mut engine_a = make_engine();
    let mut engine_b = make_engine();

    let mut hash_log = Vec::new();
    let mut divergence_turn = None;

    for _ in 0..turns {
        state_a = engine_a.end_turn(&state_a)?;
        state_b = engine_b.end_turn(&state_b)?;

        let hash_a = state_a.state_hash();
        let hash_b = state_b.state_hash();
        hash_log.push((state_a.turn, hash_a, hash_b));

        if hash_a != hash_b && divergence_turn.is_none() {
            divergence_turn = Some(state_a.turn);
        }
    }

    Ok(DeterminismResult {
        is_deterministic: divergence_turn.is_none(),
        divergence_turn,
        hash_log,
    })
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::fleet::FleetOrder;
    use crate::state::{Governor, Position};
    use crate::test_utils::*;

    fn busy_state() -> GameState {
        let mut state = empty_state();
        let home = add_colony(&mut state, StarId(0), Position::default(), HUMAN, 10_000);
        add_star(&mut state, StarId(1), Position::new(60.0, 0.0));
        let registry = standard_registry();
        let scout = add_fleet(
            &mut state,
            HUMAN,
            FleetLocation::Orbit { star: home },
            &[("scout", 1)],
            &registry,
        );
        state.fleets[scout].orders = vec![FleetOrder::Orbit {
            star: StarId(1),
            warp: None,
            action: None,
        }];
        let colony = state.star_mut(home).unwrap();
        colony.mines = 20;
        colony.factories = 20;
        colony.governor = Some(Governor::Balanced);
        state
    }

    // -----------------------------------------------------------------------
    // Diffs
    // -----------------------------------------------------------------------

    #[test]
    fn identical_states_have_no_diff() {
        let a = busy_state();
        let b = a.clone();
        let diff = diff_states(&a, &b);
        assert!(diff.is_identical);
        assert!(diff.star_diffs.is_empty());
        assert!(diff.fleet_diffs.is_empty());
    }

    #[test]
    fn turn_difference_detected() {
        let a = busy_state();
        let mut b = a.clone();
        b.turn += 1;
        let quick = quick_compare(&a, &b);
        assert!(!quick.turn_matches);
        assert!(quick.stars_match);
        assert!(!diff_states(&a, &b).is_identical);
    }

    #[test]
    fn star_mismatch_names_fields() {
        let a = busy_state();
        let mut b = a.clone();
        b.star_mut(StarId(0)).unwrap().mines += 1;
        b.stars.pop();
        let diff = diff_states(&a, &b);
        assert!(!diff.is_identical);
        assert_eq!(
            diff.star_diffs,
            vec![
                StarDiff::Mismatch {
                    star: StarId(0),
                    description: "facilities".to_string(),
                },
                StarDiff::OnlyInA(StarId(1)),
            ]
        );
    }

    #[test]
    fn fleet_only_in_b_detected() {
        let a = busy_state();
        let mut b = a.clone();
        let registry = standard_registry();
        let extra = add_fleet(
            &mut b,
            HUMAN,
            FleetLocation::Orbit { star: StarId(0) },
            &[("freighter", 1)],
            &registry,
        );
        let diff = diff_states(&a, &b);
        assert_eq!(diff.fleet_diffs, vec![FleetDiff::OnlyInB(extra)]);
        assert!(!diff.subsystem_diffs.fleets_match);
    }

    // -----------------------------------------------------------------------
    // Invariants
    // -----------------------------------------------------------------------

    #[test]
    fn sound_state_has_no_violations() {
        let state = busy_state();
        let registry = standard_registry();
        assert!(check_invariants(&state, &registry, &FleetLimits::default()).is_empty());
    }

    #[test]
    fn violations_are_reported() {
        let mut state = busy_state();
        let registry = standard_registry();
        {
            let home = state.star_mut(StarId(0)).unwrap();
            home.population = home.max_population + 1;
            home.mineral_concentrations.boranium = 101;
        }
        let fleet = state.fleets.keys().next().unwrap();
        state.fleets[fleet].fuel = -1.0;
        state.fleets[fleet].location = FleetLocation::Orbit { star: StarId(99) };

        let violations = check_invariants(&state, &registry, &FleetLimits::default());
        assert_eq!(violations.len(), 4);
        assert!(violations.contains(&InvariantViolation::ConcentrationAbove100 {
            star: StarId(0)
        }));
        assert!(violations.contains(&InvariantViolation::OrbitsUnknownStar {
            fleet,
            star: StarId(99)
        }));
    }

    #[test]
    fn fleet_limit_violation() {
        let state = busy_state();
        let registry = standard_registry();
        let limits = FleetLimits {
            max_fleets_per_player: 0,
            ..FleetLimits::default()
        };
        let violations = check_invariants(&state, &registry, &limits);
        assert_eq!(
            violations,
            vec![InvariantViolation::TooManyFleets {
                owner: HUMAN,
                count: 1
            }]
        );
    }

    // -----------------------------------------------------------------------
    // Determinism
    // -----------------------------------------------------------------------

    #[test]
    fn turn_resolution_is_deterministic() {
        let data = TurnSnapshot::new(busy_state()).encode().unwrap();
        let result = validate_determinism(
            || TurnEngine::new(RulesConfig::default(), standard_registry()),
            &data,
            5,
        )
        .unwrap();
        assert!(result.is_deterministic);
        assert_eq!(result.divergence_turn, None);
        assert_eq!(result.hash_log.len(), 5);
        assert_eq!(result.hash_log[0].0, 2);
        assert_eq!(result.hash_log[4].0, 6);
    }

    #[test]
    fn garbage_snapshot_is_rejected() {
        let result = validate_determinism(
            || TurnEngine::new(RulesConfig::default(), standard_registry()),
            &[1, 2, 3],
            1,
        );
        assert!(matches!(result, Err(DeterminismError::Snapshot(_))));
    }
}
