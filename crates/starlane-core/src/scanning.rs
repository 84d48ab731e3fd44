//! Fog of war.
//!
//! Each turn every player gathers scanner circles from the colonies and fleets
//! they own. Any star inside a circle gets a fresh [`ScanReport`] stamped with
//! the current turn, replacing whatever that player knew before. Visibility
//! is derived from the age of the report, never stored.

use crate::config::ScanRules;
use crate::design::DesignResolver;
use crate::id::{PlayerId, StarId};
use crate::minerals::Minerals;
use crate::state::{GameState, Owner, Position, Star};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// What a player saw of a star at `turn`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub turn: u32,
    pub owner: Owner,
    pub population: u64,
    pub max_population: u64,
    pub mines: u32,
    pub factories: u32,
    pub defenses: u32,
    pub mineral_concentrations: Minerals,
    pub surface_minerals: Minerals,
    pub temperature: i32,
    pub atmosphere: i32,
    pub resources: u64,
}

impl ScanReport {
    pub fn capture(star: &Star, turn: u32) -> Self {
        Self {
            turn,
            owner: star.owner,
            population: star.population,
            max_population: star.max_population,
            mines: star.mines,
            factories: star.factories,
            defenses: star.defenses,
            mineral_concentrations: star.mineral_concentrations,
            surface_minerals: star.surface_minerals,
            temperature: star.temperature,
            atmosphere: star.atmosphere,
            resources: star.resources,
        }
    }
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisibilityStatus {
    /// Never scanned.
    Unexplored,
    /// Scanned this turn or the one before.
    Visible,
    /// Known only from an older report.
    Fog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarVisibility<'a> {
    pub status: VisibilityStatus,
    /// Turns since the report was taken. 0 when unexplored.
    pub age: u32,
    pub report: Option<&'a ScanReport>,
}

/// Classify how well `player` currently sees `star`.
pub fn visibility<'a>(
    state: &'a GameState,
    player: PlayerId,
    star: StarId,
) -> StarVisibility<'a> {
    let report = state
        .player(player)
        .and_then(|p| p.scan_reports.get(&star));
    classify(report, state.turn)
}

/// Classify a report (or its absence) at `current_turn`.
pub fn classify(report: Option<&ScanReport>, current_turn: u32) -> StarVisibility<'_> {
    match report {
        None => StarVisibility {
            status: VisibilityStatus::Unexplored,
            age: 0,
            report: None,
        },
        Some(r) => {
            let age = current_turn.saturating_sub(r.turn);
            let status = if age <= 1 {
                VisibilityStatus::Visible
            } else {
                VisibilityStatus::Fog
            };
            StarVisibility {
                status,
                age,
                report: Some(r),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Scanners
// ---------------------------------------------------------------------------

/// A scanner circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scanner {
    pub position: Position,
    pub range: u32,
}

impl Scanner {
    pub fn covers(&self, point: &Position) -> bool {
        let range = f64::from(self.range);
        self.position.distance_sq(point) <= range * range
    }
}

/// All scanner circles `player` has this turn.
pub fn collect_scanners(
    state: &GameState,
    player: PlayerId,
    resolver: &dyn DesignResolver,
    rules: &ScanRules,
) -> Vec<Scanner> {
    let mut scanners = Vec::new();

    for star in state.stars.iter().filter(|s| s.is_owned_by(player)) {
        if star.scanner_range > 0 {
            scanners.push(Scanner {
                position: star.position,
                range: star.scanner_range,
            });
        }
        scanners.push(Scanner {
            position: star.position,
            range: rules.self_scan_range,
        });
    }

    for (_, fleet) in state.fleets_owned_by(player) {
        let range = fleet
            .ships
            .iter()
            .map(|stack| resolver.resolve_or_fallback(&stack.design).scan_range)
            .max()
            .unwrap_or(0);
        if range == 0 {
            continue;
        }
        if let Some(position) = state.fleet_position(fleet) {
            scanners.push(Scanner { position, range });
        }
    }

    scanners
}

/// Fresh reports `player` gains this turn, keyed by star.
pub fn scan_for_player(
    state: &GameState,
    player: PlayerId,
    resolver: &dyn DesignResolver,
    rules: &ScanRules,
) -> Vec<(StarId, ScanReport)> {
    let scanners = collect_scanners(state, player, resolver, rules);
    state
        .stars
        .iter()
        .filter(|star| scanners.iter().any(|s| s.covers(&star.position)))
        .map(|star| (star.id, ScanReport::capture(star, state.turn)))
        .collect()
}

/// Recompute visibility for every player, overwriting reports in place.
/// Returns the number of reports written per player, in player order.
pub fn scan_all(
    state: &mut GameState,
    resolver: &(dyn DesignResolver + Sync),
    rules: &ScanRules,
) -> Vec<(PlayerId, usize)> {
    let players = state.player_ids();

    #[cfg(feature = "parallel")]
    let updates: Vec<Vec<(StarId, ScanReport)>> = {
        use rayon::prelude::*;
        let snapshot: &GameState = state;
        players
            .par_iter()
            .map(|&p| scan_for_player(snapshot, p, resolver, rules))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let updates: Vec<Vec<(StarId, ScanReport)>> = players
        .iter()
        .map(|&p| scan_for_player(state, p, resolver, rules))
        .collect();

    let mut written = Vec::with_capacity(players.len());
    for (player_id, reports) in players.into_iter().zip(updates) {
        let count = reports.len();
        if let Some(player) = state.player_mut(player_id) {
            for (star, report) in reports {
                player.scan_reports.insert(star, report);
            }
        }
        written.push((player_id, count));
    }
    written
}
