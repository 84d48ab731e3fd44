//! Deterministic state hashing.
//!
//! Two runs of the same turn sequence from the same state must produce
//! byte-identical hashes. Hashing walks stars in list order, fleets in slot
//! order, and players human-first, so it never depends on hash-map
//! iteration.

use crate::build::{BuildItem, ProjectKind};
use crate::fixed::Fixed64;
use crate::fleet::{Fleet, FleetLocation};
use crate::minerals::{Cost, Minerals};
use crate::state::{GameState, Owner, Player, Star};
use slotmap::Key;

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A simple deterministic hash of game state for desync detection.
///
/// Uses FNV-1a (64-bit) for speed and simplicity. Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write(&[v as u8]);
    }

    /// Hashes the bit pattern, so `0.0` and `-0.0` differ.
    pub fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    pub fn write_fixed64(&mut self, v: Fixed64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    /// Length-prefixed, so adjacent strings cannot collide.
    pub fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write(s.as_bytes());
    }

    pub fn write_minerals(&mut self, m: &Minerals) {
        self.write_u64(m.ironium);
        self.write_u64(m.boranium);
        self.write_u64(m.germanium);
    }

    pub fn write_cost(&mut self, c: &Cost) {
        self.write_u64(c.resources);
        self.write_minerals(&c.minerals);
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Subsystem hashes
// ---------------------------------------------------------------------------

/// One hash per part of the state, for pinpointing where two states differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubsystemHashes {
    pub turn: u64,
    pub stars: u64,
    pub fleets: u64,
    pub players: u64,
    pub economy: u64,
}

fn hash_owner(h: &mut StateHash, owner: &Owner) {
    match owner {
        Owner::Unowned => h.write(&[0]),
        Owner::Neutral => h.write(&[1]),
        Owner::Player(id) => {
            h.write(&[2]);
            h.write_u32(id.0);
        }
    }
}

fn hash_build_item(h: &mut StateHash, item: &BuildItem) {
    let kind = ProjectKind::ALL
        .iter()
        .position(|k| *k == item.project)
        .unwrap_or(usize::MAX);
    h.write_u64(kind as u64);
    h.write_cost(&item.cost);
    match &item.paid {
        Some(paid) => {
            h.write_bool(true);
            h.write_cost(paid);
        }
        None => h.write_bool(false),
    }
    h.write_str(item.ship_design.as_ref().map_or("", |d| d.as_str()));
    h.write_bool(item.is_auto);
    h.write_u32(item.count);
    h.write_bool(item.replaced_starbase);
}

fn hash_star(h: &mut StateHash, star: &Star) {
    h.write_u32(star.id.0);
    h.write_f64(star.position.x);
    h.write_f64(star.position.y);
    hash_owner(h, &star.owner);
    h.write_u64(star.population);
    h.write_u64(star.max_population);
    h.write_u32(star.mines);
    h.write_u32(star.factories);
    h.write_u32(star.defenses);
    h.write_u32(star.research);
    h.write_u32(star.scanner_range);
    h.write_i32(star.temperature);
    h.write_i32(star.atmosphere);
    h.write_i32(star.terraform_offset.temperature);
    h.write_i32(star.terraform_offset.atmosphere);
    h.write_minerals(&star.mineral_concentrations);
    h.write_minerals(&star.surface_minerals);
    h.write_u64(star.resources);
    h.write_u64(star.build_queue.len() as u64);
    for item in &star.build_queue {
        hash_build_item(h, item);
    }
    h.write_u32(star.governor.map_or(u32::MAX, |g| g as u32));
}

fn hash_fleet(h: &mut StateHash, fleet: &Fleet) {
    h.write_str(&fleet.name);
    h.write_u32(fleet.owner.0);
    match fleet.location {
        FleetLocation::Orbit { star } => {
            h.write(&[0]);
            h.write_u32(star.0);
        }
        FleetLocation::Space { position } => {
            h.write(&[1]);
            h.write_f64(position.x);
            h.write_f64(position.y);
        }
    }
    h.write_u64(fleet.ships.len() as u64);
    for stack in &fleet.ships {
        h.write_str(stack.design.as_str());
        h.write_u32(stack.count);
        h.write_u32(stack.damage);
    }
    h.write_f64(fleet.fuel);
    h.write_u64(fleet.cargo.resources);
    h.write_minerals(&fleet.cargo.minerals);
    h.write_u64(fleet.cargo.colonists);
    h.write_u64(fleet.orders.len() as u64);
}

fn hash_player(h: &mut StateHash, player: &Player) {
    h.write_u32(player.id.0);
    let tech = &player.tech;
    for field in crate::tech::TechField::ALL {
        h.write_u32(tech.levels.get(field));
        h.write_fixed64(tech.progress.get(field));
    }
    h.write_u32(tech.selected_field as u32);
    h.write_u64(player.scan_reports.len() as u64);
    for (star, report) in &player.scan_reports {
        h.write_u32(star.0);
        h.write_u32(report.turn);
        h.write_u64(report.population);
    }
}

impl GameState {
    pub fn subsystem_hashes(&self) -> SubsystemHashes {
        let mut turn = StateHash::new();
        turn.write_u32(self.turn);

        let mut stars = StateHash::new();
        for star in &self.stars {
            hash_star(&mut stars, star);
        }

        let mut fleets = StateHash::new();
        for (id, fleet) in &self.fleets {
            fleets.write_u64(id.data().as_ffi());
            hash_fleet(&mut fleets, fleet);
        }

        let mut players = StateHash::new();
        for player in self.players() {
            hash_player(&mut players, player);
        }

        let mut economy = StateHash::new();
        economy.write_u64(self.player_economy.freighter_capacity);
        economy.write_fixed64(self.player_economy.research);

        SubsystemHashes {
            turn: turn.finish(),
            stars: stars.finish(),
            fleets: fleets.finish(),
            players: players.finish(),
            economy: economy.finish(),
        }
    }

    /// Hash of the whole state. Equal states always hash equal.
    pub fn state_hash(&self) -> u64 {
        let parts = self.subsystem_hashes();
        let mut h = StateHash::new();
        h.write_u64(parts.turn);
        h.write_u64(parts.stars);
        h.write_u64(parts.fleets);
        h.write_u64(parts.players);
        h.write_u64(parts.economy);
        h.finish()
    }
}
