//! The galaxy model: stars (colonies), players, species, and the root
//! [`GameState`] aggregate that each turn consumes and replaces.

use crate::build::BuildItem;
use crate::design::ShipDesign;
use crate::fixed::Fixed64;
use crate::fleet::{Fleet, FleetLocation};
use crate::id::{FleetId, PlayerId, StarId};
use crate::minerals::Minerals;
use crate::research::PlayerTech;
use crate::scanning::ScanReport;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A point in the galaxy plane, in light-years.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Position) -> f64 {
        self.distance_sq(other).sqrt()
    }

    /// The point `step` light-years from `self` on the straight line to `target`.
    /// Returns `target` when `step` reaches or passes it.
    pub fn toward(&self, target: &Position, step: f64) -> Position {
        let dist = self.distance(target);
        if dist <= 0.0 || step >= dist {
            return *target;
        }
        let t = step / dist;
        Position {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
        }
    }
}

// ---------------------------------------------------------------------------
// Ownership and governors
// ---------------------------------------------------------------------------

/// Who controls a star.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    /// Never colonized.
    #[default]
    Unowned,
    /// Colonized once, then abandoned when its population died out.
    Neutral,
    Player(PlayerId),
}

impl Owner {
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            Owner::Player(id) => Some(*id),
            Owner::Unowned | Owner::Neutral => None,
        }
    }

    pub fn is_player(&self, player: PlayerId) -> bool {
        self.player() == Some(player)
    }

    /// Whether a colony ship may settle here.
    pub fn is_colonizable(&self) -> bool {
        !matches!(self, Owner::Player(_))
    }
}

/// Auto-queueing policy for a colony whose build queue runs dry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Governor {
    #[default]
    Manual,
    Balanced,
    Mining,
    Industrial,
    Military,
    Research,
}

// ---------------------------------------------------------------------------
// Star
// ---------------------------------------------------------------------------

/// Cumulative environment change applied by terraforming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerraformOffset {
    pub temperature: i32,
    pub atmosphere: i32,
}

/// A star system merged with its single colony.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub id: StarId,
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub owner: Owner,
    #[serde(default)]
    pub population: u64,
    #[serde(default)]
    pub max_population: u64,
    #[serde(default)]
    pub mines: u32,
    #[serde(default)]
    pub factories: u32,
    #[serde(default)]
    pub defenses: u32,
    /// Research facility count.
    #[serde(default)]
    pub research: u32,
    #[serde(default)]
    pub scanner_range: u32,
    /// Current temperature, terraforming included.
    pub temperature: i32,
    /// Current atmosphere, terraforming included.
    pub atmosphere: i32,
    #[serde(default)]
    pub terraform_offset: TerraformOffset,
    /// Percent, 0..=100 per mineral.
    pub mineral_concentrations: Minerals,
    /// Mined stockpile, kT.
    #[serde(default)]
    pub surface_minerals: Minerals,
    #[serde(default)]
    pub resources: u64,
    #[serde(default)]
    pub build_queue: Vec<BuildItem>,
    /// `None` behaves as [`Governor::Manual`].
    #[serde(default)]
    pub governor: Option<Governor>,
}

impl Star {
    /// An unowned, undeveloped star.
    pub fn new(id: StarId, name: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            owner: Owner::Unowned,
            population: 0,
            max_population: 0,
            mines: 0,
            factories: 0,
            defenses: 0,
            research: 0,
            scanner_range: 0,
            temperature: 50,
            atmosphere: 50,
            terraform_offset: TerraformOffset::default(),
            mineral_concentrations: Minerals::ZERO,
            surface_minerals: Minerals::ZERO,
            resources: 0,
            build_queue: Vec::new(),
            governor: None,
        }
    }

    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner.is_player(player)
    }

    pub fn governor(&self) -> Governor {
        self.governor.unwrap_or(Governor::Manual)
    }
}

// ---------------------------------------------------------------------------
// Species and players
// ---------------------------------------------------------------------------

/// Where a species thrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habitat {
    pub ideal_temperature: i32,
    pub ideal_atmosphere: i32,
    pub tolerance_radius: i32,
}

/// Numeric trait modifiers. `0` is neutral; `0.1` is +10 %.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesTraits {
    pub growth: Fixed64,
    pub mining: Fixed64,
    pub research: Fixed64,
    pub ship_cost: Fixed64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: String,
    pub name: String,
    pub habitat: Habitat,
    #[serde(default)]
    pub traits: SpeciesTraits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub species: Species,
    #[serde(default)]
    pub tech: PlayerTech,
    /// Last scan of each star this player has ever seen. Overwritten on
    /// rescan, never merged.
    #[serde(default)]
    pub scan_reports: BTreeMap<StarId, ScanReport>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, species: Species) -> Self {
        Self {
            id,
            name: name.into(),
            species,
            tech: PlayerTech::default(),
            scan_reports: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Game state
// ---------------------------------------------------------------------------

/// Aggregate counters for the human player's economy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerEconomy {
    pub freighter_capacity: u64,
    /// Total research points generated since the game began.
    pub research: Fixed64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub seed: u64,
    pub ai_count: u32,
}

/// The root aggregate. One value per turn: the turn engine reads the previous
/// state and returns a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub id: String,
    pub turn: u32,
    pub settings: GameSettings,
    pub stars: Vec<Star>,
    pub human_player: Player,
    pub ai_players: Vec<Player>,
    pub fleets: SlotMap<FleetId, Fleet>,
    pub ship_designs: Vec<ShipDesign>,
    pub player_economy: PlayerEconomy,
}

impl GameState {
    /// An empty galaxy at turn 1 with only the human player.
    pub fn new(id: impl Into<String>, human_player: Player) -> Self {
        Self {
            id: id.into(),
            turn: 1,
            settings: GameSettings::default(),
            stars: Vec::new(),
            human_player,
            ai_players: Vec::new(),
            fleets: SlotMap::with_key(),
            ship_designs: Vec::new(),
            player_economy: PlayerEconomy::default(),
        }
    }

    // -- Stars --

    pub fn star_index(&self, id: StarId) -> Option<usize> {
        self.stars.iter().position(|s| s.id == id)
    }

    pub fn star(&self, id: StarId) -> Option<&Star> {
        self.stars.iter().find(|s| s.id == id)
    }

    pub fn star_mut(&mut self, id: StarId) -> Option<&mut Star> {
        self.stars.iter_mut().find(|s| s.id == id)
    }

    // -- Players --

    /// Human player first, then AI players in list order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        std::iter::once(&self.human_player).chain(self.ai_players.iter())
    }

    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        std::iter::once(&mut self.human_player).chain(self.ai_players.iter_mut())
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players().map(|p| p.id).collect()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players_mut().find(|p| p.id == id)
    }

    // -- Fleets --

    pub fn fleets_owned_by(&self, owner: PlayerId) -> impl Iterator<Item = (FleetId, &Fleet)> {
        self.fleets.iter().filter(move |(_, f)| f.owner == owner)
    }

    pub fn fleet_count(&self, owner: PlayerId) -> usize {
        self.fleets_owned_by(owner).count()
    }

    /// Fleets of `owner` in orbit of `star`, in slot order.
    pub fn fleets_in_orbit(
        &self,
        star: StarId,
        owner: PlayerId,
    ) -> impl Iterator<Item = (FleetId, &Fleet)> {
        self.fleets_owned_by(owner)
            .filter(move |(_, f)| f.location == FleetLocation::Orbit { star })
    }

    /// Where a fleet is. Orbiting fleets sit at their star's position.
    pub fn fleet_position(&self, fleet: &Fleet) -> Option<Position> {
        match fleet.location {
            FleetLocation::Orbit { star } => self.star(star).map(|s| s.position),
            FleetLocation::Space { position } => Some(position),
        }
    }
}
