//! Moving cargo between a fleet's holds and a star.

use crate::fleet::Fleet;
use crate::minerals::{Mineral, Minerals};
use crate::state::Star;
use serde::{Deserialize, Serialize};

/// How much of one cargo type to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CargoAmount {
    /// Everything available at the source.
    All,
    /// As much as the destination has room for.
    Fill,
    Exact(u64),
}

/// Per-type transfer request. `None` leaves that type alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CargoManifest {
    #[serde(default)]
    pub resources: Option<CargoAmount>,
    #[serde(default)]
    pub ironium: Option<CargoAmount>,
    #[serde(default)]
    pub boranium: Option<CargoAmount>,
    #[serde(default)]
    pub germanium: Option<CargoAmount>,
    #[serde(default)]
    pub colonists: Option<CargoAmount>,
}

impl CargoManifest {
    /// Every cargo type, all of it.
    pub fn everything() -> Self {
        Self {
            resources: Some(CargoAmount::All),
            ironium: Some(CargoAmount::All),
            boranium: Some(CargoAmount::All),
            germanium: Some(CargoAmount::All),
            colonists: Some(CargoAmount::All),
        }
    }

    /// All three minerals.
    pub fn minerals() -> Self {
        Self {
            ironium: Some(CargoAmount::All),
            boranium: Some(CargoAmount::All),
            germanium: Some(CargoAmount::All),
            ..Self::default()
        }
    }

    fn mineral(&self, mineral: Mineral) -> Option<CargoAmount> {
        match mineral {
            Mineral::Ironium => self.ironium,
            Mineral::Boranium => self.boranium,
            Mineral::Germanium => self.germanium,
        }
    }
}

fn wanted(amount: CargoAmount, available: u64, room: u64) -> u64 {
    let want = match amount {
        CargoAmount::All => available,
        CargoAmount::Fill => room,
        CargoAmount::Exact(n) => n,
    };
    want.min(available).min(room)
}

/// What actually moved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transfer {
    pub resources: u64,
    pub minerals: Minerals,
    pub colonists: u64,
}

impl Transfer {
    pub fn is_empty(&self) -> bool {
        self.resources == 0 && self.minerals.is_zero() && self.colonists == 0
    }
}

/// Load from `star` into `fleet`, limited by stock and free hold space.
/// Minerals go first (ironium, boranium, germanium), then resources, then
/// colonists at 1 kT per thousand.
pub fn load(fleet: &mut Fleet, star: &mut Star, capacity: u64, manifest: &CargoManifest) -> Transfer {
    let mut moved = Transfer::default();

    for mineral in Mineral::ALL {
        let Some(amount) = manifest.mineral(mineral) else {
            continue;
        };
        let room = capacity.saturating_sub(fleet.cargo.hold_used());
        let take = wanted(amount, star.surface_minerals.get(mineral), room);
        *star.surface_minerals.get_mut(mineral) -= take;
        *fleet.cargo.minerals.get_mut(mineral) += take;
        *moved.minerals.get_mut(mineral) += take;
    }

    if let Some(amount) = manifest.resources {
        let room = capacity.saturating_sub(fleet.cargo.hold_used());
        let take = wanted(amount, star.resources, room);
        star.resources -= take;
        fleet.cargo.resources += take;
        moved.resources = take;
    }

    if let Some(amount) = manifest.colonists {
        let room_kt = capacity.saturating_sub(fleet.cargo.hold_used());
        // Partial thousands already aboard still fit in their kT.
        let slack = (1000 - fleet.cargo.colonists % 1000) % 1000;
        let room = room_kt.saturating_mul(1000).saturating_add(slack);
        let take = wanted(amount, star.population, room);
        star.population -= take;
        fleet.cargo.colonists += take;
        moved.colonists = take;
    }

    moved
}

/// Unload from `fleet` onto `star`. Colonists only land while the colony has
/// room under its max population; the rest stay aboard.
pub fn unload(fleet: &mut Fleet, star: &mut Star, manifest: &CargoManifest) -> Transfer {
    let mut moved = Transfer::default();

    for mineral in Mineral::ALL {
        let Some(amount) = manifest.mineral(mineral) else {
            continue;
        };
        let aboard = fleet.cargo.minerals.get(mineral);
        let drop = wanted(amount, aboard, u64::MAX);
        *fleet.cargo.minerals.get_mut(mineral) -= drop;
        let surface = star.surface_minerals.get_mut(mineral);
        *surface = surface.saturating_add(drop);
        *moved.minerals.get_mut(mineral) += drop;
    }

    if let Some(amount) = manifest.resources {
        let drop = wanted(amount, fleet.cargo.resources, u64::MAX);
        fleet.cargo.resources -= drop;
        star.resources = star.resources.saturating_add(drop);
        moved.resources = drop;
    }

    if let Some(amount) = manifest.colonists {
        let room = star.max_population.saturating_sub(star.population);
        let drop = wanted(amount, fleet.cargo.colonists, room);
        fleet.cargo.colonists -= drop;
        star.population += drop;
        moved.colonists = drop;
    }

    moved
}
