//! Effects of a completed build project.

use crate::build::{BuildItem, ProjectKind};
use crate::config::RulesConfig;
use crate::design::DesignResolver;
use crate::fleet::FleetError;
use crate::fleet::ops::add_ships_at_star;
use crate::id::{FleetId, StarId};
use crate::state::{GameState, Habitat, Star};
use crate::tech::{BASE_SCANNER_RANGE, best_scanner_range};

/// What completing one unit produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The colony itself changed.
    Colony,
    /// A ship joined `fleet`. `new_fleet` is set when the fleet was created
    /// for it.
    Ship { fleet: FleetId, new_fleet: bool },
}

/// Apply one finished unit of `item` to the colony at `star`.
///
/// Facility projects add one facility. A scanner installs the best planetary
/// scanner the owner's tech allows. Terraforming nudges temperature and
/// atmosphere one step toward the owner's ideal. Ships are launched through
/// [`add_ships_at_star`], which is the only way this can fail.
pub fn complete(
    state: &mut GameState,
    star: StarId,
    item: &BuildItem,
    resolver: &dyn DesignResolver,
    rules: &RulesConfig,
) -> Result<Completion, FleetError> {
    let owner = state
        .star(star)
        .ok_or(FleetError::UnknownStar(star))?
        .owner
        .player();
    let owner_player = owner.and_then(|id| state.player(id));
    let scanner_range = owner_player.map(|p| best_scanner_range(&p.tech.levels));
    let habitat = owner_player.map(|p| p.species.habitat);

    if item.project == ProjectKind::Ship {
        let design = item
            .ship_design
            .clone()
            .unwrap_or_else(|| rules.build.default_ship_design.clone());
        let owner = owner.ok_or(FleetError::UnownedStar(star))?;
        let before = state.fleet_count(owner);
        let fleet = add_ships_at_star(state, star, &design, 1, resolver, &rules.limits)?;
        return Ok(Completion::Ship {
            fleet,
            new_fleet: state.fleet_count(owner) > before,
        });
    }

    let colony = state.star_mut(star).ok_or(FleetError::UnknownStar(star))?;
    match item.project {
        ProjectKind::Mine => colony.mines += 1,
        ProjectKind::Factory => colony.factories += 1,
        ProjectKind::Defense => colony.defenses += 1,
        ProjectKind::Research => colony.research += 1,
        ProjectKind::Scanner => {
            colony.scanner_range = scanner_range.unwrap_or(BASE_SCANNER_RANGE);
        }
        ProjectKind::Terraform => {
            if let Some(habitat) = habitat {
                terraform(colony, &habitat);
            }
        }
        ProjectKind::Ship => {}
    }
    Ok(Completion::Colony)
}

fn step_toward(current: i32, ideal: i32) -> i32 {
    (ideal - current).signum()
}

/// One step of terraforming. A value already at the ideal stays put.
pub fn terraform(star: &mut Star, habitat: &Habitat) {
    let dt = step_toward(star.temperature, habitat.ideal_temperature);
    let da = step_toward(star.atmosphere, habitat.ideal_atmosphere);
    star.temperature += dt;
    star.atmosphere += da;
    star.terraform_offset.temperature += dt;
    star.terraform_offset.atmosphere += da;
}
