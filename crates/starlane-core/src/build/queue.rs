//! The per-turn build loop and player-facing queue edits.
//!
//! Queue edits on a colony the acting player does not own, or with an index
//! past the end of the queue, are silent no-ops (logged at `warn`).

use crate::build::payment::{is_covered, pay, refund_excess};
use crate::build::project::{Completion, complete};
use crate::build::starbase::{find_credit, retire};
use crate::build::{BuildItem, ProjectKind};
use crate::config::RulesConfig;
use crate::design::DesignResolver;
use crate::event::{Event, EventBus};
use crate::fleet::FleetError;
use crate::id::{PlayerId, StarId};
use crate::minerals::{Cost, Minerals};
use crate::state::{GameState, Governor, Star};

// ---------------------------------------------------------------------------
// Turn processing
// ---------------------------------------------------------------------------

/// Run every owned colony's queue: players in order (human first), each
/// player's colonies in star-list order. Returns the number of units built.
pub fn process_all_queues(
    state: &mut GameState,
    resolver: &dyn DesignResolver,
    rules: &RulesConfig,
    events: &mut EventBus,
    turn: u32,
) -> Result<usize, FleetError> {
    let mut built = 0;
    for player in state.player_ids() {
        let colonies: Vec<StarId> = state
            .stars
            .iter()
            .filter(|s| s.is_owned_by(player))
            .map(|s| s.id)
            .collect();
        for star in colonies {
            built += process_queue(state, star, resolver, rules, events, turn)?;
        }
    }
    Ok(built)
}

/// Pay for and complete items at the head of one colony's queue until an
/// item cannot be fully paid this turn. Returns the number of units built.
///
/// A finished item with more units to go stays at the head with its count
/// reduced and its payment reset.
pub fn process_queue(
    state: &mut GameState,
    star: StarId,
    resolver: &dyn DesignResolver,
    rules: &RulesConfig,
    events: &mut EventBus,
    turn: u32,
) -> Result<usize, FleetError> {
    let mut built = 0;
    loop {
        let Some(index) = state.star_index(star) else {
            return Ok(built);
        };
        if state.stars[index].build_queue.is_empty() {
            return Ok(built);
        }

        let credit = {
            let head = &state.stars[index].build_queue[0];
            if head.project == ProjectKind::Ship && !head.replaced_starbase {
                let design = head
                    .ship_design
                    .as_ref()
                    .unwrap_or(&rules.build.default_ship_design);
                find_credit(state, star, design, resolver, rules.build.starbase_scrap_percent)
            } else {
                None
            }
        };
        let scrap = credit.map_or(Minerals::ZERO, |c| c.scrap);

        let colony = &mut state.stars[index];
        let mut head = colony.build_queue.remove(0);
        pay(&mut head, colony, &scrap);
        let paid = head.paid.unwrap_or(Cost::ZERO);
        if !is_covered(&head.cost, &paid, &scrap) {
            colony.build_queue.insert(0, head);
            return Ok(built);
        }

        refund_excess(colony, &head.cost, &paid, &scrap);
        if let Some(credit) = credit {
            retire(state, &credit, resolver);
            head.replaced_starbase = true;
        }
        let completion = complete(state, star, &head, resolver, rules)?;
        built += 1;
        log::debug!("{star}: completed {:?}", head.project);

        events.emit(Event::ProjectCompleted {
            star,
            project: head.project,
            turn,
        });
        if let Completion::Ship {
            fleet,
            new_fleet: true,
        } = completion
        {
            if let Some(owner) = state.fleets.get(fleet).map(|f| f.owner) {
                events.emit(Event::FleetCreated {
                    fleet,
                    owner,
                    star,
                    turn,
                });
            }
        }

        if head.count > 1 {
            head.count -= 1;
            head.paid = None;
            if let Some(colony) = state.star_mut(star) {
                colony.build_queue.insert(0, head);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Queue edits
// ---------------------------------------------------------------------------

fn owned_colony(state: &mut GameState, player: PlayerId, star: StarId) -> Option<&mut Star> {
    state.star_mut(star).filter(|s| s.is_owned_by(player))
}

/// Append `item` to the colony's queue. Returns false (and changes nothing)
/// when `player` does not own the colony.
pub fn add_to_queue(state: &mut GameState, player: PlayerId, star: StarId, item: BuildItem) -> bool {
    let Some(colony) = owned_colony(state, player, star) else {
        log::warn!("{player} cannot queue at {star}: not owned");
        return false;
    };
    colony.build_queue.push(item);
    true
}

/// Remove and return the item at `index`. `None` when `player` does not own
/// the colony or `index` is out of range.
pub fn remove_from_queue(
    state: &mut GameState,
    player: PlayerId,
    star: StarId,
    index: usize,
) -> Option<BuildItem> {
    let colony = owned_colony(state, player, star)?;
    if index >= colony.build_queue.len() {
        log::warn!("{player}: no queue entry {index} at {star}");
        return None;
    }
    Some(colony.build_queue.remove(index))
}

/// Set or clear the colony's governor. `None` means manual.
pub fn set_governor(
    state: &mut GameState,
    player: PlayerId,
    star: StarId,
    governor: Option<Governor>,
) -> bool {
    let Some(colony) = owned_colony(state, player, star) else {
        log::warn!("{player} cannot set governor at {star}: not owned");
        return false;
    };
    colony.governor = Some(governor.unwrap_or(Governor::Manual));
    true
}
