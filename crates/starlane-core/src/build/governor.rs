//! Governors: automatic queueing for colonies whose queue has run dry.

use crate::build::{BuildItem, ProjectKind};
use crate::config::ProjectCosts;
use crate::event::{Event, EventBus};
use crate::id::StarId;
use crate::state::{GameState, Governor, Star};

/// The project a governor picks for `star`, or `None` for manual colonies.
pub fn choose_project(star: &Star) -> Option<ProjectKind> {
    match star.governor() {
        Governor::Manual => None,
        Governor::Balanced => {
            let mines_target = star.population / 20;
            let factories_target = star.population / 10;
            Some(if u64::from(star.mines) < mines_target {
                ProjectKind::Mine
            } else if u64::from(star.factories) < factories_target {
                ProjectKind::Factory
            } else {
                ProjectKind::Defense
            })
        }
        Governor::Mining => Some(ProjectKind::Mine),
        Governor::Industrial => Some(ProjectKind::Factory),
        Governor::Military => Some(ProjectKind::Defense),
        Governor::Research => Some(ProjectKind::Research),
    }
}

/// Queue one automatic item at `star` if its queue is empty and it has a
/// non-manual governor. Returns the project queued.
pub fn run_governor(star: &mut Star, costs: &ProjectCosts) -> Option<ProjectKind> {
    if !star.build_queue.is_empty() {
        return None;
    }
    let project = choose_project(star)?;
    let item = BuildItem::project(project, costs)?.auto();
    star.build_queue.push(item);
    Some(project)
}

/// Run governors on every owned colony, human player's first.
pub fn run_governors(state: &mut GameState, costs: &ProjectCosts, events: &mut EventBus, turn: u32) {
    for player in state.player_ids() {
        let colonies: Vec<StarId> = state
            .stars
            .iter()
            .filter(|s| s.is_owned_by(player))
            .map(|s| s.id)
            .collect();
        for star in colonies {
            let Some(colony) = state.star_mut(star) else {
                continue;
            };
            if let Some(project) = run_governor(colony, costs) {
                log::debug!("{star}: governor queued {project:?}");
                events.emit(Event::GovernorQueued {
                    star,
                    project,
                    turn,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minerals::Cost;
    use crate::state::Position;

    fn colony(governor: Option<Governor>, population: u64) -> Star {
        let mut star = Star::new(StarId(0), "Home", Position::default());
        star.population = population;
        star.governor = governor;
        star
    }

    #[test]
    fn balanced_prefers_mines_then_factories_then_defenses() {
        let mut star = colony(Some(Governor::Balanced), 200);
        assert_eq!(choose_project(&star), Some(ProjectKind::Mine));
        star.mines = 10;
        assert_eq!(choose_project(&star), Some(ProjectKind::Factory));
        star.factories = 20;
        assert_eq!(choose_project(&star), Some(ProjectKind::Defense));
    }

    #[test]
    fn specialists_always_pick_their_project() {
        let cases = [
            (Governor::Mining, ProjectKind::Mine),
            (Governor::Industrial, ProjectKind::Factory),
            (Governor::Military, ProjectKind::Defense),
            (Governor::Research, ProjectKind::Research),
        ];
        for (governor, project) in cases {
            assert_eq!(choose_project(&colony(Some(governor), 0)), Some(project));
        }
    }

    #[test]
    fn manual_and_missing_governors_do_nothing() {
        let costs = ProjectCosts::default();
        for governor in [None, Some(Governor::Manual)] {
            let mut star = colony(governor, 1_000);
            assert_eq!(run_governor(&mut star, &costs), None);
            assert!(star.build_queue.is_empty());
        }
    }

    #[test]
    fn governor_waits_for_empty_queue() {
        let costs = ProjectCosts::default();
        let mut star = colony(Some(Governor::Mining), 1_000);
        assert_eq!(run_governor(&mut star, &costs), Some(ProjectKind::Mine));
        assert_eq!(run_governor(&mut star, &costs), None);
        assert_eq!(star.build_queue.len(), 1);
        let item = &star.build_queue[0];
        assert!(item.is_auto);
        assert_eq!(item.cost, Cost::new(5, 0, 0, 0));
    }
}
