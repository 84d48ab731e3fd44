//! Paying for the head of a build queue.
//!
//! Each turn the head item draws what it still needs from the colony's
//! resource and mineral stockpiles, limited by what is on hand. Scrap credit
//! from a replaced starbase counts against the mineral cost only.

use crate::build::BuildItem;
use crate::minerals::{Cost, Mineral, Minerals};
use crate::state::Star;

/// What is still owed on one unit: `cost − paid − scrap`, floored at zero.
/// Resources are never covered by scrap.
pub fn remaining(cost: &Cost, paid: &Cost, scrap: &Minerals) -> Cost {
    Cost {
        resources: cost.resources.saturating_sub(paid.resources),
        minerals: cost
            .minerals
            .saturating_sub(paid.minerals)
            .saturating_sub(*scrap),
    }
}

/// Whether `paid` plus `scrap` covers `cost` in every resource.
pub fn is_covered(cost: &Cost, paid: &Cost, scrap: &Minerals) -> bool {
    paid.resources >= cost.resources
        && Mineral::ALL.into_iter().all(|m| {
            paid.minerals.get(m).saturating_add(scrap.get(m)) >= cost.minerals.get(m)
        })
}

/// Pay as much of the item's remaining cost as the colony can afford.
/// Returns what was paid this turn. `item.paid` is created if missing.
pub fn pay(item: &mut BuildItem, star: &mut Star, scrap: &Minerals) -> Cost {
    let paid = item.paid.get_or_insert(Cost::ZERO);
    let owed = remaining(&item.cost, paid, scrap);

    let payment = Cost {
        resources: owed.resources.min(star.resources),
        minerals: owed.minerals.min(star.surface_minerals),
    };
    star.resources -= payment.resources;
    star.surface_minerals = star.surface_minerals.saturating_sub(payment.minerals);
    *paid += payment;
    payment
}

/// Return scrap minerals beyond what the finished unit needed to the surface.
pub fn refund_excess(star: &mut Star, cost: &Cost, paid: &Cost, scrap: &Minerals) -> Minerals {
    let excess = (paid.minerals + *scrap).saturating_sub(cost.minerals);
    star.surface_minerals += excess;
    excess
}
