//! Colony production, mineral depletion, and population dynamics.
//!
//! All arithmetic here is exact integer math: fractional growth and
//! extraction are floored, and rounding happens once at the end of each
//! formula.

use crate::config::{EconomyRules, PopulationRules};
use crate::minerals::{Mineral, Minerals};
use crate::state::{Owner, Star};

// ---------------------------------------------------------------------------
// Production
// ---------------------------------------------------------------------------

/// What a colony produced in one turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColonyOutput {
    pub resources: u64,
    pub minerals: Minerals,
}

/// Facilities a colony has enough colonists to run.
pub fn operable(count: u32, population: u64, rules: &EconomyRules) -> u64 {
    let staffed = population / rules.population_per_facility.max(1);
    u64::from(count).min(staffed)
}

/// Run a colony's factories and mines for one turn.
///
/// Factories add resources. Mines move minerals to the surface stockpile and
/// deplete the concentration by `round(extraction / depletion_divisor)`.
pub fn produce(star: &mut Star, rules: &EconomyRules) -> ColonyOutput {
    let factories = operable(star.factories, star.population, rules);
    let mines = operable(star.mines, star.population, rules);

    star.resources = star.resources.saturating_add(factories);

    let mut extracted = Minerals::ZERO;
    let divisor = rules.depletion_divisor.max(1);
    for mineral in Mineral::ALL {
        let concentration = star.mineral_concentrations.get(mineral);
        // extraction = mines * concentration / 100, kept as a hundredths count
        let hundredths = mines.saturating_mul(concentration);
        let mined = hundredths / 100;

        *extracted.get_mut(mineral) = mined;
        let surface = star.surface_minerals.get_mut(mineral);
        *surface = surface.saturating_add(mined);

        // round(extraction / divisor), halves rounding up
        let scale = 100u64.saturating_mul(divisor);
        let depletion = hundredths.saturating_add(scale / 2) / scale;
        *star.mineral_concentrations.get_mut(mineral) = concentration.saturating_sub(depletion);
    }

    ColonyOutput {
        resources: factories,
        minerals: extracted,
    }
}

// ---------------------------------------------------------------------------
// Population
// ---------------------------------------------------------------------------

/// Logistic growth: `max(0, floor(population * rate * (1 - population / max)))`
/// with `rate = habitability / growth_divisor`.
pub fn logistic_growth(
    population: u64,
    max_population: u64,
    habitability: i32,
    rules: &PopulationRules,
) -> u64 {
    if habitability <= 0 || max_population == 0 || population >= max_population {
        return 0;
    }
    let numerator = u128::from(population)
        * u128::from(habitability.unsigned_abs())
        * u128::from(max_population - population);
    let denominator = u128::from(rules.growth_divisor.max(1)) * u128::from(max_population);
    u64::try_from(numerator / denominator).unwrap_or(u64::MAX)
}

/// Colonists lost per turn on a hostile world:
/// `ceil(population * min(max_decay, |habitability| * decay_per_percent))`.
pub fn hostile_decay(population: u64, habitability: i32, rules: &PopulationRules) -> u64 {
    let basis_points = u64::from(habitability.unsigned_abs())
        .saturating_mul(rules.decay_basis_points_per_percent)
        .min(rules.max_decay_basis_points);
    let numerator = u128::from(population) * u128::from(basis_points);
    let decay = numerator.div_ceil(10_000);
    u64::try_from(decay).unwrap_or(u64::MAX)
}

/// Max population a colony supports at a positive habitability.
pub fn max_population_for(habitability: i32, rules: &PopulationRules) -> u64 {
    if habitability <= 0 {
        return 0;
    }
    u64::from(habitability.unsigned_abs()).saturating_mul(rules.max_population_per_percent)
}

/// Result of one population update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulationChange {
    Grew { from: u64, to: u64 },
    Declined { from: u64, to: u64 },
    /// The last colonist died; the star is now neutral.
    Abandoned,
    Unchanged,
}

/// Apply one turn of population dynamics to an owned colony.
///
/// Positive habitability resets `max_population` and grows toward it.
/// Otherwise colonists die off; at zero the colony reverts to
/// [`Owner::Neutral`].
pub fn update_population(
    star: &mut Star,
    habitability: i32,
    rules: &PopulationRules,
) -> PopulationChange {
    let before = star.population;

    if habitability > 0 {
        star.max_population = max_population_for(habitability, rules);
        let growth = logistic_growth(before, star.max_population, habitability, rules);
        star.population = before.saturating_add(growth).min(star.max_population);
    } else {
        let decay = hostile_decay(before, habitability, rules);
        star.population = before.saturating_sub(decay);
        if star.population == 0 {
            star.owner = Owner::Neutral;
            return PopulationChange::Abandoned;
        }
    }

    match star.population.cmp(&before) {
        std::cmp::Ordering::Greater => PopulationChange::Grew {
            from: before,
            to: star.population,
        },
        std::cmp::Ordering::Less => PopulationChange::Declined {
            from: before,
            to: star.population,
        },
        std::cmp::Ordering::Equal => PopulationChange::Unchanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{PlayerId, StarId};
    use crate::state::Position;

    fn colony(population: u64, mines: u32, factories: u32) -> Star {
        let mut star = Star::new(StarId(0), "Test", Position::default());
        star.owner = Owner::Player(PlayerId(0));
        star.population = population;
        star.max_population = 1_000_000;
        star.mines = mines;
        star.factories = factories;
        star.mineral_concentrations = Minerals::new(50, 50, 50);
        star
    }

    // -----------------------------------------------------------------------
    // Production
    // -----------------------------------------------------------------------

    #[test]
    fn ten_mines_at_fifty_percent_extract_five() {
        let mut star = colony(100, 10, 10);
        let out = produce(&mut star, &EconomyRules::default());
        assert_eq!(out.resources, 10);
        assert_eq!(star.resources, 10);
        assert_eq!(out.minerals.ironium, 5);
        assert_eq!(star.surface_minerals, Minerals::new(5, 5, 5));
        // round(5 * 0.01) = 0
        assert_eq!(star.mineral_concentrations.ironium, 50);
    }

    #[test]
    fn facilities_limited_by_population() {
        let mut star = colony(35, 10, 10);
        let out = produce(&mut star, &EconomyRules::default());
        assert_eq!(out.resources, 3);
        // 3 mines * 50 % = 1.5, floored
        assert_eq!(out.minerals.ironium, 1);
    }

    #[test]
    fn heavy_mining_depletes_concentration() {
        let mut star = colony(10_000, 1_000, 0);
        star.mineral_concentrations = Minerals::new(100, 40, 1);
        produce(&mut star, &EconomyRules::default());
        // ironium: 1000 extracted → -10; boranium: 400 → -4; germanium: 10 → round(0.1) = 0
        assert_eq!(star.mineral_concentrations, Minerals::new(90, 36, 1));
        assert_eq!(star.surface_minerals, Minerals::new(1000, 400, 10));
    }

    #[test]
    fn depletion_rounds_half_up() {
        let mut star = colony(10_000, 150, 0);
        star.mineral_concentrations = Minerals::new(100, 0, 0);
        produce(&mut star, &EconomyRules::default());
        // 150 extracted → round(1.5) = 2
        assert_eq!(star.mineral_concentrations.ironium, 98);
    }

    #[test]
    fn concentration_never_negative() {
        let mut star = colony(1_000_000, 100_000, 0);
        star.mineral_concentrations = Minerals::new(3, 0, 0);
        produce(&mut star, &EconomyRules::default());
        assert_eq!(star.mineral_concentrations.ironium, 0);
    }

    // -----------------------------------------------------------------------
    // Population
    // -----------------------------------------------------------------------

    #[test]
    fn logistic_growth_matches_formula() {
        let rules = PopulationRules::default();
        // 10_000 * 0.1 * (1 - 10_000/1_000_000) = 990
        assert_eq!(logistic_growth(10_000, 1_000_000, 100, &rules), 990);
        assert_eq!(logistic_growth(1_000_000, 1_000_000, 100, &rules), 0);
        assert_eq!(logistic_growth(0, 1_000_000, 100, &rules), 0);
    }

    #[test]
    fn growth_caps_at_max_population() {
        let rules = PopulationRules::default();
        let mut star = colony(99_990, 0, 0);
        let change = update_population(&mut star, 10, &rules);
        assert_eq!(star.max_population, 100_000);
        assert!(star.population <= star.max_population);
        assert!(matches!(change, PopulationChange::Grew { .. } | PopulationChange::Unchanged));
    }

    #[test]
    fn overpopulated_colony_is_cut_to_new_max() {
        let rules = PopulationRules::default();
        let mut star = colony(500_000, 0, 0);
        update_population(&mut star, 20, &rules);
        assert_eq!(star.max_population, 200_000);
        assert_eq!(star.population, 200_000);
    }

    #[test]
    fn hostile_world_decays() {
        let rules = PopulationRules::default();
        let mut star = colony(1_000, 0, 0);
        // |−50| * 0.15 % = 7.5 % → ceil(75) = 75
        let change = update_population(&mut star, -50, &rules);
        assert_eq!(star.population, 925);
        assert_eq!(change, PopulationChange::Declined { from: 1_000, to: 925 });
    }

    #[test]
    fn decay_fraction_is_capped() {
        let rules = PopulationRules::default();
        assert_eq!(hostile_decay(1_000, -500, &rules), 150);
        assert_eq!(hostile_decay(1_000, 0, &rules), 0);
    }

    #[test]
    fn last_colonist_dying_makes_star_neutral() {
        let rules = PopulationRules::default();
        let mut star = colony(1, 0, 0);
        let change = update_population(&mut star, -10, &rules);
        assert_eq!(change, PopulationChange::Abandoned);
        assert_eq!(star.population, 0);
        assert_eq!(star.owner, Owner::Neutral);
    }
}
