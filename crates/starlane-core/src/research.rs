//! Research progression.
//!
//! All research a player generates in a turn is routed into the single
//! selected field. A field advances at most one level per turn: when progress
//! covers the next level's cost, the cost is consumed and the remainder carries
//! forward. Progress keeps accumulating past the level cap but never buys a
//! level beyond it.

use crate::config::ResearchRules;
use crate::fixed::{Fixed64, from_count};
use crate::tech::{TechField, TechLevels};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Per-player research state
// ---------------------------------------------------------------------------

/// Accumulated research points per field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldProgress {
    pub energy: Fixed64,
    pub kinetics: Fixed64,
    pub propulsion: Fixed64,
    pub construction: Fixed64,
}

impl FieldProgress {
    pub fn get(&self, field: TechField) -> Fixed64 {
        match field {
            TechField::Energy => self.energy,
            TechField::Kinetics => self.kinetics,
            TechField::Propulsion => self.propulsion,
            TechField::Construction => self.construction,
        }
    }

    pub fn get_mut(&mut self, field: TechField) -> &mut Fixed64 {
        match field {
            TechField::Energy => &mut self.energy,
            TechField::Kinetics => &mut self.kinetics,
            TechField::Propulsion => &mut self.propulsion,
            TechField::Construction => &mut self.construction,
        }
    }
}

/// A player's tech levels, progress, and current research focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTech {
    pub levels: TechLevels,
    pub progress: FieldProgress,
    pub selected_field: TechField,
}

/// A level gained this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResearchAdvance {
    pub field: TechField,
    pub level: u32,
}

// ---------------------------------------------------------------------------
// Cost curve
// ---------------------------------------------------------------------------

/// Research points needed to reach `level` from `level - 1`.
///
/// `floor(base * multiplier^(level - 1))`; level 0 costs nothing.
pub fn level_cost(rules: &ResearchRules, level: u32) -> u64 {
    if level == 0 {
        return 0;
    }
    let multiplier = rules.multiplier();
    let mut cost = from_count(u64::from(rules.base_cost));
    for _ in 1..level {
        cost = cost.saturating_mul(multiplier);
    }
    crate::fixed::floor_to_u64(cost)
}

// ---------------------------------------------------------------------------
// Advancement
// ---------------------------------------------------------------------------

/// Add `points` to the selected field and level it up once if affordable.
pub fn apply_research(
    tech: &mut PlayerTech,
    points: Fixed64,
    rules: &ResearchRules,
) -> Option<ResearchAdvance> {
    let field = tech.selected_field;
    let progress = tech.progress.get_mut(field);
    *progress = progress.saturating_add(points);

    let level = tech.levels.get(field);
    if level >= rules.max_level {
        return None;
    }

    let next_cost = from_count(level_cost(rules, level + 1));
    if *progress < next_cost {
        return None;
    }

    *progress -= next_cost;
    let new_level = level + 1;
    *tech.levels.get_mut(field) = new_level;
    log::debug!("research: {field:?} advanced to level {new_level}");
    Some(ResearchAdvance {
        field,
        level: new_level,
    })
}

/// Research points a colony's facilities produce for a species with the
/// given research modifier: `facilities * (1 + modifier)`, never negative.
pub fn colony_research_output(facilities: u32, modifier: Fixed64) -> Fixed64 {
    let factor = (Fixed64::ONE + modifier).max(Fixed64::ZERO);
    from_count(u64::from(facilities)).saturating_mul(factor)
}
