//! Aggregate movement statistics and the fuel curve.
//!
//! A fleet moves as its slowest, thirstiest ship: max warp and ideal warp are
//! minimums across stacks, fuel efficiency is the worst (largest) value.

use crate::design::DesignResolver;
use crate::fleet::Fleet;

/// Movement statistics of a whole fleet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementStats {
    /// Highest warp every stack can reach, at least 1. 0 for a shipless fleet.
    pub max_warp: u32,
    /// Lowest ideal warp across stacks, at least 1.
    pub ideal_warp: u32,
    /// Hull plus cargo mass in kT, at least 1. Carried resources are weightless.
    pub total_mass: u64,
    pub fuel_capacity: u64,
    /// Worst fuel efficiency (larger burns more). 0 means free movement.
    pub worst_efficiency: u32,
    pub cargo_capacity: u64,
    pub has_ramscoop: bool,
    pub has_starbase: bool,
}

impl MovementStats {
    pub fn for_fleet(fleet: &Fleet, resolver: &dyn DesignResolver) -> Self {
        let mut max_warp: Option<u32> = None;
        let mut ideal_warp: Option<u32> = None;
        let mut hull_mass: u64 = 0;
        let mut fuel_capacity: u64 = 0;
        let mut worst_efficiency: Option<u32> = None;
        let mut cargo_capacity: u64 = 0;
        let mut has_ramscoop = false;
        let mut has_starbase = false;

        for stack in fleet.ships.iter().filter(|s| s.count > 0) {
            let design = resolver.resolve_or_fallback(&stack.design);
            let count = u64::from(stack.count);

            max_warp = Some(max_warp.map_or(design.warp_speed, |w| w.min(design.warp_speed)));
            ideal_warp = Some(ideal_warp.map_or(design.ideal_warp, |w| w.min(design.ideal_warp)));
            worst_efficiency = Some(
                worst_efficiency.map_or(design.fuel_efficiency, |e| e.max(design.fuel_efficiency)),
            );
            hull_mass = hull_mass.saturating_add(design.mass.saturating_mul(count));
            fuel_capacity = fuel_capacity.saturating_add(design.fuel_capacity.saturating_mul(count));
            cargo_capacity =
                cargo_capacity.saturating_add(design.cargo_capacity.saturating_mul(count));
            has_ramscoop |= stack.damage == 0 && (design.is_ramscoop || design.fuel_efficiency == 0);
            has_starbase |= design.is_starbase;
        }

        Self {
            max_warp: max_warp.map_or(0, |w| w.max(1)),
            ideal_warp: ideal_warp.unwrap_or(1).max(1),
            total_mass: hull_mass.saturating_add(fleet.cargo.mass()).max(1),
            fuel_capacity,
            worst_efficiency: worst_efficiency.unwrap_or(0),
            cargo_capacity,
            has_ramscoop,
            has_starbase,
        }
    }

    /// Fuel burned per light-year at warp `warp`.
    ///
    /// `ceil(mass/100 * max(1, warp/ideal)^2.5 * efficiency/100)`, or 0 when
    /// efficiency is 0.
    pub fn fuel_per_ly(&self, warp: u32) -> f64 {
        if self.worst_efficiency == 0 {
            return 0.0;
        }
        let base = self.total_mass as f64 / 100.0;
        let ratio = (f64::from(warp) / f64::from(self.ideal_warp)).max(1.0);
        let speed = if ratio <= 1.0 { 1.0 } else { ratio.powf(2.5) };
        let efficiency = f64::from(self.worst_efficiency) / 100.0;
        (base * speed * efficiency).ceil()
    }
}

/// A warp chosen for this turn and what it costs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpPlan {
    pub warp: u32,
    pub fuel_per_ly: f64,
    /// Light-years flown this turn.
    pub distance: f64,
    pub fuel_used: f64,
}

/// Pick the fastest warp whose fuel cost for this turn's leg fits in `fuel`,
/// starting at `requested` (capped at the fleet's max) and stepping down.
/// Warp 1 is the floor and is used even when unaffordable, flying only as
/// far as the remaining fuel allows.
pub fn plan_warp(
    stats: &MovementStats,
    requested: Option<u32>,
    remaining: f64,
    fuel: f64,
    ly_per_warp: f64,
) -> WarpPlan {
    let max_warp = stats.max_warp.max(1);
    let start = requested.unwrap_or(max_warp).clamp(1, max_warp);
    let planned = |w: u32| (f64::from(w) * ly_per_warp).min(remaining);

    let warp = (1..=start)
        .rev()
        .find(|&w| stats.fuel_per_ly(w) * planned(w) <= fuel)
        .unwrap_or(1);

    let per_ly = stats.fuel_per_ly(warp);
    let mut distance = planned(warp);
    if per_ly > 0.0 {
        distance = distance.min(fuel.max(0.0) / per_ly);
    }
    let fuel_used = (per_ly * distance).min(fuel.max(0.0));

    WarpPlan {
        warp,
        fuel_per_ly: per_ly,
        distance,
        fuel_used,
    }
}
