//! Mineral amounts and build costs.
//!
//! The same [`Minerals`] triple is used for surface stockpiles (kT), cargo
//! holds, build costs, and mineral concentrations (percent, 0..=100).

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

// ---------------------------------------------------------------------------
// Mineral kinds
// ---------------------------------------------------------------------------

/// One of the three minerals mined from planets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mineral {
    Ironium,
    Boranium,
    Germanium,
}

impl Mineral {
    /// All minerals, in canonical order.
    pub const ALL: [Mineral; 3] = [Mineral::Ironium, Mineral::Boranium, Mineral::Germanium];
}

// ---------------------------------------------------------------------------
// Minerals
// ---------------------------------------------------------------------------

/// A per-mineral quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Minerals {
    pub ironium: u64,
    pub boranium: u64,
    pub germanium: u64,
}

impl Minerals {
    pub const ZERO: Minerals = Minerals {
        ironium: 0,
        boranium: 0,
        germanium: 0,
    };

    pub const fn new(ironium: u64, boranium: u64, germanium: u64) -> Self {
        Self {
            ironium,
            boranium,
            germanium,
        }
    }

    pub fn get(&self, mineral: Mineral) -> u64 {
        match mineral {
            Mineral::Ironium => self.ironium,
            Mineral::Boranium => self.boranium,
            Mineral::Germanium => self.germanium,
        }
    }

    pub fn get_mut(&mut self, mineral: Mineral) -> &mut u64 {
        match mineral {
            Mineral::Ironium => &mut self.ironium,
            Mineral::Boranium => &mut self.boranium,
            Mineral::Germanium => &mut self.germanium,
        }
    }

    /// Sum of all three minerals.
    pub fn total(&self) -> u64 {
        self.ironium
            .saturating_add(self.boranium)
            .saturating_add(self.germanium)
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }

    /// Per-mineral subtraction, clamped at zero.
    pub fn saturating_sub(self, other: Minerals) -> Minerals {
        Minerals {
            ironium: self.ironium.saturating_sub(other.ironium),
            boranium: self.boranium.saturating_sub(other.boranium),
            germanium: self.germanium.saturating_sub(other.germanium),
        }
    }

    /// Per-mineral minimum.
    pub fn min(self, other: Minerals) -> Minerals {
        Minerals {
            ironium: self.ironium.min(other.ironium),
            boranium: self.boranium.min(other.boranium),
            germanium: self.germanium.min(other.germanium),
        }
    }

    /// Multiply every mineral by `count`, saturating.
    pub fn times(self, count: u64) -> Minerals {
        Minerals {
            ironium: self.ironium.saturating_mul(count),
            boranium: self.boranium.saturating_mul(count),
            germanium: self.germanium.saturating_mul(count),
        }
    }
}

impl Add for Minerals {
    type Output = Minerals;

    fn add(self, rhs: Minerals) -> Minerals {
        Minerals {
            ironium: self.ironium.saturating_add(rhs.ironium),
            boranium: self.boranium.saturating_add(rhs.boranium),
            germanium: self.germanium.saturating_add(rhs.germanium),
        }
    }
}

impl AddAssign for Minerals {
    fn add_assign(&mut self, rhs: Minerals) {
        *self = *self + rhs;
    }
}

// ---------------------------------------------------------------------------
// Cost
// ---------------------------------------------------------------------------

/// Resources plus minerals. Used for build costs, payments, and design costs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cost {
    pub resources: u64,
    #[serde(default)]
    pub minerals: Minerals,
}

impl Cost {
    pub const ZERO: Cost = Cost {
        resources: 0,
        minerals: Minerals::ZERO,
    };

    pub const fn new(resources: u64, ironium: u64, boranium: u64, germanium: u64) -> Self {
        Self {
            resources,
            minerals: Minerals::new(ironium, boranium, germanium),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.resources == 0 && self.minerals.is_zero()
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Cost) -> Cost {
        Cost {
            resources: self.resources.saturating_add(rhs.resources),
            minerals: self.minerals + rhs.minerals,
        }
    }
}

impl AddAssign for Cost {
    fn add_assign(&mut self, rhs: Cost) {
        *self = *self + rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_get_mut_agree() {
        let mut m = Minerals::new(1, 2, 3);
        for mineral in Mineral::ALL {
            *m.get_mut(mineral) += 10;
        }
        assert_eq!(m.get(Mineral::Ironium), 11);
        assert_eq!(m.get(Mineral::Boranium), 12);
        assert_eq!(m.get(Mineral::Germanium), 13);
        assert_eq!(m.total(), 36);
    }

    #[test]
    fn saturating_sub_clamps_each_mineral() {
        let a = Minerals::new(5, 1, 10);
        let b = Minerals::new(3, 4, 10);
        assert_eq!(a.saturating_sub(b), Minerals::new(2, 0, 0));
    }

    #[test]
    fn cost_addition() {
        let mut c = Cost::new(10, 0, 0, 4);
        c += Cost::new(5, 1, 1, 1);
        assert_eq!(c, Cost::new(15, 1, 1, 5));
        assert!(!c.is_zero());
        assert!(Cost::ZERO.is_zero());
    }
}
