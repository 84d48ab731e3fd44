//! Tech fields, per-field levels, and component tech requirements.
//!
//! Requirements are checked field by field: a player meets a requirement when
//! every one of the four tracks is at or above the required level. There is
//! no cross-field substitution.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// One of the four independent research tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TechField {
    #[default]
    Energy,
    Kinetics,
    Propulsion,
    Construction,
}

impl TechField {
    /// All fields, in canonical order.
    pub const ALL: [TechField; 4] = [
        TechField::Energy,
        TechField::Kinetics,
        TechField::Propulsion,
        TechField::Construction,
    ];
}

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

/// A level per tech field. Doubles as a requirement record for components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TechLevels {
    pub energy: u32,
    pub kinetics: u32,
    pub propulsion: u32,
    pub construction: u32,
}

impl TechLevels {
    pub const NONE: TechLevels = TechLevels::new(0, 0, 0, 0);

    pub const fn new(energy: u32, kinetics: u32, propulsion: u32, construction: u32) -> Self {
        Self {
            energy,
            kinetics,
            propulsion,
            construction,
        }
    }

    pub fn get(&self, field: TechField) -> u32 {
        match field {
            TechField::Energy => self.energy,
            TechField::Kinetics => self.kinetics,
            TechField::Propulsion => self.propulsion,
            TechField::Construction => self.construction,
        }
    }

    pub fn get_mut(&mut self, field: TechField) -> &mut u32 {
        match field {
            TechField::Energy => &mut self.energy,
            TechField::Kinetics => &mut self.kinetics,
            TechField::Propulsion => &mut self.propulsion,
            TechField::Construction => &mut self.construction,
        }
    }

    /// Whether these levels meet `required` in every field.
    pub fn satisfies(&self, required: &TechLevels) -> bool {
        TechField::ALL
            .iter()
            .all(|&field| self.get(field) >= required.get(field))
    }
}

// ---------------------------------------------------------------------------
// Planetary scanners
// ---------------------------------------------------------------------------

/// A planetary scanner component a colony can install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanetaryScanner {
    pub name: &'static str,
    pub range: u32,
    pub requires: TechLevels,
}

/// Range of the scanner every colony can build with no research.
pub const BASE_SCANNER_RANGE: u32 = 50;

/// Planetary scanners ordered by range.
pub const PLANETARY_SCANNERS: [PlanetaryScanner; 9] = [
    PlanetaryScanner { name: "Viewer 50", range: 50, requires: TechLevels::NONE },
    PlanetaryScanner { name: "Viewer 90", range: 90, requires: TechLevels::new(1, 0, 0, 0) },
    PlanetaryScanner { name: "Scoper 150", range: 150, requires: TechLevels::new(3, 0, 0, 0) },
    PlanetaryScanner { name: "Scoper 220", range: 220, requires: TechLevels::new(6, 0, 0, 0) },
    PlanetaryScanner { name: "Scoper 280", range: 280, requires: TechLevels::new(8, 0, 0, 0) },
    PlanetaryScanner { name: "Snooper 320X", range: 320, requires: TechLevels::new(10, 0, 0, 3) },
    PlanetaryScanner { name: "Snooper 400X", range: 400, requires: TechLevels::new(13, 0, 0, 6) },
    PlanetaryScanner { name: "Snooper 500X", range: 500, requires: TechLevels::new(16, 0, 0, 7) },
    PlanetaryScanner { name: "Snooper 620X", range: 620, requires: TechLevels::new(23, 0, 0, 9) },
];

/// The best planetary scanner available at the given tech levels.
pub fn best_planetary_scanner(levels: &TechLevels) -> Option<&'static PlanetaryScanner> {
    PLANETARY_SCANNERS
        .iter()
        .filter(|scanner| levels.satisfies(&scanner.requires))
        .max_by_key(|scanner| scanner.range)
}

/// Range of the best planetary scanner, or [`BASE_SCANNER_RANGE`] if none qualifies.
pub fn best_scanner_range(levels: &TechLevels) -> u32 {
    best_planetary_scanner(levels)
        .map(|scanner| scanner.range)
        .unwrap_or(BASE_SCANNER_RANGE)
}
