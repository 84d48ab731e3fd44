//! Habitability: how well a species can live on a star's planet.
//!
//! Expressed as a signed percentage. Positive values allow growth up to a
//! population cap; zero or negative values kill colonists off every turn.

use crate::state::{Species, Star};

/// Computes a signed habitability percentage for a species on a star.
pub trait Habitability {
    fn habitability(&self, star: &Star, species: &Species) -> i32;
}

/// Distance of the planet's current temperature/atmosphere from the species'
/// ideal point, scaled by its tolerance radius.
///
/// Inside the radius the value falls linearly from 100 at the ideal point to 0
/// at the edge; outside it keeps falling below zero at the same rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentHabitability;

impl Habitability for EnvironmentHabitability {
    fn habitability(&self, star: &Star, species: &Species) -> i32 {
        let habitat = &species.habitat;
        let dt = f64::from(star.temperature - habitat.ideal_temperature);
        let da = f64::from(star.atmosphere - habitat.ideal_atmosphere);
        let distance = (dt * dt + da * da).sqrt();
        let tolerance = f64::from(habitat.tolerance_radius.max(1));

        let percent = if distance >= tolerance {
            -((distance - tolerance) / tolerance) * 100.0
        } else {
            (1.0 - distance / tolerance) * 100.0
        };
        percent.round() as i32
    }
}

impl<F> Habitability for F
where
    F: Fn(&Star, &Species) -> i32,
{
    fn habitability(&self, star: &Star, species: &Species) -> i32 {
        self(star, species)
    }
}
