//! # Spectral
//!
//! The discrete energy space on which the Green's functions are sampled, and the sweep which
//! evaluates them over it. Every energy point is an independent solve against the same immutable
//! Hamiltonian, so the sweep fans the points out over the `rayon` thread pool.

mod energy;
mod sweep;

pub use energy::{EnergySpace, EnergySpaceBuilder};
pub use sweep::{scattering_functions, EnergySweep, OccupationParameters, SpectralPoint, SweepResult};

use nalgebra::DVector;

/// Enum for discrete integration methods
#[derive(Clone, Copy, Debug, serde::Deserialize, PartialEq, Eq)]
pub enum IntegrationRule {
    /// Trapezium rule
    Trapezium,
    /// Romberg integration, which on a single refinement level is Simpson's rule
    Romberg,
    /// Three point integration
    ThreePoint,
}

impl IntegrationRule {
    /// The smallest grid the rule can be applied to
    pub(crate) fn minimum_number_of_points(&self) -> usize {
        match self {
            IntegrationRule::Trapezium => 2,
            IntegrationRule::Romberg => 3,
            IntegrationRule::ThreePoint => 8,
        }
    }

    /// Weights for `number_of_points` evenly spaced nodes with unit spacing
    pub(crate) fn unit_weights(&self, number_of_points: usize) -> DVector<f64> {
        let last = number_of_points.saturating_sub(1);
        // A closure generating the weight for a given point index
        let weight = |idx: usize| -> f64 {
            match self {
                IntegrationRule::Trapezium => {
                    if (idx == 0) | (idx == last) {
                        0.5
                    } else {
                        1.
                    }
                }
                IntegrationRule::Romberg => {
                    if (idx == 0) | (idx == last) {
                        1. / 3.
                    } else if idx % 2 == 0 {
                        2. / 3.
                    } else {
                        4. / 3.
                    }
                }
                IntegrationRule::ThreePoint => {
                    if (idx == 0) | (idx == last) {
                        17. / 48.
                    } else if (idx == 1) | (idx + 1 == last) {
                        59. / 48.
                    } else if (idx == 2) | (idx + 2 == last) {
                        43. / 48.
                    } else if (idx == 3) | (idx + 3 == last) {
                        49. / 48.
                    } else {
                        1.
                    }
                }
            }
        };
        DVector::from_iterator(number_of_points, (0..number_of_points).map(weight))
    }
}
