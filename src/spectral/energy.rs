use super::IntegrationRule;
use crate::error::BuildError;
use nalgebra::DVector;
use std::ops::RangeInclusive;

/// Builder for an evenly spaced energy grid
pub struct EnergySpaceBuilder<EnergyRange, Rule> {
    number_of_points: usize,
    energy_range: EnergyRange,
    integration_rule: Rule,
}

impl EnergySpaceBuilder<(), ()> {
    /// Initialise an empty builder
    pub fn new() -> Self {
        Self {
            number_of_points: 0,
            energy_range: (),
            integration_rule: (),
        }
    }
}

impl Default for EnergySpaceBuilder<(), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<EnergyRange, Rule> EnergySpaceBuilder<EnergyRange, Rule> {
    /// Attach the rule used to integrate over the grid
    pub fn with_integration_rule(
        self,
        integration_rule: IntegrationRule,
    ) -> EnergySpaceBuilder<EnergyRange, IntegrationRule> {
        EnergySpaceBuilder {
            number_of_points: self.number_of_points,
            energy_range: self.energy_range,
            integration_rule,
        }
    }

    /// Set the number of grid points, end points included
    pub fn with_number_of_points(self, number_of_points: usize) -> Self {
        EnergySpaceBuilder {
            number_of_points,
            energy_range: self.energy_range,
            integration_rule: self.integration_rule,
        }
    }

    /// Set the first and last energy in eV, both of which lie on the grid
    pub fn with_energy_range(
        self,
        energy_range: RangeInclusive<f64>,
    ) -> EnergySpaceBuilder<RangeInclusive<f64>, Rule> {
        EnergySpaceBuilder {
            number_of_points: self.number_of_points,
            energy_range,
            integration_rule: self.integration_rule,
        }
    }
}

impl EnergySpaceBuilder<RangeInclusive<f64>, IntegrationRule> {
    /// Build the grid and its integration weights
    pub fn build(self) -> Result<EnergySpace, BuildError> {
        let (start, end) = (*self.energy_range.start(), *self.energy_range.end());
        if !(start.is_finite() && end.is_finite() && end > start) {
            return Err(BuildError::Grid(format!(
                "the energy range must be finite and increasing, found {} to {}",
                start, end
            )));
        }
        let minimum = self.integration_rule.minimum_number_of_points();
        if self.number_of_points < minimum {
            return Err(BuildError::Grid(format!(
                "{:?} integration needs at least {} points, found {}",
                self.integration_rule, minimum, self.number_of_points
            )));
        }
        if self.integration_rule == IntegrationRule::Romberg && self.number_of_points % 2 == 0 {
            return Err(BuildError::Grid(format!(
                "Romberg integration needs an odd number of points, found {}",
                self.number_of_points
            )));
        }

        let spacing = (end - start) / (self.number_of_points - 1) as f64;
        let points = DVector::from_iterator(
            self.number_of_points,
            (0..self.number_of_points).map(|idx| start + spacing * idx as f64),
        );
        let weights = self.integration_rule.unit_weights(self.number_of_points) * spacing;
        tracing::debug!(
            "Built an energy grid of {} points from {} to {} eV",
            self.number_of_points,
            start,
            end
        );
        Ok(EnergySpace {
            points,
            weights,
            integration_rule: self.integration_rule,
        })
    }
}

#[derive(Clone, Debug)]
/// An evenly spaced energy grid with quadrature weights
pub struct EnergySpace {
    points: DVector<f64>,
    weights: DVector<f64>,
    integration_rule: IntegrationRule,
}

impl EnergySpace {
    /// The number of grid points
    pub fn number_of_points(&self) -> usize {
        self.points.len()
    }

    /// The grid energies in eV
    pub fn points(&self) -> &[f64] {
        self.points.as_slice()
    }

    /// The quadrature weight of each point, including the grid spacing
    pub fn weights(&self) -> &[f64] {
        self.weights.as_slice()
    }

    /// The energy of point `index`
    pub fn energy_at(&self, index: usize) -> f64 {
        self.points[index]
    }

    /// The rule the weights were generated from
    pub fn integration_rule(&self) -> IntegrationRule {
        self.integration_rule
    }

    /// Integrates values sampled at the grid points
    ///
    /// # Panics
    /// In debug builds, if `integrand` does not hold one value per grid point
    pub fn integrate(&self, integrand: &[f64]) -> f64 {
        debug_assert_eq!(
            integrand.len(),
            self.number_of_points(),
            "the integrand must be sampled at every grid point"
        );
        self.weights
            .iter()
            .zip(integrand.iter())
            .map(|(weight, value)| weight * value)
            .sum()
    }
}

#[cfg(test)]
mod test {
    use super::EnergySpaceBuilder;
    use crate::spectral::IntegrationRule;

    #[test]
    fn end_points_are_included() {
        let space = EnergySpaceBuilder::new()
            .with_energy_range(-1.0..=1.0)
            .with_number_of_points(5)
            .with_integration_rule(IntegrationRule::Trapezium)
            .build()
            .unwrap();
        assert_eq!(space.number_of_points(), 5);
        approx::assert_relative_eq!(space.energy_at(0), -1.0);
        approx::assert_relative_eq!(space.energy_at(4), 1.0);
        approx::assert_relative_eq!(space.energy_at(1), -0.5);
    }

    #[test]
    fn trapezium_integrates_a_linear_function_exactly() {
        let space = EnergySpaceBuilder::new()
            .with_energy_range(0.0..=2.0)
            .with_number_of_points(9)
            .with_integration_rule(IntegrationRule::Trapezium)
            .build()
            .unwrap();
        let integrand = space.points().iter().map(|e| 3. * e + 1.).collect::<Vec<_>>();
        approx::assert_relative_eq!(space.integrate(&integrand), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn romberg_integrates_a_cubic_exactly() {
        let space = EnergySpaceBuilder::new()
            .with_energy_range(0.0..=1.0)
            .with_number_of_points(11)
            .with_integration_rule(IntegrationRule::Romberg)
            .build()
            .unwrap();
        let integrand = space.points().iter().map(|e| e.powi(3)).collect::<Vec<_>>();
        approx::assert_relative_eq!(space.integrate(&integrand), 0.25, epsilon = 1e-12);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "sampled at every grid point")]
    fn integrands_of_the_wrong_length_are_rejected() {
        let space = EnergySpaceBuilder::new()
            .with_energy_range(0.0..=1.0)
            .with_number_of_points(5)
            .with_integration_rule(IntegrationRule::Trapezium)
            .build()
            .unwrap();
        space.integrate(&[1.0; 4]);
    }

    #[test]
    fn invalid_grids_are_rejected() {
        assert!(EnergySpaceBuilder::new()
            .with_energy_range(1.0..=0.0)
            .with_number_of_points(5)
            .with_integration_rule(IntegrationRule::Trapezium)
            .build()
            .is_err());
        assert!(EnergySpaceBuilder::new()
            .with_energy_range(0.0..=1.0)
            .with_number_of_points(10)
            .with_integration_rule(IntegrationRule::Romberg)
            .build()
            .is_err());
        assert!(EnergySpaceBuilder::new()
            .with_energy_range(0.0..=1.0)
            .with_number_of_points(1)
            .with_integration_rule(IntegrationRule::Trapezium)
            .build()
            .is_err());
    }
}
