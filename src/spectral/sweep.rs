use super::EnergySpace;
use crate::error::RecursionError;
use crate::fermi::{chemical_potential_profile, fermi_dirac};
use crate::greens_functions::{recursive_greens_functions, ScatteringFunctions};
use crate::hamiltonian::BlockTridiagonal;
use crate::postprocessor::{PostProcess, SliceObservables};
use crate::utilities::matrices::ComplexMatrix;
use itertools::izip;
use ndarray::Array1;
use num_complex::Complex;
use rayon::prelude::*;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq)]
/// The reservoirs the device is connected to
pub struct OccupationParameters {
    /// Chemical potential of the left contact in eV
    pub left_chemical_potential: f64,
    /// Chemical potential of the right contact in eV
    pub right_chemical_potential: f64,
    /// Temperature of both contacts in Kelvin
    pub temperature: f64,
}

/// Builds the in- and out-scattering functions at `energy`
///
/// Each slice is filled from a reservoir at its own chemical potential, so with broadening `η` and
/// occupation `f_i` the blocks are `2η f_i I` and `2η (1 - f_i) I`.
pub fn scattering_functions(
    energy: f64,
    block_sizes: &[usize],
    chemical_potentials: &[f64],
    temperature: f64,
    broadening: f64,
) -> (Vec<ComplexMatrix>, Vec<ComplexMatrix>) {
    block_sizes
        .iter()
        .zip(chemical_potentials.iter())
        .map(|(&size, &chemical_potential)| {
            let occupation = fermi_dirac(energy, chemical_potential, temperature);
            let identity = ComplexMatrix::identity(size, size);
            (
                &identity * Complex::from(2_f64 * broadening * occupation),
                identity * Complex::from(2_f64 * broadening * (1_f64 - occupation)),
            )
        })
        .unzip()
}

#[derive(Clone, Debug, PartialEq)]
/// The observables at one energy of the sweep
pub struct SpectralPoint {
    /// Real energy in eV
    pub energy: f64,
    /// Per-slice observables
    pub observables: SliceObservables,
}

#[derive(Clone, Debug)]
/// The result of a sweep over the energy grid
pub struct SweepResult {
    /// One entry per grid energy, in grid order
    pub points: Vec<SpectralPoint>,
    /// Electron occupation per slice, integrated over energy
    pub electron_density: Array1<f64>,
    /// Hole occupation per slice, integrated over energy
    pub hole_density: Array1<f64>,
}

/// Evaluates the Green's functions of a single Hamiltonian at every point of an energy grid
pub struct EnergySweep<'a> {
    hamiltonian: &'a BlockTridiagonal,
    energy_space: &'a EnergySpace,
    occupation: &'a OccupationParameters,
    broadening: f64,
}

impl<'a> EnergySweep<'a> {
    /// A sweep of `hamiltonian` over `energy_space`, with every energy lifted by `broadening` into
    /// the upper half plane
    pub fn new(
        hamiltonian: &'a BlockTridiagonal,
        energy_space: &'a EnergySpace,
        occupation: &'a OccupationParameters,
        broadening: f64,
    ) -> Self {
        Self {
            hamiltonian,
            energy_space,
            occupation,
            broadening,
        }
    }

    /// Runs the sweep
    ///
    /// The points are solved concurrently and returned in grid order. A point with unphysical
    /// observables is kept and reported with a warning.
    #[tracing::instrument(name = "Energy sweep", skip_all)]
    pub fn run(&self) -> Result<SweepResult, RecursionError> {
        let number_of_slices = self.hamiltonian.number_of_slices();
        tracing::info!(
            "Sweeping {} energies over a chain of {} slices",
            self.energy_space.number_of_points(),
            number_of_slices
        );
        let chemical_potentials = chemical_potential_profile(
            self.occupation.left_chemical_potential,
            self.occupation.right_chemical_potential,
            number_of_slices,
        );
        let block_sizes = self.hamiltonian.block_sizes();

        let points = self
            .energy_space
            .points()
            .par_iter()
            .map(|&energy| self.solve_at(energy, &block_sizes, &chemical_potentials))
            .collect::<Result<Vec<_>, _>>()?;

        let mut electron_density = Array1::<f64>::zeros(number_of_slices);
        let mut hole_density = Array1::<f64>::zeros(number_of_slices);
        for (point, &weight) in izip!(points.iter(), self.energy_space.weights()) {
            if let Some(electron) = point.observables.electron_occupation.as_ref() {
                electron_density.scaled_add(weight, electron);
            }
            if let Some(hole) = point.observables.hole_occupation.as_ref() {
                hole_density.scaled_add(weight, hole);
            }
        }

        tracing::info!("Energy sweep complete");
        Ok(SweepResult {
            points,
            electron_density,
            hole_density,
        })
    }

    fn solve_at(
        &self,
        energy: f64,
        block_sizes: &[usize],
        chemical_potentials: &[f64],
    ) -> Result<SpectralPoint, RecursionError> {
        tracing::debug!("Solving at energy {}", energy);
        let (in_scattering, out_scattering) = scattering_functions(
            energy,
            block_sizes,
            chemical_potentials,
            self.occupation.temperature,
            self.broadening,
        );
        let greens_functions = recursive_greens_functions(
            Complex::new(energy, self.broadening),
            self.hamiltonian,
            ScatteringFunctions::none()
                .with_in_scattering(&in_scattering)
                .with_out_scattering(&out_scattering),
        )?;
        let observables = greens_functions.observables();
        if let Err(e) = observables.check_physicality(energy, 1e-10) {
            tracing::warn!("{}", e);
        }
        Ok(SpectralPoint {
            energy,
            observables,
        })
    }
}
