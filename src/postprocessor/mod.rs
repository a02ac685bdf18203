//! # Postprocessor
//!
//! Reduces the banded Green's functions at one energy to per-slice observables. Only the diagonal
//! blocks are needed: the local density of states follows from the retarded function as
//! `-Im tr G_ii / π`, and the electron (hole) occupation from the correlation function as
//! `tr G^n_ii / 2π` (`tr G^p_ii / 2π`).

use crate::greens_functions::{CorrelationFunction, GreensFunctions, RetardedGreensFunction};
use miette::Diagnostic;
use ndarray::Array1;

#[derive(thiserror::Error, Debug, Diagnostic, PartialEq)]
/// Raised when the observables computed at an energy are unphysical
pub enum PostProcessorError {
    /// The spectral density must be non-negative for a retarded Green's function
    #[error("negative density of states {value} in slice {slice} at energy {energy}")]
    NegativeDensityOfStates {
        /// Slice index
        slice: usize,
        /// Energy in eV
        energy: f64,
        /// The offending value
        value: f64,
    },
}

#[derive(Clone, Debug, PartialEq)]
/// Per-slice observables at a single energy
pub struct SliceObservables {
    /// `-Im tr G_ii / π`
    pub local_density_of_states: Array1<f64>,
    /// `tr G^n_ii / 2π`, present if the electron correlation function was computed
    pub electron_occupation: Option<Array1<f64>>,
    /// `tr G^p_ii / 2π`, present if the hole correlation function was computed
    pub hole_occupation: Option<Array1<f64>>,
}

/// Reduction of solver output to observables
pub trait PostProcess {
    /// Computes every observable available from `self`
    fn observables(&self) -> SliceObservables;
}

impl PostProcess for GreensFunctions {
    fn observables(&self) -> SliceObservables {
        SliceObservables {
            local_density_of_states: local_density_of_states(self.retarded()),
            electron_occupation: self.electron().map(occupation),
            hole_occupation: self.hole().map(occupation),
        }
    }
}

/// The local density of states in each slice
pub fn local_density_of_states(retarded: &RetardedGreensFunction) -> Array1<f64> {
    retarded
        .diagonal()
        .iter()
        .map(|block| -block.trace().im / std::f64::consts::PI)
        .collect()
}

/// The occupation in each slice carried by a correlation function
pub fn occupation(correlation: &CorrelationFunction) -> Array1<f64> {
    correlation
        .diagonal()
        .iter()
        .map(|block| block.trace().re / (2_f64 * std::f64::consts::PI))
        .collect()
}

impl SliceObservables {
    /// Fails if the density of states dips below `-tolerance` in any slice
    pub fn check_physicality(&self, energy: f64, tolerance: f64) -> Result<(), PostProcessorError> {
        match self
            .local_density_of_states
            .iter()
            .enumerate()
            .find(|&(_, &value)| value < -tolerance)
        {
            Some((slice, &value)) => Err(PostProcessorError::NegativeDensityOfStates {
                slice,
                energy,
                value,
            }),
            None => Ok(()),
        }
    }
}
