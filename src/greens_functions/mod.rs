//! # Green's Functions
//!
//! Containers for the banded Green's functions produced by the recursive solver.
//!
//! For a chain of `n` slices every Green's function is returned as four block sequences:
//! the diagonal (`n` blocks), the lower and upper off-diagonal bands (`n - 1` blocks each) and the
//! left-connected function (`n` blocks) which the recursion builds on its forward pass. The
//! correlation functions are only computed when the matching scattering input is supplied, and the
//! [`GreensFunctions`] variant returned by the solver records which of them are present.

/// The recursive Green's function algorithm
pub mod recursive;

pub use recursive::recursive_greens_functions;

use crate::utilities::matrices::ComplexMatrix;

#[derive(Clone, Debug, PartialEq)]
/// The retarded Green's function on the three central block bands, plus its left-connected form
pub struct RetardedGreensFunction {
    pub(crate) diagonal: Vec<ComplexMatrix>,
    pub(crate) lower: Vec<ComplexMatrix>,
    pub(crate) upper: Vec<ComplexMatrix>,
    pub(crate) left_connected: Vec<ComplexMatrix>,
}

impl RetardedGreensFunction {
    /// Diagonal blocks `G_{i, i}`
    pub fn diagonal(&self) -> &[ComplexMatrix] {
        &self.diagonal
    }

    /// Lower band `G_{i + 1, i}`
    pub fn lower(&self) -> &[ComplexMatrix] {
        &self.lower
    }

    /// Upper band `G_{i, i + 1}`
    pub fn upper(&self) -> &[ComplexMatrix] {
        &self.upper
    }

    /// The left-connected Green's function `g_i`, of the sub-chain `0..=i` in isolation
    pub fn left_connected(&self) -> &[ComplexMatrix] {
        &self.left_connected
    }
}

#[derive(Clone, Debug, PartialEq)]
/// An electron or hole correlation function on the central block bands
///
/// The upper band is stored as optional blocks. For the electron correlation function every entry
/// is populated, as the adjoint of the matching lower block. The hole recursion only ever assigns
/// the first upper block and leaves the others unset, so callers needing the whole hole upper band
/// should form it from [`CorrelationFunction::lower`].
pub struct CorrelationFunction {
    pub(crate) diagonal: Vec<ComplexMatrix>,
    pub(crate) lower: Vec<ComplexMatrix>,
    pub(crate) upper: Vec<Option<ComplexMatrix>>,
    pub(crate) left_connected: Vec<ComplexMatrix>,
}

impl CorrelationFunction {
    /// Diagonal blocks, real valued
    pub fn diagonal(&self) -> &[ComplexMatrix] {
        &self.diagonal
    }

    /// Lower band
    pub fn lower(&self) -> &[ComplexMatrix] {
        &self.lower
    }

    /// Upper band, `None` where the recursion leaves a block unset
    pub fn upper(&self) -> &[Option<ComplexMatrix>] {
        &self.upper
    }

    /// Left-connected correlation function, real valued
    pub fn left_connected(&self) -> &[ComplexMatrix] {
        &self.left_connected
    }
}

#[derive(Clone, Copy, Debug, Default)]
/// Optional scattering inputs for the solver
///
/// Supplying the in-scattering function requests the electron correlation function, supplying the
/// out-scattering function requests the hole correlation function. Each, when present, must hold
/// one block per slice shaped like the matching diagonal block.
pub struct ScatteringFunctions<'a> {
    pub(crate) in_scattering: Option<&'a [ComplexMatrix]>,
    pub(crate) out_scattering: Option<&'a [ComplexMatrix]>,
}

impl<'a> ScatteringFunctions<'a> {
    /// No scattering inputs, only the retarded Green's function is computed
    pub fn none() -> Self {
        Self::default()
    }

    /// Attach the in-scattering function
    pub fn with_in_scattering(self, in_scattering: &'a [ComplexMatrix]) -> Self {
        Self {
            in_scattering: Some(in_scattering),
            out_scattering: self.out_scattering,
        }
    }

    /// Attach the out-scattering function
    pub fn with_out_scattering(self, out_scattering: &'a [ComplexMatrix]) -> Self {
        Self {
            in_scattering: self.in_scattering,
            out_scattering: Some(out_scattering),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// The output of one solver call, keyed on which scattering inputs were supplied
pub enum GreensFunctions {
    /// No scattering inputs
    Retarded {
        /// The retarded Green's function
        retarded: RetardedGreensFunction,
    },
    /// In-scattering only
    RetardedAndElectron {
        /// The retarded Green's function
        retarded: RetardedGreensFunction,
        /// The electron correlation function
        electron: CorrelationFunction,
    },
    /// Out-scattering only
    RetardedAndHole {
        /// The retarded Green's function
        retarded: RetardedGreensFunction,
        /// The hole correlation function
        hole: CorrelationFunction,
    },
    /// Both scattering inputs
    RetardedElectronAndHole {
        /// The retarded Green's function
        retarded: RetardedGreensFunction,
        /// The electron correlation function
        electron: CorrelationFunction,
        /// The hole correlation function
        hole: CorrelationFunction,
    },
}

impl GreensFunctions {
    /// The retarded Green's function, which is always present
    pub fn retarded(&self) -> &RetardedGreensFunction {
        match self {
            GreensFunctions::Retarded { retarded }
            | GreensFunctions::RetardedAndElectron { retarded, .. }
            | GreensFunctions::RetardedAndHole { retarded, .. }
            | GreensFunctions::RetardedElectronAndHole { retarded, .. } => retarded,
        }
    }

    /// The electron correlation function, if in-scattering was supplied
    pub fn electron(&self) -> Option<&CorrelationFunction> {
        match self {
            GreensFunctions::RetardedAndElectron { electron, .. }
            | GreensFunctions::RetardedElectronAndHole { electron, .. } => Some(electron),
            _ => None,
        }
    }

    /// The hole correlation function, if out-scattering was supplied
    pub fn hole(&self) -> Option<&CorrelationFunction> {
        match self {
            GreensFunctions::RetardedAndHole { hole, .. }
            | GreensFunctions::RetardedElectronAndHole { hole, .. } => Some(hole),
            _ => None,
        }
    }

    /// The number of banded sequences held: four per Green's function present
    pub fn number_of_sequences(&self) -> usize {
        4 * (1 + self.electron().is_some() as usize + self.hole().is_some() as usize)
    }
}
