//! # Hamiltonian
//!
//! The system Hamiltonian of a quasi one-dimensional device, stored as a chain of slices.
//!
//! Each slice `i` owns a square diagonal block `D_i` of size `b_i x b_i`. Neighbouring slices are
//! coupled through a lower block `L_i` (`b_{i+1} x b_i`) and an upper block `U_i` (`b_i x b_{i+1}`).
//! Block sizes can differ from slice to slice, so the blocks are held as independently owned
//! matrices indexed by slice rather than as one contiguous tensor.
//!
//! The shape invariants are checked once, when the Hamiltonian is constructed. Everything downstream
//! (the recursive Green's function solver in particular) relies on them.

mod builder;

pub use builder::{ChainParameters, HamiltonianBuilder, Potential};

use crate::error::RecursionError;
use crate::utilities::matrices::ComplexMatrix;
use num_complex::Complex;

#[derive(Clone, Debug, PartialEq)]
/// A validated block-tridiagonal Hamiltonian
pub struct BlockTridiagonal {
    diagonal: Vec<ComplexMatrix>,
    lower: Vec<ComplexMatrix>,
    upper: Vec<ComplexMatrix>,
}

impl BlockTridiagonal {
    /// Validates and wraps the three block sequences
    ///
    /// Fails if there are no diagonal blocks, if a diagonal block is not square, if the coupling
    /// sequences do not have exactly one entry fewer than the diagonal, or if any coupling block is
    /// not shaped to connect its two neighbouring slices.
    pub fn new(
        diagonal: Vec<ComplexMatrix>,
        lower: Vec<ComplexMatrix>,
        upper: Vec<ComplexMatrix>,
    ) -> Result<Self, RecursionError> {
        if diagonal.is_empty() {
            return Err(RecursionError::EmptyChain);
        }
        for (idx, block) in diagonal.iter().enumerate() {
            if !block.is_square() {
                return Err(RecursionError::DimensionMismatch {
                    context: format!("diagonal block {}", idx),
                    expected: (block.nrows(), block.nrows()),
                    found: block.shape(),
                });
            }
        }
        let number_of_couplings = diagonal.len() - 1;
        for (context, sequence) in [("lower", &lower), ("upper", &upper)] {
            if sequence.len() != number_of_couplings {
                return Err(RecursionError::BlockCount {
                    context: context.into(),
                    expected: number_of_couplings,
                    found: sequence.len(),
                });
            }
        }
        for (idx, (l, u)) in lower.iter().zip(upper.iter()).enumerate() {
            let (this, next) = (diagonal[idx].nrows(), diagonal[idx + 1].nrows());
            if l.shape() != (next, this) {
                return Err(RecursionError::DimensionMismatch {
                    context: format!("lower block {}", idx),
                    expected: (next, this),
                    found: l.shape(),
                });
            }
            if u.shape() != (this, next) {
                return Err(RecursionError::DimensionMismatch {
                    context: format!("upper block {}", idx),
                    expected: (this, next),
                    found: u.shape(),
                });
            }
        }
        Ok(Self {
            diagonal,
            lower,
            upper,
        })
    }

    /// The diagonal blocks `D_i`
    pub fn diagonal(&self) -> &[ComplexMatrix] {
        &self.diagonal
    }

    /// The lower coupling blocks `L_i`, coupling slice `i` into slice `i + 1`
    pub fn lower(&self) -> &[ComplexMatrix] {
        &self.lower
    }

    /// The upper coupling blocks `U_i`, coupling slice `i + 1` into slice `i`
    pub fn upper(&self) -> &[ComplexMatrix] {
        &self.upper
    }

    /// The number of slices in the chain
    pub fn number_of_slices(&self) -> usize {
        self.diagonal.len()
    }

    /// The size `b_i` of each diagonal block
    pub fn block_sizes(&self) -> Vec<usize> {
        self.diagonal.iter().map(|block| block.nrows()).collect()
    }

    /// The total number of degrees of freedom
    pub fn dimension(&self) -> usize {
        self.diagonal.iter().map(|block| block.nrows()).sum()
    }

    /// Returns the diagonal blocks shifted by the energy, `D_i - E I`
    ///
    /// The shift is taken on a copy, `self` is never modified.
    pub fn shifted_diagonal(&self, energy: Complex<f64>) -> Vec<ComplexMatrix> {
        self.diagonal
            .iter()
            .map(|block| {
                let mut shifted = block.clone();
                for idx in 0..shifted.nrows() {
                    shifted[(idx, idx)] -= energy;
                }
                shifted
            })
            .collect()
    }

    /// Checks a block-diagonal sequence, such as a scattering function, matches the chain
    pub fn validate_block_diagonal(
        &self,
        blocks: &[ComplexMatrix],
        context: &str,
    ) -> Result<(), RecursionError> {
        if blocks.len() != self.number_of_slices() {
            return Err(RecursionError::BlockCount {
                context: context.into(),
                expected: self.number_of_slices(),
                found: blocks.len(),
            });
        }
        for (idx, (block, diagonal)) in blocks.iter().zip(self.diagonal.iter()).enumerate() {
            if block.shape() != diagonal.shape() {
                return Err(RecursionError::DimensionMismatch {
                    context: format!("{} block {}", context, idx),
                    expected: diagonal.shape(),
                    found: block.shape(),
                });
            }
        }
        Ok(())
    }

    /// Assembles the full dense matrix
    ///
    /// This scales as the square of the total dimension and is intended for validating the
    /// recursive solver on small systems.
    pub fn to_dense(&self) -> ComplexMatrix {
        let offsets = self.offsets();
        let dimension = self.dimension();
        let mut dense = ComplexMatrix::zeros(dimension, dimension);
        for (block, &offset) in self.diagonal.iter().zip(offsets.iter()) {
            dense
                .slice_mut((offset, offset), block.shape())
                .copy_from(block);
        }
        for (idx, (l, u)) in self.lower.iter().zip(self.upper.iter()).enumerate() {
            dense
                .slice_mut((offsets[idx + 1], offsets[idx]), l.shape())
                .copy_from(l);
            dense
                .slice_mut((offsets[idx], offsets[idx + 1]), u.shape())
                .copy_from(u);
        }
        dense
    }

    /// The row (and column) index at which each slice starts in the dense matrix
    pub fn offsets(&self) -> Vec<usize> {
        self.diagonal
            .iter()
            .scan(0, |offset, block| {
                let start = *offset;
                *offset += block.nrows();
                Some(start)
            })
            .collect()
    }
}
