// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Error
//!
//! Error types for the recursive solver and its collaborators

use miette::Diagnostic;

#[derive(thiserror::Error, Debug, Diagnostic, PartialEq, Eq)]
/// Errors raised while validating or recursing through a block-tridiagonal system
pub enum RecursionError {
    /// A block has a shape incompatible with its neighbours
    #[error("dimension mismatch in {context}: expected {expected:?}, found {found:?}")]
    #[diagnostic(code(transporter_rgf::dimension_mismatch))]
    DimensionMismatch {
        /// Which block was malformed
        context: String,
        /// The (rows, columns) required by the neighbouring blocks
        expected: (usize, usize),
        /// The (rows, columns) supplied
        found: (usize, usize),
    },
    /// A block sequence has the wrong number of entries for the chain
    #[error("expected {expected} {context} blocks, found {found}")]
    #[diagnostic(code(transporter_rgf::block_count))]
    BlockCount {
        /// Which sequence was malformed
        context: String,
        /// The number of blocks the chain requires
        expected: usize,
        /// The number of blocks supplied
        found: usize,
    },
    /// The chain has no slices
    #[error("a block-tridiagonal chain needs at least one slice")]
    EmptyChain,
    /// The ordered product was called on an empty list
    #[error("cannot form the ordered product of an empty list of matrices")]
    EmptyProduct,
    /// The decomposition backing a least-squares solve could not be set up
    #[error("least-squares solve failed: {0}")]
    Decomposition(String),
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Errors raised while reading or constructing a potential field
pub enum FieldError {
    #[error("IO Failure: {0}")]
    /// The cube file could not be read
    Io(#[from] std::io::Error),
    #[error("malformed cube data on line {line}: {message}")]
    /// The cube file could not be parsed
    Parse {
        /// One-based line number in the source
        line: usize,
        /// What was wrong with it
        message: String,
    },
    #[error("expected {expected} grid values, found {found}")]
    /// The number of data values does not match the grid header
    Shape {
        /// Values implied by the header
        expected: usize,
        /// Values present in the file
        found: usize,
    },
    #[error("grid spacing along axis {axis} must be positive, found {spacing}")]
    /// A grid axis is degenerate
    Spacing {
        /// The offending axis
        axis: usize,
        /// The spacing found
        spacing: f64,
    },
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Errors raised while assembling a Hamiltonian or an energy grid from user parameters
pub enum BuildError {
    #[error(transparent)]
    /// The assembled blocks were inconsistent
    Recursion(#[from] RecursionError),
    #[error("{0}")]
    /// The chain parameters were invalid
    Chain(String),
    #[error("invalid energy grid: {0}")]
    /// The energy grid parameters were invalid
    Grid(String),
}
