// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Transporter-RGF computes the Green's functions of quasi one-dimensional devices with the recursive
//! Green's function algorithm
//!
//! # Overview
//! A device is divided along its transport axis into slices. Each slice only couples to its neighbours,
//! so the Hamiltonian is block-tridiagonal and the diagonal and first off-diagonal blocks of the
//! retarded Green's function `G = (E - H)^{-1}` can be calculated without inverting the full matrix
//! ([Anantram, Lundstrom and Nikonov 2008](https://doi.org/10.1109/JPROC.2008.927355)). When in- and
//! out-scattering functions are supplied the electron and hole correlation functions, `G^n` and `G^p`,
//! follow from two further sweeps along the chain.
//!
//! The solver works on slices of arbitrary, and differing, size. It never mutates the Hamiltonian, so
//! calls at different energies can run concurrently against one shared instance, which is how the
//! energy sweep in [`spectral`] is parallelised.
//!
//! # Usage
//! Transporter-RGF is distributed with a binary which sweeps a tight-binding chain over an energy grid.
//! The defaults are read from `.config/default.toml`, and can be overridden by a structure file passed
//! on the command line:
//!
//! ```toml
//! [chain]
//! number_of_slices = 20
//! sites_per_slice = 2
//!
//! [field]
//! path = "potential.cube"
//! origin = [0.0, 5.0, 0.0]
//! ```
//!
//! or by environment variables prefixed with `TRANSPORTER__`.

#![warn(missing_docs)]
#![allow(clippy::type_complexity)]

/// The command line global application, tracing and configuration
pub mod app;

/// Physical constants
mod constants;

/// Error handling
pub mod error;

/// Fermi-Dirac occupation of the contacts
pub mod fermi;

/// Potential fields sampled on regular grids
pub mod field;

/// Greens function methods
pub mod greens_functions;

/// System Hamiltonian
pub mod hamiltonian;

/// Computes quantities of interest from Greens functions, such as the density of states and occupation
pub mod postprocessor;

/// Discrete energy spaces and the sweep over them
pub mod spectral;

/// Helper functions and traits
pub mod utilities;
