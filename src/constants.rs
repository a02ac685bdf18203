// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Constants
//!
//! Defines physical constants and unit conversions used in the simulation

pub const BOLTZMANN_EV: f64 = 8.617333262e-5; // The Boltzmann constant in eV / K
pub const BOHR_TO_ANGSTROM: f64 = 0.529177; // One Bohr radius in Ångström
