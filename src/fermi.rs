//! Fermi-Dirac occupation of the contacts

use crate::constants::BOLTZMANN_EV;

/// The Fermi-Dirac occupation of a state at `energy` for a reservoir with `chemical_potential`
///
/// Energies are in eV and the temperature in Kelvin. At zero temperature the occupation is a step,
/// taking the value one half exactly at the chemical potential.
pub fn fermi_dirac(energy: f64, chemical_potential: f64, temperature: f64) -> f64 {
    let excess = energy - chemical_potential;
    if temperature <= 0_f64 {
        return match excess.partial_cmp(&0_f64) {
            Some(std::cmp::Ordering::Less) => 1_f64,
            Some(std::cmp::Ordering::Greater) => 0_f64,
            _ => 0.5_f64,
        };
    }
    let argument = excess / (BOLTZMANN_EV * temperature);
    if argument > 0_f64 {
        let decay = (-argument).exp();
        decay / (1_f64 + decay)
    } else {
        1_f64 / (1_f64 + argument.exp())
    }
}

/// The chemical potential in each of `number_of_slices` slices, interpolated linearly between the
/// left and right contacts
pub fn chemical_potential_profile(left: f64, right: f64, number_of_slices: usize) -> Vec<f64> {
    match number_of_slices {
        0 => vec![],
        1 => vec![left],
        n => (0..n)
            .map(|idx| left + (right - left) * idx as f64 / (n - 1) as f64)
            .collect(),
    }
}
