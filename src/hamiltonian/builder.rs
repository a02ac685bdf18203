use super::BlockTridiagonal;
use crate::error::BuildError;
use crate::utilities::matrices::ComplexMatrix;
use nalgebra::Point3;
use num_complex::Complex;
use serde::Deserialize;

/// An additive on-site potential, evaluated at a position in Ångström
pub trait Potential {
    /// The potential energy at `position`
    fn potential(&self, position: &Point3<f64>) -> f64;
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
/// Parameters of a nearest-neighbour tight-binding chain
///
/// Slices are stacked along `z`, `slice_length` apart. Each slice is a row of `sites_per_slice`
/// sites along `x`, `site_spacing` apart. Sites couple to their neighbours inside a slice through
/// `intra_slice_hopping`, and to the site with the same index in the adjacent slice through
/// `inter_slice_hopping`.
pub struct ChainParameters {
    /// Number of slices along the transport direction
    pub number_of_slices: usize,
    /// Number of sites in every slice
    pub sites_per_slice: usize,
    /// On-site energy in eV
    pub on_site_energy: f64,
    /// Hopping between neighbouring sites in one slice, in eV
    pub intra_slice_hopping: f64,
    /// Hopping between equivalent sites in neighbouring slices, in eV
    pub inter_slice_hopping: f64,
    /// Slice period in Ångström
    pub slice_length: f64,
    /// Site spacing inside a slice in Ångström
    pub site_spacing: f64,
}

impl ChainParameters {
    /// Position of site `site` in slice `slice`
    pub fn position(&self, slice: usize, site: usize) -> Point3<f64> {
        Point3::new(
            site as f64 * self.site_spacing,
            0_f64,
            slice as f64 * self.slice_length,
        )
    }
}

/// Builder for chain Hamiltonians
pub struct HamiltonianBuilder<RefChain, RefPotential> {
    chain: RefChain,
    potential: RefPotential,
}

impl HamiltonianBuilder<(), ()> {
    /// Initialise an empty builder
    pub fn new() -> Self {
        Self {
            chain: (),
            potential: (),
        }
    }
}

impl Default for HamiltonianBuilder<(), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<RefChain, RefPotential> HamiltonianBuilder<RefChain, RefPotential> {
    /// Attach the chain geometry and tight-binding parameters
    pub fn with_chain<Chain>(self, chain: &Chain) -> HamiltonianBuilder<&Chain, RefPotential> {
        HamiltonianBuilder {
            chain,
            potential: self.potential,
        }
    }

    /// Attach an external potential, added to the on-site energies
    pub fn with_potential<P>(self, potential: &P) -> HamiltonianBuilder<RefChain, &P> {
        HamiltonianBuilder {
            chain: self.chain,
            potential,
        }
    }
}

impl<'a> HamiltonianBuilder<&'a ChainParameters, ()> {
    /// Build the bare chain Hamiltonian
    pub fn build(self) -> Result<BlockTridiagonal, BuildError> {
        assemble(self.chain, |_| 0_f64)
    }
}

impl<'a, P: Potential> HamiltonianBuilder<&'a ChainParameters, &'a P> {
    /// Build the chain Hamiltonian with the potential sampled at every site
    pub fn build(self) -> Result<BlockTridiagonal, BuildError> {
        let potential = self.potential;
        assemble(self.chain, |position| potential.potential(position))
    }
}

fn assemble<F>(chain: &ChainParameters, potential: F) -> Result<BlockTridiagonal, BuildError>
where
    F: Fn(&Point3<f64>) -> f64,
{
    if chain.number_of_slices == 0 || chain.sites_per_slice == 0 {
        return Err(BuildError::Chain(format!(
            "a chain needs at least one slice and one site per slice, found {} slices of {} sites",
            chain.number_of_slices, chain.sites_per_slice
        )));
    }
    let n = chain.sites_per_slice;
    tracing::debug!(
        "Assembling a chain of {} slices with {} sites each",
        chain.number_of_slices,
        n
    );

    let diagonal = (0..chain.number_of_slices)
        .map(|slice| {
            let mut block = ComplexMatrix::zeros(n, n);
            for site in 0..n {
                let position = chain.position(slice, site);
                block[(site, site)] = Complex::from(chain.on_site_energy + potential(&position));
                if site + 1 < n {
                    block[(site, site + 1)] = Complex::from(chain.intra_slice_hopping);
                    block[(site + 1, site)] = Complex::from(chain.intra_slice_hopping);
                }
            }
            block
        })
        .collect::<Vec<_>>();

    let coupling = ComplexMatrix::identity(n, n) * Complex::from(chain.inter_slice_hopping);
    let number_of_couplings = chain.number_of_slices - 1;
    let upper = vec![coupling.clone(); number_of_couplings];
    let lower = vec![coupling.transpose(); number_of_couplings];

    Ok(BlockTridiagonal::new(diagonal, lower, upper)?)
}
