//! Randomised block-tridiagonal structures for tests and benchmarks.

use nalgebra::DMatrix;
use num_complex::Complex;
use num_traits::Zero;
use rand::Rng;

/// The three block sequences of a block-tridiagonal matrix: `(diagonal, lower, upper)`
pub type Blocks = (
    Vec<DMatrix<Complex<f64>>>,
    Vec<DMatrix<Complex<f64>>>,
    Vec<DMatrix<Complex<f64>>>,
);

/// A dense complex matrix with entries drawn uniformly from `[-1, 1) + i[-1, 1)`
pub fn random_matrix<R: Rng>(rows: usize, columns: usize, rng: &mut R) -> DMatrix<Complex<f64>> {
    DMatrix::from_fn(rows, columns, |_, _| {
        Complex::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
    })
}

/// A random Hermitian matrix
pub fn random_hermitian<R: Rng>(size: usize, rng: &mut R) -> DMatrix<Complex<f64>> {
    let matrix = random_matrix(size, size, rng);
    (&matrix + matrix.adjoint()) * Complex::from(0.5)
}

/// Constructs a Hermitian block-tridiagonal Hamiltonian with the given (possibly ragged) block sizes
///
/// Diagonal blocks are random Hermitian, each upper coupling is random and the lower coupling
/// is its adjoint.
pub fn construct_test_hamiltonian<R: Rng>(block_sizes: &[usize], rng: &mut R) -> Blocks {
    let diagonal = block_sizes
        .iter()
        .map(|&size| random_hermitian(size, rng))
        .collect::<Vec<_>>();
    let upper = block_sizes
        .windows(2)
        .map(|pair| random_matrix(pair[0], pair[1], rng))
        .collect::<Vec<_>>();
    let lower = upper.iter().map(|block| block.adjoint()).collect();
    (diagonal, lower, upper)
}

/// A real symmetric block-tridiagonal Hamiltonian with the given (possibly ragged) block sizes
///
/// Each upper coupling is a random real matrix with no symmetry of its own and the lower coupling
/// is its transpose, so the blocks do not commute.
pub fn construct_real_symmetric_chain<R: Rng>(block_sizes: &[usize], rng: &mut R) -> Blocks {
    let random_real = |rows: usize, columns: usize, rng: &mut R| {
        DMatrix::from_fn(rows, columns, |_, _| Complex::from(rng.gen_range(-1.0..1.0)))
    };
    let diagonal = block_sizes
        .iter()
        .map(|&size| {
            let matrix: DMatrix<Complex<f64>> = random_real(size, size, rng);
            (&matrix + matrix.transpose()) * Complex::from(0.5)
        })
        .collect::<Vec<_>>();
    let upper = block_sizes
        .windows(2)
        .map(|pair| random_real(pair[0], pair[1], rng))
        .collect::<Vec<_>>();
    let lower = upper.iter().map(|block| block.transpose()).collect();
    (diagonal, lower, upper)
}

/// A uniform nearest-neighbour chain where every block is a multiple of the identity
///
/// Every block commutes with every other, so the structure decouples into `block_size`
/// identical one-dimensional chains.
pub fn construct_uniform_chain(
    number_of_slices: usize,
    block_size: usize,
    on_site: f64,
    hopping: f64,
) -> Blocks {
    let identity = DMatrix::<Complex<f64>>::identity(block_size, block_size);
    let diagonal = vec![&identity * Complex::from(on_site); number_of_slices];
    let coupling = &identity * Complex::from(hopping);
    let number_of_couplings = number_of_slices.saturating_sub(1);
    (
        diagonal,
        vec![coupling.clone(); number_of_couplings],
        vec![coupling; number_of_couplings],
    )
}

/// A one-dimensional chain with random real on-site energies and random real hopping, in 1x1 blocks
pub fn construct_random_scalar_chain<R: Rng>(number_of_slices: usize, rng: &mut R) -> Blocks {
    let diagonal = (0..number_of_slices)
        .map(|_| DMatrix::from_element(1, 1, Complex::from(rng.gen_range(-1.0..1.0))))
        .collect::<Vec<_>>();
    let hopping = (1..number_of_slices)
        .map(|_| DMatrix::from_element(1, 1, Complex::from(rng.gen_range(0.5..1.5))))
        .collect::<Vec<_>>();
    (diagonal, hopping.clone(), hopping)
}

/// Scattering blocks `scale * I` matched to the given block sizes
pub fn scaled_identities(block_sizes: &[usize], scale: f64) -> Vec<DMatrix<Complex<f64>>> {
    block_sizes
        .iter()
        .map(|&size| DMatrix::identity(size, size) * Complex::from(scale))
        .collect()
}

/// Random Hermitian scattering blocks matched to the given block sizes
pub fn random_scattering<R: Rng>(block_sizes: &[usize], rng: &mut R) -> Vec<DMatrix<Complex<f64>>> {
    block_sizes
        .iter()
        .map(|&size| random_hermitian(size, rng))
        .collect()
}

/// Assembles the dense matrix from the block sequences
pub fn assemble_dense(blocks: &Blocks) -> DMatrix<Complex<f64>> {
    let (diagonal, lower, upper) = blocks;
    let offsets = diagonal
        .iter()
        .scan(0, |offset, block| {
            let start = *offset;
            *offset += block.nrows();
            Some(start)
        })
        .collect::<Vec<_>>();
    let dimension = diagonal.iter().map(|block| block.nrows()).sum();
    let mut dense = DMatrix::from_element(dimension, dimension, Complex::zero());
    for (block, &offset) in diagonal.iter().zip(offsets.iter()) {
        dense
            .slice_mut((offset, offset), block.shape())
            .copy_from(block);
    }
    for (idx, (lower, upper)) in lower.iter().zip(upper.iter()).enumerate() {
        dense
            .slice_mut((offsets[idx + 1], offsets[idx]), lower.shape())
            .copy_from(lower);
        dense
            .slice_mut((offsets[idx], offsets[idx + 1]), upper.shape())
            .copy_from(upper);
    }
    dense
}
