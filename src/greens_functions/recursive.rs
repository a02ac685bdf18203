//! This module provides the recursive Green's function (RGF) algorithm for block-tridiagonal systems.
//!
//! Rather than fully inverting `E - H`, an operation which scales as O(N^3) in the total number of
//! degrees of freedom, we sweep along the chain of slices and only ever invert single blocks, which
//! scales as O(n b^3) for `n` slices of size `b`. The algorithm follows Anantram, Lundstrom and
//! Nikonov, Proc. IEEE 96, 1511 (2008) (doi:10.1109/JPROC.2008.927355):
//! - A forward sweep builds the left-connected retarded Green's function g_{ii}
//! - A backward sweep builds the fully connected diagonal G_{ii} and the adjacent bands G_{i+1,i}, G_{i,i+1}
//! - When scattering functions are supplied, two further sweeps build the electron and hole correlation functions
//!
//! Every call is independent: the energy shift is applied to a copy of the diagonal blocks, so the
//! Hamiltonian is only ever borrowed immutably and calls at different energies can share it.

use super::{CorrelationFunction, GreensFunctions, RetardedGreensFunction, ScatteringFunctions};
use crate::error::RecursionError;
use crate::hamiltonian::BlockTridiagonal;
use crate::utilities::matrices::{left_inverse, real_part, ComplexMatrix};
use num_complex::Complex;

/// Computes the retarded Green's function of `hamiltonian` at `energy`, and the electron and hole
/// correlation functions if the matching scattering inputs are supplied.
///
/// All shapes, including those of the scattering inputs, are validated before any recursion
/// begins. A near-singular block is not an error: the least-squares division absorbs it, and any
/// `NaN` produced is carried through to the output.
pub fn recursive_greens_functions(
    energy: Complex<f64>,
    hamiltonian: &BlockTridiagonal,
    scattering: ScatteringFunctions<'_>,
) -> Result<GreensFunctions, RecursionError> {
    if let Some(in_scattering) = scattering.in_scattering {
        hamiltonian.validate_block_diagonal(in_scattering, "in-scattering")?;
    }
    if let Some(out_scattering) = scattering.out_scattering {
        hamiltonian.validate_block_diagonal(out_scattering, "out-scattering")?;
    }
    tracing::debug!(
        "Recursing through {} slices at energy {}",
        hamiltonian.number_of_slices(),
        energy
    );

    let shifted_diagonal = hamiltonian.shifted_diagonal(energy);
    let left_connected =
        left_connected_retarded(&shifted_diagonal, hamiltonian.lower(), hamiltonian.upper())?;
    let retarded =
        fully_connected_retarded(left_connected, hamiltonian.lower(), hamiltonian.upper());

    let electron = scattering
        .in_scattering
        .map(|in_scattering| electron_correlation(in_scattering, &retarded, hamiltonian));
    let hole = scattering
        .out_scattering
        .map(|out_scattering| hole_correlation(out_scattering, &retarded, hamiltonian));

    Ok(match (electron, hole) {
        (None, None) => GreensFunctions::Retarded { retarded },
        (Some(electron), None) => GreensFunctions::RetardedAndElectron { retarded, electron },
        (None, Some(hole)) => GreensFunctions::RetardedAndHole { retarded, hole },
        (Some(electron), Some(hole)) => GreensFunctions::RetardedElectronAndHole {
            retarded,
            electron,
            hole,
        },
    })
}

/// Calculates the left connected retarded Green's function in every slice.
///
/// With `D_i` the energy-shifted diagonal blocks, the recursion is initialised by solving
/// g_{00} = (-D_0)^{-1}
/// and propagated through the chain by
/// g_{i+1 i+1} = (-D_{i+1} - L_i g_{ii} U_i)^{-1}
/// Each step needs the result of the previous one, so the sweep is strictly sequential.
pub(crate) fn left_connected_retarded(
    shifted_diagonal: &[ComplexMatrix],
    lower: &[ComplexMatrix],
    upper: &[ComplexMatrix],
) -> Result<Vec<ComplexMatrix>, RecursionError> {
    let mut left_connected = Vec::with_capacity(shifted_diagonal.len());
    if let Some(first) = shifted_diagonal.first() {
        left_connected.push(left_inverse(&(-first))?);
    }
    for (idx, (l, u)) in lower.iter().zip(upper.iter()).enumerate() {
        let inverse_greens_function =
            -&shifted_diagonal[idx + 1] - l * &left_connected[idx] * u;
        left_connected.push(left_inverse(&inverse_greens_function)?);
    }
    Ok(left_connected)
}

/// Calculates the fully connected retarded Green's function from the left connected one.
///
/// The value in the last slice is exact, G_{n-1 n-1} = g_{n-1 n-1}, and the earlier slices follow from
/// G_{i+1 i} = G_{i+1 i+1} L_i g_{ii}
/// G_{i i+1} = g_{ii} U_i G_{i+1 i+1}
/// G_{ii} = g_{ii} + g_{ii} U_i G_{i+1 i}
/// The left connected and fully connected diagonals are held in separate containers, so the
/// off-diagonal blocks in slice `i` always see the left connected g_{ii}.
pub(crate) fn fully_connected_retarded(
    left_connected: Vec<ComplexMatrix>,
    lower: &[ComplexMatrix],
    upper: &[ComplexMatrix],
) -> RetardedGreensFunction {
    let mut diagonal = left_connected.clone();
    let mut lower_band = Vec::with_capacity(lower.len());
    let mut upper_band = Vec::with_capacity(upper.len());

    for idx in (0..lower.len()).rev() {
        let g = &left_connected[idx];
        let below = &diagonal[idx + 1] * &lower[idx] * g;
        let above = g * &upper[idx] * &diagonal[idx + 1];
        diagonal[idx] = g + g * &upper[idx] * &below;
        lower_band.push(below);
        upper_band.push(above);
    }
    lower_band.reverse();
    upper_band.reverse();

    RetardedGreensFunction {
        diagonal,
        lower: lower_band,
        upper: upper_band,
        left_connected,
    }
}

/// How the advanced partner of a block is formed in the correlation sweeps
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Conjugation {
    /// Element-wise complex conjugate, exact for real symmetric Hamiltonians
    Elementwise,
    /// Hermitian adjoint
    Adjoint,
}

impl Conjugation {
    fn apply(self, matrix: &ComplexMatrix) -> ComplexMatrix {
        match self {
            Conjugation::Elementwise => matrix.conjugate(),
            Conjugation::Adjoint => matrix.adjoint(),
        }
    }
}

/// The electron correlation function, sourced by the in-scattering function.
///
/// The partner blocks are element-wise conjugates. Every upper block is set to the adjoint of the
/// matching lower block.
fn electron_correlation(
    in_scattering: &[ComplexMatrix],
    retarded: &RetardedGreensFunction,
    hamiltonian: &BlockTridiagonal,
) -> CorrelationFunction {
    let (diagonal, lower, left_connected) = correlation_bands(
        in_scattering,
        retarded,
        hamiltonian,
        Conjugation::Elementwise,
    );
    let upper = lower.iter().map(|block| Some(block.adjoint())).collect();
    CorrelationFunction {
        diagonal,
        lower,
        upper,
        left_connected,
    }
}

/// The hole correlation function, sourced by the out-scattering function.
///
/// The partner blocks are Hermitian adjoints. Only the first upper block is assigned, as the
/// adjoint of the first lower block. The remaining upper blocks are left unset.
fn hole_correlation(
    out_scattering: &[ComplexMatrix],
    retarded: &RetardedGreensFunction,
    hamiltonian: &BlockTridiagonal,
) -> CorrelationFunction {
    let (diagonal, lower, left_connected) =
        correlation_bands(out_scattering, retarded, hamiltonian, Conjugation::Adjoint);
    let upper = lower
        .iter()
        .enumerate()
        .map(|(idx, block)| (idx == 0).then(|| block.adjoint()))
        .collect();
    CorrelationFunction {
        diagonal,
        lower,
        upper,
        left_connected,
    }
}

/// Sweeps a scattering function through the chain, returning `(diagonal, lower, left_connected)`.
///
/// With `X*` the partner of `X` under `conjugation`, the forward sweep sandwiches the scattering
/// function between left connected retarded functions
/// g^n_{00} = g_{00} S_{0} g_{00}*
/// g^n_{i+1 i+1} = g_{i+1 i+1} (S_{i+1} + L_i g^n_{ii} U_i*) g_{i+1 i+1}*
/// and the backward sweep connects the right side of the chain
/// G^n_{i+1 i} = G_{i+1 i+1} L_i g^n_{ii} + G^n_{i+1 i+1} L_i* g_{ii}*
/// G^n_{ii} = g^n_{ii} + g_{ii} U_i G^n_{i+1 i+1} L_i* g_{ii}* + g^n_{ii} U_i* G_{i+1 i}* + G_{i i+1} L_i g^n_{ii}
/// Diagonal and left connected blocks keep only their real part, discarding the numerical
/// imaginary residue.
fn correlation_bands(
    scattering: &[ComplexMatrix],
    retarded: &RetardedGreensFunction,
    hamiltonian: &BlockTridiagonal,
    conjugation: Conjugation,
) -> (Vec<ComplexMatrix>, Vec<ComplexMatrix>, Vec<ComplexMatrix>) {
    let (lower, upper) = (hamiltonian.lower(), hamiltonian.upper());
    let g = &retarded.left_connected;

    let mut left_connected = Vec::with_capacity(scattering.len());
    if let (Some(g_first), Some(s_first)) = (g.first(), scattering.first()) {
        left_connected.push(real_part(
            &(g_first * s_first * conjugation.apply(g_first)),
        ));
    }
    for idx in 0..lower.len() {
        let g_next = &g[idx + 1];
        let source = &scattering[idx + 1]
            + &lower[idx] * &left_connected[idx] * conjugation.apply(&upper[idx]);
        left_connected.push(real_part(&(g_next * source * conjugation.apply(g_next))));
    }

    let mut diagonal = left_connected.clone();
    let mut lower_band = Vec::with_capacity(lower.len());
    for idx in (0..lower.len()).rev() {
        let g_partner = conjugation.apply(&g[idx]);
        let lower_partner = conjugation.apply(&lower[idx]);
        let g_n = &left_connected[idx];

        let below = &retarded.diagonal[idx + 1] * &lower[idx] * g_n
            + &diagonal[idx + 1] * &lower_partner * &g_partner;
        let full = g_n
            + &g[idx] * &upper[idx] * &diagonal[idx + 1] * &lower_partner * &g_partner
            + g_n * conjugation.apply(&upper[idx]) * conjugation.apply(&retarded.lower[idx])
            + &retarded.upper[idx] * &lower[idx] * g_n;
        diagonal[idx] = real_part(&full);
        lower_band.push(below);
    }
    lower_band.reverse();

    (diagonal, lower_band, left_connected)
}

#[cfg(test)]
mod test {
    use super::recursive_greens_functions;
    use crate::greens_functions::{GreensFunctions, ScatteringFunctions};
    use crate::hamiltonian::BlockTridiagonal;
    use crate::utilities::matrices::{is_finite, ComplexMatrix};
    use num_complex::Complex;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn hamiltonian_from(blocks: utilities::Blocks) -> BlockTridiagonal {
        let (diagonal, lower, upper) = blocks;
        BlockTridiagonal::new(diagonal, lower, upper).unwrap()
    }

    fn dense_retarded(hamiltonian: &BlockTridiagonal, energy: Complex<f64>) -> ComplexMatrix {
        let dimension = hamiltonian.dimension();
        (ComplexMatrix::identity(dimension, dimension) * energy - hamiltonian.to_dense())
            .try_inverse()
            .unwrap()
    }

    fn block(
        dense: &ComplexMatrix,
        hamiltonian: &BlockTridiagonal,
        row: usize,
        column: usize,
    ) -> ComplexMatrix {
        let offsets = hamiltonian.offsets();
        let sizes = hamiltonian.block_sizes();
        dense
            .slice((offsets[row], offsets[column]), (sizes[row], sizes[column]))
            .clone_owned()
    }

    fn relative_error(value: &ComplexMatrix, reference: &ComplexMatrix) -> f64 {
        (value - reference).norm() / reference.norm().max(f64::MIN_POSITIVE)
    }

    /// The dense `G S G^†` for a block-diagonal scattering function
    fn dense_correlation(
        hamiltonian: &BlockTridiagonal,
        retarded: &ComplexMatrix,
        scattering: &[ComplexMatrix],
    ) -> ComplexMatrix {
        let dimension = hamiltonian.dimension();
        let mut dense_scattering = ComplexMatrix::zeros(dimension, dimension);
        for (block, offset) in scattering.iter().zip(hamiltonian.offsets()) {
            dense_scattering
                .slice_mut((offset, offset), block.shape())
                .copy_from(block);
        }
        retarded * dense_scattering * retarded.adjoint()
    }

    #[test]
    fn a_single_slice_reduces_to_the_dense_inverse() {
        let mut rng = StdRng::seed_from_u64(1);
        let hamiltonian =
            hamiltonian_from(utilities::construct_test_hamiltonian(&[3], &mut rng));
        let energy = Complex::new(0.4, 0.05);
        let result =
            recursive_greens_functions(energy, &hamiltonian, ScatteringFunctions::none()).unwrap();

        let expected = dense_retarded(&hamiltonian, energy);
        let retarded = result.retarded();
        assert_eq!(retarded.diagonal().len(), 1);
        assert!(retarded.lower().is_empty());
        assert!(retarded.upper().is_empty());
        assert!(relative_error(&retarded.diagonal()[0], &expected) < 1e-10);
        assert_eq!(retarded.diagonal()[0], retarded.left_connected()[0]);
    }

    #[test]
    fn three_slice_chain_at_zero_energy_matches_the_analytic_inverse() {
        // Six sites with unit hopping, split into three slices of two. The inverse of the path
        // matrix is known in closed form: the middle block of -H^{-1} is [[0, -1], [-1, 0]].
        let hopping = Complex::from(1_f64);
        let zero = Complex::from(0_f64);
        let intra = ComplexMatrix::from_row_slice(2, 2, &[zero, hopping, hopping, zero]);
        let upper = ComplexMatrix::from_row_slice(2, 2, &[zero, zero, hopping, zero]);
        let lower = upper.transpose();
        let hamiltonian = BlockTridiagonal::new(
            vec![intra.clone(), intra.clone(), intra],
            vec![lower.clone(), lower],
            vec![upper.clone(), upper],
        )
        .unwrap();

        let result =
            recursive_greens_functions(zero, &hamiltonian, ScatteringFunctions::none()).unwrap();
        let middle = &result.retarded().diagonal()[1];
        let expected = ComplexMatrix::from_row_slice(2, 2, &[zero, -hopping, -hopping, zero]);
        for (value, expected) in middle.iter().zip(expected.iter()) {
            approx::assert_relative_eq!(value.re, expected.re, epsilon = 1e-10);
            approx::assert_relative_eq!(value.im, expected.im, epsilon = 1e-10);
        }
    }

    #[test]
    fn recursive_bands_coincide_with_a_dense_inversion() {
        let mut rng = StdRng::seed_from_u64(42);
        let hamiltonian = hamiltonian_from(utilities::construct_test_hamiltonian(
            &[2, 3, 1, 4, 2],
            &mut rng,
        ));
        let energy = Complex::new(0.3, 0.2);
        let result =
            recursive_greens_functions(energy, &hamiltonian, ScatteringFunctions::none()).unwrap();
        let dense = dense_retarded(&hamiltonian, energy);
        let retarded = result.retarded();

        for (idx, diagonal) in retarded.diagonal().iter().enumerate() {
            assert!(relative_error(diagonal, &block(&dense, &hamiltonian, idx, idx)) < 1e-8);
        }
        for (idx, (lower, upper)) in retarded.lower().iter().zip(retarded.upper()).enumerate() {
            assert!(relative_error(lower, &block(&dense, &hamiltonian, idx + 1, idx)) < 1e-8);
            assert!(relative_error(upper, &block(&dense, &hamiltonian, idx, idx + 1)) < 1e-8);
        }
    }

    #[test]
    fn non_hermitian_systems_are_solved_exactly() {
        let mut rng = StdRng::seed_from_u64(5);
        let diagonal = (0..4)
            .map(|_| utilities::random_matrix(2, 2, &mut rng))
            .collect::<Vec<_>>();
        let lower = (0..3)
            .map(|_| utilities::random_matrix(2, 2, &mut rng))
            .collect::<Vec<_>>();
        let upper = (0..3)
            .map(|_| utilities::random_matrix(2, 2, &mut rng))
            .collect::<Vec<_>>();
        let hamiltonian = BlockTridiagonal::new(diagonal, lower, upper).unwrap();
        let energy = Complex::new(-0.2, 0.5);
        let result =
            recursive_greens_functions(energy, &hamiltonian, ScatteringFunctions::none()).unwrap();
        let dense = dense_retarded(&hamiltonian, energy);
        for (idx, diagonal) in result.retarded().diagonal().iter().enumerate() {
            assert!(relative_error(diagonal, &block(&dense, &hamiltonian, idx, idx)) < 1e-8);
        }
    }

    #[test]
    fn the_hamiltonian_is_unchanged_and_calls_are_deterministic() {
        let mut rng = StdRng::seed_from_u64(9);
        let hamiltonian =
            hamiltonian_from(utilities::construct_test_hamiltonian(&[2, 2, 3], &mut rng));
        let before = hamiltonian.clone();
        let scattering = utilities::scaled_identities(&hamiltonian.block_sizes(), 0.1);
        let inputs = ScatteringFunctions::none()
            .with_in_scattering(&scattering)
            .with_out_scattering(&scattering);
        let energy = Complex::new(0.1, 0.1);

        let first = recursive_greens_functions(energy, &hamiltonian, inputs).unwrap();
        let second = recursive_greens_functions(energy, &hamiltonian, inputs).unwrap();
        assert_eq!(hamiltonian, before);
        assert_eq!(first, second);
    }

    #[test]
    fn in_scattering_alone_yields_eight_sequences() {
        let mut rng = StdRng::seed_from_u64(2);
        let hamiltonian =
            hamiltonian_from(utilities::construct_test_hamiltonian(&[2, 2, 2], &mut rng));
        let scattering = utilities::scaled_identities(&hamiltonian.block_sizes(), 0.2);
        let result = recursive_greens_functions(
            Complex::new(0.0, 0.1),
            &hamiltonian,
            ScatteringFunctions::none().with_in_scattering(&scattering),
        )
        .unwrap();

        assert!(matches!(result, GreensFunctions::RetardedAndElectron { .. }));
        assert_eq!(result.number_of_sequences(), 8);
        assert!(result.hole().is_none());
        let electron = result.electron().unwrap();
        assert_eq!(electron.diagonal().len(), 3);
        assert_eq!(electron.lower().len(), 2);
        assert!(electron.upper().iter().all(Option::is_some));
        assert_eq!(electron.left_connected().len(), 3);
    }

    #[test]
    fn out_scattering_alone_yields_the_hole_variant() {
        let mut rng = StdRng::seed_from_u64(4);
        let hamiltonian =
            hamiltonian_from(utilities::construct_test_hamiltonian(&[1, 2, 1, 2], &mut rng));
        let scattering = utilities::scaled_identities(&hamiltonian.block_sizes(), 0.2);
        let result = recursive_greens_functions(
            Complex::new(0.0, 0.1),
            &hamiltonian,
            ScatteringFunctions::none().with_out_scattering(&scattering),
        )
        .unwrap();

        assert!(matches!(result, GreensFunctions::RetardedAndHole { .. }));
        assert_eq!(result.number_of_sequences(), 8);
        assert!(result.electron().is_none());
        let hole = result.hole().unwrap();
        assert_eq!(hole.upper().len(), 3);
        assert!(hole.upper()[0].is_some());
        assert!(hole.upper()[1..].iter().all(Option::is_none));
        assert_eq!(
            hole.upper()[0].as_ref().unwrap(),
            &hole.lower()[0].adjoint()
        );
    }

    #[test]
    fn a_single_slice_with_both_scattering_inputs_has_empty_bands() {
        let mut rng = StdRng::seed_from_u64(8);
        let hamiltonian =
            hamiltonian_from(utilities::construct_test_hamiltonian(&[3], &mut rng));
        let in_scattering = utilities::random_scattering(&[3], &mut rng);
        let out_scattering = utilities::random_scattering(&[3], &mut rng);
        let result = recursive_greens_functions(
            Complex::new(0.2, 0.1),
            &hamiltonian,
            ScatteringFunctions::none()
                .with_in_scattering(&in_scattering)
                .with_out_scattering(&out_scattering),
        )
        .unwrap();

        assert_eq!(result.number_of_sequences(), 12);
        let retarded = result.retarded();
        assert!(retarded.lower().is_empty() && retarded.upper().is_empty());
        for correlation in [result.electron().unwrap(), result.hole().unwrap()] {
            assert_eq!(correlation.diagonal().len(), 1);
            assert_eq!(correlation.left_connected().len(), 1);
            assert!(correlation.lower().is_empty());
            assert!(correlation.upper().is_empty());
        }
    }

    #[test]
    fn correlation_diagonals_are_real_for_hermitian_scattering() {
        let mut rng = StdRng::seed_from_u64(13);
        let sizes = [2, 3, 2, 1];
        let hamiltonian = hamiltonian_from(utilities::construct_test_hamiltonian(&sizes, &mut rng));
        let in_scattering = utilities::random_scattering(&sizes, &mut rng);
        let out_scattering = utilities::random_scattering(&sizes, &mut rng);
        let result = recursive_greens_functions(
            Complex::new(0.5, 0.05),
            &hamiltonian,
            ScatteringFunctions::none()
                .with_in_scattering(&in_scattering)
                .with_out_scattering(&out_scattering),
        )
        .unwrap();

        for correlation in [result.electron().unwrap(), result.hole().unwrap()] {
            for block in correlation
                .diagonal()
                .iter()
                .chain(correlation.left_connected())
            {
                assert!(block.iter().all(|element| element.im == 0_f64));
            }
        }
    }

    #[test]
    fn scalar_chain_correlations_match_the_dense_product() {
        let mut rng = StdRng::seed_from_u64(21);
        let hamiltonian = hamiltonian_from(utilities::construct_random_scalar_chain(6, &mut rng));
        let sizes = hamiltonian.block_sizes();
        let in_scattering = sizes
            .iter()
            .map(|&size| ComplexMatrix::identity(size, size) * Complex::from(rng.gen_range(0.1..1.0)))
            .collect::<Vec<_>>();
        let out_scattering = utilities::scaled_identities(&sizes, 0.3);
        let energy = Complex::new(0.25, 0.1);

        let result = recursive_greens_functions(
            energy,
            &hamiltonian,
            ScatteringFunctions::none()
                .with_in_scattering(&in_scattering)
                .with_out_scattering(&out_scattering),
        )
        .unwrap();
        let retarded = dense_retarded(&hamiltonian, energy);

        let dense_electron = dense_correlation(&hamiltonian, &retarded, &in_scattering);
        let electron = result.electron().unwrap();
        for (idx, diagonal) in electron.diagonal().iter().enumerate() {
            let expected = block(&dense_electron, &hamiltonian, idx, idx);
            assert!(relative_error(diagonal, &expected) < 1e-8);
        }
        for (idx, (lower, upper)) in electron.lower().iter().zip(electron.upper()).enumerate() {
            let expected_lower = block(&dense_electron, &hamiltonian, idx + 1, idx);
            let expected_upper = block(&dense_electron, &hamiltonian, idx, idx + 1);
            assert!(relative_error(lower, &expected_lower) < 1e-8);
            assert!(relative_error(upper.as_ref().unwrap(), &expected_upper) < 1e-8);
        }

        let dense_hole = dense_correlation(&hamiltonian, &retarded, &out_scattering);
        let hole = result.hole().unwrap();
        for (idx, diagonal) in hole.diagonal().iter().enumerate() {
            let expected = block(&dense_hole, &hamiltonian, idx, idx);
            assert!(relative_error(diagonal, &expected) < 1e-8);
        }
        let expected_upper = block(&dense_hole, &hamiltonian, 0, 1);
        assert!(relative_error(hole.upper()[0].as_ref().unwrap(), &expected_upper) < 1e-8);
    }

    #[test]
    fn decoupled_block_chain_correlations_match_the_dense_product() {
        let hamiltonian = hamiltonian_from(utilities::construct_uniform_chain(5, 3, 0.2, -1.0));
        let sizes = hamiltonian.block_sizes();
        let in_scattering = sizes
            .iter()
            .enumerate()
            .map(|(idx, &size)| {
                ComplexMatrix::identity(size, size) * Complex::from(0.1 * (idx + 1) as f64)
            })
            .collect::<Vec<_>>();
        let energy = Complex::new(-0.4, 0.08);
        let result = recursive_greens_functions(
            energy,
            &hamiltonian,
            ScatteringFunctions::none().with_in_scattering(&in_scattering),
        )
        .unwrap();
        let retarded = dense_retarded(&hamiltonian, energy);
        let dense_electron = dense_correlation(&hamiltonian, &retarded, &in_scattering);

        for (idx, diagonal) in result.electron().unwrap().diagonal().iter().enumerate() {
            let expected = block(&dense_electron, &hamiltonian, idx, idx);
            assert!(relative_error(diagonal, &expected) < 1e-8);
        }
    }

    #[test]
    fn real_symmetric_chain_electron_correlation_matches_the_dense_product() {
        // The couplings are random real blocks with L = U^T, so no two blocks commute
        let mut rng = StdRng::seed_from_u64(27);
        let hamiltonian = hamiltonian_from(utilities::construct_real_symmetric_chain(
            &[2, 2, 2, 2],
            &mut rng,
        ));
        let in_scattering = utilities::scaled_identities(&hamiltonian.block_sizes(), 0.2);
        let energy = Complex::new(0.2, 0.1);
        let result = recursive_greens_functions(
            energy,
            &hamiltonian,
            ScatteringFunctions::none().with_in_scattering(&in_scattering),
        )
        .unwrap();
        let retarded = dense_retarded(&hamiltonian, energy);
        let dense_electron = dense_correlation(&hamiltonian, &retarded, &in_scattering);
        let electron = result.electron().unwrap();

        for (idx, diagonal) in electron.diagonal().iter().enumerate() {
            let expected = block(&dense_electron, &hamiltonian, idx, idx);
            assert!(relative_error(diagonal, &expected) < 1e-10);
        }
        for (idx, (lower, upper)) in electron.lower().iter().zip(electron.upper()).enumerate() {
            let expected_lower = block(&dense_electron, &hamiltonian, idx + 1, idx);
            let expected_upper = block(&dense_electron, &hamiltonian, idx, idx + 1);
            assert!(relative_error(lower, &expected_lower) < 1e-10);
            assert!(relative_error(upper.as_ref().unwrap(), &expected_upper) < 1e-10);
        }
    }

    #[test]
    fn scattering_inputs_of_the_wrong_length_fail_before_recursing() {
        let mut rng = StdRng::seed_from_u64(17);
        let hamiltonian =
            hamiltonian_from(utilities::construct_test_hamiltonian(&[2, 2, 2], &mut rng));
        let scattering = utilities::scaled_identities(&[2, 2], 0.1);
        let result = recursive_greens_functions(
            Complex::new(0.0, 0.1),
            &hamiltonian,
            ScatteringFunctions::none().with_out_scattering(&scattering),
        );
        assert!(matches!(
            result,
            Err(crate::error::RecursionError::BlockCount { .. })
        ));
    }

    #[test]
    fn non_finite_blocks_propagate_without_failing() {
        let mut rng = StdRng::seed_from_u64(19);
        let (mut diagonal, lower, upper) =
            utilities::construct_test_hamiltonian(&[2, 2, 2], &mut rng);
        diagonal[1][(0, 0)] = Complex::new(f64::NAN, 0.);
        let hamiltonian = BlockTridiagonal::new(diagonal, lower, upper).unwrap();
        let result = recursive_greens_functions(
            Complex::new(0.0, 0.1),
            &hamiltonian,
            ScatteringFunctions::none(),
        )
        .unwrap();
        let retarded = result.retarded();
        assert!(is_finite(&retarded.left_connected()[0]));
        assert!(!is_finite(&retarded.left_connected()[1]));
        assert!(!is_finite(&retarded.diagonal()[0]));
    }
}
