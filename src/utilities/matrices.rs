use crate::error::RecursionError;
use nalgebra::{DMatrix, SVD};
use num_complex::Complex;

/// A dense, heap allocated complex matrix. Every block in the solver is one of these.
pub type ComplexMatrix = DMatrix<Complex<f64>>;

/// The ordered product only ever looks at this many leading entries
pub const PRODUCT_WINDOW: usize = 10;

/// Multiplies the leading entries of a list of square matrices
///
/// At most [`PRODUCT_WINDOW`] entries are used, however long the list. The product is accumulated
/// from the right, so the highest-indexed matrix in the window acts first:
/// `M_0 · M_1 · ... · M_{w-1}`. All matrices in the list must share one square shape.
pub fn ordered_product(matrices: &[ComplexMatrix]) -> Result<ComplexMatrix, RecursionError> {
    let first = matrices.first().ok_or(RecursionError::EmptyProduct)?;
    let size = first.nrows();
    for (idx, matrix) in matrices.iter().enumerate() {
        if matrix.shape() != (size, size) {
            return Err(RecursionError::DimensionMismatch {
                context: format!("ordered product entry {}", idx),
                expected: (size, size),
                found: matrix.shape(),
            });
        }
    }

    let window = matrices.len().min(PRODUCT_WINDOW);
    Ok(matrices[..window]
        .iter()
        .rev()
        .fold(ComplexMatrix::identity(size, size), |product, matrix| {
            matrix * product
        }))
}

/// Generalised left division: finds `X` minimising `‖A·X − B‖`
///
/// The solve goes through a singular value decomposition of `A`, so rectangular and rank
/// deficient `A` are accepted and the minimum-norm least-squares solution is returned. Singular
/// values are only discarded at the level of machine precision relative to the largest one,
/// there is no user-facing rank cutoff.
///
/// Non-finite input is not an error: the returned block is filled with `NaN` so the caller's
/// recursion carries on and the failure shows up in its output.
pub fn left_divide(
    a: &ComplexMatrix,
    b: &ComplexMatrix,
) -> Result<ComplexMatrix, RecursionError> {
    if a.nrows() != b.nrows() {
        return Err(RecursionError::DimensionMismatch {
            context: "left division right-hand side".into(),
            expected: (a.nrows(), b.ncols()),
            found: b.shape(),
        });
    }
    if a.is_empty() || b.is_empty() {
        return Ok(ComplexMatrix::zeros(a.ncols(), b.ncols()));
    }
    if !is_finite(a) || !is_finite(b) {
        tracing::warn!("Non-finite values reached a left division, propagating NaN");
        return Ok(ComplexMatrix::from_element(
            a.ncols(),
            b.ncols(),
            Complex::new(f64::NAN, f64::NAN),
        ));
    }

    let svd = SVD::new(a.clone(), true, true);
    let largest = svd
        .singular_values
        .iter()
        .fold(0_f64, |acc, &value| acc.max(value));
    svd.solve(b, f64::EPSILON * largest)
        .map_err(|e| RecursionError::Decomposition(e.to_string()))
}

/// Solves `A·X = I` in the least-squares sense
pub fn left_inverse(a: &ComplexMatrix) -> Result<ComplexMatrix, RecursionError> {
    left_divide(a, &ComplexMatrix::identity(a.nrows(), a.nrows()))
}

/// Discards the imaginary part of every element
pub fn real_part(matrix: &ComplexMatrix) -> ComplexMatrix {
    matrix.map(|element| Complex::new(element.re, 0_f64))
}

/// True if every element has finite real and imaginary parts
pub fn is_finite(matrix: &ComplexMatrix) -> bool {
    matrix
        .iter()
        .all(|element| element.re.is_finite() && element.im.is_finite())
}

/// Tests for hermiticity of a matrix
pub fn is_hermitian(matrix: &ComplexMatrix) -> bool {
    if !matrix.is_square() {
        return false;
    }
    let adjoint = matrix.adjoint();
    matrix
        .iter()
        .zip(adjoint.iter())
        .all(|(element, adjoint_element)| {
            (element - adjoint_element).norm() < std::f64::EPSILON * 100_f64
        })
}
