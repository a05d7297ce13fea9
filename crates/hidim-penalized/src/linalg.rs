//! Dense linear algebra helpers
//!
//! Cholesky factorization for the normal equations and a cyclic Jacobi
//! eigensolver for symmetric cross-product matrices. Both are plain ndarray
//! loops; the systems solved here are p x p (or n x n) with p, n in the low
//! hundreds.

use crate::error::{PenalizedError, Result};
use ndarray::{Array1, Array2, ArrayView2};

/// Result of eigenvalue decomposition
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    /// Eigenvalues (sorted in descending order)
    pub eigenvalues: Array1<f64>,
    /// Eigenvectors (columns are eigenvectors)
    pub eigenvectors: Array2<f64>,
}

/// Cross-product `XᵀX`
pub fn gram(x: ArrayView2<'_, f64>) -> Array2<f64> {
    x.t().dot(&x)
}

/// Lower-triangular Cholesky factor `L` with `A = L Lᵀ`.
///
/// A pivot at or below `tolerance` times its own diagonal entry `a[j, j]` is
/// treated as singular. The ratio is the share of column `j` left after
/// projecting out the earlier columns, so the check does not depend on how
/// each column is scaled.
pub fn cholesky(a: &Array2<f64>, tolerance: f64) -> Result<Array2<f64>> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(PenalizedError::DimensionMismatch {
            expected: n,
            actual: a.ncols(),
        });
    }

    let mut l = Array2::<f64>::zeros((n, n));
    for j in 0..n {
        let mut pivot = a[[j, j]];
        for k in 0..j {
            pivot -= l[[j, k]] * l[[j, k]];
        }
        let threshold = tolerance * a[[j, j]].max(f64::MIN_POSITIVE);
        if !pivot.is_finite() || pivot <= threshold {
            return Err(PenalizedError::RankDeficient {
                features: n,
                reason: format!("pivot {pivot:.3e} at column {j}"),
            });
        }
        let diag = pivot.sqrt();
        l[[j, j]] = diag;

        for i in (j + 1)..n {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            l[[i, j]] = sum / diag;
        }
    }

    Ok(l)
}

/// Solve `L Lᵀ x = b` given the Cholesky factor `L`
pub fn cholesky_solve(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = l.nrows();

    // Forward substitution: L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[[i, k]] * z[k];
        }
        z[i] = sum / l[[i, i]];
    }

    // Back substitution: Lᵀ x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = z[i];
        for k in (i + 1)..n {
            sum -= l[[k, i]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }

    x
}

/// Inverse of `L Lᵀ` from its Cholesky factor
pub fn cholesky_inverse(l: &Array2<f64>) -> Array2<f64> {
    let n = l.nrows();
    let mut inverse = Array2::<f64>::zeros((n, n));
    let mut unit = Array1::<f64>::zeros(n);
    for j in 0..n {
        unit.fill(0.0);
        unit[j] = 1.0;
        inverse.column_mut(j).assign(&cholesky_solve(l, &unit));
    }
    inverse
}

/// Solve the symmetric positive definite system `A x = b`
pub fn solve_spd(a: &Array2<f64>, b: &Array1<f64>, tolerance: f64) -> Result<Array1<f64>> {
    if a.nrows() != b.len() {
        return Err(PenalizedError::DimensionMismatch {
            expected: a.nrows(),
            actual: b.len(),
        });
    }
    let l = cholesky(a, tolerance)?;
    Ok(cholesky_solve(&l, b))
}

/// Cyclic Jacobi eigenvalue decomposition for symmetric matrices
///
/// Sweeps over every off-diagonal pair until the off-diagonal mass falls
/// below `tolerance` relative to the matrix norm, or `max_sweeps` is reached.
pub fn jacobi_eigendecomp(
    matrix: &Array2<f64>,
    max_sweeps: usize,
    tolerance: f64,
) -> Result<EigenDecomposition> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(PenalizedError::DimensionMismatch {
            expected: n,
            actual: matrix.ncols(),
        });
    }

    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(n);
    let norm = a.iter().map(|x| x * x).sum::<f64>().sqrt();

    for _sweep in 0..max_sweeps {
        let off: f64 = off_diagonal_norm(&a);
        if off <= tolerance * norm.max(f64::MIN_POSITIVE) {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                if a[[p, q]].abs() < f64::MIN_POSITIVE {
                    continue;
                }
                let (cos_theta, sin_theta) = compute_rotation(a[[p, p]], a[[q, q]], a[[p, q]]);
                apply_jacobi_rotation(&mut a, &mut v, p, q, cos_theta, sin_theta);
            }
        }
    }

    let eigenvalues = a.diag().to_owned();

    // Sort eigenvalues and eigenvectors in descending order
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&i, &j| {
        eigenvalues[j]
            .partial_cmp(&eigenvalues[i])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let sorted_eigenvalues = indices.iter().map(|&i| eigenvalues[i]).collect();
    let mut sorted_eigenvectors = Array2::<f64>::zeros((n, n));
    for (new_idx, &old_idx) in indices.iter().enumerate() {
        sorted_eigenvectors
            .column_mut(new_idx)
            .assign(&v.column(old_idx));
    }

    Ok(EigenDecomposition {
        eigenvalues: sorted_eigenvalues,
        eigenvectors: sorted_eigenvectors,
    })
}

fn off_diagonal_norm(a: &Array2<f64>) -> f64 {
    let n = a.nrows();
    let mut sum = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            sum += 2.0 * a[[i, j]] * a[[i, j]];
        }
    }
    sum.sqrt()
}

/// Compute the rotation (cos, sin) that annihilates `a[p, q]`
fn compute_rotation(app: f64, aqq: f64, apq: f64) -> (f64, f64) {
    if apq.abs() < 1e-300 {
        return (1.0, 0.0);
    }

    let tau = (aqq - app) / (2.0 * apq);
    let t = if tau >= 0.0 {
        1.0 / (tau + (1.0 + tau * tau).sqrt())
    } else {
        -1.0 / (-tau + (1.0 + tau * tau).sqrt())
    };

    let cos_theta = 1.0 / (1.0 + t * t).sqrt();
    let sin_theta = t * cos_theta;

    (cos_theta, sin_theta)
}

/// Apply a Jacobi rotation to matrix A and eigenvector matrix V
fn apply_jacobi_rotation(
    a: &mut Array2<f64>,
    v: &mut Array2<f64>,
    p: usize,
    q: usize,
    cos_theta: f64,
    sin_theta: f64,
) {
    let n = a.nrows();

    let app = a[[p, p]];
    let aqq = a[[q, q]];
    let apq = a[[p, q]];

    a[[p, p]] = cos_theta * cos_theta * app - 2.0 * cos_theta * sin_theta * apq
        + sin_theta * sin_theta * aqq;
    a[[q, q]] = sin_theta * sin_theta * app
        + 2.0 * cos_theta * sin_theta * apq
        + cos_theta * cos_theta * aqq;
    a[[p, q]] = 0.0;
    a[[q, p]] = 0.0;

    for i in 0..n {
        if i != p && i != q {
            let aip = a[[i, p]];
            let aiq = a[[i, q]];

            a[[i, p]] = cos_theta * aip - sin_theta * aiq;
            a[[p, i]] = a[[i, p]];

            a[[i, q]] = sin_theta * aip + cos_theta * aiq;
            a[[q, i]] = a[[i, q]];
        }
    }

    for i in 0..n {
        let vip = v[[i, p]];
        let viq = v[[i, q]];

        v[[i, p]] = cos_theta * vip - sin_theta * viq;
        v[[i, q]] = sin_theta * vip + cos_theta * viq;
    }
}

/// Ratio of the largest to smallest eigenvalue of a symmetric matrix
///
/// Infinite when the smallest eigenvalue is (numerically) zero.
pub fn condition_number(matrix: &Array2<f64>) -> f64 {
    match jacobi_eigendecomp(matrix, 50, 1e-14) {
        Ok(decomp) if !decomp.eigenvalues.is_empty() => {
            let max_eig = decomp.eigenvalues[0];
            let min_eig = decomp.eigenvalues[decomp.eigenvalues.len() - 1];
            if min_eig.abs() <= 1e-15 * max_eig.abs().max(1.0) {
                f64::INFINITY
            } else {
                max_eig / min_eig
            }
        }
        _ => f64::INFINITY,
    }
}
