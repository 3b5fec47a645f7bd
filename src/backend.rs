//! Numeric backend bridge
//!
//! The decomposition and quantile layers consume an opaque numeric engine:
//! dense conversion, SVD with non-increasing singular values,
//! eigendecomposition that signals complex eigenvalues, and percentile
//! evaluation over a flat array. This is the only module that names the
//! engines (nalgebra, statrs); everything above it sees just that contract.

use nalgebra::{DMatrix, DVector, Dyn, LU};
use statrs::statistics::{Data, OrderStatistics};

use crate::error::{Error, Result};
use crate::matrix::{Matrix, MatrixView};
use crate::tolerance::Tolerance;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Iteration cap for eigenvector refinement. Inverse iteration converges in
/// a handful of steps when the shift is an eigenvalue.
const INVERSE_ITERATION_LIMIT: usize = 32;

/// Thin SVD factors: for an `M x N` input with `k = min(M, N)`, `u` is
/// `M x k` column-orthogonal, `v` is `N x k`, singular values are
/// non-increasing.
pub(crate) struct SvdFactors {
    pub u: Matrix,
    pub v: Matrix,
    pub singular_values: Vec<f64>,
}

/// Eigenvalues with eigenvectors as matrix columns, in backend order.
#[derive(Debug)]
pub(crate) struct EigenPairs {
    pub values: Vec<f64>,
    pub vectors: Matrix,
}

pub(crate) fn to_backend_matrix(m: &dyn MatrixView) -> DMatrix<f64> {
    DMatrix::from_fn(m.nrow(), m.ncol(), |r, c| m.get(r, c).unwrap_or(0.0))
}

pub(crate) fn from_backend_matrix(m: &DMatrix<f64>) -> Matrix {
    let mut data = Vec::with_capacity(m.nrows() * m.ncols());
    for r in 0..m.nrows() {
        for c in 0..m.ncols() {
            data.push(m[(r, c)]);
        }
    }
    Matrix::from_parts(m.nrows(), m.ncols(), data)
}

/// Factorizes `m` into thin SVD factors.
#[cfg_attr(
    feature = "tracing",
    instrument(skip(m), fields(shape = ?(m.nrow(), m.ncol())))
)]
pub(crate) fn svd_factors(m: &dyn MatrixView) -> Result<SvdFactors> {
    let svd = to_backend_matrix(m).svd(true, true);
    let u = svd
        .u
        .ok_or_else(|| Error::Backend("SVD produced no U factor".to_string()))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| Error::Backend("SVD produced no V factor".to_string()))?;
    Ok(SvdFactors {
        u: from_backend_matrix(&u),
        v: from_backend_matrix(&v_t.transpose()),
        singular_values: svd.singular_values.iter().copied().collect(),
    })
}

/// Eigendecomposition specialized for symmetric input. Eigenvalues are real
/// by construction; eigenvectors come back orthonormal and in backend order.
#[cfg_attr(feature = "tracing", instrument(skip(m), fields(n = m.nrow())))]
pub(crate) fn symmetric_eigen(m: &dyn MatrixView) -> Result<EigenPairs> {
    let eigen = nalgebra::SymmetricEigen::try_new(to_backend_matrix(m), f64::EPSILON, 0)
        .ok_or_else(|| {
            Error::Backend("symmetric eigendecomposition did not converge".to_string())
        })?;
    Ok(EigenPairs {
        values: eigen.eigenvalues.iter().copied().collect(),
        vectors: from_backend_matrix(&eigen.eigenvectors),
    })
}

/// General eigendecomposition. Fails with [`Error::ComplexEigenvalues`] as
/// soon as the engine reports a non-real eigenvalue; eigenvectors for the
/// real spectrum are recovered by inverse iteration against the engine's LU
/// solver.
#[cfg_attr(feature = "tracing", instrument(skip(m, tol), fields(n = m.nrow())))]
pub(crate) fn general_eigen(m: &dyn MatrixView, tol: Tolerance) -> Result<EigenPairs> {
    let a = to_backend_matrix(m);
    let complex = a.complex_eigenvalues();

    let mut values = Vec::with_capacity(complex.len());
    for z in complex.iter() {
        if !tol.is_zero(z.im) {
            return Err(Error::ComplexEigenvalues);
        }
        values.push(z.re);
    }

    let n = a.nrows();
    let mut columns = vec![0.0; n * n];
    for (j, &lambda) in values.iter().enumerate() {
        let v = inverse_iteration(&a, lambda);
        for i in 0..n {
            columns[i * n + j] = v[i];
        }
    }

    Ok(EigenPairs {
        values,
        vectors: Matrix::from_parts(n, n, columns),
    })
}

/// Refines a unit eigenvector for `lambda` by inverse iteration.
///
/// A fixed start vector can land exactly on a different eigenvector (the
/// all-ones vector is one for any constant-row-sum matrix), so a varied
/// start is tried first and each basis vector after it, keeping the iterate
/// with the smallest residual `||A*v - lambda*v||`.
fn inverse_iteration(a: &DMatrix<f64>, lambda: f64) -> DVector<f64> {
    let n = a.nrows();
    let scale = a.norm().max(1.0);

    // An exactly singular shift has no LU solution; nudge off the
    // eigenvalue until the factorization solves.
    let mut shift = lambda;
    let mut lu = shifted_lu(a, shift);
    let probe = DVector::from_fn(n, |i, _| (i + 1) as f64);
    let mut attempts = 0;
    while lu.solve(&probe).is_none() && attempts < 8 {
        shift += 1e-10 * scale;
        lu = shifted_lu(a, shift);
        attempts += 1;
    }

    let mut best: Option<(f64, DVector<f64>)> = None;
    for k in 0..=n {
        let mut v = if k == 0 {
            DVector::from_fn(n, |i, _| 1.0 + i as f64)
        } else {
            let mut basis = DVector::zeros(n);
            basis[k - 1] = 1.0;
            basis
        };
        let norm = v.norm();
        v /= norm;

        for _ in 0..INVERSE_ITERATION_LIMIT {
            let Some(mut next) = lu.solve(&v) else {
                break;
            };
            let norm = next.norm();
            if norm == 0.0 {
                break;
            }
            next /= norm;
            // The iterate's sign may alternate; compare against both.
            let delta = (&next - &v).norm().min((&next + &v).norm());
            v = next;
            if delta < 1e-13 {
                break;
            }
        }

        let residual = (a * &v - &v * lambda).norm();
        if residual <= 1e-10 * scale {
            return v;
        }
        if best.as_ref().map_or(true, |(r, _)| residual < *r) {
            best = Some((residual, v));
        }
    }
    best.map(|(_, v)| v).unwrap_or_else(|| DVector::zeros(n))
}

fn shifted_lu(a: &DMatrix<f64>, shift: f64) -> LU<f64, Dyn, Dyn> {
    let mut shifted = a.clone();
    for i in 0..a.nrows() {
        shifted[(i, i)] -= shift;
    }
    shifted.lu()
}

/// Evaluates the `tau`-quantile of `values` with the statrs order-statistics
/// engine. Callers validate `tau` and filter non-finite values first.
pub(crate) fn percentile(values: &[f64], tau: f64) -> f64 {
    let mut data = Data::new(values.to_vec());
    data.quantile(tau)
}
