//! Singular value decomposition with lazily-memoized factors
//!
//! [`Svd`] borrows the matrix it decomposes and computes nothing until a
//! factor is first requested; the factorization is then cached for the
//! decomposition's lifetime. Singular values at or below
//! [`Svd::singular_value_threshold`] are treated as numerically zero when
//! inverting, which turns [`Svd::invert`] into a true inverse for square
//! full-rank matrices and a Moore-Penrose style pseudo-inverse otherwise.
//!
//! # Example
//!
//! ```
//! use jam::{Matrix, MatrixView, Svd, Tolerance};
//!
//! let m = Matrix::from_vec(2, 2, vec![4.0, 7.0, 2.0, 6.0]).unwrap();
//! let svd = Svd::new(&m).unwrap();
//! let inverse = svd.invert().unwrap();
//!
//! let product = m.matmul(&inverse).unwrap();
//! assert!(product.equals(&Matrix::identity(2), Tolerance::new(1e-9)));
//! ```

use std::cell::OnceCell;

use crate::backend::{self, SvdFactors};
use crate::error::{Error, Result};
use crate::matrix::{Matrix, MatrixView};

/// Lazily-computed singular value decomposition of a borrowed matrix.
///
/// For an `M x N` input with `k = min(M, N)`: `U` is `M x k` with
/// orthonormal columns, `V` is `N x k`, and the `k` singular values are
/// non-increasing. The source matrix must outlive the decomposition; the
/// borrow makes that lifetime relation explicit.
pub struct Svd<'a> {
    matrix: &'a dyn MatrixView,
    factors: OnceCell<SvdFactors>,
}

impl<'a> Svd<'a> {
    /// Stages a decomposition of `matrix`. No factorization work happens
    /// until a factor is first requested.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyInput`] for a matrix with no cells.
    pub fn new(matrix: &'a dyn MatrixView) -> Result<Svd<'a>> {
        if matrix.is_empty() {
            return Err(Error::EmptyInput("cannot decompose an empty matrix"));
        }
        Ok(Svd {
            matrix,
            factors: OnceCell::new(),
        })
    }

    fn factors(&self) -> Result<&SvdFactors> {
        if let Some(factors) = self.factors.get() {
            return Ok(factors);
        }
        let computed = backend::svd_factors(self.matrix)?;
        Ok(self.factors.get_or_init(|| computed))
    }

    /// The column-orthogonal left factor `U` (`M x k`).
    pub fn u(&self) -> Result<&Matrix> {
        Ok(&self.factors()?.u)
    }

    /// The right factor `V` (`N x k`).
    pub fn v(&self) -> Result<&Matrix> {
        Ok(&self.factors()?.v)
    }

    /// Singular values in non-increasing order.
    pub fn singular_values(&self) -> Result<&[f64]> {
        Ok(&self.factors()?.singular_values)
    }

    /// Rank-deficiency cutoff:
    /// `0.5 * sqrt(M + N + 1) * max(singular values) * machine epsilon`.
    /// Singular values at or below this are treated as numerically zero.
    pub fn singular_value_threshold(&self) -> Result<f64> {
        let factors = self.factors()?;
        let largest = factors.singular_values.first().copied().unwrap_or(0.0);
        let (m, n) = self.matrix.shape();
        Ok(0.5 * ((m + n + 1) as f64).sqrt() * largest * f64::EPSILON)
    }

    /// Number of singular values above the threshold.
    pub fn rank(&self) -> Result<usize> {
        let threshold = self.singular_value_threshold()?;
        Ok(self
            .factors()?
            .singular_values
            .iter()
            .filter(|&&sigma| sigma > threshold)
            .count())
    }

    /// Computes `V * diag(1/sigma above threshold, else 0) * U^T`: the
    /// inverse for square full-rank input, the generalized (pseudo) inverse
    /// otherwise. Result shape is `N x M`.
    pub fn invert(&self) -> Result<Matrix> {
        let factors = self.factors()?;
        let threshold = self.singular_value_threshold()?;

        let mut scaled = factors.v.clone();
        for (j, &sigma) in factors.singular_values.iter().enumerate() {
            let recip = if sigma > threshold { 1.0 / sigma } else { 0.0 };
            for i in 0..scaled.nrow() {
                let value = scaled.get(i, j)? * recip;
                scaled.set(i, j, value)?;
            }
        }
        scaled.matmul(&factors.u.transpose())
    }
}
