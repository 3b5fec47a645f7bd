//! Eigendecomposition with real-spectrum validation
//!
//! [`Eigen`] accepts only matrices whose spectrum is entirely real and fails
//! immediately with [`Error::ComplexEigenvalues`] otherwise. Symmetric input
//! takes the specialized symmetric path and comes back with eigenvalues in
//! non-increasing order and unit-norm eigenvectors; the determinant family
//! and unique-unit-eigenvalue extraction are derived from the stored pairs.
//!
//! # Example
//!
//! ```
//! use jam::{Eigen, Matrix};
//!
//! let m = Matrix::from_vec(2, 2, vec![2.0, 1.0, 1.0, 2.0]).unwrap();
//! let eigen = Eigen::compute(&m).unwrap();
//!
//! let values = eigen.eigenvalues();
//! assert!((values[0] - 3.0).abs() < 1e-9);
//! assert!((values[1] - 1.0).abs() < 1e-9);
//! ```

use std::cmp::Ordering;

use crate::backend::{self, EigenPairs};
use crate::error::{Error, Result};
use crate::matrix::{Matrix, MatrixView};
use crate::tolerance::Tolerance;
use crate::vector::{Vector, VectorView};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Eigendecomposition of a square real-spectrum matrix.
///
/// Eigenvectors are stored as matrix columns; column `i` pairs with
/// `eigenvalues()[i]`.
#[derive(Debug, Clone)]
pub struct Eigen {
    values: Vec<f64>,
    vectors: Matrix,
    symmetric: bool,
    tol: Tolerance,
}

impl Eigen {
    /// Decomposes `matrix` under the default comparator.
    ///
    /// # Errors
    ///
    /// - [`Error::NotSquare`] for non-square input
    /// - [`Error::EmptyInput`] for a 0 x 0 matrix
    /// - [`Error::ComplexEigenvalues`] when the spectrum is not real
    pub fn compute(matrix: &dyn MatrixView) -> Result<Eigen> {
        Self::compute_with(matrix, Tolerance::default())
    }

    /// Decomposes `matrix` using `tol` for the symmetry test, the complex
    /// eigenvalue rejection, and later unit-eigenvalue matching.
    #[cfg_attr(feature = "tracing", instrument(skip(matrix, tol), fields(n = matrix.nrow())))]
    pub fn compute_with(matrix: &dyn MatrixView, tol: Tolerance) -> Result<Eigen> {
        if !matrix.is_square() {
            return Err(Error::NotSquare {
                nrow: matrix.nrow(),
                ncol: matrix.ncol(),
            });
        }
        if matrix.is_empty() {
            return Err(Error::EmptyInput("cannot decompose an empty matrix"));
        }

        let symmetric = matrix.is_symmetric(tol);
        let (values, vectors) = if symmetric {
            sorted_descending(backend::symmetric_eigen(matrix)?)
        } else {
            let pairs = backend::general_eigen(matrix, tol)?;
            (pairs.values, pairs.vectors)
        };

        let eigen = Eigen {
            values,
            vectors,
            symmetric,
            tol,
        };
        debug_assert!(
            eigen.pairs_are_consistent(matrix),
            "eigendecomposition violated A*v = lambda*v"
        );
        debug_assert!(
            !eigen.symmetric || eigen.symmetric_invariants_hold(),
            "symmetric eigendecomposition violated ordering or unit-norm invariants"
        );
        Ok(eigen)
    }

    /// Eigenvalues; non-increasing for symmetric input.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.values
    }

    /// Eigenvectors as matrix columns.
    pub fn eigenvectors(&self) -> &Matrix {
        &self.vectors
    }

    /// Copies eigenvector `i` out as a vector, or `None` past the end.
    pub fn eigenvector(&self, i: usize) -> Option<Vector> {
        if i >= self.values.len() {
            return None;
        }
        self.vectors
            .view_col(i)
            .ok()
            .map(|col| Vector::from_view(&col))
    }

    /// Number of eigenpairs.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when there are no eigenpairs.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when the decomposition took the symmetric path.
    pub fn symmetric(&self) -> bool {
        self.symmetric
    }

    /// Determinant as the product of eigenvalues.
    pub fn determinant(&self) -> f64 {
        self.values.iter().product()
    }

    /// Overflow-safe alternative to the determinant: the sum of
    /// `ln |eigenvalue|`.
    pub fn log_abs_determinant(&self) -> f64 {
        self.values.iter().map(|v| v.abs().ln()).sum()
    }

    /// Product of the eigenvalue signs.
    pub fn sign_determinant(&self) -> f64 {
        self.values
            .iter()
            .map(|v| {
                if *v > 0.0 {
                    1.0
                } else if *v < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            })
            .product()
    }

    /// Returns the eigenvector of the unique eigenvalue equal to 1.0 within
    /// tolerance, e.g. the stationary direction of a stochastic matrix.
    ///
    /// # Errors
    ///
    /// [`Error::NoUnitEigenvalue`] when no eigenvalue matches;
    /// [`Error::AmbiguousUnitEigenvalue`] when several do.
    pub fn unit_eigenvector(&self) -> Result<Vector> {
        let matches: Vec<usize> = self
            .values
            .iter()
            .enumerate()
            .filter(|(_, &value)| self.tol.eq(value, 1.0))
            .map(|(i, _)| i)
            .collect();
        match matches.len() {
            0 => Err(Error::NoUnitEigenvalue),
            1 => self
                .eigenvector(matches[0])
                .ok_or_else(|| Error::Backend("eigenvector column missing".to_string())),
            count => Err(Error::AmbiguousUnitEigenvalue { count }),
        }
    }

    /// Internal consistency: every pair satisfies `A*v ≈ lambda*v`.
    fn pairs_are_consistent(&self, matrix: &dyn MatrixView) -> bool {
        let scale = self
            .values
            .iter()
            .fold(1.0f64, |acc, v| acc.max(v.abs()));
        let check = Tolerance::new(1e-6 * scale);
        for (i, &lambda) in self.values.iter().enumerate() {
            let Some(v) = self.eigenvector(i) else {
                return false;
            };
            let Ok(av) = matrix.times(&v) else {
                return false;
            };
            if !av.equals(&v.scaled(lambda), check) {
                return false;
            }
        }
        true
    }

    /// Internal consistency for the symmetric path: non-increasing
    /// eigenvalues and unit-norm eigenvectors.
    fn symmetric_invariants_hold(&self) -> bool {
        for pair in self.values.windows(2) {
            if pair[0] < pair[1] {
                return false;
            }
        }
        (0..self.values.len()).all(|i| {
            self.eigenvector(i)
                .map(|v| (v.norm2() - 1.0).abs() < 1e-9)
                .unwrap_or(false)
        })
    }
}

/// Sorts eigenvalues in descending order and reorders the eigenvector
/// columns to match.
fn sorted_descending(pairs: EigenPairs) -> (Vec<f64>, Matrix) {
    let n = pairs.values.len();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&i, &j| {
        pairs.values[j]
            .partial_cmp(&pairs.values[i])
            .unwrap_or(Ordering::Equal)
    });

    let values: Vec<f64> = indices.iter().map(|&i| pairs.values[i]).collect();
    let mut data = vec![0.0; n * n];
    for (new_col, &old_col) in indices.iter().enumerate() {
        for row in 0..n {
            data[row * n + new_col] = pairs.vectors.get(row, old_col).unwrap_or(0.0);
        }
    }
    (values, Matrix::from_parts(n, n, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_2x2() {
        let m = Matrix::from_vec(2, 2, vec![2.0, 1.0, 1.0, 2.0]).unwrap();
        let eigen = Eigen::compute(&m).unwrap();

        assert!(eigen.symmetric());
        let values = eigen.eigenvalues();
        assert!((values[0] - 3.0).abs() < 1e-9);
        assert!((values[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_symmetric_eigenvalues_descending_and_unit_vectors() {
        let m = Matrix::from_vec(
            3,
            3,
            vec![4.0, 2.0, 0.0, 2.0, 5.0, 3.0, 0.0, 3.0, 6.0],
        )
        .unwrap();
        let eigen = Eigen::compute(&m).unwrap();

        let values = eigen.eigenvalues();
        for pair in values.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
        for i in 0..eigen.len() {
            let v = eigen.eigenvector(i).unwrap();
            assert!((v.norm2() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_diagonal_matrix_spectrum() {
        let m = Matrix::diagonal(&[5.0, 1.0, 3.0]);
        let eigen = Eigen::compute(&m).unwrap();
        assert_eq!(eigen.len(), 3);
        let values = eigen.eigenvalues();
        assert!((values[0] - 5.0).abs() < 1e-9);
        assert!((values[1] - 3.0).abs() < 1e-9);
        assert!((values[2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_square_rejected() {
        let m = Matrix::zeros(2, 3);
        assert_eq!(
            Eigen::compute(&m).unwrap_err(),
            Error::NotSquare { nrow: 2, ncol: 3 }
        );
    }

    #[test]
    fn test_empty_rejected() {
        let m = Matrix::zeros(0, 0);
        assert!(Eigen::compute(&m).is_err());
    }

    #[test]
    fn test_complex_spectrum_rejected() {
        // 90-degree rotation has eigenvalues +/- i
        let m = Matrix::from_vec(2, 2, vec![0.0, -1.0, 1.0, 0.0]).unwrap();
        assert_eq!(Eigen::compute(&m).unwrap_err(), Error::ComplexEigenvalues);
    }

    #[test]
    fn test_general_real_spectrum() {
        let m = Matrix::from_vec(2, 2, vec![1.0, 2.0, 0.0, 3.0]).unwrap();
        let eigen = Eigen::compute(&m).unwrap();
        assert!(!eigen.symmetric());

        let mut values = eigen.eigenvalues().to_vec();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((values[0] - 1.0).abs() < 1e-9);
        assert!((values[1] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_determinant_family() {
        let m = Matrix::from_vec(2, 2, vec![2.0, 1.0, 1.0, 2.0]).unwrap();
        let eigen = Eigen::compute(&m).unwrap();

        assert!((eigen.determinant() - 3.0).abs() < 1e-9);
        assert!((eigen.log_abs_determinant() - 3.0f64.ln()).abs() < 1e-9);
        assert_eq!(eigen.sign_determinant(), 1.0);
    }

    #[test]
    fn test_negative_eigenvalue_signs() {
        // eigenvalues 1 and -1
        let m = Matrix::from_vec(2, 2, vec![0.0, 1.0, 1.0, 0.0]).unwrap();
        let eigen = Eigen::compute(&m).unwrap();

        assert!((eigen.determinant() + 1.0).abs() < 1e-9);
        assert_eq!(eigen.sign_determinant(), -1.0);
        assert!(eigen.log_abs_determinant().abs() < 1e-9);
    }

    #[test]
    fn test_unit_eigenvector_of_stochastic_matrix() {
        // column-stochastic transition matrix; spectrum {1.0, 0.7}
        let m = Matrix::from_vec(2, 2, vec![0.9, 0.2, 0.1, 0.8]).unwrap();
        let eigen = Eigen::compute(&m).unwrap();

        let v = eigen.unit_eigenvector().unwrap();
        let mapped = m.times(&v).unwrap();
        assert!(mapped.equals(&v, Tolerance::new(1e-6)));
    }

    #[test]
    fn test_unit_eigenvector_absent() {
        let m = Matrix::diagonal(&[2.0, 3.0]);
        let eigen = Eigen::compute(&m).unwrap();
        assert_eq!(eigen.unit_eigenvector().unwrap_err(), Error::NoUnitEigenvalue);
    }

    #[test]
    fn test_unit_eigenvector_ambiguous() {
        let m = Matrix::identity(3);
        let eigen = Eigen::compute(&m).unwrap();
        assert_eq!(
            eigen.unit_eigenvector().unwrap_err(),
            Error::AmbiguousUnitEigenvalue { count: 3 }
        );
    }

    #[test]
    fn test_eigenvector_out_of_range() {
        let m = Matrix::identity(2);
        let eigen = Eigen::compute(&m).unwrap();
        assert!(eigen.eigenvector(5).is_none());
    }
}
