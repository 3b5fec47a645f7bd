//! Matrix view contract, the mutable matrix container, and projections
//!
//! [`MatrixView`] mirrors the vector contract in two dimensions: a fixed
//! shape plus bounds-checked element access, with multiplication, trace,
//! symmetry and streaming derived on top. [`Matrix`] owns one storage
//! strategy; dense, diagonal (with transparent promotion to sparse on the
//! first non-zero off-diagonal write), promoted sparse, and aliasing
//! wrappers all present identical `get`/`set` semantics.
//!
//! Data in dense and shared storage is row-major (C-style): for a 2x3
//! matrix `[[a, b, c], [d, e, f]]` the buffer is `[a, b, c, d, e, f]`.
//!
//! # Example
//!
//! ```
//! use jam::{Matrix, MatrixView};
//!
//! let m = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
//! let i = Matrix::identity(2);
//! let product = m.matmul(&i).unwrap();
//!
//! assert_eq!(product.get(1, 0).unwrap(), 3.0);
//! ```

use crate::error::{Error, Result};
use crate::storage::matrix::MatrixStorage;
use crate::storage::SharedBuffer;
use crate::tolerance::Tolerance;
use crate::vector::{Vector, VectorView};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A `(row, col, value)` triple produced when streaming a matrix's contents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixElement {
    /// Row index
    pub row: usize,
    /// Column index
    pub col: usize,
    /// Cell value
    pub value: f64,
}

/// Read-only contract over matrix-shaped numeric data.
///
/// `nrow`/`ncol` are fixed for the lifetime of a view; `get` is defined for
/// every in-shape position and fails with [`Error::PositionOutOfBounds`]
/// otherwise. Like vectors, matrix containers implement neither `Eq` nor
/// `Hash`.
pub trait MatrixView {
    /// Number of rows.
    fn nrow(&self) -> usize;

    /// Number of columns.
    fn ncol(&self) -> usize;

    /// Returns the cell at `(row, col)`.
    ///
    /// # Errors
    ///
    /// [`Error::PositionOutOfBounds`] if the position is outside the shape.
    fn get(&self, row: usize, col: usize) -> Result<f64>;

    /// Returns the shape as `(nrow, ncol)`.
    fn shape(&self) -> (usize, usize) {
        (self.nrow(), self.ncol())
    }

    /// True when the matrix has the same row and column count.
    fn is_square(&self) -> bool {
        self.nrow() == self.ncol()
    }

    /// True when the matrix has no cells.
    fn is_empty(&self) -> bool {
        self.nrow() == 0 || self.ncol() == 0
    }

    /// Shape-then-elementwise equality under the given comparator.
    fn equals(&self, other: &dyn MatrixView, tol: Tolerance) -> bool {
        if self.shape() != other.shape() {
            return false;
        }
        for r in 0..self.nrow() {
            for c in 0..self.ncol() {
                let (a, b) = match (self.get(r, c), other.get(r, c)) {
                    (Ok(a), Ok(b)) => (a, b),
                    _ => return false,
                };
                if !tol.eq(a, b) {
                    return false;
                }
            }
        }
        true
    }

    /// Matrix-vector product. Result length is `nrow()`.
    ///
    /// # Errors
    ///
    /// [`Error::LengthMismatch`] unless `vector.len() == ncol()`.
    fn times(&self, vector: &dyn VectorView) -> Result<Vector> {
        if vector.len() != self.ncol() {
            return Err(Error::LengthMismatch {
                expected: self.ncol(),
                actual: vector.len(),
            });
        }
        let mut out = Vec::with_capacity(self.nrow());
        for r in 0..self.nrow() {
            let mut acc = 0.0;
            for c in 0..self.ncol() {
                acc += self.get(r, c)? * vector.get(c)?;
            }
            out.push(acc);
        }
        Ok(Vector::from_vec(out))
    }

    /// Matrix-matrix product with the standard row-by-column definition.
    /// Result shape is `(self.nrow(), other.ncol())`.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] unless `self.ncol() == other.nrow()`.
    fn matmul(&self, other: &dyn MatrixView) -> Result<Matrix>
    where
        Self: Sized,
    {
        multiply(self, other)
    }

    /// Sum of the diagonal.
    ///
    /// # Errors
    ///
    /// [`Error::NotSquare`] for non-square matrices.
    fn trace(&self) -> Result<f64> {
        if !self.is_square() {
            return Err(Error::NotSquare {
                nrow: self.nrow(),
                ncol: self.ncol(),
            });
        }
        let mut acc = 0.0;
        for i in 0..self.nrow() {
            acc += self.get(i, i)?;
        }
        Ok(acc)
    }

    /// Tolerance-based symmetry test. Non-square matrices are never
    /// symmetric.
    fn is_symmetric(&self, tol: Tolerance) -> bool {
        if !self.is_square() {
            return false;
        }
        for r in 0..self.nrow() {
            for c in (r + 1)..self.ncol() {
                let (a, b) = match (self.get(r, c), self.get(c, r)) {
                    (Ok(a), Ok(b)) => (a, b),
                    _ => return false,
                };
                if !tol.eq(a, b) {
                    return false;
                }
            }
        }
        true
    }

    /// Returns the transpose as a new dense matrix.
    fn transpose(&self) -> Matrix {
        let mut data = Vec::with_capacity(self.nrow() * self.ncol());
        for c in 0..self.ncol() {
            for r in 0..self.nrow() {
                data.push(self.get(r, c).unwrap_or(0.0));
            }
        }
        Matrix::from_parts(self.ncol(), self.nrow(), data)
    }

    /// Zero-copy projection of one row as a [`VectorView`].
    ///
    /// Bounds are validated here, at construction, never at first use.
    ///
    /// # Errors
    ///
    /// [`Error::PositionOutOfBounds`] if `row >= nrow()`.
    fn view_row(&self, row: usize) -> Result<RowView<'_>>
    where
        Self: Sized,
    {
        if row >= self.nrow() {
            return Err(Error::PositionOutOfBounds {
                row,
                col: 0,
                nrow: self.nrow(),
                ncol: self.ncol(),
            });
        }
        Ok(RowView { matrix: self, row })
    }

    /// Zero-copy projection of one column as a [`VectorView`].
    ///
    /// # Errors
    ///
    /// [`Error::PositionOutOfBounds`] if `col >= ncol()`.
    fn view_col(&self, col: usize) -> Result<ColView<'_>>
    where
        Self: Sized,
    {
        if col >= self.ncol() {
            return Err(Error::PositionOutOfBounds {
                row: 0,
                col,
                nrow: self.nrow(),
                ncol: self.ncol(),
            });
        }
        Ok(ColView { matrix: self, col })
    }

    /// Zero-copy projection of the diagonal as a [`VectorView`].
    ///
    /// # Errors
    ///
    /// [`Error::NotSquare`] for non-square matrices.
    fn view_diag(&self) -> Result<DiagView<'_>>
    where
        Self: Sized,
    {
        if !self.is_square() {
            return Err(Error::NotSquare {
                nrow: self.nrow(),
                ncol: self.ncol(),
            });
        }
        Ok(DiagView { matrix: self })
    }

    /// Streams `(row, col, value)` triples in row-major order.
    fn elements(&self) -> MatrixElements<'_>
    where
        Self: Sized,
    {
        MatrixElements {
            view: self,
            row: 0,
            col: 0,
        }
    }

    /// Streams only the cells with non-zero value.
    fn non_zero_elements(&self) -> NonZeroMatrixElements<'_>
    where
        Self: Sized,
    {
        NonZeroMatrixElements {
            inner: self.elements(),
        }
    }

    /// Materializes the contents as a row-major array.
    fn to_dense(&self) -> Vec<f64> {
        let mut data = Vec::with_capacity(self.nrow() * self.ncol());
        for r in 0..self.nrow() {
            for c in 0..self.ncol() {
                data.push(self.get(r, c).unwrap_or(0.0));
            }
        }
        data
    }
}

/// Row-by-column matrix product.
#[cfg_attr(
    feature = "tracing",
    instrument(
        skip(left, right),
        fields(dims = %format!("{}x{} @ {}x{}", left.nrow(), left.ncol(), right.nrow(), right.ncol()))
    )
)]
pub(crate) fn multiply(left: &dyn MatrixView, right: &dyn MatrixView) -> Result<Matrix> {
    if left.ncol() != right.nrow() {
        return Err(Error::DimensionMismatch {
            left_rows: left.nrow(),
            left_cols: left.ncol(),
            right_rows: right.nrow(),
            right_cols: right.ncol(),
        });
    }
    let (m, k, n) = (left.nrow(), left.ncol(), right.ncol());
    let mut data = vec![0.0; m * n];
    for r in 0..m {
        for inner in 0..k {
            let l = left.get(r, inner)?;
            if l == 0.0 {
                continue;
            }
            for c in 0..n {
                data[r * n + c] += l * right.get(inner, c)?;
            }
        }
    }
    Ok(Matrix::from_parts(m, n, data))
}

/// Iterator over a matrix view's `(row, col, value)` triples.
pub struct MatrixElements<'a> {
    view: &'a dyn MatrixView,
    row: usize,
    col: usize,
}

impl Iterator for MatrixElements<'_> {
    type Item = MatrixElement;

    fn next(&mut self) -> Option<MatrixElement> {
        if self.row >= self.view.nrow() || self.view.ncol() == 0 {
            return None;
        }
        let value = self.view.get(self.row, self.col).ok()?;
        let element = MatrixElement {
            row: self.row,
            col: self.col,
            value,
        };
        self.col += 1;
        if self.col == self.view.ncol() {
            self.col = 0;
            self.row += 1;
        }
        Some(element)
    }
}

/// Iterator over a matrix view's non-zero `(row, col, value)` triples.
pub struct NonZeroMatrixElements<'a> {
    inner: MatrixElements<'a>,
}

impl Iterator for NonZeroMatrixElements<'_> {
    type Item = MatrixElement;

    fn next(&mut self) -> Option<MatrixElement> {
        self.inner.find(|e| e.value != 0.0)
    }
}

/// Mutable numeric matrix over a pluggable storage strategy.
///
/// The `from_*` factories copy into independent storage; [`Matrix::share`]
/// aliases a caller-owned row-major buffer; [`Matrix::diagonal`] starts in
/// diagonal storage and upgrades itself transparently when a write pattern
/// requires a general representation.
///
/// # Examples
///
/// ```
/// use jam::{Matrix, MatrixView};
///
/// let mut m = Matrix::diagonal(&[1.0, 2.0]);
/// assert!(m.is_diagonal_storage());
///
/// // First non-zero off-diagonal write promotes the representation.
/// m.set(0, 1, 5.0).unwrap();
/// assert!(!m.is_diagonal_storage());
/// assert_eq!(m.get(0, 1).unwrap(), 5.0);
/// assert_eq!(m.get(1, 1).unwrap(), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct Matrix {
    nrow: usize,
    ncol: usize,
    storage: MatrixStorage,
}

impl Matrix {
    /// Creates a zero-filled dense matrix.
    pub fn zeros(nrow: usize, ncol: usize) -> Self {
        Matrix {
            nrow,
            ncol,
            storage: MatrixStorage::Dense(vec![0.0; nrow * ncol]),
        }
    }

    /// Creates the `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        Matrix {
            nrow: n,
            ncol: n,
            storage: MatrixStorage::Dense(data),
        }
    }

    /// Creates a dense matrix from a row-major buffer.
    ///
    /// # Errors
    ///
    /// [`Error::LengthMismatch`] if `data.len() != nrow * ncol`.
    pub fn from_vec(nrow: usize, ncol: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != nrow * ncol {
            return Err(Error::LengthMismatch {
                expected: nrow * ncol,
                actual: data.len(),
            });
        }
        Ok(Matrix {
            nrow,
            ncol,
            storage: MatrixStorage::Dense(data),
        })
    }

    /// Creates a dense matrix by copying rows.
    ///
    /// # Errors
    ///
    /// [`Error::LengthMismatch`] if the rows have unequal lengths.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let nrow = rows.len();
        let ncol = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(nrow * ncol);
        for row in rows {
            if row.len() != ncol {
                return Err(Error::LengthMismatch {
                    expected: ncol,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Matrix {
            nrow,
            ncol,
            storage: MatrixStorage::Dense(data),
        })
    }

    /// Creates a dense matrix by copying any view.
    pub fn from_view(view: &dyn MatrixView) -> Self {
        Matrix::from_parts(view.nrow(), view.ncol(), view.to_dense())
    }

    /// Creates a square matrix in diagonal storage. Only the diagonal is
    /// physically stored until a non-zero off-diagonal write promotes the
    /// representation.
    pub fn diagonal(values: &[f64]) -> Self {
        Matrix {
            nrow: values.len(),
            ncol: values.len(),
            storage: MatrixStorage::Diagonal(values.to_vec()),
        }
    }

    /// Creates a matrix that aliases a caller-owned row-major buffer.
    ///
    /// Mutations through this matrix are visible through every other handle
    /// on the buffer, and vice versa. The buffer must not be resized while
    /// wrapped.
    ///
    /// # Errors
    ///
    /// [`Error::LengthMismatch`] if the buffer length is not `nrow * ncol`.
    pub fn share(nrow: usize, ncol: usize, buffer: SharedBuffer) -> Result<Self> {
        let len = buffer.borrow().len();
        if len != nrow * ncol {
            return Err(Error::LengthMismatch {
                expected: nrow * ncol,
                actual: len,
            });
        }
        Ok(Matrix {
            nrow,
            ncol,
            storage: MatrixStorage::Shared(buffer),
        })
    }

    /// Internal constructor for buffers whose length is already correct.
    pub(crate) fn from_parts(nrow: usize, ncol: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), nrow * ncol);
        Matrix {
            nrow,
            ncol,
            storage: MatrixStorage::Dense(data),
        }
    }

    /// Sets the cell at `(row, col)`.
    ///
    /// On diagonal storage, a non-zero off-diagonal value transparently
    /// promotes the representation to a general sparse store seeded from the
    /// current diagonal; a zero off-diagonal value is a no-op. The promotion
    /// is irreversible.
    ///
    /// # Errors
    ///
    /// [`Error::PositionOutOfBounds`] if the position is outside the shape.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        self.check_position(row, col)?;
        self.storage
            .write(row, col, self.ncol, value, Tolerance::default());
        Ok(())
    }

    /// True while the matrix is physically dense.
    pub fn is_dense_storage(&self) -> bool {
        self.storage.is_dense()
    }

    /// True while the matrix physically stores only its diagonal.
    pub fn is_diagonal_storage(&self) -> bool {
        self.storage.is_diagonal()
    }

    /// True once diagonal storage has been promoted to the general sparse
    /// representation.
    pub fn is_sparse_storage(&self) -> bool {
        self.storage.is_sparse()
    }

    fn check_position(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.nrow || col >= self.ncol {
            return Err(Error::PositionOutOfBounds {
                row,
                col,
                nrow: self.nrow,
                ncol: self.ncol,
            });
        }
        Ok(())
    }
}

impl MatrixView for Matrix {
    fn nrow(&self) -> usize {
        self.nrow
    }

    fn ncol(&self) -> usize {
        self.ncol
    }

    fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.check_position(row, col)?;
        Ok(self.storage.read(row, col, self.ncol))
    }
}

/// Tolerance equality under the default comparator. Deliberately not
/// accompanied by `Eq` or `Hash`.
impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, Tolerance::default())
    }
}

impl std::fmt::Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for r in 0..self.nrow {
            if r > 0 {
                write!(f, "; ")?;
            }
            for c in 0..self.ncol {
                if c > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.storage.read(r, c, self.ncol))?;
            }
        }
        write!(f, "]")
    }
}

/// Zero-copy view of one matrix row. Holds a back-reference and an index,
/// never data; the matrix must outlive the view (enforced by the borrow).
pub struct RowView<'a> {
    matrix: &'a dyn MatrixView,
    row: usize,
}

impl VectorView for RowView<'_> {
    fn len(&self) -> usize {
        self.matrix.ncol()
    }

    fn get(&self, index: usize) -> Result<f64> {
        if index >= self.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        self.matrix.get(self.row, index)
    }
}

/// Zero-copy view of one matrix column.
pub struct ColView<'a> {
    matrix: &'a dyn MatrixView,
    col: usize,
}

impl VectorView for ColView<'_> {
    fn len(&self) -> usize {
        self.matrix.nrow()
    }

    fn get(&self, index: usize) -> Result<f64> {
        if index >= self.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        self.matrix.get(index, self.col)
    }
}

/// Zero-copy view of a square matrix's diagonal.
pub struct DiagView<'a> {
    matrix: &'a dyn MatrixView,
}

impl std::fmt::Debug for DiagView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagView")
            .field("nrow", &self.matrix.nrow())
            .field("ncol", &self.matrix.ncol())
            .finish()
    }
}

impl VectorView for DiagView<'_> {
    fn len(&self) -> usize {
        self.matrix.nrow()
    }

    fn get(&self, index: usize) -> Result<f64> {
        if index >= self.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        self.matrix.get(index, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::shared_buffer;
    use std::rc::Rc;

    #[test]
    fn test_zeros() {
        let m = Matrix::zeros(2, 3);
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.get(1, 2).unwrap(), 0.0);
        assert!(m.is_dense_storage());
    }

    #[test]
    fn test_identity() {
        let m = Matrix::identity(3);
        assert_eq!(m.get(0, 0).unwrap(), 1.0);
        assert_eq!(m.get(0, 1).unwrap(), 0.0);
        assert_eq!(m.get(2, 2).unwrap(), 1.0);
    }

    #[test]
    fn test_from_vec_invalid_size() {
        let result = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0]);
        assert_eq!(
            result.unwrap_err(),
            Error::LengthMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_from_rows() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.get(1, 0).unwrap(), 3.0);
    }

    #[test]
    fn test_from_rows_ragged() {
        let result = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_view_copies() {
        let source = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut copy = Matrix::from_view(&source);
        copy.set(0, 0, 9.0).unwrap();
        assert_eq!(source.get(0, 0).unwrap(), 1.0);
    }

    #[test]
    fn test_get_out_of_bounds() {
        let m = Matrix::zeros(2, 2);
        assert_eq!(
            m.get(2, 0).unwrap_err(),
            Error::PositionOutOfBounds {
                row: 2,
                col: 0,
                nrow: 2,
                ncol: 2
            }
        );
    }

    #[test]
    fn test_share_aliases_both_ways() {
        let buf = shared_buffer(vec![1.0, 2.0, 3.0, 4.0]);
        let mut m = Matrix::share(2, 2, Rc::clone(&buf)).unwrap();

        m.set(0, 1, 9.0).unwrap();
        assert_eq!(buf.borrow()[1], 9.0);

        buf.borrow_mut()[2] = 7.0;
        assert_eq!(m.get(1, 0).unwrap(), 7.0);
    }

    #[test]
    fn test_share_wrong_buffer_length() {
        let buf = shared_buffer(vec![1.0, 2.0, 3.0]);
        assert!(Matrix::share(2, 2, buf).is_err());
    }

    #[test]
    fn test_diagonal_get() {
        let m = Matrix::diagonal(&[1.0, 2.0, 3.0]);
        assert_eq!(m.get(1, 1).unwrap(), 2.0);
        assert_eq!(m.get(0, 2).unwrap(), 0.0);
        assert!(m.is_diagonal_storage());
    }

    #[test]
    fn test_diagonal_promotion_on_off_diagonal_write() {
        let mut m = Matrix::diagonal(&[1.0, 2.0, 3.0]);
        m.set(0, 1, 5.0).unwrap();

        assert!(!m.is_diagonal_storage());
        assert!(m.is_sparse_storage());
        assert_eq!(m.get(0, 1).unwrap(), 5.0);
        // originally-diagonal entries survive the promotion
        assert_eq!(m.get(0, 0).unwrap(), 1.0);
        assert_eq!(m.get(1, 1).unwrap(), 2.0);
        assert_eq!(m.get(2, 2).unwrap(), 3.0);
    }

    #[test]
    fn test_diagonal_zero_write_does_not_promote() {
        let mut m = Matrix::diagonal(&[1.0, 2.0]);
        m.set(0, 1, 0.0).unwrap();
        assert!(m.is_diagonal_storage());
    }

    #[test]
    fn test_diagonal_write_on_diagonal_does_not_promote() {
        let mut m = Matrix::diagonal(&[1.0, 2.0]);
        m.set(1, 1, 9.0).unwrap();
        assert!(m.is_diagonal_storage());
        assert_eq!(m.get(1, 1).unwrap(), 9.0);
    }

    #[test]
    fn test_matmul_basic() {
        let a = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Matrix::from_vec(2, 2, vec![5.0, 6.0, 7.0, 8.0]).unwrap();
        let c = a.matmul(&b).unwrap();

        assert_eq!(c.get(0, 0).unwrap(), 19.0);
        assert_eq!(c.get(0, 1).unwrap(), 22.0);
        assert_eq!(c.get(1, 0).unwrap(), 43.0);
        assert_eq!(c.get(1, 1).unwrap(), 50.0);
    }

    #[test]
    fn test_matmul_identity() {
        let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let product = m.matmul(&Matrix::identity(3)).unwrap();
        assert!(product.equals(&m, Tolerance::default()));
    }

    #[test]
    fn test_matmul_dimension_mismatch() {
        let a = Matrix::zeros(2, 3);
        let b = Matrix::zeros(2, 2);
        assert_eq!(
            a.matmul(&b).unwrap_err(),
            Error::DimensionMismatch {
                left_rows: 2,
                left_cols: 3,
                right_rows: 2,
                right_cols: 2
            }
        );
    }

    #[test]
    fn test_matmul_with_diagonal_storage() {
        let d = Matrix::diagonal(&[2.0, 3.0]);
        let m = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let product = d.matmul(&m).unwrap();
        assert_eq!(product.get(0, 1).unwrap(), 4.0);
        assert_eq!(product.get(1, 0).unwrap(), 9.0);
    }

    #[test]
    fn test_times_vector() {
        let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let v = Vector::from_slice(&[1.0, 0.0, -1.0]);
        let result = m.times(&v).unwrap();
        assert_eq!(result.to_vec(), vec![-2.0, -2.0]);
    }

    #[test]
    fn test_times_length_mismatch() {
        let m = Matrix::zeros(2, 3);
        let v = Vector::zeros(2);
        assert_eq!(
            m.times(&v).unwrap_err(),
            Error::LengthMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_trace() {
        let m = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(m.trace().unwrap(), 5.0);
    }

    #[test]
    fn test_trace_non_square() {
        let m = Matrix::zeros(2, 3);
        assert_eq!(m.trace().unwrap_err(), Error::NotSquare { nrow: 2, ncol: 3 });
    }

    #[test]
    fn test_is_symmetric() {
        let s = Matrix::from_vec(2, 2, vec![1.0, 5.0, 5.0, 2.0]).unwrap();
        assert!(s.is_symmetric(Tolerance::default()));

        let a = Matrix::from_vec(2, 2, vec![1.0, 5.0, 4.0, 2.0]).unwrap();
        assert!(!a.is_symmetric(Tolerance::default()));
    }

    #[test]
    fn test_non_square_never_symmetric() {
        let m = Matrix::zeros(2, 3);
        assert!(!m.is_symmetric(Tolerance::default()));
    }

    #[test]
    fn test_transpose() {
        let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let t = m.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.get(0, 1).unwrap(), 4.0);
        assert_eq!(t.get(2, 0).unwrap(), 3.0);
    }

    #[test]
    fn test_view_row() {
        let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let row = m.view_row(1).unwrap();
        assert_eq!(row.len(), 3);
        assert_eq!(row.to_vec(), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_view_row_validates_eagerly() {
        let m = Matrix::zeros(2, 3);
        assert!(m.view_row(2).is_err());
    }

    #[test]
    fn test_view_col() {
        let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let col = m.view_col(2).unwrap();
        assert_eq!(col.to_vec(), vec![3.0, 6.0]);
    }

    #[test]
    fn test_view_col_validates_eagerly() {
        let m = Matrix::zeros(2, 3);
        assert!(m.view_col(3).is_err());
    }

    #[test]
    fn test_view_diag() {
        let m = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let diag = m.view_diag().unwrap();
        assert_eq!(diag.to_vec(), vec![1.0, 4.0]);
    }

    #[test]
    fn test_view_diag_requires_square() {
        let m = Matrix::zeros(2, 3);
        assert_eq!(
            m.view_diag().unwrap_err(),
            Error::NotSquare { nrow: 2, ncol: 3 }
        );
    }

    #[test]
    fn test_views_reflect_current_data() {
        let mut m = Matrix::zeros(2, 2);
        m.set(0, 1, 5.0).unwrap();
        let row = m.view_row(0).unwrap();
        assert_eq!(row.get(1).unwrap(), 5.0);
    }

    #[test]
    fn test_view_out_of_range_get() {
        let m = Matrix::zeros(2, 3);
        let row = m.view_row(0).unwrap();
        assert_eq!(
            row.get(3).unwrap_err(),
            Error::IndexOutOfBounds { index: 3, len: 3 }
        );
    }

    #[test]
    fn test_elements_row_major() {
        let m = Matrix::from_vec(2, 2, vec![1.0, 0.0, 0.0, 4.0]).unwrap();
        let all: Vec<MatrixElement> = m.elements().collect();
        assert_eq!(all.len(), 4);
        assert_eq!(all[2].row, 1);
        assert_eq!(all[2].col, 0);

        let non_zero: Vec<MatrixElement> = m.non_zero_elements().collect();
        assert_eq!(non_zero.len(), 2);
        assert_eq!(non_zero[1].value, 4.0);
    }

    #[test]
    fn test_equality_tolerance() {
        let a = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Matrix::from_vec(2, 2, vec![1.0 + 1e-12, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(a, b);

        let c = Matrix::zeros(2, 3);
        assert!(!a.equals(&c, Tolerance::default()));
    }

    #[test]
    fn test_display() {
        let m = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(m.to_string(), "[1, 2; 3, 4]");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_matmul_identity_property(
            n in 1usize..6,
            data in prop::collection::vec(-100.0f64..100.0, 36)
        ) {
            let m = Matrix::from_vec(n, n, data[..n * n].to_vec()).unwrap();
            let product = m.matmul(&Matrix::identity(n)).unwrap();
            prop_assert!(product.equals(&m, Tolerance::default()));
        }

        #[test]
        fn test_transpose_involution(
            rows in 1usize..5,
            cols in 1usize..5,
            data in prop::collection::vec(-100.0f64..100.0, 16)
        ) {
            let m = Matrix::from_vec(rows, cols, data[..rows * cols].to_vec()).unwrap();
            let tt = m.transpose().transpose();
            prop_assert!(tt.equals(&m, Tolerance::default()));
        }

        #[test]
        fn test_promotion_is_representation_transparent(
            n in 2usize..5,
            diag in prop::collection::vec(-10.0f64..10.0, 5),
            value in 0.1f64..10.0
        ) {
            let mut promoted = Matrix::diagonal(&diag[..n]);
            promoted.set(0, 1, value).unwrap();

            let mut dense = Matrix::zeros(n, n);
            for i in 0..n {
                dense.set(i, i, diag[i]).unwrap();
            }
            dense.set(0, 1, value).unwrap();

            prop_assert!(promoted.equals(&dense, Tolerance::default()));
        }
    }
}
