//! Error types for jam operations

use thiserror::Error;

/// Result type for jam operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during jam operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// Vector index outside `[0, len)`
    #[error("index {index} out of bounds for vector of length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Length of the vector
        len: usize,
    },

    /// Matrix position outside the matrix shape
    #[error("position ({row}, {col}) out of bounds for {nrow}x{ncol} matrix")]
    PositionOutOfBounds {
        /// Requested row
        row: usize,
        /// Requested column
        col: usize,
        /// Number of rows
        nrow: usize,
        /// Number of columns
        ncol: usize,
    },

    /// Operand lengths disagree
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Matrix operand shapes are incompatible
    #[error("dimension mismatch: {left_rows}x{left_cols} is incompatible with {right_rows}x{right_cols}")]
    DimensionMismatch {
        /// Rows of the left operand
        left_rows: usize,
        /// Columns of the left operand
        left_cols: usize,
        /// Rows of the right operand
        right_rows: usize,
        /// Columns of the right operand
        right_cols: usize,
    },

    /// Square matrix required
    #[error("matrix is not square: {nrow}x{ncol}")]
    NotSquare {
        /// Number of rows
        nrow: usize,
        /// Number of columns
        ncol: usize,
    },

    /// Rescaling would divide by a near-zero sum or norm
    #[error("norm {norm} is too close to zero to rescale by")]
    NearZeroNorm {
        /// The offending sum or norm
        norm: f64,
    },

    /// Malformed numeric text during parsing
    #[error("invalid numeric token: {token:?}")]
    InvalidNumber {
        /// The token that failed to parse
        token: String,
    },

    /// Quantile probability outside `(0.0, 1.0]`
    #[error("quantile probability {value} is outside (0.0, 1.0]")]
    InvalidQuantile {
        /// The rejected probability
        value: f64,
    },

    /// No data where at least one value was required
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// Eigendecomposition found a non-real eigenvalue
    #[error("matrix has complex eigenvalues")]
    ComplexEigenvalues,

    /// No eigenvalue equal to 1.0 within tolerance
    #[error("no eigenvalue equal to 1.0 within tolerance")]
    NoUnitEigenvalue,

    /// Several eigenvalues equal to 1.0 within tolerance
    #[error("{count} eigenvalues equal to 1.0 within tolerance, expected exactly one")]
    AmbiguousUnitEigenvalue {
        /// How many eigenvalues matched
        count: usize,
    },

    /// The numeric backend failed
    #[error("backend failure: {0}")]
    Backend(String),
}
