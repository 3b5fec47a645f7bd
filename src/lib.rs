//! Jam: storage-polymorphic numeric vectors and matrices
//!
//! **Jam** provides mutable numeric containers with pluggable storage, a
//! read-only view contract, zero-copy projections, a statistics layer, and
//! SVD/eigendecomposition wrappers over an external numeric backend:
//!
//! 1. **Views** - [`VectorView`]/[`MatrixView`] expose length/shape plus
//!    bounds-checked access; equality, arithmetic, streaming and
//!    materialization are derived.
//! 2. **Containers** - [`Vector`]/[`Matrix`] own one storage strategy at a
//!    time. Construction is explicit about ownership: `from_*` factories
//!    copy, `share` aliases a caller-owned buffer. Diagonal matrix storage
//!    transparently promotes itself to a general sparse store on the first
//!    non-zero off-diagonal write.
//! 3. **Derived layers** - statistics ([`Stat`], [`StatSummary`],
//!    [`QuantileCalculator`]) and decompositions ([`Svd`], [`Eigen`]) read
//!    through the view contract and never mutate.
//!
//! # Design Principles
//!
//! - **Representation transparency**: `get`/`set` behave identically across
//!   dense, diagonal, promoted-sparse and shared storage
//! - **Tolerance equality**: within-epsilon comparison is the primary
//!   equivalence for numeric containers; they implement neither `Eq` nor
//!   `Hash`
//! - **Eager validation**: views and operands are checked at construction
//!   or before any mutation, never at first use
//! - **Single-threaded by type**: the aliasing mode is `Rc`-based and
//!   `!Send`, so shared buffers cannot cross threads
//!
//! # Quick Start
//!
//! ```rust
//! use jam::{Matrix, MatrixView, Vector, VectorView};
//!
//! let mut v = Vector::parse("1, 2, 2").unwrap();
//! v.daxpy(2.0, &Vector::constant(1.0, 3)).unwrap();
//! assert_eq!(v.to_vec(), vec![3.0, 4.0, 4.0]);
//!
//! let m = Matrix::diagonal(&[1.0, 2.0, 3.0]);
//! let product = m.times(&v).unwrap();
//! assert_eq!(product.to_vec(), vec![3.0, 8.0, 12.0]);
//! ```

mod backend;
pub mod eigen;
pub mod error;
pub mod matrix;
pub mod stat;
pub mod storage;
pub mod svd;
pub mod tolerance;
pub mod vector;

pub use eigen::Eigen;
pub use error::{Error, Result};
pub use matrix::{
    ColView, DiagView, Matrix, MatrixElement, MatrixElements, MatrixView, NonZeroMatrixElements,
    RowView,
};
pub use stat::{
    Max, Mean, Median, Min, Norm1, Norm2, QuantileCalculator, Quantiles, Stat, StatSummary, Sum,
};
pub use storage::{shared_buffer, SharedBuffer};
pub use svd::Svd;
pub use tolerance::Tolerance;
pub use vector::{Elements, NonZeroElements, Vector, VectorElement, VectorView};
