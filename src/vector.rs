//! Vector view contract and the mutable vector container
//!
//! [`VectorView`] is the read-only capability every vector-shaped value
//! implements: a fixed length plus bounds-checked element access. Everything
//! else (tolerance equality, arithmetic producing new vectors, streaming,
//! materialization) is derived from those two operations. [`Vector`] is the
//! mutable container, owning one storage strategy and exposing in-place
//! mutation on top of the view contract.
//!
//! # Example
//!
//! ```
//! use jam::{Vector, VectorView};
//!
//! let a = Vector::from_slice(&[1.0, 2.0, 3.0]);
//! let b = Vector::parse("4, 5, 6").unwrap();
//! let sum = a.plus(&b).unwrap();
//!
//! assert_eq!(sum.to_vec(), vec![5.0, 7.0, 9.0]);
//! ```

use crate::error::{Error, Result};
use crate::storage::vector::VectorStorage;
use crate::storage::SharedBuffer;
use crate::tolerance::Tolerance;

/// An `(index, value)` pair produced when streaming a vector's contents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorElement {
    /// Element index
    pub index: usize,
    /// Element value
    pub value: f64,
}

/// Read-only contract over vector-shaped numeric data.
///
/// `len` is fixed for the lifetime of a view, and `get` is defined for every
/// index in `[0, len)`; out-of-range access fails with
/// [`Error::IndexOutOfBounds`]. All other operations are derived.
///
/// Mutable containers implementing this trait deliberately implement neither
/// `Eq` nor `Hash`: their value changes after construction, which would
/// violate hash-table invariants. Tolerance equality ([`VectorView::equals`])
/// is the primary equivalence relation.
pub trait VectorView {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfBounds`] if `index >= len()`.
    fn get(&self, index: usize) -> Result<f64>;

    /// True when the vector has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shape-then-elementwise equality under the given comparator.
    fn equals(&self, other: &dyn VectorView, tol: Tolerance) -> bool {
        if self.len() != other.len() {
            return false;
        }
        for i in 0..self.len() {
            let (a, b) = match (self.get(i), other.get(i)) {
                (Ok(a), Ok(b)) => (a, b),
                _ => return false,
            };
            if !tol.eq(a, b) {
                return false;
            }
        }
        true
    }

    /// Elementwise sum producing a new vector.
    ///
    /// # Errors
    ///
    /// [`Error::LengthMismatch`] if the operand lengths differ.
    fn plus(&self, other: &dyn VectorView) -> Result<Vector> {
        check_same_len(self.len(), other.len())?;
        let mut data = Vec::with_capacity(self.len());
        for i in 0..self.len() {
            data.push(self.get(i)? + other.get(i)?);
        }
        Ok(Vector::from_vec(data))
    }

    /// Elementwise difference producing a new vector.
    ///
    /// # Errors
    ///
    /// [`Error::LengthMismatch`] if the operand lengths differ.
    fn minus(&self, other: &dyn VectorView) -> Result<Vector> {
        check_same_len(self.len(), other.len())?;
        let mut data = Vec::with_capacity(self.len());
        for i in 0..self.len() {
            data.push(self.get(i)? - other.get(i)?);
        }
        Ok(Vector::from_vec(data))
    }

    /// Scalar multiple producing a new vector.
    fn scaled(&self, factor: f64) -> Vector {
        Vector::from_vec(self.values().map(|x| x * factor).collect())
    }

    /// Dot product.
    ///
    /// # Errors
    ///
    /// [`Error::LengthMismatch`] if the operand lengths differ.
    fn dot(&self, other: &dyn VectorView) -> Result<f64> {
        check_same_len(self.len(), other.len())?;
        let mut acc = 0.0;
        for i in 0..self.len() {
            acc += self.get(i)? * other.get(i)?;
        }
        Ok(acc)
    }

    /// Sum of all elements. Raw reduction, no non-finite filtering; the
    /// data-cleaning policy lives in the statistics layer.
    fn sum(&self) -> f64 {
        self.values().sum()
    }

    /// Sum of absolute values.
    fn norm1(&self) -> f64 {
        self.values().map(f64::abs).sum()
    }

    /// Euclidean norm.
    fn norm2(&self) -> f64 {
        self.values().map(|x| x * x).sum::<f64>().sqrt()
    }

    /// Streams `(index, value)` pairs.
    fn elements(&self) -> Elements<'_>
    where
        Self: Sized,
    {
        Elements {
            view: self,
            index: 0,
        }
    }

    /// Streams only the elements with non-zero value.
    fn non_zero_elements(&self) -> NonZeroElements<'_>
    where
        Self: Sized,
    {
        NonZeroElements {
            inner: self.elements(),
        }
    }

    /// Materializes the contents as an owned array.
    fn to_vec(&self) -> Vec<f64> {
        self.values().collect()
    }

    /// Iterator over values in index order. Internal building block for the
    /// derived reductions; `get` cannot fail below `len`.
    #[doc(hidden)]
    fn values(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        Box::new((0..self.len()).filter_map(move |i| self.get(i).ok()))
    }
}

fn check_same_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::LengthMismatch { expected, actual });
    }
    Ok(())
}

/// Iterator over a view's `(index, value)` pairs.
pub struct Elements<'a> {
    view: &'a dyn VectorView,
    index: usize,
}

impl Iterator for Elements<'_> {
    type Item = VectorElement;

    fn next(&mut self) -> Option<VectorElement> {
        if self.index >= self.view.len() {
            return None;
        }
        let value = self.view.get(self.index).ok()?;
        let element = VectorElement {
            index: self.index,
            value,
        };
        self.index += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.view.len() - self.index;
        (remaining, Some(remaining))
    }
}

/// Iterator over a view's non-zero `(index, value)` pairs.
pub struct NonZeroElements<'a> {
    inner: Elements<'a>,
}

impl Iterator for NonZeroElements<'_> {
    type Item = VectorElement;

    fn next(&mut self) -> Option<VectorElement> {
        self.inner.find(|e| e.value != 0.0)
    }
}

/// Mutable numeric vector over a pluggable storage strategy.
///
/// Construction is explicit about ownership: the `from_*` factories copy
/// into independent storage, while [`Vector::share`] aliases a caller-owned
/// buffer so that mutations through either handle are visible through the
/// other.
///
/// # Examples
///
/// ```
/// use jam::{Vector, VectorView};
///
/// let mut v = Vector::zeros(3);
/// v.set(1, 4.0).unwrap();
/// v.add(1.0);
///
/// assert_eq!(v.to_vec(), vec![1.0, 5.0, 1.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Vector {
    storage: VectorStorage,
}

impl Vector {
    /// Creates a zero-filled vector of the given length.
    pub fn zeros(len: usize) -> Self {
        Vector::constant(0.0, len)
    }

    /// Creates a vector with every element set to `value`.
    pub fn constant(value: f64, len: usize) -> Self {
        Vector {
            storage: VectorStorage::Dense(vec![value; len]),
        }
    }

    /// Creates a vector by copying a slice. The result is independent of the
    /// source.
    pub fn from_slice(data: &[f64]) -> Self {
        Vector::from_vec(data.to_vec())
    }

    /// Creates a vector taking ownership of a buffer.
    pub fn from_vec(data: Vec<f64>) -> Self {
        Vector {
            storage: VectorStorage::Dense(data),
        }
    }

    /// Creates a vector by copying any view.
    pub fn from_view(view: &dyn VectorView) -> Self {
        Vector::from_vec(view.to_vec())
    }

    /// Creates a vector that aliases a caller-owned buffer.
    ///
    /// Mutations through this vector are visible through every other handle
    /// on the buffer, and vice versa. The buffer must not be resized while
    /// wrapped.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::rc::Rc;
    /// use jam::{storage::shared_buffer, Vector, VectorView};
    ///
    /// let buf = shared_buffer(vec![1.0, 2.0]);
    /// let mut v = Vector::share(Rc::clone(&buf));
    /// v.set(0, 9.0).unwrap();
    /// assert_eq!(buf.borrow()[0], 9.0);
    /// ```
    pub fn share(buffer: SharedBuffer) -> Self {
        Vector {
            storage: VectorStorage::Shared(buffer),
        }
    }

    /// Parses a comma-delimited numeric literal, e.g. `"1.0, 2.5, -3"`.
    /// Whitespace around tokens is ignored; empty input yields an empty
    /// vector.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidNumber`] naming the first malformed token.
    ///
    /// # Examples
    ///
    /// ```
    /// use jam::{Vector, VectorView};
    ///
    /// let v = Vector::parse("1, 2.5, -3").unwrap();
    /// assert_eq!(v.to_vec(), vec![1.0, 2.5, -3.0]);
    /// assert!(Vector::parse("1, two").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Vector::zeros(0));
        }
        let mut data = Vec::new();
        for token in text.split(',') {
            let token = token.trim();
            let value = token.parse::<f64>().map_err(|_| Error::InvalidNumber {
                token: token.to_string(),
            })?;
            data.push(value);
        }
        Ok(Vector::from_vec(data))
    }

    /// Sets the element at `index`.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfBounds`] if `index >= len()`.
    pub fn set(&mut self, index: usize, value: f64) -> Result<()> {
        self.check_index(index)?;
        self.storage.write(index, value);
        Ok(())
    }

    /// In-place scalar addition: `self[i] += scalar`.
    pub fn add(&mut self, scalar: f64) {
        for i in 0..self.len() {
            let value = self.storage.read(i) + scalar;
            self.storage.write(i, value);
        }
    }

    /// In-place scalar multiplication: `self[i] *= factor`.
    pub fn scale(&mut self, factor: f64) {
        for i in 0..self.len() {
            let value = self.storage.read(i) * factor;
            self.storage.write(i, value);
        }
    }

    /// In-place `self[i] += alpha * that[i]`.
    ///
    /// The length check happens before any element is touched, so a failed
    /// call leaves the vector unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::LengthMismatch`] if `that.len() != self.len()`.
    pub fn daxpy(&mut self, alpha: f64, that: &dyn VectorView) -> Result<()> {
        check_same_len(self.len(), that.len())?;
        for i in 0..self.len() {
            let value = self.storage.read(i) + alpha * that.get(i)?;
            self.storage.write(i, value);
        }
        Ok(())
    }

    /// Rescales in place so the elements sum to one.
    ///
    /// # Errors
    ///
    /// [`Error::NearZeroNorm`] when the current sum is within tolerance of
    /// zero.
    pub fn normalize(&mut self) -> Result<()> {
        let sum = self.sum();
        if Tolerance::default().is_zero(sum) {
            return Err(Error::NearZeroNorm { norm: sum });
        }
        self.scale(1.0 / sum);
        Ok(())
    }

    /// Rescales in place to unit Euclidean norm.
    ///
    /// # Errors
    ///
    /// [`Error::NearZeroNorm`] when the current norm is within tolerance of
    /// zero.
    pub fn unitize(&mut self) -> Result<()> {
        let norm = self.norm2();
        if Tolerance::default().is_zero(norm) {
            return Err(Error::NearZeroNorm { norm });
        }
        self.scale(1.0 / norm);
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        Ok(())
    }
}

impl VectorView for Vector {
    fn len(&self) -> usize {
        self.storage.len()
    }

    fn get(&self, index: usize) -> Result<f64> {
        self.check_index(index)?;
        Ok(self.storage.read(index))
    }
}

/// Tolerance equality under the default comparator. Deliberately not
/// accompanied by `Eq` or `Hash`.
impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, Tolerance::default())
    }
}

impl std::fmt::Display for Vector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for i in 0..self.len() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.storage.read(i))?;
        }
        write!(f, "]")
    }
}
