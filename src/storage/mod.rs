//! Storage strategy implementations for vectors and matrices
//!
//! Containers own exactly one storage strategy at a time and dispatch every
//! `get`/`set` through it. Observable semantics are representation
//! transparent: callers cannot distinguish one strategy from another except
//! via performance, or via the storage predicates exposed for tests.
//!
//! # Strategies
//!
//! - vector: `Dense` (owned buffer), `Shared` (aliasing, caller-owned buffer)
//! - matrix: `Dense` (row-major), `Diagonal` (diagonal entries only, promotes
//!   to `Sparse` on the first non-zero off-diagonal write), `Sparse`
//!   (promoted form), `Shared` (aliasing, row-major)

pub(crate) mod matrix;
pub(crate) mod vector;

use std::cell::RefCell;
use std::rc::Rc;

/// Caller-owned backing buffer for the aliasing (wrap) construction mode.
///
/// Two containers sharing one buffer observe each other's writes. The
/// sharing is deliberate and single-threaded; `Rc<RefCell<_>>` is `!Send`,
/// so the type system rules out cross-thread use. The buffer must not be
/// resized while any container is wrapping it.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use jam::{SharedBuffer, Vector, VectorView};
///
/// let buf: SharedBuffer = Rc::new(RefCell::new(vec![1.0, 2.0, 3.0]));
/// let mut a = Vector::share(Rc::clone(&buf));
/// let b = Vector::share(Rc::clone(&buf));
///
/// a.set(0, 9.0).unwrap();
/// assert_eq!(b.get(0).unwrap(), 9.0);
/// assert_eq!(buf.borrow()[0], 9.0);
/// ```
pub type SharedBuffer = Rc<RefCell<Vec<f64>>>;

/// Convenience constructor for a [`SharedBuffer`].
pub fn shared_buffer(data: Vec<f64>) -> SharedBuffer {
    Rc::new(RefCell::new(data))
}
