//! A growable, contiguous array that manages its own raw storage.
//!
//! [`DynamicArray`] allocates an uninitialized block, constructs elements
//! into it one slot at a time and drops exactly the live ones. Capacity grows
//! by doubling and never shrinks unless asked to.
//!
//! ```
//! use dynamic_array::{dyn_array, OutOfRange};
//!
//! let mut v = dyn_array![10, 20, 30];
//! v.insert(1, 99);
//! assert_eq!(v, [10, 99, 20, 30]);
//! v.erase(0);
//! assert_eq!(v.front(), Ok(&99));
//! v.clear();
//! assert_eq!(v.pop(), Err(OutOfRange));
//! ```

pub mod cli;
mod dynamic_array;
mod error;
mod iter;

pub use dynamic_array::{DEFAULT_CAPACITY, DynamicArray};
pub use error::{AllocError, OutOfRange};
pub use iter::{Cursor, IntoIter};

/// Builds a [`DynamicArray`] from a literal list of values, or from a value
/// and a count.
///
/// ```
/// use dynamic_array::dyn_array;
///
/// let a = dyn_array![1, 2, 3];
/// assert_eq!(a.capacity(), 3);
///
/// let b = dyn_array!["x"; 4];
/// assert_eq!(b.len(), 4);
/// ```
#[macro_export]
macro_rules! dyn_array {
    () => {
        $crate::DynamicArray::new()
    };
    ($value:expr; $n:expr) => {
        $crate::DynamicArray::filled($n, $value)
    };
    ($($value:expr),+ $(,)?) => {
        $crate::DynamicArray::from([$($value),+])
    };
}
