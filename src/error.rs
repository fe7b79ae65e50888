use thiserror::Error;

/// Returned by the checked accessors when the requested position holds no
/// live element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("running past the end of an array")]
pub struct OutOfRange;

/// Failure reported by [`DynamicArray::try_reserve`](crate::DynamicArray::try_reserve).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    /// The requested capacity does not fit in `isize::MAX` bytes.
    #[error("capacity overflow")]
    CapacityOverflow,
    /// The allocator returned null.
    #[error("allocation of {bytes} bytes failed")]
    Exhausted { bytes: usize },
}
