//! Owned flat element buffer backing a [`crate::Tensor`].
//!
//! Storage knows nothing about shape or strides: it is the contiguous region that
//! views address through their offset and stride arithmetic.

/// A contiguous, owned buffer of elements.
///
/// Views never own a `TensorStorage`; they borrow its slice for their lifetime, so the
/// buffer is freed exactly once, when the owning tensor is dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct TensorStorage<T> {
    data: Vec<T>,
}

impl<T> TensorStorage<T> {
    /// Creates a storage taking ownership of `data` without copying it.
    #[inline]
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Returns the number of elements in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer holds no element.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the pointer to the first element.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    /// Returns the buffer as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns the buffer as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consumes the storage and returns the underlying vector.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for TensorStorage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorStorage")
            .field("ptr", &self.as_ptr())
            .field("len", &self.len())
            .finish()
    }
}
