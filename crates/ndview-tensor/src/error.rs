use thiserror::Error;

/// An error type for shape, layout and container operations.
///
/// The variants fall in two groups. Usage errors signal a violated precondition
/// of the call itself (wrong arity, a malformed permutation, an element count that
/// does not match a shape). Bounds errors come from explicitly checked element
/// access and are reported separately so callers can choose between the checked
/// and the unchecked access paths.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    /// The number of elements does not match the requested shape.
    ///
    /// # Example
    /// ```ignore
    /// // Error: shape [2, 3] expects 6 elements, but got 5
    /// let t = Tensor::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5])?;
    /// ```
    #[error("Invalid shape: expected {expected} elements, but the data has {actual}")]
    InvalidShape {
        /// Expected number of elements based on shape
        expected: usize,
        /// Actual number of elements provided
        actual: usize,
    },

    /// Two operands were expected to have identical shapes.
    #[error("Shape mismatch: expected shape {expected}, got {actual}")]
    ShapeMismatch {
        /// Expected shape description
        expected: String,
        /// Actual shape description
        actual: String,
    },

    /// A multi-index or an axis list has the wrong number of entries.
    #[error("Rank mismatch: expected {expected} entries, got {actual}")]
    RankMismatch {
        /// The rank of the view or container
        expected: usize,
        /// The number of entries supplied
        actual: usize,
    },

    /// An axis order is not a bijection over `0..rank`.
    #[error("Invalid permutation {axes:?} for rank {rank}")]
    InvalidPermutation {
        /// The offending axis order
        axes: Vec<usize>,
        /// The rank it was applied to
        rank: usize,
    },

    /// The layout cannot be used where a concrete traversal order is required.
    #[error("Layout {0} does not name a traversal order")]
    InvalidLayout(crate::layout::LayoutType),

    /// Checked element access with an index outside the axis extent.
    #[error("Index {index} out of bounds for axis {axis} of size {size}")]
    IndexOutOfBounds {
        /// The axis being indexed
        axis: usize,
        /// The invalid index that was attempted
        index: usize,
        /// The extent of the axis
        size: usize,
    },

    /// A numeric value could not be represented in the element type.
    #[error("Type cast failed: source value cannot be represented in the target type")]
    CastError,
}

impl TensorError {
    /// Creates an InvalidShape error with clear context.
    pub fn invalid_shape(expected: usize, actual: usize) -> Self {
        Self::InvalidShape { expected, actual }
    }

    /// Creates a ShapeMismatch error with formatted shapes.
    pub fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }
    }

    /// Creates a RankMismatch error.
    pub fn rank_mismatch(expected: usize, actual: usize) -> Self {
        Self::RankMismatch { expected, actual }
    }

    /// Creates an IndexOutOfBounds error with clear context.
    pub fn index_out_of_bounds(axis: usize, index: usize, size: usize) -> Self {
        Self::IndexOutOfBounds { axis, index, size }
    }

    /// Returns true if this error signals a violated precondition of the call.
    pub fn is_usage_error(&self) -> bool {
        !self.is_bounds_error()
    }

    /// Returns true if this error comes from a checked element access.
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::IndexOutOfBounds { .. })
    }

    /// Returns a user-friendly suggestion for resolving the error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::InvalidShape { .. } => {
                "Ensure the product of shape dimensions equals the number of data elements"
            }
            Self::ShapeMismatch { .. } => {
                "Operands must share the same shape; broadcasting is not supported"
            }
            Self::RankMismatch { .. } => "Pass exactly one entry per axis of the view",
            Self::InvalidPermutation { .. } => "Use every axis in 0..rank exactly once",
            Self::InvalidLayout(_) => "Request RowMajor or ColumnMajor traversal",
            Self::IndexOutOfBounds { .. } => {
                "Verify indices are within bounds (0 <= index < axis size)"
            }
            Self::CastError => "Check that source values fit in the target element type",
        }
    }
}
