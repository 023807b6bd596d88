use ndview_tensor::TensorError;
use thiserror::Error;

/// An error type for view construction and slicing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// More axis-consuming slice entries than the source has axes.
    #[error("Too many slices: {count} axis-consuming entries for rank {rank}")]
    TooManySlices {
        /// Number of entries that consume a source axis
        count: usize,
        /// Rank of the source
        rank: usize,
    },

    /// A range slice with a step of zero.
    #[error("Slice step must be non-zero on axis {axis}")]
    ZeroStep {
        /// The source axis the range applies to
        axis: usize,
    },

    /// A slice bound or a fixed index lies outside the axis extent.
    #[error("Slice bound {index} out of range for axis {axis} of size {size}")]
    SliceOutOfBounds {
        /// The source axis
        axis: usize,
        /// The offending bound or index
        index: usize,
        /// The extent of the axis
        size: usize,
    },

    /// A stride pattern reaches outside the buffer it is applied to.
    #[error("View reaches position {position} outside a buffer of {len} elements")]
    BufferOverrun {
        /// The first offending flat position
        position: isize,
        /// The length of the buffer
        len: usize,
    },

    /// Tensor error
    #[error("Error with the tensor: {0}")]
    TensorError(#[from] TensorError),
}

impl ViewError {
    /// Returns true if the error signals a violated precondition of the call.
    pub fn is_usage_error(&self) -> bool {
        match self {
            Self::TensorError(e) => e.is_usage_error(),
            _ => true,
        }
    }

    /// Returns true if the error comes from a checked element access.
    pub fn is_bounds_error(&self) -> bool {
        match self {
            Self::TensorError(e) => e.is_bounds_error(),
            _ => false,
        }
    }

    /// Returns a short hint on how to fix the error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::TooManySlices { .. } => {
                "Pass at most one axis-consuming entry per source axis; NewAxis entries are free"
            }
            Self::ZeroStep { .. } => "Use a positive or negative step",
            Self::SliceOutOfBounds { .. } => {
                "Keep range bounds within 0..=size and indices below size"
            }
            Self::BufferOverrun { .. } => {
                "Check that offset and strides keep every element inside the buffer"
            }
            Self::TensorError(e) => e.suggestion(),
        }
    }
}
