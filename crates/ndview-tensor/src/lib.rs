#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `ndview-tensor` holds the metadata algebra behind strided views together with a
//! small dense container to view into:
//!
//! - **Shape/Strides**: per-axis extents and signed per-axis steps, stored inline for
//!   low ranks
//! - **Layout algebra**: classification of stride patterns as row-major, column-major
//!   or dynamic, and the rules for how that tag survives an axis permutation
//! - **Tensor**: a dynamic-rank, owned, contiguous array in row- or column-major order
//!
//! # Quick Start
//!
//! ```rust
//! use ndview_tensor::{layout, LayoutType, Tensor};
//!
//! let t = Tensor::from_shape_vec(&[2, 3], vec![0, 1, 2, 3, 4, 5]).unwrap();
//! assert_eq!(t.layout(), LayoutType::RowMajor);
//!
//! // permuting the metadata only: reversal swaps the canonical layouts
//! let (shape, strides, layout) =
//!     layout::permute(t.shape(), t.strides(), t.layout(), &[1, 0]).unwrap();
//! assert_eq!(shape.as_slice(), &[3, 2]);
//! assert_eq!(strides.as_slice(), &[1, 3]);
//! assert_eq!(layout, LayoutType::ColumnMajor);
//! ```

/// Error types for shape, layout and container operations.
pub mod error;

/// Layout tags and the stride-pattern algebra.
///
/// This module provides [`LayoutType`], the classification rule mapping a stride
/// pattern to a layout tag, and permutation composition.
pub mod layout;

/// Serde module for JSON/other format serialization and deserialization.
///
/// This module provides serialization support for tensors when the `serde` feature
/// is enabled.
#[cfg(feature = "serde")]
pub mod serde;

/// Shape and stride sequences and multi-index arithmetic.
pub mod shape;

/// Storage module containing the owned flat buffer of a tensor.
pub mod storage;

/// Tensor module containing the dense container.
pub mod tensor;

pub use crate::error::TensorError;
pub use crate::layout::LayoutType;
pub use crate::shape::{Shape, Strides};
pub use crate::storage::TensorStorage;
pub use crate::tensor::Tensor;
