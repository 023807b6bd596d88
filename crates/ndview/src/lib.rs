#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `ndview` builds zero-copy views over dense tensors and lazy adapters over
//! arbitrary expressions:
//!
//! - **TensorView / TensorViewMut**: a borrowed buffer re-addressed through its own
//!   shape, signed strides and base offset
//! - **Transpose and permute**: axis reordering that keeps track of whether the
//!   result is still row-major, column-major or neither
//! - **Dynamic slicing**: runtime lists of [`SliceSpec`] entries selecting ranges,
//!   fixing indices and inserting unit axes
//! - **ExprView**: the same transformations applied lazily to any [`Expression`],
//!   including element-wise arithmetic from [`ops`]
//! - **Ravel / flatten**: rank-1 traversal in a chosen order, zero-copy whenever the
//!   source is already contiguous in that order
//!
//! # Quick Start
//!
//! ```rust
//! use ndview::{LayoutType, SliceSpec, StridedSource, StridedSourceMut, Tensor};
//!
//! let mut e = Tensor::<i32>::arange(24).unwrap().reshape(&[2, 2, 6]).unwrap();
//!
//! // a transposed view writes through to its source
//! e.transpose_mut()[[0, 0, 1]] = 123;
//! assert_eq!(e[[1, 0, 0]], 123);
//!
//! // slicing and ravel
//! let v = e.slice(&[SliceSpec::Index(0), SliceSpec::All, SliceSpec::range(0, 6, 2)]).unwrap();
//! assert_eq!(v.shape(), &[2, 3]);
//! let flat = v.ravel(LayoutType::RowMajor).unwrap();
//! assert!(!flat.is_view());
//! assert_eq!(flat.to_vec(), vec![0, 2, 4, 6, 8, 10]);
//! ```
//!
//! Lazy expressions:
//!
//! ```rust
//! use ndview::{adapter, ops, Expression, SliceSpec, Tensor};
//!
//! let a = Tensor::<i32>::arange(24).unwrap();
//! let b = Tensor::<i32>::arange(24).unwrap();
//! let sum = ops::add(&a, &b).unwrap();
//! let v = adapter::dynamic_view(sum, &[SliceSpec::range(2, 10, 3)]).unwrap();
//! assert_eq!(adapter::flatten(&v).as_slice(), &[4, 10, 16]);
//! ```

/// Lazy views over arbitrary expressions.
pub mod adapter;

/// Error types for view construction and slicing.
pub mod error;

/// The expression abstraction and its evaluation.
pub mod expression;

/// Lazy element-wise arithmetic on expressions.
pub mod ops;

/// Rank-1 traversal of strided sources.
pub mod ravel;

/// Dynamic slice entries.
///
/// This module provides [`SliceSpec`] and the [`s!`] macro, and resolves slice
/// lists against a source shape for both strided and lazy views.
pub mod slice;

/// Traits for sources with a strided memory layout.
pub mod source;

/// View metadata: shape, strides, offset and layout tag.
pub mod strided;

/// Borrowed strided views.
pub mod view;

/// Re-export of the dense container crate.
pub use ndview_tensor as tensor;

pub use ndview_tensor::{LayoutType, Shape, Strides, Tensor, TensorError};

pub use crate::adapter::ExprView;
pub use crate::error::ViewError;
pub use crate::expression::{evaluate, Expression, ExpressionMut};
pub use crate::ravel::Raveled;
pub use crate::slice::SliceSpec;
pub use crate::source::{StridedSource, StridedSourceMut};
pub use crate::strided::StridedLayout;
pub use crate::view::{TensorView, TensorViewMut};
