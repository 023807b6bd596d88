use smallvec::SmallVec;

use crate::{
    shape::{Shape, Strides},
    TensorError,
};

/// The traversal order a stride pattern corresponds to.
///
/// `RowMajor` and `ColumnMajor` are only ever reported for strides that satisfy the
/// corresponding canonical pattern. `Dynamic` marks an irregular pattern. `Any` is an
/// input hint for sources that have not committed to an order; [`classify`] never
/// produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayoutType {
    /// Last axis varies fastest.
    #[default]
    RowMajor,
    /// First axis varies fastest.
    ColumnMajor,
    /// Strides follow neither canonical pattern.
    Dynamic,
    /// Either canonical order.
    Any,
}

impl LayoutType {
    /// Returns the layout obtained by reversing the axis order.
    ///
    /// Full reversal swaps the two canonical layouts and leaves the others unchanged.
    #[inline]
    pub fn transposed(self) -> Self {
        match self {
            Self::RowMajor => Self::ColumnMajor,
            Self::ColumnMajor => Self::RowMajor,
            other => other,
        }
    }

    /// Returns true for `RowMajor` and `ColumnMajor`.
    #[inline]
    pub fn is_canonical(self) -> bool {
        matches!(self, Self::RowMajor | Self::ColumnMajor)
    }
}

impl std::fmt::Display for LayoutType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::RowMajor => "row_major",
            Self::ColumnMajor => "column_major",
            Self::Dynamic => "dynamic",
            Self::Any => "any",
        };
        f.write_str(name)
    }
}

/// Checks whether `strides` are the contiguous strides of `shape` in `order`.
///
/// Axes of extent 0 or 1 never constrain their own stride, since it is never used to
/// step to another element. Negative strides never match. `Any` accepts either
/// canonical order and `Dynamic` matches nothing.
///
/// # Examples
///
/// ```rust
/// use ndview_tensor::{layout::matches_layout, LayoutType};
///
/// assert!(matches_layout(&[2, 3], &[3, 1], LayoutType::RowMajor));
/// assert!(!matches_layout(&[2, 3], &[3, 1], LayoutType::ColumnMajor));
/// // the stride of a unit axis is irrelevant
/// assert!(matches_layout(&[1, 3], &[0, 1], LayoutType::RowMajor));
/// ```
pub fn matches_layout(shape: &[usize], strides: &[isize], order: LayoutType) -> bool {
    if shape.len() != strides.len() {
        return false;
    }
    let check = |axes: &mut dyn Iterator<Item = usize>| {
        let mut expected: usize = 1;
        for axis in axes {
            let dim = shape[axis];
            if dim > 1 && strides[axis] != expected as isize {
                return false;
            }
            expected = expected.saturating_mul(dim);
        }
        true
    };
    match order {
        LayoutType::RowMajor => check(&mut (0..shape.len()).rev()),
        LayoutType::ColumnMajor => check(&mut (0..shape.len())),
        LayoutType::Any => {
            matches_layout(shape, strides, LayoutType::RowMajor)
                || matches_layout(shape, strides, LayoutType::ColumnMajor)
        }
        LayoutType::Dynamic => false,
    }
}

/// Classifies a stride pattern as row-major, column-major or dynamic.
///
/// Row-major is preferred when both canonical patterns hold, which happens for
/// ranks below two and for shapes with at most one extent above one.
///
/// # Examples
///
/// ```rust
/// use ndview_tensor::{layout::classify, LayoutType};
///
/// assert_eq!(classify(&[2, 3], &[3, 1]), LayoutType::RowMajor);
/// assert_eq!(classify(&[2, 3], &[1, 2]), LayoutType::ColumnMajor);
/// assert_eq!(classify(&[2, 3], &[6, 2]), LayoutType::Dynamic);
/// ```
pub fn classify(shape: &[usize], strides: &[isize]) -> LayoutType {
    if matches_layout(shape, strides, LayoutType::RowMajor) {
        LayoutType::RowMajor
    } else if matches_layout(shape, strides, LayoutType::ColumnMajor) {
        LayoutType::ColumnMajor
    } else {
        LayoutType::Dynamic
    }
}

/// Settles the tag a stride pattern reports, given a tag carried over from its source.
///
/// A carried canonical tag is kept only while the strides distinguish the two
/// canonical orders. When both patterns hold, or the carried tag is `Any`, the
/// pattern is re-classified, so equal stride patterns always report equal tags.
///
/// # Examples
///
/// ```rust
/// use ndview_tensor::{layout::resolve, LayoutType};
///
/// assert_eq!(resolve(&[2, 3], &[1, 2], LayoutType::ColumnMajor), LayoutType::ColumnMajor);
/// assert_eq!(resolve(&[1, 4], &[4, 1], LayoutType::ColumnMajor), LayoutType::RowMajor);
/// assert_eq!(resolve(&[2, 3], &[3, 1], LayoutType::Any), LayoutType::RowMajor);
/// ```
pub fn resolve(shape: &[usize], strides: &[isize], layout: LayoutType) -> LayoutType {
    match layout {
        LayoutType::Any => classify(shape, strides),
        LayoutType::RowMajor | LayoutType::ColumnMajor
            if matches_layout(shape, strides, LayoutType::RowMajor)
                && matches_layout(shape, strides, LayoutType::ColumnMajor) =>
        {
            classify(shape, strides)
        }
        other => other,
    }
}

/// Validates that `axes` is a permutation of `0..rank`.
///
/// # Errors
///
/// Returns [`TensorError::RankMismatch`] if `axes.len() != rank` and
/// [`TensorError::InvalidPermutation`] if an axis is repeated or out of range.
pub fn validate_permutation(axes: &[usize], rank: usize) -> Result<(), TensorError> {
    if axes.len() != rank {
        return Err(TensorError::rank_mismatch(rank, axes.len()));
    }
    let mut seen: SmallVec<[bool; 8]> = SmallVec::from_elem(false, rank);
    for &axis in axes {
        if axis >= rank || seen[axis] {
            return Err(TensorError::InvalidPermutation {
                axes: axes.to_vec(),
                rank,
            });
        }
        seen[axis] = true;
    }
    Ok(())
}

/// Returns true if `axes` maps every axis onto itself.
#[inline]
pub fn is_identity(axes: &[usize]) -> bool {
    axes.iter().enumerate().all(|(i, &axis)| i == axis)
}

/// Returns true if `axes` reverses the axis order.
#[inline]
pub fn is_full_reversal(axes: &[usize]) -> bool {
    let rank = axes.len();
    axes.iter().enumerate().all(|(i, &axis)| axis == rank - 1 - i)
}

/// Returns the full-reversal permutation of `rank` axes.
pub fn reversed_axes(rank: usize) -> SmallVec<[usize; 4]> {
    (0..rank).rev().collect()
}

/// Composes two permutations.
///
/// Permuting by `first` and then by `second` is equivalent to a single permutation by
/// the returned axis order. Both inputs are assumed to be valid permutations of the
/// same rank.
///
/// # Examples
///
/// ```rust
/// use ndview_tensor::layout::compose_permutations;
///
/// assert_eq!(compose_permutations(&[2, 0, 1], &[2, 0, 1]).as_slice(), &[1, 2, 0]);
/// ```
pub fn compose_permutations(first: &[usize], second: &[usize]) -> SmallVec<[usize; 4]> {
    second.iter().map(|&axis| first[axis]).collect()
}

/// Applies an axis permutation to a shape and stride pattern.
///
/// `new_shape[i] = shape[axes[i]]` and `new_strides[i] = strides[axes[i]]`. The
/// resulting layout is derived as follows:
///
/// - the identity permutation keeps `layout` unchanged;
/// - full reversal of a canonical layout swaps row-major and column-major;
/// - any other permutation re-classifies the permuted strides.
///
/// The carried tag then goes through [`resolve`], so strides that satisfy both
/// canonical patterns report `RowMajor` whichever permutations produced them.
///
/// # Errors
///
/// Fails if `axes` is not a permutation of `0..shape.len()`, see
/// [`validate_permutation`].
///
/// # Examples
///
/// ```rust
/// use ndview_tensor::{layout::permute, shape::col_major_strides, LayoutType};
///
/// let shape = [5, 5, 5];
/// let strides = col_major_strides(&shape);
/// let (_, _, layout) = permute(&shape, &strides, LayoutType::ColumnMajor, &[2, 1, 0]).unwrap();
/// assert_eq!(layout, LayoutType::RowMajor);
/// let (_, _, layout) = permute(&shape, &strides, LayoutType::ColumnMajor, &[2, 0, 1]).unwrap();
/// assert_eq!(layout, LayoutType::Dynamic);
/// ```
pub fn permute(
    shape: &[usize],
    strides: &[isize],
    layout: LayoutType,
    axes: &[usize],
) -> Result<(Shape, Strides, LayoutType), TensorError> {
    if strides.len() != shape.len() {
        return Err(TensorError::rank_mismatch(shape.len(), strides.len()));
    }
    validate_permutation(axes, shape.len())?;

    let new_shape: Shape = axes.iter().map(|&axis| shape[axis]).collect();
    let new_strides: Strides = axes.iter().map(|&axis| strides[axis]).collect();

    let carried = if is_identity(axes) {
        layout
    } else if is_full_reversal(axes) && layout.is_canonical() {
        layout.transposed()
    } else {
        classify(&new_shape, &new_strides)
    };
    let new_layout = resolve(&new_shape, &new_strides, carried);

    Ok((new_shape, new_strides, new_layout))
}

/// Reverses the axis order of a shape and stride pattern.
///
/// This is [`permute`] with the full-reversal permutation, which cannot fail: a
/// canonical layout is swapped, ranks below two keep their layout and anything else
/// is re-classified. The result goes through [`resolve`].
pub fn transpose(
    shape: &[usize],
    strides: &[isize],
    layout: LayoutType,
) -> (Shape, Strides, LayoutType) {
    let new_shape: Shape = shape.iter().rev().copied().collect();
    let new_strides: Strides = strides.iter().rev().copied().collect();
    let carried = if shape.len() < 2 {
        layout
    } else if layout.is_canonical() {
        layout.transposed()
    } else {
        classify(&new_shape, &new_strides)
    };
    let new_layout = resolve(&new_shape, &new_strides, carried);
    (new_shape, new_strides, new_layout)
}
