use smallvec::SmallVec;

use crate::{layout::LayoutType, TensorError};

/// The per-axis extents of a view, axis 0 outermost.
///
/// Ranks up to four are stored inline without a heap allocation.
pub type Shape = SmallVec<[usize; 4]>;

/// The per-axis steps, in elements, through the underlying flat buffer.
///
/// Strides are signed: negative strides walk an axis backwards and zero strides
/// repeat the same element along an axis.
pub type Strides = SmallVec<[isize; 4]>;

/// Returns the number of elements described by `shape`.
///
/// The empty shape describes a single scalar element.
///
/// # Examples
///
/// ```rust
/// use ndview_tensor::shape::numel;
///
/// assert_eq!(numel(&[2, 3, 4]), 24);
/// assert_eq!(numel(&[]), 1);
/// assert_eq!(numel(&[3, 0]), 0);
/// ```
#[inline]
pub fn numel(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Computes the strides for a row-major (C-contiguous) layout.
///
/// The rightmost dimension has stride 1 and each dimension's stride is the product
/// of all dimensions to its right.
///
/// # Examples
///
/// ```rust
/// use ndview_tensor::shape::row_major_strides;
///
/// assert_eq!(row_major_strides(&[2, 3]).as_slice(), &[3, 1]);
/// assert_eq!(row_major_strides(&[2, 3, 4]).as_slice(), &[12, 4, 1]);
/// ```
pub fn row_major_strides(shape: &[usize]) -> Strides {
    let mut strides: Strides = SmallVec::from_elem(0, shape.len());
    let mut stride = 1isize;
    for i in (0..shape.len()).rev() {
        strides[i] = stride;
        stride *= shape[i] as isize;
    }
    strides
}

/// Computes the strides for a column-major (Fortran-contiguous) layout.
///
/// The leftmost dimension has stride 1 and each dimension's stride is the product
/// of all dimensions to its left.
///
/// # Examples
///
/// ```rust
/// use ndview_tensor::shape::col_major_strides;
///
/// assert_eq!(col_major_strides(&[2, 3, 4]).as_slice(), &[1, 2, 6]);
/// ```
pub fn col_major_strides(shape: &[usize]) -> Strides {
    let mut strides: Strides = SmallVec::from_elem(0, shape.len());
    let mut stride = 1isize;
    for (i, &dim) in shape.iter().enumerate() {
        strides[i] = stride;
        stride *= dim as isize;
    }
    strides
}

/// Computes the canonical strides of `shape` for the given layout.
///
/// `LayoutType::Any` resolves to row-major.
///
/// # Errors
///
/// Returns [`TensorError::InvalidLayout`] for `LayoutType::Dynamic`, which has no
/// canonical stride pattern.
pub fn strides_from_shape(shape: &[usize], layout: LayoutType) -> Result<Strides, TensorError> {
    match layout {
        LayoutType::RowMajor | LayoutType::Any => Ok(row_major_strides(shape)),
        LayoutType::ColumnMajor => Ok(col_major_strides(shape)),
        LayoutType::Dynamic => Err(TensorError::InvalidLayout(layout)),
    }
}

/// Advances `index` to the next multi-index of `shape` in the given traversal order.
///
/// Row-major order varies the last axis fastest, column-major order the first.
/// Returns `false` once `index` wrapped past the last multi-index, leaving it at all
/// zeros. `LayoutType::Any` and `LayoutType::Dynamic` enumerate in row-major order.
///
/// # Examples
///
/// ```rust
/// use ndview_tensor::{shape::increment_index, LayoutType};
///
/// let mut index = [0, 2];
/// assert!(increment_index(&mut index, &[2, 3], LayoutType::RowMajor));
/// assert_eq!(index, [1, 0]);
///
/// let mut index = [1, 0];
/// assert!(increment_index(&mut index, &[2, 3], LayoutType::ColumnMajor));
/// assert_eq!(index, [0, 1]);
/// ```
pub fn increment_index(index: &mut [usize], shape: &[usize], order: LayoutType) -> bool {
    debug_assert_eq!(index.len(), shape.len());
    let step = |dim: usize, index: &mut [usize]| {
        index[dim] += 1;
        if index[dim] < shape[dim] {
            return true;
        }
        index[dim] = 0;
        false
    };
    match order {
        LayoutType::ColumnMajor => (0..shape.len()).any(|dim| step(dim, index)),
        _ => (0..shape.len()).rev().any(|dim| step(dim, index)),
    }
}

/// Converts a position in the traversal order of `shape` back to a multi-index.
///
/// This is the inverse of enumerating with [`increment_index`].
pub fn unravel_index(mut flat: usize, shape: &[usize], order: LayoutType) -> Shape {
    let mut index: Shape = SmallVec::from_elem(0, shape.len());
    let mut unravel = |dim: usize| {
        let extent = shape[dim].max(1);
        index[dim] = flat % extent;
        flat /= extent;
    };
    match order {
        LayoutType::ColumnMajor => (0..shape.len()).for_each(&mut unravel),
        _ => (0..shape.len()).rev().for_each(&mut unravel),
    }
    index
}

/// Validates a multi-index against `shape`.
///
/// # Errors
///
/// Returns [`TensorError::RankMismatch`] if the index has the wrong arity, a usage
/// error, and [`TensorError::IndexOutOfBounds`] for the first axis whose index is not
/// below its extent.
pub fn check_index(shape: &[usize], index: &[usize]) -> Result<(), TensorError> {
    if index.len() != shape.len() {
        return Err(TensorError::rank_mismatch(shape.len(), index.len()));
    }
    for (axis, (&idx, &dim)) in index.iter().zip(shape).enumerate() {
        if idx >= dim {
            return Err(TensorError::index_out_of_bounds(axis, idx, dim));
        }
    }
    Ok(())
}

/// Returns the flat buffer position of `index`: `offset + Σ index[i] * strides[i]`.
///
/// The index is not validated. For an index inside the shape of a well-formed view
/// the result lies within the view's base buffer.
#[inline]
pub fn element_offset(offset: usize, strides: &[isize], index: &[usize]) -> usize {
    let pos = index
        .iter()
        .zip(strides)
        .fold(offset as isize, |acc, (&i, &s)| acc + i as isize * s);
    pos as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_validation() {
        assert!(check_index(&[2, 3], &[1, 2]).is_ok());
        assert_eq!(
            check_index(&[2, 3], &[1, 3]),
            Err(TensorError::index_out_of_bounds(1, 3, 3))
        );
        assert_eq!(
            check_index(&[2, 3], &[1, 2, 0]),
            Err(TensorError::rank_mismatch(2, 3))
        );
        assert!(check_index(&[], &[]).is_ok());
    }

    #[test]
    fn offsets_with_negative_strides() {
        // reversed 1-D view starting at the last element of a 5-element buffer
        assert_eq!(element_offset(4, &[-1], &[0]), 4);
        assert_eq!(element_offset(4, &[-1], &[4]), 0);
        assert_eq!(element_offset(0, &[12, 6, 1], &[1, 0, 2]), 14);
    }

    #[test]
    fn numel_rank0() {
        assert_eq!(numel(&[]), 1);
        assert_eq!(numel(&[5]), 5);
    }

    #[test]
    fn canonical_strides() -> Result<(), TensorError> {
        assert_eq!(row_major_strides(&[2, 2, 6]).as_slice(), &[12, 6, 1]);
        assert_eq!(col_major_strides(&[2, 2, 6]).as_slice(), &[1, 2, 4]);
        assert!(row_major_strides(&[]).is_empty());
        assert_eq!(
            strides_from_shape(&[3, 4], LayoutType::Any)?.as_slice(),
            &[4, 1]
        );
        assert_eq!(
            strides_from_shape(&[3, 4], LayoutType::ColumnMajor)?.as_slice(),
            &[1, 3]
        );
        assert_eq!(
            strides_from_shape(&[3, 4], LayoutType::Dynamic),
            Err(TensorError::InvalidLayout(LayoutType::Dynamic))
        );
        Ok(())
    }

    #[test]
    fn row_major_enumeration() {
        let shape = [2, 3];
        let mut index = [0, 0];
        let mut visited = vec![index];
        while increment_index(&mut index, &shape, LayoutType::RowMajor) {
            visited.push(index);
        }
        assert_eq!(
            visited,
            vec![[0, 0], [0, 1], [0, 2], [1, 0], [1, 1], [1, 2]]
        );
        assert_eq!(index, [0, 0]);
    }

    #[test]
    fn column_major_enumeration() {
        let shape = [2, 3];
        let mut index = [0, 0];
        let mut visited = vec![index];
        while increment_index(&mut index, &shape, LayoutType::ColumnMajor) {
            visited.push(index);
        }
        assert_eq!(
            visited,
            vec![[0, 0], [1, 0], [0, 1], [1, 1], [0, 2], [1, 2]]
        );
    }

    #[test]
    fn unravel_matches_enumeration() {
        let shape = [2, 3, 4];
        for order in [LayoutType::RowMajor, LayoutType::ColumnMajor] {
            let mut index = [0, 0, 0];
            let mut flat = 0;
            loop {
                assert_eq!(unravel_index(flat, &shape, order).as_slice(), &index);
                flat += 1;
                if !increment_index(&mut index, &shape, order) {
                    break;
                }
            }
            assert_eq!(flat, 24);
        }
    }
}
