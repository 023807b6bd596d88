use ndview_tensor::{
    layout::{self, LayoutType},
    shape::{self, Shape, Strides},
    TensorError,
};
use smallvec::SmallVec;

use crate::{
    error::ViewError,
    slice::{self, AxisOp, SliceSpec},
};

/// The metadata of a strided view: shape, signed strides, base offset and layout tag.
///
/// The multi-index `i` of a view maps to the flat position
/// `offset + Σ i[k] * strides[k]` of the buffer it is applied to. The layout tag is
/// either inherited through an axis permutation or derived with
/// [`layout::classify`], and settled with [`layout::resolve`] so that a stride
/// pattern matching both canonical orders always reports `RowMajor`. It is never
/// `Any`.
///
/// `StridedLayout` carries no data. It is what [`TensorView`](crate::TensorView) and
/// [`TensorViewMut`](crate::TensorViewMut) pair with a borrowed buffer, and two views
/// present the same elements in the same order iff their layouts compare equal and
/// they borrow the same buffer.
///
/// # Examples
///
/// ```rust
/// use ndview::{LayoutType, SliceSpec, StridedLayout};
///
/// let base = StridedLayout::contiguous(&[2, 3], LayoutType::RowMajor).unwrap();
/// let t = base.transposed();
/// assert_eq!(t.shape(), &[3, 2]);
/// assert_eq!(t.strides(), &[1, 3]);
/// assert_eq!(t.layout(), LayoutType::ColumnMajor);
///
/// let row = base.sliced(&[SliceSpec::Index(1)]).unwrap();
/// assert_eq!(row.shape(), &[3]);
/// assert_eq!(row.offset(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StridedLayout {
    shape: Shape,
    strides: Strides,
    offset: usize,
    layout: LayoutType,
}

impl StridedLayout {
    /// Creates the layout of a contiguous buffer of `shape` stored in `order`.
    ///
    /// # Errors
    ///
    /// `LayoutType::Dynamic` does not name a storage order. `Any` is read as row-major.
    pub fn contiguous(shape: &[usize], order: LayoutType) -> Result<Self, TensorError> {
        let strides = shape::strides_from_shape(shape, order)?;
        let layout = layout::resolve(shape, &strides, order);
        Ok(Self {
            shape: SmallVec::from_slice(shape),
            strides,
            offset: 0,
            layout,
        })
    }

    /// Creates a layout from raw parts, classifying the stride pattern.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::RankMismatch`] if the shape and strides differ in length.
    pub fn new(shape: &[usize], strides: &[isize], offset: usize) -> Result<Self, TensorError> {
        if shape.len() != strides.len() {
            return Err(TensorError::rank_mismatch(shape.len(), strides.len()));
        }
        Ok(Self {
            shape: SmallVec::from_slice(shape),
            strides: SmallVec::from_slice(strides),
            offset,
            layout: layout::classify(shape, strides),
        })
    }

    /// Tags are settled with [`layout::resolve`], so `Any` never survives.
    pub(crate) fn from_parts(
        shape: &[usize],
        strides: &[isize],
        offset: usize,
        layout: LayoutType,
    ) -> Self {
        Self {
            shape: SmallVec::from_slice(shape),
            strides: SmallVec::from_slice(strides),
            offset,
            layout: layout::resolve(shape, strides, layout),
        }
    }

    /// The extent of each axis.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The signed step of each axis.
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// The flat position of the all-zero multi-index.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The layout tag.
    #[inline]
    pub fn layout(&self) -> LayoutType {
        self.layout
    }

    /// The number of axes.
    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// The number of elements.
    #[inline]
    pub fn numel(&self) -> usize {
        shape::numel(&self.shape)
    }

    /// Returns true if some axis has extent 0.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.numel() == 0
    }

    /// Returns true if the elements occupy `offset..offset + numel` in `order`.
    ///
    /// `Any` accepts either canonical order, `Dynamic` never matches.
    pub fn is_contiguous(&self, order: LayoutType) -> bool {
        layout::matches_layout(&self.shape, &self.strides, order)
    }

    /// Returns the flat position of a multi-index, checking it against the shape.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::RankMismatch`] for a wrong arity and
    /// [`TensorError::IndexOutOfBounds`] for an index outside an axis extent.
    pub fn element_offset(&self, index: &[usize]) -> Result<usize, TensorError> {
        shape::check_index(&self.shape, index)?;
        Ok(self.element_offset_unchecked(index))
    }

    /// Returns the flat position of a multi-index without validating it.
    #[inline]
    pub fn element_offset_unchecked(&self, index: &[usize]) -> usize {
        shape::element_offset(self.offset, &self.strides, index)
    }

    /// Checks that every reachable flat position lies inside a buffer of `len`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::BufferOverrun`] with the first position found outside.
    pub fn validate(&self, len: usize) -> Result<(), ViewError> {
        if self.is_empty() {
            return Ok(());
        }
        let start = self.offset as isize;
        let (mut min, mut max) = (start, start);
        for (&dim, &stride) in self.shape.iter().zip(&self.strides) {
            let end = stride.saturating_mul(dim as isize - 1);
            if end >= 0 {
                max = max.saturating_add(end);
            } else {
                min = min.saturating_add(end);
            }
        }
        if min < 0 {
            return Err(ViewError::BufferOverrun { position: min, len });
        }
        if max as usize >= len {
            return Err(ViewError::BufferOverrun { position: max, len });
        }
        Ok(())
    }

    /// Returns the layout with the axis order reversed.
    pub fn transposed(&self) -> Self {
        let (shape, strides, layout) = layout::transpose(&self.shape, &self.strides, self.layout);
        log::trace!("transposed view: shape {shape:?} strides {strides:?} layout {layout}");
        Self {
            shape,
            strides,
            offset: self.offset,
            layout,
        }
    }

    /// Returns the layout with its axes reordered, output axis `i` being input axis
    /// `axes[i]`.
    ///
    /// # Errors
    ///
    /// Fails if `axes` is not a permutation of `0..rank`.
    pub fn permuted(&self, axes: &[usize]) -> Result<Self, TensorError> {
        let (shape, strides, layout) =
            layout::permute(&self.shape, &self.strides, self.layout, axes)?;
        log::trace!(
            "permuted view by {axes:?}: shape {shape:?} strides {strides:?} layout {layout}"
        );
        Ok(Self {
            shape,
            strides,
            offset: self.offset,
            layout,
        })
    }

    /// Returns the layout selected by `specs`.
    ///
    /// Ranges scale the axis stride by their step and move the offset to their first
    /// element, fixed indices move the offset and drop the axis, new axes get extent 1
    /// and stride 0. An empty result has offset 0.
    ///
    /// # Errors
    ///
    /// See [`ViewError`] for the rejected slice entries.
    pub fn sliced(&self, specs: &[SliceSpec]) -> Result<Self, ViewError> {
        let plan = slice::plan(&self.shape, specs)?;

        let mut offset = self.offset as isize;
        let mut shape = Shape::new();
        let mut strides = Strides::new();
        for op in &plan {
            match *op {
                AxisOp::Keep { axis } => {
                    shape.push(self.shape[axis]);
                    strides.push(self.strides[axis]);
                }
                AxisOp::Range {
                    axis,
                    start,
                    len,
                    step,
                } => {
                    if len > 0 {
                        offset += start as isize * self.strides[axis];
                    }
                    shape.push(len);
                    strides.push(self.strides[axis] * step);
                }
                AxisOp::Fixed { axis, index } => {
                    offset += index as isize * self.strides[axis];
                }
                AxisOp::Insert => {
                    shape.push(1);
                    strides.push(0);
                }
            }
        }

        let offset = if shape::numel(&shape) == 0 {
            0
        } else {
            offset as usize
        };
        let layout = if plan.iter().all(|op| matches!(op, AxisOp::Keep { .. })) {
            self.layout
        } else {
            layout::classify(&shape, &strides)
        };
        log::trace!(
            "sliced view: shape {shape:?} strides {strides:?} offset {offset} layout {layout}"
        );
        Ok(Self {
            shape,
            strides,
            offset,
            layout,
        })
    }

    /// Calls `f` with the flat position of every element, enumerating multi-indices in
    /// `order`. `ColumnMajor` steps the first axis fastest, anything else the last.
    pub(crate) fn for_each_offset(&self, order: LayoutType, mut f: impl FnMut(usize)) {
        if self.is_empty() {
            return;
        }
        let mut index: Shape = SmallVec::from_elem(0, self.rank());
        loop {
            f(self.element_offset_unchecked(&index));
            if !shape::increment_index(&mut index, &self.shape, order) {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_major(shape: &[usize]) -> Result<StridedLayout, TensorError> {
        StridedLayout::contiguous(shape, LayoutType::RowMajor)
    }

    #[test]
    fn test_contiguous() -> Result<(), TensorError> {
        let l = row_major(&[2, 3, 4])?;
        assert_eq!(l.strides(), &[12, 4, 1]);
        assert_eq!(l.layout(), LayoutType::RowMajor);
        let l = StridedLayout::contiguous(&[2, 3, 4], LayoutType::ColumnMajor)?;
        assert_eq!(l.strides(), &[1, 2, 6]);
        assert_eq!(l.layout(), LayoutType::ColumnMajor);
        assert!(StridedLayout::contiguous(&[2], LayoutType::Dynamic).is_err());
        Ok(())
    }

    #[test]
    fn test_new_classifies() -> Result<(), TensorError> {
        assert_eq!(StridedLayout::new(&[2, 3], &[3, 1], 0)?.layout(), LayoutType::RowMajor);
        assert_eq!(StridedLayout::new(&[2, 3], &[1, 2], 0)?.layout(), LayoutType::ColumnMajor);
        assert_eq!(StridedLayout::new(&[2, 3], &[-3, 1], 3)?.layout(), LayoutType::Dynamic);
        assert!(StridedLayout::new(&[2, 3], &[1], 0).is_err());
        Ok(())
    }

    #[test]
    fn test_transpose_involution() -> Result<(), TensorError> {
        let l = row_major(&[2, 2, 6])?;
        let t = l.transposed();
        assert_eq!(t.shape(), &[6, 2, 2]);
        assert_eq!(t.strides(), &[1, 6, 12]);
        assert_eq!(t.layout(), LayoutType::ColumnMajor);
        assert_eq!(t.transposed(), l);
        Ok(())
    }

    #[test]
    fn test_permute_composition() -> Result<(), TensorError> {
        let l = row_major(&[2, 3, 4])?;
        let p = [1, 2, 0];
        let q = [2, 0, 1];
        let twice = l.permuted(&p)?.permuted(&q)?;
        let once = l.permuted(&layout::compose_permutations(&p, &q))?;
        assert_eq!(twice, once);
        assert_eq!(twice, l);
        Ok(())
    }

    #[test]
    fn test_slice_offsets() -> Result<(), ViewError> {
        let l = row_major(&[24])?;
        let s = l.sliced(&[SliceSpec::range(2, 10, 3)])?;
        assert_eq!(s.shape(), &[3]);
        assert_eq!(s.strides(), &[3]);
        assert_eq!(s.offset(), 2);
        assert_eq!(s.layout(), LayoutType::Dynamic);

        let l = row_major(&[3, 4])?;
        let s = l.sliced(&[SliceSpec::step(-1), SliceSpec::Index(2)])?;
        assert_eq!(s.shape(), &[3]);
        assert_eq!(s.strides(), &[-4]);
        assert_eq!(s.offset(), 10);
        Ok(())
    }

    #[test]
    fn test_slice_newaxis_and_empty() -> Result<(), ViewError> {
        let l = row_major(&[3, 4])?;
        let s = l.sliced(&[SliceSpec::NewAxis, SliceSpec::All, SliceSpec::NewAxis])?;
        assert_eq!(s.shape(), &[1, 3, 1, 4]);
        assert_eq!(s.strides(), &[0, 4, 0, 1]);
        assert_eq!(s.layout(), LayoutType::RowMajor);

        let s = l.sliced(&[SliceSpec::Index(2), SliceSpec::range(3, 1, 1)])?;
        assert_eq!(s.shape(), &[0]);
        assert_eq!(s.offset(), 0);
        assert!(s.is_empty());
        Ok(())
    }

    #[test]
    fn test_slice_all_is_identity() -> Result<(), ViewError> {
        let l = row_major(&[3, 4])?.transposed();
        assert_eq!(l.sliced(&[])?, l);
        assert_eq!(l.sliced(&[SliceSpec::All, SliceSpec::All])?, l);
        Ok(())
    }

    #[test]
    fn test_validate() -> Result<(), TensorError> {
        assert!(row_major(&[2, 3])?.validate(6).is_ok());
        assert!(row_major(&[2, 3])?.validate(5).is_err());
        let reversed = StridedLayout::new(&[3], &[-1], 2)?;
        assert!(reversed.validate(3).is_ok());
        let underflow = StridedLayout::new(&[3], &[-1], 1)?;
        assert_eq!(
            underflow.validate(3),
            Err(ViewError::BufferOverrun {
                position: -1,
                len: 3
            })
        );
        assert!(StridedLayout::new(&[0, 3], &[3, 1], 100)?.validate(0).is_ok());
        Ok(())
    }

    #[test]
    fn test_for_each_offset() -> Result<(), TensorError> {
        let l = row_major(&[2, 3])?;
        let mut row = Vec::new();
        l.for_each_offset(LayoutType::RowMajor, |p| row.push(p));
        assert_eq!(row, vec![0, 1, 2, 3, 4, 5]);
        let mut col = Vec::new();
        l.for_each_offset(LayoutType::ColumnMajor, |p| col.push(p));
        assert_eq!(col, vec![0, 3, 1, 4, 2, 5]);
        Ok(())
    }
}
