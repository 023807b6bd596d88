use ndview_tensor::{LayoutType, Tensor, TensorError};

use crate::{
    error::ViewError,
    expression::{Expression, ExpressionMut},
    ravel::{self, Raveled},
    slice::SliceSpec,
    source::{StridedSource, StridedSourceMut},
    strided::StridedLayout,
};

/// A non-owning, read-only strided view into a buffer.
///
/// `TensorView` pairs a borrowed flat buffer with a [`StridedLayout`]. Transposing,
/// permuting and slicing only rewrite the layout, so every view of a tensor shares the
/// tensor's storage and observes its elements directly.
///
/// The transforming methods consume the view and return a view with the same
/// lifetime, so chains like `t.transpose().slice(..)?.permute(..)?` borrow `t` once.
///
/// # Examples
///
/// ```rust
/// use ndview::{LayoutType, SliceSpec, StridedSource, Tensor};
///
/// let t = Tensor::from_shape_vec(&[2, 3], vec![0, 1, 2, 3, 4, 5]).unwrap();
/// let column = t.transpose().slice(&[SliceSpec::Index(2)]).unwrap();
/// assert_eq!(column.shape(), &[2]);
/// assert_eq!(column.to_tensor().as_slice(), &[2, 5]);
/// ```
pub struct TensorView<'a, T> {
    data: &'a [T],
    layout: StridedLayout,
}

impl<'a, T> TensorView<'a, T> {
    /// Creates a view over `data` with explicit shape, strides and offset.
    ///
    /// The layout tag is derived from the strides.
    ///
    /// # Errors
    ///
    /// Fails if shape and strides differ in length or if an element would fall
    /// outside `data`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ndview::TensorView;
    ///
    /// let data = [0, 1, 2, 3, 4, 5];
    /// // walk the buffer backwards two elements at a time
    /// let v = TensorView::new(&data, &[3], &[-2], 5).unwrap();
    /// assert_eq!(v.to_tensor().as_slice(), &[5, 3, 1]);
    /// assert!(TensorView::new(&data, &[4], &[-2], 5).is_err());
    /// ```
    pub fn new(
        data: &'a [T],
        shape: &[usize],
        strides: &[isize],
        offset: usize,
    ) -> Result<Self, ViewError> {
        let layout = StridedLayout::new(shape, strides, offset)?;
        layout.validate(data.len())?;
        Ok(Self::from_parts(data, layout))
    }

    pub(crate) fn from_parts(data: &'a [T], layout: StridedLayout) -> Self {
        Self { data, layout }
    }

    /// The extent of each axis.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// The signed step of each axis.
    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.layout.strides()
    }

    /// The flat position of the all-zero multi-index.
    #[inline]
    pub fn offset(&self) -> usize {
        self.layout.offset()
    }

    /// The layout tag.
    #[inline]
    pub fn layout(&self) -> LayoutType {
        self.layout.layout()
    }

    /// The view metadata.
    #[inline]
    pub fn strided_layout(&self) -> &StridedLayout {
        &self.layout
    }

    /// The number of axes.
    #[inline]
    pub fn rank(&self) -> usize {
        self.layout.rank()
    }

    /// The number of elements visible through the view.
    #[inline]
    pub fn numel(&self) -> usize {
        self.layout.numel()
    }

    /// Returns true if the view has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// The whole borrowed buffer, including elements the view does not select.
    #[inline]
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns true if both views borrow the same buffer.
    #[inline]
    pub fn shares_buffer(&self, other: &TensorView<'_, T>) -> bool {
        std::ptr::eq(self.data, other.data)
    }

    /// Get the element at the given index, checking arity and bounds.
    pub fn get(&self, index: &[usize]) -> Result<&'a T, TensorError> {
        let offset = self.layout.element_offset(index)?;
        Ok(&self.data[offset])
    }

    /// Get the element at the given index without checking arity or bounds.
    ///
    /// # Safety
    ///
    /// The index must have one entry per axis, each below its extent.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: &[usize]) -> &'a T {
        let offset = self.layout.element_offset_unchecked(index);
        self.data.get_unchecked(offset)
    }

    /// Returns the view with the axis order reversed.
    pub fn transpose(self) -> Self {
        Self::from_parts(self.data, self.layout.transposed())
    }

    /// Returns the view with output axis `i` being axis `axes[i]`.
    ///
    /// # Errors
    ///
    /// Fails if `axes` is not a permutation of `0..rank`.
    pub fn permute(self, axes: &[usize]) -> Result<Self, TensorError> {
        let layout = self.layout.permuted(axes)?;
        Ok(Self::from_parts(self.data, layout))
    }

    /// Returns the view restricted by `specs`.
    ///
    /// # Errors
    ///
    /// See [`ViewError`] for the rejected slice entries.
    pub fn slice(self, specs: &[SliceSpec]) -> Result<Self, ViewError> {
        let layout = self.layout.sliced(specs)?;
        Ok(Self::from_parts(self.data, layout))
    }

    /// Returns the elements as a rank-1 sequence in `order`, borrowing when the view
    /// is contiguous in `order`.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::InvalidLayout`] for `LayoutType::Dynamic`.
    pub fn ravel(self, order: LayoutType) -> Result<Raveled<'a, T>, TensorError>
    where
        T: Clone,
    {
        let order = ravel::resolve_order(order)?;
        Ok(ravel::ravel_strided(self.data, &self.layout, order))
    }

    /// Returns the elements as a rank-1 sequence in row-major order.
    pub fn flatten(self) -> Raveled<'a, T>
    where
        T: Clone,
    {
        ravel::ravel_strided(self.data, &self.layout, LayoutType::RowMajor)
    }

    /// Copies the visible elements into a new row-major tensor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ndview::{StridedSource, Tensor};
    ///
    /// let t = Tensor::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
    /// let contiguous = t.permute(&[1, 0]).unwrap().to_tensor();
    /// assert_eq!(contiguous.as_slice(), &[1, 4, 2, 5, 3, 6]);
    /// ```
    pub fn to_tensor(&self) -> Tensor<T>
    where
        T: Clone,
    {
        Tensor::from_shape_fn(self.shape(), |index| {
            self.data[self.layout.element_offset_unchecked(index)].clone()
        })
    }
}

impl<T> Clone for TensorView<'_, T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data,
            layout: self.layout.clone(),
        }
    }
}

impl<T> std::fmt::Debug for TensorView<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorView")
            .field("shape", &self.shape())
            .field("strides", &self.strides())
            .field("offset", &self.offset())
            .field("layout", &self.layout())
            .finish()
    }
}

impl<T> std::ops::Index<&[usize]> for TensorView<'_, T> {
    type Output = T;

    fn index(&self, index: &[usize]) -> &T {
        match self.get(index) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T, const N: usize> std::ops::Index<[usize; N]> for TensorView<'_, T> {
    type Output = T;

    fn index(&self, index: [usize; N]) -> &T {
        &self[&index[..]]
    }
}

impl<T> StridedSource for TensorView<'_, T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    fn strides(&self) -> &[isize] {
        self.layout.strides()
    }

    fn offset(&self) -> usize {
        self.layout.offset()
    }

    fn layout(&self) -> LayoutType {
        self.layout.layout()
    }

    fn data(&self) -> &[T] {
        self.data
    }

    fn strided_layout(&self) -> StridedLayout {
        self.layout.clone()
    }
}

impl<T: Clone> Expression for TensorView<'_, T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    fn layout(&self) -> LayoutType {
        self.layout.layout()
    }

    fn eval(&self, index: &[usize]) -> T {
        self.data[self.layout.element_offset_unchecked(index)].clone()
    }
}

/// A non-owning strided view that can write through to its buffer.
///
/// `TensorViewMut` holds the unique borrow of its buffer, so no other view of the
/// same tensor can exist while it is alive. Writes through it are visible in the
/// source once the view is dropped.
///
/// # Examples
///
/// ```rust
/// use ndview::{StridedSourceMut, Tensor};
///
/// let mut t = Tensor::<i32>::arange(24).unwrap().reshape(&[2, 2, 6]).unwrap();
/// t.transpose_mut()[[0, 0, 1]] = 123;
/// assert_eq!(t[[1, 0, 0]], 123);
/// ```
pub struct TensorViewMut<'a, T> {
    data: &'a mut [T],
    layout: StridedLayout,
}

impl<'a, T> TensorViewMut<'a, T> {
    /// Creates a mutable view over `data` with explicit shape, strides and offset.
    ///
    /// # Errors
    ///
    /// Fails if shape and strides differ in length or if an element would fall
    /// outside `data`.
    pub fn new(
        data: &'a mut [T],
        shape: &[usize],
        strides: &[isize],
        offset: usize,
    ) -> Result<Self, ViewError> {
        let layout = StridedLayout::new(shape, strides, offset)?;
        layout.validate(data.len())?;
        Ok(Self::from_parts(data, layout))
    }

    pub(crate) fn from_parts(data: &'a mut [T], layout: StridedLayout) -> Self {
        Self { data, layout }
    }

    /// The extent of each axis.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// The signed step of each axis.
    #[inline]
    pub fn strides(&self) -> &[isize] {
        self.layout.strides()
    }

    /// The flat position of the all-zero multi-index.
    #[inline]
    pub fn offset(&self) -> usize {
        self.layout.offset()
    }

    /// The layout tag.
    #[inline]
    pub fn layout(&self) -> LayoutType {
        self.layout.layout()
    }

    /// The view metadata.
    #[inline]
    pub fn strided_layout(&self) -> &StridedLayout {
        &self.layout
    }

    /// The number of axes.
    #[inline]
    pub fn rank(&self) -> usize {
        self.layout.rank()
    }

    /// The number of elements visible through the view.
    #[inline]
    pub fn numel(&self) -> usize {
        self.layout.numel()
    }

    /// Returns true if the view has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// Get the element at the given index, checking arity and bounds.
    pub fn get(&self, index: &[usize]) -> Result<&T, TensorError> {
        let offset = self.layout.element_offset(index)?;
        Ok(&self.data[offset])
    }

    /// Get a mutable reference to the element at the given index, checking arity and
    /// bounds.
    pub fn get_mut(&mut self, index: &[usize]) -> Result<&mut T, TensorError> {
        let offset = self.layout.element_offset(index)?;
        Ok(&mut self.data[offset])
    }

    /// Get a mutable reference to the element at the given index without checking
    /// arity or bounds.
    ///
    /// # Safety
    ///
    /// The index must have one entry per axis, each below its extent.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: &[usize]) -> &mut T {
        let offset = self.layout.element_offset_unchecked(index);
        self.data.get_unchecked_mut(offset)
    }

    /// Returns a shorter-lived mutable view of the same elements.
    pub fn reborrow(&mut self) -> TensorViewMut<'_, T> {
        TensorViewMut::from_parts(&mut *self.data, self.layout.clone())
    }

    /// Converts into a read-only view with the same lifetime.
    pub fn into_view(self) -> TensorView<'a, T> {
        TensorView::from_parts(self.data, self.layout)
    }

    /// Returns the view with the axis order reversed.
    pub fn transpose(self) -> Self {
        let layout = self.layout.transposed();
        Self::from_parts(self.data, layout)
    }

    /// Returns the view with output axis `i` being axis `axes[i]`.
    ///
    /// # Errors
    ///
    /// Fails if `axes` is not a permutation of `0..rank`.
    pub fn permute(self, axes: &[usize]) -> Result<Self, TensorError> {
        let layout = self.layout.permuted(axes)?;
        Ok(Self::from_parts(self.data, layout))
    }

    /// Returns the view restricted by `specs`.
    ///
    /// # Errors
    ///
    /// See [`ViewError`] for the rejected slice entries.
    pub fn slice(self, specs: &[SliceSpec]) -> Result<Self, ViewError> {
        let layout = self.layout.sliced(specs)?;
        Ok(Self::from_parts(self.data, layout))
    }

    /// Writes `value` to every visible element.
    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        let data = &mut *self.data;
        self.layout
            .for_each_offset(LayoutType::RowMajor, |pos| data[pos] = value.clone());
    }

    /// Writes the elements of `expr` to the visible elements at the same multi-index.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::ShapeMismatch`] if the shapes differ. Nothing is
    /// written in that case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ndview::{StridedSource, StridedSourceMut, Tensor};
    ///
    /// let src = Tensor::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
    /// let mut dst = Tensor::<i32>::zeros(&[3, 2]);
    /// dst.transpose_mut().assign(&src).unwrap();
    /// assert_eq!(dst, src.transpose().to_tensor());
    /// ```
    pub fn assign<E>(&mut self, expr: &E) -> Result<(), TensorError>
    where
        E: Expression<Elem = T> + ?Sized,
    {
        if expr.shape() != self.shape() {
            return Err(TensorError::shape_mismatch(self.shape(), expr.shape()));
        }
        if self.is_empty() {
            return Ok(());
        }
        let mut index = ndview_tensor::Shape::from_elem(0, self.rank());
        loop {
            let pos = self.layout.element_offset_unchecked(&index);
            self.data[pos] = expr.eval(&index);
            let shape = self.layout.shape();
            if !ndview_tensor::shape::increment_index(&mut index, shape, LayoutType::RowMajor) {
                return Ok(());
            }
        }
    }

    /// Copies the visible elements into a new row-major tensor.
    pub fn to_tensor(&self) -> Tensor<T>
    where
        T: Clone,
    {
        Tensor::from_shape_fn(self.shape(), |index| {
            self.data[self.layout.element_offset_unchecked(index)].clone()
        })
    }
}

impl<T> std::fmt::Debug for TensorViewMut<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorViewMut")
            .field("shape", &self.shape())
            .field("strides", &self.strides())
            .field("offset", &self.offset())
            .field("layout", &self.layout())
            .finish()
    }
}

impl<T> std::ops::Index<&[usize]> for TensorViewMut<'_, T> {
    type Output = T;

    fn index(&self, index: &[usize]) -> &T {
        match self.get(index) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T> std::ops::IndexMut<&[usize]> for TensorViewMut<'_, T> {
    fn index_mut(&mut self, index: &[usize]) -> &mut T {
        match self.get_mut(index) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T, const N: usize> std::ops::Index<[usize; N]> for TensorViewMut<'_, T> {
    type Output = T;

    fn index(&self, index: [usize; N]) -> &T {
        &self[&index[..]]
    }
}

impl<T, const N: usize> std::ops::IndexMut<[usize; N]> for TensorViewMut<'_, T> {
    fn index_mut(&mut self, index: [usize; N]) -> &mut T {
        &mut self[&index[..]]
    }
}

impl<T> StridedSource for TensorViewMut<'_, T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    fn strides(&self) -> &[isize] {
        self.layout.strides()
    }

    fn offset(&self) -> usize {
        self.layout.offset()
    }

    fn layout(&self) -> LayoutType {
        self.layout.layout()
    }

    fn data(&self) -> &[T] {
        self.data
    }

    fn strided_layout(&self) -> StridedLayout {
        self.layout.clone()
    }
}

impl<T> StridedSourceMut for TensorViewMut<'_, T> {
    fn data_mut(&mut self) -> &mut [T] {
        &mut *self.data
    }
}

impl<T: Clone> Expression for TensorViewMut<'_, T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    fn layout(&self) -> LayoutType {
        self.layout.layout()
    }

    fn eval(&self, index: &[usize]) -> T {
        self.data[self.layout.element_offset_unchecked(index)].clone()
    }
}

impl<T: Clone> ExpressionMut for TensorViewMut<'_, T> {
    fn eval_mut(&mut self, index: &[usize]) -> &mut T {
        let pos = self.layout.element_offset_unchecked(index);
        &mut self.data[pos]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arange(shape: &[usize]) -> Result<Tensor<i32>, TensorError> {
        let numel = ndview_tensor::shape::numel(shape);
        Tensor::arange(numel)?.reshape(shape)
    }

    #[test]
    fn test_view_from_parts() -> Result<(), ViewError> {
        let data = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let view = TensorView::new(&data, &[8], &[1], 0)?;
        assert_eq!(view.numel(), 8);
        assert_eq!(view.layout(), LayoutType::RowMajor);
        assert_eq!(view.get(&[0])?, &1);
        assert_eq!(view.get(&[7])?, &8);
        assert!(view.get(&[8]).is_err());
        assert_eq!(unsafe { view.get_unchecked(&[3]) }, &4);
        Ok(())
    }

    #[test]
    fn test_view_rejects_overrun() {
        let data = [0u8; 6];
        assert!(matches!(
            TensorView::new(&data, &[2, 3], &[3, 1], 1),
            Err(ViewError::BufferOverrun { position: 6, len: 6 })
        ));
        assert!(matches!(
            TensorView::new(&data, &[2, 3], &[3], 0),
            Err(ViewError::TensorError(TensorError::RankMismatch { .. }))
        ));
    }

    #[test]
    fn test_transpose_shares_buffer() -> Result<(), TensorError> {
        let t = arange(&[2, 2, 6])?;
        let v = t.view();
        let vt = t.transpose();
        assert!(vt.shares_buffer(&v));
        assert_eq!(vt.shape(), &[6, 2, 2]);
        for i in 0..6 {
            for j in 0..2 {
                for k in 0..2 {
                    assert_eq!(vt[[i, j, k]], t[[k, j, i]]);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_chained_views() -> Result<(), ViewError> {
        let t = arange(&[3, 4])?;
        let v = t.transpose().slice(&[SliceSpec::step(-1)])?.permute(&[1, 0])?;
        assert_eq!(v.shape(), &[3, 4]);
        assert_eq!(v[[0, 0]], 3);
        assert_eq!(v[[2, 3]], 8);
        assert_eq!(v.layout(), LayoutType::Dynamic);
        Ok(())
    }

    #[test]
    fn test_to_tensor() -> Result<(), TensorError> {
        let t = arange(&[2, 3])?;
        let c = t.transpose().to_tensor();
        assert_eq!(c.shape(), &[3, 2]);
        assert_eq!(c.as_slice(), &[0, 3, 1, 4, 2, 5]);
        assert_eq!(c.layout(), LayoutType::RowMajor);
        Ok(())
    }

    #[test]
    fn test_assign_through_permuted_view() -> Result<(), TensorError> {
        let src = arange(&[2, 3, 4])?;
        let mut dst = Tensor::<i32>::zeros(&[4, 2, 3]);
        dst.permute_mut(&[1, 2, 0])?.assign(&src)?;
        for i in 0..2 {
            for j in 0..3 {
                for k in 0..4 {
                    assert_eq!(dst[[k, i, j]], src[[i, j, k]]);
                }
            }
        }
        let err = dst.view_mut().assign(&src);
        assert!(matches!(err, Err(TensorError::ShapeMismatch { .. })));
        Ok(())
    }

    #[test]
    fn test_reborrow_and_into_view() -> Result<(), TensorError> {
        let mut t = arange(&[2, 2])?;
        let mut v = t.transpose_mut();
        v.reborrow()[[0, 1]] = 10;
        v[[1, 0]] = 20;
        let ro = v.into_view();
        assert_eq!(ro[[0, 1]], 10);
        assert_eq!(t.as_slice(), &[0, 20, 10, 3]);
        Ok(())
    }

    #[test]
    #[should_panic(expected = "Index 2 out of bounds for axis 0 of size 2")]
    fn test_index_panics() {
        let data = [1, 2, 3, 4];
        if let Ok(v) = TensorView::new(&data, &[2, 2], &[2, 1], 0) {
            let _value = v[[2, 0]];
        }
    }
}
