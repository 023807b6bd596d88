use ndview_tensor::{LayoutType, Tensor, TensorError};

use crate::{
    error::ViewError,
    ravel::{self, Raveled},
    slice::SliceSpec,
    strided::StridedLayout,
    view::{TensorView, TensorViewMut},
};

/// A source of elements with a strided memory layout.
///
/// Implementors expose a flat buffer together with the shape, strides, base offset
/// and layout tag that address it. The provided methods build zero-copy views over
/// that buffer: every returned view borrows the source, so the borrow checker keeps
/// the source alive and prevents writes to it for as long as the view exists.
///
/// # Examples
///
/// ```rust
/// use ndview::{LayoutType, StridedSource, Tensor};
///
/// let t = Tensor::from_shape_vec(&[2, 3], vec![0, 1, 2, 3, 4, 5]).unwrap();
/// let v = t.transpose();
/// assert_eq!(v.shape(), &[3, 2]);
/// assert_eq!(v.layout(), LayoutType::ColumnMajor);
/// assert_eq!(v[[2, 1]], 5);
/// ```
pub trait StridedSource {
    /// The element type.
    type Elem;

    /// The extent of each axis.
    fn shape(&self) -> &[usize];

    /// The signed step of each axis.
    fn strides(&self) -> &[isize];

    /// The flat position of the all-zero multi-index.
    fn offset(&self) -> usize;

    /// The layout tag of the stride pattern.
    fn layout(&self) -> LayoutType;

    /// The whole flat buffer the strides address.
    fn data(&self) -> &[Self::Elem];

    /// Returns a copy of the view metadata.
    fn strided_layout(&self) -> StridedLayout {
        StridedLayout::from_parts(self.shape(), self.strides(), self.offset(), self.layout())
    }

    /// Returns the flat position of a multi-index, checking arity and bounds.
    fn element_offset(&self, index: &[usize]) -> Result<usize, TensorError> {
        self.strided_layout().element_offset(index)
    }

    /// Returns a view presenting the source unchanged.
    fn view(&self) -> TensorView<'_, Self::Elem> {
        TensorView::from_parts(self.data(), self.strided_layout())
    }

    /// Returns a view with the axis order reversed.
    fn transpose(&self) -> TensorView<'_, Self::Elem> {
        self.view().transpose()
    }

    /// Returns a view whose axis `i` is source axis `axes[i]`.
    ///
    /// # Errors
    ///
    /// Fails if `axes` is not a permutation of `0..rank`.
    fn permute(&self, axes: &[usize]) -> Result<TensorView<'_, Self::Elem>, TensorError> {
        self.view().permute(axes)
    }

    /// Returns a view selecting the elements described by `specs`.
    ///
    /// # Errors
    ///
    /// See [`ViewError`] for the rejected slice entries.
    fn slice(&self, specs: &[SliceSpec]) -> Result<TensorView<'_, Self::Elem>, ViewError> {
        self.view().slice(specs)
    }

    /// Returns the elements as a rank-1 sequence in `order`.
    ///
    /// The result borrows the source when it is contiguous in `order` and owns a copy
    /// otherwise. `Any` is read as row-major.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::InvalidLayout`] for `LayoutType::Dynamic`.
    fn ravel(&self, order: LayoutType) -> Result<Raveled<'_, Self::Elem>, TensorError>
    where
        Self::Elem: Clone,
    {
        let order = ravel::resolve_order(order)?;
        Ok(ravel::ravel_strided(self.data(), &self.strided_layout(), order))
    }

    /// Returns the elements as a rank-1 sequence in row-major order.
    fn flatten(&self) -> Raveled<'_, Self::Elem>
    where
        Self::Elem: Clone,
    {
        ravel::ravel_strided(self.data(), &self.strided_layout(), LayoutType::RowMajor)
    }
}

/// A [`StridedSource`] whose buffer can be written through.
pub trait StridedSourceMut: StridedSource {
    /// The whole flat buffer the strides address, mutably.
    fn data_mut(&mut self) -> &mut [Self::Elem];

    /// Returns a mutable view presenting the source unchanged.
    fn view_mut(&mut self) -> TensorViewMut<'_, Self::Elem> {
        let layout = self.strided_layout();
        TensorViewMut::from_parts(self.data_mut(), layout)
    }

    /// Returns a mutable view with the axis order reversed.
    fn transpose_mut(&mut self) -> TensorViewMut<'_, Self::Elem> {
        self.view_mut().transpose()
    }

    /// Returns a mutable view whose axis `i` is source axis `axes[i]`.
    ///
    /// # Errors
    ///
    /// Fails if `axes` is not a permutation of `0..rank`.
    fn permute_mut(
        &mut self,
        axes: &[usize],
    ) -> Result<TensorViewMut<'_, Self::Elem>, TensorError> {
        self.view_mut().permute(axes)
    }

    /// Returns a mutable view selecting the elements described by `specs`.
    ///
    /// # Errors
    ///
    /// See [`ViewError`] for the rejected slice entries.
    fn slice_mut(
        &mut self,
        specs: &[SliceSpec],
    ) -> Result<TensorViewMut<'_, Self::Elem>, ViewError> {
        self.view_mut().slice(specs)
    }
}

impl<T> StridedSource for Tensor<T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        Tensor::shape(self)
    }

    fn strides(&self) -> &[isize] {
        Tensor::strides(self)
    }

    fn offset(&self) -> usize {
        0
    }

    fn layout(&self) -> LayoutType {
        Tensor::layout(self)
    }

    fn data(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> StridedSourceMut for Tensor<T> {
    fn data_mut(&mut self) -> &mut [T] {
        self.as_slice_mut()
    }
}
