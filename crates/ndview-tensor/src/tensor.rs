use num_traits::{NumCast, Zero};
use smallvec::SmallVec;

use crate::{
    layout::LayoutType,
    shape::{self, Shape, Strides},
    storage::TensorStorage,
    TensorError,
};

/// A dynamic-rank multi-dimensional array with owned, contiguous data.
///
/// `Tensor` combines a flat [`TensorStorage`] with the shape, strides and layout tag
/// describing how the flat buffer is laid out. A tensor is always contiguous in its
/// native layout, row-major by default or column-major on request, and its
/// all-zero multi-index sits at flat position 0.
///
/// # Examples
///
/// ```rust
/// use ndview_tensor::{LayoutType, Tensor};
///
/// let t = Tensor::from_shape_vec(&[2, 3], vec![0, 1, 2, 3, 4, 5]).unwrap();
/// assert_eq!(t.shape(), &[2, 3]);
/// assert_eq!(t.strides(), &[3, 1]);
/// assert_eq!(t.layout(), LayoutType::RowMajor);
/// assert_eq!(t[[1, 2]], 5);
/// ```
#[derive(Clone)]
pub struct Tensor<T> {
    storage: TensorStorage<T>,
    shape: Shape,
    strides: Strides,
    layout: LayoutType,
}

impl<T> Tensor<T> {
    /// Creates a row-major tensor with the given shape and data.
    ///
    /// # Errors
    ///
    /// If the number of elements in the data does not match the shape, an error is
    /// returned.
    ///
    /// # Example
    ///
    /// ```
    /// use ndview_tensor::Tensor;
    ///
    /// let t = Tensor::from_shape_vec(&[2, 2], vec![1u8, 2, 3, 4]).unwrap();
    /// assert_eq!(t.shape(), &[2, 2]);
    /// assert!(Tensor::from_shape_vec(&[2, 3], vec![1u8, 2, 3, 4]).is_err());
    /// ```
    pub fn from_shape_vec(shape: &[usize], data: Vec<T>) -> Result<Self, TensorError> {
        Self::from_shape_vec_with_layout(shape, data, LayoutType::RowMajor)
    }

    /// Creates a tensor interpreting the flat data in the given layout.
    ///
    /// `LayoutType::Any` is interpreted as row-major.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::InvalidShape`] if the element count does not match and
    /// [`TensorError::InvalidLayout`] for `LayoutType::Dynamic`.
    ///
    /// # Example
    ///
    /// ```
    /// use ndview_tensor::{LayoutType, Tensor};
    ///
    /// let data = vec![0, 3, 1, 4, 2, 5];
    /// let t = Tensor::from_shape_vec_with_layout(&[2, 3], data, LayoutType::ColumnMajor).unwrap();
    /// assert_eq!(t.strides(), &[1, 2]);
    /// assert_eq!(t[[0, 1]], 1);
    /// assert_eq!(t[[1, 0]], 3);
    /// ```
    pub fn from_shape_vec_with_layout(
        shape: &[usize],
        data: Vec<T>,
        layout: LayoutType,
    ) -> Result<Self, TensorError> {
        let numel = shape::numel(shape);
        if numel != data.len() {
            return Err(TensorError::invalid_shape(numel, data.len()));
        }
        let strides = shape::strides_from_shape(shape, layout)?;
        let layout = match layout {
            LayoutType::Any => LayoutType::RowMajor,
            other => other,
        };
        Ok(Self {
            storage: TensorStorage::from_vec(data),
            shape: SmallVec::from_slice(shape),
            strides,
            layout,
        })
    }

    /// Creates a rank-1 tensor owning `data`.
    pub fn from_vec(data: Vec<T>) -> Self {
        let shape = [data.len()];
        Self {
            storage: TensorStorage::from_vec(data),
            shape: SmallVec::from_slice(&shape),
            strides: shape::row_major_strides(&shape),
            layout: LayoutType::RowMajor,
        }
    }

    /// Creates a row-major tensor copying the data from a slice.
    ///
    /// # Errors
    ///
    /// If the number of elements in the data does not match the shape, an error is
    /// returned.
    pub fn from_shape_slice(shape: &[usize], data: &[T]) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        Self::from_shape_vec(shape, data.to_vec())
    }

    /// Creates a row-major tensor filled with `value`.
    ///
    /// # Example
    ///
    /// ```
    /// use ndview_tensor::Tensor;
    ///
    /// let t = Tensor::from_shape_val(&[2, 1, 3], 2u8);
    /// assert_eq!(t.as_slice(), &[2, 2, 2, 2, 2, 2]);
    /// ```
    pub fn from_shape_val(shape: &[usize], value: T) -> Self
    where
        T: Clone,
    {
        let data = vec![value; shape::numel(shape)];
        Self {
            storage: TensorStorage::from_vec(data),
            shape: SmallVec::from_slice(shape),
            strides: shape::row_major_strides(shape),
            layout: LayoutType::RowMajor,
        }
    }

    /// Creates a row-major tensor from a function of the multi-index.
    ///
    /// # Example
    ///
    /// ```
    /// use ndview_tensor::Tensor;
    ///
    /// let t = Tensor::from_shape_fn(&[2, 2], |idx| (idx[0] * 2 + idx[1]) as u8);
    /// assert_eq!(t.as_slice(), &[0, 1, 2, 3]);
    /// ```
    pub fn from_shape_fn<F>(shape: &[usize], f: F) -> Self
    where
        F: Fn(&[usize]) -> T,
    {
        let numel = shape::numel(shape);
        let mut data = Vec::with_capacity(numel);
        if numel > 0 {
            let mut index: Shape = SmallVec::from_elem(0, shape.len());
            loop {
                data.push(f(&index));
                if !shape::increment_index(&mut index, shape, LayoutType::RowMajor) {
                    break;
                }
            }
        }
        Self {
            storage: TensorStorage::from_vec(data),
            shape: SmallVec::from_slice(shape),
            strides: shape::row_major_strides(shape),
            layout: LayoutType::RowMajor,
        }
    }

    /// Creates a row-major tensor with all elements set to zero.
    pub fn zeros(shape: &[usize]) -> Self
    where
        T: Clone + Zero,
    {
        Self::from_shape_val(shape, T::zero())
    }

    /// Creates a rank-1 tensor holding `0, 1, ..., n - 1`.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::CastError`] if a value does not fit in `T`.
    ///
    /// # Example
    ///
    /// ```
    /// use ndview_tensor::Tensor;
    ///
    /// let t = Tensor::<f64>::arange(4).unwrap();
    /// assert_eq!(t.as_slice(), &[0.0, 1.0, 2.0, 3.0]);
    /// assert!(Tensor::<u8>::arange(300).is_err());
    /// ```
    pub fn arange(n: usize) -> Result<Self, TensorError>
    where
        T: NumCast,
    {
        let data = (0..n)
            .map(|i| <T as NumCast>::from(i).ok_or(TensorError::CastError))
            .collect::<Result<Vec<T>, _>>()?;
        Self::from_shape_vec(&[n], data)
    }

    /// Reinterprets the tensor with a new shape, keeping its storage and native layout.
    ///
    /// # Errors
    ///
    /// If the number of elements in the new shape does not match the number of
    /// elements in the tensor, an error is returned.
    ///
    /// # Example
    ///
    /// ```
    /// use ndview_tensor::Tensor;
    ///
    /// let t = Tensor::<f64>::arange(24).unwrap().reshape(&[2, 2, 6]).unwrap();
    /// assert_eq!(t.strides(), &[12, 6, 1]);
    /// assert_eq!(t[[1, 0, 0]], 12.0);
    /// ```
    pub fn reshape(self, shape: &[usize]) -> Result<Self, TensorError> {
        let numel = shape::numel(shape);
        if numel != self.numel() {
            return Err(TensorError::invalid_shape(numel, self.numel()));
        }
        let strides = shape::strides_from_shape(shape, self.layout)?;
        Ok(Self {
            storage: self.storage,
            shape: SmallVec::from_slice(shape),
            strides,
            layout: self.layout,
        })
    }

    /// Returns the shape of the tensor.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the strides of the tensor.
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Returns the native layout of the tensor.
    #[inline]
    pub fn layout(&self) -> LayoutType {
        self.layout
    }

    /// Returns the number of axes.
    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Returns the number of elements in the tensor.
    #[inline]
    pub fn numel(&self) -> usize {
        self.storage.len()
    }

    /// Returns the underlying storage.
    #[inline]
    pub fn storage(&self) -> &TensorStorage<T> {
        &self.storage
    }

    /// Get the data of the tensor as a slice, in native layout order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.storage.as_slice()
    }

    /// Get the data of the tensor as a mutable slice, in native layout order.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        self.storage.as_mut_slice()
    }

    /// Get the data of the tensor as a pointer.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    /// Consumes the tensor and returns the underlying vector.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.storage.into_vec()
    }

    /// Get the flat offset of the element at the given index.
    ///
    /// # Errors
    ///
    /// Returns a usage error for an index of the wrong arity and a bounds error for an
    /// index outside the shape.
    pub fn offset_of(&self, index: &[usize]) -> Result<usize, TensorError> {
        shape::check_index(&self.shape, index)?;
        Ok(shape::element_offset(0, &self.strides, index))
    }

    /// Get the element at the given index, checking arity and bounds.
    ///
    /// # Example
    ///
    /// ```
    /// use ndview_tensor::Tensor;
    ///
    /// let t = Tensor::from_shape_vec(&[2, 2], vec![1u8, 2, 3, 4]).unwrap();
    /// assert_eq!(t.get(&[1, 0]), Ok(&3));
    /// assert!(t.get(&[2, 0]).unwrap_err().is_bounds_error());
    /// assert!(t.get(&[0, 0, 0]).unwrap_err().is_usage_error());
    /// ```
    pub fn get(&self, index: &[usize]) -> Result<&T, TensorError> {
        let offset = self.offset_of(index)?;
        Ok(&self.storage.as_slice()[offset])
    }

    /// Get a mutable reference to the element at the given index, checking arity and
    /// bounds.
    pub fn get_mut(&mut self, index: &[usize]) -> Result<&mut T, TensorError> {
        let offset = self.offset_of(index)?;
        Ok(&mut self.storage.as_mut_slice()[offset])
    }

    /// Get the element at the given index without checking arity or bounds.
    ///
    /// # Safety
    ///
    /// The index must have one entry per axis, each below its extent.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: &[usize]) -> &T {
        let offset = shape::element_offset(0, &self.strides, index);
        self.storage.as_slice().get_unchecked(offset)
    }
}

impl<T> std::ops::Index<&[usize]> for Tensor<T> {
    type Output = T;

    fn index(&self, index: &[usize]) -> &T {
        match self.get(index) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T> std::ops::IndexMut<&[usize]> for Tensor<T> {
    fn index_mut(&mut self, index: &[usize]) -> &mut T {
        match self.get_mut(index) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T, const N: usize> std::ops::Index<[usize; N]> for Tensor<T> {
    type Output = T;

    fn index(&self, index: [usize; N]) -> &T {
        &self[&index[..]]
    }
}

impl<T, const N: usize> std::ops::IndexMut<[usize; N]> for Tensor<T> {
    fn index_mut(&mut self, index: [usize; N]) -> &mut T {
        &mut self[&index[..]]
    }
}

/// Two tensors are equal when their shapes match and every multi-index holds equal
/// elements, regardless of their native layouts.
impl<T: PartialEq> PartialEq for Tensor<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.shape != other.shape {
            return false;
        }
        if self.strides == other.strides {
            return self.as_slice() == other.as_slice();
        }
        if self.numel() == 0 {
            return true;
        }
        let mut index: Shape = SmallVec::from_elem(0, self.rank());
        loop {
            let lhs = &self.as_slice()[shape::element_offset(0, &self.strides, &index)];
            let rhs = &other.as_slice()[shape::element_offset(0, &other.strides, &index)];
            if lhs != rhs {
                return false;
            }
            if !shape::increment_index(&mut index, &self.shape, LayoutType::RowMajor) {
                return true;
            }
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("strides", &self.strides)
            .field("layout", &self.layout)
            .field("data", &self.as_slice())
            .finish()
    }
}
