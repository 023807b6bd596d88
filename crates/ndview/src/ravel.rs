use ndview_tensor::{LayoutType, Tensor, TensorError};

use crate::{source::StridedSource, strided::StridedLayout, view::TensorView};

/// The rank-1 sequence produced by ravelling a strided source.
///
/// When the source is contiguous in the requested order the sequence is a view
/// sharing the source's buffer. Otherwise the elements are copied into an owned
/// tensor. Both variants index the same way.
///
/// # Examples
///
/// ```rust
/// use ndview::{LayoutType, StridedSource, Tensor};
///
/// let t = Tensor::from_shape_vec(&[2, 3], vec![0, 1, 2, 3, 4, 5]).unwrap();
///
/// let row = t.ravel(LayoutType::RowMajor).unwrap();
/// assert!(row.is_view());
/// assert_eq!(row.to_vec(), vec![0, 1, 2, 3, 4, 5]);
///
/// let col = t.ravel(LayoutType::ColumnMajor).unwrap();
/// assert!(!col.is_view());
/// assert_eq!(col.to_vec(), vec![0, 3, 1, 4, 2, 5]);
/// ```
#[derive(Debug, Clone)]
pub enum Raveled<'a, T> {
    /// Zero-copy view over the source buffer.
    View(TensorView<'a, T>),
    /// Copy of the elements in the requested order.
    Owned(Tensor<T>),
}

impl<T> Raveled<'_, T> {
    /// Returns true if the sequence shares the source buffer.
    #[inline]
    pub fn is_view(&self) -> bool {
        matches!(self, Self::View(_))
    }

    /// The number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::View(v) => v.numel(),
            Self::Owned(t) => t.numel(),
        }
    }

    /// Returns true if the sequence has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the element at position `k`.
    pub fn get(&self, k: usize) -> Result<&T, TensorError> {
        match self {
            Self::View(v) => v.get(&[k]),
            Self::Owned(t) => t.get(&[k]),
        }
    }

    /// Iterates over the elements in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let data: &[T] = match self {
            Self::View(v) if !v.is_empty() => &v.as_slice()[v.offset()..v.offset() + v.numel()],
            Self::View(_) => &[],
            Self::Owned(t) => t.as_slice(),
        };
        data.iter()
    }

    /// Copies the elements into a `Vec`.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Converts into an owned rank-1 tensor, copying only if the sequence is a view.
    pub fn into_tensor(self) -> Tensor<T>
    where
        T: Clone,
    {
        match self {
            Self::View(v) => v.to_tensor(),
            Self::Owned(t) => t,
        }
    }
}

impl<T: PartialEq> PartialEq for Raveled<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T> std::ops::Index<usize> for Raveled<'_, T> {
    type Output = T;

    fn index(&self, k: usize) -> &T {
        match self.get(k) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<T> StridedSource for Raveled<'_, T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        match self {
            Self::View(v) => v.shape(),
            Self::Owned(t) => t.shape(),
        }
    }

    fn strides(&self) -> &[isize] {
        match self {
            Self::View(v) => v.strides(),
            Self::Owned(t) => t.strides(),
        }
    }

    fn offset(&self) -> usize {
        match self {
            Self::View(v) => v.offset(),
            Self::Owned(_) => 0,
        }
    }

    fn layout(&self) -> LayoutType {
        match self {
            Self::View(v) => v.layout(),
            Self::Owned(t) => t.layout(),
        }
    }

    fn data(&self) -> &[T] {
        match self {
            Self::View(v) => v.as_slice(),
            Self::Owned(t) => t.as_slice(),
        }
    }
}

/// Maps a requested ravel order to a concrete traversal order.
pub(crate) fn resolve_order(order: LayoutType) -> Result<LayoutType, TensorError> {
    match order {
        LayoutType::RowMajor | LayoutType::ColumnMajor => Ok(order),
        LayoutType::Any => Ok(LayoutType::RowMajor),
        LayoutType::Dynamic => Err(TensorError::InvalidLayout(order)),
    }
}

/// Ravels the elements addressed by `layout` in `data`. `order` must be canonical.
pub(crate) fn ravel_strided<'a, T: Clone>(
    data: &'a [T],
    layout: &StridedLayout,
    order: LayoutType,
) -> Raveled<'a, T> {
    let numel = layout.numel();
    if layout.is_contiguous(order) {
        let flat = StridedLayout::from_parts(&[numel], &[1], layout.offset(), LayoutType::RowMajor);
        return Raveled::View(TensorView::from_parts(data, flat));
    }

    log::debug!(
        "ravel copies {numel} elements: strides {:?} are not contiguous in {order} order",
        layout.strides()
    );
    let mut out = Vec::with_capacity(numel);
    layout.for_each_offset(order, |pos| out.push(data[pos].clone()));
    Raveled::Owned(Tensor::from_vec(out))
}
