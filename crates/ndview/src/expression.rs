use ndview_tensor::{shape, LayoutType, Tensor, TensorError};

/// A value-producing multi-dimensional source.
///
/// An expression has a shape and yields an element for every multi-index inside
/// it. It need not be backed by memory: arithmetic nodes from [`crate::ops`] compute
/// their elements on demand, and [`ExprView`](crate::ExprView) re-indexes another
/// expression without touching its elements.
///
/// # Examples
///
/// ```rust
/// use ndview::{Expression, Tensor};
///
/// let t = Tensor::from_shape_vec(&[2, 2], vec![1, 2, 3, 4]).unwrap();
/// assert_eq!(t.eval(&[1, 0]), 3);
/// assert!(t.at(&[2, 0]).is_err());
/// ```
pub trait Expression {
    /// The element type.
    type Elem;

    /// The extent of each axis.
    fn shape(&self) -> &[usize];

    /// The order in which elements are naturally produced.
    ///
    /// Expressions without a meaningful memory order report `Dynamic`.
    fn layout(&self) -> LayoutType {
        LayoutType::Dynamic
    }

    /// Returns the element at `index` without validating it.
    ///
    /// Implementations may panic or return an unspecified element for an index
    /// outside the shape, but must not cause undefined behavior.
    fn eval(&self, index: &[usize]) -> Self::Elem;

    /// Returns the element at `index`, checking arity and bounds.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::RankMismatch`] for a wrong arity and
    /// [`TensorError::IndexOutOfBounds`] for an index outside an axis extent.
    fn at(&self, index: &[usize]) -> Result<Self::Elem, TensorError> {
        shape::check_index(self.shape(), index)?;
        Ok(self.eval(index))
    }
}

/// An [`Expression`] whose elements are addressable storage locations.
pub trait ExpressionMut: Expression {
    /// Returns the storage location of `index` without validating it.
    ///
    /// Implementations may panic for an index outside the shape.
    fn eval_mut(&mut self, index: &[usize]) -> &mut Self::Elem;

    /// Returns the storage location of `index`, checking arity and bounds.
    ///
    /// # Errors
    ///
    /// See [`Expression::at`].
    fn at_mut(&mut self, index: &[usize]) -> Result<&mut Self::Elem, TensorError> {
        shape::check_index(self.shape(), index)?;
        Ok(self.eval_mut(index))
    }
}

impl<E: Expression + ?Sized> Expression for &E {
    type Elem = E::Elem;

    fn shape(&self) -> &[usize] {
        (**self).shape()
    }

    fn layout(&self) -> LayoutType {
        (**self).layout()
    }

    fn eval(&self, index: &[usize]) -> E::Elem {
        (**self).eval(index)
    }
}

impl<E: Expression + ?Sized> Expression for &mut E {
    type Elem = E::Elem;

    fn shape(&self) -> &[usize] {
        (**self).shape()
    }

    fn layout(&self) -> LayoutType {
        (**self).layout()
    }

    fn eval(&self, index: &[usize]) -> E::Elem {
        (**self).eval(index)
    }
}

impl<E: ExpressionMut + ?Sized> ExpressionMut for &mut E {
    fn eval_mut(&mut self, index: &[usize]) -> &mut E::Elem {
        (**self).eval_mut(index)
    }
}

impl<T: Clone> Expression for Tensor<T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        Tensor::shape(self)
    }

    fn layout(&self) -> LayoutType {
        Tensor::layout(self)
    }

    fn eval(&self, index: &[usize]) -> T {
        self.as_slice()[shape::element_offset(0, self.strides(), index)].clone()
    }
}

impl<T: Clone> ExpressionMut for Tensor<T> {
    fn eval_mut(&mut self, index: &[usize]) -> &mut T {
        let pos = shape::element_offset(0, self.strides(), index);
        &mut self.as_slice_mut()[pos]
    }
}

/// Evaluates every element of `expr` into a new row-major tensor.
///
/// # Examples
///
/// ```rust
/// use ndview::{evaluate, ops, Tensor};
///
/// let a = Tensor::from_shape_vec(&[2, 2], vec![1, 2, 3, 4]).unwrap();
/// let b = Tensor::from_shape_vec(&[2, 2], vec![10, 20, 30, 40]).unwrap();
/// let sum = evaluate(&ops::add(&a, &b).unwrap());
/// assert_eq!(sum.as_slice(), &[11, 22, 33, 44]);
/// ```
pub fn evaluate<E: Expression + ?Sized>(expr: &E) -> Tensor<E::Elem> {
    Tensor::from_shape_fn(expr.shape(), |index| expr.eval(index))
}
