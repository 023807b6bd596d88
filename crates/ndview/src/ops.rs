use std::marker::PhantomData;

use ndview_tensor::{LayoutType, TensorError};

use crate::expression::Expression;

/// An element-wise binary operator.
pub trait BinaryOp<L, R> {
    /// The result element type.
    type Output;

    /// Combines two elements.
    fn apply(lhs: L, rhs: R) -> Self::Output;
}

macro_rules! binary_op {
    ($(#[$meta:meta])* $name:ident, $trait:ident, $method:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl<L: std::ops::$trait<R>, R> BinaryOp<L, R> for $name {
            type Output = L::Output;

            #[inline]
            fn apply(lhs: L, rhs: R) -> Self::Output {
                std::ops::$trait::$method(lhs, rhs)
            }
        }
    };
}

binary_op!(
    /// Element-wise `+`.
    AddOp,
    Add,
    add
);
binary_op!(
    /// Element-wise `-`.
    SubOp,
    Sub,
    sub
);
binary_op!(
    /// Element-wise `*`.
    MulOp,
    Mul,
    mul
);

/// A lazy element-wise combination of two expressions of equal shape.
///
/// Elements are computed on every [`Expression::eval`] call. The node reports the
/// operands' layout when both agree and `Dynamic` otherwise.
#[derive(Debug, Clone)]
pub struct Binary<L, R, Op> {
    lhs: L,
    rhs: R,
    layout: LayoutType,
    _op: PhantomData<Op>,
}

impl<L, R, Op> Binary<L, R, Op>
where
    L: Expression,
    R: Expression,
    Op: BinaryOp<L::Elem, R::Elem>,
{
    /// Combines `lhs` and `rhs` with `Op`.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::ShapeMismatch`] if the operand shapes differ.
    pub fn new(lhs: L, rhs: R) -> Result<Self, TensorError> {
        if lhs.shape() != rhs.shape() {
            return Err(TensorError::shape_mismatch(lhs.shape(), rhs.shape()));
        }
        let layout = if lhs.layout() == rhs.layout() {
            lhs.layout()
        } else {
            LayoutType::Dynamic
        };
        Ok(Self {
            lhs,
            rhs,
            layout,
            _op: PhantomData,
        })
    }

    /// The left operand.
    pub fn lhs(&self) -> &L {
        &self.lhs
    }

    /// The right operand.
    pub fn rhs(&self) -> &R {
        &self.rhs
    }
}

impl<L, R, Op> Expression for Binary<L, R, Op>
where
    L: Expression,
    R: Expression,
    Op: BinaryOp<L::Elem, R::Elem>,
{
    type Elem = Op::Output;

    fn shape(&self) -> &[usize] {
        self.lhs.shape()
    }

    fn layout(&self) -> LayoutType {
        self.layout
    }

    fn eval(&self, index: &[usize]) -> Self::Elem {
        Op::apply(self.lhs.eval(index), self.rhs.eval(index))
    }
}

/// Lazy element-wise sum of two expressions.
///
/// # Errors
///
/// Returns [`TensorError::ShapeMismatch`] if the operand shapes differ.
pub fn add<L, R>(lhs: L, rhs: R) -> Result<Binary<L, R, AddOp>, TensorError>
where
    L: Expression,
    R: Expression,
    L::Elem: std::ops::Add<R::Elem>,
{
    Binary::new(lhs, rhs)
}

/// Lazy element-wise difference of two expressions.
///
/// # Errors
///
/// Returns [`TensorError::ShapeMismatch`] if the operand shapes differ.
pub fn sub<L, R>(lhs: L, rhs: R) -> Result<Binary<L, R, SubOp>, TensorError>
where
    L: Expression,
    R: Expression,
    L::Elem: std::ops::Sub<R::Elem>,
{
    Binary::new(lhs, rhs)
}

/// Lazy element-wise product of two expressions.
///
/// # Errors
///
/// Returns [`TensorError::ShapeMismatch`] if the operand shapes differ.
pub fn mul<L, R>(lhs: L, rhs: R) -> Result<Binary<L, R, MulOp>, TensorError>
where
    L: Expression,
    R: Expression,
    L::Elem: std::ops::Mul<R::Elem>,
{
    Binary::new(lhs, rhs)
}
