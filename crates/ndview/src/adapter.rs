use ndview_tensor::{
    layout::{self, LayoutType},
    shape::{self, Shape, Strides},
    Tensor, TensorError,
};
use smallvec::SmallVec;

use crate::{
    error::ViewError,
    expression::{Expression, ExpressionMut},
    ravel,
    slice::{self, AxisOp, SliceSpec},
};

/// Where one output axis of an [`ExprView`] reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AxisMap {
    /// The source axis advanced by this axis, `None` for an inserted axis.
    source: Option<usize>,
    /// Signed source step per output step.
    step: isize,
}

/// A lazily re-indexed view of an arbitrary expression.
///
/// `ExprView` stores an affine map from its own multi-indices to multi-indices of
/// the wrapped expression: every output axis advances one source axis by a signed
/// step, and source axes that no output axis advances are held at a fixed origin.
/// Transposing, permuting and slicing compose into that map, so a chain of
/// adapters costs one index translation per element.
///
/// A canonical tag of the expression is tracked through transposes and permutations
/// with the same algebra as strided views, applied to the strides the tag implies.
/// Slicing, and expressions reporting `Dynamic` or `Any`, give `Dynamic`.
///
/// # Examples
///
/// ```rust
/// use ndview::{adapter, Expression, SliceSpec, Tensor};
///
/// let t = Tensor::<i32>::arange(24).unwrap();
/// let v = adapter::dynamic_view(&t, &[SliceSpec::range(2, 10, 3)]).unwrap();
/// assert_eq!(v.shape(), &[3]);
/// assert_eq!(v.eval(&[0]), 2);
/// assert_eq!(v.eval(&[1]), 5);
/// ```
#[derive(Debug, Clone)]
pub struct ExprView<E> {
    expr: E,
    shape: Shape,
    axes: SmallVec<[AxisMap; 4]>,
    origin: SmallVec<[usize; 4]>,
    layout: LayoutType,
    /// Strides the layout tag stands for, while it is canonical.
    implied: Option<Strides>,
}

impl<E: Expression> ExprView<E> {
    /// Wraps `expr` with the identity map.
    pub fn new(expr: E) -> Self {
        let shape: Shape = SmallVec::from_slice(expr.shape());
        let rank = shape.len();
        let implied = match expr.layout() {
            order @ (LayoutType::RowMajor | LayoutType::ColumnMajor) => {
                shape::strides_from_shape(&shape, order).ok()
            }
            _ => None,
        };
        let layout = match &implied {
            Some(strides) => layout::resolve(&shape, strides, expr.layout()),
            None => LayoutType::Dynamic,
        };
        Self {
            expr,
            shape,
            axes: (0..rank)
                .map(|axis| AxisMap {
                    source: Some(axis),
                    step: 1,
                })
                .collect(),
            origin: SmallVec::from_elem(0, rank),
            layout,
            implied,
        }
    }

    /// The wrapped expression.
    pub fn expression(&self) -> &E {
        &self.expr
    }

    /// Unwraps the expression, discarding the map.
    pub fn into_inner(self) -> E {
        self.expr
    }

    /// Reverses the axis order.
    pub fn transpose(mut self) -> Self {
        if let Some(strides) = &self.implied {
            let (_, strides, layout) = layout::transpose(&self.shape, strides, self.layout);
            self.implied = Some(strides);
            self.layout = layout;
        }
        self.shape.reverse();
        self.axes.reverse();
        self
    }

    /// Reorders the axes, output axis `i` being current axis `axes[i]`.
    ///
    /// # Errors
    ///
    /// Fails if `axes` is not a permutation of `0..rank`.
    pub fn permute(mut self, axes: &[usize]) -> Result<Self, TensorError> {
        layout::validate_permutation(axes, self.shape.len())?;
        if let Some(strides) = &self.implied {
            let (_, strides, layout) = layout::permute(&self.shape, strides, self.layout, axes)?;
            self.implied = Some(strides);
            self.layout = layout;
        }
        self.shape = axes.iter().map(|&a| self.shape[a]).collect();
        self.axes = axes.iter().map(|&a| self.axes[a]).collect();
        Ok(self)
    }

    /// Restricts the view with `specs`, see [`SliceSpec`].
    ///
    /// # Errors
    ///
    /// See [`ViewError`] for the rejected slice entries.
    pub fn slice(mut self, specs: &[SliceSpec]) -> Result<Self, ViewError> {
        let plan = slice::plan(&self.shape, specs)?;
        if plan.iter().all(|op| matches!(op, AxisOp::Keep { .. })) {
            return Ok(self);
        }

        let mut shape = Shape::new();
        let mut axes: SmallVec<[AxisMap; 4]> = SmallVec::new();
        for op in &plan {
            if let Some(extent) = op.extent(&self.shape) {
                shape.push(extent);
            }
            match *op {
                AxisOp::Keep { axis } => axes.push(self.axes[axis]),
                AxisOp::Range {
                    axis,
                    start,
                    len,
                    step,
                } => {
                    let map = self.axes[axis];
                    if len > 0 {
                        self.advance(map, start);
                    }
                    axes.push(AxisMap {
                        source: map.source,
                        step: map.step * step,
                    });
                }
                AxisOp::Fixed { axis, index } => self.advance(self.axes[axis], index),
                AxisOp::Insert => axes.push(AxisMap {
                    source: None,
                    step: 0,
                }),
            }
        }

        log::trace!("sliced expression view: shape {shape:?}");
        self.shape = shape;
        self.axes = axes;
        self.layout = LayoutType::Dynamic;
        self.implied = None;
        Ok(self)
    }

    /// Moves the origin `count` steps along the source axis behind `map`.
    fn advance(&mut self, map: AxisMap, count: usize) {
        if let Some(source) = map.source {
            let moved = self.origin[source] as isize + map.step * count as isize;
            self.origin[source] = moved as usize;
        }
    }

    /// Translates an output multi-index to a source multi-index.
    fn source_index(&self, index: &[usize]) -> Shape {
        let mut src = self.origin.clone();
        for (&i, map) in index.iter().zip(&self.axes) {
            if let Some(source) = map.source {
                src[source] = (src[source] as isize + map.step * i as isize) as usize;
            }
        }
        src
    }
}

impl<E: Expression> Expression for ExprView<E> {
    type Elem = E::Elem;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> LayoutType {
        self.layout
    }

    fn eval(&self, index: &[usize]) -> E::Elem {
        self.expr.eval(&self.source_index(index))
    }
}

impl<E: ExpressionMut> ExpressionMut for ExprView<E> {
    fn eval_mut(&mut self, index: &[usize]) -> &mut E::Elem {
        let src = self.source_index(index);
        self.expr.eval_mut(&src)
    }
}

/// Wraps `expr` in an identity [`ExprView`].
pub fn view<E: Expression>(expr: E) -> ExprView<E> {
    ExprView::new(expr)
}

/// Returns `expr` with its axis order reversed.
///
/// # Examples
///
/// ```rust
/// use ndview::{adapter, ops, Expression, LayoutType, Tensor};
///
/// let a = Tensor::from_shape_vec(&[2, 3], vec![0, 1, 2, 3, 4, 5]).unwrap();
/// let b = Tensor::from_shape_vec(&[2, 3], vec![5, 4, 3, 2, 1, 0]).unwrap();
/// let t = adapter::transpose(ops::add(&a, &b).unwrap());
/// assert_eq!(t.shape(), &[3, 2]);
/// assert_eq!(t.eval(&[2, 1]), 5);
/// assert_eq!(t.layout(), LayoutType::ColumnMajor);
/// ```
pub fn transpose<E: Expression>(expr: E) -> ExprView<E> {
    ExprView::new(expr).transpose()
}

/// Returns `expr` with output axis `i` being axis `axes[i]`.
///
/// # Errors
///
/// Fails if `axes` is not a permutation of `0..rank`.
pub fn permute<E: Expression>(expr: E, axes: &[usize]) -> Result<ExprView<E>, TensorError> {
    ExprView::new(expr).permute(axes)
}

/// Returns `expr` restricted by `specs`.
///
/// # Errors
///
/// See [`ViewError`] for the rejected slice entries.
pub fn dynamic_view<E: Expression>(expr: E, specs: &[SliceSpec]) -> Result<ExprView<E>, ViewError> {
    ExprView::new(expr).slice(specs)
}

/// Evaluates `expr` into a rank-1 tensor in `order`.
///
/// Expressions have no buffer to share, so the result is always a copy. `Any` is
/// read as row-major.
///
/// # Errors
///
/// Returns [`TensorError::InvalidLayout`] for `LayoutType::Dynamic`.
pub fn ravel<E: Expression + ?Sized>(
    expr: &E,
    order: LayoutType,
) -> Result<Tensor<E::Elem>, TensorError> {
    let order = ravel::resolve_order(order)?;
    Ok(collect(expr, order))
}

/// Evaluates `expr` into a rank-1 tensor in row-major order.
pub fn flatten<E: Expression + ?Sized>(expr: &E) -> Tensor<E::Elem> {
    collect(expr, LayoutType::RowMajor)
}

fn collect<E: Expression + ?Sized>(expr: &E, order: LayoutType) -> Tensor<E::Elem> {
    let dims = expr.shape();
    let numel = shape::numel(dims);
    log::debug!("evaluating {numel} expression elements in {order} order");

    let mut out = Vec::with_capacity(numel);
    if numel > 0 {
        let mut index: Shape = SmallVec::from_elem(0, dims.len());
        loop {
            out.push(expr.eval(&index));
            if !shape::increment_index(&mut index, dims, order) {
                break;
            }
        }
    }
    Tensor::from_vec(out)
}
