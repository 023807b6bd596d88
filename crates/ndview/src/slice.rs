use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use smallvec::SmallVec;

use crate::error::ViewError;

/// One entry of a dynamic slice.
///
/// Entries are consumed left to right. `All`, `Range` and `Index` each consume one
/// source axis, `NewAxis` consumes none. Source axes left over after the last entry
/// are kept unchanged.
///
/// # Examples
///
/// ```rust
/// use ndview::SliceSpec;
///
/// // elements 2, 5 and 8 of an axis of extent 10
/// let a = SliceSpec::range(2, 10, 3);
/// assert_eq!(a, SliceSpec::Range { start: Some(2), stop: Some(10), step: 3 });
///
/// // walk an axis backwards
/// let b = SliceSpec::step(-1);
/// assert_eq!(b, SliceSpec::Range { start: None, stop: None, step: -1 });
///
/// // std ranges convert to unit-step ranges
/// assert_eq!(SliceSpec::from(1..4), SliceSpec::range(1, 4, 1));
/// assert_eq!(SliceSpec::from(..), SliceSpec::All);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SliceSpec {
    /// Keep the axis unchanged.
    All,
    /// Select `start, start + step, ...` while before `stop`.
    ///
    /// An omitted `start` is the first element in traversal direction: 0 for a
    /// positive step, `size - 1` for a negative one. An omitted `stop` runs to the
    /// end of the axis in traversal direction.
    Range {
        /// First selected index
        start: Option<usize>,
        /// Exclusive end
        stop: Option<usize>,
        /// Signed, non-zero step
        step: isize,
    },
    /// Fix the axis at one index and drop it from the result.
    Index(usize),
    /// Insert an axis of extent 1 without consuming a source axis.
    NewAxis,
}

impl SliceSpec {
    /// A fully bounded range.
    pub fn range(start: usize, stop: usize, step: isize) -> Self {
        Self::Range {
            start: Some(start),
            stop: Some(stop),
            step,
        }
    }

    /// Every `step`-th element in traversal direction.
    ///
    /// A negative step walks the axis backwards from its last element.
    pub fn step(step: isize) -> Self {
        Self::Range {
            start: None,
            stop: None,
            step,
        }
    }

    /// Returns true if the entry consumes a source axis.
    #[inline]
    pub fn consumes_axis(&self) -> bool {
        !matches!(self, Self::NewAxis)
    }
}

impl From<usize> for SliceSpec {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<Range<usize>> for SliceSpec {
    fn from(r: Range<usize>) -> Self {
        Self::range(r.start, r.end, 1)
    }
}

impl From<RangeFrom<usize>> for SliceSpec {
    fn from(r: RangeFrom<usize>) -> Self {
        Self::Range {
            start: Some(r.start),
            stop: None,
            step: 1,
        }
    }
}

impl From<RangeTo<usize>> for SliceSpec {
    fn from(r: RangeTo<usize>) -> Self {
        Self::Range {
            start: None,
            stop: Some(r.end),
            step: 1,
        }
    }
}

impl From<RangeFull> for SliceSpec {
    fn from(_: RangeFull) -> Self {
        Self::All
    }
}

/// Builds a `Vec<SliceSpec>` from heterogeneous entries.
///
/// Each entry is converted with `SliceSpec::from`, so integers, std ranges and
/// `SliceSpec` values can be mixed.
///
/// # Examples
///
/// ```rust
/// use ndview::{s, SliceSpec};
///
/// let specs = s![1, .., SliceSpec::NewAxis, 2..];
/// assert_eq!(specs.len(), 4);
/// assert_eq!(specs[0], SliceSpec::Index(1));
/// ```
#[macro_export]
macro_rules! s {
    ($($entry:expr),* $(,)?) => {
        ::std::vec![$($crate::SliceSpec::from($entry)),*]
    };
}

/// The resolved effect of a slice on one output or source axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AxisOp {
    /// Source axis `axis` carried through unchanged.
    Keep { axis: usize },
    /// Source axis `axis` restricted to `len` elements from `start` in steps of `step`.
    Range {
        axis: usize,
        start: usize,
        len: usize,
        step: isize,
    },
    /// Source axis `axis` fixed at `index`, producing no output axis.
    Fixed { axis: usize, index: usize },
    /// New output axis of extent 1.
    Insert,
}

impl AxisOp {
    /// The extent of the output axis this op produces, if any.
    pub(crate) fn extent(&self, shape: &[usize]) -> Option<usize> {
        match *self {
            Self::Keep { axis } => Some(shape[axis]),
            Self::Range { len, .. } => Some(len),
            Self::Fixed { .. } => None,
            Self::Insert => Some(1),
        }
    }
}

/// A slice resolved against a concrete source shape.
pub(crate) type SlicePlan = SmallVec<[AxisOp; 4]>;

/// Resolves `specs` against `shape`, validating every entry.
///
/// The result lists one op per entry, followed by `Keep` for each remaining source
/// axis, so the output axes are the non-`Fixed` ops in order.
pub(crate) fn plan(shape: &[usize], specs: &[SliceSpec]) -> Result<SlicePlan, ViewError> {
    let rank = shape.len();
    let count = specs.iter().filter(|s| s.consumes_axis()).count();
    if count > rank {
        return Err(ViewError::TooManySlices { count, rank });
    }

    let mut ops = SlicePlan::with_capacity(specs.len() + rank - count);
    let mut axis = 0;
    for spec in specs {
        let op = match *spec {
            SliceSpec::All => AxisOp::Keep { axis },
            SliceSpec::Index(index) => {
                if index >= shape[axis] {
                    return Err(ViewError::SliceOutOfBounds {
                        axis,
                        index,
                        size: shape[axis],
                    });
                }
                AxisOp::Fixed { axis, index }
            }
            SliceSpec::Range { start, stop, step } => {
                let (start, len) = normalize_range(axis, shape[axis], start, stop, step)?;
                AxisOp::Range {
                    axis,
                    start,
                    len,
                    step,
                }
            }
            SliceSpec::NewAxis => {
                ops.push(AxisOp::Insert);
                continue;
            }
        };
        ops.push(op);
        axis += 1;
    }
    ops.extend((axis..rank).map(|axis| AxisOp::Keep { axis }));
    Ok(ops)
}

/// Returns the first selected index and the number of selected elements.
///
/// Explicit bounds must lie in `0..=size`. When the selection is non-empty the start
/// is a valid index of the axis.
fn normalize_range(
    axis: usize,
    size: usize,
    start: Option<usize>,
    stop: Option<usize>,
    step: isize,
) -> Result<(usize, usize), ViewError> {
    if step == 0 {
        return Err(ViewError::ZeroStep { axis });
    }
    for bound in [start, stop].into_iter().flatten() {
        if bound > size {
            return Err(ViewError::SliceOutOfBounds {
                axis,
                index: bound,
                size,
            });
        }
    }

    let abs = step.unsigned_abs();
    if step > 0 {
        let start = start.unwrap_or(0);
        let stop = stop.unwrap_or(size);
        let len = if stop > start {
            (stop - start).div_ceil(abs)
        } else {
            0
        };
        return Ok((start, len));
    }

    if size == 0 {
        return Ok((0, 0));
    }
    let start = start.unwrap_or(size - 1);
    let len = match stop {
        Some(stop) if stop >= start => 0,
        Some(stop) => (start - stop).div_ceil(abs),
        None => (start + 1).div_ceil(abs),
    };
    if len > 0 && start >= size {
        return Err(ViewError::SliceOutOfBounds {
            axis,
            index: start,
            size,
        });
    }
    Ok((start, len))
}
