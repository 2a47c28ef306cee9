//! The NumPy-style slicing algebra: given an input shape and a list of
//! slice specifiers, compute the output dimensions, strides, and base
//! offset relative to the input.

use std::error::Error;
use std::fmt;

/// One element of a slicing expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SliceSpec {
    /// Collapses one input dimension to a point. Negative values count
    /// from the end of the axis.
    Index(isize),
    /// Produces one output dimension from a range of the input axis.
    /// `step` must be nonzero; `start`/`end` default based on its sign.
    Range {
        start: Option<isize>,
        end: Option<isize>,
        step: isize,
    },
    /// Inserts a new output dimension of size 1 and stride 0.
    NewAxis,
    /// Expands to as many default full-axis ranges as needed so that the
    /// index-consuming specifiers account for every input dimension. At
    /// most one is allowed per slice expression.
    Ellipsis,
}

impl SliceSpec {
    /// A full-axis range equivalent to Python's `:`.
    pub fn full() -> SliceSpec {
        SliceSpec::Range {
            start: None,
            end: None,
            step: 1,
        }
    }
}

/// Error applying a slice expression to a shape.
#[derive(Debug)]
pub enum SliceError {
    /// More than one `Ellipsis` appeared in the expression.
    MultipleEllipsis,
    /// The number of index/range specifiers (after ellipsis expansion)
    /// does not match the input rank.
    DimensionMismatch { expected: usize, found: usize },
    /// A `Range`'s `step` was zero.
    InvalidRangeValues,
    /// An `Index` value was out of bounds for its axis after resolving a
    /// negative index.
    InvalidIndexValue { axis: usize, index: isize, dim: usize },
}

impl Error for SliceError {}

impl fmt::Display for SliceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SliceError::MultipleEllipsis => write!(f, "more than one ellipsis in slice expression"),
            SliceError::DimensionMismatch { expected, found } => write!(
                f,
                "slice expression addresses {} dimensions but input has {}",
                found, expected
            ),
            SliceError::InvalidRangeValues => write!(f, "range step must be nonzero"),
            SliceError::InvalidIndexValue { axis, index, dim } => write!(
                f,
                "index {} out of bounds for axis {} with size {}",
                index, axis, dim
            ),
        }
    }
}

/// The result of applying a slice expression: new dims, new strides (in
/// element units), and the base offset (in elements) relative to the
/// input's base.
pub struct Applied {
    pub dims: Vec<usize>,
    pub strides: Vec<isize>,
    pub offset: isize,
}

/// Resolves a possibly-negative index against an axis length.
fn resolve_index(index: isize, dim: usize) -> Option<usize> {
    let dim_i = dim as isize;
    let resolved = if index < 0 { index + dim_i } else { index };
    if resolved < 0 || resolved >= dim_i {
        None
    } else {
        Some(resolved as usize)
    }
}

/// Resolves a `Range`'s start/end/step into a concrete (start, len, step)
/// triple, in element units, clamping an out-of-range `end` rather than
/// rejecting it.
fn resolve_range(
    start: Option<isize>,
    end: Option<isize>,
    step: isize,
    dim: usize,
) -> Result<(isize, usize), SliceError> {
    if step == 0 {
        return Err(SliceError::InvalidRangeValues);
    }
    let dim_i = dim as isize;

    let clamp_fwd = |v: isize| -> isize { v.clamp(0, dim_i) };
    let clamp_bwd = |v: isize| -> isize { v.clamp(-1, dim_i - 1) };

    let normalize = |v: isize| -> isize { if v < 0 { v + dim_i } else { v } };

    let (start, end) = if step > 0 {
        let start = start.map(normalize).map(clamp_fwd).unwrap_or(0);
        let end = end.map(normalize).map(clamp_fwd).unwrap_or(dim_i);
        (start, end)
    } else {
        let start = start.map(normalize).map(clamp_bwd).unwrap_or(dim_i - 1);
        let end = end.map(normalize).map(clamp_bwd).unwrap_or(-1);
        (start, end)
    };

    let len = if step > 0 {
        if end > start {
            ((end - start) + step - 1) / step
        } else {
            0
        }
    } else if start > end {
        ((start - end) + (-step) - 1) / (-step)
    } else {
        0
    };

    Ok((start, len as usize))
}

/// Applies a slice expression to an input shape, expanding at most one
/// `Ellipsis` and validating that the number of dimension-consuming
/// specifiers matches `dims.len()`.
pub fn apply(dims: &[usize], strides: &[isize], specs: &[SliceSpec]) -> Result<Applied, SliceError> {
    let ellipsis_count = specs.iter().filter(|s| matches!(s, SliceSpec::Ellipsis)).count();
    if ellipsis_count > 1 {
        return Err(SliceError::MultipleEllipsis);
    }

    let consuming = specs
        .iter()
        .filter(|s| matches!(s, SliceSpec::Index(_) | SliceSpec::Range { .. }))
        .count();
    if consuming > dims.len() {
        return Err(SliceError::DimensionMismatch {
            expected: dims.len(),
            found: consuming,
        });
    }
    let fill = dims.len() - consuming;

    let mut expanded: Vec<SliceSpec> = Vec::with_capacity(specs.len() + fill);
    let mut ellipsis_seen = false;
    for &spec in specs {
        match spec {
            SliceSpec::Ellipsis => {
                ellipsis_seen = true;
                for _ in 0..fill {
                    expanded.push(SliceSpec::full());
                }
            }
            other => expanded.push(other),
        }
    }
    if !ellipsis_seen && fill > 0 {
        return Err(SliceError::DimensionMismatch {
            expected: dims.len(),
            found: consuming,
        });
    }

    let mut out_dims = Vec::new();
    let mut out_strides = Vec::new();
    let mut offset: isize = 0;
    let mut axis = 0usize;

    for spec in expanded {
        match spec {
            SliceSpec::Index(idx) => {
                let dim = dims[axis];
                let resolved = resolve_index(idx, dim).ok_or(SliceError::InvalidIndexValue {
                    axis,
                    index: idx,
                    dim,
                })?;
                offset += resolved as isize * strides[axis];
                axis += 1;
            }
            SliceSpec::Range { start, end, step } => {
                let dim = dims[axis];
                let (range_start, len) = resolve_range(start, end, step, dim)?;
                offset += range_start * strides[axis];
                out_dims.push(len);
                out_strides.push(strides[axis] * step);
                axis += 1;
            }
            SliceSpec::NewAxis => {
                out_dims.push(1);
                out_strides.push(0);
            }
            SliceSpec::Ellipsis => unreachable!("ellipsis already expanded"),
        }
    }

    debug_assert_eq!(axis, dims.len());

    Ok(Applied {
        dims: out_dims,
        strides: out_strides,
        offset,
    })
}
