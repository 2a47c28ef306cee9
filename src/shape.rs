//! Shape and stride computation, shared between fixed-rank and
//! dynamic-rank arrays and views.

use crate::header::{Header, Order};
use std::error::Error;
use std::fmt;

/// Error building a [`Shape`] from a parsed header.
#[derive(Debug)]
pub enum ShapeError {
    /// The product of the dimensions (or the resulting byte count) does not
    /// fit in `usize`/`isize`.
    SizeOverflow,
    /// A fixed-rank shape was requested with a rank that does not match the
    /// header's dimension count.
    DimensionMismatch { expected: usize, found: usize },
}

impl Error for ShapeError {}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ShapeError::SizeOverflow => write!(f, "shape size overflows usize or isize"),
            ShapeError::DimensionMismatch { expected, found } => write!(
                f,
                "expected {} dimensions, found {}",
                expected, found
            ),
        }
    }
}

/// Computes the number of elements described by `dims`, or `None` on
/// overflow. A rank-0 shape has one element; any zero dimension makes the
/// total zero.
pub fn size_checked(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// Computes `num_elements * byte_width`, `None` on overflow or if the
/// result would not fit in `isize`.
pub fn bytes_checked(num_elements: usize, byte_width: usize) -> Option<usize> {
    let bytes = num_elements.checked_mul(byte_width)?;
    if bytes > isize::MAX as usize {
        None
    } else {
        Some(bytes)
    }
}

/// Computes row-major (C) or column-major (Fortran) strides, in element
/// units, for the given dimensions.
///
/// If any dimension is zero, every stride is zero.
pub fn strides_for(dims: &[usize], order: Order) -> Vec<isize> {
    let rank = dims.len();
    let mut strides = vec![0isize; rank];
    if dims.iter().any(|&d| d == 0) {
        return strides;
    }
    match order {
        Order::C => {
            let mut acc: isize = 1;
            for i in (0..rank).rev() {
                strides[i] = acc;
                acc *= dims[i] as isize;
            }
        }
        Order::Fortran => {
            let mut acc: isize = 1;
            for i in 0..rank {
                strides[i] = acc;
                acc *= dims[i] as isize;
            }
        }
    }
    strides
}

/// Marker trait distinguishing fixed-rank (`Fixed<R>`) from dynamic-rank
/// (`Dyn`) shape/array/view storage.
pub trait RankStorage: Clone {
    type Dims: AsRef<[usize]> + AsMut<[usize]> + Clone + fmt::Debug;
    type Strides: AsRef<[isize]> + AsMut<[isize]> + Clone + fmt::Debug;

    fn dims_from_vec(v: Vec<usize>) -> Result<Self::Dims, ShapeError>;
    fn strides_from_vec(v: Vec<isize>) -> Self::Strides;
}

/// Dynamic (runtime-known) rank: dims/strides are heap-allocated.
#[derive(Clone, Debug)]
pub struct Dyn;

impl RankStorage for Dyn {
    type Dims = Box<[usize]>;
    type Strides = Box<[isize]>;

    fn dims_from_vec(v: Vec<usize>) -> Result<Self::Dims, ShapeError> {
        Ok(v.into_boxed_slice())
    }

    fn strides_from_vec(v: Vec<isize>) -> Self::Strides {
        v.into_boxed_slice()
    }
}

/// Fixed (compile-time-known) rank `R`: dims/strides live in-place.
#[derive(Clone, Debug)]
pub struct Fixed<const R: usize>;

impl<const R: usize> RankStorage for Fixed<R> {
    type Dims = [usize; R];
    type Strides = [isize; R];

    fn dims_from_vec(v: Vec<usize>) -> Result<Self::Dims, ShapeError> {
        <[usize; R]>::try_from(v.as_slice())
            .map_err(|_| ShapeError::DimensionMismatch {
                expected: R,
                found: v.len(),
            })
    }

    fn strides_from_vec(v: Vec<isize>) -> Self::Strides {
        <[isize; R]>::try_from(v.as_slice()).expect("strides length matches dims length")
    }
}

/// A validated shape: dimensions, strides (in element units), memory
/// order, and the cached element count.
#[derive(Clone, Debug)]
pub struct Shape<S: RankStorage> {
    dims: S::Dims,
    strides: S::Strides,
    order: Order,
    num_elements: usize,
}

impl<S: RankStorage> Shape<S> {
    /// Builds a shape directly from dimensions and a memory order,
    /// computing strides and validating that the element and byte counts
    /// do not overflow.
    pub fn from_dims(dims: Vec<usize>, order: Order) -> Result<Self, ShapeError> {
        let num_elements = size_checked(&dims).ok_or(ShapeError::SizeOverflow)?;
        let strides = strides_for(&dims, order);
        let dims = S::dims_from_vec(dims)?;
        let strides = S::strides_from_vec(strides);
        Ok(Shape {
            dims,
            strides,
            order,
            num_elements,
        })
    }

    /// Builds a shape from a parsed `.npy` header, validating that the
    /// header's dimension count matches `S` (for `Fixed<R>`) and that the
    /// resulting sizes don't overflow.
    pub fn from_header(header: &Header, byte_width: usize) -> Result<Self, ShapeError> {
        let shape = Self::from_dims(header.shape.clone(), header.order)?;
        bytes_checked(shape.num_elements, byte_width).ok_or(ShapeError::SizeOverflow)?;
        Ok(shape)
    }

    /// Builds a shape directly from already-computed dims and strides
    /// (e.g. the output of the slicing algebra, whose strides needn't
    /// match the canonical C/Fortran layout once `NewAxis` or negative
    /// steps are involved).
    ///
    /// # Panics
    ///
    /// Panics if `dims.len() != strides.len()` or if the rank doesn't
    /// match `S` (for `Fixed<R>`).
    pub fn from_raw_parts(dims: Vec<usize>, strides: Vec<isize>, order: Order) -> Self {
        assert_eq!(dims.len(), strides.len());
        let num_elements = size_checked(&dims).expect("sliced shape size overflows usize");
        let dims = S::dims_from_vec(dims).expect("sliced shape rank matches storage");
        let strides = S::strides_from_vec(strides);
        Shape {
            dims,
            strides,
            order,
            num_elements,
        }
    }

    pub fn dims(&self) -> &[usize] {
        self.dims.as_ref()
    }

    pub fn strides(&self) -> &[isize] {
        self.strides.as_ref()
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn rank(&self) -> usize {
        self.dims.as_ref().len()
    }

    pub fn num_elements(&self) -> usize {
        self.num_elements
    }

    /// Computes the element offset of `idx`, or `None` if `idx` has the
    /// wrong rank or is out of bounds on any axis.
    pub fn offset_of(&self, idx: &[usize]) -> Option<isize> {
        let dims = self.dims.as_ref();
        let strides = self.strides.as_ref();
        if idx.len() != dims.len() {
            return None;
        }
        let mut offset: isize = 0;
        for ((&i, &d), &s) in idx.iter().zip(dims).zip(strides) {
            if i >= d {
                return None;
            }
            offset += i as isize * s;
        }
        Some(offset)
    }
}
