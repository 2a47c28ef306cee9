//! Non-owning references into element storage: dims, strides, and a base
//! pointer, independent of how that storage is allocated.

use crate::header::Order;
use crate::shape::{Dyn, RankStorage, Shape};
use crate::slice::{self, SliceError, SliceSpec};
use std::marker::PhantomData;

/// A read-only, non-owning view into a typed element buffer.
pub struct View<'a, T, S: RankStorage> {
    shape: Shape<S>,
    base: *const T,
    _marker: PhantomData<&'a [T]>,
}

/// A mutable, non-owning view into a typed element buffer.
pub struct ViewMut<'a, T, S: RankStorage> {
    shape: Shape<S>,
    base: *mut T,
    _marker: PhantomData<&'a mut [T]>,
}

impl<'a, T, S: RankStorage> View<'a, T, S> {
    pub(crate) fn from_parts(shape: Shape<S>, elems: &'a [T]) -> Self {
        View {
            shape,
            base: elems.as_ptr(),
            _marker: PhantomData,
        }
    }

    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    pub fn strides(&self) -> &[isize] {
        self.shape.strides()
    }

    pub fn order(&self) -> Order {
        self.shape.order()
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    /// Reads the element at `idx`, or `None` if `idx` has the wrong rank
    /// or is out of bounds.
    pub fn get(&self, idx: &[usize]) -> Option<T>
    where
        T: Copy,
    {
        let offset = self.shape.offset_of(idx)?;
        Some(unsafe { *self.base.wrapping_offset(offset) })
    }

    /// Applies a slice expression, producing a new, possibly
    /// rank-changing, view over the same storage.
    pub fn slice(&self, specs: &[SliceSpec]) -> Result<View<'a, T, Dyn>, SliceError>
    where
        T: Copy,
    {
        let applied = slice::apply(self.shape.dims(), self.shape.strides(), specs)?;
        let new_shape = shape_from_applied::<Dyn>(&applied, self.shape.order());
        Ok(View {
            shape: new_shape,
            base: self.base.wrapping_offset(applied.offset),
            _marker: PhantomData,
        })
    }
}

impl<'a, T, S: RankStorage> ViewMut<'a, T, S> {
    pub(crate) fn from_parts(shape: Shape<S>, elems: &'a mut [T]) -> Self {
        ViewMut {
            shape,
            base: elems.as_mut_ptr(),
            _marker: PhantomData,
        }
    }

    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    pub fn strides(&self) -> &[isize] {
        self.shape.strides()
    }

    pub fn order(&self) -> Order {
        self.shape.order()
    }

    pub fn get(&self, idx: &[usize]) -> Option<T>
    where
        T: Copy,
    {
        let offset = self.shape.offset_of(idx)?;
        Some(unsafe { *self.base.wrapping_offset(offset) })
    }

    /// Writes `value` at `idx`, panicking if `idx` is out of bounds.
    pub fn set(&mut self, idx: &[usize], value: T) {
        let offset = self.shape.offset_of(idx).expect("index out of bounds");
        unsafe {
            *self.base.wrapping_offset(offset) = value;
        }
    }

    pub fn as_view(&self) -> View<'_, T, S> {
        View {
            shape: self.shape.clone(),
            base: self.base as *const T,
            _marker: PhantomData,
        }
    }

    /// Applies a slice expression, producing a new mutable, possibly
    /// rank-changing, view over the same storage.
    pub fn slice_mut(&mut self, specs: &[SliceSpec]) -> Result<ViewMut<'a, T, Dyn>, SliceError> {
        let applied = slice::apply(self.shape.dims(), self.shape.strides(), specs)?;
        let new_shape = shape_from_applied::<Dyn>(&applied, self.shape.order());
        Ok(ViewMut {
            shape: new_shape,
            base: self.base.wrapping_offset(applied.offset),
            _marker: PhantomData,
        })
    }
}

/// Builds a [`Shape`] directly from an [`crate::slice::Applied`] result,
/// bypassing `Shape::from_dims`'s stride computation since the slicing
/// algebra already produced the correct strides (which may differ from
/// the canonical C/Fortran layout once `NewAxis`/negative steps are
/// involved).
fn shape_from_applied<S: RankStorage>(applied: &slice::Applied, order: Order) -> Shape<S> {
    Shape::from_raw_parts(applied.dims.clone(), applied.strides.clone(), order)
}
