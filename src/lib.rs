//! Typed, strided, allocator-free reading and writing of NumPy [`.npy`]
//! files, without depending on an external n-dimensional array crate.
//!
//! # Reading
//!
//! - [`Array::read_npy`] reads a full owning array from any [`std::io::Read`].
//! - [`Array::view_from_bytes`] reinterprets an in-memory byte slice (e.g. a
//!   memory-mapped file) as a borrowing, read-only [`View`], with no copy.
//!
//! # Writing
//!
//! - [`Array::write_npy`] writes a full `.npy` file to any [`std::io::Write`].
//!
//! # Slicing
//!
//! [`View::slice`]/[`ViewMut::slice_mut`] accept a NumPy-style slicing
//! expression ([`SliceSpec`]): indices, ranges with a signed step,
//! `NewAxis`, and at most one `Ellipsis`.
//!
//! # Limitations
//!
//! * Only the element kinds enumerated by [`Kind`] are supported: booleans,
//!   fixed-size integers up to 64 bits, `f32`/`f64`, and (if the
//!   `num-complex-0_4` feature is enabled, which it is by default) complex
//!   floats.
//! * There is no array arithmetic, broadcasting, structured dtype, or
//!   Unicode/object element support.
//! * `.npy` files are always written at native endianness.
//!
//! [`.npy`]: https://numpy.org/doc/stable/reference/generated/numpy.lib.format.html

pub mod array;
pub mod buffer;
pub mod dtype;
pub mod header;
pub mod print;
pub mod shape;
pub mod slice;
pub mod view;

pub use array::{Array, ArrayMut, FromBytesError, ReadNpyError, WriteNpyError};
pub use buffer::{BufferError, Element};
pub use dtype::{Dtype, DtypeError, Endian, Kind};
pub use header::{Header, Order, ParseHeaderError, ReadHeaderError, WriteHeaderError};
pub use shape::{Dyn, Fixed, RankStorage, Shape, ShapeError};
pub use slice::{SliceError, SliceSpec};
pub use view::{View, ViewMut};

#[cfg(feature = "num-complex-0_4")]
pub use num_complex_0_4 as num_complex;
