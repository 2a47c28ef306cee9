//! Owning array values: compile-time or runtime rank, owned or borrowed
//! element storage, mutable or read-only.

use crate::buffer::{self, BufferError, Element};
use crate::dtype::Dtype;
use crate::header::{Header, Order, ReadHeaderError, WriteHeaderError};
use crate::shape::{Dyn, RankStorage, Shape, ShapeError};
use crate::view::{View, ViewMut};
use std::error::Error;
use std::fmt;
use std::io;

/// Error constructing an array from a byte slice (header + element body).
#[derive(Debug)]
pub enum FromBytesError {
    Header(ReadHeaderError),
    Shape(ShapeError),
    Buffer(BufferError),
}

impl Error for FromBytesError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FromBytesError::Header(err) => Some(err),
            FromBytesError::Shape(err) => Some(err),
            FromBytesError::Buffer(err) => Some(err),
        }
    }
}

impl fmt::Display for FromBytesError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FromBytesError::Header(err) => write!(f, "error reading header: {}", err),
            FromBytesError::Shape(err) => write!(f, "error validating shape: {}", err),
            FromBytesError::Buffer(err) => write!(f, "error interpreting element buffer: {}", err),
        }
    }
}

impl From<ReadHeaderError> for FromBytesError {
    fn from(err: ReadHeaderError) -> Self {
        FromBytesError::Header(err)
    }
}
impl From<ShapeError> for FromBytesError {
    fn from(err: ShapeError) -> Self {
        FromBytesError::Shape(err)
    }
}
impl From<BufferError> for FromBytesError {
    fn from(err: BufferError) -> Self {
        FromBytesError::Buffer(err)
    }
}

/// Error reading an owning array from a [`std::io::Read`].
#[derive(Debug)]
pub enum ReadNpyError {
    /// An error caused by I/O, distinct from [`ReadHeaderError`]'s own `Io`
    /// variant so that callers opening the file themselves can convert its
    /// error with `?` too.
    Io(io::Error),
    Header(ReadHeaderError),
    Shape(ShapeError),
    Buffer(BufferError),
}

impl Error for ReadNpyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ReadNpyError::Io(err) => Some(err),
            ReadNpyError::Header(err) => Some(err),
            ReadNpyError::Shape(err) => Some(err),
            ReadNpyError::Buffer(err) => Some(err),
        }
    }
}

impl fmt::Display for ReadNpyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReadNpyError::Io(err) => write!(f, "I/O error: {}", err),
            ReadNpyError::Header(err) => write!(f, "error reading header: {}", err),
            ReadNpyError::Shape(err) => write!(f, "error validating shape: {}", err),
            ReadNpyError::Buffer(err) => write!(f, "error reading elements: {}", err),
        }
    }
}

impl From<io::Error> for ReadNpyError {
    fn from(err: io::Error) -> Self {
        ReadNpyError::Io(err)
    }
}
impl From<ReadHeaderError> for ReadNpyError {
    fn from(err: ReadHeaderError) -> Self {
        ReadNpyError::Header(err)
    }
}
impl From<ShapeError> for ReadNpyError {
    fn from(err: ShapeError) -> Self {
        ReadNpyError::Shape(err)
    }
}
impl From<BufferError> for ReadNpyError {
    fn from(err: BufferError) -> Self {
        ReadNpyError::Buffer(err)
    }
}

/// Error writing an owning array to a [`std::io::Write`].
#[derive(Debug)]
pub enum WriteNpyError {
    Header(WriteHeaderError),
    Io(io::Error),
}

impl Error for WriteNpyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WriteNpyError::Header(err) => Some(err),
            WriteNpyError::Io(err) => Some(err),
        }
    }
}

impl fmt::Display for WriteNpyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WriteNpyError::Header(err) => write!(f, "error writing header: {}", err),
            WriteNpyError::Io(err) => write!(f, "I/O error writing elements: {}", err),
        }
    }
}

impl From<WriteHeaderError> for WriteNpyError {
    fn from(err: WriteHeaderError) -> Self {
        WriteNpyError::Header(err)
    }
}
impl From<io::Error> for WriteNpyError {
    fn from(err: io::Error) -> Self {
        WriteNpyError::Io(err)
    }
}

/// An owning, read-only array: a validated [`Shape`] plus a contiguous
/// `Vec<T>` of elements in the shape's native layout order.
#[derive(Clone, Debug)]
pub struct Array<T, S: RankStorage> {
    shape: Shape<S>,
    data: Vec<T>,
}

/// A mutable owning array. Distinct from [`Array`] so that mutating
/// methods (`set`) are absent at compile time on the read-only type.
#[derive(Clone, Debug)]
pub struct ArrayMut<T, S: RankStorage> {
    inner: Array<T, S>,
}

impl<T: Element, S: RankStorage> Array<T, S> {
    /// Allocates a zero-filled array of the given dimensions.
    pub fn zeros(dims: Vec<usize>, order: Order) -> Result<Self, ShapeError>
    where
        T: Default,
    {
        let shape = Shape::from_dims(dims, order)?;
        let data = vec![T::default(); shape.num_elements()];
        Ok(Array { shape, data })
    }

    pub fn shape(&self) -> &Shape<S> {
        &self.shape
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn view(&self) -> View<'_, T, S> {
        View::from_parts(self.shape.clone(), &self.data)
    }

    /// Writes this array to `writer` as an `.npy` file, labeling the dtype
    /// as native-endian.
    pub fn write_npy<W: io::Write>(&self, dtype: Dtype, mut writer: W) -> Result<(), WriteNpyError> {
        let header = Header {
            dtype,
            order: self.shape.order(),
            shape: self.shape.dims().to_vec(),
        };
        header.write(&mut writer)?;
        buffer::write_slice(&self.data, &mut writer)?;
        Ok(())
    }
}

impl<T: Element> Array<T, Dyn> {
    /// Parses a header from the front of `bytes` and validates that the
    /// remaining bytes are an aligned, exact-length element buffer. The
    /// returned view borrows `bytes` rather than copying it.
    pub fn view_from_bytes(bytes: &[u8]) -> Result<View<'_, T, Dyn>, FromBytesError> {
        let (header, consumed) = Header::from_prefix(bytes)?;
        let shape = Shape::<Dyn>::from_header(&header, header.dtype.byte_width())?;
        let body = &bytes[consumed..];
        let elems = buffer::as_typed_slice::<T>(body, shape.num_elements(), header.dtype)?;
        Ok(View::from_parts(shape, elems))
    }

    /// Mutable counterpart of [`Array::view_from_bytes`], primarily for
    /// use with memory-mapped files: parses the header, then reinterprets
    /// the remaining bytes as a mutable, in-place element buffer.
    pub fn view_mut_from_bytes(bytes: &mut [u8]) -> Result<ViewMut<'_, T, Dyn>, FromBytesError> {
        let (header, consumed) = Header::from_prefix(bytes)?;
        let shape = Shape::<Dyn>::from_header(&header, header.dtype.byte_width())?;
        let body = &mut bytes[consumed..];
        let elems = buffer::as_typed_slice_mut::<T>(body, shape.num_elements(), header.dtype)?;
        Ok(ViewMut::from_parts(shape, elems))
    }

    /// Reads a full owning array from `reader`: header, then elements
    /// (byte-swapped into native order if necessary).
    pub fn read_npy<R: io::Read>(mut reader: R) -> Result<Array<T, Dyn>, ReadNpyError> {
        let header = Header::from_reader(&mut reader)?;
        let shape = Shape::<Dyn>::from_header(&header, header.dtype.byte_width())?;
        let mut data = vec![unsafe { std::mem::zeroed::<T>() }; shape.num_elements()];
        buffer::read_into(&mut data, &mut reader, header.dtype)?;
        Ok(Array { shape, data })
    }

    /// Writes an `.npy` header for `dims` to `file`, then extends the
    /// file's length (sparsely, where the filesystem supports it) to hold
    /// `dims`'s zeroed element bytes, without ever allocating them in
    /// memory. Intended to be paired with a memory-mapped
    /// [`Array::view_mut_from_bytes`] for files too large to hold as an
    /// in-memory `Vec`.
    pub fn write_zeroed_npy(
        mut file: &std::fs::File,
        dtype: Dtype,
        dims: Vec<usize>,
        order: Order,
    ) -> Result<(), WriteNpyError> {
        use std::io::Seek;
        let num_elements = crate::shape::size_checked(&dims).expect("overflow computing element count");
        let data_bytes_len =
            crate::shape::bytes_checked(num_elements, dtype.byte_width()).expect("overflow computing data length")
                as u64;
        let header = Header { dtype, order, shape: dims };
        header.write(file)?;
        let current_offset = file.stream_position()?;
        file.set_len(current_offset)?;
        file.set_len(
            current_offset
                .checked_add(data_bytes_len)
                .expect("overflow computing file length"),
        )?;
        Ok(())
    }
}

impl<T: Element, S: RankStorage> ArrayMut<T, S> {
    pub fn zeros(dims: Vec<usize>, order: Order) -> Result<Self, ShapeError>
    where
        T: Default,
    {
        Ok(ArrayMut {
            inner: Array::zeros(dims, order)?,
        })
    }

    pub fn shape(&self) -> &Shape<S> {
        &self.inner.shape
    }

    pub fn as_slice(&self) -> &[T] {
        &self.inner.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.inner.data
    }

    pub fn view(&self) -> View<'_, T, S> {
        self.inner.view()
    }

    pub fn view_mut(&mut self) -> ViewMut<'_, T, S> {
        ViewMut::from_parts(self.inner.shape.clone(), &mut self.inner.data)
    }

    /// Sets the element at `idx`, panicking if `idx` is out of bounds
    /// (matching the indexing convention of `IndexMut`).
    pub fn set(&mut self, idx: &[usize], value: T) {
        let offset = self
            .inner
            .shape
            .offset_of(idx)
            .expect("index out of bounds");
        self.inner.data[offset as usize] = value;
    }

    pub fn into_array(self) -> Array<T, S> {
        self.inner
    }
}

impl<T, S: RankStorage> std::ops::Deref for ArrayMut<T, S> {
    type Target = Array<T, S>;
    fn deref(&self) -> &Array<T, S> {
        &self.inner
    }
}
