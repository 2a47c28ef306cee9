//! Validating, endianness-aware casts between raw byte ranges and typed
//! element slices.

use crate::dtype::{Dtype, Kind};
use std::error::Error;
use std::fmt;
use std::io;
use std::mem;
use std::ptr::NonNull;
use std::slice;

/// Error interpreting a byte range as a typed element slice.
#[derive(Debug)]
pub enum BufferError {
    /// The dtype's kind does not match the requested element type.
    TypeMismatch { expected: Kind, found: Kind },
    /// A byte in a `bool` buffer was neither `0x00` nor `0x01`.
    InvalidBool(u8),
    /// The dtype's endianness tag does not match native byte order, and
    /// the operation cannot byte-swap in place (e.g. viewing borrowed
    /// bytes).
    EndiannessMismatch,
    /// `len * size_of::<T>()` would overflow `usize`.
    LengthOverflow,
    /// The byte range is shorter than required.
    MissingBytes(usize),
    /// The byte range is longer than required.
    ExtraBytes(usize),
    /// The byte range's address is not aligned for the element type.
    Misaligned,
    /// I/O error while reading element bytes.
    Io(io::Error),
}

impl Error for BufferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BufferError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BufferError::TypeMismatch { expected, found } => {
                write!(f, "expected element kind {:?}, found {:?}", expected, found)
            }
            BufferError::InvalidBool(byte) => {
                write!(f, "invalid byte 0x{:02x} for a bool element", byte)
            }
            BufferError::EndiannessMismatch => write!(f, "dtype endianness does not match native byte order"),
            BufferError::LengthOverflow => write!(f, "element count overflows when computing byte length"),
            BufferError::MissingBytes(n) => write!(f, "buffer is missing {} bytes", n),
            BufferError::ExtraBytes(n) => write!(f, "buffer has {} extra bytes", n),
            BufferError::Misaligned => write!(f, "buffer is not aligned for the element type"),
            BufferError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl From<io::Error> for BufferError {
    fn from(err: io::Error) -> Self {
        BufferError::Io(err)
    }
}

/// A type that can be reinterpreted in and out of `.npy` element bytes.
///
/// # Safety
///
/// Implementors must have no padding bytes and must be valid for every bit
/// pattern the value-domain check (if any) for `KIND` allows.
pub unsafe trait Element: Sized + Copy {
    const KIND: Kind;

    /// Swaps the byte order of a single element in place. For multi-byte
    /// scalar kinds this reverses the whole representation; for complex
    /// kinds each half is reversed independently.
    fn byte_swap(&mut self);
}

fn check_bytes_len<T>(bytes_len: usize, len: usize) -> Result<(), BufferError> {
    let needed = len.checked_mul(mem::size_of::<T>()).ok_or(BufferError::LengthOverflow)?;
    use std::cmp::Ordering;
    match bytes_len.cmp(&needed) {
        Ordering::Less => Err(BufferError::MissingBytes(needed - bytes_len)),
        Ordering::Equal => Ok(()),
        Ordering::Greater => Err(BufferError::ExtraBytes(bytes_len - needed)),
    }
}

fn check_bytes_align<T>(bytes: &[u8]) -> Result<(), BufferError> {
    if bytes.is_empty() || bytes.as_ptr() as usize % mem::align_of::<T>() == 0 {
        Ok(())
    } else {
        Err(BufferError::Misaligned)
    }
}

fn check_valid_bool(bytes: &[u8]) -> Result<(), BufferError> {
    let reduced = bytes.iter().fold(0u8, |acc, &b| acc | b);
    if reduced & 0b1111_1110 != 0 {
        let bad = bytes.iter().copied().find(|&b| b > 1).expect("reduce found a bad byte");
        return Err(BufferError::InvalidBool(bad));
    }
    Ok(())
}

fn check_endian<T: Element>(dtype: Dtype) -> Result<(), BufferError> {
    if dtype.kind() != T::KIND {
        return Err(BufferError::TypeMismatch {
            expected: T::KIND,
            found: dtype.kind(),
        });
    }
    if !dtype.is_native_or_unspecified() {
        return Err(BufferError::EndiannessMismatch);
    }
    Ok(())
}

unsafe fn raw_slice<T>(bytes: &[u8], len: usize) -> &[T] {
    if len == 0 {
        slice::from_raw_parts(NonNull::<T>::dangling().as_ptr(), 0)
    } else {
        slice::from_raw_parts(bytes.as_ptr().cast(), len)
    }
}

unsafe fn raw_slice_mut<T>(bytes: &mut [u8], len: usize) -> &mut [T] {
    if len == 0 {
        slice::from_raw_parts_mut(NonNull::<T>::dangling().as_ptr(), 0)
    } else {
        slice::from_raw_parts_mut(bytes.as_mut_ptr().cast(), len)
    }
}

/// Reinterprets `bytes` as a `&[T]` of `len` elements.
///
/// Checks the dtype's kind and endianness against `T`, the bool
/// value-domain if applicable, the exact byte length, and alignment.
pub fn as_typed_slice<T: Element>(bytes: &[u8], len: usize, dtype: Dtype) -> Result<&[T], BufferError> {
    check_endian::<T>(dtype)?;
    if matches!(T::KIND, Kind::Bool) {
        check_valid_bool(bytes)?;
    }
    check_bytes_len::<T>(bytes.len(), len)?;
    check_bytes_align::<T>(bytes)?;
    Ok(unsafe { raw_slice(bytes, len) })
}

/// Mutable counterpart of [`as_typed_slice`].
pub fn as_typed_slice_mut<T: Element>(
    bytes: &mut [u8],
    len: usize,
    dtype: Dtype,
) -> Result<&mut [T], BufferError> {
    check_endian::<T>(dtype)?;
    if matches!(T::KIND, Kind::Bool) {
        check_valid_bool(bytes)?;
    }
    check_bytes_len::<T>(bytes.len(), len)?;
    check_bytes_align::<T>(bytes)?;
    Ok(unsafe { raw_slice_mut(bytes, len) })
}

/// Reads `dst.len()` elements from `reader`, byte-swapping in place if the
/// dtype's endianness does not match native byte order.
pub fn read_into<T: Element, R: io::Read>(dst: &mut [T], mut reader: R, dtype: Dtype) -> Result<(), BufferError> {
    if dtype.kind() != T::KIND {
        return Err(BufferError::TypeMismatch {
            expected: T::KIND,
            found: dtype.kind(),
        });
    }
    let bytes = unsafe { slice::from_raw_parts_mut(dst.as_mut_ptr().cast::<u8>(), mem::size_of_val(dst)) };
    reader.read_exact(bytes)?;
    if matches!(T::KIND, Kind::Bool) {
        check_valid_bool(bytes)?;
    }
    if !dtype.is_native_or_unspecified() {
        for elem in dst.iter_mut() {
            elem.byte_swap();
        }
    }
    Ok(())
}

/// Writes `slice` to `writer` in native byte order.
pub fn write_slice<T: Element, W: io::Write>(slice: &[T], mut writer: W) -> io::Result<()> {
    let bytes = unsafe { std::slice::from_raw_parts(slice.as_ptr().cast::<u8>(), mem::size_of_val(slice)) };
    writer.write_all(bytes)
}

macro_rules! impl_element_one_byte {
    ($ty:ty, $kind:expr) => {
        unsafe impl Element for $ty {
            const KIND: Kind = $kind;
            fn byte_swap(&mut self) {}
        }
    };
}

impl_element_one_byte!(i8, Kind::Int8);
impl_element_one_byte!(u8, Kind::UInt8);

unsafe impl Element for bool {
    const KIND: Kind = Kind::Bool;
    fn byte_swap(&mut self) {}
}

unsafe impl Element for i16 {
    const KIND: Kind = Kind::Int16;
    fn byte_swap(&mut self) {
        *self = self.swap_bytes();
    }
}
unsafe impl Element for u16 {
    const KIND: Kind = Kind::UInt16;
    fn byte_swap(&mut self) {
        *self = self.swap_bytes();
    }
}
unsafe impl Element for i32 {
    const KIND: Kind = Kind::Int32;
    fn byte_swap(&mut self) {
        *self = self.swap_bytes();
    }
}
unsafe impl Element for u32 {
    const KIND: Kind = Kind::UInt32;
    fn byte_swap(&mut self) {
        *self = self.swap_bytes();
    }
}
unsafe impl Element for i64 {
    const KIND: Kind = Kind::Int64;
    fn byte_swap(&mut self) {
        *self = self.swap_bytes();
    }
}
unsafe impl Element for u64 {
    const KIND: Kind = Kind::UInt64;
    fn byte_swap(&mut self) {
        *self = self.swap_bytes();
    }
}
unsafe impl Element for f32 {
    const KIND: Kind = Kind::Float32;
    fn byte_swap(&mut self) {
        *self = f32::from_bits(self.to_bits().swap_bytes());
    }
}
unsafe impl Element for f64 {
    const KIND: Kind = Kind::Float64;
    fn byte_swap(&mut self) {
        *self = f64::from_bits(self.to_bits().swap_bytes());
    }
}

#[cfg(feature = "num-complex-0_4")]
mod complex_impl {
    use super::*;
    use num_complex_0_4::Complex;

    unsafe impl Element for Complex<f32> {
        const KIND: Kind = Kind::Complex64;
        fn byte_swap(&mut self) {
            self.re.byte_swap();
            self.im.byte_swap();
        }
    }

    unsafe impl Element for Complex<f64> {
        const KIND: Kind = Kind::Complex128;
        fn byte_swap(&mut self) {
            self.re.byte_swap();
            self.im.byte_swap();
        }
    }
}
