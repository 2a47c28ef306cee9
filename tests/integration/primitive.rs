//! Tests for [`npy_array::buffer`] casting/validation over primitive types.

use crate::MaybeAlignedBytes;
use npy_array::dtype::{Dtype, Endian, Kind};
use npy_array::{buffer, BufferError};
use std::mem;

#[test]
fn view_i32() {
    let elems: &[i32] = &[34234324, -980780878, 2849874];
    let mut buf: Vec<u8> = Vec::new();
    buffer::write_slice(elems, &mut buf).unwrap();
    let aligned = MaybeAlignedBytes::aligned_from_bytes(buf, mem::align_of::<i32>());
    let dtype = Dtype::new(Kind::Int32, Endian::NATIVE);
    let out: &[i32] = buffer::as_typed_slice(&aligned, elems.len(), dtype).unwrap();
    assert_eq!(out, elems);
}

#[test]
fn view_i32_mut() {
    let elems: &[i32] = &[34234324, -980780878, 2849874];
    let mut buf: Vec<u8> = Vec::new();
    buffer::write_slice(elems, &mut buf).unwrap();
    let mut aligned = MaybeAlignedBytes::aligned_from_bytes(buf, mem::align_of::<i32>());
    let dtype = Dtype::new(Kind::Int32, Endian::NATIVE);
    let out: &mut [i32] = buffer::as_typed_slice_mut(&mut aligned, elems.len(), dtype).unwrap();
    assert_eq!(out, elems);
    out[2] += 1;
    let buf_last = i32::from_ne_bytes(aligned[2 * mem::size_of::<i32>()..].try_into().unwrap());
    assert_eq!(buf_last, elems[2] + 1);
}

#[test]
fn view_i32_non_native_endian() {
    const LEN: usize = 3;
    let aligned = MaybeAlignedBytes::aligned_zeros(LEN * mem::size_of::<i32>(), mem::align_of::<i32>());
    let opposite = if Endian::NATIVE == Endian::Little {
        Endian::Big
    } else {
        Endian::Little
    };
    let dtype = Dtype::new(Kind::Int32, opposite);
    let out = buffer::as_typed_slice::<i32>(&aligned, LEN, dtype);
    assert!(matches!(out, Err(BufferError::EndiannessMismatch)));
}

#[test]
fn view_bool() {
    let data = &[0x00, 0x01, 0x00, 0x00, 0x01];
    let dtype = Dtype::new(Kind::Bool, Endian::None);
    let out = buffer::as_typed_slice::<bool>(data, data.len(), dtype).unwrap();
    assert_eq!(out, &[false, true, false, false, true]);
}

#[test]
fn view_bool_bad_value() {
    let data = &[0x00, 0x01, 0x05, 0x00, 0x01];
    let dtype = Dtype::new(Kind::Bool, Endian::None);
    let out = buffer::as_typed_slice::<bool>(data, data.len(), dtype);
    assert!(matches!(out, Err(BufferError::InvalidBool(0x05))));
}

#[test]
fn view_bool_mut() {
    let data = &mut [0x00, 0x01, 0x00, 0x00, 0x01];
    let len = data.len();
    let dtype = Dtype::new(Kind::Bool, Endian::None);
    let out = buffer::as_typed_slice_mut::<bool>(data, len, dtype).unwrap();
    out[0] = true;
    out[1] = false;
    assert_eq!(data, &[0x01, 0x00, 0x00, 0x00, 0x01]);
}

#[test]
fn read_bool() {
    let data = &[0x00u8, 0x01, 0x00, 0x00, 0x01];
    let dtype = Dtype::new(Kind::Bool, Endian::None);
    let mut out = [false; 5];
    buffer::read_into(&mut out, &data[..], dtype).unwrap();
    assert_eq!(out, [false, true, false, false, true]);
}

#[test]
fn read_bool_bad_value() {
    let data = &[0x00u8, 0x01, 0x05, 0x00, 0x01];
    let dtype = Dtype::new(Kind::Bool, Endian::None);
    let mut out = [false; 5];
    let err = buffer::read_into(&mut out, &data[..], dtype).unwrap_err();
    assert!(matches!(err, BufferError::InvalidBool(0x05)));
}
