//! Tests for the NumPy-style slicing algebra exposed through `View`/`ViewMut`.

use npy_array::{ArrayMut, Order, SliceSpec};

fn arange_3d() -> ArrayMut<i32, npy_array::Dyn> {
    let mut arr = ArrayMut::<i32, npy_array::Dyn>::zeros(vec![2, 3, 4], Order::C).unwrap();
    let mut n = 0;
    for i in 0..2 {
        for j in 0..3 {
            for k in 0..4 {
                arr.set(&[i, j, k], n);
                n += 1;
            }
        }
    }
    arr
}

#[test]
fn full_range_on_every_axis_is_identity() {
    let arr = arange_3d();
    let view = arr.view();
    let sliced = view
        .slice(&[SliceSpec::full(), SliceSpec::full(), SliceSpec::full()])
        .unwrap();
    assert_eq!(sliced.dims(), view.dims());
    for i in 0..2 {
        for j in 0..3 {
            for k in 0..4 {
                assert_eq!(sliced.get(&[i, j, k]), view.get(&[i, j, k]));
            }
        }
    }
}

#[test]
fn single_index_collapses_a_dimension() {
    let arr = arange_3d();
    let view = arr.view();
    let sliced = view
        .slice(&[SliceSpec::Index(1), SliceSpec::full(), SliceSpec::full()])
        .unwrap();
    assert_eq!(sliced.dims(), &[3, 4]);
    assert_eq!(sliced.get(&[0, 0]), Some(12));
    assert_eq!(sliced.get(&[2, 3]), Some(23));
}

#[test]
fn negative_index_counts_from_the_end() {
    let arr = arange_3d();
    let view = arr.view();
    let a = view
        .slice(&[SliceSpec::Index(-1), SliceSpec::full(), SliceSpec::full()])
        .unwrap();
    let b = view
        .slice(&[SliceSpec::Index(1), SliceSpec::full(), SliceSpec::full()])
        .unwrap();
    for j in 0..3 {
        for k in 0..4 {
            assert_eq!(a.get(&[j, k]), b.get(&[j, k]));
        }
    }
}

#[test]
fn ellipsis_fills_remaining_axes() {
    let arr = arange_3d();
    let view = arr.view();
    let explicit = view
        .slice(&[SliceSpec::Index(0), SliceSpec::full(), SliceSpec::full()])
        .unwrap();
    let via_ellipsis = view.slice(&[SliceSpec::Index(0), SliceSpec::Ellipsis]).unwrap();
    assert_eq!(explicit.dims(), via_ellipsis.dims());
    assert_eq!(explicit.get(&[1, 2]), via_ellipsis.get(&[1, 2]));
}

#[test]
fn new_axis_inserts_a_length_one_dimension() {
    let arr = arange_3d();
    let view = arr.view();
    let sliced = view
        .slice(&[SliceSpec::NewAxis, SliceSpec::Ellipsis])
        .unwrap();
    assert_eq!(sliced.dims(), &[1, 2, 3, 4]);
    assert_eq!(sliced.get(&[0, 1, 2, 3]), view.get(&[1, 2, 3]));
}

#[test]
fn strided_range_skips_elements() {
    let arr = arange_3d();
    let view = arr.view();
    let sliced = view
        .slice(&[
            SliceSpec::Index(0),
            SliceSpec::Index(0),
            SliceSpec::Range {
                start: None,
                end: None,
                step: 2,
            },
        ])
        .unwrap();
    assert_eq!(sliced.dims(), &[2]);
    assert_eq!(sliced.get(&[0]), Some(0));
    assert_eq!(sliced.get(&[1]), Some(2));
}

#[test]
fn negative_step_reverses_the_axis() {
    let arr = arange_3d();
    let view = arr.view();
    let sliced = view
        .slice(&[
            SliceSpec::Index(0),
            SliceSpec::Index(0),
            SliceSpec::Range {
                start: None,
                end: None,
                step: -1,
            },
        ])
        .unwrap();
    assert_eq!(sliced.dims(), &[4]);
    assert_eq!(sliced.get(&[0]), Some(3));
    assert_eq!(sliced.get(&[3]), Some(0));
}

#[test]
fn out_of_range_end_is_clamped_not_rejected() {
    let arr = arange_3d();
    let view = arr.view();
    let sliced = view
        .slice(&[
            SliceSpec::Index(0),
            SliceSpec::Index(0),
            SliceSpec::Range {
                start: Some(1),
                end: Some(1000),
                step: 1,
            },
        ])
        .unwrap();
    assert_eq!(sliced.dims(), &[3]);
}

#[test]
fn mutating_a_slice_mut_is_visible_in_the_owning_array() {
    let mut arr = arange_3d();
    {
        let mut view_mut = arr.view_mut();
        let mut sliced = view_mut.slice_mut(&[SliceSpec::Index(1), SliceSpec::Ellipsis]).unwrap();
        sliced.set(&[0, 0], -1);
    }
    assert_eq!(arr.as_slice()[12], -1);
}

#[test]
fn multiple_ellipsis_is_rejected() {
    let arr = arange_3d();
    let view = arr.view();
    let result = view.slice(&[SliceSpec::Ellipsis, SliceSpec::Ellipsis]);
    assert!(result.is_err());
}

#[test]
fn too_many_specs_is_rejected() {
    let arr = arange_3d();
    let view = arr.view();
    let result = view.slice(&[
        SliceSpec::full(),
        SliceSpec::full(),
        SliceSpec::full(),
        SliceSpec::full(),
    ]);
    assert!(result.is_err());
}
