//! Rendering a [`crate::view::View`] as ellipsized, NumPy-like text.

use crate::shape::RankStorage;
use crate::view::View;
use std::fmt;

/// Maximum number of leading/trailing slices shown per axis before an
/// ellipsis is inserted.
const EDGE_ITEMS: usize = 3;
/// An axis longer than this is ellipsized.
const AXIS_SUMMARY_THRESHOLD: usize = 2 * EDGE_ITEMS;

/// A value that can be rendered as a single scalar element.
pub trait Scalar: Copy {
    fn render(&self) -> String;
}

macro_rules! impl_scalar_display {
    ($ty:ty) => {
        impl Scalar for $ty {
            fn render(&self) -> String {
                format!("{}", self)
            }
        }
    };
}

impl_scalar_display!(i8);
impl_scalar_display!(u8);
impl_scalar_display!(i16);
impl_scalar_display!(u16);
impl_scalar_display!(i32);
impl_scalar_display!(u32);
impl_scalar_display!(i64);
impl_scalar_display!(u64);

impl Scalar for bool {
    fn render(&self) -> String {
        if *self {
            " True".to_owned()
        } else {
            "False".to_owned()
        }
    }
}

impl Scalar for f32 {
    fn render(&self) -> String {
        render_float(*self as f64)
    }
}

impl Scalar for f64 {
    fn render(&self) -> String {
        render_float(*self)
    }
}

fn render_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{:.8e}", value)
    }
}

#[cfg(feature = "num-complex-0_4")]
impl Scalar for num_complex_0_4::Complex<f32> {
    fn render(&self) -> String {
        format!(
            "{}{}{}j",
            render_float(self.re as f64),
            if self.im < 0.0 { "-" } else { "+" },
            render_float(self.im.abs() as f64)
        )
    }
}

#[cfg(feature = "num-complex-0_4")]
impl Scalar for num_complex_0_4::Complex<f64> {
    fn render(&self) -> String {
        format!(
            "{}{}{}j",
            render_float(self.re),
            if self.im < 0.0 { "-" } else { "+" },
            render_float(self.im.abs())
        )
    }
}

/// Writes `view` to `f` as a bracketed, row-major, possibly-ellipsized
/// textual representation.
pub fn format_view<T: Scalar, S: RankStorage>(view: &View<'_, T, S>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write_axis(f, view.dims(), view, &mut Vec::new())
}

fn write_axis<T: Scalar, S: RankStorage>(
    f: &mut fmt::Formatter<'_>,
    dims: &[usize],
    view: &View<'_, T, S>,
    idx_prefix: &mut Vec<usize>,
) -> fmt::Result {
    if dims.is_empty() {
        let value = view.get(idx_prefix).expect("prefix matches view rank");
        return write!(f, "{}", value.render());
    }

    let (&dim, rest) = dims.split_first().expect("checked non-empty above");
    write!(f, "[")?;
    let ellipsize = dim > AXIS_SUMMARY_THRESHOLD;
    for i in 0..dim {
        if ellipsize && i == EDGE_ITEMS {
            write!(f, "..., ")?;
            continue;
        }
        if ellipsize && i > EDGE_ITEMS && i < dim - EDGE_ITEMS {
            continue;
        }
        idx_prefix.push(i);
        write_axis(f, rest, view, idx_prefix)?;
        idx_prefix.pop();
        if i + 1 != dim {
            write!(f, ", ")?;
        }
    }
    write!(f, "]")
}
