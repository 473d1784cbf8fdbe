//! Channel-wise quantization statistics
//!
//! Reduces every axis except the channel axis. Exact-zero results are replaced
//! with [`EPSILON`] so the codecs never divide by zero. `axis = None` reduces
//! the whole tensor to a 0-d statistic (per-tensor quantization).

use ndarray::{arr0, Array1, ArrayD, ArrayViewD, Axis};

use super::layout::resolve_axis;
use crate::{Error, Result};

/// Substitute for an exact-zero statistic
pub const EPSILON: f32 = 1e-8;

#[inline]
fn guard_zero(value: f32) -> f32 {
    if value == 0.0 {
        EPSILON
    } else {
        value
    }
}

fn reduce_except<F>(
    x: &ArrayViewD<f32>,
    axis: Option<isize>,
    init: f32,
    f: F,
) -> Result<ArrayD<f32>>
where
    F: Fn(f32, f32) -> f32 + Copy,
{
    if x.is_empty() {
        return Err(Error::InvalidParameter(
            "cannot compute statistics of an empty tensor".to_string(),
        ));
    }

    let stat = match axis {
        None => arr0(x.fold(init, |acc, &v| f(acc, v))).into_dyn(),
        Some(axis) => {
            let axis = resolve_axis(x.ndim(), axis)?;
            x.axis_iter(Axis(axis))
                .map(|lane| lane.fold(init, |acc, &v| f(acc, v)))
                .collect::<Array1<f32>>()
                .into_dyn()
        }
    };
    Ok(stat.mapv_into(guard_zero))
}

/// Per-channel `max(|x|)` over every axis except `axis`
pub fn abs_max_per_channel(x: &ArrayViewD<f32>, axis: Option<isize>) -> Result<ArrayD<f32>> {
    reduce_except(x, axis, 0.0, |acc, v| acc.max(v.abs()))
}

/// Per-channel `(min, max)` over every axis except `axis`
///
/// Mins and maxs are epsilon-guarded independently.
pub fn min_max_per_channel(
    x: &ArrayViewD<f32>,
    axis: Option<isize>,
) -> Result<(ArrayD<f32>, ArrayD<f32>)> {
    let mins = reduce_except(x, axis, f32::INFINITY, f32::min)?;
    let maxs = reduce_except(x, axis, f32::NEG_INFINITY, f32::max)?;
    Ok((mins, maxs))
}
