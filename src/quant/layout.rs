//! Axis resolution and statistic broadcasting

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};

use crate::{Error, Result};

/// Resolve a possibly negative axis against `ndim`
pub(crate) fn resolve_axis(ndim: usize, axis: isize) -> Result<usize> {
    let resolved = if axis < 0 {
        ndim as isize + axis
    } else {
        axis
    };
    if resolved < 0 || resolved >= ndim as isize {
        return Err(Error::InvalidParameter(format!(
            "axis {axis} out of range for {ndim}-d tensor"
        )));
    }
    Ok(resolved as usize)
}

/// Expand a statistic to `shape` and flatten it in row-major order.
///
/// A 0-d statistic covers every element, a statistic with the same rank as the
/// data is broadcast as-is, and a 1-d statistic is aligned with `axis`
/// (last axis when `None`).
pub(crate) fn broadcast_flat(
    stat: &ArrayD<f32>,
    shape: &[usize],
    axis: Option<isize>,
) -> Result<Vec<f32>> {
    let mut view: ArrayViewD<'_, f32> = stat.view();
    if stat.ndim() == 1 && shape.len() > 1 {
        let axis = resolve_axis(shape.len(), axis.unwrap_or(-1))?;
        for _ in 0..axis {
            view = view.insert_axis(Axis(0));
        }
        while view.ndim() < shape.len() {
            let end = view.ndim();
            view = view.insert_axis(Axis(end));
        }
    }

    let expanded = view
        .broadcast(IxDyn(shape))
        .ok_or_else(|| Error::shape(shape, stat.shape()))?;
    Ok(expanded.iter().copied().collect())
}
