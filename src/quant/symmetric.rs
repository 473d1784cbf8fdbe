//! Channel-wise symmetric quantization
//!
//! Zero-point is fixed at 0 and each channel has one absmax scale:
//!
//! ```text
//! q = clip(round(x / scale * bnt), -bnt - 1, bnt)      bnt = 2^(bits-1) - 1
//! x ≈ q / bnt * scale
//! ```

use ndarray::{ArrayD, ArrayViewD};
use tracing::debug;

use super::backend::Backend;
use super::layout::broadcast_flat;
use super::params::{round_clip, symmetric_bound};
use super::shard::{slice_for_shard, Shard};
use super::stats::abs_max_per_channel;
use crate::Result;

/// Quantize `x` to signed `bits`-bit codes with per-channel absmax scales
///
/// # Arguments
/// * `x` - Weight tensor
/// * `bits` - Bit width (2..=8)
/// * `axis` - Channel axis (negative counts from the end, `None` for per-tensor)
/// * `scales` - Precomputed scales; computed from `x` when `None`
/// * `backend` - Arithmetic strategy
///
/// # Returns
/// `(quantized, scales)`
pub fn quantize(
    x: &ArrayViewD<f32>,
    bits: u8,
    axis: Option<isize>,
    scales: Option<&ArrayD<f32>>,
    backend: Backend,
) -> Result<(ArrayD<i8>, ArrayD<f32>)> {
    let bnt = symmetric_bound(bits)?;
    let scales = match scales {
        Some(scales) => scales.clone(),
        None => abs_max_per_channel(x, axis)?,
    };

    let values: Vec<f32> = x.iter().copied().collect();
    let expanded = broadcast_flat(&scales, x.shape(), axis)?;
    let ops = backend.ops();
    let levels = ops.mul_scalar(&ops.div(&values, &expanded)?, bnt as f32)?;

    let (lo, hi) = (-(bnt as f32) - 1.0, bnt as f32);
    let codes: Vec<i8> = levels.into_iter().map(|v| round_clip(v, lo, hi) as i8).collect();

    debug!(bits, ?axis, shape = ?x.shape(), backend = ops.name(), "symmetric quantize");
    Ok((ArrayD::from_shape_vec(x.raw_dim(), codes)?, scales))
}

/// Dequantize signed codes back to `f32`
///
/// `scales` are the full-size scales; when `shard` names a tensor-parallel
/// rank they are sliced to the part that `q` covers first.
///
/// # Returns
/// `(dequantized, scales actually applied)`
pub fn dequantize(
    q: &ArrayViewD<i8>,
    bits: u8,
    scales: &ArrayD<f32>,
    axis: Option<isize>,
    shard: Shard,
    backend: Backend,
) -> Result<(ArrayD<f32>, ArrayD<f32>)> {
    let bnt = symmetric_bound(bits)?;
    let scales = slice_for_shard(&scales.view(), q.shape(), shard)?;

    let codes: Vec<f32> = q.iter().map(|&v| f32::from(v)).collect();
    let expanded = broadcast_flat(&scales, q.shape(), axis)?;
    let ops = backend.ops();
    let values = ops.mul(&ops.div_scalar(&codes, bnt as f32)?, &expanded)?;

    debug!(
        bits,
        ?axis,
        rank = shard.rank,
        degree = shard.degree,
        backend = ops.name(),
        "symmetric dequantize"
    );
    Ok((ArrayD::from_shape_vec(q.raw_dim(), values)?, scales))
}
