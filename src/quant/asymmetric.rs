//! Channel-wise asymmetric quantization
//!
//! Each channel carries a `(min, max)` pair; the min acts as the offset:
//!
//! ```text
//! q = clip(round((x - min) / (max - min) * qmax), 0, qmax)      qmax = 2^bits - 1
//! x ≈ q / qmax * (max - min) + min
//! ```

use ndarray::{ArrayD, ArrayViewD};
use tracing::debug;

use super::backend::Backend;
use super::layout::broadcast_flat;
use super::params::{asymmetric_bound, round_clip};
use super::shard::{slice_for_shard, Shard};
use super::stats::min_max_per_channel;
use crate::{Error, Result};

fn check_pair(mins: &ArrayD<f32>, maxs: &ArrayD<f32>) -> Result<()> {
    if mins.shape() != maxs.shape() {
        return Err(Error::shape(mins.shape(), maxs.shape()));
    }
    Ok(())
}

/// Quantize `x` to unsigned `bits`-bit codes with per-channel min/max
///
/// # Arguments
/// * `x` - Weight tensor
/// * `bits` - Bit width (1..=8)
/// * `axis` - Channel axis (negative counts from the end, `None` for per-tensor)
/// * `min_max` - Precomputed `(mins, maxs)`; computed from `x` when `None`
/// * `backend` - Arithmetic strategy
///
/// # Returns
/// `(quantized, mins, maxs)`
pub fn quantize(
    x: &ArrayViewD<f32>,
    bits: u8,
    axis: Option<isize>,
    min_max: Option<(&ArrayD<f32>, &ArrayD<f32>)>,
    backend: Backend,
) -> Result<(ArrayD<u8>, ArrayD<f32>, ArrayD<f32>)> {
    let qmax = asymmetric_bound(bits)?;
    let (mins, maxs) = match min_max {
        Some((mins, maxs)) => (mins.clone(), maxs.clone()),
        None => min_max_per_channel(x, axis)?,
    };
    check_pair(&mins, &maxs)?;

    let scales = &maxs - &mins;
    let values: Vec<f32> = x.iter().copied().collect();
    let expanded_mins = broadcast_flat(&mins, x.shape(), axis)?;
    let expanded_scales = broadcast_flat(&scales, x.shape(), axis)?;

    let ops = backend.ops();
    let shifted = ops.sub(&values, &expanded_mins)?;
    let levels = ops.mul_scalar(&ops.div(&shifted, &expanded_scales)?, qmax as f32)?;
    let codes: Vec<u8> = levels
        .into_iter()
        .map(|v| round_clip(v, 0.0, qmax as f32) as u8)
        .collect();

    debug!(bits, ?axis, shape = ?x.shape(), backend = ops.name(), "asymmetric quantize");
    Ok((ArrayD::from_shape_vec(x.raw_dim(), codes)?, mins, maxs))
}

/// Dequantize unsigned codes back to `f32`
///
/// Scales (`maxs - mins`) and mins are sliced identically for `shard`.
///
/// # Returns
/// `(dequantized, scales actually applied)`
pub fn dequantize(
    q: &ArrayViewD<u8>,
    bits: u8,
    mins: &ArrayD<f32>,
    maxs: &ArrayD<f32>,
    axis: Option<isize>,
    shard: Shard,
    backend: Backend,
) -> Result<(ArrayD<f32>, ArrayD<f32>)> {
    let qmax = asymmetric_bound(bits)?;
    check_pair(mins, maxs)?;

    let scales = slice_for_shard(&(maxs - mins).view(), q.shape(), shard)?;
    let mins = slice_for_shard(&mins.view(), q.shape(), shard)?;

    let codes: Vec<f32> = q.iter().map(|&v| f32::from(v)).collect();
    let expanded_scales = broadcast_flat(&scales, q.shape(), axis)?;
    let expanded_mins = broadcast_flat(&mins, q.shape(), axis)?;

    let ops = backend.ops();
    let scaled = ops.mul(&ops.div_scalar(&codes, qmax as f32)?, &expanded_scales)?;
    let values = ops.add(&scaled, &expanded_mins)?;

    debug!(
        bits,
        ?axis,
        rank = shard.rank,
        degree = shard.degree,
        backend = ops.name(),
        "asymmetric dequantize"
    );
    Ok((ArrayD::from_shape_vec(q.raw_dim(), values)?, scales))
}
