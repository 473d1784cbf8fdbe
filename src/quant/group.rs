//! Group-wise quantization of 2-D weight matrices
//!
//! Rows are split into contiguous groups of `group_size`; every group gets one
//! statistic per column (shape `[rows / group_size, cols]`). Statistics are
//! repeat-broadcast back to full row count before the codec is applied.
//!
//! Unlike the channel-wise statistics, group statistics are not
//! epsilon-guarded. A zero-range group in the asymmetric path divides 0 by 0
//! and the resulting NaN codes are scrubbed to 0 after the divide.

use ndarray::{Array2, ArrayView2, Axis};
use tracing::{debug, instrument};

use super::backend::Backend;
use super::params::{asymmetric_bound, round_clip, symmetric_bound};
use super::shard::{slice_for_shard, Shard};
use crate::{Error, Result};

fn check_groups(rows: usize, cols: usize, group_size: usize) -> Result<usize> {
    if group_size == 0 {
        return Err(Error::InvalidParameter("group_size must be > 0".to_string()));
    }
    if rows % group_size != 0 {
        return Err(Error::ShapeMismatch {
            expected: vec![rows.div_ceil(group_size) * group_size, cols],
            got: vec![rows, cols],
        });
    }
    Ok(rows / group_size)
}

fn reduce_groups<F>(x: &ArrayView2<f32>, group_size: usize, init: f32, f: F) -> Array2<f32>
where
    F: Fn(f32, f32) -> f32 + Copy,
{
    let (rows, cols) = x.dim();
    let mut stats = Array2::from_elem((rows / group_size, cols), init);
    let blocks = x.axis_chunks_iter(Axis(0), group_size);
    for (mut stat_row, block) in stats.outer_iter_mut().zip(blocks) {
        for (stat, column) in stat_row.iter_mut().zip(block.columns()) {
            *stat = column.fold(init, |acc, &v| f(acc, v));
        }
    }
    stats
}

/// Repeat each group row `group_size` times: `[g, c]` -> `[g * group_size, c]`
pub fn repeat_groups(stats: &ArrayView2<f32>, group_size: usize) -> Array2<f32> {
    let (groups, cols) = stats.dim();
    Array2::from_shape_fn((groups * group_size, cols), |(r, c)| stats[[r / group_size, c]])
}

/// Expand group statistics to full rows, then keep the part `shard` owns.
fn expand_for_shard(
    stats: &ArrayView2<f32>,
    group_size: usize,
    data_shape: &[usize],
    shard: Shard,
) -> Result<Vec<f32>> {
    let expanded = repeat_groups(stats, group_size).into_dyn();
    let sliced = slice_for_shard(&expanded.view(), data_shape, shard)?;
    if sliced.shape() != data_shape {
        return Err(Error::shape(data_shape, sliced.shape()));
    }
    Ok(sliced.iter().copied().collect())
}

fn flat(x: &ArrayView2<f32>) -> Vec<f32> {
    x.iter().copied().collect()
}

/// Symmetric group-wise quantization
///
/// # Returns
/// `(quantized, scales)` with scales of shape `[rows / group_size, cols]`
#[instrument(skip(x, backend), fields(shape = ?x.shape()))]
pub fn quantize_symmetric(
    x: &ArrayView2<f32>,
    bits: u8,
    group_size: usize,
    backend: Backend,
) -> Result<(Array2<i8>, Array2<f32>)> {
    let bnt = symmetric_bound(bits)?;
    let (rows, cols) = x.dim();
    check_groups(rows, cols, group_size)?;

    let scales = reduce_groups(x, group_size, 0.0, |acc, v| acc.max(v.abs()));
    let expanded = repeat_groups(&scales.view(), group_size);

    let ops = backend.ops();
    let levels = ops.mul_scalar(&ops.div(&flat(x), &flat(&expanded.view()))?, bnt as f32)?;
    let (lo, hi) = (-(bnt as f32) - 1.0, bnt as f32);
    let codes: Vec<i8> = levels.into_iter().map(|v| round_clip(v, lo, hi) as i8).collect();

    debug!(groups = scales.nrows(), backend = ops.name(), "symmetric group quantize");
    Ok((Array2::from_shape_vec((rows, cols), codes)?, scales))
}

/// Asymmetric group-wise quantization
///
/// # Returns
/// `(quantized, mins, maxs)` with statistics of shape `[rows / group_size, cols]`
#[instrument(skip(x, backend), fields(shape = ?x.shape()))]
pub fn quantize_asymmetric(
    x: &ArrayView2<f32>,
    bits: u8,
    group_size: usize,
    backend: Backend,
) -> Result<(Array2<u8>, Array2<f32>, Array2<f32>)> {
    let qmax = asymmetric_bound(bits)?;
    let (rows, cols) = x.dim();
    check_groups(rows, cols, group_size)?;

    let maxs = reduce_groups(x, group_size, f32::NEG_INFINITY, f32::max);
    let mins = reduce_groups(x, group_size, f32::INFINITY, f32::min);
    let scales = &maxs - &mins;
    let expanded_scales = repeat_groups(&scales.view(), group_size);
    let expanded_mins = repeat_groups(&mins.view(), group_size);

    let ops = backend.ops();
    let shifted = ops.sub(&flat(x), &flat(&expanded_mins.view()))?;
    let levels = ops.mul_scalar(&ops.div(&shifted, &flat(&expanded_scales.view()))?, qmax as f32)?;

    let mut scrubbed = 0usize;
    let codes: Vec<u8> = levels
        .into_iter()
        .map(|v| {
            let code = round_clip(v, 0.0, qmax as f32);
            if code.is_nan() {
                scrubbed += 1;
                0
            } else {
                code as u8
            }
        })
        .collect();

    debug!(groups = scales.nrows(), scrubbed, backend = ops.name(), "asymmetric group quantize");
    Ok((Array2::from_shape_vec((rows, cols), codes)?, mins, maxs))
}

/// Symmetric group-wise dequantization
///
/// `scales` are the full-matrix group scales. They are expanded to full row
/// count, then sliced for `shard`, and must end up matching `q`'s shape.
#[instrument(skip(q, scales, backend), fields(shape = ?q.shape()))]
pub fn dequantize_symmetric(
    q: &ArrayView2<i8>,
    scales: &ArrayView2<f32>,
    bits: u8,
    group_size: usize,
    shard: Shard,
    backend: Backend,
) -> Result<Array2<f32>> {
    let bnt = symmetric_bound(bits)?;
    if group_size == 0 {
        return Err(Error::InvalidParameter("group_size must be > 0".to_string()));
    }
    let expanded = expand_for_shard(scales, group_size, q.shape(), shard)?;

    let codes: Vec<f32> = q.iter().map(|&v| f32::from(v)).collect();
    let ops = backend.ops();
    let values = ops.div_scalar(&ops.mul(&codes, &expanded)?, bnt as f32)?;

    Ok(Array2::from_shape_vec(q.raw_dim(), values)?)
}

/// Asymmetric group-wise dequantization
///
/// `scale = maxs - mins`; both scale and mins go through the same expand and
/// shard slicing as in [`dequantize_symmetric`].
#[instrument(skip(q, mins, maxs, backend), fields(shape = ?q.shape()))]
pub fn dequantize_asymmetric(
    q: &ArrayView2<u8>,
    mins: &ArrayView2<f32>,
    maxs: &ArrayView2<f32>,
    bits: u8,
    group_size: usize,
    shard: Shard,
    backend: Backend,
) -> Result<Array2<f32>> {
    let qmax = asymmetric_bound(bits)?;
    if group_size == 0 {
        return Err(Error::InvalidParameter("group_size must be > 0".to_string()));
    }
    if mins.dim() != maxs.dim() {
        return Err(Error::shape(mins.shape(), maxs.shape()));
    }
    let scales = maxs - mins;
    let expanded_scales = expand_for_shard(&scales.view(), group_size, q.shape(), shard)?;
    let expanded_mins = expand_for_shard(mins, group_size, q.shape(), shard)?;

    let codes: Vec<f32> = q.iter().map(|&v| f32::from(v)).collect();
    let ops = backend.ops();
    let scaled = ops.mul(&ops.div_scalar(&codes, qmax as f32)?, &expanded_scales)?;
    let values = ops.add(&scaled, &expanded_mins)?;

    Ok(Array2::from_shape_vec(q.raw_dim(), values)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr2, s};
    use proptest::prelude::*;

    fn sample(rows: usize, cols: usize) -> Array2<f32> {
        Array2::from_shape_fn((rows, cols), |(i, j)| {
            ((i * cols + j) as f32 * 0.61).sin() * (j as f32 + 1.0)
        })
    }

    #[test]
    fn test_symmetric_group_scales_reduce_group_axis() {
        let x = arr2(&[[1.0f32, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]]);
        let (q, scales) = quantize_symmetric(&x.view(), 8, 2, Backend::Ndarray).unwrap();

        assert_eq!(scales, arr2(&[[5.0f32, 6.0, 7.0, 8.0]]));
        // 1/5*127 = 25.4, 2/6*127 = 42.33, 3/7*127 = 54.43, 4/8*127 = 63.5 -> 64
        assert_eq!(q, arr2(&[[25i8, 42, 54, 64], [127, 127, 127, 127]]));
    }

    #[test]
    fn test_symmetric_group_size_one_is_per_row() {
        let x = arr2(&[[1.0f32, -2.0], [5.0, 6.0]]);
        let (_, scales) = quantize_symmetric(&x.view(), 8, 1, Backend::Ndarray).unwrap();
        assert_eq!(scales, arr2(&[[1.0f32, 2.0], [5.0, 6.0]]));
    }

    #[test]
    fn test_repeat_groups() {
        let stats = arr2(&[[1.0f32, 2.0], [3.0, 4.0]]);
        let expanded = repeat_groups(&stats.view(), 2);
        assert_eq!(
            expanded,
            arr2(&[[1.0f32, 2.0], [1.0, 2.0], [3.0, 4.0], [3.0, 4.0]])
        );
    }

    #[test]
    fn test_indivisible_rows_rejected() {
        let x = sample(5, 2);
        let err = quantize_symmetric(&x.view(), 8, 2, Backend::Ndarray).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
        assert!(quantize_asymmetric(&x.view(), 4, 0, Backend::Ndarray).is_err());
    }

    #[test]
    fn test_asymmetric_known_values() {
        let x = arr2(&[[0.0f32, 1.0], [10.0, 3.0], [-2.0, 4.0], [2.0, 8.0]]);
        let (q, mins, maxs) = quantize_asymmetric(&x.view(), 4, 2, Backend::Ndarray).unwrap();

        assert_eq!(mins, arr2(&[[0.0f32, 1.0], [-2.0, 4.0]]));
        assert_eq!(maxs, arr2(&[[10.0f32, 3.0], [2.0, 8.0]]));
        // each value is either its group's min or max
        assert_eq!(q, arr2(&[[0u8, 0], [15, 15], [0, 0], [15, 15]]));
    }

    #[test]
    fn test_asymmetric_zero_range_group_scrubs_nan() {
        // Column 0 is constant within the group: scale 0, no epsilon guard.
        let x = arr2(&[[3.0f32, 1.0], [3.0, 2.0]]);
        let (q, mins, maxs) = quantize_asymmetric(&x.view(), 8, 2, Backend::Ndarray).unwrap();

        assert_eq!(mins[[0, 0]], 3.0);
        assert_eq!(maxs[[0, 0]] - mins[[0, 0]], 0.0);
        assert_eq!(q, arr2(&[[0u8, 0], [0, 255]]));

        let d = dequantize_asymmetric(
            &q.view(),
            &mins.view(),
            &maxs.view(),
            8,
            2,
            Shard::FULL,
            Backend::Ndarray,
        )
        .unwrap();
        assert_eq!(d[[0, 0]], 3.0);
        assert_eq!(d[[1, 0]], 3.0);
    }

    #[test]
    fn test_symmetric_round_trip() {
        let x = sample(8, 3);
        let (q, scales) = quantize_symmetric(&x.view(), 8, 4, Backend::Ndarray).unwrap();
        let d =
            dequantize_symmetric(&q.view(), &scales.view(), 8, 4, Shard::FULL, Backend::Ndarray)
                .unwrap();

        for ((r, c), &orig) in x.indexed_iter() {
            let step = scales[[r / 4, c]] / 127.0;
            assert_abs_diff_eq!(orig, d[[r, c]], epsilon = step * 0.5 + 1e-5);
        }
    }

    #[test]
    fn test_row_parallel_dequantize_matches_full() {
        let x = sample(8, 6);
        let (q, scales) = quantize_symmetric(&x.view(), 4, 2, Backend::Ndarray).unwrap();
        let full =
            dequantize_symmetric(&q.view(), &scales.view(), 4, 2, Shard::FULL, Backend::Ndarray)
                .unwrap();

        for rank in 0..2 {
            let rows = rank * 4..rank * 4 + 4;
            let q_shard = q.slice(s![rows.clone(), ..]).to_owned();
            let part = dequantize_symmetric(
                &q_shard.view(),
                &scales.view(),
                4,
                2,
                Shard::new(rank, 2).unwrap(),
                Backend::Ndarray,
            )
            .unwrap();
            assert_eq!(part, full.slice(s![rows, ..]));
        }
    }

    #[test]
    fn test_column_parallel_dequantize_matches_full() {
        let x = sample(4, 6);
        let (q, mins, maxs) = quantize_asymmetric(&x.view(), 8, 2, Backend::Ndarray).unwrap();
        let full = dequantize_asymmetric(
            &q.view(),
            &mins.view(),
            &maxs.view(),
            8,
            2,
            Shard::FULL,
            Backend::Ndarray,
        )
        .unwrap();

        for rank in 0..2 {
            let cols = rank * 3..rank * 3 + 3;
            let q_shard = q.slice(s![.., cols.clone()]).to_owned();
            let part = dequantize_asymmetric(
                &q_shard.view(),
                &mins.view(),
                &maxs.view(),
                8,
                2,
                Shard::new(rank, 2).unwrap(),
                Backend::Ndarray,
            )
            .unwrap();
            assert_eq!(part, full.slice(s![.., cols]));
        }
    }

    #[test]
    fn test_shard_shape_disagreement() {
        let x = sample(4, 4);
        let (q, scales) = quantize_symmetric(&x.view(), 8, 2, Backend::Ndarray).unwrap();
        // A 3-row shard cannot be the rank-0 half of 4 rows.
        let q_shard = q.slice(s![0..3, ..]).to_owned();
        let err = dequantize_symmetric(
            &q_shard.view(),
            &scales.view(),
            8,
            2,
            Shard::new(0, 2).unwrap(),
            Backend::Ndarray,
        )
        .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_backends_identical() {
        let x = sample(8, 4);
        let (q_nd, s_nd) = quantize_symmetric(&x.view(), 4, 4, Backend::Ndarray).unwrap();
        let (q_tr, s_tr) = quantize_symmetric(&x.view(), 4, 4, Backend::Trueno).unwrap();
        assert_eq!(q_nd, q_tr);
        assert_eq!(s_nd, s_tr);

        let (a_nd, mins, maxs) = quantize_asymmetric(&x.view(), 4, 4, Backend::Ndarray).unwrap();
        let (a_tr, _, _) = quantize_asymmetric(&x.view(), 4, 4, Backend::Trueno).unwrap();
        assert_eq!(a_nd, a_tr);

        let shard = Shard::new(1, 2).unwrap();
        let a_shard = a_nd.slice(s![4..8, ..]).to_owned();
        let (a_view, mins, maxs) = (a_shard.view(), mins.view(), maxs.view());
        let d_nd =
            dequantize_asymmetric(&a_view, &mins, &maxs, 4, 4, shard, Backend::Ndarray).unwrap();
        let d_tr =
            dequantize_asymmetric(&a_view, &mins, &maxs, 4, 4, shard, Backend::Trueno).unwrap();
        assert_eq!(d_nd, d_tr);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_asymmetric_codes_in_range(
            values in prop::collection::vec(-100.0f32..100.0, 24),
            bits in 1u8..=8,
            group_size in prop::sample::select(vec![1usize, 2, 3, 6]),
        ) {
            let x = Array2::from_shape_vec((6, 4), values).unwrap();
            let (q, mins, _) =
                quantize_asymmetric(&x.view(), bits, group_size, Backend::Ndarray).unwrap();
            let qmax = (1u32 << bits) - 1;
            prop_assert_eq!(mins.dim(), (6 / group_size, 4));
            prop_assert!(q.iter().all(|&v| u32::from(v) <= qmax));
        }

        #[test]
        fn prop_symmetric_codes_in_range(
            values in prop::collection::vec(-100.0f32..100.0, 24),
            bits in 2u8..=8,
        ) {
            let x = Array2::from_shape_vec((6, 4), values).unwrap();
            let (q, scales) = quantize_symmetric(&x.view(), bits, 3, Backend::Ndarray).unwrap();
            let bound = 1i32 << (bits - 1);
            prop_assert_eq!(scales.dim(), (2, 4));
            prop_assert!(q.iter().all(|&v| (-bound..bound).contains(&i32::from(v))));
        }
    }
}
