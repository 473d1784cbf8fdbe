//! Tensor-parallel shard slicing of quantization statistics
//!
//! A process holding one shard of a weight must dequantize with the matching
//! slice of the full-size statistics. The split direction is inferred from the
//! shapes:
//!
//! - **Row-parallel**: the shard's last dimension equals the statistic's last
//!   dimension, so rows were split upstream. A statistic that spans rows
//!   (same rank as the data, at least 2-d, leading axis longer than 1) is
//!   sliced along its first axis. Per-column vectors, keepdims `[1, cols]`
//!   scales and scalars are used whole.
//! - **Column-parallel**: the last dimensions differ, so the statistic is
//!   sliced along its last axis.

use std::ops::Range;

use ndarray::{ArrayD, ArrayViewD, Axis, Slice};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Shard descriptor: `rank` in `[0, degree)`, or `-1` for the unsharded tensor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shard {
    /// Tensor-parallel rank, `-1` disables slicing
    pub rank: isize,
    /// Tensor-parallel world size
    pub degree: usize,
}

impl Shard {
    /// No sharding: statistics are used as-is
    pub const FULL: Shard = Shard { rank: -1, degree: 1 };

    /// Shard `rank` of `degree` cooperating processes
    pub fn new(rank: usize, degree: usize) -> Result<Self> {
        let shard = Self {
            rank: rank as isize,
            degree,
        };
        shard.validate()?;
        Ok(shard)
    }

    /// Whether this descriptor disables slicing
    pub fn is_full(&self) -> bool {
        self.rank == -1
    }

    /// Check `degree > 0` and `rank ∈ {-1} ∪ [0, degree)`
    pub fn validate(&self) -> Result<()> {
        if self.degree == 0 {
            return Err(Error::InvalidParameter(
                "tensor-parallel degree must be > 0".to_string(),
            ));
        }
        if self.rank < -1 || (self.rank >= 0 && self.rank as usize >= self.degree) {
            return Err(Error::InvalidParameter(format!(
                "tensor-parallel rank {} out of range for degree {}",
                self.rank, self.degree
            )));
        }
        Ok(())
    }

    /// Index range owned by this shard along an axis of length `len`
    pub fn block(&self, len: usize) -> Result<Range<usize>> {
        if self.is_full() {
            return Ok(0..len);
        }
        self.validate()?;
        if len % self.degree != 0 {
            return Err(Error::ShapeMismatch {
                expected: vec![len - len % self.degree],
                got: vec![len],
            });
        }
        let size = len / self.degree;
        let start = self.rank as usize * size;
        Ok(start..start + size)
    }
}

impl Default for Shard {
    fn default() -> Self {
        Self::FULL
    }
}

/// How a statistic relates to the shard of data it describes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShardLayout {
    /// Rows were split upstream (trailing dimensions agree)
    RowParallel,
    /// Columns were split upstream (trailing dimensions differ)
    ColumnParallel,
}

impl ShardLayout {
    /// Infer the split direction from the statistic and data shapes
    pub fn detect(stat_shape: &[usize], data_shape: &[usize]) -> Self {
        match (stat_shape.last(), data_shape.last()) {
            (None, _) => ShardLayout::RowParallel,
            (Some(s), Some(d)) if s == d => ShardLayout::RowParallel,
            _ => ShardLayout::ColumnParallel,
        }
    }
}

/// Slice the statistic owned by `shard` for a data tensor of `data_shape`
///
/// Every codec goes through this routine, so the same `(stat, data, shard)`
/// always yields the same sub-range.
pub fn slice_for_shard(
    stat: &ArrayViewD<f32>,
    data_shape: &[usize],
    shard: Shard,
) -> Result<ArrayD<f32>> {
    if shard.is_full() || stat.ndim() == 0 {
        return Ok(stat.to_owned());
    }
    shard.validate()?;

    let layout = ShardLayout::detect(stat.shape(), data_shape);
    let axis = match layout {
        ShardLayout::RowParallel
            if stat.ndim() >= 2 && stat.ndim() == data_shape.len() && stat.shape()[0] > 1 =>
        {
            0
        }
        ShardLayout::RowParallel => return Ok(stat.to_owned()),
        ShardLayout::ColumnParallel => stat.ndim() - 1,
    };

    let range = shard.block(stat.len_of(Axis(axis)))?;
    debug!(
        ?layout,
        axis,
        rank = shard.rank,
        degree = shard.degree,
        start = range.start,
        end = range.end,
        "slicing statistic for shard"
    );
    Ok(stat.slice_axis(Axis(axis), Slice::from(range)).to_owned())
}
