//! Config-driven entry points
//!
//! Picks channel-wise or group-wise and symmetric or asymmetric from a
//! [`QuantSpec`], so checkpoint code can quantize and restore a tensor with a
//! single call per direction.

use ndarray::{ArrayD, ArrayView2, ArrayViewD, Ix2};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{asymmetric, group, symmetric};
use crate::config::{validate_config, QuantSpec};
use crate::{Error, Result};

/// Quantized tensor plus the statistics needed to restore it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum QuantizedWeight {
    /// Signed codes with absmax scales
    Symmetric {
        data: ArrayD<i8>,
        scales: ArrayD<f32>,
    },
    /// Unsigned codes with per-channel or per-group min/max
    Asymmetric {
        data: ArrayD<u8>,
        mins: ArrayD<f32>,
        maxs: ArrayD<f32>,
    },
}

impl QuantizedWeight {
    /// Shape of the quantized codes
    pub fn shape(&self) -> &[usize] {
        match self {
            QuantizedWeight::Symmetric { data, .. } => data.shape(),
            QuantizedWeight::Asymmetric { data, .. } => data.shape(),
        }
    }

    /// Whether the codes are signed absmax codes
    pub fn is_symmetric(&self) -> bool {
        matches!(self, QuantizedWeight::Symmetric { .. })
    }

    /// Memory usage in bytes (one byte per code, f32 statistics)
    pub fn memory_bytes(&self) -> usize {
        match self {
            QuantizedWeight::Symmetric { data, scales } => data.len() + scales.len() * 4,
            QuantizedWeight::Asymmetric { data, mins, maxs } => {
                data.len() + (mins.len() + maxs.len()) * 4
            }
        }
    }
}

fn as_matrix<'a, A>(x: &ArrayViewD<'a, A>) -> Result<ArrayView2<'a, A>> {
    Ok(x.clone().into_dimensionality::<Ix2>()?)
}

fn checked(spec: &QuantSpec) -> Result<()> {
    validate_config(spec).map_err(|e| Error::InvalidParameter(e.to_string()))
}

/// Quantize `x` as described by `spec`
///
/// Group-wise specs require a 2-D tensor.
#[instrument(skip(x), fields(shape = ?x.shape()))]
pub fn quantize_weight(x: &ArrayViewD<f32>, spec: &QuantSpec) -> Result<QuantizedWeight> {
    checked(spec)?;
    let (bits, backend) = (spec.bits, spec.backend);

    let weight = match (spec.group_size, spec.symmetric) {
        (Some(group_size), true) => {
            let (data, scales) =
                group::quantize_symmetric(&as_matrix(x)?, bits, group_size, backend)?;
            QuantizedWeight::Symmetric {
                data: data.into_dyn(),
                scales: scales.into_dyn(),
            }
        }
        (Some(group_size), false) => {
            let (data, mins, maxs) =
                group::quantize_asymmetric(&as_matrix(x)?, bits, group_size, backend)?;
            QuantizedWeight::Asymmetric {
                data: data.into_dyn(),
                mins: mins.into_dyn(),
                maxs: maxs.into_dyn(),
            }
        }
        (None, true) => {
            let (data, scales) = symmetric::quantize(x, bits, spec.axis, None, backend)?;
            QuantizedWeight::Symmetric { data, scales }
        }
        (None, false) => {
            let (data, mins, maxs) = asymmetric::quantize(x, bits, spec.axis, None, backend)?;
            QuantizedWeight::Asymmetric { data, mins, maxs }
        }
    };
    Ok(weight)
}

/// Restore `weight` to `f32` as described by `spec`
///
/// `weight.data` may be the shard named by `spec.shard` while the statistics
/// are still full size; they are sliced before use.
#[instrument(skip(weight), fields(shape = ?weight.shape()))]
pub fn dequantize_weight(weight: &QuantizedWeight, spec: &QuantSpec) -> Result<ArrayD<f32>> {
    checked(spec)?;
    if weight.is_symmetric() != spec.symmetric {
        return Err(Error::InvalidParameter(format!(
            "config expects {} codes",
            if spec.symmetric { "symmetric" } else { "asymmetric" }
        )));
    }
    let (bits, shard, backend) = (spec.bits, spec.shard, spec.backend);

    let values = match (weight, spec.group_size) {
        (QuantizedWeight::Symmetric { data, scales }, Some(group_size)) => {
            group::dequantize_symmetric(
                &as_matrix(&data.view())?,
                &as_matrix(&scales.view())?,
                bits,
                group_size,
                shard,
                backend,
            )?
            .into_dyn()
        }
        (QuantizedWeight::Asymmetric { data, mins, maxs }, Some(group_size)) => {
            group::dequantize_asymmetric(
                &as_matrix(&data.view())?,
                &as_matrix(&mins.view())?,
                &as_matrix(&maxs.view())?,
                bits,
                group_size,
                shard,
                backend,
            )?
            .into_dyn()
        }
        (QuantizedWeight::Symmetric { data, scales }, None) => {
            symmetric::dequantize(&data.view(), bits, scales, spec.axis, shard, backend)?.0
        }
        (QuantizedWeight::Asymmetric { data, mins, maxs }, None) => {
            asymmetric::dequantize(&data.view(), bits, mins, maxs, spec.axis, shard, backend)?.0
        }
    };
    Ok(values)
}
