//! YAML schema for checkpoint quantization settings

use serde::{Deserialize, Serialize};

use crate::quant::{Backend, Shard};

fn default_true() -> bool {
    true
}

fn default_bits() -> u8 {
    8
}

fn default_axis() -> Option<isize> {
    Some(-1)
}

/// Quantization configuration
///
/// ```yaml
/// bits: 4
/// symmetric: false
/// group_size: 64
/// backend: trueno
/// shard:
///   rank: 1
///   degree: 2
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantSpec {
    /// Quantization bits (1..=8, at least 2 when symmetric)
    #[serde(default = "default_bits")]
    pub bits: u8,

    /// Symmetric (absmax) vs asymmetric (min/max) quantization
    #[serde(default = "default_true")]
    pub symmetric: bool,

    /// Rows per group; channel-wise quantization when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_size: Option<usize>,

    /// Channel axis for channel-wise quantization; `null` means per-tensor
    #[serde(default = "default_axis")]
    pub axis: Option<isize>,

    /// Arithmetic backend
    #[serde(default)]
    pub backend: Backend,

    /// Tensor-parallel shard this process dequantizes for
    #[serde(default)]
    pub shard: Shard,
}

impl QuantSpec {
    /// Channel-wise symmetric quantization on the last axis
    pub fn symmetric(bits: u8) -> Self {
        Self {
            bits,
            symmetric: true,
            group_size: None,
            axis: default_axis(),
            backend: Backend::default(),
            shard: Shard::FULL,
        }
    }

    /// Channel-wise asymmetric quantization on the last axis
    pub fn asymmetric(bits: u8) -> Self {
        Self {
            symmetric: false,
            ..Self::symmetric(bits)
        }
    }

    /// Switch to group-wise quantization
    pub fn with_group_size(mut self, group_size: usize) -> Self {
        self.group_size = Some(group_size);
        self
    }

    /// Set the channel axis (`None` for per-tensor)
    pub fn with_axis(mut self, axis: Option<isize>) -> Self {
        self.axis = axis;
        self
    }

    /// Select the arithmetic backend
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Dequantize for one tensor-parallel shard
    pub fn with_shard(mut self, shard: Shard) -> Self {
        self.shard = shard;
        self
    }

    /// Whether this config selects the group-wise driver
    pub fn is_group_wise(&self) -> bool {
        self.group_size.is_some()
    }
}

impl Default for QuantSpec {
    fn default() -> Self {
        Self::symmetric(default_bits())
    }
}
