//! Configuration validation

use super::schema::QuantSpec;
use crate::quant::MAX_QUANT_BITS;

/// Validation error type
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid quantization bits: {0} (must be 1..=8, and at least 2 when symmetric)")]
    InvalidQuantBits(u8),

    #[error("Invalid group size: {0} (must be > 0)")]
    InvalidGroupSize(usize),

    #[error("Invalid tensor-parallel degree: {0} (must be > 0)")]
    InvalidDegree(usize),

    #[error("Invalid tensor-parallel rank: {rank} (must be -1 or in [0, {degree}))")]
    InvalidRank { rank: isize, degree: usize },
}

/// Validate a quantization specification
///
/// Checks:
/// - Bit width fits the selected mode
/// - Group size is non-zero
/// - Shard rank/degree are consistent
pub fn validate_config(spec: &QuantSpec) -> Result<(), ValidationError> {
    let min_bits = if spec.symmetric { 2 } else { 1 };
    if !(min_bits..=MAX_QUANT_BITS).contains(&spec.bits) {
        return Err(ValidationError::InvalidQuantBits(spec.bits));
    }

    if let Some(group_size) = spec.group_size {
        if group_size == 0 {
            return Err(ValidationError::InvalidGroupSize(group_size));
        }
    }

    let shard = spec.shard;
    if shard.degree == 0 {
        return Err(ValidationError::InvalidDegree(shard.degree));
    }
    if shard.rank < -1 || (shard.rank >= 0 && shard.rank as usize >= shard.degree) {
        return Err(ValidationError::InvalidRank {
            rank: shard.rank,
            degree: shard.degree,
        });
    }

    Ok(())
}
